use crate::{BlendMode, Color, PixelBucket};
use std::cmp::Ordering;
// Formulas follow the PDF blend mode reference (ISO 32000-1, section 11.3.5).
// `b` is the backdrop channel, `s` the source channel.

/// Blend `overlay` onto `base` with the given mode.
///
/// The overlay alpha is scaled by `opacity` first. The blended color is then
/// mixed over the base with standard alpha-over:
///
/// ```text
/// C = (1 - B.a) * A + B.a * blend(A, B)
/// C.a = A.a + B.a * (1 - A.a)
/// ```
///
/// Results are not clamped.
pub fn blend_pixel(mode: BlendMode, base: Color, overlay: Color, opacity: f32) -> Color {
    let overlay = overlay.with_alpha(overlay.a * opacity);
    let blended = blend_rgb(mode, base, overlay);
    let src_a = overlay.a;
    let mut result = (1.0 - src_a) * base + src_a * blended;
    result.a = base.a + src_a * (1.0 - base.a);
    result
}

/// Blend every pixel of `layer` onto `base`.
///
/// # Panics
///
/// Panics if the buckets differ in size.
pub fn blend_buckets(mode: BlendMode, base: &mut PixelBucket, layer: &PixelBucket, opacity: f32) {
    assert_eq!(
        (base.width(), base.height()),
        (layer.width(), layer.height()),
        "blend_buckets requires buckets of equal size"
    );
    for (dst, src) in base.pixels_mut().iter_mut().zip(layer.pixels()) {
        *dst = blend_pixel(mode, *dst, *src, opacity);
    }
}

fn blend_rgb(mode: BlendMode, a: Color, b: Color) -> Color {
    match mode {
        BlendMode::Normal => b,
        BlendMode::Multiply => a.zip_rgb(b, multiply),
        BlendMode::Screen => a.zip_rgb(b, screen),
        BlendMode::Overlay => a.zip_rgb(b, overlay),
        BlendMode::Darken => a.zip_rgb(b, darken),
        BlendMode::Lighten => a.zip_rgb(b, lighten),
        BlendMode::ColorDodge => a.zip_rgb(b, color_dodge),
        BlendMode::ColorBurn => a.zip_rgb(b, color_burn),
        BlendMode::HardLight => a.zip_rgb(b, hard_light),
        BlendMode::SoftLight => a.zip_rgb(b, soft_light),
        BlendMode::Difference => a.zip_rgb(b, difference),
        BlendMode::Exclusion => a.zip_rgb(b, exclusion),
        BlendMode::Hue => set_lum(set_sat(b, sat(a)), lum(a)),
        BlendMode::Saturation => set_lum(set_sat(a, sat(b)), lum(a)),
        BlendMode::Color => set_lum(b, lum(a)),
        BlendMode::Luminosity => set_lum(a, lum(b)),
        BlendMode::Addition => a + b,
        BlendMode::Subtract => a - b,
        BlendMode::Divide => a.zip_rgb(b, divide),
    }
}

pub(crate) fn multiply(b: f32, s: f32) -> f32 {
    b * s
}

pub(crate) fn screen(b: f32, s: f32) -> f32 {
    b + s - (b * s)
}

pub(crate) fn overlay(b: f32, s: f32) -> f32 {
    hard_light(s, b)
}

fn darken(b: f32, s: f32) -> f32 {
    if b < s {
        b
    } else {
        s
    }
}

fn lighten(b: f32, s: f32) -> f32 {
    if b > s {
        b
    } else {
        s
    }
}

pub(crate) fn color_dodge(b: f32, s: f32) -> f32 {
    if b == 0.0 {
        0.0
    } else if b >= 1.0 - s {
        1.0
    } else {
        b / (1.0 - s)
    }
}

pub(crate) fn color_burn(b: f32, s: f32) -> f32 {
    if b == 1.0 {
        1.0
    } else if 1.0 - b >= s {
        0.0
    } else {
        1.0 - (1.0 - b) / s
    }
}

pub(crate) fn hard_light(b: f32, s: f32) -> f32 {
    if s <= 0.5 {
        multiply(b, 2.0 * s)
    } else {
        screen(b, 2.0 * s - 1.0)
    }
}

pub(crate) fn soft_light(b: f32, s: f32) -> f32 {
    if s <= 0.5 {
        b - (1.0 - 2.0 * s) * b * (1.0 - b)
    } else {
        b + (2.0 * s - 1.0) * (soft_light_d(b) - b)
    }
}

fn soft_light_d(x: f32) -> f32 {
    if x <= 0.25 {
        ((16.0 * x - 12.0) * x + 4.0) * x
    } else {
        x.sqrt()
    }
}

fn difference(b: f32, s: f32) -> f32 {
    (b - s).abs()
}

fn exclusion(b: f32, s: f32) -> f32 {
    b + s - 2.0 * b * s
}

// The upper branch returns 255, not 1.
pub(crate) fn divide(b: f32, s: f32) -> f32 {
    if b == 0.0 {
        0.0
    } else if b >= s {
        255.0
    } else {
        b / s
    }
}

// Non-separable helpers. Luminosity and saturation are computed in f64 and
// narrowed when written back to a channel.

pub(crate) fn lum(c: Color) -> f64 {
    0.3 * c.r as f64 + 0.59 * c.g as f64 + 0.11 * c.b as f64
}

pub(crate) fn sat(c: Color) -> f64 {
    let max = c.r.max(c.g.max(c.b));
    let min = c.r.min(c.g.min(c.b));
    max as f64 - min as f64
}

pub(crate) fn clip_color(c: Color) -> Color {
    let l = lum(c);
    let n = c.r.min(c.g.min(c.b)) as f64;
    let x = c.r.max(c.g.max(c.b)) as f64;

    let mut c = c;
    if n < 0.0 {
        c = c.map_rgb(|v| (l + ((v as f64 - l) * l) / (l - n)) as f32);
    }
    if x > 1.0 {
        c = c.map_rgb(|v| (l + ((v as f64 - l) * (1.0 - l)) / (x - l)) as f32);
    }
    c
}

pub(crate) fn set_lum(c: Color, l: f64) -> Color {
    let d = l - lum(c);
    clip_color(c.map_rgb(|v| (v as f64 + d) as f32))
}

pub(crate) fn set_sat(c: Color, s: f64) -> Color {
    let mut ch = [c.r, c.g, c.b];
    let (min, mid, max) = component_order(&ch);
    let (v_min, v_mid, v_max) = (ch[min] as f64, ch[mid] as f64, ch[max] as f64);

    if v_max > v_min {
        ch[mid] = (((v_mid - v_min) * s) / (v_max - v_min)) as f32;
        ch[max] = s as f32;
    } else {
        ch[max] = 0.0;
        ch[mid] = 0.0;
    }
    ch[min] = 0.0;

    Color::new(ch[0], ch[1], ch[2], c.a)
}

// Indices of the (min, mid, max) channels. Ties resolve toward the later
// argument for min and max. mid is the middle entry once [r, b, g] is
// sorted, with equal channels left in that order. The three indices may
// coincide.
fn component_order(ch: &[f32; 3]) -> (usize, usize, usize) {
    let lesser = |x: usize, y: usize| if ch[x] < ch[y] { x } else { y };
    let greater = |x: usize, y: usize| if ch[x] > ch[y] { x } else { y };
    let min = lesser(0, lesser(1, 2));
    let max = greater(0, greater(1, 2));

    let mut order = [0, 2, 1];
    order.sort_by(|&i, &j| ch[i].partial_cmp(&ch[j]).unwrap_or(Ordering::Equal));
    (min, order[1], max)
}

#[cfg(test)]
fn random_color(rng: &mut impl rand::Rng, alpha: f32) -> Color {
    Color::new(rng.gen(), rng.gen(), rng.gen(), alpha)
}

#[cfg(test)]
const ALL_MODES: [BlendMode; 19] = [
    BlendMode::Normal,
    BlendMode::Multiply,
    BlendMode::Screen,
    BlendMode::Overlay,
    BlendMode::Darken,
    BlendMode::Lighten,
    BlendMode::ColorDodge,
    BlendMode::ColorBurn,
    BlendMode::HardLight,
    BlendMode::SoftLight,
    BlendMode::Difference,
    BlendMode::Exclusion,
    BlendMode::Hue,
    BlendMode::Saturation,
    BlendMode::Color,
    BlendMode::Luminosity,
    BlendMode::Addition,
    BlendMode::Subtract,
    BlendMode::Divide,
];

#[test]
fn test_transparent_overlay_is_identity() {
    use rand::SeedableRng;
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    for _ in 0..200 {
        let alpha = rand::Rng::gen(&mut rng);
        let base = random_color(&mut rng, alpha);
        let overlay = random_color(&mut rng, 0.0);
        assert_eq!(blend_pixel(BlendMode::Normal, base, overlay, 1.0), base);
        // zero opacity hides any overlay
        let opaque = overlay.with_alpha(1.0);
        assert_eq!(blend_pixel(BlendMode::Normal, base, opaque, 0.0), base);
    }
}

#[test]
fn test_multiply_white_and_screen_black() {
    use rand::SeedableRng;
    let mut rng = rand::rngs::StdRng::seed_from_u64(11);
    let white = Color::new(1.0, 1.0, 1.0, 1.0);
    let black = Color::new(0.0, 0.0, 0.0, 1.0);
    for _ in 0..200 {
        let base = random_color(&mut rng, 1.0);
        assert_eq!(blend_pixel(BlendMode::Multiply, base, white, 1.0), base);
        assert_eq!(blend_pixel(BlendMode::Screen, base, black, 1.0), base);
    }
}

#[test]
fn test_normal_alpha_over() {
    let base = Color::new(0.0, 0.0, 1.0, 1.0);
    let half_red = Color::new(1.0, 0.0, 0.0, 0.5);
    let c = blend_pixel(BlendMode::Normal, base, half_red, 1.0);
    assert_eq!(c, Color::new(0.5, 0.0, 0.5, 1.0));

    let c = blend_pixel(BlendMode::Normal, Color::TRANSPARENT, half_red, 1.0);
    assert_eq!(c, Color::new(0.5, 0.0, 0.0, 0.5));

    let c = blend_pixel(BlendMode::Normal, base, half_red.with_alpha(1.0), 0.5);
    assert_eq!(c, Color::new(0.5, 0.0, 0.5, 1.0));
}

#[test]
fn test_channel_formulas() {
    assert_eq!(overlay(0.25, 1.0), hard_light(1.0, 0.25));
    assert_eq!(hard_light(0.5, 0.25), 0.25);
    assert_eq!(hard_light(0.5, 0.75), 0.75);
    assert_eq!(color_dodge(0.0, 0.9), 0.0);
    assert_eq!(color_dodge(0.5, 0.5), 1.0);
    assert_eq!(color_dodge(0.25, 0.5), 0.5);
    assert_eq!(color_burn(1.0, 0.0), 1.0);
    assert_eq!(color_burn(0.25, 0.5), 0.0);
    assert_eq!(color_burn(0.75, 0.5), 0.5);
    assert_eq!(soft_light(0.5, 0.5), 0.5);
    assert_eq!(soft_light(0.25, 1.0), 0.5);
    assert_eq!(soft_light(0.25, 0.0), 0.0625);
    assert_eq!(divide(0.0, 0.5), 0.0);
    assert_eq!(divide(0.5, 0.5), 255.0);
    assert_eq!(divide(0.25, 0.5), 0.5);
    assert_eq!(difference(0.25, 0.75), 0.5);
    assert_eq!(exclusion(0.5, 0.5), 0.5);
}

#[test]
fn test_non_separable_helpers() {
    let gray = Color::new(0.5, 0.5, 0.5, 1.0);
    assert!((lum(gray) - 0.5).abs() < 1e-6);
    assert_eq!(sat(gray), 0.0);

    // all channels tie: min, mid and max all resolve to blue
    assert_eq!(component_order(&[0.5, 0.5, 0.5]), (2, 2, 2));
    assert_eq!(component_order(&[0.9, 0.1, 0.5]), (1, 2, 0));
    assert_eq!(set_sat(gray, 0.3), Color::new(0.5, 0.5, 0.0, 1.0));

    let c = set_sat(Color::new(0.2, 0.6, 0.4, 1.0), 0.5);
    assert_eq!(c.r, 0.0);
    assert_eq!(c.g, 0.5);
    assert!((c.b - 0.25).abs() < 1e-6);

    // clip pulls out-of-range channels back toward the luminosity
    let clipped = clip_color(Color::new(1.5, 0.5, 0.5, 1.0));
    assert!(clipped.r <= 1.0 + 1e-6);
    assert!((lum(clipped) - lum(Color::new(1.5, 0.5, 0.5, 1.0))).abs() < 1e-5);
    let clipped = clip_color(Color::new(-0.5, 0.5, 0.5, 1.0));
    assert!(clipped.r >= -1e-6);

    // luminosity of the overlay applied to the hue of the base
    let red = Color::new(1.0, 0.0, 0.0, 1.0);
    let c = blend_pixel(BlendMode::Luminosity, red, gray, 1.0);
    assert!((lum(c) - 0.5).abs() < 1e-5);
}

#[test]
fn test_every_mode_produces_opaque_result_on_opaque_base() {
    let base = Color::new(0.2, 0.4, 0.6, 1.0);
    let src = Color::new(0.7, 0.3, 0.1, 1.0);
    for mode in ALL_MODES {
        let c = blend_pixel(mode, base, src, 1.0);
        assert_eq!(c.a, 1.0, "{:?}", mode);
        assert!(!c.r.is_nan() && !c.g.is_nan() && !c.b.is_nan(), "{:?}", mode);
    }
}

#[test]
fn test_blend_buckets() {
    let mut base = PixelBucket::new(2, 1);
    base.set_pixel(0, 0, Color::new(0.5, 0.5, 0.5, 1.0));
    let mut layer = PixelBucket::new(2, 1);
    layer.set_pixel(0, 0, Color::new(0.5, 1.0, 0.0, 1.0));
    layer.set_pixel(1, 0, Color::new(1.0, 1.0, 1.0, 1.0));
    blend_buckets(BlendMode::Multiply, &mut base, &layer, 1.0);
    assert_eq!(base.pixel(0, 0), Color::new(0.25, 0.5, 0.0, 1.0));
    // multiply onto transparent black stays black but gains alpha
    assert_eq!(base.pixel(1, 0), Color::new(0.0, 0.0, 0.0, 1.0));
}
