use std::ops::{Add, Mul, Sub};

/// A normalized floating point color. Channels are nominally in `[0, 1]` but
/// blend results are not clamped, so values outside that range can occur.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    #[allow(missing_docs)]
    pub r: f32,
    #[allow(missing_docs)]
    pub g: f32,
    #[allow(missing_docs)]
    pub b: f32,
    #[allow(missing_docs)]
    pub a: f32,
}

impl Color {
    /// Fully transparent black. Every canvas starts out with this value.
    pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);

    /// Sentinel used for palette lookups that cannot be resolved.
    pub const MISSING: Color = Color::new(1.0, 0.0, 1.0, 1.0);

    #[allow(missing_docs)]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Color { r, g, b, a }
    }

    /// Build a color from 8-bit channels, dividing each by 255.
    pub fn from_rgba8(rgba: [u8; 4]) -> Self {
        let [r, g, b, a] = rgba;
        Color::new(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        )
    }

    /// Clamp every channel to `[0, 1]` and scale to 8 bits.
    pub fn to_rgba8(&self) -> [u8; 4] {
        [
            channel_to_u8(self.r),
            channel_to_u8(self.g),
            channel_to_u8(self.b),
            channel_to_u8(self.a),
        ]
    }

    /// Same color with a different alpha.
    pub fn with_alpha(self, a: f32) -> Self {
        Color { a, ..self }
    }

    /// Apply `f` to the red, green and blue channels. Alpha is kept.
    pub fn map_rgb<F: Fn(f32) -> f32>(self, f: F) -> Self {
        Color::new(f(self.r), f(self.g), f(self.b), self.a)
    }

    /// Combine the red, green and blue channels of two colors with `f`. Alpha
    /// is taken from `self`.
    pub fn zip_rgb<F: Fn(f32, f32) -> f32>(self, other: Color, f: F) -> Self {
        Color::new(
            f(self.r, other.r),
            f(self.g, other.g),
            f(self.b, other.b),
            self.a,
        )
    }
}

fn channel_to_u8(value: f32) -> u8 {
    if value.is_nan() {
        return 0;
    }
    (value.max(0.0).min(1.0) * 255.0).round() as u8
}

impl Add for Color {
    type Output = Color;

    fn add(self, rhs: Color) -> Color {
        Color::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b, self.a + rhs.a)
    }
}

impl Sub for Color {
    type Output = Color;

    fn sub(self, rhs: Color) -> Color {
        Color::new(self.r - rhs.r, self.g - rhs.g, self.b - rhs.b, self.a - rhs.a)
    }
}

impl Mul for Color {
    type Output = Color;

    fn mul(self, rhs: Color) -> Color {
        Color::new(self.r * rhs.r, self.g * rhs.g, self.b * rhs.b, self.a * rhs.a)
    }
}

impl Mul<f32> for Color {
    type Output = Color;

    fn mul(self, rhs: f32) -> Color {
        Color::new(self.r * rhs, self.g * rhs, self.b * rhs, self.a * rhs)
    }
}

impl Mul<Color> for f32 {
    type Output = Color;

    fn mul(self, rhs: Color) -> Color {
        rhs * self
    }
}
