use crate::Color;
use image::RgbaImage;

/// A dense `width * height` grid of [Color]s, stored row-major with row 0 at
/// the top.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBucket {
    width: usize,
    height: usize,
    pixels: Vec<Color>,
    /// Free-form label, e.g. the frame index or `{layer}_{cel}`.
    pub name: String,
}

impl PixelBucket {
    /// A fully transparent bucket.
    pub fn new(width: usize, height: usize) -> Self {
        PixelBucket {
            width,
            height,
            pixels: vec![Color::TRANSPARENT; width * height],
            name: String::new(),
        }
    }

    /// Wrap existing pixel data. Returns `None` if the length does not match.
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<Color>) -> Option<Self> {
        if pixels.len() != width * height {
            return None;
        }
        Some(PixelBucket {
            width,
            height,
            pixels,
            name: String::new(),
        })
    }

    #[allow(missing_docs)]
    pub fn width(&self) -> usize {
        self.width
    }

    #[allow(missing_docs)]
    pub fn height(&self) -> usize {
        self.height
    }

    /// All pixels, row-major.
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the bucket.
    pub fn pixel(&self, x: usize, y: usize) -> Color {
        self.pixels[self.index(x, y)]
    }

    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the bucket.
    pub fn set_pixel(&mut self, x: usize, y: usize, color: Color) {
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut [Color] {
        &mut self.pixels
    }

    /// Copy `source` so that its top-left pixel lands on `(x, y)`. Pixels
    /// falling outside this bucket are dropped.
    pub fn blit(&mut self, source: &PixelBucket, x: usize, y: usize) {
        for sy in 0..source.height {
            let ty = y + sy;
            if ty >= self.height {
                break;
            }
            for sx in 0..source.width {
                let tx = x + sx;
                if tx >= self.width {
                    break;
                }
                self.set_pixel(tx, ty, source.pixel(sx, sy));
            }
        }
    }

    /// Mirror left to right.
    pub fn flip_horizontal(&mut self) {
        for row in self.pixels.chunks_mut(self.width.max(1)) {
            row.reverse();
        }
    }

    /// Mirror top to bottom.
    pub fn flip_vertical(&mut self) {
        let (w, h) = (self.width, self.height);
        for y in 0..h / 2 {
            for x in 0..w {
                self.pixels.swap(y * w + x, (h - 1 - y) * w + x);
            }
        }
    }

    /// Flat RGBA8 buffer, four bytes per pixel.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|c| c.to_rgba8()).collect()
    }

    /// Convert into an `image::RgbaImage`.
    pub fn to_image(&self) -> RgbaImage {
        RgbaImage::from_raw(self.width as u32, self.height as u32, self.to_rgba8())
            .expect("buffer length always matches width * height * 4")
    }

    fn index(&self, x: usize, y: usize) -> usize {
        assert!(
            x < self.width && y < self.height,
            "pixel ({}, {}) outside {}x{} bucket",
            x,
            y,
            self.width,
            self.height
        );
        y * self.width + x
    }
}
