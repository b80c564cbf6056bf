use crate::{reader::AseReader, AsepriteParseError, Color, ColorDepth, ColorPalette, Result};
use std::io::Read;

// From Aseprite file spec:
// PIXEL: One pixel, depending on the image pixel format:
// Grayscale: BYTE[2], each pixel have 2 bytes in the order Value, Alpha.
// Indexed: BYTE, Each pixel uses 1 byte (the index).
// RGBA: BYTE[4], each pixel have 4 bytes in this order Red, Green, Blue, Alpha.

/// Pixel data of a single cel, kept in the document's native color depth.
///
/// Indexed pixels stay unresolved until they are composited, because the
/// palette chunk may come after the cel in the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pixels {
    /// `[red, green, blue, alpha]` per pixel.
    Rgba(Vec<[u8; 4]>),
    /// `[value, alpha]` per pixel.
    Grayscale(Vec<[u8; 2]>),
    /// One palette index per pixel.
    Indexed(Vec<u8>),
}

impl Pixels {
    fn from_bytes(bytes: Vec<u8>, color_depth: ColorDepth) -> Result<Self> {
        if bytes.len() % color_depth.bytes_per_pixel() != 0 {
            return Err(AsepriteParseError::InvalidInput(format!(
                "Incorrect length of bytes for {:?} image data: {}",
                color_depth,
                bytes.len()
            )));
        }
        let pixels = match color_depth {
            ColorDepth::Indexed => Pixels::Indexed(bytes),
            ColorDepth::Grayscale => Pixels::Grayscale(
                bytes.chunks_exact(2).map(|c| [c[0], c[1]]).collect(),
            ),
            ColorDepth::Rgba => Pixels::Rgba(
                bytes
                    .chunks_exact(4)
                    .map(|c| [c[0], c[1], c[2], c[3]])
                    .collect(),
            ),
        };
        Ok(pixels)
    }

    pub(crate) fn from_raw<T: Read>(
        reader: AseReader<T>,
        color_depth: ColorDepth,
        pixel_count: usize,
    ) -> Result<Self> {
        reader
            .take_bytes(color_depth.bytes_per_pixel() * pixel_count)
            .and_then(|bytes| Self::from_bytes(bytes, color_depth))
    }

    pub(crate) fn from_compressed<T: Read>(
        reader: AseReader<T>,
        color_depth: ColorDepth,
        pixel_count: usize,
    ) -> Result<Self> {
        reader
            .unzip(color_depth.bytes_per_pixel() * pixel_count)
            .and_then(|bytes| Self::from_bytes(bytes, color_depth))
    }

    /// Number of pixels.
    pub fn len(&self) -> usize {
        match self {
            Pixels::Rgba(v) => v.len(),
            Pixels::Grayscale(v) => v.len(),
            Pixels::Indexed(v) => v.len(),
        }
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of the decoded data in bytes.
    pub fn byte_count(&self) -> usize {
        match self {
            Pixels::Rgba(v) => v.len() * 4,
            Pixels::Grayscale(v) => v.len() * 2,
            Pixels::Indexed(v) => v.len(),
        }
    }

    /// Normalized color of pixel `index`.
    ///
    /// Indexed pixels are looked up in `palette`; without a palette every
    /// indexed pixel is [Color::MISSING].
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn color(&self, index: usize, palette: Option<&ColorPalette>) -> Color {
        match self {
            Pixels::Rgba(v) => Color::from_rgba8(v[index]),
            Pixels::Grayscale(v) => {
                let [value, alpha] = v[index];
                let value = value as f32 / 255.0;
                Color::new(value, value, value, alpha as f32 / 255.0)
            }
            Pixels::Indexed(v) => match palette {
                Some(palette) => palette.color(v[index]),
                None => Color::MISSING,
            },
        }
    }

    /// Resolve every pixel, see [Pixels::color].
    pub fn colors(&self, palette: Option<&ColorPalette>) -> Vec<Color> {
        (0..self.len()).map(|i| self.color(i, palette)).collect()
    }
}
