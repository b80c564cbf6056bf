use crate::{reader::AseReader, AsepriteParseError, Result};
use std::io::Read;

/// Size of the file header in bytes.
pub const HEADER_SIZE: usize = 128;

const HEADER_MAGIC: u16 = 0xA5E0;

/// Color depth of the document. All cels store pixels in this format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorDepth {
    /// 32 bpp: red, green, blue and alpha with 8 bits each.
    Rgba,
    /// 16 bpp: 8 bit value and 8 bit alpha.
    Grayscale,
    /// 8 bpp: one palette index per pixel.
    Indexed,
}

impl ColorDepth {
    /// Number of bytes to store one pixel.
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            ColorDepth::Rgba => 4,
            ColorDepth::Grayscale => 2,
            ColorDepth::Indexed => 1,
        }
    }

    /// Bits per pixel as stored in the header.
    pub fn bits(&self) -> u16 {
        self.bytes_per_pixel() as u16 * 8
    }

    fn from_bits(bits: u16) -> Result<Self> {
        match bits {
            32 => Ok(ColorDepth::Rgba),
            16 => Ok(ColorDepth::Grayscale),
            8 => Ok(ColorDepth::Indexed),
            _ => Err(AsepriteParseError::UnsupportedColorDepth(bits)),
        }
    }
}

/// The 128-byte file header.
#[derive(Debug, Clone)]
pub struct Header {
    /// Declared file size in bytes.
    pub file_size: u32,
    /// Number of frames declared by the header.
    pub frames: u16,
    /// Canvas width in pixels.
    pub width: u16,
    /// Canvas height in pixels.
    pub height: u16,
    /// Pixel format of every cel in the file.
    pub color_depth: ColorDepth,
    /// Header flags. Bit 0 set means layer opacity is valid.
    pub flags: u32,
    /// Deprecated global frame speed in milliseconds.
    pub speed: u16,
    /// Palette entry that represents transparency (indexed files only).
    pub transparent_index: u8,
    /// Number of colors. `0` means 256 for old sprites.
    pub color_count: u16,
    /// Pixel aspect ratio numerator.
    pub pixel_width: u8,
    /// Pixel aspect ratio denominator.
    pub pixel_height: u8,
}

impl Header {
    /// The magic number every valid header carries at offset 4.
    pub const MAGIC_NUMBER: u16 = HEADER_MAGIC;

    /// Decode a header from exactly the first 128 bytes of a file.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(AsepriteParseError::InvalidInput(format!(
                "Header needs {} bytes, got {}",
                HEADER_SIZE,
                bytes.len()
            )));
        }
        let mut reader = AseReader::new(&bytes[..HEADER_SIZE]);
        Self::read(&mut reader)
    }

    pub(crate) fn read<R: Read>(reader: &mut AseReader<R>) -> Result<Self> {
        let file_size = reader.dword()?;
        let magic_number = reader.word()?;
        if magic_number != HEADER_MAGIC {
            return Err(AsepriteParseError::BadMagic {
                what: "header",
                expected: HEADER_MAGIC,
                found: magic_number,
            });
        }
        let frames = reader.word()?;
        let width = reader.word()?;
        let height = reader.word()?;
        let color_depth = ColorDepth::from_bits(reader.word()?)?;
        let flags = reader.dword()?;
        let speed = reader.word()?;
        let _zero1 = reader.dword()?;
        let _zero2 = reader.dword()?;
        let transparent_index = reader.byte()?;
        reader.skip_reserved(3)?;
        let color_count = reader.word()?;
        let pixel_width = reader.byte()?;
        let pixel_height = reader.byte()?;
        // grid position and size, then reserved space
        reader.skip_reserved(92)?;

        Ok(Header {
            file_size,
            frames,
            width,
            height,
            color_depth,
            flags,
            speed,
            transparent_index,
            color_count,
            pixel_width,
            pixel_height,
        })
    }

    /// Number of pixels on the canvas.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}
