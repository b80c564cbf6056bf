use crate::pixel::Pixels;
use crate::reader::AseReader;
use crate::{AsepriteParseError, ColorDepth, Result};

use std::fmt;
use std::io::Read;

/// How a cel stores its pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CelType {
    /// Uncompressed pixel data.
    Raw,
    /// No pixel data; reuses the cel of the same layer in another frame.
    Linked,
    /// Zlib-compressed pixel data.
    Compressed,
}

/// Decoded pixel rectangle of a cel.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageContent {
    /// Width of the pixel rectangle.
    pub width: u16,
    /// Height of the pixel rectangle.
    pub height: u16,
    /// Row-major pixels in the document color depth.
    pub pixels: Pixels,
}

impl ImageContent {
    fn parse<R: Read>(
        mut reader: AseReader<R>,
        color_depth: ColorDepth,
        compressed: bool,
    ) -> Result<Self> {
        let width = reader.word()?;
        let height = reader.word()?;
        let pixel_count = width as usize * height as usize;
        let pixels = if compressed {
            Pixels::from_compressed(reader, color_depth, pixel_count)?
        } else {
            Pixels::from_raw(reader, color_depth, pixel_count)?
        };
        Ok(ImageContent {
            width,
            height,
            pixels,
        })
    }
}

impl fmt::Debug for ImageContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{}x{}, {} bytes>",
            self.width,
            self.height,
            self.pixels.byte_count()
        )
    }
}

/// Pixel source of a cel: either its own data or a link to the cel on the
/// same layer in another frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CelContent {
    /// The cel carries its own pixels (raw or compressed on disk).
    Owned(ImageContent),
    /// Pixels live in the cel at `frame` on the same layer. Resolved through
    /// [AsepriteFile::resolve_cel](crate::AsepriteFile::resolve_cel).
    Linked {
        /// Frame holding the referenced cel.
        frame: u16,
    },
}

/// A decoded cel chunk: one layer's contribution to one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CelChunk {
    /// Index of the owning layer.
    pub layer_index: u16,
    /// Horizontal canvas offset.
    pub x: i16,
    /// Vertical canvas offset (Y grows downward).
    pub y: i16,
    /// Cel opacity (0-255).
    pub opacity: u8,
    /// Storage type as found in the file.
    pub cel_type: CelType,
    /// Own pixels or link.
    pub content: CelContent,
}

impl CelChunk {
    /// Own pixel data, `None` for linked cels.
    pub fn image(&self) -> Option<&ImageContent> {
        match &self.content {
            CelContent::Owned(image) => Some(image),
            CelContent::Linked { .. } => None,
        }
    }

    /// The frame this cel links to, if it is a linked cel.
    pub fn linked_frame(&self) -> Option<u16> {
        match self.content {
            CelContent::Linked { frame } => Some(frame),
            CelContent::Owned(_) => None,
        }
    }
}

fn parse_cel_type(id: u16) -> Result<CelType> {
    match id {
        0 => Ok(CelType::Raw),
        1 => Ok(CelType::Linked),
        2 => Ok(CelType::Compressed),
        _ => Err(AsepriteParseError::InvalidInput(format!(
            "Invalid/Unsupported Cel type: {}",
            id
        ))),
    }
}

pub(crate) fn parse_chunk(data: &[u8], color_depth: ColorDepth) -> Result<CelChunk> {
    let mut reader = AseReader::new(data);
    let layer_index = reader.word()?;
    let x = reader.short()?;
    let y = reader.short()?;
    let opacity = reader.byte()?;
    let cel_type = parse_cel_type(reader.word()?)?;
    reader.skip_reserved(7)?;

    let content = match cel_type {
        CelType::Raw => CelContent::Owned(ImageContent::parse(reader, color_depth, false)?),
        CelType::Compressed => {
            CelContent::Owned(ImageContent::parse(reader, color_depth, true)?)
        }
        CelType::Linked => CelContent::Linked {
            frame: reader.word()?,
        },
    };

    Ok(CelChunk {
        layer_index,
        x,
        y,
        opacity,
        cel_type,
        content,
    })
}

/// Extra cel information (precise position and size). Carried but not used
/// for compositing.
#[derive(Debug, Clone, PartialEq)]
pub struct CelExtraChunk {
    /// Bit 0 set means the precise bounds are valid.
    pub flags: u32,
    #[allow(missing_docs)]
    pub precise_x: f64,
    #[allow(missing_docs)]
    pub precise_y: f64,
    /// Width of the cel in the sprite (scaled in real-time).
    pub width: f64,
    /// Height of the cel in the sprite.
    pub height: f64,
}

pub(crate) fn parse_extra_chunk(data: &[u8]) -> Result<CelExtraChunk> {
    let mut reader = AseReader::new(data);
    let flags = reader.dword()?;
    let precise_x = reader.fixed()?;
    let precise_y = reader.fixed()?;
    let width = reader.fixed()?;
    let height = reader.fixed()?;
    Ok(CelExtraChunk {
        flags,
        precise_x,
        precise_y,
        width,
        height,
    })
}
