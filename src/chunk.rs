use crate::cel::{self, CelChunk, CelExtraChunk};
use crate::layer::{self, LayerChunk};
use crate::palette::{self, ColorPalette};
use crate::reader::AseReader;
use crate::slice::{self, Slice};
use crate::tags::{self, Tag};
use crate::{AsepriteParseError, ColorDepth, Result};
use log::{debug, warn};
use std::io::Read;

pub(crate) const CHUNK_HEADER_SIZE: usize = 6;

/// Chunk type tags known to the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkType {
    /// 0x0004, deprecated.
    OldPalette04,
    /// 0x0011, deprecated.
    OldPalette11,
    #[allow(missing_docs)]
    Layer,
    #[allow(missing_docs)]
    Cel,
    #[allow(missing_docs)]
    CelExtra,
    #[allow(missing_docs)]
    ColorProfile,
    #[allow(missing_docs)]
    ExternalFiles,
    /// 0x2016, deprecated.
    Mask,
    /// 0x2017, never used.
    Path,
    #[allow(missing_docs)]
    Tags,
    #[allow(missing_docs)]
    Palette,
    #[allow(missing_docs)]
    UserData,
    #[allow(missing_docs)]
    Slice,
    #[allow(missing_docs)]
    Tileset,
}

impl ChunkType {
    /// Look up a type tag. Returns `None` for tags this decoder has never
    /// heard of.
    pub fn from_code(code: u16) -> Option<Self> {
        let chunk_type = match code {
            0x0004 => ChunkType::OldPalette04,
            0x0011 => ChunkType::OldPalette11,
            0x2004 => ChunkType::Layer,
            0x2005 => ChunkType::Cel,
            0x2006 => ChunkType::CelExtra,
            0x2007 => ChunkType::ColorProfile,
            0x2008 => ChunkType::ExternalFiles,
            0x2016 => ChunkType::Mask,
            0x2017 => ChunkType::Path,
            0x2018 => ChunkType::Tags,
            0x2019 => ChunkType::Palette,
            0x2020 => ChunkType::UserData,
            0x2022 => ChunkType::Slice,
            0x2023 => ChunkType::Tileset,
            _ => return None,
        };
        Some(chunk_type)
    }

    /// The on-disk type tag.
    pub fn code(&self) -> u16 {
        match self {
            ChunkType::OldPalette04 => 0x0004,
            ChunkType::OldPalette11 => 0x0011,
            ChunkType::Layer => 0x2004,
            ChunkType::Cel => 0x2005,
            ChunkType::CelExtra => 0x2006,
            ChunkType::ColorProfile => 0x2007,
            ChunkType::ExternalFiles => 0x2008,
            ChunkType::Mask => 0x2016,
            ChunkType::Path => 0x2017,
            ChunkType::Tags => 0x2018,
            ChunkType::Palette => 0x2019,
            ChunkType::UserData => 0x2020,
            ChunkType::Slice => 0x2022,
            ChunkType::Tileset => 0x2023,
        }
    }
}

/// A decoded chunk. Chunk types without a variant here are skipped while
/// reading.
#[derive(Debug, Clone)]
#[allow(missing_docs)]
pub enum Chunk {
    Layer(LayerChunk),
    Cel(CelChunk),
    CelExtra(CelExtraChunk),
    FrameTags(Vec<Tag>),
    Palette(ColorPalette),
    Slice(Slice),
}

impl Chunk {
    /// Type tag of this chunk.
    pub fn chunk_type(&self) -> ChunkType {
        match self {
            Chunk::Layer(_) => ChunkType::Layer,
            Chunk::Cel(_) => ChunkType::Cel,
            Chunk::CelExtra(_) => ChunkType::CelExtra,
            Chunk::FrameTags(_) => ChunkType::Tags,
            Chunk::Palette(_) => ChunkType::Palette,
            Chunk::Slice(_) => ChunkType::Slice,
        }
    }
}

/// Record types that can be extracted from a [Chunk], used for typed lookups
/// such as [Frame::chunks_of](crate::Frame::chunks_of).
pub trait ChunkKind: 'static {
    /// Borrow the record if `chunk` holds this kind.
    fn from_chunk(chunk: &Chunk) -> Option<&Self>;
}

macro_rules! chunk_kind {
    ($ty:ty, $variant:ident) => {
        impl ChunkKind for $ty {
            fn from_chunk(chunk: &Chunk) -> Option<&Self> {
                match chunk {
                    Chunk::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

chunk_kind!(LayerChunk, Layer);
chunk_kind!(CelChunk, Cel);
chunk_kind!(CelExtraChunk, CelExtra);
chunk_kind!(Vec<Tag>, FrameTags);
chunk_kind!(ColorPalette, Palette);
chunk_kind!(Slice, Slice);

/// Read one chunk record and advance the reader past it, whether or not the
/// chunk is understood.
///
/// Returns `Ok(None)` for unknown or ignored chunk types and for known chunks
/// whose record is malformed, including records shorter than their fields or
/// corrupt compressed pixels. Errors are reserved for problems that leave the
/// stream position unknown (short reads, a size field that overruns the
/// frame).
pub(crate) fn read_chunk<R: Read>(
    reader: &mut AseReader<R>,
    bytes_available: &mut i64,
    color_depth: ColorDepth,
) -> Result<Option<Chunk>> {
    let chunk_size = reader.dword()?;
    let type_code = reader.word()?;

    check_chunk_bytes(chunk_size, *bytes_available)?;

    let data = reader.bytes(chunk_size as usize - CHUNK_HEADER_SIZE)?;
    *bytes_available -= chunk_size as i64;

    let chunk_type = match ChunkType::from_code(type_code) {
        Some(chunk_type) => chunk_type,
        None => {
            debug!("Ignoring unknown chunk type: 0x{:04x}", type_code);
            return Ok(None);
        }
    };

    // the record is fully buffered, so a bad payload never desyncs the stream
    match decode_chunk(chunk_type, &data, color_depth) {
        Ok(chunk) => Ok(chunk),
        Err(err) => {
            warn!("Dropping malformed {:?} chunk: {}", chunk_type, err);
            Ok(None)
        }
    }
}

fn decode_chunk(
    chunk_type: ChunkType,
    data: &[u8],
    color_depth: ColorDepth,
) -> Result<Option<Chunk>> {
    let chunk = match chunk_type {
        ChunkType::Layer => Chunk::Layer(layer::parse_chunk(data)?),
        ChunkType::Cel => Chunk::Cel(cel::parse_chunk(data, color_depth)?),
        ChunkType::CelExtra => Chunk::CelExtra(cel::parse_extra_chunk(data)?),
        ChunkType::Tags => Chunk::FrameTags(tags::parse_chunk(data)?),
        ChunkType::Palette => Chunk::Palette(palette::parse_chunk(data)?),
        ChunkType::Slice => Chunk::Slice(slice::parse_chunk(data)?),
        ChunkType::OldPalette04
        | ChunkType::OldPalette11
        | ChunkType::ColorProfile
        | ChunkType::ExternalFiles
        | ChunkType::Mask
        | ChunkType::Path
        | ChunkType::UserData
        | ChunkType::Tileset => {
            debug!("Ignoring unsupported chunk type: {:?}", chunk_type);
            return Ok(None);
        }
    };
    Ok(Some(chunk))
}

fn check_chunk_bytes(chunk_size: u32, bytes_available: i64) -> Result<()> {
    if (chunk_size as usize) < CHUNK_HEADER_SIZE {
        return Err(AsepriteParseError::InvalidInput(format!(
            "Chunk size is too small {}, minimum_size: {}",
            chunk_size, CHUNK_HEADER_SIZE
        )));
    }
    if chunk_size as i64 > bytes_available {
        return Err(AsepriteParseError::InvalidInput(format!(
            "Trying to read chunk of size {}, but there are only {} bytes available in the frame",
            chunk_size, bytes_available
        )));
    }
    Ok(())
}
