use crate::cel::CelChunk;
use crate::chunk::{self, Chunk, ChunkKind};
use crate::reader::AseReader;
use crate::{AsepriteParseError, ColorDepth, Result};
use log::debug;
use std::io::Read;

/// Size of the frame header in bytes.
pub const FRAME_HEADER_SIZE: usize = 16;

const FRAME_MAGIC: u16 = 0xF1FA;

/// A single frame: a duration plus every chunk decoded from its record.
#[derive(Debug, Clone)]
pub struct Frame {
    length: u32,
    duration_ms: u16,
    chunks_count: u32,
    chunks: Vec<Chunk>,
}

impl Frame {
    pub(crate) fn read<R: Read>(
        reader: &mut AseReader<R>,
        color_depth: ColorDepth,
    ) -> Result<Self> {
        let length = reader.dword()?;
        let magic_number = reader.word()?;
        if magic_number != FRAME_MAGIC {
            return Err(AsepriteParseError::BadMagic {
                what: "frame",
                expected: FRAME_MAGIC,
                found: magic_number,
            });
        }
        let old_num_chunks = reader.word()?;
        let duration_ms = reader.word()?;
        reader.skip_reserved(2)?;
        let new_num_chunks = reader.dword()?;

        let chunks_count = if new_num_chunks == 0 {
            old_num_chunks as u32
        } else {
            new_num_chunks
        };

        let mut bytes_available = length as i64 - FRAME_HEADER_SIZE as i64;
        if bytes_available < 0 {
            return Err(AsepriteParseError::InvalidInput(format!(
                "Frame length {} is smaller than its header",
                length
            )));
        }

        // every chunk takes at least its 6 byte header
        let capacity = (chunks_count as usize).min(bytes_available as usize / 6);
        let mut chunks = Vec::with_capacity(capacity);
        for _ in 0..chunks_count {
            if let Some(chunk) = chunk::read_chunk(reader, &mut bytes_available, color_depth)? {
                chunks.push(chunk);
            }
        }
        if bytes_available > 0 {
            debug!("Skipping {} trailing bytes in frame", bytes_available);
            reader.skip_reserved(bytes_available as usize)?;
        }

        Ok(Frame {
            length,
            duration_ms,
            chunks_count,
            chunks,
        })
    }

    /// Total byte length of the frame record, header included.
    pub fn length(&self) -> u32 {
        self.length
    }

    /// Frame duration in milliseconds.
    pub fn duration(&self) -> u16 {
        self.duration_ms
    }

    /// Number of chunk records declared by the frame header. Skipped and
    /// dropped chunks count toward this number.
    pub fn chunks_count(&self) -> u32 {
        self.chunks_count
    }

    /// Decoded chunks in stream order.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// All chunks of one kind, in stream order.
    ///
    /// ```
    /// # use asebake::{Frame, LayerChunk};
    /// fn layer_names(frame: &Frame) -> Vec<&str> {
    ///     frame.chunks_of::<LayerChunk>().map(|l| l.name.as_str()).collect()
    /// }
    /// ```
    pub fn chunks_of<T: ChunkKind>(&self) -> impl Iterator<Item = &T> + '_ {
        self.chunks.iter().filter_map(T::from_chunk)
    }

    /// The first chunk of one kind.
    pub fn first_chunk_of<T: ChunkKind>(&self) -> Option<&T> {
        self.chunks_of::<T>().next()
    }

    /// The cel drawn on `layer_index` in this frame, if any.
    pub fn cel_for_layer(&self, layer_index: u16) -> Option<&CelChunk> {
        self.chunks_of::<CelChunk>()
            .find(|cel| cel.layer_index == layer_index)
    }
}
