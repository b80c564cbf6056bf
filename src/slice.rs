use crate::{reader::AseReader, Result};
use bitflags::bitflags;

bitflags! {
    /// Which optional sub-records every key of a slice carries.
    pub struct SliceFlags: u32 {
        /// Keys carry a nine-patch center rectangle.
        const NINE_PATCH = 0x0001;
        /// Keys carry a pivot point.
        const PIVOT = 0x0002;
    }
}

/// A named region of the canvas, possibly changing over time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slice {
    /// Name of the slice. Not guaranteed to be unique.
    pub name: String,
    #[allow(missing_docs)]
    pub flags: SliceFlags,
    /// Keyframes, ordered by `from_frame`.
    pub keys: Vec<SliceKey>,
}

impl Slice {
    /// The key in effect at `frame`: the latest key starting at or before it.
    pub fn key_for_frame(&self, frame: u32) -> Option<&SliceKey> {
        self.keys.iter().filter(|k| k.from_frame <= frame).last()
    }
}

/// Slice geometry valid from `from_frame` onward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceKey {
    /// First frame this key applies to.
    pub from_frame: u32,
    /// Left edge in canvas coordinates.
    pub x: i32,
    /// Top edge in canvas coordinates (Y grows downward).
    pub y: i32,
    #[allow(missing_docs)]
    pub width: u32,
    #[allow(missing_docs)]
    pub height: u32,
    /// Center rectangle, relative to the slice origin.
    pub nine_patch: Option<NinePatch>,
    /// Pivot, relative to the slice origin.
    pub pivot: Option<(i32, i32)>,
}

/// Stretchable center rectangle of a 9-patch slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct NinePatch {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl NinePatch {
    /// Border widths `[left, bottom, right, top]` inside a slice of the given
    /// size.
    pub fn border(&self, slice_width: u32, slice_height: u32) -> [i32; 4] {
        let left = self.x;
        let top = self.y;
        let right = slice_width as i32 - (self.x + self.width as i32);
        let bottom = slice_height as i32 - (self.y + self.height as i32);
        [left, bottom, right, top]
    }
}

pub(crate) fn parse_chunk(data: &[u8]) -> Result<Slice> {
    let mut reader = AseReader::new(data);

    let num_keys = reader.dword()?;
    let flags = SliceFlags::from_bits_truncate(reader.dword()?);
    let _reserved = reader.dword()?;
    let name = reader.string()?;

    // a key is at least 20 bytes
    let mut keys = Vec::with_capacity((num_keys as usize).min(data.len() / 20));
    for _ in 0..num_keys {
        let from_frame = reader.dword()?;
        let x = reader.long()?;
        let y = reader.long()?;
        let width = reader.dword()?;
        let height = reader.dword()?;
        let nine_patch = if flags.contains(SliceFlags::NINE_PATCH) {
            Some(NinePatch {
                x: reader.long()?,
                y: reader.long()?,
                width: reader.dword()?,
                height: reader.dword()?,
            })
        } else {
            None
        };
        let pivot = if flags.contains(SliceFlags::PIVOT) {
            Some((reader.long()?, reader.long()?))
        } else {
            None
        };
        keys.push(SliceKey {
            from_frame,
            x,
            y,
            width,
            height,
            nine_patch,
            pivot,
        });
    }

    Ok(Slice { name, flags, keys })
}
