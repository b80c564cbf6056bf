use crate::{reader::AseReader, AsepriteParseError, Color, Result};
use nohash::IntMap;

/// The color palette embedded in the file.
#[derive(Debug, Clone)]
pub struct ColorPalette {
    declared_size: u32,
    first_color_index: u32,
    last_color_index: u32,
    entries: IntMap<u32, ColorPaletteEntry>,
}

/// A single entry in a [ColorPalette].
#[derive(Debug, Clone)]
pub struct ColorPaletteEntry {
    id: u32,
    flags: u16,
    rgba8: [u8; 4],
    name: Option<String>,
}

impl ColorPalette {
    /// Total number of colors stored in this chunk.
    pub fn num_colors(&self) -> u32 {
        self.entries.len() as u32
    }

    /// New palette size as declared by the chunk (total entries of the full
    /// palette, which may be larger than the entries carried here).
    pub fn declared_size(&self) -> u32 {
        self.declared_size
    }

    /// First index covered by this chunk.
    pub fn first_color_index(&self) -> u32 {
        self.first_color_index
    }

    /// Last index (inclusive) covered by this chunk.
    pub fn last_color_index(&self) -> u32 {
        self.last_color_index
    }

    /// Look up entry at given index.
    pub fn get(&self, index: u32) -> Option<&ColorPaletteEntry> {
        self.entries.get(&index)
    }

    /// Resolve a pixel index to a normalized color.
    ///
    /// Indexes outside `[first_color_index, last_color_index]` (or inside the
    /// range but missing from the chunk) yield [Color::MISSING].
    pub fn color(&self, index: u8) -> Color {
        let index = index as u32;
        if index < self.first_color_index || index > self.last_color_index {
            return Color::MISSING;
        }
        self.entries
            .get(&index)
            .map(ColorPaletteEntry::color)
            .unwrap_or(Color::MISSING)
    }
}

impl ColorPaletteEntry {
    /// The id of this entry is the same as its index in the palette.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Entry flags. Bit 0 means the entry has a name.
    pub fn flags(&self) -> u16 {
        self.flags
    }

    /// Get the RGBA components as an array.
    pub fn raw_rgba8(&self) -> [u8; 4] {
        self.rgba8
    }

    /// The entry as a normalized color.
    pub fn color(&self) -> Color {
        Color::from_rgba8(self.rgba8)
    }

    #[allow(missing_docs)]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

pub(crate) fn parse_chunk(data: &[u8]) -> Result<ColorPalette> {
    let mut reader = AseReader::new(data);

    let declared_size = reader.dword()?;
    let first_color_index = reader.dword()?;
    let last_color_index = reader.dword()?;
    reader.skip_reserved(8)?;

    if last_color_index < first_color_index {
        return Err(AsepriteParseError::InvalidInput(format!(
            "Bad palette color indices: first={} last={}",
            first_color_index, last_color_index,
        )));
    }

    let count = last_color_index - first_color_index + 1;
    let mut entries = IntMap::default();

    for offset in 0..count {
        let flags = reader.word()?;
        let red = reader.byte()?;
        let green = reader.byte()?;
        let blue = reader.byte()?;
        let alpha = reader.byte()?;
        let name = if flags & 1 == 1 {
            Some(reader.string()?)
        } else {
            None
        };
        let id = first_color_index + offset;
        entries.insert(
            id,
            ColorPaletteEntry {
                id,
                flags,
                rgba8: [red, green, blue, alpha],
                name,
            },
        );
    }

    Ok(ColorPalette {
        declared_size,
        first_color_index,
        last_color_index,
        entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(first: u32, colors: &[[u8; 4]]) -> Vec<u8> {
        let last = first + colors.len() as u32 - 1;
        let mut data = Vec::new();
        data.extend_from_slice(&(last + 1).to_le_bytes());
        data.extend_from_slice(&first.to_le_bytes());
        data.extend_from_slice(&last.to_le_bytes());
        data.extend_from_slice(&[0; 8]);
        for c in colors {
            data.extend_from_slice(&0_u16.to_le_bytes());
            data.extend_from_slice(c);
        }
        data
    }

    #[test]
    fn out_of_range_index_is_magenta() {
        let palette = parse_chunk(&chunk(2, &[[0, 255, 0, 255], [0, 0, 255, 255]])).unwrap();
        assert_eq!(palette.num_colors(), 2);
        assert_eq!(palette.color(2), Color::new(0.0, 1.0, 0.0, 1.0));
        assert_eq!(palette.color(3), Color::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(palette.color(1), Color::MISSING);
        assert_eq!(palette.color(4), Color::MISSING);
    }

    #[test]
    fn named_entries() {
        let mut data = Vec::new();
        data.extend_from_slice(&1_u32.to_le_bytes());
        data.extend_from_slice(&0_u32.to_le_bytes());
        data.extend_from_slice(&0_u32.to_le_bytes());
        data.extend_from_slice(&[0; 8]);
        data.extend_from_slice(&1_u16.to_le_bytes());
        data.extend_from_slice(&[10, 20, 30, 40]);
        data.extend_from_slice(&3_u16.to_le_bytes());
        data.extend_from_slice(b"sky");
        let palette = parse_chunk(&data).unwrap();
        let entry = palette.get(0).unwrap();
        assert_eq!(entry.name(), Some("sky"));
        assert_eq!(entry.raw_rgba8(), [10, 20, 30, 40]);
    }
}
