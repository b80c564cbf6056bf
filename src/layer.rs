use crate::{reader::AseReader, AsepriteParseError, Result};
use bitflags::bitflags;

/// Types of layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerType {
    /// A regular image layer.
    Normal,
    /// A layer that groups other layers and does not contain any image data.
    /// Groups are never painted directly.
    Group,
}

bitflags! {
    /// Layer flags as stored in the layer chunk.
    pub struct LayerFlags: u16 {
        /// Layer is visible (eye icon is enabled).
        const VISIBLE = 0x0001;
        /// Layer can be modified (lock icon is disabled).
        const EDITABLE = 0x0002;
        /// Layer cannot be moved.
        const MOVEMENT_LOCKED = 0x0004;
        /// Layer is background (stack order cannot be changed).
        const BACKGROUND = 0x0008;
        /// Prefer to link cels when the user copies them.
        const CONTINUOUS = 0x0010;
        /// Prefer to show this group layer collapsed.
        const COLLAPSED = 0x0020;
        /// This is a reference layer.
        const REFERENCE = 0x0040;
    }
}

/// Describes how a layer is combined with the layers underneath it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum BlendMode {
    Normal,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
    Hue,
    Saturation,
    Color,
    Luminosity,
    Addition,
    Subtract,
    Divide,
}

/// Prefix marking a layer as metadata. Such layers are never rendered into the
/// visual output.
pub const METADATA_PREFIX: char = '@';

/// A decoded layer chunk.
#[derive(Debug, Clone)]
pub struct LayerChunk {
    /// Layer flags.
    pub flags: LayerFlags,
    /// Regular layer or group.
    pub layer_type: LayerType,
    /// Nesting depth. Top-level layers have level 0.
    pub child_level: u16,
    /// Blend mode used when compositing this layer.
    pub blend_mode: BlendMode,
    /// Layer opacity (0-255).
    pub opacity: u8,
    /// Name as shown in the timeline.
    pub name: String,
}

impl LayerChunk {
    /// Shortcut for `.flags.contains(LayerFlags::VISIBLE)`. Does not take
    /// parent groups into account, see [effective_visibility].
    pub fn is_visible(&self) -> bool {
        self.flags.contains(LayerFlags::VISIBLE)
    }

    #[allow(missing_docs)]
    pub fn is_editable(&self) -> bool {
        self.flags.contains(LayerFlags::EDITABLE)
    }

    #[allow(missing_docs)]
    pub fn is_background(&self) -> bool {
        self.flags.contains(LayerFlags::BACKGROUND)
    }

    /// Layers whose name starts with `@` carry metadata instead of artwork.
    pub fn is_metadata(&self) -> bool {
        self.name.starts_with(METADATA_PREFIX)
    }
}

pub(crate) fn parse_chunk(data: &[u8]) -> Result<LayerChunk> {
    let mut reader = AseReader::new(data);

    let flags = reader.word()?;
    let layer_type = reader.word()?;
    let child_level = reader.word()?;
    let _default_width = reader.word()?;
    let _default_height = reader.word()?;
    let blend_mode = reader.word()?;
    let opacity = reader.byte()?;
    reader.skip_reserved(3)?;
    let name = reader.string()?;

    Ok(LayerChunk {
        flags: LayerFlags::from_bits_truncate(flags),
        layer_type: parse_layer_type(layer_type)?,
        child_level,
        blend_mode: parse_blend_mode(blend_mode)?,
        opacity,
        name,
    })
}

fn parse_layer_type(id: u16) -> Result<LayerType> {
    match id {
        0 => Ok(LayerType::Normal),
        1 => Ok(LayerType::Group),
        _ => Err(AsepriteParseError::InvalidInput(format!(
            "Invalid layer type: {}",
            id
        ))),
    }
}

fn parse_blend_mode(id: u16) -> Result<BlendMode> {
    match id {
        0 => Ok(BlendMode::Normal),
        1 => Ok(BlendMode::Multiply),
        2 => Ok(BlendMode::Screen),
        3 => Ok(BlendMode::Overlay),
        4 => Ok(BlendMode::Darken),
        5 => Ok(BlendMode::Lighten),
        6 => Ok(BlendMode::ColorDodge),
        7 => Ok(BlendMode::ColorBurn),
        8 => Ok(BlendMode::HardLight),
        9 => Ok(BlendMode::SoftLight),
        10 => Ok(BlendMode::Difference),
        11 => Ok(BlendMode::Exclusion),
        12 => Ok(BlendMode::Hue),
        13 => Ok(BlendMode::Saturation),
        14 => Ok(BlendMode::Color),
        15 => Ok(BlendMode::Luminosity),
        16 => Ok(BlendMode::Addition),
        17 => Ok(BlendMode::Subtract),
        18 => Ok(BlendMode::Divide),
        _ => Err(AsepriteParseError::InvalidInput(format!(
            "Invalid/Unsupported blend mode: {}",
            id
        ))),
    }
}

/// Index of the parent group of `layers[index]`.
///
/// Layers are stored flat in document order; the parent is the nearest
/// preceding layer whose child level is exactly one less.
pub fn parent_index(layers: &[&LayerChunk], index: usize) -> Option<usize> {
    let level = layers.get(index)?.child_level;
    if level == 0 {
        return None;
    }
    (0..index)
        .rev()
        .find(|&candidate| layers[candidate].child_level == level - 1)
}

/// A layer is visible if it and every ancestor group has the visible flag.
pub fn effective_visibility(layers: &[&LayerChunk], index: usize) -> bool {
    let mut current = Some(index);
    while let Some(id) = current {
        match layers.get(id) {
            Some(layer) if layer.is_visible() => current = parent_index(layers, id),
            _ => return false,
        }
    }
    true
}
