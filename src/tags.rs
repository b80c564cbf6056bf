use crate::{reader::AseReader, AsepriteParseError, Result};

/// A tag is a grouping of one or more frames. It defines one animation clip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Tag name. May not be unique among all tags.
    pub name: String,
    /// First frame included in the tag.
    pub from_frame: u16,
    /// Last frame included in the tag (inclusive).
    pub to_frame: u16,
    /// Playback direction.
    pub direction: AnimationDirection,
    /// Display color in the timeline, as RGB.
    pub color: [u8; 3],
}

impl Tag {
    /// Number of frames covered by the tag.
    pub fn frame_count(&self) -> usize {
        (self.to_frame as usize + 1).saturating_sub(self.from_frame as usize)
    }

    /// Frame indices in playback order. `Reverse` tags run backwards;
    /// `PingPong` yields the forward half only.
    pub fn frames(&self) -> Vec<u16> {
        let forward = self.from_frame..=self.to_frame;
        match self.direction {
            AnimationDirection::Reverse => forward.rev().collect(),
            AnimationDirection::Forward | AnimationDirection::PingPong => forward.collect(),
        }
    }
}

/// Describes how the tag's frames should be played back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationDirection {
    /// Start to end, then jump back to start.
    Forward,
    /// End to start, then jump back to end.
    Reverse,
    /// Start to end, then back to start.
    PingPong,
}

pub(crate) fn parse_chunk(data: &[u8]) -> Result<Vec<Tag>> {
    let mut reader = AseReader::new(data);

    let num_tags = reader.word()?;
    reader.skip_reserved(8)?;

    let mut result = Vec::with_capacity(num_tags as usize);
    for _tag in 0..num_tags {
        let from_frame = reader.word()?;
        let to_frame = reader.word()?;
        let direction = parse_animation_direction(reader.byte()?)?;
        reader.skip_reserved(8)?;
        let mut color = [0_u8; 3];
        reader.read_exact(&mut color)?;
        let _extra = reader.byte()?;
        let name = reader.string()?;
        result.push(Tag {
            name,
            from_frame,
            to_frame,
            direction,
            color,
        });
    }

    Ok(result)
}

fn parse_animation_direction(id: u8) -> Result<AnimationDirection> {
    match id {
        0 => Ok(AnimationDirection::Forward),
        1 => Ok(AnimationDirection::Reverse),
        2 => Ok(AnimationDirection::PingPong),
        _ => Err(AsepriteParseError::InvalidInput(format!(
            "Unknown animation direction: {}",
            id
        ))),
    }
}
