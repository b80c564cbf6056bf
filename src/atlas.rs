/*!
Lay composited frames out in a grid texture and describe the result.

Atlas coordinates have their origin at the bottom-left: row 0 of the grid
is the bottom-most row of cells. Pixel storage inside a [PixelBucket] is
still row-major from the top, so the flip happens only when a frame is
copied into its cell.
*/
use crate::{AsepriteFile, PixelBucket, Tag};
use log::warn;

/// How frames are arranged in the atlas grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "import", derive(serde::Serialize, serde::Deserialize))]
pub enum GridPolicy {
    /// All frames in one row.
    SingleRow,
    /// One frame per row, i.e. a single column.
    FrameAsRow,
    /// A roughly square grid, see [grid_size].
    #[default]
    Square,
}

/// Grid dimensions `(columns, rows)` for `frame_count` frames.
///
/// For [GridPolicy::Square] the row count starts at one and grows while the
/// grid is wider than tall. When growth stops on a grid that is taller than
/// wide, the last step is undone. Finally unused rows are dropped.
///
/// ```
/// # use asebake::atlas::{grid_size, GridPolicy};
/// assert_eq!(grid_size(GridPolicy::Square, 2, 4, 4), (2, 1));
/// assert_eq!(grid_size(GridPolicy::Square, 5, 4, 4), (3, 2));
/// assert_eq!(grid_size(GridPolicy::FrameAsRow, 5, 4, 4), (1, 5));
/// ```
pub fn grid_size(
    policy: GridPolicy,
    frame_count: usize,
    frame_width: usize,
    frame_height: usize,
) -> (usize, usize) {
    if frame_count == 0 {
        return (0, 0);
    }
    match policy {
        GridPolicy::SingleRow => (frame_count, 1),
        GridPolicy::FrameAsRow => (1, frame_count),
        GridPolicy::Square => square_grid(frame_count, frame_width, frame_height),
    }
}

fn square_grid(frame_count: usize, frame_width: usize, frame_height: usize) -> (usize, usize) {
    let columns_for = |rows: usize| (frame_count + rows - 1) / rows;
    let wider = |rows: usize| columns_for(rows) * frame_width > rows * frame_height;

    let mut rows = 1;
    while rows < frame_count && wider(rows) {
        rows += 1;
    }
    let taller = columns_for(rows) * frame_width < rows * frame_height;
    if taller && rows > 1 {
        rows -= 1;
    }

    let columns = columns_for(rows);
    let rows = (frame_count + columns - 1) / columns;
    (columns, rows)
}

/// A rectangle in atlas space (origin bottom-left).
#[cfg_attr(feature = "import", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(missing_docs)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Grid of equally sized cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtlasLayout {
    /// Number of cell columns.
    pub columns: usize,
    /// Number of cell rows.
    pub rows: usize,
    /// Width of one cell.
    pub frame_width: usize,
    /// Height of one cell.
    pub frame_height: usize,
}

impl AtlasLayout {
    /// Layout for `frame_count` frames of the given size.
    pub fn new(
        policy: GridPolicy,
        frame_count: usize,
        frame_width: usize,
        frame_height: usize,
    ) -> Self {
        let (columns, rows) = grid_size(policy, frame_count, frame_width, frame_height);
        AtlasLayout {
            columns,
            rows,
            frame_width,
            frame_height,
        }
    }

    /// Atlas width in pixels.
    pub fn width(&self) -> usize {
        self.columns * self.frame_width
    }

    /// Atlas height in pixels.
    pub fn height(&self) -> usize {
        self.rows * self.frame_height
    }

    /// Cell of frame `index`. Cells are filled row-major starting at the
    /// bottom row.
    pub fn cell(&self, index: usize) -> Rect {
        let columns = self.columns.max(1);
        let (row, col) = (index / columns, index % columns);
        Rect {
            x: (col * self.frame_width) as i32,
            y: (row * self.frame_height) as i32,
            width: self.frame_width as u32,
            height: self.frame_height as u32,
        }
    }

    /// Copy every frame into its cell of a new texture.
    pub fn compose(&self, frames: &[PixelBucket]) -> PixelBucket {
        let mut texture = PixelBucket::new(self.width(), self.height());
        for (index, frame) in frames.iter().enumerate() {
            let cell = self.cell(index);
            // storage rows count from the top
            let top = self.height() as i32 - cell.y - cell.height as i32;
            if top < 0 {
                warn!("Frame {} does not fit in the atlas grid", index);
                continue;
            }
            texture.blit(frame, cell.x as usize, top as usize);
        }
        texture
    }
}

/// A named region of the atlas.
#[cfg_attr(feature = "import", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteEntry {
    /// `{sprite}_{frame}` for whole frames, `{slice}_{frame}` for slices.
    pub name: String,
    /// Region in atlas space.
    pub rect: Rect,
    /// Pivot as a fraction of the rect size, Y up.
    pub pivot: [f32; 2],
    /// Nine-patch borders `[left, bottom, right, top]`, zero if none.
    pub border: [i32; 4],
    /// Source frame.
    pub frame_index: usize,
}

/// One step of an [Animation].
#[cfg_attr(feature = "import", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationFrame {
    /// Name of the sprite shown.
    pub sprite: String,
    /// Source frame.
    pub frame_index: usize,
    /// How long the frame is shown, in seconds.
    pub duration_secs: f32,
}

/// An animation clip built from a tag.
#[cfg_attr(feature = "import", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    #[allow(missing_docs)]
    pub name: String,
    /// Frames in playback order.
    pub frames: Vec<AnimationFrame>,
    /// Whether playback restarts after the last frame.
    pub looping: bool,
    /// Sum of all frame durations, in seconds.
    pub duration_secs: f32,
}

/// Tags with this display color are played once.
pub const SINGLE_SHOT_TAG_COLOR: [u8; 3] = [255, 255, 255];

impl Animation {
    /// Build the clip for `tag`.
    ///
    /// Reverse tags list their frames backwards. Ping-pong tags list only the
    /// forward pass and loop. A tag colored pure white never loops. Frames
    /// past the end of the file are left out.
    pub fn from_tag(file: &AsepriteFile, tag: &Tag, sprite_name: &str) -> Self {
        let mut frames = Vec::with_capacity(tag.frame_count());
        for index in tag.frames() {
            let index = index as usize;
            let frame = match file.frame(index) {
                Some(frame) => frame,
                None => {
                    warn!("Tag {} references missing frame {}", tag.name, index);
                    continue;
                }
            };
            frames.push(AnimationFrame {
                sprite: frame_sprite_name(sprite_name, index),
                frame_index: index,
                duration_secs: frame.duration() as f32 / 1000.0,
            });
        }
        let looping = tag.color != SINGLE_SHOT_TAG_COLOR;
        let duration_secs = frames.iter().map(|f| f.duration_secs).sum();
        Animation {
            name: tag.name.clone(),
            frames,
            looping,
            duration_secs,
        }
    }
}

/// Name of the sprite covering a whole frame.
pub fn frame_sprite_name(sprite_name: &str, frame_index: usize) -> String {
    format!("{}_{}", sprite_name, frame_index)
}

/// Settings for [Atlas::build].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtlasOptions {
    #[allow(missing_docs)]
    pub policy: GridPolicy,
    /// Also emit one sprite per slice and frame.
    pub enable_slices: bool,
    /// Mirror every frame horizontally before placing it.
    pub mirror_x: bool,
    /// Mirror every frame vertically before placing it.
    pub mirror_y: bool,
    /// Pivot of whole-frame sprites, as a fraction of the frame size.
    pub pivot: [f32; 2],
}

impl Default for AtlasOptions {
    fn default() -> Self {
        AtlasOptions {
            policy: GridPolicy::Square,
            enable_slices: false,
            mirror_x: false,
            mirror_y: false,
            pivot: [0.5, 0.5],
        }
    }
}

/// A composed atlas texture with its sprites and animations.
#[derive(Debug, Clone)]
pub struct Atlas {
    #[allow(missing_docs)]
    pub layout: AtlasLayout,
    #[allow(missing_docs)]
    pub texture: PixelBucket,
    /// One sprite per frame, followed by slice sprites if enabled.
    pub sprites: Vec<SpriteEntry>,
    /// One animation per tag.
    pub animations: Vec<Animation>,
}

impl Atlas {
    /// Composite every frame of `file` and lay them out.
    pub fn build(file: &AsepriteFile, sprite_name: &str, options: &AtlasOptions) -> Self {
        let frames = file.frames_pixels();
        let layout = AtlasLayout::new(options.policy, frames.len(), file.width(), file.height());
        let texture = layout.compose(&mirrored(frames, options));

        let mut sprites: Vec<SpriteEntry> = (0..file.num_frames())
            .map(|index| SpriteEntry {
                name: frame_sprite_name(sprite_name, index),
                rect: layout.cell(index),
                pivot: options.pivot,
                border: [0; 4],
                frame_index: index,
            })
            .collect();
        if options.enable_slices {
            sprites.extend(slice_sprites(file, &layout));
        }

        let animations = file
            .tags()
            .into_iter()
            .map(|tag| Animation::from_tag(file, tag, sprite_name))
            .collect();

        Atlas {
            layout,
            texture,
            sprites,
            animations,
        }
    }

    /// Render one layer into a texture with the same layout as this atlas.
    /// The layer is drawn even when hidden; frames without a cel on it stay
    /// transparent.
    pub fn layer_texture(
        &self,
        file: &AsepriteFile,
        layer_index: usize,
        options: &AtlasOptions,
    ) -> PixelBucket {
        let frames = file
            .frames()
            .iter()
            .map(|frame| match frame.cel_for_layer(layer_index as u16) {
                Some(cel) => file.cel_pixels(cel),
                None => PixelBucket::new(file.width(), file.height()),
            })
            .collect();
        self.layout.compose(&mirrored(frames, options))
    }
}

fn mirrored(mut frames: Vec<PixelBucket>, options: &AtlasOptions) -> Vec<PixelBucket> {
    for frame in frames.iter_mut() {
        if options.mirror_x {
            frame.flip_horizontal();
        }
        if options.mirror_y {
            frame.flip_vertical();
        }
    }
    frames
}

/// Slice regions rewritten into atlas space, one entry per slice and frame.
///
/// For each frame the latest key starting at or before it is used. Slice
/// keys are measured from the frame's top-left; the rectangle is flipped
/// inside its cell so that it is measured from the cell's bottom edge, like
/// the cell itself. Pivots are normalized to the slice size with Y
/// up; slices without a pivot use the center.
pub fn slice_sprites(file: &AsepriteFile, layout: &AtlasLayout) -> Vec<SpriteEntry> {
    let mut result = Vec::new();
    for slice in file.slices() {
        for frame_index in 0..file.num_frames() {
            let key = match slice.key_for_frame(frame_index as u32) {
                Some(key) => key,
                None => continue,
            };
            let cell = layout.cell(frame_index);
            let rect = Rect {
                x: cell.x + key.x,
                y: cell.y + (layout.frame_height as i32 - (key.y + key.height as i32)),
                width: key.width,
                height: key.height,
            };
            let pivot = match key.pivot {
                Some((px, py)) if key.width > 0 && key.height > 0 => [
                    px as f32 / key.width as f32,
                    1.0 - py as f32 / key.height as f32,
                ],
                _ => [0.5, 0.5],
            };
            let border = key
                .nine_patch
                .map(|center| center.border(key.width, key.height))
                .unwrap_or([0; 4]);
            result.push(SpriteEntry {
                name: format!("{}_{}", slice.name, frame_index),
                rect,
                pivot,
                border,
                frame_index,
            });
        }
    }
    result
}
