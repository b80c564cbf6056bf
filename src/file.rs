use std::{collections::BTreeMap, fs, io::Read, path::Path};

use crate::{
    blend,
    cel::{CelChunk, CelContent, ImageContent},
    chunk::{Chunk, ChunkKind},
    frame::Frame,
    header::{Header, HEADER_SIZE},
    layer::{self, LayerChunk, LayerType},
    metadata::Metadata,
    reader::AseReader,
    slice::Slice,
    tags::Tag,
    ColorPalette, PixelBucket, Result,
};
use log::{debug, warn};

/// A parsed Aseprite file.
///
/// The file is decoded once and never mutated afterwards. Every pixel query
/// allocates a fresh [PixelBucket].
#[derive(Debug, Clone)]
pub struct AsepriteFile {
    header: Header,
    frames: Vec<Frame>,
}

impl AsepriteFile {
    /// Load Aseprite file. Loads full file into memory.
    pub fn read_file(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Load Aseprite file from any input that implements `std::io::Read`.
    ///
    /// The input is read to the end before decoding starts.
    pub fn read<R: Read>(mut input: R) -> Result<Self> {
        let mut bytes = Vec::new();
        input.read_to_end(&mut bytes)?;
        Self::from_bytes(&bytes)
    }

    /// Decode an in-memory file.
    ///
    /// Frames are read until the input is exhausted. If that number differs
    /// from the frame count in the header, a warning is logged and all frames
    /// found are kept.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let header = Header::parse(bytes)?;
        let body = &bytes[HEADER_SIZE..];
        let mut reader = AseReader::new(body);

        let mut frames = Vec::with_capacity(header.frames as usize);
        while (reader.position() as usize) < body.len() {
            let frame = Frame::read(&mut reader, header.color_depth)?;
            debug!(
                "Frame {}: {} bytes, {} chunks",
                frames.len(),
                frame.length(),
                frame.chunks_count()
            );
            frames.push(frame);
        }

        if frames.len() != header.frames as usize {
            warn!(
                "Header declares {} frames but {} were found",
                header.frames,
                frames.len()
            );
        }

        Ok(AsepriteFile { header, frames })
    }

    /// The file header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.header.width as usize
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.header.height as usize
    }

    /// Width and height in pixels.
    pub fn size(&self) -> (usize, usize) {
        (self.width(), self.height())
    }

    /// Number of frames actually decoded.
    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    /// All frames in order.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Access a frame by index.
    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    /// Every chunk of one kind across all frames, in stream order.
    pub fn chunks_of<T: ChunkKind>(&self) -> impl Iterator<Item = &T> + '_ {
        self.frames.iter().flat_map(|f| f.chunks_of::<T>())
    }

    /// All layers in document order. Layer indices used by cels refer to
    /// positions in this list.
    pub fn layers(&self) -> Vec<&LayerChunk> {
        self.chunks_of::<LayerChunk>().collect()
    }

    /// Number of layers.
    pub fn num_layers(&self) -> usize {
        self.chunks_of::<LayerChunk>().count()
    }

    /// Access a layer by index.
    pub fn layer(&self, index: usize) -> Option<&LayerChunk> {
        self.chunks_of::<LayerChunk>().nth(index)
    }

    /// Index of the first layer with the given name.
    pub fn layer_by_name(&self, name: &str) -> Option<usize> {
        self.chunks_of::<LayerChunk>().position(|l| l.name == name)
    }

    /// The first palette chunk of the file.
    pub fn palette(&self) -> Option<&ColorPalette> {
        self.chunks_of::<ColorPalette>().next()
    }

    /// All tags of all tag chunks, in order.
    pub fn tags(&self) -> Vec<&Tag> {
        self.frames
            .iter()
            .flat_map(|f| f.chunks())
            .filter_map(|chunk| match chunk {
                Chunk::FrameTags(tags) => Some(tags.iter()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    /// Look up a tag by name. Returns the first match.
    pub fn tag_by_name(&self, name: &str) -> Option<&Tag> {
        self.tags().into_iter().find(|t| t.name == name)
    }

    /// All slices.
    pub fn slices(&self) -> Vec<&Slice> {
        self.chunks_of::<Slice>().collect()
    }

    /// The cel that owns the pixels shown by `cel`.
    ///
    /// Owned cels resolve to themselves. Linked cels are followed to the cel
    /// on the same layer in the referenced frame. Returns `None` (and logs a
    /// warning) if a link points at a frame without such a cel or if links
    /// form a cycle.
    pub fn resolve_cel<'a>(&'a self, cel: &'a CelChunk) -> Option<&'a CelChunk> {
        let mut current = cel;
        let mut visited: Vec<u16> = Vec::new();
        loop {
            let frame = match current.content {
                CelContent::Owned(_) => return Some(current),
                CelContent::Linked { frame } => frame,
            };
            if visited.contains(&frame) {
                warn!(
                    "Linked cels on layer {} form a cycle through frame {}",
                    cel.layer_index, frame
                );
                return None;
            }
            visited.push(frame);
            current = match self
                .frames
                .get(frame as usize)
                .and_then(|f| f.cel_for_layer(current.layer_index))
            {
                Some(target) => target,
                None => {
                    warn!(
                        "Linked cel on layer {} points at frame {} which has no cel for it",
                        cel.layer_index, frame
                    );
                    return None;
                }
            };
        }
    }

    /// Pixel data shown by `cel`, following links. Never copies.
    pub fn cel_image<'a>(&'a self, cel: &'a CelChunk) -> Option<&'a ImageContent> {
        self.resolve_cel(cel).and_then(CelChunk::image)
    }

    /// Render a single cel onto an empty canvas-sized bucket at its offset.
    /// Pixels outside the canvas are dropped.
    pub fn cel_pixels(&self, cel: &CelChunk) -> PixelBucket {
        let mut bucket = PixelBucket::new(self.width(), self.height());
        let image = match self.cel_image(cel) {
            Some(image) => image,
            None => return bucket,
        };
        let palette = self.palette();
        let (canvas_w, canvas_h) = (self.width() as i32, self.height() as i32);
        let (x0, y0) = (cel.x as i32, cel.y as i32);
        let width = image.width as i32;

        for y in y0..y0 + image.height as i32 {
            if y < 0 || y >= canvas_h {
                continue;
            }
            for x in x0..x0 + width {
                if x < 0 || x >= canvas_w {
                    continue;
                }
                let idx = (y - y0) as usize * width as usize + (x - x0) as usize;
                bucket.set_pixel(x as usize, y as usize, image.pixels.color(idx, palette));
            }
        }
        bucket
    }

    /// Composite all visible layers of a frame.
    ///
    /// Cels are blended bottom to top by layer index. Cels on metadata
    /// layers (`@` prefix), group layers and layers hidden directly or
    /// through an ancestor are skipped. The effective opacity of a cel is the
    /// smaller of the layer and cel opacity.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not a valid frame index.
    pub fn frame_pixels(&self, index: usize) -> PixelBucket {
        let frame = &self.frames[index];
        let layers = self.layers();
        let mut canvas = PixelBucket::new(self.width(), self.height());

        let mut cels: Vec<&CelChunk> = frame.chunks_of::<CelChunk>().collect();
        cels.sort_by_key(|cel| cel.layer_index);

        for cel in cels {
            let layer_index = cel.layer_index as usize;
            let layer = match layers.get(layer_index) {
                Some(layer) => layer,
                None => {
                    warn!(
                        "Frame {}: cel references missing layer {}",
                        index, layer_index
                    );
                    continue;
                }
            };
            if layer.is_metadata()
                || layer.layer_type == LayerType::Group
                || !layer::effective_visibility(&layers, layer_index)
            {
                continue;
            }
            let cel_pixels = self.cel_pixels(cel);
            blend::blend_buckets(
                layer.blend_mode,
                &mut canvas,
                &cel_pixels,
                effective_opacity(layer, cel),
            );
        }

        canvas.name = index.to_string();
        canvas
    }

    /// Composite every frame, see [AsepriteFile::frame_pixels].
    pub fn frames_pixels(&self) -> Vec<PixelBucket> {
        (0..self.frames.len()).map(|i| self.frame_pixels(i)).collect()
    }

    /// One canvas-sized bucket per cel of a single layer, unblended.
    ///
    /// Buckets are named `{layer name}_{frame index}`. With `force_visible`
    /// the layer's own visible flag is ignored, but a hidden ancestor group
    /// still hides it. Group layers never produce pixels.
    pub fn layer_pixels(&self, layer_index: usize, force_visible: bool) -> Vec<PixelBucket> {
        let layers = self.layers();
        let layer = match layers.get(layer_index) {
            Some(layer) => *layer,
            None => return Vec::new(),
        };
        if layer.layer_type == LayerType::Group {
            return Vec::new();
        }
        let own_visible = force_visible || layer.is_visible();
        let ancestors_visible = match layer::parent_index(&layers, layer_index) {
            Some(parent) => layer::effective_visibility(&layers, parent),
            None => true,
        };
        if !(own_visible && ancestors_visible) {
            return Vec::new();
        }

        let mut result = Vec::new();
        for (frame_index, frame) in self.frames.iter().enumerate() {
            for cel in frame
                .chunks_of::<CelChunk>()
                .filter(|c| c.layer_index as usize == layer_index)
            {
                let mut bucket = self.cel_pixels(cel);
                bucket.name = format!("{}_{}", layer.name, frame_index);
                result.push(bucket);
            }
        }
        result
    }

    /// [AsepriteFile::layer_pixels] for every layer, concatenated in layer
    /// order.
    pub fn layers_as_frames(&self) -> Vec<PixelBucket> {
        (0..self.num_layers())
            .flat_map(|i| self.layer_pixels(i, false))
            .collect()
    }

    /// Every composited frame laid out left to right in a single row.
    pub fn texture_pixels(&self) -> PixelBucket {
        let (width, height) = self.size();
        let frames = self.frames_pixels();
        let mut strip = PixelBucket::new(width * frames.len(), height);
        // one row, counted from the bottom
        let y = strip.height() - height;
        for (col, frame) in frames.iter().enumerate() {
            strip.blit(frame, col * width, y);
        }
        strip
    }

    /// Collect metadata layers and, per frame, the average position of their
    /// pixels.
    ///
    /// Positions are measured with Y pointing up, relative to `pivot` (given
    /// as a fraction of the canvas size), and scaled by `pixels_per_unit`.
    /// Only pixels with alpha above 0.1 count. Frames where a metadata layer
    /// has no such pixel get no entry.
    pub fn metadata(&self, pivot: [f32; 2], pixels_per_unit: u32) -> Vec<Metadata> {
        let layers = self.layers();
        let ppu = pixels_per_unit.max(1) as f32;
        let (width, height) = (self.width() as f32, self.height() as f32);
        let pivot_px = [pivot[0] * width, pivot[1] * height];
        let mut found: BTreeMap<usize, Metadata> = BTreeMap::new();

        for (frame_index, frame) in self.frames.iter().enumerate() {
            let mut cels: Vec<&CelChunk> = frame.chunks_of::<CelChunk>().collect();
            cels.sort_by_key(|cel| cel.layer_index);

            for cel in cels {
                let layer_index = cel.layer_index as usize;
                let layer = match layers.get(layer_index) {
                    Some(layer) if layer.is_metadata() => layer,
                    _ => continue,
                };
                let metadata = found
                    .entry(layer_index)
                    .or_insert_with(|| Metadata::new(&layer.name, layer_index));

                if let Some(center) = self.cel_centroid(cel) {
                    let pos = [
                        (center[0] - pivot_px[0]) / ppu + 0.5 / ppu,
                        (center[1] - pivot_px[1]) / ppu + 0.5 / ppu,
                    ];
                    metadata.transforms.insert(frame_index, pos);
                }
            }
        }

        found.into_values().collect()
    }

    // Average Y-up canvas position of the cel's pixels with alpha > 0.1.
    fn cel_centroid(&self, cel: &CelChunk) -> Option<[f32; 2]> {
        let image = self.cel_image(cel)?;
        let palette = self.palette();
        let height = self.height() as i32;
        let mut sum = [0.0_f32; 2];
        let mut count = 0_u32;

        for y in 0..image.height as i32 {
            for x in 0..image.width as i32 {
                let idx = y as usize * image.width as usize + x as usize;
                if image.pixels.color(idx, palette).a > 0.1 {
                    sum[0] += (cel.x as i32 + x) as f32;
                    sum[1] += (height - 1 - (cel.y as i32 + y)) as f32;
                    count += 1;
                }
            }
        }

        if count == 0 {
            return None;
        }
        Some([sum[0] / count as f32, sum[1] / count as f32])
    }
}

fn effective_opacity(layer: &LayerChunk, cel: &CelChunk) -> f32 {
    let layer_opacity = layer.opacity as f32 / 255.0;
    let cel_opacity = cel.opacity as f32 / 255.0;
    layer_opacity.min(cel_opacity)
}
