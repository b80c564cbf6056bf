use crate::atlas::{Atlas, AtlasOptions, GridPolicy, Rect};
use crate::*;

const RED: [u8; 4] = [255, 0, 0, 255];
const GREEN: [u8; 4] = [0, 255, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];

// Assembles a file in memory, chunk by chunk.
struct FileBuilder {
    width: u16,
    height: u16,
    depth: u16,
    frames: Vec<(u16, Vec<Vec<u8>>)>,
}

impl FileBuilder {
    fn new(width: u16, height: u16) -> Self {
        FileBuilder {
            width,
            height,
            depth: 32,
            frames: Vec::new(),
        }
    }

    fn indexed(mut self) -> Self {
        self.depth = 8;
        self
    }

    fn frame(mut self, duration_ms: u16, chunks: Vec<Vec<u8>>) -> Self {
        self.frames.push((duration_ms, chunks));
        self
    }

    fn build(&self) -> Vec<u8> {
        self.build_declaring(self.frames.len() as u16)
    }

    fn build_declaring(&self, declared_frames: u16) -> Vec<u8> {
        let mut bytes = vec![0_u8; 128];
        bytes[4..6].copy_from_slice(&0xA5E0_u16.to_le_bytes());
        bytes[6..8].copy_from_slice(&declared_frames.to_le_bytes());
        bytes[8..10].copy_from_slice(&self.width.to_le_bytes());
        bytes[10..12].copy_from_slice(&self.height.to_le_bytes());
        bytes[12..14].copy_from_slice(&self.depth.to_le_bytes());
        for (duration, chunks) in &self.frames {
            let body: usize = chunks.iter().map(Vec::len).sum();
            bytes.extend_from_slice(&((16 + body) as u32).to_le_bytes());
            bytes.extend_from_slice(&0xF1FA_u16.to_le_bytes());
            // old count saturated, real count in the new field
            bytes.extend_from_slice(&0xFFFF_u16.to_le_bytes());
            bytes.extend_from_slice(&duration.to_le_bytes());
            bytes.extend_from_slice(&[0, 0]);
            bytes.extend_from_slice(&(chunks.len() as u32).to_le_bytes());
            for chunk in chunks {
                bytes.extend_from_slice(chunk);
            }
        }
        let size = bytes.len() as u32;
        bytes[0..4].copy_from_slice(&size.to_le_bytes());
        bytes
    }
}

fn chunk(code: u16, payload: Vec<u8>) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&((payload.len() + 6) as u32).to_le_bytes());
    data.extend_from_slice(&code.to_le_bytes());
    data.extend(payload);
    data
}

fn push_string(data: &mut Vec<u8>, s: &str) {
    data.extend_from_slice(&(s.len() as u16).to_le_bytes());
    data.extend_from_slice(s.as_bytes());
}

fn layer(name: &str, child_level: u16, visible: bool, group: bool) -> Vec<u8> {
    let flags: u16 = if visible { 1 | 2 } else { 2 };
    let mut data = Vec::new();
    data.extend_from_slice(&flags.to_le_bytes());
    data.extend_from_slice(&(group as u16).to_le_bytes());
    data.extend_from_slice(&child_level.to_le_bytes());
    data.extend_from_slice(&[0; 4]);
    data.extend_from_slice(&0_u16.to_le_bytes());
    data.push(255);
    data.extend_from_slice(&[0; 3]);
    push_string(&mut data, name);
    chunk(0x2004, data)
}

// Visible top-level image layer with a blend mode code and opacity.
fn blended_layer(name: &str, blend_mode: u16, opacity: u8) -> Vec<u8> {
    let mut data = layer(name, 0, true, false);
    data[16..18].copy_from_slice(&blend_mode.to_le_bytes());
    data[18] = opacity;
    data
}

fn with_cel_opacity(mut cel: Vec<u8>, opacity: u8) -> Vec<u8> {
    cel[12] = opacity;
    cel
}

fn cel_header(layer: u16, x: i16, y: i16, cel_type: u16) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&layer.to_le_bytes());
    data.extend_from_slice(&x.to_le_bytes());
    data.extend_from_slice(&y.to_le_bytes());
    data.push(255);
    data.extend_from_slice(&cel_type.to_le_bytes());
    data.extend_from_slice(&[0; 7]);
    data
}

fn raw_cel(layer: u16, x: i16, y: i16, width: u16, height: u16, pixels: &[u8]) -> Vec<u8> {
    let mut data = cel_header(layer, x, y, 0);
    data.extend_from_slice(&width.to_le_bytes());
    data.extend_from_slice(&height.to_le_bytes());
    data.extend_from_slice(pixels);
    chunk(0x2005, data)
}

fn solid_cel(layer: u16, width: u16, height: u16, color: [u8; 4]) -> Vec<u8> {
    let pixels: Vec<u8> = (0..width as usize * height as usize)
        .flat_map(|_| color)
        .collect();
    raw_cel(layer, 0, 0, width, height, &pixels)
}

fn linked_cel(layer: u16, frame: u16) -> Vec<u8> {
    let mut data = cel_header(layer, 0, 0, 1);
    data.extend_from_slice(&frame.to_le_bytes());
    chunk(0x2005, data)
}

fn palette(colors: &[[u8; 4]]) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&(colors.len() as u32).to_le_bytes());
    data.extend_from_slice(&0_u32.to_le_bytes());
    data.extend_from_slice(&(colors.len() as u32 - 1).to_le_bytes());
    data.extend_from_slice(&[0; 8]);
    for c in colors {
        data.extend_from_slice(&0_u16.to_le_bytes());
        data.extend_from_slice(c);
    }
    chunk(0x2019, data)
}

fn tag(name: &str, from: u16, to: u16, direction: u8, color: [u8; 3]) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&1_u16.to_le_bytes());
    data.extend_from_slice(&[0; 8]);
    data.extend_from_slice(&from.to_le_bytes());
    data.extend_from_slice(&to.to_le_bytes());
    data.push(direction);
    data.extend_from_slice(&[0; 8]);
    data.extend_from_slice(&color);
    data.push(0);
    push_string(&mut data, name);
    chunk(0x2018, data)
}

// Single-key slice valid from frame 0. `center` is the nine-patch center
// rectangle `(x, y, w, h)` relative to the slice.
fn slice(
    name: &str,
    bounds: (i32, i32, u32, u32),
    center: Option<(i32, i32, u32, u32)>,
    pivot: Option<(i32, i32)>,
) -> Vec<u8> {
    let flags = center.map_or(0, |_| 1_u32) | pivot.map_or(0, |_| 2_u32);
    let mut data = Vec::new();
    data.extend_from_slice(&1_u32.to_le_bytes());
    data.extend_from_slice(&flags.to_le_bytes());
    data.extend_from_slice(&0_u32.to_le_bytes());
    push_string(&mut data, name);
    data.extend_from_slice(&0_u32.to_le_bytes());
    data.extend_from_slice(&bounds.0.to_le_bytes());
    data.extend_from_slice(&bounds.1.to_le_bytes());
    data.extend_from_slice(&bounds.2.to_le_bytes());
    data.extend_from_slice(&bounds.3.to_le_bytes());
    if let Some((x, y, w, h)) = center {
        data.extend_from_slice(&x.to_le_bytes());
        data.extend_from_slice(&y.to_le_bytes());
        data.extend_from_slice(&w.to_le_bytes());
        data.extend_from_slice(&h.to_le_bytes());
    }
    if let Some((x, y)) = pivot {
        data.extend_from_slice(&x.to_le_bytes());
        data.extend_from_slice(&y.to_le_bytes());
    }
    chunk(0x2022, data)
}

fn two_red_frames() -> FileBuilder {
    FileBuilder::new(4, 4)
        .frame(100, vec![layer("Layer", 0, true, false), solid_cel(0, 4, 4, RED)])
        .frame(100, vec![solid_cel(0, 4, 4, RED)])
}

fn red() -> Color {
    Color::from_rgba8(RED)
}

#[test]
fn two_frame_atlas() {
    let ase = AsepriteFile::from_bytes(&two_red_frames().build()).unwrap();
    assert_eq!(ase.num_frames(), 2);
    assert_eq!(ase.size(), (4, 4));

    let atlas = Atlas::build(&ase, "hero", &AtlasOptions::default());
    assert_eq!((atlas.layout.columns, atlas.layout.rows), (2, 1));
    assert_eq!((atlas.texture.width(), atlas.texture.height()), (8, 4));
    assert_eq!(atlas.sprites.len(), 2);
    assert_eq!(atlas.sprites[0].name, "hero_0");
    assert_eq!(atlas.sprites[0].rect, Rect { x: 0, y: 0, width: 4, height: 4 });
    assert_eq!(atlas.sprites[1].rect, Rect { x: 4, y: 0, width: 4, height: 4 });
    for (x, y) in [(0, 0), (3, 3), (4, 0), (7, 3)] {
        assert_eq!(atlas.texture.pixel(x, y), red());
    }
    assert!(atlas.animations.is_empty());
}

#[test]
fn chunk_count_from_new_field() {
    let ase = AsepriteFile::from_bytes(&two_red_frames().build()).unwrap();
    let frame = ase.frame(0).unwrap();
    assert_eq!(frame.chunks_count(), 2);
    assert_eq!(frame.chunks().len(), 2);
    assert_eq!(frame.duration(), 100);
}

#[test]
fn decoding_is_repeatable() {
    let bytes = two_red_frames().build();
    let a = AsepriteFile::from_bytes(&bytes).unwrap();
    let b = AsepriteFile::read(&bytes[..]).unwrap();
    assert_eq!(a.frames_pixels(), b.frames_pixels());
    assert_eq!(a.texture_pixels(), b.texture_pixels());
}

#[test]
fn compositing_is_repeatable() {
    let bytes = FileBuilder::new(2, 1)
        .frame(
            100,
            vec![
                layer("Bottom", 0, true, false),
                blended_layer("Top", 1, 128),
                solid_cel(0, 2, 1, RED),
                raw_cel(1, 1, 0, 1, 1, &BLUE),
            ],
        )
        .build();
    let ase = AsepriteFile::from_bytes(&bytes).unwrap();
    let first = ase.frame_pixels(0);
    let second = ase.frame_pixels(0);
    assert_eq!(first, second);
    assert_eq!(ase.frame_pixels(0).pixel(0, 0), red());
}

#[test]
fn frames_read_until_end_of_input() {
    let ase = AsepriteFile::from_bytes(&two_red_frames().build_declaring(5)).unwrap();
    assert_eq!(ase.header().frames, 5);
    assert_eq!(ase.num_frames(), 2);
}

#[test]
fn wrong_magic_is_format_error() {
    let mut bytes = two_red_frames().build();
    bytes[4] = 0;
    let err = AsepriteFile::from_bytes(&bytes).unwrap_err();
    assert!(err.is_format_error());
    assert!(AsepriteFile::from_bytes(&bytes[..60]).is_err());
}

#[test]
fn truncated_frame_is_an_error() {
    let bytes = two_red_frames().build();
    let err = AsepriteFile::from_bytes(&bytes[..bytes.len() - 10]).unwrap_err();
    assert!(!err.is_format_error());
}

#[test]
fn hidden_group_hides_children() {
    let bytes = FileBuilder::new(2, 2)
        .frame(
            100,
            vec![
                layer("Group", 0, false, true),
                layer("Child", 1, true, false),
                solid_cel(1, 2, 2, RED),
            ],
        )
        .build();
    let ase = AsepriteFile::from_bytes(&bytes).unwrap();
    let frame = ase.frame_pixels(0);
    assert!(frame.pixels().iter().all(|&c| c == Color::TRANSPARENT));
    assert!(ase.layer_pixels(1, true).is_empty());
}

#[test]
fn layers_blend_bottom_to_top() {
    // cels stored in reverse layer order
    let bytes = FileBuilder::new(2, 1)
        .frame(
            100,
            vec![
                layer("Bottom", 0, true, false),
                layer("Top", 0, true, false),
                raw_cel(1, 1, 0, 1, 1, &BLUE),
                solid_cel(0, 2, 1, RED),
            ],
        )
        .build();
    let ase = AsepriteFile::from_bytes(&bytes).unwrap();
    let frame = ase.frame_pixels(0);
    assert_eq!(frame.pixel(0, 0), red());
    assert_eq!(frame.pixel(1, 0), Color::from_rgba8(BLUE));
    assert_eq!(frame.name, "0");
}

#[test]
fn blend_mode_and_opacity_apply() {
    // layer opacity 0.4 wins over cel opacity 0.8
    let bytes = FileBuilder::new(1, 1)
        .frame(
            100,
            vec![
                layer("Bottom", 0, true, false),
                blended_layer("Difference", 10, 102),
                solid_cel(0, 1, 1, RED),
                with_cel_opacity(solid_cel(1, 1, 1, RED), 204),
            ],
        )
        .build();
    let ase = AsepriteFile::from_bytes(&bytes).unwrap();
    assert_eq!(ase.layer(1).unwrap().blend_mode, BlendMode::Difference);
    let pixel = ase.frame_pixels(0).pixel(0, 0);
    assert!((pixel.r - 0.6).abs() < 1e-5, "r = {}", pixel.r);
    assert_eq!((pixel.g, pixel.b), (0.0, 0.0));
    assert!((pixel.a - 1.0).abs() < 1e-6);
}

#[test]
fn indexed_pixels_use_palette() {
    let bytes = FileBuilder::new(3, 1)
        .indexed()
        .frame(
            100,
            vec![
                palette(&[[0, 0, 0, 0], BLUE]),
                layer("Layer", 0, true, false),
                raw_cel(0, 0, 0, 3, 1, &[1, 7, 0]),
            ],
        )
        .build();
    let ase = AsepriteFile::from_bytes(&bytes).unwrap();
    let frame = ase.frame_pixels(0);
    assert_eq!(frame.pixel(0, 0), Color::from_rgba8(BLUE));
    assert_eq!(frame.pixel(1, 0), Color::MISSING);
    assert_eq!(frame.pixel(2, 0).a, 0.0);
}

#[test]
fn linked_cel_shares_image() {
    let bytes = FileBuilder::new(2, 2)
        .frame(100, vec![layer("Layer", 0, true, false), solid_cel(0, 2, 2, RED)])
        .frame(100, vec![linked_cel(0, 0)])
        .build();
    let ase = AsepriteFile::from_bytes(&bytes).unwrap();
    let source = ase.frame(0).unwrap().cel_for_layer(0).unwrap();
    let linked = ase.frame(1).unwrap().cel_for_layer(0).unwrap();
    assert_eq!(linked.linked_frame(), Some(0));
    let a = ase.cel_image(source).unwrap();
    let b = ase.cel_image(linked).unwrap();
    assert!(std::ptr::eq(a, b));
    assert_eq!(ase.frame_pixels(1), {
        let mut first = ase.frame_pixels(0);
        first.name = "1".to_owned();
        first
    });
}

#[test]
fn linked_cel_cycle_draws_nothing() {
    let bytes = FileBuilder::new(2, 2)
        .frame(100, vec![layer("Layer", 0, true, false), linked_cel(0, 1)])
        .frame(100, vec![linked_cel(0, 0)])
        .build();
    let ase = AsepriteFile::from_bytes(&bytes).unwrap();
    let cel = ase.frame(0).unwrap().cel_for_layer(0).unwrap();
    assert!(ase.cel_image(cel).is_none());
    assert!(ase
        .frame_pixels(0)
        .pixels()
        .iter()
        .all(|&c| c == Color::TRANSPARENT));
}

#[test]
fn unknown_and_broken_chunks_are_dropped() {
    let mut bad_cel = cel_header(0, 0, 0, 9);
    bad_cel.extend_from_slice(&[0; 4]);
    let bytes = FileBuilder::new(2, 2)
        .frame(
            100,
            vec![
                layer("Layer", 0, true, false),
                chunk(0x7777, vec![1, 2, 3]),
                chunk(0x2005, bad_cel),
                chunk(0x2020, vec![0; 4]),
                solid_cel(0, 2, 2, RED),
            ],
        )
        .build();
    let ase = AsepriteFile::from_bytes(&bytes).unwrap();
    let frame = ase.frame(0).unwrap();
    assert_eq!(frame.chunks_count(), 5);
    assert_eq!(frame.chunks().len(), 2);
    assert_eq!(ase.frame_pixels(0).pixel(1, 1), red());
}

#[test]
fn short_layer_record_is_dropped() {
    let bytes = FileBuilder::new(2, 2)
        .frame(
            100,
            vec![
                layer("Layer", 0, true, false),
                chunk(0x2004, vec![1, 0, 0, 0]),
                solid_cel(0, 2, 2, RED),
            ],
        )
        .build();
    let ase = AsepriteFile::from_bytes(&bytes).unwrap();
    let frame = ase.frame(0).unwrap();
    assert_eq!(frame.chunks_count(), 3);
    assert_eq!(frame.chunks().len(), 2);
    assert_eq!(ase.num_layers(), 1);
    assert_eq!(ase.frame_pixels(0).pixel(0, 0), red());
}

#[test]
fn metadata_layers_are_not_drawn() {
    let bytes = FileBuilder::new(4, 4)
        .frame(
            100,
            vec![
                layer("Body", 0, true, false),
                layer(r#"@transform("hand")"#, 0, true, false),
                solid_cel(0, 4, 4, RED),
                raw_cel(1, 1, 2, 1, 1, &BLUE),
            ],
        )
        .build();
    let ase = AsepriteFile::from_bytes(&bytes).unwrap();
    assert!(ase.frame_pixels(0).pixels().iter().all(|&c| c == red()));

    let metadata = ase.metadata([0.5, 0.5], 1);
    assert_eq!(metadata.len(), 1);
    let hand = &metadata[0];
    assert_eq!(hand.kind, MetadataKind::Transform);
    assert_eq!(hand.name(), Some("hand"));
    assert_eq!(hand.layer_index, 1);
    assert_eq!(hand.transforms.get(&0), Some(&[-0.5, -0.5]));
}

#[test]
fn layer_pixels_are_named_by_frame() {
    let ase = AsepriteFile::from_bytes(&two_red_frames().build()).unwrap();
    let cels = ase.layer_pixels(0, false);
    let names: Vec<&str> = cels.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, ["Layer_0", "Layer_1"]);
    assert_eq!(ase.layers_as_frames().len(), 2);
    assert!(ase.layer_pixels(3, false).is_empty());
}

#[test]
fn texture_strip() {
    let ase = AsepriteFile::from_bytes(&two_red_frames().build()).unwrap();
    let strip = ase.texture_pixels();
    assert_eq!((strip.width(), strip.height()), (8, 4));
    assert!(strip.pixels().iter().all(|&c| c == red()));
}

#[test]
fn tags_become_animations() {
    let bytes = FileBuilder::new(2, 2)
        .frame(
            100,
            vec![
                layer("Layer", 0, true, false),
                tag("die", 0, 2, 1, [255, 255, 255]),
                solid_cel(0, 2, 2, RED),
            ],
        )
        .frame(250, vec![solid_cel(0, 2, 2, BLUE)])
        .frame(50, vec![])
        .build();
    let ase = AsepriteFile::from_bytes(&bytes).unwrap();
    assert_eq!(ase.tag_by_name("die").unwrap().frame_count(), 3);

    let atlas = Atlas::build(&ase, "bat", &AtlasOptions::default());
    assert_eq!(atlas.animations.len(), 1);
    let die = &atlas.animations[0];
    assert!(!die.looping);
    let order: Vec<usize> = die.frames.iter().map(|f| f.frame_index).collect();
    assert_eq!(order, [2, 1, 0]);
    assert_eq!(die.frames[0].sprite, "bat_2");
    assert!((die.frames[1].duration_secs - 0.25).abs() < 1e-6);
    assert!((die.duration_secs - 0.4).abs() < 1e-6);
}

#[test]
fn slices_move_into_atlas_space() {
    let mut builder = two_red_frames();
    builder.frames[0]
        .1
        .push(slice("hitbox", (1, 0, 2, 2), None, Some((1, 0))));
    let ase = AsepriteFile::from_bytes(&builder.build()).unwrap();

    let options = AtlasOptions {
        enable_slices: true,
        ..AtlasOptions::default()
    };
    let atlas = Atlas::build(&ase, "hero", &options);
    // two frame sprites, then one slice sprite per frame
    assert_eq!(atlas.sprites.len(), 4);
    let hitbox = &atlas.sprites[3];
    assert_eq!(hitbox.name, "hitbox_1");
    assert_eq!(hitbox.frame_index, 1);
    assert_eq!(hitbox.rect, Rect { x: 5, y: 2, width: 2, height: 2 });
    assert_eq!(hitbox.pivot, [0.5, 1.0]);
    assert_eq!(hitbox.border, [0; 4]);
}

#[test]
fn slices_measure_from_the_bottom_of_each_cell() {
    // frame 0 has a blue top row; the slice covers exactly that row
    let mut first: Vec<u8> = Vec::new();
    for row in 0..4 {
        let color = if row == 0 { BLUE } else { RED };
        for _ in 0..4 {
            first.extend_from_slice(&color);
        }
    }
    let bytes = FileBuilder::new(4, 4)
        .frame(
            100,
            vec![
                layer("Layer", 0, true, false),
                slice("top", (0, 0, 4, 1), None, None),
                raw_cel(0, 0, 0, 4, 4, &first),
            ],
        )
        .frame(100, vec![solid_cel(0, 4, 4, GREEN)])
        .frame(100, vec![solid_cel(0, 4, 4, BLUE)])
        .build();
    let ase = AsepriteFile::from_bytes(&bytes).unwrap();
    let options = AtlasOptions {
        enable_slices: true,
        ..AtlasOptions::default()
    };
    let atlas = Atlas::build(&ase, "gem", &options);
    assert_eq!((atlas.texture.width(), atlas.texture.height()), (8, 8));
    let height = atlas.texture.height() as i32;
    // reads a texel with Y measured up from the bottom edge
    let texel = |x: i32, y: i32| atlas.texture.pixel(x as usize, (height - 1 - y) as usize);

    assert_eq!(atlas.sprites[0].rect, Rect { x: 0, y: 0, width: 4, height: 4 });
    assert_eq!(atlas.sprites[1].rect, Rect { x: 4, y: 0, width: 4, height: 4 });
    assert_eq!(atlas.sprites[2].rect, Rect { x: 0, y: 4, width: 4, height: 4 });
    for sprite in &atlas.sprites[..3] {
        let rect = sprite.rect;
        let corner = texel(rect.x, rect.y);
        let expected = [red(), Color::from_rgba8(GREEN), Color::from_rgba8(BLUE)];
        assert_eq!(corner, expected[sprite.frame_index]);
    }

    let top = atlas.sprites.iter().find(|s| s.name == "top_0").unwrap();
    assert_eq!(top.rect, Rect { x: 0, y: 3, width: 4, height: 1 });
    for x in 0..4 {
        assert_eq!(texel(x, top.rect.y), Color::from_rgba8(BLUE));
        assert_eq!(texel(x, top.rect.y - 1), red());
    }
    let top_2 = atlas.sprites.iter().find(|s| s.name == "top_2").unwrap();
    assert_eq!(top_2.rect, Rect { x: 0, y: 7, width: 4, height: 1 });
}

#[test]
fn nine_patch_borders_reach_sprites() {
    let mut builder = two_red_frames();
    builder.frames[0]
        .1
        .push(slice("panel", (0, 0, 4, 4), Some((1, 1, 2, 1)), None));
    let ase = AsepriteFile::from_bytes(&builder.build()).unwrap();
    let options = AtlasOptions {
        enable_slices: true,
        ..AtlasOptions::default()
    };
    let atlas = Atlas::build(&ase, "frame", &options);
    let panel = atlas.sprites.iter().find(|s| s.name == "panel_0").unwrap();
    assert_eq!(panel.border, [1, 2, 1, 1]);
    assert_eq!(panel.pivot, [0.5, 0.5]);
    assert_eq!(panel.rect, Rect { x: 0, y: 0, width: 4, height: 4 });
}

#[test]
fn mirrored_atlas() {
    let bytes = FileBuilder::new(2, 1)
        .frame(100, vec![layer("Layer", 0, true, false), raw_cel(0, 0, 0, 1, 1, &RED)])
        .build();
    let ase = AsepriteFile::from_bytes(&bytes).unwrap();
    let options = AtlasOptions {
        policy: GridPolicy::SingleRow,
        mirror_x: true,
        ..AtlasOptions::default()
    };
    let atlas = Atlas::build(&ase, "arrow", &options);
    assert_eq!(atlas.texture.pixel(0, 0), Color::TRANSPARENT);
    assert_eq!(atlas.texture.pixel(1, 0), red());
}

#[cfg(feature = "import")]
mod import {
    use super::*;
    use crate::import::{import_all, import_file, ImportConfiguration};
    use std::fs;

    fn sprite_with_emission() -> Vec<u8> {
        FileBuilder::new(4, 4)
            .frame(
                100,
                vec![
                    layer("Body", 0, true, false),
                    layer("@emission", 0, false, false),
                    tag("idle", 0, 1, 0, [0, 0, 0]),
                    solid_cel(0, 4, 4, RED),
                    raw_cel(1, 0, 0, 1, 1, &BLUE),
                ],
            )
            .frame(100, vec![solid_cel(0, 4, 4, RED)])
            .build()
    }

    #[test]
    fn writes_textures_and_descriptor() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let path = input.path().join("hero.aseprite");
        fs::write(&path, sprite_with_emission()).unwrap();
        let config = ImportConfiguration::new(output.path().join("sprites"));

        let descriptor = import_file(&path, &config).unwrap().unwrap();
        assert_eq!(descriptor.name, "hero");
        assert_eq!(descriptor.frame_count, 2);
        assert_eq!(descriptor.animation_count, 1);
        assert!(descriptor.animation("idle").unwrap().looping);
        assert_eq!(
            descriptor.secondary_texture_paths.get("_Emission").map(String::as_str),
            Some("hero_Emission.png")
        );

        let dir = output.path().join("sprites");
        let atlas = image::open(dir.join("hero.png")).unwrap().to_rgba8();
        assert_eq!(atlas.dimensions(), (8, 4));
        assert_eq!(atlas.get_pixel(0, 0).0, RED);
        let emission = image::open(dir.join("hero_Emission.png")).unwrap().to_rgba8();
        assert_eq!(emission.get_pixel(0, 0).0, BLUE);
        assert_eq!(emission.get_pixel(4, 0).0, [0, 0, 0, 0]);

        let json = fs::read_to_string(dir.join("hero.json")).unwrap();
        let parsed: crate::import::SpriteSheetDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, descriptor);
    }

    #[test]
    fn missing_inputs_do_not_stop_siblings() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let good = input.path().join("good.aseprite");
        let broken = input.path().join("broken.aseprite");
        fs::write(&good, sprite_with_emission()).unwrap();
        fs::write(&broken, b"not a sprite").unwrap();
        let paths = vec![input.path().join("missing.aseprite"), good, broken];

        let results = import_all(&paths, &ImportConfiguration::new(output.path()));
        assert_eq!(results.len(), 3);
        assert!(results[0].as_ref().unwrap().is_none());
        assert!(results[1].as_ref().unwrap().is_some());
        assert!(results[2].is_err());
    }
}
