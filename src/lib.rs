#![warn(clippy::all)]
#![warn(missing_docs)]
/*!

Turn [Aseprite](https://www.aseprite.org/) files into game-ready sprite
sheets. This library reads the binary Aseprite format ([file format
specification][spec]) directly, composites every frame the way the editor
does, and lays the frames out in an atlas texture together with sprite
rectangles, animation clips and per-layer metadata.

Like most image code, compositing is rather slow without optimizations. We
recommend that you override the optimization settings for this dependency in
dev mode by adding the following to your `Cargo.toml`:

```text
[profile.dev.package.asebake]
opt-level = 2  # or 3
```

[spec]: https://github.com/aseprite/aseprite/blob/master/docs/ase-file-specs.md

# Basic Usage

## Load a file

Use [AsepriteFile::read_file] to load a file from disk, or
[AsepriteFile::from_bytes] for data already in memory.

```no_run
use asebake::AsepriteFile;
# use std::path::Path;
let ase = AsepriteFile::read_file(Path::new("hero.aseprite")).unwrap();

println!("Size: {}x{}", ase.width(), ase.height());
println!("Frames: {}", ase.num_frames());
println!("Layers: {}", ase.num_layers());
```

## Composite frames

[AsepriteFile::frame_pixels] blends all visible layers of one frame into a
[PixelBucket] of normalized float colors. Layers whose name starts with `@`
carry metadata and are never drawn.

```no_run
# use asebake::AsepriteFile;
# use std::path::Path;
# let ase = AsepriteFile::read_file(Path::new("hero.aseprite")).unwrap();
let frame = ase.frame_pixels(0);
frame.to_image().save("frame0.png").unwrap();
```

## Build an atlas

```no_run
# use asebake::AsepriteFile;
# use std::path::Path;
use asebake::atlas::{Atlas, AtlasOptions};
# let ase = AsepriteFile::read_file(Path::new("hero.aseprite")).unwrap();
let atlas = Atlas::build(&ase, "hero", &AtlasOptions::default());
for sprite in &atlas.sprites {
    println!("{} at {:?}", sprite.name, sprite.rect);
}
for clip in &atlas.animations {
    println!("{}: {} frames, loops: {}", clip.name, clip.frames.len(), clip.looping);
}
```

With the `import` feature (on by default) [import::import_file] and
[import::import_all] write PNG atlases and JSON descriptors for whole
directories of sprites.

# Logging

Diagnostics go through the [log](https://docs.rs/log) facade. Skipped chunk
types are reported at `debug` level, dropped malformed chunks and broken
linked cels at `warn` level.

*/

pub mod atlas;
pub mod blend;
pub(crate) mod bucket;
pub(crate) mod cel;
pub(crate) mod chunk;
pub(crate) mod color;
pub(crate) mod error;
pub(crate) mod file;
pub(crate) mod frame;
pub(crate) mod header;
#[cfg(feature = "import")]
pub mod import;
pub(crate) mod layer;
pub(crate) mod metadata;
pub(crate) mod palette;
pub(crate) mod pixel;
pub(crate) mod reader;
pub(crate) mod slice;
pub(crate) mod tags;
#[cfg(test)]
mod tests;

/// A specialized `Result` type for Aseprite parsing functions.
pub type Result<T> = std::result::Result<T, AsepriteParseError>;

pub use bucket::PixelBucket;
pub use cel::{CelChunk, CelContent, CelExtraChunk, CelType, ImageContent};
pub use chunk::{Chunk, ChunkKind, ChunkType};
pub use color::Color;
pub use error::AsepriteParseError;
pub use file::AsepriteFile;
pub use frame::Frame;
pub use header::{ColorDepth, Header};
pub use layer::{
    effective_visibility, parent_index, BlendMode, LayerChunk, LayerFlags, LayerType,
};
pub use metadata::{parse_layer_name, Metadata, MetadataKind};
pub use palette::{ColorPalette, ColorPaletteEntry};
pub use pixel::Pixels;
pub use slice::{NinePatch, Slice, SliceFlags, SliceKey};
pub use tags::{AnimationDirection, Tag};
