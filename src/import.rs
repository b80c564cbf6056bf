/*!
Batch import of `.aseprite` files into atlas textures and JSON descriptors.

For every input file the importer writes, into the configured output
directory:

- `{name}.png`, the atlas of all composited frames,
- `{name}{texture}.png` for every secondary texture layer (for example
  `hero_Emission.png` for a layer called `@emission`),
- `{name}.json`, a [SpriteSheetDescriptor].

`{name}` is the input file stem.
*/
use crate::{
    atlas::{Animation, Atlas, AtlasOptions, GridPolicy, SpriteEntry},
    AsepriteFile, AsepriteParseError, Metadata, MetadataKind,
};
use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, HashMap},
    error::Error,
    fmt, fs, io,
    path::{Path, PathBuf},
    thread,
};

/// Per-sprite import settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    /// Atlas grid arrangement.
    pub layout: GridPolicy,
    /// Emit one sprite per slice and frame in addition to whole frames.
    pub enable_slice_import: bool,
    /// Mirror frames horizontally.
    pub mirror_x: bool,
    /// Mirror frames vertically.
    pub mirror_y: bool,
    /// Sprite pivot as a fraction of the frame size, Y up.
    pub pivot: [f32; 2],
    /// Pixels per world unit, used for metadata transforms.
    pub pixels_per_unit: u32,
}

impl Default for ImportOptions {
    fn default() -> Self {
        ImportOptions {
            layout: GridPolicy::Square,
            enable_slice_import: false,
            mirror_x: false,
            mirror_y: false,
            pivot: [0.5, 0.5],
            pixels_per_unit: 1,
        }
    }
}

impl ImportOptions {
    fn atlas_options(&self) -> AtlasOptions {
        AtlasOptions {
            policy: self.layout,
            enable_slices: self.enable_slice_import,
            mirror_x: self.mirror_x,
            mirror_y: self.mirror_y,
            pivot: self.pivot,
        }
    }
}

/// Where to write results, and options per sprite name.
///
/// ```
/// # use asebake::import::ImportConfiguration;
/// let config = ImportConfiguration::from_json(r#"{
///     "output_directory": "build/sprites",
///     "sprites": { "hero": { "layout": "SingleRow" } }
/// }"#).unwrap();
/// assert!(!config.options_for("hero").enable_slice_import);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportConfiguration {
    /// Directory receiving textures and descriptors. Created if missing.
    pub output_directory: PathBuf,
    /// Options for sprites without an entry in `sprites`.
    #[serde(default)]
    pub default_options: ImportOptions,
    /// Options keyed by sprite name (the input file stem).
    #[serde(default)]
    pub sprites: HashMap<String, ImportOptions>,
}

impl ImportConfiguration {
    /// Configuration writing to `output_directory` with default options.
    pub fn new<P: Into<PathBuf>>(output_directory: P) -> Self {
        ImportConfiguration {
            output_directory: output_directory.into(),
            default_options: ImportOptions::default(),
            sprites: HashMap::new(),
        }
    }

    /// Parse a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ImportError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON configuration file.
    pub fn read_file(path: &Path) -> Result<Self, ImportError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Options for `sprite_name`.
    pub fn options_for(&self, sprite_name: &str) -> &ImportOptions {
        self.sprites
            .get(sprite_name)
            .unwrap_or(&self.default_options)
    }
}

/// Everything a runtime needs to use an imported sprite sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteSheetDescriptor {
    /// Sprite name (input file stem).
    pub name: String,
    /// File name of the main atlas, relative to the output directory.
    pub atlas_texture_path: String,
    /// Secondary atlas file names keyed by texture name.
    pub secondary_texture_paths: BTreeMap<String, String>,
    #[allow(missing_docs)]
    pub frame_count: usize,
    #[allow(missing_docs)]
    pub animation_count: usize,
    #[allow(missing_docs)]
    pub sprites: Vec<SpriteEntry>,
    #[allow(missing_docs)]
    pub animations: Vec<Animation>,
    /// Metadata layers with their per-frame transforms.
    pub metadata: Vec<Metadata>,
}

impl SpriteSheetDescriptor {
    /// Look up an animation by name.
    pub fn animation(&self, name: &str) -> Option<&Animation> {
        self.animations.iter().find(|a| a.name == name)
    }
}

/// An error while importing a file.
#[derive(Debug)]
pub enum ImportError {
    /// The input could not be decoded.
    Parse(AsepriteParseError),
    /// Reading input or writing output failed.
    Io(io::Error),
    /// A texture could not be encoded.
    Image(image::ImageError),
    /// A descriptor or configuration could not be (de)serialized.
    Json(serde_json::Error),
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportError::Parse(err) => write!(f, "Could not parse sprite: {}", err),
            ImportError::Io(err) => write!(f, "IO error: {}", err),
            ImportError::Image(err) => write!(f, "Could not write texture: {}", err),
            ImportError::Json(err) => write!(f, "JSON error: {}", err),
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ImportError::Parse(err) => Some(err),
            ImportError::Io(err) => Some(err),
            ImportError::Image(err) => Some(err),
            ImportError::Json(err) => Some(err),
        }
    }
}

impl From<AsepriteParseError> for ImportError {
    fn from(err: AsepriteParseError) -> Self {
        ImportError::Parse(err)
    }
}

impl From<io::Error> for ImportError {
    fn from(err: io::Error) -> Self {
        ImportError::Io(err)
    }
}

impl From<image::ImageError> for ImportError {
    fn from(err: image::ImageError) -> Self {
        ImportError::Image(err)
    }
}

impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        ImportError::Json(err)
    }
}

/// Import a single file.
///
/// A missing input file is logged and skipped: the result is `Ok(None)`.
pub fn import_file(
    path: &Path,
    config: &ImportConfiguration,
) -> Result<Option<SpriteSheetDescriptor>, ImportError> {
    if !path.exists() {
        error!("Unable to find sprite file {}", path.display());
        return Ok(None);
    }
    info!("Importing {}", path.display());

    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file = AsepriteFile::read_file(path)?;
    let descriptor = write_sprite_sheet(&file, &name, config)?;
    Ok(Some(descriptor))
}

/// Import several files concurrently, one thread per file. Results are in
/// input order; a failure does not affect sibling imports.
pub fn import_all(
    paths: &[PathBuf],
    config: &ImportConfiguration,
) -> Vec<Result<Option<SpriteSheetDescriptor>, ImportError>> {
    thread::scope(|scope| {
        let handles: Vec<_> = paths
            .iter()
            .map(|path| scope.spawn(move || import_file(path, config)))
            .collect();
        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
            })
            .collect()
    })
}

/// Build the atlas for an already decoded file and write all outputs.
pub fn write_sprite_sheet(
    file: &AsepriteFile,
    name: &str,
    config: &ImportConfiguration,
) -> Result<SpriteSheetDescriptor, ImportError> {
    let options = config.options_for(name);
    let atlas_options = options.atlas_options();
    let out_dir = &config.output_directory;
    fs::create_dir_all(out_dir)?;

    let atlas = Atlas::build(file, name, &atlas_options);
    let atlas_texture_path = format!("{}.png", name);
    atlas.texture.to_image().save(out_dir.join(&atlas_texture_path))?;

    let metadata = file.metadata(options.pivot, options.pixels_per_unit);
    let mut secondary_texture_paths = BTreeMap::new();
    for meta in metadata
        .iter()
        .filter(|m| m.kind == MetadataKind::SecondaryTexture)
    {
        let texture_name = match meta.name() {
            Some(texture_name) => texture_name,
            None => continue,
        };
        let texture = atlas.layer_texture(file, meta.layer_index, &atlas_options);
        let texture_path = format!("{}{}.png", name, texture_name);
        debug!("Writing secondary texture {}", texture_path);
        texture.to_image().save(out_dir.join(&texture_path))?;
        secondary_texture_paths.insert(texture_name.to_owned(), texture_path);
    }

    let descriptor = SpriteSheetDescriptor {
        name: name.to_owned(),
        atlas_texture_path,
        secondary_texture_paths,
        frame_count: file.num_frames(),
        animation_count: atlas.animations.len(),
        sprites: atlas.sprites,
        animations: atlas.animations,
        metadata,
    };
    let json = serde_json::to_string_pretty(&descriptor)?;
    fs::write(out_dir.join(format!("{}.json", name)), json)?;
    Ok(descriptor)
}
