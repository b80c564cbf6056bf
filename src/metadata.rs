use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

static TRANSFORM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"@transform\("(.*)"\)"#).expect("valid transform pattern"));
static SECONDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@secondary\((.*)\)").expect("valid secondary pattern"));
static ARGUMENTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@(\w+)\((.*)\)").expect("valid arguments pattern"));

/// What a `@` layer describes.
#[cfg_attr(feature = "import", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataKind {
    /// A name that matched none of the known forms.
    Unknown,
    /// `@transform("name")`: a named point tracked per frame.
    Transform,
    /// `@secondary(name)` or one of the `@emission`, `@normal`, `@mask`
    /// shortcuts: the layer is rendered into its own texture.
    SecondaryTexture,
    /// `@name(arg arg ...)`: free-form arguments.
    Arguments,
}

/// Information carried by a metadata layer.
#[cfg_attr(feature = "import", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    /// Parsed form of the layer name.
    pub kind: MetadataKind,
    /// Index of the source layer.
    pub layer_index: usize,
    /// Full layer name, including the `@`.
    pub layer_name: String,
    /// Arguments, depending on `kind`: the transform name, the texture name,
    /// or `name=<name>` followed by the space-separated arguments.
    pub args: Vec<String>,
    /// Average position of the layer's pixels per frame, in world units.
    pub transforms: BTreeMap<usize, [f32; 2]>,
}

impl Metadata {
    /// Interpret a metadata layer name.
    pub fn new(layer_name: &str, layer_index: usize) -> Self {
        let (kind, args) = parse_layer_name(layer_name);
        Metadata {
            kind,
            layer_index,
            layer_name: layer_name.to_owned(),
            args,
            transforms: BTreeMap::new(),
        }
    }

    /// First argument, i.e. the transform or texture name.
    pub fn name(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }
}

/// Match a layer name against the known metadata forms, in priority order.
/// Patterns are not anchored.
pub fn parse_layer_name(name: &str) -> (MetadataKind, Vec<String>) {
    if let Some(caps) = TRANSFORM.captures(name) {
        return (MetadataKind::Transform, vec![caps[1].to_owned()]);
    }
    if let Some(caps) = SECONDARY.captures(name) {
        return (MetadataKind::SecondaryTexture, vec![caps[1].to_owned()]);
    }
    let shortcut = [
        ("@emission", "_Emission"),
        ("@normal", "_NormalMap"),
        ("@mask", "_MaskTex"),
    ]
    .iter()
    .find(|(alias, _)| name.eq_ignore_ascii_case(alias));
    if let Some((_, texture)) = shortcut {
        return (MetadataKind::SecondaryTexture, vec![(*texture).to_owned()]);
    }
    if let Some(caps) = ARGUMENTS.captures(name) {
        let mut args = vec![format!("name={}", &caps[1])];
        args.extend(caps[2].split(' ').map(str::to_owned));
        return (MetadataKind::Arguments, args);
    }
    (MetadataKind::Unknown, Vec::new())
}
