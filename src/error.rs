use std::{error::Error, fmt, io, string::FromUtf8Error};

/// A fatal error while decoding an Aseprite file.
///
/// Every variant aborts decoding of the whole file. Conditions the decoder can
/// recover from (unknown chunk types, malformed chunk records, indexed pixels
/// without a palette) are never reported through this type.
#[derive(Debug)]
pub enum AsepriteParseError {
    /// A magic number did not match. `what` names the record ("header" or
    /// "frame").
    BadMagic {
        /// Record whose magic number was checked.
        what: &'static str,
        /// The value required by the format.
        expected: u16,
        /// The value found in the stream.
        found: u16,
    },
    /// The header declares a color depth other than 8, 16 or 32 bits.
    UnsupportedColorDepth(u16),
    /// The input data was malformed. String contains detailed message.
    InvalidInput(String),
    /// An IO error occured. Also includes errors where the input was shorter
    /// than expected.
    IoError(io::Error),
}

impl AsepriteParseError {
    /// Returns `true` if this error describes a bad or unsupported file header
    /// rather than a broken frame body.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            AsepriteParseError::BadMagic { what: "header", .. }
                | AsepriteParseError::UnsupportedColorDepth(_)
        )
    }
}

impl From<io::Error> for AsepriteParseError {
    fn from(err: io::Error) -> Self {
        AsepriteParseError::IoError(err)
    }
}

impl From<FromUtf8Error> for AsepriteParseError {
    fn from(err: FromUtf8Error) -> Self {
        AsepriteParseError::InvalidInput(format!("Could not decode utf8: {}", err))
    }
}

impl fmt::Display for AsepriteParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AsepriteParseError::BadMagic {
                what,
                expected,
                found,
            } => write!(
                f,
                "Invalid magic number for {}: {:#06x} != {:#06x}",
                what, found, expected
            ),
            AsepriteParseError::UnsupportedColorDepth(depth) => {
                write!(f, "Unsupported color depth: {} bits per pixel", depth)
            }
            AsepriteParseError::InvalidInput(msg) => write!(f, "Invalid Aseprite input: {}", msg),
            AsepriteParseError::IoError(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl Error for AsepriteParseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AsepriteParseError::IoError(err) => Some(err),
            _ => None,
        }
    }
}
