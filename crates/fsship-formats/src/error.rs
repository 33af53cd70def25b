//! Error types for ship file operations

use crate::raster::ImageError;
use crate::types::{MaterialColorKey, Version};
use thiserror::Error;

/// Errors that can occur while loading or saving ship files
#[derive(Debug, Error)]
pub enum ShipFileError {
    /// The file header title does not identify a ship file
    #[error("unrecognized file: not a ship definition")]
    UnrecognizedFile,

    /// The file format version is newer than this reader supports
    #[error("unsupported file format version {version} (max supported: {supported})")]
    UnsupportedFile {
        /// Version found in the file header
        version: u16,
        /// Highest version this reader understands
        supported: u16,
    },

    /// Truncated, malformed or incomplete file
    #[error("invalid ship file: {0}")]
    InvalidFile(String),

    /// A layer references a material missing from the material database
    #[error("material {color_key} not found; the ship was created with version {file_version}")]
    MaterialNotFound {
        /// Color key that could not be resolved
        color_key: MaterialColorKey,
        /// Version of the program that produced the file
        file_version: Version,
    },

    /// The ship definition cannot be represented in the file format
    #[error("invalid ship definition: {0}")]
    InvalidDefinition(String),

    /// PNG encoding or decoding failed
    #[error("image error: {0}")]
    Image(#[from] ImageError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ShipFileError {
    /// Shorthand for an [`ShipFileError::InvalidFile`] error
    pub fn invalid_file(reason: impl Into<String>) -> Self {
        Self::InvalidFile(reason.into())
    }

    /// Shorthand for an [`ShipFileError::InvalidDefinition`] error
    pub fn invalid_definition(reason: impl Into<String>) -> Self {
        Self::InvalidDefinition(reason.into())
    }
}

impl From<binrw::Error> for ShipFileError {
    fn from(err: binrw::Error) -> Self {
        match err {
            binrw::Error::Io(io) => Self::Io(io),
            other => Self::InvalidFile(other.to_string()),
        }
    }
}

/// Result type for ship file operations
pub type Result<T> = std::result::Result<T, ShipFileError>;

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::RgbColor;

    #[test]
    fn test_material_not_found_message() {
        let err = ShipFileError::MaterialNotFound {
            color_key: RgbColor::new(0x12, 0x34, 0x56),
            file_version: Version::new(1, 18, 2, 0),
        };
        assert_eq!(
            err.to_string(),
            "material #123456 not found; the ship was created with version 1.18.2.0"
        );
    }

    #[test]
    fn test_binrw_io_error_keeps_io_kind() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe");
        let err: ShipFileError = binrw::Error::Io(io).into();
        assert!(matches!(err, ShipFileError::Io(e) if e.kind() == std::io::ErrorKind::BrokenPipe));
    }
}
