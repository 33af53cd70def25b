//! Error types for the ship tool.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors, reported before any command runs.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Input file does not exist
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Materials directory does not exist or lacks a material file
    #[error("Invalid materials directory {}: {reason}", .path.display())]
    InvalidMaterialsDirectory {
        /// Directory given on the command line
        path: PathBuf,
        /// What is wrong with it
        reason: String,
    },

    /// Numeric option out of range
    #[error("Invalid value for {name}: {reason}")]
    InvalidValue {
        /// Option name
        name: &'static str,
        /// Reason for invalidity
        reason: String,
    },
}
