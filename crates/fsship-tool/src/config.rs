//! Tool configuration management.
//!
//! Options come from CLI arguments, with environment variables for the
//! settings that usually stay the same between invocations:
//! - `FSSHIP_MATERIALS_DIR`: directory holding the material JSON files
//! - `FSSHIP_MAX_SECTION_SIZE`: largest section body the reader accepts
//!
//! # Example
//!
//! ```no_run
//! use fsship_tool::ToolConfig;
//!
//! let config = ToolConfig::from_args();
//! config.validate().expect("Invalid configuration");
//!
//! println!("max section size: {}", config.max_section_size);
//! ```

use crate::error::ConfigError;
use clap::{Parser, Subcommand};
use fsship_formats::material::{ELECTRICAL_MATERIALS_FILE, STRUCTURAL_MATERIALS_FILE};
use fsship_formats::{ImageSize, ShipFormatConfig, config::DEFAULT_MAX_SECTION_BODY_SIZE};
use std::path::{Path, PathBuf};

/// Tool configuration loaded from CLI args and environment variables.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "fsship-tool",
    about = "Inspect, preview and re-save .shp2 ship files",
    version
)]
pub struct ToolConfig {
    /// Largest section body accepted when reading, in bytes
    #[arg(
        long,
        global = true,
        env = "FSSHIP_MAX_SECTION_SIZE",
        default_value_t = DEFAULT_MAX_SECTION_BODY_SIZE
    )]
    pub max_section_size: u32,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print size, metadata and preview flags without reading the layers
    Info {
        /// Ship file
        file: PathBuf,
    },

    /// Extract the preview image as PNG
    Preview {
        /// Ship file
        file: PathBuf,

        /// PNG file to write
        output: PathBuf,

        /// Maximum preview width
        #[arg(long, default_value_t = 512)]
        max_width: u32,

        /// Maximum preview height
        #[arg(long, default_value_t = 512)]
        max_height: u32,
    },

    /// Load every layer and print layer statistics
    Check {
        /// Ship file
        file: PathBuf,

        /// Directory with the material JSON files
        #[arg(long, env = "FSSHIP_MATERIALS_DIR")]
        materials: PathBuf,
    },

    /// Load a ship and save it again in the current format
    Resave {
        /// Ship file to read
        input: PathBuf,

        /// Ship file to write
        output: PathBuf,

        /// Directory with the material JSON files
        #[arg(long, env = "FSSHIP_MATERIALS_DIR")]
        materials: PathBuf,
    },
}

impl ToolConfig {
    /// Parse configuration from command-line arguments.
    #[must_use]
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Reader/writer configuration for the ship format.
    #[must_use]
    pub fn format_config(&self) -> ShipFormatConfig {
        ShipFormatConfig::default().with_max_section_body_size(self.max_section_size)
    }

    /// Validate configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The maximum section size or a preview dimension is zero
    /// - An input ship file doesn't exist
    /// - The materials directory lacks one of the material files
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_section_size == 0 {
            return Err(ConfigError::InvalidValue {
                name: "max-section-size",
                reason: "must be greater than zero".to_string(),
            });
        }

        match &self.command {
            Command::Info { file } => require_file(file),
            Command::Preview {
                file,
                max_width,
                max_height,
                ..
            } => {
                require_file(file)?;
                if *max_width == 0 || *max_height == 0 {
                    return Err(ConfigError::InvalidValue {
                        name: "max-width/max-height",
                        reason: format!(
                            "preview size {} has a zero dimension",
                            ImageSize::new(*max_width, *max_height)
                        ),
                    });
                }
                Ok(())
            }
            Command::Check { file, materials } => {
                require_file(file)?;
                require_materials_dir(materials)
            }
            Command::Resave {
                input, materials, ..
            } => {
                require_file(input)?;
                require_materials_dir(materials)
            }
        }
    }
}

fn require_file(path: &Path) -> Result<(), ConfigError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ConfigError::FileNotFound(path.to_path_buf()))
    }
}

fn require_materials_dir(path: &Path) -> Result<(), ConfigError> {
    if !path.is_dir() {
        return Err(ConfigError::InvalidMaterialsDirectory {
            path: path.to_path_buf(),
            reason: "not a directory".to_string(),
        });
    }

    for file in [STRUCTURAL_MATERIALS_FILE, ELECTRICAL_MATERIALS_FILE] {
        if !path.join(file).is_file() {
            return Err(ConfigError::InvalidMaterialsDirectory {
                path: path.to_path_buf(),
                reason: format!("missing {file}"),
            });
        }
    }

    Ok(())
}
