//! Reader and writer for `.shp2` ship definition files
//!
#![allow(clippy::cast_possible_truncation)] // Intentional for binary format parsing
#![allow(clippy::cast_possible_wrap)] // Intentional for binary operations
#![allow(clippy::cast_lossless)] // Sometimes clearer than From
#![allow(clippy::uninlined_format_args)] // Backwards compatibility
#![allow(clippy::doc_markdown)] // Format terms don't need backticks
#![allow(clippy::module_name_repetitions)] // Clear naming is preferred
#![allow(clippy::similar_names)] // Domain-specific naming patterns
#![allow(clippy::float_cmp)] // Binary format requirements
#![allow(clippy::cast_precision_loss)] // Image scaling factors
#![allow(clippy::derive_partial_eq_without_eq)] // Structs carrying f32 fields
#![allow(clippy::redundant_closure_for_method_calls)] // Iterator chains
#![allow(clippy::return_self_not_must_use)] // Builder patterns
#![allow(clippy::use_self)] // Type clarity
//! A ship definition is a layered 2D grid: a structural material layer, an
//! optional electrical layer, an optional rope layer and an optional texture
//! raster, plus metadata, physics parameters and auto-texturization settings.
//! This crate persists and restores such definitions in the `.shp2` binary
//! container and derives preview images from them.
//!
//! # Container Layout
//!
//! - **File header**: 32 bytes, fixed title and a file format version
//! - **Sections**: `{tag, body_size, body}` records, terminated by a tail
//!   section; section bodies are themselves sequences of tagged sub-records
//! - **Layers**: material grids are run-length encoded; texture and preview
//!   images are stored as PNG
//!
//! # Design Principles
//!
//! - **Forward compatible**: unknown tags are skipped at every level
//! - **Early exit**: preview loaders stop reading once they have what they need
//! - **Round-Trip Guarantee**: load(save(ship)) == ship
//!
//! # Example
//!
//! ```no_run
//! use fsship_formats::{MaterialDatabase, shp2};
//! use std::fs::File;
//! use std::io::BufReader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let materials = MaterialDatabase::load_from_directory("data/materials")?;
//! let mut reader = BufReader::new(File::open("ship.shp2")?);
//! let ship = shp2::load(&mut reader, &materials)?;
//! println!("{} ({}x{})", ship.metadata.ship_name, ship.layers.size.width, ship.layers.size.height);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

/// Format configuration (limits and producer version)
pub mod config;

/// In-memory ship definition
pub mod definition;

/// Error types shared by the whole crate
pub mod error;

/// Ship layer buffers and their elements
pub mod layers;

/// Structural and electrical materials and the material database
pub mod material;

/// RGBA rasters and the PNG codec boundary
pub mod raster;

/// The `.shp2` container format
///
/// Framing, run-length layer codec, sub-record codecs, preview generation
/// and the load/save orchestration.
pub mod shp2;

/// Primitive value types (colors, coordinates, versions)
pub mod types;

pub use config::ShipFormatConfig;
pub use definition::{
    AutoTexturizationMode, ShipAutoTexturizationSettings, ShipCategory, ShipDefinition,
    ShipMetadata, ShipPhysicsData, ShipPreviewData, ShipSpaceToWorldSpaceCoordsRatio,
    calculate_password_hash,
};
pub use error::{Result, ShipFileError};
pub use layers::{
    Buffer2D, ElectricalElement, ElectricalLayerData, ElectricalPanel,
    ElectricalPanelElementMetadata, RopeElement, RopesLayerData, ShipLayers, StructuralElement,
    StructuralLayerData, TextureLayerData,
};
pub use material::{
    ElectricalMaterial, MaterialDatabase, MaterialDatabaseBuilder, MaterialDatabaseError,
    StructuralMaterial,
};
pub use raster::{ImageError, ImageSize, RgbaImage};
pub use types::{
    ElectricalElementInstanceIndex, IntegralCoordinates, MaterialColorKey, RgbColor, RgbaColor,
    ShipSpaceCoordinates, ShipSpaceSize, Version,
};
