//! `.shp2` ship definition container
//!
//! # File Layout
//!
//! ```text
//! FileHeader (32 bytes)
//! Section*   { tag: u32, body_size: u32, body: [u8; body_size] }
//! Tail       { 0xFFFFFFFF, 0 }
//! ```
//!
//! All integers are big-endian. Sections are written in this order:
//!
//! 1. Ship attributes (producer version, size, layer flags)
//! 2. Metadata
//! 3. Texture PNG, or a generated preview PNG when there is no texture
//! 4. Structural layer
//! 5. Electrical layer (optional)
//! 6. Ropes layer (optional)
//! 7. Physics data
//! 8. Auto-texturization settings (optional)
//!
//! Except for the two PNG sections, every section body is a sequence of
//! sub-records with the same `{tag, body_size, body}` shape, closed by a tail
//! sub-record. Readers skip unknown tags at both levels, which lets newer
//! producers add records without breaking older readers.
//!
//! # Layer Encoding
//!
//! Material grids are stored row-major from the bottom row as runs of
//! `(count: var_u16, color_key: [u8; 3])`; electrical runs of instanced
//! materials add a `var_u16` instance index. `#FFFFFF` marks empty cells.
//!
//! # Usage
//!
//! The free functions use [`ShipFormatConfig::default`]; [`ShipFormat`]
//! carries a custom configuration.
//!
//! ```no_run
//! use fsship_formats::{ImageSize, shp2};
//! use std::fs::File;
//! use std::io::BufReader;
//!
//! # fn main() -> Result<(), fsship_formats::ShipFileError> {
//! let mut reader = BufReader::new(File::open("ship.shp2")?);
//! let preview = shp2::load_preview_data(&mut reader)?;
//! println!("{} by {:?}", preview.metadata.ship_name, preview.metadata.author);
//!
//! let mut reader = BufReader::new(File::open("ship.shp2")?);
//! let image = shp2::load_preview_image(&mut reader, ImageSize::new(200, 200))?;
//! # Ok(())
//! # }
//! ```

mod attributes;
pub mod buffer;
mod electrical;
pub mod header;
mod metadata;
pub mod preview;
mod reader;
mod ropes;
pub mod rle;
pub mod section;
mod settings;
mod structural;
pub mod tags;
mod writer;

pub use attributes::ShipAttributes;
pub use buffer::{ByteBuffer, ByteReader, VAR_U16_MAX};
pub use header::{CURRENT_FILE_FORMAT_VERSION, FileHeader, HEADER_TITLE, SectionHeader};
pub use preview::{TrimmedBounds, make_preview_image, trimmed_bounds};
pub use tags::{MainSectionTag, TAIL_TAG, make_tag};

use crate::config::ShipFormatConfig;
use crate::definition::{ShipDefinition, ShipPreviewData};
use crate::error::Result;
use crate::material::MaterialDatabase;
use crate::raster::{ImageSize, RgbaImage};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::time::UNIX_EPOCH;

/// File extension of ship definition files
pub const SHIP_FILE_EXTENSION: &str = "shp2";

/// Ship file reader and writer with a fixed configuration
#[derive(Debug, Clone, Default)]
pub struct ShipFormat {
    config: ShipFormatConfig,
}

impl ShipFormat {
    /// Create with a configuration
    pub fn new(config: ShipFormatConfig) -> Self {
        Self { config }
    }

    /// Active configuration
    pub fn config(&self) -> &ShipFormatConfig {
        &self.config
    }

    /// Load a complete ship definition
    ///
    /// Reads up to the tail section. Ship attributes, metadata and the
    /// structural layer are mandatory; every color key must resolve in
    /// `materials`.
    pub fn load<R: Read>(&self, reader: &mut R, materials: &MaterialDatabase) -> Result<ShipDefinition> {
        reader::load(reader, materials, &self.config)
    }

    /// Load size, metadata and preview flags, stopping as soon as they are known
    pub fn load_preview_data<R: Read>(&self, reader: &mut R) -> Result<ShipPreviewData> {
        reader::load_preview_data(reader, &self.config)
    }

    /// Load the texture or preview image, shrunk to fit `max_size`
    pub fn load_preview_image<R: Read>(&self, reader: &mut R, max_size: ImageSize) -> Result<RgbaImage> {
        reader::load_preview_image(reader, max_size, &self.config)
    }

    /// Save a ship definition
    pub fn save<W: Write>(&self, definition: &ShipDefinition, writer: &mut W) -> Result<()> {
        writer::save(definition, writer, &self.config)
    }

    /// [`ShipFormat::load`] from a file
    pub fn load_file(&self, path: impl AsRef<Path>, materials: &MaterialDatabase) -> Result<ShipDefinition> {
        let mut reader = BufReader::new(File::open(path)?);
        self.load(&mut reader, materials)
    }

    /// [`ShipFormat::load_preview_data`] from a file
    ///
    /// Files without a stored write time report the file's modification time.
    pub fn load_preview_data_file(&self, path: impl AsRef<Path>) -> Result<ShipPreviewData> {
        let file = File::open(path)?;
        let modified = file.metadata()?.modified().ok();
        let mut preview = self.load_preview_data(&mut BufReader::new(file))?;

        if preview.last_write_time.is_none() {
            preview.last_write_time = modified
                .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
                .map(|elapsed| elapsed.as_secs());
        }

        Ok(preview)
    }

    /// [`ShipFormat::load_preview_image`] from a file
    pub fn load_preview_image_file(&self, path: impl AsRef<Path>, max_size: ImageSize) -> Result<RgbaImage> {
        let mut reader = BufReader::new(File::open(path)?);
        self.load_preview_image(&mut reader, max_size)
    }

    /// [`ShipFormat::save`] to a file, replacing it
    pub fn save_file(&self, definition: &ShipDefinition, path: impl AsRef<Path>) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.save(definition, &mut writer)
    }
}

/// Load a complete ship definition with the default configuration
pub fn load<R: Read>(reader: &mut R, materials: &MaterialDatabase) -> Result<ShipDefinition> {
    ShipFormat::default().load(reader, materials)
}

/// Load preview data with the default configuration
pub fn load_preview_data<R: Read>(reader: &mut R) -> Result<ShipPreviewData> {
    ShipFormat::default().load_preview_data(reader)
}

/// Load the preview image with the default configuration
pub fn load_preview_image<R: Read>(reader: &mut R, max_size: ImageSize) -> Result<RgbaImage> {
    ShipFormat::default().load_preview_image(reader, max_size)
}

/// Save a ship definition with the default configuration
pub fn save<W: Write>(definition: &ShipDefinition, writer: &mut W) -> Result<()> {
    ShipFormat::default().save(definition, writer)
}
