//! Format configuration

use crate::types::Version;

/// Default limit on a single section body (256 MiB)
pub const DEFAULT_MAX_SECTION_BODY_SIZE: u32 = 256 * 1024 * 1024;

/// Default limit on the cells of a ship grid (8192 x 8192)
pub const DEFAULT_MAX_SHIP_CELLS: usize = 8192 * 8192;

/// Settings for reading and writing ship files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShipFormatConfig {
    /// Largest section body a reader will buffer; larger bodies are rejected
    pub max_section_body_size: u32,
    /// Largest `width * height` a reader will accept from the ship attributes
    pub max_ship_cells: usize,
    /// Version written to the attributes section of saved files
    pub producer_version: Version,
}

impl Default for ShipFormatConfig {
    fn default() -> Self {
        Self {
            max_section_body_size: DEFAULT_MAX_SECTION_BODY_SIZE,
            max_ship_cells: DEFAULT_MAX_SHIP_CELLS,
            producer_version: Version::current(),
        }
    }
}

impl ShipFormatConfig {
    /// Set the section body limit
    pub fn with_max_section_body_size(mut self, max_section_body_size: u32) -> Self {
        self.max_section_body_size = max_section_body_size;
        self
    }

    /// Set the ship cell limit
    pub fn with_max_ship_cells(mut self, max_ship_cells: usize) -> Self {
        self.max_ship_cells = max_ship_cells;
        self
    }

    /// Set the producer version
    pub fn with_producer_version(mut self, producer_version: Version) -> Self {
        self.producer_version = producer_version;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_methods() {
        let config = ShipFormatConfig::default()
            .with_max_section_body_size(1024)
            .with_max_ship_cells(64)
            .with_producer_version(Version::new(1, 18, 0, 3));
        assert_eq!(config.max_section_body_size, 1024);
        assert_eq!(config.max_ship_cells, 64);
        assert_eq!(config.producer_version, Version::new(1, 18, 0, 3));
        assert_eq!(
            ShipFormatConfig::default().max_section_body_size,
            DEFAULT_MAX_SECTION_BODY_SIZE
        );
    }
}
