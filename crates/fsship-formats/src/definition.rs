//! In-memory ship definition

use crate::layers::ShipLayers;
use crate::types::ShipSpaceSize;

/// Category shown in ship browsers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShipCategory {
    /// Modelled after a real vessel
    Historical,
    /// Invented design
    Fictional,
    /// Physics experiment or test rig
    Physics,
}

impl ShipCategory {
    /// On-disk value
    pub const fn to_u64(self) -> u64 {
        match self {
            Self::Historical => 0,
            Self::Fictional => 1,
            Self::Physics => 2,
        }
    }

    /// Category for an on-disk value
    pub const fn from_u64(value: u64) -> Option<Self> {
        match value {
            0 => Some(Self::Historical),
            1 => Some(Self::Fictional),
            2 => Some(Self::Physics),
            _ => None,
        }
    }
}

/// Ratio converting ship-space units to world-space units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShipSpaceToWorldSpaceCoordsRatio {
    /// Ship-space units
    pub input_units: f32,
    /// Corresponding world-space units
    pub output_units: f32,
}

impl ShipSpaceToWorldSpaceCoordsRatio {
    /// Create a ratio
    pub const fn new(input_units: f32, output_units: f32) -> Self {
        Self {
            input_units,
            output_units,
        }
    }
}

impl Default for ShipSpaceToWorldSpaceCoordsRatio {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

/// Descriptive ship metadata
#[derive(Debug, Clone, PartialEq)]
pub struct ShipMetadata {
    /// Ship name, must not be empty when saving
    pub ship_name: String,
    /// Author
    pub author: Option<String>,
    /// Credits for texture artwork
    pub art_credits: Option<String>,
    /// Year the real ship was built
    pub year_built: Option<String>,
    /// Category
    pub category: Option<ShipCategory>,
    /// Free-form description
    pub description: Option<String>,
    /// Ship-to-world scale
    pub scale: ShipSpaceToWorldSpaceCoordsRatio,
    /// Hash of the edit password, see [`calculate_password_hash`]
    pub password: Option<u64>,
    /// Hide the electrical layer from previews
    pub do_hide_electricals_in_preview: bool,
    /// Hide the texture from previews
    pub do_hide_hd_in_preview: bool,
}

impl ShipMetadata {
    /// Metadata with only a name set
    pub fn new(ship_name: impl Into<String>) -> Self {
        Self {
            ship_name: ship_name.into(),
            author: None,
            art_credits: None,
            year_built: None,
            category: None,
            description: None,
            scale: ShipSpaceToWorldSpaceCoordsRatio::default(),
            password: None,
            do_hide_electricals_in_preview: false,
            do_hide_hd_in_preview: false,
        }
    }
}

/// Physical parameters of the ship
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShipPhysicsData {
    /// Offset of the ship origin in world space
    pub offset: (f32, f32),
    /// Initial internal pressure, in atmospheres
    pub internal_pressure: f32,
}

impl Default for ShipPhysicsData {
    fn default() -> Self {
        Self {
            offset: (0.0, 0.0),
            internal_pressure: 1.0,
        }
    }
}

/// How the simulation derives a texture for ships without one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AutoTexturizationMode {
    /// Flat render colors of the structure
    FlatStructure,
    /// Per-material textures
    MaterialTextures,
}

impl AutoTexturizationMode {
    /// On-disk value
    pub const fn to_u32(self) -> u32 {
        match self {
            Self::FlatStructure => 1,
            Self::MaterialTextures => 2,
        }
    }

    /// Mode for an on-disk value
    pub const fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::FlatStructure),
            2 => Some(Self::MaterialTextures),
            _ => None,
        }
    }
}

/// Auto-texturization settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShipAutoTexturizationSettings {
    /// Texturization mode
    pub mode: AutoTexturizationMode,
    /// Magnification of material textures
    pub material_texture_magnification: f32,
    /// Transparency of material textures, 0 to 1
    pub material_texture_transparency: f32,
}

impl Default for ShipAutoTexturizationSettings {
    fn default() -> Self {
        Self {
            mode: AutoTexturizationMode::MaterialTextures,
            material_texture_magnification: 1.0,
            material_texture_transparency: 0.0,
        }
    }
}

/// Complete ship definition
#[derive(Debug, Clone, PartialEq)]
pub struct ShipDefinition {
    /// Layers
    pub layers: ShipLayers,
    /// Metadata
    pub metadata: ShipMetadata,
    /// Physics parameters
    pub physics_data: ShipPhysicsData,
    /// Auto-texturization settings, when the ship overrides the defaults
    pub auto_texturization_settings: Option<ShipAutoTexturizationSettings>,
}

/// Summary used by ship browsers, see [`crate::shp2::load_preview_data`]
#[derive(Debug, Clone, PartialEq)]
pub struct ShipPreviewData {
    /// Grid size
    pub ship_size: ShipSpaceSize,
    /// Seconds since the Unix epoch of the last save, when known
    pub last_write_time: Option<u64>,
    /// Metadata
    pub metadata: ShipMetadata,
    /// Has a texture that may be shown
    pub is_hd: bool,
    /// Has electricals that may be shown
    pub has_electricals: bool,
}

/// Salt appended to passwords before hashing
const PASSWORD_SALT: &str = "fs_salt_0$%";

/// Hash a ship edit password
///
/// The first eight bytes, big-endian, of the MD5 digest of the salted
/// password. Stable across platforms and releases.
pub fn calculate_password_hash(password: &str) -> u64 {
    let mut salted = String::with_capacity(password.len() + PASSWORD_SALT.len());
    salted.push_str(password);
    salted.push_str(PASSWORD_SALT);

    let digest = md5::compute(salted.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest.0[..8]);
    u64::from_be_bytes(prefix)
}
