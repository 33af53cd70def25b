//! Structural and electrical materials
//!
//! Layer grids refer to materials by color key. Loading a ship resolves every
//! key against a [`MaterialDatabase`]; the resulting cells share the
//! database's `Arc`s, so two cells made of the same material point at the
//! same descriptor.
//!
//! # JSON Files
//!
//! [`MaterialDatabase::load_from_directory`] reads `materials_structural.json`
//! and `materials_electrical.json`:
//!
//! ```json
//! {
//!   "materials": [
//!     { "name": "Iron", "color_key": "#404050", "render_color": "#5A5A6E" },
//!     { "name": "Glass", "color_key": ["#A0C0E0", "#A0C0E1"], "opacity": 0.5 }
//!   ]
//! }
//! ```
//!
//! `render_color` defaults to the color key and may only be given for
//! single-key entries; `opacity` (default 1.0) becomes the render alpha.
//! Electrical entries additionally accept `is_instanced` (default false).

use crate::types::{EMPTY_MATERIAL_COLOR_KEY, MaterialColorKey, RgbColor, RgbaColor};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// File name of the structural material list
pub const STRUCTURAL_MATERIALS_FILE: &str = "materials_structural.json";

/// File name of the electrical material list
pub const ELECTRICAL_MATERIALS_FILE: &str = "materials_electrical.json";

/// Material database errors
#[derive(Debug, Error)]
pub enum MaterialDatabaseError {
    /// Failed to read a material file
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that could not be read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Material file is not valid JSON or has the wrong shape
    #[error("invalid material JSON in {file}: {source}")]
    InvalidJson {
        /// File (or source) name
        file: String,
        /// Underlying parse error
        #[source]
        source: serde_json::Error,
    },

    /// Material uses the color key reserved for empty cells
    #[error("material '{name}' uses the reserved empty color key")]
    ReservedColorKey {
        /// Material name
        name: String,
    },

    /// Two materials of the same kind share a color key
    #[error("duplicate color key {color_key}: '{existing}' and '{name}'")]
    DuplicateColorKey {
        /// Shared color key
        color_key: MaterialColorKey,
        /// Material registered first
        existing: String,
        /// Material rejected
        name: String,
    },

    /// Malformed `#RRGGBB` color
    #[error("material '{name}' has an invalid color '{value}'")]
    InvalidColor {
        /// Material name
        name: String,
        /// Offending value
        value: String,
    },

    /// `render_color` given on an entry with several color keys
    #[error("material '{name}' has several color keys and an explicit render color")]
    AmbiguousRenderColor {
        /// Material name
        name: String,
    },
}

/// Result type for material database operations
pub type Result<T> = std::result::Result<T, MaterialDatabaseError>;

/// Material of the structural and rope layers
#[derive(Debug, Clone, PartialEq)]
pub struct StructuralMaterial {
    /// Display name
    pub name: String,
    /// Key used in layer grids
    pub color_key: MaterialColorKey,
    /// Color used when rendering previews
    pub render_color: RgbaColor,
}

impl StructuralMaterial {
    /// Create a material
    pub fn new(name: impl Into<String>, color_key: MaterialColorKey, render_color: RgbaColor) -> Self {
        Self {
            name: name.into(),
            color_key,
            render_color,
        }
    }
}

/// Material of the electrical layer
#[derive(Debug, Clone, PartialEq)]
pub struct ElectricalMaterial {
    /// Display name
    pub name: String,
    /// Key used in layer grids
    pub color_key: MaterialColorKey,
    /// Color used when rendering previews
    pub render_color: RgbaColor,
    /// Whether cells of this material carry an instance index
    pub is_instanced: bool,
}

impl ElectricalMaterial {
    /// Create a material
    pub fn new(
        name: impl Into<String>,
        color_key: MaterialColorKey,
        render_color: RgbaColor,
        is_instanced: bool,
    ) -> Self {
        Self {
            name: name.into(),
            color_key,
            render_color,
            is_instanced,
        }
    }
}

/// Color-key index over all known materials
#[derive(Debug, Clone, Default)]
pub struct MaterialDatabase {
    structural: HashMap<MaterialColorKey, Arc<StructuralMaterial>>,
    electrical: HashMap<MaterialColorKey, Arc<ElectricalMaterial>>,
}

impl MaterialDatabase {
    /// Start building a database programmatically
    pub fn builder() -> MaterialDatabaseBuilder {
        MaterialDatabaseBuilder::default()
    }

    /// Structural material with the given color key
    pub fn find_structural(&self, color_key: MaterialColorKey) -> Option<&Arc<StructuralMaterial>> {
        self.structural.get(&color_key)
    }

    /// Electrical material with the given color key
    pub fn find_electrical(&self, color_key: MaterialColorKey) -> Option<&Arc<ElectricalMaterial>> {
        self.electrical.get(&color_key)
    }

    /// Number of structural materials
    pub fn structural_count(&self) -> usize {
        self.structural.len()
    }

    /// Number of electrical materials
    pub fn electrical_count(&self) -> usize {
        self.electrical.len()
    }

    /// Load both material files from a directory
    pub fn load_from_directory(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let read = |name: &str| {
            let path = dir.join(name);
            std::fs::read_to_string(&path).map_err(|source| MaterialDatabaseError::Io { path, source })
        };

        let structural = read(STRUCTURAL_MATERIALS_FILE)?;
        let electrical = read(ELECTRICAL_MATERIALS_FILE)?;
        Self::from_json_named(
            (STRUCTURAL_MATERIALS_FILE, &structural),
            (ELECTRICAL_MATERIALS_FILE, &electrical),
        )
    }

    /// Build a database from the contents of the two JSON files
    pub fn from_json(structural_json: &str, electrical_json: &str) -> Result<Self> {
        Self::from_json_named(
            (STRUCTURAL_MATERIALS_FILE, structural_json),
            (ELECTRICAL_MATERIALS_FILE, electrical_json),
        )
    }

    fn from_json_named(structural: (&str, &str), electrical: (&str, &str)) -> Result<Self> {
        let parse_error = |file: &str| {
            let file = file.to_string();
            move |source: serde_json::Error| MaterialDatabaseError::InvalidJson { file, source }
        };

        let structural_file: MaterialFile<StructuralMaterialJson> =
            serde_json::from_str(structural.1).map_err(parse_error(structural.0))?;
        let electrical_file: MaterialFile<ElectricalMaterialJson> =
            serde_json::from_str(electrical.1).map_err(parse_error(electrical.0))?;

        let mut builder = MaterialDatabaseBuilder::default();
        for entry in structural_file.materials {
            for (color_key, render_color) in entry.common.expand()? {
                builder.add_structural(StructuralMaterial::new(
                    entry.common.name.clone(),
                    color_key,
                    render_color,
                ))?;
            }
        }
        for entry in electrical_file.materials {
            for (color_key, render_color) in entry.common.expand()? {
                builder.add_electrical(ElectricalMaterial::new(
                    entry.common.name.clone(),
                    color_key,
                    render_color,
                    entry.is_instanced,
                ))?;
            }
        }

        Ok(builder.build())
    }
}

/// Incremental [`MaterialDatabase`] construction with key validation
#[derive(Debug, Default)]
pub struct MaterialDatabaseBuilder {
    database: MaterialDatabase,
}

impl MaterialDatabaseBuilder {
    /// Register a structural material, returning its shared handle
    pub fn add_structural(&mut self, material: StructuralMaterial) -> Result<Arc<StructuralMaterial>> {
        check_color_key(&material.name, material.color_key, |key| {
            self.database.structural.get(&key).map(|m| m.name.clone())
        })?;

        let material = Arc::new(material);
        self.database
            .structural
            .insert(material.color_key, Arc::clone(&material));
        Ok(material)
    }

    /// Register an electrical material, returning its shared handle
    pub fn add_electrical(&mut self, material: ElectricalMaterial) -> Result<Arc<ElectricalMaterial>> {
        check_color_key(&material.name, material.color_key, |key| {
            self.database.electrical.get(&key).map(|m| m.name.clone())
        })?;

        let material = Arc::new(material);
        self.database
            .electrical
            .insert(material.color_key, Arc::clone(&material));
        Ok(material)
    }

    /// Finish building
    pub fn build(self) -> MaterialDatabase {
        self.database
    }
}

fn check_color_key(
    name: &str,
    color_key: MaterialColorKey,
    existing: impl FnOnce(MaterialColorKey) -> Option<String>,
) -> Result<()> {
    if color_key == EMPTY_MATERIAL_COLOR_KEY {
        return Err(MaterialDatabaseError::ReservedColorKey {
            name: name.to_string(),
        });
    }

    if let Some(existing) = existing(color_key) {
        return Err(MaterialDatabaseError::DuplicateColorKey {
            color_key,
            existing,
            name: name.to_string(),
        });
    }

    Ok(())
}

#[derive(Deserialize)]
struct MaterialFile<T> {
    materials: Vec<T>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ColorKeys {
    Single(String),
    Multiple(Vec<String>),
}

#[derive(Deserialize)]
struct CommonMaterialJson {
    name: String,
    color_key: ColorKeys,
    #[serde(default)]
    render_color: Option<String>,
    #[serde(default = "default_opacity")]
    opacity: f32,
}

#[derive(Deserialize)]
struct StructuralMaterialJson {
    #[serde(flatten)]
    common: CommonMaterialJson,
}

#[derive(Deserialize)]
struct ElectricalMaterialJson {
    #[serde(flatten)]
    common: CommonMaterialJson,
    #[serde(default)]
    is_instanced: bool,
}

const fn default_opacity() -> f32 {
    1.0
}

impl CommonMaterialJson {
    /// One `(color key, render color)` pair per declared key
    fn expand(&self) -> Result<Vec<(MaterialColorKey, RgbaColor)>> {
        let parse = |value: &str| {
            RgbColor::from_hex(value).ok_or_else(|| MaterialDatabaseError::InvalidColor {
                name: self.name.clone(),
                value: value.to_string(),
            })
        };

        let keys = match &self.color_key {
            ColorKeys::Single(key) => vec![parse(key)?],
            ColorKeys::Multiple(keys) => keys.iter().map(|k| parse(k)).collect::<Result<Vec<_>>>()?,
        };

        let alpha = (self.opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
        let render_color = match (&self.render_color, keys.len()) {
            (Some(_), n) if n > 1 => {
                return Err(MaterialDatabaseError::AmbiguousRenderColor {
                    name: self.name.clone(),
                });
            }
            (Some(color), _) => Some(parse(color)?),
            (None, _) => None,
        };

        Ok(keys
            .into_iter()
            .map(|key| (key, render_color.unwrap_or(key).with_alpha(alpha)))
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    const STRUCTURAL: &str = r##"{
        "materials": [
            { "name": "Iron", "color_key": "#404050", "render_color": "#5A5A6E" },
            { "name": "Glass", "color_key": ["#A0C0E0", "#A0C0E1"], "opacity": 0.5 }
        ]
    }"##;

    const ELECTRICAL: &str = r##"{
        "materials": [
            { "name": "Cable", "color_key": "#C08000" },
            { "name": "Lamp", "color_key": "#FFFF00", "is_instanced": true }
        ]
    }"##;

    #[test]
    fn test_from_json() {
        let db = MaterialDatabase::from_json(STRUCTURAL, ELECTRICAL).expect("Failed to parse");
        assert_eq!(db.structural_count(), 3);
        assert_eq!(db.electrical_count(), 2);

        let iron = db.find_structural(RgbColor::new(0x40, 0x40, 0x50)).unwrap();
        assert_eq!(iron.name, "Iron");
        assert_eq!(iron.render_color, RgbaColor::new(0x5A, 0x5A, 0x6E, 255));

        let glass = db.find_structural(RgbColor::new(0xA0, 0xC0, 0xE1)).unwrap();
        assert_eq!(glass.render_color, RgbaColor::new(0xA0, 0xC0, 0xE1, 128));

        let lamp = db.find_electrical(RgbColor::new(255, 255, 0)).unwrap();
        assert!(lamp.is_instanced);
        assert!(!db.find_electrical(RgbColor::new(0xC0, 0x80, 0)).unwrap().is_instanced);
    }

    #[test]
    fn test_builder_shares_handles() {
        let mut builder = MaterialDatabase::builder();
        let iron = builder
            .add_structural(StructuralMaterial::new(
                "Iron",
                RgbColor::new(1, 2, 3),
                RgbaColor::new(1, 2, 3, 255),
            ))
            .unwrap();
        let db = builder.build();

        assert!(Arc::ptr_eq(&iron, db.find_structural(RgbColor::new(1, 2, 3)).unwrap()));
        assert!(db.find_structural(RgbColor::new(3, 2, 1)).is_none());
    }

    #[test]
    fn test_rejects_empty_color_key() {
        let json = r##"{ "materials": [ { "name": "Ghost", "color_key": "#FFFFFF" } ] }"##;
        let result = MaterialDatabase::from_json(json, r#"{ "materials": [] }"#);
        assert!(matches!(result, Err(MaterialDatabaseError::ReservedColorKey { name }) if name == "Ghost"));
    }

    #[test]
    fn test_rejects_duplicate_color_key() {
        let json = r##"{ "materials": [
            { "name": "A", "color_key": "#010101" },
            { "name": "B", "color_key": "#010101" }
        ] }"##;
        let result = MaterialDatabase::from_json(json, r#"{ "materials": [] }"#);
        assert!(matches!(
            result,
            Err(MaterialDatabaseError::DuplicateColorKey { existing, name, .. }) if existing == "A" && name == "B"
        ));
    }

    #[test]
    fn test_same_key_allowed_across_kinds() {
        let json = r##"{ "materials": [ { "name": "A", "color_key": "#010101" } ] }"##;
        let db = MaterialDatabase::from_json(json, json).expect("Failed to parse");
        assert_eq!(db.structural_count(), 1);
        assert_eq!(db.electrical_count(), 1);
    }

    #[test]
    fn test_rejects_bad_hex_and_ambiguous_render_color() {
        let bad = r##"{ "materials": [ { "name": "A", "color_key": "#01010" } ] }"##;
        assert!(matches!(
            MaterialDatabase::from_json(bad, r#"{ "materials": [] }"#),
            Err(MaterialDatabaseError::InvalidColor { .. })
        ));

        let ambiguous = r##"{ "materials": [
            { "name": "A", "color_key": ["#010101", "#020202"], "render_color": "#000000" }
        ] }"##;
        assert!(matches!(
            MaterialDatabase::from_json(ambiguous, r#"{ "materials": [] }"#),
            Err(MaterialDatabaseError::AmbiguousRenderColor { .. })
        ));
    }

    #[test]
    fn test_invalid_json_names_file() {
        let result = MaterialDatabase::from_json("{", r#"{ "materials": [] }"#);
        assert!(matches!(
            result,
            Err(MaterialDatabaseError::InvalidJson { file, .. }) if file == STRUCTURAL_MATERIALS_FILE
        ));
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(STRUCTURAL_MATERIALS_FILE), STRUCTURAL).unwrap();
        std::fs::write(dir.path().join(ELECTRICAL_MATERIALS_FILE), ELECTRICAL).unwrap();

        let db = MaterialDatabase::load_from_directory(dir.path()).expect("Failed to load");
        assert_eq!(db.structural_count(), 3);

        std::fs::remove_file(dir.path().join(ELECTRICAL_MATERIALS_FILE)).unwrap();
        assert!(matches!(
            MaterialDatabase::load_from_directory(dir.path()),
            Err(MaterialDatabaseError::Io { .. })
        ));
    }
}
