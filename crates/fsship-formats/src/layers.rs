//! Ship layers
//!
//! Layer buffers are dense, row-major grids with row 0 at the bottom of the
//! ship. Cells reference materials through shared handles; two cells are
//! equal when they reference materials with the same color key.

use crate::material::{ElectricalMaterial, StructuralMaterial};
use crate::raster::RgbaImage;
use crate::types::{
    EMPTY_MATERIAL_COLOR_KEY, ElectricalElementInstanceIndex, MaterialColorKey, RgbaColor,
    ShipSpaceCoordinates, ShipSpaceSize,
};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Dense 2D grid stored row by row from the bottom
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer2D<T> {
    size: ShipSpaceSize,
    data: Vec<T>,
}

impl<T: Clone> Buffer2D<T> {
    /// Grid of `size` filled with `fill`
    ///
    /// Returns `None` when `width * height` cells cannot be allocated.
    pub fn new(size: ShipSpaceSize, fill: T) -> Option<Self> {
        let len = size.linear_size()?;
        let mut data = Vec::new();
        data.try_reserve_exact(len).ok()?;
        data.resize(len, fill);
        Some(Self { size, data })
    }
}

impl<T> Buffer2D<T> {
    /// Wrap existing cells
    ///
    /// Returns `None` if `data` does not hold exactly `width * height` cells.
    pub fn from_vec(size: ShipSpaceSize, data: Vec<T>) -> Option<Self> {
        (size.linear_size() == Some(data.len())).then_some(Self { size, data })
    }

    /// Grid dimensions
    pub const fn size(&self) -> ShipSpaceSize {
        self.size
    }

    /// Cells in row-major order
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Cell at `(x, y)`
    pub fn get(&self, x: u32, y: u32) -> Option<&T> {
        self.index(x, y).map(|i| &self.data[i])
    }

    /// Mutable cell at `(x, y)`
    pub fn get_mut(&mut self, x: u32, y: u32) -> Option<&mut T> {
        self.index(x, y).map(|i| &mut self.data[i])
    }

    /// Overwrite the cell at `(x, y)`; returns `false` when out of range
    pub fn set(&mut self, x: u32, y: u32, value: T) -> bool {
        match self.get_mut(x, y) {
            Some(cell) => {
                *cell = value;
                true
            }
            None => false,
        }
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.size.width && y < self.size.height)
            .then(|| y as usize * self.size.width as usize + x as usize)
    }
}

/// Cell of the structural layer
#[derive(Debug, Clone, Default)]
pub struct StructuralElement {
    /// Material, or `None` for an empty cell
    pub material: Option<Arc<StructuralMaterial>>,
}

impl StructuralElement {
    /// Cell made of `material`
    pub fn new(material: Arc<StructuralMaterial>) -> Self {
        Self {
            material: Some(material),
        }
    }

    /// Color key written to files (the empty key for empty cells)
    pub fn color_key(&self) -> MaterialColorKey {
        self.material
            .as_ref()
            .map_or(EMPTY_MATERIAL_COLOR_KEY, |m| m.color_key)
    }

    /// Whether the cell holds a material
    pub fn is_occupied(&self) -> bool {
        self.material.is_some()
    }
}

impl PartialEq for StructuralElement {
    fn eq(&self, other: &Self) -> bool {
        self.color_key() == other.color_key()
    }
}

impl Eq for StructuralElement {}

/// Cell of the electrical layer
#[derive(Debug, Clone, Default)]
pub struct ElectricalElement {
    /// Material, or `None` for an empty cell
    pub material: Option<Arc<ElectricalMaterial>>,
    /// Instance index, meaningful for instanced materials only
    pub instance_index: Option<ElectricalElementInstanceIndex>,
}

impl ElectricalElement {
    /// Cell of a non-instanced material
    pub fn new(material: Arc<ElectricalMaterial>) -> Self {
        Self {
            material: Some(material),
            instance_index: None,
        }
    }

    /// Cell of an instanced material
    pub fn instanced(
        material: Arc<ElectricalMaterial>,
        instance_index: ElectricalElementInstanceIndex,
    ) -> Self {
        Self {
            material: Some(material),
            instance_index: Some(instance_index),
        }
    }

    /// Color key written to files (the empty key for empty cells)
    pub fn color_key(&self) -> MaterialColorKey {
        self.material
            .as_ref()
            .map_or(EMPTY_MATERIAL_COLOR_KEY, |m| m.color_key)
    }

    /// Whether the cell's material is instanced
    pub fn is_instanced(&self) -> bool {
        self.material.as_ref().is_some_and(|m| m.is_instanced)
    }
}

impl PartialEq for ElectricalElement {
    fn eq(&self, other: &Self) -> bool {
        self.color_key() == other.color_key() && self.instance_index == other.instance_index
    }
}

impl Eq for ElectricalElement {}

/// Per-instance metadata shown in the electrical panel
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ElectricalPanelElementMetadata {
    /// Position in the panel, if the user placed the element
    pub panel_coordinates: Option<crate::types::IntegralCoordinates>,
    /// User-defined label
    pub label: Option<String>,
    /// Whether the element is hidden from the panel
    pub is_hidden: bool,
}

/// Sparse, ordered map from instance index to panel metadata
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ElectricalPanel {
    entries: BTreeMap<ElectricalElementInstanceIndex, ElectricalPanelElementMetadata>,
}

impl ElectricalPanel {
    /// Empty panel
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry unless the index is already present
    ///
    /// Returns `false` (leaving the existing entry untouched) on duplicates.
    pub fn try_add(
        &mut self,
        instance_index: ElectricalElementInstanceIndex,
        metadata: ElectricalPanelElementMetadata,
    ) -> bool {
        match self.entries.entry(instance_index) {
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(metadata);
                true
            }
            std::collections::btree_map::Entry::Occupied(_) => false,
        }
    }

    /// Metadata for an instance
    pub fn get(
        &self,
        instance_index: ElectricalElementInstanceIndex,
    ) -> Option<&ElectricalPanelElementMetadata> {
        self.entries.get(&instance_index)
    }

    /// Entries ordered by instance index
    pub fn iter(
        &self,
    ) -> impl Iterator<Item = (ElectricalElementInstanceIndex, &ElectricalPanelElementMetadata)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the panel has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Structural layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuralLayerData {
    /// Cells
    pub buffer: Buffer2D<StructuralElement>,
}

impl StructuralLayerData {
    /// All-empty layer of `size`, or `None` if the grid cannot be allocated
    pub fn new(size: ShipSpaceSize) -> Option<Self> {
        Some(Self {
            buffer: Buffer2D::new(size, StructuralElement::default())?,
        })
    }
}

/// Electrical layer with its panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElectricalLayerData {
    /// Cells
    pub buffer: Buffer2D<ElectricalElement>,
    /// Panel metadata of instanced elements
    pub panel: ElectricalPanel,
}

impl ElectricalLayerData {
    /// All-empty layer of `size` with an empty panel
    pub fn new(size: ShipSpaceSize) -> Option<Self> {
        Some(Self {
            buffer: Buffer2D::new(size, ElectricalElement::default())?,
            panel: ElectricalPanel::new(),
        })
    }
}

/// Rope between two cells
#[derive(Debug, Clone)]
pub struct RopeElement {
    /// First endpoint
    pub start_coords: ShipSpaceCoordinates,
    /// Second endpoint
    pub end_coords: ShipSpaceCoordinates,
    /// Rope material
    pub material: Arc<StructuralMaterial>,
    /// Render color, independent of the material's
    pub render_color: RgbaColor,
}

impl PartialEq for RopeElement {
    fn eq(&self, other: &Self) -> bool {
        self.start_coords == other.start_coords
            && self.end_coords == other.end_coords
            && self.material.color_key == other.material.color_key
            && self.render_color == other.render_color
    }
}

impl Eq for RopeElement {}

/// Rope layer
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RopesLayerData {
    /// Ropes in drawing order
    pub elements: Vec<RopeElement>,
}

/// Texture layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureLayerData {
    /// Texture raster, any size
    pub image: RgbaImage,
}

/// All layers of a ship
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShipLayers {
    /// Grid size shared by all material layers
    pub size: ShipSpaceSize,
    /// Structural layer
    pub structural: StructuralLayerData,
    /// Electrical layer
    pub electrical: Option<ElectricalLayerData>,
    /// Rope layer
    pub ropes: Option<RopesLayerData>,
    /// Texture layer
    pub texture: Option<TextureLayerData>,
}

impl ShipLayers {
    /// Layers holding only an empty structural layer of `size`
    pub fn new(size: ShipSpaceSize) -> Option<Self> {
        Some(Self {
            size,
            structural: StructuralLayerData::new(size)?,
            electrical: None,
            ropes: None,
            texture: None,
        })
    }

    /// Check that every grid layer matches `size`
    pub fn validate(&self) -> Result<(), String> {
        if self.structural.buffer.size() != self.size {
            return Err(format!(
                "structural layer is {} but the ship is {}",
                self.structural.buffer.size(),
                self.size
            ));
        }

        if let Some(electrical) = &self.electrical
            && electrical.buffer.size() != self.size
        {
            return Err(format!(
                "electrical layer is {} but the ship is {}",
                electrical.buffer.size(),
                self.size
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::RgbColor;

    fn iron() -> Arc<StructuralMaterial> {
        Arc::new(StructuralMaterial::new(
            "Iron",
            RgbColor::new(10, 20, 30),
            RgbaColor::new(10, 20, 30, 255),
        ))
    }

    #[test]
    fn test_buffer_indexing() {
        let mut buffer = Buffer2D::new(ShipSpaceSize::new(3, 2), 0u8).unwrap();
        assert!(buffer.set(2, 1, 7));
        assert!(!buffer.set(3, 0, 1));
        assert_eq!(buffer.get(2, 1), Some(&7));
        assert_eq!(buffer.data()[5], 7);
        assert_eq!(buffer.get(0, 2), None);
    }

    #[test]
    fn test_buffer_too_large_to_allocate() {
        assert!(Buffer2D::new(ShipSpaceSize::new(u32::MAX, u32::MAX), 0u8).is_none());
        assert!(StructuralLayerData::new(ShipSpaceSize::new(u32::MAX, u32::MAX)).is_none());
    }

    #[test]
    fn test_buffer_from_vec_checks_length() {
        assert!(Buffer2D::from_vec(ShipSpaceSize::new(2, 2), vec![0u8; 3]).is_none());
        assert!(Buffer2D::from_vec(ShipSpaceSize::new(2, 2), vec![0u8; 4]).is_some());
    }

    #[test]
    fn test_structural_equality_by_color_key() {
        let a = StructuralElement::new(iron());
        let b = StructuralElement::new(iron());
        assert_eq!(a, b);
        assert_ne!(a, StructuralElement::default());
        assert_eq!(StructuralElement::default().color_key(), EMPTY_MATERIAL_COLOR_KEY);
    }

    #[test]
    fn test_electrical_equality_includes_instance() {
        let lamp = Arc::new(ElectricalMaterial::new(
            "Lamp",
            RgbColor::new(1, 1, 1),
            RgbaColor::new(1, 1, 1, 255),
            true,
        ));
        let a = ElectricalElement::instanced(Arc::clone(&lamp), 1);
        let b = ElectricalElement::instanced(lamp, 2);
        assert_ne!(a, b);
        assert!(a.is_instanced());
    }

    #[test]
    fn test_panel_keeps_first_duplicate() {
        let mut panel = ElectricalPanel::new();
        let first = ElectricalPanelElementMetadata {
            label: Some("first".to_string()),
            ..Default::default()
        };
        assert!(panel.try_add(5, first.clone()));
        assert!(!panel.try_add(5, ElectricalPanelElementMetadata::default()));
        assert!(panel.try_add(1, ElectricalPanelElementMetadata::default()));

        assert_eq!(panel.get(5), Some(&first));
        assert_eq!(panel.iter().map(|(i, _)| i).collect::<Vec<_>>(), vec![1, 5]);
    }

    #[test]
    fn test_layers_validate_sizes() {
        let mut layers = ShipLayers::new(ShipSpaceSize::new(4, 4)).unwrap();
        assert!(layers.validate().is_ok());

        layers.electrical = ElectricalLayerData::new(ShipSpaceSize::new(4, 3));
        assert!(layers.validate().is_err());
    }
}
