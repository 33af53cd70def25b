//! Preview generation from the structural layer
//!
//! The preview is the structural layer cropped to the bounding box of its
//! occupied cells. Occupied cells take their material's render color at full
//! opacity, empty cells are transparent white.

use crate::layers::StructuralLayerData;
use crate::raster::{ImageSize, RgbaImage};
use crate::types::RgbaColor;

/// Color of empty cells in generated previews
pub const EMPTY_PREVIEW_COLOR: RgbaColor = RgbaColor::new(255, 255, 255, 0);

/// Inclusive bounding box of occupied cells, in ship space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrimmedBounds {
    /// Leftmost occupied column
    pub min_x: u32,
    /// Rightmost occupied column
    pub max_x: u32,
    /// Lowest occupied row
    pub min_y: u32,
    /// Highest occupied row
    pub max_y: u32,
}

impl TrimmedBounds {
    /// Width in cells
    pub const fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    /// Height in cells
    pub const fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }
}

/// Bounding box of the occupied cells, or `None` if the layer is empty
pub fn trimmed_bounds(layer: &StructuralLayerData) -> Option<TrimmedBounds> {
    let buffer = &layer.buffer;
    let size = buffer.size();
    let occupied = |x: u32, y: u32| buffer.get(x, y).is_some_and(|cell| cell.is_occupied());

    let row_has_data = |y: u32| (0..size.width).any(|x| occupied(x, y));
    let min_y = (0..size.height).find(|&y| row_has_data(y))?;
    let max_y = (min_y..size.height).rev().find(|&y| row_has_data(y))?;

    let column_has_data = |x: u32| (min_y..=max_y).any(|y| occupied(x, y));
    let min_x = (0..size.width).find(|&x| column_has_data(x))?;
    let max_x = (min_x..size.width).rev().find(|&x| column_has_data(x))?;

    Some(TrimmedBounds {
        min_x,
        max_x,
        min_y,
        max_y,
    })
}

/// Rasterize the cropped structural layer
///
/// Raster row 0 is the highest ship row. An empty layer yields a single
/// transparent pixel.
pub fn make_preview_image(layer: &StructuralLayerData) -> RgbaImage {
    let Some(bounds) = trimmed_bounds(layer) else {
        return RgbaImage::new(ImageSize::new(1, 1), EMPTY_PREVIEW_COLOR);
    };

    let mut image = RgbaImage::new(
        ImageSize::new(bounds.width(), bounds.height()),
        EMPTY_PREVIEW_COLOR,
    );

    for row in 0..bounds.height() {
        let ship_y = bounds.max_y - row;
        for column in 0..bounds.width() {
            let material = layer
                .buffer
                .get(bounds.min_x + column, ship_y)
                .and_then(|cell| cell.material.as_ref());
            if let Some(material) = material {
                let color = material.render_color;
                image.set(column, row, RgbaColor::new(color.r, color.g, color.b, 255));
            }
        }
    }

    image
}
