//! Structural layer section

use crate::error::{Result, ShipFileError};
use crate::layers::{Buffer2D, StructuralElement, StructuralLayerData};
use crate::material::{MaterialDatabase, StructuralMaterial};
use crate::shp2::attributes::ShipAttributes;
use crate::shp2::buffer::ByteBuffer;
use crate::shp2::rle::{decode_runs, encode_runs};
use crate::shp2::section::{SubRecords, append_section, append_tail};
use crate::shp2::tags::StructuralLayerTag;
use crate::types::{EMPTY_MATERIAL_COLOR_KEY, MaterialColorKey, ShipSpaceSize};
use std::sync::Arc;
use tracing::warn;

pub(crate) fn append_structural_layer(layer: &StructuralLayerData, buffer: &mut ByteBuffer) -> Result<()> {
    append_section(buffer, StructuralLayerTag::Buffer.value(), |b| {
        encode_runs(layer.buffer.data(), b, |b, cell| {
            b.append_rgb(cell.color_key());
            Ok(())
        })
    })?;
    append_tail(buffer);
    Ok(())
}

pub(crate) fn read_structural_layer(
    body: &[u8],
    attributes: &ShipAttributes,
    materials: &MaterialDatabase,
) -> Result<StructuralLayerData> {
    let size = attributes.ship_size;
    let cell_count = layer_cell_count(size)?;
    let mut layer = None;

    for record in SubRecords::new(body) {
        let record = record?;
        match StructuralLayerTag::from_value(record.tag) {
            StructuralLayerTag::Buffer => {
                let cells = decode_runs(record.body, cell_count, |reader| {
                    let color_key = reader.read_rgb()?;
                    if color_key == EMPTY_MATERIAL_COLOR_KEY {
                        return Ok(StructuralElement::default());
                    }
                    let material = resolve_structural_material(materials, color_key, attributes)?;
                    Ok(StructuralElement::new(material))
                })?;
                layer = Some(StructuralLayerData {
                    buffer: layer_buffer(size, cells)?,
                });
            }
            StructuralLayerTag::Tail => {}
            StructuralLayerTag::Unknown(tag) => {
                warn!("Skipping unknown structural layer record {:#010x}", tag);
            }
        }
    }

    layer.ok_or_else(|| ShipFileError::invalid_file("structural layer section has no cell buffer"))
}

/// Look up a structural material, failing with the producer version
pub(crate) fn resolve_structural_material(
    materials: &MaterialDatabase,
    color_key: MaterialColorKey,
    attributes: &ShipAttributes,
) -> Result<Arc<StructuralMaterial>> {
    materials
        .find_structural(color_key)
        .cloned()
        .ok_or(ShipFileError::MaterialNotFound {
            color_key,
            file_version: attributes.file_fs_version,
        })
}

pub(crate) fn layer_cell_count(size: ShipSpaceSize) -> Result<usize> {
    size.linear_size()
        .ok_or_else(|| ShipFileError::invalid_file(format!("ship size {size} is too large")))
}

pub(crate) fn layer_buffer<T>(size: ShipSpaceSize, cells: Vec<T>) -> Result<Buffer2D<T>> {
    Buffer2D::from_vec(size, cells)
        .ok_or_else(|| ShipFileError::invalid_file(format!("layer does not match ship size {size}")))
}
