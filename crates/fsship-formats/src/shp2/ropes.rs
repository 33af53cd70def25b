//! Rope layer section

use crate::error::{Result, ShipFileError};
use crate::layers::{RopeElement, RopesLayerData};
use crate::material::MaterialDatabase;
use crate::shp2::attributes::ShipAttributes;
use crate::shp2::buffer::{ByteBuffer, ByteReader};
use crate::shp2::section::{SubRecords, append_section, append_tail};
use crate::shp2::structural::resolve_structural_material;
use crate::shp2::tags::RopesLayerTag;
use crate::types::ShipSpaceCoordinates;
use tracing::warn;

/// Encoded size of one rope: four `i32`, a color key and an RGBA color
const ROPE_RECORD_SIZE: usize = 4 * 4 + 3 + 4;

pub(crate) fn append_ropes_layer(layer: &RopesLayerData, buffer: &mut ByteBuffer) -> Result<()> {
    append_section(buffer, RopesLayerTag::Buffer.value(), |b| {
        let count = u32::try_from(layer.elements.len()).map_err(|_| {
            ShipFileError::invalid_definition(format!("{} ropes is too many", layer.elements.len()))
        })?;
        b.append_u32(count);

        for rope in &layer.elements {
            b.append_i32(rope.start_coords.x);
            b.append_i32(rope.start_coords.y);
            b.append_i32(rope.end_coords.x);
            b.append_i32(rope.end_coords.y);
            b.append_rgb(rope.material.color_key);
            b.append_rgba(rope.render_color);
        }

        Ok(())
    })?;
    append_tail(buffer);
    Ok(())
}

pub(crate) fn read_ropes_layer(
    body: &[u8],
    attributes: &ShipAttributes,
    materials: &MaterialDatabase,
) -> Result<RopesLayerData> {
    let mut layer = RopesLayerData::default();

    for record in SubRecords::new(body) {
        let record = record?;
        match RopesLayerTag::from_value(record.tag) {
            RopesLayerTag::Buffer => {
                layer.elements = read_ropes(&mut record.reader(), attributes, materials)?;
            }
            RopesLayerTag::Tail => {}
            RopesLayerTag::Unknown(tag) => {
                warn!("Skipping unknown ropes layer record {:#010x}", tag);
            }
        }
    }

    Ok(layer)
}

fn read_ropes(
    reader: &mut ByteReader<'_>,
    attributes: &ShipAttributes,
    materials: &MaterialDatabase,
) -> Result<Vec<RopeElement>> {
    let count = reader.read_u32()? as usize;
    let mut ropes = Vec::with_capacity(count.min(reader.remaining() / ROPE_RECORD_SIZE));

    for _ in 0..count {
        let start_x = reader.read_i32()?;
        let start_y = reader.read_i32()?;
        let end_x = reader.read_i32()?;
        let end_y = reader.read_i32()?;
        let color_key = reader.read_rgb()?;
        let render_color = reader.read_rgba()?;

        ropes.push(RopeElement {
            start_coords: ShipSpaceCoordinates::new(start_x, start_y),
            end_coords: ShipSpaceCoordinates::new(end_x, end_y),
            material: resolve_structural_material(materials, color_key, attributes)?,
            render_color,
        });
    }

    Ok(ropes)
}
