//! Electrical layer section
//!
//! - `BUF1`: run-length encoded cells; instanced materials append the
//!   instance index to each run
//! - `PNL1`: panel entries, written only when the panel is not empty

use crate::error::{Result, ShipFileError};
use crate::layers::{
    ElectricalElement, ElectricalLayerData, ElectricalPanel,
    ElectricalPanelElementMetadata,
};
use crate::material::MaterialDatabase;
use crate::shp2::attributes::ShipAttributes;
use crate::shp2::buffer::{ByteBuffer, ByteReader, VAR_U16_MAX};
use crate::shp2::rle::{decode_runs, encode_runs};
use crate::shp2::section::{SubRecords, append_section, append_tail};
use crate::shp2::structural::{layer_buffer, layer_cell_count};
use crate::shp2::tags::ElectricalLayerTag;
use crate::types::{EMPTY_MATERIAL_COLOR_KEY, IntegralCoordinates};
use std::sync::Arc;
use tracing::warn;

pub(crate) fn append_electrical_layer(layer: &ElectricalLayerData, buffer: &mut ByteBuffer) -> Result<()> {
    append_section(buffer, ElectricalLayerTag::Buffer.value(), |b| {
        encode_runs(layer.buffer.data(), b, append_element)
    })?;

    if !layer.panel.is_empty() {
        append_section(buffer, ElectricalLayerTag::Panel.value(), |b| {
            append_panel(&layer.panel, b)
        })?;
    }

    append_tail(buffer);
    Ok(())
}

fn append_element(buffer: &mut ByteBuffer, element: &ElectricalElement) -> Result<()> {
    buffer.append_rgb(element.color_key());

    if element.is_instanced() {
        let index = element.instance_index.ok_or_else(|| {
            ShipFileError::invalid_definition(format!(
                "instanced electrical element of material {} has no instance index",
                element.color_key()
            ))
        })?;
        if index > VAR_U16_MAX {
            return Err(ShipFileError::invalid_definition(format!(
                "electrical instance index {index} exceeds the maximum {VAR_U16_MAX}"
            )));
        }
        buffer.append_var_u16(index)?;
    }

    Ok(())
}

fn append_panel(panel: &ElectricalPanel, buffer: &mut ByteBuffer) -> Result<()> {
    let count = u16::try_from(panel.len()).map_err(|_| {
        ShipFileError::invalid_definition(format!("electrical panel has {} entries", panel.len()))
    })?;
    buffer.append_u16(count);

    for (instance_index, metadata) in panel.iter() {
        buffer.append_u32(u32::from(instance_index));

        buffer.append_bool(metadata.panel_coordinates.is_some());
        if let Some(coords) = metadata.panel_coordinates {
            buffer.append_i32(coords.x);
            buffer.append_i32(coords.y);
        }

        buffer.append_bool(metadata.label.is_some());
        if let Some(label) = &metadata.label {
            buffer.append_string(label)?;
        }

        buffer.append_bool(metadata.is_hidden);
    }

    Ok(())
}

pub(crate) fn read_electrical_layer(
    body: &[u8],
    attributes: &ShipAttributes,
    materials: &MaterialDatabase,
) -> Result<ElectricalLayerData> {
    let size = attributes.ship_size;
    let cell_count = layer_cell_count(size)?;
    let mut grid = None;
    let mut panel = ElectricalPanel::new();

    for record in SubRecords::new(body) {
        let record = record?;
        match ElectricalLayerTag::from_value(record.tag) {
            ElectricalLayerTag::Buffer => {
                let cells = decode_runs(record.body, cell_count, |reader| {
                    read_element(reader, attributes, materials)
                })?;
                grid = Some(layer_buffer(size, cells)?);
            }
            ElectricalLayerTag::Panel => {
                panel = read_panel(&mut record.reader())?;
            }
            ElectricalLayerTag::Tail => {}
            ElectricalLayerTag::Unknown(tag) => {
                warn!("Skipping unknown electrical layer record {:#010x}", tag);
            }
        }
    }

    let buffer =
        grid.ok_or_else(|| ShipFileError::invalid_file("electrical layer section has no cell buffer"))?;
    Ok(ElectricalLayerData { buffer, panel })
}

fn read_element(
    reader: &mut ByteReader<'_>,
    attributes: &ShipAttributes,
    materials: &MaterialDatabase,
) -> Result<ElectricalElement> {
    let color_key = reader.read_rgb()?;
    if color_key == EMPTY_MATERIAL_COLOR_KEY {
        return Ok(ElectricalElement::default());
    }

    let material = materials
        .find_electrical(color_key)
        .ok_or(ShipFileError::MaterialNotFound {
            color_key,
            file_version: attributes.file_fs_version,
        })?;

    let instance_index = if material.is_instanced {
        Some(reader.read_var_u16()?)
    } else {
        None
    };

    Ok(ElectricalElement {
        material: Some(Arc::clone(material)),
        instance_index,
    })
}

fn read_panel(reader: &mut ByteReader<'_>) -> Result<ElectricalPanel> {
    let mut panel = ElectricalPanel::new();
    let count = reader.read_u16()?;

    for _ in 0..count {
        let raw_index = reader.read_u32()?;
        let instance_index = u16::try_from(raw_index).map_err(|_| {
            ShipFileError::invalid_file(format!("electrical panel instance index {raw_index} is out of range"))
        })?;

        let panel_coordinates = if reader.read_bool()? {
            let x = reader.read_i32()?;
            let y = reader.read_i32()?;
            Some(IntegralCoordinates::new(x, y))
        } else {
            None
        };

        let label = if reader.read_bool()? {
            Some(reader.read_string()?)
        } else {
            None
        };

        let metadata = ElectricalPanelElementMetadata {
            panel_coordinates,
            label,
            is_hidden: reader.read_bool()?,
        };

        if !panel.try_add(instance_index, metadata) {
            warn!(
                "Duplicate electrical panel entry for instance {}, keeping the first",
                instance_index
            );
        }
    }

    Ok(panel)
}
