//! Shared fixtures for the ship file integration tests

#![allow(dead_code)]

use fsship_formats::shp2::section::{SubRecords, append_section, append_tail, parse_sections};
use fsship_formats::shp2::tags::ShipAttributesTag;
use fsship_formats::shp2::{ByteBuffer, FileHeader, MainSectionTag, TAIL_TAG};
use fsship_formats::{
    AutoTexturizationMode, ElectricalElement, ElectricalLayerData, ElectricalMaterial,
    ElectricalPanelElementMetadata, ImageSize, IntegralCoordinates, MaterialDatabase, RgbColor,
    RgbaColor, RgbaImage, RopeElement, RopesLayerData, ShipAutoTexturizationSettings, ShipCategory,
    ShipDefinition, ShipLayers, ShipMetadata, ShipPhysicsData, ShipSpaceSize,
    ShipSpaceToWorldSpaceCoordsRatio, StructuralElement, StructuralMaterial, TextureLayerData,
    calculate_password_hash,
};
use std::ops::ControlFlow;
use std::sync::Arc;

pub const IRON: RgbColor = RgbColor::new(0x40, 0x40, 0x50);
pub const WOOD: RgbColor = RgbColor::new(0x80, 0x50, 0x20);
pub const CABLE: RgbColor = RgbColor::new(0xC0, 0x80, 0x00);
pub const LAMP: RgbColor = RgbColor::new(0xFF, 0xFF, 0x00);

pub fn materials() -> MaterialDatabase {
    let mut builder = MaterialDatabase::builder();
    builder
        .add_structural(StructuralMaterial::new("Iron", IRON, IRON.with_alpha(255)))
        .unwrap();
    builder
        .add_structural(StructuralMaterial::new(
            "Wood",
            WOOD,
            RgbaColor::new(0x90, 0x60, 0x30, 200),
        ))
        .unwrap();
    builder
        .add_electrical(ElectricalMaterial::new("Cable", CABLE, CABLE.with_alpha(255), false))
        .unwrap();
    builder
        .add_electrical(ElectricalMaterial::new("Lamp", LAMP, LAMP.with_alpha(255), true))
        .unwrap();
    builder.build()
}

fn structural(materials: &MaterialDatabase, key: RgbColor) -> StructuralElement {
    StructuralElement::new(Arc::clone(materials.find_structural(key).unwrap()))
}

/// Hull of iron with a wooden deck; only the structural layer
pub fn simple_ship(materials: &MaterialDatabase, size: ShipSpaceSize) -> ShipDefinition {
    let mut layers = ShipLayers::new(size).unwrap();
    for x in 1..size.width.saturating_sub(1) {
        layers.structural.buffer.set(x, 0, structural(materials, IRON));
        layers.structural.buffer.set(x, 1, structural(materials, WOOD));
    }

    ShipDefinition {
        layers,
        metadata: ShipMetadata::new("Simple"),
        physics_data: ShipPhysicsData::default(),
        auto_texturization_settings: None,
    }
}

/// Ship using every layer and every optional field
pub fn full_ship(materials: &MaterialDatabase) -> ShipDefinition {
    let size = ShipSpaceSize::new(24, 10);
    let mut definition = simple_ship(materials, size);

    let mut electrical = ElectricalLayerData::new(size).unwrap();
    let cable = materials.find_electrical(CABLE).unwrap();
    let lamp = materials.find_electrical(LAMP).unwrap();
    for x in 2..10 {
        electrical
            .buffer
            .set(x, 2, ElectricalElement::new(Arc::clone(cable)));
    }
    electrical
        .buffer
        .set(10, 2, ElectricalElement::instanced(Arc::clone(lamp), 0));
    electrical
        .buffer
        .set(11, 2, ElectricalElement::instanced(Arc::clone(lamp), 200));
    electrical.panel.try_add(
        200,
        ElectricalPanelElementMetadata {
            panel_coordinates: Some(IntegralCoordinates::new(3, -1)),
            label: Some("Stern lamp".to_string()),
            is_hidden: false,
        },
    );

    let rope_material = Arc::clone(materials.find_structural(WOOD).unwrap());
    let ropes = RopesLayerData {
        elements: vec![RopeElement {
            start_coords: IntegralCoordinates::new(1, 1),
            end_coords: IntegralCoordinates::new(12, 9),
            material: rope_material,
            render_color: RgbaColor::new(10, 20, 30, 40),
        }],
    };

    let mut texture = RgbaImage::new(ImageSize::new(48, 20), RgbaColor::new(0, 0, 0, 0));
    for x in 0..48 {
        texture.set(x, 19, RgbaColor::new(200, 10, x as u8, 255));
    }

    definition.layers.electrical = Some(electrical);
    definition.layers.ropes = Some(ropes);
    definition.layers.texture = Some(TextureLayerData { image: texture });
    definition.metadata = ShipMetadata {
        ship_name: "Full Rig".to_string(),
        author: Some("A. Builder".to_string()),
        art_credits: Some("Someone Else".to_string()),
        year_built: Some("1893".to_string()),
        category: Some(ShipCategory::Fictional),
        description: Some("Every layer, every field.".to_string()),
        scale: ShipSpaceToWorldSpaceCoordsRatio::new(2.0, 3.5),
        password: Some(calculate_password_hash("hunter2")),
        do_hide_electricals_in_preview: false,
        do_hide_hd_in_preview: true,
    };
    definition.physics_data = ShipPhysicsData {
        offset: (5.5, -2.0),
        internal_pressure: 0.5,
    };
    definition.auto_texturization_settings = Some(ShipAutoTexturizationSettings {
        mode: AutoTexturizationMode::FlatStructure,
        material_texture_magnification: 0.75,
        material_texture_transparency: 0.25,
    });

    definition
}

pub fn save_to_vec(definition: &ShipDefinition) -> Vec<u8> {
    let mut bytes = Vec::new();
    fsship_formats::shp2::save(definition, &mut bytes).unwrap();
    bytes
}

/// Top-level sections of a file, tail excluded
pub fn split_sections(bytes: &[u8]) -> Vec<(u32, Vec<u8>)> {
    let mut sections = Vec::new();
    parse_sections(&mut &bytes[..], u32::MAX, |header, body| {
        if header.tag != TAIL_TAG {
            sections.push((header.tag, body.read_all()?));
        }
        Ok(ControlFlow::Continue(()))
    })
    .unwrap();
    sections
}

/// File with the given sections, followed by a tail
pub fn assemble(sections: &[(u32, Vec<u8>)]) -> Vec<u8> {
    let mut bytes = Vec::new();
    FileHeader::new().write_to(&mut bytes).unwrap();

    let mut buffer = ByteBuffer::new();
    for (tag, body) in sections {
        append_section(&mut buffer, *tag, |b| {
            b.append_bytes(body);
            Ok(())
        })
        .unwrap();
    }
    append_tail(&mut buffer);
    bytes.extend_from_slice(buffer.as_slice());
    bytes
}

/// Replace (or drop, with `None`) one record of the ship attributes section
pub fn set_attribute(sections: &mut [(u32, Vec<u8>)], tag: ShipAttributesTag, body: Option<&[u8]>) {
    let (_, attributes) = sections
        .iter_mut()
        .find(|(t, _)| *t == MainSectionTag::ShipAttributes.value())
        .unwrap();

    let mut buffer = ByteBuffer::new();
    for record in SubRecords::new(attributes.as_slice()) {
        let record = record.unwrap();
        let kept = if record.tag == tag.value() { body } else { Some(record.body) };
        if let Some(kept) = kept {
            append_section(&mut buffer, record.tag, |b| {
                b.append_bytes(kept);
                Ok(())
            })
            .unwrap();
        }
    }
    append_tail(&mut buffer);
    *attributes = buffer.into_vec();
}
