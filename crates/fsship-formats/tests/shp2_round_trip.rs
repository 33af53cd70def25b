#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! Save/load round trips of complete ship definitions

mod common;

use common::{IRON, full_ship, materials, save_to_vec, simple_ship};
use fsship_formats::shp2::{self, MainSectionTag, ShipFormat};
use fsship_formats::{
    ImageSize, RgbaColor, ShipFileError, ShipFormatConfig, ShipSpaceSize, StructuralElement,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

#[test]
fn round_trip_full_ship() {
    let materials = materials();
    let definition = full_ship(&materials);

    let bytes = save_to_vec(&definition);
    let loaded = shp2::load(&mut &bytes[..], &materials).expect("Failed to load");

    assert_eq!(loaded, definition);
}

#[test]
fn round_trip_shares_database_materials() {
    let materials = materials();
    let definition = simple_ship(&materials, ShipSpaceSize::new(10, 5));

    let bytes = save_to_vec(&definition);
    let loaded = shp2::load(&mut &bytes[..], &materials).unwrap();

    let cell = loaded.layers.structural.buffer.get(3, 0).unwrap();
    assert!(Arc::ptr_eq(
        cell.material.as_ref().unwrap(),
        materials.find_structural(IRON).unwrap()
    ));
}

#[test]
fn round_trip_optional_layers_absent() {
    let materials = materials();
    let definition = simple_ship(&materials, ShipSpaceSize::new(7, 3));

    let bytes = save_to_vec(&definition);
    let tags = common::split_sections(&bytes)
        .into_iter()
        .map(|(tag, _)| MainSectionTag::from_value(tag))
        .collect::<Vec<_>>();
    assert!(!tags.contains(&MainSectionTag::ElectricalLayer));
    assert!(!tags.contains(&MainSectionTag::RopesLayer));
    assert!(!tags.contains(&MainSectionTag::AutoTexturizationSettings));

    let loaded = shp2::load(&mut &bytes[..], &materials).unwrap();
    assert_eq!(loaded, definition);
    assert!(loaded.layers.electrical.is_none());
    assert!(loaded.auto_texturization_settings.is_none());
}

#[test]
fn round_trip_run_longer_than_var_u16() {
    let materials = materials();
    let size = ShipSpaceSize::new(300, 300);
    let mut definition = simple_ship(&materials, size);
    let iron = Arc::clone(materials.find_structural(IRON).unwrap());
    for y in 0..size.height {
        for x in 0..size.width {
            definition
                .layers
                .structural
                .buffer
                .set(x, y, StructuralElement::new(Arc::clone(&iron)));
        }
    }

    let bytes = save_to_vec(&definition);
    let loaded = shp2::load(&mut &bytes[..], &materials).unwrap();
    assert_eq!(loaded, definition);
}

#[test]
fn round_trip_checkerboard() {
    let materials = materials();
    let size = ShipSpaceSize::new(33, 17);
    let mut definition = simple_ship(&materials, size);
    let iron = Arc::clone(materials.find_structural(IRON).unwrap());
    for y in 0..size.height {
        for x in 0..size.width {
            let cell = if (x + y) % 2 == 0 {
                StructuralElement::new(Arc::clone(&iron))
            } else {
                StructuralElement::default()
            };
            definition.layers.structural.buffer.set(x, y, cell);
        }
    }

    let bytes = save_to_vec(&definition);
    assert_eq!(shp2::load(&mut &bytes[..], &materials).unwrap(), definition);
}

#[test]
fn preview_data_reflects_flags() {
    let materials = materials();
    let definition = full_ship(&materials);
    let before = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs();
    let bytes = save_to_vec(&definition);
    let after = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs();

    let preview = shp2::load_preview_data(&mut &bytes[..]).unwrap();
    assert_eq!(preview.ship_size, ShipSpaceSize::new(24, 10));
    let saved = preview.last_write_time.unwrap();
    assert!((before..=after).contains(&saved));
    assert_eq!(preview.metadata, definition.metadata);
    // texture present but hidden from previews
    assert!(!preview.is_hd);
    assert!(preview.has_electricals);
}

#[test]
fn preview_data_stops_after_metadata() {
    let materials = materials();
    let bytes = save_to_vec(&full_ship(&materials));

    // keep only the attributes and metadata sections, drop everything else including the tail
    let sections = common::split_sections(&bytes);
    let mut truncated = common::assemble(&sections[..2]);
    truncated.truncate(truncated.len() - 8);

    let preview = shp2::load_preview_data(&mut &truncated[..]).unwrap();
    assert_eq!(preview.metadata.ship_name, "Full Rig");
    assert!(matches!(
        shp2::load(&mut &truncated[..], &materials),
        Err(ShipFileError::InvalidFile(_))
    ));
}

#[test]
fn preview_image_from_texture_is_shrunk() {
    let materials = materials();
    let bytes = save_to_vec(&full_ship(&materials));

    let image = shp2::load_preview_image(&mut &bytes[..], ImageSize::new(24, 24)).unwrap();
    assert_eq!(image.size(), ImageSize::new(24, 10));

    let image = shp2::load_preview_image(&mut &bytes[..], ImageSize::new(1000, 1000)).unwrap();
    assert_eq!(image.size(), ImageSize::new(48, 20));
    assert_eq!(image.get(5, 19), Some(RgbaColor::new(200, 10, 5, 255)));
}

#[test]
fn preview_image_generated_from_structure() {
    let materials = materials();
    let definition = simple_ship(&materials, ShipSpaceSize::new(10, 6));
    let bytes = save_to_vec(&definition);

    let image = shp2::load_preview_image(&mut &bytes[..], ImageSize::new(100, 100)).unwrap();
    // columns 1..9, rows 0..2
    assert_eq!(image.size(), ImageSize::new(8, 2));
    // bottom image row is the iron keel, top row the deck with forced alpha
    assert_eq!(image.get(0, 1), Some(IRON.with_alpha(255)));
    assert_eq!(image.get(0, 0), Some(RgbaColor::new(0x90, 0x60, 0x30, 255)));
}

#[test]
fn save_rejects_unrepresentable_definitions() {
    let materials = materials();

    let mut definition = simple_ship(&materials, ShipSpaceSize::new(4, 4));
    definition.metadata.ship_name.clear();
    assert!(matches!(
        shp2::save(&definition, &mut Vec::new()),
        Err(ShipFileError::InvalidDefinition(_))
    ));

    let mut definition = simple_ship(&materials, ShipSpaceSize::new(4, 4));
    definition.layers.size = ShipSpaceSize::new(5, 4);
    let mut bytes = Vec::new();
    assert!(matches!(
        shp2::save(&definition, &mut bytes),
        Err(ShipFileError::InvalidDefinition(_))
    ));
    // validation happens before anything is written
    assert!(bytes.is_empty());
}

#[test]
fn oversize_section_is_rejected_by_config() {
    let materials = materials();
    let bytes = save_to_vec(&full_ship(&materials));

    let format = ShipFormat::new(ShipFormatConfig::default().with_max_section_body_size(16));
    assert!(matches!(
        format.load(&mut &bytes[..], &materials),
        Err(ShipFileError::InvalidFile(_))
    ));
}
