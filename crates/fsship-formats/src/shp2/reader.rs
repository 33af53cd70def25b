//! Loading ship files

use crate::config::ShipFormatConfig;
use crate::definition::{ShipDefinition, ShipPreviewData};
use crate::error::{Result, ShipFileError};
use crate::layers::{ShipLayers, TextureLayerData};
use crate::material::MaterialDatabase;
use crate::raster::{ImageSize, RgbaImage};
use crate::shp2::attributes::{ShipAttributes, read_ship_attributes};
use crate::shp2::electrical::read_electrical_layer;
use crate::shp2::metadata::read_metadata;
use crate::shp2::ropes::read_ropes_layer;
use crate::shp2::section::parse_sections;
use crate::shp2::settings::{read_auto_texturization_settings, read_physics_data};
use crate::shp2::structural::read_structural_layer;
use crate::shp2::tags::MainSectionTag;
use std::io::Read;
use std::ops::ControlFlow;
use tracing::{debug, warn};

fn require_attributes<'a>(
    attributes: Option<&'a ShipAttributes>,
    section: &str,
) -> Result<&'a ShipAttributes> {
    attributes.ok_or_else(|| {
        ShipFileError::invalid_file(format!(
            "{section} section appears before the ship attributes"
        ))
    })
}

fn missing(section: &str) -> ShipFileError {
    ShipFileError::invalid_file(format!("missing {section} section"))
}

fn check_ship_size(attributes: &ShipAttributes, config: &ShipFormatConfig) -> Result<()> {
    let size = attributes.ship_size;
    match size.linear_size() {
        Some(cells) if cells <= config.max_ship_cells => Ok(()),
        _ => Err(ShipFileError::invalid_file(format!(
            "ship size {size} exceeds the limit of {} cells",
            config.max_ship_cells
        ))),
    }
}

pub(crate) fn load<R: Read>(
    reader: &mut R,
    materials: &MaterialDatabase,
    config: &ShipFormatConfig,
) -> Result<ShipDefinition> {
    let mut attributes = None;
    let mut metadata = None;
    let mut physics_data = None;
    let mut auto_texturization_settings = None;
    let mut structural = None;
    let mut electrical = None;
    let mut ropes = None;
    let mut texture = None;

    // parse_sections only returns Ok after the tail section when the handler never breaks
    parse_sections(reader, config.max_section_body_size, |header, body| {
        let tag = MainSectionTag::from_value(header.tag);
        debug!("Loading section {:?} ({} bytes)", tag, header.body_size);

        match tag {
            MainSectionTag::ShipAttributes => {
                let read = read_ship_attributes(&body.read_all()?)?;
                check_ship_size(&read, config)?;
                attributes = Some(read);
            }
            MainSectionTag::Metadata => {
                metadata = Some(read_metadata(&body.read_all()?)?);
            }
            MainSectionTag::PhysicsData => {
                physics_data = Some(read_physics_data(&body.read_all()?)?);
            }
            MainSectionTag::AutoTexturizationSettings => {
                auto_texturization_settings =
                    Some(read_auto_texturization_settings(&body.read_all()?)?);
            }
            MainSectionTag::StructuralLayer => {
                let attributes = require_attributes(attributes.as_ref(), "structural layer")?;
                structural = Some(read_structural_layer(&body.read_all()?, attributes, materials)?);
            }
            MainSectionTag::ElectricalLayer => {
                let attributes = require_attributes(attributes.as_ref(), "electrical layer")?;
                electrical = Some(read_electrical_layer(&body.read_all()?, attributes, materials)?);
            }
            MainSectionTag::RopesLayer => {
                let attributes = require_attributes(attributes.as_ref(), "ropes layer")?;
                ropes = Some(read_ropes_layer(&body.read_all()?, attributes, materials)?);
            }
            MainSectionTag::TextureLayerPng => {
                let image = RgbaImage::decode_png(&body.read_all()?)?;
                texture = Some(TextureLayerData { image });
            }
            MainSectionTag::PreviewPng | MainSectionTag::Tail => {}
            MainSectionTag::Unknown(tag) => {
                warn!(
                    "Skipping unknown section {:#010x} ({} bytes)",
                    tag, header.body_size
                );
            }
        }

        Ok(ControlFlow::Continue(()))
    })?;

    let attributes = attributes.ok_or_else(|| missing("ship attributes"))?;
    let metadata = metadata.ok_or_else(|| missing("metadata"))?;
    let structural = structural.ok_or_else(|| missing("structural layer"))?;

    Ok(ShipDefinition {
        layers: ShipLayers {
            size: attributes.ship_size,
            structural,
            electrical,
            ropes,
            texture,
        },
        metadata,
        physics_data: physics_data.unwrap_or_default(),
        auto_texturization_settings,
    })
}

pub(crate) fn load_preview_data<R: Read>(
    reader: &mut R,
    config: &ShipFormatConfig,
) -> Result<ShipPreviewData> {
    let mut attributes = None;
    let mut metadata = None;

    parse_sections(reader, config.max_section_body_size, |header, body| {
        match MainSectionTag::from_value(header.tag) {
            MainSectionTag::ShipAttributes => {
                attributes = Some(read_ship_attributes(&body.read_all()?)?);
            }
            MainSectionTag::Metadata => {
                metadata = Some(read_metadata(&body.read_all()?)?);
            }
            MainSectionTag::Unknown(tag) => {
                warn!("Skipping unknown section {:#010x}", tag);
            }
            _ => {}
        }

        if attributes.is_some() && metadata.is_some() {
            Ok(ControlFlow::Break(()))
        } else {
            Ok(ControlFlow::Continue(()))
        }
    })?;

    let attributes = attributes.ok_or_else(|| missing("ship attributes"))?;
    let metadata = metadata.ok_or_else(|| missing("metadata"))?;

    Ok(ShipPreviewData {
        ship_size: attributes.ship_size,
        last_write_time: attributes.last_write_time,
        is_hd: attributes.has_texture_layer && !metadata.do_hide_hd_in_preview,
        has_electricals: attributes.has_electrical_layer
            && !metadata.do_hide_electricals_in_preview,
        metadata,
    })
}

pub(crate) fn load_preview_image<R: Read>(
    reader: &mut R,
    max_size: ImageSize,
    config: &ShipFormatConfig,
) -> Result<RgbaImage> {
    let mut image = None;

    parse_sections(reader, config.max_section_body_size, |header, body| {
        match MainSectionTag::from_value(header.tag) {
            MainSectionTag::TextureLayerPng | MainSectionTag::PreviewPng => {
                image = Some(RgbaImage::decode_png(&body.read_all()?)?);
                Ok(ControlFlow::Break(()))
            }
            MainSectionTag::Unknown(tag) => {
                warn!("Skipping unknown section {:#010x}", tag);
                Ok(ControlFlow::Continue(()))
            }
            _ => Ok(ControlFlow::Continue(())),
        }
    })?;

    let image = image.ok_or_else(|| ShipFileError::invalid_file("no texture or preview image"))?;
    let target = image.size().shrink_to_fit(max_size);
    Ok(image.resize(target)?)
}
