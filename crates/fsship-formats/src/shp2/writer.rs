//! Saving ship files

use crate::config::ShipFormatConfig;
use crate::definition::ShipDefinition;
use crate::error::{Result, ShipFileError};
use crate::shp2::attributes::{ShipAttributes, append_ship_attributes};
use crate::shp2::buffer::ByteBuffer;
use crate::shp2::electrical::append_electrical_layer;
use crate::shp2::header::FileHeader;
use crate::shp2::metadata::append_metadata;
use crate::shp2::preview::make_preview_image;
use crate::shp2::ropes::append_ropes_layer;
use crate::shp2::section::{append_section, append_tail};
use crate::shp2::settings::{append_auto_texturization_settings, append_physics_data};
use crate::shp2::structural::append_structural_layer;
use crate::shp2::tags::MainSectionTag;
use std::io::Write;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Sections are staged in one reusable buffer and flushed one at a time
struct SectionWriter<'w, W> {
    writer: &'w mut W,
    buffer: ByteBuffer,
}

impl<W: Write> SectionWriter<'_, W> {
    fn section<F>(&mut self, tag: MainSectionTag, write_body: F) -> Result<()>
    where
        F: FnOnce(&mut ByteBuffer) -> Result<()>,
    {
        self.buffer.clear();
        let written = append_section(&mut self.buffer, tag.value(), write_body)?;
        debug!("Writing section {:?} ({} bytes)", tag, written);
        self.writer.write_all(self.buffer.as_slice())?;
        Ok(())
    }

    fn png_section(&mut self, tag: MainSectionTag, png: &[u8]) -> Result<()> {
        self.section(tag, |b| {
            b.receive(png.len()).copy_from_slice(png);
            Ok(())
        })
    }

    fn tail(&mut self) -> Result<()> {
        self.buffer.clear();
        append_tail(&mut self.buffer);
        self.writer.write_all(self.buffer.as_slice())?;
        Ok(())
    }
}

pub(crate) fn save<W: Write>(
    definition: &ShipDefinition,
    writer: &mut W,
    config: &ShipFormatConfig,
) -> Result<()> {
    let layers = &definition.layers;
    layers.validate().map_err(ShipFileError::InvalidDefinition)?;
    if definition.metadata.ship_name.is_empty() {
        return Err(ShipFileError::invalid_definition("the ship name is empty"));
    }

    let attributes = ShipAttributes {
        file_fs_version: config.producer_version,
        ship_size: layers.size,
        has_texture_layer: layers.texture.is_some(),
        has_electrical_layer: layers.electrical.is_some(),
        last_write_time: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .ok()
            .map(|d| d.as_secs()),
    };

    FileHeader::new().write_to(writer)?;
    let mut out = SectionWriter {
        writer,
        buffer: ByteBuffer::with_capacity(64 * 1024),
    };

    out.section(MainSectionTag::ShipAttributes, |b| {
        append_ship_attributes(&attributes, b)
    })?;
    out.section(MainSectionTag::Metadata, |b| {
        append_metadata(&definition.metadata, b)
    })?;

    match &layers.texture {
        Some(texture) => {
            let png = texture.image.encode_png()?;
            out.png_section(MainSectionTag::TextureLayerPng, &png)?;
        }
        None => {
            let png = make_preview_image(&layers.structural).encode_png()?;
            out.png_section(MainSectionTag::PreviewPng, &png)?;
        }
    }

    out.section(MainSectionTag::StructuralLayer, |b| {
        append_structural_layer(&layers.structural, b)
    })?;
    if let Some(electrical) = &layers.electrical {
        out.section(MainSectionTag::ElectricalLayer, |b| {
            append_electrical_layer(electrical, b)
        })?;
    }
    if let Some(ropes) = &layers.ropes {
        out.section(MainSectionTag::RopesLayer, |b| append_ropes_layer(ropes, b))?;
    }

    out.section(MainSectionTag::PhysicsData, |b| {
        append_physics_data(&definition.physics_data, b)
    })?;
    if let Some(settings) = &definition.auto_texturization_settings {
        out.section(MainSectionTag::AutoTexturizationSettings, |b| {
            append_auto_texturization_settings(settings, b)
        })?;
    }

    out.tail()?;
    out.writer.flush()?;
    Ok(())
}
