//! Physics data and auto-texturization sections

use crate::definition::{AutoTexturizationMode, ShipAutoTexturizationSettings, ShipPhysicsData};
use crate::error::{Result, ShipFileError};
use crate::shp2::buffer::ByteBuffer;
use crate::shp2::section::{SubRecords, append_section, append_tail};
use crate::shp2::tags::{AutoTexturizationTag, PhysicsDataTag};
use tracing::warn;

fn append_f32_record(buffer: &mut ByteBuffer, tag: u32, value: f32) -> Result<usize> {
    append_section(buffer, tag, |b| {
        b.append_f32(value);
        Ok(())
    })
}

pub(crate) fn append_physics_data(physics: &ShipPhysicsData, buffer: &mut ByteBuffer) -> Result<()> {
    append_f32_record(buffer, PhysicsDataTag::OffsetX.value(), physics.offset.0)?;
    append_f32_record(buffer, PhysicsDataTag::OffsetY.value(), physics.offset.1)?;
    append_f32_record(
        buffer,
        PhysicsDataTag::InternalPressure.value(),
        physics.internal_pressure,
    )?;
    append_tail(buffer);
    Ok(())
}

pub(crate) fn read_physics_data(body: &[u8]) -> Result<ShipPhysicsData> {
    let mut physics = ShipPhysicsData::default();

    for record in SubRecords::new(body) {
        let record = record?;
        let mut reader = record.reader();
        match PhysicsDataTag::from_value(record.tag) {
            PhysicsDataTag::OffsetX => physics.offset.0 = reader.read_f32()?,
            PhysicsDataTag::OffsetY => physics.offset.1 = reader.read_f32()?,
            PhysicsDataTag::InternalPressure => physics.internal_pressure = reader.read_f32()?,
            PhysicsDataTag::Tail => {}
            PhysicsDataTag::Unknown(tag) => {
                warn!("Skipping unknown physics data record {:#010x}", tag);
            }
        }
    }

    Ok(physics)
}

pub(crate) fn append_auto_texturization_settings(
    settings: &ShipAutoTexturizationSettings,
    buffer: &mut ByteBuffer,
) -> Result<()> {
    append_section(buffer, AutoTexturizationTag::Mode.value(), |b| {
        b.append_u32(settings.mode.to_u32());
        Ok(())
    })?;
    append_f32_record(
        buffer,
        AutoTexturizationTag::MaterialTextureMagnification.value(),
        settings.material_texture_magnification,
    )?;
    append_f32_record(
        buffer,
        AutoTexturizationTag::MaterialTextureTransparency.value(),
        settings.material_texture_transparency,
    )?;
    append_tail(buffer);
    Ok(())
}

pub(crate) fn read_auto_texturization_settings(body: &[u8]) -> Result<ShipAutoTexturizationSettings> {
    let mut settings = ShipAutoTexturizationSettings::default();

    for record in SubRecords::new(body) {
        let record = record?;
        let mut reader = record.reader();
        match AutoTexturizationTag::from_value(record.tag) {
            AutoTexturizationTag::Mode => {
                let value = reader.read_u32()?;
                settings.mode = AutoTexturizationMode::from_u32(value).ok_or_else(|| {
                    ShipFileError::invalid_file(format!("unknown auto-texturization mode {value}"))
                })?;
            }
            AutoTexturizationTag::MaterialTextureMagnification => {
                settings.material_texture_magnification = reader.read_f32()?;
            }
            AutoTexturizationTag::MaterialTextureTransparency => {
                settings.material_texture_transparency = reader.read_f32()?;
            }
            AutoTexturizationTag::Tail => {}
            AutoTexturizationTag::Unknown(tag) => {
                warn!("Skipping unknown auto-texturization record {:#010x}", tag);
            }
        }
    }

    Ok(settings)
}
