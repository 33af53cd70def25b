//! Metadata section

use crate::definition::{ShipCategory, ShipMetadata, ShipSpaceToWorldSpaceCoordsRatio};
use crate::error::{Result, ShipFileError};
use crate::shp2::buffer::ByteBuffer;
use crate::shp2::section::{SubRecords, append_section, append_tail};
use crate::shp2::tags::MetadataTag;
use tracing::warn;

/// Name given to ships whose file carries none
const UNKNOWN_SHIP_NAME: &str = "Unknown";

pub(crate) fn append_metadata(metadata: &ShipMetadata, buffer: &mut ByteBuffer) -> Result<()> {
    if metadata.ship_name.is_empty() {
        return Err(ShipFileError::invalid_definition("the ship name is empty"));
    }

    append_string_record(buffer, MetadataTag::ShipName, &metadata.ship_name)?;

    let optional_strings = [
        (MetadataTag::Author, &metadata.author),
        (MetadataTag::ArtCredits, &metadata.art_credits),
        (MetadataTag::YearBuilt, &metadata.year_built),
    ];
    for (tag, value) in optional_strings {
        if let Some(value) = value {
            append_string_record(buffer, tag, value)?;
        }
    }

    if let Some(category) = metadata.category {
        append_section(buffer, MetadataTag::Category.value(), |b| {
            b.append_u64(category.to_u64());
            Ok(())
        })?;
    }

    if let Some(description) = &metadata.description {
        append_string_record(buffer, MetadataTag::Description, description)?;
    }

    append_section(buffer, MetadataTag::Scale.value(), |b| {
        b.append_f32(metadata.scale.input_units);
        b.append_f32(metadata.scale.output_units);
        Ok(())
    })?;

    if let Some(password) = metadata.password {
        append_section(buffer, MetadataTag::Password.value(), |b| {
            b.append_u64(password);
            Ok(())
        })?;
    }

    append_section(buffer, MetadataTag::DoHideElectricalsInPreview.value(), |b| {
        b.append_bool(metadata.do_hide_electricals_in_preview);
        Ok(())
    })?;

    append_section(buffer, MetadataTag::DoHideHdInPreview.value(), |b| {
        b.append_bool(metadata.do_hide_hd_in_preview);
        Ok(())
    })?;

    append_tail(buffer);
    Ok(())
}

fn append_string_record(buffer: &mut ByteBuffer, tag: MetadataTag, value: &str) -> Result<usize> {
    append_section(buffer, tag.value(), |b| b.append_string(value).map(|_| ()))
}

pub(crate) fn read_metadata(body: &[u8]) -> Result<ShipMetadata> {
    let mut ship_name = None;
    let mut metadata = ShipMetadata::new(String::new());

    for record in SubRecords::new(body) {
        let record = record?;
        let mut reader = record.reader();
        match MetadataTag::from_value(record.tag) {
            MetadataTag::ShipName => ship_name = Some(reader.read_string()?),
            MetadataTag::Author => metadata.author = Some(reader.read_string()?),
            MetadataTag::ArtCredits => metadata.art_credits = Some(reader.read_string()?),
            MetadataTag::YearBuilt => metadata.year_built = Some(reader.read_string()?),
            MetadataTag::Category => {
                let value = reader.read_u64()?;
                metadata.category = ShipCategory::from_u64(value);
                if metadata.category.is_none() {
                    warn!("Ignoring unknown ship category {}", value);
                }
            }
            MetadataTag::Description => metadata.description = Some(reader.read_string()?),
            MetadataTag::Scale => {
                let input_units = reader.read_f32()?;
                let output_units = reader.read_f32()?;
                metadata.scale = ShipSpaceToWorldSpaceCoordsRatio::new(input_units, output_units);
            }
            MetadataTag::Password => metadata.password = Some(reader.read_u64()?),
            MetadataTag::DoHideElectricalsInPreview => {
                metadata.do_hide_electricals_in_preview = reader.read_bool()?;
            }
            MetadataTag::DoHideHdInPreview => metadata.do_hide_hd_in_preview = reader.read_bool()?,
            MetadataTag::Tail => {}
            MetadataTag::Unknown(tag) => {
                warn!("Skipping unknown metadata record {:#010x}", tag);
            }
        }
    }

    metadata.ship_name = ship_name.unwrap_or_else(|| UNKNOWN_SHIP_NAME.to_string());
    Ok(metadata)
}
