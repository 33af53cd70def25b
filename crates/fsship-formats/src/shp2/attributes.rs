//! Ship attributes section

use crate::error::{Result, ShipFileError};
use crate::shp2::buffer::ByteBuffer;
use crate::shp2::section::{SubRecords, append_section, append_tail};
use crate::shp2::tags::ShipAttributesTag;
use crate::types::{ShipSpaceSize, Version};
use tracing::warn;

/// Attributes every reader needs before decoding layers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShipAttributes {
    /// Version of the program that wrote the file
    pub file_fs_version: Version,
    /// Grid size
    pub ship_size: ShipSpaceSize,
    /// Whether the file contains a texture layer
    pub has_texture_layer: bool,
    /// Whether the file contains an electrical layer
    pub has_electrical_layer: bool,
    /// Save time in Unix seconds
    pub last_write_time: Option<u64>,
}

pub(crate) fn append_ship_attributes(attributes: &ShipAttributes, buffer: &mut ByteBuffer) -> Result<()> {
    append_section(buffer, ShipAttributesTag::FsVersion2.value(), |b| {
        let version = attributes.file_fs_version;
        b.append_u16(version.major);
        b.append_u16(version.minor);
        b.append_u16(version.patch);
        b.append_u16(version.build);
        Ok(())
    })?;

    append_section(buffer, ShipAttributesTag::ShipSize.value(), |b| {
        b.append_u32(attributes.ship_size.width);
        b.append_u32(attributes.ship_size.height);
        Ok(())
    })?;

    append_section(buffer, ShipAttributesTag::HasTextureLayer.value(), |b| {
        b.append_bool(attributes.has_texture_layer);
        Ok(())
    })?;

    append_section(buffer, ShipAttributesTag::HasElectricalLayer.value(), |b| {
        b.append_bool(attributes.has_electrical_layer);
        Ok(())
    })?;

    if let Some(time) = attributes.last_write_time {
        append_section(buffer, ShipAttributesTag::LastWriteTime.value(), |b| {
            b.append_u64(time);
            Ok(())
        })?;
    }

    append_tail(buffer);
    Ok(())
}

pub(crate) fn read_ship_attributes(body: &[u8]) -> Result<ShipAttributes> {
    let mut version = None;
    let mut ship_size = None;
    let mut has_texture_layer = None;
    let mut has_electrical_layer = None;
    let mut last_write_time = None;

    for record in SubRecords::new(body) {
        let record = record?;
        let mut reader = record.reader();
        match ShipAttributesTag::from_value(record.tag) {
            ShipAttributesTag::FsVersion1 => {
                let major = reader.read_u16()?;
                let minor = reader.read_u16()?;
                version.get_or_insert(Version::new(major, minor, 0, 0));
            }
            ShipAttributesTag::FsVersion2 => {
                let major = reader.read_u16()?;
                let minor = reader.read_u16()?;
                let patch = reader.read_u16()?;
                let build = reader.read_u16()?;
                version = Some(Version::new(major, minor, patch, build));
            }
            ShipAttributesTag::ShipSize => {
                let width = reader.read_u32()?;
                let height = reader.read_u32()?;
                ship_size = Some(ShipSpaceSize::new(width, height));
            }
            ShipAttributesTag::HasTextureLayer => has_texture_layer = Some(reader.read_bool()?),
            ShipAttributesTag::HasElectricalLayer => has_electrical_layer = Some(reader.read_bool()?),
            ShipAttributesTag::LastWriteTime => last_write_time = Some(reader.read_u64()?),
            ShipAttributesTag::Tail => {}
            ShipAttributesTag::Unknown(tag) => {
                warn!("Skipping unknown ship attributes record {:#010x}", tag);
            }
        }
    }

    let missing = |what: &str| ShipFileError::invalid_file(format!("ship attributes lack the {what}"));
    Ok(ShipAttributes {
        file_fs_version: version.ok_or_else(|| missing("producer version"))?,
        ship_size: ship_size.ok_or_else(|| missing("ship size"))?,
        has_texture_layer: has_texture_layer.ok_or_else(|| missing("texture layer flag"))?,
        has_electrical_layer: has_electrical_layer.ok_or_else(|| missing("electrical layer flag"))?,
        last_write_time,
    })
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::shp2::tags::make_tag;

    fn attributes() -> ShipAttributes {
        ShipAttributes {
            file_fs_version: Version::new(1, 18, 2, 7),
            ship_size: ShipSpaceSize::new(400, 120),
            has_texture_layer: true,
            has_electrical_layer: false,
            last_write_time: Some(1_700_000_000),
        }
    }

    #[test]
    fn test_round_trip() {
        let mut buffer = ByteBuffer::new();
        append_ship_attributes(&attributes(), &mut buffer).unwrap();
        assert_eq!(read_ship_attributes(buffer.as_slice()).unwrap(), attributes());
    }

    #[test]
    fn test_legacy_version_record() {
        let mut buffer = ByteBuffer::new();
        append_section(&mut buffer, ShipAttributesTag::FsVersion1.value(), |b| {
            b.append_u16(1);
            b.append_u16(17);
            Ok(())
        })
        .unwrap();
        append_section(&mut buffer, make_tag(b"NEW9"), |b| {
            b.append_u64(42);
            Ok(())
        })
        .unwrap();
        let mut rest = attributes();
        rest.last_write_time = None;
        let mut tail = ByteBuffer::new();
        append_ship_attributes(&rest, &mut tail).unwrap();
        // drop the FSV2 record (8 byte header + 8 byte body)
        buffer.append_bytes(&tail.as_slice()[16..]);

        let read = read_ship_attributes(buffer.as_slice()).unwrap();
        assert_eq!(read.file_fs_version, Version::new(1, 17, 0, 0));
        assert_eq!(read.ship_size, ShipSpaceSize::new(400, 120));
        assert_eq!(read.last_write_time, None);
    }

    #[test]
    fn test_missing_size_is_invalid() {
        let mut buffer = ByteBuffer::new();
        append_section(&mut buffer, ShipAttributesTag::FsVersion2.value(), |b| {
            b.append_bytes(&[0; 8]);
            Ok(())
        })
        .unwrap();
        append_tail(&mut buffer);
        assert!(matches!(
            read_ship_attributes(buffer.as_slice()),
            Err(ShipFileError::InvalidFile(_))
        ));
    }
}
