//! File and section headers

use crate::error::{Result, ShipFileError};
use binrw::io::Cursor;
use binrw::{BinRead, BinWrite};
use std::io::{ErrorKind, Read, Write};

/// Title identifying a ship file
pub const HEADER_TITLE: [u8; 24] = *b"FLOATING SANDBOX SHIP\x1a\0\0";

/// Newest file format version this crate reads and the one it writes
pub const CURRENT_FILE_FORMAT_VERSION: u16 = 1;

/// File header
///
/// - Title (24 bytes)
/// - File format version (2 bytes, big-endian)
/// - Padding (6 bytes, zero)
#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[br(big)] // All multi-byte fields are big-endian
#[bw(big)]
pub struct FileHeader {
    /// Title, always [`HEADER_TITLE`]
    pub title: [u8; 24],

    /// File format version
    pub file_format_version: u16,

    /// Reserved, written as zero
    pub padding: [u8; 6],
}

impl FileHeader {
    /// Encoded size in bytes
    pub const SIZE: usize = 32;

    /// Header for the current format version
    pub fn new() -> Self {
        Self {
            title: HEADER_TITLE,
            file_format_version: CURRENT_FILE_FORMAT_VERSION,
            padding: [0; 6],
        }
    }

    /// Check title and version
    pub fn validate(&self) -> Result<()> {
        if self.title != HEADER_TITLE {
            return Err(ShipFileError::UnrecognizedFile);
        }

        if self.file_format_version > CURRENT_FILE_FORMAT_VERSION {
            return Err(ShipFileError::UnsupportedFile {
                version: self.file_format_version,
                supported: CURRENT_FILE_FORMAT_VERSION,
            });
        }

        Ok(())
    }

    /// Read and validate a header
    ///
    /// A stream shorter than the header is not a ship file.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut bytes = [0u8; Self::SIZE];
        read_exact_or(reader, &mut bytes, || ShipFileError::UnrecognizedFile)?;

        let header = Self::read(&mut Cursor::new(&bytes[..]))?;
        header.validate()?;
        Ok(header)
    }

    /// Write the header
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        let mut bytes = Vec::with_capacity(Self::SIZE);
        self.write(&mut Cursor::new(&mut bytes))?;
        writer.write_all(&bytes)?;
        Ok(())
    }
}

impl Default for FileHeader {
    fn default() -> Self {
        Self::new()
    }
}

/// Header preceding every section and sub-record
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[br(big)]
#[bw(big)]
pub struct SectionHeader {
    /// Section tag
    pub tag: u32,

    /// Body length in bytes
    pub body_size: u32,
}

impl SectionHeader {
    /// Encoded size in bytes
    pub const SIZE: usize = 8;

    /// Read a section header; the stream ending here means the tail is missing
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut bytes = [0u8; Self::SIZE];
        read_exact_or(reader, &mut bytes, || {
            ShipFileError::invalid_file("unexpected end of file before the tail section")
        })?;

        Ok(Self::read(&mut Cursor::new(&bytes[..]))?)
    }
}

fn read_exact_or<R: Read>(
    reader: &mut R,
    buf: &mut [u8],
    on_eof: impl FnOnce() -> ShipFileError,
) -> Result<()> {
    match reader.read_exact(buf) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => Err(on_eof()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn header_bytes(header: &FileHeader) -> Vec<u8> {
        let mut bytes = Vec::new();
        header.write_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_header_layout() {
        let bytes = header_bytes(&FileHeader::new());
        assert_eq!(bytes.len(), FileHeader::SIZE);
        assert_eq!(&bytes[..21], b"FLOATING SANDBOX SHIP");
        assert_eq!(&bytes[21..24], &[0x1A, 0, 0]);
        assert_eq!(&bytes[24..26], &[0, 1]);
        assert_eq!(&bytes[26..], &[0; 6]);
    }

    #[test]
    fn test_header_round_trip() {
        let bytes = header_bytes(&FileHeader::new());
        let header = FileHeader::read_from(&mut &bytes[..]).expect("Failed to read header");
        assert_eq!(header, FileHeader::new());
    }

    #[test]
    fn test_corrupt_title() {
        let mut bytes = header_bytes(&FileHeader::new());
        bytes[0] = b'X';
        assert!(matches!(
            FileHeader::read_from(&mut &bytes[..]),
            Err(ShipFileError::UnrecognizedFile)
        ));
    }

    #[test]
    fn test_short_header_is_unrecognized() {
        let bytes = header_bytes(&FileHeader::new());
        assert!(matches!(
            FileHeader::read_from(&mut &bytes[..20]),
            Err(ShipFileError::UnrecognizedFile)
        ));
    }

    #[test]
    fn test_version_checks() {
        let mut header = FileHeader::new();
        header.file_format_version = CURRENT_FILE_FORMAT_VERSION + 1;
        let bytes = header_bytes(&header);
        assert!(matches!(
            FileHeader::read_from(&mut &bytes[..]),
            Err(ShipFileError::UnsupportedFile { version: 2, supported: 1 })
        ));

        header.file_format_version = 0;
        let bytes = header_bytes(&header);
        assert!(FileHeader::read_from(&mut &bytes[..]).is_ok());
    }

    #[test]
    fn test_section_header() {
        let mut bytes = Vec::new();
        SectionHeader { tag: 0x0102_0304, body_size: 9 }
            .write(&mut Cursor::new(&mut bytes))
            .unwrap();
        assert_eq!(bytes, [1, 2, 3, 4, 0, 0, 0, 9]);

        let header = SectionHeader::read_from(&mut &bytes[..]).unwrap();
        assert_eq!(header.body_size, 9);

        assert!(matches!(
            SectionHeader::read_from(&mut &bytes[..5]),
            Err(ShipFileError::InvalidFile(_))
        ));
    }
}
