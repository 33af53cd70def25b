//! Section framing
//!
//! Both top-level sections and the sub-records inside a section body use
//! the same `{tag: u32, body_size: u32, body}` shape, and both sequences end
//! with a tail record.

use crate::error::{Result, ShipFileError};
use crate::shp2::buffer::{ByteBuffer, ByteReader};
use crate::shp2::header::{FileHeader, SectionHeader};
use crate::shp2::tags::TAIL_TAG;
use std::io::{self, Read};
use std::ops::ControlFlow;
use tracing::debug;

/// Upper bound on the initial allocation for a section body
const INITIAL_BODY_CAPACITY: usize = 64 * 1024;

/// Append a record: tag, size placeholder, body, then patch the size
///
/// Returns the total number of bytes written, header included.
pub fn append_section<F>(buffer: &mut ByteBuffer, tag: u32, write_body: F) -> Result<usize>
where
    F: FnOnce(&mut ByteBuffer) -> Result<()>,
{
    let start = buffer.len();
    buffer.append_u32(tag);
    let size_offset = buffer.reserve_u32();

    let body_start = buffer.len();
    write_body(buffer)?;
    let body_size = buffer.len() - body_start;

    let body_size = u32::try_from(body_size).map_err(|_| {
        ShipFileError::invalid_definition(format!("section body of {body_size} bytes is too large"))
    })?;
    buffer.write_u32_at(size_offset, body_size)?;

    Ok(buffer.len() - start)
}

/// Append a zero-length tail record
pub fn append_tail(buffer: &mut ByteBuffer) -> usize {
    buffer.append_u32(TAIL_TAG) + buffer.append_u32(0)
}

/// Body of a top-level section, limited to its declared size
pub struct SectionBody<'a, R> {
    inner: io::Take<&'a mut R>,
    declared_size: u32,
    max_size: u32,
}

impl<'a, R: Read> SectionBody<'a, R> {
    fn new(reader: &'a mut R, declared_size: u32, max_size: u32) -> Self {
        Self {
            inner: reader.take(u64::from(declared_size)),
            declared_size,
            max_size,
        }
    }

    /// Size from the section header
    pub fn declared_size(&self) -> u32 {
        self.declared_size
    }

    /// Read the whole body
    ///
    /// Bodies above the configured limit and bodies cut short by the end of
    /// the stream are invalid.
    pub fn read_all(&mut self) -> Result<Vec<u8>> {
        if self.declared_size > self.max_size {
            return Err(ShipFileError::invalid_file(format!(
                "section body of {} bytes exceeds the limit of {} bytes",
                self.declared_size, self.max_size
            )));
        }

        let mut data = Vec::with_capacity((self.declared_size as usize).min(INITIAL_BODY_CAPACITY));
        self.inner.read_to_end(&mut data)?;
        if data.len() != self.declared_size as usize {
            return Err(truncated(self.declared_size, data.len() as u64));
        }

        Ok(data)
    }

    fn skip_remaining(&mut self) -> Result<()> {
        let remaining = self.inner.limit();
        let skipped = io::copy(&mut self.inner, &mut io::sink())?;
        if skipped != remaining {
            let consumed = u64::from(self.declared_size) - remaining + skipped;
            return Err(truncated(self.declared_size, consumed));
        }
        Ok(())
    }
}

fn truncated(declared: u32, actual: u64) -> ShipFileError {
    ShipFileError::invalid_file(format!(
        "truncated section body: declared {declared} bytes, found {actual}"
    ))
}

/// Read the file header and then every section up to the tail
///
/// The handler sees each section header with a body limited to the declared
/// size. Whatever part of the body the handler leaves unread is skipped.
/// Parsing stops after the tail section or when the handler returns
/// [`ControlFlow::Break`].
pub fn parse_sections<R, H>(reader: &mut R, max_body_size: u32, mut handler: H) -> Result<()>
where
    R: Read,
    H: FnMut(SectionHeader, &mut SectionBody<'_, R>) -> Result<ControlFlow<()>>,
{
    let file_header = FileHeader::read_from(reader)?;
    debug!(
        "Ship file format version {}",
        file_header.file_format_version
    );

    loop {
        let header = SectionHeader::read_from(reader)?;
        let mut body = SectionBody::new(reader, header.body_size, max_body_size);

        if handler(header, &mut body)?.is_break() {
            debug!("Stopping early after section {:#010x}", header.tag);
            return Ok(());
        }

        body.skip_remaining()?;

        if header.tag == TAIL_TAG {
            return Ok(());
        }
    }
}

/// Sub-record inside a section body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubRecord<'a> {
    /// Record tag
    pub tag: u32,
    /// Record body
    pub body: &'a [u8],
}

impl<'a> SubRecord<'a> {
    /// Cursor over the record body
    pub fn reader(&self) -> ByteReader<'a> {
        ByteReader::new(self.body)
    }
}

/// Iterator over the sub-records of a section body, ending at the tail
///
/// A body that runs out before its tail record yields an error.
pub struct SubRecords<'a> {
    reader: ByteReader<'a>,
    finished: bool,
}

impl<'a> SubRecords<'a> {
    /// Iterate over the records in `body`
    pub fn new(body: &'a [u8]) -> Self {
        Self {
            reader: ByteReader::new(body),
            finished: false,
        }
    }

    fn read_record(&mut self) -> Result<Option<SubRecord<'a>>> {
        if self.reader.is_empty() {
            return Err(ShipFileError::invalid_file(
                "section body ends without a tail record",
            ));
        }

        let tag = self.reader.read_u32()?;
        let body_size = self.reader.read_u32()? as usize;
        let body = self.reader.read_bytes(body_size)?;

        Ok((tag != TAIL_TAG).then_some(SubRecord { tag, body }))
    }
}

impl<'a> Iterator for SubRecords<'a> {
    type Item = Result<SubRecord<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}
