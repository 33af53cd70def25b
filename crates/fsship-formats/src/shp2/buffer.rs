//! Big-endian byte buffer and cursor used for section bodies

use crate::error::{Result, ShipFileError};
use crate::types::{RgbColor, RgbaColor};

/// Largest value representable by the 16-bit variable-length integer
pub const VAR_U16_MAX: u16 = 0x3FFF;

/// Growable big-endian output buffer
///
/// Every `append_*` method returns the number of bytes it wrote.
#[derive(Debug, Clone, Default)]
pub struct ByteBuffer {
    data: Vec<u8>,
}

impl ByteBuffer {
    /// Empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty buffer with preallocated capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Bytes written so far
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether nothing was written
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Written bytes
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Take the written bytes
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// Drop the contents, keeping the allocation
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Append a byte
    pub fn append_u8(&mut self, value: u8) -> usize {
        self.data.push(value);
        1
    }

    /// Append a bool as one byte
    pub fn append_bool(&mut self, value: bool) -> usize {
        self.append_u8(u8::from(value))
    }

    /// Append a big-endian `u16`
    pub fn append_u16(&mut self, value: u16) -> usize {
        self.append_bytes(&value.to_be_bytes())
    }

    /// Append a big-endian `u32`
    pub fn append_u32(&mut self, value: u32) -> usize {
        self.append_bytes(&value.to_be_bytes())
    }

    /// Append a big-endian `u64`
    pub fn append_u64(&mut self, value: u64) -> usize {
        self.append_bytes(&value.to_be_bytes())
    }

    /// Append a big-endian `i32`
    pub fn append_i32(&mut self, value: i32) -> usize {
        self.append_bytes(&value.to_be_bytes())
    }

    /// Append a big-endian IEEE 754 `f32`
    pub fn append_f32(&mut self, value: f32) -> usize {
        self.append_bytes(&value.to_be_bytes())
    }

    /// Append a string as `u32` byte length plus UTF-8 bytes
    pub fn append_string(&mut self, value: &str) -> Result<usize> {
        let len = u32::try_from(value.len()).map_err(|_| {
            ShipFileError::invalid_definition(format!("string of {} bytes is too long", value.len()))
        })?;
        Ok(self.append_u32(len) + self.append_bytes(value.as_bytes()))
    }

    /// Append a variable-length `u16` (one byte up to 0x7F, two bytes up to [`VAR_U16_MAX`])
    pub fn append_var_u16(&mut self, value: u16) -> Result<usize> {
        if value > VAR_U16_MAX {
            return Err(ShipFileError::invalid_definition(format!(
                "value {value} exceeds the variable-length integer maximum {VAR_U16_MAX}"
            )));
        }

        if value <= 0x7F {
            Ok(self.append_u8(value as u8))
        } else {
            self.append_u8(0x80 | (value & 0x7F) as u8);
            self.append_u8((value >> 7) as u8);
            Ok(2)
        }
    }

    /// Append an RGB color as three bytes
    pub fn append_rgb(&mut self, color: RgbColor) -> usize {
        self.append_bytes(&[color.r, color.g, color.b])
    }

    /// Append an RGBA color as four bytes
    pub fn append_rgba(&mut self, color: RgbaColor) -> usize {
        self.append_bytes(&[color.r, color.g, color.b, color.a])
    }

    /// Append raw bytes
    pub fn append_bytes(&mut self, bytes: &[u8]) -> usize {
        self.data.extend_from_slice(bytes);
        bytes.len()
    }

    /// Append a zero `u32` to be patched later, returning its offset
    pub fn reserve_u32(&mut self) -> usize {
        let offset = self.data.len();
        self.append_u32(0);
        offset
    }

    /// Overwrite a `u32` previously written at `offset`
    pub fn write_u32_at(&mut self, offset: usize, value: u32) -> Result<()> {
        let slot = self
            .data
            .get_mut(offset..offset + 4)
            .ok_or_else(|| ShipFileError::invalid_definition(format!("no u32 slot at offset {offset}")))?;
        slot.copy_from_slice(&value.to_be_bytes());
        Ok(())
    }

    /// Grow by `len` zero bytes and return them for bulk copy-in
    pub fn receive(&mut self, len: usize) -> &mut [u8] {
        let start = self.data.len();
        self.data.resize(start + len, 0);
        &mut self.data[start..]
    }
}

/// Big-endian cursor over a byte slice
///
/// Reads past the end fail with [`ShipFileError::InvalidFile`].
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> ByteReader<'a> {
    /// Cursor at the start of `data`
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Current offset
    pub fn position(&self) -> usize {
        self.position
    }

    /// Bytes left
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// Whether all bytes were consumed
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(ShipFileError::invalid_file(format!(
                "truncated data: needed {len} bytes at offset {}, {} available",
                self.position,
                self.remaining()
            )));
        }

        let bytes = &self.data[self.position..self.position + len];
        self.position += len;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    /// Read a byte
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    /// Read a one-byte bool (any non-zero value is true)
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    /// Read a big-endian `u16`
    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    /// Read a big-endian `u32`
    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    /// Read a big-endian `u64`
    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(u64::from_be_bytes(self.read_array()?))
    }

    /// Read a big-endian `i32`
    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_be_bytes(self.read_array()?))
    }

    /// Read a big-endian `f32`
    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_be_bytes(self.read_array()?))
    }

    /// Read a length-prefixed UTF-8 string
    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_u32()? as usize;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| ShipFileError::invalid_file(format!("invalid UTF-8 in string: {e}")))
    }

    /// Read a variable-length `u16`
    pub fn read_var_u16(&mut self) -> Result<u16> {
        let first = self.read_u8()?;
        if first & 0x80 == 0 {
            return Ok(u16::from(first));
        }

        let second = self.read_u8()?;
        Ok(u16::from(first & 0x7F) | (u16::from(second) << 7))
    }

    /// Read an RGB color
    pub fn read_rgb(&mut self) -> Result<RgbColor> {
        let [r, g, b] = self.read_array()?;
        Ok(RgbColor::new(r, g, b))
    }

    /// Read an RGBA color
    pub fn read_rgba(&mut self) -> Result<RgbaColor> {
        let [r, g, b, a] = self.read_array()?;
        Ok(RgbaColor::new(r, g, b, a))
    }

    /// Borrow the next `len` bytes
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        self.take(len)
    }

    /// Skip `len` bytes
    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.take(len).map(|_| ())
    }
}
