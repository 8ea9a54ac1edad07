//! Parsing primitives.
//!
//! [`Bytes`] is random access over a read-only slice, [`Stream`] a cursor on
//! top of it. Both decode big-endian and check every access against the
//! buffer length; a failed read reports the absolute file offset it tried to
//! reach, even when the reader was built from a table subrange.

use crate::error::{Error, Result};
use crate::sfnt::RawTag;

/// Buffer wrapping a byte slice for safely reading big endian data.
#[derive(Copy, Clone, Debug)]
pub struct Bytes<'a> {
    data: &'a [u8],
    origin: usize,
}

impl<'a> Bytes<'a> {
    /// Creates a new bytes instance for the specified buffer.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, origin: 0 }
    }

    /// Returns the length of the underlying data.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the underlying data is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the underlying data.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Absolute file offset corresponding to a local offset.
    fn absolute(&self, offset: usize) -> usize {
        self.origin.saturating_add(offset)
    }

    fn get(&self, offset: usize, len: usize) -> Result<&'a [u8]> {
        let end = offset.checked_add(len).ok_or(Error::Truncated {
            offset: self.absolute(offset),
        })?;
        self.data.get(offset..end).ok_or(Error::Truncated {
            offset: self.absolute(offset),
        })
    }

    /// Returns a reader over the subrange, remembering where in the file
    /// the subrange starts.
    pub fn slice(&self, offset: usize, len: usize) -> Result<Bytes<'a>> {
        Ok(Bytes {
            data: self.get(offset, len)?,
            origin: self.absolute(offset),
        })
    }

    /// Reads a sequence of bytes at the specified offset and length.
    pub fn read_bytes(&self, offset: usize, len: usize) -> Result<&'a [u8]> {
        self.get(offset, len)
    }

    /// Reads a u8 value at some offset.
    pub fn read_u8(&self, offset: usize) -> Result<u8> {
        Ok(self.get(offset, 1)?[0])
    }

    /// Reads an i8 value at some offset.
    pub fn read_i8(&self, offset: usize) -> Result<i8> {
        Ok(self.read_u8(offset)? as i8)
    }

    /// Reads a big-endian u16 value at some offset.
    pub fn read_u16(&self, offset: usize) -> Result<u16> {
        let b = self.get(offset, 2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    /// Reads a big-endian i16 value at some offset.
    pub fn read_i16(&self, offset: usize) -> Result<i16> {
        Ok(self.read_u16(offset)? as i16)
    }

    /// Reads a big-endian u32 value at some offset.
    pub fn read_u32(&self, offset: usize) -> Result<u32> {
        let b = self.get(offset, 4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Reads a big-endian i32 value at some offset.
    pub fn read_i32(&self, offset: usize) -> Result<i32> {
        Ok(self.read_u32(offset)? as i32)
    }

    /// Reads a four-byte table tag at some offset.
    pub fn read_tag(&self, offset: usize) -> Result<RawTag> {
        self.read_u32(offset)
    }

    /// Creates a stream at the specified offset.
    pub fn stream_at(&self, offset: usize) -> Stream<'a> {
        Stream {
            bytes: *self,
            offset,
        }
    }
}

/// Stream over a byte slice for safely reading big endian data.
#[derive(Copy, Clone)]
pub struct Stream<'a> {
    bytes: Bytes<'a>,
    offset: usize,
}

impl<'a> Stream<'a> {
    /// Creates a new stream wrapping the specified bytes.
    pub fn new(bytes: Bytes<'a>) -> Self {
        Self { bytes, offset: 0 }
    }

    /// Returns the current local offset.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Skips the specified number of bytes.
    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.bytes.get(self.offset, len)?;
        self.offset += len;
        Ok(())
    }

    /// Reads a u8 value and advances the offset.
    pub fn read_u8(&mut self) -> Result<u8> {
        let v = self.bytes.read_u8(self.offset)?;
        self.offset += 1;
        Ok(v)
    }

    /// Reads an i8 value and advances the offset.
    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    /// Reads a u16 value and advances the offset.
    pub fn read_u16(&mut self) -> Result<u16> {
        let v = self.bytes.read_u16(self.offset)?;
        self.offset += 2;
        Ok(v)
    }

    /// Reads an i16 value and advances the offset.
    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(self.read_u16()? as i16)
    }

    /// Reads a u32 value and advances the offset.
    pub fn read_u32(&mut self) -> Result<u32> {
        let v = self.bytes.read_u32(self.offset)?;
        self.offset += 4;
        Ok(v)
    }

    /// Reads a four-byte table tag and advances the offset.
    pub fn read_tag(&mut self) -> Result<RawTag> {
        self.read_u32()
    }

    /// Reads a sequence of bytes and advances the offset.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let v = self.bytes.read_bytes(self.offset, len)?;
        self.offset += len;
        Ok(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_reads_are_big_endian() {
        let b = Bytes::new(&[0x12, 0x34, 0x56, 0x78, 0xFF]);
        assert_eq!(b.read_u16(0).unwrap(), 0x1234);
        assert_eq!(b.read_u32(0).unwrap(), 0x12345678);
        assert_eq!(b.read_i16(3).unwrap(), 0x78FFu16 as i16);
        assert_eq!(b.read_i8(4).unwrap(), -1);
    }

    #[test]
    fn out_of_range_reads_report_the_attempted_offset() {
        let b = Bytes::new(&[0u8; 4]);
        match b.read_u32(3) {
            Err(Error::Truncated { offset }) => assert_eq!(offset, 3),
            other => panic!("expected truncation, got {other:?}"),
        }
    }

    #[test]
    fn slices_keep_absolute_offsets() {
        let b = Bytes::new(&[0u8; 32]);
        let table = b.slice(16, 8).unwrap();
        match table.read_u16(7) {
            Err(Error::Truncated { offset }) => assert_eq!(offset, 23),
            other => panic!("expected truncation, got {other:?}"),
        }
    }

    #[test]
    fn slice_rejects_ranges_past_the_end() {
        let b = Bytes::new(&[0u8; 8]);
        assert!(b.slice(4, 8).is_err());
        assert!(b.slice(usize::MAX, 2).is_err());
    }

    #[test]
    fn stream_advances_and_checks_bounds() {
        let b = Bytes::new(&[0, 1, 0, 2, 0xAB]);
        let mut s = b.stream_at(0);
        assert_eq!(s.read_u16().unwrap(), 1);
        assert_eq!(s.read_u16().unwrap(), 2);
        assert_eq!(s.read_u8().unwrap(), 0xAB);
        assert!(s.read_u8().is_err());
        assert_eq!(s.offset(), 5);
    }
}
