//! Byte cursor over an already-loaded lump or archive region.
//!
//! Every multi-byte read is little-endian unless the `_be` form is used, which
//! only the WAD header and directory need (byte-swapped console archives).
//! A read that would run past the end of the region fails with
//! [`LumpError::UnexpectedEnd`] and leaves the cursor where it was.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::error::{LumpError, Result};

/// A fixed-size on-disk record that knows how to pull itself out of a cursor.
///
/// `decode` must consume exactly `SIZE` bytes, in field order, and must not
/// look at anything but its own bytes.
pub trait WadRecord: Sized {
    /// Size of one record in the lump
    const SIZE: usize;

    fn decode(cursor: &mut LumpCursor<'_>) -> Result<Self>;
}

#[derive(Debug, Clone)]
pub struct LumpCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> LumpCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Start at an arbitrary offset. An offset past the end is allowed, every
    /// read from it will fail.
    pub fn at(data: &'a [u8], pos: usize) -> Self {
        Self { data, pos }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    pub fn is_at_end(&self) -> bool {
        self.remaining() == 0
    }

    /// Everything from the current position to the end of the region
    pub fn rest(&self) -> &'a [u8] {
        self.data.get(self.pos..).unwrap_or_default()
    }

    /// Borrow the next `n` bytes and step over them
    pub fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let bytes = self
            .pos
            .checked_add(n)
            .and_then(|end| self.data.get(self.pos..end))
            .ok_or(LumpError::UnexpectedEnd {
                offset: self.pos,
                wanted: n,
                remaining: self.remaining(),
            })?;
        self.pos += n;
        Ok(bytes)
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.take(n).map(|_| ())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(LittleEndian::read_i16(self.take(2)?))
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(LittleEndian::read_u16(self.take(2)?))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(LittleEndian::read_i32(self.take(4)?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(LittleEndian::read_u32(self.take(4)?))
    }

    pub fn read_u32_be(&mut self) -> Result<u32> {
        Ok(BigEndian::read_u32(self.take(4)?))
    }

    pub fn read_bytes<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_i16_array<const N: usize>(&mut self) -> Result<[i16; N]> {
        let mut out = [0i16; N];
        LittleEndian::read_i16_into(self.take(N * 2)?, &mut out);
        Ok(out)
    }

    pub fn read_u32_array<const N: usize>(&mut self) -> Result<[u32; N]> {
        let mut out = [0u32; N];
        LittleEndian::read_u32_into(self.take(N * 4)?, &mut out);
        Ok(out)
    }

    pub fn read_record<R: WadRecord>(&mut self) -> Result<R> {
        R::decode(self)
    }

    /// Decode exactly `count` records. The whole run is checked against the
    /// remaining length before anything is allocated.
    pub fn read_records<R: WadRecord>(&mut self, count: usize) -> Result<Vec<R>> {
        let needed = count.checked_mul(R::SIZE).unwrap_or(usize::MAX);
        if needed > self.remaining() {
            return Err(LumpError::Truncated {
                needed,
                available: self.remaining(),
            });
        }

        let mut records = Vec::with_capacity(count);
        for _ in 0..count {
            records.push(R::decode(self)?);
        }
        Ok(records)
    }
}
