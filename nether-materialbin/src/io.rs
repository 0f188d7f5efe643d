//! Bounds-checked little-endian primitives
//!
//! [`Reader`] walks a borrowed byte slice with a forward-only cursor and never
//! reads past its end. [`Writer`] appends to a growable buffer; the only
//! write failures are lengths that do not fit their wire width.
//!
//! Strings on the wire are a `u32` byte count followed by raw bytes (no
//! terminator). Optional values are a presence `bool` followed by the value
//! only when the flag is set.

use crate::error::{MaterialError, Result};

/// Read cursor over a byte slice.
#[derive(Clone)]
pub(crate) struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current byte offset.
    #[cfg(test)]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left after the cursor.
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    fn ensure(&self, n: usize) -> Result<()> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(MaterialError::UnexpectedEof {
                offset: self.pos,
                needed: n,
                shortfall: n - remaining,
            });
        }
        Ok(())
    }

    /// Borrow the next `n` bytes and advance past them.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.ensure(n)?;
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Look at the next byte without consuming it.
    pub fn peek_u8(&self) -> Result<u8> {
        self.ensure(1)?;
        Ok(self.data[self.pos])
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let v = self.peek_u8()?;
        self.pos += 1;
        Ok(v)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    /// Any non-zero byte is `true`.
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    /// `u32` length prefix + UTF-8 bytes.
    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_u32()? as usize;
        self.read_utf8(len)
    }

    /// `len` raw bytes interpreted as UTF-8.
    pub fn read_utf8(&mut self, len: usize) -> Result<String> {
        let offset = self.pos;
        let bytes = self.read_bytes(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| MaterialError::InvalidString { offset })
    }

    /// `u32` length prefix + opaque bytes.
    pub fn read_blob(&mut self) -> Result<Vec<u8>> {
        let len = self.read_u32()? as usize;
        Ok(self.read_bytes(len)?.to_vec())
    }

    /// Presence flag, then the value only if the flag is set.
    pub fn read_optional<T>(
        &mut self,
        read_value: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<Option<T>> {
        if self.read_bool()? {
            read_value(self).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Read `count` items with `read_item`.
    ///
    /// Capacity is capped by the remaining input so a hostile count cannot
    /// force a large allocation up front.
    pub fn read_list<T>(
        &mut self,
        count: usize,
        mut read_item: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<Vec<T>> {
        let mut items = Vec::with_capacity(count.min(self.remaining()));
        for _ in 0..count {
            items.push(read_item(self)?);
        }
        Ok(items)
    }
}

/// Append-only little-endian byte buffer.
#[derive(Debug, Default)]
pub(crate) struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn write_u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    /// `u32` length prefix + bytes.
    pub fn write_string(&mut self, field: &'static str, s: &str) -> Result<()> {
        self.write_blob(field, s.as_bytes())
    }

    /// `u32` length prefix + opaque bytes.
    pub fn write_blob(&mut self, field: &'static str, bytes: &[u8]) -> Result<()> {
        self.write_count_u32(field, bytes.len())?;
        self.write_bytes(bytes);
        Ok(())
    }

    pub fn write_count_u8(&mut self, field: &'static str, len: usize) -> Result<()> {
        let count = u8::try_from(len).map_err(|_| overflow(field, len, u8::MAX.into()))?;
        self.write_u8(count);
        Ok(())
    }

    pub fn write_count_u16(&mut self, field: &'static str, len: usize) -> Result<()> {
        let count = u16::try_from(len).map_err(|_| overflow(field, len, u16::MAX.into()))?;
        self.write_u16(count);
        Ok(())
    }

    pub fn write_count_u32(&mut self, field: &'static str, len: usize) -> Result<()> {
        let count = u32::try_from(len).map_err(|_| overflow(field, len, u32::MAX.into()))?;
        self.write_u32(count);
        Ok(())
    }

    /// Presence flag, then the value only if present.
    pub fn write_optional<T: ?Sized>(
        &mut self,
        value: Option<&T>,
        write_value: impl FnOnce(&mut Self, &T) -> Result<()>,
    ) -> Result<()> {
        self.write_bool(value.is_some());
        match value {
            Some(v) => write_value(self, v),
            None => Ok(()),
        }
    }
}

fn overflow(field: &'static str, len: usize, max: u64) -> MaterialError {
    MaterialError::WidthOverflow { field, len, max }
}
