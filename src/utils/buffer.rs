use std::io::{Cursor, Error as IoError, ErrorKind, Result as IoResult};
use byteorder::{LittleEndian, ReadBytesExt};

/// Cursor over a property value delivered by the radio stack.
///
/// Multi-byte values arrive in the controller's native little-endian order.
pub struct ByteReader<'a> {
    buffer: &'a [u8],
    cursor: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        ByteReader { buffer, cursor: 0 }
    }

    /// Get current cursor position
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Get remaining bytes from current position
    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.cursor)
    }

    /// Check if buffer has at least n bytes remaining
    pub fn has_remaining(&self, n: usize) -> bool {
        self.remaining() >= n
    }

    /// Read u8
    pub fn read_u8(&mut self) -> IoResult<u8> {
        if !self.has_remaining(1) {
            return Err(IoError::new(ErrorKind::UnexpectedEof, "Not enough bytes"));
        }
        let value = self.buffer[self.cursor];
        self.cursor += 1;
        Ok(value)
    }

    /// Read i8
    pub fn read_i8(&mut self) -> IoResult<i8> {
        self.read_u8().map(|b| b as i8)
    }

    /// Read u32 (little endian)
    pub fn read_u32_le(&mut self) -> IoResult<u32> {
        if !self.has_remaining(4) {
            return Err(IoError::new(ErrorKind::UnexpectedEof, "Not enough bytes"));
        }
        let mut cursor = Cursor::new(&self.buffer[self.cursor..]);
        let value = cursor.read_u32::<LittleEndian>()?;
        self.cursor += 4;
        Ok(value)
    }

    /// Read up to `max` bytes, stopping early at a NUL terminator
    pub fn read_c_string(&mut self, max: usize) -> &'a [u8] {
        let buffer = self.buffer;
        let rest = &buffer[self.cursor..];
        let limit = rest.len().min(max);
        let end = rest[..limit].iter().position(|&b| b == 0).unwrap_or(limit);
        self.cursor += end;
        &rest[..end]
    }

    /// Borrow everything that has not been read yet
    pub fn rest(&mut self) -> &'a [u8] {
        let buffer = self.buffer;
        let rest = &buffer[self.cursor..];
        self.cursor = self.buffer.len();
        rest
    }
}
