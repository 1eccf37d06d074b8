// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bounds-checked read cursor over serialized bytes.

use crate::config::MAX_RAW_WIDTH;
use crate::error::{check_width, Error, Result};

/// Generate big-endian read methods for fixed-width primitives.
///
/// Each generated method checks bounds (`Error::UnexpectedEnd` on overflow),
/// reads N bytes, converts via `from_be_bytes()` and advances the offset.
macro_rules! impl_read_be {
    ($name:ident, $type:ty, $size:expr) => {
        pub fn $name(&mut self) -> Result<$type> {
            let mut bytes = [0u8; $size];
            bytes.copy_from_slice(self.read_bytes($size)?);
            Ok(<$type>::from_be_bytes(bytes))
        }
    };
}

pub struct ByteCursor<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }

    pub fn is_eof(&self) -> bool {
        self.offset >= self.buffer.len()
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(Error::UnexpectedEnd {
                offset: self.offset,
                need: len,
                have: self.remaining(),
            });
        }
        let slice = &self.buffer[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    impl_read_be!(read_u16_be, u16, 2);
    impl_read_be!(read_u32_be, u32, 4);
    impl_read_be!(read_u64_be, u64, 8);
    impl_read_be!(read_i64_be, i64, 8);
    impl_read_be!(read_f32_be, f32, 4);
    impl_read_be!(read_f64_be, f64, 8);

    /// Read `width` (1..=8) bytes as an unsigned big-endian integer.
    pub fn read_uint_be(&mut self, width: u8) -> Result<u64> {
        check_width("integer", width, MAX_RAW_WIDTH)?;
        let bytes = self.read_bytes(usize::from(width))?;
        Ok(bytes.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
    }

    /// Read a `width` (1..=8) byte length or count prefix written least
    /// significant byte first.
    pub fn read_len_prefix(&mut self, width: u8) -> Result<usize> {
        check_width("length prefix", width, MAX_RAW_WIDTH)?;
        let bytes = self.read_bytes(usize::from(width))?;
        let len = bytes
            .iter()
            .rev()
            .fold(0u64, |acc, b| (acc << 8) | u64::from(*b));
        Ok(len as usize)
    }
}
