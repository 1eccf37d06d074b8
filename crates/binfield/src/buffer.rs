// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Growable output buffer and the serialized result container.

use crate::config::{BUFFER_GROWTH_MARGIN, MAX_RAW_WIDTH};
use crate::error::{check_width, Error, Result};

/// Generate big-endian write methods for fixed-width primitives.
///
/// Each generated method grows the buffer when needed, copies the
/// `to_be_bytes()` representation at the write offset and advances it.
macro_rules! impl_write_be {
    ($name:ident, $type:ty) => {
        pub fn $name(&mut self, value: $type) {
            self.write_bytes(&value.to_be_bytes());
        }
    };
}

/// Append-only byte sink with geometric growth.
///
/// The backing storage is kept at full capacity (zero padded) and `offset`
/// marks the logical end, so the bytes can be handed out without copying and
/// trimmed later.
#[derive(Debug)]
pub struct OutputBuffer {
    bytes: Vec<u8>,
    offset: usize,
}

impl OutputBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: vec![0; capacity.max(1)],
            offset: 0,
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// Make room for `extra` more bytes past the write offset.
    ///
    /// Capacity doubles, or jumps to `offset + extra + margin` when doubling
    /// is not enough.
    pub fn reserve(&mut self, extra: usize) {
        let required = self.offset + extra;
        if required <= self.bytes.len() {
            return;
        }
        let old = self.bytes.len();
        let new_capacity = (old * 2).max(required + BUFFER_GROWTH_MARGIN);
        log::trace!("[OutputBuffer::reserve] growing {} -> {}", old, new_capacity);
        self.bytes.resize(new_capacity, 0);
    }

    /// Reserve `count` bytes and return their position for a later patch.
    pub fn skip(&mut self, count: usize) -> usize {
        self.reserve(count);
        let at = self.offset;
        self.offset += count;
        at
    }

    /// Overwrite a byte that was previously reserved with [`skip`](Self::skip).
    pub fn patch_u8(&mut self, at: usize, value: u8) {
        debug_assert!(at < self.offset, "patch outside written region");
        self.bytes[at] = value;
    }

    pub fn write_u8(&mut self, value: u8) {
        self.reserve(1);
        self.bytes[self.offset] = value;
        self.offset += 1;
    }

    pub fn write_bytes(&mut self, data: &[u8]) {
        self.reserve(data.len());
        self.bytes[self.offset..self.offset + data.len()].copy_from_slice(data);
        self.offset += data.len();
    }

    impl_write_be!(write_u16_be, u16);
    impl_write_be!(write_u32_be, u32);
    impl_write_be!(write_u64_be, u64);
    impl_write_be!(write_i64_be, i64);
    impl_write_be!(write_f32_be, f32);
    impl_write_be!(write_f64_be, f64);

    /// Write the low `width` (1..=8) bytes of `value`, most significant first.
    pub fn write_uint_be(&mut self, value: u64, width: u8) -> Result<()> {
        check_width("integer", width, MAX_RAW_WIDTH)?;
        let bytes = value.to_be_bytes();
        self.write_bytes(&bytes[bytes.len() - usize::from(width)..]);
        Ok(())
    }

    /// Write a length or count prefix: `width` (1..=8) bytes, least
    /// significant first.
    ///
    /// Fails when `len` cannot be represented in `width` bytes.
    pub fn write_len_prefix(&mut self, field: &str, len: usize, width: u8) -> Result<()> {
        check_width("length prefix", width, MAX_RAW_WIDTH)?;
        let max = if width == MAX_RAW_WIDTH {
            u64::MAX
        } else {
            (1u64 << (u32::from(width) * 8)) - 1
        };
        if len as u64 > max {
            return Err(Error::LengthOverflow {
                field: field.to_string(),
                len,
                width,
            });
        }
        let bytes = (len as u64).to_le_bytes();
        self.write_bytes(&bytes[..usize::from(width)]);
        Ok(())
    }

    pub fn into_binary(self) -> BinaryData {
        BinaryData::new(self.bytes, self.offset)
    }
}

/// Serialized bytes plus the logical length actually used.
///
/// The buffer may be over-allocated; [`trim`](Self::trim) drops the padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryData {
    buffer: Vec<u8>,
    len: usize,
}

impl BinaryData {
    fn new(buffer: Vec<u8>, len: usize) -> Self {
        debug_assert!(len <= buffer.len());
        Self { buffer, len }
    }

    /// Logical length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Size of the backing buffer, padding included.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// The whole backing buffer. May contain padding past [`len`](Self::len).
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// The serialized bytes, without padding.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer[..self.len]
    }

    /// Shrink the backing buffer to the logical length.
    pub fn trim(&mut self) {
        if self.buffer.len() != self.len {
            self.buffer.truncate(self.len);
            self.buffer.shrink_to_fit();
        }
    }

    /// Trimmed bytes.
    pub fn into_vec(mut self) -> Vec<u8> {
        self.trim();
        self.buffer
    }
}

impl AsRef<[u8]> for BinaryData {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl From<BinaryData> for Vec<u8> {
    fn from(data: BinaryData) -> Self {
        data.into_vec()
    }
}
