// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Deserialization engine. Mirrors [`crate::ser`] field for field.

use crate::cursor::ByteCursor;
use crate::error::Result;
use crate::schema::{FieldDescriptor, Schema};
use crate::value::{Record, Value};

/// State of one root deserialize call, shared by every nested child.
///
/// Nested children swap in a fresh `output` while they decode.
pub struct DeserializeContext<'a> {
    cursor: ByteCursor<'a>,
    pub(crate) output: Record,
    pub(crate) field: &'a str,
}

impl<'a> DeserializeContext<'a> {
    fn new(source: &'a [u8]) -> Self {
        Self {
            cursor: ByteCursor::new(source),
            output: Record::new(),
            field: "",
        }
    }

    pub fn cursor(&mut self) -> &mut ByteCursor<'a> {
        &mut self.cursor
    }

    /// Fields decoded so far at the current nesting level.
    pub fn output(&self) -> &Record {
        &self.output
    }

    /// Name of the field being decoded.
    pub fn field_name(&self) -> &'a str {
        self.field
    }
}

impl Schema {
    /// Decode a record from raw bytes or a [`BinaryData`](crate::BinaryData).
    ///
    /// Bytes past the end of the record are ignored.
    pub fn deserialize<B>(&self, bytes: &B) -> Result<Record>
    where
        B: AsRef<[u8]> + ?Sized,
    {
        self.deserialize_prefix(bytes).map(|(record, _)| record)
    }

    /// Decode a record and report how many bytes it took.
    pub fn deserialize_prefix<B>(&self, bytes: &B) -> Result<(Record, usize)>
    where
        B: AsRef<[u8]> + ?Sized,
    {
        let mut ctx = DeserializeContext::new(bytes.as_ref());
        self.deserialize_into(&mut ctx)?;
        let consumed = ctx.cursor.offset();
        log::trace!(
            "[Schema::deserialize] {} bytes -> {} fields",
            consumed,
            ctx.output.len()
        );
        Ok((ctx.output, consumed))
    }

    pub(crate) fn deserialize_into<'a>(&'a self, ctx: &mut DeserializeContext<'a>) -> Result<()> {
        let bitmap = if self.allow_partial {
            Some(ctx.cursor.read_bytes(self.bitmap_len())?)
        } else {
            None
        };
        let mut booleans: Vec<&'a str> = Vec::with_capacity(self.boolean_count);

        for (index, field) in self.fields.iter().enumerate() {
            if let Some(bits) = bitmap {
                if bits[index / 8] & (1 << (index % 8)) == 0 {
                    continue;
                }
            }
            if field.kind().is_boolean() {
                booleans.push(field.name());
                continue;
            }
            ctx.field = field.name();
            let value = decode_field(ctx, field)?;
            ctx.output.insert(field.name().to_string(), value);
        }

        let mut byte = 0u8;
        for (k, name) in booleans.into_iter().enumerate() {
            if k % 8 == 0 {
                byte = ctx.cursor.read_u8()?;
            }
            let on = byte & (1 << (k % 8)) != 0;
            ctx.output.insert(name.to_string(), Value::Bool(on));
        }
        Ok(())
    }
}

fn decode_field<'a>(ctx: &mut DeserializeContext<'a>, field: &'a FieldDescriptor) -> Result<Value> {
    let value = match field.array_prefix_width() {
        Some(width) => {
            let len = ctx.cursor.read_len_prefix(width)?;
            // a corrupt prefix must not drive a huge allocation
            let mut items = Vec::with_capacity(len.min(ctx.cursor.remaining()));
            for _ in 0..len {
                items.push(field.kind().decode(ctx)?);
            }
            Value::Array(items)
        }
        None => field.kind().decode(ctx)?,
    };
    Ok(match field.post_decode() {
        Some(hook) => hook(value),
        None => value,
    })
}
