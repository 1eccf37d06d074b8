// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Serialization engine.
//!
//! Layout written for one schema:
//!
//! ```text
//! [presence bitmap, ceil(n/8) bytes, partial schemas only]
//! [non-boolean fields, declaration order]
//! [present booleans, declaration order, bit-packed LSB first]
//! ```
//!
//! Child schemas write the same layout inline, into the buffer of the root
//! call.

use crate::buffer::{BinaryData, OutputBuffer};
use crate::config;
use crate::error::{Error, Result};
use crate::schema::{FieldDescriptor, Schema};
use crate::value::{Record, Value};

/// State of one root serialize call, shared by every nested child.
pub struct SerializeContext<'a> {
    output: OutputBuffer,
    input: &'a Record,
    pub(crate) field: &'a str,
}

impl<'a> SerializeContext<'a> {
    fn new(input: &'a Record, capacity: usize) -> Self {
        Self {
            output: OutputBuffer::with_capacity(capacity),
            input,
            field: "",
        }
    }

    pub fn output(&mut self) -> &mut OutputBuffer {
        &mut self.output
    }

    /// The whole record handed to the root call.
    pub fn input(&self) -> &'a Record {
        self.input
    }

    /// Name of the field being encoded.
    pub fn field_name(&self) -> &'a str {
        self.field
    }
}

/// Pack booleans LSB first, eight per byte; a partial last byte is still written.
fn write_packed_bools(output: &mut OutputBuffer, bits: &[bool]) {
    for chunk in bits.chunks(8) {
        let byte = chunk
            .iter()
            .enumerate()
            .fold(0u8, |acc, (k, on)| if *on { acc | (1 << k) } else { acc });
        output.write_u8(byte);
    }
}

impl Schema {
    /// Serialize `record` into a fresh buffer.
    ///
    /// Fails with [`Error::MissingField`] when a declared field is absent and
    /// partial data is off; nothing is returned in that case.
    pub fn serialize(&self, record: &Record) -> Result<BinaryData> {
        let capacity = config::defaults().initial_capacity;
        let mut ctx = SerializeContext::new(record, capacity);
        self.serialize_into(&mut ctx, record)?;
        let data = ctx.output.into_binary();
        log::trace!(
            "[Schema::serialize] {} fields -> {} bytes (capacity {})",
            self.fields.len(),
            data.len(),
            data.capacity()
        );
        Ok(data)
    }

    pub(crate) fn serialize_into<'a>(
        &'a self,
        ctx: &mut SerializeContext<'a>,
        record: &Record,
    ) -> Result<()> {
        let field_count = self.fields.len();
        let bitmap_at = if self.allow_partial {
            Some(ctx.output.skip(self.bitmap_len()))
        } else {
            None
        };
        let mut mask = 0u8;
        let mut booleans = Vec::with_capacity(self.boolean_count);

        for (index, field) in self.fields.iter().enumerate() {
            let value = record.get(field.name()).filter(|v| !v.is_null());

            if let Some(at) = bitmap_at {
                if value.is_some() {
                    mask |= 1 << (index % 8);
                }
                if index % 8 == 7 || index + 1 == field_count {
                    ctx.output.patch_u8(at + index / 8, mask);
                    mask = 0;
                }
            } else if value.is_none() {
                return Err(Error::MissingField(field.name().to_string()));
            }

            let Some(value) = value else {
                continue;
            };
            if field.kind().is_boolean() {
                booleans.push(value.is_truthy());
                continue;
            }
            ctx.field = field.name();
            encode_field(ctx, field, value)?;
        }

        write_packed_bools(&mut ctx.output, &booleans);
        Ok(())
    }
}

fn encode_field<'a>(
    ctx: &mut SerializeContext<'a>,
    field: &'a FieldDescriptor,
    value: &Value,
) -> Result<()> {
    let hooked;
    let value = match field.pre_encode() {
        Some(hook) => {
            hooked = hook(value.clone());
            &hooked
        }
        None => value,
    };

    match field.array_prefix_width() {
        Some(width) => {
            let items = value.as_array().ok_or_else(|| Error::WrongValueType {
                field: field.name().to_string(),
                expected: "array",
                found: value.kind_name(),
            })?;
            ctx.output.write_len_prefix(field.name(), items.len(), width)?;
            for item in items {
                field.kind().encode(ctx, item)?;
            }
            Ok(())
        }
        None => field.kind().encode(ctx, value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record;
    use crate::schema::SchemaBuilder;

    #[test]
    fn test_packed_bools_layout() {
        let mut out = OutputBuffer::with_capacity(4);
        let bits = [true, false, true, false, false, false, false, true, true];
        write_packed_bools(&mut out, &bits);
        assert_eq!(out.into_binary().as_bytes(), &[0b1000_0101, 0b0000_0001]);
    }

    #[test]
    fn test_presence_bitmap_bits() {
        let mut b = SchemaBuilder::new();
        b.allow_partial(true);
        for i in 0..10 {
            b.byte(format!("f{}", i)).unwrap();
        }
        let schema = b.build();
        let data = schema
            .serialize(&record! { "f0" => 1u8, "f3" => 2u8, "f9" => 3u8 })
            .expect("serialize");
        assert_eq!(data.as_bytes(), &[0b0000_1001, 0b0000_0010, 1, 2, 3]);
    }

    #[test]
    fn test_missing_field_aborts() {
        let mut b = SchemaBuilder::new();
        b.allow_partial(false);
        b.byte("a").unwrap();
        b.byte("b").unwrap();
        let schema = b.build();
        let err = schema.serialize(&record! { "a" => 1u8 }).unwrap_err();
        assert_eq!(err, Error::MissingField("b".into()));

        // Null counts as absent
        let err = schema
            .serialize(&record! { "a" => 1u8, "b" => Value::Null })
            .unwrap_err();
        assert_eq!(err, Error::MissingField("b".into()));
    }

    #[test]
    fn test_array_needs_sequence_value() {
        let mut b = SchemaBuilder::new();
        b.allow_partial(false);
        b.short("s").unwrap().array().unwrap();
        let schema = b.build();
        let err = schema.serialize(&record! { "s" => 5i16 }).unwrap_err();
        assert!(matches!(err, Error::WrongValueType { expected: "array", .. }));
    }

    #[test]
    fn test_input_is_visible_to_codecs() {
        let record = record! { "x" => 1u8 };
        let ctx = SerializeContext::new(&record, 8);
        assert_eq!(ctx.input().get("x"), Some(&Value::UInt(1)));
        assert_eq!(ctx.field_name(), "");
    }
}
