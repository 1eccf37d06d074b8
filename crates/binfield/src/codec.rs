// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Field kinds and their encode/decode procedures.
//!
//! Built-in kinds are a closed set ([`FieldKind`]). Anything else plugs in
//! through [`FieldCodec`], either directly with [`FieldKind::Custom`] or by
//! tag through a [`CodecRegistry`].

use crate::config::FLOAT_DECODE_DECIMALS;
use crate::de::DeserializeContext;
use crate::error::{Error, Result};
use crate::schema::Schema;
use crate::ser::SerializeContext;
use crate::value::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Encode/decode capability for a custom field type.
///
/// Implementations write through [`SerializeContext::output`] and read
/// through [`DeserializeContext::cursor`]. Whatever `encode` writes, `decode`
/// must consume exactly.
pub trait FieldCodec: fmt::Debug + Send + Sync {
    fn encode(&self, ctx: &mut SerializeContext<'_>, value: &Value) -> Result<()>;
    fn decode(&self, ctx: &mut DeserializeContext<'_>) -> Result<Value>;
}

/// Option table of an enum field. Indices are stored in one byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumOptions {
    index_to_value: Vec<String>,
    value_to_index: HashMap<String, u8>,
}

impl EnumOptions {
    pub fn new<I, S>(options: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let index_to_value: Vec<String> = options.into_iter().map(Into::into).collect();
        if index_to_value.len() > crate::config::MAX_ENUM_OPTIONS {
            return Err(Error::TooManyOptions {
                count: index_to_value.len(),
            });
        }
        let value_to_index = index_to_value
            .iter()
            .enumerate()
            .map(|(i, v)| (v.clone(), i as u8))
            .collect();
        Ok(Self {
            index_to_value,
            value_to_index,
        })
    }

    pub fn index_of(&self, value: &str) -> Option<u8> {
        self.value_to_index.get(value).copied()
    }

    pub fn value_at(&self, index: u8) -> Option<&str> {
        self.index_to_value.get(usize::from(index)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.index_to_value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index_to_value.is_empty()
    }
}

/// Kind of a schema field, with its per-kind options.
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// Integer stored in `width` (1..=4) big-endian bytes, truncated on write.
    Number { width: u8, signed: bool },
    /// 64-bit big-endian integer.
    BigInt { signed: bool },
    /// IEEE-754 single precision; `round` keeps 3 decimals on decode.
    Float { round: bool },
    Double,
    /// One byte holding the option index.
    Enum(EnumOptions),
    /// Bit-packed after the other fields when encoded by a schema.
    Boolean,
    /// Length-prefixed text; one byte per char unless `unicode` (UTF-8).
    String { len_bytes: u8, unicode: bool },
    /// Milliseconds since the epoch, unsigned 64-bit.
    Time,
    /// Nested schema, encoded inline with no length prefix.
    Child(Arc<Schema>),
    Custom {
        tag: String,
        codec: Arc<dyn FieldCodec>,
    },
}

impl FieldKind {
    /// Type tag, as accepted by [`CodecRegistry::resolve`].
    pub fn tag(&self) -> &str {
        match self {
            Self::Number { .. } => "number",
            Self::BigInt { .. } => "bigint",
            Self::Float { .. } => "float",
            Self::Double => "double",
            Self::Enum(_) => "enum",
            Self::Boolean => "boolean",
            Self::String { .. } => "string",
            Self::Time => "time",
            Self::Child(_) => "child",
            Self::Custom { tag, .. } => tag,
        }
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, Self::Boolean)
    }

    pub fn encode<'a>(&'a self, ctx: &mut SerializeContext<'a>, value: &Value) -> Result<()> {
        match self {
            Self::Number { width, .. } => {
                let raw = value
                    .as_u64()
                    .ok_or_else(|| wrong_type(ctx.field_name(), "number", value))?;
                ctx.output().write_uint_be(raw, *width)?;
            }
            Self::BigInt { signed: true } => {
                let v = value
                    .as_i64()
                    .ok_or_else(|| wrong_type(ctx.field_name(), "integer", value))?;
                ctx.output().write_i64_be(v);
            }
            Self::BigInt { signed: false } => {
                let v = value
                    .as_u64()
                    .ok_or_else(|| wrong_type(ctx.field_name(), "integer", value))?;
                ctx.output().write_u64_be(v);
            }
            Self::Float { .. } => {
                let v = value
                    .as_f64()
                    .ok_or_else(|| wrong_type(ctx.field_name(), "float", value))?;
                ctx.output().write_f32_be(v as f32);
            }
            Self::Double => {
                let v = value
                    .as_f64()
                    .ok_or_else(|| wrong_type(ctx.field_name(), "double", value))?;
                ctx.output().write_f64_be(v);
            }
            Self::Enum(options) => {
                let name = value
                    .as_str()
                    .ok_or_else(|| wrong_type(ctx.field_name(), "enum option", value))?;
                let index = options.index_of(name).ok_or_else(|| Error::UnknownEnumValue {
                    field: ctx.field_name().to_string(),
                    value: name.to_string(),
                })?;
                ctx.output().write_u8(index);
            }
            // Standalone booleans take a whole byte; schemas pack them instead.
            Self::Boolean => {
                let on = value.is_truthy();
                ctx.output().write_u8(u8::from(on));
            }
            Self::String { len_bytes, unicode } => {
                let text = value
                    .as_str()
                    .ok_or_else(|| wrong_type(ctx.field_name(), "string", value))?;
                encode_string(ctx, text, *len_bytes, *unicode)?;
            }
            Self::Time => {
                let time = value
                    .as_time()
                    .ok_or_else(|| wrong_type(ctx.field_name(), "time", value))?;
                let since = time
                    .duration_since(UNIX_EPOCH)
                    .map_err(|_| Error::WrongValueType {
                        field: ctx.field_name().to_string(),
                        expected: "time after the epoch",
                        found: "time before the epoch",
                    })?;
                let millis = u64::try_from(since.as_millis()).unwrap_or(u64::MAX);
                ctx.output().write_u64_be(millis);
            }
            Self::Child(schema) => {
                let record = value
                    .as_record()
                    .ok_or_else(|| wrong_type(ctx.field_name(), "map", value))?;
                let field = ctx.field;
                let result = schema.serialize_into(ctx, record);
                ctx.field = field;
                result?;
            }
            Self::Custom { codec, .. } => codec.encode(ctx, value)?,
        }
        Ok(())
    }

    pub fn decode<'a>(&'a self, ctx: &mut DeserializeContext<'a>) -> Result<Value> {
        let value = match self {
            Self::Number { width, signed } => {
                let raw = ctx.cursor().read_uint_be(*width)?;
                if *signed {
                    let shift = 64 - u32::from(*width) * 8;
                    Value::Int(((raw << shift) as i64) >> shift)
                } else {
                    Value::UInt(raw)
                }
            }
            Self::BigInt { signed: true } => Value::Int(ctx.cursor().read_i64_be()?),
            Self::BigInt { signed: false } => Value::UInt(ctx.cursor().read_u64_be()?),
            Self::Float { round } => {
                let v = f64::from(ctx.cursor().read_f32_be()?);
                Value::Float(if *round { round_decimals(v) } else { v })
            }
            Self::Double => Value::Float(ctx.cursor().read_f64_be()?),
            Self::Enum(options) => {
                let index = ctx.cursor().read_u8()?;
                let name = options.value_at(index).ok_or_else(|| Error::UnknownEnumIndex {
                    field: ctx.field_name().to_string(),
                    index,
                })?;
                Value::Str(name.to_string())
            }
            Self::Boolean => Value::Bool(ctx.cursor().read_u8()? != 0),
            Self::String { len_bytes, unicode } => decode_string(ctx, *len_bytes, *unicode)?,
            Self::Time => {
                let millis = ctx.cursor().read_u64_be()?;
                let time = UNIX_EPOCH
                    .checked_add(Duration::from_millis(millis))
                    .ok_or_else(|| {
                        Error::Custom(format!(
                            "field '{}': timestamp {} ms is out of range",
                            ctx.field_name(),
                            millis
                        ))
                    })?;
                Value::Time(time)
            }
            Self::Child(schema) => {
                let parent = std::mem::take(&mut ctx.output);
                let field = ctx.field;
                let result = schema.deserialize_into(ctx);
                let child = std::mem::replace(&mut ctx.output, parent);
                ctx.field = field;
                result?;
                Value::Map(child)
            }
            Self::Custom { codec, .. } => codec.decode(ctx)?,
        };
        Ok(value)
    }
}

fn wrong_type(field: &str, expected: &'static str, found: &Value) -> Error {
    Error::WrongValueType {
        field: field.to_string(),
        expected,
        found: found.kind_name(),
    }
}

fn round_decimals(v: f64) -> f64 {
    let scale = 10f64.powi(FLOAT_DECODE_DECIMALS as i32);
    (v * scale + 0.5).floor() / scale
}

fn encode_string(
    ctx: &mut SerializeContext<'_>,
    text: &str,
    len_bytes: u8,
    unicode: bool,
) -> Result<()> {
    let field = ctx.field_name();
    if unicode {
        let bytes = text.as_bytes();
        ctx.output().write_len_prefix(field, bytes.len(), len_bytes)?;
        ctx.output().write_bytes(bytes);
    } else {
        let count = text.chars().count();
        ctx.output().write_len_prefix(field, count, len_bytes)?;
        let out = ctx.output();
        out.reserve(count);
        // chars above 0xFF keep only their low byte
        for c in text.chars() {
            out.write_u8(u32::from(c) as u8);
        }
    }
    Ok(())
}

fn decode_string(ctx: &mut DeserializeContext<'_>, len_bytes: u8, unicode: bool) -> Result<Value> {
    let len = ctx.cursor().read_len_prefix(len_bytes)?;
    let bytes = ctx.cursor().read_bytes(len)?;
    let text = if unicode {
        std::str::from_utf8(bytes)
            .map_err(|_| Error::InvalidUtf8 {
                field: ctx.field_name().to_string(),
            })?
            .to_string()
    } else {
        bytes.iter().map(|&b| char::from(b)).collect()
    };
    Ok(Value::Str(text))
}

/// Maps type tags to field kinds for tag-based declarations.
///
/// Registered custom codecs take precedence over the built-in tags.
#[derive(Debug, Default, Clone)]
pub struct CodecRegistry {
    custom: HashMap<String, Arc<dyn FieldCodec>>,
}

impl CodecRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tag: impl Into<String>, codec: Arc<dyn FieldCodec>) -> &mut Self {
        let tag = tag.into();
        log::debug!("[CodecRegistry::register] tag '{}'", tag);
        self.custom.insert(tag, codec);
        self
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.custom.contains_key(tag)
    }

    /// Resolve a tag to a field kind with default options.
    pub fn resolve(&self, tag: &str) -> Result<FieldKind> {
        if let Some(codec) = self.custom.get(tag) {
            return Ok(FieldKind::Custom {
                tag: tag.to_string(),
                codec: Arc::clone(codec),
            });
        }
        let kind = match tag {
            "number" => FieldKind::Number {
                width: 4,
                signed: true,
            },
            "bigint" => FieldKind::BigInt { signed: true },
            "float" => FieldKind::Float { round: true },
            "double" => FieldKind::Double,
            "boolean" => FieldKind::Boolean,
            "string" => FieldKind::String {
                len_bytes: crate::config::DEFAULT_STRING_PREFIX_WIDTH,
                unicode: false,
            },
            "time" => FieldKind::Time,
            "enum" | "child" => {
                return Err(Error::InvalidField(format!(
                    "type '{}' needs options and cannot be declared by tag",
                    tag
                )))
            }
            _ => return Err(Error::UnknownCodec(tag.to_string())),
        };
        Ok(kind)
    }
}
