// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schemas and the fluent declaration API.
//!
//! Field order is part of the wire layout: fields are encoded and decoded in
//! declaration order and that order is never stored in the bytes.

use crate::codec::{CodecRegistry, EnumOptions, FieldKind};
use crate::config::{self, MAX_PREFIX_WIDTH};
use crate::error::{check_width, Error, Result};
use crate::value::Value;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Value transform applied before encoding or after decoding a field.
pub type Hook = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// A single declared field.
#[derive(Clone)]
pub struct FieldDescriptor {
    name: String,
    kind: FieldKind,
    array_prefix: Option<u8>,
    pre_encode: Option<Hook>,
    post_decode: Option<Hook>,
}

impl FieldDescriptor {
    fn new(name: String, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            array_prefix: None,
            pre_encode: None,
            post_decode: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn is_array(&self) -> bool {
        self.array_prefix.is_some()
    }

    /// Width in bytes of the element-count prefix, for array fields.
    pub fn array_prefix_width(&self) -> Option<u8> {
        self.array_prefix
    }

    pub fn pre_encode(&self) -> Option<&Hook> {
        self.pre_encode.as_ref()
    }

    pub fn post_decode(&self) -> Option<&Hook> {
        self.post_decode.as_ref()
    }

    fn set_array(&mut self, width: u8) -> Result<()> {
        check_width("array length prefix", width, MAX_PREFIX_WIDTH)?;
        if self.kind.is_boolean() {
            return Err(Error::InvalidField(format!(
                "boolean field '{}' cannot be an array",
                self.name
            )));
        }
        self.array_prefix = Some(width);
        Ok(())
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("array_prefix", &self.array_prefix)
            .field("pre_encode", &self.pre_encode.is_some())
            .field("post_decode", &self.post_decode.is_some())
            .finish()
    }
}

/// An ordered set of uniquely named fields defining a wire layout.
///
/// Read-only once built; share it with `Arc` across threads freely.
#[derive(Debug, Clone)]
pub struct Schema {
    pub(crate) fields: Vec<FieldDescriptor>,
    names: HashSet<String>,
    pub(crate) allow_partial: bool,
    pub(crate) boolean_count: usize,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        if !self.names.contains(name) {
            return None;
        }
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn boolean_count(&self) -> usize {
        self.boolean_count
    }

    pub fn allows_partial(&self) -> bool {
        self.allow_partial
    }

    /// Bytes taken by the presence bitmap (0 when partial data is off).
    pub fn bitmap_len(&self) -> usize {
        if self.allow_partial {
            self.fields.len().div_ceil(8)
        } else {
            0
        }
    }
}

/// Handle on the field that was just declared.
pub struct FieldHandle<'a> {
    field: &'a mut FieldDescriptor,
}

impl<'a> FieldHandle<'a> {
    pub fn name(&self) -> &str {
        &self.field.name
    }

    /// Encode this field as a sequence with a 1-byte element count.
    pub fn array(self) -> Result<Self> {
        self.array_with(config::DEFAULT_ARRAY_PREFIX_WIDTH)
    }

    /// Encode this field as a sequence with a `width`-byte element count.
    pub fn array_with(self, width: u8) -> Result<Self> {
        self.field.set_array(width)?;
        Ok(self)
    }

    pub fn pre_encode<F>(self, hook: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.field.pre_encode = Some(Arc::new(hook));
        self
    }

    pub fn post_decode<F>(self, hook: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.field.post_decode = Some(Arc::new(hook));
        self
    }
}

impl fmt::Debug for FieldHandle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FieldHandle").field(&self.field).finish()
    }
}

/// Fluent builder for [`Schema`].
///
/// ```
/// use binfield::{record, Schema};
///
/// let mut b = Schema::builder();
/// b.int("coord_x").unwrap();
/// b.int("coord_y").unwrap();
/// b.boolean("is_static").unwrap();
/// b.string("identifier").unwrap();
/// let schema = b.build();
///
/// let data = record! {
///     "coord_x" => 15i32, "coord_y" => 10i32,
///     "is_static" => false, "identifier" => "tank_001",
/// };
/// let bytes = schema.serialize(&data).unwrap();
/// assert_eq!(schema.deserialize(&bytes).unwrap(), data);
/// ```
pub struct SchemaBuilder {
    fields: Vec<FieldDescriptor>,
    names: HashSet<String>,
    allow_partial: bool,
    last: Option<usize>,
    registry: Option<Arc<CodecRegistry>>,
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self {
            fields: Vec::new(),
            names: HashSet::new(),
            allow_partial: config::defaults().allow_partial,
            last: None,
            registry: None,
        }
    }

    /// Builder resolving tag-based declarations through `registry`.
    pub fn with_registry(registry: Arc<CodecRegistry>) -> Self {
        Self {
            registry: Some(registry),
            ..Self::new()
        }
    }

    /// Allow records with missing fields (adds a presence bitmap).
    ///
    /// Ends the current field: array and hook settings need a new declaration.
    pub fn allow_partial(&mut self, allow: bool) -> &mut Self {
        self.last = None;
        self.allow_partial = allow;
        self
    }

    /// Declare a field with an explicit kind.
    pub fn declare(&mut self, name: impl Into<String>, kind: FieldKind) -> Result<FieldHandle<'_>> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::InvalidField("field name is empty".into()));
        }
        if self.names.contains(&name) {
            return Err(Error::DuplicateField(name));
        }
        self.names.insert(name.clone());
        self.fields.push(FieldDescriptor::new(name, kind));
        let index = self.fields.len() - 1;
        self.last = Some(index);
        Ok(FieldHandle {
            field: &mut self.fields[index],
        })
    }

    /// Declare a field by type tag, resolved through the registry.
    pub fn field(&mut self, name: impl Into<String>, tag: &str) -> Result<FieldHandle<'_>> {
        let name = name.into();
        if name.is_empty() || tag.is_empty() {
            return Err(Error::InvalidField(format!(
                "invalid field name '{}' or type '{}'",
                name, tag
            )));
        }
        let kind = match &self.registry {
            Some(registry) => registry.resolve(tag)?,
            None => CodecRegistry::new().resolve(tag)?,
        };
        self.declare(name, kind)
    }

    /// Integer field of `width` bytes (1..=4). Wider values need `bigint`.
    pub fn number(
        &mut self,
        name: impl Into<String>,
        width: u8,
        signed: bool,
    ) -> Result<FieldHandle<'_>> {
        check_width("number", width, MAX_PREFIX_WIDTH)?;
        self.declare(name, FieldKind::Number { width, signed })
    }

    pub fn byte(&mut self, name: impl Into<String>) -> Result<FieldHandle<'_>> {
        self.number(name, 1, false)
    }

    pub fn char(&mut self, name: impl Into<String>) -> Result<FieldHandle<'_>> {
        self.number(name, 1, true)
    }

    pub fn ushort(&mut self, name: impl Into<String>) -> Result<FieldHandle<'_>> {
        self.number(name, 2, false)
    }

    pub fn short(&mut self, name: impl Into<String>) -> Result<FieldHandle<'_>> {
        self.number(name, 2, true)
    }

    /// Unsigned 3-byte integer.
    pub fn umint(&mut self, name: impl Into<String>) -> Result<FieldHandle<'_>> {
        self.number(name, 3, false)
    }

    pub fn uint(&mut self, name: impl Into<String>) -> Result<FieldHandle<'_>> {
        self.number(name, 4, false)
    }

    pub fn int(&mut self, name: impl Into<String>) -> Result<FieldHandle<'_>> {
        self.number(name, 4, true)
    }

    pub fn bigint(&mut self, name: impl Into<String>) -> Result<FieldHandle<'_>> {
        self.declare(name, FieldKind::BigInt { signed: true })
    }

    pub fn ubigint(&mut self, name: impl Into<String>) -> Result<FieldHandle<'_>> {
        self.declare(name, FieldKind::BigInt { signed: false })
    }

    /// Single precision float, rounded to 3 decimals when decoded.
    pub fn float(&mut self, name: impl Into<String>) -> Result<FieldHandle<'_>> {
        self.declare(name, FieldKind::Float { round: true })
    }

    /// Single precision float decoded without rounding.
    pub fn float_exact(&mut self, name: impl Into<String>) -> Result<FieldHandle<'_>> {
        self.declare(name, FieldKind::Float { round: false })
    }

    pub fn double(&mut self, name: impl Into<String>) -> Result<FieldHandle<'_>> {
        self.declare(name, FieldKind::Double)
    }

    /// Boolean field. All booleans of a schema share trailing bit-packed bytes.
    pub fn boolean(&mut self, name: impl Into<String>) -> Result<FieldHandle<'_>> {
        self.declare(name, FieldKind::Boolean)
    }

    /// Latin-1 string with a 1-byte length prefix.
    pub fn string(&mut self, name: impl Into<String>) -> Result<FieldHandle<'_>> {
        self.string_with(name, config::DEFAULT_STRING_PREFIX_WIDTH, false)
    }

    /// String with a `len_bytes`-byte length prefix, UTF-8 encoded if `unicode`.
    pub fn string_with(
        &mut self,
        name: impl Into<String>,
        len_bytes: u8,
        unicode: bool,
    ) -> Result<FieldHandle<'_>> {
        check_width("string length prefix", len_bytes, MAX_PREFIX_WIDTH)?;
        self.declare(name, FieldKind::String { len_bytes, unicode })
    }

    pub fn time(&mut self, name: impl Into<String>) -> Result<FieldHandle<'_>> {
        self.declare(name, FieldKind::Time)
    }

    /// One-byte enum over an ordered option list (at most 255 options).
    pub fn enumeration<I, S>(
        &mut self,
        name: impl Into<String>,
        options: I,
    ) -> Result<FieldHandle<'_>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let options = EnumOptions::new(options)?;
        self.declare(name, FieldKind::Enum(options))
    }

    /// Nested schema encoded inline.
    pub fn child(
        &mut self,
        name: impl Into<String>,
        schema: impl Into<Arc<Schema>>,
    ) -> Result<FieldHandle<'_>> {
        self.declare(name, FieldKind::Child(schema.into()))
    }

    fn last_field(&mut self) -> Result<&mut FieldDescriptor> {
        let index = self.last.ok_or(Error::NoFieldDeclared)?;
        Ok(&mut self.fields[index])
    }

    /// Turn the most recently declared field into an array with a 1-byte count.
    pub fn array(&mut self) -> Result<&mut Self> {
        self.array_with(config::DEFAULT_ARRAY_PREFIX_WIDTH)
    }

    /// Turn the most recently declared field into an array with a
    /// `width`-byte count.
    pub fn array_with(&mut self, width: u8) -> Result<&mut Self> {
        self.last_field()?.set_array(width)?;
        Ok(self)
    }

    /// Attach a pre-encode hook to the most recently declared field.
    pub fn pre_encode<F>(&mut self, hook: F) -> Result<&mut Self>
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.last_field()?.pre_encode = Some(Arc::new(hook));
        Ok(self)
    }

    /// Attach a post-decode hook to the most recently declared field.
    pub fn post_decode<F>(&mut self, hook: F) -> Result<&mut Self>
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.last_field()?.post_decode = Some(Arc::new(hook));
        Ok(self)
    }

    pub fn build(self) -> Schema {
        let boolean_count = self.fields.iter().filter(|f| f.kind.is_boolean()).count();
        log::debug!(
            "[SchemaBuilder::build] {} fields ({} booleans), partial={}",
            self.fields.len(),
            boolean_count,
            self.allow_partial
        );
        Schema {
            fields: self.fields,
            names: self.names,
            allow_partial: self.allow_partial,
            boolean_count,
        }
    }
}
