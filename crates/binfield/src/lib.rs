// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # binfield - schema-driven compact binary codec
//!
//! Declare an ordered set of typed fields once, then turn records
//! (field name -> [`Value`]) into compact bytes and back, with no per-call
//! negotiation.
//!
//! ## Features
//!
//! - **Fixed-width numbers**: 1 to 4 byte integers, 64-bit integers, float, double
//! - **Bit-packed booleans**: all booleans of a schema share trailing bytes
//! - **Partial data**: optional presence bitmap for sparse records
//! - **Arrays**: any non-boolean field, with a 1 to 4 byte count prefix
//! - **Nested schemas**: child records encoded inline
//! - **Custom types**: [`FieldCodec`] implementations, optionally by tag via [`CodecRegistry`]
//!
//! ## Wire layout
//!
//! ```text
//! [presence bitmap, ceil(n/8) bytes, partial schemas only]
//! [non-boolean fields in declaration order]
//! [booleans in declaration order, ceil(b/8) bytes]
//! ```
//!
//! Multi-byte numbers are big-endian; string and array length prefixes are
//! written least significant byte first.
//!
//! ## Example
//!
//! ```rust
//! use binfield::{record, Schema, Value};
//!
//! let mut child = Schema::builder();
//! child.int("child_int").unwrap();
//! child.boolean("child_bool").unwrap();
//!
//! let mut b = Schema::builder();
//! b.string("name").unwrap();
//! b.short("hp").unwrap();
//! b.string("tags").unwrap().array().unwrap();
//! b.child("child", child.build()).unwrap();
//! let schema = b.build();
//!
//! let data = record! {
//!     "name" => "tank_001",
//!     "hp" => 250i16,
//!     "tags" => vec!["armored", "slow"],
//!     "child" => record! { "child_int" => 9i32, "child_bool" => true },
//! };
//!
//! let bytes = schema.serialize(&data).unwrap();
//! let decoded = schema.deserialize(&bytes).unwrap();
//! assert_eq!(decoded, data);
//! assert_eq!(decoded["hp"], Value::Int(250));
//! ```

pub mod buffer;
pub mod codec;
pub mod config;
pub mod cursor;
pub mod de;
pub mod error;
pub mod schema;
pub mod ser;
pub mod value;

pub use buffer::{BinaryData, OutputBuffer};
pub use codec::{CodecRegistry, EnumOptions, FieldCodec, FieldKind};
pub use cursor::ByteCursor;
pub use de::DeserializeContext;
pub use error::{Error, Result};
pub use schema::{FieldDescriptor, FieldHandle, Hook, Schema, SchemaBuilder};
pub use ser::SerializeContext;
pub use value::{Record, Value};
