// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error taxonomy for schema construction, serialization and deserialization.

use thiserror::Error;

/// Errors raised by the codec.
///
/// None of these are recovered internally: schema errors surface while the
/// schema is being declared, value errors abort the serialize call that hit
/// them and no partial output is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("field '{0}' is already defined")]
    DuplicateField(String),

    #[error("invalid field: {0}")]
    InvalidField(String),

    #[error("no field declared yet")]
    NoFieldDeclared,

    #[error("enum declares {count} options, at most 255 are allowed")]
    TooManyOptions { count: usize },

    #[error("{what} width must be between 1 and {max} bytes, got {width}")]
    InvalidWidth {
        what: &'static str,
        width: u8,
        max: u8,
    },

    #[error(
        "field '{0}' is not present in source data, and partial data is not allowed for this schema"
    )]
    MissingField(String),

    #[error("no codec registered for type '{0}'")]
    UnknownCodec(String),

    #[error("field '{field}': value '{value}' is not one of the enum options")]
    UnknownEnumValue { field: String, value: String },

    #[error("field '{field}': enum index {index} has no option")]
    UnknownEnumIndex { field: String, index: u8 },

    #[error("field '{field}': expected {expected}, found {found}")]
    WrongValueType {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("field '{field}': length {len} does not fit in a {width}-byte prefix")]
    LengthOverflow { field: String, len: usize, width: u8 },

    #[error("unexpected end of input at offset {offset}: need {need} bytes, have {have}")]
    UnexpectedEnd {
        offset: usize,
        need: usize,
        have: usize,
    },

    #[error("field '{field}': string bytes are not valid UTF-8")]
    InvalidUtf8 { field: String },

    #[error("{0}")]
    Custom(String),
}

pub type Result<T> = core::result::Result<T, Error>;

/// Reject byte widths outside `1..=max`.
pub(crate) fn check_width(what: &'static str, width: u8, max: u8) -> Result<()> {
    if width == 0 || width > max {
        return Err(Error::InvalidWidth { what, width, max });
    }
    Ok(())
}
