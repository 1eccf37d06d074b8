// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec constants and process-wide defaults.
//!
//! - **Static**: wire constants (prefix widths, enum limits, buffer growth).
//! - **Dynamic**: [`CodecDefaults`], swapped atomically so builders on any
//!   thread read a consistent snapshot without locking.
//!
//! # Example
//!
//! ```
//! use binfield::config;
//!
//! config::set_default_allow_partial(true);
//! assert!(config::defaults().allow_partial);
//! config::reset_defaults();
//! ```

use arc_swap::ArcSwap;
use std::sync::{Arc, OnceLock};

/// Capacity of a fresh output buffer.
pub const INITIAL_BUFFER_CAPACITY: usize = 32;

/// Extra room added on top of the requested size when growing past double.
pub const BUFFER_GROWTH_MARGIN: usize = 32;

/// Enum indices are stored in a single byte.
pub const MAX_ENUM_OPTIONS: usize = 255;

/// Widest length prefix for strings and arrays (and widest `number` field).
pub const MAX_PREFIX_WIDTH: u8 = 4;

/// Widest integer handled by the raw buffer and cursor accessors.
pub const MAX_RAW_WIDTH: u8 = 8;

pub const DEFAULT_ARRAY_PREFIX_WIDTH: u8 = 1;

pub const DEFAULT_STRING_PREFIX_WIDTH: u8 = 1;

/// Decimal digits kept when decoding a rounded `float` field.
pub const FLOAT_DECODE_DECIMALS: u32 = 3;

/// Defaults picked up by every new [`SchemaBuilder`](crate::SchemaBuilder)
/// and root serialize call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecDefaults {
    /// Whether new schemas accept records with missing fields.
    pub allow_partial: bool,
    /// Starting capacity of the output buffer of a root serialize call.
    pub initial_capacity: usize,
}

impl Default for CodecDefaults {
    fn default() -> Self {
        Self {
            allow_partial: false,
            initial_capacity: INITIAL_BUFFER_CAPACITY,
        }
    }
}

fn store() -> &'static ArcSwap<CodecDefaults> {
    static DEFAULTS: OnceLock<ArcSwap<CodecDefaults>> = OnceLock::new();
    DEFAULTS.get_or_init(|| ArcSwap::from_pointee(CodecDefaults::default()))
}

/// Current defaults snapshot.
pub fn defaults() -> Arc<CodecDefaults> {
    store().load_full()
}

/// Replace the process-wide defaults.
pub fn set_defaults(defaults: CodecDefaults) {
    log::debug!("[config::set_defaults] {:?}", defaults);
    store().store(Arc::new(defaults));
}

/// Change only the partial-data default.
pub fn set_default_allow_partial(allow: bool) {
    store().rcu(|current| {
        let mut next = **current;
        next.allow_partial = allow;
        next
    });
}

pub fn reset_defaults() {
    set_defaults(CodecDefaults::default());
}
