// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Process-wide defaults.
//!
//! Kept in a single test: the defaults are global and tests in one binary
//! run in parallel.

use binfield::config::{self, CodecDefaults, INITIAL_BUFFER_CAPACITY};
use binfield::{record, Schema};

#[test]
fn test_process_defaults() {
    assert_eq!(*config::defaults(), CodecDefaults::default());
    assert!(!Schema::builder().build().allows_partial());

    config::set_default_allow_partial(true);
    let mut b = Schema::builder();
    b.byte("a").unwrap();
    b.byte("b").unwrap();
    let partial = b.build();
    assert!(partial.allows_partial());
    assert_eq!(partial.serialize(&record! { "b" => 4u8 }).unwrap().as_bytes(), &[0b10, 4]);

    // an explicit choice still wins
    let mut b = Schema::builder();
    b.allow_partial(false);
    assert!(!b.build().allows_partial());

    config::set_defaults(CodecDefaults {
        allow_partial: false,
        initial_capacity: 256,
    });
    // schemas keep the partial setting they were built with
    assert!(partial.allows_partial());
    let data = partial.serialize(&record! { "a" => 1u8 }).unwrap();
    assert_eq!(data.capacity(), 256);

    config::set_defaults(CodecDefaults {
        allow_partial: false,
        initial_capacity: 1,
    });
    let data = partial
        .serialize(&record! { "a" => 1u8, "b" => 2u8 })
        .unwrap();
    assert_eq!(data.as_bytes(), &[0b11, 1, 2]);
    assert!(data.capacity() >= 3);

    config::reset_defaults();
    assert_eq!(config::defaults().initial_capacity, INITIAL_BUFFER_CAPACITY);
    assert!(!config::defaults().allow_partial);
}
