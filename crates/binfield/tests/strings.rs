// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! String fields: prefix widths, Latin-1 and UTF-8 modes.

use binfield::{record, Error, Schema, Value};

fn string_schema(len_bytes: u8, unicode: bool) -> Schema {
    let mut b = Schema::builder();
    b.allow_partial(true);
    b.string_with("test", len_bytes, unicode).unwrap();
    b.build()
}

fn roundtrip(schema: &Schema, text: &str) -> usize {
    let data = schema.serialize(&record! { "test" => text }).expect("serialize");
    let result = schema.deserialize(&data).expect("deserialize");
    assert_eq!(result, record! { "test" => text });
    data.len()
}

#[test]
fn test_unicode_characters() {
    let text = "שלום עולם!";
    let schema = string_schema(1, true);
    assert_eq!(roundtrip(&schema, text), 1 + 1 + text.len());
}

#[test]
fn test_default_string() {
    let mut b = Schema::builder();
    b.allow_partial(true);
    b.string("test").unwrap();
    let schema = b.build();

    assert_eq!(roundtrip(&schema, "hello world!"), 1 + "hello world!".len() + 1);
    let long = "a".repeat(255);
    assert_eq!(roundtrip(&schema, &long), 1 + 255 + 1);
}

#[test]
fn test_tiny_string() {
    for unicode in [false, true] {
        let schema = string_schema(1, unicode);
        assert_eq!(roundtrip(&schema, "hello world!"), 1 + 12 + 1);
        assert_eq!(roundtrip(&schema, &"a".repeat(255)), 1 + 255 + 1);
    }
}

#[test]
fn test_short_string() {
    for unicode in [false, true] {
        let schema = string_schema(2, unicode);
        assert_eq!(roundtrip(&schema, "hello world!"), 1 + 12 + 2);
        assert_eq!(roundtrip(&schema, &"a".repeat(0xffff)), 1 + 0xffff + 2);
    }
}

#[test]
fn test_medium_and_big_string() {
    for width in [3u8, 4] {
        for unicode in [false, true] {
            let schema = string_schema(width, unicode);
            assert_eq!(
                roundtrip(&schema, "hello world!"),
                1 + 12 + usize::from(width)
            );
            let long = "a".repeat(0x1_0001);
            assert_eq!(roundtrip(&schema, &long), 1 + long.len() + usize::from(width));
        }
    }
}

#[test]
fn test_length_prefix_is_little_endian() {
    let mut b = Schema::builder();
    b.allow_partial(false);
    b.string_with("test", 2, false).unwrap();
    let schema = b.build();
    let text = "x".repeat(0x0102);
    let data = schema.serialize(&record! { "test" => text.as_str() }).unwrap();
    assert_eq!(&data.as_bytes()[..2], &[0x02, 0x01]);
}

#[test]
fn test_latin1_mode_counts_chars() {
    let schema = string_schema(1, false);
    // one byte per char, even for chars that take two in UTF-8
    assert_eq!(roundtrip(&schema, "café"), 1 + 1 + 4);
}

#[test]
fn test_length_overflow_is_rejected() {
    let schema = string_schema(1, false);
    let err = schema
        .serialize(&record! { "test" => "a".repeat(256) })
        .unwrap_err();
    assert_eq!(
        err,
        Error::LengthOverflow {
            field: "test".into(),
            len: 256,
            width: 1
        }
    );
}

#[test]
fn test_invalid_utf8_on_decode() {
    let mut b = Schema::builder();
    b.allow_partial(false);
    b.string_with("test", 1, true).unwrap();
    let schema = b.build();
    let err = schema.deserialize(&[2u8, 0xC3, 0x28][..]).unwrap_err();
    assert_eq!(
        err,
        Error::InvalidUtf8 {
            field: "test".into()
        }
    );
}

#[test]
fn test_string_rejects_other_values() {
    let schema = string_schema(1, false);
    let err = schema.serialize(&record! { "test" => 5u8 }).unwrap_err();
    assert!(matches!(err, Error::WrongValueType { expected: "string", .. }));
}

#[test]
fn test_empty_string() {
    let schema = string_schema(2, true);
    let data = schema.serialize(&record! { "test" => "" }).unwrap();
    assert_eq!(data.as_bytes(), &[0x01, 0x00, 0x00]);
    assert_eq!(
        schema.deserialize(&data).unwrap()["test"],
        Value::Str(String::new())
    );
}
