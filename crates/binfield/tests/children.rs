// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::cast_possible_truncation)] // Random test data

//! Nested schemas and mixed random records.

use binfield::{record, Error, Schema, Value};
use std::sync::Arc;

fn str_num_child() -> Schema {
    let mut b = Schema::builder();
    b.allow_partial(true);
    b.string("str").unwrap();
    b.byte("num").unwrap();
    b.build()
}

#[test]
fn test_single_child() {
    let mut b = Schema::builder();
    b.allow_partial(true);
    b.child("child", str_num_child()).unwrap();
    b.boolean("test").unwrap();
    let schema = b.build();

    let data = record! {
        "test" => true,
        "child" => record! { "str" => "hello", "num" => 123u8 },
    };
    let bytes = schema.serialize(&data).unwrap();
    // bitmap + child(bitmap + "hello" + num) + booleans
    assert_eq!(bytes.len(), 1 + (1 + 6 + 1) + 1);
    assert_eq!(bytes.len(), 10);
    assert_eq!(schema.deserialize(&bytes).unwrap(), data);
}

#[test]
fn test_multiple_children() {
    let mut second = Schema::builder();
    second.allow_partial(true);
    second.boolean("bl").unwrap();
    second.float("fl").unwrap();

    let mut b = Schema::builder();
    b.allow_partial(true);
    b.child("child", str_num_child()).unwrap();
    b.child("child2", second.build()).unwrap();
    b.boolean("test").unwrap();
    let schema = b.build();

    let data = record! {
        "test" => true,
        "child" => record! { "str" => "hello", "num" => 123u8 },
        "child2" => record! { "bl" => false, "fl" => 123.456f64 },
    };
    let bytes = schema.serialize(&data).unwrap();
    assert_eq!(bytes.len(), 16);
    assert_eq!(schema.deserialize(&bytes).unwrap(), data);
}

#[test]
fn test_deep_children() {
    let leaf = Arc::new(str_num_child());

    let mut mid = Schema::builder();
    mid.allow_partial(true);
    mid.boolean("bl").unwrap();
    mid.float("fl").unwrap();
    mid.child("child", Arc::clone(&leaf)).unwrap();

    let mut upper = Schema::builder();
    upper.allow_partial(true);
    upper.child("child", mid.build()).unwrap();

    let mut b = Schema::builder();
    b.allow_partial(true);
    b.child("child3", upper.build()).unwrap();
    b.string("foo").unwrap();
    let schema = b.build();

    let data = record! {
        "foo" => "hello",
        "child3" => record! {
            "child" => record! {
                "bl" => false,
                "fl" => 123.456f64,
                "child" => record! { "str" => "hello", "num" => 123u8 },
            },
        },
    };
    let bytes = schema.serialize(&data).unwrap();
    assert_eq!(bytes.len(), 22);
    assert_eq!(schema.deserialize(&bytes).unwrap(), data);
}

/// Parent: string, 2 booleans, string, short, child{int, boolean, float}.
fn composite_schema(partial: bool) -> Schema {
    let mut child = Schema::builder();
    child.allow_partial(partial);
    child.int("child_int").unwrap();
    child.boolean("child_bool").unwrap();
    child.float("float").unwrap();

    let mut b = Schema::builder();
    b.allow_partial(partial);
    b.string("foo").unwrap();
    b.boolean("bool1").unwrap();
    b.boolean("bool2").unwrap();
    b.string("strfield").unwrap();
    b.short("short").unwrap();
    b.child("child", child.build()).unwrap();
    b.build()
}

fn composite_record(bool1: bool, short: i16, child_int: i32, child_bool: bool) -> binfield::Record {
    record! {
        "foo" => "bar",
        "bool1" => bool1,
        "bool2" => !bool1,
        "strfield" => "hello world!",
        "short" => short,
        "child" => record! {
            "child_int" => child_int,
            "child_bool" => child_bool,
            "float" => 123.456f64,
        },
    }
}

#[test]
fn test_composite_length_matches_layout() {
    for partial in [false, true] {
        let schema = composite_schema(partial);
        let bytes = schema
            .serialize(&composite_record(true, 300, 70000, false))
            .unwrap();

        let bitmap = |fields: usize| if partial { fields.div_ceil(8) } else { 0 };
        let child_len = bitmap(3) + 4 + 4 + 1; // int, float, one packed boolean byte
        let parent_len = bitmap(6)
            + (1 + "bar".len())
            + (1 + "hello world!".len())
            + 2
            + child_len
            + 1; // bool1, bool2 packed
        assert_eq!(bytes.len(), parent_len, "partial={}", partial);
    }
}

#[test]
fn test_random_composite_records() {
    for partial in [false, true] {
        let schema = composite_schema(partial);
        for _ in 0..1000 {
            let data = composite_record(
                fastrand::bool(),
                fastrand::i16(0..=i16::MAX),
                fastrand::i32(0..=i32::MAX),
                fastrand::bool(),
            );
            let bytes = schema.serialize(&data).unwrap();
            assert_eq!(schema.deserialize(&bytes).unwrap(), data);
        }
    }
}

#[test]
fn test_random_records_with_string_array() {
    let mut child = Schema::builder();
    child.allow_partial(true);
    child.int("child_int").unwrap();
    child.boolean("child_bool").unwrap();

    let mut b = Schema::builder();
    b.allow_partial(true);
    b.string("string_field").unwrap();
    b.boolean("some_bool").unwrap();
    b.string("strarray").unwrap().array().unwrap();
    b.child("child", child.build()).unwrap();
    let schema = b.build();

    for _ in 0..1000 {
        let data = record! {
            "string_field" => "hello world!",
            "some_bool" => fastrand::bool(),
            "strarray" => vec![
                format!("aaa{}", fastrand::u32(0..1000)),
                format!("bbb{}", fastrand::u32(0..1000)),
            ],
            "child" => record! {
                "child_int" => fastrand::i32(0..10000),
                "child_bool" => fastrand::bool(),
            },
        };
        let bytes = schema.serialize(&data).unwrap();
        assert_eq!(schema.deserialize(&bytes).unwrap(), data);
    }
}

#[test]
fn test_child_needs_a_map() {
    let mut b = Schema::builder();
    b.allow_partial(false);
    b.child("child", str_num_child()).unwrap();
    let schema = b.build();
    let err = schema.serialize(&record! { "child" => 5u8 }).unwrap_err();
    assert_eq!(
        err,
        Error::WrongValueType {
            field: "child".into(),
            expected: "map",
            found: "unsigned integer"
        }
    );
}

#[test]
fn test_child_array_errors_name_the_parent_field() {
    let mut point = Schema::builder();
    point.allow_partial(false);
    point.short("x").unwrap();
    point.short("y").unwrap();

    let mut b = Schema::builder();
    b.allow_partial(false);
    b.child("points", point.build()).unwrap().array().unwrap();
    let schema = b.build();

    // the first element encodes every child field before the second one fails
    let data = record! {
        "points" => Value::Array(vec![
            Value::Map(record! { "x" => 1i16, "y" => 2i16 }),
            Value::UInt(5),
        ]),
    };
    let err = schema.serialize(&data).unwrap_err();
    assert_eq!(
        err,
        Error::WrongValueType {
            field: "points".into(),
            expected: "map",
            found: "unsigned integer"
        }
    );
}

#[test]
fn test_child_errors_propagate() {
    let mut inner = Schema::builder();
    inner.allow_partial(false);
    inner.byte("required").unwrap();

    let mut b = Schema::builder();
    b.allow_partial(false);
    b.child("child", inner.build()).unwrap();
    let schema = b.build();

    let err = schema
        .serialize(&record! { "child" => binfield::Record::new() })
        .unwrap_err();
    assert_eq!(err, Error::MissingField("required".into()));
}

#[test]
fn test_array_of_children() {
    let mut point = Schema::builder();
    point.allow_partial(false);
    point.short("x").unwrap();
    point.short("y").unwrap();

    let mut b = Schema::builder();
    b.allow_partial(false);
    b.child("points", point.build()).unwrap().array_with(2).unwrap();
    let schema = b.build();

    let points: Vec<Value> = (0..3i16)
        .map(|i| Value::Map(record! { "x" => i, "y" => -i }))
        .collect();
    let data = record! { "points" => Value::Array(points) };
    let bytes = schema.serialize(&data).unwrap();
    assert_eq!(bytes.len(), 2 + 3 * 4);
    assert_eq!(schema.deserialize(&bytes).unwrap(), data);
}
