// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Benchmark scenarios: one schema and one sample record each.

use binfield::{record, Record, Schema, SchemaBuilder, Value};
use std::time::UNIX_EPOCH;

pub struct Scenario {
    pub name: &'static str,
    pub schema: Schema,
    pub data: Record,
}

fn flat(
    build: impl FnOnce(&mut SchemaBuilder) -> binfield::Result<()>,
) -> binfield::Result<Schema> {
    let mut b = Schema::builder();
    b.allow_partial(false);
    build(&mut b)?;
    Ok(b.build())
}

fn complex() -> binfield::Result<Schema> {
    let mut child = Schema::builder();
    child.allow_partial(false);
    child.int("child_int")?;
    child.boolean("child_bool")?;
    child.float("float")?;

    let mut b = Schema::builder();
    b.allow_partial(false);
    b.string("foo")?;
    b.boolean("bool1")?;
    b.boolean("bool2")?;
    b.string("strfield")?;
    b.short("short")?;
    b.child("child", child.build())?;
    Ok(b.build())
}

pub fn all() -> binfield::Result<Vec<Scenario>> {
    Ok(vec![
        Scenario {
            name: "simple string",
            schema: flat(|b| b.string("foo").map(drop))?,
            data: record! { "foo" => "Hello World!" },
        },
        Scenario {
            name: "unicode strings",
            schema: flat(|b| b.string_with("foo", 1, true).map(drop))?,
            data: record! { "foo" => "שלום אחשלי!" },
        },
        Scenario {
            name: "booleans",
            schema: flat(|b| {
                for name in ["foo", "bar", "foobar", "bla", "goo"] {
                    b.boolean(name)?;
                }
                Ok(())
            })?,
            data: record! {
                "foo" => true, "bar" => false, "foobar" => true, "bla" => true, "goo" => false,
            },
        },
        Scenario {
            name: "byte, ushort, and uint",
            schema: flat(|b| {
                b.byte("byte")?;
                b.ushort("ushort")?;
                b.uint("uint")?;
                Ok(())
            })?,
            data: record! { "byte" => 255u8, "ushort" => 65000u16, "uint" => 4_290_967_295u32 },
        },
        Scenario {
            name: "char, short, and int",
            schema: flat(|b| {
                b.char("char")?;
                b.short("short")?;
                b.int("int")?;
                Ok(())
            })?,
            data: record! { "char" => 125i8, "short" => 32000i16, "int" => 2_107_483_647i32 },
        },
        Scenario {
            name: "arrays of numbers",
            schema: flat(|b| {
                b.char("char")?.array()?;
                b.short("short")?.array()?;
                b.int("int")?.array()?;
                Ok(())
            })?,
            data: record! {
                "char" => vec![125i8, 111, 75, 127],
                "short" => vec![32000i16, 0, 111, 1000],
                "int" => vec![0i32, 100, 1000, 10000, 2_107_483_647],
            },
        },
        Scenario {
            name: "floats",
            schema: flat(|b| b.float("float").map(drop))?,
            data: record! { "float" => 12345.789f64 },
        },
        Scenario {
            name: "doubles",
            schema: flat(|b| b.double("double").map(drop))?,
            data: record! { "double" => 1_234_531.784_214_121_9f64 },
        },
        Scenario {
            name: "complex dict with a child",
            schema: complex()?,
            data: record! {
                "foo" => "bar",
                "bool1" => true,
                "bool2" => false,
                "strfield" => "hello world!",
                "short" => 300i16,
                "child" => record! {
                    "child_int" => 70_000i32,
                    "child_bool" => true,
                    "float" => 123.456f64,
                },
            },
        },
    ])
}

/// JSON rendering of a record, the baseline every scenario is measured against.
pub fn to_json(value: &Value) -> serde_json::Value {
    use serde_json::Value as Json;
    match value {
        Value::Null => Json::Null,
        Value::Bool(v) => Json::Bool(*v),
        Value::Int(v) => Json::from(*v),
        Value::UInt(v) => Json::from(*v),
        Value::Float(v) => serde_json::Number::from_f64(*v).map_or(Json::Null, Json::Number),
        Value::Str(s) => Json::String(s.clone()),
        Value::Time(t) => {
            let millis = t.duration_since(UNIX_EPOCH).map_or(0, |d| d.as_millis());
            Json::from(u64::try_from(millis).unwrap_or(u64::MAX))
        }
        Value::Array(items) => Json::Array(items.iter().map(to_json).collect()),
        Value::Map(record) => record_to_json(record),
    }
}

pub fn record_to_json(record: &Record) -> serde_json::Value {
    serde_json::Value::Object(
        record
            .iter()
            .map(|(name, value)| (name.clone(), to_json(value)))
            .collect(),
    )
}
