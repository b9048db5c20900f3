// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use crate::error::ErrorKind;
use crate::{Discriminant, Endian, Schema, TransformError, Value};

fn person_schema() -> Schema {
    Schema::new(["name: string", "age: ubyte", "scores: short[2]"]).expect("schema")
}

#[test]
fn person_encodes_byte_exact() {
    let schema = person_schema();
    let person = Value::record([
        ("name", Value::from("Al")),
        ("age", Value::from(9u8)),
        ("scores", Value::list([10i16, 20, 30])),
    ]);

    let bytes = schema.encode(&person).expect("encode");
    assert_eq!(
        bytes,
        vec![0x00, 0x02, b'A', b'l', 0x09, 0x00, 0x03, 0x00, 0x0A, 0x00, 0x14, 0x00, 0x1E]
    );
    assert_eq!(schema.decode(&bytes).expect("decode"), person);
}

#[test]
fn inverted_outer_prefix_leaves_inner_big_endian() {
    let schema = Schema::new(["m: short[!2][2]"]).expect("schema");
    let value = Value::record([(
        "m",
        Value::List(vec![Value::list([1i16, 2]), Value::list([3i16])]),
    )]);

    let bytes = schema.encode(&value).expect("encode");
    assert_eq!(
        bytes,
        vec![
            0x02, 0x00, // outer length, little-endian
            0x00, 0x02, 0x00, 0x01, 0x00, 0x02, // inner [1, 2]
            0x00, 0x01, 0x00, 0x03, // inner [3]
        ]
    );
    assert_eq!(schema.decode(&bytes).expect("decode"), value);
}

#[test]
fn inversion_under_little_endian_default() {
    let mut schema = Schema::new(["xs: ushort[!2]"]).expect("schema");
    schema.set_endian(Endian::Little);
    let value = Value::record([("xs", Value::list([0x0102u16]))]);
    let bytes = schema.encode(&value).expect("encode");
    assert_eq!(bytes, vec![0x00, 0x01, 0x02, 0x01]);
    assert_eq!(schema.decode(&bytes).expect("decode"), value);
}

#[test]
fn variant_dispatch_rejects_unknown_discriminant() {
    let mut schema = Schema::new(["v: choice"]).expect("schema");
    schema
        .define_variant_branch("choice", "b", ["n: ubyte"])
        .expect("branch");

    let value = Value::record([(
        "v",
        Value::record([
            ("discriminant", Value::from("a")),
            ("payload", Value::Record(Default::default())),
        ]),
    )]);
    let err = schema.encode(&value).expect_err("branch a is undefined");
    assert_eq!(err.kind(), ErrorKind::UnknownVariant);
    assert_eq!(err.path(), Some(".v"));

    let err = schema
        .decode(&[0x00, 0x01, b'a', 0x05])
        .expect_err("branch a is undefined");
    assert_eq!(err.kind(), ErrorKind::UnknownVariant);
}

#[test]
fn variant_round_trip_with_integer_index() {
    let mut schema = Schema::new(["shapes: shape[1]"]).expect("schema");
    schema
        .define_variant_index_type("shape", "ubyte")
        .expect("index")
        .define_variant_branch("shape", 1u8, ["radius: float"])
        .expect("circle")
        .define_variant_branch("shape", 2u8, ["w: ushort", "h: ushort"])
        .expect("rect");

    let value = Value::record([(
        "shapes",
        Value::List(vec![
            Value::variant(1u8, Value::record([("radius", Value::Float(1.5))])),
            Value::variant(
                2u8,
                Value::record([("w", Value::from(3u16)), ("h", Value::from(4u16))]),
            ),
        ]),
    )]);

    let bytes = schema.encode(&value).expect("encode");
    assert_eq!(
        bytes,
        vec![0x02, 0x01, 0x3F, 0xC0, 0x00, 0x00, 0x02, 0x00, 0x03, 0x00, 0x04]
    );
    assert_eq!(schema.decode(&bytes).expect("decode"), value);
}

#[test]
fn decimal_string_branch_serves_integer_discriminant() {
    let mut schema = Schema::new(["shape: shape"]).expect("schema");
    schema
        .define_variant_index_type("shape", "ubyte")
        .expect("index")
        .define_variant_branch("shape", "1", ["r: ubyte"])
        .expect("branch");

    let value = Value::record([(
        "shape",
        Value::variant(1u8, Value::record([("r", Value::from(5u8))])),
    )]);
    let bytes = schema.encode(&value).expect("encode");
    assert_eq!(bytes, vec![0x01, 0x05]);
    assert_eq!(schema.decode(&bytes).expect("decode"), value);

    let by_string = Value::record([(
        "shape",
        Value::variant("1", Value::record([("r", Value::from(5u8))])),
    )]);
    assert_eq!(schema.encode(&by_string).expect("encode"), bytes);
}

#[test]
fn underrun_on_short_input() {
    let schema = Schema::new(["n: int"]).expect("schema");
    let err = schema.decode(&[0x01]).expect_err("1 byte for an int");
    assert_eq!(err.kind(), ErrorKind::BufferUnderrun);
}

fn pack_point(value: &Value) -> Result<Value, TransformError> {
    let coord = |key: &str| {
        value
            .get(key)
            .and_then(Value::as_int)
            .and_then(|v| u16::try_from(v).ok())
            .ok_or_else(|| TransformError::new("point {x, y} of ushort", value.kind_name()))
    };
    let packed = (u32::from(coord("x")?) << 16) | u32::from(coord("y")?);
    Ok(Value::record([("packed", Value::from(packed))]))
}

fn unpack_point(value: Value) -> Result<Value, TransformError> {
    let packed = value
        .get("packed")
        .and_then(Value::as_int)
        .ok_or_else(|| TransformError::new("packed point", value.kind_name()))?;
    Ok(Value::record([
        ("x", Value::Int(packed >> 16)),
        ("y", Value::Int(packed & 0xFFFF)),
    ]))
}

fn point_schema() -> Schema {
    let mut schema = Schema::new(["origin: point", "path: point[1]"]).expect("schema");
    schema
        .define_composite("point", ["packed: uint"])
        .expect("point");
    schema.define_transform("point", pack_point, unpack_point);
    schema
}

#[test]
fn transform_pair_is_symmetric() {
    let samples = [(0u16, 0u16), (1, 2), (0xFFFF, 0), (0x1234, 0xABCD)];
    for (x, y) in samples {
        let p = Value::record([("x", Value::from(x)), ("y", Value::from(y))]);
        let round = unpack_point(pack_point(&p).expect("pre")).expect("post");
        assert_eq!(round, p);
    }
}

#[test]
fn transform_runs_on_both_sides() {
    let schema = point_schema();
    let p = |x: u16, y: u16| Value::record([("x", Value::from(x)), ("y", Value::from(y))]);
    let value = Value::record([
        ("origin", p(1, 2)),
        ("path", Value::List(vec![p(3, 4), p(5, 6)])),
    ]);

    let bytes = schema.encode(&value).expect("encode");
    assert_eq!(&bytes[..4], &[0x00, 0x01, 0x00, 0x02]);
    assert_eq!(bytes.len(), 4 + 1 + 2 * 4);

    let decoded = schema.decode(&bytes).expect("decode");
    assert_eq!(decoded, value);
    assert!(decoded
        .get("origin")
        .and_then(|origin| origin.get("packed"))
        .is_none());
}

#[test]
fn transform_failure_is_a_type_mismatch() {
    let schema = point_schema();
    let value = Value::record([
        ("origin", Value::from("not a point")),
        ("path", Value::List(Vec::new())),
    ]);
    let err = schema.encode(&value).expect_err("pre rejects strings");
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    assert_eq!(err.path(), Some(".origin"));
}

fn bool_to_bit(value: &Value) -> Result<Value, TransformError> {
    match value {
        Value::Bool(b) => Ok(Value::from(u8::from(*b))),
        other => Err(TransformError::new("boolean", other.kind_name())),
    }
}

fn bit_to_bool(value: Value) -> Result<Value, TransformError> {
    match value.as_int() {
        Some(0) => Ok(Value::Bool(false)),
        Some(1) => Ok(Value::Bool(true)),
        _ => Err(TransformError::new("0 or 1", value.kind_name())),
    }
}

#[test]
fn transform_on_primitive_type() {
    let mut schema = Schema::new(["flag: ubyte", "flags: ubyte[1]"]).expect("schema");
    schema.define_transform("ubyte", bool_to_bit, bit_to_bool);

    let value = Value::record([
        ("flag", Value::Bool(true)),
        ("flags", Value::list([false, true])),
    ]);
    let bytes = schema.encode(&value).expect("encode");
    assert_eq!(bytes, vec![1, 2, 0, 1]);
    assert_eq!(schema.decode(&bytes).expect("decode"), value);

    let err = schema
        .encode(&Value::record([
            ("flag", Value::from(1u8)),
            ("flags", Value::List(Vec::new())),
        ]))
        .expect_err("pre expects a boolean");
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    assert_eq!(err.path(), Some(".flag"));
}

#[test]
fn post_transform_failure_reports_element_path() {
    let mut schema = Schema::new(["flag: ubyte", "flags: ubyte[1]"]).expect("schema");
    schema.define_transform("ubyte", bool_to_bit, bit_to_bool);

    let err = schema
        .decode(&[1, 2, 0, 5])
        .expect_err("5 is not a bit");
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    assert_eq!(err.path(), Some(".flags[1]"));
    assert!(err.to_string().contains("0 or 1"), "{}", err);
}

#[test]
fn transform_on_variant_type() {
    let mut schema = Schema::new(["s: shape"]).expect("schema");
    schema
        .define_variant_index_type("shape", "ubyte")
        .expect("index")
        .define_variant_branch("shape", 1u8, ["radius: ushort"])
        .expect("circle")
        .define_variant_branch("shape", 2u8, ["side: ushort"])
        .expect("square");
    schema.define_transform(
        "shape",
        |value: &Value| {
            let size = value.get("size").cloned().unwrap_or(Value::Null);
            match value.get("kind").and_then(Value::as_str) {
                Some("circle") => Ok(Value::variant(1u8, Value::record([("radius", size)]))),
                Some("square") => Ok(Value::variant(2u8, Value::record([("side", size)]))),
                _ => Err(TransformError::new("circle or square", value.kind_name())),
            }
        },
        |value: Value| match value {
            Value::Variant { discriminant, payload } => {
                let (kind, key) = match discriminant.as_branch_int() {
                    Some(1) => ("circle", "radius"),
                    Some(2) => ("square", "side"),
                    _ => return Err(TransformError::new("circle or square", "variant")),
                };
                let size = payload.get(key).cloned().unwrap_or(Value::Null);
                Ok(Value::record([("kind", Value::from(kind)), ("size", size)]))
            }
            other => Err(TransformError::new("variant", other.kind_name())),
        },
    );

    let value = Value::record([(
        "s",
        Value::record([("kind", Value::from("square")), ("size", Value::from(4u16))]),
    )]);
    let bytes = schema.encode(&value).expect("encode");
    assert_eq!(bytes, vec![2, 0, 4]);
    assert_eq!(schema.decode(&bytes).expect("decode"), value);
}

#[test]
fn length_prefix_bound_is_inclusive() {
    let schema = Schema::new(["xs: ubyte[1]"]).expect("schema");

    let at_bound = Value::record([("xs", Value::list(vec![7u8; 255]))]);
    let bytes = schema.encode(&at_bound).expect("255 fits a 1-byte prefix");
    assert_eq!(bytes.len(), 256);
    assert_eq!(bytes[0], 0xFF);
    assert_eq!(schema.decode(&bytes).expect("decode"), at_bound);

    let over = Value::record([("xs", Value::list(vec![7u8; 256]))]);
    let err = schema.encode(&over).expect_err("256 overflows a 1-byte prefix");
    assert_eq!(err.kind(), ErrorKind::Range);
    assert_eq!(err.path(), Some(".xs"));
}

#[test]
fn six_byte_prefix() {
    let schema = Schema::new(["xs: ubyte[6]", "ys: ubyte[!3]"]).expect("schema");
    let value = Value::record([
        ("xs", Value::list([1u8, 2])),
        ("ys", Value::list([3u8])),
    ]);
    let bytes = schema.encode(&value).expect("encode");
    assert_eq!(
        bytes,
        vec![0, 0, 0, 0, 0, 2, 1, 2, 0x01, 0x00, 0x00, 3]
    );
    assert_eq!(schema.decode(&bytes).expect("decode"), value);
}

#[test]
fn array_of_empty_composites() {
    let mut schema = Schema::new(["xs: unit[1]"]).expect("schema");
    schema
        .define_composite("unit", Vec::<&str>::new())
        .expect("unit");

    let empty = || Value::Record(Default::default());
    let value = Value::record([("xs", Value::List(vec![empty(), empty(), empty()]))]);
    assert_eq!(schema.encode(&value).expect("encode"), vec![3]);
    assert_eq!(schema.decode(&[3]).expect("decode"), value);
}

#[test]
fn nested_error_path() {
    let mut schema = Schema::new(["items: item[1]"]).expect("schema");
    schema
        .define_composite("item", ["id: ubyte", "name: string"])
        .expect("item");

    let item = |name: Value| Value::record([("id", Value::from(1u8)), ("name", name)]);
    let value = Value::record([(
        "items",
        Value::List(vec![item(Value::from("ok")), item(Value::from(5))]),
    )]);
    let err = schema.encode(&value).expect_err("name is not a string");
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    assert_eq!(err.path(), Some(".items[1].name"));
}

#[test]
fn missing_field_is_a_type_mismatch() {
    let schema = person_schema();
    let err = schema
        .encode(&Value::record([("name", Value::from("Al"))]))
        .expect_err("age missing");
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    assert_eq!(err.path(), Some(".age"));
}

#[test]
fn root_must_be_a_record() {
    let err = person_schema()
        .encode(&Value::from(3))
        .expect_err("not a record");
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    assert_eq!(err.path(), Some("<root>"));
}

#[test]
fn empty_schema() {
    let schema = Schema::new(Vec::<&str>::new()).expect("schema");
    let empty = Value::Record(Default::default());
    assert!(schema.encode(&empty).expect("encode").is_empty());
    assert_eq!(schema.decode(&[]).expect("decode"), empty);
}

#[test]
fn recursive_list_terminated_by_variant() {
    let mut schema = Schema::new(["head: node"]).expect("schema");
    schema
        .define_composite("node", ["value: ubyte", "next: link"])
        .expect("node")
        .define_variant_index_type("link", "ubyte")
        .expect("index")
        .define_variant_branch("link", 0u8, Vec::<&str>::new())
        .expect("end")
        .define_variant_branch("link", 1u8, ["node: node"])
        .expect("more");

    let end = Value::variant(0u8, Value::Record(Default::default()));
    let node = |value: u8, next: Value| {
        Value::record([("value", Value::from(value)), ("next", next)])
    };
    let link = |next: Value| Value::variant(1u8, Value::record([("node", next)]));
    let list = node(1, link(node(2, link(node(3, end)))));
    let value = Value::record([("head", list)]);

    let bytes = schema.encode(&value).expect("encode");
    assert_eq!(bytes, vec![1, 1, 2, 1, 3, 0]);
    assert_eq!(schema.decode(&bytes).expect("decode"), value);
}

#[test]
fn shadowed_primitive_resolves_to_builtin() {
    let mut schema = Schema::new(["n: int"]).expect("schema");
    schema
        .define_composite("int", ["a: ubyte"])
        .expect("shadow");
    let bytes = schema
        .encode(&Value::record([("n", Value::from(1))]))
        .expect("encode");
    assert_eq!(bytes, vec![0, 0, 0, 1]);
}

#[test]
fn string_discriminant_through_char_index() {
    let mut schema = Schema::new(["op: op"]).expect("schema");
    schema
        .define_variant_index_type("op", "char")
        .expect("index")
        .define_variant_branch("op", "+", ["a: byte", "b: byte"])
        .expect("add");

    let value = Value::record([(
        "op",
        Value::variant(
            "+",
            Value::record([("a", Value::from(-1i8)), ("b", Value::from(2i8))]),
        ),
    )]);
    let bytes = schema.encode(&value).expect("encode");
    assert_eq!(bytes, vec![b'+', 0xFF, 0x02]);
    let decoded = schema.decode(&bytes).expect("decode");
    assert_eq!(decoded, value);
    assert!(matches!(
        decoded.get("op"),
        Some(Value::Variant { discriminant: Discriminant::Str(s), .. }) if s == "+"
    ));
}

#[test]
fn schema_is_shareable_across_threads() {
    let schema = person_schema();
    std::thread::scope(|scope| {
        for age in 0u8..4 {
            let schema = &schema;
            scope.spawn(move || {
                let value = Value::record([
                    ("name", Value::from("worker")),
                    ("age", Value::from(age)),
                    ("scores", Value::list([i16::from(age)])),
                ]);
                let bytes = schema.encode(&value).expect("encode");
                assert_eq!(schema.decode(&bytes).expect("decode"), value);
            });
        }
    });
}

mod randomized {
    use super::*;

    const ALL_PRIMITIVES: [&str; 13] = [
        "a: boolean",
        "b: char",
        "c: string",
        "d: byte",
        "e: ubyte",
        "f: short",
        "g: ushort",
        "h: int",
        "i: uint",
        "j: long",
        "k: ulong",
        "l: float",
        "m: double",
    ];

    fn random_string(rng: &mut fastrand::Rng) -> String {
        let len = rng.usize(..24);
        (0..len).map(|_| rng.alphanumeric()).collect()
    }

    fn random_record(rng: &mut fastrand::Rng) -> Value {
        Value::record([
            ("a", Value::Bool(rng.bool())),
            ("b", Value::Char(char::from(rng.u8(..)))),
            ("c", Value::String(random_string(rng))),
            ("d", Value::from(rng.i8(..))),
            ("e", Value::from(rng.u8(..))),
            ("f", Value::from(rng.i16(..))),
            ("g", Value::from(rng.u16(..))),
            ("h", Value::from(rng.i32(..))),
            ("i", Value::from(rng.u32(..))),
            ("j", Value::from(rng.i64(..))),
            ("k", Value::from(rng.u64(..))),
            ("l", Value::Float(f64::from(rng.f32() * 1.0e6 - 5.0e5))),
            ("m", Value::Float(rng.f64() * 1.0e12 - 5.0e11)),
        ])
    }

    #[test]
    fn primitives_round_trip_both_orders() {
        let mut rng = fastrand::Rng::with_seed(0x5EED);
        let mut schema = Schema::new(ALL_PRIMITIVES).expect("schema");
        for endian in [Endian::Big, Endian::Little] {
            schema.set_endian(endian);
            for _ in 0..200 {
                let value = random_record(&mut rng);
                let bytes = schema.encode(&value).expect("encode");
                assert_eq!(schema.decode(&bytes).expect("decode"), value);
            }
        }
    }

    #[test]
    fn nested_arrays_round_trip() {
        let mut rng = fastrand::Rng::with_seed(42);
        let mut schema = Schema::new(["grid: cell[2][!1]", "tail: ulong[3]"]).expect("schema");
        schema
            .define_composite("cell", ["on: boolean", "label: string"])
            .expect("cell");

        for _ in 0..50 {
            let rows = (0..rng.usize(..5))
                .map(|_| {
                    Value::List(
                        (0..rng.usize(..5))
                            .map(|_| {
                                Value::record([
                                    ("on", Value::Bool(rng.bool())),
                                    ("label", Value::String(random_string(&mut rng))),
                                ])
                            })
                            .collect(),
                    )
                })
                .collect();
            let tail = Value::list((0..rng.usize(..4)).map(|_| rng.u64(..)));
            let value = Value::record([("grid", Value::List(rows)), ("tail", tail)]);

            let bytes = schema.encode(&value).expect("encode");
            let (decoded, consumed) = schema.decode_prefix(&bytes).expect("decode");
            assert_eq!(decoded, value);
            assert_eq!(consumed, bytes.len());
        }
    }

    #[test]
    fn truncated_input_never_panics() {
        let mut rng = fastrand::Rng::with_seed(7);
        let schema = Schema::new(ALL_PRIMITIVES).expect("schema");
        let bytes = schema.encode(&random_record(&mut rng)).expect("encode");
        for cut in 0..bytes.len() {
            let err = schema.decode(&bytes[..cut]).expect_err("truncated");
            assert_eq!(err.kind(), ErrorKind::BufferUnderrun);
        }
    }
}
