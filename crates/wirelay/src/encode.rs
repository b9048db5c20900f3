// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema-driven encoder.
//!
//! Walks a [`Value`] tree in lock-step with the field declarations and appends
//! the wire representation to one output buffer. The buffer is only handed
//! back when the whole walk succeeds.

use crate::endian::{self, Endian};
use crate::error::{CodecError, FieldPath, Result, TransformError};
use crate::grammar::{Dimension, FieldDecl};
use crate::primitive::PrimitiveKind;
use crate::registry::{Resolved, TypeRegistry, Variant};
use crate::value::{Discriminant, Value};
use std::borrow::Cow;

/// Keys of the record form of a variant input.
pub(crate) const DISCRIMINANT_KEY: &str = "discriminant";
pub(crate) const PAYLOAD_KEY: &str = "payload";

/// Stand-in for absent record properties.
static NULL: Value = Value::Null;

pub(crate) struct Encoder<'s> {
    registry: &'s TypeRegistry,
    endian: Endian,
    out: Vec<u8>,
    path: FieldPath,
}

impl<'s> Encoder<'s> {
    pub fn new(registry: &'s TypeRegistry, endian: Endian) -> Self {
        Self {
            registry,
            endian,
            out: Vec::new(),
            path: FieldPath::new(),
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.out
    }

    /// Encode each declaration against the matching property of `record`.
    pub fn encode_fields(&mut self, fields: &[FieldDecl], record: &Value) -> Result<()> {
        let Value::Record(map) = record else {
            return Err(self.mismatch("record", record));
        };
        for field in fields {
            self.path.push_field(&field.key);
            let value = map.get(&field.key).unwrap_or(&NULL);
            log::trace!("[encode] {} at offset {}", self.path, self.out.len());
            self.encode_typed(&field.ty.name, &field.ty.dimensions, value)?;
            self.path.pop();
        }
        Ok(())
    }

    fn encode_typed(&mut self, name: &str, dimensions: &[Dimension], value: &Value) -> Result<()> {
        let Some((dimension, inner)) = dimensions.split_first() else {
            return self.encode_scalar(name, value);
        };

        let Value::List(items) = value else {
            return Err(self.mismatch(&format!("list of {}", name), value));
        };
        let len = items.len() as u64;
        if len > dimension.max_len() {
            return Err(CodecError::Range {
                path: self.path.render(),
                value: format!("array length {}", len),
                min: "0".into(),
                max: dimension.max_len().to_string(),
            });
        }
        endian::put_uint(
            &mut self.out,
            self.endian.for_prefix(dimension),
            len,
            usize::from(dimension.prefix_width),
        );

        for (i, item) in items.iter().enumerate() {
            self.path.push_index(i);
            self.encode_typed(name, inner, item)?;
            self.path.pop();
        }
        Ok(())
    }

    fn encode_scalar(&mut self, name: &str, value: &Value) -> Result<()> {
        let registry = self.registry;
        let value = match registry.transform(name) {
            Some(transform) => Cow::Owned(
                transform
                    .pre(value)
                    .map_err(|e| self.transform_failed(name, e))?,
            ),
            None => Cow::Borrowed(value),
        };

        match registry.resolve(name) {
            Some(Resolved::Primitive(kind)) => self.encode_primitive(kind, &value),
            Some(Resolved::Composite(composite)) => self.encode_fields(&composite.fields, &value),
            Some(Resolved::Variant(variant)) => self.encode_variant(name, variant, &value),
            None => Err(CodecError::UnknownType {
                path: self.path.render(),
                type_name: name.to_string(),
            }),
        }
    }

    fn encode_variant(&mut self, name: &str, variant: &Variant, value: &Value) -> Result<()> {
        let (discriminant, payload) = match value {
            Value::Variant {
                discriminant,
                payload,
            } => (Cow::Borrowed(discriminant), payload.as_ref()),
            Value::Record(map) if map.len() == 2 && map.contains_key(PAYLOAD_KEY) => {
                let raw = map.get(DISCRIMINANT_KEY).unwrap_or(&NULL);
                let Some(discriminant) = Discriminant::from_value(raw) else {
                    self.path.push_field(DISCRIMINANT_KEY);
                    let err = self.mismatch("string or integer discriminant", raw);
                    self.path.pop();
                    return Err(err);
                };
                (Cow::Owned(discriminant), map.get(PAYLOAD_KEY).unwrap_or(&NULL))
            }
            other => {
                return Err(self.mismatch(
                    &format!("variant {{{}, {}}} of {}", DISCRIMINANT_KEY, PAYLOAD_KEY, name),
                    other,
                ))
            }
        };

        let Some(branch) = variant.branch(&discriminant) else {
            return Err(CodecError::UnknownVariant {
                path: self.path.render(),
                variant: name.to_string(),
                discriminant: discriminant.into_owned(),
            });
        };

        self.path.push_field(DISCRIMINANT_KEY);
        self.encode_typed(
            &variant.index_type.name,
            &variant.index_type.dimensions,
            &discriminant.to_value(),
        )?;
        self.path.pop();

        self.path.push_field(PAYLOAD_KEY);
        self.encode_fields(branch, payload)?;
        self.path.pop();
        Ok(())
    }

    fn encode_primitive(&mut self, kind: PrimitiveKind, value: &Value) -> Result<()> {
        match kind {
            PrimitiveKind::Boolean => match value {
                Value::Bool(b) => self.out.push(u8::from(*b)),
                other => return Err(self.mismatch("boolean", other)),
            },
            PrimitiveKind::Char => {
                let c = match value {
                    Value::Char(c) => *c,
                    Value::String(s) if s.chars().count() == 1 => {
                        s.chars().next().unwrap_or_default()
                    }
                    other => return Err(self.mismatch("char", other)),
                };
                let code = u32::from(c);
                let Ok(byte) = u8::try_from(code) else {
                    return Err(CodecError::Range {
                        path: self.path.render(),
                        value: format!("{:?} (U+{:04X})", c, code),
                        min: "U+0000".into(),
                        max: "U+00FF".into(),
                    });
                };
                self.out.push(byte);
            }
            PrimitiveKind::Float | PrimitiveKind::Double => {
                let Some(v) = value.as_f64() else {
                    return Err(self.mismatch(kind.name(), value));
                };
                if kind == PrimitiveKind::Float {
                    if v.is_finite() && v.abs() > f64::from(f32::MAX) {
                        return Err(CodecError::Range {
                            path: self.path.render(),
                            value: v.to_string(),
                            min: f32::MIN.to_string(),
                            max: f32::MAX.to_string(),
                        });
                    }
                    endian::put_f32(&mut self.out, self.endian, v as f32);
                } else {
                    endian::put_f64(&mut self.out, self.endian, v);
                }
            }
            PrimitiveKind::String => {
                let Value::String(s) = value else {
                    return Err(self.mismatch("string", value));
                };
                let Ok(len) = u16::try_from(s.len()) else {
                    return Err(CodecError::Range {
                        path: self.path.render(),
                        value: format!("string length {}", s.len()),
                        min: "0".into(),
                        max: u16::MAX.to_string(),
                    });
                };
                endian::put_u16(&mut self.out, self.endian, len);
                self.out.extend_from_slice(s.as_bytes());
            }
            _ => self.encode_integer(kind, value)?,
        }
        Ok(())
    }

    fn encode_integer(&mut self, kind: PrimitiveKind, value: &Value) -> Result<()> {
        let Some((min, max)) = kind.int_range() else {
            return Err(self.mismatch(kind.name(), value));
        };
        let v = match value {
            Value::Int(v) => *v,
            // Integral floats are accepted; fractional ones are a shape error.
            Value::Float(f) if f.is_finite() && f.fract() == 0.0 => *f as i128,
            other => return Err(self.mismatch(kind.name(), other)),
        };
        if v < min || v > max {
            return Err(CodecError::Range {
                path: self.path.render(),
                value: v.to_string(),
                min: min.to_string(),
                max: max.to_string(),
            });
        }

        let width = kind.width();
        // Two's complement, truncated to the field width.
        let mask = u64::MAX >> (64 - 8 * width);
        let bits = (if min < 0 { v as i64 as u64 } else { v as u64 }) & mask;
        endian::put_uint(&mut self.out, self.endian, bits, width);
        Ok(())
    }

    fn mismatch(&self, expected: &str, found: &Value) -> CodecError {
        CodecError::TypeMismatch {
            path: self.path.render(),
            expected: expected.to_string(),
            found: found.kind_name().to_string(),
        }
    }

    fn transform_failed(&self, name: &str, err: TransformError) -> CodecError {
        CodecError::TypeMismatch {
            path: self.path.render(),
            expected: format!("{} (pre-transform of '{}')", err.expected, name),
            found: err.found,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::grammar::parse_field_list;

    fn encode_with(
        registry: &TypeRegistry,
        endian: Endian,
        fields: &[&str],
        value: &Value,
    ) -> Result<Vec<u8>> {
        let fields = parse_field_list(fields.iter().copied())?;
        let mut encoder = Encoder::new(registry, endian);
        encoder.encode_fields(&fields, value)?;
        Ok(encoder.into_bytes())
    }

    fn encode(fields: &[&str], value: &Value) -> Result<Vec<u8>> {
        encode_with(&TypeRegistry::new(), Endian::Big, fields, value)
    }

    #[test]
    fn test_integer_widths_and_sign() {
        let value = Value::record([
            ("a", Value::from(-1i8)),
            ("b", Value::from(-2i16)),
            ("c", Value::from(0x0102_0304u32)),
            ("d", Value::from(u64::MAX)),
        ]);
        let bytes = encode(&["a: byte", "b: short", "c: uint", "d: ulong"], &value)
            .expect("encode");
        assert_eq!(
            bytes,
            vec![
                0xFF, 0xFF, 0xFE, 0x01, 0x02, 0x03, 0x04, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
                0xFF, 0xFF
            ]
        );
    }

    #[test]
    fn test_little_endian_numbers() {
        let value = Value::record([("n", Value::from(0x0102i16)), ("f", Value::from(1.0f32))]);
        let bytes =
            encode_with(&TypeRegistry::new(), Endian::Little, &["n: short", "f: float"], &value)
                .expect("encode");
        assert_eq!(bytes, vec![0x02, 0x01, 0x00, 0x00, 0x80, 0x3F]);
    }

    #[test]
    fn test_range_checks() {
        let err = encode(&["v: ubyte"], &Value::record([("v", Value::from(256))]))
            .expect_err("256 as ubyte");
        assert_eq!(err.kind(), ErrorKind::Range);
        assert_eq!(err.path(), Some(".v"));

        assert!(encode(&["v: byte"], &Value::record([("v", Value::from(127))])).is_ok());
        let err = encode(&["v: byte"], &Value::record([("v", Value::from(128))]))
            .expect_err("128 as byte");
        assert_eq!(err.kind(), ErrorKind::Range);
        let err = encode(&["v: uint"], &Value::record([("v", Value::from(-1))]))
            .expect_err("negative uint");
        assert_eq!(err.kind(), ErrorKind::Range);
    }

    #[test]
    fn test_float_inputs() {
        let bytes = encode(&["v: double"], &Value::record([("v", Value::from(2))]))
            .expect("int as double");
        assert_eq!(bytes, 2.0f64.to_be_bytes().to_vec());

        let err = encode(&["v: float"], &Value::record([("v", Value::from(1e300))]))
            .expect_err("too large for f32");
        assert_eq!(err.kind(), ErrorKind::Range);

        let err = encode(&["v: int"], &Value::record([("v", Value::from(1.5))]))
            .expect_err("fractional int");
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert!(encode(&["v: int"], &Value::record([("v", Value::from(3.0))])).is_ok());
    }

    #[test]
    fn test_char_and_string() {
        let value = Value::record([("c", Value::from('A')), ("s", Value::from("hi"))]);
        let bytes = encode(&["c: char", "s: string"], &value).expect("encode");
        assert_eq!(bytes, vec![b'A', 0x00, 0x02, b'h', b'i']);

        let err = encode(&["c: char"], &Value::record([("c", Value::from('\u{263A}'))]))
            .expect_err("wide char");
        assert_eq!(err.kind(), ErrorKind::Range);

        let long = "x".repeat(70_000);
        let err = encode(&["s: string"], &Value::record([("s", Value::from(long))]))
            .expect_err("string too long");
        assert_eq!(err.kind(), ErrorKind::Range);
    }

    #[test]
    fn test_missing_field_is_mismatch() {
        let err = encode(&["a: int"], &Value::record(Vec::<(&str, Value)>::new()))
            .expect_err("missing");
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert_eq!(err.path(), Some(".a"));
    }

    #[test]
    fn test_array_path_in_error() {
        let value = Value::record([(
            "xs",
            Value::list([Value::from(1), Value::from(2), Value::from("three")]),
        )]);
        let err = encode(&["xs: int[1]"], &value).expect_err("bad element");
        assert_eq!(err.path(), Some(".xs[2]"));
    }

    #[test]
    fn test_unknown_type() {
        let err = encode(&["p: point"], &Value::record([("p", Value::Null)]))
            .expect_err("unknown");
        assert_eq!(err.kind(), ErrorKind::UnknownType);
    }

    #[test]
    fn test_variant_record_form() {
        let mut registry = TypeRegistry::new();
        registry
            .define_variant_index_type("cmd", "ubyte")
            .expect("index");
        registry
            .define_variant_branch("cmd", 2u8, ["speed: ushort"])
            .expect("branch");

        let as_record = Value::record([(
            "c",
            Value::record([
                ("discriminant", Value::from(2)),
                ("payload", Value::record([("speed", Value::from(300))])),
            ]),
        )]);
        let as_variant = Value::record([(
            "c",
            Value::variant(2u8, Value::record([("speed", Value::from(300))])),
        )]);

        let a = encode_with(&registry, Endian::Big, &["c: cmd"], &as_record).expect("record");
        let b = encode_with(&registry, Endian::Big, &["c: cmd"], &as_variant).expect("variant");
        assert_eq!(a, vec![0x02, 0x01, 0x2C]);
        assert_eq!(a, b);
    }
}
