// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema-driven decoder.
//!
//! Mirrors the encoder: one [`Cursor`] is threaded through every recursive
//! call and only ever moves forward.

use crate::cursor::{Cursor, Shortfall};
use crate::encode::{DISCRIMINANT_KEY, PAYLOAD_KEY};
use crate::endian::{self, Endian};
use crate::error::{CodecError, FieldPath, Result, TransformError};
use crate::grammar::{Dimension, FieldDecl};
use crate::primitive::PrimitiveKind;
use crate::registry::{Resolved, TypeRegistry, Variant};
use crate::value::{Discriminant, Record, Value};

pub(crate) struct Decoder<'s, 'b> {
    registry: &'s TypeRegistry,
    endian: Endian,
    cursor: Cursor<'b>,
    path: FieldPath,
}

impl<'s, 'b> Decoder<'s, 'b> {
    pub fn new(registry: &'s TypeRegistry, endian: Endian, bytes: &'b [u8]) -> Self {
        Self {
            registry,
            endian,
            cursor: Cursor::new(bytes),
            path: FieldPath::new(),
        }
    }

    /// Bytes consumed so far.
    pub fn consumed(&self) -> usize {
        self.cursor.offset()
    }

    /// Decode a declaration list into a record.
    pub fn decode_fields(&mut self, fields: &[FieldDecl]) -> Result<Record> {
        let mut record = Record::new();
        for field in fields {
            let value = self.decode_field(field)?;
            record.insert(field.key.clone(), value);
        }
        Ok(record)
    }

    /// Decode a single declaration.
    pub fn decode_field(&mut self, field: &FieldDecl) -> Result<Value> {
        self.path.push_field(&field.key);
        log::trace!("[decode] {} at offset {}", self.path, self.cursor.offset());
        let value = self.decode_typed(&field.ty.name, &field.ty.dimensions)?;
        self.path.pop();
        Ok(value)
    }

    fn decode_typed(&mut self, name: &str, dimensions: &[Dimension]) -> Result<Value> {
        let Some((dimension, inner)) = dimensions.split_first() else {
            return self.decode_scalar(name);
        };

        let width = usize::from(dimension.prefix_width);
        let prefix = self
            .cursor
            .take(width)
            .map_err(|short| self.underrun(&format!("length prefix of {}", name), short))?;
        let len = endian::get_uint(prefix, self.endian.for_prefix(dimension));

        // Every element takes at least one byte unless it is an empty
        // composite, so the remaining input bounds any sane capacity.
        let capacity = usize::try_from(len)
            .unwrap_or(usize::MAX)
            .min(self.cursor.remaining());
        let mut items = Vec::with_capacity(capacity);
        for i in 0..len {
            self.path.push_index(usize::try_from(i).unwrap_or(usize::MAX));
            items.push(self.decode_typed(name, inner)?);
            self.path.pop();
        }
        Ok(Value::List(items))
    }

    fn decode_scalar(&mut self, name: &str) -> Result<Value> {
        let registry = self.registry;
        let value = match registry.resolve(name) {
            Some(Resolved::Primitive(kind)) => self.decode_primitive(kind)?,
            Some(Resolved::Composite(composite)) => {
                Value::Record(self.decode_fields(&composite.fields)?)
            }
            Some(Resolved::Variant(variant)) => self.decode_variant(name, variant)?,
            None => {
                return Err(CodecError::UnknownType {
                    path: self.path.render(),
                    type_name: name.to_string(),
                })
            }
        };

        match registry.transform(name) {
            Some(transform) => transform
                .post(value)
                .map_err(|e| self.transform_failed(name, e)),
            None => Ok(value),
        }
    }

    fn decode_variant(&mut self, name: &str, variant: &Variant) -> Result<Value> {
        self.path.push_field(DISCRIMINANT_KEY);
        let raw = self.decode_typed(&variant.index_type.name, &variant.index_type.dimensions)?;
        let Some(discriminant) = Discriminant::from_value(&raw) else {
            return Err(CodecError::TypeMismatch {
                path: self.path.render(),
                expected: "string or integer discriminant".into(),
                found: raw.kind_name().into(),
            });
        };
        self.path.pop();

        let Some(branch) = variant.branch(&discriminant) else {
            return Err(CodecError::UnknownVariant {
                path: self.path.render(),
                variant: name.to_string(),
                discriminant,
            });
        };

        self.path.push_field(PAYLOAD_KEY);
        let payload = self.decode_fields(branch)?;
        self.path.pop();

        Ok(Value::Variant {
            discriminant,
            payload: Box::new(Value::Record(payload)),
        })
    }

    fn decode_primitive(&mut self, kind: PrimitiveKind) -> Result<Value> {
        let bytes = self
            .cursor
            .take(kind.width())
            .map_err(|short| self.underrun(kind.name(), short))?;

        let value = match kind {
            PrimitiveKind::Boolean => Value::Bool(bytes[0] != 0),
            PrimitiveKind::Char => Value::Char(char::from(bytes[0])),
            PrimitiveKind::Float => Value::Float(f64::from(endian::get_f32(bytes, self.endian))),
            PrimitiveKind::Double => Value::Float(endian::get_f64(bytes, self.endian)),
            PrimitiveKind::String => {
                let len = usize::from(endian::get_u16(bytes, self.endian));
                let payload = self
                    .cursor
                    .take(len)
                    .map_err(|short| self.underrun("string payload", short))?;
                let s = String::from_utf8(payload.to_vec()).map_err(|_| {
                    CodecError::TypeMismatch {
                        path: self.path.render(),
                        expected: "utf-8 string".into(),
                        found: "invalid utf-8 bytes".into(),
                    }
                })?;
                Value::String(s)
            }
            _ => Value::Int(integer_from_bytes(kind, bytes, self.endian)),
        };
        Ok(value)
    }

    fn underrun(&self, type_name: &str, short: Shortfall) -> CodecError {
        CodecError::BufferUnderrun {
            path: self.path.render(),
            type_name: type_name.to_string(),
            offset: short.offset,
            need: short.need,
            available: short.available,
        }
    }

    fn transform_failed(&self, name: &str, err: TransformError) -> CodecError {
        CodecError::TypeMismatch {
            path: self.path.render(),
            expected: format!("{} (post-transform of '{}')", err.expected, name),
            found: err.found,
        }
    }
}

/// Sign- or zero-extend an integer primitive read in `endian` order.
fn integer_from_bytes(kind: PrimitiveKind, bytes: &[u8], endian: Endian) -> i128 {
    let raw = match bytes.len() {
        1 => u64::from(bytes[0]),
        2 => u64::from(endian::get_u16(bytes, endian)),
        4 => u64::from(endian::get_u32(bytes, endian)),
        _ => endian::get_u64(bytes, endian),
    };
    let signed = kind.int_range().is_some_and(|(min, _)| min < 0);
    if signed {
        let shift = 64 - 8 * bytes.len() as u32;
        i128::from(((raw << shift) as i64) >> shift)
    } else {
        i128::from(raw)
    }
}
