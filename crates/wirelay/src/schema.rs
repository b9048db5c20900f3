// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema instance: top-level field list, type registry and byte order.
//!
//! Definition methods take `&mut self` and encode/decode take `&self`, so a
//! schema that is shared (e.g. behind an `Arc`) across threads cannot be
//! mutated while calls are in flight.

use crate::decode::Decoder;
use crate::encode::Encoder;
use crate::endian::Endian;
use crate::error::{CodecError, Result, TransformError};
use crate::grammar::{parse_field_list, FieldDecl};
use crate::registry::{Transform, TypeRegistry};
use crate::value::{Discriminant, Record, Value};

/// How [`Schema::decode_report`] treats a failing top-level field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodePolicy {
    /// Raise the first error.
    #[default]
    FailFast,
    /// Debug aid: stop at the first failing top-level field and report it
    /// next to the fields decoded before it.
    CollectPerField,
}

/// A top-level field that failed to decode.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFailure {
    pub key: String,
    pub error: CodecError,
}

/// Outcome of [`Schema::decode_report`].
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeReport {
    /// Top-level fields decoded successfully, in declaration order up to the
    /// failure (if any).
    pub fields: Record,
    pub failure: Option<FieldFailure>,
    /// Bytes consumed by the successfully decoded fields.
    pub consumed: usize,
}

impl DecodeReport {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }

    /// Turn the report back into a fail-fast result.
    pub fn into_result(self) -> Result<Value> {
        match self.failure {
            Some(failure) => Err(failure.error),
            None => Ok(Value::Record(self.fields)),
        }
    }
}

/// A compiled schema.
///
/// ```rust
/// use wirelay::{Schema, Value};
///
/// let schema = Schema::new(["name: string", "age: ubyte", "scores: short[2]"]).unwrap();
/// let person = Value::record([
///     ("name", Value::from("Al")),
///     ("age", Value::from(9u8)),
///     ("scores", Value::list([10i16, 20, 30])),
/// ]);
///
/// let bytes = schema.encode(&person).unwrap();
/// assert_eq!(bytes.len(), 2 + 2 + 1 + 2 + 3 * 2);
/// assert_eq!(schema.decode(&bytes).unwrap(), person);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<FieldDecl>,
    registry: TypeRegistry,
    endian: Endian,
    policy: DecodePolicy,
}

impl Schema {
    /// Compile a list of `key: type` declarations.
    pub fn new<I, S>(fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let fields = parse_field_list(fields)?;
        log::debug!("[schema] compiled {} top-level field(s)", fields.len());
        Ok(Self {
            fields,
            ..Self::default()
        })
    }

    pub fn fields(&self) -> &[FieldDecl] {
        &self.fields
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn default_endian(&self) -> Endian {
        self.endian
    }

    pub fn decode_policy(&self) -> DecodePolicy {
        self.policy
    }

    /// Register (or overwrite) a composite type.
    pub fn define_composite<I, S>(&mut self, name: &str, fields: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.registry.define_composite(name, fields)?;
        Ok(self)
    }

    /// Register (or overwrite) the pre-encode / post-decode pair of a type.
    pub fn define_transform<Pre, Post>(&mut self, name: &str, pre: Pre, post: Post) -> &mut Self
    where
        Pre: Fn(&Value) -> std::result::Result<Value, TransformError> + Send + Sync + 'static,
        Post: Fn(Value) -> std::result::Result<Value, TransformError> + Send + Sync + 'static,
    {
        self.registry
            .define_transform(name, Transform::new(pre, post));
        self
    }

    /// Create a variant or update its index type.
    pub fn define_variant_index_type(&mut self, name: &str, index_type: &str) -> Result<&mut Self> {
        self.registry.define_variant_index_type(name, index_type)?;
        Ok(self)
    }

    /// Register (or overwrite) one branch of a variant.
    pub fn define_variant_branch<I, S>(
        &mut self,
        name: &str,
        discriminant: impl Into<Discriminant>,
        fields: I,
    ) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.registry
            .define_variant_branch(name, discriminant, fields)?;
        Ok(self)
    }

    /// Set the byte order from its name, `"BE"` or `"LE"`.
    pub fn set_default_endian(&mut self, endian: &str) -> Result<&mut Self> {
        let endian = endian.parse::<Endian>()?;
        Ok(self.set_endian(endian))
    }

    pub fn set_endian(&mut self, endian: Endian) -> &mut Self {
        log::debug!("[schema] default endianness set to {}", endian);
        self.endian = endian;
        self
    }

    /// Enable or disable per-field error collection in
    /// [`Schema::decode_report`]. Meant for debugging only.
    pub fn set_forced_error_collection(&mut self, enabled: bool) -> &mut Self {
        self.policy = if enabled {
            DecodePolicy::CollectPerField
        } else {
            DecodePolicy::FailFast
        };
        self
    }

    /// Encode a record. Nothing is returned unless every field encodes.
    pub fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        let mut encoder = Encoder::new(&self.registry, self.endian);
        encoder.encode_fields(&self.fields, value)?;
        let bytes = encoder.into_bytes();
        log::trace!("[schema] encoded {} byte(s)", bytes.len());
        Ok(bytes)
    }

    /// Exact number of bytes `value` encodes to.
    pub fn encoded_len(&self, value: &Value) -> Result<usize> {
        self.encode(value).map(|bytes| bytes.len())
    }

    /// Decode a record from the start of `bytes`; trailing bytes are ignored.
    ///
    /// Allocation is bounded by `bytes.len()`, but time is not when the
    /// schema has arrays of empty composites: their elements take no bytes,
    /// so a corrupt 6-byte length prefix can iterate up to 2^48 times. When
    /// decoding untrusted input with such a schema, bound the input size
    /// and the schema's array widths before calling this.
    pub fn decode(&self, bytes: &[u8]) -> Result<Value> {
        self.decode_prefix(bytes).map(|(value, _)| value)
    }

    /// Decode a record from the start of `bytes` and report how many bytes it
    /// occupied.
    pub fn decode_prefix(&self, bytes: &[u8]) -> Result<(Value, usize)> {
        let mut decoder = Decoder::new(&self.registry, self.endian, bytes);
        let record = decoder.decode_fields(&self.fields)?;
        Ok((Value::Record(record), decoder.consumed()))
    }

    /// Decode honoring the configured [`DecodePolicy`].
    ///
    /// With [`DecodePolicy::FailFast`] the first error is raised. With
    /// [`DecodePolicy::CollectPerField`] decoding stops at the first failing
    /// top-level field, and the report carries the fields before it plus the
    /// failure.
    pub fn decode_report(&self, bytes: &[u8]) -> Result<DecodeReport> {
        let mut decoder = Decoder::new(&self.registry, self.endian, bytes);
        let mut fields = Record::new();

        for field in &self.fields {
            let consumed = decoder.consumed();
            match decoder.decode_field(field) {
                Ok(value) => {
                    fields.insert(field.key.clone(), value);
                }
                Err(error) if self.policy == DecodePolicy::CollectPerField => {
                    log::debug!(
                        "[schema] collected failure for field '{}': {}",
                        field.key,
                        error
                    );
                    return Ok(DecodeReport {
                        fields,
                        failure: Some(FieldFailure {
                            key: field.key.clone(),
                            error,
                        }),
                        consumed,
                    });
                }
                Err(error) => return Err(error),
            }
        }

        Ok(DecodeReport {
            fields,
            failure: None,
            consumed: decoder.consumed(),
        })
    }
}
