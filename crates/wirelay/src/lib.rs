// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # wirelay - schema-driven binary codec
//!
//! Translates between dynamic [`Value`] trees and compact byte sequences
//! using a schema made of textual field declarations (`"scores: short[!2]"`).
//!
//! ## Quick Start
//!
//! ```rust
//! use wirelay::{Schema, Value};
//!
//! let mut schema = Schema::new(["id: uint", "pos: point", "tags: string[1]"]).unwrap();
//! schema.define_composite("point", ["x: short", "y: short"]).unwrap();
//!
//! let value = Value::record([
//!     ("id", Value::from(7u32)),
//!     ("pos", Value::record([("x", Value::from(-1i16)), ("y", Value::from(2i16))])),
//!     ("tags", Value::list(["a", "bc"])),
//! ]);
//!
//! let bytes = schema.encode(&value).unwrap();
//! assert_eq!(schema.decode(&bytes).unwrap(), value);
//! ```
//!
//! ## Wire format
//!
//! ```text
//! field      := value of its declared type, in declaration order
//! array      := length prefix (1..=6 bytes) + elements, no padding
//! string     := u16 byte length + UTF-8 bytes
//! variant    := discriminant (index type) + branch fields
//! ```
//!
//! Multi-byte scalars use the schema's byte order; a `!` dimension writes its
//! length prefix in the opposite order.
//!
//! ## Modules Overview
//!
//! - [`grammar`] - field declaration and type reference parsing
//! - [`registry`] - composites, variants and transforms
//! - [`schema`] - the schema facade (encode/decode entry points)
//! - [`loader`] - YAML/JSON schema documents (feature `loaders`)

mod cursor;
mod decode;
mod encode;
/// Byte order selection.
pub mod endian;
/// Error taxonomy.
pub mod error;
/// Field declaration grammar.
pub mod grammar;
/// Conversions to and from `serde_json::Value`.
#[cfg(feature = "loaders")]
pub mod json;
/// Schema documents.
#[cfg(feature = "loaders")]
pub mod loader;
/// Built-in primitive types.
pub mod primitive;
/// User-defined type tables.
pub mod registry;
/// Schema instance and codec entry points.
pub mod schema;
/// Dynamic values.
pub mod value;

pub use endian::Endian;
pub use error::{CodecError, ErrorKind, Result, TransformError};
pub use grammar::{Dimension, FieldDecl, TypeRef};
#[cfg(feature = "loaders")]
pub use loader::SchemaDocument;
pub use primitive::PrimitiveKind;
pub use registry::{Composite, Resolved, Transform, TypeRegistry, Variant};
pub use schema::{DecodePolicy, DecodeReport, FieldFailure, Schema};
pub use value::{Discriminant, Record, Value};

#[cfg(test)]
mod tests;
