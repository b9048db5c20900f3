// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error taxonomy for schema definition, encoding and decoding.
//!
//! Every error raised while walking a value or a byte sequence carries the
//! rendered field path (`.items[3].name`) of the position where it occurred.

use crate::value::Discriminant;
use std::fmt;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CodecError>;

/// Codec errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    /// Malformed field declaration or type reference (raised at definition time).
    #[error("schema syntax error in {declaration:?}: {reason}")]
    SchemaSyntax { declaration: String, reason: String },

    /// Value shape does not match what the schema expects.
    #[error("type mismatch at {path}: expected {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: String,
        found: String,
    },

    /// Numeric value or array length outside the representable range.
    #[error("value out of range at {path}: {value} not in {min}..={max}")]
    Range {
        path: String,
        value: String,
        min: String,
        max: String,
    },

    /// Type name not found in the primitive, composite or variant tables.
    #[error("unknown type {type_name:?} at {path}")]
    UnknownType { path: String, type_name: String },

    /// Discriminant has no branch in the variant.
    #[error("variant {variant:?} has no branch for discriminant {discriminant} at {path}")]
    UnknownVariant {
        path: String,
        variant: String,
        discriminant: Discriminant,
    },

    /// Decoder needs more bytes than remain.
    #[error(
        "buffer underrun at {path} reading {type_name}: need {need} bytes at offset {offset}, {available} available"
    )]
    BufferUnderrun {
        path: String,
        type_name: String,
        offset: usize,
        need: usize,
        available: usize,
    },

    /// Unsupported byte order name.
    #[error("invalid endianness {0:?}: expected \"BE\" or \"LE\"")]
    InvalidEndian(String),

    /// Schema document could not be read or parsed.
    #[cfg(feature = "loaders")]
    #[error("schema document error: {0}")]
    Document(String),
}

/// Fieldless view of [`CodecError`], convenient for matching the taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    SchemaSyntax,
    TypeMismatch,
    Range,
    UnknownType,
    UnknownVariant,
    BufferUnderrun,
    InvalidEndian,
    #[cfg(feature = "loaders")]
    Document,
}

impl CodecError {
    /// Taxonomy entry of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SchemaSyntax { .. } => ErrorKind::SchemaSyntax,
            Self::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            Self::Range { .. } => ErrorKind::Range,
            Self::UnknownType { .. } => ErrorKind::UnknownType,
            Self::UnknownVariant { .. } => ErrorKind::UnknownVariant,
            Self::BufferUnderrun { .. } => ErrorKind::BufferUnderrun,
            Self::InvalidEndian(_) => ErrorKind::InvalidEndian,
            #[cfg(feature = "loaders")]
            Self::Document(_) => ErrorKind::Document,
        }
    }

    /// Field path the error was raised at, if it was raised by the engine.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::TypeMismatch { path, .. }
            | Self::Range { path, .. }
            | Self::UnknownType { path, .. }
            | Self::UnknownVariant { path, .. }
            | Self::BufferUnderrun { path, .. } => Some(path),
            _ => None,
        }
    }

    pub(crate) fn syntax(declaration: &str, reason: impl Into<String>) -> Self {
        Self::SchemaSyntax {
            declaration: declaration.to_string(),
            reason: reason.into(),
        }
    }
}

/// Failure reported by a user transform.
///
/// The engine reports it as [`CodecError::TypeMismatch`] at the path where the
/// transform ran.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected {expected}, found {found}")]
pub struct TransformError {
    pub expected: String,
    pub found: String,
}

impl TransformError {
    pub fn new(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
            found: found.into(),
        }
    }
}

/// One step of a field path.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Field(String),
    Index(usize),
}

/// Field chain traversed by the encoder/decoder.
///
/// Segments are pushed on the way down and popped on the way back up, so a
/// single instance serves a whole call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct FieldPath {
    segments: Vec<Segment>,
}

impl FieldPath {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_field(&mut self, key: &str) {
        self.segments.push(Segment::Field(key.to_string()));
    }

    pub(crate) fn push_index(&mut self, index: usize) {
        self.segments.push(Segment::Index(index));
    }

    pub(crate) fn pop(&mut self) {
        self.segments.pop();
    }

    pub(crate) fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("<root>");
        }
        for segment in &self.segments {
            match segment {
                Segment::Field(key) => write!(f, ".{}", key)?,
                Segment::Index(i) => write!(f, "[{}]", i)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_rendering() {
        let mut path = FieldPath::new();
        assert_eq!(path.render(), "<root>");

        path.push_field("items");
        path.push_index(3);
        path.push_field("name");
        assert_eq!(path.render(), ".items[3].name");

        path.pop();
        path.pop();
        assert_eq!(path.render(), ".items");
    }

    #[test]
    fn test_error_kind_and_path() {
        let err = CodecError::Range {
            path: ".age".into(),
            value: "256".into(),
            min: "0".into(),
            max: "255".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Range);
        assert_eq!(err.path(), Some(".age"));
        assert_eq!(
            err.to_string(),
            "value out of range at .age: 256 not in 0..=255"
        );

        let err = CodecError::syntax("name string", "missing ':'");
        assert_eq!(err.kind(), ErrorKind::SchemaSyntax);
        assert!(err.path().is_none());
    }
}
