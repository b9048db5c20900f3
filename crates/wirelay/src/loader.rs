// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! YAML / JSON schema documents.
//!
//! A document describes a complete schema instance:
//!
//! ```yaml
//! endian: LE
//! fields: ["name: string", "pos: point", "shape: shape"]
//! types:
//!   point: ["x: int", "y: int"]
//! variants:
//!   shape:
//!     index: ubyte
//!     branches:
//!       "1": ["radius: float"]
//!       "2": ["w: ushort", "h: ushort"]
//! ```
//!
//! Every declaration goes through the same validation as the programmatic
//! API. Transforms cannot be expressed in a document; register them on the
//! loaded [`Schema`] afterwards.

use crate::error::{CodecError, Result};
use crate::registry::DEFAULT_INDEX_TYPE;
use crate::schema::Schema;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Root document structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDocument {
    /// `"BE"` or `"LE"`; big-endian when absent.
    #[serde(default)]
    pub endian: Option<String>,

    /// Top-level field declarations.
    #[serde(default)]
    pub fields: Vec<String>,

    /// Composite types by name.
    #[serde(default)]
    pub types: BTreeMap<String, Vec<String>>,

    /// Variant types by name.
    #[serde(default)]
    pub variants: BTreeMap<String, VariantDocument>,
}

/// One variant in a document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariantDocument {
    /// Index type reference; `string` when absent.
    #[serde(default)]
    pub index: Option<String>,

    /// Branch field lists keyed by discriminant.
    #[serde(default)]
    pub branches: BTreeMap<String, Vec<String>>,
}

impl SchemaDocument {
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| CodecError::Document(format!("failed to parse YAML: {}", e)))
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| CodecError::Document(format!("failed to parse JSON: {}", e)))
    }

    /// Read a document from disk; `.json` files are JSON, anything else YAML.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            CodecError::Document(format!("failed to read {}: {}", path.display(), e))
        })?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
    }

    /// Compile the document into a schema.
    pub fn build(&self) -> Result<Schema> {
        let mut schema = Schema::new(&self.fields)?;

        for (name, fields) in &self.types {
            schema.define_composite(name, fields)?;
        }

        for (name, variant) in &self.variants {
            let index = variant.index.as_deref().unwrap_or(DEFAULT_INDEX_TYPE);
            schema.define_variant_index_type(name, index)?;
            for (key, fields) in &variant.branches {
                schema.define_variant_branch(name, key.as_str(), fields)?;
            }
        }

        if let Some(endian) = &self.endian {
            schema.set_default_endian(endian)?;
        }

        log::debug!(
            "[loader] built schema: {} field(s), {} type(s), {} variant(s)",
            self.fields.len(),
            self.types.len(),
            self.variants.len()
        );
        Ok(schema)
    }
}

impl Schema {
    /// Build a schema from a YAML document.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        SchemaDocument::from_yaml_str(content)?.build()
    }

    /// Build a schema from a JSON document.
    pub fn from_json_str(content: &str) -> Result<Self> {
        SchemaDocument::from_json_str(content)?.build()
    }

    /// Build a schema from a document file (format chosen by extension).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        SchemaDocument::load(path)?.build()
    }
}
