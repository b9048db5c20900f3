// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type registry: user-defined composites, variants and transforms.
//!
//! Built-in primitives live in the closed [`PrimitiveKind`] enum; only
//! user-defined names are looked up here. Resolution order is primitive,
//! composite, variant. A user definition whose name collides with a primitive
//! is stored but never resolved (a warning is logged when it is defined).

use crate::error::{Result, TransformError};
use crate::grammar::{parse_field_list, parse_type_ref, FieldDecl, TypeRef};
use crate::primitive::PrimitiveKind;
use crate::value::{Discriminant, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Index type given to variants created implicitly by a branch definition.
pub const DEFAULT_INDEX_TYPE: &str = "string";

type PreFn = dyn Fn(&Value) -> std::result::Result<Value, TransformError> + Send + Sync;
type PostFn = dyn Fn(Value) -> std::result::Result<Value, TransformError> + Send + Sync;

/// Pre-encode / post-decode function pair attached to a type name.
///
/// `pre` maps the caller's value to the shape the engine encodes; `post` maps
/// the decoded shape back. Round-trip correctness is the caller's concern.
#[derive(Clone)]
pub struct Transform {
    pre: Arc<PreFn>,
    post: Arc<PostFn>,
}

impl Transform {
    pub fn new<Pre, Post>(pre: Pre, post: Post) -> Self
    where
        Pre: Fn(&Value) -> std::result::Result<Value, TransformError> + Send + Sync + 'static,
        Post: Fn(Value) -> std::result::Result<Value, TransformError> + Send + Sync + 'static,
    {
        Self {
            pre: Arc::new(pre),
            post: Arc::new(post),
        }
    }

    pub fn pre(&self, value: &Value) -> std::result::Result<Value, TransformError> {
        (self.pre)(value)
    }

    pub fn post(&self, value: Value) -> std::result::Result<Value, TransformError> {
        (self.post)(value)
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transform").finish_non_exhaustive()
    }
}

/// Ordered field list of a user-defined aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct Composite {
    pub fields: Vec<FieldDecl>,
}

/// Tagged union: an index value selects one field list.
#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    pub index_type: TypeRef,
    /// Keyed by [`Discriminant::to_branch_key`].
    pub branches: HashMap<Discriminant, Vec<FieldDecl>>,
}

impl Variant {
    fn with_index(index_type: TypeRef) -> Self {
        Self {
            index_type,
            branches: HashMap::new(),
        }
    }

    /// Field list selected by `discriminant`. `"1"` and `1` select the same
    /// branch (see [`Discriminant::to_branch_key`]).
    pub fn branch(&self, discriminant: &Discriminant) -> Option<&[FieldDecl]> {
        let found = match discriminant.as_branch_int() {
            Some(v) => self.branches.get(&Discriminant::Int(v)),
            None => self.branches.get(discriminant),
        };
        found.map(Vec::as_slice)
    }
}

/// What a type name resolves to.
#[derive(Debug, Clone, Copy)]
pub enum Resolved<'r> {
    Primitive(PrimitiveKind),
    Composite(&'r Composite),
    Variant(&'r Variant),
}

/// Open table of user-defined type names.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    composites: HashMap<String, Composite>,
    variants: HashMap<String, Variant>,
    transforms: HashMap<String, Transform>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or overwrite) a composite. Nothing is registered if any
    /// declaration is malformed.
    pub fn define_composite<I, S>(&mut self, name: &str, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let fields = parse_field_list(fields)?;
        warn_if_shadowed(name);
        log::debug!(
            "[registry] composite '{}' defined with {} field(s)",
            name,
            fields.len()
        );
        self.composites
            .insert(name.to_string(), Composite { fields });
        Ok(())
    }

    /// Register (or overwrite) the transform pair of a type name.
    pub fn define_transform(&mut self, name: &str, transform: Transform) {
        log::debug!("[registry] transform registered for '{}'", name);
        self.transforms.insert(name.to_string(), transform);
    }

    /// Create a variant with the given index type, or update only the index
    /// type of an existing one.
    pub fn define_variant_index_type(&mut self, name: &str, index_type: &str) -> Result<()> {
        let index_type = parse_type_ref(index_type)?;
        log::debug!(
            "[registry] variant '{}' index type set to '{}'",
            name,
            index_type
        );
        match self.variants.get_mut(name) {
            Some(variant) => variant.index_type = index_type,
            None => {
                warn_if_shadowed(name);
                self.variants
                    .insert(name.to_string(), Variant::with_index(index_type));
            }
        }
        Ok(())
    }

    /// Register (or overwrite) one branch of a variant, creating the variant
    /// with a string index type if needed. Nothing is registered if any
    /// declaration is malformed.
    pub fn define_variant_branch<I, S>(
        &mut self,
        name: &str,
        discriminant: impl Into<Discriminant>,
        fields: I,
    ) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let fields = parse_field_list(fields)?;
        let discriminant = discriminant.into().to_branch_key();
        log::debug!(
            "[registry] variant '{}' branch {} defined with {} field(s)",
            name,
            discriminant,
            fields.len()
        );
        let variant = self.variants.entry(name.to_string()).or_insert_with(|| {
            warn_if_shadowed(name);
            Variant::with_index(TypeRef::scalar(DEFAULT_INDEX_TYPE))
        });
        variant.branches.insert(discriminant, fields);
        Ok(())
    }

    /// Resolve a type name: primitive, then composite, then variant.
    pub fn resolve(&self, name: &str) -> Option<Resolved<'_>> {
        if let Some(kind) = PrimitiveKind::from_name(name) {
            return Some(Resolved::Primitive(kind));
        }
        if let Some(composite) = self.composites.get(name) {
            return Some(Resolved::Composite(composite));
        }
        self.variants.get(name).map(Resolved::Variant)
    }

    pub fn composite(&self, name: &str) -> Option<&Composite> {
        self.composites.get(name)
    }

    pub fn variant(&self, name: &str) -> Option<&Variant> {
        self.variants.get(name)
    }

    pub fn transform(&self, name: &str) -> Option<&Transform> {
        self.transforms.get(name)
    }

    /// Names of every composite, sorted.
    pub fn composite_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.composites.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Names of every variant, sorted.
    pub fn variant_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.variants.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

fn warn_if_shadowed(name: &str) {
    if PrimitiveKind::from_name(name).is_some() {
        log::warn!(
            "[registry] '{}' is a built-in primitive; the user definition will never be resolved",
            name
        );
    }
}
