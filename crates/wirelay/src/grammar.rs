// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Field declaration grammar.
//!
//! ```text
//! field := key ":" ws* typeName ws* dims*
//! dims  := "[" "!"? digit(1-6) "]"
//! ```
//!
//! `key` and `typeName` are ASCII identifiers (`[A-Za-z0-9_]`). Dimensions
//! read left to right nest outermost to innermost; the digit is the byte
//! width of that array's length prefix and `!` inverts the instance byte
//! order for that one prefix.

use crate::error::{CodecError, Result};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Smallest allowed length-prefix width in bytes.
pub const MIN_PREFIX_WIDTH: u8 = 1;
/// Largest allowed length-prefix width in bytes.
pub const MAX_PREFIX_WIDTH: u8 = 6;

fn field_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([A-Za-z0-9_]+)\s*:\s*([A-Za-z0-9_]+\s*(?:\[!?[1-6]\]\s*)*)$")
            .expect("static regex")
    })
}

fn type_ref_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([A-Za-z0-9_]+)\s*((?:\[!?[1-6]\]\s*)*)$").expect("static regex")
    })
}

fn dimension_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\[(!?)([1-6])\]").expect("static regex"))
}

/// One array nesting level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimension {
    /// Byte width of the length prefix (1..=6).
    pub prefix_width: u8,
    /// Write/read this prefix in the opposite of the instance byte order.
    pub invert_endian: bool,
}

impl Dimension {
    pub fn new(prefix_width: u8, invert_endian: bool) -> Self {
        debug_assert!((MIN_PREFIX_WIDTH..=MAX_PREFIX_WIDTH).contains(&prefix_width));
        Self {
            prefix_width,
            invert_endian,
        }
    }

    /// Largest array length the prefix can represent: `2^(8*width) - 1`.
    pub fn max_len(&self) -> u64 {
        (1u64 << (8 * u32::from(self.prefix_width))) - 1
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bang = if self.invert_endian { "!" } else { "" };
        write!(f, "[{}{}]", bang, self.prefix_width)
    }
}

/// A type name with its array dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeRef {
    pub name: String,
    pub dimensions: Vec<Dimension>,
}

impl TypeRef {
    pub fn scalar(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dimensions: Vec::new(),
        }
    }

    pub fn is_array(&self) -> bool {
        !self.dimensions.is_empty()
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        for dim in &self.dimensions {
            write!(f, "{}", dim)?;
        }
        Ok(())
    }
}

impl FromStr for TypeRef {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self> {
        parse_type_ref(s)
    }
}

/// A parsed `key: type[dims]` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldDecl {
    pub key: String,
    pub ty: TypeRef,
}

impl fmt::Display for FieldDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.ty)
    }
}

impl FromStr for FieldDecl {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self> {
        parse_field_declaration(s)
    }
}

/// Parse a `key: type[dims]` declaration.
pub fn parse_field_declaration(declaration: &str) -> Result<FieldDecl> {
    let Some(caps) = field_pattern().captures(declaration) else {
        return Err(CodecError::syntax(
            declaration,
            diagnose_field(declaration),
        ));
    };
    let key = caps[1].to_string();
    let (name, dims) = split_type_ref_in(&caps[2], declaration)?;
    Ok(FieldDecl {
        key,
        ty: TypeRef {
            name: name.to_string(),
            dimensions: parse_dimensions_in(dims, declaration)?,
        },
    })
}

/// Parse every declaration of a list, failing on the first malformed one.
pub fn parse_field_list<I, S>(declarations: I) -> Result<Vec<FieldDecl>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let fields = declarations
        .into_iter()
        .map(|d| parse_field_declaration(d.as_ref()))
        .collect::<Result<Vec<_>>>()?;

    for (i, field) in fields.iter().enumerate() {
        if fields[..i].iter().any(|f| f.key == field.key) {
            return Err(CodecError::syntax(
                &field.to_string(),
                format!("duplicate key {:?} in declaration list", field.key),
            ));
        }
    }
    Ok(fields)
}

/// Split a type reference into its name and its raw dimension markers.
pub fn split_type_ref(type_ref: &str) -> Result<(&str, &str)> {
    split_type_ref_in(type_ref, type_ref)
}

/// Parse a bare type reference such as `point[2][!1]`.
pub fn parse_type_ref(type_ref: &str) -> Result<TypeRef> {
    let (name, dims) = split_type_ref(type_ref)?;
    Ok(TypeRef {
        name: name.to_string(),
        dimensions: parse_dimensions_in(dims, type_ref)?,
    })
}

/// Decompose repeated `[!?N]` groups, outermost first.
pub fn parse_dimensions(dimensions: &str) -> Result<Vec<Dimension>> {
    parse_dimensions_in(dimensions, dimensions)
}

fn split_type_ref_in<'a>(type_ref: &'a str, declaration: &str) -> Result<(&'a str, &'a str)> {
    let Some(caps) = type_ref_pattern().captures(type_ref) else {
        return Err(CodecError::syntax(declaration, diagnose_type_ref(type_ref)));
    };
    let name = caps.get(1).map_or("", |m| m.as_str());
    let dims = caps.get(2).map_or("", |m| m.as_str());
    Ok((name, dims))
}

fn parse_dimensions_in(dimensions: &str, declaration: &str) -> Result<Vec<Dimension>> {
    let mut parsed = Vec::new();
    let mut last_end = 0;

    for caps in dimension_pattern().captures_iter(dimensions) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if !dimensions[last_end..whole.start()].trim().is_empty() {
            return Err(CodecError::syntax(
                declaration,
                format!(
                    "unexpected characters {:?} in dimensions",
                    dimensions[last_end..whole.start()].trim()
                ),
            ));
        }
        let width = caps[2]
            .parse::<u8>()
            .map_err(|_| CodecError::syntax(declaration, "invalid prefix width"))?;
        parsed.push(Dimension::new(width, !caps[1].is_empty()));
        last_end = whole.end();
    }

    let rest = dimensions[last_end..].trim();
    if !rest.is_empty() {
        return Err(CodecError::syntax(declaration, dimension_reason(rest)));
    }
    Ok(parsed)
}

fn diagnose_field(declaration: &str) -> String {
    let Some((key, type_ref)) = declaration.split_once(':') else {
        return "missing ':' between key and type".to_string();
    };
    let key = key.trim_end();
    if key.is_empty() {
        return "missing key before ':'".to_string();
    }
    if !is_identifier(key) {
        return format!("key {:?} is not an identifier", key);
    }
    diagnose_type_ref(type_ref.trim_start())
}

fn diagnose_type_ref(type_ref: &str) -> String {
    let name_end = type_ref
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(type_ref.len());
    if name_end == 0 {
        return "missing type name".to_string();
    }
    let rest = type_ref[name_end..].trim();
    if rest.starts_with('[') {
        dimension_reason(rest)
    } else {
        format!("unexpected characters {:?} after type name", rest)
    }
}

fn dimension_reason(fragment: &str) -> String {
    let inner = fragment
        .trim_start_matches('[')
        .split(']')
        .next()
        .unwrap_or("")
        .trim_start_matches('!');
    match inner.parse::<i64>() {
        Ok(width) if !(1..=6).contains(&width) => format!(
            "array prefix width {} outside {}..={}",
            width, MIN_PREFIX_WIDTH, MAX_PREFIX_WIDTH
        ),
        _ => format!("malformed dimension {:?}", fragment),
    }
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
