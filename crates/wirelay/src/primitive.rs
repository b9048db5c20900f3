// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Built-in primitive layouts.

use std::fmt;

/// Closed set of built-in primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Boolean,
    Char,
    Byte,
    UByte,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    Float,
    Double,
    /// 2-byte unsigned length prefix followed by the raw bytes.
    String,
}

impl PrimitiveKind {
    /// Every primitive, in declaration order.
    pub const ALL: [PrimitiveKind; 13] = [
        Self::Boolean,
        Self::Char,
        Self::Byte,
        Self::UByte,
        Self::Short,
        Self::UShort,
        Self::Int,
        Self::UInt,
        Self::Long,
        Self::ULong,
        Self::Float,
        Self::Double,
        Self::String,
    ];

    /// Byte width of the length prefix of [`PrimitiveKind::String`].
    pub const STRING_PREFIX_WIDTH: usize = 2;

    /// Look up a primitive by its schema name.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "boolean" => Self::Boolean,
            "char" => Self::Char,
            "byte" => Self::Byte,
            "ubyte" => Self::UByte,
            "short" => Self::Short,
            "ushort" => Self::UShort,
            "int" => Self::Int,
            "uint" => Self::UInt,
            "long" => Self::Long,
            "ulong" => Self::ULong,
            "float" => Self::Float,
            "double" => Self::Double,
            "string" => Self::String,
            _ => return None,
        })
    }

    /// Schema name of the primitive.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Char => "char",
            Self::Byte => "byte",
            Self::UByte => "ubyte",
            Self::Short => "short",
            Self::UShort => "ushort",
            Self::Int => "int",
            Self::UInt => "uint",
            Self::Long => "long",
            Self::ULong => "ulong",
            Self::Float => "float",
            Self::Double => "double",
            Self::String => "string",
        }
    }

    /// Fixed byte width (for strings: the width of the length prefix).
    pub fn width(&self) -> usize {
        match self {
            Self::Boolean | Self::Char | Self::Byte | Self::UByte => 1,
            Self::Short | Self::UShort => 2,
            Self::Int | Self::UInt | Self::Float => 4,
            Self::Long | Self::ULong | Self::Double => 8,
            Self::String => Self::STRING_PREFIX_WIDTH,
        }
    }

    /// Inclusive range of an integer primitive.
    pub fn int_range(&self) -> Option<(i128, i128)> {
        match self {
            Self::Byte => Some((i8::MIN.into(), i8::MAX.into())),
            Self::UByte => Some((0, u8::MAX.into())),
            Self::Short => Some((i16::MIN.into(), i16::MAX.into())),
            Self::UShort => Some((0, u16::MAX.into())),
            Self::Int => Some((i32::MIN.into(), i32::MAX.into())),
            Self::UInt => Some((0, u32::MAX.into())),
            Self::Long => Some((i64::MIN.into(), i64::MAX.into())),
            Self::ULong => Some((0, u64::MAX.into())),
            _ => None,
        }
    }

    pub fn is_integer(&self) -> bool {
        self.int_range().is_some()
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Self::Float | Self::Double)
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
