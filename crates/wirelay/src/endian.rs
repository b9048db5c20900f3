// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Byte order selection.
//!
//! Numeric primitives always use the instance byte order at the moment of the
//! call. An array dimension marked `!` inverts that order for its own length
//! prefix only; elements keep the instance order.

use crate::error::CodecError;
use crate::grammar::Dimension;
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use std::fmt;
use std::str::FromStr;

/// Byte order of multi-byte fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Endian {
    #[default]
    Big,
    Little,
}

impl Endian {
    pub fn inverted(self) -> Self {
        match self {
            Self::Big => Self::Little,
            Self::Little => Self::Big,
        }
    }

    /// Byte order of a dimension's length prefix under this instance order.
    pub fn for_prefix(self, dimension: &Dimension) -> Self {
        if dimension.invert_endian {
            self.inverted()
        } else {
            self
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Big => "BE",
            Self::Little => "LE",
        }
    }
}

impl fmt::Display for Endian {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Endian {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BE" => Ok(Self::Big),
            "LE" => Ok(Self::Little),
            other => Err(CodecError::InvalidEndian(other.to_string())),
        }
    }
}

/// Dispatch a `byteorder::ByteOrder` associated function on an [`Endian`].
macro_rules! with_order {
    ($endian:expr, $method:ident ( $($arg:expr),* )) => {
        match $endian {
            Endian::Big => BigEndian::$method($($arg),*),
            Endian::Little => LittleEndian::$method($($arg),*),
        }
    };
}

// Writers append exactly the field width to `out`.

pub(crate) fn put_u16(out: &mut Vec<u8>, endian: Endian, v: u16) {
    let mut buf = [0u8; 2];
    with_order!(endian, write_u16(&mut buf, v));
    out.extend_from_slice(&buf);
}

pub(crate) fn put_f32(out: &mut Vec<u8>, endian: Endian, v: f32) {
    let mut buf = [0u8; 4];
    with_order!(endian, write_f32(&mut buf, v));
    out.extend_from_slice(&buf);
}

pub(crate) fn put_f64(out: &mut Vec<u8>, endian: Endian, v: f64) {
    let mut buf = [0u8; 8];
    with_order!(endian, write_f64(&mut buf, v));
    out.extend_from_slice(&buf);
}

/// Unsigned integer of `width` bytes (1..=8). `v` must fit the width.
pub(crate) fn put_uint(out: &mut Vec<u8>, endian: Endian, v: u64, width: usize) {
    let mut buf = [0u8; 8];
    with_order!(endian, write_uint(&mut buf[..width], v, width));
    out.extend_from_slice(&buf[..width]);
}

// Readers take a slice of exactly the field width.

pub(crate) fn get_u16(bytes: &[u8], endian: Endian) -> u16 {
    with_order!(endian, read_u16(bytes))
}

pub(crate) fn get_u32(bytes: &[u8], endian: Endian) -> u32 {
    with_order!(endian, read_u32(bytes))
}

pub(crate) fn get_u64(bytes: &[u8], endian: Endian) -> u64 {
    with_order!(endian, read_u64(bytes))
}

pub(crate) fn get_f32(bytes: &[u8], endian: Endian) -> f32 {
    with_order!(endian, read_f32(bytes))
}

pub(crate) fn get_f64(bytes: &[u8], endian: Endian) -> f64 {
    with_order!(endian, read_f64(bytes))
}

pub(crate) fn get_uint(bytes: &[u8], endian: Endian) -> u64 {
    with_order!(endian, read_uint(bytes, bytes.len()))
}
