// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Read cursor over a byte sequence.

/// Bytes requested past the end of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Shortfall {
    pub offset: usize,
    pub need: usize,
    pub available: usize,
}

/// Bounds-checked, zero-copy read cursor.
///
/// The offset only moves forward, and only after a successful read.
#[derive(Debug)]
pub(crate) struct Cursor<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }

    /// Take the next `count` bytes.
    pub fn take(&mut self, count: usize) -> Result<&'a [u8], Shortfall> {
        if count > self.remaining() {
            return Err(Shortfall {
                offset: self.offset,
                need: count,
                available: self.remaining(),
            });
        }
        let slice = &self.buffer[self.offset..self.offset + count];
        self.offset += count;
        Ok(slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_advances() {
        let data = [1u8, 2, 3, 4];
        let mut cursor = Cursor::new(&data);
        assert_eq!(cursor.take(1).expect("take"), &[1]);
        assert_eq!(cursor.take(2).expect("take"), &[2, 3]);
        assert_eq!(cursor.offset(), 3);
        assert_eq!(cursor.remaining(), 1);
    }

    #[test]
    fn test_underrun_leaves_offset() {
        let data = [1u8, 2];
        let mut cursor = Cursor::new(&data);
        cursor.take(1).expect("take");
        let short = cursor.take(4).expect_err("underrun");
        assert_eq!(
            short,
            Shortfall {
                offset: 1,
                need: 4,
                available: 1
            }
        );
        assert_eq!(cursor.offset(), 1);
        assert_eq!(cursor.take(0).expect("empty take"), &[] as &[u8]);
    }
}
