use std::ops::Range;

use crate::fs::FsError;

/// Implements a bump allocation policy over a single contiguous byte region.
/// Every request is served from the current offset, which only ever moves
/// forward. Ranges are never handed back, so a retired range stays dead until
/// the arena itself is dropped.
///
/// ## Other Allocation Policies
///
/// 1. A free list of retired ranges, reused first-fit by later writes.
/// 2. Compaction that slides live ranges down over retired ones and patches
///    the offsets stored in the entry table.
pub struct Arena {
    /// Backing storage, allocated to full capacity up front.
    bytes: Box<[u8]>,
    /// Bytes handed out so far. Everything in `[0, used)` belongs to some
    /// live or retired range.
    used: usize,
}

impl Arena {
    pub fn new(capacity: usize) -> Self {
        Self {
            bytes: vec![0; capacity].into_boxed_slice(),
            used: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    pub fn used(&self) -> usize {
        self.used
    }

    pub fn remaining(&self) -> usize {
        self.capacity() - self.used
    }

    /// Reserves `size` bytes at the bump offset.
    ///
    /// # Errors
    ///
    /// Returns `ArenaExhausted` without moving the offset when the request
    /// does not fit in what is left.
    pub fn alloc(&mut self, size: usize) -> Result<Range<usize>, FsError> {
        if size > self.remaining() {
            return Err(FsError::ArenaExhausted {
                requested: size,
                remaining: self.remaining(),
            });
        }
        let start = self.used;
        self.used += size;
        Ok(start..self.used)
    }

    pub fn slice(&self, range: Range<usize>) -> &[u8] {
        &self.bytes[range]
    }

    pub fn slice_mut(&mut self, range: Range<usize>) -> &mut [u8] {
        &mut self.bytes[range]
    }
}
