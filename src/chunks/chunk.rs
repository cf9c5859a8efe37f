//! Owned handle to one fixed-size chunk

use std::{
    fmt,
    ops::{Deref, DerefMut},
};

use crate::error::{ChunkPoolError, Result};

/// Exclusive handle to `chunk_size` bytes of off-heap memory.
///
/// Only a [`crate::ChunkPool`] creates chunks. A chunk is not `Clone`, so at
/// most one owner can see its bytes at a time; returning it with
/// [`crate::ChunkPool::release`] consumes the handle. Dropping a chunk
/// without releasing it does not free anything: the bytes stay mapped and
/// are simply lost to the pool.
pub struct Chunk {
    data: &'static mut [u8],
}

impl Chunk {
    pub(crate) fn new(data: &'static mut [u8]) -> Self {
        Self { data }
    }

    /// Length in bytes, always the owning pool's chunk size
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false for chunks handed out by a pool
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get a raw pointer to the chunk data
    pub fn as_ptr(&self) -> *const u8 {
        self.data.as_ptr()
    }

    /// Get a mutable raw pointer to the chunk data
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.data.as_mut_ptr()
    }

    /// Start address, used for identity and provenance checks
    pub fn address(&self) -> usize {
        self.data.as_ptr() as usize
    }

    pub fn as_slice(&self) -> &[u8] {
        &*self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut *self.data
    }

    /// Whether two chunks share any byte of memory
    pub fn overlaps(&self, other: &Chunk) -> bool {
        let (a, b) = (self.address(), other.address());
        a < b + other.len() && b < a + self.len()
    }

    /// Copy `data` into the chunk starting at `offset`
    pub fn write(&mut self, offset: usize, data: &[u8]) -> Result<()> {
        let end = offset
            .checked_add(data.len())
            .filter(|&end| end <= self.len())
            .ok_or_else(|| {
                ChunkPoolError::insufficient_space(data.len(), self.len().saturating_sub(offset))
            })?;
        self.data[offset..end].copy_from_slice(data);
        Ok(())
    }

    /// Borrow `len` bytes starting at `offset`
    pub fn read(&self, offset: usize, len: usize) -> Result<&[u8]> {
        offset
            .checked_add(len)
            .filter(|&end| end <= self.len())
            .map(|end| &self.data[offset..end])
            .ok_or_else(|| {
                ChunkPoolError::insufficient_space(len, self.len().saturating_sub(offset))
            })
    }

    /// Zero the chunk contents
    pub fn zero(&mut self) {
        self.data.fill(0);
    }
}

impl fmt::Debug for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chunk")
            .field("address", &format_args!("{:#x}", self.address()))
            .field("len", &self.len())
            .finish()
    }
}

impl Deref for Chunk {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &*self.data
    }
}

impl DerefMut for Chunk {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut *self.data
    }
}

impl AsRef<[u8]> for Chunk {
    fn as_ref(&self) -> &[u8] {
        &*self.data
    }
}

impl AsMut<[u8]> for Chunk {
    fn as_mut(&mut self) -> &mut [u8] {
        &mut *self.data
    }
}
