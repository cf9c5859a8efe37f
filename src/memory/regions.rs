//! Batch region mapping
//!
//! A batch region is obtained once and never given back: mappers leak the
//! region to `'static` so chunks carved from it stay valid for the rest of the
//! process, whatever happens to the pool that mapped them.

use std::{fmt, io};

use memmap2::MmapMut;

/// Source of batch regions
pub trait RegionMapper: Send + Sync + fmt::Debug {
    /// Map `len` bytes of zeroed, writable, process-private memory.
    ///
    /// The returned slice must be exactly `len` bytes long and must not alias
    /// any memory handed out before.
    fn map(&self, len: usize) -> io::Result<&'static mut [u8]>;

    /// Name used in logs and errors
    fn name(&self) -> &'static str;
}

/// Anonymous private mappings straight from the OS virtual-memory facility
#[derive(Debug, Clone, Copy, Default)]
pub struct AnonymousMapper;

impl RegionMapper for AnonymousMapper {
    fn map(&self, len: usize) -> io::Result<&'static mut [u8]> {
        let mmap = MmapMut::map_anon(len)?;
        // Never unmapped.
        let region: &'static mut MmapMut = Box::leak(Box::new(mmap));
        Ok(&mut region[..])
    }

    fn name(&self) -> &'static str {
        "anonymous-mmap"
    }
}

/// Zeroed heap allocations, leaked for the process lifetime
#[derive(Debug, Clone, Copy, Default)]
pub struct HeapMapper;

impl RegionMapper for HeapMapper {
    fn map(&self, len: usize) -> io::Result<&'static mut [u8]> {
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|e| io::Error::new(io::ErrorKind::OutOfMemory, e))?;
        data.resize(len, 0u8);
        Ok(Box::leak(data.into_boxed_slice()))
    }

    fn name(&self) -> &'static str {
        "heap"
    }
}

/// Address range of one mapped batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappedRegion {
    base: usize,
    len: usize,
}

impl MappedRegion {
    pub fn new(base: usize, len: usize) -> Self {
        Self { base, len }
    }

    /// First address of the region
    pub fn base(&self) -> usize {
        self.base
    }

    /// Length of the region in bytes
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// One past the last address of the region
    pub fn end(&self) -> usize {
        self.base + self.len
    }

    /// Check if `address` falls inside the region
    pub fn contains(&self, address: usize) -> bool {
        address >= self.base && address < self.end()
    }

    /// Offset of `address` from the region base, if inside
    pub fn offset_of(&self, address: usize) -> Option<usize> {
        self.contains(address).then(|| address - self.base)
    }
}
