//! Chunk allocator trait definition

use crate::chunks::{Chunk, ChunkPool};

/// The acquire/release contract a cache builds on
pub trait ChunkAllocator: Send + Sync + std::fmt::Debug {
    /// Hand out one chunk of exactly [`ChunkAllocator::chunk_size`] bytes
    fn acquire(&self) -> Chunk;

    /// Take a chunk back; `None` is a no-op
    fn release(&self, chunk: Option<Chunk>);

    /// Size of every chunk this allocator hands out
    fn chunk_size(&self) -> usize;

    /// Get allocator type name for debugging
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Common chunk allocator operations
pub trait ChunkAllocatorExt: ChunkAllocator {
    /// Acquire a chunk with its previous contents cleared
    fn acquire_zeroed(&self) -> Chunk {
        let mut chunk = self.acquire();
        chunk.zero();
        chunk
    }

    /// Run `f` with a borrowed chunk, releasing it afterwards
    fn with_chunk<R>(&self, f: impl FnOnce(&mut Chunk) -> R) -> R {
        let mut chunk = self.acquire();
        let result = f(&mut chunk);
        self.release(Some(chunk));
        result
    }
}

// Blanket implementation for all chunk allocators
impl<T: ChunkAllocator + ?Sized> ChunkAllocatorExt for T {}

impl ChunkAllocator for ChunkPool {
    fn acquire(&self) -> Chunk {
        ChunkPool::acquire(self)
    }

    fn release(&self, chunk: Option<Chunk>) {
        ChunkPool::release(self, chunk)
    }

    fn chunk_size(&self) -> usize {
        ChunkPool::chunk_size(self)
    }
}
