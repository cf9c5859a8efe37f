//! Allocator seam between the chunk pool and the cache built on it

pub mod traits;

pub use traits::{ChunkAllocator, ChunkAllocatorExt};
