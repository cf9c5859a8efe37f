//! Fixed-size chunks and the pool that hands them out
//!
//! A [`ChunkPool`] maps memory in batches of `chunks_per_alloc` chunks and
//! keeps released chunks on a LIFO free list for reuse.

pub mod chunk;
pub mod config;
pub mod pool;
pub mod stats;

// Re-export main types
pub use chunk::Chunk;
pub use config::{ChunkPoolConfig, ChunkPoolConfigBuilder, CHUNKS_PER_ALLOC, CHUNK_SIZE};
pub use pool::ChunkPool;
pub use stats::ChunkPoolStats;
