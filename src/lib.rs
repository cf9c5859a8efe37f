//! # offheap-chunks - Fixed-Size Off-Heap Chunk Pool
//!
//! A pool that hands out equal-sized memory chunks and takes them back on
//! explicit release. It backs byte-oriented caches that keep their entries
//! outside the process heap, so the heap never grows with cache size.
//!
//! ## Features
//!
//! - **Batched mapping**: memory comes from the OS in regions of
//!   `chunk_size * chunks_per_alloc` bytes, amortizing the system call
//! - **LIFO free list**: the most recently released chunk is reused first
//! - **Owned chunks**: a [`Chunk`] is an exclusive, length-checked handle;
//!   the borrow checker rules out aliasing
//! - **Process-lifetime arena**: regions are never unmapped
//! - **Optional provenance checks**: [`ChunkPool::try_release`]
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────┐
//! │            cache (external)               │
//! └───────────────┬───────────────▲───────────┘
//!         acquire │               │ release
//!                 ▼               │
//! ┌───────────────────────────────────────────┐
//! │  ChunkPool                                │
//! │  Mutex<free list (LIFO)>                  │
//! └───────────────┬───────────────────────────┘
//!    empty? map   │
//!                 ▼
//! ┌───────────────────────────────────────────┐
//! │  RegionMapper (anonymous mmap / heap)     │
//! └───────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use offheap_chunks::{ChunkPool, ChunkPoolConfig};
//!
//! # fn main() -> offheap_chunks::Result<()> {
//! let pool = ChunkPool::new(
//!     ChunkPoolConfig::new("example")
//!         .with_chunk_size(4096)
//!         .with_chunks_per_alloc(16),
//! )?;
//!
//! let mut chunk = pool.acquire();
//! chunk.write(0, b"entry")?;
//! pool.release(chunk);
//! # Ok(())
//! # }
//! ```

pub mod allocators;
pub mod chunks;
pub mod error;
pub mod memory;

// Main API re-exports
pub use allocators::{ChunkAllocator, ChunkAllocatorExt};
pub use chunks::{
    Chunk, ChunkPool, ChunkPoolConfig, ChunkPoolConfigBuilder, ChunkPoolStats, CHUNKS_PER_ALLOC,
    CHUNK_SIZE,
};
pub use error::{ChunkPoolError, RejectedRelease, Result};
pub use memory::{AnonymousMapper, Backing, HeapMapper, MappedRegion, RegionMapper};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
