//! Fixed-size chunk pool over batched off-heap mappings

use std::{
    fmt,
    sync::{Mutex, MutexGuard, PoisonError},
};

use log::{debug, error, trace, warn};

use crate::{
    error::{ChunkPoolError, RejectedRelease, Result},
    memory::{MappedRegion, RegionMapper},
};

use super::{chunk::Chunk, config::ChunkPoolConfig, stats::ChunkPoolStats};

/// State guarded by the pool lock
#[derive(Default)]
struct FreeList {
    /// Free chunks, most recently released last
    chunks: Vec<Chunk>,
    /// Every batch region mapped so far
    regions: Vec<MappedRegion>,
    in_use: usize,
    peak_in_use: usize,
    acquisitions: u64,
    releases: u64,
    rejected_releases: u64,
}

/// Pool of equal-sized chunks carved from off-heap batch regions.
///
/// The pool grows one batch of `chunks_per_alloc` chunks at a time whenever
/// an acquire finds the free list empty. Regions are never returned to the
/// operating system, so the pool behaves as an arena with process lifetime:
/// dropping the pool leaks its regions rather than unmapping memory that a
/// caller may still hold.
pub struct ChunkPool {
    config: ChunkPoolConfig,
    batch_bytes: usize,
    mapper: Box<dyn RegionMapper>,
    state: Mutex<FreeList>,
}

impl ChunkPool {
    /// Create a pool whose regions come from the configured backing
    pub fn new(config: ChunkPoolConfig) -> Result<Self> {
        let mapper = config.backing.mapper();
        Self::with_mapper(config, mapper)
    }

    /// Create a pool with the default chunk size and batch granularity
    pub fn with_defaults() -> Result<Self> {
        Self::new(ChunkPoolConfig::default())
    }

    /// Create a pool over a caller-supplied mapper
    pub fn with_mapper(config: ChunkPoolConfig, mapper: Box<dyn RegionMapper>) -> Result<Self> {
        config.validate()?;
        let batch_bytes = config.batch_bytes()?;

        debug!(
            "chunk pool '{}': {} byte chunks, {} per batch, mapper {}",
            config.name,
            config.chunk_size,
            config.chunks_per_alloc,
            mapper.name()
        );

        Ok(Self {
            config,
            batch_bytes,
            mapper,
            state: Mutex::new(FreeList::default()),
        })
    }

    /// Take a chunk from the pool, mapping a new batch if none is free.
    ///
    /// Running out of memory here is unrecoverable: the failure is logged,
    /// written to stderr, and the process aborts.
    pub fn acquire(&self) -> Chunk {
        match self.try_acquire() {
            Ok(chunk) => chunk,
            Err(e) => {
                error!("chunk pool '{}': {}", self.config.name, e);
                // The host may not have a logger installed.
                eprintln!("chunk pool '{}': {}", self.config.name, e);
                std::process::abort()
            }
        }
    }

    /// Take a chunk from the pool, reporting a failed batch mapping
    /// instead of aborting. The pool is unchanged on error.
    pub fn try_acquire(&self) -> Result<Chunk> {
        let mut state = self.lock();
        let chunk = loop {
            if let Some(chunk) = state.chunks.pop() {
                break chunk;
            }
            self.map_batch(&mut state)?;
        };

        state.in_use += 1;
        state.peak_in_use = state.peak_in_use.max(state.in_use);
        state.acquisitions += 1;
        trace!("acquire {:#x}", chunk.address());

        Ok(chunk)
    }

    /// Return a chunk to the pool. `None` is accepted and ignored.
    ///
    /// The chunk is not checked: handing over a chunk from another pool
    /// silently adopts it. Use [`ChunkPool::try_release`] to verify
    /// provenance.
    pub fn release(&self, chunk: impl Into<Option<Chunk>>) {
        let Some(chunk): Option<Chunk> = chunk.into() else {
            return;
        };

        trace!("release {:#x}", chunk.address());
        let mut state = self.lock();
        state.chunks.push(chunk);
        state.in_use = state.in_use.saturating_sub(1);
        state.releases += 1;
    }

    /// Return a chunk to the pool after checking it was carved from one of
    /// this pool's regions. A rejected chunk comes back inside the error so
    /// it can be released to the pool that mapped it.
    pub fn try_release(
        &self,
        chunk: impl Into<Option<Chunk>>,
    ) -> std::result::Result<(), RejectedRelease> {
        let Some(chunk): Option<Chunk> = chunk.into() else {
            return Ok(());
        };

        let mut state = self.lock();
        if let Err(error) = self.check_provenance(&state, &chunk) {
            state.rejected_releases += 1;
            warn!("chunk pool '{}': rejected release: {}", self.config.name, error);
            return Err(RejectedRelease { chunk, error });
        }

        state.chunks.push(chunk);
        state.in_use = state.in_use.saturating_sub(1);
        state.releases += 1;
        Ok(())
    }

    /// Check if a chunk was carved from one of this pool's regions
    pub fn owns(&self, chunk: &Chunk) -> bool {
        let state = self.lock();
        self.check_provenance(&state, chunk).is_ok()
    }

    /// Map `batches` regions up front so later acquires skip the system call
    pub fn reserve(&self, batches: usize) -> Result<()> {
        let mut state = self.lock();
        for _ in 0..batches {
            self.map_batch(&mut state)?;
        }
        Ok(())
    }

    /// Get a consistent snapshot of pool statistics
    pub fn stats(&self) -> ChunkPoolStats {
        let state = self.lock();
        let total_chunks = state.regions.len() * self.config.chunks_per_alloc;
        ChunkPoolStats {
            chunk_size: self.config.chunk_size,
            batches_mapped: state.regions.len(),
            total_chunks,
            free_chunks: state.chunks.len(),
            in_use_chunks: state.in_use,
            peak_in_use: state.peak_in_use,
            acquisitions: state.acquisitions,
            releases: state.releases,
            rejected_releases: state.rejected_releases,
        }
    }

    /// Get pool configuration
    pub fn config(&self) -> &ChunkPoolConfig {
        &self.config
    }

    pub fn chunk_size(&self) -> usize {
        self.config.chunk_size
    }

    pub fn chunks_per_alloc(&self) -> usize {
        self.config.chunks_per_alloc
    }

    /// Bytes mapped per batch
    pub fn batch_bytes(&self) -> usize {
        self.batch_bytes
    }

    /// Number of chunks in the free list
    pub fn free_count(&self) -> usize {
        self.lock().chunks.len()
    }

    /// Number of chunks currently held by callers
    pub fn in_use_count(&self) -> usize {
        self.lock().in_use
    }

    /// Number of batch regions mapped so far
    pub fn batches_mapped(&self) -> usize {
        self.lock().regions.len()
    }

    /// Number of chunks carved out of all regions
    pub fn total_chunks(&self) -> usize {
        self.batches_mapped() * self.config.chunks_per_alloc
    }

    /// Total bytes mapped by the pool
    pub fn mapped_bytes(&self) -> usize {
        self.batches_mapped() * self.batch_bytes
    }

    // Nothing panics while the lock is held, so a poisoned guard still
    // protects a consistent free list.
    fn lock(&self) -> MutexGuard<'_, FreeList> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn map_batch(&self, state: &mut FreeList) -> Result<()> {
        let size = self.batch_bytes;
        let region = self
            .mapper
            .map(size)
            .map_err(|e| ChunkPoolError::mapping(size, self.mapper.name(), e))?;

        if region.len() != size {
            return Err(ChunkPoolError::mapping(
                size,
                self.mapper.name(),
                std::io::Error::other(format!("mapper returned {} bytes", region.len())),
            ));
        }

        let mapped = MappedRegion::new(region.as_ptr() as usize, size);
        debug!(
            "chunk pool '{}': mapped batch {} at {:#x} ({} bytes)",
            self.config.name,
            state.regions.len() + 1,
            mapped.base(),
            size
        );

        state.regions.push(mapped);
        state.chunks.reserve(self.config.chunks_per_alloc);
        // Reversed so consecutive acquires walk the region front to back.
        state.chunks.extend(
            region
                .chunks_exact_mut(self.config.chunk_size)
                .rev()
                .map(Chunk::new),
        );

        Ok(())
    }

    fn check_provenance(&self, state: &FreeList, chunk: &Chunk) -> Result<()> {
        let address = chunk.address();
        if chunk.len() != self.config.chunk_size {
            return Err(ChunkPoolError::misuse(
                address,
                chunk.len(),
                format!("expected length {}", self.config.chunk_size),
            ));
        }

        let offset = state
            .regions
            .iter()
            .find_map(|region| region.offset_of(address))
            .ok_or_else(|| {
                ChunkPoolError::misuse(address, chunk.len(), "not mapped by this pool")
            })?;

        if offset % self.config.chunk_size != 0 {
            return Err(ChunkPoolError::misuse(
                address,
                chunk.len(),
                "not on a chunk boundary",
            ));
        }

        Ok(())
    }
}

impl fmt::Debug for ChunkPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkPool")
            .field("name", &self.config.name)
            .field("chunk_size", &self.config.chunk_size)
            .field("chunks_per_alloc", &self.config.chunks_per_alloc)
            .field("mapper", &self.mapper.name())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashSet, io};

    use super::*;
    use crate::memory::{Backing, HeapMapper};

    fn small_pool(chunk_size: usize, chunks_per_alloc: usize) -> ChunkPool {
        let config = ChunkPoolConfig::new("test")
            .with_chunk_size(chunk_size)
            .with_chunks_per_alloc(chunks_per_alloc);
        ChunkPool::new(config).unwrap()
    }

    #[derive(Debug)]
    struct RefusingMapper;

    impl RegionMapper for RefusingMapper {
        fn map(&self, _len: usize) -> io::Result<&'static mut [u8]> {
            Err(io::Error::new(io::ErrorKind::OutOfMemory, "refused"))
        }

        fn name(&self) -> &'static str {
            "refusing"
        }
    }

    #[derive(Debug)]
    struct ShortMapper;

    impl RegionMapper for ShortMapper {
        fn map(&self, len: usize) -> io::Result<&'static mut [u8]> {
            HeapMapper.map(len / 2)
        }

        fn name(&self) -> &'static str {
            "short"
        }
    }

    #[test]
    fn test_new_pool_maps_nothing() {
        let pool = small_pool(64, 4);
        assert_eq!(pool.batches_mapped(), 0);
        assert_eq!(pool.free_count(), 0);
        assert_eq!(pool.mapped_bytes(), 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ChunkPoolConfig::new("bad").with_chunk_size(0);
        assert!(ChunkPool::new(config).is_err());
    }

    #[test]
    fn test_first_acquire_maps_one_batch() {
        let pool = small_pool(64, 4);
        let chunk = pool.acquire();

        assert_eq!(chunk.len(), 64);
        assert_eq!(pool.batches_mapped(), 1);
        assert_eq!(pool.free_count(), 3);
        assert_eq!(pool.in_use_count(), 1);
        assert_eq!(pool.mapped_bytes(), 256);
    }

    #[test]
    fn test_fresh_batch_walks_front_to_back() {
        let pool = small_pool(128, 4);
        let chunks: Vec<_> = (0..4).map(|_| pool.acquire()).collect();
        for pair in chunks.windows(2) {
            assert_eq!(pair[1].address() - pair[0].address(), 128);
        }
    }

    #[test]
    fn test_release_none_is_noop() {
        let pool = small_pool(64, 4);
        let _held = pool.acquire();
        let before = pool.stats();

        pool.release(None);
        assert!(pool.try_release(None).is_ok());

        assert_eq!(pool.stats(), before);
    }

    #[test]
    fn test_lifo_reuse() {
        let pool = small_pool(64, 8);
        let _a = pool.acquire();
        let b = pool.acquire();
        let addr = b.address();

        pool.release(b);
        let again = pool.acquire();
        assert_eq!(again.address(), addr);
    }

    #[test]
    fn test_reused_chunk_keeps_contents() {
        let pool = small_pool(32, 2);
        let mut chunk = pool.acquire();
        assert!(chunk.iter().all(|&b| b == 0));
        chunk.write(0, b"stale").unwrap();
        pool.release(chunk);

        let chunk = pool.acquire();
        assert_eq!(chunk.read(0, 5).unwrap(), b"stale");
    }

    #[test]
    fn test_refusing_mapper_reports_error() {
        let config = ChunkPoolConfig::new("refused")
            .with_chunk_size(64)
            .with_chunks_per_alloc(4);
        let pool = ChunkPool::with_mapper(config, Box::new(RefusingMapper)).unwrap();

        let err = pool.try_acquire().unwrap_err();
        assert!(err.is_mapping());
        assert!(err.to_string().contains("refusing"));

        let stats = pool.stats();
        assert_eq!(stats.batches_mapped, 0);
        assert_eq!(stats.in_use_chunks, 0);
        assert_eq!(stats.acquisitions, 0);
    }

    #[test]
    fn test_short_mapping_rejected() {
        let config = ChunkPoolConfig::new("short")
            .with_chunk_size(64)
            .with_chunks_per_alloc(4);
        let pool = ChunkPool::with_mapper(config, Box::new(ShortMapper)).unwrap();

        assert!(pool.try_acquire().unwrap_err().is_mapping());
        assert_eq!(pool.free_count(), 0);
    }

    #[test]
    fn test_try_release_accepts_own_chunk() {
        let pool = small_pool(64, 4);
        let chunk = pool.acquire();
        assert!(pool.owns(&chunk));

        pool.try_release(chunk).unwrap();
        assert_eq!(pool.in_use_count(), 0);
        assert_eq!(pool.free_count(), 4);
    }

    #[test]
    fn test_try_release_rejects_foreign_chunk() {
        let pool = small_pool(64, 4);
        let other = small_pool(64, 4);
        let _own = pool.acquire();
        let foreign = other.acquire();
        assert!(!pool.owns(&foreign));

        let rejected = pool.try_release(foreign).unwrap_err();
        assert!(matches!(rejected.error, ChunkPoolError::Misuse { .. }));

        let stats = pool.stats();
        assert_eq!(stats.free_chunks, 3);
        assert_eq!(stats.rejected_releases, 1);
        assert!(stats.is_consistent());

        // The refused chunk goes home to the pool that mapped it.
        other.try_release(rejected.into_chunk()).unwrap();
        let other_stats = other.stats();
        assert_eq!(other_stats.in_use_chunks, 0);
        assert_eq!(other_stats.free_chunks, 4);
        assert!(other_stats.is_consistent());
    }

    #[test]
    fn test_try_release_rejects_wrong_length() {
        let pool = small_pool(64, 4);
        let other = small_pool(32, 4);
        let _own = pool.acquire();

        let rejected = pool.try_release(other.acquire()).unwrap_err();
        assert!(rejected.to_string().contains("expected length 64"));
        assert_eq!(rejected.chunk.len(), 32);

        let err: ChunkPoolError = rejected.into();
        assert!(matches!(err, ChunkPoolError::Misuse { len: 32, .. }));
    }

    #[test]
    fn test_reserve_prewarms() {
        let pool = small_pool(64, 4);
        pool.reserve(3).unwrap();
        assert_eq!(pool.batches_mapped(), 3);
        assert_eq!(pool.free_count(), 12);

        let _chunk = pool.acquire();
        assert_eq!(pool.batches_mapped(), 3);
    }

    #[test]
    fn test_heap_backing() {
        let config = ChunkPoolConfig::new("heap")
            .with_chunk_size(256)
            .with_chunks_per_alloc(4)
            .with_backing(Backing::Heap);
        let pool = ChunkPool::new(config).unwrap();

        let chunks: Vec<_> = (0..9).map(|_| pool.acquire()).collect();
        assert_eq!(pool.batches_mapped(), 3);

        let addresses: HashSet<_> = chunks.iter().map(Chunk::address).collect();
        assert_eq!(addresses.len(), 9);
    }

    #[test]
    fn test_stats_track_peak() {
        let pool = small_pool(64, 4);
        let a = pool.acquire();
        let b = pool.acquire();
        let c = pool.acquire();
        pool.release(a);
        pool.release(b);

        let stats = pool.stats();
        assert_eq!(stats.peak_in_use, 3);
        assert_eq!(stats.in_use_chunks, 1);
        assert_eq!(stats.acquisitions, 3);
        assert_eq!(stats.releases, 2);
        assert!(stats.is_consistent());
        drop(c);
    }
}
