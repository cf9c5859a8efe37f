//! Chunk pool statistics

/// Point-in-time view of a chunk pool, taken under the pool lock
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkPoolStats {
    /// Size of each chunk in bytes
    pub chunk_size: usize,
    /// Number of batch regions mapped so far
    pub batches_mapped: usize,
    /// Chunks carved out of all batch regions
    pub total_chunks: usize,
    /// Chunks sitting in the free list
    pub free_chunks: usize,
    /// Chunks currently held by callers
    pub in_use_chunks: usize,
    /// Highest number of chunks held at once
    pub peak_in_use: usize,
    /// Successful acquisitions
    pub acquisitions: u64,
    /// Chunks returned to the free list
    pub releases: u64,
    /// Releases refused by provenance checks
    pub rejected_releases: u64,
}

impl ChunkPoolStats {
    /// Total bytes mapped by the pool
    pub fn mapped_bytes(&self) -> usize {
        self.total_chunks * self.chunk_size
    }

    /// Fraction of mapped chunks in use (0.0 to 1.0)
    pub fn utilization(&self) -> f64 {
        if self.total_chunks == 0 {
            return 0.0;
        }
        self.in_use_chunks as f64 / self.total_chunks as f64
    }

    /// Every mapped chunk is accounted for as either free or in use
    pub fn is_consistent(&self) -> bool {
        self.free_chunks + self.in_use_chunks == self.total_chunks
    }

    /// Get a summary string of the statistics
    pub fn summary(&self) -> String {
        format!(
            "ChunkPoolStats {{ batches: {}, chunks: {}, free: {}, in_use: {}, peak: {}, \
             acquisitions: {}, releases: {}, rejected: {}, mapped: {} bytes, utilization: {:.2}% }}",
            self.batches_mapped,
            self.total_chunks,
            self.free_chunks,
            self.in_use_chunks,
            self.peak_in_use,
            self.acquisitions,
            self.releases,
            self.rejected_releases,
            self.mapped_bytes(),
            self.utilization() * 100.0
        )
    }
}
