//! Chunk pool configuration

use serde::{Deserialize, Serialize};

use crate::{
    error::{ChunkPoolError, Result},
    memory::Backing,
};

/// Default size of each chunk (64KB)
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Default number of chunks carved out of one batch mapping
pub const CHUNKS_PER_ALLOC: usize = 1024;

/// Configuration for a chunk pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkPoolConfig {
    /// Name of the pool, used in logs
    pub name: String,
    /// Size of each chunk in bytes
    pub chunk_size: usize,
    /// Number of chunks per batch mapping
    pub chunks_per_alloc: usize,
    /// Where batch regions come from
    pub backing: Backing,
}

impl Default for ChunkPoolConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            chunk_size: CHUNK_SIZE,
            chunks_per_alloc: CHUNKS_PER_ALLOC,
            backing: Backing::default(),
        }
    }
}

impl ChunkPoolConfig {
    /// Create a new configuration with custom name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set chunk size
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    /// Set batch granularity
    pub fn with_chunks_per_alloc(mut self, count: usize) -> Self {
        self.chunks_per_alloc = count;
        self
    }

    /// Set the region backing
    pub fn with_backing(mut self, backing: Backing) -> Self {
        self.backing = backing;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(ChunkPoolError::invalid_parameter(
                "name",
                "Pool name cannot be empty",
            ));
        }

        if self.chunk_size == 0 {
            return Err(ChunkPoolError::invalid_parameter(
                "chunk_size",
                "Chunk size cannot be zero",
            ));
        }

        if self.chunks_per_alloc == 0 {
            return Err(ChunkPoolError::invalid_parameter(
                "chunks_per_alloc",
                "Chunks per allocation cannot be zero",
            ));
        }

        if !self.backing.is_supported() {
            return Err(ChunkPoolError::invalid_parameter(
                "backing",
                format!(
                    "Backing {} is not supported on this platform",
                    self.backing.name()
                ),
            ));
        }

        self.batch_bytes().map(|_| ())
    }

    /// Bytes requested from the mapper per batch
    pub fn batch_bytes(&self) -> Result<usize> {
        self.chunk_size
            .checked_mul(self.chunks_per_alloc)
            .ok_or(ChunkPoolError::Overflow {
                chunk_size: self.chunk_size,
                chunks_per_alloc: self.chunks_per_alloc,
            })
    }
}

/// Builder pattern for chunk pool configuration
pub struct ChunkPoolConfigBuilder {
    config: ChunkPoolConfig,
}

impl ChunkPoolConfigBuilder {
    /// Create a new builder
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            config: ChunkPoolConfig::new(name),
        }
    }

    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    pub fn chunks_per_alloc(mut self, count: usize) -> Self {
        self.config.chunks_per_alloc = count;
        self
    }

    pub fn backing(mut self, backing: Backing) -> Self {
        self.config.backing = backing;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<ChunkPoolConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
