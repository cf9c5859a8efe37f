//! Error types and handling for the chunk pool

/// Result type alias for chunk pool operations
pub type Result<T> = std::result::Result<T, ChunkPoolError>;

/// Errors reported by the chunk pool
///
/// Only [`ChunkPoolError::Mapping`] can surface from the allocation path, and
/// only through the fallible entry points; [`crate::ChunkPool::acquire`]
/// treats it as fatal.
#[derive(Debug, thiserror::Error)]
pub enum ChunkPoolError {
    /// The operating system refused a batch mapping
    #[error("cannot allocate {size} bytes via {mapper}: {source}")]
    Mapping {
        size: usize,
        mapper: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// A released chunk did not originate from this pool
    #[error("Chunk misuse at {address:#x} (len {len}): {reason}")]
    Misuse {
        address: usize,
        len: usize,
        reason: String,
    },

    /// Invalid parameters or configuration
    #[error("Invalid parameter: {parameter} - {message}")]
    InvalidParameter { parameter: String, message: String },

    /// `chunk_size * chunks_per_alloc` does not fit in the address space
    #[error("Batch size overflow: {chunk_size} bytes x {chunks_per_alloc} chunks")]
    Overflow {
        chunk_size: usize,
        chunks_per_alloc: usize,
    },

    /// Out-of-bounds access within a chunk
    #[error("Insufficient space: requested {requested}, available {available}")]
    InsufficientSpace { requested: usize, available: usize },
}

/// A chunk refused by [`crate::ChunkPool::try_release`], handed back so the
/// caller can return it to the pool that mapped it
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct RejectedRelease {
    /// The chunk that was not taken back
    pub chunk: crate::chunks::Chunk,
    #[source]
    pub error: ChunkPoolError,
}

impl RejectedRelease {
    /// Recover the chunk, discarding the error
    pub fn into_chunk(self) -> crate::chunks::Chunk {
        self.chunk
    }
}

impl From<RejectedRelease> for ChunkPoolError {
    fn from(rejected: RejectedRelease) -> Self {
        rejected.error
    }
}

impl ChunkPoolError {
    /// Create a mapping error
    pub fn mapping(size: usize, mapper: &'static str, source: std::io::Error) -> Self {
        Self::Mapping {
            size,
            mapper,
            source,
        }
    }

    /// Create a misuse error
    pub fn misuse(address: usize, len: usize, reason: impl Into<String>) -> Self {
        Self::Misuse {
            address,
            len,
            reason: reason.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Create an insufficient space error
    pub fn insufficient_space(requested: usize, available: usize) -> Self {
        Self::InsufficientSpace {
            requested,
            available,
        }
    }

    /// Whether the error means the pool could not obtain memory
    pub fn is_mapping(&self) -> bool {
        matches!(self, Self::Mapping { .. })
    }
}
