//! Backing selection for batch regions

use serde::{Deserialize, Serialize};

use super::regions::{AnonymousMapper, HeapMapper, RegionMapper};

/// Where batch regions come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Backing {
    /// Anonymous, private, zero-filled virtual memory from the OS
    #[default]
    Anonymous,
    /// Zeroed allocations from the process heap, for targets without
    /// anonymous mappings
    Heap,
}

impl Backing {
    /// Check if this backing is supported on the current platform
    pub fn is_supported(&self) -> bool {
        match self {
            Backing::Anonymous => cfg!(any(unix, windows)),
            Backing::Heap => true,
        }
    }

    /// Human-readable name of the backing
    pub fn name(&self) -> &'static str {
        match self {
            Backing::Anonymous => AnonymousMapper.name(),
            Backing::Heap => HeapMapper.name(),
        }
    }

    /// Build the mapper implementing this backing
    pub fn mapper(&self) -> Box<dyn RegionMapper> {
        match self {
            Backing::Anonymous => Box::new(AnonymousMapper),
            Backing::Heap => Box::new(HeapMapper),
        }
    }
}
