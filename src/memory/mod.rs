//! Raw memory acquisition for batch regions

pub mod config;
pub mod regions;

pub use config::Backing;
pub use regions::{AnonymousMapper, HeapMapper, MappedRegion, RegionMapper};
