//! vendorscope Store
//!
//! Result cache and downstream status persistence.
//!
//! Provides:
//! - [`ResultStore`]: the per-record result cache read before a run
//! - [`StatusSink`]: denormalized status on company and analysis records
//! - [`FileStore`] (JSON files) and [`MemoryStore`] implementations of both

pub mod file;
pub mod memory;
pub mod store;

pub use file::{FileStore, FileStoreConfig, StatusKind, StatusRecord};
pub use memory::MemoryStore;
pub use store::{ResultStore, StatusSink, StatusUpdate};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::file::{FileStore, FileStoreConfig};
    pub use crate::memory::MemoryStore;
    pub use crate::store::{ResultStore, StatusSink, StatusUpdate};
}
