//! Concurrent resource loading and caching for otrkit.
//!
//! [`ResourceManager`] owns the mounted archives, a file cache, a resource
//! cache and one loader thread. Requests by path or content hash are
//! coalesced per path: however many callers ask, a path is read once and
//! decoded once until it is dirtied or unloaded.
//!
//! - **Dirty** keeps the file buffer and re-decodes on the next request, for
//!   hot-reloading edited assets.
//! - **Unload** evicts both, so the next request reads the archive again.
//!
//! The [`bridge`] module exposes the same operations over a process-wide
//! manager for embedding applications.
//!
//! # Example
//!
//! ```no_run
//! use otrkit_manager::{ManagerConfig, ResourceManager};
//!
//! let manager = ResourceManager::new(ManagerConfig::with_archives(["oot.o2r", "mods"]))?;
//!
//! if let Some(resource) = manager.load_resource("objects/gameplay_keep/gEffFire1DL", true) {
//!     println!("{} bytes", resource.pointer_size());
//! }
//! # Ok::<(), otrkit_manager::Error>(())
//! ```

mod cache;
mod config;
mod error;
mod handle;
mod manager;
mod worker;

pub mod bridge;

pub use config::{ManagerConfig, DEFAULT_WORKER_NAME};
pub use error::{Error, Result};
pub use handle::{LoadHandle, LoadState};
pub use manager::{FileHandle, ManagerStats, ResourceHandle, ResourceManager};
