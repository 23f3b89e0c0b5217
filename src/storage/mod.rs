//! Storage abstractions for monitor state and snapshots.
//!
//! ## Directory Structure
//!
//! ```text
//! storage/
//! ├── monitors.json                     # State of every monitor
//! └── snapshots/
//!     └── {code}/
//!         ├── publication/{name}.json   # Latest snapshot per source
//!         └── video/{name}.json
//! ```

pub mod local;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{ContentSnapshot, SourceKey};
use crate::monitor::ContentMonitor;

// Re-export for convenience
pub use local::LocalStorage;

/// Trait for monitor storage backends.
#[async_trait]
pub trait MonitorStorage: Send + Sync {
    /// Load all monitors, empty when nothing was stored yet.
    async fn load_monitors(&self) -> Result<Vec<ContentMonitor>>;

    /// Replace the stored monitors.
    async fn save_monitors(&self, monitors: &[ContentMonitor]) -> Result<()>;

    /// Load the latest snapshot of a source.
    async fn load_snapshot(&self, key: &SourceKey) -> Result<Option<ContentSnapshot>>;

    /// Replace the latest snapshot of a source.
    async fn write_snapshot(&self, key: &SourceKey, snapshot: &ContentSnapshot) -> Result<()>;
}
