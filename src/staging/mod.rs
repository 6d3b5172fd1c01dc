//! Same-device staging area for pending notification events.
//!
//! Producers running next to the panel drop events here when they cannot
//! reach the panel directly. The panel drains the slot periodically.

mod file_staging;
mod memory;

pub use file_staging::{FileStagingArea, STAGING_FILE_NAME};
pub use memory::MemoryStagingArea;

use anyhow::Result;
use serde_json::Value;

/// Staging directory used when none is configured, relative to the working
/// directory. Shared by the panel and `stage-notification`.
pub const DEFAULT_STAGING_DIR: &str = "staging";

/// A single slot holding a JSON array of raw or canonical events.
pub trait StagingArea: Send + Sync {
    /// Read all pending events without removing them.
    ///
    /// An absent or empty slot yields no events. A slot that does not hold a
    /// JSON array is an error.
    fn read_pending(&self) -> Result<Vec<Value>>;

    /// Remove every pending event.
    fn clear(&self) -> Result<()>;

    /// Append one event to the slot.
    fn stage(&self, event: Value) -> Result<()>;
}
