use anyhow::Result;
use serde_json::Value;
use std::sync::Mutex;

use super::StagingArea;

/// Staging slot kept in process memory.
///
/// Nothing outside the process can write to it, so it only suits tests and
/// embedders that stage events themselves.
#[derive(Default)]
pub struct MemoryStagingArea {
    events: Mutex<Vec<Value>>,
}

impl MemoryStagingArea {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Value>> {
        // A poisoned slot still holds valid JSON values.
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl StagingArea for MemoryStagingArea {
    fn read_pending(&self) -> Result<Vec<Value>> {
        Ok(self.lock().clone())
    }

    fn clear(&self) -> Result<()> {
        self.lock().clear();
        Ok(())
    }

    fn stage(&self, event: Value) -> Result<()> {
        self.lock().push(event);
        Ok(())
    }
}
