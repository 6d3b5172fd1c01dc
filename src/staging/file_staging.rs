use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};

use super::StagingArea;

/// Well-known name of the staging slot inside the staging directory.
pub const STAGING_FILE_NAME: &str = "crmNotifications.json";

/// Staging slot backed by one JSON file.
pub struct FileStagingArea {
    path: PathBuf,
}

impl FileStagingArea {
    /// Use the well-known slot inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(STAGING_FILE_NAME))
    }

    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StagingArea for FileStagingArea {
    fn read_pending(&self) -> Result<Vec<Value>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read staging file: {:?}", self.path))
            }
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let value: Value = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse staging file: {:?}", self.path))?;
        match value {
            Value::Array(events) => Ok(events),
            other => bail!(
                "Staging file {:?} does not hold an array (found {})",
                self.path,
                json_kind(&other)
            ),
        }
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to clear staging file: {:?}", self.path))
            }
        }
    }

    fn stage(&self, event: Value) -> Result<()> {
        let mut events = self.read_pending()?;
        events.push(event);

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create staging directory: {:?}", parent))?;
        }

        // Write next to the slot and rename so readers never see a partial array.
        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, serde_json::to_vec(&events)?)
            .with_context(|| format!("Failed to write staging file: {:?}", tmp_path))?;
        std::fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("Failed to replace staging file: {:?}", self.path))?;
        Ok(())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
