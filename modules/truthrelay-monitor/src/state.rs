use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::warn;

const STATE_FILE: &str = "last_id.txt";

/// Durable record of the last successfully processed post id — the
/// deduplication authority across restarts.
///
/// A missing or unreadable record is treated identically to "no prior
/// state" (first-run bootstrap), never as a fatal condition.
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(STATE_FILE),
        }
    }

    pub fn load(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let id = contents.trim();
                if id.is_empty() {
                    None
                } else {
                    Some(id.to_string())
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Could not read state, treating as first run");
                None
            }
        }
    }

    /// Write synchronously, immediately after each delivered post. Callers
    /// log failure and keep their in-memory watermark moving.
    pub fn save(&self, id: &str) -> Result<()> {
        fs::write(&self.path, id)
            .with_context(|| format!("Could not write state to {}", self.path.display()))
    }
}
