//! Capped, newest-first string history (server URLs used at login)

use std::sync::Arc;

use tracing::warn;

use crate::store::backend::{acquire, Backend};

pub const DEFAULT_FILE_NAME: &str = "url_history.json";
pub const DEFAULT_CAPACITY: usize = 10;

/// A bounded most-recent-first list kept in one JSON file
#[derive(Clone)]
pub struct HistoryStore {
    backend: Arc<dyn Backend>,
    file_name: String,
    capacity: usize,
}

impl HistoryStore {
    pub fn new(backend: Arc<dyn Backend>, capacity: usize) -> Self {
        Self::with_file_name(backend, DEFAULT_FILE_NAME, capacity)
    }

    pub fn with_file_name(
        backend: Arc<dyn Backend>,
        file_name: impl Into<String>,
        capacity: usize,
    ) -> Self {
        Self {
            backend,
            file_name: file_name.into(),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn read(&self) -> Vec<String> {
        match self.backend.read(&self.file_name) {
            Ok(Some(text)) if !text.trim().is_empty() => {
                serde_json::from_str::<Option<Vec<String>>>(&text)
                    .map(Option::unwrap_or_default)
                    .unwrap_or_else(|e| {
                        warn!(file = %self.file_name, error = %e, "failed to parse history");
                        Vec::new()
                    })
            }
            Ok(_) => Vec::new(),
            Err(e) => {
                warn!(file = %self.file_name, error = %e, "failed to read history");
                Vec::new()
            }
        }
    }

    /// Entries, most recent first
    pub fn entries(&self) -> Vec<String> {
        let lock = self.backend.lock(&self.file_name);
        let _guard = acquire(&lock);
        self.read()
    }

    /// Put `entry` first, dropping an older copy and anything past capacity
    pub fn add(&self, entry: &str) -> bool {
        let entry = entry.trim();
        if entry.is_empty() {
            return false;
        }

        let lock = self.backend.lock(&self.file_name);
        let _guard = acquire(&lock);

        let mut entries = self.read();
        entries.retain(|e| e != entry);
        entries.insert(0, entry.to_string());
        entries.truncate(self.capacity);

        let document = match serde_json::to_string_pretty(&entries) {
            Ok(document) => document,
            Err(e) => {
                warn!(file = %self.file_name, error = %e, "failed to encode history");
                return false;
            }
        };
        match self.backend.write(&self.file_name, &document) {
            Ok(()) => true,
            Err(e) => {
                warn!(file = %self.file_name, error = %e, "failed to save history");
                false
            }
        }
    }

    pub fn clear(&self) -> bool {
        let lock = self.backend.lock(&self.file_name);
        let _guard = acquire(&lock);
        match self.backend.remove(&self.file_name) {
            Ok(()) => true,
            Err(e) => {
                warn!(file = %self.file_name, error = %e, "failed to clear history");
                false
            }
        }
    }
}
