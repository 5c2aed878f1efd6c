//! I/O boundary traits for testability
//!
//! These traits abstract the slot store and the playback clock, allowing the
//! session to be tested with in-memory implementations.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A saved raw array string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotEntry {
    pub value: String,
    pub saved_at: DateTime<Utc>,
}

/// Named key-value slots used to hand the last array to another instance.
pub trait SlotStore: Send + Sync {
    /// Read a slot. A missing slot is `Ok(None)`, not an error.
    fn get(&self, key: &str) -> io::Result<Option<SlotEntry>>;

    /// Write a slot, replacing any previous value.
    fn put(&self, key: &str, value: &str) -> io::Result<()>;
}

/// Waits between automatic playback ticks.
pub trait Ticker: Send + Sync {
    fn wait(&self, interval: Duration);
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// One TOML file per slot under a directory.
#[derive(Debug, Clone)]
pub struct FileSlotStore {
    dir: PathBuf,
}

impl FileSlotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, key: &str) -> io::Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid slot key: {:?}", key),
            ));
        }
        Ok(self.dir.join(format!("{}.toml", key)))
    }
}

impl SlotStore for FileSlotStore {
    fn get(&self, key: &str) -> io::Result<Option<SlotEntry>> {
        let path = self.slot_path(key)?;
        if !path.exists() {
            debug!("get: no slot at {}", path.display());
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        let entry = toml::from_str(&content)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
        Ok(Some(entry))
    }

    fn put(&self, key: &str, value: &str) -> io::Result<()> {
        let path = self.slot_path(key)?;
        fs::create_dir_all(&self.dir)?;
        let entry = SlotEntry {
            value: value.to_string(),
            saved_at: Utc::now(),
        };
        let content = toml::to_string(&entry)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
        debug!("put: writing slot {}", path.display());
        fs::write(path, content)
    }
}

/// Process-local slots.
#[derive(Debug, Default)]
pub struct MemorySlotStore {
    slots: Mutex<HashMap<String, SlotEntry>>,
}

impl MemorySlotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SlotStore for MemorySlotStore {
    fn get(&self, key: &str) -> io::Result<Option<SlotEntry>> {
        let slots = self
            .slots
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "slot store poisoned"))?;
        Ok(slots.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> io::Result<()> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "slot store poisoned"))?;
        slots.insert(
            key.to_string(),
            SlotEntry {
                value: value.to_string(),
                saved_at: Utc::now(),
            },
        );
        Ok(())
    }
}

/// Sleeps on the current thread.
#[derive(Debug, Default)]
pub struct RealTicker;

impl Ticker for RealTicker {
    fn wait(&self, interval: Duration) {
        thread::sleep(interval);
    }
}

/// Returns immediately.
#[derive(Debug, Default)]
pub struct InstantTicker;

impl Ticker for InstantTicker {
    fn wait(&self, _interval: Duration) {}
}
