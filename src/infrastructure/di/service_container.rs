//! Service container for dependency injection
//!
//! Wires the session up with its I/O collaborators.

use std::sync::Arc;

use crate::application::Session;
use crate::config::Settings;
use crate::infrastructure::traits::{FileSlotStore, RealTicker, SlotStore, Ticker};

/// Container holding settings and I/O implementations.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Slot store for cross-session transfer
    pub slots: Arc<dyn SlotStore>,

    /// Clock for automatic playback
    pub ticker: Arc<dyn Ticker>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        let slots = Arc::new(FileSlotStore::new(settings.slots_dir()));
        Self::with_deps(settings, slots, Arc::new(RealTicker))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        slots: Arc<dyn SlotStore>,
        ticker: Arc<dyn Ticker>,
    ) -> Self {
        let settings = Arc::new(settings);

        Self {
            settings,
            slots,
            ticker,
        }
    }

    /// A fresh session configured from the settings.
    pub fn session(&self) -> Session {
        Session::new(&self.settings)
    }
}
