//! Error conversion helpers for slot store operations
//!
//! Provides extension traits for cleaner error handling with slot context.

use std::io;

use crate::application::{ApplicationError, ApplicationResult};

/// Extension trait for converting `io::Result` to `ApplicationResult` with context.
pub trait IoResultExt<T> {
    /// Add slot key context to an I/O error.
    ///
    /// # Example
    /// ```ignore
    /// store.put(key, raw)
    ///     .with_slot_context("save slot", key)?;
    /// ```
    fn with_slot_context(self, action: &str, key: &str) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_slot_context(self, action: &str, key: &str) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: format!("{}: {}", action, key),
            source: Box::new(e),
        })
    }
}
