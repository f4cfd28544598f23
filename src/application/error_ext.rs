//! Error conversion helpers for persistence calls
//!
//! Provides an extension trait for cleaner error handling with node context.

use std::fmt::Display;
use std::io;

use crate::application::{ApplicationError, ApplicationResult};

/// Extension trait for converting `io::Result` to `ApplicationResult` with context.
pub trait IoResultExt<T> {
    /// Add node context to a persistence error.
    ///
    /// # Example
    /// ```ignore
    /// self.store.update_field(&field)
    ///     .with_node_context("update field", &field.id)?;
    /// ```
    fn with_node_context(self, action: &str, node: &dyn Display) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_node_context(self, action: &str, node: &dyn Display) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::Persistence {
            context: format!("{}: {}", action, node),
            source: e,
        })
    }
}
