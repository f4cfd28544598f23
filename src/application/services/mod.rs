//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on the persistence and attribute-schema traits
//! but are themselves concrete structs, not traits.

mod context;
mod editor;
mod reorder;

pub use context::ContextService;
pub use editor::{FieldTreeEditor, ValidationReport};
pub use reorder::{swap_adjacent, swap_plain, SiblingReorderer};
