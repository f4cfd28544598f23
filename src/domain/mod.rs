//! Domain layer: entities and tree logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod entities;
pub mod error;
pub mod forest;
pub mod kind;
pub mod order;
pub mod trigger;
pub mod walker;

pub use entities::*;
pub use error::DomainError;
pub use forest::Forest;
pub use kind::{FieldKind, KindGroup};
pub use order::{assign_order, is_contiguous, next_order, Identified, Positioned};
