//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::{FieldId, FieldKind, ParentRef};

/// Domain errors represent structural violations of the field tree.
/// These are independent of persistence concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("field not found: {0}")]
    FieldNotFound(FieldId),

    #[error("parent not found: {0}")]
    ParentNotFound(ParentRef),

    #[error("invalid parent '{0}', expected step:<id>, field:<id> or library")]
    InvalidParent(String),

    #[error("step not found: {0}")]
    StepNotFound(String),

    #[error("context not found: {0}")]
    ContextNotFound(String),

    #[error("receiver not found: {0}")]
    ReceiverNotFound(String),

    #[error("template not found: {0}")]
    TemplateNotFound(FieldId),

    #[error("field {id} of type {kind} cannot contain child fields")]
    NotAContainer { id: FieldId, kind: FieldKind },

    #[error("field {id} of type {kind} has no options")]
    OptionsNotSupported { id: FieldId, kind: FieldKind },

    #[error("option index {index} out of range for field {id}")]
    OptionNotFound { id: FieldId, index: usize },

    #[error("field {trigger} cannot trigger field {field}: it contains it or is the field itself")]
    IneligibleTrigger { field: FieldId, trigger: FieldId },

    #[error("unknown field type: {0}")]
    UnknownKind(String),

    #[error("order indices of {scope} are not contiguous: {found:?}")]
    OrderViolation { scope: String, found: Vec<u32> },
}
