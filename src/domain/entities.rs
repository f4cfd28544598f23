//! Domain entities: questionnaire tree, options, contexts

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;
use crate::domain::forest::Forest;
use crate::domain::kind::FieldKind;

/// Opaque, type-specific configuration bag attached to a field.
pub type Attrs = BTreeMap<String, serde_json::Value>;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Empty ids are placeholders for nodes the store has not confirmed yet.
            pub fn is_transient(&self) -> bool {
                self.0.is_empty()
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

string_id!(
    /// Identity of a field, assigned by the persistence service on create.
    FieldId
);
string_id!(OptionId);
string_id!(StepId);
string_id!(ContextId);
string_id!(ReceiverId);

/// How a field relates to the template library.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Instance {
    /// Reusable definition living in the template library
    Template,
    /// Embeds a template inside a questionnaire by `template_id`
    Reference,
    /// Plain questionnaire field
    #[default]
    Standalone,
}

/// A node in the questionnaire tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    #[serde(default)]
    pub id: FieldId,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    #[serde(default)]
    pub instance: Instance,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<FieldId>,
    /// Position among siblings
    #[serde(default)]
    pub y: u32,
    #[serde(default)]
    pub multi_entry: bool,
    #[serde(default)]
    pub attrs: Attrs,
    #[serde(default)]
    pub options: Vec<FieldOption>,
    #[serde(default)]
    pub children: Vec<Field>,
}

impl Field {
    /// Shows the configuration panel: configurable kinds, plus the identity template.
    pub fn shows_configuration(&self) -> bool {
        self.kind.shows_configuration()
            || (self.instance == Instance::Template
                && self.id.as_str() == WHISTLEBLOWER_IDENTITY_TEMPLATE)
    }
}

/// Template id whose configuration is editable despite being a fieldgroup.
pub const WHISTLEBLOWER_IDENTITY_TEMPLATE: &str = "whistleblower_identity";

/// A selectable choice of a choice-kind field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldOption {
    #[serde(default)]
    pub id: OptionId,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub score_points: i32,
    /// Field whose visibility this option controls; `None` means no trigger
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub trigger_field: Option<FieldId>,
    #[serde(default)]
    pub presentation_order: u32,
}

impl FieldOption {
    /// Fresh option appended at `order`: zero score, no label, no trigger.
    pub fn blank(order: u32) -> Self {
        Self {
            presentation_order: order,
            ..Self::default()
        }
    }
}

/// Treat `""` (the legacy "no trigger" marker) the same as an absent value.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<FieldId>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.is_empty()).map(FieldId::new))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub id: StepId,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub presentation_order: u32,
    #[serde(default)]
    pub children: Vec<Field>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Questionnaire {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Questionnaire {
    pub fn step(&self, id: &StepId) -> Option<&Step> {
        self.steps.iter().find(|s| &s.id == id)
    }

    pub fn step_mut(&mut self, id: &StepId) -> Option<&mut Step> {
        self.steps.iter_mut().find(|s| &s.id == id)
    }
}

/// Submission channel; owns an ordered list of receivers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Context {
    #[serde(default)]
    pub id: ContextId,
    pub name: String,
    #[serde(default)]
    pub presentation_order: u32,
    #[serde(default)]
    pub questionnaire_id: String,
    #[serde(default)]
    pub additional_questionnaire_id: Option<String>,
    #[serde(default)]
    pub receivers: Vec<ReceiverId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receiver {
    pub id: ReceiverId,
    #[serde(default)]
    pub name: String,
}

/// Everything the persistence service hands out on load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(flatten)]
    pub forest: Forest,
    #[serde(default)]
    pub contexts: Vec<Context>,
    #[serde(default)]
    pub receivers: Vec<Receiver>,
}

/// Where a new field is attached.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum ParentRef {
    Step(StepId),
    Field(FieldId),
    /// Top level of the template library
    Library,
}

impl fmt::Display for ParentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParentRef::Step(id) => write!(f, "step:{}", id),
            ParentRef::Field(id) => write!(f, "field:{}", id),
            ParentRef::Library => f.write_str("library"),
        }
    }
}

/// Parses the `Display` form: `step:<id>`, `field:<id>` or `library`.
impl FromStr for ParentRef {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some(("step", id)) if !id.is_empty() => Ok(ParentRef::Step(StepId::new(id))),
            Some(("field", id)) if !id.is_empty() => Ok(ParentRef::Field(FieldId::new(id))),
            None if s == "library" => Ok(ParentRef::Library),
            _ => Err(DomainError::InvalidParent(s.to_string())),
        }
    }
}

/// User input for a new field.
#[derive(Debug, Clone, PartialEq)]
pub struct NewField {
    pub label: String,
    pub kind: FieldKind,
}

/// Node payload sent to the persistence service on create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDraft {
    pub parent: ParentRef,
    pub field: Field,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextDraft {
    pub context: Context,
}

/// Interaction state of a field in the editor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditState {
    #[default]
    Viewing,
    Editing,
}

impl EditState {
    pub fn toggled(self) -> Self {
        match self {
            EditState::Viewing => EditState::Editing,
            EditState::Editing => EditState::Viewing,
        }
    }
}

/// Direction of an adjacent-sibling move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Adjacent index, `None` when the move would leave `0..len`.
    pub fn target(self, index: usize, len: usize) -> Option<usize> {
        match self {
            Direction::Up => index.checked_sub(1),
            Direction::Down => (index + 1 < len).then_some(index + 1),
        }
    }
}

/// Result of a move request; boundary moves are not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,
    Unchanged,
}
