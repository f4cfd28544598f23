//! Field kinds and what each kind supports

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Inputbox,
    Textarea,
    Checkbox,
    Selectbox,
    Multichoice,
    Fieldgroup,
    Fileupload,
    Tos,
    Date,
}

/// Coarse grouping used by views that render several kinds the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindGroup {
    Text,
    Choice,
    Single(FieldKind),
}

impl FieldKind {
    pub const ALL: [FieldKind; 9] = [
        FieldKind::Inputbox,
        FieldKind::Textarea,
        FieldKind::Checkbox,
        FieldKind::Selectbox,
        FieldKind::Multichoice,
        FieldKind::Fieldgroup,
        FieldKind::Fileupload,
        FieldKind::Tos,
        FieldKind::Date,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Inputbox => "inputbox",
            FieldKind::Textarea => "textarea",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Selectbox => "selectbox",
            FieldKind::Multichoice => "multichoice",
            FieldKind::Fieldgroup => "fieldgroup",
            FieldKind::Fileupload => "fileupload",
            FieldKind::Tos => "tos",
            FieldKind::Date => "date",
        }
    }

    /// Answers can be aggregated into statistics.
    pub fn is_markable_for_stats(self) -> bool {
        !matches!(
            self,
            FieldKind::Inputbox | FieldKind::Textarea | FieldKind::Fieldgroup
        )
    }

    /// Answers can be shown in a submission preview.
    pub fn is_markable_for_preview(self) -> bool {
        !matches!(self, FieldKind::Fieldgroup | FieldKind::Fileupload)
    }

    pub fn shows_configuration(self) -> bool {
        match self {
            FieldKind::Inputbox
            | FieldKind::Textarea
            | FieldKind::Checkbox
            | FieldKind::Selectbox
            | FieldKind::Multichoice
            | FieldKind::Tos
            | FieldKind::Date => true,
            FieldKind::Fieldgroup | FieldKind::Fileupload => false,
        }
    }

    /// Carries answer options.
    pub fn shows_options(self) -> bool {
        matches!(
            self,
            FieldKind::Checkbox | FieldKind::Selectbox | FieldKind::Multichoice
        )
    }

    /// May own child fields.
    pub fn is_container(self) -> bool {
        matches!(self, FieldKind::Fieldgroup)
    }

    pub fn group(self) -> KindGroup {
        match self {
            FieldKind::Inputbox | FieldKind::Textarea => KindGroup::Text,
            FieldKind::Checkbox | FieldKind::Selectbox | FieldKind::Multichoice => {
                KindGroup::Choice
            }
            other => KindGroup::Single(other),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| DomainError::UnknownKind(s.to_string()))
    }
}
