//! The questionnaire and the template library seen as one searchable forest

use serde::{Deserialize, Serialize};

use crate::domain::walker::{self, flatten};
use crate::domain::{DomainError, Field, FieldId, ParentRef, Questionnaire};

/// Fields grouped by where they live: questionnaire steps or the template library.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Forest {
    #[serde(default)]
    pub questionnaire: Questionnaire,
    #[serde(default)]
    pub templates: Vec<Field>,
}

impl Forest {
    pub fn new(questionnaire: Questionnaire, templates: Vec<Field>) -> Self {
        Self {
            questionnaire,
            templates,
        }
    }

    pub fn field(&self, id: &FieldId) -> Option<&Field> {
        self.questionnaire
            .steps
            .iter()
            .find_map(|s| walker::find(&s.children, id))
            .or_else(|| walker::find(&self.templates, id))
    }

    pub fn field_mut(&mut self, id: &FieldId) -> Option<&mut Field> {
        for step in self.questionnaire.steps.iter_mut() {
            if let Some(found) = walker::find_mut(&mut step.children, id) {
                return Some(found);
            }
        }
        walker::find_mut(&mut self.templates, id)
    }

    /// Top-level template with the given id.
    pub fn template(&self, id: &FieldId) -> Option<&Field> {
        walker::find(&self.templates, id)
    }

    /// True when `id` lives under one of the questionnaire steps.
    pub fn in_questionnaire(&self, id: &FieldId) -> bool {
        self.questionnaire
            .steps
            .iter()
            .any(|s| walker::contains(&s.children, id))
    }

    /// The root set containing `id`: its step's fields, or the template library.
    pub fn roots_of(&self, id: &FieldId) -> Option<&[Field]> {
        self.questionnaire
            .steps
            .iter()
            .find(|s| walker::contains(&s.children, id))
            .map(|s| s.children.as_slice())
            .or_else(|| walker::contains(&self.templates, id).then_some(self.templates.as_slice()))
    }

    /// The sibling set owning `id` and the index of `id` inside it.
    pub fn siblings_mut(&mut self, id: &FieldId) -> Option<(&mut Vec<Field>, usize)> {
        for step in self.questionnaire.steps.iter_mut() {
            if let Some(found) = walker::siblings_mut(&mut step.children, id) {
                return Some(found);
            }
        }
        walker::siblings_mut(&mut self.templates, id)
    }

    /// Where `id` is attached.
    pub fn parent_of(&self, id: &FieldId) -> Option<ParentRef> {
        let holder = |roots: &[Field]| {
            flatten(roots)
                .find(|f| f.children.iter().any(|c| &c.id == id))
                .map(|f| ParentRef::Field(f.id.clone()))
        };
        for step in &self.questionnaire.steps {
            if step.children.iter().any(|f| &f.id == id) {
                return Some(ParentRef::Step(step.id.clone()));
            }
            if let Some(parent) = holder(&step.children) {
                return Some(parent);
            }
        }
        if self.templates.iter().any(|f| &f.id == id) {
            return Some(ParentRef::Library);
        }
        holder(&self.templates)
    }

    pub fn children(&self, parent: &ParentRef) -> Result<&[Field], DomainError> {
        match parent {
            ParentRef::Step(step_id) => self
                .questionnaire
                .step(step_id)
                .map(|s| s.children.as_slice())
                .ok_or_else(|| DomainError::ParentNotFound(parent.clone())),
            ParentRef::Field(field_id) => self
                .field(field_id)
                .map(|f| f.children.as_slice())
                .ok_or_else(|| DomainError::ParentNotFound(parent.clone())),
            ParentRef::Library => Ok(&self.templates),
        }
    }

    /// Mutable child list of `parent`; only fieldgroups accept children.
    pub fn children_mut(&mut self, parent: &ParentRef) -> Result<&mut Vec<Field>, DomainError> {
        match parent {
            ParentRef::Step(step_id) => self
                .questionnaire
                .step_mut(step_id)
                .map(|s| &mut s.children)
                .ok_or_else(|| DomainError::ParentNotFound(parent.clone())),
            ParentRef::Field(field_id) => {
                let field = self
                    .field_mut(field_id)
                    .ok_or_else(|| DomainError::ParentNotFound(parent.clone()))?;
                if !field.kind.is_container() {
                    return Err(DomainError::NotAContainer {
                        id: field.id.clone(),
                        kind: field.kind,
                    });
                }
                Ok(&mut field.children)
            }
            ParentRef::Library => Ok(&mut self.templates),
        }
    }
}
