//! Field tree editor
//!
//! Owns the in-memory forest (questionnaire steps plus template library) and is the
//! only thing that mutates it. Structural changes go through the persistence
//! service: creates are applied after the store confirms them (the store assigns
//! the id), option edits stay in memory until the owning field is saved.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::services::reorder::{swap_adjacent, SiblingReorderer};
use crate::application::{ApplicationResult, IoResultExt};
use crate::domain::trigger::{self, ClearedTrigger};
use crate::domain::walker::{self, subtree_ids};
use crate::domain::{
    assign_order, is_contiguous, next_order, order, Direction, DomainError, EditState, Field,
    FieldDraft, FieldId, FieldKind, FieldOption, Forest, Instance, MoveOutcome, NewField,
    ParentRef,
};
use crate::infrastructure::traits::{AttributeSchema, OrderScope, PersistenceService};

/// Outcome of [`FieldTreeEditor::validate`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    /// Trigger references that were cleared
    pub cleared_triggers: Vec<ClearedTrigger>,
    /// Sibling sets whose order values are not `0..n`
    pub order_violations: Vec<DomainError>,
}

pub struct FieldTreeEditor {
    store: Arc<dyn PersistenceService>,
    schema: Arc<dyn AttributeSchema>,
    reorderer: SiblingReorderer,
    forest: Forest,
    /// Fields deleted in this session; their trigger references are scrubbed on save
    deleted_ids: HashSet<FieldId>,
    edit_states: HashMap<FieldId, EditState>,
}

impl FieldTreeEditor {
    pub fn new(
        store: Arc<dyn PersistenceService>,
        schema: Arc<dyn AttributeSchema>,
        forest: Forest,
    ) -> Self {
        Self {
            reorderer: SiblingReorderer::new(store.clone()),
            store,
            schema,
            forest,
            deleted_ids: HashSet::new(),
            edit_states: HashMap::new(),
        }
    }

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    pub fn field(&self, id: &FieldId) -> ApplicationResult<&Field> {
        self.forest
            .field(id)
            .ok_or_else(|| DomainError::FieldNotFound(id.clone()).into())
    }

    fn field_mut(&mut self, id: &FieldId) -> ApplicationResult<&mut Field> {
        self.forest
            .field_mut(id)
            .ok_or_else(|| DomainError::FieldNotFound(id.clone()).into())
    }

    pub fn deleted_ids(&self) -> &HashSet<FieldId> {
        &self.deleted_ids
    }

    // ============================================================
    // Edit state
    // ============================================================

    pub fn edit_state(&self, id: &FieldId) -> EditState {
        self.edit_states.get(id).copied().unwrap_or_default()
    }

    /// Flip a field between viewing and editing; there are no implicit transitions.
    pub fn toggle_editing(&mut self, id: &FieldId) -> ApplicationResult<EditState> {
        self.field(id)?;
        let state = self.edit_state(id).toggled();
        self.edit_states.insert(id.clone(), state);
        Ok(state)
    }

    // ============================================================
    // Field creation
    // ============================================================

    /// Create a field from user input and append it below `parent`.
    ///
    /// Attributes come from the attribute schema. The field is appended at the end
    /// (`y` = sibling count) once the store has assigned its id.
    #[instrument(level = "debug", skip(self))]
    pub fn add_field(&mut self, parent: &ParentRef, draft: NewField) -> ApplicationResult<FieldId> {
        let instance = self.instance_below(parent)?;
        let field = Field {
            id: FieldId::default(),
            label: draft.label,
            kind: draft.kind,
            instance,
            template_id: None,
            y: 0,
            multi_entry: draft.kind == FieldKind::Fileupload,
            attrs: self.schema.field_attrs(draft.kind),
            options: Vec::new(),
            children: Vec::new(),
        };
        self.create_below(parent, field)
    }

    /// Embed the template `template_id` below `parent` as a reference instance.
    ///
    /// The reference carries no attributes of its own; its kind mirrors the template.
    #[instrument(level = "debug", skip(self))]
    pub fn add_field_from_template(
        &mut self,
        parent: &ParentRef,
        template_id: &FieldId,
    ) -> ApplicationResult<FieldId> {
        let template = self
            .forest
            .template(template_id)
            .ok_or_else(|| DomainError::TemplateNotFound(template_id.clone()))?;
        let field = Field {
            id: FieldId::default(),
            label: String::new(),
            kind: template.kind,
            instance: Instance::Reference,
            template_id: Some(template_id.clone()),
            y: 0,
            multi_entry: false,
            attrs: Default::default(),
            options: Vec::new(),
            children: Vec::new(),
        };
        self.create_below(parent, field)
    }

    /// Create a template in the library, at top level or inside a template group.
    pub fn add_template(
        &mut self,
        parent: Option<&FieldId>,
        draft: NewField,
    ) -> ApplicationResult<FieldId> {
        let parent = match parent {
            Some(id) => ParentRef::Field(id.clone()),
            None => ParentRef::Library,
        };
        if let ParentRef::Field(id) = &parent {
            if self.field(id)?.instance != Instance::Template {
                return Err(DomainError::TemplateNotFound(id.clone()).into());
            }
        }
        self.add_field(&parent, draft)
    }

    /// Children inherit the parent field's instance; step fields are standalone.
    fn instance_below(&self, parent: &ParentRef) -> ApplicationResult<Instance> {
        Ok(match parent {
            ParentRef::Step(_) => Instance::Standalone,
            ParentRef::Library => Instance::Template,
            ParentRef::Field(id) => self.field(id)?.instance,
        })
    }

    fn create_below(&mut self, parent: &ParentRef, mut field: Field) -> ApplicationResult<FieldId> {
        // Validate the parent before talking to the store.
        field.y = next_order(self.forest.children_mut(parent)?.as_slice());

        let draft = FieldDraft {
            parent: parent.clone(),
            field,
        };
        let created = self
            .store
            .create_field(&draft)
            .with_node_context("create field", parent)?;
        let id = created.id.clone();
        self.forest.children_mut(parent)?.push(created);
        info!("add_field: created {} below {}", id, parent);
        Ok(id)
    }

    // ============================================================
    // Deletion
    // ============================================================

    /// Delete a field and its subtree.
    ///
    /// The store is asked first; on success the ids are recorded as deleted, the
    /// field leaves its parent and the remaining siblings are renumbered.
    #[instrument(level = "debug", skip(self))]
    pub fn delete_field(&mut self, id: &FieldId) -> ApplicationResult<()> {
        let removed_ids = subtree_ids(self.field(id)?);
        self.store
            .delete_field(id)
            .with_node_context("delete field", id)?;

        self.deleted_ids.extend(removed_ids.iter().cloned());
        for removed in &removed_ids {
            self.edit_states.remove(removed);
        }
        if let Some((siblings, idx)) = self.forest.siblings_mut(id) {
            siblings.remove(idx);
            assign_order(siblings);
        }
        info!("delete_field: removed {} ({} node(s))", id, removed_ids.len());
        Ok(())
    }

    // ============================================================
    // Options (in memory until the field is saved)
    // ============================================================

    /// Append a blank option; returns its index.
    pub fn add_option(&mut self, field_id: &FieldId) -> ApplicationResult<usize> {
        let field = self.choice_field_mut(field_id)?;
        let option = FieldOption::blank(next_order(&field.options));
        field.options.push(option);
        Ok(field.options.len() - 1)
    }

    pub fn delete_option(
        &mut self,
        field_id: &FieldId,
        index: usize,
    ) -> ApplicationResult<FieldOption> {
        let field = self.field_mut(field_id)?;
        if index >= field.options.len() {
            return Err(DomainError::OptionNotFound {
                id: field_id.clone(),
                index,
            }
            .into());
        }
        Ok(field.options.remove(index))
    }

    /// Swap an option with its neighbour; boundary moves are no-ops.
    pub fn reorder_option(
        &mut self,
        field_id: &FieldId,
        index: usize,
        direction: Direction,
    ) -> ApplicationResult<MoveOutcome> {
        let field = self.field_mut(field_id)?;
        Ok(swap_adjacent(&mut field.options, index, direction))
    }

    pub fn set_option_label(
        &mut self,
        field_id: &FieldId,
        index: usize,
        label: impl Into<String>,
    ) -> ApplicationResult<()> {
        self.option_mut(field_id, index)?.label = label.into();
        Ok(())
    }

    pub fn set_option_score(
        &mut self,
        field_id: &FieldId,
        index: usize,
        score_points: i32,
    ) -> ApplicationResult<()> {
        self.option_mut(field_id, index)?.score_points = score_points;
        Ok(())
    }

    /// Point an option at a trigger field, or clear it with `None`.
    ///
    /// The trigger must be one of [`Self::eligible_triggers`].
    #[instrument(level = "debug", skip(self))]
    pub fn set_option_trigger(
        &mut self,
        field_id: &FieldId,
        index: usize,
        trigger: Option<FieldId>,
    ) -> ApplicationResult<()> {
        if let Some(trigger_id) = &trigger {
            let eligible = self
                .eligible_triggers(field_id)?
                .iter()
                .any(|f| &f.id == trigger_id);
            if !eligible {
                return Err(DomainError::IneligibleTrigger {
                    field: field_id.clone(),
                    trigger: trigger_id.clone(),
                }
                .into());
            }
        }
        self.option_mut(field_id, index)?.trigger_field = trigger;
        Ok(())
    }

    fn option_mut(
        &mut self,
        field_id: &FieldId,
        index: usize,
    ) -> ApplicationResult<&mut FieldOption> {
        let field = self.choice_field_mut(field_id)?;
        field.options.get_mut(index).ok_or_else(|| {
            DomainError::OptionNotFound {
                id: field_id.clone(),
                index,
            }
            .into()
        })
    }

    fn choice_field_mut(&mut self, field_id: &FieldId) -> ApplicationResult<&mut Field> {
        let field = self.field_mut(field_id)?;
        if !field.kind.shows_options() {
            return Err(DomainError::OptionsNotSupported {
                id: field.id.clone(),
                kind: field.kind,
            }
            .into());
        }
        Ok(field)
    }

    // ============================================================
    // Save and move
    // ============================================================

    /// Persist a field with its options.
    ///
    /// Triggers pointing at fields deleted in this session are cleared first, then
    /// the options are renumbered in their current order.
    #[instrument(level = "debug", skip(self))]
    pub fn save_field(&mut self, id: &FieldId) -> ApplicationResult<()> {
        let deleted = &self.deleted_ids;
        let field = self
            .forest
            .field_mut(id)
            .ok_or_else(|| DomainError::FieldNotFound(id.clone()))?;

        let cleared = trigger::scrub_deleted(&mut field.options, deleted);
        if cleared > 0 {
            debug!("save_field: cleared {} stale trigger(s)", cleared);
        }
        assign_order(&mut field.options);

        self.store
            .update_field(field)
            .with_node_context("update field", id)
    }

    /// Move a field among its siblings and persist the new order.
    #[instrument(level = "debug", skip(self))]
    pub fn move_field(
        &mut self,
        id: &FieldId,
        direction: Direction,
    ) -> ApplicationResult<MoveOutcome> {
        let parent = self
            .forest
            .parent_of(id)
            .ok_or_else(|| DomainError::FieldNotFound(id.clone()))?;
        let siblings = self.forest.children_mut(&parent)?;
        self.reorderer
            .move_sibling(siblings, id, direction, OrderScope::Fields(parent))
    }

    // ============================================================
    // Queries
    // ============================================================

    /// Fields that may trigger `field_id`, minus the field's ancestor chain.
    ///
    /// Questionnaire fields pick from every step; templates only from the library.
    pub fn eligible_triggers(&self, field_id: &FieldId) -> ApplicationResult<Vec<&Field>> {
        if self.forest.in_questionnaire(field_id) {
            return Ok(trigger::eligible_triggers_across(
                field_id,
                &self.forest.questionnaire,
            ));
        }
        let roots = self
            .forest
            .roots_of(field_id)
            .ok_or_else(|| DomainError::FieldNotFound(field_id.clone()))?;
        Ok(trigger::eligible_triggers(field_id, roots))
    }

    pub fn ancestor_chain(&self, field_id: &FieldId) -> Vec<FieldId> {
        self.forest
            .roots_of(field_id)
            .map(|roots| walker::ancestor_chain(field_id, roots))
            .unwrap_or_default()
    }

    /// Clear dangling and cyclic triggers and report sibling sets with broken order.
    ///
    /// Cleared triggers change only the in-memory tree; save the affected fields
    /// to persist them.
    #[instrument(level = "debug", skip(self))]
    pub fn validate(&mut self) -> ValidationReport {
        let cleared_triggers = trigger::sanitize(&mut self.forest.questionnaire);
        let mut order_violations = Vec::new();

        let mut check = |scope: String, orders: Vec<u32>, ok: bool| {
            if !ok {
                order_violations.push(DomainError::OrderViolation {
                    scope,
                    found: orders,
                });
            }
        };

        let steps = &self.forest.questionnaire.steps;
        check(
            "steps".into(),
            order::orders(steps),
            is_contiguous(steps),
        );
        for step in steps {
            check(
                format!("step:{}", step.id),
                order::orders(&step.children),
                is_contiguous(&step.children),
            );
            for field in walker::flatten(&step.children) {
                check(
                    format!("field:{}", field.id),
                    order::orders(&field.children),
                    is_contiguous(&field.children),
                );
                check(
                    format!("options:{}", field.id),
                    order::orders(&field.options),
                    is_contiguous(&field.options),
                );
            }
        }

        debug!(
            "validate: cleared={} violations={}",
            cleared_triggers.len(),
            order_violations.len()
        );
        ValidationReport {
            cleared_triggers,
            order_violations,
        }
    }
}
