//! Trigger field resolution
//!
//! An option's `trigger_field` ties the visibility of one field to the selection
//! state of another. A field may never be triggered by itself or by a field that
//! contains it: the container's visibility would depend on its own content.

use std::collections::HashSet;

use tracing::{debug, instrument};

use crate::domain::order::Identified;
use crate::domain::walker::{ancestor_chain, find, flatten};
use crate::domain::{Field, FieldId, FieldOption, Questionnaire};

/// Fields of the forest that may trigger `field_id`.
///
/// Everything in `roots` except the ancestor chain of `field_id` (which ends with
/// the field itself). Siblings and descendants stay eligible.
#[instrument(level = "debug", skip(roots))]
pub fn eligible_triggers<'a>(field_id: &FieldId, roots: &'a [Field]) -> Vec<&'a Field> {
    let chain = ancestor_chain(field_id, roots);
    flatten(roots).filter(|f| !chain.contains(&f.id)).collect()
}

/// Candidates from every step; ancestors are taken from the field's own step.
#[instrument(level = "debug", skip(questionnaire))]
pub fn eligible_triggers_across<'a>(
    field_id: &FieldId,
    questionnaire: &'a Questionnaire,
) -> Vec<&'a Field> {
    let chain = questionnaire
        .steps
        .iter()
        .map(|step| ancestor_chain(field_id, &step.children))
        .find(|chain| !chain.is_empty())
        .unwrap_or_default();

    questionnaire
        .steps
        .iter()
        .flat_map(|step| flatten(&step.children))
        .filter(|f| !chain.contains(&f.id))
        .collect()
}

/// True when `trigger` may control the visibility of `field_id` within `roots`.
pub fn is_eligible(field_id: &FieldId, trigger: &FieldId, roots: &[Field]) -> bool {
    find(roots, trigger).is_some() && !ancestor_chain(field_id, roots).contains(trigger)
}

/// Candidates whose id is not in `selected`; keeps candidate order.
pub fn filter_unselected<'a, T>(selected: &[T::Id], candidates: &'a [T]) -> Vec<&'a T>
where
    T: Identified,
{
    candidates
        .iter()
        .filter(|c| !selected.contains(c.id()))
        .collect()
}

/// Clear every option trigger that points at a deleted field.
///
/// Returns the number of cleared references.
pub fn scrub_deleted(options: &mut [FieldOption], deleted: &HashSet<FieldId>) -> usize {
    let mut cleared = 0;
    for option in options.iter_mut() {
        if option
            .trigger_field
            .as_ref()
            .is_some_and(|t| deleted.contains(t))
        {
            debug!("scrub_deleted: clearing trigger {:?}", option.trigger_field);
            option.trigger_field = None;
            cleared += 1;
        }
    }
    cleared
}

/// Why a trigger reference was dropped during sanitizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClearReason {
    /// The referenced field does not exist in the questionnaire
    Dangling,
    /// The referenced field is the owning field or one of its ancestors
    Cyclic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearedTrigger {
    pub field: FieldId,
    pub option_index: usize,
    pub trigger: FieldId,
    pub reason: ClearReason,
}

/// Drop dangling and cyclic trigger references across the whole questionnaire.
///
/// Never fails: invalid references simply become "no trigger".
#[instrument(level = "debug", skip(questionnaire))]
pub fn sanitize(questionnaire: &mut Questionnaire) -> Vec<ClearedTrigger> {
    let existing: HashSet<FieldId> = questionnaire
        .steps
        .iter()
        .flat_map(|s| flatten(&s.children))
        .map(|f| f.id.clone())
        .collect();

    // Decide on a shared borrow first, then apply.
    let mut cleared = Vec::new();
    for step in &questionnaire.steps {
        for field in flatten(&step.children) {
            let chain = ancestor_chain(&field.id, &step.children);
            for (idx, option) in field.options.iter().enumerate() {
                let Some(trigger) = &option.trigger_field else {
                    continue;
                };
                let reason = if !existing.contains(trigger) {
                    ClearReason::Dangling
                } else if chain.contains(trigger) {
                    ClearReason::Cyclic
                } else {
                    continue;
                };
                cleared.push(ClearedTrigger {
                    field: field.id.clone(),
                    option_index: idx,
                    trigger: trigger.clone(),
                    reason,
                });
            }
        }
    }

    for entry in &cleared {
        debug!(
            "sanitize: field={} option={} trigger={} reason={:?}",
            entry.field, entry.option_index, entry.trigger, entry.reason
        );
        let field = questionnaire
            .steps
            .iter_mut()
            .find_map(|s| crate::domain::walker::find_mut(&mut s.children, &entry.field));
        if let Some(option) = field.and_then(|f| f.options.get_mut(entry.option_index)) {
            option.trigger_field = None;
        }
    }
    cleared
}
