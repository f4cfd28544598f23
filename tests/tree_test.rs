//! Tests for tree traversal and trigger resolution
//!
//! Fixture: step `s1` with `[A (fieldgroup) [B], C]`.

mod common;

use std::collections::HashSet;

use rstest::rstest;

use formtree::domain::trigger::{
    eligible_triggers, eligible_triggers_across, filter_unselected, is_eligible, sanitize,
    scrub_deleted, ClearReason,
};
use formtree::domain::walker::{ancestor_chain, count, flatten};
use formtree::domain::{FieldId, FieldKind, Receiver, ReceiverId, Step, StepId};

use common::{field, scenario_forest, with_options};

fn id(s: &str) -> FieldId {
    FieldId::new(s)
}

fn ids<'a>(fields: impl IntoIterator<Item = &'a formtree::domain::Field>) -> Vec<&'a str> {
    fields.into_iter().map(|f| f.id.as_str()).collect()
}

// ============================================================
// TreeWalker
// ============================================================

#[test]
fn given_step_fields_when_flattening_then_each_field_once_in_preorder() {
    // Arrange
    let forest = scenario_forest();
    let roots = &forest.questionnaire.steps[0].children;

    // Act
    let visited = ids(flatten(roots));

    // Assert
    assert_eq!(visited, vec!["a", "b", "c"]);
    assert_eq!(visited.len(), count(roots));
    assert_eq!(ids(flatten(roots)), visited, "traversal is restartable");
}

#[test]
fn given_child_field_when_building_ancestor_chain_then_outermost_first_and_inclusive() {
    let forest = scenario_forest();
    let roots = &forest.questionnaire.steps[0].children;

    assert_eq!(ancestor_chain(&id("b"), roots), vec![id("a"), id("b")]);
    assert_eq!(ancestor_chain(&id("c"), roots), vec![id("c")]);
}

#[test]
fn given_unknown_field_when_building_ancestor_chain_then_empty() {
    let forest = scenario_forest();
    let roots = &forest.questionnaire.steps[0].children;

    assert!(ancestor_chain(&id("missing"), roots).is_empty());
}

// ============================================================
// TriggerResolver
// ============================================================

#[test]
fn given_child_field_when_resolving_triggers_then_container_excluded_and_sibling_included() {
    // Arrange
    let forest = scenario_forest();
    let roots = &forest.questionnaire.steps[0].children;

    // Act
    let eligible = ids(eligible_triggers(&id("b"), roots));

    // Assert
    assert!(!eligible.contains(&"a"), "container cannot trigger its content");
    assert!(!eligible.contains(&"b"), "a field cannot trigger itself");
    assert!(eligible.contains(&"c"));
}

#[test]
fn given_container_field_when_resolving_triggers_then_descendants_are_eligible() {
    let forest = scenario_forest();
    let roots = &forest.questionnaire.steps[0].children;

    let eligible = ids(eligible_triggers(&id("a"), roots));

    assert_eq!(eligible, vec!["b", "c"]);
}

#[rstest]
#[case("a")]
#[case("b")]
#[case("c")]
fn given_any_field_when_resolving_triggers_then_disjoint_from_ancestor_chain(#[case] target: &str) {
    let forest = scenario_forest();
    let roots = &forest.questionnaire.steps[0].children;

    let chain: HashSet<FieldId> = ancestor_chain(&id(target), roots).into_iter().collect();
    let eligible = eligible_triggers(&id(target), roots);

    assert!(eligible.iter().all(|f| !chain.contains(&f.id)));
    assert!(eligible.iter().all(|f| is_eligible(&id(target), &f.id, roots)));
}

#[test]
fn given_second_step_when_resolving_across_steps_then_other_step_fields_included() {
    // Arrange
    let mut forest = scenario_forest();
    forest.questionnaire.steps.push(Step {
        id: StepId::new("s2"),
        label: "Step 2".into(),
        presentation_order: 1,
        children: vec![field("d", FieldKind::Inputbox, vec![])],
    });

    // Act
    let eligible = ids(eligible_triggers_across(&id("b"), &forest.questionnaire));

    // Assert
    assert_eq!(eligible, vec!["c", "d"]);
}

#[test]
fn given_selected_receivers_when_filtering_then_keeps_unselected_in_order() {
    let receivers: Vec<Receiver> = ["r1", "r2", "r3"]
        .iter()
        .map(|r| Receiver {
            id: ReceiverId::new(*r),
            name: r.to_uppercase(),
        })
        .collect();
    let selected = vec![ReceiverId::new("r2")];

    let unselected: Vec<&str> = filter_unselected(&selected, &receivers)
        .into_iter()
        .map(|r| r.id.as_str())
        .collect();

    assert_eq!(unselected, vec!["r1", "r3"]);
}

#[test]
fn given_deleted_trigger_target_when_scrubbing_then_only_that_reference_cleared() {
    // Arrange
    let mut options = with_options(field("x", FieldKind::Selectbox, vec![]), &["p", "q"]).options;
    options[0].trigger_field = Some(id("gone"));
    options[1].trigger_field = Some(id("kept"));
    let deleted: HashSet<FieldId> = [id("gone")].into_iter().collect();

    // Act
    let cleared = scrub_deleted(&mut options, &deleted);

    // Assert
    assert_eq!(cleared, 1);
    assert_eq!(options[0].trigger_field, None);
    assert_eq!(options[1].trigger_field, Some(id("kept")));
}

#[test]
fn given_dangling_and_cyclic_triggers_when_sanitizing_then_both_cleared_and_reported() {
    // Arrange
    let mut forest = scenario_forest();
    {
        let step = &mut forest.questionnaire.steps[0];
        // b lives inside a: pointing b at a is cyclic
        step.children[0].children[0].options[0].trigger_field = Some(id("a"));
        step.children[1].options[0].trigger_field = Some(id("nowhere"));
        step.children[1].options[1].trigger_field = Some(id("b"));
    }

    // Act
    let cleared = sanitize(&mut forest.questionnaire);

    // Assert
    assert_eq!(cleared.len(), 2);
    assert!(cleared
        .iter()
        .any(|c| c.field == id("b") && c.reason == ClearReason::Cyclic));
    assert!(cleared
        .iter()
        .any(|c| c.field == id("c") && c.reason == ClearReason::Dangling));

    let step = &forest.questionnaire.steps[0];
    assert_eq!(step.children[0].children[0].options[0].trigger_field, None);
    assert_eq!(step.children[1].options[0].trigger_field, None);
    assert_eq!(step.children[1].options[1].trigger_field, Some(id("b")));
}
