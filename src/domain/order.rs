//! Positional indices of sibling sets
//!
//! Every sibling set (a step's fields, a field's children or options, the steps of a
//! questionnaire, the contexts) keeps a dense, zero-based order value per element.
//! Each type knows which of its fields carries that value.

use itertools::Itertools;

use crate::domain::{
    Context, ContextId, Field, FieldId, FieldOption, OptionId, Receiver, ReceiverId, Step, StepId,
};

/// Element of an ordered sibling set.
pub trait Positioned {
    fn order(&self) -> u32;
    fn set_order(&mut self, order: u32);
}

/// Element with a stable identity, used to locate it inside its sibling set.
pub trait Identified {
    type Id: PartialEq + Clone + std::fmt::Debug;

    fn id(&self) -> &Self::Id;
}

impl Positioned for Field {
    fn order(&self) -> u32 {
        self.y
    }

    fn set_order(&mut self, order: u32) {
        self.y = order;
    }
}

impl Positioned for FieldOption {
    fn order(&self) -> u32 {
        self.presentation_order
    }

    fn set_order(&mut self, order: u32) {
        self.presentation_order = order;
    }
}

impl Positioned for Step {
    fn order(&self) -> u32 {
        self.presentation_order
    }

    fn set_order(&mut self, order: u32) {
        self.presentation_order = order;
    }
}

impl Positioned for Context {
    fn order(&self) -> u32 {
        self.presentation_order
    }

    fn set_order(&mut self, order: u32) {
        self.presentation_order = order;
    }
}

impl Identified for Field {
    type Id = FieldId;

    fn id(&self) -> &FieldId {
        &self.id
    }
}

impl Identified for FieldOption {
    type Id = OptionId;

    fn id(&self) -> &OptionId {
        &self.id
    }
}

impl Identified for Step {
    type Id = StepId;

    fn id(&self) -> &StepId {
        &self.id
    }
}

impl Identified for Context {
    type Id = ContextId;

    fn id(&self) -> &ContextId {
        &self.id
    }
}

impl Identified for Receiver {
    type Id = ReceiverId;

    fn id(&self) -> &ReceiverId {
        &self.id
    }
}

/// Rewrite every element's order value to its index in the slice.
///
/// The slice order is the intended order. Idempotent; empty slices are a no-op.
pub fn assign_order<T: Positioned>(siblings: &mut [T]) {
    for (idx, sibling) in siblings.iter_mut().enumerate() {
        sibling.set_order(idx as u32);
    }
}

/// Order value for an element appended at the end (not renumbered).
pub fn next_order<T>(siblings: &[T]) -> u32 {
    siblings.len() as u32
}

/// True when the order values are exactly `0..len` in some permutation.
pub fn is_contiguous<T: Positioned>(siblings: &[T]) -> bool {
    siblings
        .iter()
        .map(Positioned::order)
        .sorted_unstable()
        .enumerate()
        .all(|(idx, order)| order == idx as u32)
}

/// Order values in slice order, for diagnostics.
pub fn orders<T: Positioned>(siblings: &[T]) -> Vec<u32> {
    siblings.iter().map(Positioned::order).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(orders: &[u32]) -> Vec<FieldOption> {
        orders.iter().map(|&o| FieldOption::blank(o)).collect()
    }

    #[test]
    fn given_shuffled_orders_when_assigning_then_matches_positions() {
        let mut opts = options(&[7, 3, 3, 0]);
        assign_order(&mut opts);
        assert_eq!(orders(&opts), vec![0, 1, 2, 3]);

        assign_order(&mut opts);
        assert_eq!(orders(&opts), vec![0, 1, 2, 3]);
    }

    #[test]
    fn given_empty_set_when_assigning_then_noop() {
        let mut opts: Vec<FieldOption> = Vec::new();
        assign_order(&mut opts);
        assert!(opts.is_empty());
        assert_eq!(next_order(&opts), 0);
        assert!(is_contiguous(&opts));
    }

    #[test]
    fn given_gaps_or_duplicates_then_not_contiguous() {
        assert!(is_contiguous(&options(&[2, 0, 1])));
        assert!(!is_contiguous(&options(&[0, 2])));
        assert!(!is_contiguous(&options(&[0, 0, 1])));
        assert!(!is_contiguous(&options(&[1, 2])));
    }
}
