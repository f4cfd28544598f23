//! Adjacent sibling moves
//!
//! A move swaps two neighbours, renumbers the sibling set and persists the new
//! order with a single `order_elements` request. Moving the first element up or
//! the last one down is a silent no-op and issues no request.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::application::{ApplicationResult, IoResultExt};
use crate::domain::{assign_order, Direction, Identified, MoveOutcome, Positioned};
use crate::infrastructure::traits::{OrderRequest, OrderScope, PersistenceService};

/// Swap the element at `index` with its neighbour in `direction`, in memory only.
///
/// Renumbers the set after a swap. Out-of-range indices and boundary moves are
/// `Unchanged`.
pub fn swap_adjacent<T: Positioned>(
    siblings: &mut [T],
    index: usize,
    direction: Direction,
) -> MoveOutcome {
    if index >= siblings.len() {
        return MoveOutcome::Unchanged;
    }
    match direction.target(index, siblings.len()) {
        Some(target) => {
            siblings.swap(index, target);
            assign_order(siblings);
            MoveOutcome::Moved
        }
        None => MoveOutcome::Unchanged,
    }
}

/// Same as [`swap_adjacent`] for sets that carry no order field (e.g. receiver ids).
pub fn swap_plain<T>(items: &mut [T], index: usize, direction: Direction) -> MoveOutcome {
    if index >= items.len() {
        return MoveOutcome::Unchanged;
    }
    match direction.target(index, items.len()) {
        Some(target) => {
            items.swap(index, target);
            MoveOutcome::Moved
        }
        None => MoveOutcome::Unchanged,
    }
}

/// Moves siblings and persists the resulting order.
pub struct SiblingReorderer {
    store: Arc<dyn PersistenceService>,
}

impl SiblingReorderer {
    pub fn new(store: Arc<dyn PersistenceService>) -> Self {
        Self { store }
    }

    pub fn move_up<T>(
        &self,
        siblings: &mut [T],
        id: &T::Id,
        scope: OrderScope,
    ) -> ApplicationResult<MoveOutcome>
    where
        T: Identified + Positioned,
        T::Id: AsRef<str>,
    {
        self.move_sibling(siblings, id, Direction::Up, scope)
    }

    pub fn move_down<T>(
        &self,
        siblings: &mut [T],
        id: &T::Id,
        scope: OrderScope,
    ) -> ApplicationResult<MoveOutcome>
    where
        T: Identified + Positioned,
        T::Id: AsRef<str>,
    {
        self.move_sibling(siblings, id, Direction::Down, scope)
    }

    /// Swap, renumber, persist. On a failed request the previous order is restored.
    #[instrument(level = "debug", skip(self, siblings))]
    pub fn move_sibling<T>(
        &self,
        siblings: &mut [T],
        id: &T::Id,
        direction: Direction,
        scope: OrderScope,
    ) -> ApplicationResult<MoveOutcome>
    where
        T: Identified + Positioned,
        T::Id: AsRef<str>,
    {
        let Some(index) = siblings.iter().position(|s| s.id() == id) else {
            debug!("move_sibling: {:?} not in sibling set", id);
            return Ok(MoveOutcome::Unchanged);
        };
        let Some(target) = direction.target(index, siblings.len()) else {
            return Ok(MoveOutcome::Unchanged);
        };

        let previous: Vec<u32> = siblings.iter().map(Positioned::order).collect();
        siblings.swap(index, target);
        assign_order(siblings);

        let ids = siblings
            .iter()
            .map(|s| s.id().as_ref().to_string())
            .collect();
        let request = OrderRequest::new(scope, ids);
        if let Err(e) = self
            .store
            .order_elements(&request)
            .with_node_context("order elements", &request.args.ids.join(","))
        {
            warn!("move_sibling: persisting order failed, restoring previous order");
            siblings.swap(index, target);
            for (sibling, order) in siblings.iter_mut().zip(previous) {
                sibling.set_order(order);
            }
            return Err(e);
        }
        Ok(MoveOutcome::Moved)
    }
}
