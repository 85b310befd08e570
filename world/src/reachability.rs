//! Bounded breadth expansion that labels every tile reachable within a budget.

use std::{collections::BTreeMap, mem};

use tactics_grid_core::{MapCoord, MovementBudget, ReachableSet};
use tracing::trace;

use crate::{adjacency::AdjacencyRule, grid::GridIndex};

/// Computes the minimum step cost of every passable tile reachable from `from`.
///
/// The search runs at most `budget` expansion rounds. Each round walks the
/// current frontier and labels passable neighbours with `round` unless a
/// cheaper label already exists, so a tile is only ever re-queued when its
/// cost improves and every label equals the true shortest step count.
///
/// The origin never appears in the result. A zero budget, or an origin that
/// is absent or impassable, yields an empty set.
pub fn compute_reachable<A>(
    grid: &GridIndex,
    rule: &A,
    from: MapCoord,
    budget: MovementBudget,
) -> ReachableSet
where
    A: AdjacencyRule + ?Sized,
{
    if budget.is_exhausted() || !grid.is_passable(from) {
        return ReachableSet::default();
    }

    let mut costs = BTreeMap::new();
    let mut frontier = vec![from];
    let mut next_frontier = Vec::new();

    for cost in 1..=budget.get() {
        for &cell in &frontier {
            for neighbor in rule.neighbors(cell) {
                if neighbor == from || !grid.is_passable(neighbor) {
                    continue;
                }

                let known = costs.get(&neighbor).copied().unwrap_or(u32::MAX);
                if known <= cost {
                    continue;
                }

                let _ = costs.insert(neighbor, cost);
                next_frontier.push(neighbor);
            }
        }

        if next_frontier.is_empty() {
            break;
        }

        frontier.clear();
        mem::swap(&mut frontier, &mut next_frontier);
    }

    trace!(
        from = %from,
        budget = budget.get(),
        reachable = costs.len(),
        "reachable_computed"
    );

    ReachableSet::from_costs(costs)
}
