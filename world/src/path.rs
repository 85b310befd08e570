//! Greedy backward path reconstruction over reachability labels.

use tactics_grid_core::{MapCoord, MovementBudget, Path, PathError, ReachableSet};

use crate::{adjacency::AdjacencyRule, grid::GridIndex, reachability::compute_reachable};

/// Computes fresh reachability labels and walks them back from `to`.
///
/// # Errors
///
/// Returns [`PathError::ZeroLength`] when `from == to` and
/// [`PathError::Unreachable`] when `to` cannot be reached within `budget`.
pub fn reconstruct_path<A>(
    grid: &GridIndex,
    rule: &A,
    from: MapCoord,
    to: MapCoord,
    budget: MovementBudget,
) -> Result<Path, PathError>
where
    A: AdjacencyRule + ?Sized,
{
    if from == to {
        return Err(PathError::ZeroLength { cell: from });
    }

    let labels = compute_reachable(grid, rule, from, budget);
    trace_path(grid, rule, &labels, from, to, budget)
}

/// Walks from `to` towards `from`, always stepping to the cheapest labelled neighbour.
///
/// `labels` must come from a reachability pass rooted at `from` over the same
/// grid; the origin itself counts as cost zero. Neighbours without a label are
/// never chosen, and ties go to the first neighbour in enumeration order. The
/// returned path excludes `from` and ends on `to`.
///
/// # Errors
///
/// Returns [`PathError::ZeroLength`] when `from == to`,
/// [`PathError::Unreachable`] when `to` carries no label or the walk exceeds
/// `budget` steps, and [`PathError::Stalled`] when a tile has no labelled
/// neighbour to continue from.
pub fn trace_path<A>(
    grid: &GridIndex,
    rule: &A,
    labels: &ReachableSet,
    from: MapCoord,
    to: MapCoord,
    budget: MovementBudget,
) -> Result<Path, PathError>
where
    A: AdjacencyRule + ?Sized,
{
    if from == to {
        return Err(PathError::ZeroLength { cell: from });
    }

    let unreachable = PathError::Unreachable { from, to, budget };
    if !labels.contains(to) {
        return Err(unreachable);
    }

    let label = |cell: MapCoord| {
        if cell == from {
            Some(0)
        } else {
            labels.cost(cell)
        }
    };

    let mut steps = vec![to];
    let mut current = to;
    let mut taken = 0_u32;

    while current != from {
        taken = taken.saturating_add(1);
        if taken > budget.get() {
            return Err(unreachable);
        }

        let mut cheapest: Option<(MapCoord, u32)> = None;
        for neighbor in rule.neighbors(current) {
            if grid.lookup(neighbor).is_none() {
                continue;
            }
            let Some(cost) = label(neighbor) else {
                continue;
            };
            if cheapest.map_or(true, |(_, best)| cost < best) {
                cheapest = Some((neighbor, cost));
            }
        }

        let Some((next, _)) = cheapest else {
            return Err(PathError::Stalled { cell: current });
        };

        current = next;
        if current != from {
            steps.push(current);
        }
    }

    steps.reverse();
    Ok(Path::from_steps(steps))
}
