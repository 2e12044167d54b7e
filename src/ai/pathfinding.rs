//! Weighted A* over the arena grid
//!
//! Entering a cell costs the durability of the obstacle standing on it, and
//! open ground is free. Routes go around walls when they can and through the
//! weakest ones when they must.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use glam::Vec3;

use crate::ai::{ArenaGrid, CellCoord, ObstacleQuery};
use crate::core::PathError;

/// Scale applied to the Euclidean distance heuristic.
///
/// Kept small so that distance never outweighs a durability difference.
pub const HEURISTIC_SCALE: f32 = 0.01;

/// Result of a successful search
#[derive(Debug, Clone, PartialEq)]
pub struct GridPath {
    /// Cells from start to goal inclusive
    pub cells: Vec<CellCoord>,
    /// Accumulated traversal cost at the goal
    pub cost: f32,
}

impl GridPath {
    /// Number of cells on the path
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell centers in world coordinates
    #[must_use]
    pub fn waypoints(&self, grid: &ArenaGrid) -> Vec<Vec3> {
        self.cells.iter().map(|&c| grid.world_position(c)).collect()
    }
}

/// Open-set entry
#[derive(Debug, Clone)]
struct Node {
    index: usize,
    g_cost: f32,
    f_cost: f32,
    /// Insertion order, breaks f-cost ties in favor of the earlier entry
    order: u64,
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Node {}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse for min-heap
        other
            .f_cost
            .partial_cmp(&self.f_cost)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.order.cmp(&self.order))
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Cost of entering a cell: its obstacle's durability, or 0 if empty or destroyed
#[must_use]
pub fn step_cost(grid: &ArenaGrid, coord: CellCoord, obstacles: &dyn ObstacleQuery) -> f32 {
    grid.obstacle_at(coord)
        .and_then(|entity| obstacles.durability(entity))
        .map_or(0.0, |durability| durability.max(0.0))
}

fn heuristic(grid: &ArenaGrid, from: CellCoord, to: CellCoord) -> f32 {
    grid.world_position(from).distance(grid.world_position(to)) * HEURISTIC_SCALE
}

/// Find the cheapest route between two world points.
///
/// Start and goal are clamped onto the grid, so resolution never fails.
/// Among equal-cost candidates the first one queued is expanded first; the
/// exact cells chosen on ties are not part of the contract, only the cost.
///
/// # Errors
///
/// Returns [`PathError::NoPath`] when the goal cannot be reached. Finite
/// durabilities never disconnect the grid, so this only happens when some
/// obstacle reports infinite durability.
pub fn find_path(
    grid: &mut ArenaGrid,
    start: Vec3,
    goal: Vec3,
    obstacles: &dyn ObstacleQuery,
) -> Result<GridPath, PathError> {
    let start_cell = grid.world_to_cell_clamped(start);
    let goal_cell = grid.world_to_cell_clamped(goal);
    let start_index = grid.index(start_cell);
    let goal_index = grid.index(goal_cell);

    grid.reset_search();

    let mut open_set = BinaryHeap::new();
    let mut order = 0_u64;

    let start_h = heuristic(grid, start_cell, goal_cell);
    grid.search[start_index].cost = 0.0;
    grid.search[start_index].heuristic = start_h;
    open_set.push(Node {
        index: start_index,
        g_cost: 0.0,
        f_cost: start_h,
        order,
    });

    while let Some(current) = open_set.pop() {
        let state = grid.search[current.index];
        // Stale entry superseded by a cheaper one
        if state.closed || current.g_cost > state.cost {
            continue;
        }
        grid.search[current.index].closed = true;

        if current.index == goal_index {
            let path = reconstruct(grid, goal_index);
            log::debug!(
                "Arena path {:?} -> {:?}: {} cells, cost {}",
                start_cell,
                goal_cell,
                path.len(),
                path.cost
            );
            return Ok(path);
        }

        let coord = grid.coord_of(current.index);
        for neighbor in grid.neighbors(coord) {
            let n_index = grid.index(neighbor);
            if grid.search[n_index].closed {
                continue;
            }

            let tentative_g = state.cost + step_cost(grid, neighbor, obstacles);
            if tentative_g < grid.search[n_index].cost {
                let h = heuristic(grid, neighbor, goal_cell);
                let entry = &mut grid.search[n_index];
                entry.cost = tentative_g;
                entry.heuristic = h;
                entry.parent = Some(current.index);

                order += 1;
                open_set.push(Node {
                    index: n_index,
                    g_cost: tentative_g,
                    f_cost: tentative_g + h,
                    order,
                });
            }
        }
    }

    log::warn!("No arena path from {start_cell:?} to {goal_cell:?}");
    Err(PathError::NoPath {
        start: start_cell,
        goal: goal_cell,
    })
}

fn reconstruct(grid: &ArenaGrid, goal_index: usize) -> GridPath {
    let mut cells = vec![grid.coord_of(goal_index)];
    let mut current = goal_index;

    while let Some(prev) = grid.search[current].parent {
        cells.push(grid.coord_of(prev));
        current = prev;
    }

    cells.reverse();

    GridPath {
        cells,
        cost: grid.search[goal_index].cost,
    }
}
