//! Target sequence extraction
//!
//! Reduces a grid path to the obstacles that must be destroyed to open it,
//! in the order they are met, followed by the goal.

use hecs::Entity;
use rustc_hash::FxHashSet;

use crate::ai::{ArenaGrid, GridPath};

/// Distinct obstacles in encounter order, terminated by the goal entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSequence {
    entries: Vec<Entity>,
}

impl TargetSequence {
    /// A sequence with no obstacles, only the goal
    #[must_use]
    pub fn goal_only(goal: Entity) -> Self {
        Self {
            entries: vec![goal],
        }
    }

    /// Every entry, obstacles first, goal last
    #[must_use]
    pub fn entries(&self) -> &[Entity] {
        &self.entries
    }

    /// Obstacles to destroy, without the goal
    #[must_use]
    pub fn obstacles(&self) -> &[Entity] {
        &self.entries[..self.entries.len() - 1]
    }

    /// The terminal goal entity
    #[must_use]
    pub fn goal(&self) -> Entity {
        self.entries[self.entries.len() - 1]
    }

    /// Number of entries including the goal
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Never true, the goal is always present
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Owned copy for a per-agent target list
    #[must_use]
    pub fn to_vec(&self) -> Vec<Entity> {
        self.entries.clone()
    }
}

/// Collect the distinct obstacles crossed by `path`, then append `goal`.
///
/// Obstacles are compared by entity identity. The goal is appended even if
/// it already appears as an obstacle.
#[must_use]
pub fn extract_targets(grid: &ArenaGrid, path: &GridPath, goal: Entity) -> TargetSequence {
    let mut seen = FxHashSet::default();
    let mut entries: Vec<Entity> = path
        .cells
        .iter()
        .filter_map(|&coord| grid.obstacle_at(coord))
        .filter(|&obstacle| seen.insert(obstacle))
        .collect();

    entries.push(goal);
    log::debug!("Extracted {} targets (goal {goal:?})", entries.len());

    TargetSequence { entries }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::CellCoord;
    use glam::Vec3;

    fn entities(count: usize) -> Vec<Entity> {
        let mut world = hecs::World::new();
        (0..count).map(|_| world.spawn(())).collect()
    }

    fn straight_path(len: usize) -> GridPath {
        GridPath {
            cells: (0..len).map(|x| CellCoord::new(x, 0)).collect(),
            cost: 0.0,
        }
    }

    #[test]
    fn test_duplicates_collapse_and_goal_is_last() {
        let e = entities(3);
        let (w1, w2, goal) = (e[0], e[1], e[2]);
        let mut grid = ArenaGrid::new(5, 1, 1.0, Vec3::ZERO);
        grid.set_obstacle(CellCoord::new(1, 0), Some(w1));
        grid.set_obstacle(CellCoord::new(2, 0), Some(w1));
        grid.set_obstacle(CellCoord::new(3, 0), Some(w2));

        let targets = extract_targets(&grid, &straight_path(5), goal);

        assert_eq!(targets.entries(), &[w1, w2, goal]);
        assert_eq!(targets.obstacles(), &[w1, w2]);
        assert_eq!(targets.goal(), goal);
    }

    #[test]
    fn test_revisited_obstacle_keeps_first_position() {
        let e = entities(3);
        let (w1, w2, goal) = (e[0], e[1], e[2]);
        let mut grid = ArenaGrid::new(5, 1, 1.0, Vec3::ZERO);
        grid.set_obstacle(CellCoord::new(0, 0), Some(w1));
        grid.set_obstacle(CellCoord::new(2, 0), Some(w2));
        grid.set_obstacle(CellCoord::new(4, 0), Some(w1));

        let targets = extract_targets(&grid, &straight_path(5), goal);
        assert_eq!(targets.entries(), &[w1, w2, goal]);
    }

    #[test]
    fn test_goal_appended_even_when_it_is_an_obstacle() {
        let e = entities(1);
        let goal = e[0];
        let mut grid = ArenaGrid::new(3, 1, 1.0, Vec3::ZERO);
        grid.set_obstacle(CellCoord::new(2, 0), Some(goal));

        let targets = extract_targets(&grid, &straight_path(3), goal);
        assert_eq!(targets.entries(), &[goal, goal]);
    }

    #[test]
    fn test_open_path_yields_goal_only() {
        let e = entities(1);
        let grid = ArenaGrid::new(4, 1, 1.0, Vec3::ZERO);

        let targets = extract_targets(&grid, &straight_path(4), e[0]);
        assert_eq!(targets, TargetSequence::goal_only(e[0]));
        assert!(targets.obstacles().is_empty());
    }
}
