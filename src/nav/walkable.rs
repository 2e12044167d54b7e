//! Grid-backed nav mesh
//!
//! A coarse stand-in for a baked navigation mesh: square cells tagged with
//! area bits (0 = not walkable), searched with 4-directional A*.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use glam::Vec3;
use rustc_hash::FxHashMap;

use crate::geometry::Aabb;
use crate::nav::{AreaMask, NavMeshService, NavPath};

/// Area bits of an ordinary walkable cell
pub const DEFAULT_AREA: AreaMask = 1;

/// Sampled points keep this fraction of a cell away from the cell edge
const CELL_EDGE_INSET: f32 = 0.01;

/// A walkable grid on the XZ plane
#[derive(Debug, Clone)]
pub struct WalkableGrid {
    /// Width in cells
    pub width: usize,
    /// Height in cells
    pub height: usize,
    /// Cell size in world units
    pub cell_size: f32,
    /// World origin offset (minimum corner)
    pub origin: Vec3,
    /// Area bits per cell
    areas: Vec<AreaMask>,
    /// Obstacle footprints currently carved out
    carved: Vec<Aabb>,
}

impl WalkableGrid {
    /// Create a new grid (all cells walkable by default)
    #[must_use]
    pub fn new(width: usize, height: usize, cell_size: f32, origin: Vec3) -> Self {
        Self {
            width,
            height,
            cell_size,
            areas: vec![DEFAULT_AREA; width * height],
            origin,
            carved: Vec::new(),
        }
    }

    /// Set a cell's walkability
    pub fn set_walkable(&mut self, x: usize, y: usize, walkable: bool) {
        self.set_area(x, y, if walkable { DEFAULT_AREA } else { 0 });
    }

    /// Set a cell's area bits
    pub fn set_area(&mut self, x: usize, y: usize, area: AreaMask) {
        if x < self.width && y < self.height {
            self.areas[y * self.width + x] = area;
        }
    }

    /// Mark every cell whose center lies inside `bounds` as blocked
    pub fn block(&mut self, bounds: &Aabb) {
        for y in 0..self.height {
            for x in 0..self.width {
                if bounds.contains_xz(self.grid_to_world(x, y)) {
                    self.set_walkable(x, y, false);
                }
            }
        }
    }

    /// Number of obstacle footprints carved out
    #[must_use]
    pub fn carved_count(&self) -> usize {
        self.carved.len()
    }

    /// Check if a cell is walkable for the given mask
    #[must_use]
    pub fn is_walkable(&self, x: usize, y: usize, mask: AreaMask) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.areas[y * self.width + x] & mask != 0
    }

    /// Convert world position to grid coordinates
    #[must_use]
    pub fn world_to_grid(&self, pos: Vec3) -> (i32, i32) {
        let local = pos - self.origin;
        (
            (local.x / self.cell_size).floor() as i32,
            (local.z / self.cell_size).floor() as i32,
        )
    }

    /// Convert grid coordinates to world position (center of cell)
    #[must_use]
    pub fn grid_to_world(&self, x: usize, y: usize) -> Vec3 {
        self.origin
            + Vec3::new(
                (x as f32 + 0.5) * self.cell_size,
                0.0,
                (y as f32 + 0.5) * self.cell_size,
            )
    }

    /// Closest point to `point` that still maps into cell `(x, y)`
    fn closest_point_in_cell(&self, x: usize, y: usize, point: Vec3) -> Vec3 {
        let inset = self.cell_size * CELL_EDGE_INSET;
        let min = self.origin + Vec3::new(x as f32, 0.0, y as f32) * self.cell_size;
        let max = min + Vec3::new(self.cell_size, 0.0, self.cell_size);
        Vec3::new(
            point.x.clamp(min.x + inset, max.x - inset),
            self.origin.y,
            point.z.clamp(min.z + inset, max.z - inset),
        )
    }

    fn walkable_cell(&self, pos: Vec3, mask: AreaMask) -> Option<(usize, usize)> {
        let (x, y) = self.world_to_grid(pos);
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        self.is_walkable(x, y, mask).then_some((x, y))
    }

    /// Get neighbors of a cell (4-directional)
    fn neighbors(&self, x: usize, y: usize, mask: AreaMask) -> Vec<(usize, usize)> {
        let mut result = Vec::with_capacity(4);

        if x > 0 && self.is_walkable(x - 1, y, mask) {
            result.push((x - 1, y));
        }
        if x + 1 < self.width && self.is_walkable(x + 1, y, mask) {
            result.push((x + 1, y));
        }
        if y > 0 && self.is_walkable(x, y - 1, mask) {
            result.push((x, y - 1));
        }
        if y + 1 < self.height && self.is_walkable(x, y + 1, mask) {
            result.push((x, y + 1));
        }

        result
    }
}

/// A* node for priority queue
#[derive(Debug, Clone)]
struct Node {
    x: usize,
    y: usize,
    f_cost: f32, // g_cost + heuristic
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y
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
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl NavMeshService for WalkableGrid {
    fn sample_position(&self, point: Vec3, max_distance: f32, area_mask: AreaMask) -> Option<Vec3> {
        let on_plane = Vec3::new(point.x, self.origin.y, point.z);
        if self.walkable_cell(on_plane, area_mask).is_some() {
            return Some(on_plane);
        }

        (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| (x, y)))
            .filter(|&(x, y)| self.is_walkable(x, y, area_mask))
            .map(|(x, y)| self.closest_point_in_cell(x, y, on_plane))
            .map(|point| (point, point.distance(on_plane)))
            .filter(|&(_, distance)| distance <= max_distance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(point, _)| point)
    }

    fn calculate_path(&self, from: Vec3, to: Vec3, area_mask: AreaMask) -> Option<NavPath> {
        let (start_x, start_y) = self.walkable_cell(from, area_mask)?;
        let (goal_x, goal_y) = self.walkable_cell(to, area_mask)?;

        let mut open_set = BinaryHeap::new();
        let mut came_from: FxHashMap<(usize, usize), (usize, usize)> = FxHashMap::default();
        let mut g_score: FxHashMap<(usize, usize), f32> = FxHashMap::default();

        let heuristic = |x: usize, y: usize| -> f32 {
            let dx = (x as f32 - goal_x as f32).abs();
            let dy = (y as f32 - goal_y as f32).abs();
            dx + dy // Manhattan distance
        };

        g_score.insert((start_x, start_y), 0.0);
        open_set.push(Node {
            x: start_x,
            y: start_y,
            f_cost: heuristic(start_x, start_y),
        });

        while let Some(current) = open_set.pop() {
            if current.x == goal_x && current.y == goal_y {
                let mut cells = vec![(goal_x, goal_y)];
                let mut curr = (goal_x, goal_y);

                while let Some(&prev) = came_from.get(&curr) {
                    cells.push(prev);
                    curr = prev;
                }
                cells.reverse();

                // Replace the end cells' centers with the exact endpoints
                let mut corners = vec![from];
                if cells.len() > 2 {
                    corners.extend(
                        cells[1..cells.len() - 1]
                            .iter()
                            .map(|&(x, y)| self.grid_to_world(x, y)),
                    );
                }
                corners.push(to);

                return Some(NavPath { corners });
            }

            let current_g = g_score
                .get(&(current.x, current.y))
                .copied()
                .unwrap_or(f32::MAX);

            for (nx, ny) in self.neighbors(current.x, current.y, area_mask) {
                let tentative_g = current_g + 1.0;

                if tentative_g < *g_score.get(&(nx, ny)).unwrap_or(&f32::MAX) {
                    came_from.insert((nx, ny), (current.x, current.y));
                    g_score.insert((nx, ny), tentative_g);

                    open_set.push(Node {
                        x: nx,
                        y: ny,
                        f_cost: tentative_g + heuristic(nx, ny),
                    });
                }
            }
        }

        None
    }

    fn carve(&mut self, bounds: &Aabb) {
        self.carved.push(*bounds);
        self.block(bounds);
    }

    fn uncarve(&mut self, bounds: &Aabb) {
        let Some(index) = self.carved.iter().position(|b| b == bounds) else {
            return;
        };
        self.carved.remove(index);

        for y in 0..self.height {
            for x in 0..self.width {
                let center = self.grid_to_world(x, y);
                if bounds.contains_xz(center) && !self.carved.iter().any(|b| b.contains_xz(center)) {
                    self.set_walkable(x, y, true);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uncarve_keeps_overlapping_footprints() {
        let mut grid = WalkableGrid::new(10, 10, 1.0, Vec3::ZERO);
        let a = Aabb::new(Vec3::new(2.0, 0.0, 2.0), Vec3::new(5.0, 1.0, 3.0));
        let b = Aabb::new(Vec3::new(4.0, 0.0, 2.0), Vec3::new(7.0, 1.0, 3.0));
        grid.carve(&a);
        grid.carve(&b);
        assert!(!grid.is_walkable(4, 2, DEFAULT_AREA));

        grid.uncarve(&a);
        assert!(grid.is_walkable(2, 2, DEFAULT_AREA));
        assert!(!grid.is_walkable(4, 2, DEFAULT_AREA));
        assert_eq!(grid.carved_count(), 1);

        grid.uncarve(&b);
        assert!(grid.is_walkable(4, 2, DEFAULT_AREA));
    }

    #[test]
    fn test_path_goes_around_blocked_cells() {
        let mut grid = WalkableGrid::new(10, 10, 1.0, Vec3::ZERO);
        for y in 2..8 {
            grid.set_walkable(5, y, false);
        }

        let path = grid
            .calculate_path(Vec3::new(2.5, 0.0, 5.5), Vec3::new(8.5, 0.0, 5.5), DEFAULT_AREA)
            .unwrap();

        assert!(path.corners.len() > 7);
        assert!(path.length() > 6.0);
        assert_eq!(path.destination(), Some(Vec3::new(8.5, 0.0, 5.5)));
    }

    #[test]
    fn test_direct_path() {
        let grid = WalkableGrid::new(10, 10, 1.0, Vec3::ZERO);

        let path = grid
            .calculate_path(Vec3::new(0.5, 0.0, 0.5), Vec3::new(3.5, 0.0, 0.5), DEFAULT_AREA)
            .unwrap();

        assert_eq!(path.corners.len(), 4); // 4 cells in a line
        assert!((path.length() - 3.0).abs() < 0.001);
    }

    #[test]
    fn test_no_path() {
        let mut grid = WalkableGrid::new(5, 5, 1.0, Vec3::ZERO);

        // Block everything around goal
        grid.set_walkable(3, 2, false);
        grid.set_walkable(3, 4, false);
        grid.set_walkable(2, 3, false);
        grid.set_walkable(4, 3, false);

        let path = grid.calculate_path(Vec3::new(0.5, 0.0, 0.5), Vec3::new(3.5, 0.0, 3.5), DEFAULT_AREA);
        assert!(path.is_none());
    }

    #[test]
    fn test_area_mask_excludes_cells() {
        let mut grid = WalkableGrid::new(3, 1, 1.0, Vec3::ZERO);
        grid.set_area(1, 0, 0b10);

        let from = Vec3::new(0.5, 0.0, 0.5);
        let to = Vec3::new(2.5, 0.0, 0.5);
        assert!(grid.calculate_path(from, to, DEFAULT_AREA).is_none());
        assert!(grid.calculate_path(from, to, DEFAULT_AREA | 0b10).is_some());
    }

    #[test]
    fn test_sample_position_hugs_off_grid_face() {
        let mut grid = WalkableGrid::new(20, 20, 0.75, Vec3::new(-7.5, 0.0, -7.5));
        let wall = Aabb::new(Vec3::new(-3.0, 0.0, -7.3), Vec3::new(3.0, 2.0, -6.3));
        grid.carve(&wall);

        let face = Vec3::new(-0.5, 0.0, -6.3);
        let sampled = grid.sample_position(face, 2.0, DEFAULT_AREA).unwrap();

        assert!(grid.walkable_cell(sampled, DEFAULT_AREA).is_some());
        assert!(sampled.distance(face) < grid.cell_size, "sampled: {sampled}");
    }

    #[test]
    fn test_sample_position_finds_nearest_walkable() {
        let mut grid = WalkableGrid::new(6, 6, 1.0, Vec3::ZERO);
        grid.block(&Aabb::new(Vec3::new(2.0, 0.0, 2.0), Vec3::new(4.0, 1.0, 4.0)));

        // Inside the blocked square: lands just past the blocked edge
        let sampled = grid
            .sample_position(Vec3::new(2.6, 0.0, 3.0), 2.0, DEFAULT_AREA)
            .unwrap();
        assert!((sampled.x - 1.99).abs() < 0.001, "sampled: {sampled}");
        assert!((sampled.z - 3.0).abs() < 0.02, "sampled: {sampled}");
        assert!(grid.walkable_cell(sampled, DEFAULT_AREA).is_some());

        // Walkable points come back as-is
        let open = Vec3::new(0.2, 3.0, 0.7);
        assert_eq!(
            grid.sample_position(open, 2.0, DEFAULT_AREA),
            Some(Vec3::new(0.2, 0.0, 0.7))
        );

        // Nothing walkable in range
        assert!(grid.sample_position(Vec3::new(3.0, 0.0, 3.0), 0.5, DEFAULT_AREA).is_none());
    }
}
