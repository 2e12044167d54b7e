//! Navigation mesh service
//!
//! The nav mesh answers two questions for mobile agents: where the nearest
//! walkable point is, and how to walk there. It is a separate planner from
//! the weighted arena grid, which only reasons about obstacle cost.

mod agent;
mod walkable;

pub use agent::NavAgent;
pub use walkable::WalkableGrid;

use glam::Vec3;

use crate::geometry::Aabb;

/// Bit set of nav mesh areas an agent may use
pub type AreaMask = u32;

/// Every area
pub const ALL_AREAS: AreaMask = AreaMask::MAX;

/// A walkable route, as a list of corner points from start to destination
#[derive(Debug, Clone, PartialEq)]
pub struct NavPath {
    pub corners: Vec<Vec3>,
}

impl NavPath {
    /// Final point of the path
    #[must_use]
    pub fn destination(&self) -> Option<Vec3> {
        self.corners.last().copied()
    }

    /// Total length along the corners
    #[must_use]
    pub fn length(&self) -> f32 {
        self.corners.windows(2).map(|w| w[0].distance(w[1])).sum()
    }
}

/// External navigation mesh
pub trait NavMeshService {
    /// Nearest walkable point within `max_distance` of `point`
    fn sample_position(&self, point: Vec3, max_distance: f32, area_mask: AreaMask) -> Option<Vec3>;

    /// Walkable route between two points, `None` if there is none
    fn calculate_path(&self, from: Vec3, to: Vec3, area_mask: AreaMask) -> Option<NavPath>;

    /// An obstacle now occupies `bounds`
    fn carve(&mut self, _bounds: &Aabb) {}

    /// The obstacle occupying `bounds` is gone
    fn uncarve(&mut self, _bounds: &Aabb) {}
}
