//! Path-following agent
//!
//! Executes whatever path the steering layer hands it.

use glam::Vec3;

use crate::nav::{ALL_AREAS, AreaMask, NavPath};

/// Locomotion state of a mobile agent on the nav mesh
#[derive(Debug, Clone)]
pub struct NavAgent {
    /// Current position
    pub position: Vec3,
    /// Movement speed (units per second)
    pub speed: f32,
    /// Stop this close to the destination
    pub stopping_distance: f32,
    /// Areas this agent may walk on
    pub area_mask: AreaMask,
    /// Velocity produced by the last update
    pub velocity: Vec3,
    path: Option<NavPath>,
    next_corner: usize,
}

impl NavAgent {
    /// Create an agent standing at `position`
    #[must_use]
    pub fn new(position: Vec3, speed: f32, stopping_distance: f32) -> Self {
        Self {
            position,
            speed,
            stopping_distance,
            area_mask: ALL_AREAS,
            velocity: Vec3::ZERO,
            path: None,
            next_corner: 0,
        }
    }

    /// Restrict the walkable areas
    #[must_use]
    pub fn with_area_mask(mut self, area_mask: AreaMask) -> Self {
        self.area_mask = area_mask;
        self
    }

    /// Destination of the active path
    #[must_use]
    pub fn destination(&self) -> Option<Vec3> {
        self.path.as_ref().and_then(NavPath::destination)
    }

    /// The active path
    #[must_use]
    pub fn path(&self) -> Option<&NavPath> {
        self.path.as_ref()
    }

    /// Replace the active path
    pub fn set_path(&mut self, path: NavPath) {
        self.path = Some(path);
        self.next_corner = 0;
    }

    /// Drop the active path and stand still
    pub fn reset_path(&mut self) {
        self.path = None;
        self.next_corner = 0;
        self.velocity = Vec3::ZERO;
    }

    /// Distance left to the destination along the remaining corners
    #[must_use]
    pub fn remaining_distance(&self) -> f32 {
        let Some(path) = &self.path else {
            return 0.0;
        };
        let mut total = 0.0;
        let mut from = self.position;
        for &corner in path.corners.iter().skip(self.next_corner) {
            total += from.distance(corner);
            from = corner;
        }
        total
    }

    /// Holding a path and already within stopping distance of its end
    #[must_use]
    pub fn has_arrived(&self) -> bool {
        self.path.is_some() && self.remaining_distance() <= self.stopping_distance
    }

    /// Move directly by an offset, bypassing the path (player control)
    pub fn move_by(&mut self, delta: Vec3, dt: f32) {
        self.position += delta;
        self.velocity = if dt > 0.0 { delta / dt } else { Vec3::ZERO };
    }

    /// Advance along the path and return the new position
    pub fn advance(&mut self, dt: f32) -> Vec3 {
        self.velocity = Vec3::ZERO;

        if self.remaining_distance() <= self.stopping_distance {
            return self.position;
        }
        let Some(path) = &self.path else {
            return self.position;
        };

        let mut budget = self.speed * dt;
        let start = self.position;
        while budget > 0.0 {
            let Some(&corner) = path.corners.get(self.next_corner) else {
                break;
            };
            let to_corner = corner - self.position;
            let distance = to_corner.length();
            if distance <= budget {
                self.position = corner;
                self.next_corner += 1;
                budget -= distance;
            } else {
                self.position += to_corner / distance * budget;
                budget = 0.0;
            }
        }

        if dt > 0.0 {
            self.velocity = (self.position - start) / dt;
        }
        self.position
    }
}
