//! Physics query module
//!
//! Built on top of rapier3d. Only scene queries are used here: line of
//! sight raycasts and closest-surface lookups. Simulation is external.

mod world;

#[cfg(test)]
pub(crate) mod testing;

pub use world::{ColliderHandle, Physics};

use glam::Vec3;
use hecs::Entity;

/// Result of a raycast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    /// The entity owning the collider that was hit
    pub entity: Entity,
    /// The point of intersection
    pub point: Vec3,
    /// Distance from ray origin
    pub distance: f32,
}

/// Physics raycast service
pub trait PhysicsQuery {
    /// First entity hit along a ray, skipping `exclude`
    ///
    /// `direction` must be normalized.
    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        exclude: Option<Entity>,
    ) -> Option<RaycastHit>;

    /// Closest point on `entity`'s geometry to `point`
    ///
    /// Returns `point` itself when it is inside the geometry, `None` if the
    /// entity has no geometry.
    fn closest_point(&self, entity: Entity, point: Vec3) -> Option<Vec3>;
}
