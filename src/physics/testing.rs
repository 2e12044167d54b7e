//! Box-only physics stand-in for unit tests

use std::cell::Cell;

use glam::Vec3;
use hecs::Entity;

use crate::geometry::Aabb;
use crate::physics::{PhysicsQuery, RaycastHit};

/// Answers queries against plain boxes and counts raycasts
#[derive(Default)]
pub(crate) struct BoxPhysics {
    pub boxes: Vec<(Entity, Aabb)>,
    pub raycasts: Cell<usize>,
}

impl PhysicsQuery for BoxPhysics {
    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        exclude: Option<Entity>,
    ) -> Option<RaycastHit> {
        self.raycasts.set(self.raycasts.get() + 1);
        self.boxes
            .iter()
            .filter(|(e, _)| Some(*e) != exclude)
            .filter_map(|(e, b)| {
                b.ray_distance(origin, direction, max_distance)
                    .map(|d| (*e, d))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(entity, distance)| RaycastHit {
                entity,
                point: origin + direction * distance,
                distance,
            })
    }

    fn closest_point(&self, entity: Entity, point: Vec3) -> Option<Vec3> {
        self.boxes
            .iter()
            .find(|(e, _)| *e == entity)
            .map(|(_, b)| b.closest_point(point))
    }
}
