//! Collision world using rapier3d

use glam::Vec3;
use hecs::Entity;
use rapier3d::parry::query::PointQuery;
use rapier3d::prelude::*;
use rustc_hash::FxHashMap;

use crate::geometry::Aabb;
use crate::physics::{PhysicsQuery, RaycastHit};

/// Handle to a collider in the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColliderHandle(pub rapier3d::geometry::ColliderHandle);

fn to_rapier(v: Vec3) -> Vector<Real> {
    vector![v.x, v.y, v.z]
}

fn entity_bits(entity: Entity) -> u128 {
    u128::from(entity.to_bits().get())
}

fn entity_from_bits(bits: u128) -> Option<Entity> {
    u64::try_from(bits).ok().and_then(Entity::from_bits)
}

/// Collision world manager
///
/// Colliders are free-standing (no rigid bodies) and tagged with the entity
/// that owns them.
pub struct Physics {
    /// Island manager
    island_manager: IslandManager,
    /// Rigid body set (unused, required by the query API)
    rigid_body_set: RigidBodySet,
    /// Collider set
    collider_set: ColliderSet,
    /// Query pipeline for raycasting
    query_pipeline: QueryPipeline,
    /// Collider owned by each entity
    colliders: FxHashMap<Entity, rapier3d::geometry::ColliderHandle>,
}

impl Physics {
    /// Create an empty collision world
    pub fn new() -> Self {
        Self {
            island_manager: IslandManager::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            query_pipeline: QueryPipeline::new(),
            colliders: FxHashMap::default(),
        }
    }

    fn insert(&mut self, entity: Entity, collider: Collider) -> ColliderHandle {
        if let Some(old) = self.colliders.remove(&entity) {
            self.remove_handle(old);
        }
        let handle = self.collider_set.insert(collider);
        self.colliders.insert(entity, handle);
        self.query_pipeline.update(&self.collider_set);
        ColliderHandle(handle)
    }

    /// Add a box collider covering `bounds` for an entity
    pub fn add_box(&mut self, entity: Entity, bounds: &Aabb) -> ColliderHandle {
        let half = bounds.half_extents().max(Vec3::splat(0.001));
        let collider = ColliderBuilder::cuboid(half.x, half.y, half.z)
            .translation(to_rapier(bounds.center()))
            .user_data(entity_bits(entity))
            .build();
        self.insert(entity, collider)
    }

    /// Add an upright capsule collider centered at `position`
    pub fn add_capsule(
        &mut self,
        entity: Entity,
        position: Vec3,
        half_height: f32,
        radius: f32,
    ) -> ColliderHandle {
        let collider = ColliderBuilder::capsule_y(half_height, radius)
            .translation(to_rapier(position))
            .user_data(entity_bits(entity))
            .build();
        self.insert(entity, collider)
    }

    /// Move an entity's collider
    pub fn set_position(&mut self, entity: Entity, position: Vec3) {
        let Some(&handle) = self.colliders.get(&entity) else {
            return;
        };
        if let Some(collider) = self.collider_set.get_mut(handle) {
            collider.set_translation(to_rapier(position));
            self.query_pipeline.update(&self.collider_set);
        }
    }

    /// Remove an entity's collider, returns false if it had none
    pub fn remove(&mut self, entity: Entity) -> bool {
        match self.colliders.remove(&entity) {
            Some(handle) => {
                self.remove_handle(handle);
                self.query_pipeline.update(&self.collider_set);
                true
            }
            None => false,
        }
    }

    fn remove_handle(&mut self, handle: rapier3d::geometry::ColliderHandle) {
        self.collider_set.remove(
            handle,
            &mut self.island_manager,
            &mut self.rigid_body_set,
            false,
        );
    }

    /// Whether an entity has a collider
    pub fn has_collider(&self, entity: Entity) -> bool {
        self.colliders.contains_key(&entity)
    }

    /// Entities that own a collider
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.colliders.keys().copied()
    }

    /// Number of colliders
    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    /// Check if there are no colliders
    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }
}

impl Default for Physics {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsQuery for Physics {
    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        exclude: Option<Entity>,
    ) -> Option<RaycastHit> {
        let ray = Ray::new(point![origin.x, origin.y, origin.z], to_rapier(direction));

        let mut filter = QueryFilter::default();
        if let Some(&handle) = exclude.and_then(|e| self.colliders.get(&e)) {
            filter = filter.exclude_collider(handle);
        }

        let (handle, distance) = self.query_pipeline.cast_ray(
            &self.rigid_body_set,
            &self.collider_set,
            &ray,
            max_distance,
            true,
            filter,
        )?;

        let entity = entity_from_bits(self.collider_set.get(handle)?.user_data)?;
        let point = ray.point_at(distance);
        Some(RaycastHit {
            entity,
            point: Vec3::new(point.x, point.y, point.z),
            distance,
        })
    }

    fn closest_point(&self, entity: Entity, point: Vec3) -> Option<Vec3> {
        let handle = self.colliders.get(&entity)?;
        let collider = self.collider_set.get(*handle)?;
        let projection = collider.shape().project_point(
            collider.position(),
            &point![point.x, point.y, point.z],
            true,
        );
        let p = projection.point;
        Some(Vec3::new(p.x, p.y, p.z))
    }
}
