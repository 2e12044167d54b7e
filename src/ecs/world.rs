//! World wrapper around hecs

use glam::Vec3;
use hecs::Entity;

use crate::ai::{ObstacleFootprint, ObstacleQuery};
use crate::ecs::{Breakable, Dead, Footprint, Health, Hostile, Inactive, Transform};

/// Result of applying damage to an entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageOutcome {
    /// Damage applied, entity still standing
    Damaged {
        /// Health left after the hit
        remaining: f32,
    },
    /// This hit depleted the entity's health
    Destroyed,
    /// Entity is missing, inactive or has no health
    Ignored,
}

/// Game world containing all entities and components
pub struct World {
    /// The underlying hecs world
    pub inner: hecs::World,
}

impl World {
    /// Create a new empty world
    pub fn new() -> Self {
        Self {
            inner: hecs::World::new(),
        }
    }

    /// Spawn an entity with the given components
    pub fn spawn(&mut self, components: impl hecs::DynamicBundle) -> Entity {
        self.inner.spawn(components)
    }

    /// Spawn a destructible obstacle occupying `bounds`
    pub fn spawn_obstacle(&mut self, bounds: crate::geometry::Aabb, durability: f32) -> Entity {
        self.inner.spawn((
            Transform::from_position(bounds.center()).with_scale(bounds.size()),
            Footprint(bounds),
            Health::new(durability, 0.0),
            Breakable,
        ))
    }

    /// Despawn an entity
    pub fn despawn(&mut self, entity: Entity) -> Result<(), hecs::NoSuchEntity> {
        self.inner.despawn(entity)
    }

    /// Get a reference to a component
    pub fn get<T: hecs::Component>(
        &self,
        entity: Entity,
    ) -> Result<hecs::Ref<'_, T>, hecs::ComponentError> {
        self.inner.get::<&T>(entity)
    }

    /// Get a mutable reference to a component
    pub fn get_mut<T: hecs::Component>(
        &mut self,
        entity: Entity,
    ) -> Result<hecs::RefMut<'_, T>, hecs::ComponentError> {
        self.inner.get::<&mut T>(entity)
    }

    /// Check if an entity exists
    pub fn contains(&self, entity: Entity) -> bool {
        self.inner.contains(entity)
    }

    /// An entity is active while it exists and has not been disabled
    pub fn is_active(&self, entity: Entity) -> bool {
        self.inner.contains(entity) && self.inner.get::<&Inactive>(entity).is_err()
    }

    /// Whether an agent is still alive (exists, active, not dead)
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.is_active(entity) && self.inner.get::<&Dead>(entity).is_err()
    }

    /// Whether the entity is a destructible obstacle
    pub fn is_breakable(&self, entity: Entity) -> bool {
        self.inner.get::<&Breakable>(entity).is_ok()
    }

    /// Disable an entity without despawning it
    pub fn deactivate(&mut self, entity: Entity) {
        if self.inner.insert_one(entity, Inactive).is_err() {
            log::debug!("deactivate: {entity:?} no longer exists");
        }
    }

    /// Mark an agent dead
    pub fn mark_dead(&mut self, entity: Entity) {
        if self.inner.insert_one(entity, Dead).is_err() {
            log::debug!("mark_dead: {entity:?} no longer exists");
        }
    }

    /// World position of an entity
    pub fn position(&self, entity: Entity) -> Option<Vec3> {
        self.inner
            .get::<&Transform>(entity)
            .ok()
            .map(|transform| transform.position)
    }

    /// Overwrite the position of an entity (no-op if missing)
    pub fn set_position(&mut self, entity: Entity, position: Vec3) {
        if let Ok(mut transform) = self.inner.get::<&mut Transform>(entity) {
            transform.position = position;
        }
    }

    /// Current health value, if the entity has one
    pub fn health(&self, entity: Entity) -> Option<f32> {
        self.inner.get::<&Health>(entity).ok().map(|h| h.health)
    }

    /// Apply damage to an entity.
    ///
    /// Breakable entities are deactivated when their health is depleted.
    pub fn apply_damage(&mut self, entity: Entity, amount: f32) -> DamageOutcome {
        if !self.is_active(entity) {
            return DamageOutcome::Ignored;
        }

        let (depleted, remaining) = match self.inner.get::<&mut Health>(entity) {
            Ok(mut health) => {
                let depleted = health.take_damage(amount);
                (depleted, health.health)
            }
            Err(_) => return DamageOutcome::Ignored,
        };

        if !depleted {
            return DamageOutcome::Damaged { remaining };
        }

        if self.inner.get::<&Breakable>(entity).is_ok() {
            log::info!("Obstacle {entity:?} destroyed");
            self.deactivate(entity);
        }
        DamageOutcome::Destroyed
    }

    /// Living hostile entities with their positions
    pub fn hostiles(&self) -> Vec<(Entity, Vec3)> {
        self.inner
            .query::<(&Transform, &Hostile, Option<&Dead>, Option<&Inactive>)>()
            .iter()
            .filter(|(_, (_, _, dead, inactive))| dead.is_none() && inactive.is_none())
            .map(|(entity, (transform, _, _, _))| (entity, transform.position))
            .collect()
    }

    /// Get the number of entities
    pub fn len(&self) -> u32 {
        self.inner.len()
    }

    /// Check if the world is empty
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Clear all entities from the world
    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// Query for entities with specific components
    pub fn query<Q: hecs::Query>(&self) -> hecs::QueryBorrow<'_, Q> {
        self.inner.query::<Q>()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl ObstacleQuery for World {
    fn obstacles(&self) -> Vec<ObstacleFootprint> {
        self.inner
            .query::<(&Footprint, &Breakable, Option<&Inactive>)>()
            .iter()
            .filter(|(_, (_, _, inactive))| inactive.is_none())
            .map(|(entity, (footprint, _, _))| ObstacleFootprint {
                entity,
                bounds: footprint.0,
            })
            .collect()
    }

    fn durability(&self, entity: Entity) -> Option<f32> {
        if !self.is_active(entity) {
            return None;
        }
        self.health(entity)
    }
}
