//! Common ECS components

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::geometry::Aabb;

/// Transform component for position, rotation, and scale
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Transform {
    /// Position in world space
    pub position: Vec3,
    /// Rotation as a quaternion
    pub rotation: Quat,
    /// Scale factor
    pub scale: Vec3,
}

impl Transform {
    /// Create a new transform at the origin
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transform with just a position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Set the scale
    #[must_use]
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Get the forward direction (negative Z in local space)
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// Translate by a delta
    pub fn translate(&mut self, delta: Vec3) {
        self.position += delta;
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

/// Name component for debugging
#[derive(Debug, Clone)]
pub struct Name(pub String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

/// Hit points and outgoing damage
///
/// For obstacles, `health` is the durability the grid pathfinder reads as
/// traversal cost.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    /// Remaining health; destroyed at or below zero
    pub health: f32,
    /// Damage dealt per attack by this entity
    pub damage: f32,
}

impl Health {
    /// Create with the given health and damage
    #[must_use]
    pub const fn new(health: f32, damage: f32) -> Self {
        Self { health, damage }
    }

    /// Subtract damage, returns true if this hit brought health to zero or below
    pub fn take_damage(&mut self, amount: f32) -> bool {
        let was_alive = self.health > 0.0;
        self.health -= amount;
        was_alive && self.health <= 0.0
    }

    /// Whether health is depleted
    #[must_use]
    pub fn is_depleted(&self) -> bool {
        self.health <= 0.0
    }
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100.0, 20.0)
    }
}

/// Marks a destructible obstacle (wall segment)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Breakable;

/// Marks an entity that turrets treat as an enemy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Hostile;

/// Marks an agent that has died; kept in the world for ragdoll/cleanup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dead;

/// Marks a disabled entity (destroyed wall, disabled turret)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Inactive;

/// World-space bounds of an entity's solid geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Footprint(pub Aabb);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_damage_reports_depletion_once() {
        let mut health = Health::new(30.0, 0.0);

        assert!(!health.take_damage(20.0));
        assert!(health.take_damage(20.0));
        assert!(health.is_depleted());
        // Already depleted, further hits do not report again
        assert!(!health.take_damage(5.0));
    }
}
