//! Breach planning and steering for arena siege games
//!
//! This crate provides:
//! - Arena grid construction over destructible obstacles
//! - Weighted A* where obstacle durability is the traversal cost
//! - Target sequences: which obstacles to break, in order, to reach a goal
//! - Per-tick approach point resolution with line-of-sight refinement
//! - Enemy, ranged deployable and turret controllers driven by a tick loop

pub mod agents;
pub mod ai;
pub mod core;
pub mod ecs;
pub mod geometry;
pub mod nav;
pub mod physics;

// Re-exports for convenience
pub use glam;
pub use hecs;
pub use rapier3d;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::agents::{
        Agent, AgentContext, ControlMode, DeathSignal, EnemyController, PossessionCoordinator,
        RangedUnit, SharedPossession, Turret, WaveTracker,
    };
    pub use crate::ai::{
        ApproachMode, ApproachResolver, ArenaGrid, CellCoord, GridPath, ObstacleQuery,
        TargetList, TargetSequence, TargetStatus, TargetView, build_grid, extract_targets,
        find_path,
    };
    pub use crate::core::{
        ApproachTuning, Arena, ArenaConfig, ArenaEvent, EventQueue, PathError, SimulationConfig,
    };
    pub use crate::ecs::{Health, Name, Transform, World};
    pub use crate::geometry::Aabb;
    pub use crate::nav::{NavAgent, NavMeshService, NavPath, WalkableGrid};
    pub use crate::physics::{Physics, PhysicsQuery, RaycastHit};
    pub use glam::{Quat, Vec2, Vec3};
    pub use hecs::Entity;
}
