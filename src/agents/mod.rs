//! Arena agents
//!
//! Controllers for the units that act in the arena each tick: melee enemies
//! breaking toward the goal, ranged deployables and turrets defending it.
//! Every controller is driven by an explicit `update` call from the arena
//! loop with an [`AgentContext`] holding the shared services.

mod death;
mod enemy;
mod possession;
mod ranged;
mod turret;

pub use death::{DeathSignal, SubscriptionId, WaveTracker};
pub use enemy::EnemyController;
pub use possession::{PossessionCoordinator, SharedPossession};
pub use ranged::{ControlMode, RangedUnit};
pub use turret::Turret;

use hecs::Entity;

use crate::ai::TargetView;
use crate::core::EventQueue;
use crate::ecs::{Transform, World};
use crate::nav::NavMeshService;
use crate::physics::PhysicsQuery;

/// Services an agent reads and writes during its update
pub struct AgentContext<'a> {
    pub world: &'a mut World,
    pub physics: &'a dyn PhysicsQuery,
    pub nav: &'a dyn NavMeshService,
    pub events: &'a mut EventQueue,
    /// Tick length in seconds
    pub dt: f32,
}

impl AgentContext<'_> {
    /// Snapshot of `target` for the approach resolver
    pub fn target_view(&self, target: Entity) -> Option<TargetView> {
        let transform = self.world.get::<Transform>(target).ok()?;
        Some(TargetView {
            entity: target,
            position: transform.position,
            height: transform.scale.y,
        })
    }
}

/// Any agent the arena updates
#[derive(Debug)]
pub enum Agent {
    Enemy(EnemyController),
    Ranged(RangedUnit),
    Turret(Turret),
}

impl Agent {
    /// The entity this agent drives
    #[must_use]
    pub fn entity(&self) -> Entity {
        match self {
            Self::Enemy(enemy) => enemy.entity(),
            Self::Ranged(unit) => unit.entity(),
            Self::Turret(turret) => turret.entity(),
        }
    }

    /// Whether the agent still takes part in the simulation
    #[must_use]
    pub fn is_alive(&self) -> bool {
        match self {
            Self::Enemy(enemy) => enemy.is_alive(),
            Self::Ranged(unit) => unit.is_alive(),
            Self::Turret(turret) => turret.is_active(),
        }
    }

    /// Run one tick
    pub fn update(&mut self, ctx: &mut AgentContext<'_>) {
        match self {
            Self::Enemy(enemy) => enemy.update(ctx),
            Self::Ranged(unit) => unit.update(ctx),
            Self::Turret(turret) => turret.update(ctx),
        }
    }
}

impl From<EnemyController> for Agent {
    fn from(enemy: EnemyController) -> Self {
        Self::Enemy(enemy)
    }
}

impl From<RangedUnit> for Agent {
    fn from(unit: RangedUnit) -> Self {
        Self::Ranged(unit)
    }
}

impl From<Turret> for Agent {
    fn from(turret: Turret) -> Self {
        Self::Turret(turret)
    }
}
