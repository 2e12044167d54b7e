//! Core module
//!
//! Configuration, errors, the event queue and the arena simulation loop

mod config;
mod error;
mod events;
mod simulation;

pub use config::{
    ApproachTuning, ArenaConfig, EnemyConfig, RangedConfig, SimulationConfig, TurretConfig,
};
pub use error::{ConfigError, PathError};
pub use events::{ArenaEvent, EventQueue};
pub use simulation::Arena;
