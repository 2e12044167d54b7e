//! Entity Component System module
//!
//! Built on top of the hecs ECS library

mod components;
mod world;

pub use components::{Breakable, Dead, Footprint, Health, Hostile, Inactive, Name, Transform};
pub use world::{DamageOutcome, World};
