//! Geometry primitives
//!
//! Axis-aligned bounds shared by the grid builder, physics and steering.

mod bounds;

pub use bounds::Aabb;
