//! Arena AI
//!
//! Grid-level planning (which obstacles to break, in what order) and
//! per-agent steering toward the current target.

mod approach;
mod arena;
mod lifecycle;
mod pathfinding;
mod targets;

pub use approach::{
    ApproachMode, ApproachResolver, PathRequest, SteeringState, TargetView, look_rotation_yaw,
    turn_towards,
};
pub use arena::{
    ArenaGrid, Cell, CellCoord, ObstacleFootprint, ObstacleQuery, build_grid, fit_region,
};
pub use lifecycle::{TargetList, TargetStatus};
pub use pathfinding::{GridPath, HEURISTIC_SCALE, find_path, step_cost};
pub use targets::{TargetSequence, extract_targets};
