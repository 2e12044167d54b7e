//! Approach point resolution
//!
//! Decides, every tick, the exact point a mobile agent steers toward. The
//! target's pivot is fine while the target is far or hidden, but once it is
//! in direct view the agent aims at the closest point of the target's
//! surface instead: a half-collapsed wall's pivot can sit inside solid
//! geometry. The line-of-sight raycast runs at most once per recheck period.
//!
//! Shared by every mobile agent type; controllers own one resolver each.

use glam::{Quat, Vec3};
use hecs::Entity;

use crate::core::ApproachTuning;
use crate::nav::{NavAgent, NavMeshService};
use crate::physics::PhysicsQuery;

/// How the current approach point was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApproachMode {
    /// Steering at the target's live position
    #[default]
    Direct,
    /// Steering at the closest surface point, held for the recheck period
    Refined,
}

/// What the resolver needs to know about the target this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetView {
    pub entity: Entity,
    /// Live pivot position
    pub position: Vec3,
    /// Vertical size, scales the nav mesh sampling radius
    pub height: f32,
}

/// Per-agent steering state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SteeringState {
    /// Point currently steered toward; `None` until the first target is seen
    pub approach_point: Option<Vec3>,
    /// Time left before the next line-of-sight check
    pub recheck_timer: f32,
    pub mode: ApproachMode,
    /// Approach point the active nav path was requested for
    pub requested_destination: Option<Vec3>,
}

/// Outcome of synchronizing the nav path with the approach point
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathRequest {
    /// Approach point unchanged, nothing requested
    Unchanged,
    /// New path set toward the sampled walkable point
    Updated(Vec3),
    /// The nav mesh found no path; the previous one is kept
    Failed,
}

/// Approach point resolver for one agent
#[derive(Debug, Clone)]
pub struct ApproachResolver {
    tuning: ApproachTuning,
    state: SteeringState,
}

impl ApproachResolver {
    #[must_use]
    pub fn new(tuning: ApproachTuning) -> Self {
        Self {
            tuning,
            state: SteeringState::default(),
        }
    }

    #[must_use]
    pub fn tuning(&self) -> &ApproachTuning {
        &self.tuning
    }

    #[must_use]
    pub fn state(&self) -> &SteeringState {
        &self.state
    }

    #[must_use]
    pub fn approach_point(&self) -> Option<Vec3> {
        self.state.approach_point
    }

    #[must_use]
    pub fn mode(&self) -> ApproachMode {
        self.state.mode
    }

    /// Forget everything; the next tick starts from the target's position
    pub fn reset(&mut self) {
        self.state = SteeringState::default();
    }

    /// Pin the approach point in place, e.g. on the agent's own position
    pub fn hold_at(&mut self, point: Vec3) {
        self.state = SteeringState {
            approach_point: Some(point),
            ..SteeringState::default()
        };
    }

    /// Whether the agent stands within stopping distance of its approach point
    #[must_use]
    pub fn is_arrived(&self, agent_position: Vec3) -> bool {
        self.state
            .approach_point
            .is_some_and(|p| p.distance(agent_position) <= self.tuning.stopping_distance)
    }

    /// Close enough to act on the target.
    ///
    /// Either within stopping distance of the approach point, or parked at the
    /// end of a nav path requested for the current approach point. The second
    /// case covers approach points the nav mesh cannot reach exactly, such as
    /// a wall face that does not line up with walkable geometry.
    #[must_use]
    pub fn is_within_reach(&self, agent: &NavAgent) -> bool {
        if self.is_arrived(agent.position) {
            return true;
        }
        let path_is_current = self.state.requested_destination.is_some()
            && self.state.requested_destination == self.state.approach_point;
        path_is_current && agent.has_arrived()
    }

    /// Update the approach point for this tick and return it.
    pub fn update_approach_point(
        &mut self,
        agent: Entity,
        agent_position: Vec3,
        target: &TargetView,
        physics: &dyn PhysicsQuery,
        dt: f32,
    ) -> Vec3 {
        let current = *self.state.approach_point.get_or_insert(target.position);

        let distance_to_point = current.distance(agent_position);
        let distance_to_target = target.position.distance(agent_position);

        // Target moved relative to the last decision
        if (distance_to_point - distance_to_target).abs() > self.tuning.range_buffer {
            self.set_direct(target.position);
        }

        if self.state.recheck_timer > 0.0 || distance_to_point < self.tuning.stopping_distance {
            self.state.recheck_timer = (self.state.recheck_timer - dt).max(0.0);
            return self.point_or(target.position);
        }

        let direction = (target.position - agent_position).normalize_or_zero();
        let visible = direction != Vec3::ZERO
            && physics
                .raycast(agent_position, direction, f32::MAX, Some(agent))
                .is_some_and(|hit| hit.entity == target.entity);

        if visible {
            match physics.closest_point(target.entity, agent_position) {
                Some(surface) => {
                    if self.state.mode != ApproachMode::Refined {
                        log::trace!("{agent:?} refined approach on {:?}", target.entity);
                    }
                    self.state.approach_point = Some(surface);
                    self.state.mode = ApproachMode::Refined;
                    self.state.recheck_timer = self.tuning.recheck_period;
                }
                None => {
                    log::trace!("{:?} has no geometry, keeping approach point", target.entity);
                }
            }
        } else {
            if self.state.mode != ApproachMode::Direct {
                log::trace!("{agent:?} lost sight of {:?}", target.entity);
            }
            self.set_direct(target.position);
        }

        self.point_or(target.position)
    }

    /// Request a new nav path if the approach point moved since the last request.
    pub fn sync_path(
        &mut self,
        nav: &dyn NavMeshService,
        agent: &mut NavAgent,
        target: &TargetView,
    ) -> PathRequest {
        let Some(point) = self.state.approach_point else {
            return PathRequest::Unchanged;
        };
        if self.state.requested_destination == Some(point) {
            return PathRequest::Unchanged;
        }

        let radius = (target.height / self.tuning.sample_radius_divisor)
            .max(self.tuning.min_sample_radius);
        let destination = nav
            .sample_position(point, radius, self.tuning.area_mask)
            .unwrap_or(point);

        match nav.calculate_path(agent.position, destination, self.tuning.area_mask) {
            Some(path) => {
                agent.set_path(path);
                self.state.requested_destination = Some(point);
                PathRequest::Updated(destination)
            }
            None => {
                log::debug!(
                    "No nav path from {} to {destination}, keeping previous path",
                    agent.position
                );
                PathRequest::Failed
            }
        }
    }

    /// Resolve the approach point and keep the nav path in sync with it.
    pub fn tick(
        &mut self,
        agent: Entity,
        nav_agent: &mut NavAgent,
        target: &TargetView,
        physics: &dyn PhysicsQuery,
        nav: &dyn NavMeshService,
        dt: f32,
    ) -> PathRequest {
        self.update_approach_point(agent, nav_agent.position, target, physics, dt);
        self.sync_path(nav, nav_agent, target)
    }

    /// Turn `rotation` toward the approach point around the Y axis.
    #[must_use]
    pub fn face_approach_point(&self, rotation: Quat, agent_position: Vec3, dt: f32) -> Quat {
        let Some(point) = self.state.approach_point else {
            return rotation;
        };
        turn_towards(rotation, agent_position, point, self.tuning.turn_speed * dt)
    }

    fn set_direct(&mut self, position: Vec3) {
        self.state.approach_point = Some(position);
        self.state.mode = ApproachMode::Direct;
    }

    fn point_or(&self, fallback: Vec3) -> Vec3 {
        self.state.approach_point.unwrap_or(fallback)
    }
}

/// Yaw-only rotation looking from `from` toward `to`, forward being -Z
#[must_use]
pub fn look_rotation_yaw(from: Vec3, to: Vec3) -> Option<Quat> {
    let direction = Vec3::new(to.x - from.x, 0.0, to.z - from.z).normalize_or_zero();
    if direction == Vec3::ZERO {
        return None;
    }
    Some(Quat::from_rotation_y(f32::atan2(-direction.x, -direction.z)))
}

/// Blend `rotation` toward facing `to` by factor `t` (clamped to 0..=1)
#[must_use]
pub fn turn_towards(rotation: Quat, from: Vec3, to: Vec3, t: f32) -> Quat {
    match look_rotation_yaw(from, to) {
        Some(look) => rotation.lerp(look, t.clamp(0.0, 1.0)),
        None => rotation,
    }
}
