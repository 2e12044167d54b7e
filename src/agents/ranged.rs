//! Ranged deployable
//!
//! A mobile defender that either follows its assigned target on its own or,
//! while possessed, walks wherever the player's stick points relative to the
//! view.

use glam::{Quat, Vec2, Vec3};
use hecs::Entity;

use crate::agents::{AgentContext, SharedPossession};
use crate::ai::ApproachResolver;
use crate::core::{ArenaEvent, RangedConfig};
use crate::ecs::Transform;
use crate::nav::NavAgent;

/// Who is steering the unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlMode {
    #[default]
    Ai,
    Player,
}

/// Controller for one ranged deployable
#[derive(Debug)]
pub struct RangedUnit {
    entity: Entity,
    config: RangedConfig,
    possession: SharedPossession,
    target: Option<Entity>,
    resolver: ApproachResolver,
    nav_agent: NavAgent,
    mode: ControlMode,
    raw_input: Vec2,
    smoothed_input: Vec2,
    view_yaw: f32,
    alive: bool,
}

impl RangedUnit {
    #[must_use]
    pub fn new(
        entity: Entity,
        position: Vec3,
        config: RangedConfig,
        possession: SharedPossession,
    ) -> Self {
        let nav_agent = NavAgent::new(position, config.speed, config.approach.stopping_distance)
            .with_area_mask(config.approach.area_mask);
        Self {
            entity,
            resolver: ApproachResolver::new(config.approach.clone()),
            config,
            possession,
            target: None,
            nav_agent,
            mode: ControlMode::Ai,
            raw_input: Vec2::ZERO,
            smoothed_input: Vec2::ZERO,
            view_yaw: 0.0,
            alive: true,
        }
    }

    #[must_use]
    pub fn entity(&self) -> Entity {
        self.entity
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    #[must_use]
    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    #[must_use]
    pub fn target(&self) -> Option<Entity> {
        self.target
    }

    pub fn set_target(&mut self, target: Option<Entity>) {
        if self.target != target {
            self.resolver.reset();
        }
        self.target = target;
    }

    #[must_use]
    pub fn resolver(&self) -> &ApproachResolver {
        &self.resolver
    }

    #[must_use]
    pub fn nav_agent(&self) -> &NavAgent {
        &self.nav_agent
    }

    #[must_use]
    pub fn smoothed_input(&self) -> Vec2 {
        self.smoothed_input
    }

    /// Raw stick input, each axis in -1..=1
    pub fn set_input(&mut self, input: Vec2) {
        self.raw_input = input.clamp(Vec2::NEG_ONE, Vec2::ONE);
    }

    /// Yaw of the player's view, in radians
    pub fn set_view_yaw(&mut self, yaw: f32) {
        self.view_yaw = yaw;
    }

    /// Run one tick
    pub fn update(&mut self, ctx: &mut AgentContext<'_>) {
        if !self.alive {
            return;
        }
        if ctx.world.health(self.entity).is_some_and(|h| h <= 0.0) {
            self.die(ctx);
            return;
        }

        let mode = if self.possession.borrow().is_selected(self.entity) {
            ControlMode::Player
        } else {
            ControlMode::Ai
        };
        if mode != self.mode {
            self.switch_mode(mode);
        }

        match self.mode {
            ControlMode::Player => self.player_control(ctx),
            ControlMode::Ai => self.ai_control(ctx),
        }
    }

    fn switch_mode(&mut self, mode: ControlMode) {
        log::debug!("{:?} switching to {mode:?} control", self.entity);
        self.mode = mode;
        self.nav_agent.reset_path();
        self.resolver.hold_at(self.nav_agent.position);
        self.raw_input = Vec2::ZERO;
        self.smoothed_input = Vec2::ZERO;
    }

    fn player_control(&mut self, ctx: &mut AgentContext<'_>) {
        let rate = if self.raw_input.length() > self.smoothed_input.length() {
            self.config.input_accel
        } else {
            self.config.input_decel
        };
        self.smoothed_input = move_towards(self.smoothed_input, self.raw_input, rate * ctx.dt);

        let view = Quat::from_rotation_y(self.view_yaw);
        let forward = view * Vec3::NEG_Z;
        let right = view * Vec3::X;
        let mut desired = forward * self.smoothed_input.y + right * self.smoothed_input.x;
        if desired.length_squared() > 1.0 {
            desired = desired.normalize();
        }
        self.nav_agent
            .move_by(desired * self.nav_agent.speed * ctx.dt, ctx.dt);

        let turn = (self.config.approach.turn_speed * ctx.dt).clamp(0.0, 1.0);
        if let Ok(mut transform) = ctx.world.get_mut::<Transform>(self.entity) {
            transform.position = self.nav_agent.position;
            transform.rotation = transform.rotation.slerp(view, turn);
        }
    }

    fn ai_control(&mut self, ctx: &mut AgentContext<'_>) {
        let Some(target) = self.target.filter(|&t| ctx.world.is_active(t)) else {
            return;
        };
        let Some(view) = ctx.target_view(target) else {
            return;
        };

        self.resolver.tick(
            self.entity,
            &mut self.nav_agent,
            &view,
            ctx.physics,
            ctx.nav,
            ctx.dt,
        );
        let arrived = self.resolver.is_within_reach(&self.nav_agent);
        let position = self.nav_agent.advance(ctx.dt);

        if let Ok(mut transform) = ctx.world.get_mut::<Transform>(self.entity) {
            transform.position = position;
            if arrived {
                transform.rotation =
                    self.resolver
                        .face_approach_point(transform.rotation, position, ctx.dt);
            }
        }
    }

    fn die(&mut self, ctx: &mut AgentContext<'_>) {
        log::info!("Ranged unit {:?} died", self.entity);
        if self.possession.borrow_mut().release_if(self.entity) {
            ctx.events.push(ArenaEvent::ControlReleased { unit: self.entity });
        }
        self.alive = false;
        self.nav_agent.reset_path();
        ctx.world.mark_dead(self.entity);
        ctx.events.push(ArenaEvent::AgentDied { agent: self.entity });
    }
}

/// Step `current` toward `target` by at most `max_delta`
fn move_towards(current: Vec2, target: Vec2, max_delta: f32) -> Vec2 {
    let delta = target - current;
    let distance = delta.length();
    if distance <= max_delta || distance <= f32::EPSILON {
        target
    } else {
        current + delta / distance * max_delta
    }
}
