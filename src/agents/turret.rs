//! Defensive turret
//!
//! Locks onto the closest living enemy in range, tracks it with a smoothed
//! aim point and fires a hitscan shot once per reload. While possessed, the
//! player aims and pulls the trigger instead.

use glam::Vec3;
use hecs::Entity;

use crate::agents::{AgentContext, SharedPossession};
use crate::ai::turn_towards;
use crate::core::{ArenaEvent, TurretConfig};
use crate::ecs::{DamageOutcome, Transform};

/// Height of the muzzle and of the aim point above an enemy's pivot
const AIM_HEIGHT: f32 = 1.0;

/// Below this the aim point sits on the muzzle and no shot is fired
const MIN_SHOT_DISTANCE_SQ: f32 = 0.0001;

/// Controller for one turret
#[derive(Debug)]
pub struct Turret {
    entity: Entity,
    config: TurretConfig,
    possession: SharedPossession,
    target: Option<Entity>,
    aim_point: Vec3,
    reload: f32,
    trigger: bool,
    active: bool,
}

impl Turret {
    #[must_use]
    pub fn new(
        entity: Entity,
        position: Vec3,
        config: TurretConfig,
        possession: SharedPossession,
    ) -> Self {
        Self {
            entity,
            config,
            possession,
            target: None,
            aim_point: position + Vec3::NEG_Z + Vec3::Y * AIM_HEIGHT,
            reload: 0.0,
            trigger: false,
            active: true,
        }
    }

    #[must_use]
    pub fn entity(&self) -> Entity {
        self.entity
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub fn target(&self) -> Option<Entity> {
        self.target
    }

    #[must_use]
    pub fn aim_point(&self) -> Vec3 {
        self.aim_point
    }

    /// Seconds until the next shot is chambered
    #[must_use]
    pub fn reload(&self) -> f32 {
        self.reload
    }

    /// Point the turret at `point` (player control)
    pub fn aim_at(&mut self, point: Vec3) {
        self.aim_point = point;
    }

    /// Hold or release the trigger (player control)
    pub fn set_trigger(&mut self, pressed: bool) {
        self.trigger = pressed;
    }

    /// Run one tick
    pub fn update(&mut self, ctx: &mut AgentContext<'_>) {
        if !self.active {
            return;
        }

        let Some(position) = ctx.world.position(self.entity) else {
            return;
        };
        let player_controlled = self.possession.borrow().is_selected(self.entity);

        self.acquire_target(ctx, position);
        if self.reload > 0.0 {
            self.reload = (self.reload - ctx.dt).max(0.0);
        }

        let target = self.target;
        match target {
            _ if player_controlled => {
                if self.trigger {
                    self.fire(ctx, position);
                }
            }
            Some(target) if ctx.world.is_alive(target) => self.engage(ctx, position, target),
            _ => {}
        }

        if let Ok(mut transform) = ctx.world.get_mut::<Transform>(self.entity) {
            transform.rotation = turn_towards(transform.rotation, position, self.aim_point, 1.0);
        }

        if ctx.world.health(self.entity).is_some_and(|h| h <= 0.0) {
            self.destroy(ctx);
        }
    }

    fn acquire_target(&mut self, ctx: &AgentContext<'_>, position: Vec3) {
        if self.target.is_some_and(|t| ctx.world.is_alive(t)) {
            return;
        }
        let closest = ctx
            .world
            .hostiles()
            .into_iter()
            .map(|(entity, pos)| (entity, pos.distance(position)))
            .filter(|&(_, distance)| distance <= self.config.range)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(entity, _)| entity);

        if closest.is_some() && closest != self.target {
            log::debug!("Turret {:?} locked onto {closest:?}", self.entity);
        }
        self.target = closest;
    }

    fn engage(&mut self, ctx: &mut AgentContext<'_>, position: Vec3, target: Entity) {
        let Some(target_position) = ctx.world.position(target) else {
            self.target = None;
            return;
        };

        let blend = (self.config.aim_speed * ctx.dt).clamp(0.0, 1.0);
        self.aim_point = self
            .aim_point
            .lerp(target_position + Vec3::Y * AIM_HEIGHT, blend);

        if target_position.distance(position) > self.config.leave_range {
            log::debug!("Turret {:?} lost {target:?}", self.entity);
            self.target = None;
            return;
        }

        self.fire(ctx, position);
    }

    fn fire(&mut self, ctx: &mut AgentContext<'_>, position: Vec3) {
        if self.reload > 0.0 {
            return;
        }
        let muzzle = position + Vec3::Y * AIM_HEIGHT;
        let to_aim = self.aim_point - muzzle;
        if to_aim.length_squared() < MIN_SHOT_DISTANCE_SQ {
            return;
        }

        self.reload = 1.0 / self.config.fire_rate.max(f32::EPSILON);
        ctx.events.push(ArenaEvent::TurretFired {
            turret: self.entity,
            target: self.target,
            aim_point: self.aim_point,
        });

        let Some(hit) = ctx
            .physics
            .raycast(muzzle, to_aim.normalize(), f32::MAX, Some(self.entity))
        else {
            return;
        };
        match ctx.world.apply_damage(hit.entity, self.config.damage) {
            DamageOutcome::Ignored => {}
            outcome => {
                ctx.events.push(ArenaEvent::EntityDamaged {
                    entity: hit.entity,
                    amount: self.config.damage,
                    source: Some(self.entity),
                });
                if outcome == DamageOutcome::Destroyed && ctx.world.is_breakable(hit.entity) {
                    ctx.events.push(ArenaEvent::ObstacleDestroyed { entity: hit.entity });
                }
            }
        }
    }

    fn destroy(&mut self, ctx: &mut AgentContext<'_>) {
        log::info!("Turret {:?} destroyed", self.entity);
        if self.possession.borrow_mut().release_if(self.entity) {
            ctx.events.push(ArenaEvent::ControlReleased { unit: self.entity });
        }
        self.active = false;
        self.target = None;
        ctx.world.deactivate(self.entity);
        ctx.events.push(ArenaEvent::AgentDied { agent: self.entity });
    }
}
