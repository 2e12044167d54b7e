//! Melee enemy
//!
//! Walks its target list in order, hacking through each obstacle until it
//! breaks, then moves on. Celebrates (stops) once the list is exhausted.

use glam::Vec3;
use hecs::Entity;

use crate::agents::{AgentContext, DeathSignal};
use crate::ai::{ApproachResolver, TargetList, TargetStatus, TargetView};
use crate::core::{ArenaEvent, EnemyConfig};
use crate::ecs::{DamageOutcome, Transform};
use crate::nav::NavAgent;

/// Controller for one melee enemy
#[derive(Debug)]
pub struct EnemyController {
    entity: Entity,
    config: EnemyConfig,
    targets: TargetList,
    resolver: ApproachResolver,
    nav_agent: NavAgent,
    attack_cooldown: f32,
    within_attack_range: bool,
    alive: bool,
    won: bool,
    died: DeathSignal,
}

impl EnemyController {
    #[must_use]
    pub fn new(entity: Entity, position: Vec3, targets: TargetList, config: EnemyConfig) -> Self {
        let nav_agent = NavAgent::new(position, config.speed, config.approach.stopping_distance)
            .with_area_mask(config.approach.area_mask);
        Self {
            entity,
            resolver: ApproachResolver::new(config.approach.clone()),
            config,
            targets,
            nav_agent,
            attack_cooldown: 0.0,
            within_attack_range: false,
            alive: true,
            won: false,
            died: DeathSignal::new(),
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

    /// No targets left; the enemy stands still for good
    #[must_use]
    pub fn has_won(&self) -> bool {
        self.won
    }

    #[must_use]
    pub fn current_target(&self) -> Option<Entity> {
        self.targets.current()
    }

    #[must_use]
    pub fn targets(&self) -> &TargetList {
        &self.targets
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
    pub fn is_within_attack_range(&self) -> bool {
        self.within_attack_range
    }

    #[must_use]
    pub fn attack_cooldown(&self) -> f32 {
        self.attack_cooldown
    }

    /// Observers notified when this enemy dies
    pub fn death_signal(&mut self) -> &mut DeathSignal {
        &mut self.died
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
        if self.won {
            return;
        }

        self.attack(ctx);
        self.validate_target(ctx);
        if self.won {
            return;
        }

        let Some(target) = self.targets.current() else {
            return;
        };
        let Some(view) = ctx.target_view(target) else {
            return;
        };
        self.locomotion(ctx, &view);
    }

    fn attack(&mut self, ctx: &mut AgentContext<'_>) {
        let target = self.targets.current();
        match target {
            Some(target) if self.attack_cooldown <= 0.0 && self.within_attack_range => {
                self.attack_cooldown = self.config.time_between_attacks;
                let outcome = ctx.world.apply_damage(target, self.config.damage);
                if outcome == DamageOutcome::Ignored {
                    return;
                }
                ctx.events.push(ArenaEvent::EntityDamaged {
                    entity: target,
                    amount: self.config.damage,
                    source: Some(self.entity),
                });
                if outcome == DamageOutcome::Destroyed && ctx.world.is_breakable(target) {
                    ctx.events.push(ArenaEvent::ObstacleDestroyed { entity: target });
                }
            }
            _ if self.attack_cooldown > 0.0 => {
                self.attack_cooldown = (self.attack_cooldown - ctx.dt).max(0.0);
            }
            _ => {}
        }
    }

    fn validate_target(&mut self, ctx: &mut AgentContext<'_>) {
        let world = &*ctx.world;
        match self.targets.update(|e| world.is_active(e)) {
            TargetStatus::Advanced { from, to } => {
                log::debug!("{:?} advancing from {from:?} to {to:?}", self.entity);
                self.resolver.reset();
                self.within_attack_range = false;
                ctx.events.push(ArenaEvent::TargetAdvanced {
                    agent: self.entity,
                    from,
                    to,
                });
            }
            TargetStatus::ObjectiveReached => {
                log::info!("{:?} reached its objective", self.entity);
                self.won = true;
                self.within_attack_range = false;
                self.nav_agent.reset_path();
                self.resolver.hold_at(self.nav_agent.position);
                ctx.events.push(ArenaEvent::ObjectiveReached { agent: self.entity });
            }
            TargetStatus::Engaging(_) | TargetStatus::Idle => {}
        }
    }

    fn locomotion(&mut self, ctx: &mut AgentContext<'_>, view: &TargetView) {
        self.resolver.tick(
            self.entity,
            &mut self.nav_agent,
            view,
            ctx.physics,
            ctx.nav,
            ctx.dt,
        );

        self.within_attack_range = self.resolver.is_within_reach(&self.nav_agent);
        let position = self.nav_agent.advance(ctx.dt);

        if let Ok(mut transform) = ctx.world.get_mut::<Transform>(self.entity) {
            transform.position = position;
            if self.within_attack_range {
                transform.rotation =
                    self.resolver
                        .face_approach_point(transform.rotation, position, ctx.dt);
            }
        }
    }

    fn die(&mut self, ctx: &mut AgentContext<'_>) {
        log::info!("Enemy {:?} died", self.entity);
        self.alive = false;
        self.within_attack_range = false;
        self.nav_agent.reset_path();
        ctx.world.mark_dead(self.entity);
        ctx.events.push(ArenaEvent::AgentDied { agent: self.entity });
        self.died.emit(self.entity);
    }
}
