//! Arena simulation loop
//!
//! Owns the world, the collision scene, the nav mesh and every agent. Setup
//! plans the breach route once; each tick then updates every agent exactly
//! once, in the order they were spawned.

use glam::Vec3;
use hecs::Entity;

use crate::agents::{
    Agent, AgentContext, EnemyController, PossessionCoordinator, RangedUnit, SharedPossession,
    Turret, WaveTracker,
};
use crate::ai::{
    ArenaGrid, GridPath, TargetList, TargetSequence, build_grid, extract_targets, find_path,
};
use crate::core::{ArenaEvent, EventQueue, PathError, SimulationConfig};
use crate::ecs::{Breakable, Footprint, Health, Hostile, Name, Transform, World};
use crate::geometry::Aabb;
use crate::nav::NavMeshService;
use crate::physics::Physics;

/// Capsule used for mobile agents, standing on their pivot
const AGENT_HALF_HEIGHT: f32 = 0.5;
const AGENT_RADIUS: f32 = 0.4;

fn capsule_center(feet: Vec3) -> Vec3 {
    feet + Vec3::Y * (AGENT_HALF_HEIGHT + AGENT_RADIUS)
}

/// A breach scenario: obstacles, a goal, and the agents fighting over them
pub struct Arena {
    config: SimulationConfig,
    world: World,
    physics: Physics,
    nav: Box<dyn NavMeshService>,
    grid: Option<ArenaGrid>,
    path: Option<GridPath>,
    targets: Option<TargetSequence>,
    agents: Vec<Agent>,
    events: EventQueue,
    possession: SharedPossession,
    wave: WaveTracker,
    ticks: u64,
    elapsed: f32,
}

impl Arena {
    /// Create an empty arena over the given nav mesh
    pub fn new(config: SimulationConfig, nav: impl NavMeshService + 'static) -> Self {
        Self {
            config,
            world: World::new(),
            physics: Physics::new(),
            nav: Box::new(nav),
            grid: None,
            path: None,
            targets: None,
            agents: Vec::new(),
            events: EventQueue::new(),
            possession: PossessionCoordinator::shared(),
            wave: WaveTracker::new(),
            ticks: 0,
            elapsed: 0.0,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn physics(&self) -> &Physics {
        &self.physics
    }

    pub fn nav(&self) -> &dyn NavMeshService {
        self.nav.as_ref()
    }

    /// Event queue; after [`Arena::tick`] the tick's events are pending
    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    /// Shared possession handle, for whatever drives player selection
    pub fn possession(&self) -> SharedPossession {
        SharedPossession::clone(&self.possession)
    }

    pub fn wave(&self) -> &WaveTracker {
        &self.wave
    }

    pub fn grid(&self) -> Option<&ArenaGrid> {
        self.grid.as_ref()
    }

    pub fn path(&self) -> Option<&GridPath> {
        self.path.as_ref()
    }

    /// Planned breach order, set by [`Arena::plan`]
    pub fn target_sequence(&self) -> Option<&TargetSequence> {
        self.targets.as_ref()
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Spawn a destructible obstacle
    pub fn spawn_obstacle(&mut self, bounds: Aabb, durability: f32) -> Entity {
        let entity = self.world.spawn_obstacle(bounds, durability);
        self.physics.add_box(entity, &bounds);
        self.nav.carve(&bounds);
        entity
    }

    /// Spawn the objective the attackers are trying to reach
    pub fn spawn_goal(&mut self, bounds: Aabb, health: f32) -> Entity {
        let entity = self.world.spawn((
            Name::new("Goal"),
            Transform::from_position(bounds.center()).with_scale(bounds.size()),
            Health::new(health, 0.0),
            Breakable,
        ));
        self.physics.add_box(entity, &bounds);
        entity
    }

    /// Plan the breach route from `start` to `goal`.
    ///
    /// Builds the arena grid, searches it and extracts the target sequence.
    /// On failure the previously planned sequence is kept.
    ///
    /// # Errors
    ///
    /// Returns [`PathError`] if the goal has no position or cannot be reached.
    pub fn plan(&mut self, start: Vec3, goal: Entity) -> Result<&TargetSequence, PathError> {
        let goal_position = self
            .world
            .position(goal)
            .ok_or(PathError::UnknownGoal { goal })?;

        let mut grid = build_grid(&self.world, start, goal_position, &self.config.arena);
        let path = match find_path(&mut grid, start, goal_position, &self.world) {
            Ok(path) => path,
            Err(err) => {
                log::warn!("Planning failed, keeping previous targets: {err}");
                return Err(err);
            }
        };

        let sequence = extract_targets(&grid, &path, goal);
        log::info!(
            "Breach plan: {} obstacles then goal, path cost {}",
            sequence.obstacles().len(),
            path.cost
        );
        self.grid = Some(grid);
        self.path = Some(path);
        Ok(self.targets.insert(sequence))
    }

    /// Spawn an enemy that works through the planned target sequence
    pub fn spawn_enemy(&mut self, position: Vec3) -> Entity {
        let targets = self
            .targets
            .as_ref()
            .map(TargetList::from_sequence)
            .unwrap_or_default();
        self.spawn_enemy_with_targets(position, targets)
    }

    /// Spawn an enemy with an explicit target list
    pub fn spawn_enemy_with_targets(&mut self, position: Vec3, targets: TargetList) -> Entity {
        let config = self.config.enemy.clone();
        let entity = self.world.spawn((
            Name::new("Enemy"),
            Transform::from_position(position),
            Health::new(config.health, config.damage),
            Hostile,
        ));
        self.physics.add_capsule(
            entity,
            capsule_center(position),
            AGENT_HALF_HEIGHT,
            AGENT_RADIUS,
        );

        let mut enemy = EnemyController::new(entity, position, targets, config);
        self.wave.track(enemy.death_signal());
        self.agents.push(enemy.into());
        entity
    }

    /// Spawn a wave of enemies, one per position
    pub fn spawn_wave(&mut self, positions: &[Vec3]) -> Vec<Entity> {
        self.wave.reset_spawned();
        positions.iter().map(|&p| self.spawn_enemy(p)).collect()
    }

    /// Spawn a ranged deployable
    pub fn spawn_ranged(&mut self, position: Vec3, target: Option<Entity>) -> Entity {
        let config = self.config.ranged.clone();
        let entity = self.world.spawn((
            Name::new("Ranged"),
            Transform::from_position(position),
            Health::new(config.health, config.damage),
        ));
        self.physics.add_capsule(
            entity,
            capsule_center(position),
            AGENT_HALF_HEIGHT,
            AGENT_RADIUS,
        );

        let mut unit = RangedUnit::new(entity, position, config, self.possession());
        unit.set_target(target);
        self.agents.push(unit.into());
        entity
    }

    /// Spawn a turret
    pub fn spawn_turret(&mut self, position: Vec3) -> Entity {
        let config = self.config.turret.clone();
        let entity = self.world.spawn((
            Name::new("Turret"),
            Transform::from_position(position),
            Health::new(config.health, config.damage),
        ));
        let body = Aabb::new(
            position - Vec3::new(0.5, 0.0, 0.5),
            position + Vec3::new(0.5, 1.5, 0.5),
        );
        self.physics.add_box(entity, &body);
        self.agents.push(Turret::new(entity, position, config, self.possession()).into());
        entity
    }

    pub fn agent(&self, entity: Entity) -> Option<&Agent> {
        self.agents.iter().find(|a| a.entity() == entity)
    }

    pub fn agent_mut(&mut self, entity: Entity) -> Option<&mut Agent> {
        self.agents.iter_mut().find(|a| a.entity() == entity)
    }

    pub fn enemy(&self, entity: Entity) -> Option<&EnemyController> {
        match self.agent(entity)? {
            Agent::Enemy(enemy) => Some(enemy),
            _ => None,
        }
    }

    pub fn ranged_mut(&mut self, entity: Entity) -> Option<&mut RangedUnit> {
        match self.agent_mut(entity)? {
            Agent::Ranged(unit) => Some(unit),
            _ => None,
        }
    }

    pub fn turret_mut(&mut self, entity: Entity) -> Option<&mut Turret> {
        match self.agent_mut(entity)? {
            Agent::Turret(turret) => Some(turret),
            _ => None,
        }
    }

    /// Agents still taking part
    pub fn live_agents(&self) -> usize {
        self.agents.iter().filter(|a| a.is_alive()).count()
    }

    /// Advance the simulation by `dt` seconds
    pub fn tick(&mut self, dt: f32) {
        self.events.swap();
        // Damage applied from outside since the last tick
        remove_destroyed(&self.world, &mut self.physics, self.nav.as_mut());

        for agent in &mut self.agents {
            let entity = agent.entity();
            let raised_before = self.events.pending_len();
            let mut ctx = AgentContext {
                world: &mut self.world,
                physics: &self.physics,
                nav: self.nav.as_ref(),
                events: &mut self.events,
                dt,
            };
            agent.update(&mut ctx);

            if matches!(agent, Agent::Enemy(_) | Agent::Ranged(_)) {
                if let Some(position) = self.world.position(entity) {
                    self.physics.set_position(entity, capsule_center(position));
                }
            }
            // Later agents must not see colliders of what this one destroyed
            let removed_any = self
                .events
                .pending()
                .skip(raised_before)
                .any(ArenaEvent::removes_entity);
            if removed_any {
                remove_destroyed(&self.world, &mut self.physics, self.nav.as_mut());
            }
        }

        self.ticks += 1;
        self.elapsed += dt;
    }

    /// Whether `event` was raised during the most recent tick
    pub fn raised(&self, event: &ArenaEvent) -> bool {
        self.events.pending().any(|e| e == event)
    }
}

/// Drop colliders and nav carving of everything no longer alive
fn remove_destroyed(world: &World, physics: &mut Physics, nav: &mut dyn NavMeshService) {
    let stale: Vec<Entity> = physics.entities().filter(|&e| !world.is_alive(e)).collect();

    for entity in stale {
        physics.remove(entity);
        if let Ok(footprint) = world.get::<Footprint>(entity) {
            nav.uncarve(&footprint.0);
        }
        log::trace!("Removed collider of {entity:?}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ArenaConfig;
    use crate::nav::WalkableGrid;

    fn arena_with(arena: ArenaConfig) -> Arena {
        let config = SimulationConfig {
            arena,
            ..Default::default()
        };
        Arena::new(
            config,
            WalkableGrid::new(40, 40, 1.0, Vec3::new(-20.0, 0.0, -20.0)),
        )
    }

    fn arena() -> Arena {
        arena_with(ArenaConfig::default())
    }

    fn wall(x0: f32, x1: f32, z: f32) -> Aabb {
        Aabb::new(Vec3::new(x0, 0.0, z - 0.5), Vec3::new(x1, 2.0, z + 0.5))
    }

    fn goal_box(z: f32) -> Aabb {
        Aabb::from_center_half_extents(Vec3::new(0.0, 1.0, z), Vec3::ONE)
    }

    #[test]
    fn test_plan_lists_blocking_wall_before_goal() {
        let mut arena = arena_with(ArenaConfig::default().with_padding(0.0));
        // Spans the whole grid width: no way around it
        let barrier = arena.spawn_obstacle(wall(-30.0, 30.0, -5.0), 50.0);
        let goal = arena.spawn_goal(goal_box(-12.0), 100.0);

        let sequence = arena.plan(Vec3::ZERO, goal).cloned();

        assert_eq!(sequence.map(|s| s.to_vec()), Ok(vec![barrier, goal]));
        assert!(arena.grid().is_some());
        assert!(arena.path().is_some_and(|p| p.cost >= 50.0));
    }

    #[test]
    fn test_plan_unknown_goal_keeps_previous_sequence() {
        let mut arena = arena();
        let goal = arena.spawn_goal(goal_box(-8.0), 100.0);
        assert!(arena.plan(Vec3::ZERO, goal).is_ok());

        let ghost = arena.world_mut().spawn(());
        assert_eq!(
            arena.plan(Vec3::ZERO, ghost).err(),
            Some(PathError::UnknownGoal { goal: ghost })
        );
        assert_eq!(
            arena.target_sequence().map(TargetSequence::goal),
            Some(goal)
        );
    }

    #[test]
    fn test_destroyed_obstacle_loses_collider() {
        let mut arena = arena();
        let barrier = arena.spawn_obstacle(wall(-3.0, 3.0, -5.0), 10.0);
        arena.tick(0.1);
        assert!(arena.physics().has_collider(barrier));

        arena.world_mut().apply_damage(barrier, 10.0);
        arena.tick(0.1);
        assert!(!arena.physics().has_collider(barrier));
    }

    #[test]
    fn test_enemies_tracked_by_wave() {
        let mut arena = arena();
        let goal = arena.spawn_goal(goal_box(-8.0), 100.0);
        assert!(arena.plan(Vec3::ZERO, goal).is_ok());

        let enemies = arena.spawn_wave(&[Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0)]);
        assert_eq!(arena.wave().alive(), 2);

        arena.world_mut().apply_damage(enemies[0], 1000.0);
        arena.tick(0.1);

        assert_eq!(arena.wave().alive(), 1);
        assert_eq!(arena.live_agents(), 1);
        assert!(arena.raised(&ArenaEvent::AgentDied { agent: enemies[0] }));
        assert!(!arena.physics().has_collider(enemies[0]));
    }

    #[test]
    fn test_collider_cleared_in_the_tick_the_obstacle_breaks() {
        let mut arena = arena_with(ArenaConfig::default().with_padding(0.0));
        let barrier = arena.spawn_obstacle(wall(-30.0, 30.0, -3.0), 20.0);
        let goal = arena.spawn_goal(goal_box(-10.0), 1000.0);
        assert!(arena.plan(Vec3::ZERO, goal).is_ok());
        arena.spawn_enemy(Vec3::ZERO);

        let destroyed = ArenaEvent::ObstacleDestroyed { entity: barrier };
        let mut broke = false;
        for _ in 0..100 {
            arena.tick(0.1);
            if arena.raised(&destroyed) {
                broke = true;
                break;
            }
            assert!(arena.physics().has_collider(barrier));
        }

        assert!(broke);
        assert!(!arena.physics().has_collider(barrier));
    }
}
