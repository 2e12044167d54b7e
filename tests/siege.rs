//! End-to-end scenarios over real hecs worlds and rapier colliders

use breachpath::prelude::*;

fn fixed_grid(size: f32) -> ArenaConfig {
    ArenaConfig::default()
        .with_auto_fit(false)
        .with_fixed_size(Vec2::splat(size))
        .with_origin(Vec3::new(size * 0.5, 0.0, size * 0.5))
        .with_cell_size(1.0)
}

fn cell_center(x: usize, y: usize) -> Vec3 {
    Vec3::new(x as f32 + 0.5, 0.0, y as f32 + 0.5)
}

#[test]
fn test_pathfinder_detours_around_costly_block() {
    let mut world = World::new();
    // Three cells wide, squarely between the corners
    let block = world.spawn_obstacle(
        Aabb::new(Vec3::new(3.0, 0.0, 4.0), Vec3::new(6.0, 2.0, 5.0)),
        50.0,
    );

    let start = cell_center(0, 0);
    let goal = cell_center(9, 9);
    let mut grid = build_grid(&world, start, goal, &fixed_grid(10.0));
    assert_eq!(grid.occupied_count(), 3);

    let path = find_path(&mut grid, start, goal, &world).expect("open grid always has a path");

    assert_eq!(path.cost, 0.0);
    assert!(path.cells.iter().all(|&c| grid.obstacle_at(c) != Some(block)));
    assert_eq!(path.cells.first(), Some(&CellCoord::new(0, 0)));
    assert_eq!(path.cells.last(), Some(&CellCoord::new(9, 9)));
}

#[test]
fn test_pathfinder_breaks_through_weakest_section() {
    let mut world = World::new();
    let row = |x0: f32, x1: f32| Aabb::new(Vec3::new(x0, 0.0, 5.0), Vec3::new(x1, 2.0, 6.0));
    world.spawn_obstacle(row(0.0, 4.0), 200.0);
    let gate = world.spawn_obstacle(row(4.0, 7.0), 50.0);
    world.spawn_obstacle(row(7.0, 10.0), 200.0);

    let start = cell_center(0, 0);
    let goal = cell_center(9, 9);
    let mut grid = build_grid(&world, start, goal, &fixed_grid(10.0));
    let path = find_path(&mut grid, start, goal, &world).expect("walls are finite");

    assert_eq!(path.cost, 50.0);
    let crossed: Vec<_> = path.cells.iter().filter_map(|&c| grid.obstacle_at(c)).collect();
    assert_eq!(crossed, vec![gate]);
}

#[test]
fn test_target_sequence_collapses_thick_wall() {
    let mut world = World::new();
    let band = |z0: f32, z1: f32| Aabb::new(Vec3::new(0.0, 0.0, z0), Vec3::new(10.0, 2.0, z1));
    // Two rows deep, then one row
    let thick = world.spawn_obstacle(band(4.0, 6.0), 30.0);
    let thin = world.spawn_obstacle(band(7.0, 8.0), 30.0);
    let goal = world.spawn((Transform::from_position(cell_center(0, 9)),));

    let start = cell_center(0, 0);
    let mut grid = build_grid(&world, start, cell_center(0, 9), &fixed_grid(10.0));
    let path = find_path(&mut grid, start, cell_center(0, 9), &world).expect("walls are finite");

    assert_eq!(path.cost, 90.0);
    let sequence = extract_targets(&grid, &path, goal);
    assert_eq!(sequence.entries(), &[thick, thin, goal]);
}

#[test]
fn test_build_grid_is_deterministic() {
    let mut world = World::new();
    for i in 0..4 {
        let x = i as f32 * 2.5;
        let bounds = Aabb::new(Vec3::new(x, 0.0, 3.0), Vec3::new(x + 1.5, 2.0, 4.5));
        world.spawn_obstacle(bounds, 10.0);
    }
    let config = ArenaConfig::default();

    let a = build_grid(&world, Vec3::ZERO, Vec3::new(9.0, 0.0, 9.0), &config);
    let b = build_grid(&world, Vec3::ZERO, Vec3::new(9.0, 0.0, 9.0), &config);

    let cells_a: Vec<_> = a.cells().map(|c| (c.coord, c.obstacle)).collect();
    let cells_b: Vec<_> = b.cells().map(|c| (c.coord, c.obstacle)).collect();
    assert_eq!(cells_a, cells_b);
    assert!(a.occupied_count() > 0);

    let bounds = a.bounds();
    assert!(a.cells().all(|c| bounds.contains_xz(a.world_position(c.coord))));
}

fn approach_scene() -> (World, Physics, Entity, Entity, TargetView) {
    let mut world = World::new();
    let mut physics = Physics::new();
    let agent = world.spawn((Transform::from_position(Vec3::new(0.0, 1.0, 0.0)),));
    physics.add_capsule(agent, Vec3::new(0.0, 1.0, 0.0), 0.5, 0.4);

    let bounds =
        Aabb::from_center_half_extents(Vec3::new(0.0, 1.0, -10.0), Vec3::new(2.0, 1.0, 0.5));
    let target = world.spawn_obstacle(bounds, 100.0);
    physics.add_box(target, &bounds);

    let view = TargetView {
        entity: target,
        position: bounds.center(),
        height: bounds.size().y,
    };
    (world, physics, agent, target, view)
}

#[test]
fn test_approach_point_settles_on_surface_with_rapier() {
    let (_world, physics, agent, _target, view) = approach_scene();
    let mut resolver = ApproachResolver::new(ApproachTuning::default());

    let start = Vec3::new(0.0, 1.0, 0.0);
    let first = resolver.update_approach_point(agent, start, &view, &physics, 0.1);
    assert_eq!(resolver.mode(), ApproachMode::Refined);
    assert!((first - Vec3::new(0.0, 1.0, -9.5)).length() < 0.01, "first: {first}");

    for step in 1..9 {
        let position = Vec3::new(0.2 * step as f32, 1.0, -0.5 * step as f32);
        let point = resolver.update_approach_point(agent, position, &view, &physics, 0.1);
        assert_eq!(point, first);
    }
}

#[test]
fn test_approach_point_falls_back_when_blocked_with_rapier() {
    let (mut world, mut physics, agent, _target, view) = approach_scene();
    let crate_box = Aabb::from_center_half_extents(Vec3::new(0.0, 1.0, -5.0), Vec3::splat(0.75));
    let blocker = world.spawn_obstacle(crate_box, 10.0);
    physics.add_box(blocker, &crate_box);
    let mut resolver = ApproachResolver::new(ApproachTuning::default());

    let start = Vec3::new(0.0, 1.0, 0.0);
    let point = resolver.update_approach_point(agent, start, &view, &physics, 0.1);

    assert_eq!(resolver.mode(), ApproachMode::Direct);
    assert_eq!(point, view.position);
}

/// Walled courtyard with a weak gate in the front wall.
///
/// `shift` moves every wall and the goal along z, so faces can be pushed off
/// the nav mesh's cell boundaries.
fn courtyard(nav: WalkableGrid, shift: f32) -> (Arena, Entity, Entity, Vec<Entity>) {
    let mut arena = Arena::new(SimulationConfig::default(), nav);
    let wall = |x0: f32, x1: f32, z0: f32, z1: f32| {
        Aabb::new(Vec3::new(x0, 0.0, z0 + shift), Vec3::new(x1, 2.5, z1 + shift))
    };

    let mut ring = vec![
        arena.spawn_obstacle(wall(-9.0, -2.0, -7.0, -6.0), 400.0),
        arena.spawn_obstacle(wall(2.0, 9.0, -7.0, -6.0), 400.0),
        arena.spawn_obstacle(wall(-9.0, -8.0, -20.0, -7.0), 400.0),
        arena.spawn_obstacle(wall(8.0, 9.0, -20.0, -7.0), 400.0),
    ];
    ring.push(arena.spawn_obstacle(wall(-8.0, 8.0, -20.0, -19.0), 400.0));
    let gate = arena.spawn_obstacle(wall(-2.0, 2.0, -7.0, -6.0), 40.0);
    let goal = arena.spawn_goal(
        Aabb::from_center_half_extents(Vec3::new(0.0, 1.0, -12.0 + shift), Vec3::new(1.5, 1.0, 1.5)),
        60.0,
    );
    (arena, gate, goal, ring)
}

fn siege_arena() -> (Arena, Entity, Entity, Vec<Entity>) {
    courtyard(WalkableGrid::new(40, 48, 1.0, Vec3::new(-20.0, 0.0, -32.0)), 0.0)
}

/// Run until `enemy` wins; returns when the gate broke
fn run_siege(arena: &mut Arena, enemy: Entity, gate: Entity, ticks: usize) -> Option<f32> {
    let mut gate_broken_at = None;
    for _ in 0..ticks {
        arena.tick(1.0 / 30.0);
        let broke = arena.raised(&ArenaEvent::ObstacleDestroyed { entity: gate });
        if broke && gate_broken_at.is_none() {
            gate_broken_at = Some(arena.elapsed());
        }
        if arena.enemy(enemy).is_some_and(EnemyController::has_won) {
            break;
        }
    }
    gate_broken_at
}

#[test]
fn test_plan_goes_through_the_gate() {
    let (mut arena, gate, goal, _ring) = siege_arena();

    let sequence = arena
        .plan(Vec3::new(0.0, 0.0, 8.0), goal)
        .cloned()
        .expect("ring is breakable");

    assert_eq!(sequence.entries(), &[gate, goal]);
}

#[test]
fn test_enemy_breaches_gate_and_destroys_goal() {
    let (mut arena, gate, goal, ring) = siege_arena();
    let spawn = Vec3::new(0.0, 0.0, 8.0);
    assert!(arena.plan(spawn, goal).is_ok());
    let enemy = arena.spawn_enemy(spawn);

    let gate_broken_at = run_siege(&mut arena, enemy, gate, 1200);

    assert!(gate_broken_at.is_some(), "gate never broke");
    assert!(!arena.world().is_active(gate));
    assert!(!arena.world().is_active(goal));
    assert!(!arena.physics().has_collider(gate));
    assert!(arena.enemy(enemy).is_some_and(EnemyController::has_won));
    for wall in ring {
        assert_eq!(arena.world().health(wall), Some(400.0));
    }
}

#[test]
fn test_enemy_breaches_off_grid_walls_on_fine_nav_mesh() {
    // 0.75-unit nav cells; the gate's outer face sits at z = -6.3, inside a
    // carved cell, so the nav mesh can never put the enemy on the face itself
    let nav = WalkableGrid::new(54, 64, 0.75, Vec3::new(-20.25, 0.0, -32.25));
    let (mut arena, gate, goal, ring) = courtyard(nav, -0.3);
    let spawn = Vec3::new(0.0, 0.0, 8.0);
    assert_eq!(
        arena.plan(spawn, goal).map(|s| s.to_vec()),
        Ok(vec![gate, goal])
    );
    let enemy = arena.spawn_enemy(spawn);

    let gate_broken_at = run_siege(&mut arena, enemy, gate, 1800);

    assert!(gate_broken_at.is_some(), "gate never broke");
    assert!(!arena.world().is_active(goal));
    assert!(arena.enemy(enemy).is_some_and(EnemyController::has_won));
    for wall in ring {
        assert_eq!(arena.world().health(wall), Some(400.0));
    }
}

#[test]
fn test_goal_destruction_is_reported_as_obstacle_destroyed() {
    let (mut arena, gate, goal, _ring) = siege_arena();
    let spawn = Vec3::new(0.0, 0.0, 8.0);
    assert!(arena.plan(spawn, goal).is_ok());
    let enemy = arena.spawn_enemy(spawn);

    let mut goal_reported = false;
    for _ in 0..1200 {
        arena.tick(1.0 / 30.0);
        goal_reported |= arena.raised(&ArenaEvent::ObstacleDestroyed { entity: goal });
        if arena.enemy(enemy).is_some_and(EnemyController::has_won) {
            break;
        }
    }

    assert!(!arena.world().is_active(gate));
    assert!(goal_reported);
}

#[test]
fn test_turret_clears_wave() {
    let nav = WalkableGrid::new(20, 20, 1.0, Vec3::new(-10.0, 0.0, -10.0));
    let mut arena = Arena::new(SimulationConfig::default(), nav);
    let turret = arena.spawn_turret(Vec3::ZERO);
    let enemy = arena.spawn_enemy_with_targets(Vec3::new(5.0, 0.0, 0.0), TargetList::default());
    assert_eq!(arena.wave().alive(), 1);

    for _ in 0..200 {
        arena.tick(0.05);
        if arena.wave().is_cleared() {
            break;
        }
    }

    assert!(arena.wave().is_cleared());
    assert!(!arena.world().is_alive(enemy));
    assert!(arena.agent(turret).is_some_and(Agent::is_alive));
}

#[test]
fn test_possessed_turret_holds_fire_without_trigger() {
    let nav = WalkableGrid::new(20, 20, 1.0, Vec3::new(-10.0, 0.0, -10.0));
    let mut arena = Arena::new(SimulationConfig::default(), nav);
    let turret = arena.spawn_turret(Vec3::ZERO);
    let enemy = arena.spawn_enemy_with_targets(Vec3::new(5.0, 0.0, 0.0), TargetList::default());
    arena.possession().borrow_mut().select(turret);

    for _ in 0..40 {
        arena.tick(0.05);
    }
    assert_eq!(arena.world().health(enemy), Some(100.0));

    arena.possession().borrow_mut().release();
    for _ in 0..10 {
        arena.tick(0.05);
    }
    assert!(arena.world().health(enemy).is_some_and(|h| h < 100.0));
}
