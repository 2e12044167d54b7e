//! Demo siege: a wave of enemies breaks into a walled courtyard while a
//! turret and a ranged unit defend the keep.
//!
//! Usage: `breachpath [config.ron]`. Set `RUST_LOG=debug` for details.

use breachpath::prelude::*;

const TICK: f32 = 1.0 / 30.0;
const MAX_SECONDS: f32 = 180.0;

fn load_config() -> Result<SimulationConfig, Box<dyn std::error::Error>> {
    match std::env::args().nth(1) {
        Some(path) if path.ends_with(".json") => Ok(SimulationConfig::load_json(&path)?),
        Some(path) => Ok(SimulationConfig::load_ron(&path)?),
        None => Ok(SimulationConfig::default()),
    }
}

fn wall(x0: f32, x1: f32, z0: f32, z1: f32) -> Aabb {
    Aabb::new(Vec3::new(x0, 0.0, z0), Vec3::new(x1, 2.5, z1))
}

fn build_courtyard(arena: &mut Arena) -> Entity {
    // Front wall with a weak gate in the middle
    arena.spawn_obstacle(wall(-13.0, -2.0, -7.0, -6.0), 400.0);
    arena.spawn_obstacle(wall(-2.0, 2.0, -7.0, -6.0), 60.0);
    arena.spawn_obstacle(wall(2.0, 13.0, -7.0, -6.0), 400.0);

    // Sides and back close the ring
    arena.spawn_obstacle(wall(-13.0, -12.0, -27.0, -7.0), 400.0);
    arena.spawn_obstacle(wall(12.0, 13.0, -27.0, -7.0), 400.0);
    arena.spawn_obstacle(wall(-12.0, 12.0, -27.0, -26.0), 400.0);

    arena.spawn_goal(
        Aabb::from_center_half_extents(Vec3::new(0.0, 1.5, -20.0), Vec3::new(2.0, 1.5, 2.0)),
        300.0,
    )
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = load_config()?;
    let nav = WalkableGrid::new(48, 48, 1.0, Vec3::new(-24.0, 0.0, -28.0));
    let mut arena = Arena::new(config, nav);

    let goal = build_courtyard(&mut arena);
    let spawn = Vec3::new(0.0, 0.0, 10.0);

    match arena.plan(spawn, goal) {
        Ok(sequence) => log::info!("Breach order: {:?}", sequence.entries()),
        Err(err) => {
            log::error!("Cannot plan a breach: {err}");
            return Ok(());
        }
    }

    let turret = arena.spawn_turret(Vec3::new(6.0, 0.0, -17.0));
    arena.spawn_ranged(Vec3::new(-4.0, 0.0, -17.0), None);
    arena.spawn_wave(&[
        spawn,
        spawn + Vec3::new(-2.0, 0.0, 1.0),
        spawn + Vec3::new(2.0, 0.0, 1.0),
    ]);

    while arena.elapsed() < MAX_SECONDS {
        arena.tick(TICK);

        for event in arena.events().pending() {
            match event {
                ArenaEvent::ObstacleDestroyed { entity } => log::info!("{entity:?} broke"),
                ArenaEvent::ObjectiveReached { agent } => log::info!("{agent:?} reached the keep"),
                ArenaEvent::AgentDied { agent } => log::info!("{agent:?} fell"),
                _ => {}
            }
        }

        if !arena.world().is_active(goal) {
            log::info!("The keep fell after {:.1}s", arena.elapsed());
            break;
        }
        if arena.wave().is_cleared() {
            log::info!("Wave repelled after {:.1}s", arena.elapsed());
            break;
        }
    }

    let turret_alive = arena.agent(turret).is_some_and(Agent::is_alive);
    log::info!(
        "Finished after {} ticks: {} enemies alive, turret {}",
        arena.ticks(),
        arena.wave().alive(),
        if turret_alive { "standing" } else { "destroyed" }
    );
    Ok(())
}
