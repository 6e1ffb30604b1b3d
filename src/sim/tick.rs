//! Simulation step
//!
//! Advances the whole world by one observed frame time. There is no fixed
//! timestep accumulator: a long frame integrates a long `dt`.

use super::particle::{CollectionEvent, Environment};
use super::population::PopulationReport;
use super::state::World;

/// What one tick produced, for the economy and FX layers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub collected: Vec<CollectionEvent>,
    /// Currency credited this tick
    pub earned: u64,
    pub spawned: usize,
    pub cloned: usize,
    pub evicted: usize,
    /// Particles alive after the tick
    pub live_particles: usize,
}

/// Advance the world by `dt` seconds
///
/// Non-positive or non-finite `dt` is ignored.
pub fn tick(world: &mut World, dt: f64) -> TickReport {
    if !(dt.is_finite() && dt > 0.0) {
        return TickReport {
            live_particles: world.particle_count(),
            ..Default::default()
        };
    }

    let max_particles = world.settings.max_particles();
    let mut env = Environment {
        planets: &mut world.planets,
        walls: &world.walls,
        tuning: &world.tuning,
        overrides: world.settings.force_overrides(),
        trail_length: world.settings.trail_length(),
    };

    let mut combined = PopulationReport::default();
    let populations = std::iter::once(&mut world.emitter).chain(world.spawners.iter_mut());
    for population in populations {
        population.max_particles = max_particles;
        combined.merge(population.update(dt, &mut env, &mut world.rng));
    }

    let earned = combined.value();
    world.wallet.credit(earned);
    world.time += dt;

    if combined.evicted > 0 {
        log::debug!("Tick evicted {} particles", combined.evicted);
    }

    TickReport {
        collected: combined.collected,
        earned,
        spawned: combined.spawned,
        cloned: combined.cloned,
        evicted: combined.evicted,
        live_particles: world.particle_count(),
    }
}
