//! Particle Tycoon - a gravity-well collection simulation
//!
//! Core modules:
//! - `sim`: Particle simulation (planets, walls, particle lifecycle, populations)
//! - `economy`: Wallet and purchase errors
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences (quality, slider overrides)

pub mod economy;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use economy::{PurchaseError, Wallet};
pub use settings::{QualityPreset, Settings};
pub use tuning::{Tuning, TuningError};

use glam::DVec2;
use rand::Rng;

/// Default gameplay constants (authoritative defaults for `Tuning::default()`)
pub mod consts {
    /// Nominal host frame rate
    pub const NOMINAL_FPS: f64 = 60.0;

    /// Gravity constant: 2.0 per frame at the nominal rate, expressed per second
    pub const GRAVITY_STRENGTH: f64 = 2.0 * NOMINAL_FPS;
    /// Distance exponent in `F = m1 * m2 / d^k`
    pub const GRAVITY_EXPONENT: f64 = 1.5;
    /// Width of the linear ramp beyond a planet's gravity distance
    pub const FADE_ZONE_WIDTH: f64 = 200.0;
    /// Speed retained after bouncing off a wall
    pub const WALL_ENERGY_LOSS: f64 = 0.8;
    /// Extra push past the wall surface after a bounce
    pub const WALL_SEPARATION: f64 = 0.5;
    /// Extra reach added to `planet.radius + particle.radius` for collection
    pub const COLLECT_BUFFER: f64 = 0.0;
    /// Half-width of the clone orbit ring
    pub const CLONE_ORBIT_TOLERANCE: f64 = 6.0;
    /// Particles beyond this |x| or |y| are despawned
    pub const WORLD_LIMIT: f64 = 100_000.0;
    /// Distances below this contribute no force
    pub const MIN_FORCE_DISTANCE: f64 = 1e-6;

    /// Particle defaults
    pub const PARTICLE_RADIUS: f64 = 5.0;
    pub const PARTICLE_MASS: f64 = 1.0;
    pub const PARTICLE_LIFETIME: f64 = 20.0;
    pub const FADE_DURATION: f64 = 1.0;
    pub const FADE_IN_DURATION: f64 = 0.3;
    pub const EXPLOSION_DURATION: f64 = 1.0;
    pub const EXPLOSION_FRAGMENTS: usize = 8;
    /// Spawn speed range (world units per second)
    pub const SPAWN_SPEED_MIN: f64 = 0.8 * NOMINAL_FPS;
    pub const SPAWN_SPEED_MAX: f64 = 2.2 * NOMINAL_FPS;

    /// Planet defaults
    pub const PLANET_RADIUS: f64 = 48.0;
    pub const PLANET_MASS_PER_RADIUS: f64 = 2.0;
    pub const PLANET_GRAVITY_DISTANCE: f64 = 500.0;
    pub const DWARF_PLANET_RADIUS: f64 = 20.0;
    pub const DWARF_PLANET_MASS_PER_RADIUS: f64 = 0.8;
    pub const DWARF_PLANET_GRAVITY_DISTANCE: f64 = 300.0;
    pub const DWARF_PLANET_MAX_LEVEL: u32 = 3;
    pub const AIR_RESISTANCE: f64 = 0.1;
    /// Clone orbit ring radius as a multiple of planet radius
    pub const CLONE_ORBIT_RADIUS_FACTOR: f64 = 4.0;

    /// World emitter (particles per second, square world box)
    pub const EMITTER_SPAWN_RATE: f64 = 90.0;
    pub const EMITTER_WORLD_SIZE: f64 = 80_000.0;
    /// Placeable spawner
    pub const SPAWNER_SPAWN_RATE: f64 = 5.0;
    pub const SPAWNER_JITTER: f64 = 50.0;

    /// Economy
    pub const STARTING_MONEY: u64 = 100;
    pub const PLANET_COST: u64 = 40;
    pub const DWARF_PLANET_COST: u64 = 15;
    pub const SPAWNER_COST: u64 = 200;
    pub const SPAWN_RATE_COST: u64 = 100;
    pub const WALL_COST_PER_UNIT: f64 = 0.5;
    /// Value credited per collected particle
    pub const PARTICLE_VALUE: u64 = 1;
    /// Extra pick radius around a planet for selection
    pub const PICK_MARGIN: f64 = 10.0;
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f64, theta: f64) -> DVec2 {
    DVec2::new(r * theta.cos(), r * theta.sin())
}

/// Random vector with a uniform direction and a speed drawn from `[min, max)`
pub fn random_velocity<R: Rng>(rng: &mut R, min: f64, max: f64) -> DVec2 {
    let theta = rng.random_range(0.0..std::f64::consts::TAU);
    let speed = if max > min {
        rng.random_range(min..max)
    } else {
        min
    };
    polar_to_cartesian(speed, theta)
}

/// Uniform point in the axis-aligned box `center ± half_extent`
pub fn random_point_in_box<R: Rng>(rng: &mut R, center: DVec2, half_extent: DVec2) -> DVec2 {
    fn offset<R: Rng>(rng: &mut R, h: f64) -> f64 {
        if h > 0.0 { rng.random_range(-h..h) } else { 0.0 }
    }
    let dx = offset(rng, half_extent.x);
    let dy = offset(rng, half_extent.y);
    center + DVec2::new(dx, dy)
}
