//! Particle simulation module
//!
//! All gameplay logic lives here:
//! - Single-threaded, advanced by the observed frame time
//! - Seeded RNG only
//! - Particles report collections and clones as events, never mutating
//!   their owner mid-pass
//! - No rendering or platform dependencies

pub mod collision;
pub mod particle;
pub mod planet;
pub mod population;
pub mod state;
pub mod tick;
pub mod wall;

pub use collision::{CollisionResult, circle_segment_collision, reflect_velocity};
pub use particle::{
    CloneSpec, CollectionEvent, Environment, ExplosionFragment, ForceOverrides, Origin,
    PARTICLE_COLORS, Particle, ParticleEvent, ParticleId, ParticleState,
};
pub use planet::{PLANET_TYPES, Planet, PlanetClass, PlanetId, PlanetType};
pub use population::{Population, PopulationReport, SpawnRegion};
pub use state::World;
pub use tick::{TickReport, tick};
pub use wall::Wall;
