//! Particle population managers (the world emitter and placed spawners)
//!
//! A population owns its particles for their whole life. Each update it
//! spawns on a timer, advances every particle against the shared planets and
//! walls, splices in clones after the pass, then drops dead particles.

use glam::DVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::particle::{CollectionEvent, Environment, Origin, Particle, ParticleEvent, ParticleId};
use crate::random_point_in_box;
use crate::tuning::{ParticleTuning, SpawnTuning};

/// Where new particles appear
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SpawnRegion {
    /// Uniform over the box `±half_extent` around the origin
    World { half_extent: f64 },
    /// Uniform over a small box around a fixed point
    Anchored { anchor: DVec2, jitter: f64 },
}

impl SpawnRegion {
    pub fn sample<R: Rng>(&self, rng: &mut R) -> DVec2 {
        match *self {
            SpawnRegion::World { half_extent } => {
                random_point_in_box(rng, DVec2::ZERO, DVec2::splat(half_extent))
            }
            SpawnRegion::Anchored { anchor, jitter } => {
                random_point_in_box(rng, anchor, DVec2::splat(jitter))
            }
        }
    }
}

/// What happened during one population update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PopulationReport {
    pub collected: Vec<CollectionEvent>,
    pub spawned: usize,
    pub cloned: usize,
    /// Oldest particles dropped to stay under the cap
    pub evicted: usize,
}

impl PopulationReport {
    /// Total currency carried by the collection events
    pub fn value(&self) -> u64 {
        self.collected.iter().map(|event| event.value).sum()
    }

    pub fn merge(&mut self, other: PopulationReport) {
        self.collected.extend(other.collected);
        self.spawned += other.spawned;
        self.cloned += other.cloned;
        self.evicted += other.evicted;
    }
}

/// A group of particles sharing one spawn policy
#[derive(Debug, Clone)]
pub struct Population {
    pub region: SpawnRegion,
    /// Origin tag given to spawned particles
    pub origin: Origin,
    /// Particles per second
    pub spawn_rate: f64,
    spawn_timer: f64,
    /// Live particles, oldest first
    pub particles: Vec<Particle>,
    pub max_particles: usize,
    next_id: ParticleId,
    /// Reused between updates to avoid per-tick allocation
    events: Vec<ParticleEvent>,
}

impl Population {
    pub fn new(region: SpawnRegion, origin: Origin, spawn_rate: f64, max_particles: usize) -> Self {
        Self {
            region,
            origin,
            spawn_rate,
            spawn_timer: 0.0,
            particles: Vec::new(),
            max_particles,
            next_id: 1,
            events: Vec::new(),
        }
    }

    /// World-wide emitter
    pub fn emitter(tuning: &SpawnTuning, max_particles: usize) -> Self {
        Self::new(
            SpawnRegion::World {
                half_extent: tuning.half_extent,
            },
            Origin::Emitter,
            tuning.spawn_rate,
            max_particles,
        )
    }

    /// Fixed-point spawner placed by the player
    pub fn spawner(anchor: DVec2, tuning: &SpawnTuning, max_particles: usize) -> Self {
        Self::new(
            SpawnRegion::Anchored {
                anchor,
                jitter: tuning.half_extent,
            },
            Origin::Spawner,
            tuning.spawn_rate,
            max_particles,
        )
    }

    /// Anchor point for spawners, `None` for the world emitter
    pub fn anchor(&self) -> Option<DVec2> {
        match self.region {
            SpawnRegion::Anchored { anchor, .. } => Some(anchor),
            SpawnRegion::World { .. } => None,
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    fn allocate_id(&mut self) -> ParticleId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Add a particle with an explicit position and velocity
    pub fn insert(&mut self, position: DVec2, velocity: DVec2, tuning: &ParticleTuning) -> ParticleId {
        let id = self.allocate_id();
        self.particles
            .push(Particle::new(id, position, velocity, self.origin, tuning));
        id
    }

    /// Drop every particle and restart the spawn timer
    pub fn clear(&mut self) {
        self.particles.clear();
        self.spawn_timer = 0.0;
    }

    /// Advance the spawn timer and create any particles that are due
    ///
    /// At most `max_particles` are created per call; a longer backlog is dropped.
    fn spawn_due<R: Rng>(&mut self, dt: f64, tuning: &ParticleTuning, rng: &mut R) -> usize {
        if self.spawn_rate <= 0.0 {
            return 0;
        }
        let interval = 1.0 / self.spawn_rate;
        self.spawn_timer += dt;

        let mut spawned = 0;
        while self.spawn_timer >= interval {
            if spawned >= self.max_particles {
                // Anything past a full population would be evicted this tick
                self.spawn_timer %= interval;
                break;
            }
            self.spawn_timer -= interval;
            let position = self.region.sample(rng);
            let id = self.allocate_id();
            self.particles
                .push(Particle::spawn(id, position, self.origin, tuning, rng));
            spawned += 1;
        }
        spawned
    }

    /// Run one tick for the whole population
    pub fn update<R: Rng>(&mut self, dt: f64, env: &mut Environment<'_>, rng: &mut R) -> PopulationReport {
        let tuning = env.tuning;
        let mut report = PopulationReport {
            spawned: self.spawn_due(dt, &tuning.particle, rng),
            ..Default::default()
        };

        let mut events = std::mem::take(&mut self.events);
        events.clear();
        for particle in &mut self.particles {
            particle.update(dt, env, rng, &mut events);
        }

        // Clones join after the pass so the collection is never mutated mid-iteration
        for event in events.drain(..) {
            match event {
                ParticleEvent::Collected(collected) => report.collected.push(collected),
                ParticleEvent::Cloned(spec) => {
                    let id = self.allocate_id();
                    self.particles
                        .push(Particle::from_clone(id, &spec, &tuning.particle));
                    report.cloned += 1;
                }
            }
        }
        self.events = events;

        self.particles.retain(|p| !p.is_dead());
        report.evicted = self.evict_oldest();
        report
    }

    /// Enforce the live-particle cap by dropping the oldest entries
    fn evict_oldest(&mut self) -> usize {
        let excess = self.particles.len().saturating_sub(self.max_particles);
        if excess > 0 {
            self.particles.drain(..excess);
            log::debug!("Evicted {} particles (cap {})", excess, self.max_particles);
        }
        excess
    }
}
