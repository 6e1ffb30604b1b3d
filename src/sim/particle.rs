//! The simulated particle: forces, integration, wall bounces and lifecycle
//!
//! ```text
//! Alive --[age > lifetime]--> Fading --[fade timer expires]--> Dead
//! Alive --[touches planet]--> Exploding --[explosion timer expires]--> Dead
//! ```
//!
//! A particle never mutates its owning collection. Anything that affects the
//! outside world (a collection, a clone) is reported as a [`ParticleEvent`].

use std::collections::VecDeque;

use glam::DVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::reflect_velocity;
use super::planet::{Planet, PlanetId};
use super::wall::Wall;
use crate::tuning::{ParticleTuning, PhysicsTuning, Tuning};
use crate::{polar_to_cartesian, random_velocity};

pub type ParticleId = u64;

/// Particle color palette (renderer looks colors up by index)
pub const PARTICLE_COLORS: [[u8; 3]; 8] = [
    [255, 100, 100],
    [100, 255, 100],
    [100, 100, 255],
    [255, 255, 100],
    [255, 100, 255],
    [100, 255, 255],
    [255, 150, 100],
    [150, 100, 255],
];

/// Floor for the fade-in alpha of freshly emitted particles
const FADE_IN_MIN_ALPHA: f64 = 50.0 / 255.0;

/// Minimum radius an explosion fragment shrinks to
const FRAGMENT_MIN_RADIUS: f64 = 0.5;

/// Lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ParticleState {
    Alive,
    /// Lifetime expired; still drifting while it fades out
    Fading { timer: f64 },
    /// Collected by a planet; only fragments animate
    Exploding { timer: f64 },
    /// Eligible for removal; never updated again
    Dead,
}

/// Where a particle came from (only affects fade-in)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Origin {
    Emitter,
    Spawner,
    Clone,
}

/// A short-lived shard thrown out when a particle is collected
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExplosionFragment {
    pub position: DVec2,
    pub velocity: DVec2,
    /// 0-1
    pub alpha: f64,
    pub radius: f64,
}

/// A particle was consumed by a planet
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollectionEvent {
    pub value: u64,
    pub position: DVec2,
    pub planet: PlanetId,
}

/// A particle crossed a clone orbit; the owner should add this particle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CloneSpec {
    pub position: DVec2,
    pub velocity: DVec2,
    pub color: usize,
}

/// Everything a particle reports back to its owner during one update
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ParticleEvent {
    Collected(CollectionEvent),
    Cloned(CloneSpec),
}

/// Player slider values that replace per-planet reach and drag when set
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ForceOverrides {
    pub gravity_distance: Option<f64>,
    pub air_resistance: Option<f64>,
}

/// Shared inputs for one tick of particle updates
///
/// Planets are mutable only so a collection can grow the planet it hit.
pub struct Environment<'a> {
    pub planets: &'a mut [Planet],
    pub walls: &'a [Wall],
    pub tuning: &'a Tuning,
    pub overrides: ForceOverrides,
    /// Number of past positions kept per particle
    pub trail_length: usize,
}

/// Net acceleration on a particle from every planet
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceSample {
    pub acceleration: DVec2,
    /// At least one planet pulled with non-zero gravity
    pub gravity_active: bool,
}

/// Gravity magnitude `M * m / d^k * G`, ramped to zero over the fade zone
pub fn gravity_magnitude(
    planet_mass: f64,
    particle_mass: f64,
    distance: f64,
    reach: f64,
    physics: &PhysicsTuning,
) -> f64 {
    if distance < physics.min_distance {
        return 0.0;
    }
    let ramp = Planet::falloff(distance, reach, physics.fade_zone_width);
    if ramp == 0.0 {
        return 0.0;
    }
    planet_mass * particle_mass / distance.powf(physics.gravity_exponent)
        * physics.gravity_strength
        * ramp
}

/// A simulated particle
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub id: ParticleId,
    pub position: DVec2,
    pub velocity: DVec2,
    pub radius: f64,
    pub mass: f64,
    pub age: f64,
    pub lifetime: f64,
    /// Recent positions, newest first
    pub trail: VecDeque<DVec2>,
    pub state: ParticleState,
    pub fragments: Vec<ExplosionFragment>,
    pub origin: Origin,
    /// Already split by a clone orbit
    pub cloned: bool,
    /// Index into [`PARTICLE_COLORS`]
    pub color: usize,
}

impl Particle {
    pub fn new(
        id: ParticleId,
        position: DVec2,
        velocity: DVec2,
        origin: Origin,
        tuning: &ParticleTuning,
    ) -> Self {
        let mut trail = VecDeque::new();
        trail.push_front(position);
        Self {
            id,
            position,
            velocity,
            radius: tuning.radius,
            mass: tuning.mass,
            age: 0.0,
            lifetime: tuning.lifetime,
            trail,
            state: ParticleState::Alive,
            fragments: Vec::new(),
            origin,
            cloned: false,
            color: 0,
        }
    }

    /// New particle with a random direction, speed and color
    pub fn spawn<R: Rng>(
        id: ParticleId,
        position: DVec2,
        origin: Origin,
        tuning: &ParticleTuning,
        rng: &mut R,
    ) -> Self {
        let velocity = random_velocity(rng, tuning.spawn_speed_min, tuning.spawn_speed_max);
        let mut particle = Self::new(id, position, velocity, origin, tuning);
        particle.color = rng.random_range(0..PARTICLE_COLORS.len());
        particle
    }

    /// Build the second half of a clone-orbit split
    pub fn from_clone(id: ParticleId, spec: &CloneSpec, tuning: &ParticleTuning) -> Self {
        let mut particle = Self::new(id, spec.position, spec.velocity, Origin::Clone, tuning);
        particle.color = spec.color;
        particle.cloned = true;
        particle
    }

    pub fn is_alive(&self) -> bool {
        self.state == ParticleState::Alive
    }

    pub fn is_dead(&self) -> bool {
        self.state == ParticleState::Dead
    }

    /// Advance one tick, pushing any collection/clone events onto `events`
    pub fn update<R: Rng>(
        &mut self,
        dt: f64,
        env: &mut Environment<'_>,
        rng: &mut R,
        events: &mut Vec<ParticleEvent>,
    ) {
        let tuning = env.tuning;
        match self.state {
            ParticleState::Dead => return,
            ParticleState::Exploding { timer } => {
                self.update_explosion(dt, timer, &tuning.particle);
                return;
            }
            ParticleState::Fading { timer } => {
                let timer = timer - dt;
                // Keeps drifting this tick even when the fade just finished
                self.state = if timer <= 0.0 {
                    ParticleState::Dead
                } else {
                    ParticleState::Fading { timer }
                };
            }
            ParticleState::Alive => {}
        }

        let physics = &tuning.physics;
        let forces = self.forces(env.planets, physics, env.overrides);

        // Particles held by a gravity well don't age
        if self.is_alive() && !forces.gravity_active {
            self.age += dt;
            if self.age > self.lifetime {
                self.state = ParticleState::Fading {
                    timer: tuning.particle.fade_duration,
                };
            }
        }

        // Semi-implicit Euler
        let previous = self.position;
        self.velocity += forces.acceleration * dt;
        self.position += self.velocity * dt;
        self.record_trail(env.trail_length);

        self.bounce_off_walls(previous, env.walls, physics);

        if self.is_alive() {
            if let Some(spec) = self.check_clone_orbit(env.planets, physics) {
                events.push(ParticleEvent::Cloned(spec));
            }
            if let Some(event) = self.check_collection(env.planets, tuning, rng) {
                events.push(ParticleEvent::Collected(event));
            }
        }

        if self.position.x.abs() > physics.world_limit || self.position.y.abs() > physics.world_limit {
            self.state = ParticleState::Dead;
            self.fragments.clear();
        }
    }

    /// Sum gravity and air resistance over all planets
    pub fn forces(&self, planets: &[Planet], physics: &PhysicsTuning, overrides: ForceOverrides) -> ForceSample {
        let mut force = DVec2::ZERO;
        let mut gravity_active = false;

        for planet in planets {
            let offset = planet.position - self.position;
            let distance = offset.length();
            if distance < physics.min_distance {
                continue;
            }

            let reach = overrides.gravity_distance.unwrap_or(planet.gravity_distance);
            let ramp = Planet::falloff(distance, reach, physics.fade_zone_width);
            if ramp == 0.0 {
                continue;
            }

            let pull = gravity_magnitude(planet.mass, self.mass, distance, reach, physics);
            if pull > 0.0 {
                gravity_active = true;
                force += offset / distance * pull;
            }

            let drag = overrides.air_resistance.unwrap_or(planet.air_resistance_intensity);
            force -= self.velocity * self.mass * drag * ramp;
        }

        ForceSample {
            acceleration: force / self.mass,
            gravity_active,
        }
    }

    fn record_trail(&mut self, length: usize) {
        if length == 0 {
            self.trail.clear();
            return;
        }
        self.trail.push_front(self.position);
        self.trail.truncate(length);
    }

    fn bounce_off_walls(&mut self, previous: DVec2, walls: &[Wall], physics: &PhysicsTuning) {
        for wall in walls {
            let contact = wall.contact_swept(previous, self.position, self.radius, self.velocity);
            if !contact.hit {
                continue;
            }
            self.velocity = reflect_velocity(self.velocity, contact.normal) * physics.wall_energy_loss;
            // Push clear of the surface so the next tick doesn't re-collide
            self.position += contact.normal * (contact.penetration + physics.wall_separation);
        }
    }

    /// Split off a clone when crossing an active clone orbit ring
    fn check_clone_orbit(&mut self, planets: &[Planet], physics: &PhysicsTuning) -> Option<CloneSpec> {
        if self.cloned {
            return None;
        }
        let speed = self.velocity.length();
        if speed < physics.min_distance {
            return None;
        }

        let planet = planets.iter().find(|planet| {
            planet.has_clone_orbit
                && (self.position.distance(planet.position) - planet.clone_orbit_radius).abs()
                    <= physics.clone_orbit_tolerance
        })?;

        let radial = (self.position - planet.position).normalize_or_zero();
        if radial == DVec2::ZERO {
            return None;
        }

        // Mirror across the radial axis: same fall, opposite orbit direction
        let mut mirrored = 2.0 * self.velocity.dot(radial) * radial - self.velocity;
        if mirrored.distance(self.velocity) < speed * 1e-9 {
            // Purely radial motion has no tangential part to mirror
            mirrored = -self.velocity;
        }

        self.cloned = true;
        Some(CloneSpec {
            position: self.position,
            velocity: mirrored,
            color: self.color,
        })
    }

    /// Explode against the first planet touched and credit it
    fn check_collection<R: Rng>(
        &mut self,
        planets: &mut [Planet],
        tuning: &Tuning,
        rng: &mut R,
    ) -> Option<CollectionEvent> {
        let buffer = tuning.physics.collect_buffer;
        let planet = planets
            .iter_mut()
            .find(|planet| planet.touches(self.position, self.radius, buffer))?;

        let value = planet.collect_particle();
        self.start_explosion(&tuning.particle, rng);
        Some(CollectionEvent {
            value,
            position: self.position,
            planet: planet.id,
        })
    }

    fn start_explosion<R: Rng>(&mut self, tuning: &ParticleTuning, rng: &mut R) {
        self.state = ParticleState::Exploding {
            timer: tuning.explosion_duration,
        };
        self.fragments = (0..tuning.fragment_count)
            .map(|_| {
                let theta = rng.random_range(0.0..std::f64::consts::TAU);
                let speed = sample(rng, tuning.fragment_speed_min, tuning.fragment_speed_max);
                ExplosionFragment {
                    position: self.position,
                    velocity: polar_to_cartesian(speed, theta),
                    alpha: 1.0,
                    radius: sample(rng, tuning.fragment_radius_min, tuning.fragment_radius_max),
                }
            })
            .collect();
    }

    fn update_explosion(&mut self, dt: f64, timer: f64, tuning: &ParticleTuning) {
        let timer = timer - dt;
        if timer <= 0.0 {
            self.state = ParticleState::Dead;
            self.fragments.clear();
            return;
        }
        self.state = ParticleState::Exploding { timer };

        let fade_rate = 1.0 / tuning.explosion_duration;
        for fragment in &mut self.fragments {
            fragment.position += fragment.velocity * dt;
            fragment.alpha = (fragment.alpha - fade_rate * dt).max(0.0);
            fragment.radius = (fragment.radius - tuning.fragment_shrink_rate * dt).max(FRAGMENT_MIN_RADIUS);
        }
    }

    /// Opacity (0-1) for rendering the particle body
    pub fn alpha(&self, tuning: &ParticleTuning) -> f64 {
        match self.state {
            ParticleState::Dead => 0.0,
            ParticleState::Exploding { .. } => 0.0,
            ParticleState::Fading { timer } => (timer / tuning.fade_duration).clamp(0.0, 1.0),
            ParticleState::Alive => {
                if self.origin == Origin::Emitter && self.age < tuning.fade_in_duration {
                    (self.age / tuning.fade_in_duration).max(FADE_IN_MIN_ALPHA)
                } else {
                    1.0
                }
            }
        }
    }

    pub fn rgb(&self) -> [u8; 3] {
        PARTICLE_COLORS[self.color % PARTICLE_COLORS.len()]
    }
}

fn sample<R: Rng>(rng: &mut R, min: f64, max: f64) -> f64 {
    if max > min { rng.random_range(min..max) } else { min }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::planet::PlanetClass;
    use crate::tuning::PlanetClassTuning;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const DT: f64 = 1.0 / 60.0;

    fn particle_at(position: DVec2, velocity: DVec2) -> Particle {
        Particle::new(1, position, velocity, Origin::Emitter, &ParticleTuning::default())
    }

    fn planet_at(id: PlanetId, position: DVec2) -> Planet {
        Planet::new(id, PlanetClass::Planet, position, &PlanetClassTuning::planet())
    }

    /// Run one update with default tuning and collect the events
    fn step(
        particle: &mut Particle,
        dt: f64,
        planets: &mut [Planet],
        walls: &[Wall],
        tuning: &Tuning,
        overrides: ForceOverrides,
    ) -> Vec<ParticleEvent> {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut events = Vec::new();
        let mut env = Environment {
            planets,
            walls,
            tuning,
            overrides,
            trail_length: 8,
        };
        particle.update(dt, &mut env, &mut rng, &mut events);
        events
    }

    #[test]
    fn test_free_particle_keeps_velocity_and_ages() {
        let tuning = Tuning::default();
        let velocity = DVec2::new(30.0, -12.5);
        let mut p = particle_at(DVec2::ZERO, velocity);

        // dt = 0.25 is exact in binary so age lands exactly on the lifetime
        let dt = 0.25;
        let mut ticks = 0;
        while p.is_alive() {
            let age_before = p.age;
            step(&mut p, dt, &mut [], &[], &tuning, ForceOverrides::default());
            ticks += 1;
            assert_eq!(p.velocity, velocity);
            assert!(p.age > age_before);
            assert!(ticks < 1000);
        }

        assert!(matches!(p.state, ParticleState::Fading { .. }));
        assert!((p.age - p.lifetime).abs() <= dt);
        assert_eq!(ticks, 81);
    }

    #[test]
    fn test_fading_particle_drifts_then_dies() {
        let tuning = Tuning::default();
        let mut p = particle_at(DVec2::ZERO, DVec2::new(10.0, 0.0));
        p.state = ParticleState::Fading { timer: 0.5 };

        step(&mut p, 0.25, &mut [], &[], &tuning, ForceOverrides::default());
        assert_eq!(p.state, ParticleState::Fading { timer: 0.25 });
        assert!((p.position.x - 2.5).abs() < 1e-12);

        step(&mut p, 0.25, &mut [], &[], &tuning, ForceOverrides::default());
        assert_eq!(p.state, ParticleState::Dead);
        // Still drifted on the tick it died
        assert!((p.position.x - 5.0).abs() < 1e-12);

        let frozen = p.clone();
        step(&mut p, 0.25, &mut [], &[], &tuning, ForceOverrides::default());
        assert_eq!(p, frozen);
    }

    #[test]
    fn test_fading_particle_is_not_collected() {
        let tuning = Tuning::default();
        let mut planets = [planet_at(1, DVec2::new(40.0, 0.0))];
        let mut p = particle_at(DVec2::ZERO, DVec2::ZERO);
        p.state = ParticleState::Fading { timer: 1.0 };

        let events = step(&mut p, DT, &mut planets, &[], &tuning, ForceOverrides::default());
        assert!(events.is_empty());
        assert!(matches!(p.state, ParticleState::Fading { .. }));
        assert_eq!(planets[0].particles_collected, 0);
    }

    #[test]
    fn test_touching_planet_explodes_and_collects_once() {
        let tuning = Tuning::default();
        let planet = planet_at(3, DVec2::ZERO);
        let start = planet.radius + tuning.particle.radius - 1.0;
        let mut planets = [planet];
        let mut p = particle_at(DVec2::new(start, 0.0), DVec2::ZERO);

        let events = step(&mut p, DT, &mut planets, &[], &tuning, ForceOverrides::default());

        assert!(matches!(p.state, ParticleState::Exploding { .. }));
        assert_eq!(events.len(), 1);
        match events[0] {
            ParticleEvent::Collected(event) => {
                assert_eq!(event.value, 1);
                assert_eq!(event.planet, 3);
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(planets[0].particles_collected, 1);
        assert_eq!(p.fragments.len(), tuning.particle.fragment_count);

        // No second collection while exploding
        let events = step(&mut p, DT, &mut planets, &[], &tuning, ForceOverrides::default());
        assert!(events.is_empty());
        assert_eq!(planets[0].particles_collected, 1);
    }

    #[test]
    fn test_explosion_runs_out_then_dead() {
        let tuning = Tuning::default();
        let mut planets = [planet_at(1, DVec2::ZERO)];
        let mut p = particle_at(DVec2::new(10.0, 0.0), DVec2::ZERO);
        step(&mut p, DT, &mut planets, &[], &tuning, ForceOverrides::default());
        let hit_position = p.position;

        let first = p.fragments[0];
        step(&mut p, 0.1, &mut planets, &[], &tuning, ForceOverrides::default());
        assert_eq!(p.position, hit_position);
        assert!(p.fragments[0].alpha < first.alpha);
        assert!(p.fragments[0].position != first.position);

        let mut ticks = 0;
        while !p.is_dead() {
            step(&mut p, 0.1, &mut planets, &[], &tuning, ForceOverrides::default());
            ticks += 1;
            assert!(ticks < 100);
        }
        assert!(p.fragments.is_empty());
        assert_eq!(planets[0].particles_collected, 1);
    }

    #[test]
    fn test_symmetric_planets_cancel() {
        let tuning = Tuning::default();
        let mut planets = [
            planet_at(1, DVec2::new(-150.0, 0.0)),
            planet_at(2, DVec2::new(150.0, 0.0)),
        ];
        let velocity = DVec2::new(0.0, 20.0);
        let mut p = particle_at(DVec2::ZERO, velocity);
        let overrides = ForceOverrides {
            gravity_distance: None,
            air_resistance: Some(0.0),
        };

        let sample = p.forces(&planets, &tuning.physics, overrides);
        assert!(sample.gravity_active);
        assert!(sample.acceleration.length() < 1e-12);

        step(&mut p, DT, &mut planets, &[], &tuning, overrides);
        assert!((p.velocity - velocity).length() < 1e-12);
    }

    #[test]
    fn test_gravity_pulls_toward_planet_and_suppresses_age() {
        let tuning = Tuning::default();
        let mut planets = [planet_at(1, DVec2::new(300.0, 0.0))];
        let mut p = particle_at(DVec2::ZERO, DVec2::ZERO);

        step(&mut p, DT, &mut planets, &[], &tuning, ForceOverrides::default());
        assert!(p.velocity.x > 0.0);
        assert_eq!(p.velocity.y, 0.0);
        assert_eq!(p.age, 0.0);
    }

    #[test]
    fn test_out_of_reach_planet_exerts_nothing() {
        let tuning = Tuning::default();
        let planets = [planet_at(1, DVec2::new(5000.0, 0.0))];
        let p = particle_at(DVec2::ZERO, DVec2::new(3.0, 4.0));
        let sample = p.forces(&planets, &tuning.physics, ForceOverrides::default());
        assert!(!sample.gravity_active);
        assert_eq!(sample.acceleration, DVec2::ZERO);
    }

    #[test]
    fn test_gravity_override_extends_reach() {
        let tuning = Tuning::default();
        let planets = [planet_at(1, DVec2::new(900.0, 0.0))];
        let p = particle_at(DVec2::ZERO, DVec2::ZERO);

        let own = p.forces(&planets, &tuning.physics, ForceOverrides::default());
        assert!(!own.gravity_active);

        let overrides = ForceOverrides {
            gravity_distance: Some(1000.0),
            air_resistance: None,
        };
        let boosted = p.forces(&planets, &tuning.physics, overrides);
        assert!(boosted.gravity_active);
        assert!(boosted.acceleration.x > 0.0);
    }

    #[test]
    fn test_air_resistance_opposes_velocity() {
        let mut tuning = Tuning::default();
        tuning.physics.gravity_strength = 1e-9;
        let planets = [planet_at(1, DVec2::new(0.0, 200.0))];
        let p = particle_at(DVec2::ZERO, DVec2::new(100.0, 0.0));
        let sample = p.forces(&planets, &tuning.physics, ForceOverrides::default());
        assert!(sample.acceleration.x < 0.0);
        let expected = -100.0 * planets[0].air_resistance_intensity;
        assert!((sample.acceleration.x - expected).abs() < 1e-6);
    }

    #[test]
    fn test_particle_at_planet_center_gets_no_force() {
        let tuning = Tuning::default();
        let planets = [planet_at(1, DVec2::new(10.0, 10.0))];
        let p = particle_at(DVec2::new(10.0, 10.0), DVec2::ZERO);
        let sample = p.forces(&planets, &tuning.physics, ForceOverrides::default());
        assert_eq!(sample.acceleration, DVec2::ZERO);
        assert!(!sample.gravity_active);
    }

    #[test]
    fn test_wall_bounce_parallel_motion() {
        let tuning = Tuning::default();
        let walls = [Wall::new(DVec2::new(-100.0, 0.0), DVec2::new(100.0, 0.0))];
        let mut p = particle_at(DVec2::new(0.0, 3.0), DVec2::new(5.0, 0.0));

        step(&mut p, DT, &mut [], &walls, &tuning, ForceOverrides::default());

        // v - 2(v·n)n with n = (0, 1) leaves x alone; then energy loss
        assert!((p.velocity - DVec2::new(5.0 * 0.8, 0.0)).length() < 1e-12);
        assert!(p.position.y >= p.radius);
    }

    #[test]
    fn test_wall_bounce_head_on() {
        let tuning = Tuning::default();
        let walls = [Wall::new(DVec2::new(-100.0, 0.0), DVec2::new(100.0, 0.0))];
        let mut p = particle_at(DVec2::new(0.0, 6.0), DVec2::new(0.0, -100.0));

        step(&mut p, 0.02, &mut [], &walls, &tuning, ForceOverrides::default());

        assert!((p.velocity - DVec2::new(0.0, 80.0)).length() < 1e-9);
        assert!(p.position.y > p.radius);
        assert!(!walls[0].check_collision(p.position, p.radius));
    }

    #[test]
    fn test_wall_bounce_keeps_fast_particle_on_its_side() {
        let tuning = Tuning::default();
        let walls = [Wall::new(DVec2::new(-100.0, 0.0), DVec2::new(100.0, 0.0))];
        // One step carries the center from above the line to just below it
        let mut p = particle_at(DVec2::new(0.0, 5.5), DVec2::new(0.0, -132.0));

        step(&mut p, 0.05, &mut [], &walls, &tuning, ForceOverrides::default());

        assert!(p.velocity.y > 0.0);
        assert!(p.position.y >= p.radius);
        assert!(!walls[0].check_collision(p.position, p.radius));
    }

    #[test]
    fn test_wall_bounce_catches_full_tunnel() {
        let tuning = Tuning::default();
        let walls = [Wall::new(DVec2::new(-100.0, 0.0), DVec2::new(100.0, 0.0))];
        let mut p = particle_at(DVec2::new(0.0, 10.0), DVec2::new(0.0, -1800.0));

        step(&mut p, 1.0 / 60.0, &mut [], &walls, &tuning, ForceOverrides::default());

        assert!(p.velocity.y > 0.0);
        assert!(p.position.y >= p.radius);
    }

    #[test]
    fn test_clone_orbit_splits_once() {
        let tuning = Tuning::default();
        let mut planet = planet_at(1, DVec2::ZERO);
        planet.upgrade_clone_orbit();
        let ring = planet.clone_orbit_radius;
        let mut planets = [planet];
        let overrides = ForceOverrides {
            gravity_distance: None,
            air_resistance: Some(0.0),
        };

        // Sitting on the ring, moving tangentially with a slight inward drift
        let velocity = DVec2::new(-5.0, 40.0);
        let mut p = particle_at(DVec2::new(ring, 0.0), velocity);
        let events = step(&mut p, 1e-6, &mut planets, &[], &tuning, overrides);

        let clones: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                ParticleEvent::Cloned(spec) => Some(*spec),
                _ => None,
            })
            .collect();
        assert_eq!(clones.len(), 1);
        assert!(p.cloned);
        // Radial part kept, tangential part flipped
        assert!((clones[0].velocity.x - p.velocity.x).abs() < 1e-3);
        assert!((clones[0].velocity.y + p.velocity.y).abs() < 1e-3);

        let clone = Particle::from_clone(2, &clones[0], &tuning.particle);
        assert!(clone.cloned);
        assert_eq!(clone.origin, Origin::Clone);

        // Already cloned: no further splits
        let events = step(&mut p, 1e-6, &mut planets, &[], &tuning, overrides);
        assert!(events.iter().all(|e| !matches!(e, ParticleEvent::Cloned(_))));
    }

    #[test]
    fn test_clone_orbit_skips_stationary_particle() {
        let tuning = Tuning::default();
        let mut planet = planet_at(1, DVec2::ZERO);
        planet.upgrade_clone_orbit();
        let ring = planet.clone_orbit_radius;
        let mut planets = [planet];
        let overrides = ForceOverrides {
            gravity_distance: Some(0.0),
            air_resistance: Some(0.0),
        };
        let mut tuning_no_fade = tuning.clone();
        tuning_no_fade.physics.fade_zone_width = 0.0;

        let mut p = particle_at(DVec2::new(ring, 0.0), DVec2::ZERO);
        let events = step(&mut p, DT, &mut planets, &[], &tuning_no_fade, overrides);
        assert!(events.is_empty());
        assert!(!p.cloned);
    }

    #[test]
    fn test_purely_radial_clone_reverses() {
        let tuning = Tuning::default();
        let mut planet = planet_at(1, DVec2::ZERO);
        planet.upgrade_clone_orbit();
        let ring = planet.clone_orbit_radius;
        let mut planets = [planet];
        let overrides = ForceOverrides {
            gravity_distance: None,
            air_resistance: Some(0.0),
        };
        let mut p = particle_at(DVec2::new(ring, 0.0), DVec2::new(-30.0, 0.0));
        let events = step(&mut p, 1e-6, &mut planets, &[], &tuning, overrides);
        let Some(ParticleEvent::Cloned(spec)) = events.first() else {
            panic!("expected a clone, got {events:?}");
        };
        assert!(spec.velocity.x > 0.0);
        assert!(spec.velocity.y.abs() < 1e-9);
    }

    #[test]
    fn test_world_limit_despawns() {
        let tuning = Tuning::default();
        let limit = tuning.physics.world_limit;
        let mut p = particle_at(DVec2::new(limit - 1.0, 0.0), DVec2::new(120.0, 0.0));
        step(&mut p, 0.1, &mut [], &[], &tuning, ForceOverrides::default());
        assert!(p.is_dead());
    }

    #[test]
    fn test_trail_is_bounded_newest_first() {
        let tuning = Tuning::default();
        let mut p = particle_at(DVec2::ZERO, DVec2::new(1.0, 0.0));
        for _ in 0..20 {
            step(&mut p, 1.0, &mut [], &[], &tuning, ForceOverrides::default());
        }
        assert_eq!(p.trail.len(), 8);
        assert_eq!(p.trail[0], p.position);
        assert!(p.trail[0].x > p.trail[7].x);
    }

    #[test]
    fn test_alpha_fade_in_and_out() {
        let tuning = ParticleTuning::default();
        let mut p = particle_at(DVec2::ZERO, DVec2::ZERO);
        assert!((p.alpha(&tuning) - 50.0 / 255.0).abs() < 1e-12);
        p.age = 0.15;
        assert!((p.alpha(&tuning) - 0.5).abs() < 1e-12);
        p.age = 1.0;
        assert_eq!(p.alpha(&tuning), 1.0);

        // Spawner and clone particles appear at full strength
        let mut s = particle_at(DVec2::ZERO, DVec2::ZERO);
        s.origin = Origin::Spawner;
        assert_eq!(s.alpha(&tuning), 1.0);

        p.state = ParticleState::Fading { timer: 0.25 };
        assert!((p.alpha(&tuning) - 0.25).abs() < 1e-12);
        p.state = ParticleState::Dead;
        assert_eq!(p.alpha(&tuning), 0.0);
    }

    #[test]
    fn test_spawn_randomizes_within_ranges() {
        let tuning = ParticleTuning::default();
        let mut rng = Pcg32::seed_from_u64(42);
        for id in 0..100 {
            let p = Particle::spawn(id, DVec2::ZERO, Origin::Spawner, &tuning, &mut rng);
            let speed = p.velocity.length();
            assert!(speed >= tuning.spawn_speed_min - 1e-9);
            assert!(speed <= tuning.spawn_speed_max + 1e-9);
            assert!(p.color < PARTICLE_COLORS.len());
            assert_eq!(p.trail.len(), 1);
        }
    }

    proptest! {
        #[test]
        fn gravity_continuous_across_reach(
            mass in 1.0_f64..10_000.0,
            reach in 10.0_f64..5000.0,
        ) {
            let physics = PhysicsTuning::default();
            let at_reach = gravity_magnitude(mass, 1.0, reach, reach, &physics);
            let ramp_start = gravity_magnitude(mass, 1.0, reach * (1.0 + 1e-12), reach, &physics);
            prop_assert!(at_reach > 0.0);
            prop_assert!((at_reach - ramp_start).abs() <= at_reach * 1e-9);
        }

        #[test]
        fn states_follow_the_lifecycle_graph(
            seed in any::<u64>(),
            px in -800.0_f64..800.0,
            py in -800.0_f64..800.0,
            dt in 0.005_f64..0.5,
        ) {
            let tuning = Tuning::default();
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut planets = [planet_at(1, DVec2::ZERO)];
            planets[0].upgrade_clone_orbit();
            let walls = [Wall::new(DVec2::new(-400.0, 300.0), DVec2::new(400.0, 300.0))];
            let mut p = Particle::spawn(1, DVec2::new(px, py), Origin::Emitter, &tuning.particle, &mut rng);

            let rank = |s: &ParticleState| match s {
                ParticleState::Alive => 0,
                ParticleState::Fading { .. } | ParticleState::Exploding { .. } => 1,
                ParticleState::Dead => 2,
            };
            let mut collected = 0;
            for _ in 0..400 {
                let before = p.state;
                let mut events = Vec::new();
                let mut env = Environment {
                    planets: &mut planets,
                    walls: &walls,
                    tuning: &tuning,
                    overrides: ForceOverrides::default(),
                    trail_length: 6,
                };
                p.update(dt, &mut env, &mut rng, &mut events);
                collected += events.iter().filter(|e| matches!(e, ParticleEvent::Collected(_))).count();

                prop_assert!(rank(&p.state) >= rank(&before));
                // Fading never turns into Exploding and vice versa
                if let ParticleState::Fading { .. } = before {
                    prop_assert!(
                        !matches!(p.state, ParticleState::Exploding { .. }),
                        "fading particle started exploding"
                    );
                }
                if let ParticleState::Exploding { .. } = before {
                    prop_assert!(
                        !matches!(p.state, ParticleState::Fading { .. }),
                        "exploding particle started fading"
                    );
                }
                if before == ParticleState::Dead {
                    prop_assert!(events.is_empty());
                }
            }
            prop_assert!(collected <= 1);
        }
    }
}
