//! Planets and dwarf planets: the gravity sources that collect particles
//!
//! Both classes share one type. A dwarf planet is a cheaper planet with a
//! shorter reach, half the per-hit growth, a gravity level cap and no clone
//! orbit.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::tuning::PlanetClassTuning;

pub type PlanetId = u32;

/// Which kind of planet this is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanetClass {
    Planet,
    Dwarf,
}

/// Visual archetype drawn at placement (read by the renderer only)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanetType {
    pub name: &'static str,
    pub color: [u8; 3],
    pub rings: bool,
    pub spots: bool,
}

pub const PLANET_TYPES: [PlanetType; 8] = [
    PlanetType { name: "Rocky", color: [139, 69, 19], rings: false, spots: true },
    PlanetType { name: "Gas Giant", color: [255, 140, 0], rings: true, spots: false },
    PlanetType { name: "Ice World", color: [173, 216, 230], rings: false, spots: false },
    PlanetType { name: "Desert", color: [238, 203, 173], rings: false, spots: true },
    PlanetType { name: "Ocean", color: [0, 105, 148], rings: false, spots: false },
    PlanetType { name: "Volcanic", color: [178, 34, 34], rings: false, spots: true },
    PlanetType { name: "Forest", color: [34, 139, 34], rings: false, spots: false },
    PlanetType { name: "Crystal", color: [147, 0, 211], rings: true, spots: false },
];

/// A gravity source
///
/// `radius`, `mass` and `gravity_distance` never shrink. Collection grows the
/// `base_*` values multiplicatively; upgrades scale them linearly by level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Planet {
    pub id: PlanetId,
    pub class: PlanetClass,
    pub position: DVec2,
    pub radius: f64,
    pub gravity_level: u32,
    pub max_gravity_level: Option<u32>,
    /// Pre-level values, grown by collection
    pub base_mass: f64,
    pub base_gravity_distance: f64,
    pub base_air_resistance: f64,
    /// Derived: base * level scaling
    pub mass: f64,
    pub gravity_distance: f64,
    pub air_resistance_intensity: f64,
    pub particles_collected: u64,
    pub money_generated: u64,
    pub upgrade_cost: u64,
    pub has_clone_orbit: bool,
    pub clone_orbit_radius: f64,
    pub clone_orbit_cost: u64,
    /// Index into [`PLANET_TYPES`]
    pub visual: usize,
    /// Copied from tuning at placement so later tuning edits don't rewrite history
    pub growth: PlanetGrowth,
}

/// Per-class growth and scaling constants carried by each planet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetGrowth {
    pub radius: f64,
    pub mass: f64,
    pub gravity_distance: f64,
    pub air_resistance: f64,
    pub mass_per_level: f64,
    pub gravity_distance_per_level: f64,
    pub air_resistance_per_level: f64,
    pub upgrade_cost_growth: f64,
    pub clone_orbit_available: bool,
    pub clone_orbit_cost_growth: f64,
    pub clone_orbit_radius_factor: f64,
    pub particle_value: u64,
}

impl Planet {
    pub fn new(id: PlanetId, class: PlanetClass, position: DVec2, tuning: &PlanetClassTuning) -> Self {
        let growth = PlanetGrowth {
            radius: tuning.radius_growth,
            mass: tuning.mass_growth,
            gravity_distance: tuning.gravity_distance_growth,
            air_resistance: tuning.air_resistance_growth,
            mass_per_level: tuning.mass_per_level,
            gravity_distance_per_level: tuning.gravity_distance_per_level,
            air_resistance_per_level: tuning.air_resistance_per_level,
            upgrade_cost_growth: tuning.upgrade_cost_growth,
            clone_orbit_available: tuning.clone_orbit_available,
            clone_orbit_cost_growth: tuning.clone_orbit_cost_growth,
            clone_orbit_radius_factor: crate::consts::CLONE_ORBIT_RADIUS_FACTOR,
            particle_value: crate::consts::PARTICLE_VALUE,
        };

        let mut planet = Self {
            id,
            class,
            position,
            radius: tuning.radius,
            gravity_level: 1,
            max_gravity_level: tuning.max_gravity_level,
            base_mass: tuning.radius * tuning.mass_per_radius,
            base_gravity_distance: tuning.gravity_distance,
            base_air_resistance: tuning.air_resistance,
            mass: 0.0,
            gravity_distance: 0.0,
            air_resistance_intensity: 0.0,
            particles_collected: 0,
            money_generated: 0,
            upgrade_cost: tuning.upgrade_cost,
            has_clone_orbit: false,
            clone_orbit_radius: 0.0,
            clone_orbit_cost: tuning.clone_orbit_cost,
            visual: 0,
            growth,
        };
        planet.recompute();
        planet
    }

    /// Override the per-particle value credited by [`Planet::collect_particle`]
    pub fn with_particle_value(mut self, value: u64) -> Self {
        self.growth.particle_value = value;
        self
    }

    /// Pick a visual archetype (index wraps into [`PLANET_TYPES`])
    pub fn with_visual(mut self, index: usize) -> Self {
        self.visual = index % PLANET_TYPES.len();
        self
    }

    pub fn planet_type(&self) -> &'static PlanetType {
        &PLANET_TYPES[self.visual % PLANET_TYPES.len()]
    }

    fn level_scale(&self, k: f64) -> f64 {
        1.0 + (self.gravity_level.saturating_sub(1)) as f64 * k
    }

    /// Refresh derived values from base values and level
    fn recompute(&mut self) {
        let g = &self.growth;
        let (mass_k, dist_k, air_k) = (g.mass_per_level, g.gravity_distance_per_level, g.air_resistance_per_level);
        self.mass = self.base_mass * self.level_scale(mass_k);
        self.gravity_distance = self.base_gravity_distance * self.level_scale(dist_k);
        self.air_resistance_intensity = (self.base_air_resistance * self.level_scale(air_k)).min(1.0);
        self.clone_orbit_radius = self.radius * self.growth.clone_orbit_radius_factor;
    }

    /// Absorb one particle; returns the currency value to credit
    pub fn collect_particle(&mut self) -> u64 {
        self.particles_collected += 1;
        self.radius *= self.growth.radius;
        self.base_mass *= self.growth.mass;
        self.base_gravity_distance *= self.growth.gravity_distance;
        self.base_air_resistance = (self.base_air_resistance * self.growth.air_resistance).min(1.0);
        self.recompute();

        let value = self.growth.particle_value;
        self.money_generated += value;
        value
    }

    pub fn can_upgrade_gravity(&self) -> bool {
        self.max_gravity_level.is_none_or(|max| self.gravity_level < max)
    }

    /// Raise gravity level by one. Returns false (and changes nothing) at the cap.
    ///
    /// Affordability is the caller's concern.
    pub fn upgrade_gravity(&mut self) -> bool {
        if !self.can_upgrade_gravity() {
            return false;
        }
        self.gravity_level += 1;
        self.recompute();
        self.upgrade_cost = (self.upgrade_cost as f64 * self.growth.upgrade_cost_growth).ceil() as u64;
        log::debug!(
            "Planet {} gravity level {} (mass {:.1}, reach {:.1})",
            self.id,
            self.gravity_level,
            self.mass,
            self.gravity_distance
        );
        true
    }

    pub fn supports_clone_orbit(&self) -> bool {
        self.growth.clone_orbit_available
    }

    /// Activate the clone orbit ring. No-op on dwarf planets.
    ///
    /// Buying it again only bumps the displayed cost.
    pub fn upgrade_clone_orbit(&mut self) {
        if !self.supports_clone_orbit() {
            return;
        }
        if !self.has_clone_orbit {
            log::debug!("Planet {} clone orbit active at r={:.1}", self.id, self.clone_orbit_radius);
        }
        self.has_clone_orbit = true;
        self.clone_orbit_cost =
            (self.clone_orbit_cost as f64 * self.growth.clone_orbit_cost_growth).ceil() as u64;
    }

    /// Distance-based strength multiplier shared by gravity and air resistance
    ///
    /// 1 inside `reach`, ramping linearly to 0 over `fade_width`, 0 beyond.
    pub fn falloff(distance: f64, reach: f64, fade_width: f64) -> f64 {
        if distance <= reach {
            1.0
        } else if fade_width <= 0.0 || distance >= reach + fade_width {
            0.0
        } else {
            (reach + fade_width - distance) / fade_width
        }
    }

    /// Does a circle at `point` with `radius` touch the planet surface?
    pub fn touches(&self, point: DVec2, radius: f64, buffer: f64) -> bool {
        point.distance(self.position) < self.radius + radius + buffer
    }
}
