//! Data-driven game balance
//!
//! [`Tuning`] mirrors every default in [`crate::consts`]. A JSON document can
//! override any subset of keys; missing keys fall back to the defaults, so a
//! minimal file only names the constants being tuned:
//!
//! ```json
//! { "physics": { "gravity_strength": 300.0 }, "emitter": { "spawn_rate": 40.0 } }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Rejected configuration
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse tuning: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("tuning value `{field}` = {value} is invalid: {reason}")]
    Invalid {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },
}

/// Forces, collisions and world bounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsTuning {
    pub gravity_strength: f64,
    pub gravity_exponent: f64,
    pub fade_zone_width: f64,
    pub wall_energy_loss: f64,
    pub wall_separation: f64,
    pub collect_buffer: f64,
    pub clone_orbit_tolerance: f64,
    pub world_limit: f64,
    pub min_distance: f64,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            gravity_strength: GRAVITY_STRENGTH,
            gravity_exponent: GRAVITY_EXPONENT,
            fade_zone_width: FADE_ZONE_WIDTH,
            wall_energy_loss: WALL_ENERGY_LOSS,
            wall_separation: WALL_SEPARATION,
            collect_buffer: COLLECT_BUFFER,
            clone_orbit_tolerance: CLONE_ORBIT_TOLERANCE,
            world_limit: WORLD_LIMIT,
            min_distance: MIN_FORCE_DISTANCE,
        }
    }
}

/// Per-particle constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleTuning {
    pub radius: f64,
    pub mass: f64,
    pub lifetime: f64,
    pub fade_duration: f64,
    pub fade_in_duration: f64,
    pub explosion_duration: f64,
    pub fragment_count: usize,
    pub fragment_speed_min: f64,
    pub fragment_speed_max: f64,
    pub fragment_radius_min: f64,
    pub fragment_radius_max: f64,
    /// Fragment radius shrink rate (units per second)
    pub fragment_shrink_rate: f64,
    pub spawn_speed_min: f64,
    pub spawn_speed_max: f64,
}

impl Default for ParticleTuning {
    fn default() -> Self {
        Self {
            radius: PARTICLE_RADIUS,
            mass: PARTICLE_MASS,
            lifetime: PARTICLE_LIFETIME,
            fade_duration: FADE_DURATION,
            fade_in_duration: FADE_IN_DURATION,
            explosion_duration: EXPLOSION_DURATION,
            fragment_count: EXPLOSION_FRAGMENTS,
            fragment_speed_min: 60.0,
            fragment_speed_max: 180.0,
            fragment_radius_min: 2.0,
            fragment_radius_max: 4.0,
            fragment_shrink_rate: 8.0,
            spawn_speed_min: SPAWN_SPEED_MIN,
            spawn_speed_max: SPAWN_SPEED_MAX,
        }
    }
}

/// Constants for one planet class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanetClassTuning {
    pub radius: f64,
    /// Base mass = radius * this
    pub mass_per_radius: f64,
    pub gravity_distance: f64,
    pub air_resistance: f64,
    /// Multiplicative growth per collected particle
    pub radius_growth: f64,
    pub mass_growth: f64,
    pub gravity_distance_growth: f64,
    pub air_resistance_growth: f64,
    /// Linear per-level scaling: `base * (1 + (level - 1) * k)`
    pub mass_per_level: f64,
    pub gravity_distance_per_level: f64,
    pub air_resistance_per_level: f64,
    pub max_gravity_level: Option<u32>,
    pub upgrade_cost: u64,
    pub upgrade_cost_growth: f64,
    pub clone_orbit_available: bool,
    pub clone_orbit_cost: u64,
    pub clone_orbit_cost_growth: f64,
}

impl PlanetClassTuning {
    pub fn planet() -> Self {
        Self {
            radius: PLANET_RADIUS,
            mass_per_radius: PLANET_MASS_PER_RADIUS,
            gravity_distance: PLANET_GRAVITY_DISTANCE,
            air_resistance: AIR_RESISTANCE,
            radius_growth: 1.001,
            mass_growth: 1.002,
            gravity_distance_growth: 1.001,
            air_resistance_growth: 1.001,
            mass_per_level: 0.5,
            gravity_distance_per_level: 0.25,
            air_resistance_per_level: 0.2,
            max_gravity_level: None,
            upgrade_cost: 50,
            upgrade_cost_growth: 1.5,
            clone_orbit_available: true,
            clone_orbit_cost: 500,
            clone_orbit_cost_growth: 2.0,
        }
    }

    pub fn dwarf_planet() -> Self {
        Self {
            radius: DWARF_PLANET_RADIUS,
            mass_per_radius: DWARF_PLANET_MASS_PER_RADIUS,
            gravity_distance: DWARF_PLANET_GRAVITY_DISTANCE,
            air_resistance: AIR_RESISTANCE,
            radius_growth: 1.0005,
            mass_growth: 1.001,
            gravity_distance_growth: 1.0005,
            air_resistance_growth: 1.0005,
            mass_per_level: 0.5,
            gravity_distance_per_level: 0.25,
            air_resistance_per_level: 0.2,
            max_gravity_level: Some(DWARF_PLANET_MAX_LEVEL),
            upgrade_cost: 20,
            upgrade_cost_growth: 1.5,
            clone_orbit_available: false,
            clone_orbit_cost: 0,
            clone_orbit_cost_growth: 1.0,
        }
    }
}

impl Default for PlanetClassTuning {
    fn default() -> Self {
        Self::planet()
    }
}

/// Spawn policy for a particle population
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnTuning {
    /// Particles per second
    pub spawn_rate: f64,
    /// Half-size of the spawn box
    pub half_extent: f64,
}

impl SpawnTuning {
    pub fn emitter() -> Self {
        Self {
            spawn_rate: EMITTER_SPAWN_RATE,
            half_extent: EMITTER_WORLD_SIZE / 2.0,
        }
    }

    pub fn spawner() -> Self {
        Self {
            spawn_rate: SPAWNER_SPAWN_RATE,
            half_extent: SPAWNER_JITTER,
        }
    }
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self::emitter()
    }
}

/// Prices and rewards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyTuning {
    pub starting_money: u64,
    pub particle_value: u64,
    pub planet_cost: u64,
    pub dwarf_planet_cost: u64,
    pub spawner_cost: u64,
    pub spawn_rate_cost: u64,
    pub spawn_rate_cost_growth: f64,
    pub spawn_rate_step: f64,
    pub wall_cost_per_unit: f64,
}

impl Default for EconomyTuning {
    fn default() -> Self {
        Self {
            starting_money: STARTING_MONEY,
            particle_value: PARTICLE_VALUE,
            planet_cost: PLANET_COST,
            dwarf_planet_cost: DWARF_PLANET_COST,
            spawner_cost: SPAWNER_COST,
            spawn_rate_cost: SPAWN_RATE_COST,
            spawn_rate_cost_growth: 1.5,
            spawn_rate_step: 10.0,
            wall_cost_per_unit: WALL_COST_PER_UNIT,
        }
    }
}

/// Complete gameplay configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub physics: PhysicsTuning,
    pub particle: ParticleTuning,
    pub planet: PlanetClassTuning,
    /// Missing keys fall back to the dwarf defaults, not the planet ones
    #[serde(deserialize_with = "dwarf_planet_overrides")]
    pub dwarf_planet: PlanetClassTuning,
    pub emitter: SpawnTuning,
    #[serde(deserialize_with = "spawner_overrides")]
    pub spawner: SpawnTuning,
    pub economy: EconomyTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            physics: PhysicsTuning::default(),
            particle: ParticleTuning::default(),
            planet: PlanetClassTuning::planet(),
            dwarf_planet: PlanetClassTuning::dwarf_planet(),
            emitter: SpawnTuning::emitter(),
            spawner: SpawnTuning::spawner(),
            economy: EconomyTuning::default(),
        }
    }
}

/// Deserialize a partial object on top of `base` instead of `T::default()`
fn overrides_onto<'de, D, T>(base: T, deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Serialize + serde::de::DeserializeOwned,
{
    use serde::de::Error;
    use serde_json::Value;

    let overrides = Value::deserialize(deserializer)?;
    let mut merged = serde_json::to_value(base).map_err(D::Error::custom)?;
    match (&mut merged, overrides) {
        (Value::Object(fields), Value::Object(keys)) => fields.extend(keys),
        (_, other) => {
            return Err(D::Error::custom(format!("expected an object, got {other}")));
        }
    }
    serde_json::from_value(merged).map_err(D::Error::custom)
}

fn dwarf_planet_overrides<'de, D>(deserializer: D) -> Result<PlanetClassTuning, D::Error>
where
    D: serde::Deserializer<'de>,
{
    overrides_onto(PlanetClassTuning::dwarf_planet(), deserializer)
}

fn spawner_overrides<'de, D>(deserializer: D) -> Result<SpawnTuning, D::Error>
where
    D: serde::Deserializer<'de>,
{
    overrides_onto(SpawnTuning::spawner(), deserializer)
}

fn positive(field: &'static str, value: f64) -> Result<(), TuningError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(TuningError::Invalid {
            field,
            value,
            reason: "must be positive and finite",
        })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), TuningError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(TuningError::Invalid {
            field,
            value,
            reason: "must be non-negative and finite",
        })
    }
}

fn unit_interval(field: &'static str, value: f64) -> Result<(), TuningError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(TuningError::Invalid {
            field,
            value,
            reason: "must be within [0, 1]",
        })
    }
}

fn growth(field: &'static str, value: f64) -> Result<(), TuningError> {
    if value >= 1.0 && value.is_finite() {
        Ok(())
    } else {
        Err(TuningError::Invalid {
            field,
            value,
            reason: "growth factors must be >= 1 so stats never shrink",
        })
    }
}

fn ordered_range(field: &'static str, min: f64, max: f64) -> Result<(), TuningError> {
    non_negative(field, min)?;
    if max >= min {
        Ok(())
    } else {
        Err(TuningError::Invalid {
            field,
            value: max,
            reason: "range maximum is below its minimum",
        })
    }
}

impl PlanetClassTuning {
    fn validate(&self) -> Result<(), TuningError> {
        positive("planet.radius", self.radius)?;
        positive("planet.mass_per_radius", self.mass_per_radius)?;
        positive("planet.gravity_distance", self.gravity_distance)?;
        unit_interval("planet.air_resistance", self.air_resistance)?;
        growth("planet.radius_growth", self.radius_growth)?;
        growth("planet.mass_growth", self.mass_growth)?;
        growth("planet.gravity_distance_growth", self.gravity_distance_growth)?;
        growth("planet.air_resistance_growth", self.air_resistance_growth)?;
        non_negative("planet.mass_per_level", self.mass_per_level)?;
        non_negative("planet.gravity_distance_per_level", self.gravity_distance_per_level)?;
        non_negative("planet.air_resistance_per_level", self.air_resistance_per_level)?;
        growth("planet.upgrade_cost_growth", self.upgrade_cost_growth)?;
        growth("planet.clone_orbit_cost_growth", self.clone_orbit_cost_growth)?;
        if self.max_gravity_level == Some(0) {
            return Err(TuningError::Invalid {
                field: "planet.max_gravity_level",
                value: 0.0,
                reason: "gravity level starts at 1",
            });
        }
        Ok(())
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON document and validate it
    pub fn from_json_str(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json_str(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Check every value against its safe range
    pub fn validate(&self) -> Result<(), TuningError> {
        let p = &self.physics;
        positive("physics.gravity_strength", p.gravity_strength)?;
        positive("physics.gravity_exponent", p.gravity_exponent)?;
        non_negative("physics.fade_zone_width", p.fade_zone_width)?;
        unit_interval("physics.wall_energy_loss", p.wall_energy_loss)?;
        non_negative("physics.wall_separation", p.wall_separation)?;
        non_negative("physics.collect_buffer", p.collect_buffer)?;
        non_negative("physics.clone_orbit_tolerance", p.clone_orbit_tolerance)?;
        positive("physics.world_limit", p.world_limit)?;
        positive("physics.min_distance", p.min_distance)?;

        let pt = &self.particle;
        positive("particle.radius", pt.radius)?;
        positive("particle.mass", pt.mass)?;
        positive("particle.lifetime", pt.lifetime)?;
        positive("particle.fade_duration", pt.fade_duration)?;
        non_negative("particle.fade_in_duration", pt.fade_in_duration)?;
        positive("particle.explosion_duration", pt.explosion_duration)?;
        ordered_range(
            "particle.fragment_speed",
            pt.fragment_speed_min,
            pt.fragment_speed_max,
        )?;
        ordered_range(
            "particle.fragment_radius",
            pt.fragment_radius_min,
            pt.fragment_radius_max,
        )?;
        non_negative("particle.fragment_shrink_rate", pt.fragment_shrink_rate)?;
        ordered_range("particle.spawn_speed", pt.spawn_speed_min, pt.spawn_speed_max)?;

        self.planet.validate()?;
        self.dwarf_planet.validate()?;

        positive("emitter.spawn_rate", self.emitter.spawn_rate)?;
        non_negative("emitter.half_extent", self.emitter.half_extent)?;
        positive("spawner.spawn_rate", self.spawner.spawn_rate)?;
        non_negative("spawner.half_extent", self.spawner.half_extent)?;

        let e = &self.economy;
        growth("economy.spawn_rate_cost_growth", e.spawn_rate_cost_growth)?;
        positive("economy.spawn_rate_step", e.spawn_rate_step)?;
        non_negative("economy.wall_cost_per_unit", e.wall_cost_per_unit)?;
        Ok(())
    }
}
