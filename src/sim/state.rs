//! World state and player actions
//!
//! The world owns every planet, wall and particle population plus the
//! wallet. Player actions are purchases: each one either succeeds completely
//! or returns a [`PurchaseError`] with nothing changed.

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::collision::circles_overlap;
use super::particle::Particle;
use super::planet::{PLANET_TYPES, Planet, PlanetClass, PlanetId};
use super::population::Population;
use super::wall::Wall;
use crate::consts::PICK_MARGIN;
use crate::economy::{PurchaseError, Wallet, grown_cost, wall_cost};
use crate::settings::Settings;
use crate::tuning::Tuning;

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct World {
    /// Seed the RNG was created from
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub tuning: Tuning,
    pub settings: Settings,
    /// Placement order; ids are never reused
    pub planets: Vec<Planet>,
    pub walls: Vec<Wall>,
    pub emitter: Population,
    pub spawners: Vec<Population>,
    pub wallet: Wallet,
    /// Price of the next emitter spawn-rate upgrade
    pub spawn_rate_cost: u64,
    /// Simulated seconds since creation or last reset
    pub time: f64,
    next_planet_id: PlanetId,
}

impl World {
    pub fn new(seed: u64, tuning: Tuning, settings: Settings) -> Self {
        let emitter = Population::emitter(&tuning.emitter, settings.max_particles());
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            wallet: Wallet::new(tuning.economy.starting_money),
            spawn_rate_cost: tuning.economy.spawn_rate_cost,
            tuning,
            settings,
            planets: Vec::new(),
            walls: Vec::new(),
            emitter,
            spawners: Vec::new(),
            time: 0.0,
            next_planet_id: 1,
        }
    }

    /// Default tuning and settings
    pub fn with_seed(seed: u64) -> Self {
        Self::new(seed, Tuning::default(), Settings::default())
    }

    /// Back to the starting state: no planets, walls or spawners, fresh wallet
    pub fn reset(&mut self) {
        self.planets.clear();
        self.walls.clear();
        self.spawners.clear();
        self.emitter = Population::emitter(&self.tuning.emitter, self.settings.max_particles());
        self.wallet = Wallet::new(self.tuning.economy.starting_money);
        self.spawn_rate_cost = self.tuning.economy.spawn_rate_cost;
        self.time = 0.0;
        self.next_planet_id = 1;
        log::info!("World reset");
    }

    fn allocate_planet_id(&mut self) -> PlanetId {
        let id = self.next_planet_id;
        self.next_planet_id += 1;
        id
    }

    pub fn planet(&self, id: PlanetId) -> Option<&Planet> {
        self.planets.iter().find(|p| p.id == id)
    }

    /// Planet under a point (within the pick margin), most recently placed first
    pub fn planet_at(&self, point: DVec2) -> Option<PlanetId> {
        self.planets
            .iter()
            .rev()
            .find(|p| circles_overlap(point, PICK_MARGIN, p.position, p.radius))
            .map(|p| p.id)
    }

    /// Buy and place a planet or dwarf planet
    pub fn place_planet(&mut self, position: DVec2, class: PlanetClass) -> Result<PlanetId, PurchaseError> {
        let cost = match class {
            PlanetClass::Planet => self.tuning.economy.planet_cost,
            PlanetClass::Dwarf => self.tuning.economy.dwarf_planet_cost,
        };
        self.wallet.spend(cost)?;

        let id = self.allocate_planet_id();
        let visual = self.rng.random_range(0..PLANET_TYPES.len());
        let class_tuning = match class {
            PlanetClass::Planet => &self.tuning.planet,
            PlanetClass::Dwarf => &self.tuning.dwarf_planet,
        };
        let planet = Planet::new(id, class, position, class_tuning)
            .with_particle_value(self.tuning.economy.particle_value)
            .with_visual(visual);
        log::info!(
            "Placed {:?} {} ({}) at ({:.0}, {:.0})",
            class,
            id,
            planet.planet_type().name,
            position.x,
            position.y
        );
        self.planets.push(planet);
        Ok(id)
    }

    /// Buy a particle spawner anchored at `position`
    pub fn place_spawner(&mut self, position: DVec2) -> Result<usize, PurchaseError> {
        self.wallet.spend(self.tuning.economy.spawner_cost)?;
        self.spawners.push(Population::spawner(
            position,
            &self.tuning.spawner,
            self.settings.max_particles(),
        ));
        log::info!("Placed spawner at ({:.0}, {:.0})", position.x, position.y);
        Ok(self.spawners.len() - 1)
    }

    /// Buy a wall; the price scales with its length
    pub fn place_wall(&mut self, p1: DVec2, p2: DVec2) -> Result<(), PurchaseError> {
        let wall = Wall::new(p1, p2);
        if wall.is_degenerate() {
            return Err(PurchaseError::DegenerateWall);
        }
        self.wallet
            .spend(wall_cost(wall.length(), self.tuning.economy.wall_cost_per_unit))?;
        log::info!("Placed wall of length {:.0}", wall.length());
        self.walls.push(wall);
        Ok(())
    }

    /// Price of a wall between two points, `None` if degenerate
    pub fn wall_price(&self, p1: DVec2, p2: DVec2) -> Option<u64> {
        let wall = Wall::new(p1, p2);
        (!wall.is_degenerate()).then(|| wall_cost(wall.length(), self.tuning.economy.wall_cost_per_unit))
    }

    /// Buy one gravity level; returns the new level
    pub fn upgrade_gravity(&mut self, id: PlanetId) -> Result<u32, PurchaseError> {
        let planet = self
            .planets
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(PurchaseError::UnknownPlanet(id))?;
        if !planet.can_upgrade_gravity() {
            return Err(PurchaseError::MaxLevel);
        }
        self.wallet.spend(planet.upgrade_cost)?;
        planet.upgrade_gravity();
        Ok(planet.gravity_level)
    }

    /// Buy the clone orbit ring for a full-size planet
    pub fn upgrade_clone_orbit(&mut self, id: PlanetId) -> Result<(), PurchaseError> {
        let planet = self
            .planets
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(PurchaseError::UnknownPlanet(id))?;
        if !planet.supports_clone_orbit() {
            return Err(PurchaseError::NotAvailable);
        }
        if planet.has_clone_orbit {
            return Err(PurchaseError::AlreadyActive);
        }
        self.wallet.spend(planet.clone_orbit_cost)?;
        planet.upgrade_clone_orbit();
        Ok(())
    }

    /// Raise the world emitter's spawn rate; returns the new rate
    pub fn upgrade_spawn_rate(&mut self) -> Result<f64, PurchaseError> {
        self.wallet.spend(self.spawn_rate_cost)?;
        let economy = &self.tuning.economy;
        self.emitter.spawn_rate += economy.spawn_rate_step;
        self.spawn_rate_cost = grown_cost(self.spawn_rate_cost, economy.spawn_rate_cost_growth);
        log::debug!("Emitter spawn rate {:.0}/s", self.emitter.spawn_rate);
        Ok(self.emitter.spawn_rate)
    }

    /// Every population, emitter first
    pub fn populations(&self) -> impl Iterator<Item = &Population> {
        std::iter::once(&self.emitter).chain(self.spawners.iter())
    }

    /// Every particle for rendering (read-only)
    pub fn particles(&self) -> impl Iterator<Item = &Particle> {
        self.populations().flat_map(|p| p.particles.iter())
    }

    /// Live particles across all populations
    pub fn particle_count(&self) -> usize {
        self.populations().map(Population::len).sum()
    }
}
