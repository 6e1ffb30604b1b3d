//! Particle Tycoon headless runner
//!
//! Drives the simulation at a nominal 60 Hz without a window and logs a
//! summary once per simulated second.
//!
//!   `particle-tycoon`                              - 60 seconds, default tuning
//!   `particle-tycoon --seconds 300 --seed 7`
//!   `particle-tycoon --tuning balance.json --quality high`
//!
//! Set `RUST_LOG=debug` to see upgrades and evictions.

#[cfg(not(target_arch = "wasm32"))]
use std::process::ExitCode;

#[cfg(not(target_arch = "wasm32"))]
use particle_tycoon::consts::NOMINAL_FPS;
#[cfg(not(target_arch = "wasm32"))]
use particle_tycoon::sim::{PlanetClass, World, tick};
#[cfg(not(target_arch = "wasm32"))]
use particle_tycoon::{QualityPreset, Settings, Tuning};

#[cfg(not(target_arch = "wasm32"))]
struct Args {
    tuning: Option<String>,
    seconds: u32,
    seed: u64,
    quality: QualityPreset,
}

#[cfg(not(target_arch = "wasm32"))]
impl Args {
    fn parse(args: impl Iterator<Item = String>) -> Result<Self, String> {
        let mut parsed = Args {
            tuning: None,
            seconds: 60,
            seed: 1,
            quality: QualityPreset::default(),
        };

        let mut args = args.skip(1);
        while let Some(arg) = args.next() {
            let mut value = |name: &str| args.next().ok_or_else(|| format!("{name} needs a value"));
            match arg.as_str() {
                "--tuning" => parsed.tuning = Some(value("--tuning")?),
                "--seconds" => {
                    parsed.seconds = value("--seconds")?
                        .parse()
                        .map_err(|e| format!("--seconds: {e}"))?;
                }
                "--seed" => {
                    parsed.seed = value("--seed")?
                        .parse()
                        .map_err(|e| format!("--seed: {e}"))?;
                }
                "--quality" => {
                    let name = value("--quality")?;
                    parsed.quality = QualityPreset::from_str(&name)
                        .ok_or_else(|| format!("unknown quality preset `{name}`"))?;
                }
                other => return Err(format!("unknown argument `{other}`")),
            }
        }
        Ok(parsed)
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = match Args::parse(std::env::args()) {
        Ok(args) => args,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let tuning = match &args.tuning {
        Some(path) => match Tuning::load(path) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::warn!("Rejected tuning {path}: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => Tuning::default(),
    };

    log::info!(
        "Particle Tycoon (headless) seed {} for {}s at {} quality",
        args.seed,
        args.seconds,
        args.quality.as_str()
    );

    let mut world = World::new(args.seed, tuning, Settings::from_preset(args.quality));
    if let Err(e) = world.place_planet(glam::DVec2::ZERO, PlanetClass::Planet) {
        log::warn!("Could not place starting planet: {e}");
    }

    let dt = 1.0 / NOMINAL_FPS;
    let ticks_per_second = NOMINAL_FPS as u32;
    let mut collected = 0usize;
    for second in 1..=args.seconds {
        for _ in 0..ticks_per_second {
            collected += tick(&mut world, dt).collected.len();
        }

        // Reinvest: keep upgrading the starting planet whenever it's affordable
        if let Some(id) = world.planets.first().map(|p| p.id) {
            while world.upgrade_gravity(id).is_ok() {}
        }

        log::info!(
            "t={:>4}s particles={:>6} collected={:>7} balance={:>7}",
            second,
            world.particle_count(),
            collected,
            world.wallet.balance
        );
    }

    log::info!(
        "Finished: earned {} over {}s, {} planets, {} particles live",
        world.wallet.earned,
        args.seconds,
        world.planets.len(),
        world.particle_count()
    );
    ExitCode::SUCCESS
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is driven by the host page on wasm; nothing to run here
}
