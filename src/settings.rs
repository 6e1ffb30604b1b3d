//! Player-facing simulation settings
//!
//! Kept separate from [`crate::Tuning`]: tuning is the game balance, settings
//! are what the settings panel exposes (quality, trails and the two force
//! sliders).

use serde::{Deserialize, Serialize};

use crate::sim::particle::ForceOverrides;

/// Gravity range slider bounds (world units)
pub const GRAVITY_RANGE_MIN: f64 = 100.0;
pub const GRAVITY_RANGE_MAX: f64 = 1000.0;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Maximum live particles per population
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 2000,
            QualityPreset::Medium => 6000,
            QualityPreset::High => 15000,
        }
    }

    /// Positions kept in each particle trail
    pub fn trail_length(&self) -> usize {
        match self {
            QualityPreset::Low => 6,
            QualityPreset::Medium => 7,
            QualityPreset::High => 8,
        }
    }
}

/// Simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Quality preset (particle cap and trail length)
    pub quality: QualityPreset,
    /// Particle trails
    pub trails: bool,
    /// Overrides every planet's gravity distance when set
    pub gravity_range: Option<f64>,
    /// Overrides every planet's air resistance when set (0.0 - 1.0)
    pub air_resistance: Option<f64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            trails: true,
            gravity_range: None,
            air_resistance: None,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Effective trail length (0 when trails are off)
    pub fn trail_length(&self) -> usize {
        if self.trails {
            self.quality.trail_length()
        } else {
            0
        }
    }

    pub fn max_particles(&self) -> usize {
        self.quality.max_particles()
    }

    /// Set the gravity range slider, clamped to its bounds
    pub fn set_gravity_range(&mut self, range: Option<f64>) {
        self.gravity_range = range.map(|r| r.clamp(GRAVITY_RANGE_MIN, GRAVITY_RANGE_MAX));
    }

    /// Set the air resistance slider, clamped to 0-1
    pub fn set_air_resistance(&mut self, intensity: Option<f64>) {
        self.air_resistance = intensity.map(|a| a.clamp(0.0, 1.0));
    }

    /// Slider values as particle force overrides (clamped even if set directly)
    pub fn force_overrides(&self) -> ForceOverrides {
        ForceOverrides {
            gravity_distance: self
                .gravity_range
                .filter(|r| r.is_finite())
                .map(|r| r.clamp(GRAVITY_RANGE_MIN, GRAVITY_RANGE_MAX)),
            air_resistance: self
                .air_resistance
                .filter(|a| a.is_finite())
                .map(|a| a.clamp(0.0, 1.0)),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let settings = serde_json::from_str(json)?;
        log::info!("Loaded settings");
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert_eq!(QualityPreset::from_str("HIGH"), Some(QualityPreset::High));
        assert_eq!(QualityPreset::from_str("med"), Some(QualityPreset::Medium));
        assert_eq!(QualityPreset::from_str("ultra"), None);
        assert_eq!(QualityPreset::Low.as_str(), "Low");

        let settings = Settings::from_preset(QualityPreset::High);
        assert_eq!(settings.max_particles(), 15000);
        assert_eq!(settings.trail_length(), 8);
    }

    #[test]
    fn test_trails_off() {
        let settings = Settings {
            trails: false,
            ..Settings::default()
        };
        assert_eq!(settings.trail_length(), 0);
    }

    #[test]
    fn test_sliders_clamp() {
        let mut settings = Settings::default();
        assert_eq!(settings.force_overrides(), ForceOverrides::default());

        settings.set_gravity_range(Some(5000.0));
        settings.set_air_resistance(Some(-1.0));
        assert_eq!(settings.gravity_range, Some(GRAVITY_RANGE_MAX));
        assert_eq!(settings.air_resistance, Some(0.0));

        // Directly written out-of-range values are clamped on use
        settings.gravity_range = Some(10.0);
        settings.air_resistance = Some(f64::NAN);
        let overrides = settings.force_overrides();
        assert_eq!(overrides.gravity_distance, Some(GRAVITY_RANGE_MIN));
        assert_eq!(overrides.air_resistance, None);
    }

    #[test]
    fn test_json_round_trip_and_partial() {
        let mut settings = Settings::from_preset(QualityPreset::Low);
        settings.set_gravity_range(Some(750.0));
        let json = settings.to_json().unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), settings);

        let partial = Settings::from_json(r#"{ "trails": false }"#).unwrap();
        assert!(!partial.trails);
        assert_eq!(partial.quality, QualityPreset::Medium);
    }
}
