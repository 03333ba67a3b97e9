//! Presentation settings and preferences
//!
//! Persisted in LocalStorage, separate from the leaderboard.

use serde::{Deserialize, Serialize};

use crate::storage;

const STORAGE_KEY: &str = "folio_runner_settings";

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

    /// Maximum live particles for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 60,
            QualityPreset::Medium => 250,
            QualityPreset::High => 800,
        }
    }

    /// Spark count multiplier for bursts
    pub fn burst_scale(&self) -> f32 {
        match self {
            QualityPreset::Low => 0.4,
            QualityPreset::Medium => 0.75,
            QualityPreset::High => 1.0,
        }
    }

    /// Whether walked tiles glow
    pub fn tile_glow_enabled(&self) -> bool {
        !matches!(self, QualityPreset::Low)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub quality: QualityPreset,

    // === Visual Effects ===
    /// Camera shake on attacks, hits and hard landings
    pub screen_shake: bool,
    pub particles: bool,
    /// Orange glow on recently walked tiles
    pub tile_glow: bool,

    // === HUD ===
    /// Arrow toward the nearest project after a long search
    pub show_indicator: bool,

    // === Accessibility ===
    /// Reduced motion (no shake, calmer effects)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            screen_shake: true,
            particles: true,
            tile_glow: true,
            show_indicator: true,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Switch preset; Low also turns the tile glow off
    pub fn apply_preset(&mut self, preset: QualityPreset) {
        self.quality = preset;
        if !preset.tile_glow_enabled() {
            self.tile_glow = false;
        }
    }

    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Effective tile glow (respects quality)
    pub fn effective_tile_glow(&self) -> bool {
        self.tile_glow && self.quality.tile_glow_enabled()
    }

    /// Effective particle count cap
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else if self.reduced_motion {
            self.quality.max_particles() / 4
        } else {
            self.quality.max_particles()
        }
    }

    /// Scale a burst size for the current preset
    pub fn burst(&self, count: usize) -> usize {
        (count as f32 * self.quality.burst_scale()).round() as usize
    }

    /// Stored preferences, or defaults when none are saved
    pub fn load() -> Self {
        match storage::read::<Settings>(STORAGE_KEY) {
            Some(settings) => {
                log::info!("Loaded settings ({} quality)", settings.quality.as_str());
                settings
            }
            None => Self::default(),
        }
    }

    pub fn save(&self) {
        if storage::write(STORAGE_KEY, self) {
            log::info!("Settings saved");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduced_motion_disables_shake() {
        let mut s = Settings::default();
        assert!(s.effective_screen_shake());
        s.reduced_motion = true;
        assert!(!s.effective_screen_shake());
        assert!(s.max_particles() < s.quality.max_particles());
    }

    #[test]
    fn test_particles_off_means_zero_cap() {
        let s = Settings {
            particles: false,
            ..Settings::default()
        };
        assert_eq!(s.max_particles(), 0);
    }

    #[test]
    fn test_low_preset_turns_off_glow() {
        let mut s = Settings::default();
        s.apply_preset(QualityPreset::Low);
        assert!(!s.effective_tile_glow());
        assert_eq!(s.burst(10), 4);
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let s: Settings = serde_json::from_str(r#"{"quality": "High"}"#).unwrap();
        assert_eq!(s.quality, QualityPreset::High);
        assert!(s.show_indicator);
    }
}
