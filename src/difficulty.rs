//! Session difficulty
//!
//! Supplied by the host when a session starts; never persisted by the engine.

use serde::{Deserialize, Serialize};

/// Named difficulty levels offered by the start screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyPreset {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl DifficultyPreset {
    pub const ALL: [DifficultyPreset; 3] = [DifficultyPreset::Easy, DifficultyPreset::Normal, DifficultyPreset::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyPreset::Easy => "Easy",
            DifficultyPreset::Normal => "Normal",
            DifficultyPreset::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(DifficultyPreset::Easy),
            "normal" | "medium" => Some(DifficultyPreset::Normal),
            "hard" => Some(DifficultyPreset::Hard),
            _ => None,
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        match self {
            DifficultyPreset::Easy => Difficulty {
                projects_required: 3,
                enemy_multiplier: 0.5,
                one_hit_kill: false,
                invincibility_blocks_death: false,
            },
            DifficultyPreset::Normal => Difficulty {
                projects_required: 5,
                enemy_multiplier: 1.0,
                one_hit_kill: false,
                invincibility_blocks_death: false,
            },
            DifficultyPreset::Hard => Difficulty {
                projects_required: 8,
                enemy_multiplier: 1.5,
                one_hit_kill: true,
                invincibility_blocks_death: false,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Difficulty {
    /// Collections needed to finish the session
    pub projects_required: usize,
    /// Scales enemy spawn rate and cap; 0 disables spawning
    pub enemy_multiplier: f32,
    /// Any hostile contact kills and the health system is off
    pub one_hit_kill: bool,
    /// Whether an open modal's invincibility also blocks direct deaths
    #[serde(default)]
    pub invincibility_blocks_death: bool,
}

impl Default for Difficulty {
    fn default() -> Self {
        DifficultyPreset::default().difficulty()
    }
}

impl Difficulty {
    /// Seconds between enemy spawns
    pub fn enemy_interval(&self, base: f32) -> Option<f32> {
        (self.enemy_multiplier > 0.0).then(|| base / self.enemy_multiplier)
    }

    /// Maximum concurrent enemies
    pub fn max_enemies(&self, base: f32) -> usize {
        (base * self.enemy_multiplier.max(0.0)).ceil() as usize
    }

    /// Health is tracked only when a hit is not instantly lethal
    pub fn health_enabled(&self) -> bool {
        !self.one_hit_kill
    }
}
