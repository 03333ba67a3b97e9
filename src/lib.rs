//! Folio Runner - a hidden portfolio platformer
//!
//! Core modules:
//! - `sim`: Simulation (tilemap, actors, camera, items, game orchestration)
//! - `renderer`: Stateless draw primitives and the WebGPU pipeline
//! - `catalog`: Content records that back the collectible projects
//! - `settings` / `difficulty`: Session and presentation configuration
//! - `leaderboard`: Best completion times
//! - `storage`: LocalStorage JSON slots (no-op on native)

pub mod catalog;
pub mod difficulty;
pub mod error;
pub mod leaderboard;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod storage;

pub use catalog::ContentRecord;
pub use difficulty::{Difficulty, DifficultyPreset};
pub use error::{CatalogError, EngineError, RenderError};
pub use leaderboard::Leaderboard;
pub use settings::{QualityPreset, Settings};

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Game configuration constants
pub mod consts {
    /// Largest frame step the simulation accepts (seconds)
    pub const MAX_FRAME_DT: f32 = 0.25;

    /// Tile values
    pub const TILE_EMPTY: u8 = 0;
    pub const TILE_SOLID: u8 = 1;

    /// Player body (tiles)
    pub const PLAYER_WIDTH: f32 = 0.6;
    pub const PLAYER_HEIGHT: f32 = 0.9;
    pub const PLAYER_MAX_HEALTH: u32 = 5;

    /// Horizontal movement (tiles/s)
    pub const RUN_SPEED: f32 = 6.0;
    /// Multiplier applied to run speed while airborne
    pub const AIR_CONTROL: f32 = 0.85;
    /// Divisor applied while shift (walk) is held
    pub const WALK_DIVISOR: f32 = 2.0;
    /// Divisor applied while crouched
    pub const CROUCH_DIVISOR: f32 = 2.5;

    /// Vertical impulses (tiles/s, upward)
    pub const JUMP_IMPULSE: f32 = 11.0;
    pub const DOUBLE_JUMP_IMPULSE: f32 = 9.0;
    pub const WALL_JUMP_IMPULSE: f32 = 10.0;
    pub const WALL_JUMP_PUSH: f32 = 5.0;

    /// Gravity: vy += (BASE + RAMP * t^2) * dt, t = time airborne
    pub const GRAVITY_BASE: f32 = 28.0;
    pub const GRAVITY_RAMP: f32 = 60.0;
    pub const MAX_FALL_SPEED: f32 = 18.0;
    pub const GROUND_SLAM_SPEED: f32 = 22.0;
    /// Impact speed above which a landing shakes the camera
    pub const HARD_LANDING_SPEED: f32 = 14.0;

    pub const SLIDE_SPEED: f32 = 9.0;
    pub const SLIDE_COOLDOWN: f32 = 1.5;
    pub const ROLL_SPEED: f32 = 7.5;

    pub const KNOCKBACK_DELAY: f32 = 0.1;
    pub const KNOCKBACK_SPEED: f32 = 7.0;
    pub const KNOCKBACK_HOP: f32 = 5.0;

    /// Window in which another attack continues the combo
    pub const ATTACK_COMBO_WINDOW: f32 = 0.45;
    /// Reach of an attack in front of the player (tiles)
    pub const ATTACK_REACH: f32 = 0.6;

    /// Ledge grab tolerance between player top and ledge top (tiles)
    pub const LEDGE_GRAB_TOLERANCE: f32 = 0.35;

    /// Recently touched tile trail
    pub const MAX_TOUCH_HISTORY: usize = 32;
    pub const TOUCH_GLOW_SECONDS: f64 = 1.5;
    pub const TOUCH_FADE_SECONDS: f64 = 1.0;

    /// Camera
    pub const CAMERA_FOLLOW_SPEED: f32 = 5.0;
    pub const CAMERA_LOOK_AHEAD: f32 = 0.2;
    pub const CAMERA_SNAP_EPSILON: f32 = 0.01;
    pub const CAMERA_DEAD_ZONE: f32 = 0.1;
    pub const ZOOM_MIN: f32 = 0.5;
    pub const ZOOM_MAX: f32 = 2.5;
    pub const ZOOM_STEP: f32 = 0.2;
    pub const PORTRAIT_VIEW: (f32, f32) = (12.0, 16.0);
    pub const LANDSCAPE_VIEW: (f32, f32) = (16.0, 10.0);

    /// Camera shake presets (duration s, magnitude tiles)
    pub const SHAKE_ATTACK: (f32, f32) = (0.12, 0.06);
    pub const SHAKE_HARD_LANDING: (f32, f32) = (0.2, 0.12);
    pub const SHAKE_GROUND_SLAM: (f32, f32) = (0.3, 0.25);
    pub const SHAKE_HIT: (f32, f32) = (0.25, 0.2);

    /// Particles
    pub const PARTICLE_FADE_IN: f32 = 2.0;
    pub const PARTICLE_EPSILON: f32 = 0.01;
    pub const HEALTH_GLYPH_COUNT: usize = 3;

    /// Hostile entities
    pub const ENTITY_WIDTH: f32 = 0.8;
    pub const ENTITY_HEIGHT: f32 = 0.6;
    pub const ENTITY_SPEED: f32 = 1.5;
    pub const ENTITY_DAMAGE: u32 = 1;
    pub const ENTITY_DYING_SECONDS: f32 = 0.6;
    pub const ENEMY_SPAWN_INTERVAL: f32 = 12.0;
    pub const BASE_MAX_ENEMIES: f32 = 4.0;
    pub const ENEMY_MIN_PLAYER_DISTANCE: f32 = 8.0;

    /// Items
    pub const ITEM_SIZE: f32 = 0.6;
    pub const SPAWN_ATTEMPTS: usize = 30;

    /// Portfolio collectibles
    pub const PORTFOLIO_ITEM_SIZE: f32 = 0.9;
    pub const PORTFOLIO_VISIBLE_SLOTS: usize = 3;
    pub const PORTFOLIO_MIN_DISTANCE: f32 = 6.0;
    pub const PROXIMITY_DISTANCE: f32 = 1.5;
    pub const HOVER_DELAY: f32 = 0.25;
    pub const TOOLTIP_FADE_RATE: f32 = 4.0;
    pub const APPEAR_RATE: f32 = 3.0;

    /// Direction indicator toward the nearest collectible
    pub const INDICATOR_MIN_DISTANCE: f32 = 10.0;
    pub const INDICATOR_DELAY: f32 = 15.0;
}

/// Axis-aligned rectangle in world units (top-left origin, y down)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos.x, pos.y, size.x, size.y)
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    /// Strict overlap test (touching edges do not overlap)
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }
}

/// Move `current` toward `target` by at most `max_delta`
#[inline]
pub fn approach(current: f32, target: f32, max_delta: f32) -> f32 {
    if current < target {
        (current + max_delta).min(target)
    } else {
        (current - max_delta).max(target)
    }
}

/// Quadratic ease-out on [0, 1]
#[inline]
pub fn ease_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t) * (1.0 - t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_overlap_excludes_touching_edges() {
        let a = Rect::new(0.0, 0.0, 1.0, 1.0);
        let b = Rect::new(1.0, 0.0, 1.0, 1.0);
        let c = Rect::new(0.5, 0.5, 1.0, 1.0);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&a));
    }

    #[test]
    fn test_approach_does_not_overshoot() {
        assert_eq!(approach(0.0, 1.0, 0.3), 0.3);
        assert_eq!(approach(0.9, 1.0, 0.3), 1.0);
        assert_eq!(approach(1.0, 0.0, 2.0), 0.0);
    }
}
