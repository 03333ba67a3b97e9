//! Spawn placement shared by random items and portfolio collectibles

use glam::Vec2;
use rand::Rng;

use super::tilemap::Tilemap;
use crate::consts::{SPAWN_ATTEMPTS, TILE_EMPTY, TILE_SOLID};

/// How many tiles below a candidate may provide footing
const FOOTING_DEPTH: i32 = 3;

/// World-space center of a tile
pub fn tile_center(x: i32, y: i32) -> Vec2 {
    Vec2::new(x as f32 + 0.5, y as f32 + 0.5)
}

/// Top-left position that rests an object of `size` on the floor of tile `(x, y)`
pub fn resting_position(x: i32, y: i32, size: f32) -> Vec2 {
    Vec2::new(x as f32 + (1.0 - size) * 0.5, y as f32 + 1.0 - size)
}

/// Candidate tile is open, has in-map footing within three tiles below, and
/// keeps `min_distance` from every occupied point.
pub fn is_valid_spawn(map: &Tilemap, x: i32, y: i32, occupied: &[Vec2], min_distance: f32) -> bool {
    if map.get(x, y) != Some(TILE_EMPTY) {
        return false;
    }
    let has_footing = (1..=FOOTING_DEPTH).any(|dy| map.get(x, y + dy) == Some(TILE_SOLID));
    if !has_footing {
        return false;
    }
    let center = tile_center(x, y);
    occupied.iter().all(|p| p.distance(center) >= min_distance)
}

/// Try `SPAWN_ATTEMPTS` random tiles; `None` if none were valid
pub fn find_spawn_position(
    map: &Tilemap,
    occupied: &[Vec2],
    min_distance: f32,
    rng: &mut impl Rng,
) -> Option<(i32, i32)> {
    let (w, h) = (map.width() as i32, map.height() as i32);
    if w == 0 || h == 0 {
        return None;
    }
    for _ in 0..SPAWN_ATTEMPTS {
        let x = rng.random_range(0..w);
        let y = rng.random_range(0..h);
        if is_valid_spawn(map, x, y, occupied, min_distance) {
            log::debug!("spawn position ({x}, {y})");
            return Some((x, y));
        }
    }
    None
}
