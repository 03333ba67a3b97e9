//! ASCII level format
//!
//! One string row per tile row:
//! - `#` solid terrain
//! - `.` open space
//! - `P` player spawn (exactly one)
//! - `E` hostile spawn point
//! - `*` collectible anchor (open space, preferred spawn slot)

use glam::Vec2;

use super::tilemap::Tilemap;
use crate::consts::{TILE_EMPTY, TILE_SOLID};
use crate::error::EngineError;

/// Built-in level shipped with the site
pub const DEFAULT_LEVEL: &str = "\
................................................\n\
................................................\n\
...................*............................\n\
.................#####.............*............\n\
.........*...................E...######.........\n\
.......####.......................#.............\n\
...............E...........####...#......*......\n\
..................######...........#.....####...\n\
.....*.......................*.....#............\n\
...#####........####.......#####...#.......E....\n\
.............................................##.\n\
......................*.........................\n\
.P..........######..#####..........*......####..\n\
####.................................#######....\n\
#####.......*...##.........E..##................\n\
######....#####.#####.......#####....#.......###\n\
#######..............###.......................#\n\
################################################";

/// A parsed level: tile grid plus spawn markers (tile coordinates)
#[derive(Debug, Clone)]
pub struct Level {
    pub width: usize,
    pub height: usize,
    pub tiles: Vec<u8>,
    pub player_spawn: (usize, usize),
    pub entity_spawns: Vec<(usize, usize)>,
    pub anchors: Vec<(usize, usize)>,
}

impl Level {
    /// Parse an ASCII level, validating row widths and the spawn marker
    pub fn parse(source: &str) -> Result<Self, EngineError> {
        let rows: Vec<&str> = source
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        let Some(first) = rows.first() else {
            return Err(EngineError::EmptyLevel);
        };

        let width = first.chars().count();
        let height = rows.len();
        let mut tiles = Vec::with_capacity(width * height);
        let mut spawns = Vec::new();
        let mut entity_spawns = Vec::new();
        let mut anchors = Vec::new();

        for (row, line) in rows.iter().enumerate() {
            let actual = line.chars().count();
            if actual != width {
                return Err(EngineError::LevelRowLength {
                    row,
                    expected: width,
                    actual,
                });
            }
            for (col, glyph) in line.chars().enumerate() {
                let tile = match glyph {
                    '#' => TILE_SOLID,
                    '.' => TILE_EMPTY,
                    'P' => {
                        spawns.push((col, row));
                        TILE_EMPTY
                    }
                    'E' => {
                        entity_spawns.push((col, row));
                        TILE_EMPTY
                    }
                    '*' => {
                        anchors.push((col, row));
                        TILE_EMPTY
                    }
                    _ => return Err(EngineError::UnknownGlyph { glyph, col, row }),
                };
                tiles.push(tile);
            }
        }

        let player_spawn = match spawns.as_slice() {
            [] => return Err(EngineError::MissingSpawn),
            [only] => *only,
            many => return Err(EngineError::MultipleSpawns(many.len())),
        };

        Ok(Self {
            width,
            height,
            tiles,
            player_spawn,
            entity_spawns,
            anchors,
        })
    }

    /// The built-in level
    pub fn default_level() -> Result<Self, EngineError> {
        Self::parse(DEFAULT_LEVEL)
    }

    /// Build the collision tilemap for this level
    pub fn to_tilemap(&self) -> Result<Tilemap, EngineError> {
        Tilemap::new(self.tiles.clone(), self.width, self.height)
    }

    /// World position that stands a body of `size` on the floor of the spawn tile
    pub fn spawn_position(&self, size: Vec2) -> Vec2 {
        let (x, y) = self.player_spawn;
        Vec2::new(
            x as f32 + (1.0 - size.x) * 0.5,
            y as f32 + 1.0 - size.y,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_level_parses() {
        let level = Level::default_level().unwrap();
        assert_eq!(level.width, 48);
        assert_eq!(level.height, 18);
        assert_eq!(level.tiles.len(), level.width * level.height);
        assert_eq!(level.player_spawn, (1, 12));
        assert!(!level.entity_spawns.is_empty());
        assert!(!level.anchors.is_empty());
        // Spawn stands on solid ground
        let map = level.to_tilemap().unwrap();
        let (x, y) = level.player_spawn;
        assert!(map.is_solid(x as i32, y as i32 + 1));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = Level::parse("P..\n##\n").unwrap_err();
        assert_eq!(
            err,
            EngineError::LevelRowLength {
                row: 1,
                expected: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn test_spawn_marker_required_and_unique() {
        assert_eq!(Level::parse("...\n###").unwrap_err(), EngineError::MissingSpawn);
        assert_eq!(
            Level::parse("P.P\n###").unwrap_err(),
            EngineError::MultipleSpawns(2)
        );
        assert_eq!(Level::parse("\n\n").unwrap_err(), EngineError::EmptyLevel);
    }

    #[test]
    fn test_unknown_glyph_rejected() {
        assert_eq!(
            Level::parse("P?\n##").unwrap_err(),
            EngineError::UnknownGlyph {
                glyph: '?',
                col: 1,
                row: 0
            }
        );
    }

    #[test]
    fn test_spawn_position_rests_on_floor() {
        let level = Level::parse("...\n.P.\n###").unwrap();
        let pos = level.spawn_position(Vec2::new(0.6, 0.9));
        assert!((pos.x - 1.2).abs() < 1e-5);
        assert!((pos.y + 0.9 - 2.0).abs() < 1e-5);
    }
}
