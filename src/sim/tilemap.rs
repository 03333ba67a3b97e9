//! Tile grid and per-tile collision mask
//!
//! The mask stores one bit per exposed edge of every solid tile. It is derived
//! from the tiles and rebuilt whenever the grid is mutated.

use glam::Vec2;

use crate::Rect;
use crate::consts::TILE_SOLID;
use crate::error::EngineError;

pub const EDGE_LEFT: u8 = 1;
pub const EDGE_RIGHT: u8 = 2;
pub const EDGE_TOP: u8 = 4;
pub const EDGE_BOTTOM: u8 = 8;

/// Every edge bit, in draw order
pub const EDGES: [u8; 4] = [EDGE_LEFT, EDGE_RIGHT, EDGE_TOP, EDGE_BOTTOM];

/// Build the exposed-edge mask for a row-major grid.
///
/// A side is flagged only when it is inside the map and the neighbor on that
/// side is not solid. Map boundaries are never flagged.
pub fn build_collision_mask(tiles: &[u8], width: usize, height: usize) -> Vec<u8> {
    let solid = |x: usize, y: usize| tiles[y * width + x] == TILE_SOLID;
    let mut mask = vec![0u8; tiles.len()];

    for y in 0..height {
        for x in 0..width {
            if !solid(x, y) {
                continue;
            }
            let mut bits = 0;
            if x > 0 && !solid(x - 1, y) {
                bits |= EDGE_LEFT;
            }
            if x + 1 < width && !solid(x + 1, y) {
                bits |= EDGE_RIGHT;
            }
            if y > 0 && !solid(x, y - 1) {
                bits |= EDGE_TOP;
            }
            if y + 1 < height && !solid(x, y + 1) {
                bits |= EDGE_BOTTOM;
            }
            mask[y * width + x] = bits;
        }
    }

    mask
}

/// The level grid
#[derive(Debug, Clone)]
pub struct Tilemap {
    width: usize,
    height: usize,
    tiles: Vec<u8>,
    mask: Vec<u8>,
}

impl Tilemap {
    /// Create a tilemap, rejecting grids whose length disagrees with the dimensions
    pub fn new(tiles: Vec<u8>, width: usize, height: usize) -> Result<Self, EngineError> {
        if width == 0 || height == 0 {
            return Err(EngineError::EmptyDimensions { width, height });
        }
        let expected = width * height;
        if tiles.len() != expected {
            return Err(EngineError::TilemapSize {
                expected,
                actual: tiles.len(),
            });
        }
        let mask = build_collision_mask(&tiles, width, height);
        Ok(Self {
            width,
            height,
            tiles,
            mask,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn tiles(&self) -> &[u8] {
        &self.tiles
    }

    pub fn mask(&self) -> &[u8] {
        &self.mask
    }

    pub fn index_of(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    pub fn coords_of(&self, index: usize) -> (usize, usize) {
        (index % self.width, index / self.width)
    }

    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Tile value, `None` outside the map
    pub fn get(&self, x: i32, y: i32) -> Option<u8> {
        self.in_bounds(x, y)
            .then(|| self.tiles[y as usize * self.width + x as usize])
    }

    /// Edge bits for a tile, 0 outside the map
    pub fn mask_at(&self, x: i32, y: i32) -> u8 {
        if self.in_bounds(x, y) {
            self.mask[y as usize * self.width + x as usize]
        } else {
            0
        }
    }

    /// Solid test for collision queries.
    ///
    /// Side walls and the floor below the map are solid; the sky above is open.
    pub fn is_solid(&self, x: i32, y: i32) -> bool {
        if x < 0 || x as usize >= self.width {
            return true;
        }
        if y < 0 {
            return false;
        }
        if y as usize >= self.height {
            return true;
        }
        self.tiles[y as usize * self.width + x as usize] == TILE_SOLID
    }

    /// Solid test at a world position
    pub fn is_solid_at(&self, pos: Vec2) -> bool {
        self.is_solid(pos.x.floor() as i32, pos.y.floor() as i32)
    }

    fn rebuild_mask(&mut self) {
        self.mask = build_collision_mask(&self.tiles, self.width, self.height);
    }

    /// Double the level width by emitting every row twice (`row, row`).
    ///
    /// Tile `(x, y)` and `(x + old_width, y)` hold the same value afterwards.
    pub fn double_width(&mut self) {
        let mut doubled = Vec::with_capacity(self.tiles.len() * 2);
        for row in self.tiles.chunks(self.width) {
            doubled.extend_from_slice(row);
            doubled.extend_from_slice(row);
        }
        self.tiles = doubled;
        self.width *= 2;
        self.rebuild_mask();
    }

    /// Integer tile range covered by a rectangle (inclusive bounds)
    pub fn tile_span(rect: &Rect) -> (i32, i32, i32, i32) {
        // Shrink slightly so a rect resting exactly on a tile boundary does not
        // report the neighbor it merely touches.
        const INSET: f32 = 1e-4;
        (
            (rect.x + INSET).floor() as i32,
            (rect.y + INSET).floor() as i32,
            (rect.right() - INSET).floor() as i32,
            (rect.bottom() - INSET).floor() as i32,
        )
    }

    /// True if any tile overlapped by `rect` is solid
    pub fn rect_hits_solid(&self, rect: &Rect) -> bool {
        let (x0, y0, x1, y1) = Self::tile_span(rect);
        (y0..=y1).any(|y| (x0..=x1).any(|x| self.is_solid(x, y)))
    }

    /// In-map indices of solid tiles directly beneath a rectangle's bottom edge
    pub fn solid_tiles_below(&self, rect: &Rect) -> Vec<usize> {
        let (x0, _, x1, _) = Self::tile_span(rect);
        let y = (rect.bottom() + 1e-3).floor() as i32;
        (x0..=x1)
            .filter(|&x| self.in_bounds(x, y) && self.is_solid(x, y))
            .map(|x| self.index_of(x as usize, y as usize))
            .collect()
    }
}
