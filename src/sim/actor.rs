//! Shared moving-body logic for everything that walks or floats in the level
//!
//! Movement is resolved one axis at a time against the tilemap: move, then
//! push back out of any solid tile the body now overlaps.

use glam::Vec2;

use super::tilemap::Tilemap;
use crate::Rect;

/// Gap left between a resolved body and the tile it hit
const CONTACT_SKIN: f32 = 1e-3;

/// Which sides of the body touched terrain during the last move
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Contacts {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
}

impl Contacts {
    pub fn any(&self) -> bool {
        self.left || self.right || self.top || self.bottom
    }

    pub fn horizontal(&self) -> bool {
        self.left || self.right
    }
}

/// Position, size and velocity of a level actor (tile units)
#[derive(Debug, Clone)]
pub struct Body {
    pub pos: Vec2,
    pub size: Vec2,
    pub vel: Vec2,
    /// Set when the last move hit terrain on any side
    pub collided: bool,
    pub contacts: Contacts,
    /// Marked for removal at the end of the update
    pub deleted: bool,
}

impl Body {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            pos,
            size,
            vel: Vec2::ZERO,
            collided: false,
            contacts: Contacts::default(),
            deleted: false,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    pub fn overlaps(&self, other: &Body) -> bool {
        self.bounds().overlaps(&other.bounds())
    }

    /// Integrate velocity for `dt`, resolving against solid tiles
    pub fn move_and_collide(&mut self, dt: f32, map: &Tilemap) -> Contacts {
        let mut contacts = Contacts::default();
        let delta = self.vel * dt;

        // Split long moves so a fast body cannot tunnel through a single tile
        let steps = (delta.abs().max_element() / 0.45).ceil().max(1.0) as usize;
        let step = delta / steps as f32;

        for _ in 0..steps {
            if step.x != 0.0 && !contacts.horizontal() {
                self.pos.x += step.x;
                if let Some(fix) = self.resolve_x(step.x, map) {
                    self.pos.x = fix;
                    if step.x > 0.0 {
                        contacts.right = true;
                    } else {
                        contacts.left = true;
                    }
                }
            }
            if step.y != 0.0 && !(contacts.top || contacts.bottom) {
                self.pos.y += step.y;
                if let Some(fix) = self.resolve_y(step.y, map) {
                    self.pos.y = fix;
                    if step.y > 0.0 {
                        contacts.bottom = true;
                    } else {
                        contacts.top = true;
                    }
                }
            }
        }

        if contacts.horizontal() {
            self.vel.x = 0.0;
        }
        if contacts.top || contacts.bottom {
            self.vel.y = 0.0;
        }
        self.collided = contacts.any();
        self.contacts = contacts;
        contacts
    }

    fn resolve_x(&self, dx: f32, map: &Tilemap) -> Option<f32> {
        let bounds = self.bounds();
        let (x0, y0, x1, y1) = Tilemap::tile_span(&bounds);
        if dx > 0.0 {
            (y0..=y1)
                .any(|y| map.is_solid(x1, y))
                .then(|| x1 as f32 - self.size.x - CONTACT_SKIN)
        } else {
            (y0..=y1)
                .any(|y| map.is_solid(x0, y))
                .then(|| (x0 + 1) as f32 + CONTACT_SKIN)
        }
    }

    fn resolve_y(&self, dy: f32, map: &Tilemap) -> Option<f32> {
        let bounds = self.bounds();
        let (x0, y0, x1, y1) = Tilemap::tile_span(&bounds);
        if dy > 0.0 {
            (x0..=x1)
                .any(|x| map.is_solid(x, y1))
                .then(|| y1 as f32 - self.size.y)
        } else {
            (x0..=x1)
                .any(|x| map.is_solid(x, y0))
                .then(|| (y0 + 1) as f32 + CONTACT_SKIN)
        }
    }

    /// True when solid ground lies directly beneath the body
    pub fn is_supported(&self, map: &Tilemap) -> bool {
        let probe = Rect::new(self.pos.x, self.pos.y + self.size.y, self.size.x, 0.02);
        map.rect_hits_solid(&probe)
    }
}

/// Common view over every actor the game updates
pub trait Actor {
    fn body(&self) -> &Body;
    fn body_mut(&mut self) -> &mut Body;

    fn bounds(&self) -> Rect {
        self.body().bounds()
    }

    fn center(&self) -> Vec2 {
        self.body().center()
    }

    fn is_deleted(&self) -> bool {
        self.body().deleted
    }

    fn mark_deleted(&mut self) {
        self.body_mut().deleted = true;
    }

    fn overlaps(&self, other: &dyn Actor) -> bool {
        self.bounds().overlaps(&other.bounds())
    }
}

/// Two-phase removal: deletions are flagged during iteration and applied here
pub fn remove_deleted<A: Actor>(actors: &mut Vec<A>) -> usize {
    let before = actors.len();
    actors.retain(|a| !a.is_deleted());
    before - actors.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor_map() -> Tilemap {
        // 6 wide, 4 tall, solid floor on the last row and a wall at x=4
        let mut tiles = vec![0u8; 24];
        for x in 0..6 {
            tiles[3 * 6 + x] = 1;
        }
        tiles[2 * 6 + 4] = 1;
        Tilemap::new(tiles, 6, 4).unwrap()
    }

    #[test]
    fn test_falling_body_lands_on_floor() {
        let map = floor_map();
        let mut body = Body::new(Vec2::new(1.0, 0.5), Vec2::new(0.6, 0.9));
        body.vel.y = 10.0;
        let contacts = body.move_and_collide(0.5, &map);
        assert!(contacts.bottom);
        assert!(body.collided);
        assert_eq!(body.vel.y, 0.0);
        assert!((body.pos.y + body.size.y - 3.0).abs() < 1e-4);
        assert!(body.is_supported(&map));
    }

    #[test]
    fn test_wall_stops_horizontal_motion() {
        let map = floor_map();
        let mut body = Body::new(Vec2::new(2.0, 2.05), Vec2::new(0.6, 0.9));
        body.vel.x = 20.0;
        let contacts = body.move_and_collide(0.5, &map);
        assert!(contacts.right);
        assert!(body.bounds().right() <= 4.0);
        assert_eq!(body.vel.x, 0.0);
    }

    #[test]
    fn test_side_walls_outside_map_are_solid() {
        let map = floor_map();
        let mut body = Body::new(Vec2::new(0.2, 1.0), Vec2::new(0.6, 0.9));
        body.vel.x = -5.0;
        let contacts = body.move_and_collide(0.5, &map);
        assert!(contacts.left);
        assert!(body.pos.x >= 0.0);
    }

    #[test]
    fn test_free_motion_has_no_contacts() {
        let map = floor_map();
        let mut body = Body::new(Vec2::new(0.5, 0.2), Vec2::new(0.5, 0.5));
        body.vel = Vec2::new(1.0, 1.0);
        let contacts = body.move_and_collide(0.1, &map);
        assert!(!contacts.any());
        assert!(!body.collided);
        assert!((body.pos - Vec2::new(0.6, 0.3)).length() < 1e-5);
    }
}
