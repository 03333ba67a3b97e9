//! Hostile wanderers
//!
//! An entity floats at a fixed height, drifting left or right and turning
//! around at walls. Any resolved contact with the player destroys it, except
//! the invincible case, which only pushes it away.

use glam::Vec2;

use super::actor::{Actor, Body};
use super::player::Player;
use super::tilemap::Tilemap;
use crate::consts::{ENTITY_DAMAGE, ENTITY_DYING_SECONDS, ENTITY_HEIGHT, ENTITY_SPEED, ENTITY_WIDTH};

/// Pull on a slain entity's fling arc
const FLING_GRAVITY: f32 = 20.0;
const BOB_SPEED: f32 = 3.0;
const BOB_HEIGHT: f32 = 0.08;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntityState {
    Alive,
    /// Flung off-screen after being slain; no longer collidable
    Dying { remaining: f32 },
}

/// How player contact is judged for the current difficulty
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContactRules {
    pub one_hit_kill: bool,
}

/// Result of a resolved entity/player overlap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactOutcome {
    /// Player attack landed
    Slain,
    /// Player ground-slammed onto it
    Slammed,
    /// Player invincible: entity pushed away, nothing else happens
    Repelled,
    /// Player knocked back and damaged
    PlayerHit,
    /// One-hit-kill: the caller must kill the player
    PlayerKilled,
}

#[derive(Debug, Clone)]
pub struct Entity {
    pub body: Body,
    /// -1 or 1
    pub direction: f32,
    pub speed: f32,
    pub state: EntityState,
    bob_phase: f32,
}

impl Actor for Entity {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}

impl Entity {
    pub fn new(pos: Vec2, direction: f32) -> Self {
        Self {
            body: Body::new(pos, Vec2::new(ENTITY_WIDTH, ENTITY_HEIGHT)),
            direction: if direction < 0.0 { -1.0 } else { 1.0 },
            speed: ENTITY_SPEED,
            state: EntityState::Alive,
            bob_phase: pos.x,
        }
    }

    /// Centered in the given tile
    pub fn at_tile(x: i32, y: i32, direction: f32) -> Self {
        let pos = Vec2::new(
            x as f32 + (1.0 - ENTITY_WIDTH) * 0.5,
            y as f32 + (1.0 - ENTITY_HEIGHT) * 0.5,
        );
        Self::new(pos, direction)
    }

    pub fn is_alive(&self) -> bool {
        self.state == EntityState::Alive
    }

    /// Vertical draw offset of the idle bob
    pub fn bob_offset(&self) -> f32 {
        (self.bob_phase * BOB_SPEED).sin() * BOB_HEIGHT
    }

    pub fn update(&mut self, dt: f32, map: &Tilemap) {
        self.bob_phase += dt;
        match self.state {
            EntityState::Alive => {
                self.body.vel = Vec2::new(self.direction * self.speed, 0.0);
                let contacts = self.body.move_and_collide(dt, map);
                if contacts.horizontal() {
                    self.direction = -self.direction;
                }
            }
            EntityState::Dying { remaining } => {
                self.body.vel.y += FLING_GRAVITY * dt;
                self.body.pos += self.body.vel * dt;
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    self.mark_deleted();
                } else {
                    self.state = EntityState::Dying { remaining };
                }
            }
        }
    }

    /// Start the death fling away from `from_x`
    pub fn kill(&mut self, from_x: f32) {
        if !self.is_alive() {
            return;
        }
        let away = if self.body.center().x < from_x { -1.0 } else { 1.0 };
        self.body.vel = Vec2::new(away * 4.0, -6.0);
        self.state = EntityState::Dying {
            remaining: ENTITY_DYING_SECONDS,
        };
    }

    pub fn resolve_player_contact(&mut self, player: &mut Player, rules: &ContactRules) -> Option<ContactOutcome> {
        if !self.is_alive() {
            return None;
        }
        let bounds = self.body.bounds();
        let player_x = player.body.center().x;

        if let Some(hitbox) = player.attack_hitbox() {
            if hitbox.overlaps(&bounds) || player.body.bounds().overlaps(&bounds) {
                self.kill(player_x);
                return Some(ContactOutcome::Slain);
            }
        }

        if !player.body.bounds().overlaps(&bounds) {
            return None;
        }

        if player.is_ground_slamming() {
            self.kill(player_x);
            return Some(ContactOutcome::Slammed);
        }

        let away_from_player = if self.body.center().x < player_x { -1.0 } else { 1.0 };

        if player.invincible {
            self.direction = away_from_player;
            let pb = player.body.bounds();
            self.body.pos.x = if away_from_player < 0.0 {
                pb.x - self.body.size.x - 0.01
            } else {
                pb.right() + 0.01
            };
            return Some(ContactOutcome::Repelled);
        }

        self.kill(player_x);
        if rules.one_hit_kill {
            return Some(ContactOutcome::PlayerKilled);
        }
        player.knockback(-away_from_player);
        player.take_damage(ENTITY_DAMAGE);
        Some(ContactOutcome::PlayerHit)
    }
}
