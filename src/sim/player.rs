//! The player character
//!
//! Movement verbs (`jump`, `slide`, `attack`, ...) are policy checks that
//! return whether they took effect; refusing is never an error. Side effects
//! the rest of the game cares about (landing, death, health changes) are
//! queued as [`PlayerSignal`]s and drained once per tick by the game.

use glam::Vec2;
use rand::Rng;

use super::actor::{Actor, Body};
use super::animation::{Animation, Animator};
use super::camera::{Facing, FollowTarget};
use super::tilemap::Tilemap;
use crate::Rect;
use crate::consts::*;

/// Things that happened to the player during a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerSignal {
    Jumped { double: bool },
    /// Touched down on a new row; `at` is the bottom-center of the body
    Landed { hard: bool, at: Vec2 },
    GroundSlamImpact { at: Vec2 },
    AttackStarted,
    HealthChanged { delta: i32 },
    /// Health just reached zero
    HealthDepleted,
    /// Sent back to spawn
    Died,
}

/// Integer health clamped to `[0, max]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Health {
    current: u32,
    max: u32,
    /// Disabled under one-hit-kill rules; every change becomes a no-op
    pub enabled: bool,
}

impl Health {
    pub fn new(max: u32) -> Self {
        Self {
            current: max,
            max,
            enabled: true,
        }
    }

    pub fn with_current(max: u32, current: u32) -> Self {
        Self {
            current: current.min(max),
            max,
            enabled: true,
        }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn is_full(&self) -> bool {
        self.current >= self.max
    }

    pub fn fraction(&self) -> f32 {
        if self.max == 0 {
            0.0
        } else {
            self.current as f32 / self.max as f32
        }
    }

    /// Returns the amount actually lost
    fn lose(&mut self, amount: u32) -> u32 {
        let lost = amount.min(self.current);
        self.current -= lost;
        lost
    }

    /// Returns the amount actually gained
    fn gain(&mut self, amount: u32) -> u32 {
        let gained = amount.min(self.max - self.current);
        self.current += gained;
        gained
    }

    fn refill(&mut self) {
        self.current = self.max;
    }
}

/// One entry of the recently-walked tile trail
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchedTile {
    pub index: usize,
    pub touched_at: f64,
    pub fade_start: Option<f64>,
}

/// Recently touched tiles, most recent first
#[derive(Debug, Clone, Default)]
pub struct TouchTrail {
    entries: Vec<TouchedTile>,
}

impl TouchTrail {
    pub fn entries(&self) -> &[TouchedTile] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record the tiles currently underfoot. Re-touching refreshes an entry
    /// and moves it to the front instead of duplicating it.
    pub fn touch(&mut self, indices: &[usize], now: f64) {
        for &index in indices.iter().rev() {
            let entry = match self.entries.iter().position(|e| e.index == index) {
                Some(pos) => self.entries.remove(pos),
                None => TouchedTile {
                    index,
                    touched_at: now,
                    fade_start: None,
                },
            };
            self.entries.insert(
                0,
                TouchedTile {
                    touched_at: now,
                    fade_start: None,
                    ..entry
                },
            );
        }
        self.entries.truncate(MAX_TOUCH_HISTORY);
    }

    /// Start fades on stale entries and drop finished ones
    pub fn update(&mut self, now: f64) {
        for entry in &mut self.entries {
            if entry.fade_start.is_none() && now - entry.touched_at > TOUCH_GLOW_SECONDS {
                entry.fade_start = Some(now);
            }
        }
        self.entries
            .retain(|e| e.fade_start.is_none_or(|start| now - start < TOUCH_FADE_SECONDS));
    }

    /// Glow intensity in [0, 1] for a tile index
    pub fn glow(&self, index: usize, now: f64) -> f32 {
        self.entries
            .iter()
            .find(|e| e.index == index)
            .map(|e| match e.fade_start {
                Some(start) => (1.0 - (now - start) / TOUCH_FADE_SECONDS).clamp(0.0, 1.0) as f32,
                None => 1.0,
            })
            .unwrap_or(0.0)
    }

    /// Re-index after the map width changed (`index = y * width + x`)
    pub fn remap(&mut self, old_width: usize, new_width: usize) {
        for entry in &mut self.entries {
            let (x, y) = (entry.index % old_width, entry.index / old_width);
            entry.index = y * new_width + x;
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingKnockback {
    delay: f32,
    direction: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgeGrab {
    /// Column of the wall tile being held
    pub wall_x: i32,
    /// Row whose top edge is the ledge
    pub row: i32,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub body: Body,
    pub facing: Facing,
    animator: Animator,
    pub health: Health,
    on_ground: bool,
    crouching: bool,
    double_jumped: bool,
    rolled: bool,
    /// Seconds since leaving the ground (drives the gravity ramp)
    airborne_time: f32,
    /// Desired horizontal velocity from the controller
    move_intent: f32,
    speed_multiplier: f32,
    speed_boost_timer: f32,
    slide_cooldown: f32,
    wall_jump_timer: f32,
    touching_wall: Option<Facing>,
    combo_timer: f32,
    last_attack: Animation,
    knockback: Option<PendingKnockback>,
    ledge: Option<LedgeGrab>,
    last_landing_row: Option<i32>,
    spawn: Vec2,
    /// Contact with hostiles only repels them (e.g. while a modal is open)
    pub invincible: bool,
    trail: TouchTrail,
    signals: Vec<PlayerSignal>,
}

impl Actor for Player {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}

impl Player {
    pub fn new(spawn: Vec2) -> Self {
        Self {
            body: Body::new(spawn, Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT)),
            facing: Facing::Right,
            animator: Animator::new(Animation::Fall),
            health: Health::new(PLAYER_MAX_HEALTH),
            on_ground: false,
            crouching: false,
            double_jumped: false,
            rolled: false,
            airborne_time: 0.0,
            move_intent: 0.0,
            speed_multiplier: 1.0,
            speed_boost_timer: 0.0,
            slide_cooldown: 0.0,
            wall_jump_timer: 0.0,
            touching_wall: None,
            combo_timer: 0.0,
            last_attack: Animation::Attack4,
            knockback: None,
            ledge: None,
            last_landing_row: None,
            spawn,
            invincible: false,
            trail: TouchTrail::default(),
            signals: Vec::new(),
        }
    }

    // --- Queries ---

    pub fn animation(&self) -> Animation {
        self.animator.current()
    }

    pub fn animation_frame(&self) -> u8 {
        self.animator.frame()
    }

    pub fn on_ground(&self) -> bool {
        self.on_ground
    }

    pub fn is_crouching(&self) -> bool {
        self.crouching
    }

    pub fn has_double_jumped(&self) -> bool {
        self.double_jumped
    }

    pub fn ledge(&self) -> Option<LedgeGrab> {
        self.ledge
    }

    pub fn is_ledge_hanging(&self) -> bool {
        self.ledge.is_some()
    }

    pub fn touching_wall(&self) -> Option<Facing> {
        self.touching_wall
    }

    pub fn is_attacking(&self) -> bool {
        self.animator.current().is_attack()
    }

    pub fn is_ground_slamming(&self) -> bool {
        matches!(
            self.animator.current(),
            Animation::GroundSlam | Animation::GroundSlamTransition
        )
    }

    pub fn controller_disabled(&self) -> bool {
        self.animator.current().disables_controller()
    }

    pub fn slide_ready(&self) -> bool {
        self.slide_cooldown <= 0.0
    }

    pub fn speed_multiplier(&self) -> f32 {
        self.speed_multiplier
    }

    pub fn spawn(&self) -> Vec2 {
        self.spawn
    }

    pub fn trail(&self) -> &TouchTrail {
        &self.trail
    }

    pub fn trail_mut(&mut self) -> &mut TouchTrail {
        &mut self.trail
    }

    /// Where the health bar floats (and health glyphs rise from)
    pub fn health_bar_anchor(&self) -> Vec2 {
        Vec2::new(self.body.center().x, self.body.pos.y - 0.35)
    }

    /// Hitbox of the current attack swing, if any
    pub fn attack_hitbox(&self) -> Option<Rect> {
        if !self.is_attacking() {
            return None;
        }
        let b = self.body.bounds();
        let x = match self.facing {
            Facing::Right => b.right(),
            Facing::Left => b.x - ATTACK_REACH,
        };
        Some(Rect::new(x, b.y, ATTACK_REACH, b.h))
    }

    pub fn follow_target(&self) -> FollowTarget {
        FollowTarget {
            bounds: self.body.bounds(),
            facing: self.facing,
        }
    }

    pub fn drain_signals(&mut self) -> Vec<PlayerSignal> {
        std::mem::take(&mut self.signals)
    }

    // --- Controller-facing verbs ---

    /// Desired horizontal velocity (already scaled by the controller)
    pub fn set_move_intent(&mut self, velocity_x: f32) {
        self.move_intent = velocity_x;
        if let Some(facing) = Facing::from_sign(velocity_x) {
            if self.ledge.is_none() && !self.controller_disabled() {
                self.facing = facing;
            }
        }
        if self.on_ground && self.crouching {
            let anim = if velocity_x.abs() > 0.01 {
                Animation::Crawl
            } else {
                Animation::Crouch
            };
            self.animator.set(anim);
        }
    }

    pub fn jump(&mut self) -> bool {
        if self.controller_disabled() {
            return false;
        }

        if self.ledge.take().is_some() {
            self.launch_up(JUMP_IMPULSE);
            self.animator.restart(Animation::Jump);
            self.signals.push(PlayerSignal::Jumped { double: false });
            return true;
        }

        if self.on_ground {
            self.crouching = false;
            self.launch_up(JUMP_IMPULSE);
            self.animator.restart(Animation::Jump);
            self.signals.push(PlayerSignal::Jumped { double: false });
            return true;
        }

        if let Some(wall) = self.touching_wall {
            self.wall_jump(wall);
            return true;
        }

        if self.double_jumped {
            return false;
        }
        self.double_jumped = true;
        self.launch_up(DOUBLE_JUMP_IMPULSE);
        self.animator.restart(Animation::Jump);
        self.signals.push(PlayerSignal::Jumped { double: true });
        true
    }

    fn launch_up(&mut self, impulse: f32) {
        self.body.vel.y = -impulse;
        self.on_ground = false;
        self.airborne_time = 0.0;
    }

    fn wall_jump(&mut self, wall: Facing) {
        let away = -wall.sign();
        self.launch_up(WALL_JUMP_IMPULSE);
        self.body.vel.x = away * WALL_JUMP_PUSH;
        self.facing = Facing::from_sign(away).unwrap_or(self.facing);
        self.wall_jump_timer = 0.2;
        self.touching_wall = None;
        self.animator.restart(Animation::WallJump);
        self.signals.push(PlayerSignal::Jumped { double: false });
    }

    /// Ground slide, rate-limited by `SLIDE_COOLDOWN`
    pub fn slide(&mut self) -> bool {
        if !self.on_ground || !self.slide_ready() || self.controller_disabled() {
            return false;
        }
        self.crouching = false;
        self.slide_cooldown = SLIDE_COOLDOWN;
        self.animator.restart(Animation::Slide);
        true
    }

    /// Mid-air roll, once per airtime
    pub fn roll(&mut self) -> bool {
        if self.on_ground || self.rolled || self.ledge.is_some() || self.controller_disabled() {
            return false;
        }
        self.rolled = true;
        self.animator.restart(Animation::Roll);
        true
    }

    pub fn attack(&mut self) -> bool {
        if self.controller_disabled() || self.ledge.is_some() {
            return false;
        }
        let next = if self.combo_timer > 0.0 {
            self.last_attack.next_attack()
        } else {
            Animation::Attack1
        };
        self.combo_timer = 0.0;
        self.last_attack = next;
        self.crouching = false;
        self.animator.restart(next);
        self.signals.push(PlayerSignal::AttackStarted);
        true
    }

    pub fn ground_slam(&mut self) -> bool {
        if self.on_ground || self.ledge.is_some() || self.controller_disabled() {
            return false;
        }
        self.body.vel.x = 0.0;
        self.body.vel.y = self.body.vel.y.max(GROUND_SLAM_SPEED * 0.5);
        self.animator.restart(Animation::GroundSlam);
        true
    }

    /// Shove the player away from a hit after a short delay
    pub fn knockback(&mut self, direction: f32) {
        self.ledge = None;
        self.crouching = false;
        self.knockback = Some(PendingKnockback {
            delay: KNOCKBACK_DELAY,
            direction: if direction < 0.0 { -1.0 } else { 1.0 },
        });
        self.animator.restart(Animation::Knockback);
    }

    pub fn crouch(&mut self, down: bool) {
        if down {
            if self.on_ground && !self.controller_disabled() && !self.crouching {
                self.crouching = true;
                self.animator.set(Animation::Crouch);
            }
        } else if self.crouching {
            self.crouching = false;
            if matches!(self.animator.current(), Animation::Crouch | Animation::Crawl) {
                self.animator.set(Animation::Idle);
            }
        }
    }

    pub fn look_up(&mut self) -> bool {
        if self.on_ground && self.animator.current() == Animation::Idle {
            self.animator.restart(Animation::LookUp);
            return true;
        }
        false
    }

    /// Pull up onto the held ledge
    pub fn ledge_climb(&mut self) -> bool {
        let Some(ledge) = self.ledge.take() else {
            return false;
        };
        let x = match self.facing {
            Facing::Right => ledge.wall_x as f32 + 0.05,
            Facing::Left => (ledge.wall_x + 1) as f32 - self.body.size.x - 0.05,
        };
        self.body.pos = Vec2::new(x, ledge.row as f32 - self.body.size.y);
        self.body.vel = Vec2::ZERO;
        self.on_ground = true;
        self.double_jumped = false;
        self.animator.restart(Animation::LedgeClimb);
        true
    }

    pub fn ledge_drop(&mut self) -> bool {
        if self.ledge.take().is_none() {
            return false;
        }
        self.airborne_time = 0.0;
        self.animator.restart(Animation::Fall);
        true
    }

    pub fn apply_speed_boost(&mut self, multiplier: f32, duration: f32) {
        self.speed_multiplier = multiplier;
        self.speed_boost_timer = duration;
    }

    // --- Health ---

    /// Lose health. Signals `HealthDepleted` on the transition to zero only.
    pub fn take_damage(&mut self, amount: u32) -> bool {
        if !self.health.enabled {
            return false;
        }
        let was_alive = self.health.current() > 0;
        let lost = self.health.lose(amount);
        if lost > 0 {
            self.signals.push(PlayerSignal::HealthChanged {
                delta: -(lost as i32),
            });
        }
        if was_alive && self.health.current() == 0 {
            self.signals.push(PlayerSignal::HealthDepleted);
            return true;
        }
        false
    }

    /// Restore health up to max; returns the amount restored
    pub fn heal(&mut self, amount: u32) -> u32 {
        if !self.health.enabled {
            return 0;
        }
        let gained = self.health.gain(amount);
        if gained > 0 {
            self.signals.push(PlayerSignal::HealthChanged {
                delta: gained as i32,
            });
        }
        gained
    }

    /// Back to spawn with full health. Collection progress is untouched.
    pub fn die(&mut self) {
        self.body.pos = self.spawn;
        self.body.vel = Vec2::ZERO;
        self.health.refill();
        self.on_ground = false;
        self.crouching = false;
        self.double_jumped = false;
        self.rolled = false;
        self.airborne_time = 0.0;
        self.knockback = None;
        self.ledge = None;
        self.touching_wall = None;
        self.last_landing_row = None;
        self.speed_multiplier = 1.0;
        self.speed_boost_timer = 0.0;
        self.animator.restart(Animation::Fall);
        self.signals.push(PlayerSignal::Died);
    }

    // --- Simulation ---

    pub fn update(&mut self, dt: f32, map: &Tilemap, now: f64, rng: &mut impl Rng) {
        self.tick_timers(dt);
        self.apply_pending_knockback(dt);

        if self.ledge.is_some() {
            self.body.vel = Vec2::ZERO;
        } else {
            self.update_horizontal_velocity();
            self.apply_gravity(dt);
        }

        let impact_speed = self.body.vel.y;
        let was_on_ground = self.on_ground;
        let contacts = if self.ledge.is_some() {
            Default::default()
        } else {
            self.body.move_and_collide(dt, map)
        };

        if contacts.bottom {
            self.on_ground = true;
            if !was_on_ground {
                self.land(impact_speed);
            }
        } else if self.on_ground && !self.body.is_supported(map) {
            self.on_ground = false;
            self.airborne_time = 0.0;
        }

        self.touching_wall = if self.on_ground {
            None
        } else if contacts.right {
            Some(Facing::Right)
        } else if contacts.left {
            Some(Facing::Left)
        } else if self.touching_wall.is_some() && self.body.vel.x.abs() < 0.01 {
            // Still pressed against the same wall
            self.touching_wall
        } else {
            None
        };

        if !self.on_ground && self.ledge.is_none() && self.body.vel.y > 0.0 {
            self.try_grab_ledge(map);
        }

        self.update_locomotion_animation();

        let previous = self.animator.current();
        if self.animator.advance(dt, rng).is_some() && previous.is_attack() {
            self.combo_timer = ATTACK_COMBO_WINDOW;
        }

        if self.on_ground {
            let underfoot = map.solid_tiles_below(&self.body.bounds());
            self.trail.touch(&underfoot, now);
        }
        self.trail.update(now);
    }

    fn tick_timers(&mut self, dt: f32) {
        self.slide_cooldown = (self.slide_cooldown - dt).max(0.0);
        self.combo_timer = (self.combo_timer - dt).max(0.0);
        self.wall_jump_timer = (self.wall_jump_timer - dt).max(0.0);
        if self.speed_boost_timer > 0.0 {
            self.speed_boost_timer -= dt;
            if self.speed_boost_timer <= 0.0 {
                self.speed_boost_timer = 0.0;
                self.speed_multiplier = 1.0;
            }
        }
    }

    fn apply_pending_knockback(&mut self, dt: f32) {
        let Some(mut pending) = self.knockback else {
            return;
        };
        pending.delay -= dt;
        if pending.delay <= 0.0 {
            self.body.vel.x = pending.direction * KNOCKBACK_SPEED;
            self.body.vel.y = -KNOCKBACK_HOP;
            self.on_ground = false;
            self.airborne_time = 0.0;
            self.knockback = None;
        } else {
            self.knockback = Some(pending);
        }
    }

    fn update_horizontal_velocity(&mut self) {
        let anim = self.animator.current();
        self.body.vel.x = match anim {
            Animation::Slide => self.facing.sign() * SLIDE_SPEED,
            Animation::SlideTransition => self.body.vel.x * 0.8,
            Animation::Roll => self.facing.sign() * ROLL_SPEED,
            // Knockback keeps its impulse and bleeds it off
            Animation::Knockback => self.body.vel.x * 0.96,
            Animation::GroundSlam | Animation::GroundSlamTransition => 0.0,
            a if a.is_attack() && self.on_ground => 0.0,
            _ if self.wall_jump_timer > 0.0 => self.body.vel.x,
            _ => self.move_intent,
        };
    }

    fn apply_gravity(&mut self, dt: f32) {
        if self.on_ground {
            self.body.vel.y = self.body.vel.y.min(0.0);
            return;
        }
        self.airborne_time += dt;
        let t = self.airborne_time;
        let accel = GRAVITY_BASE + GRAVITY_RAMP * t * t;
        let cap = if self.animator.current() == Animation::GroundSlam {
            GROUND_SLAM_SPEED
        } else {
            MAX_FALL_SPEED
        };
        self.body.vel.y = (self.body.vel.y + accel * dt).min(cap);
    }

    fn land(&mut self, impact_speed: f32) {
        self.airborne_time = 0.0;
        self.double_jumped = false;
        self.rolled = false;
        self.touching_wall = None;

        let bounds = self.body.bounds();
        let at = Vec2::new(bounds.center().x, bounds.bottom());
        let row = bounds.bottom().round() as i32;

        if self.animator.current() == Animation::GroundSlam {
            self.animator.restart(Animation::GroundSlamTransition);
            self.signals.push(PlayerSignal::GroundSlamImpact { at });
        } else if self.last_landing_row != Some(row) {
            self.signals.push(PlayerSignal::Landed {
                hard: impact_speed >= HARD_LANDING_SPEED,
                at,
            });
            if !self.controller_disabled() {
                self.animator.restart(Animation::Land);
            }
        } else if matches!(
            self.animator.current(),
            Animation::Jump | Animation::Fall | Animation::WallJump | Animation::Roll
        ) {
            self.animator.restart(Animation::Idle);
        }
        self.last_landing_row = Some(row);
    }

    fn try_grab_ledge(&mut self, map: &Tilemap) {
        if self.controller_disabled() || self.crouching {
            return;
        }
        let bounds = self.body.bounds();
        let wall_x = match self.facing {
            Facing::Right => (bounds.right() + 0.05).floor() as i32,
            Facing::Left => (bounds.x - 0.05).floor() as i32,
        };
        let row = bounds.y.round() as i32;
        if (bounds.y - row as f32).abs() > LEDGE_GRAB_TOLERANCE {
            return;
        }
        if map.is_solid(wall_x, row) && !map.is_solid(wall_x, row - 1) {
            self.ledge = Some(LedgeGrab { wall_x, row });
            self.body.pos.y = row as f32;
            self.body.vel = Vec2::ZERO;
            self.double_jumped = false;
            self.animator.restart(Animation::LedgeHang);
        }
    }

    fn update_locomotion_animation(&mut self) {
        use Animation::*;
        let current = self.animator.current();
        let busy = matches!(
            current,
            Slide
                | SlideTransition
                | Roll
                | GroundSlam
                | GroundSlamTransition
                | Knockback
                | LedgeClimb
                | LedgeHang
                | WallJump
                | Land
        ) || current.is_attack();
        if busy {
            return;
        }

        if self.on_ground {
            if self.crouching {
                return;
            }
            if self.body.vel.x.abs() > 0.1 {
                self.animator.set(Run);
            } else if matches!(current, Run | Jump | Fall | Crouch | Crawl) {
                self.animator.set(Idle);
            }
        } else if self.body.vel.y < 0.0 {
            if !matches!(current, Jump | Fall) {
                self.animator.set(Jump);
            }
        } else if !matches!(current, Fall) {
            self.animator.set(Fall);
        }
    }
}
