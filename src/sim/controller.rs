//! Input translation
//!
//! Raw host events only update held/pressed state. Once per tick the
//! controller turns that state into player verbs, so the player never sees
//! input outside the fixed update order.

use super::camera::ZoomRequest;
use super::player::Player;
use crate::consts::{AIR_CONTROL, CROUCH_DIVISOR, RUN_SPEED, WALK_DIVISOR};

/// Logical keys, independent of keyboard layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Jump,
    Slide,
    Attack,
    Walk,
    Interact,
    ZoomIn,
    ZoomOut,
    ZoomReset,
    Pause,
}

impl Key {
    const COUNT: usize = 13;

    fn slot(self) -> usize {
        self as usize
    }

    /// Map a browser `KeyboardEvent.code` (or `key` for symbols)
    pub fn from_code(code: &str) -> Option<Key> {
        let key = match code {
            "ArrowLeft" | "KeyA" => Key::Left,
            "ArrowRight" | "KeyD" => Key::Right,
            "ArrowUp" | "KeyW" => Key::Up,
            "ArrowDown" | "KeyS" => Key::Down,
            "Space" | "KeyK" => Key::Jump,
            "KeyL" | "KeyC" => Key::Slide,
            "KeyJ" | "KeyX" => Key::Attack,
            "ShiftLeft" | "ShiftRight" | "Shift" => Key::Walk,
            "KeyE" | "Enter" | "NumpadEnter" => Key::Interact,
            "Equal" | "NumpadAdd" | "+" | "=" => Key::ZoomIn,
            "Minus" | "NumpadSubtract" | "-" => Key::ZoomOut,
            "Digit0" | "Numpad0" | "0" => Key::ZoomReset,
            "Escape" | "KeyP" => Key::Pause,
            _ => return None,
        };
        Some(key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Primary,
    Secondary,
    Other,
}

impl MouseButton {
    /// From `MouseEvent.button`
    pub fn from_index(button: i16) -> Self {
        match button {
            0 => MouseButton::Primary,
            2 => MouseButton::Secondary,
            _ => MouseButton::Other,
        }
    }

    fn key(self) -> Option<Key> {
        match self {
            MouseButton::Primary => Some(Key::Attack),
            MouseButton::Secondary => Some(Key::Slide),
            MouseButton::Other => None,
        }
    }
}

/// On-screen touch buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchControl {
    Left,
    Right,
    Up,
    Down,
    Jump,
    Slide,
    Attack,
    Interact,
}

impl TouchControl {
    /// From the `data-control` attribute of a touch button
    pub fn from_name(name: &str) -> Option<Self> {
        let control = match name {
            "left" => TouchControl::Left,
            "right" => TouchControl::Right,
            "up" => TouchControl::Up,
            "down" => TouchControl::Down,
            "jump" => TouchControl::Jump,
            "slide" => TouchControl::Slide,
            "attack" => TouchControl::Attack,
            "interact" => TouchControl::Interact,
            _ => return None,
        };
        Some(control)
    }

    fn key(self) -> Key {
        match self {
            TouchControl::Left => Key::Left,
            TouchControl::Right => Key::Right,
            TouchControl::Up => Key::Up,
            TouchControl::Down => Key::Down,
            TouchControl::Jump => Key::Jump,
            TouchControl::Slide => Key::Slide,
            TouchControl::Attack => Key::Attack,
            TouchControl::Interact => Key::Interact,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    KeyDown(Key),
    KeyUp(Key),
    MouseDown(MouseButton),
    MouseUp(MouseButton),
    TouchStart(TouchControl),
    TouchEnd(TouchControl),
}

impl InputEvent {
    /// Logical key and whether it went down
    fn key_state(self) -> Option<(Key, bool)> {
        match self {
            InputEvent::KeyDown(k) => Some((k, true)),
            InputEvent::KeyUp(k) => Some((k, false)),
            InputEvent::MouseDown(b) => b.key().map(|k| (k, true)),
            InputEvent::MouseUp(b) => b.key().map(|k| (k, false)),
            InputEvent::TouchStart(t) => Some((t.key(), true)),
            InputEvent::TouchEnd(t) => Some((t.key(), false)),
        }
    }
}

/// Game mode bits the controller must respect
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlFlags {
    pub initializing: bool,
    pub modal_open: bool,
}

/// Requests the controller cannot satisfy on the player alone
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControllerOutput {
    /// Action key pressed this tick
    pub interact: bool,
    pub zoom: Option<ZoomRequest>,
}

#[derive(Debug, Clone, Default)]
pub struct Controller {
    held: [bool; Key::COUNT],
    /// Went down since the last tick (survives a press+release inside one tick)
    pressed: [bool; Key::COUNT],
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&mut self, event: InputEvent) {
        let Some((key, down)) = event.key_state() else {
            return;
        };
        let slot = key.slot();
        if down && !self.held[slot] {
            self.pressed[slot] = true;
        }
        self.held[slot] = down;
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held[key.slot()]
    }

    fn was_pressed(&self, key: Key) -> bool {
        self.pressed[key.slot()]
    }

    /// Drop all held keys (window blur, visibility change)
    pub fn release_all(&mut self) {
        self.held = [false; Key::COUNT];
        self.pressed = [false; Key::COUNT];
    }

    /// -1, 0 or 1; opposing keys cancel
    pub fn direction(&self) -> f32 {
        match (self.is_held(Key::Left), self.is_held(Key::Right)) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }

    /// Horizontal speed for the current state of the player and held keys
    pub fn move_speed(&self, player: &Player) -> f32 {
        let mut speed = RUN_SPEED * player.speed_multiplier();
        if !player.on_ground() {
            speed *= AIR_CONTROL;
        }
        if self.is_held(Key::Walk) {
            speed /= WALK_DIVISOR;
        }
        if player.is_crouching() {
            speed /= CROUCH_DIVISOR;
        }
        speed
    }

    /// Apply this tick's input to the player
    pub fn update(&mut self, player: &mut Player, flags: ControlFlags) -> ControllerOutput {
        let mut out = ControllerOutput::default();

        if flags.initializing {
            player.set_move_intent(0.0);
            self.pressed = [false; Key::COUNT];
            return out;
        }

        out.zoom = if self.was_pressed(Key::ZoomIn) {
            Some(ZoomRequest::In)
        } else if self.was_pressed(Key::ZoomOut) {
            Some(ZoomRequest::Out)
        } else if self.was_pressed(Key::ZoomReset) {
            Some(ZoomRequest::Reset)
        } else {
            None
        };

        if player.controller_disabled() {
            self.pressed = [false; Key::COUNT];
            return out;
        }

        out.interact = self.was_pressed(Key::Interact);

        if player.is_ledge_hanging() {
            if self.was_pressed(Key::Jump) {
                player.jump();
            } else if self.was_pressed(Key::Up) {
                player.ledge_climb();
            } else if self.was_pressed(Key::Down) {
                player.ledge_drop();
            }
            self.pressed = [false; Key::COUNT];
            return out;
        }

        let direction = self.direction();

        if self.is_held(Key::Down) {
            if player.on_ground() {
                player.crouch(true);
            } else if self.was_pressed(Key::Down) {
                player.ground_slam();
            }
        } else {
            player.crouch(false);
        }

        let intent = if flags.modal_open {
            0.0
        } else {
            direction * self.move_speed(player)
        };
        player.set_move_intent(intent);

        if self.was_pressed(Key::Up) && direction == 0.0 {
            player.look_up();
        }
        if self.was_pressed(Key::Jump) {
            player.jump();
        }
        if self.was_pressed(Key::Slide) {
            if player.on_ground() {
                player.slide();
            } else {
                player.roll();
            }
        }
        if self.was_pressed(Key::Attack) {
            player.attack();
        }

        self.pressed = [false; Key::COUNT];
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::animation::Animation;
    use crate::sim::tilemap::Tilemap;
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const DT: f32 = 1.0 / 60.0;

    fn floor() -> Tilemap {
        let mut tiles = vec![0u8; 20 * 6];
        for x in 0..20 {
            tiles[5 * 20 + x] = 1;
        }
        Tilemap::new(tiles, 20, 6).unwrap()
    }

    fn settled(map: &Tilemap) -> Player {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut p = Player::new(Vec2::new(5.0, 4.0));
        for _ in 0..60 {
            p.update(DT, map, 0.0, &mut rng);
        }
        assert!(p.on_ground());
        p
    }

    fn tick(c: &mut Controller, p: &mut Player, flags: ControlFlags) -> ControllerOutput {
        c.update(p, flags)
    }

    #[test]
    fn test_key_codes() {
        assert_eq!(Key::from_code("ArrowLeft"), Some(Key::Left));
        assert_eq!(Key::from_code("KeyD"), Some(Key::Right));
        assert_eq!(Key::from_code("Space"), Some(Key::Jump));
        assert_eq!(Key::from_code("ShiftLeft"), Some(Key::Walk));
        assert_eq!(Key::from_code("KeyE"), Some(Key::Interact));
        assert_eq!(Key::from_code("+"), Some(Key::ZoomIn));
        assert_eq!(Key::from_code("F13"), None);
        assert_eq!(TouchControl::from_name("jump"), Some(TouchControl::Jump));
        assert_eq!(MouseButton::from_index(0), MouseButton::Primary);
    }

    #[test]
    fn test_opposing_keys_cancel() {
        let mut c = Controller::new();
        c.handle(InputEvent::KeyDown(Key::Left));
        assert_eq!(c.direction(), -1.0);
        c.handle(InputEvent::KeyDown(Key::Right));
        assert_eq!(c.direction(), 0.0);
        c.handle(InputEvent::KeyUp(Key::Left));
        assert_eq!(c.direction(), 1.0);
    }

    #[test]
    fn test_speed_scaling() {
        let map = floor();
        let mut p = settled(&map);
        let mut c = Controller::new();
        c.handle(InputEvent::KeyDown(Key::Right));
        tick(&mut c, &mut p, ControlFlags::default());
        assert!((c.move_speed(&p) - RUN_SPEED).abs() < 1e-5);

        c.handle(InputEvent::KeyDown(Key::Walk));
        assert!((c.move_speed(&p) - RUN_SPEED / WALK_DIVISOR).abs() < 1e-5);

        c.handle(InputEvent::KeyDown(Key::Down));
        tick(&mut c, &mut p, ControlFlags::default());
        assert!(p.is_crouching());
        assert_eq!(p.animation(), Animation::Crawl);
        let expected = RUN_SPEED / WALK_DIVISOR / CROUCH_DIVISOR;
        assert!((c.move_speed(&p) - expected).abs() < 1e-5);
    }

    #[test]
    fn test_air_control_reduces_speed() {
        let map = floor();
        let mut p = settled(&map);
        let mut c = Controller::new();
        c.handle(InputEvent::KeyDown(Key::Jump));
        tick(&mut c, &mut p, ControlFlags::default());
        assert!(!p.on_ground());
        assert!((c.move_speed(&p) - RUN_SPEED * AIR_CONTROL).abs() < 1e-5);
    }

    #[test]
    fn test_initializing_suppresses_everything() {
        let map = floor();
        let mut p = settled(&map);
        let mut c = Controller::new();
        c.handle(InputEvent::KeyDown(Key::Jump));
        c.handle(InputEvent::KeyDown(Key::Right));
        c.handle(InputEvent::KeyDown(Key::Interact));
        let out = tick(
            &mut c,
            &mut p,
            ControlFlags {
                initializing: true,
                modal_open: false,
            },
        );
        assert!(!out.interact);
        assert!(p.on_ground());
        assert_ne!(p.animation(), Animation::Jump);
    }

    #[test]
    fn test_modal_blocks_only_horizontal() {
        let map = floor();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut p = settled(&map);
        let mut c = Controller::new();
        let flags = ControlFlags {
            initializing: false,
            modal_open: true,
        };
        c.handle(InputEvent::KeyDown(Key::Right));
        c.handle(InputEvent::KeyDown(Key::Jump));
        tick(&mut c, &mut p, flags);
        assert!(!p.on_ground());
        let x = p.body.pos.x;
        p.update(DT, &map, 0.0, &mut rng);
        assert_eq!(p.body.pos.x, x);
    }

    #[test]
    fn test_attack_locks_out_movement() {
        let map = floor();
        let mut p = settled(&map);
        let mut c = Controller::new();
        c.handle(InputEvent::MouseDown(MouseButton::Primary));
        tick(&mut c, &mut p, ControlFlags::default());
        assert!(p.is_attacking());

        c.handle(InputEvent::MouseUp(MouseButton::Primary));
        c.handle(InputEvent::KeyDown(Key::Jump));
        tick(&mut c, &mut p, ControlFlags::default());
        assert!(p.on_ground());
    }

    #[test]
    fn test_tap_inside_one_tick_still_registers() {
        let map = floor();
        let mut p = settled(&map);
        let mut c = Controller::new();
        c.handle(InputEvent::TouchStart(TouchControl::Interact));
        c.handle(InputEvent::TouchEnd(TouchControl::Interact));
        let out = tick(&mut c, &mut p, ControlFlags::default());
        assert!(out.interact);
        let out = tick(&mut c, &mut p, ControlFlags::default());
        assert!(!out.interact);
    }

    #[test]
    fn test_zoom_requests() {
        let map = floor();
        let mut p = settled(&map);
        let mut c = Controller::new();
        c.handle(InputEvent::KeyDown(Key::ZoomIn));
        let out = tick(&mut c, &mut p, ControlFlags::default());
        assert_eq!(out.zoom, Some(ZoomRequest::In));
        let out = tick(&mut c, &mut p, ControlFlags::default());
        assert_eq!(out.zoom, None);
    }
}
