//! Camera: world-to-screen mapping, target following, shake and zoom
//!
//! The viewport is measured in tiles. Pixels are produced with a single
//! uniform scale (the smaller of the horizontal and vertical fits) plus a
//! centering offset, so any canvas size shows the level without stretching.

use glam::Vec2;
use rand::Rng;

use crate::Rect;
use crate::consts::*;

/// Which way the followed actor faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    pub fn from_sign(sign: f32) -> Option<Self> {
        if sign < 0.0 {
            Some(Facing::Left)
        } else if sign > 0.0 {
            Some(Facing::Right)
        } else {
            None
        }
    }
}

/// Snapshot of the followed actor, refreshed every tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FollowTarget {
    pub bounds: Rect,
    pub facing: Facing,
}

/// Zoom commands accepted from the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ZoomRequest {
    In,
    Out,
    Reset,
    Set(f32),
}

#[derive(Debug, Clone)]
pub struct Camera {
    /// Current viewport center (world units)
    center: Vec2,
    /// Center used for drawing (center plus shake jitter)
    shaken_center: Vec2,
    zoom: f32,
    /// Viewport size in world units at the current zoom
    view: Vec2,
    /// Canvas size in device pixels
    screen: Vec2,
    pub follow_speed: f32,
    target: Option<FollowTarget>,
    pub min_x: Option<f32>,
    pub max_x: Option<f32>,
    pub min_y: Option<f32>,
    pub max_y: Option<f32>,
    shake_timer: f32,
    shake_duration: f32,
    shake_magnitude: f32,
}

impl Camera {
    pub fn new(screen_width: f32, screen_height: f32) -> Self {
        let mut camera = Self {
            center: Vec2::ZERO,
            shaken_center: Vec2::ZERO,
            zoom: 1.0,
            view: Vec2::new(LANDSCAPE_VIEW.0, LANDSCAPE_VIEW.1),
            screen: Vec2::new(screen_width.max(1.0), screen_height.max(1.0)),
            follow_speed: CAMERA_FOLLOW_SPEED,
            target: None,
            min_x: None,
            max_x: None,
            min_y: None,
            max_y: None,
            shake_timer: 0.0,
            shake_duration: 0.0,
            shake_magnitude: 0.0,
        };
        camera.recompute_view();
        camera
    }

    /// Base viewport for the current aspect ratio (portrait vs landscape)
    pub fn base_view(&self) -> Vec2 {
        let (w, h) = if self.screen.x < self.screen.y {
            PORTRAIT_VIEW
        } else {
            LANDSCAPE_VIEW
        };
        Vec2::new(w, h)
    }

    fn recompute_view(&mut self) {
        self.view = self.base_view() / self.zoom;
    }

    /// Canvas resized (device pixels)
    pub fn resize(&mut self, width: f32, height: f32) {
        self.screen = Vec2::new(width.max(1.0), height.max(1.0));
        self.recompute_view();
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        if !zoom.is_finite() {
            return;
        }
        self.zoom = zoom.clamp(ZOOM_MIN, ZOOM_MAX);
        self.recompute_view();
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom + ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom - ZOOM_STEP);
    }

    pub fn reset_zoom(&mut self) {
        self.set_zoom(1.0);
    }

    pub fn apply_zoom(&mut self, request: ZoomRequest) {
        match request {
            ZoomRequest::In => self.zoom_in(),
            ZoomRequest::Out => self.zoom_out(),
            ZoomRequest::Reset => self.reset_zoom(),
            ZoomRequest::Set(z) => self.set_zoom(z),
        }
    }

    pub fn follow(&mut self, target: FollowTarget) {
        self.target = Some(target);
    }

    pub fn set_bounds(&mut self, min_x: Option<f32>, max_x: Option<f32>, min_y: Option<f32>, max_y: Option<f32>) {
        self.min_x = min_x;
        self.max_x = max_x;
        self.min_y = min_y;
        self.max_y = max_y;
    }

    pub fn shake(&mut self, duration: f32, magnitude: f32) {
        // A weaker shake never cuts a stronger one short
        if self.shake_timer > 0.0 && magnitude < self.shake_magnitude {
            return;
        }
        self.shake_timer = duration.max(0.0);
        self.shake_duration = duration.max(f32::EPSILON);
        self.shake_magnitude = magnitude;
    }

    pub fn is_shaking(&self) -> bool {
        self.shake_timer > 0.0
    }

    /// Where the camera wants to be: target center, look-ahead, clamps
    pub fn desired_center(&self) -> Option<Vec2> {
        let target = self.target?;
        let mut desired = target.bounds.center();
        desired.x += target.facing.sign() * CAMERA_LOOK_AHEAD * self.view.x;

        if let Some(min_y) = self.min_y {
            desired.y = desired.y.max(min_y);
        }
        if let Some(max_y) = self.max_y {
            desired.y = desired.y.min(max_y);
        }
        if let Some(min_x) = self.min_x {
            desired.x = desired.x.max(min_x);
        }
        if let Some(max_x) = self.max_x {
            desired.x = desired.x.min(max_x);
        }
        Some(desired)
    }

    /// Jump straight to the desired center (level start, respawn)
    pub fn snap_to_target(&mut self) {
        if let Some(desired) = self.desired_center() {
            self.center = desired;
            self.shaken_center = desired;
        }
    }

    pub fn update(&mut self, dt: f32, rng: &mut impl Rng) {
        if let Some(desired) = self.desired_center() {
            let delta = desired - self.center;
            if delta.x.abs() < CAMERA_SNAP_EPSILON && delta.y.abs() < CAMERA_SNAP_EPSILON {
                self.center = desired;
            } else {
                // Closing speed proportional to the remaining distance
                let t = (self.follow_speed * dt).min(1.0);
                if delta.x.abs() > CAMERA_DEAD_ZONE {
                    self.center.x += delta.x * t;
                }
                if delta.y.abs() > CAMERA_DEAD_ZONE {
                    self.center.y += delta.y * t;
                }
            }
        }

        self.shaken_center = self.center;
        if self.shake_timer > 0.0 {
            let strength = self.shake_magnitude * (self.shake_timer / self.shake_duration).min(1.0);
            self.shaken_center.x += rng.random_range(-1.0f32..=1.0) * strength;
            self.shaken_center.y += rng.random_range(-1.0f32..=1.0) * strength;
            self.shake_timer = (self.shake_timer - dt).max(0.0);
        }
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn set_center(&mut self, center: Vec2) {
        self.center = center;
        self.shaken_center = center;
    }

    pub fn view_size(&self) -> Vec2 {
        self.view
    }

    pub fn screen_size(&self) -> Vec2 {
        self.screen
    }

    pub fn start_x(&self) -> f32 {
        self.shaken_center.x - self.view.x * 0.5
    }

    pub fn start_y(&self) -> f32 {
        self.shaken_center.y - self.view.y * 0.5
    }

    pub fn end_x(&self) -> f32 {
        self.start_x() + self.view.x
    }

    pub fn end_y(&self) -> f32 {
        self.start_y() + self.view.y
    }

    /// Viewport in world units
    pub fn viewport(&self) -> Rect {
        Rect::new(self.start_x(), self.start_y(), self.view.x, self.view.y)
    }

    /// Pixels per world unit (uniform on both axes)
    pub fn scale(&self) -> f32 {
        (self.screen.x / self.view.x).min(self.screen.y / self.view.y)
    }

    /// Letterbox offset that centers the viewport on the canvas
    pub fn offset(&self) -> Vec2 {
        let scale = self.scale();
        (self.screen - self.view * scale) * 0.5
    }

    /// World position to device pixels
    pub fn transform_coordinates(&self, x: f32, y: f32) -> Vec2 {
        let scale = self.scale();
        let offset = self.offset();
        Vec2::new(
            (x - self.start_x()) * scale + offset.x,
            (y - self.start_y()) * scale + offset.y,
        )
    }

    /// World rectangle to a device-pixel rectangle
    pub fn transform_rect(&self, rect: &Rect) -> Rect {
        let top_left = self.transform_coordinates(rect.x, rect.y);
        let scale = self.scale();
        Rect::new(top_left.x, top_left.y, rect.w * scale, rect.h * scale)
    }

    /// Device pixels back to world units (pointer input)
    pub fn screen_to_world(&self, px: f32, py: f32) -> Vec2 {
        let scale = self.scale();
        let offset = self.offset();
        Vec2::new(
            (px - offset.x) / scale + self.start_x(),
            (py - offset.y) / scale + self.start_y(),
        )
    }

    pub fn is_visible(&self, rect: &Rect) -> bool {
        self.viewport().overlaps(rect)
    }

    /// Inclusive tile range covering the viewport, padded by one tile
    pub fn visible_tile_range(&self) -> (i32, i32, i32, i32) {
        (
            self.start_x().floor() as i32 - 1,
            self.start_y().floor() as i32 - 1,
            self.end_x().ceil() as i32 + 1,
            self.end_y().ceil() as i32 + 1,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn target_at(x: f32, y: f32, facing: Facing) -> FollowTarget {
        FollowTarget {
            bounds: Rect::new(x, y, 1.0, 1.0),
            facing,
        }
    }

    #[test]
    fn test_profiles_switch_on_aspect() {
        let landscape = Camera::new(1600.0, 1000.0);
        assert_eq!(landscape.view_size(), Vec2::new(16.0, 10.0));
        let portrait = Camera::new(600.0, 1000.0);
        assert_eq!(portrait.view_size(), Vec2::new(12.0, 16.0));
    }

    #[test]
    fn test_zoom_scales_view() {
        let mut cam = Camera::new(1600.0, 1000.0);
        cam.set_zoom(2.0);
        assert_eq!(cam.view_size(), Vec2::new(8.0, 5.0));
        cam.reset_zoom();
        assert_eq!(cam.zoom(), 1.0);
    }

    #[test]
    fn test_non_finite_zoom_is_ignored() {
        let mut cam = Camera::new(1600.0, 1000.0);
        cam.set_zoom(1.5);
        let view = cam.view_size();
        cam.set_zoom(f32::NAN);
        cam.apply_zoom(ZoomRequest::Set(f32::INFINITY));
        assert_eq!(cam.zoom(), 1.5);
        assert_eq!(cam.view_size(), view);
    }

    #[test]
    fn test_uniform_scale_letterboxes() {
        // Wider than the 16:10 profile: vertical fit wins, horizontal bars appear
        let cam = Camera::new(2000.0, 1000.0);
        assert!((cam.scale() - 100.0).abs() < 1e-3);
        let offset = cam.offset();
        assert!((offset.x - 200.0).abs() < 1e-3);
        assert!(offset.y.abs() < 1e-3);
    }

    #[test]
    fn test_transform_roundtrip_and_rect() {
        let mut cam = Camera::new(1600.0, 1000.0);
        cam.set_center(Vec2::new(20.0, 8.0));
        let p = cam.transform_coordinates(20.0, 8.0);
        assert!((p.x - 800.0).abs() < 1e-3);
        assert!((p.y - 500.0).abs() < 1e-3);

        let back = cam.screen_to_world(p.x, p.y);
        assert!((back - Vec2::new(20.0, 8.0)).length() < 1e-4);

        let r = cam.transform_rect(&Rect::new(20.0, 8.0, 1.0, 2.0));
        assert!((r.w - 100.0).abs() < 1e-3);
        assert!((r.h - 200.0).abs() < 1e-3);
    }

    #[test]
    fn test_follow_applies_look_ahead() {
        let mut cam = Camera::new(1600.0, 1000.0);
        cam.follow(target_at(10.0, 5.0, Facing::Right));
        let desired = cam.desired_center().unwrap();
        // 20% of a 16-wide view
        assert!((desired.x - (10.5 + 3.2)).abs() < 1e-4);
        cam.follow(target_at(10.0, 5.0, Facing::Left));
        assert!((cam.desired_center().unwrap().x - (10.5 - 3.2)).abs() < 1e-4);
    }

    #[test]
    fn test_follow_respects_ceiling_clamp() {
        let mut cam = Camera::new(1600.0, 1000.0);
        cam.set_bounds(None, None, Some(5.0), None);
        cam.follow(target_at(10.0, -20.0, Facing::Right));
        assert_eq!(cam.desired_center().unwrap().y, 5.0);
    }

    #[test]
    fn test_follow_converges_and_snaps() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut cam = Camera::new(1600.0, 1000.0);
        cam.follow(target_at(30.0, 10.0, Facing::Right));
        let desired = cam.desired_center().unwrap();

        let first_gap = (desired - cam.center()).length();
        cam.update(1.0 / 60.0, &mut rng);
        let second_gap = (desired - cam.center()).length();
        assert!(second_gap < first_gap);

        for _ in 0..2000 {
            cam.update(1.0 / 60.0, &mut rng);
        }
        // Dead zone stops movement within 0.1; the snap only happens under 0.01
        let gap = desired - cam.center();
        assert!(gap.x.abs() <= CAMERA_DEAD_ZONE && gap.y.abs() <= CAMERA_DEAD_ZONE);
    }

    #[test]
    fn test_snap_when_within_epsilon() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut cam = Camera::new(1600.0, 1000.0);
        cam.follow(target_at(30.0, 10.0, Facing::Right));
        let desired = cam.desired_center().unwrap();
        cam.set_center(desired + Vec2::new(0.005, -0.005));
        cam.update(1.0 / 60.0, &mut rng);
        assert_eq!(cam.center(), desired);
    }

    #[test]
    fn test_shake_is_bounded_and_decays() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut cam = Camera::new(1600.0, 1000.0);
        cam.set_center(Vec2::new(5.0, 5.0));
        cam.shake(0.5, 0.3);
        for _ in 0..10 {
            cam.update(0.01, &mut rng);
            let jitter = cam.viewport().center() - cam.center();
            assert!(jitter.x.abs() <= 0.3 + 1e-5 && jitter.y.abs() <= 0.3 + 1e-5);
        }
        cam.update(1.0, &mut rng);
        cam.update(0.01, &mut rng);
        assert!(!cam.is_shaking());
        assert_eq!(cam.viewport().center(), cam.center());
    }

    proptest! {
        #[test]
        fn prop_zoom_always_clamped(ops in proptest::collection::vec(0u8..7, 0..200)) {
            let mut cam = Camera::new(800.0, 600.0);
            for op in ops {
                match op {
                    0 => cam.zoom_in(),
                    1 => cam.zoom_out(),
                    2 => cam.apply_zoom(ZoomRequest::Set(100.0)),
                    3 => cam.apply_zoom(ZoomRequest::Set(f32::NAN)),
                    4 => cam.apply_zoom(ZoomRequest::Set(f32::INFINITY)),
                    5 => cam.set_zoom(f32::NEG_INFINITY),
                    _ => cam.apply_zoom(ZoomRequest::Set(-3.0)),
                }
                prop_assert!(cam.zoom().is_finite());
                prop_assert!(cam.zoom() >= ZOOM_MIN && cam.zoom() <= ZOOM_MAX);
            }
        }
    }
}
