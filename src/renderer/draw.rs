//! Stateless draw primitives
//!
//! Every primitive takes world coordinates and the camera, and appends
//! pixel-space triangles to a [`DrawList`]. Nothing here remembers game state.

use glam::Vec2;
use std::f32::consts::TAU;

use super::font::{self, ADVANCE};
use super::sprites::{SpriteSheet, UvRect};
use super::vertex::{NO_TEXTURE, Vertex, colors};
use crate::Rect;
use crate::sim::Animation;
use crate::sim::camera::Camera;
use crate::sim::tilemap::{EDGE_BOTTOM, EDGE_LEFT, EDGE_RIGHT, EDGE_TOP};

const CIRCLE_SEGMENTS: usize = 20;
/// Depth of a glass edge gradient into its tile (world units)
const EDGE_DEPTH: f32 = 0.22;
/// Indicator arrow placement around the player (world units)
const ARROW_DISTANCE: f32 = 1.4;
const ARROW_LENGTH: f32 = 0.5;
const ARROW_HALF_WIDTH: f32 = 0.25;

pub fn with_alpha(color: [f32; 4], alpha: f32) -> [f32; 4] {
    [color[0], color[1], color[2], color[3] * alpha.clamp(0.0, 1.0)]
}

/// Linear blend between two colors
pub fn mix(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
    let t = t.clamp(0.0, 1.0);
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
        a[3] + (b[3] - a[3]) * t,
    ]
}

/// Triangle list in device pixels
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    vertices: Vec<Vertex>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    /// Corners in order top-left, top-right, bottom-right, bottom-left
    fn quad(&mut self, corners: [Vec2; 4], uvs: [[f32; 2]; 4], colors: [[f32; 4]; 4]) {
        for i in [0, 1, 2, 0, 2, 3] {
            self.vertices.push(Vertex {
                position: corners[i].to_array(),
                uv: uvs[i],
                color: colors[i],
            });
        }
    }

    fn pixel_rect(&mut self, r: Rect, colors: [[f32; 4]; 4]) {
        let corners = [
            Vec2::new(r.x, r.y),
            Vec2::new(r.right(), r.y),
            Vec2::new(r.right(), r.bottom()),
            Vec2::new(r.x, r.bottom()),
        ];
        self.quad(corners, [NO_TEXTURE; 4], colors);
    }

    /// Full-canvas vertical gradient (screen space)
    pub fn background(&mut self, screen: Vec2, top: [f32; 4], bottom: [f32; 4]) {
        self.pixel_rect(
            Rect::new(0.0, 0.0, screen.x, screen.y),
            [top, top, bottom, bottom],
        );
    }

    pub fn rect(&mut self, camera: &Camera, rect: Rect, color: [f32; 4]) {
        self.pixel_rect(camera.transform_rect(&rect), [color; 4]);
    }

    pub fn rect_outline(&mut self, camera: &Camera, rect: Rect, thickness: f32, color: [f32; 4]) {
        let t = thickness.min(rect.w * 0.5).min(rect.h * 0.5);
        self.rect(camera, Rect::new(rect.x, rect.y, rect.w, t), color);
        self.rect(camera, Rect::new(rect.x, rect.bottom() - t, rect.w, t), color);
        self.rect(camera, Rect::new(rect.x, rect.y + t, t, rect.h - 2.0 * t), color);
        self.rect(
            camera,
            Rect::new(rect.right() - t, rect.y + t, t, rect.h - 2.0 * t),
            color,
        );
    }

    pub fn circle(&mut self, camera: &Camera, center: Vec2, radius: f32, color: [f32; 4]) {
        let c = camera.transform_coordinates(center.x, center.y);
        let r = radius * camera.scale();
        for i in 0..CIRCLE_SEGMENTS {
            let a0 = i as f32 / CIRCLE_SEGMENTS as f32 * TAU;
            let a1 = (i + 1) as f32 / CIRCLE_SEGMENTS as f32 * TAU;
            let p0 = c + Vec2::new(a0.cos(), a0.sin()) * r;
            let p1 = c + Vec2::new(a1.cos(), a1.sin()) * r;
            self.vertices.push(Vertex::new(c.x, c.y, color));
            self.vertices.push(Vertex::new(p0.x, p0.y, color));
            self.vertices.push(Vertex::new(p1.x, p1.y, color));
        }
    }

    /// One animation frame from a sheet, stretched over `dest`
    #[allow(clippy::too_many_arguments)]
    pub fn sprite(
        &mut self,
        camera: &Camera,
        sheet: &SpriteSheet,
        animation: Animation,
        frame: u8,
        dest: Rect,
        flip: bool,
        tint: [f32; 4],
    ) {
        let uv = sheet.source_rect(animation, frame);
        let UvRect { u0, v0, u1, v1 } = if flip { uv.flipped_x() } else { uv };
        let r = camera.transform_rect(&dest);
        let corners = [
            Vec2::new(r.x, r.y),
            Vec2::new(r.right(), r.y),
            Vec2::new(r.right(), r.bottom()),
            Vec2::new(r.x, r.bottom()),
        ];
        self.quad(corners, [[u0, v0], [u1, v0], [u1, v1], [u0, v1]], [tint; 4]);
    }

    /// Gradient strip along one exposed side of a solid tile.
    ///
    /// Opaque at the edge, transparent toward the tile center. `glow` in
    /// [0, 1] blends the highlight toward the touched-tile orange.
    pub fn glass_edge(&mut self, camera: &Camera, tile_x: i32, tile_y: i32, edge: u8, glow: f32) {
        let (x, y) = (tile_x as f32, tile_y as f32);
        let strip = match edge {
            EDGE_TOP => Rect::new(x, y, 1.0, EDGE_DEPTH),
            EDGE_BOTTOM => Rect::new(x, y + 1.0 - EDGE_DEPTH, 1.0, EDGE_DEPTH),
            EDGE_LEFT => Rect::new(x, y, EDGE_DEPTH, 1.0),
            EDGE_RIGHT => Rect::new(x + 1.0 - EDGE_DEPTH, y, EDGE_DEPTH, 1.0),
            _ => return,
        };
        let outer = mix(colors::TILE_EDGE, colors::TILE_GLOW, glow);
        let inner = with_alpha(outer, 0.0);
        // tl, tr, br, bl
        let gradient = match edge {
            EDGE_TOP => [outer, outer, inner, inner],
            EDGE_BOTTOM => [inner, inner, outer, outer],
            EDGE_LEFT => [outer, inner, inner, outer],
            _ => [inner, outer, outer, inner],
        };
        self.pixel_rect(camera.transform_rect(&strip), gradient);
    }

    pub fn plus_glyph(&mut self, camera: &Camera, center: Vec2, size: f32, color: [f32; 4]) {
        let bar = size / 3.0;
        self.rect(
            camera,
            Rect::new(center.x - size * 0.5, center.y - bar * 0.5, size, bar),
            color,
        );
        self.rect(
            camera,
            Rect::new(center.x - bar * 0.5, center.y - size * 0.5, bar, size),
            color,
        );
    }

    pub fn minus_glyph(&mut self, camera: &Camera, center: Vec2, size: f32, color: [f32; 4]) {
        let bar = size / 3.0;
        self.rect(
            camera,
            Rect::new(center.x - size * 0.5, center.y - bar * 0.5, size, bar),
            color,
        );
    }

    /// Block-font label with its top-left at `origin`, `cell` world units per pixel
    pub fn text(&mut self, camera: &Camera, origin: Vec2, text: &str, cell: f32, color: [f32; 4]) {
        for (i, ch) in text.chars().enumerate() {
            let left = origin.x + (i * ADVANCE) as f32 * cell;
            for (col, row) in font::cells(ch) {
                self.rect(
                    camera,
                    Rect::new(left + col as f32 * cell, origin.y + row as f32 * cell, cell, cell),
                    color,
                );
            }
        }
    }

    /// Directional indicator: a triangle orbiting `from`, pointing at `toward`
    pub fn arrow(&mut self, camera: &Camera, from: Vec2, toward: Vec2, color: [f32; 4]) {
        let dir = (toward - from).normalize_or_zero();
        if dir == Vec2::ZERO {
            return;
        }
        let perp = Vec2::new(-dir.y, dir.x);
        let base = from + dir * ARROW_DISTANCE;
        let tip = base + dir * ARROW_LENGTH;
        for p in [tip, base + perp * ARROW_HALF_WIDTH, base - perp * ARROW_HALF_WIDTH] {
            let px = camera.transform_coordinates(p.x, p.y);
            self.vertices.push(Vertex::new(px.x, px.y, color));
        }
    }

    /// Background plus a left-anchored fill covering `fraction` of the width
    pub fn bar(&mut self, camera: &Camera, rect: Rect, fraction: f32, fill: [f32; 4], back: [f32; 4]) {
        self.rect(camera, rect, back);
        let fraction = fraction.clamp(0.0, 1.0);
        if fraction > 0.0 {
            self.rect(camera, Rect::new(rect.x, rect.y, rect.w * fraction, rect.h), fill);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::sprites::PLAYER_SHEET;

    /// 16x10 world view on a 1600x1000 canvas: 100 px per tile, no letterbox
    fn camera() -> Camera {
        let mut cam = Camera::new(1600.0, 1000.0);
        cam.set_center(Vec2::new(8.0, 5.0));
        cam
    }

    #[test]
    fn test_rect_is_two_triangles_in_pixels() {
        let cam = camera();
        let mut list = DrawList::new();
        list.rect(&cam, Rect::new(1.0, 2.0, 1.0, 1.0), colors::WHITE);
        assert_eq!(list.len(), 6);
        assert_eq!(list.vertices()[0].position, [100.0, 200.0]);
        assert_eq!(list.vertices()[2].position, [200.0, 300.0]);
        assert!(!list.vertices()[0].is_textured());
    }

    #[test]
    fn test_text_draws_one_quad_per_lit_cell() {
        let cam = camera();
        let mut list = DrawList::new();
        list.text(&cam, Vec2::new(1.0, 1.0), "LI", 0.1, colors::WHITE);
        let lit = font::cells('L').count() + font::cells('I').count();
        assert_eq!(list.len(), lit * 6);
        // First cell of L sits on the origin; I starts one advance over
        assert_eq!(list.vertices()[0].position, [100.0, 100.0]);
        assert!(
            list.vertices()
                .iter()
                .any(|v| v.position[0] == 100.0 + ADVANCE as f32 * 10.0)
        );
    }

    #[test]
    fn test_glass_edge_fades_inward() {
        let cam = camera();
        let mut list = DrawList::new();
        list.glass_edge(&cam, 3, 3, EDGE_TOP, 0.0);
        let v = list.vertices();
        assert_eq!(v.len(), 6);
        // top-left is the exposed edge, bottom-right is inside the tile
        assert!(v[0].color[3] > 0.5);
        assert_eq!(v[2].color[3], 0.0);
    }

    #[test]
    fn test_glass_edge_glow_shifts_color() {
        let cam = camera();
        let mut cold = DrawList::new();
        let mut hot = DrawList::new();
        cold.glass_edge(&cam, 0, 0, EDGE_LEFT, 0.0);
        hot.glass_edge(&cam, 0, 0, EDGE_LEFT, 1.0);
        assert_eq!(hot.vertices()[0].color, colors::TILE_GLOW);
        assert_ne!(cold.vertices()[0].color, hot.vertices()[0].color);
    }

    #[test]
    fn test_unknown_edge_draws_nothing() {
        let mut list = DrawList::new();
        list.glass_edge(&camera(), 0, 0, EDGE_TOP | EDGE_LEFT, 0.0);
        assert!(list.is_empty());
    }

    #[test]
    fn test_sprite_vertices_are_textured() {
        let cam = camera();
        let mut list = DrawList::new();
        list.sprite(
            &cam,
            &PLAYER_SHEET,
            Animation::Idle,
            0,
            Rect::new(1.0, 1.0, 1.6, 1.6),
            true,
            colors::WHITE,
        );
        assert_eq!(list.len(), 6);
        assert!(list.vertices().iter().all(Vertex::is_textured));
        // flipped: left corner samples the right edge of the frame
        assert!(list.vertices()[0].uv[0] > list.vertices()[1].uv[0]);
    }

    #[test]
    fn test_arrow_points_at_target() {
        let cam = camera();
        let mut list = DrawList::new();
        list.arrow(&cam, Vec2::new(8.0, 5.0), Vec2::new(100.0, 5.0), colors::INDICATOR);
        assert_eq!(list.len(), 3);
        let tip = list.vertices()[0].position;
        assert!(tip[0] > 800.0);
        assert!((tip[1] - 500.0).abs() < 1e-3);

        let mut none = DrawList::new();
        none.arrow(&cam, Vec2::ONE, Vec2::ONE, colors::INDICATOR);
        assert!(none.is_empty());
    }

    #[test]
    fn test_bar_skips_empty_fill() {
        let cam = camera();
        let mut list = DrawList::new();
        list.bar(&cam, Rect::new(0.0, 0.0, 1.0, 0.1), 0.0, colors::HEALTH_FILL, colors::HEALTH_BACK);
        assert_eq!(list.len(), 6);
        list.bar(&cam, Rect::new(0.0, 0.0, 1.0, 0.1), 1.5, colors::HEALTH_FILL, colors::HEALTH_BACK);
        assert_eq!(list.len(), 18);
    }
}
