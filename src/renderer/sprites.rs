//! Sprite sheet descriptors
//!
//! The player atlas stores one animation per row, frames left to right, in
//! the same order as [`Animation`]'s variants.

use crate::sim::Animation;

/// Normalized source rectangle inside an atlas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvRect {
    pub u0: f32,
    pub v0: f32,
    pub u1: f32,
    pub v1: f32,
}

impl UvRect {
    /// Mirror horizontally (sprite facing left)
    pub fn flipped_x(self) -> Self {
        Self {
            u0: self.u1,
            u1: self.u0,
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteSheet {
    pub texture_width: u32,
    pub texture_height: u32,
    pub frame_width: u32,
    pub frame_height: u32,
}

/// Player character atlas: 8 columns of 64px frames, one row per animation
pub const PLAYER_SHEET: SpriteSheet = SpriteSheet {
    texture_width: 512,
    texture_height: 64 * Animation::ALL.len() as u32,
    frame_width: 64,
    frame_height: 64,
};

/// Player sprite size in world units; the body is smaller than the frame
pub const PLAYER_SPRITE_SIZE: f32 = 1.6;

impl SpriteSheet {
    pub fn columns(&self) -> u32 {
        (self.texture_width / self.frame_width.max(1)).max(1)
    }

    pub fn rows(&self) -> u32 {
        (self.texture_height / self.frame_height.max(1)).max(1)
    }

    /// Atlas row holding an animation
    pub fn row_of(&self, animation: Animation) -> u32 {
        (animation as u32).min(self.rows() - 1)
    }

    /// Source rectangle for one frame; out-of-range frames clamp to the last one
    pub fn source_rect(&self, animation: Animation, frame: u8) -> UvRect {
        let last = (animation.clip().frames.max(1) as u32 - 1).min(self.columns() - 1);
        let col = (frame as u32).min(last);
        let row = self.row_of(animation);

        let tw = self.texture_width as f32;
        let th = self.texture_height as f32;
        let x = (col * self.frame_width) as f32;
        let y = (row * self.frame_height) as f32;
        UvRect {
            u0: x / tw,
            v0: y / th,
            u1: (x + self.frame_width as f32) / tw,
            v1: (y + self.frame_height as f32) / th,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_animation_has_a_row() {
        assert_eq!(PLAYER_SHEET.rows() as usize, Animation::ALL.len());
        for (i, anim) in Animation::ALL.iter().enumerate() {
            assert_eq!(PLAYER_SHEET.row_of(*anim) as usize, i);
            assert!(anim.clip().frames as u32 <= PLAYER_SHEET.columns());
        }
    }

    #[test]
    fn test_source_rect_lookup() {
        let uv = PLAYER_SHEET.source_rect(Animation::Run, 2);
        assert!((uv.u0 - 128.0 / 512.0).abs() < 1e-6);
        assert!((uv.u1 - 192.0 / 512.0).abs() < 1e-6);
        assert!((uv.v0 - 64.0 / PLAYER_SHEET.texture_height as f32).abs() < 1e-6);
    }

    #[test]
    fn test_frame_past_clip_end_clamps() {
        let last = PLAYER_SHEET.source_rect(Animation::Land, 2);
        assert_eq!(PLAYER_SHEET.source_rect(Animation::Land, 200), last);
    }

    #[test]
    fn test_flip_swaps_u() {
        let uv = PLAYER_SHEET.source_rect(Animation::Idle, 0);
        let flipped = uv.flipped_x();
        assert_eq!(flipped.u0, uv.u1);
        assert_eq!(flipped.v0, uv.v0);
    }
}
