//! Player animation states and their transition table
//!
//! Every state's clip (frame count, rate, what happens when the frames run
//! out, whether it locks out the controller) is an exhaustive `match`, so a
//! missing entry is a compile error rather than a runtime lookup failure.

use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Animation {
    Idle,
    Run,
    LookUp,
    Jump,
    Fall,
    Land,
    Slide,
    SlideTransition,
    Roll,
    Attack1,
    Attack2,
    Attack3,
    Attack4,
    GroundSlam,
    GroundSlamTransition,
    Knockback,
    LedgeClimb,
    LedgeHang,
    WallJump,
    Crouch,
    Crawl,
}

/// What happens when a clip's frames are exhausted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum After {
    /// Restart the same clip
    Loop,
    /// Switch to another state
    Goto(Animation),
    /// Idle finishes into look-up half of the time
    IdleOrLookUp,
    /// Stay on the last frame until gameplay changes the state
    Hold,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clip {
    pub frames: u8,
    /// Frames per second
    pub fps: f32,
    pub after: After,
    pub disables_controller: bool,
}

const fn clip(frames: u8, fps: f32, after: After) -> Clip {
    Clip {
        frames,
        fps,
        after,
        disables_controller: false,
    }
}

const fn locked(frames: u8, fps: f32, after: After) -> Clip {
    Clip {
        frames,
        fps,
        after,
        disables_controller: true,
    }
}

impl Animation {
    pub const ALL: [Animation; 21] = [
        Animation::Idle,
        Animation::Run,
        Animation::LookUp,
        Animation::Jump,
        Animation::Fall,
        Animation::Land,
        Animation::Slide,
        Animation::SlideTransition,
        Animation::Roll,
        Animation::Attack1,
        Animation::Attack2,
        Animation::Attack3,
        Animation::Attack4,
        Animation::GroundSlam,
        Animation::GroundSlamTransition,
        Animation::Knockback,
        Animation::LedgeClimb,
        Animation::LedgeHang,
        Animation::WallJump,
        Animation::Crouch,
        Animation::Crawl,
    ];

    pub fn clip(self) -> Clip {
        use Animation::*;
        match self {
            Idle => clip(6, 8.0, After::IdleOrLookUp),
            Run => clip(8, 14.0, After::Loop),
            LookUp => clip(4, 6.0, After::Goto(Idle)),
            Jump => clip(3, 12.0, After::Goto(Fall)),
            Fall => clip(2, 8.0, After::Loop),
            Land => clip(3, 18.0, After::Goto(Idle)),
            Slide => clip(5, 10.0, After::Goto(SlideTransition)),
            SlideTransition => clip(2, 12.0, After::Goto(Idle)),
            Roll => clip(4, 14.0, After::Goto(Fall)),
            Attack1 => locked(4, 16.0, After::Goto(Idle)),
            Attack2 => locked(4, 16.0, After::Goto(Idle)),
            Attack3 => locked(4, 16.0, After::Goto(Idle)),
            Attack4 => locked(6, 16.0, After::Goto(Idle)),
            GroundSlam => locked(3, 12.0, After::Hold),
            GroundSlamTransition => locked(3, 12.0, After::Goto(Idle)),
            Knockback => locked(4, 12.0, After::Goto(Idle)),
            LedgeClimb => clip(5, 14.0, After::Goto(Idle)),
            LedgeHang => clip(4, 6.0, After::Loop),
            WallJump => clip(3, 12.0, After::Goto(Fall)),
            Crouch => clip(4, 6.0, After::Loop),
            Crawl => clip(6, 10.0, After::Loop),
        }
    }

    pub fn disables_controller(self) -> bool {
        self.clip().disables_controller
    }

    pub fn is_attack(self) -> bool {
        matches!(
            self,
            Animation::Attack1 | Animation::Attack2 | Animation::Attack3 | Animation::Attack4
        )
    }

    /// Next step of the attack combo
    pub fn next_attack(self) -> Animation {
        match self {
            Animation::Attack1 => Animation::Attack2,
            Animation::Attack2 => Animation::Attack3,
            Animation::Attack3 => Animation::Attack4,
            _ => Animation::Attack1,
        }
    }

    /// Total clip length in seconds
    pub fn duration(self) -> f32 {
        let clip = self.clip();
        clip.frames as f32 / clip.fps
    }

    pub fn name(self) -> &'static str {
        use Animation::*;
        match self {
            Idle => "idle",
            Run => "run",
            LookUp => "look_up",
            Jump => "jump",
            Fall => "fall",
            Land => "land",
            Slide => "slide",
            SlideTransition => "slide_transition",
            Roll => "roll",
            Attack1 => "attack1",
            Attack2 => "attack2",
            Attack3 => "attack3",
            Attack4 => "attack4",
            GroundSlam => "ground_slam",
            GroundSlamTransition => "ground_slam_transition",
            Knockback => "knockback",
            LedgeClimb => "ledge_climb",
            LedgeHang => "ledge_hang",
            WallJump => "wall_jump",
            Crouch => "crouch",
            Crawl => "crawl",
        }
    }
}

/// Plays the current clip and fires its after-transition
#[derive(Debug, Clone)]
pub struct Animator {
    current: Animation,
    frame: u8,
    timer: f32,
}

impl Default for Animator {
    fn default() -> Self {
        Self::new(Animation::Idle)
    }
}

impl Animator {
    pub fn new(initial: Animation) -> Self {
        Self {
            current: initial,
            frame: 0,
            timer: 0.0,
        }
    }

    pub fn current(&self) -> Animation {
        self.current
    }

    pub fn frame(&self) -> u8 {
        self.frame
    }

    /// Switch state, restarting the clip; no-op if already playing it
    pub fn set(&mut self, animation: Animation) {
        if self.current != animation {
            self.restart(animation);
        }
    }

    /// Switch state and restart even if it is the same clip
    pub fn restart(&mut self, animation: Animation) {
        self.current = animation;
        self.frame = 0;
        self.timer = 0.0;
    }

    /// Advance by `dt`. Returns the state entered when a clip ran out.
    pub fn advance(&mut self, dt: f32, rng: &mut impl Rng) -> Option<Animation> {
        let clip = self.current.clip();
        let frame_time = 1.0 / clip.fps;
        self.timer += dt;

        while self.timer >= frame_time {
            self.timer -= frame_time;
            if self.frame + 1 < clip.frames {
                self.frame += 1;
                continue;
            }

            let next = match clip.after {
                After::Loop => {
                    self.frame = 0;
                    continue;
                }
                After::Hold => {
                    self.timer = 0.0;
                    return None;
                }
                After::Goto(next) => next,
                After::IdleOrLookUp => {
                    if rng.random_bool(0.5) {
                        Animation::LookUp
                    } else {
                        self.frame = 0;
                        continue;
                    }
                }
            };
            self.restart(next);
            return Some(next);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_every_clip_has_frames_and_rate() {
        for anim in Animation::ALL {
            let clip = anim.clip();
            assert!(clip.frames > 0, "{} has no frames", anim.name());
            assert!(clip.fps > 0.0, "{} has no rate", anim.name());
            if let After::Goto(next) = clip.after {
                assert_ne!(next, anim, "{} transitions to itself", anim.name());
            }
        }
    }

    #[test]
    fn test_attacks_lock_controller() {
        for anim in [
            Animation::Attack1,
            Animation::Attack2,
            Animation::Attack3,
            Animation::Attack4,
            Animation::Knockback,
            Animation::GroundSlam,
            Animation::GroundSlamTransition,
        ] {
            assert!(anim.disables_controller());
        }
        assert!(!Animation::Run.disables_controller());
        assert!(!Animation::LedgeHang.disables_controller());
    }

    #[test]
    fn test_slide_chain_returns_to_idle() {
        let mut rng = Pcg32::seed_from_u64(0);
        let mut animator = Animator::new(Animation::Slide);
        let mut visited = vec![animator.current()];
        for _ in 0..200 {
            if let Some(next) = animator.advance(1.0 / 60.0, &mut rng) {
                visited.push(next);
                if next == Animation::Idle {
                    break;
                }
            }
        }
        assert_eq!(
            visited,
            vec![Animation::Slide, Animation::SlideTransition, Animation::Idle]
        );
    }

    #[test]
    fn test_jump_falls_and_fall_loops() {
        let mut rng = Pcg32::seed_from_u64(0);
        let mut animator = Animator::new(Animation::Jump);
        let next = animator.advance(Animation::Jump.duration() + 0.001, &mut rng);
        assert_eq!(next, Some(Animation::Fall));
        for _ in 0..100 {
            assert_eq!(animator.advance(0.05, &mut rng), None);
        }
        assert_eq!(animator.current(), Animation::Fall);
    }

    #[test]
    fn test_idle_sometimes_looks_up() {
        let mut rng = Pcg32::seed_from_u64(42);
        let mut animator = Animator::new(Animation::Idle);
        let mut looked_up = false;
        for _ in 0..2000 {
            if animator.advance(1.0 / 30.0, &mut rng) == Some(Animation::LookUp) {
                looked_up = true;
                break;
            }
        }
        assert!(looked_up);
    }

    #[test]
    fn test_ground_slam_holds_last_frame() {
        let mut rng = Pcg32::seed_from_u64(0);
        let mut animator = Animator::new(Animation::GroundSlam);
        for _ in 0..100 {
            assert_eq!(animator.advance(0.05, &mut rng), None);
        }
        assert_eq!(animator.current(), Animation::GroundSlam);
        assert_eq!(animator.frame(), Animation::GroundSlam.clip().frames - 1);
    }
}
