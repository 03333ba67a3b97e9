//! Short-lived visual effects
//!
//! Ballistic sparks fade in, then shrink and fade out; they are removed only
//! once their size or alpha decays below `PARTICLE_EPSILON`. Health glyphs
//! ride along with the player so they rise from the health bar as it moves.

use glam::Vec2;
use rand::Rng;

use crate::consts::{HEALTH_GLYPH_COUNT, PARTICLE_EPSILON, PARTICLE_FADE_IN};

/// Downward pull on sparks (tiles/s²)
const SPARK_GRAVITY: f32 = 9.0;
/// Per-second velocity retention
const SPARK_DRAG: f32 = 0.35;
const SPARK_SHRINK_RATE: f32 = 0.9;
const SPARK_FADE_RATE: f32 = 1.6;
const GLYPH_RISE_SPEED: f32 = 0.8;
const GLYPH_FADE_RATE: f32 = 1.2;

/// Sign shown by a health glyph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthChange {
    Gain,
    Loss,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParticleKind {
    /// Free-flying spark
    Spark,
    /// "+" / "-" glyph positioned relative to a live anchor
    Glyph { change: HealthChange, offset: Vec2 },
}

#[derive(Debug, Clone)]
pub struct Particle {
    pub kind: ParticleKind,
    /// World position (for glyphs: recomputed from the anchor each tick)
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub alpha: f32,
    pub age: f32,
    pub color: [f32; 4],
}

impl Particle {
    fn is_dead(&self) -> bool {
        self.size < PARTICLE_EPSILON || self.alpha < PARTICLE_EPSILON
    }
}

#[derive(Debug, Clone)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    /// Hard cap from the quality preset (0 disables effects)
    max_particles: usize,
}

impl ParticleSystem {
    pub fn new(max_particles: usize) -> Self {
        Self {
            particles: Vec::new(),
            max_particles,
        }
    }

    pub fn set_max_particles(&mut self, max: usize) {
        self.max_particles = max;
        self.particles.truncate(max);
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    fn push(&mut self, particle: Particle) -> bool {
        if self.particles.len() >= self.max_particles {
            return false;
        }
        self.particles.push(particle);
        true
    }

    /// Burst of roughly `count` sparks (±10%) at a world position
    pub fn spawn_particles(
        &mut self,
        x: f32,
        y: f32,
        count: usize,
        size_scale: f32,
        color: [f32; 4],
        rng: &mut impl Rng,
    ) -> usize {
        let spread = (count / 10) as i64;
        let n = (count as i64 + rng.random_range(-spread..=spread)).max(0) as usize;

        let mut spawned = 0;
        for _ in 0..n {
            let angle: f32 = rng.random_range(0.0..std::f32::consts::TAU);
            let speed: f32 = rng.random_range(1.0..4.0);
            let particle = Particle {
                kind: ParticleKind::Spark,
                pos: Vec2::new(x, y),
                vel: Vec2::new(angle.cos(), angle.sin()) * speed,
                size: rng.random_range(0.05f32..0.15) * size_scale,
                alpha: 0.0,
                age: 0.0,
                color,
            };
            if !self.push(particle) {
                break;
            }
            spawned += 1;
        }
        spawned
    }

    /// Fixed set of "+" or "-" glyphs anchored to `anchor` (the player's health bar)
    pub fn spawn_health_change_particles(&mut self, anchor: Vec2, change: HealthChange, rng: &mut impl Rng) {
        let color = match change {
            HealthChange::Gain => [0.35, 0.95, 0.45, 1.0],
            HealthChange::Loss => [1.0, 0.3, 0.3, 1.0],
        };
        for i in 0..HEALTH_GLYPH_COUNT {
            let offset = Vec2::new(
                (i as f32 - (HEALTH_GLYPH_COUNT as f32 - 1.0) * 0.5) * 0.3 + rng.random_range(-0.05f32..0.05),
                -(i as f32) * 0.12,
            );
            self.push(Particle {
                kind: ParticleKind::Glyph { change, offset },
                pos: anchor + offset,
                vel: Vec2::ZERO,
                size: 0.22,
                alpha: 1.0,
                age: 0.0,
                color,
            });
        }
    }

    /// Advance every particle; `anchor` is the live position glyphs follow
    pub fn update(&mut self, dt: f32, anchor: Vec2) {
        for p in &mut self.particles {
            p.age += dt;
            match p.kind {
                ParticleKind::Spark => {
                    p.vel.y += SPARK_GRAVITY * dt;
                    p.vel *= SPARK_DRAG.powf(dt);
                    p.pos += p.vel * dt;
                    if p.age < PARTICLE_FADE_IN {
                        p.alpha = (p.age / PARTICLE_FADE_IN).sqrt().max(PARTICLE_EPSILON * 2.0);
                    } else {
                        p.alpha -= SPARK_FADE_RATE * dt;
                        p.size -= SPARK_SHRINK_RATE * p.size * dt;
                    }
                }
                ParticleKind::Glyph { ref mut offset, .. } => {
                    offset.y -= GLYPH_RISE_SPEED * dt;
                    p.pos = anchor + *offset;
                    p.alpha -= GLYPH_FADE_RATE * dt;
                }
            }
        }
        self.particles.retain(|p| !p.is_dead());
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_burst_count_within_ten_percent() {
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..20 {
            let mut ps = ParticleSystem::new(1000);
            let n = ps.spawn_particles(0.0, 0.0, 50, 1.0, [1.0; 4], &mut rng);
            assert!((45..=55).contains(&n));
            assert_eq!(ps.len(), n);
        }
    }

    #[test]
    fn test_cap_limits_spawns() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut ps = ParticleSystem::new(5);
        ps.spawn_particles(0.0, 0.0, 50, 1.0, [1.0; 4], &mut rng);
        assert_eq!(ps.len(), 5);

        let mut disabled = ParticleSystem::new(0);
        assert_eq!(disabled.spawn_particles(0.0, 0.0, 50, 1.0, [1.0; 4], &mut rng), 0);
    }

    #[test]
    fn test_sparks_fade_in_then_decay_to_removal() {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut ps = ParticleSystem::new(100);
        ps.spawn_particles(0.0, 0.0, 10, 1.0, [1.0; 4], &mut rng);

        ps.update(0.5, Vec2::ZERO);
        let early = ps.particles()[0].alpha;
        ps.update(1.0, Vec2::ZERO);
        assert!(ps.particles()[0].alpha > early);

        let mut steps = 0;
        while !ps.is_empty() && steps < 10_000 {
            ps.update(1.0 / 60.0, Vec2::ZERO);
            steps += 1;
        }
        assert!(ps.is_empty());
    }

    #[test]
    fn test_glyphs_track_live_anchor() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut ps = ParticleSystem::new(100);
        ps.spawn_health_change_particles(Vec2::new(1.0, 1.0), HealthChange::Gain, &mut rng);
        assert_eq!(ps.len(), HEALTH_GLYPH_COUNT);

        let before: Vec<Vec2> = ps.particles().iter().map(|p| p.pos).collect();
        // Anchor jumps 10 tiles right: glyphs move with it
        ps.update(0.1, Vec2::new(11.0, 1.0));
        for (b, p) in before.iter().zip(ps.particles()) {
            assert!((p.pos.x - (b.x + 10.0)).abs() < 1e-4);
            assert!(p.pos.y < b.y);
        }
    }
}
