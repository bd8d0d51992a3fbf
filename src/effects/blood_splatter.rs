//! Click-driven 2D blood particles.
//!
//! Each burst throws particles radially with a constant upward kick, then
//! gravity pulls them down while they fade. Opacity is recomputed from the
//! absolute age on every tick, so it does not drift with uneven frame times.

use std::f32::consts::TAU;

use image::Rgb;
use rand::{Rng, SeedableRng, rngs::StdRng};

use super::{
    clock::{Clock, InstantClock},
    surface::SplatterSurface,
};

pub const LIFETIME_MS: f64 = 1500.0;
pub const GRAVITY: f32 = 500.0;
pub const UPWARD_BIAS: f32 = 100.0;
pub const BURST_SIZE: std::ops::Range<usize> = 20..40;
pub const SPEED: std::ops::Range<f32> = 100.0..300.0;
pub const PARTICLE_SIZE: std::ops::Range<f32> = 3.0..8.0;
pub const INNER_COLOR: Rgb<u8> = Rgb([0x8b, 0x00, 0x00]);
pub const OUTER_COLOR: Rgb<u8> = Rgb([0x4a, 0x00, 0x00]);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    /// px/s
    pub vx: f32,
    /// px/s, positive is down
    pub vy: f32,
    pub size: f32,
    pub alpha: f32,
    pub birth_ms: f64,
}

impl Particle {
    pub fn age_ms(&self, now_ms: f64) -> f64 {
        now_ms - self.birth_ms
    }
}

#[derive(Debug)]
pub struct ParticleSystem<R = StdRng, C = InstantClock> {
    particles: Vec<Particle>,
    rng: R,
    clock: C,
}

impl ParticleSystem {
    pub fn new() -> Self {
        Self::with_rng_and_clock(StdRng::from_entropy(), InstantClock::new())
    }
}

impl Default for ParticleSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng, C: Clock> ParticleSystem<R, C> {
    pub fn with_rng_and_clock(rng: R, clock: C) -> Self {
        Self {
            particles: Vec::new(),
            rng,
            clock,
        }
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

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Spawns a burst at `(x, y)` in surface pixels and returns how many particles it added.
    pub fn spawn_burst(&mut self, x: f32, y: f32) -> usize {
        let count = self.rng.gen_range(BURST_SIZE);
        let birth_ms = self.clock.now_ms();
        self.particles.reserve(count);
        for _ in 0..count {
            let angle = self.rng.gen_range(0.0..TAU);
            let speed = self.rng.gen_range(SPEED);
            let size = self.rng.gen_range(PARTICLE_SIZE);
            self.particles.push(Particle {
                x,
                y,
                vx: angle.cos() * speed,
                vy: angle.sin() * speed - UPWARD_BIAS,
                size,
                alpha: 1.0,
                birth_ms,
            });
        }
        log::trace!("Spawned {count} particles at ({x}, {y})");
        count
    }

    /// Advances the simulation by `delta_ms` and drops expired particles.
    pub fn tick(&mut self, delta_ms: f64) {
        let dt = (delta_ms / 1000.0) as f32;
        let now = self.clock.now_ms();
        self.particles.retain_mut(|p| {
            let age = p.age_ms(now);
            if age > LIFETIME_MS {
                return false;
            }
            p.vy += GRAVITY * dt;
            p.x += p.vx * dt;
            p.y += p.vy * dt;
            p.alpha = (1.0 - age / LIFETIME_MS).max(0.0) as f32;
            true
        });
    }

    /// Clears `surface` and draws every live particle.
    pub fn render(&self, surface: &mut dyn SplatterSurface) {
        surface.clear();
        for p in &self.particles {
            surface.fill_radial_circle((p.x, p.y), p.size, INNER_COLOR, OUTER_COLOR, p.alpha);
        }
    }
}
