//! The particle trail that follows the pointer.

use std::f32::consts::TAU;

use log::debug;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use resvg::tiny_skia::Pixmap;

use super::color::ColorScheme;
use super::particle::{Particle, ShapeStyle};
use super::shape::ParticleSprite;

/// Live particles may exceed capacity by at most this factor while culled
/// particles fade out.
pub const HARD_CEILING_FACTOR: usize = 3;

// ============================================================================
// TrailConfig
// ============================================================================

/// Trail parameters. Everything here can change on a live field.
#[derive(Debug, Clone, PartialEq)]
pub struct TrailConfig {
    /// Particles allowed before culling starts.
    pub max_count: usize,
    /// Pointer travel (px) needed before a move spawns particles.
    pub min_distance: f32,
    pub style: ShapeStyle,
    pub burst_style: ShapeStyle,
    /// ms
    pub lifetime: f64,
    /// ms
    pub burst_lifetime: f64,
    /// Multiplier applied to particle size when painting.
    pub size_scale: f32,
    pub size_change: f32,
    pub min_size: f32,
    pub max_size: f32,
    /// Downward drift of non-flame trail particles (px per tick).
    pub initial_vy: f32,
    /// How long culled particles take to fade out (ms).
    pub fade_window: f64,
    pub colors: ColorScheme,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            max_count: 20,
            min_distance: 20.0,
            style: ShapeStyle::Star,
            burst_style: ShapeStyle::Star,
            lifetime: 1000.0,
            burst_lifetime: 1000.0,
            size_scale: 1.0,
            size_change: 0.1,
            min_size: 0.3,
            max_size: 1.5,
            initial_vy: 1.0,
            fade_window: 200.0,
            colors: ColorScheme::default(),
        }
    }
}

// ============================================================================
// ParticleField
// ============================================================================

/// A bounded pool of trail particles.
///
/// Particles are kept in spawn order, so the front of the pool is always the
/// oldest. Over capacity, the oldest particles are soft-expired: they keep
/// their current alpha and fade to zero over [`TrailConfig::fade_window`]
/// instead of disappearing at once.
pub struct ParticleField {
    config: TrailConfig,
    particles: Vec<Particle>,
    last_point: (f32, f32),
    hue: f32,
    rng: SmallRng,
}

impl ParticleField {
    pub fn new(config: TrailConfig, seed: u64) -> Self {
        Self {
            config,
            particles: Vec::new(),
            last_point: (0.0, 0.0),
            hue: 0.0,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &TrailConfig {
        &self.config
    }

    /// Replaces the configuration without touching live particles.
    pub fn set_config(&mut self, config: TrailConfig) {
        self.config = config;
    }

    /// Records a pointer position, spawning one to three particles if the
    /// pointer moved far enough since the last accepted point.
    ///
    /// Returns the number of particles spawned.
    pub fn add_point(&mut self, x: f32, y: f32, now: f64) -> usize {
        let (dx, dy) = (x - self.last_point.0, y - self.last_point.1);
        let min = self.config.min_distance;
        if dx * dx + dy * dy <= min * min {
            return 0;
        }

        let count = self.rng.random_range(1..=3);
        for _ in 0..count {
            let style = self.config.style.resolve(&mut self.rng);
            let (vx, vy) = if style == ShapeStyle::Flame {
                (
                    (self.rng.random::<f32>() - 0.5) * 1.5,
                    -0.5 - self.rng.random::<f32>() * 0.5,
                )
            } else {
                (0.0, self.config.initial_vy)
            };
            let particle = Particle {
                x: x + (self.rng.random::<f32>() - 0.5) * 20.0,
                y: y + self.rng.random::<f32>() * 20.0,
                vx,
                vy,
                size: 1.0,
                growing: self.rng.random_bool(0.5),
                birth: now,
                lifetime: self.config.lifetime,
                style,
                hue: self.hue,
                dying: None,
            };
            self.particles.push(particle);
        }

        self.hue = (self.hue + self.config.colors.speed).rem_euclid(360.0);
        self.last_point = (x, y);
        self.enforce_capacity(now);
        count
    }

    /// Spawns `count` particles flying outward from `(x, y)`.
    ///
    /// Angles are evenly spaced with up to ±0.25 rad of jitter; speeds are
    /// between 1.5 and 4.5 px per tick. The distance gate does not apply.
    pub fn add_burst(&mut self, x: f32, y: f32, count: usize, now: f64) -> usize {
        if count == 0 {
            return 0;
        }
        let rainbow = self.config.colors.is_rainbow();
        for i in 0..count {
            let fraction = i as f32 / count as f32;
            let angle = fraction * TAU + (self.rng.random::<f32>() - 0.5) * 0.5;
            let speed = 1.5 + self.rng.random::<f32>() * 3.0;
            let style = self.config.burst_style.resolve(&mut self.rng);
            let mut vy = angle.sin() * speed;
            if style == ShapeStyle::Flame {
                vy -= 1.0;
            }
            let particle = Particle {
                x: x + (self.rng.random::<f32>() - 0.5) * 10.0,
                y: y + (self.rng.random::<f32>() - 0.5) * 10.0,
                vx: angle.cos() * speed,
                vy,
                size: 0.8 + self.rng.random::<f32>() * 0.7,
                growing: self.rng.random_bool(0.5),
                birth: now,
                lifetime: self.config.burst_lifetime,
                style,
                hue: if rainbow {
                    (self.hue + fraction * 360.0).rem_euclid(360.0)
                } else {
                    0.0
                },
                dying: None,
            };
            self.particles.push(particle);
        }
        if rainbow {
            self.hue = (self.hue + 60.0).rem_euclid(360.0);
        }
        self.enforce_capacity(now);
        count
    }

    /// Culls the oldest particles above capacity, and truncates outright
    /// above the hard ceiling.
    fn enforce_capacity(&mut self, now: f64) {
        let max = self.config.max_count;
        let ceiling = max.saturating_mul(HARD_CEILING_FACTOR);
        if self.particles.len() > ceiling {
            let excess = self.particles.len() - ceiling;
            debug!("trail: dropping {} particles above the hard ceiling", excess);
            self.particles.drain(..excess);
        }

        let live = self.live_count();
        if live > max {
            let window = self.config.fade_window;
            let mut excess = live - max;
            for particle in self.particles.iter_mut().filter(|p| !p.is_dying()) {
                if excess == 0 {
                    break;
                }
                particle.soft_expire(now, window);
                excess -= 1;
            }
            debug!("trail: soft-expired {} particles", live - max);
        }
    }

    /// Advances every particle by one tick and drops expired ones.
    pub fn update(&mut self, now: f64) {
        self.particles.retain(|p| !p.is_expired(now));
        self.enforce_capacity(now);

        let TrailConfig {
            size_change,
            min_size,
            max_size,
            ..
        } = self.config;
        for p in &mut self.particles {
            p.x += p.vx;
            p.y += p.vy;
            if p.style == ShapeStyle::Flame {
                p.vx += (self.rng.random::<f32>() - 0.5) * 0.2;
            }
            if p.growing {
                p.size += size_change;
                if p.size >= max_size {
                    p.growing = false;
                }
            } else {
                p.size -= size_change;
                if p.size <= min_size {
                    p.growing = true;
                }
            }
        }
    }

    /// Paints every particle at its alpha for `now`.
    pub fn render(&self, pixmap: &mut Pixmap, now: f64) {
        for p in &self.particles {
            ParticleSprite {
                style: p.style,
                x: p.x,
                y: p.y,
                size: p.size * self.config.size_scale,
                age: p.age(now),
                progress: p.progress(now),
                alpha: p.alpha_at(now),
                color: self.config.colors.particle_color(p.hue),
            }
            .paint(pixmap);
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Particles that are not fading out from culling.
    pub fn live_count(&self) -> usize {
        self.particles.iter().filter(|p| !p.is_dying()).count()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Current running hue (degrees).
    pub fn hue(&self) -> f32 {
        self.hue
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }
}

// ============================================================================
// Tests
// ============================================================================
