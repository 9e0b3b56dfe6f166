//! The halo of particles that gathers around the pointer while it rests.

use log::debug;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use resvg::tiny_skia::Pixmap;

use super::color::ColorScheme;
use super::particle::ShapeStyle;
use super::scatter::{sample_offset, sample_offsets};
use super::shape::{GLOW_SURFACE, ParticleSprite, paint_glow};

/// Opacity gained per tick while the pointer rests.
pub const FADE_IN: f32 = 0.08;
/// Opacity lost per tick while the pointer moves.
pub const FADE_OUT: f32 = 0.15;
/// Fraction of the remaining distance a wandering offset covers per tick.
pub const WANDER_EASE: f32 = 0.03;
/// How often wandering particles pick a new destination (ms).
pub const WANDER_RETARGET_MS: f64 = 1500.0;
/// Opacity of the glow under each particle, before the cluster fade.
pub const GLOW_OPACITY: f32 = 0.1;

// ============================================================================
// HaloConfig
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct HaloConfig {
    pub count: usize,
    pub style: ShapeStyle,
    pub size_scale: f32,
    /// Radius (px) of the offset pattern.
    pub spread: f32,
    /// Pointer rest time before the halo appears (ms).
    pub stop_delay: f64,
    pub fade_in: f32,
    pub fade_out: f32,
    /// Let offsets drift while the pointer rests.
    pub wander: bool,
    /// Draw a new offset pattern every time the pointer comes to rest.
    pub reshuffle: bool,
    pub colors: ColorScheme,
}

impl Default for HaloConfig {
    fn default() -> Self {
        Self {
            count: 3,
            style: ShapeStyle::Star,
            size_scale: 1.0,
            spread: 20.0,
            stop_delay: 100.0,
            fade_in: FADE_IN,
            fade_out: FADE_OUT,
            wander: false,
            reshuffle: true,
            colors: ColorScheme::default(),
        }
    }
}

// ============================================================================
// HaloParticle
// ============================================================================

/// One halo particle. Its position is the pointer plus its offset.
#[derive(Debug, Clone, PartialEq)]
pub struct HaloParticle {
    pub offset: (f32, f32),
    /// Where a wandering offset is heading.
    pub target: (f32, f32),
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub min_size: f32,
    pub max_size: f32,
    pub grow_factor: f32,
    /// ms between size steps.
    pub grow_interval: f64,
    pub growing: bool,
    pub last_grow: f64,
    /// Always concrete.
    pub style: ShapeStyle,
}

impl HaloParticle {
    /// Size oscillation for particle `index` of `count`.
    ///
    /// The first particle is the larger "main" one. Three-particle halos use
    /// a fixed layout.
    fn new(index: usize, count: usize, offset: (f32, f32), style: ShapeStyle) -> Self {
        let (size, max_size, grow_factor, grow_interval) = match (count, index) {
            (3, 0) => (1.0, 2.0, 0.3, 150.0),
            (3, 1) => (0.5, 1.0, 0.05, 100.0),
            (3, _) => (0.5, 1.0, 0.1, 100.0),
            (_, 0) => (1.0, 2.0, 0.05, 100.0),
            (_, i) => (
                0.5,
                1.0,
                0.05 + (i % 4) as f32 * 0.07,
                100.0 + (i % 3) as f64 * 50.0,
            ),
        };
        Self {
            offset,
            target: offset,
            x: offset.0,
            y: offset.1,
            size,
            min_size: size,
            max_size,
            grow_factor,
            grow_interval,
            growing: true,
            last_grow: 0.0,
            style,
        }
    }

    fn follow(&mut self, pointer: (f32, f32)) {
        self.x = pointer.0 + self.offset.0;
        self.y = pointer.1 + self.offset.1;
    }

    fn grow(&mut self, now: f64) {
        if now - self.last_grow < self.grow_interval {
            return;
        }
        self.size += if self.growing {
            self.grow_factor
        } else {
            -self.grow_factor
        };
        if self.size >= self.max_size {
            self.growing = false;
        }
        if self.size <= self.min_size {
            self.growing = true;
        }
        self.last_grow = now;
    }
}

// ============================================================================
// HaloCluster
// ============================================================================

/// Particles clustered around the pointer, visible while it rests.
///
/// A move hides the cluster (opacity falls by `fade_out` per tick) and
/// restarts the rest timer; once the pointer has rested for `stop_delay`
/// the cluster fades back in by `fade_in` per tick.
pub struct HaloCluster {
    config: HaloConfig,
    particles: Vec<HaloParticle>,
    opacity: f32,
    stopped: bool,
    stop_at: Option<f64>,
    pointer: (f32, f32),
    next_retarget: f64,
    rng: SmallRng,
    glow: Option<Pixmap>,
}

impl HaloCluster {
    pub fn new(config: HaloConfig, seed: u64) -> Self {
        let mut halo = Self {
            particles: Vec::new(),
            opacity: 0.0,
            stopped: false,
            stop_at: None,
            pointer: (0.0, 0.0),
            next_retarget: 0.0,
            rng: SmallRng::seed_from_u64(seed),
            glow: Pixmap::new(GLOW_SURFACE, GLOW_SURFACE),
            config,
        };
        halo.generate(halo.config.count);
        halo
    }

    /// Rebuilds the cluster with `count` particles.
    pub fn generate(&mut self, count: usize) {
        let HaloConfig { style, spread, .. } = self.config;
        self.particles = (0..count)
            .map(|i| {
                let offset = sample_offset(style, spread, &mut self.rng);
                let mut particle =
                    HaloParticle::new(i, count, offset, style.resolve(&mut self.rng));
                particle.follow(self.pointer);
                particle
            })
            .collect();
    }

    pub fn config(&self) -> &HaloConfig {
        &self.config
    }

    /// Applies new settings to the live cluster. Particles are rebuilt only
    /// when their count, style or pattern radius changed.
    pub fn set_config(&mut self, config: HaloConfig) {
        let rebuild = config.count != self.config.count
            || config.style != self.config.style
            || config.spread != self.config.spread;
        self.config = config;
        if rebuild {
            self.generate(self.config.count);
        }
    }

    /// Records a pointer move: hides the halo and restarts the rest timer.
    pub fn pointer_moved(&mut self, x: f32, y: f32, now: f64) {
        self.pointer = (x, y);
        self.stopped = false;
        self.stop_at = Some(now + self.config.stop_delay);
    }

    fn reshuffle(&mut self) {
        let HaloConfig { style, spread, .. } = self.config;
        let offsets = sample_offsets(style, spread, self.particles.len(), &mut self.rng);
        for (particle, offset) in self.particles.iter_mut().zip(offsets) {
            particle.offset = offset;
            particle.target = offset;
        }
    }

    fn retarget(&mut self) {
        let HaloConfig { style, spread, .. } = self.config;
        let targets = sample_offsets(style, spread, self.particles.len(), &mut self.rng);
        for (particle, target) in self.particles.iter_mut().zip(targets) {
            particle.target = target;
        }
    }

    /// Advances the cluster by one tick.
    pub fn update(&mut self, now: f64) {
        if self.stop_at.is_some_and(|at| now >= at) {
            self.stop_at = None;
            self.stopped = true;
            if self.config.reshuffle {
                self.reshuffle();
            }
            self.next_retarget = now;
            debug!("halo: pointer at rest");
        }

        self.opacity = if self.stopped {
            (self.opacity + self.config.fade_in).min(1.0)
        } else {
            (self.opacity - self.config.fade_out).max(0.0)
        };

        if self.stopped && self.config.wander {
            if now >= self.next_retarget {
                self.retarget();
                self.next_retarget = now + WANDER_RETARGET_MS;
            }
            for particle in &mut self.particles {
                particle.offset.0 += (particle.target.0 - particle.offset.0) * WANDER_EASE;
                particle.offset.1 += (particle.target.1 - particle.offset.1) * WANDER_EASE;
            }
        }

        let visible = self.opacity > 0.0;
        for particle in &mut self.particles {
            particle.follow(self.pointer);
            if visible {
                particle.grow(now);
            }
        }
    }

    /// Paints the cluster at its current opacity.
    pub fn render(&mut self, pixmap: &mut Pixmap, now: f64) {
        if self.opacity <= 0.0 {
            return;
        }
        let Self {
            config,
            particles,
            opacity,
            glow,
            ..
        } = self;
        let count = particles.len();
        for (i, p) in particles.iter().enumerate() {
            let (fill, glow_color) = config.colors.halo_colors(now, i, count);
            let size = p.size * config.size_scale;
            if let Some(scratch) = glow.as_mut() {
                paint_glow(pixmap, scratch, p.x, p.y, size, glow_color, GLOW_OPACITY * *opacity);
            }
            ParticleSprite {
                style: p.style,
                x: p.x,
                y: p.y,
                size,
                age: now,
                progress: 0.0,
                alpha: *opacity,
                color: fill,
            }
            .paint(pixmap);
        }
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn pointer(&self) -> (f32, f32) {
        self.pointer
    }

    pub fn particles(&self) -> &[HaloParticle] {
        &self.particles
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f64 = 16.0;

    fn halo(config: HaloConfig) -> HaloCluster {
        HaloCluster::new(config, 99)
    }

    fn radius((x, y): (f32, f32)) -> f32 {
        (x * x + y * y).sqrt()
    }

    #[test]
    fn rests_only_after_the_delay() {
        let mut h = halo(HaloConfig::default());
        h.pointer_moved(10.0, 10.0, 0.0);
        h.update(99.0);
        assert!(!h.is_stopped());

        // A new move restarts the timer.
        h.pointer_moved(20.0, 20.0, 90.0);
        h.update(150.0);
        assert!(!h.is_stopped());
        h.update(190.0);
        assert!(h.is_stopped());
    }

    #[test]
    fn opacity_rises_while_resting_and_falls_while_moving() {
        let mut h = halo(HaloConfig::default());
        h.pointer_moved(0.0, 0.0, 0.0);
        h.update(100.0);
        assert!(h.is_stopped());

        let mut now = 100.0;
        let mut previous = h.opacity();
        while previous < 1.0 {
            now += FRAME;
            h.update(now);
            assert!(h.opacity() > previous);
            assert!(h.opacity() <= 1.0);
            previous = h.opacity();
        }
        h.update(now + FRAME);
        assert_eq!(h.opacity(), 1.0);

        let mut previous = h.opacity();
        while previous > 0.0 {
            now += FRAME;
            h.pointer_moved(5.0, 5.0, now);
            h.update(now);
            assert!(h.opacity() < previous);
            assert!(h.opacity() >= 0.0);
            previous = h.opacity();
        }
    }

    #[test]
    fn particles_follow_the_pointer() {
        let mut h = halo(HaloConfig::default());
        h.pointer_moved(200.0, 150.0, 0.0);
        h.update(1.0);
        for p in h.particles() {
            assert_eq!(p.x, 200.0 + p.offset.0);
            assert_eq!(p.y, 150.0 + p.offset.1);
        }
    }

    #[test]
    fn three_particle_layout() {
        let h = halo(HaloConfig::default());
        let params: Vec<_> = h
            .particles()
            .iter()
            .map(|p| (p.size, p.max_size, p.grow_factor, p.grow_interval))
            .collect();
        assert_eq!(
            params,
            vec![
                (1.0, 2.0, 0.3, 150.0),
                (0.5, 1.0, 0.05, 100.0),
                (0.5, 1.0, 0.1, 100.0)
            ]
        );
    }

    #[test]
    fn general_layout() {
        let h = halo(HaloConfig {
            count: 6,
            ..HaloConfig::default()
        });
        let p = h.particles();
        assert_eq!(p.len(), 6);
        assert_eq!((p[0].size, p[0].max_size), (1.0, 2.0));
        assert_eq!((p[1].size, p[1].max_size), (0.5, 1.0));
        assert!((p[2].grow_factor - 0.19).abs() < 1e-6);
        assert_eq!(p[2].grow_interval, 200.0);
        assert!((p[5].grow_factor - 0.12).abs() < 1e-6);
        assert_eq!(p[5].grow_interval, 200.0);
    }

    #[test]
    fn offsets_stay_within_spread() {
        let mut h = halo(HaloConfig {
            count: 40,
            spread: 30.0,
            style: ShapeStyle::Random,
            wander: true,
            ..HaloConfig::default()
        });
        let mut now = 0.0;
        for round in 0..5 {
            h.pointer_moved(0.0, 0.0, now);
            now += 200.0;
            for _ in 0..200 {
                now += FRAME;
                h.update(now);
                for p in h.particles() {
                    assert!(radius(p.offset) <= 30.0 * 1.0001, "round {round}");
                    assert!(!p.style.is_random());
                }
            }
        }
    }

    #[test]
    fn reshuffles_on_each_rest() {
        let mut h = halo(HaloConfig::default());
        let before: Vec<_> = h.particles().iter().map(|p| p.offset).collect();
        h.pointer_moved(0.0, 0.0, 0.0);
        h.update(100.0);
        let after: Vec<_> = h.particles().iter().map(|p| p.offset).collect();
        assert_ne!(before, after);

        let mut fixed = halo(HaloConfig {
            reshuffle: false,
            ..HaloConfig::default()
        });
        let before: Vec<_> = fixed.particles().iter().map(|p| p.offset).collect();
        fixed.pointer_moved(0.0, 0.0, 0.0);
        fixed.update(100.0);
        let after: Vec<_> = fixed.particles().iter().map(|p| p.offset).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn wander_drifts_offsets_while_resting() {
        let mut h = halo(HaloConfig {
            wander: true,
            reshuffle: false,
            ..HaloConfig::default()
        });
        let start: Vec<_> = h.particles().iter().map(|p| p.offset).collect();
        h.pointer_moved(0.0, 0.0, 0.0);
        h.update(100.0);
        h.update(116.0);
        let moved: Vec<_> = h.particles().iter().map(|p| p.offset).collect();
        assert_ne!(start, moved);

        // Without wander the pattern is frozen while resting.
        let mut still = halo(HaloConfig {
            reshuffle: false,
            ..HaloConfig::default()
        });
        let start: Vec<_> = still.particles().iter().map(|p| p.offset).collect();
        still.pointer_moved(0.0, 0.0, 0.0);
        for i in 0..20 {
            still.update(100.0 + i as f64 * FRAME);
        }
        let end: Vec<_> = still.particles().iter().map(|p| p.offset).collect();
        assert_eq!(start, end);
    }

    #[test]
    fn sizes_step_on_their_interval() {
        let mut h = halo(HaloConfig::default());
        let size = |h: &HaloCluster| h.particles()[0].size;
        h.pointer_moved(0.0, 0.0, 0.0);

        // The main particle steps every 150 ms, counted from time zero.
        h.update(100.0);
        assert_eq!(size(&h), 1.0);
        h.update(200.0);
        assert!((size(&h) - 1.3).abs() < 1e-6);
        h.update(250.0);
        assert!((size(&h) - 1.3).abs() < 1e-6);
        h.update(350.0);
        assert!((size(&h) - 1.6).abs() < 1e-6);
    }

    #[test]
    fn hot_config_keeps_particles_unless_layout_changes() {
        let mut h = halo(HaloConfig::default());
        let before = h.particles().to_vec();
        h.set_config(HaloConfig {
            size_scale: 2.0,
            wander: true,
            ..HaloConfig::default()
        });
        assert_eq!(h.particles(), &before[..]);

        h.set_config(HaloConfig {
            count: 7,
            ..HaloConfig::default()
        });
        assert_eq!(h.particles().len(), 7);
    }

    #[test]
    fn renders_only_when_visible() {
        let mut h = halo(HaloConfig::default());
        let mut pixmap = Pixmap::new(128, 128).unwrap();
        h.pointer_moved(64.0, 64.0, 0.0);
        h.update(10.0);
        h.render(&mut pixmap, 10.0);
        assert!(pixmap.data().iter().all(|b| *b == 0));

        h.update(100.0);
        h.render(&mut pixmap, 100.0);
        assert!(pixmap.data().iter().any(|b| *b != 0));
    }

    #[test]
    fn empty_cluster_is_harmless() {
        let mut h = halo(HaloConfig {
            count: 0,
            ..HaloConfig::default()
        });
        let mut pixmap = Pixmap::new(16, 16).unwrap();
        h.pointer_moved(0.0, 0.0, 0.0);
        h.update(100.0);
        h.render(&mut pixmap, 100.0);
        assert!(h.particles().is_empty());
        assert!(pixmap.data().iter().all(|b| *b == 0));
    }
}
