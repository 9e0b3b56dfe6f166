//! Halo offset distributions.
//!
//! Offsets are sampled along the outline of the shape matching the halo style
//! so that the cluster reads as that shape at any spread. Every sampler works
//! on the unit shape (all points within radius 1) and the result is scaled by
//! the spread radius after a small inward jitter.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use rand::Rng;

use super::particle::ShapeStyle;

/// Largest fraction by which a sample is pulled toward the center.
pub const MAX_INWARD_JITTER: f32 = 0.15;

/// Largest radius of the parametric heart curve before normalization.
const HEART_RADIUS: f32 = 17.0;

/// Inner/outer radius ratio of the star outline.
const STAR_INNER: f32 = 0.4;

/// Samples one offset for `style` within `spread` of the origin.
pub fn sample_offset<R: Rng + ?Sized>(style: ShapeStyle, spread: f32, rng: &mut R) -> (f32, f32) {
    if spread <= 0.0 {
        return (0.0, 0.0);
    }
    let (x, y) = match style {
        ShapeStyle::Random => return scale(unit_disk(rng), spread),
        ShapeStyle::Bubble => unit_circle(rng),
        ShapeStyle::Heart => unit_heart(rng),
        ShapeStyle::Flower => unit_rose(rng),
        ShapeStyle::Flame => unit_teardrop(rng),
        ShapeStyle::Star => unit_star(rng),
    };
    let pull = 1.0 - rng.random_range(0.0..=MAX_INWARD_JITTER);
    scale((x * pull, y * pull), spread)
}

/// Samples `count` offsets.
pub fn sample_offsets<R: Rng + ?Sized>(
    style: ShapeStyle,
    spread: f32,
    count: usize,
    rng: &mut R,
) -> Vec<(f32, f32)> {
    (0..count).map(|_| sample_offset(style, spread, rng)).collect()
}

fn scale((x, y): (f32, f32), by: f32) -> (f32, f32) {
    (x * by, y * by)
}

fn angle<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.random_range(0.0..TAU)
}

fn unit_circle<R: Rng + ?Sized>(rng: &mut R) -> (f32, f32) {
    let t = angle(rng);
    (t.cos(), t.sin())
}

fn unit_disk<R: Rng + ?Sized>(rng: &mut R) -> (f32, f32) {
    let t = angle(rng);
    let r = rng.random::<f32>().sqrt();
    (r * t.cos(), r * t.sin())
}

fn unit_heart<R: Rng + ?Sized>(rng: &mut R) -> (f32, f32) {
    let t = angle(rng);
    let x = 16.0 * t.sin().powi(3);
    let y = -(13.0 * t.cos() - 5.0 * (2.0 * t).cos() - 2.0 * (3.0 * t).cos() - (4.0 * t).cos());
    (x / HEART_RADIUS, y / HEART_RADIUS)
}

/// Five-petal rose `r = cos(5t)`.
fn unit_rose<R: Rng + ?Sized>(rng: &mut R) -> (f32, f32) {
    let t = rng.random_range(0.0..PI);
    let r = (5.0 * t).cos();
    (r * t.cos(), r * t.sin())
}

/// Teardrop with its point up and its round end down.
fn unit_teardrop<R: Rng + ?Sized>(rng: &mut R) -> (f32, f32) {
    let t = angle(rng);
    (t.sin() * (t / 2.0).sin(), -t.cos())
}

/// Edges of a five-pointed star (ten vertices).
fn unit_star<R: Rng + ?Sized>(rng: &mut R) -> (f32, f32) {
    let vertex = |k: usize| {
        let a = -FRAC_PI_2 + k as f32 * PI / 5.0;
        let r = if k % 2 == 0 { 1.0 } else { STAR_INNER };
        (r * a.cos(), r * a.sin())
    };
    let edge = rng.random_range(0..10);
    let (ax, ay) = vertex(edge);
    let (bx, by) = vertex(edge + 1);
    let u: f32 = rng.random();
    (ax + (bx - ax) * u, ay + (by - ay) * u)
}
