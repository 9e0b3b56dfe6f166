//! Pointer-following particle effects.
//!
//! Two components share one per-frame clock driven by the host:
//!
//! - [`ParticleField`]: the trail spawned by pointer movement and click
//!   bursts, with soft-expiry culling above capacity.
//! - [`HaloCluster`]: a handful of particles that gather around the pointer
//!   while it rests.
//!
//! Both paint into a caller-supplied tiny-skia [`Pixmap`](resvg::tiny_skia::Pixmap).

pub mod color;
pub mod halo;
pub mod particle;
pub mod scatter;
pub mod shape;
pub mod trail;

pub use color::ColorScheme;
pub use halo::{HaloCluster, HaloConfig, HaloParticle};
pub use particle::{ColorMode, Particle, ShapeStyle, UnknownStyle};
pub use trail::{ParticleField, TrailConfig};
