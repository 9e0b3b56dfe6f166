//! Particle state shared by the trail and the halo.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

// ============================================================================
// ShapeStyle
// ============================================================================

/// Shape drawn for a particle.
///
/// `Random` is only a configuration value: it is resolved to one of
/// [`ShapeStyle::CONCRETE`] when a particle spawns and the result is kept for
/// the particle's whole life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "tsify", derive(tsify_next::Tsify))]
pub enum ShapeStyle {
    #[default]
    Star,
    Bubble,
    Heart,
    Flower,
    Flame,
    Random,
}

impl ShapeStyle {
    /// Every style a particle can actually be drawn as.
    pub const CONCRETE: [ShapeStyle; 5] = [
        ShapeStyle::Star,
        ShapeStyle::Bubble,
        ShapeStyle::Heart,
        ShapeStyle::Flower,
        ShapeStyle::Flame,
    ];

    /// Picks a concrete style for `Random`; other styles are returned as is.
    pub fn resolve<R: Rng + ?Sized>(self, rng: &mut R) -> ShapeStyle {
        match self {
            ShapeStyle::Random => Self::CONCRETE[rng.random_range(0..Self::CONCRETE.len())],
            style => style,
        }
    }

    pub fn is_random(self) -> bool {
        self == ShapeStyle::Random
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ShapeStyle::Star => "star",
            ShapeStyle::Bubble => "bubble",
            ShapeStyle::Heart => "heart",
            ShapeStyle::Flower => "flower",
            ShapeStyle::Flame => "flame",
            ShapeStyle::Random => "random",
        }
    }
}

impl fmt::Display for ShapeStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown style name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown shape style {0:?}")]
pub struct UnknownStyle(pub String);

impl FromStr for ShapeStyle {
    type Err = UnknownStyle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::Random]
            .into_iter()
            .chain(Self::CONCRETE)
            .find(|style| style.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownStyle(s.to_string()))
    }
}

// ============================================================================
// ColorMode
// ============================================================================

/// How particle colors are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "tsify", derive(tsify_next::Tsify))]
pub enum ColorMode {
    /// One configured color for every particle.
    #[default]
    Fixed,
    /// Hue cycles over time and across particles.
    Rainbow,
}

// ============================================================================
// Particle
// ============================================================================

/// Captured state of a particle that was culled over capacity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dying {
    /// When the fade started (ms).
    pub at: f64,
    /// Alpha at the moment of culling; fades linearly to zero from here.
    pub alpha: f32,
    /// Length of the fade (ms).
    pub window: f64,
}

/// One trail particle.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub size: f32,
    pub growing: bool,
    /// Spawn time (ms).
    pub birth: f64,
    /// Time to live (ms).
    pub lifetime: f64,
    /// Always concrete.
    pub style: ShapeStyle,
    pub hue: f32,
    pub dying: Option<Dying>,
}

impl Particle {
    /// Milliseconds since spawn, never negative.
    pub fn age(&self, now: f64) -> f64 {
        (now - self.birth).max(0.0)
    }

    /// Age as a fraction of the lifetime, in `[0, 1]`.
    pub fn progress(&self, now: f64) -> f32 {
        if self.lifetime <= 0.0 {
            return 1.0;
        }
        (self.age(now) / self.lifetime).min(1.0) as f32
    }

    /// Opacity at `now`.
    ///
    /// Normal particles fade linearly from 1 to 0 over their lifetime.
    /// Dying particles fade from their captured alpha to 0 over the fade
    /// window, and never get brighter than the lifetime fade would allow.
    pub fn alpha_at(&self, now: f64) -> f32 {
        let natural = 1.0 - self.progress(now);
        match self.dying {
            None => natural,
            Some(dying) => {
                let elapsed = (now - dying.at).max(0.0);
                let remaining = if dying.window <= 0.0 {
                    0.0
                } else {
                    (1.0 - elapsed / dying.window).max(0.0) as f32
                };
                (dying.alpha * remaining).min(natural)
            }
        }
    }

    /// Marks the particle as culled, freezing its current alpha as the start
    /// of a fade over `window` ms. A particle that is already dying keeps its
    /// original fade.
    pub fn soft_expire(&mut self, now: f64, window: f64) {
        if self.dying.is_none() {
            self.dying = Some(Dying {
                at: now,
                alpha: self.alpha_at(now),
                window,
            });
        }
    }

    /// Returns true once the lifetime or the culling fade has elapsed.
    pub fn is_expired(&self, now: f64) -> bool {
        if self.age(now) >= self.lifetime {
            return true;
        }
        self.dying
            .is_some_and(|dying| now - dying.at >= dying.window)
    }

    pub fn is_dying(&self) -> bool {
        self.dying.is_some()
    }
}

// ============================================================================
// Tests
// ============================================================================
