//! star-effects: pointer-following particle effects and animated cursors
//!
//! This crate provides a sparkle trail that follows the pointer, a halo of
//! particles that gathers around it while it rests, click bursts, and a
//! decoder and player for animated (`.ani`) and static (`.cur`/`.ico`)
//! cursor files.
//!
//! Everything is driven by the host: it forwards pointer events, calls
//! `tick` from its frame callback, and supplies the collaborators for
//! fetching cursor files, presenting cursor frames and persisting settings.
//!
//! # Example
//!
//! ```
//! use star_effects::{ParticleField, ShapeStyle, TrailConfig};
//! use resvg::tiny_skia::Pixmap;
//!
//! let config = TrailConfig {
//!     style: ShapeStyle::Heart,
//!     ..TrailConfig::default()
//! };
//! let mut trail = ParticleField::new(config, 42);
//! trail.add_point(30.0, 30.0, 0.0);
//! trail.update(16.0);
//!
//! let mut pixmap = Pixmap::new(64, 64).unwrap();
//! trail.render(&mut pixmap, 16.0);
//! ```
//!
//! # Cursor Files
//!
//! ```
//! use star_effects::{FormatError, decode_cursor};
//!
//! let err = decode_cursor(b"JUNKJUNKJUNK").unwrap_err();
//! assert!(matches!(err, FormatError::Truncated { .. }));
//! ```

mod error;
mod icon;
mod runtime;
mod settings;

pub mod cursor;
pub mod effects;

#[cfg(feature = "canvas")]
mod canvas;

#[cfg(feature = "canvas")]
pub use canvas::EffectsCanvas;
pub use cursor::{
    AniHeader, AnimatedIconContainer, BinaryFetcher, CursorAnimationController, CursorPresenter,
    LoadTicket, PlaybackTimer, decode_cursor,
};
pub use effects::{
    ColorMode, ColorScheme, HaloCluster, HaloConfig, HaloParticle, Particle, ParticleField,
    ShapeStyle, TrailConfig, UnknownStyle,
};
pub use error::{FormatError, LoadError, Result};
pub use icon::{DecodedFrame, FrameSet, Hotspot, SizePx};
pub use runtime::{
    CursorRequest, EffectsRuntime, MemoryStore, SettingsStore, fallback_cursor_url,
};
pub use settings::{CURSOR_ASSETS, RuntimeSettings, STORAGE_KEY, SettingsPatch};
