//! The effects runtime.
//!
//! [`EffectsRuntime`] owns the current [`RuntimeSettings`], the particle
//! trail, the halo cluster and the cursor animation controller. The host
//! drives it: pointer and click events go to [`pointer_move`](EffectsRuntime::pointer_move)
//! and [`click`](EffectsRuntime::click), the display refresh calls
//! [`tick`](EffectsRuntime::tick) and [`render`](EffectsRuntime::render), and
//! the cursor playback timer calls [`poll_cursor`](EffectsRuntime::poll_cursor).
//!
//! # Example
//!
//! ```
//! use star_effects::{EffectsRuntime, MemoryStore, SettingsPatch};
//! # use star_effects::{BinaryFetcher, CursorPresenter, DecodedFrame, Hotspot, LoadError};
//! # struct NoCursor;
//! # impl CursorPresenter for NoCursor {
//! #     fn present(&mut self, _: &DecodedFrame, _: Hotspot) {}
//! #     fn clear(&mut self) {}
//! # }
//! # struct NoFetch;
//! # impl BinaryFetcher for NoFetch {
//! #     fn fetch(&mut self, url: &str) -> Result<Vec<u8>, LoadError> {
//! #         Err(LoadError::io(url, "offline"))
//! #     }
//! # }
//!
//! let mut runtime = EffectsRuntime::new(
//!     Box::new(MemoryStore::default()),
//!     Box::new(NoCursor),
//!     Box::new(NoFetch),
//!     "/seffects/",
//!     7,
//!     0.0,
//! );
//! runtime.pointer_move(10.0, 10.0, 0.0);
//! runtime.pointer_move(40.0, 10.0, 16.0);
//! runtime.tick(16.0);
//! assert!(runtime.is_active());
//!
//! runtime.apply_settings(&SettingsPatch { disabled: Some(true), ..Default::default() }, 32.0);
//! assert!(!runtime.is_active());
//! ```

use std::collections::HashMap;

use log::{debug, info, warn};
use resvg::tiny_skia::Pixmap;

use crate::cursor::{BinaryFetcher, CursorAnimationController, CursorPresenter, LoadTicket};
use crate::error::LoadError;
use crate::effects::{HaloCluster, ParticleField};
use crate::settings::{CURSOR_ASSETS, RuntimeSettings, STORAGE_KEY, SettingsPatch};

// ============================================================================
// SettingsStore
// ============================================================================

/// A persistent string key/value store.
pub trait SettingsStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str);
}

/// A [`SettingsStore`] that lives only as long as the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding one entry.
    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut store = Self::default();
        store.set(key, value);
        store
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }
}

// ============================================================================
// EffectsRuntime
// ============================================================================

const HALO_SEED_MIX: u64 = 0x9e37_79b9_7f4a_7c15;

/// A cursor fetch the host has to perform and report back through
/// [`EffectsRuntime::finish_cursor_load`].
#[derive(Debug, Clone, PartialEq)]
pub struct CursorRequest {
    pub ticket: LoadTicket,
    pub url: String,
}

/// The static `.cur` tried when an animated cursor cannot be loaded.
pub fn fallback_cursor_url(url: &str) -> Option<String> {
    let split = url.len().checked_sub(4)?;
    let (stem, ext) = (url.get(..split)?, url.get(split..)?);
    ext.eq_ignore_ascii_case(".ani")
        .then(|| format!("{}.cur", stem))
}

struct Effects {
    trail: ParticleField,
    halo: HaloCluster,
}

/// Composes the effects and keeps them in step with the settings.
pub struct EffectsRuntime {
    settings: RuntimeSettings,
    store: Box<dyn SettingsStore>,
    fetcher: Option<Box<dyn BinaryFetcher>>,
    pending: Option<CursorRequest>,
    cursor: CursorAnimationController,
    effects: Option<Effects>,
    base_path: String,
    seed: u64,
    builds: u64,
}

impl EffectsRuntime {
    /// Creates a runtime from the persisted settings and starts it.
    ///
    /// Missing or corrupt persisted settings fall back to the defaults.
    /// Cursor files are fetched synchronously through `fetcher`.
    pub fn new(
        store: Box<dyn SettingsStore>,
        presenter: Box<dyn CursorPresenter>,
        fetcher: Box<dyn BinaryFetcher>,
        base_path: impl Into<String>,
        seed: u64,
        now: f64,
    ) -> Self {
        Self::create(store, presenter, Some(fetcher), base_path.into(), seed, now)
    }

    /// Like [`new`](Self::new), but cursor fetches are left to the host: each
    /// one is queued as a [`CursorRequest`] to be collected with
    /// [`take_cursor_request`](Self::take_cursor_request).
    pub fn with_deferred_cursor(
        store: Box<dyn SettingsStore>,
        presenter: Box<dyn CursorPresenter>,
        base_path: impl Into<String>,
        seed: u64,
        now: f64,
    ) -> Self {
        Self::create(store, presenter, None, base_path.into(), seed, now)
    }

    fn create(
        store: Box<dyn SettingsStore>,
        presenter: Box<dyn CursorPresenter>,
        fetcher: Option<Box<dyn BinaryFetcher>>,
        base_path: String,
        seed: u64,
        now: f64,
    ) -> Self {
        let stored = store.get(STORAGE_KEY);
        let patch = SettingsPatch::from_stored(stored.as_deref());
        let mut runtime = Self {
            settings: RuntimeSettings::from_patch(&patch),
            store,
            fetcher,
            pending: None,
            cursor: CursorAnimationController::new(presenter),
            effects: None,
            base_path,
            seed,
            builds: 0,
        };
        runtime.build(now);
        runtime
    }

    /// The settings currently in effect.
    pub fn settings(&self) -> &RuntimeSettings {
        &self.settings
    }

    pub fn defaults() -> RuntimeSettings {
        RuntimeSettings::default()
    }

    /// Names of the selectable cursor files.
    pub fn cursor_assets() -> &'static [&'static str] {
        &CURSOR_ASSETS
    }

    /// Directory the cursor files are resolved against.
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Merges `patch` over the defaults, persists it and applies the result.
    ///
    /// Toggling the effects, click bursts or the cursor file rebuilds
    /// everything. Any other change updates the live components in place.
    pub fn apply_settings(&mut self, patch: &SettingsPatch, now: f64) {
        let next = RuntimeSettings::from_patch(patch);
        match patch.to_json() {
            Ok(json) => self.store.set(STORAGE_KEY, &json),
            Err(e) => warn!("runtime: failed to persist settings: {}", e),
        }

        let previous = std::mem::replace(&mut self.settings, next);
        if self.effects.is_none() || previous.is_structural_change(&self.settings) {
            debug!("runtime: structural settings change, rebuilding");
            self.teardown();
            self.build(now);
        } else if previous != self.settings {
            debug!("runtime: hot-updating settings");
            if let Some(effects) = &mut self.effects {
                effects.trail.set_config(self.settings.trail_config());
                effects.halo.set_config(self.settings.halo_config());
            }
        }
    }

    fn build(&mut self, now: f64) {
        if self.settings.disabled {
            return;
        }
        let seed = self.seed.wrapping_add(self.builds);
        self.builds = self.builds.wrapping_add(1);
        self.effects = Some(Effects {
            trail: ParticleField::new(self.settings.trail_config(), seed),
            halo: HaloCluster::new(self.settings.halo_config(), seed ^ HALO_SEED_MIX),
        });
        if let Some(url) = self.settings.cursor_url(&self.base_path) {
            self.load_cursor(url, now);
        }
    }

    fn teardown(&mut self) {
        self.effects = None;
        self.pending = None;
        self.cursor.destroy();
    }

    fn load_cursor(&mut self, url: String, now: f64) {
        match self.fetcher.as_mut() {
            Some(fetcher) => {
                if !self.cursor.load(&url, fetcher.as_mut(), now) {
                    self.fall_back(&url, now);
                }
            }
            None => {
                let ticket = self.cursor.begin_load(&url);
                self.pending = Some(CursorRequest { ticket, url });
            }
        }
    }

    fn fall_back(&mut self, url: &str, now: f64) {
        if let Some(fallback) = fallback_cursor_url(url) {
            info!("runtime: falling back to {}", fallback);
            self.load_cursor(fallback, now);
        }
    }

    /// Hands the pending cursor fetch to the host, if there is one.
    pub fn take_cursor_request(&mut self) -> Option<CursorRequest> {
        self.pending.take()
    }

    /// Installs the result of a cursor fetch. Returns true if the cursor is
    /// now playing.
    ///
    /// Results for superseded requests are dropped. If an animated cursor
    /// fails, its sibling `.cur` file is tried once.
    pub fn finish_cursor_load(
        &mut self,
        request: CursorRequest,
        fetched: Result<Vec<u8>, LoadError>,
        now: f64,
    ) -> bool {
        let CursorRequest { ticket, url } = request;
        if self.cursor.finish_load(ticket, &url, fetched, now) {
            return true;
        }
        if self.cursor.is_current(ticket) {
            self.fall_back(&url, now);
        }
        false
    }

    /// Returns true while the effects are running.
    pub fn is_active(&self) -> bool {
        self.effects.is_some()
    }

    /// Stops everything and restores the default pointer. A later
    /// [`apply_settings`](Self::apply_settings) starts the effects again.
    pub fn destroy(&mut self) {
        debug!("runtime: destroyed");
        self.teardown();
    }

    /// Advances the particle clock.
    pub fn tick(&mut self, now: f64) {
        if let Some(effects) = &mut self.effects {
            effects.trail.update(now);
            effects.halo.update(now);
        }
    }

    pub fn pointer_move(&mut self, x: f32, y: f32, now: f64) {
        if let Some(effects) = &mut self.effects {
            effects.trail.add_point(x, y, now);
            effects.halo.pointer_moved(x, y, now);
        }
    }

    /// Spawns a burst at the click position if click bursts are enabled.
    /// Returns the number of particles spawned.
    pub fn click(&mut self, x: f32, y: f32, now: f64) -> usize {
        if !self.settings.click_burst {
            return 0;
        }
        let count = self.settings.click_burst_count as usize;
        match &mut self.effects {
            Some(effects) => effects.trail.add_burst(x, y, count, now),
            None => 0,
        }
    }

    /// Fires the cursor playback timer. Returns true if a new frame was
    /// presented.
    pub fn poll_cursor(&mut self, now: f64) -> bool {
        self.cursor.poll(now)
    }

    /// When the host should next call [`poll_cursor`](Self::poll_cursor).
    pub fn next_cursor_deadline(&self) -> Option<f64> {
        self.cursor.next_deadline()
    }

    /// Paints the trail and then the halo on top.
    pub fn render(&mut self, pixmap: &mut Pixmap, now: f64) {
        if let Some(effects) = &mut self.effects {
            effects.trail.render(pixmap, now);
            effects.halo.render(pixmap, now);
        }
    }

    pub fn trail(&self) -> Option<&ParticleField> {
        self.effects.as_ref().map(|e| &e.trail)
    }

    pub fn halo(&self) -> Option<&HaloCluster> {
        self.effects.as_ref().map(|e| &e.halo)
    }

    pub fn cursor(&self) -> &CursorAnimationController {
        &self.cursor
    }
}

// ============================================================================
// Tests
// ============================================================================
