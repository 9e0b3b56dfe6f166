//! Animated cursor playback.
//!
//! [`CursorAnimationController`] owns the decoded frames of the current
//! cursor and a [`PlaybackTimer`] that is independent of the particle clock.
//! The host fires the timer by calling [`CursorAnimationController::poll`] at
//! or after [`CursorAnimationController::next_deadline`].
//!
//! Loading is split in two so that the fetch can complete asynchronously:
//! [`begin_load`](CursorAnimationController::begin_load) cancels playback and
//! hands out a [`LoadTicket`]; [`finish_load`](CursorAnimationController::finish_load)
//! installs the fetched bytes only if no newer load has started since.

use log::{debug, info, warn};

use super::container::{self, is_animated_container};
use super::frame;
use super::{BinaryFetcher, CursorPresenter};
use crate::error::{LoadError, Result};
use crate::icon::{DecodedFrame, FrameSet};

// ============================================================================
// PlaybackTimer
// ============================================================================

/// A cancellable one-shot deadline that is re-armed after every tick.
///
/// Each arm or cancel bumps the generation, so a callback scheduled against
/// an older generation can tell it has been superseded.
#[derive(Debug, Clone, Default)]
pub struct PlaybackTimer {
    deadline: Option<f64>,
    generation: u64,
}

impl PlaybackTimer {
    /// Arms the timer for `at` (milliseconds), replacing any pending deadline.
    pub fn schedule(&mut self, at: f64) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.deadline = Some(at);
        self.generation
    }

    /// Cancels the pending deadline. Idempotent.
    pub fn cancel(&mut self) {
        if self.deadline.take().is_some() {
            self.generation = self.generation.wrapping_add(1);
        }
    }

    /// Returns the pending deadline, if armed.
    pub fn deadline(&self) -> Option<f64> {
        self.deadline
    }

    /// Returns true if `generation` is the currently armed schedule.
    pub fn is_current(&self, generation: u64) -> bool {
        self.deadline.is_some() && self.generation == generation
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }
}

// ============================================================================
// CursorAnimationController
// ============================================================================

/// Identifies one call to [`CursorAnimationController::begin_load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// Decodes raw cursor bytes: an animated container or a single static
/// icon/cursor structure.
pub fn decode_cursor(bytes: &[u8]) -> Result<FrameSet> {
    if is_animated_container(bytes) {
        container::parse(bytes)?.decode_frames()
    } else {
        frame::decode(bytes).map(FrameSet::single)
    }
}

/// Plays the frames of a loaded cursor through a [`CursorPresenter`].
pub struct CursorAnimationController {
    presenter: Box<dyn CursorPresenter>,
    frames: FrameSet,
    step: usize,
    timer: PlaybackTimer,
    load_generation: u64,
}

impl CursorAnimationController {
    pub fn new(presenter: Box<dyn CursorPresenter>) -> Self {
        Self {
            presenter,
            frames: FrameSet::default(),
            step: 0,
            timer: PlaybackTimer::default(),
            load_generation: 0,
        }
    }

    /// Fetches, decodes and starts playing a cursor.
    ///
    /// Returns false on failure, in which case the previously presented
    /// cursor is left untouched.
    pub fn load(&mut self, url: &str, fetcher: &mut dyn BinaryFetcher, now: f64) -> bool {
        let ticket = self.begin_load(url);
        let fetched = fetcher.fetch(url);
        self.finish_load(ticket, url, fetched, now)
    }

    /// Stops playback, drops the current frames and returns a ticket for the
    /// pending fetch. Any earlier ticket becomes stale.
    pub fn begin_load(&mut self, url: &str) -> LoadTicket {
        self.stop();
        self.frames = FrameSet::default();
        self.step = 0;
        self.load_generation = self.load_generation.wrapping_add(1);
        debug!("cursor: loading {}", url);
        LoadTicket(self.load_generation)
    }

    /// Installs the result of the fetch started by `ticket`.
    ///
    /// Stale tickets are ignored. Fetch and decode failures are logged.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        url: &str,
        fetched: std::result::Result<Vec<u8>, LoadError>,
        now: f64,
    ) -> bool {
        if !self.is_current(ticket) {
            debug!("cursor: discarding superseded load of {}", url);
            return false;
        }
        let decoded = fetched.and_then(|bytes| decode_cursor(&bytes).map_err(LoadError::from));
        match decoded {
            Ok(frames) => {
                info!(
                    "cursor: loaded {} ({} frames, {} steps)",
                    url,
                    frames.frames.len(),
                    frames.len()
                );
                self.start(frames, now);
                true
            }
            Err(e) if e.is_format_error() => {
                warn!("cursor: {} is not a usable cursor file: {}", url, e);
                false
            }
            Err(e) => {
                warn!("cursor: failed to fetch {}: {}", url, e);
                false
            }
        }
    }

    /// Returns true if `ticket` belongs to the most recent load.
    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.0 == self.load_generation
    }

    /// Decodes and plays bytes that are already in memory.
    #[cfg(test)]
    pub fn load_bytes(&mut self, label: &str, bytes: &[u8], now: f64) -> bool {
        let ticket = self.begin_load(label);
        self.finish_load(ticket, label, Ok(bytes.to_vec()), now)
    }

    fn start(&mut self, frames: FrameSet, now: f64) {
        self.frames = frames;
        self.step = 0;
        self.apply();
        if self.frames.is_animated() {
            self.timer.schedule(now + self.delay(0));
        }
    }

    fn delay(&self, step: usize) -> f64 {
        // A zero-tick rate still yields to the host between steps.
        self.frames.delay_ms(step).max(1) as f64
    }

    fn apply(&mut self) {
        if let Some(frame) = self.frames.frame_at(self.step) {
            let hotspot = frame.clamped_hotspot();
            self.presenter.present(frame, hotspot);
        }
    }

    /// Advances playback if the timer is due. Returns true if a new frame
    /// was presented.
    ///
    /// If the host fell behind by more than one full loop, playback resyncs
    /// to `now` instead of replaying the missed steps.
    pub fn poll(&mut self, now: f64) -> bool {
        let Some(mut due) = self.timer.deadline() else {
            return false;
        };
        if now < due {
            return false;
        }

        let len = self.frames.len();
        let mut advanced = 0;
        while due <= now && advanced < len {
            self.step = (self.step + 1) % len;
            due += self.delay(self.step);
            advanced += 1;
        }
        if due <= now {
            due = now + self.delay(self.step);
        }

        self.apply();
        self.timer.schedule(due);
        true
    }

    /// Cancels the pending playback tick. Idempotent.
    pub fn stop(&mut self) {
        self.timer.cancel();
    }

    /// Stops playback, drops all frames and restores the default pointer.
    pub fn destroy(&mut self) {
        self.stop();
        self.frames = FrameSet::default();
        self.step = 0;
        self.load_generation = self.load_generation.wrapping_add(1);
        self.presenter.clear();
    }

    /// Deadline of the next playback tick, in milliseconds.
    pub fn next_deadline(&self) -> Option<f64> {
        self.timer.deadline()
    }

    pub fn is_playing(&self) -> bool {
        self.timer.is_armed()
    }

    /// Current playback step.
    pub fn step(&self) -> usize {
        self.step
    }

    /// The frame shown at the current step.
    pub fn current_frame(&self) -> Option<&DecodedFrame> {
        self.frames.frame_at(self.step)
    }

    pub fn frames(&self) -> &FrameSet {
        &self.frames
    }
}

// ============================================================================
// Tests
// ============================================================================
