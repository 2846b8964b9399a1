//! Playback engine abstraction.
//!
//! The actual player is embedded by the host (an iframe player, a native
//! pipeline). This module owns the shared state the rest of the crate
//! reads, the readiness gap (tracks requested before the engine is up are
//! held as pending), and end-of-track detection over polled position.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::RwLock;

use crate::models::Track;

/// Position poll cadence when the engine exposes no "ended" event.
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Tolerance for polling granularity when declaring a track ended.
pub const TRACK_END_SLACK_SECS: f64 = 1.0;

pub const DEFAULT_VOLUME: u32 = 70;

/// Host-embedded player. Implementations forward to the real engine;
/// tests substitute a scripted double.
#[async_trait]
pub trait PlayerEngine: Send + Sync {
    async fn load(&self, video_id: &str) -> Result<()>;
    async fn play(&self) -> Result<()>;
    async fn pause(&self) -> Result<()>;
    async fn seek(&self, seconds: f64) -> Result<()>;
    /// Volume in 0..=100.
    async fn set_volume(&self, volume: u32) -> Result<()>;
    async fn position(&self) -> f64;
    async fn duration(&self) -> f64;
    async fn is_playing(&self) -> bool;
}

/// Waits one poll period. Behind a trait so tests drive ticks manually
/// instead of sleeping.
#[async_trait]
pub trait PlaybackClock: Send + Sync {
    async fn tick(&self);
}

pub struct IntervalClock {
    period: Duration,
}

impl IntervalClock {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }
}

impl Default for IntervalClock {
    fn default() -> Self {
        Self::new(POLL_INTERVAL)
    }
}

#[async_trait]
impl PlaybackClock for IntervalClock {
    async fn tick(&self) {
        tokio::time::sleep(self.period).await;
    }
}

/// Transient playback state, shared across the controller, the poll task
/// and the media-controls adapter. Not persisted.
#[derive(Clone)]
pub struct PlaybackState {
    pub is_ready: Arc<AtomicBool>,
    pub is_playing: Arc<AtomicBool>,
    position_bits: Arc<AtomicU64>,
    duration_bits: Arc<AtomicU64>,
    volume: Arc<AtomicU32>,
    current_track: Arc<RwLock<Option<Track>>>,
    /// Track requested before the engine reported ready; applied on the
    /// ready notification.
    pending_track: Arc<RwLock<Option<Track>>>,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackState {
    pub fn new() -> Self {
        Self {
            is_ready: Arc::new(AtomicBool::new(false)),
            is_playing: Arc::new(AtomicBool::new(false)),
            position_bits: Arc::new(AtomicU64::new(0f64.to_bits())),
            duration_bits: Arc::new(AtomicU64::new(0f64.to_bits())),
            volume: Arc::new(AtomicU32::new(DEFAULT_VOLUME)),
            current_track: Arc::new(RwLock::new(None)),
            pending_track: Arc::new(RwLock::new(None)),
        }
    }

    pub fn position_secs(&self) -> f64 {
        f64::from_bits(self.position_bits.load(Ordering::Relaxed))
    }

    pub fn set_position_secs(&self, secs: f64) {
        self.position_bits.store(secs.to_bits(), Ordering::Relaxed);
    }

    pub fn duration_secs(&self) -> f64 {
        f64::from_bits(self.duration_bits.load(Ordering::Relaxed))
    }

    pub fn set_duration_secs(&self, secs: f64) {
        self.duration_bits.store(secs.to_bits(), Ordering::Relaxed);
    }

    pub fn volume(&self) -> u32 {
        self.volume.load(Ordering::Relaxed)
    }

    pub fn set_volume(&self, volume: u32) {
        self.volume.store(volume.min(100), Ordering::Relaxed);
    }

    pub fn current_track(&self) -> Option<Track> {
        self.current_track.read().clone()
    }

    pub fn set_current_track(&self, track: Option<Track>) {
        *self.current_track.write() = track;
    }

    pub fn take_pending_track(&self) -> Option<Track> {
        self.pending_track.write().take()
    }

    pub fn set_pending_track(&self, track: Track) {
        *self.pending_track.write() = Some(track);
    }
}

/// Declares "track ended" on a playing -> not-playing transition observed
/// within `TRACK_END_SLACK_SECS` of the end. Pure: fed one sample per
/// poll tick, no timers of its own. A native "ended" event from the
/// engine should be preferred when available; this is the fallback.
#[derive(Debug, Default)]
pub struct EndDetector {
    was_playing: bool,
}

impl EndDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, is_playing: bool, position: f64, duration: f64) -> bool {
        let ended = self.was_playing
            && !is_playing
            && duration > 0.0
            && position >= duration - TRACK_END_SLACK_SECS;
        self.was_playing = is_playing;
        ended
    }

    /// Forget the playing flag, e.g. after an explicit stop or load, so a
    /// pause near the end of the previous track is not misread as an end.
    pub fn reset(&mut self) {
        self.was_playing = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_end_at_duration_boundary() {
        let mut detector = EndDetector::new();
        assert!(!detector.observe(true, 178.6, 180.0));
        // stopped within the 1s slack of the end
        assert!(detector.observe(false, 179.2, 180.0));
    }

    #[test]
    fn pause_mid_track_is_not_an_end() {
        let mut detector = EndDetector::new();
        detector.observe(true, 42.0, 180.0);
        assert!(!detector.observe(false, 42.5, 180.0));
    }

    #[test]
    fn requires_a_playing_to_stopped_transition() {
        let mut detector = EndDetector::new();
        // never saw it playing
        assert!(!detector.observe(false, 179.5, 180.0));
    }

    #[test]
    fn unknown_duration_never_ends() {
        let mut detector = EndDetector::new();
        detector.observe(true, 10.0, 0.0);
        assert!(!detector.observe(false, 10.5, 0.0));
    }

    #[test]
    fn reset_clears_transition_state() {
        let mut detector = EndDetector::new();
        detector.observe(true, 179.0, 180.0);
        detector.reset();
        assert!(!detector.observe(false, 179.5, 180.0));
    }

    #[test]
    fn volume_clamps_to_100() {
        let state = PlaybackState::new();
        state.set_volume(250);
        assert_eq!(state.volume(), 100);
    }

    #[test]
    fn pending_track_is_taken_once() {
        let state = PlaybackState::new();
        state.set_pending_track(Track::ad_hoc("abc", None, None));
        assert!(state.take_pending_track().is_some());
        assert!(state.take_pending_track().is_none());
    }
}
