//! Playback core for the Caffeine streaming music client.
//!
//! Owns the queue/playback state machine, the autoplay fallback, the
//! track search providers and the OS media-controls adapter. The host
//! shell supplies the actual playback engine (behind [`playback::PlayerEngine`])
//! and renders state; nothing here draws UI or persists data.

pub mod companion;
pub mod history;
pub mod jamendo;
pub mod media_controls;
pub mod models;
pub mod playback;
pub mod player;
pub mod providers;
pub mod queue;
pub mod recommendations;
pub mod youtube;

pub use models::{TimeOfDay, Track};
pub use player::{
    AutoplayOutcome, NextOutcome, PlayerController, PlayerError, PreviousOutcome,
};
pub use queue::{PlayQueue, QueueError, RepeatMode};

/// Wire up env_logger for host shells that don't bring their own
/// logging setup. Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .try_init();
}
