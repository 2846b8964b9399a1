//! OS media-controls adapter (MPRIS on Linux, SMTC on Windows).
//!
//! Mirrors `PlaybackState` into the system now-playing surface and
//! routes host-originated control events back into the controller's
//! public operations. No independent logic lives here.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use souvlaki::{
    MediaControlEvent, MediaControls, MediaMetadata, MediaPlayback, MediaPosition,
    PlatformConfig, SeekDirection,
};

use crate::playback::PlaybackState;
use crate::player::PlayerController;

/// Step for the seek-forward/backward hardware keys.
const SEEK_STEP_SECS: f64 = 10.0;

#[derive(Default)]
struct CachedMetadata {
    title: String,
    artist: String,
    cover_url: Option<String>,
    duration_secs: f64,
}

pub struct MediaControlsManager {
    controls: RwLock<Option<MediaControls>>,
    metadata: RwLock<CachedMetadata>,
}

unsafe impl Send for MediaControlsManager {}
unsafe impl Sync for MediaControlsManager {}

impl Default for MediaControlsManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaControlsManager {
    #[cfg(not(target_os = "windows"))]
    pub fn new() -> Self {
        let config = PlatformConfig {
            dbus_name: "caffeine",
            display_name: "Caffeine Music",
            hwnd: None,
        };

        let controls = MediaControls::new(config).ok();
        Self {
            controls: RwLock::new(controls),
            metadata: RwLock::new(CachedMetadata::default()),
        }
    }

    // Windows needs a window handle; see init_with_hwnd
    #[cfg(target_os = "windows")]
    pub fn new() -> Self {
        Self {
            controls: RwLock::new(None),
            metadata: RwLock::new(CachedMetadata::default()),
        }
    }

    #[cfg(target_os = "windows")]
    pub fn init_with_hwnd(&self, hwnd: *mut std::ffi::c_void) {
        let config = PlatformConfig {
            dbus_name: "caffeine",
            display_name: "Caffeine Music",
            hwnd: Some(hwnd),
        };

        if let Ok(controls) = MediaControls::new(config) {
            *self.controls.write() = Some(controls);
        }
    }

    /// Route system media keys into the controller. Events arrive on
    /// souvlaki's callback thread; operations are spawned onto the
    /// runtime this is called from.
    pub fn attach_controller(&self, controller: Arc<PlayerController>) {
        let runtime = tokio::runtime::Handle::current();

        self.attach_handler(move |event| {
            let controller = controller.clone();
            match event {
                MediaControlEvent::Play => {
                    runtime.spawn(async move {
                        if let Err(e) = controller.play().await {
                            log::warn!("Media-key play failed: {}", e);
                        }
                    });
                }
                MediaControlEvent::Pause => {
                    runtime.spawn(async move {
                        if let Err(e) = controller.pause().await {
                            log::warn!("Media-key pause failed: {}", e);
                        }
                    });
                }
                MediaControlEvent::Toggle => {
                    runtime.spawn(async move {
                        if let Err(e) = controller.toggle_play().await {
                            log::warn!("Media-key toggle failed: {}", e);
                        }
                    });
                }
                MediaControlEvent::Next => {
                    runtime.spawn(async move {
                        if let Err(e) = controller.next(true).await {
                            log::warn!("Media-key next failed: {}", e);
                        }
                    });
                }
                MediaControlEvent::Previous => {
                    runtime.spawn(async move {
                        if let Err(e) = controller.previous().await {
                            log::warn!("Media-key previous failed: {}", e);
                        }
                    });
                }
                MediaControlEvent::Seek(direction) => {
                    runtime.spawn(async move {
                        let position = controller.state().position_secs();
                        let target = match direction {
                            SeekDirection::Forward => position + SEEK_STEP_SECS,
                            SeekDirection::Backward => (position - SEEK_STEP_SECS).max(0.0),
                        };
                        if let Err(e) = controller.seek(target).await {
                            log::warn!("Media-key seek failed: {}", e);
                        }
                    });
                }
                MediaControlEvent::SetPosition(position) => {
                    runtime.spawn(async move {
                        if let Err(e) = controller.seek(position.0.as_secs_f64()).await {
                            log::warn!("Media-key set-position failed: {}", e);
                        }
                    });
                }
                MediaControlEvent::Stop => {
                    runtime.spawn(async move {
                        if let Err(e) = controller.pause().await {
                            log::warn!("Media-key stop failed: {}", e);
                        }
                    });
                }
                _ => {}
            }
        });
    }

    pub fn attach_handler<F>(&self, handler: F)
    where
        F: Fn(MediaControlEvent) + Send + 'static,
    {
        if let Some(ref mut controls) = *self.controls.write() {
            let _ = controls.attach(handler);
        }
    }

    /// Mirror the shared playback state into the now-playing display.
    pub fn sync(&self, state: &PlaybackState) {
        match state.current_track() {
            Some(track) => {
                self.set_metadata(
                    &track.title,
                    &track.artist,
                    Some(&track.thumbnail),
                    state.duration_secs(),
                );
                self.set_playback(
                    state.is_playing.load(std::sync::atomic::Ordering::Relaxed),
                    Some(state.position_secs()),
                );
            }
            None => self.set_stopped(),
        }
    }

    pub fn set_metadata(
        &self,
        title: &str,
        artist: &str,
        cover_url: Option<&str>,
        duration_secs: f64,
    ) {
        {
            let mut cached = self.metadata.write();
            cached.title = title.to_string();
            cached.artist = artist.to_string();
            cached.cover_url = cover_url
                .filter(|url| !url.is_empty())
                .map(|url| url.to_string());
            cached.duration_secs = duration_secs;
        }

        self.apply_metadata();
    }

    fn apply_metadata(&self) {
        if let Some(ref mut controls) = *self.controls.write() {
            let cached = self.metadata.read();

            let duration = if cached.duration_secs > 0.0 {
                Some(Duration::from_secs_f64(cached.duration_secs))
            } else {
                None
            };

            let _ = controls.set_metadata(MediaMetadata {
                title: Some(&cached.title),
                artist: Some(&cached.artist),
                album: Some("Caffeine Music"),
                cover_url: cached.cover_url.as_deref(),
                duration,
            });
        }
    }

    pub fn set_playback(&self, playing: bool, position_secs: Option<f64>) {
        if let Some(ref mut controls) = *self.controls.write() {
            let progress =
                position_secs.map(|secs| MediaPosition(Duration::from_secs_f64(secs)));

            let playback = if playing {
                MediaPlayback::Playing { progress }
            } else {
                MediaPlayback::Paused { progress }
            };
            let _ = controls.set_playback(playback);
        }
    }

    pub fn set_stopped(&self) {
        if let Some(ref mut controls) = *self.controls.write() {
            let _ = controls.set_playback(MediaPlayback::Stopped);
        }
    }
}
