//! Queue & playback controller.
//!
//! Single owner of the queue, the listening signals and the playback
//! engine handle. All async entry points take `&self`; shared state sits
//! behind locks so the host, the media-controls adapter and the position
//! monitor can hold one `Arc<PlayerController>`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use thiserror::Error;
use tokio::task::{AbortHandle, JoinHandle};

use crate::history::{RecentHistory, SkipSet, RECENT_HISTORY_CAP};
use crate::models::{TimeOfDay, Track};
use crate::playback::{EndDetector, PlaybackClock, PlaybackState, PlayerEngine};
use crate::providers::ProviderManager;
use crate::queue::{Advance, PlayQueue, QueueError};
use crate::recommendations::{RecommendationContext, RecommendationProvider};

/// How far into a track the previous-button restarts it instead of
/// moving back. Guards against accidental double-back-skips.
const RESTART_THRESHOLD_SECS: f64 = 3.0;

/// How many results to request per autoplay candidate query.
const AUTOPLAY_SEARCH_LIMIT: usize = 5;

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error("Playback engine error: {0}")]
    Engine(String),

    #[error("Search error: {0}")]
    Search(String),

    /// A newer search was issued; this one was aborted.
    #[error("Search superseded by a newer query")]
    Superseded,
}

/// What `next`/`on_track_end` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextOutcome {
    /// Repeat-one: same track restarted.
    Looped,
    /// Cursor moved to this queue index.
    Advanced(usize),
    /// Queue exhausted; see the autoplay outcome.
    Exhausted(AutoplayOutcome),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoplayOutcome {
    /// A recommended track was appended and started.
    Started(Track),
    /// Every candidate search came up empty. Queue untouched.
    NoRecommendation,
    /// Autoplay is switched off.
    Disabled,
    /// Another fallback request is already in flight; this one dropped.
    AlreadyPending,
    /// The recommendation provider failed; queue untouched.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviousOutcome {
    /// More than 3 s in: restarted the current track.
    Restarted,
    /// Cursor moved back to this index.
    MovedTo(usize),
    /// Nothing to do (empty queue, nothing playing).
    Idle,
}

/// Clears the single-flight flag on every exit path.
struct PendingGuard(Arc<AtomicBool>);

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct PlayerController {
    queue: RwLock<PlayQueue>,
    state: PlaybackState,
    engine: Arc<dyn PlayerEngine>,
    providers: Arc<ProviderManager>,
    recommender: Arc<dyn RecommendationProvider>,
    history: Mutex<RecentHistory>,
    skips: Mutex<SkipSet>,
    /// Sample of liked tracks, pushed in by the host from its store.
    liked_sample: RwLock<Vec<Track>>,
    autoplay_enabled: AtomicBool,
    /// Single-flight lock for the autoplay fallback. Concurrent triggers
    /// are dropped, not serialized.
    autoplay_pending: Arc<AtomicBool>,
    /// Abort handle of the in-flight search, if any. Last-issued wins.
    search_abort: Mutex<Option<AbortHandle>>,
}

impl PlayerController {
    pub fn new(
        engine: Arc<dyn PlayerEngine>,
        providers: Arc<ProviderManager>,
        recommender: Arc<dyn RecommendationProvider>,
    ) -> Arc<Self> {
        Arc::new(Self {
            queue: RwLock::new(PlayQueue::new()),
            state: PlaybackState::new(),
            engine,
            providers,
            recommender,
            history: Mutex::new(RecentHistory::new()),
            skips: Mutex::new(SkipSet::new()),
            liked_sample: RwLock::new(Vec::new()),
            autoplay_enabled: AtomicBool::new(true),
            autoplay_pending: Arc::new(AtomicBool::new(false)),
            search_abort: Mutex::new(None),
        })
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn set_autoplay(&self, enabled: bool) {
        self.autoplay_enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn set_liked_sample(&self, tracks: Vec<Track>) {
        *self.liked_sample.write() = tracks;
    }

    pub fn queue_snapshot(&self) -> Vec<Track> {
        self.queue.read().tracks().to_vec()
    }

    pub fn queue_cursor(&self) -> Option<usize> {
        self.queue.read().cursor()
    }

    pub fn toggle_shuffle(&self) {
        self.queue.write().toggle_shuffle();
    }

    pub fn cycle_repeat(&self) {
        self.queue.write().cycle_repeat();
    }

    // --- playback entry points -------------------------------------------

    /// Play a track ad hoc, without touching the queue.
    pub async fn play_now(&self, track: Track) -> Result<(), PlayerError> {
        self.load_track(track).await
    }

    /// Append to the queue, jump the cursor to it, start playback. The
    /// policy for search-result and companion-suggestion taps.
    pub async fn play_now_and_enqueue(&self, track: Track) -> Result<(), PlayerError> {
        self.queue.write().add_and_jump(track.clone());
        self.load_track(track).await
    }

    pub fn add_to_queue(&self, track: Track) {
        self.queue.write().add(track);
    }

    pub fn add_all_to_queue(&self, tracks: Vec<Track>) {
        self.queue.write().add_all(tracks);
    }

    /// Remove a queue entry. When the active entry is removed, the next
    /// track inherits its slot and starts; an emptied queue stops
    /// queue-driven playback (ad-hoc playback is left alone).
    pub async fn remove_from_queue(&self, index: usize) -> Result<(), PlayerError> {
        let (displaced, successor) = {
            let mut queue = self.queue.write();
            let removal = queue.remove(index)?;
            (removal.displaced_active, queue.current().cloned())
        };

        if displaced {
            match successor {
                Some(track) => self.load_track(track).await?,
                None => {
                    log::info!("Active track removed and queue empty; stopping");
                    self.pause().await?;
                    self.state.set_current_track(None);
                }
            }
        }
        Ok(())
    }

    pub fn reorder_queue(&self, from: usize, to: usize) -> Result<(), PlayerError> {
        self.queue.write().reorder(from, to)?;
        Ok(())
    }

    /// Empty the queue without stopping current playback.
    pub fn clear_queue(&self) {
        self.queue.write().clear();
    }

    pub async fn jump_to(&self, index: usize) -> Result<(), PlayerError> {
        let track = {
            let mut queue = self.queue.write();
            queue.jump_to(index)?.clone()
        };
        self.load_track(track).await
    }

    /// Advance to the next track. `manual` marks a user-initiated skip,
    /// which records the departed track as a negative signal.
    pub async fn next(&self, manual: bool) -> Result<NextOutcome, PlayerError> {
        if manual {
            if let Some(current) = self.state.current_track() {
                self.skips.lock().record(&current.id);
            }
        }

        let advance = self.queue.write().advance();
        match advance {
            Advance::RepeatCurrent => {
                self.engine_call(self.engine.seek(0.0)).await?;
                self.engine_call(self.engine.play()).await?;
                Ok(NextOutcome::Looped)
            }
            Advance::Next(index) => {
                let track = self
                    .queue
                    .read()
                    .current()
                    .cloned()
                    .ok_or_else(|| PlayerError::Engine("queue cursor vanished".to_string()))?;
                self.load_track(track).await?;
                Ok(NextOutcome::Advanced(index))
            }
            Advance::Wrapped => {
                let track = self
                    .queue
                    .read()
                    .current()
                    .cloned()
                    .ok_or_else(|| PlayerError::Engine("queue cursor vanished".to_string()))?;
                self.load_track(track).await?;
                Ok(NextOutcome::Advanced(0))
            }
            Advance::Exhausted => {
                log::debug!("Queue exhausted");
                let outcome = if self.autoplay_enabled.load(Ordering::Relaxed) {
                    self.autoplay_fallback().await
                } else {
                    AutoplayOutcome::Disabled
                };
                Ok(NextOutcome::Exhausted(outcome))
            }
        }
    }

    /// Previous-button semantics: restart when more than 3 s in,
    /// otherwise step back (wrapping under repeat-all).
    pub async fn previous(&self) -> Result<PreviousOutcome, PlayerError> {
        if self.state.position_secs() > RESTART_THRESHOLD_SECS {
            self.engine_call(self.engine.seek(0.0)).await?;
            self.state.set_position_secs(0.0);
            return Ok(PreviousOutcome::Restarted);
        }

        let (index, track) = {
            let mut queue = self.queue.write();
            match queue.retreat() {
                Some(index) => (index, queue.current().cloned()),
                None => return Ok(PreviousOutcome::Idle),
            }
        };

        match track {
            Some(track) => {
                self.load_track(track).await?;
                Ok(PreviousOutcome::MovedTo(index))
            }
            None => Ok(PreviousOutcome::Idle),
        }
    }

    /// Track-end dispatch; same decision table as `next(false)`.
    pub async fn on_track_end(&self) -> Result<NextOutcome, PlayerError> {
        self.next(false).await
    }

    pub async fn play(&self) -> Result<(), PlayerError> {
        self.engine_call(self.engine.play()).await?;
        self.state.is_playing.store(true, Ordering::Relaxed);
        Ok(())
    }

    pub async fn pause(&self) -> Result<(), PlayerError> {
        self.engine_call(self.engine.pause()).await?;
        self.state.is_playing.store(false, Ordering::Relaxed);
        Ok(())
    }

    pub async fn toggle_play(&self) -> Result<(), PlayerError> {
        if self.state.is_playing.load(Ordering::Relaxed) {
            self.pause().await
        } else {
            self.play().await
        }
    }

    pub async fn seek(&self, seconds: f64) -> Result<(), PlayerError> {
        self.engine_call(self.engine.seek(seconds)).await?;
        self.state.set_position_secs(seconds);
        Ok(())
    }

    pub async fn set_volume(&self, volume: u32) -> Result<(), PlayerError> {
        let volume = volume.min(100);
        self.engine_call(self.engine.set_volume(volume)).await?;
        self.state.set_volume(volume);
        Ok(())
    }

    /// The engine finished initializing. Applies any track that was
    /// requested during the readiness gap.
    pub async fn on_engine_ready(&self) -> Result<(), PlayerError> {
        self.state.is_ready.store(true, Ordering::SeqCst);
        if let Some(pending) = self.state.take_pending_track() {
            log::info!("Engine ready; loading pending track '{}'", pending.title);
            self.load_track(pending).await?;
        }
        Ok(())
    }

    // --- search ----------------------------------------------------------

    /// Search via the active provider. A new call aborts the previous
    /// in-flight one, so the last-issued query's results always win; the
    /// superseded caller gets `PlayerError::Superseded`.
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<Track>, PlayerError> {
        let task: JoinHandle<anyhow::Result<Vec<Track>>> = tokio::spawn({
            let providers = self.providers.clone();
            let query = query.to_string();
            async move { providers.search(&query, limit).await }
        });

        let previous = self.search_abort.lock().replace(task.abort_handle());
        if let Some(previous) = previous {
            previous.abort();
        }

        match task.await {
            Ok(result) => result.map_err(|e| PlayerError::Search(e.to_string())),
            Err(e) if e.is_cancelled() => Err(PlayerError::Superseded),
            Err(e) => Err(PlayerError::Search(e.to_string())),
        }
    }

    // --- internals -------------------------------------------------------

    async fn load_track(&self, track: Track) -> Result<(), PlayerError> {
        self.state.set_current_track(Some(track.clone()));
        if track.duration > 0 {
            self.state.set_duration_secs(track.duration as f64);
        }
        self.state.set_position_secs(0.0);

        if !self.state.is_ready.load(Ordering::SeqCst) {
            log::debug!("Engine not ready; holding '{}' as pending", track.title);
            self.state.set_pending_track(track);
            return Ok(());
        }

        self.engine_call(self.engine.load(&track.video_id)).await?;
        self.engine_call(self.engine.play()).await?;
        self.state.is_playing.store(true, Ordering::Relaxed);
        self.history.lock().push(track);
        Ok(())
    }

    fn recommendation_context(&self) -> RecommendationContext {
        RecommendationContext {
            current_track: self.state.current_track(),
            recent_tracks: {
                let tracks = self.history.lock().tracks();
                tracks.into_iter().take(RECENT_HISTORY_CAP).collect()
            },
            liked_tracks: self.liked_sample.read().clone(),
            skipped_ids: self.skips.lock().ids(),
            time_of_day: TimeOfDay::now(),
        }
    }

    /// Ask the recommender for candidate queries and splice the first
    /// usable search hit into the queue. Guarded single-flight.
    async fn autoplay_fallback(&self) -> AutoplayOutcome {
        if self.autoplay_pending.swap(true, Ordering::SeqCst) {
            log::debug!("Autoplay fallback already pending; dropping trigger");
            return AutoplayOutcome::AlreadyPending;
        }
        let _guard = PendingGuard(self.autoplay_pending.clone());

        let ctx = self.recommendation_context();
        let candidates = match self.recommender.recommend(&ctx).await {
            Ok(candidates) => candidates,
            Err(e) => {
                log::warn!("Recommendation provider failed: {}", e);
                return AutoplayOutcome::Failed;
            }
        };

        if candidates.is_empty() {
            log::warn!("Recommender returned no candidates");
            return AutoplayOutcome::NoRecommendation;
        }

        let current_id = ctx.current_track.as_ref().map(|t| t.id.clone());

        for candidate in &candidates {
            log::info!(
                "Autoplay candidate '{}' ({})",
                candidate.query,
                candidate.reason
            );

            let results = match self
                .providers
                .search(&candidate.query, AUTOPLAY_SEARCH_LIMIT)
                .await
            {
                Ok(results) => results,
                Err(e) => {
                    log::debug!("Candidate search failed: {}", e);
                    continue;
                }
            };

            let pick = results.into_iter().find(|t| {
                Some(&t.id) != current_id.as_ref() && !self.skips.lock().contains(&t.id)
            });

            if let Some(track) = pick {
                self.queue.write().add_and_jump(track.clone());
                if let Err(e) = self.load_track(track.clone()).await {
                    log::warn!("Autoplay load failed: {}", e);
                    return AutoplayOutcome::Failed;
                }
                return AutoplayOutcome::Started(track);
            }
        }

        log::warn!("No recommendation available: all candidate searches came up empty");
        AutoplayOutcome::NoRecommendation
    }

    async fn engine_call(
        &self,
        call: impl std::future::Future<Output = anyhow::Result<()>>,
    ) -> Result<(), PlayerError> {
        call.await.map_err(|e| PlayerError::Engine(e.to_string()))
    }

    pub fn skipped_ids(&self) -> Vec<String> {
        self.skips.lock().ids()
    }

    pub fn recent_tracks(&self) -> Vec<Track> {
        self.history.lock().tracks()
    }

    /// Spawn the position monitor. Samples the engine once per clock
    /// tick, mirrors into `PlaybackState`, and dispatches track-end. The
    /// loop exits when the controller is dropped or the handle aborted.
    pub fn spawn_monitor(
        self: Arc<Self>,
        clock: Arc<dyn PlaybackClock>,
    ) -> JoinHandle<()> {
        let weak = Arc::downgrade(&self);
        tokio::spawn(async move {
            let mut detector = EndDetector::new();
            loop {
                clock.tick().await;
                let Some(controller) = weak.upgrade() else {
                    break;
                };

                let is_playing = controller.engine.is_playing().await;
                let position = controller.engine.position().await;
                let duration = controller.engine.duration().await;

                controller.state.set_position_secs(position);
                if duration > 0.0 {
                    controller.state.set_duration_secs(duration);
                }
                controller
                    .state
                    .is_playing
                    .store(is_playing, Ordering::Relaxed);

                if detector.observe(is_playing, position, duration) {
                    log::debug!("Track end detected at {:.1}s/{:.1}s", position, duration);
                    if let Err(e) = controller.on_track_end().await {
                        log::warn!("Track-end handling failed: {}", e);
                    }
                    detector.reset();
                }
            }
        })
    }
}
