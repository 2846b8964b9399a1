//! Data types for the recommendation system.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::{TimeOfDay, Track};

use super::errors::RecommendationError;

/// One candidate next-track search, ordered best first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Search query, formatted "Artist - Song Title" where possible.
    pub query: String,
    /// Human-readable reason, surfaced in the UI.
    #[serde(default)]
    pub reason: String,
}

/// Everything the recommender may consider. All inputs are advisory;
/// none is required to be present.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationContext {
    pub current_track: Option<Track>,
    /// Most recent plays, newest first, already bounded by the caller.
    pub recent_tracks: Vec<Track>,
    /// Sample of liked tracks.
    pub liked_tracks: Vec<Track>,
    /// Ids the user actively skipped; a negative signal.
    pub skipped_ids: Vec<String>,
    pub time_of_day: TimeOfDay,
}

impl RecommendationContext {
    pub fn is_skipped(&self, track_id: &str) -> bool {
        self.skipped_ids.iter().any(|id| id == track_id)
    }
}

#[async_trait]
pub trait RecommendationProvider: Send + Sync {
    fn id(&self) -> &str;

    /// Ranked candidate queries, best first. An empty list means "no
    /// recommendation available" and is not an error.
    async fn recommend(
        &self,
        ctx: &RecommendationContext,
    ) -> Result<Vec<Candidate>, RecommendationError>;
}
