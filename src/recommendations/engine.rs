//! Local heuristic recommender.
//!
//! Ranks candidate search queries from keyword-classifier signals,
//! liked-artist affinity and the time-of-day bucket, with the skip set
//! as a negative filter on seeds. Runs entirely offline; the gateway
//! provider is the richer alternative when configured.

use async_trait::async_trait;

use crate::models::TimeOfDay;

use super::classifier::{classify, primary_artist};
use super::errors::RecommendationError;
use super::types::{Candidate, RecommendationContext, RecommendationProvider};

/// Upper bound on returned candidates; the player stops at the first
/// query that yields a usable search result anyway.
const MAX_CANDIDATES: usize = 5;

pub struct HeuristicRecommender;

impl Default for HeuristicRecommender {
    fn default() -> Self {
        Self::new()
    }
}

impl HeuristicRecommender {
    pub fn new() -> Self {
        Self
    }

    fn time_flavor(time_of_day: TimeOfDay) -> &'static str {
        match time_of_day {
            TimeOfDay::Morning => "upbeat",
            TimeOfDay::Afternoon => "feel good",
            TimeOfDay::Evening => "relaxing",
            TimeOfDay::Night => "calm",
        }
    }

    fn push_unique(candidates: &mut Vec<Candidate>, query: String, reason: &str) {
        let query = query.trim().to_string();
        if query.is_empty() {
            return;
        }
        if candidates
            .iter()
            .any(|c| c.query.eq_ignore_ascii_case(&query))
        {
            return;
        }
        candidates.push(Candidate {
            query,
            reason: reason.to_string(),
        });
    }
}

#[async_trait]
impl RecommendationProvider for HeuristicRecommender {
    fn id(&self) -> &str {
        "heuristic"
    }

    async fn recommend(
        &self,
        ctx: &RecommendationContext,
    ) -> Result<Vec<Candidate>, RecommendationError> {
        let mut candidates = Vec::new();

        if let Some(ref current) = ctx.current_track {
            let profile = classify(&current.title, &current.artist);

            // Same language + mood keeps the vibe going
            match (profile.language, profile.mood) {
                (Some(language), Some(mood)) => Self::push_unique(
                    &mut candidates,
                    format!("{} {} songs", language.as_str(), mood.as_str()),
                    "Keeps the current vibe",
                ),
                (Some(language), None) => Self::push_unique(
                    &mut candidates,
                    format!(
                        "{} {} songs",
                        language.as_str(),
                        Self::time_flavor(ctx.time_of_day)
                    ),
                    "Same language for this time of day",
                ),
                (None, Some(mood)) => Self::push_unique(
                    &mut candidates,
                    format!("{} songs", mood.as_str()),
                    "Matches the mood",
                ),
                (None, None) => {}
            }

            if let Some(genre) = profile.genre {
                let query = match profile.language {
                    Some(language) => format!("{} {} hits", language.as_str(), genre.as_str()),
                    None => format!("{} hits", genre.as_str()),
                };
                Self::push_unique(&mut candidates, query, "Same genre");
            }
        }

        let current_artist = ctx
            .current_track
            .as_ref()
            .map(|t| primary_artist(&t.artist).to_lowercase());

        // Liked-artist affinity, skipping negatively-signalled seeds
        for liked in &ctx.liked_tracks {
            if ctx.is_skipped(&liked.id) {
                continue;
            }
            let artist = primary_artist(&liked.artist);
            if Some(artist.to_lowercase()) == current_artist {
                continue;
            }
            Self::push_unique(
                &mut candidates,
                format!("{} songs", artist),
                "More from artists you like",
            );
            break;
        }

        // Recently heard artist, for variety
        for recent in &ctx.recent_tracks {
            if ctx.is_skipped(&recent.id) {
                continue;
            }
            let artist = primary_artist(&recent.artist);
            if Some(artist.to_lowercase()) == current_artist {
                continue;
            }
            Self::push_unique(
                &mut candidates,
                format!("{} best songs", artist),
                "Because you listened recently",
            );
            break;
        }

        // Floor: the current artist's catalogue always yields something
        if let Some(ref current) = ctx.current_track {
            Self::push_unique(
                &mut candidates,
                format!("{} popular songs", primary_artist(&current.artist)),
                "Similar artist",
            );
        }

        candidates.truncate(MAX_CANDIDATES);
        log::debug!("Heuristic recommender produced {} candidates", candidates.len());
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Track;
    use crate::providers::ProviderId;

    fn track(id: &str, title: &str, artist: &str) -> Track {
        Track {
            id: id.to_string(),
            video_id: id.to_string(),
            title: title.to_string(),
            artist: artist.to_string(),
            thumbnail: String::new(),
            duration: 200,
            source: ProviderId::Youtube,
        }
    }

    fn ctx_with_current(title: &str, artist: &str) -> RecommendationContext {
        RecommendationContext {
            current_track: Some(track("cur", title, artist)),
            recent_tracks: vec![],
            liked_tracks: vec![],
            skipped_ids: vec![],
            time_of_day: TimeOfDay::Afternoon,
        }
    }

    #[tokio::test]
    async fn always_offers_the_artist_floor() {
        let rec = HeuristicRecommender::new();
        let candidates = rec
            .recommend(&ctx_with_current("Untitled 7", "Some Artist"))
            .await
            .unwrap();
        assert!(!candidates.is_empty());
        assert!(candidates
            .iter()
            .any(|c| c.query == "Some Artist popular songs"));
    }

    #[tokio::test]
    async fn vibe_candidate_ranks_first_when_classified() {
        let rec = HeuristicRecommender::new();
        let candidates = rec
            .recommend(&ctx_with_current("Kadhal Anthem (Tamil)", "Anirudh"))
            .await
            .unwrap();
        assert_eq!(candidates[0].query, "tamil romantic songs");
    }

    #[tokio::test]
    async fn skipped_seeds_are_ignored() {
        let rec = HeuristicRecommender::new();
        let mut ctx = ctx_with_current("Song", "Current Artist");
        ctx.liked_tracks = vec![
            track("liked-1", "Liked One", "Skipped Artist"),
            track("liked-2", "Liked Two", "Kept Artist"),
        ];
        ctx.skipped_ids = vec!["liked-1".to_string()];

        let candidates = rec.recommend(&ctx).await.unwrap();
        assert!(candidates.iter().any(|c| c.query == "Kept Artist songs"));
        assert!(!candidates.iter().any(|c| c.query.contains("Skipped Artist")));
    }

    #[tokio::test]
    async fn empty_context_yields_no_candidates() {
        let rec = HeuristicRecommender::new();
        let ctx = RecommendationContext {
            current_track: None,
            recent_tracks: vec![],
            liked_tracks: vec![],
            skipped_ids: vec![],
            time_of_day: TimeOfDay::Night,
        };
        assert!(rec.recommend(&ctx).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn queries_are_deduplicated_and_capped() {
        let rec = HeuristicRecommender::new();
        let mut ctx = ctx_with_current("Party Dance Mix", "DJ One");
        ctx.liked_tracks = (0..10)
            .map(|i| track(&format!("l{}", i), "T", &format!("Artist {}", i)))
            .collect();
        ctx.recent_tracks = ctx.liked_tracks.clone();

        let candidates = rec.recommend(&ctx).await.unwrap();
        assert!(candidates.len() <= MAX_CANDIDATES);
        for (i, a) in candidates.iter().enumerate() {
            for b in &candidates[i + 1..] {
                assert_ne!(a.query.to_lowercase(), b.query.to_lowercase());
            }
        }
    }
}
