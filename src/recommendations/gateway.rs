//! LLM chat-gateway recommendation provider.
//!
//! Sends the listening context to an OpenAI-compatible chat endpoint and
//! extracts a JSON array of `{query, reason}` candidates from the reply
//! prose. Unparsable replies degrade to the current-artist fallback
//! rather than failing the autoplay path.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::classifier::primary_artist;
use super::errors::RecommendationError;
use super::types::{Candidate, RecommendationContext, RecommendationProvider};

const DEFAULT_MODEL: &str = "google/gemini-2.5-flash";

const SYSTEM_PROMPT: &str = r#"You are an intelligent music recommendation engine for autoplay. Your job is to pick the NEXT song that feels natural and seamless.

RULES:
1. SAME LANGUAGE: Keep the same language as the current song
2. SAME/SIMILAR GENRE: Match the genre closely
3. SIMILAR MOOD & ENERGY: Don't kill the vibe
4. ARTIST SIMILARITY: Similar artists or commonly liked together
5. NEVER repeat the same song
6. Avoid sudden mood or language changes
7. Keep the flow smooth and emotionally consistent

Consider time of day:
- Morning (6-12): Upbeat, energizing
- Afternoon (12-18): Balanced, productive
- Evening (18-22): Relaxing, chill
- Night (22-6): Calm, peaceful

You MUST respond with ONLY a JSON array of 3 song recommendations (fallback options if first fails):
[{"query": "Artist - Song Title", "reason": "brief reason"}, ...]

The query should be formatted as "Artist - Song Title" for YouTube search."#;

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: String,
}

pub struct GatewayRecommender {
    client: Client,
    gateway_url: String,
    api_key: String,
    model: String,
}

impl GatewayRecommender {
    pub fn new(gateway_url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            gateway_url,
            api_key,
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    fn build_user_message(ctx: &RecommendationContext) -> String {
        let (title, artist) = match ctx.current_track {
            Some(ref t) => (t.title.as_str(), t.artist.as_str()),
            None => ("Unknown", "Unknown"),
        };

        let recent = if ctx.recent_tracks.is_empty() {
            "No history".to_string()
        } else {
            ctx.recent_tracks
                .iter()
                .take(5)
                .map(|t| format!("- {} by {}", t.title, t.artist))
                .collect::<Vec<_>>()
                .join("\n")
        };

        let liked = if ctx.liked_tracks.is_empty() {
            "No likes".to_string()
        } else {
            ctx.liked_tracks
                .iter()
                .take(5)
                .map(|t| format!("- {}", t.title))
                .collect::<Vec<_>>()
                .join("\n")
        };

        format!(
            "Current song just ended:\nTitle: {}\nArtist: {}\n\n\
             Recent listening history (last 5 songs):\n{}\n\n\
             Liked songs (sample):\n{}\n\n\
             Time of day: {}\n\n\
             Pick the next song that keeps the vibe going!",
            title,
            artist,
            recent,
            liked,
            ctx.time_of_day.as_str()
        )
    }

    /// Fallback when the reply can't be parsed: stay with the current
    /// artist rather than going silent.
    fn artist_fallback(ctx: &RecommendationContext) -> Vec<Candidate> {
        match ctx.current_track {
            Some(ref track) => vec![Candidate {
                query: format!("{} popular songs", primary_artist(&track.artist)),
                reason: "Similar artist".to_string(),
            }],
            None => vec![],
        }
    }
}

/// First JSON array embedded in free-form text, greedily bracketed the
/// way the reply contract promises.
pub(crate) fn extract_json_array(content: &str) -> Option<&str> {
    let start = content.find('[')?;
    let end = content.rfind(']')?;
    if end <= start {
        return None;
    }
    Some(&content[start..=end])
}

#[async_trait]
impl RecommendationProvider for GatewayRecommender {
    fn id(&self) -> &str {
        "gateway"
    }

    async fn recommend(
        &self,
        ctx: &RecommendationContext,
    ) -> Result<Vec<Candidate>, RecommendationError> {
        if self.api_key.is_empty() {
            return Err(RecommendationError::Config(
                "Gateway API key not configured".to_string(),
            ));
        }

        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": Self::build_user_message(ctx) }
            ],
        });

        let resp = self
            .client
            .post(&self.gateway_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        match resp.status().as_u16() {
            429 => return Err(RecommendationError::RateLimited),
            402 => return Err(RecommendationError::CreditsExhausted),
            status if status >= 400 => {
                let text = resp.text().await.unwrap_or_default();
                log::error!("AI gateway error: {} {}", status, text);
                return Err(RecommendationError::Gateway(format!("status {}", status)));
            }
            _ => {}
        }

        let data: ChatResponse = resp.json().await?;
        let content = data
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();

        log::debug!("Gateway autoplay response: {:.300}", content);

        let candidates = extract_json_array(&content)
            .and_then(|raw| serde_json::from_str::<Vec<Candidate>>(raw).ok())
            .unwrap_or_default();

        if candidates.is_empty() {
            log::warn!("Gateway reply had no parsable recommendations");
            return Ok(Self::artist_fallback(ctx));
        }

        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TimeOfDay, Track};

    fn ctx() -> RecommendationContext {
        RecommendationContext {
            current_track: Some(Track::ad_hoc("v1", Some("Vienna"), Some("Billy Joel"))),
            recent_tracks: vec![],
            liked_tracks: vec![],
            skipped_ids: vec![],
            time_of_day: TimeOfDay::Evening,
        }
    }

    #[test]
    fn extracts_array_from_prose() {
        let content = "Sure! Here you go:\n[{\"query\": \"A - B\", \"reason\": \"vibe\"}]\nEnjoy!";
        let raw = extract_json_array(content).unwrap();
        let parsed: Vec<Candidate> = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed[0].query, "A - B");
    }

    #[test]
    fn no_array_means_none() {
        assert!(extract_json_array("no json here").is_none());
        assert!(extract_json_array("] backwards [").is_none());
    }

    #[test]
    fn user_message_carries_context() {
        let message = GatewayRecommender::build_user_message(&ctx());
        assert!(message.contains("Vienna"));
        assert!(message.contains("Billy Joel"));
        assert!(message.contains("Time of day: evening"));
        assert!(message.contains("No history"));
    }

    #[test]
    fn artist_fallback_uses_primary_artist() {
        let fallback = GatewayRecommender::artist_fallback(&ctx());
        assert_eq!(fallback[0].query, "Billy Joel popular songs");
    }
}
