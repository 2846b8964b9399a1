use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::models::Track;
use crate::providers::traits::TrackSearchProvider;
use crate::providers::types::ProviderId;

use super::models::{JamendoTrack, TracksResponse};

const DEFAULT_BASE_URL: &str = "https://api.jamendo.com/v3.0";

pub struct JamendoProvider {
    client: Client,
    base_url: String,
    client_id: String,
    initialized: bool,
}

impl Default for JamendoProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl JamendoProvider {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client_id: String::new(),
            initialized: false,
        }
    }

    pub fn with_config(client_id: String) -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client_id,
            initialized: true,
        }
    }

    fn track_from_result(result: JamendoTrack) -> Track {
        let id = result.id_string();
        let thumbnail = result
            .album_image
            .clone()
            .filter(|url| !url.is_empty())
            .or_else(|| result.image.clone())
            .unwrap_or_default();
        Track {
            id: format!("jamendo:{}", id),
            video_id: id,
            title: result.name,
            artist: result.artist_name,
            thumbnail,
            duration: result.duration,
            source: ProviderId::Jamendo,
        }
    }

    async fn fetch_tracks(&self, params: &str) -> Result<Vec<Track>> {
        let url = format!(
            "{}/tracks/?client_id={}&format=json&include=musicinfo&audioformat=mp32&{}",
            self.base_url, self.client_id, params
        );

        let resp: TracksResponse = self.client.get(&url).send().await?.json().await?;

        if resp.headers.status != "success" {
            let message = resp
                .headers
                .error_message
                .unwrap_or_else(|| "Search failed".to_string());
            return Err(anyhow!("Jamendo API error: {}", message));
        }

        Ok(resp
            .results
            .into_iter()
            .map(Self::track_from_result)
            .collect())
    }
}

#[async_trait]
impl TrackSearchProvider for JamendoProvider {
    fn id(&self) -> &str {
        "jamendo"
    }

    fn name(&self) -> &str {
        "Jamendo"
    }

    async fn initialize(&mut self, config: Value) -> Result<()> {
        self.client_id = config
            .get("client_id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow!("Missing client_id"))?
            .to_string();

        if let Some(base_url) = config.get("base_url").and_then(|v| v.as_str()) {
            self.base_url = base_url.trim_end_matches('/').to_string();
        }

        self.initialized = true;
        Ok(())
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Track>> {
        if !self.initialized {
            return Err(anyhow!("Jamendo provider not initialized"));
        }

        log::debug!("Searching Jamendo for: {}", query);
        self.fetch_tracks(&format!(
            "limit={}&search={}",
            limit,
            urlencoding::encode(query)
        ))
        .await
    }

    async fn get_track(&self, video_id: &str) -> Result<Option<Track>> {
        if !self.initialized {
            return Err(anyhow!("Jamendo provider not initialized"));
        }

        let tracks = self
            .fetch_tracks(&format!("id={}", urlencoding::encode(video_id)))
            .await?;
        Ok(tracks.into_iter().next())
    }

    /// Jamendo's weekly popularity feed.
    async fn trending(&self, limit: usize) -> Result<Vec<Track>> {
        if !self.initialized {
            return Err(anyhow!("Jamendo provider not initialized"));
        }

        log::debug!("Fetching trending Jamendo tracks");
        self.fetch_tracks(&format!("limit={}&order=popularity_week", limit))
            .await
    }
}
