use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::models::Track;
use crate::providers::traits::TrackSearchProvider;
use crate::providers::types::ProviderId;

use super::models::{parse_iso8601_duration, SearchListResponse, Video, VideoListResponse};

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Music category id on YouTube; searches are scoped to it.
const MUSIC_CATEGORY_ID: &str = "10";

pub struct YouTubeProvider {
    client: Client,
    base_url: String,
    api_key: String,
    initialized: bool,
}

impl Default for YouTubeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl YouTubeProvider {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            initialized: false,
        }
    }

    pub fn with_config(api_key: String) -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            initialized: true,
        }
    }

    fn track_from_video(video: Video) -> Track {
        let thumbnail = video
            .snippet
            .thumbnails
            .best()
            .unwrap_or_default()
            .to_string();
        Track {
            id: format!("yt:{}", video.id),
            video_id: video.id,
            title: video.snippet.title,
            artist: video.snippet.channel_title,
            thumbnail,
            duration: parse_iso8601_duration(&video.content_details.duration),
            source: ProviderId::Youtube,
        }
    }

    /// Fetch contentDetails + snippet for a comma-separated id list.
    async fn fetch_videos(&self, ids: &str) -> Result<Vec<Video>> {
        let url = format!(
            "{}/videos?part=contentDetails,snippet&id={}&key={}",
            self.base_url, ids, self.api_key
        );
        let resp: VideoListResponse = self.client.get(&url).send().await?.json().await?;
        Ok(resp.items)
    }
}

#[async_trait]
impl TrackSearchProvider for YouTubeProvider {
    fn id(&self) -> &str {
        "youtube"
    }

    fn name(&self) -> &str {
        "YouTube"
    }

    async fn initialize(&mut self, config: Value) -> Result<()> {
        self.api_key = config
            .get("api_key")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow!("Missing api_key"))?
            .to_string();

        if let Some(base_url) = config.get("base_url").and_then(|v| v.as_str()) {
            self.base_url = base_url.trim_end_matches('/').to_string();
        }

        self.initialized = true;
        Ok(())
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Track>> {
        if !self.initialized {
            return Err(anyhow!("YouTube provider not initialized"));
        }

        log::debug!("Searching YouTube for: {}", query);

        let url = format!(
            "{}/search?part=snippet&type=video&videoCategoryId={}&q={}&maxResults={}&key={}",
            self.base_url,
            MUSIC_CATEGORY_ID,
            urlencoding::encode(query),
            limit,
            self.api_key
        );

        let resp = self.client.get(&url).send().await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!("YouTube API error {}: {}", status, body));
        }
        let search: SearchListResponse = resp.json().await?;

        let ids: Vec<String> = search
            .items
            .into_iter()
            .filter_map(|item| item.id.video_id)
            .collect();
        if ids.is_empty() {
            return Ok(vec![]);
        }

        // Second call fills in durations and better thumbnails
        let videos = self.fetch_videos(&ids.join(",")).await?;
        let tracks: Vec<Track> = videos
            .into_iter()
            .map(Self::track_from_video)
            .collect();

        log::debug!("Found {} tracks", tracks.len());
        Ok(tracks)
    }

    async fn get_track(&self, video_id: &str) -> Result<Option<Track>> {
        if !self.initialized {
            return Err(anyhow!("YouTube provider not initialized"));
        }

        let videos = self.fetch_videos(video_id).await?;
        Ok(videos.into_iter().next().map(Self::track_from_video))
    }
}
