use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::models::Track;

#[async_trait]
pub trait TrackSearchProvider: Send + Sync {
    /// Unique identifier (e.g., "youtube", "jamendo")
    fn id(&self) -> &str;

    /// User-friendly name
    fn name(&self) -> &str;

    /// Initialize with config (API keys, base-URL overrides)
    async fn initialize(&mut self, config: Value) -> Result<()>;

    /// Search the catalog. Returns at most `limit` tracks.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Track>>;

    /// Look up a single track by its external id. `None` when the
    /// catalog has no such entry.
    async fn get_track(&self, video_id: &str) -> Result<Option<Track>>;

    /// Most-played tracks of the moment, where the catalog offers a
    /// popularity feed. Default: unsupported.
    async fn trending(&self, _limit: usize) -> Result<Vec<Track>> {
        Err(anyhow::anyhow!("Not implemented"))
    }
}
