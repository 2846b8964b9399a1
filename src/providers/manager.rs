use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use tokio::sync::RwLock;

use crate::models::Track;
use crate::providers::cache::SearchCache;
use crate::providers::traits::TrackSearchProvider;

/// Registry of search providers plus the session-scoped result cache.
pub struct ProviderManager {
    providers: Arc<RwLock<HashMap<String, Arc<dyn TrackSearchProvider>>>>,
    active_provider: Arc<RwLock<Option<String>>>,
    cache: SearchCache,
}

impl Default for ProviderManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderManager {
    pub fn new() -> Self {
        Self {
            providers: Arc::new(RwLock::new(HashMap::new())),
            active_provider: Arc::new(RwLock::new(None)),
            cache: SearchCache::new(),
        }
    }

    pub async fn register_provider(&self, provider: Arc<dyn TrackSearchProvider>) {
        let mut providers = self.providers.write().await;
        let id = provider.id().to_string();
        log::info!("Registering search provider: {} ({})", provider.name(), id);
        // First registration becomes the active provider
        let mut active = self.active_provider.write().await;
        if active.is_none() {
            *active = Some(id.clone());
        }
        providers.insert(id, provider);
    }

    pub async fn get_provider(&self, id: &str) -> Option<Arc<dyn TrackSearchProvider>> {
        let providers = self.providers.read().await;
        providers.get(id).cloned()
    }

    pub async fn get_active_provider(&self) -> Option<Arc<dyn TrackSearchProvider>> {
        let active = self.active_provider.read().await;
        if let Some(ref id) = *active {
            return self.get_provider(id).await;
        }
        None
    }

    pub async fn set_active_provider(&self, id: &str) -> Result<()> {
        let providers = self.providers.read().await;
        if providers.contains_key(id) {
            let mut active = self.active_provider.write().await;
            *active = Some(id.to_string());
            Ok(())
        } else {
            Err(anyhow!("Provider {} not found", id))
        }
    }

    pub async fn list_providers(&self) -> Vec<String> {
        let providers = self.providers.read().await;
        providers.keys().cloned().collect()
    }

    /// Search via the active provider, consulting the TTL cache first.
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<Track>> {
        if let Some(hit) = self.cache.get_search(query, limit) {
            log::debug!("Search cache hit for '{}'", query);
            return Ok(hit);
        }

        let provider = self
            .get_active_provider()
            .await
            .ok_or_else(|| anyhow!("No search provider registered"))?;

        let results = provider.search(query, limit).await?;
        self.cache.put_search(query, limit, results.clone());
        for track in &results {
            self.cache.put_track(track.clone());
        }
        Ok(results)
    }

    /// Single-track lookup via the active provider, cache first.
    pub async fn get_track(&self, video_id: &str) -> Result<Option<Track>> {
        if let Some(hit) = self.cache.get_track(video_id) {
            return Ok(Some(hit));
        }

        let provider = self
            .get_active_provider()
            .await
            .ok_or_else(|| anyhow!("No search provider registered"))?;

        let track = provider.get_track(video_id).await?;
        if let Some(ref track) = track {
            self.cache.put_track(track.clone());
        }
        Ok(track)
    }

    pub async fn trending(&self, limit: usize) -> Result<Vec<Track>> {
        let provider = self
            .get_active_provider()
            .await
            .ok_or_else(|| anyhow!("No search provider registered"))?;
        provider.trending(limit).await
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::Value;
    use crate::providers::types::ProviderId;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        searches: AtomicUsize,
    }

    #[async_trait]
    impl TrackSearchProvider for CountingProvider {
        fn id(&self) -> &str {
            "counting"
        }

        fn name(&self) -> &str {
            "Counting"
        }

        async fn initialize(&mut self, _config: Value) -> Result<()> {
            Ok(())
        }

        async fn search(&self, query: &str, _limit: usize) -> Result<Vec<Track>> {
            self.searches.fetch_add(1, Ordering::SeqCst);
            Ok(vec![Track {
                id: format!("yt:{}", query),
                video_id: query.to_string(),
                title: query.to_string(),
                artist: "Artist".to_string(),
                thumbnail: String::new(),
                duration: 60,
                source: ProviderId::Youtube,
            }])
        }

        async fn get_track(&self, _video_id: &str) -> Result<Option<Track>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn repeat_searches_hit_the_cache() {
        let manager = ProviderManager::new();
        let provider = Arc::new(CountingProvider {
            searches: AtomicUsize::new(0),
        });
        manager.register_provider(provider.clone()).await;

        manager.search("query", 20).await.unwrap();
        manager.search("query", 20).await.unwrap();
        assert_eq!(provider.searches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn first_registration_becomes_active() {
        let manager = ProviderManager::new();
        manager
            .register_provider(Arc::new(CountingProvider {
                searches: AtomicUsize::new(0),
            }))
            .await;
        assert!(manager.get_active_provider().await.is_some());
        assert!(manager.set_active_provider("missing").await.is_err());
    }

    #[tokio::test]
    async fn track_lookup_uses_search_populated_cache() {
        let manager = ProviderManager::new();
        manager
            .register_provider(Arc::new(CountingProvider {
                searches: AtomicUsize::new(0),
            }))
            .await;

        manager.search("abc", 20).await.unwrap();
        // provider.get_track returns None, so a hit proves the cache path
        let track = manager.get_track("abc").await.unwrap();
        assert!(track.is_some());
    }
}
