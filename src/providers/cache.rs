//! In-memory TTL cache in front of provider calls.
//!
//! An optimization, not a correctness requirement: a cold cache only
//! costs an extra API round trip. Owned by the `ProviderManager` and
//! constructed once per session, so nothing leaks across tests.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::models::Track;

/// How long cached search results remain valid.
const CACHE_TTL: Duration = Duration::from_secs(5 * 60); // 5 minutes

/// Maximum cached entries per map before evicting oldest.
const MAX_CACHE_ENTRIES: usize = 50;

struct CachedEntry<T> {
    value: T,
    cached_at: Instant,
}

impl<T> CachedEntry<T> {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.cached_at.elapsed() > ttl
    }
}

pub struct SearchCache {
    ttl: Duration,
    searches: Mutex<HashMap<(String, usize), CachedEntry<Vec<Track>>>>,
    tracks: Mutex<HashMap<String, CachedEntry<Track>>>,
}

impl Default for SearchCache {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchCache {
    pub fn new() -> Self {
        Self::with_ttl(CACHE_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            searches: Mutex::new(HashMap::new()),
            tracks: Mutex::new(HashMap::new()),
        }
    }

    pub fn get_search(&self, query: &str, limit: usize) -> Option<Vec<Track>> {
        let mut searches = self.searches.lock();
        let key = (query.to_lowercase(), limit);
        match searches.get(&key) {
            Some(entry) if !entry.is_expired(self.ttl) => Some(entry.value.clone()),
            Some(_) => {
                searches.remove(&key);
                None
            }
            None => None,
        }
    }

    pub fn put_search(&self, query: &str, limit: usize, results: Vec<Track>) {
        let mut searches = self.searches.lock();
        Self::evict(&mut searches, self.ttl);
        searches.insert(
            (query.to_lowercase(), limit),
            CachedEntry {
                value: results,
                cached_at: Instant::now(),
            },
        );
    }

    pub fn get_track(&self, video_id: &str) -> Option<Track> {
        let mut tracks = self.tracks.lock();
        match tracks.get(video_id) {
            Some(entry) if !entry.is_expired(self.ttl) => Some(entry.value.clone()),
            Some(_) => {
                tracks.remove(video_id);
                None
            }
            None => None,
        }
    }

    pub fn put_track(&self, track: Track) {
        let mut tracks = self.tracks.lock();
        Self::evict(&mut tracks, self.ttl);
        tracks.insert(
            track.video_id.clone(),
            CachedEntry {
                value: track,
                cached_at: Instant::now(),
            },
        );
    }

    pub fn clear(&self) {
        self.searches.lock().clear();
        self.tracks.lock().clear();
    }

    /// Drop expired entries, then the oldest while over capacity.
    fn evict<K: Clone + std::hash::Hash + Eq, T>(
        map: &mut HashMap<K, CachedEntry<T>>,
        ttl: Duration,
    ) {
        map.retain(|_, entry| !entry.is_expired(ttl));
        while map.len() >= MAX_CACHE_ENTRIES {
            let oldest = map
                .iter()
                .min_by_key(|(_, entry)| entry.cached_at)
                .map(|(k, _)| k.clone());
            match oldest {
                Some(key) => map.remove(&key),
                None => break,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::types::ProviderId;

    fn track(id: &str) -> Track {
        Track {
            id: format!("yt:{}", id),
            video_id: id.to_string(),
            title: id.to_string(),
            artist: "Artist".to_string(),
            thumbnail: String::new(),
            duration: 100,
            source: ProviderId::Youtube,
        }
    }

    #[test]
    fn search_hits_are_keyed_by_query_and_limit() {
        let cache = SearchCache::new();
        cache.put_search("lofi", 20, vec![track("a")]);
        assert!(cache.get_search("lofi", 20).is_some());
        assert!(cache.get_search("LOFI", 20).is_some());
        assert!(cache.get_search("lofi", 10).is_none());
    }

    #[test]
    fn expired_entries_are_dropped_on_read() {
        let cache = SearchCache::with_ttl(Duration::from_millis(0));
        cache.put_search("lofi", 20, vec![track("a")]);
        std::thread::sleep(Duration::from_millis(5));
        assert!(cache.get_search("lofi", 20).is_none());
    }

    #[test]
    fn track_cache_round_trip() {
        let cache = SearchCache::new();
        cache.put_track(track("abc"));
        assert_eq!(cache.get_track("abc").unwrap().video_id, "abc");
        assert!(cache.get_track("missing").is_none());
    }

    #[test]
    fn capacity_is_bounded() {
        let cache = SearchCache::new();
        for i in 0..80 {
            cache.put_track(track(&format!("t{}", i)));
        }
        let cached = (0..80)
            .filter(|i| cache.get_track(&format!("t{}", i)).is_some())
            .count();
        assert!(cached <= 50);
    }
}
