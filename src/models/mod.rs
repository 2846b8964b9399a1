use chrono::Timelike;
use serde::{Deserialize, Serialize};

use crate::providers::ProviderId;

/// A playable unit from any source provider.
///
/// Immutable once constructed: a new search or recommendation result
/// always produces a new value rather than mutating an old one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Provider-prefixed id, e.g. "yt:dQw4w9WgXcQ" or "jamendo:1976".
    pub id: String,
    /// Raw external-source id (YouTube video id, Jamendo track id).
    pub video_id: String,
    pub title: String,
    /// Primary display artist.
    pub artist: String,
    /// Thumbnail URL.
    pub thumbnail: String,
    /// Duration in seconds. 0 when unknown at load time; filled in
    /// asynchronously once metadata is known.
    pub duration: u64,
    /// Provider this track came from.
    pub source: ProviderId,
}

impl Track {
    /// Build a bare track from a video id alone, the way a deep link or
    /// companion suggestion arrives before metadata resolution.
    pub fn ad_hoc(video_id: &str, title: Option<&str>, artist: Option<&str>) -> Self {
        Self {
            id: format!("yt:{}", video_id),
            video_id: video_id.to_string(),
            title: title.unwrap_or("Unknown Title").to_string(),
            artist: artist.unwrap_or("Unknown Artist").to_string(),
            thumbnail: format!("https://img.youtube.com/vi/{}/mqdefault.jpg", video_id),
            duration: 0,
            source: ProviderId::Youtube,
        }
    }
}

/// Coarse wall-clock bucket fed to the recommenders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            6..=11 => TimeOfDay::Morning,
            12..=17 => TimeOfDay::Afternoon,
            18..=21 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }

    /// Bucket for the current local time.
    pub fn now() -> Self {
        Self::from_hour(chrono::Local::now().hour())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
            TimeOfDay::Night => "night",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_of_day_buckets() {
        assert_eq!(TimeOfDay::from_hour(6), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(11), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(12), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::from_hour(18), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_hour(22), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(3), TimeOfDay::Night);
    }

    #[test]
    fn ad_hoc_track_defaults() {
        let track = Track::ad_hoc("abc123", None, None);
        assert_eq!(track.id, "yt:abc123");
        assert_eq!(track.title, "Unknown Title");
        assert_eq!(track.duration, 0);
        assert!(track.thumbnail.contains("abc123"));
    }
}
