//! Typed errors for the recommendation system.

use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while fetching recommendations.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "message")]
pub enum RecommendationError {
    /// The chat gateway rejected or failed the request
    #[error("AI gateway error: {0}")]
    Gateway(String),

    /// Gateway rate limit hit (HTTP 429)
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Gateway credits exhausted (HTTP 402)
    #[error("AI credits exhausted")]
    CreditsExhausted,

    /// Network-level failure reaching the provider
    #[error("Network error: {0}")]
    Network(String),

    /// Provider is missing required configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for RecommendationError {
    fn from(e: reqwest::Error) -> Self {
        RecommendationError::Network(e.to_string())
    }
}
