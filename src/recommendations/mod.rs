//! Next-track recommendation for autoplay.
//!
//! Two providers share one contract: a local heuristic ranker over
//! title/artist keyword signals, and an LLM chat-gateway client. Both
//! return ordered candidate search queries; the player tries them in
//! order against the search provider.

pub mod classifier;
pub mod engine;
pub mod errors;
pub mod gateway;
pub mod types;

pub use engine::HeuristicRecommender;
pub use errors::RecommendationError;
pub use gateway::GatewayRecommender;
pub use types::{Candidate, RecommendationContext, RecommendationProvider};
