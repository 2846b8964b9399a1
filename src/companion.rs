//! Parsing for AI-companion chat replies.
//!
//! The companion embeds song suggestions in a sentinel-delimited JSON
//! block at the end of its prose. Extracting it is a plain
//! text-processing utility; a malformed block leaves the prose intact
//! with zero suggestions.

use serde::{Deserialize, Serialize};

const OPEN_TAG: &str = "[RECOMMENDATIONS]";
const CLOSE_TAG: &str = "[/RECOMMENDATIONS]";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanionSuggestion {
    /// Search query, formatted "Artist - Song Title".
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanionReply {
    /// Prose with the suggestions block removed.
    pub message: String,
    pub suggestions: Vec<CompanionSuggestion>,
}

/// Split a raw companion reply into clean prose and suggestions.
pub fn parse_reply(content: &str) -> CompanionReply {
    let Some((before, rest)) = content.split_once(OPEN_TAG) else {
        return CompanionReply {
            message: content.trim().to_string(),
            suggestions: vec![],
        };
    };

    let Some((block, after)) = rest.split_once(CLOSE_TAG) else {
        // Unterminated block: treat the whole thing as prose
        return CompanionReply {
            message: content.trim().to_string(),
            suggestions: vec![],
        };
    };

    let suggestions = match serde_json::from_str::<Vec<CompanionSuggestion>>(block.trim()) {
        Ok(parsed) => parsed,
        Err(e) => {
            log::warn!("Failed to parse companion suggestions: {}", e);
            vec![]
        }
    };

    let message = format!("{}{}", before, after).trim().to_string();
    CompanionReply {
        message,
        suggestions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_prose_and_suggestions() {
        let content = "Here are some picks for a rainy day!\n\
                       [RECOMMENDATIONS]\n\
                       [{\"query\": \"Bon Iver - Holocene\"}, {\"query\": \"Novo Amor - Anchor\"}]\n\
                       [/RECOMMENDATIONS]";
        let reply = parse_reply(content);
        assert_eq!(reply.message, "Here are some picks for a rainy day!");
        assert_eq!(reply.suggestions.len(), 2);
        assert_eq!(reply.suggestions[0].query, "Bon Iver - Holocene");
    }

    #[test]
    fn plain_prose_passes_through() {
        let reply = parse_reply("Just chatting, no songs today.");
        assert_eq!(reply.message, "Just chatting, no songs today.");
        assert!(reply.suggestions.is_empty());
    }

    #[test]
    fn malformed_block_yields_no_suggestions() {
        let content = "Text [RECOMMENDATIONS] not json [/RECOMMENDATIONS] more";
        let reply = parse_reply(content);
        assert!(reply.suggestions.is_empty());
        assert_eq!(reply.message, "Text  more");
    }

    #[test]
    fn unterminated_block_is_left_as_prose() {
        let content = "Text [RECOMMENDATIONS] [{\"query\": \"A\"}]";
        let reply = parse_reply(content);
        assert!(reply.suggestions.is_empty());
        assert_eq!(reply.message, content);
    }
}
