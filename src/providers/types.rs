use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Youtube,
    Jamendo,
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderId::Youtube => write!(f, "youtube"),
            ProviderId::Jamendo => write!(f, "jamendo"),
        }
    }
}

impl FromStr for ProviderId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "youtube" => Ok(ProviderId::Youtube),
            "jamendo" => Ok(ProviderId::Jamendo),
            _ => Err(format!("Invalid provider: '{}'. Valid: youtube, jamendo", s)),
        }
    }
}
