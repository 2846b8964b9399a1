use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct TracksResponse {
    pub headers: ResponseHeaders,
    #[serde(default)]
    pub results: Vec<JamendoTrack>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseHeaders {
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct JamendoTrack {
    pub id: serde_json::Value,
    pub name: String,
    pub artist_name: String,
    #[serde(default)]
    pub album_image: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub duration: u64,
}

impl JamendoTrack {
    /// Jamendo serves ids as numbers or strings depending on endpoint.
    pub fn id_string(&self) -> String {
        match &self.id {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}
