use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseResponse {
    pub id: i64,
    pub tag_name: String,
    #[serde(default)]
    pub target_commitish: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub prerelease: bool,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub assets: Vec<AttachmentResponse>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttachmentResponse {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub browser_download_url: String,
}
