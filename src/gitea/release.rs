use super::response::{AttachmentResponse, ReleaseResponse};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub id: i64,
    pub tag: String,
    pub target: String,
    pub title: String,
    pub body: String,
    pub prerelease: bool,
    pub published_at: DateTime<Utc>,
    pub html_url: String,
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub id: i64,
    pub name: String,
    pub download_url: String,
}

/// Outcome of looking a release up by id or tag; a miss is not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(Release),
    NotFound,
}

impl Lookup {
    pub fn found(self) -> Option<Release> {
        match self {
            Lookup::Found(release) => Some(release),
            Lookup::NotFound => None,
        }
    }
}

impl Release {
    pub fn attachment(&self, name: &str) -> Option<&Attachment> {
        self.attachments.iter().find(|attachment| attachment.name == name)
    }
}

/// `0001-01-01T00:00:00Z`, reported for releases that were never published.
fn zero_time() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(1, 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|time| Utc.from_utc_datetime(&time))
        .unwrap_or_default()
}

impl From<ReleaseResponse> for Release {
    fn from(response: ReleaseResponse) -> Self {
        Release {
            id: response.id,
            tag: response.tag_name,
            target: response.target_commitish,
            title: response.name,
            body: response.body.unwrap_or_default(),
            prerelease: response.prerelease,
            published_at: response.published_at.unwrap_or_else(zero_time),
            html_url: response.html_url,
            attachments: response.assets.into_iter().map(Attachment::from).collect(),
        }
    }
}

impl From<AttachmentResponse> for Attachment {
    fn from(response: AttachmentResponse) -> Self {
        Attachment {
            id: response.id,
            name: response.name,
            download_url: response.browser_download_url,
        }
    }
}
