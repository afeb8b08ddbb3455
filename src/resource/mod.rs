pub mod check;
pub mod get;
pub mod put;

use crate::{
    config::{InParams, OutParams, Source},
    gitea::Release,
};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::io::{Read, Write};

/// Identity of one release as exchanged with the CI system.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tag: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub timestamp: DateTime<Utc>,
}

impl Version {
    pub fn is_empty(&self) -> bool {
        self.tag.is_empty() && self.id.is_empty()
    }
}

impl From<&Release> for Version {
    fn from(release: &Release) -> Self {
        Version {
            tag: release.tag.to_owned(),
            id: release.id.to_string(),
            timestamp: release.published_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    pub source: Source,
    #[serde(default)]
    pub version: Option<Version>,
}

impl CheckRequest {
    /// The last version the CI system saw, if any. An all-empty version counts as none.
    pub fn prior_version(&self) -> Option<&Version> {
        self.version.as_ref().filter(|version| !version.is_empty())
    }
}

#[derive(Debug, Deserialize)]
pub struct InRequest {
    pub source: Source,
    pub version: Version,
    #[serde(default)]
    pub params: InParams,
}

#[derive(Debug, Deserialize)]
pub struct OutRequest {
    pub source: Source,
    #[serde(default)]
    pub params: OutParams,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InOutResponse {
    pub version: Version,
    pub metadata: Vec<MetadataField>,
}

impl From<&Release> for InOutResponse {
    fn from(release: &Release) -> Self {
        InOutResponse {
            version: Version::from(release),
            metadata: metadata_from_release(release),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataField {
    pub name: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markdown: Option<bool>,
}

impl MetadataField {
    fn new(name: &str, value: impl Into<String>) -> Self {
        MetadataField {
            name: name.to_owned(),
            value: value.into(),
            url: None,
            markdown: None,
        }
    }
}

/// Metadata pairs shown next to a version; empty release fields are left out.
pub fn metadata_from_release(release: &Release) -> Vec<MetadataField> {
    let mut metadata = vec![];

    if !release.title.is_empty() {
        let mut field = MetadataField::new("name", &release.title);
        if !release.html_url.is_empty() {
            field.url = Some(release.html_url.to_owned());
        }
        metadata.push(field);
    }

    if !release.html_url.is_empty() {
        metadata.push(MetadataField::new("url", &release.html_url));
    }

    if !release.body.is_empty() {
        let mut field = MetadataField::new("body", &release.body);
        field.markdown = Some(true);
        metadata.push(field);
    }

    if !release.tag.is_empty() {
        metadata.push(MetadataField::new("tag", &release.tag));
    }

    if !release.target.is_empty() {
        metadata.push(MetadataField::new("commit_sha", &release.target));
    }

    if release.prerelease {
        metadata.push(MetadataField::new("pre-release", "true"));
    }

    metadata
}

pub fn read_request<T: DeserializeOwned>(reader: impl Read) -> Result<T> {
    serde_json::from_reader(reader).context("Cannot read request from stdin")
}

pub fn write_response<T: Serialize>(mut writer: impl Write, response: &T) -> Result<()> {
    serde_json::to_writer(&mut writer, response).context("Cannot write response to stdout")?;
    writeln!(writer)?;

    Ok(())
}
