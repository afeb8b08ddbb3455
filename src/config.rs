use crate::gitea::{
    assets::Globs, pagination::DEFAULT_PAGE_SIZE, Constraint, Error, GiteaClient, ListFilter,
    Result,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Repository coordinates and credentials shared by every verb.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub gitea_url: String,
    pub owner: String,
    pub repository: String,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub semver_constraint: Option<String>,
    #[serde(default, alias = "pre_release")]
    pub include_pre_release: bool,
    #[serde(default = "Source::default_page_size")]
    pub page_size: usize,
}

impl Source {
    fn default_page_size() -> usize {
        DEFAULT_PAGE_SIZE
    }

    pub fn validate(&self) -> Result<()> {
        if self.gitea_url.trim().is_empty() {
            return Err(Error::MissingField("gitea_url"));
        }
        if self.owner.trim().is_empty() {
            return Err(Error::MissingField("owner"));
        }
        if self.repository.trim().is_empty() {
            return Err(Error::MissingField("repository"));
        }
        if self.page_size == 0 {
            return Err(Error::InvalidField {
                field: "page_size",
                reason: "must be greater than zero".to_owned(),
            });
        }

        Ok(())
    }

    pub fn client(&self) -> GiteaClient {
        GiteaClient::new(self.gitea_url.trim(), self.access_token.clone())
    }

    pub fn constraint(&self) -> Result<Option<Constraint>> {
        Constraint::parse_optional(self.semver_constraint.as_deref())
    }

    pub fn filter(&self, constraint: Option<Constraint>) -> ListFilter {
        ListFilter::new(
            &self.owner,
            &self.repository,
            constraint,
            self.include_pre_release,
        )
    }
}

/// Files `in` can write next to the downloaded assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataFile {
    Id,
    Name,
    Target,
    Url,
    Tag,
    Body,
    Timestamp,
}

impl MetadataFile {
    pub const ALL: [MetadataFile; 7] = [
        MetadataFile::Id,
        MetadataFile::Name,
        MetadataFile::Target,
        MetadataFile::Url,
        MetadataFile::Tag,
        MetadataFile::Body,
        MetadataFile::Timestamp,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            MetadataFile::Id => "id",
            MetadataFile::Name => "name",
            MetadataFile::Target => "target",
            MetadataFile::Url => "url",
            MetadataFile::Tag => "tag",
            MetadataFile::Body => "body",
            MetadataFile::Timestamp => "timestamp",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataFiles(BTreeSet<MetadataFile>);

impl MetadataFiles {
    pub fn contains(&self, file: MetadataFile) -> bool {
        self.0.contains(&file)
    }
}

impl Default for MetadataFiles {
    fn default() -> Self {
        MetadataFiles(MetadataFile::ALL.into_iter().collect())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InParams {
    #[serde(default)]
    pub globs: Vec<String>,
    #[serde(default)]
    pub metadata: MetadataFiles,
}

impl InParams {
    pub fn globs(&self) -> Globs {
        Globs::new(self.globs.clone())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutParams {
    #[serde(default)]
    pub name_path: String,
    #[serde(default)]
    pub tag_path: String,
    pub target_path: Option<String>,
    pub body_path: Option<String>,
    pub id_path: Option<String>,
    #[serde(default)]
    pub globs: Vec<String>,
}

impl OutParams {
    pub fn validate(&self) -> Result<()> {
        if self.name_path.trim().is_empty() {
            return Err(Error::MissingField("name_path"));
        }
        if self.tag_path.trim().is_empty() {
            return Err(Error::MissingField("tag_path"));
        }

        Ok(())
    }

    pub fn globs(&self) -> Globs {
        Globs::new(self.globs.clone())
    }
}
