use crate::http;
use itertools::Itertools;
use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid semver constraint `{constraint}`: {reason}")]
    InvalidConstraint { constraint: String, reason: String },
    #[error("cannot parse a semantic version from tag `{0}`")]
    InvalidVersionTag(String),
    #[error("invalid glob pattern `{pattern}`: {reason}")]
    InvalidGlob { pattern: String, reason: String },
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("invalid `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },
    #[error("malformed pagination link `{link}`: {reason}")]
    MalformedLink { link: String, reason: String },
    #[error("unexpected limit on links returned by gitea: expected {expected}, got {actual}")]
    InconsistentLimit { expected: usize, actual: usize },
    #[error("pagination did not advance: page {current} links to page {next}")]
    StalledPagination { current: usize, next: usize },
    #[error("release {0} not found")]
    ReleaseNotFound(String),
    #[error(transparent)]
    Transport(#[from] http::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("duplicate attachment name `{0}`")]
    DuplicateAttachment(String),
    #[error("asset task failed: {0}")]
    TaskFailed(String),
    #[error(transparent)]
    Assets(#[from] AssetErrors),
}

/// A single failed transfer inside an asset batch.
#[derive(Debug)]
pub struct AssetError {
    pub name: String,
    pub cause: Error,
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.cause)?;

        let mut source = std::error::Error::source(&self.cause);
        while let Some(cause) = source {
            write!(f, ": {}", cause)?;
            source = cause.source();
        }

        Ok(())
    }
}

/// Every failure collected from one asset batch, reported once all items were attempted.
#[derive(Debug, Default)]
pub struct AssetErrors(pub Vec<AssetError>);

impl AssetErrors {
    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|err| err.name.as_str()).collect()
    }
}

impl fmt::Display for AssetErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to transfer {} asset(s): {}",
            self.0.len(),
            self.0.iter().join("; ")
        )
    }
}

impl std::error::Error for AssetErrors {}
