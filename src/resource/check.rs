use super::{CheckRequest, Version};
use crate::gitea::{self, Constraint, Error, Release, Tag};
use anyhow::{Context, Result};

/// Lists the versions newer than the prior one, or just the latest release on the first check.
pub async fn check(request: &CheckRequest) -> Result<Vec<Version>> {
    let source = &request.source;
    source.validate().context("Invalid source configuration")?;

    let prior = request.prior_version();
    let constraint = effective_constraint(source.constraint()?, prior)?;
    let filter = source.filter(constraint);

    let client = source.client();
    let releases = gitea::get_releases(&client, &filter, source.page_size)
        .await
        .context("Cannot list releases")?;

    Ok(select_versions(&releases, prior.is_some()))
}

/// Narrows the configured constraint to versions strictly above the prior tag.
pub fn effective_constraint(
    configured: Option<Constraint>,
    prior: Option<&Version>,
) -> gitea::Result<Option<Constraint>> {
    let Some(prior) = prior else {
        return Ok(configured);
    };

    let version = Tag::new(&prior.tag)
        .version()
        .ok_or_else(|| Error::InvalidVersionTag(prior.tag.to_owned()))?;
    let newer = Constraint::greater_than(&version);

    Ok(Some(match configured {
        Some(constraint) => constraint.and(newer),
        None => newer,
    }))
}

/// `releases` come newest first; without a prior version only the newest one is reported.
pub fn select_versions(releases: &[Release], has_prior: bool) -> Vec<Version> {
    if has_prior {
        releases.iter().map(Version::from).collect()
    } else {
        releases.first().map(Version::from).into_iter().collect()
    }
}
