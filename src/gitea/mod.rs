pub mod assets;
pub mod builder;
pub mod error;
pub mod filter;
pub mod gitea_client;
mod handler;
mod links;
pub mod pagination;
pub mod release;
mod request;
mod response;
pub mod tag;
pub mod upsert;

pub use self::{
    error::{Error, Result},
    filter::{Constraint, ListFilter},
    gitea_client::GiteaClient,
    release::{Lookup, Release},
    tag::Tag,
};
use self::pagination::{PageFetcher, ReleaseWalker};

/// Lists every release of the filtered repository, newest first, across all pages.
pub async fn get_releases<F: PageFetcher>(
    fetcher: &F,
    filter: &ListFilter,
    page_size: usize,
) -> Result<Vec<Release>> {
    log::info!(
        "listing releases of {}/{} (constraint: {}, pre-releases: {})",
        filter.owner,
        filter.repo,
        filter
            .constraint
            .as_ref()
            .map_or_else(|| "none".to_owned(), |constraint| constraint.to_string()),
        filter.include_pre_release
    );

    let releases = ReleaseWalker::new(fetcher, page_size)
        .list_all(filter)
        .await?;
    log::info!("found {} matching releases", releases.len());

    Ok(releases)
}
