use super::{
    error::{Error, Result},
    filter::ListFilter,
    links::PageLinks,
    release::Release,
};

pub const DEFAULT_PAGE_SIZE: usize = 100;

/// One raw page of a release listing together with its `Link` header.
pub struct Page {
    pub releases: Vec<Release>,
    pub link: Option<String>,
}

pub trait PageFetcher {
    async fn fetch_page(&self, filter: &ListFilter, page: usize, limit: usize) -> Result<Page>;
}

/// Follows `rel="next"` links from page 1 until the server stops sending one.
pub struct ReleaseWalker<'fetcher, F: PageFetcher> {
    fetcher: &'fetcher F,
    page_size: usize,
}

impl<'fetcher, F> ReleaseWalker<'fetcher, F>
where
    F: PageFetcher,
{
    pub fn new(fetcher: &'fetcher F, page_size: usize) -> Self {
        ReleaseWalker { fetcher, page_size }
    }

    pub async fn list_all(&self, filter: &ListFilter) -> Result<Vec<Release>> {
        let mut releases = Vec::new();
        let mut page = 1;
        let mut limit: Option<usize> = None;

        loop {
            log::debug!(
                "fetching releases page {} of {}/{} (page size {})",
                page,
                filter.owner,
                filter.repo,
                self.page_size
            );
            let fetched = self.fetcher.fetch_page(filter, page, self.page_size).await?;

            releases.extend(
                fetched
                    .releases
                    .into_iter()
                    .filter(|release| filter.matches(&release.tag)),
            );

            let links = match fetched.link.as_deref() {
                Some(header) => PageLinks::parse(header)?,
                None => PageLinks::default(),
            };

            match (limit, links.limit) {
                (Some(expected), Some(actual)) if expected != actual => {
                    return Err(Error::InconsistentLimit { expected, actual })
                }
                (None, Some(actual)) => limit = Some(actual),
                _ => {}
            }

            match links.next {
                Some(next) if next <= page => {
                    return Err(Error::StalledPagination {
                        current: page,
                        next,
                    })
                }
                Some(next) => page = next,
                None => break,
            }
        }

        Ok(releases)
    }
}
