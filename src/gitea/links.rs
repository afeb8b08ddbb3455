use super::error::{Error, Result};
use reqwest::Url;

/// Pagination links carried by the `Link` header of a Gitea list response.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PageLinks {
    pub limit: Option<usize>,
    pub first: Option<usize>,
    pub last: Option<usize>,
    pub prev: Option<usize>,
    pub next: Option<usize>,
}

impl PageLinks {
    pub fn parse(header: &str) -> Result<PageLinks> {
        let mut links = PageLinks::default();

        for link in header.split(',') {
            let segments: Vec<&str> = link.trim().split(';').collect();

            // a usable link has at least an href and a relation
            if segments.len() < 2 {
                continue;
            }

            let href = segments[0].trim();
            let Some(href) = href.strip_prefix('<').and_then(|href| href.strip_suffix('>')) else {
                continue;
            };

            let Ok(url) = Url::parse(href) else {
                log::debug!("ignoring unparsable pagination link {}", href);
                continue;
            };

            let page = query_number(&url, "page")?;
            let limit = query_number(&url, "limit")?;

            match links.limit {
                None => links.limit = Some(limit),
                Some(expected) if expected != limit => {
                    return Err(Error::InconsistentLimit {
                        expected,
                        actual: limit,
                    })
                }
                Some(_) => {}
            }

            for relation in &segments[1..] {
                match relation.trim() {
                    r#"rel="next""# => links.next = Some(page),
                    r#"rel="prev""# => links.prev = Some(page),
                    r#"rel="first""# => links.first = Some(page),
                    r#"rel="last""# => links.last = Some(page),
                    _ => {}
                }
            }
        }

        Ok(links)
    }
}

fn query_number(url: &Url, key: &str) -> Result<usize> {
    let value = url
        .query_pairs()
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.into_owned())
        .unwrap_or_default();

    value.parse().map_err(|_| Error::MalformedLink {
        link: url.to_string(),
        reason: format!("`{}` is not a valid {} number", value, key),
    })
}
