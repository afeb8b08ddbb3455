use super::{
    error::Result,
    filter::ListFilter,
    handler::repository_handler::RepositoryHandler,
    pagination::{Page, PageFetcher},
    release::Release,
    request::{CreateReleaseRequest, EditReleaseRequest},
    response::{AttachmentResponse, ReleaseResponse},
};
use crate::http::{self, response::ResponseHandler, Headers, HttpClient};
use reqwest::{
    multipart::{Form, Part},
    Body, Url,
};
use std::path::Path;
use tokio::{fs::File, io::AsyncWriteExt};
use tokio_util::io::ReaderStream;

const API_PATH: &str = "/api/v1";

#[derive(Clone, Debug)]
pub struct GiteaClient {
    base_url: String,
    token: Option<String>,
    http: HttpClient,
}

impl GiteaClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();

        GiteaClient {
            base_url,
            token: token.filter(|token| !token.trim().is_empty()),
            http: HttpClient::new(),
        }
    }

    pub fn repo(&self, owner: impl Into<String>, name: impl Into<String>) -> RepositoryHandler {
        RepositoryHandler::new(self, owner, name)
    }

    fn releases_uri(&self, owner: &str, repo: &str) -> String {
        format!(
            "{}{}/repos/{}/{}/releases",
            self.base_url, API_PATH, owner, repo
        )
    }

    fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub(super) async fn list_releases(
        &self,
        owner: &str,
        repo: &str,
        page: usize,
        limit: usize,
        include_pre_release: bool,
    ) -> Result<(Vec<ReleaseResponse>, Option<String>)> {
        let mut query = vec![("page", page.to_string()), ("limit", limit.to_string())];
        if !include_pre_release {
            query.push(("pre-release", "false".to_owned()));
        }

        let response = self
            .http
            .get(self.releases_uri(owner, repo))
            .query(&query)
            .default_headers(self.token())
            .send()
            .await
            .handle::<Vec<ReleaseResponse>>()
            .await?;

        Ok(response.collect_with_link()?)
    }

    pub(super) async fn get_release(
        &self,
        owner: &str,
        repo: &str,
        id: i64,
    ) -> std::result::Result<ReleaseResponse, http::Error> {
        let uri = format!("{}/{}", self.releases_uri(owner, repo), id);

        self.http
            .get(uri)
            .default_headers(self.token())
            .send()
            .await
            .handle()
            .await?
            .collect()
    }

    pub(super) async fn get_release_by_tag(
        &self,
        owner: &str,
        repo: &str,
        tag: &str,
    ) -> std::result::Result<ReleaseResponse, http::Error> {
        let base = format!("{}/tags", self.releases_uri(owner, repo));
        let mut uri = Url::parse(&base).map_err(|err| http::Error::InvalidUrl {
            url: base.to_owned(),
            reason: err.to_string(),
        })?;
        uri.path_segments_mut()
            .map_err(|_| http::Error::InvalidUrl {
                url: base.to_owned(),
                reason: "url cannot carry a path".to_owned(),
            })?
            .push(tag);

        self.http
            .get(uri)
            .default_headers(self.token())
            .send()
            .await
            .handle()
            .await?
            .collect()
    }

    pub(super) async fn create_release(
        &self,
        owner: &str,
        repo: &str,
        request: &CreateReleaseRequest,
    ) -> Result<ReleaseResponse> {
        let release = self
            .http
            .post(self.releases_uri(owner, repo))
            .default_headers(self.token())
            .json(request)
            .send()
            .await
            .handle()
            .await?
            .collect()?;

        Ok(release)
    }

    pub(super) async fn edit_release(
        &self,
        owner: &str,
        repo: &str,
        id: i64,
        request: &EditReleaseRequest,
    ) -> Result<ReleaseResponse> {
        let uri = format!("{}/{}", self.releases_uri(owner, repo), id);

        let release = self
            .http
            .patch(uri)
            .default_headers(self.token())
            .json(request)
            .send()
            .await
            .handle()
            .await?
            .collect()?;

        Ok(release)
    }

    pub(super) async fn upload_attachment(
        &self,
        owner: &str,
        repo: &str,
        release_id: i64,
        path: &Path,
        name: &str,
    ) -> Result<AttachmentResponse> {
        let file = File::open(path).await?;
        let length = file.metadata().await?.len();

        let part = Part::stream_with_length(Body::wrap_stream(ReaderStream::new(file)), length)
            .file_name(name.to_owned());
        let form = Form::new().part("attachment", part);

        let uri = format!("{}/{}/assets", self.releases_uri(owner, repo), release_id);

        let attachment = self
            .http
            .post(uri)
            .query(&[("name", name)])
            .default_headers(self.token())
            .multipart(form)
            .send()
            .await
            .handle()
            .await?
            .collect()?;

        Ok(attachment)
    }

    pub(super) async fn delete_attachment(
        &self,
        owner: &str,
        repo: &str,
        release_id: i64,
        attachment_id: i64,
    ) -> Result<()> {
        let uri = format!(
            "{}/{}/assets/{}",
            self.releases_uri(owner, repo),
            release_id,
            attachment_id
        );

        self.http
            .delete(uri)
            .default_headers(self.token())
            .send()
            .await
            .handle::<()>()
            .await?
            .collect()?;

        Ok(())
    }

    /// Streams the body of `url` into `destination`; non-2xx responses never create the file.
    pub(super) async fn download(&self, url: &str, destination: &Path) -> Result<u64> {
        let mut response = self
            .http
            .get(url)
            .auth_headers(self.token())
            .send()
            .await
            .map_err(|cause| http::Error::SendRequestError { cause })?;

        let status = response.status();
        if !status.is_success() {
            return Err(http::Error::GenericResponseError {
                status: status.as_u16(),
                message: format!("failed to download `{}`", url),
            }
            .into());
        }

        let mut file = File::create(destination).await?;
        let mut written = 0;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|cause| http::Error::ReadResponseError { cause })?
        {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        Ok(written)
    }
}

impl PageFetcher for GiteaClient {
    async fn fetch_page(&self, filter: &ListFilter, page: usize, limit: usize) -> Result<Page> {
        let (releases, link) = self
            .list_releases(
                &filter.owner,
                &filter.repo,
                page,
                limit,
                filter.include_pre_release,
            )
            .await?;

        Ok(Page {
            releases: releases.into_iter().map(Release::from).collect(),
            link,
        })
    }
}
