use super::BuilderExecutor;
use crate::gitea::{
    error::Result, gitea_client::GiteaClient, release::Release, request::EditReleaseRequest,
    tag::Tag,
};

pub struct EditReleaseBuilder<'client> {
    client: &'client GiteaClient,
    owner: String,
    repo: String,
    id: i64,
    request: EditReleaseRequest,
}

impl<'client> EditReleaseBuilder<'client> {
    pub fn new(
        client: &'client GiteaClient,
        owner: impl Into<String>,
        repo: impl Into<String>,
        id: i64,
    ) -> Self {
        EditReleaseBuilder {
            client,
            owner: owner.into(),
            repo: repo.into(),
            id,
            request: EditReleaseRequest::default(),
        }
    }

    pub fn tag(mut self, tag: &Tag) -> Self {
        self.request.tag_name = Some(tag.value().to_owned());
        self
    }

    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.request.target_commitish = Some(target.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.request.name = Some(title.into());
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.request.body = Some(body.into());
        self
    }

    pub fn prerelease(mut self, prerelease: bool) -> Self {
        self.request.prerelease = Some(prerelease);
        self
    }
}

impl BuilderExecutor for EditReleaseBuilder<'_> {
    type Output = Release;

    async fn execute(self) -> Result<Release> {
        log::info!("updating release {} in {}/{}", self.id, self.owner, self.repo);
        let release = self
            .client
            .edit_release(&self.owner, &self.repo, self.id, &self.request)
            .await?;

        Ok(release.into())
    }
}
