use crate::gitea::{
    builder::{CreateReleaseBuilder, EditReleaseBuilder},
    error::Result,
    gitea_client::GiteaClient,
    release::{Lookup, Release},
    response::ReleaseResponse,
    tag::Tag,
};
use crate::http;

pub struct ReleaseHandler<'client> {
    client: &'client GiteaClient,
    owner: String,
    repo: String,
}

impl<'client> ReleaseHandler<'client> {
    pub fn new(
        client: &'client GiteaClient,
        owner: impl Into<String>,
        repo: impl Into<String>,
    ) -> Self {
        ReleaseHandler {
            client,
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    pub fn create(&self) -> CreateReleaseBuilder<'client> {
        CreateReleaseBuilder::new(self.client, &self.owner, &self.repo)
    }

    pub fn edit(&self, release: &Release) -> EditReleaseBuilder<'client> {
        EditReleaseBuilder::new(self.client, &self.owner, &self.repo, release.id)
    }

    pub async fn find(&self, id: i64) -> Result<Lookup> {
        let response = self.client.get_release(&self.owner, &self.repo, id).await;

        lookup(response)
    }

    pub async fn find_by_tag(&self, tag: &Tag) -> Result<Lookup> {
        let response = self
            .client
            .get_release_by_tag(&self.owner, &self.repo, tag.value())
            .await;

        lookup(response)
    }

    pub async fn delete_attachment(&self, release_id: i64, attachment_id: i64) -> Result<()> {
        self.client
            .delete_attachment(&self.owner, &self.repo, release_id, attachment_id)
            .await
    }
}

fn lookup(response: std::result::Result<ReleaseResponse, http::Error>) -> Result<Lookup> {
    match response {
        Ok(release) => Ok(Lookup::Found(release.into())),
        Err(err) if err.is_not_found() => Ok(Lookup::NotFound),
        Err(err) => Err(err.into()),
    }
}
