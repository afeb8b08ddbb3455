use super::release_handler::ReleaseHandler;
use crate::gitea::gitea_client::GiteaClient;

pub struct RepositoryHandler<'client> {
    client: &'client GiteaClient,
    owner: String,
    repo: String,
}

impl<'client> RepositoryHandler<'client> {
    pub fn new(
        client: &'client GiteaClient,
        owner: impl Into<String>,
        repo: impl Into<String>,
    ) -> Self {
        RepositoryHandler {
            client,
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    pub fn releases(&self) -> ReleaseHandler<'client> {
        ReleaseHandler::new(self.client, &self.owner, &self.repo)
    }
}
