use super::BuilderExecutor;
use crate::gitea::{
    error::{Error, Result},
    gitea_client::GiteaClient,
    release::Release,
    request::CreateReleaseRequest,
    tag::Tag,
};

pub struct CreateReleaseBuilder<'client> {
    client: &'client GiteaClient,
    owner: String,
    repo: String,
    tag: Option<Tag>,
    target: Option<String>,
    title: Option<String>,
    body: Option<String>,
    prerelease: bool,
}

impl<'client> CreateReleaseBuilder<'client> {
    pub fn new(
        client: &'client GiteaClient,
        owner: impl Into<String>,
        repo: impl Into<String>,
    ) -> Self {
        CreateReleaseBuilder {
            client,
            owner: owner.into(),
            repo: repo.into(),
            tag: None,
            target: None,
            title: None,
            body: None,
            prerelease: false,
        }
    }

    pub fn tag(mut self, tag: &Tag) -> Self {
        self.tag = Some(tag.to_owned());
        self
    }

    pub fn target(mut self, target: Option<&str>) -> Self {
        self.target = target.map(str::to_owned);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn body(mut self, body: Option<&str>) -> Self {
        self.body = body.map(str::to_owned);
        self
    }

    pub fn prerelease(mut self, prerelease: bool) -> Self {
        self.prerelease = prerelease;
        self
    }

    pub fn request(&self) -> Result<CreateReleaseRequest> {
        let tag = self
            .tag
            .as_ref()
            .filter(|tag| !tag.is_empty())
            .ok_or(Error::MissingField("tag"))?;

        Ok(CreateReleaseRequest::new(
            tag.value(),
            self.target.clone().unwrap_or_default(),
            self.title.clone().unwrap_or_default(),
            self.body.clone().unwrap_or_default(),
            self.prerelease,
        ))
    }
}

impl BuilderExecutor for CreateReleaseBuilder<'_> {
    type Output = Release;

    async fn execute(self) -> Result<Release> {
        let request = self.request()?;

        log::info!("creating release {} in {}/{}", request.tag_name, self.owner, self.repo);
        let release = self
            .client
            .create_release(&self.owner, &self.repo, &request)
            .await?;

        Ok(release.into())
    }
}
