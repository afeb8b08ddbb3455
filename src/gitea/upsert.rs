use super::{
    builder::{BuilderExecutor, EditReleaseBuilder},
    error::{Error, Result},
    gitea_client::GiteaClient,
    handler::release_handler::ReleaseHandler,
    release::{Lookup, Release},
    tag::Tag,
};

/// Desired state of the release published by `out`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseInputs {
    pub tag: Tag,
    pub target: Option<String>,
    pub title: String,
    pub body: Option<String>,
    /// Forces the update path against this release id.
    pub id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Upserted {
    Created(Release),
    Updated(Release),
}

impl Upserted {
    pub fn into_release(self) -> Release {
        match self {
            Upserted::Created(release) | Upserted::Updated(release) => release,
        }
    }
}

/// Creates the release described by `inputs`, or updates the one that already exists.
///
/// An explicit id must resolve to a release. Without one the tag decides: a missing tag
/// leads to a create, any other lookup failure aborts.
pub async fn upsert(
    client: &GiteaClient,
    owner: &str,
    repo: &str,
    prerelease: bool,
    inputs: &ReleaseInputs,
) -> Result<Upserted> {
    let releases = client.repo(owner, repo).releases();

    let existing = match inputs.id {
        Some(id) => match releases.find(id).await? {
            Lookup::Found(release) => Some(release),
            Lookup::NotFound => return Err(Error::ReleaseNotFound(id.to_string())),
        },
        None => releases.find_by_tag(&inputs.tag).await?.found(),
    };

    match existing {
        None => {
            log::info!("no release found for tag {}", inputs.tag.value());
            let release = releases
                .create()
                .tag(&inputs.tag)
                .target(inputs.target.as_deref())
                .title(&inputs.title)
                .body(inputs.body.as_deref())
                .prerelease(prerelease)
                .execute()
                .await?;

            Ok(Upserted::Created(release))
        }
        Some(existing) => {
            log::info!("found release {} for tag {}", existing.id, existing.tag);
            let release = merge(&releases, &existing, inputs).execute().await?;

            Ok(Upserted::Updated(release))
        }
    }
}

/// Fields the caller left out keep the values stored on the existing release.
fn merge<'client>(
    releases: &ReleaseHandler<'client>,
    existing: &Release,
    inputs: &ReleaseInputs,
) -> EditReleaseBuilder<'client> {
    releases
        .edit(existing)
        .tag(&inputs.tag)
        .title(&inputs.title)
        .body(inputs.body.as_ref().unwrap_or(&existing.body))
        .target(inputs.target.as_ref().unwrap_or(&existing.target))
        .prerelease(existing.prerelease)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use mockito::{Matcher, Server};
    use serde_json::json;

    const TAG_PATH: &str = "/api/v1/repos/owner/repo/releases/tags/v1.0.0";

    fn inputs() -> ReleaseInputs {
        ReleaseInputs {
            tag: Tag::new("v1.0.0"),
            target: None,
            title: "Version 1".to_string(),
            body: None,
            id: None,
        }
    }

    fn existing_release() -> serde_json::Value {
        json!({
            "id": 7,
            "tag_name": "v1.0.0",
            "target_commitish": "release-branch",
            "name": "old title",
            "body": "stored notes",
            "prerelease": true,
            "published_at": "2024-01-01T00:00:00Z",
        })
    }

    #[tokio::test]
    async fn should_create_when_tag_is_unknown() -> Result<()> {
        let mut server = Server::new_async().await;
        server
            .mock("GET", TAG_PATH)
            .with_status(404)
            .create_async()
            .await;
        let create = server
            .mock("POST", "/api/v1/repos/owner/repo/releases")
            .match_body(Matcher::Json(json!({
                "tag_name": "v1.0.0",
                "target_commitish": "main",
                "name": "Version 1",
                "body": "",
                "draft": false,
                "prerelease": false,
            })))
            .with_status(201)
            .with_body(r#"{"id": 11, "tag_name": "v1.0.0", "name": "Version 1"}"#)
            .create_async()
            .await;

        let client = GiteaClient::new(server.url(), None);
        let inputs = ReleaseInputs {
            target: Some("main".to_string()),
            ..inputs()
        };
        let upserted = upsert(&client, "owner", "repo", false, &inputs).await?;

        create.assert_async().await;
        assert!(matches!(upserted, Upserted::Created(_)));
        assert_eq!(upserted.into_release().id, 11);

        Ok(())
    }

    #[tokio::test]
    async fn should_update_existing_release_keeping_omitted_fields() -> Result<()> {
        let mut server = Server::new_async().await;
        server
            .mock("GET", TAG_PATH)
            .with_body(existing_release().to_string())
            .create_async()
            .await;
        let edit = server
            .mock("PATCH", "/api/v1/repos/owner/repo/releases/7")
            .match_body(Matcher::Json(json!({
                "tag_name": "v1.0.0",
                "target_commitish": "release-branch",
                "name": "Version 1",
                "body": "stored notes",
                "prerelease": true,
            })))
            .with_body(r#"{"id": 7, "tag_name": "v1.0.0", "name": "Version 1", "body": "stored notes"}"#)
            .create_async()
            .await;
        let create = server
            .mock("POST", "/api/v1/repos/owner/repo/releases")
            .expect(0)
            .create_async()
            .await;

        let client = GiteaClient::new(server.url(), None);
        let upserted = upsert(&client, "owner", "repo", false, &inputs()).await?;

        edit.assert_async().await;
        create.assert_async().await;
        assert!(matches!(upserted, Upserted::Updated(_)));

        Ok(())
    }

    #[tokio::test]
    async fn should_override_body_and_target_when_supplied() -> Result<()> {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/v1/repos/owner/repo/releases/7")
            .with_body(existing_release().to_string())
            .create_async()
            .await;
        let edit = server
            .mock("PATCH", "/api/v1/repos/owner/repo/releases/7")
            .match_body(Matcher::PartialJson(json!({
                "target_commitish": "main",
                "body": "new notes",
            })))
            .with_body(r#"{"id": 7, "tag_name": "v1.0.0"}"#)
            .create_async()
            .await;

        let client = GiteaClient::new(server.url(), None);
        let inputs = ReleaseInputs {
            id: Some(7),
            target: Some("main".to_string()),
            body: Some("new notes".to_string()),
            ..inputs()
        };
        upsert(&client, "owner", "repo", false, &inputs).await?;

        edit.assert_async().await;

        Ok(())
    }

    #[tokio::test]
    async fn should_fail_when_explicit_id_does_not_exist() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/v1/repos/owner/repo/releases/99")
            .with_status(404)
            .create_async()
            .await;

        let client = GiteaClient::new(server.url(), None);
        let inputs = ReleaseInputs {
            id: Some(99),
            ..inputs()
        };
        let result = upsert(&client, "owner", "repo", false, &inputs).await;

        assert!(matches!(result, Err(Error::ReleaseNotFound(id)) if id == "99"));
    }

    #[tokio::test]
    async fn should_abort_when_tag_lookup_fails_for_other_reasons() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", TAG_PATH)
            .with_status(401)
            .create_async()
            .await;
        let create = server
            .mock("POST", "/api/v1/repos/owner/repo/releases")
            .expect(0)
            .create_async()
            .await;

        let client = GiteaClient::new(server.url(), None);
        let result = upsert(&client, "owner", "repo", false, &inputs()).await;

        create.assert_async().await;
        assert!(matches!(result, Err(Error::Transport(_))));
    }

    #[tokio::test]
    async fn should_surface_create_failures() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", TAG_PATH)
            .with_status(404)
            .create_async()
            .await;
        let create = server
            .mock("POST", "/api/v1/repos/owner/repo/releases")
            .match_body(Matcher::PartialJson(json!({"prerelease": true})))
            .with_status(422)
            .with_body("tag is invalid")
            .create_async()
            .await;

        let client = GiteaClient::new(server.url(), None);
        let result = upsert(&client, "owner", "repo", true, &inputs()).await;

        create.assert_async().await;
        assert!(result.is_err());
    }
}
