use super::{InOutResponse, OutRequest};
use crate::{
    config::OutParams,
    gitea::{
        assets::upload_assets,
        upsert::{upsert, ReleaseInputs, Upserted},
        Error, Tag,
    },
};
use anyhow::{Context, Result};
use std::path::Path;

/// Creates or updates the release described by the files in `source_dir`, then uploads its assets.
pub async fn put(source_dir: &Path, request: &OutRequest) -> Result<InOutResponse> {
    let source = &request.source;
    source.validate().context("Invalid source configuration")?;
    request.params.validate().context("Invalid out params")?;

    let inputs = read_inputs(source_dir, &request.params).await?;
    let client = source.client();

    let upserted = upsert(
        &client,
        &source.owner,
        &source.repository,
        source.include_pre_release,
        &inputs,
    )
    .await
    .with_context(|| format!("Cannot publish release {}", inputs.tag.value()))?;

    match &upserted {
        Upserted::Created(release) => log::info!("created release {}", release.id),
        Upserted::Updated(release) => log::info!("updated release {}", release.id),
    }
    let release = upserted.into_release();

    let uploaded = upload_assets(
        &client,
        &source.owner,
        &source.repository,
        &release,
        source_dir,
        &request.params.globs(),
    )
    .await
    .context("Cannot upload release assets")?;
    log::info!("uploaded {} asset(s)", uploaded.len());

    Ok(InOutResponse::from(&release))
}

async fn read_inputs(source_dir: &Path, params: &OutParams) -> Result<ReleaseInputs> {
    let title = read_file(source_dir, &params.name_path).await?.trim().to_owned();

    let tag = Tag::new(read_file(source_dir, &params.tag_path).await?.trim());
    if tag.is_empty() {
        return Err(Error::MissingField("tag").into());
    }

    let target = match params.target_path.as_deref() {
        Some(path) => non_empty(read_file(source_dir, path).await?.trim()),
        None => None,
    };

    // the body keeps its surrounding whitespace
    let body = match params.body_path.as_deref() {
        Some(path) => Some(read_file(source_dir, path).await?),
        None => None,
    };

    let id = match params.id_path.as_deref() {
        Some(path) => {
            let raw = read_file(source_dir, path).await?;
            let id = raw.trim().parse::<i64>().map_err(|err| Error::InvalidField {
                field: "id",
                reason: format!("`{}` is not a release id: {}", raw.trim(), err),
            })?;
            Some(id)
        }
        None => None,
    };

    Ok(ReleaseInputs {
        tag,
        target,
        title,
        body,
        id,
    })
}

async fn read_file(source_dir: &Path, relative: &str) -> Result<String> {
    let path = source_dir.join(relative);

    tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("Cannot read {}", path.display()))
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::read_request;
    use mockito::{Matcher, Server, ServerGuard};
    use serde_json::json;
    use std::fs;
    use tempdir::TempDir;

    const TAG_PATH: &str = "/api/v1/repos/owner/repo/releases/tags/v2.0.0";
    const RELEASES_PATH: &str = "/api/v1/repos/owner/repo/releases";

    fn request(server: &ServerGuard, params: serde_json::Value) -> OutRequest {
        read_request(
            json!({
                "source": {
                    "gitea_url": server.url(),
                    "owner": "owner",
                    "repository": "repo",
                    "access_token": "secret",
                },
                "params": params,
            })
            .to_string()
            .as_bytes(),
        )
        .unwrap()
    }

    fn workspace() -> anyhow::Result<TempDir> {
        let dir = TempDir::new("out")?;
        fs::write(dir.path().join("name"), "Version 2\n")?;
        fs::write(dir.path().join("tag"), " v2.0.0\n")?;
        fs::write(dir.path().join("body"), "## Changes\n")?;
        fs::create_dir(dir.path().join("dist"))?;
        fs::write(dir.path().join("dist/app.tar.gz"), "tarball")?;

        Ok(dir)
    }

    #[tokio::test]
    async fn should_create_release_and_upload_matching_files() -> anyhow::Result<()> {
        let mut server = Server::new_async().await;
        server
            .mock("GET", TAG_PATH)
            .with_status(404)
            .create_async()
            .await;
        let create = server
            .mock("POST", RELEASES_PATH)
            .match_header("authorization", "token secret")
            .match_body(Matcher::Json(json!({
                "tag_name": "v2.0.0",
                "target_commitish": "",
                "name": "Version 2",
                "body": "## Changes\n",
                "draft": false,
                "prerelease": false,
            })))
            .with_status(201)
            .with_body(
                json!({
                    "id": 5,
                    "tag_name": "v2.0.0",
                    "name": "Version 2",
                    "body": "## Changes\n",
                    "published_at": "2024-06-01T12:00:00Z",
                })
                .to_string(),
            )
            .create_async()
            .await;
        let upload = server
            .mock("POST", "/api/v1/repos/owner/repo/releases/5/assets")
            .match_query(Matcher::UrlEncoded("name".into(), "app.tar.gz".into()))
            .with_status(201)
            .with_body(r#"{"id": 1, "name": "app.tar.gz", "browser_download_url": "http://x/1"}"#)
            .create_async()
            .await;

        let dir = workspace()?;
        let response = put(
            dir.path(),
            &request(
                &server,
                json!({
                    "name_path": "name",
                    "tag_path": "tag",
                    "body_path": "body",
                    "globs": ["dist/*.tar.gz"],
                }),
            ),
        )
        .await?;

        create.assert_async().await;
        upload.assert_async().await;
        assert_eq!(response.version.id, "5");
        assert_eq!(response.version.tag, "v2.0.0");

        Ok(())
    }

    #[tokio::test]
    async fn should_update_release_named_by_id_file() -> anyhow::Result<()> {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/v1/repos/owner/repo/releases/8")
            .with_body(
                json!({
                    "id": 8,
                    "tag_name": "v2.0.0-rc.1",
                    "target_commitish": "abc123",
                    "name": "rc",
                    "body": "old notes",
                    "prerelease": true,
                })
                .to_string(),
            )
            .create_async()
            .await;
        let edit = server
            .mock("PATCH", "/api/v1/repos/owner/repo/releases/8")
            .match_body(Matcher::Json(json!({
                "tag_name": "v2.0.0",
                "target_commitish": "abc123",
                "name": "Version 2",
                "body": "old notes",
                "prerelease": true,
            })))
            .with_body(r#"{"id": 8, "tag_name": "v2.0.0", "name": "Version 2"}"#)
            .create_async()
            .await;
        let by_tag = server.mock("GET", TAG_PATH).expect(0).create_async().await;

        let dir = workspace()?;
        fs::write(dir.path().join("id"), "8\n")?;
        let response = put(
            dir.path(),
            &request(
                &server,
                json!({
                    "name_path": "name",
                    "tag_path": "tag",
                    "id_path": "id",
                    "globs": ["nothing-matches"],
                }),
            ),
        )
        .await?;

        edit.assert_async().await;
        by_tag.assert_async().await;
        assert_eq!(response.version.id, "8");

        Ok(())
    }

    #[tokio::test]
    async fn should_reject_non_numeric_id() -> anyhow::Result<()> {
        let server = Server::new_async().await;
        let dir = workspace()?;
        fs::write(dir.path().join("id"), "eight")?;

        let result = put(
            dir.path(),
            &request(
                &server,
                json!({"name_path": "name", "tag_path": "tag", "id_path": "id"}),
            ),
        )
        .await;

        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::InvalidField { field: "id", .. })
        ));

        Ok(())
    }

    #[tokio::test]
    async fn should_fail_when_tag_file_is_missing() -> anyhow::Result<()> {
        let server = Server::new_async().await;
        let dir = workspace()?;

        let result = put(
            dir.path(),
            &request(&server, json!({"name_path": "name", "tag_path": "missing"})),
        )
        .await;

        assert!(result.is_err());

        Ok(())
    }

    #[tokio::test]
    async fn should_read_trimmed_fields_and_verbatim_body() -> anyhow::Result<()> {
        let dir = workspace()?;
        fs::write(dir.path().join("target"), "  main \n")?;
        let params = OutParams {
            name_path: "name".to_string(),
            tag_path: "tag".to_string(),
            target_path: Some("target".to_string()),
            body_path: Some("body".to_string()),
            ..OutParams::default()
        };

        let inputs = read_inputs(dir.path(), &params).await?;

        assert_eq!(inputs.title, "Version 2");
        assert_eq!(inputs.tag.value(), "v2.0.0");
        assert_eq!(inputs.target.as_deref(), Some("main"));
        assert_eq!(inputs.body.as_deref(), Some("## Changes\n"));
        assert_eq!(inputs.id, None);

        Ok(())
    }
}
