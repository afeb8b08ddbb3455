use super::{InOutResponse, InRequest, Version};
use crate::{
    config::{MetadataFile, MetadataFiles, Source},
    gitea::{assets::download_assets, Error, GiteaClient, Lookup, Release, Tag},
};
use anyhow::{Context, Result};
use chrono::SecondsFormat;
use std::path::Path;

/// Writes the release metadata files and matching attachments into `destination`.
pub async fn get(destination: &Path, request: &InRequest) -> Result<InOutResponse> {
    let source = &request.source;
    source.validate().context("Invalid source configuration")?;

    let client = source.client();
    let release = find_release(&client, source, &request.version).await?;
    log::info!("fetching release {} ({})", release.tag, release.id);

    tokio::fs::create_dir_all(destination)
        .await
        .with_context(|| format!("Cannot create destination {}", destination.display()))?;
    write_metadata(destination, &release, &request.params.metadata).await?;

    let downloaded = download_assets(&client, &release, destination, &request.params.globs())
        .await
        .context("Cannot download release assets")?;
    log::info!("downloaded {} asset(s)", downloaded.len());

    Ok(InOutResponse::from(&release))
}

async fn find_release(
    client: &GiteaClient,
    source: &Source,
    version: &Version,
) -> Result<Release> {
    let releases = client.repo(&source.owner, &source.repository).releases();

    match version.id.trim().parse::<i64>() {
        Ok(id) => {
            if let Lookup::Found(release) = releases.find(id).await? {
                return Ok(release);
            }
            log::warn!("release {} not found, looking up tag {}", id, version.tag);
        }
        Err(_) => log::warn!(
            "version id `{}` is not numeric, looking up tag {}",
            version.id,
            version.tag
        ),
    }

    let tag = Tag::new(&version.tag);
    if !tag.is_empty() {
        if let Lookup::Found(release) = releases.find_by_tag(&tag).await? {
            return Ok(release);
        }
    }

    Err(Error::ReleaseNotFound(format!("with id `{}` or tag `{}`", version.id, version.tag)).into())
}

async fn write_metadata(
    destination: &Path,
    release: &Release,
    enabled: &MetadataFiles,
) -> Result<()> {
    for file in MetadataFile::ALL {
        if !enabled.contains(file) {
            continue;
        }

        let content = match file {
            MetadataFile::Id => release.id.to_string(),
            MetadataFile::Timestamp => release
                .published_at
                .to_rfc3339_opts(SecondsFormat::AutoSi, true),
            MetadataFile::Name => release.title.to_owned(),
            MetadataFile::Target => release.target.to_owned(),
            MetadataFile::Url => release.html_url.to_owned(),
            MetadataFile::Tag => release.tag.to_owned(),
            MetadataFile::Body => release.body.to_owned(),
        };
        if content.is_empty() {
            continue;
        }

        let path = destination.join(file.file_name());
        tokio::fs::write(&path, content)
            .await
            .with_context(|| format!("Cannot write {}", path.display()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::read_request;
    use mockito::{Server, ServerGuard};
    use serde_json::json;
    use std::fs;
    use tempdir::TempDir;

    const RELEASE_PATH: &str = "/api/v1/repos/owner/repo/releases/12";
    const TAG_PATH: &str = "/api/v1/repos/owner/repo/releases/tags/v1.2.0";

    fn release_json(server: &ServerGuard) -> String {
        json!({
            "id": 12,
            "tag_name": "v1.2.0",
            "target_commitish": "main",
            "name": "Release 1.2.0",
            "body": "",
            "html_url": "https://gitea.example.com/owner/repo/releases/tag/v1.2.0",
            "prerelease": false,
            "published_at": "2024-03-01T10:00:00Z",
            "assets": [
                {"id": 3, "name": "app.tar.gz", "browser_download_url": format!("{}/attachments/3", server.url())},
                {"id": 4, "name": "app.zip", "browser_download_url": format!("{}/attachments/4", server.url())},
            ]
        })
        .to_string()
    }

    fn request(
        server: &ServerGuard,
        version: serde_json::Value,
        params: serde_json::Value,
    ) -> InRequest {
        read_request(
            json!({
                "source": {"gitea_url": server.url(), "owner": "owner", "repository": "repo"},
                "version": version,
                "params": params,
            })
            .to_string()
            .as_bytes(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn should_write_metadata_and_matching_assets() -> anyhow::Result<()> {
        let mut server = Server::new_async().await;
        let body = release_json(&server);
        server
            .mock("GET", RELEASE_PATH)
            .with_body(body)
            .create_async()
            .await;
        server
            .mock("GET", "/attachments/3")
            .with_body("tarball")
            .create_async()
            .await;
        let zip = server
            .mock("GET", "/attachments/4")
            .expect(0)
            .create_async()
            .await;

        let dest = TempDir::new("in")?;
        let response = get(
            dest.path(),
            &request(
                &server,
                json!({"tag": "v1.2.0", "id": "12"}),
                json!({"globs": ["*.tar.gz"]}),
            ),
        )
        .await?;

        zip.assert_async().await;
        assert_eq!(fs::read_to_string(dest.path().join("id"))?, "12");
        assert_eq!(fs::read_to_string(dest.path().join("tag"))?, "v1.2.0");
        assert_eq!(fs::read_to_string(dest.path().join("name"))?, "Release 1.2.0");
        assert_eq!(fs::read_to_string(dest.path().join("target"))?, "main");
        assert_eq!(
            fs::read_to_string(dest.path().join("timestamp"))?,
            "2024-03-01T10:00:00Z"
        );
        assert!(!dest.path().join("body").exists());
        assert_eq!(
            fs::read_to_string(dest.path().join("assets/app.tar.gz"))?,
            "tarball"
        );
        assert!(!dest.path().join("assets/app.zip").exists());
        assert_eq!(response.version.id, "12");
        assert_eq!(response.version.tag, "v1.2.0");

        Ok(())
    }

    #[tokio::test]
    async fn should_write_only_enabled_metadata_files() -> anyhow::Result<()> {
        let mut server = Server::new_async().await;
        let body = release_json(&server);
        server
            .mock("GET", RELEASE_PATH)
            .with_body(body)
            .create_async()
            .await;

        let dest = TempDir::new("in")?;
        get(
            dest.path(),
            &request(
                &server,
                json!({"tag": "v1.2.0", "id": "12"}),
                json!({"metadata": ["url", "timestamp"], "globs": ["none-*"]}),
            ),
        )
        .await?;

        assert!(dest.path().join("url").exists());
        assert!(dest.path().join("timestamp").exists());
        assert!(!dest.path().join("id").exists());
        assert!(!dest.path().join("tag").exists());

        Ok(())
    }

    #[tokio::test]
    async fn should_fall_back_to_tag_when_id_is_unknown() -> anyhow::Result<()> {
        let mut server = Server::new_async().await;
        let body = release_json(&server);
        server
            .mock("GET", "/api/v1/repos/owner/repo/releases/99")
            .with_status(404)
            .create_async()
            .await;
        let by_tag = server
            .mock("GET", TAG_PATH)
            .with_body(body)
            .create_async()
            .await;

        let dest = TempDir::new("in")?;
        let response = get(
            dest.path(),
            &request(
                &server,
                json!({"tag": "v1.2.0", "id": "99"}),
                json!({"globs": ["nothing"]}),
            ),
        )
        .await?;

        by_tag.assert_async().await;
        assert_eq!(response.version.id, "12");

        Ok(())
    }

    #[tokio::test]
    async fn should_fail_when_neither_id_nor_tag_exist() -> anyhow::Result<()> {
        let mut server = Server::new_async().await;
        server
            .mock("GET", RELEASE_PATH)
            .with_status(404)
            .create_async()
            .await;
        server
            .mock("GET", TAG_PATH)
            .with_status(404)
            .create_async()
            .await;

        let dest = TempDir::new("in")?;
        let result = get(
            dest.path(),
            &request(&server, json!({"tag": "v1.2.0", "id": "12"}), json!({})),
        )
        .await;

        assert!(result.is_err());

        Ok(())
    }
}
