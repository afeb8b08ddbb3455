use super::{
    error::{AssetError, AssetErrors, Error, Result},
    gitea_client::GiteaClient,
    release::Release,
};
use glob::{MatchOptions, Pattern};
use std::{
    collections::HashSet,
    future::Future,
    io,
    path::{Path, PathBuf},
};

pub const ASSETS_DIR: &str = "assets";

// `*` stops at `/`, as in a shell
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Shell-glob patterns selecting assets; no patterns selects everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Globs(Vec<String>);

impl Globs {
    pub fn new(patterns: Vec<String>) -> Self {
        Globs(patterns)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Something to transfer: the name globs are matched against and where the bytes live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetItem<L> {
    pub name: String,
    pub location: L,
}

impl<L> AssetItem<L> {
    pub fn new(name: impl Into<String>, location: L) -> Self {
        AssetItem {
            name: name.into(),
            location,
        }
    }
}

/// Keeps the items matching any glob; malformed patterns come back as failures.
pub fn select<L>(items: Vec<AssetItem<L>>, globs: &Globs) -> (Vec<AssetItem<L>>, Vec<AssetError>) {
    if globs.is_empty() {
        return (items, vec![]);
    }

    let mut patterns = Vec::with_capacity(globs.0.len());
    let mut failures = vec![];
    for raw in &globs.0 {
        match Pattern::new(raw) {
            Ok(pattern) => patterns.push(pattern),
            Err(err) => failures.push(AssetError {
                name: raw.to_owned(),
                cause: Error::InvalidGlob {
                    pattern: raw.to_owned(),
                    reason: err.msg.to_owned(),
                },
            }),
        }
    }

    let selected = items
        .into_iter()
        .filter(|item| {
            patterns
                .iter()
                .any(|pattern| pattern.matches_with(&item.name, MATCH_OPTIONS))
        })
        .collect();

    (selected, failures)
}

/// Runs `transfer` for every selected item concurrently and reports all failures together.
///
/// Returns the names of the transferred items. A failing item never cancels its siblings.
pub async fn sync<L, F, Fut>(
    items: Vec<AssetItem<L>>,
    globs: &Globs,
    transfer: F,
) -> Result<Vec<String>>
where
    F: Fn(AssetItem<L>) -> Fut,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    let (selected, failures) = select(items, globs);

    transfer_all(selected, failures, transfer).await
}

async fn transfer_all<L, F, Fut>(
    selected: Vec<AssetItem<L>>,
    mut failures: Vec<AssetError>,
    transfer: F,
) -> Result<Vec<String>>
where
    F: Fn(AssetItem<L>) -> Fut,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    if selected.is_empty() {
        log::info!("no assets matched");
    }

    let tasks: Vec<_> = selected
        .into_iter()
        .map(|item| (item.name.clone(), tokio::spawn(transfer(item))))
        .collect();

    let mut transferred = Vec::with_capacity(tasks.len());
    for (name, task) in tasks {
        let outcome = task
            .await
            .unwrap_or_else(|err| Err(Error::TaskFailed(err.to_string())));

        match outcome {
            Ok(()) => {
                log::info!("transferred asset {}", name);
                transferred.push(name);
            }
            Err(cause) => {
                log::error!("failed to transfer asset {}: {}", name, cause);
                failures.push(AssetError { name, cause });
            }
        }
    }

    if failures.is_empty() {
        Ok(transferred)
    } else {
        Err(AssetErrors(failures).into())
    }
}

/// Uploads the files below `source_dir` matching `globs`, replacing attachments of the same name.
pub async fn upload_assets(
    client: &GiteaClient,
    owner: &str,
    repo: &str,
    release: &Release,
    source_dir: &Path,
    globs: &Globs,
) -> Result<Vec<String>> {
    let items = local_files(source_dir)?;
    log::debug!("found {} candidate files in {}", items.len(), source_dir.display());

    let (selected, mut failures) = select(items, globs);
    let (unique, duplicates) = unique_file_names(selected);
    failures.extend(duplicates);

    transfer_all(unique, failures, |item: AssetItem<PathBuf>| {
        let client = client.clone();
        let owner = owner.to_owned();
        let repo = repo.to_owned();
        let release_id = release.id;
        let file_name = item
            .location
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());
        let replaced = file_name
            .as_deref()
            .and_then(|name| release.attachment(name))
            .map(|attachment| attachment.id);

        async move {
            let name = file_name.ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, "asset path has no file name")
            })?;

            if let Some(attachment_id) = replaced {
                log::info!("replacing existing attachment {}", name);
                client
                    .repo(&owner, &repo)
                    .releases()
                    .delete_attachment(release_id, attachment_id)
                    .await?;
            }

            log::info!("uploading {}", item.location.display());
            client
                .upload_attachment(&owner, &repo, release_id, &item.location, &name)
                .await?;

            Ok::<_, Error>(())
        }
    })
    .await
}

/// Downloads the release attachments matching `globs` into `<destination>/assets`.
pub async fn download_assets(
    client: &GiteaClient,
    release: &Release,
    destination: &Path,
    globs: &Globs,
) -> Result<Vec<String>> {
    let assets_dir = destination.join(ASSETS_DIR);
    tokio::fs::create_dir_all(&assets_dir).await?;

    let items = release
        .attachments
        .iter()
        .map(|attachment| AssetItem::new(&attachment.name, attachment.download_url.to_owned()))
        .collect();

    sync(items, globs, |item: AssetItem<String>| {
        let client = client.clone();
        let target = Path::new(&item.name)
            .file_name()
            .map(|name| assets_dir.join(name));

        async move {
            let target = target.ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, "attachment has no usable name")
            })?;

            log::info!("downloading {} to {}", item.name, target.display());
            client.download(&item.location, &target).await?;

            Ok::<_, Error>(())
        }
    })
    .await
}

/// Keeps the first file for every attachment name; later files with the same base name fail.
fn unique_file_names(
    items: Vec<AssetItem<PathBuf>>,
) -> (Vec<AssetItem<PathBuf>>, Vec<AssetError>) {
    let mut seen = HashSet::new();
    let mut unique = vec![];
    let mut duplicates = vec![];

    for item in items {
        let file_name = item
            .location
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());

        match file_name {
            Some(file_name) if !seen.insert(file_name.to_owned()) => {
                duplicates.push(AssetError {
                    name: item.name,
                    cause: Error::DuplicateAttachment(file_name),
                })
            }
            _ => unique.push(item),
        }
    }

    (unique, duplicates)
}

fn local_files(source_dir: &Path) -> Result<Vec<AssetItem<PathBuf>>> {
    let pattern = format!("{}/**/*", Pattern::escape(&source_dir.to_string_lossy()));

    let mut items = vec![];
    for entry in glob::glob(&pattern).map_err(|err| Error::InvalidGlob {
        pattern: pattern.to_owned(),
        reason: err.msg.to_owned(),
    })? {
        let path = entry.map_err(|err| err.into_error())?;
        if !path.is_file() {
            continue;
        }

        let name = path
            .strip_prefix(source_dir)
            .unwrap_or(&path)
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        items.push(AssetItem::new(name, path));
    }

    Ok(items)
}
