// HTTP download adapter - Saves backend outputs into a local directory

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client, Response, Url};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::adapters::http_backend::{error_detail, parse_base_url};
use crate::domain::errors::*;
use crate::ports::{SavePort, SavedDownload};
use crate::utils::time::format_bytes;

/// Streams a URL to `<download_dir>/<filename>`
pub struct HttpDownloadAdapter {
    client: Client,
    base: Url,
    download_dir: PathBuf,
}

impl HttpDownloadAdapter {
    /// Relative URLs are resolved against `base_url`
    pub fn new(base_url: &str, download_dir: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let client = Client::builder()
            .user_agent(concat!("trimx-studio/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DomainError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base: parse_base_url(base_url)?,
            download_dir: download_dir.into(),
        })
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Absolute URLs are used as given; anything else lands under the base path
    fn resolve(&self, url: &str) -> Result<Url, DomainError> {
        if let Ok(absolute) = Url::parse(url) {
            return Ok(absolute);
        }

        let mut base = self.base.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.join(url.trim_start_matches('/'))
            .map_err(|e| DomainError::Validation(format!("Invalid download URL '{}': {}", url, e)))
    }

    fn io_error(action: &str, path: &Path, e: std::io::Error) -> DomainError {
        DomainError::Io(format!("Failed to {} {}: {}", action, path.display(), e))
    }
}

/// Stream the body into `partial`, then move it to `target`
async fn write_partial(
    response: Response,
    partial: &Path,
    target: &Path,
) -> Result<u64, DomainError> {
    let mut file = tokio::fs::File::create(partial)
        .await
        .map_err(|e| HttpDownloadAdapter::io_error("create", partial, e))?;

    let mut downloaded: u64 = 0;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| DomainError::Transport {
            phase: RequestPhase::Download,
            message: e.to_string(),
        })?;
        file.write_all(&chunk)
            .await
            .map_err(|e| HttpDownloadAdapter::io_error("write", partial, e))?;
        downloaded += chunk.len() as u64;
    }

    file.flush()
        .await
        .map_err(|e| HttpDownloadAdapter::io_error("write", partial, e))?;
    drop(file);
    tokio::fs::rename(partial, target)
        .await
        .map_err(|e| HttpDownloadAdapter::io_error("rename", partial, e))?;
    Ok(downloaded)
}

/// Reduce a server-provided name to a plain file name
///
/// Directory components are dropped so the file always lands inside the
/// download directory.
pub fn sanitize_filename(filename: &str) -> Result<String, DomainError> {
    let name = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    if name.is_empty() || name == "." || name == ".." {
        return Err(DomainError::Validation(format!(
            "Invalid download filename: '{}'",
            filename
        )));
    }
    Ok(name.to_string())
}

#[async_trait]
impl SavePort for HttpDownloadAdapter {
    async fn save(&self, url: &str, filename: &str) -> Result<SavedDownload, DomainError> {
        let filename = sanitize_filename(filename)?;
        let resolved = self.resolve(url)?;
        info!("Downloading {} from {}", filename, resolved);

        let response = self
            .client
            .get(resolved.clone())
            .send()
            .await
            .map_err(|e| DomainError::Transport {
                phase: RequestPhase::Download,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::Backend {
                phase: RequestPhase::Download,
                status: status.as_u16(),
                message: error_detail(status, &body),
            });
        }

        tokio::fs::create_dir_all(&self.download_dir)
            .await
            .map_err(|e| Self::io_error("create", &self.download_dir, e))?;

        let target = self.download_dir.join(&filename);
        let partial = self.download_dir.join(format!("{}.part", filename));
        let downloaded = match write_partial(response, &partial, &target).await {
            Ok(downloaded) => downloaded,
            Err(error) => {
                tokio::fs::remove_file(&partial).await.ok();
                return Err(error);
            }
        };

        debug!(bytes = downloaded, path = %target.display(), "Download finished");
        info!("Saved {} ({})", target.display(), format_bytes(downloaded));

        Ok(SavedDownload {
            url: resolved.to_string(),
            filename,
            location: target.display().to_string(),
            bytes: downloaded,
        })
    }
}
