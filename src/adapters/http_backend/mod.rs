//! HTTP backend adapter
//!
//! Talks to the trimming service over its JSON/multipart API:
//! `GET /health`, `POST /api/upload`, `POST /api/trim`, `GET /api/videos`,
//! `DELETE /api/videos/{filename}` and `DELETE /api/output/{filename}`.
//!
//! Non-2xx answers become [`DomainError::Backend`] carrying the `detail`
//! field of the error body; requests that never get a usable answer become
//! [`DomainError::Transport`].

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::media_type_for;
use crate::ports::BackendPort;

/// Longest raw error body echoed back when it is not JSON
const MAX_RAW_DETAIL: usize = 200;

#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// Backend adapter over reqwest
pub struct HttpBackendAdapter {
    client: Client,
    base: Url,
}

impl HttpBackendAdapter {
    /// Create an adapter for the service rooted at `base_url`
    pub fn new(base_url: &str) -> Result<Self, DomainError> {
        let base = parse_base_url(base_url)?;
        let client = Client::builder()
            .user_agent(concat!("trimx-studio/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DomainError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// URL of an API endpoint; each segment is percent-encoded
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, DomainError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| {
                DomainError::Config(format!("Backend URL cannot be a base: {}", self.base))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn read_json<T: DeserializeOwned>(
        phase: RequestPhase,
        result: Result<Response, reqwest::Error>,
    ) -> Result<T, DomainError> {
        let response = result.map_err(|e| DomainError::Transport {
            phase,
            message: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::Backend {
                phase,
                status: status.as_u16(),
                message: error_detail(status, &body),
            });
        }

        response.json::<T>().await.map_err(|e| DomainError::Transport {
            phase,
            message: format!("Invalid response body: {}", e),
        })
    }
}

/// Parse and normalise the backend base URL
pub fn parse_base_url(base_url: &str) -> Result<Url, DomainError> {
    let url = Url::parse(base_url.trim())
        .map_err(|e| DomainError::Config(format!("Invalid backend URL '{}': {}", base_url, e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(DomainError::Config(format!(
            "Backend URL must use http or https: {}",
            base_url
        )));
    }
    Ok(url)
}

/// Human-readable error text from a failed response
///
/// Prefers the `detail` field of a JSON body, then a short raw body, then
/// the status reason phrase.
pub fn error_detail(status: StatusCode, body: &str) -> String {
    if let Ok(ErrorBody { detail }) = serde_json::from_str::<ErrorBody>(body) {
        return match detail {
            serde_json::Value::String(text) => text,
            serde_json::Value::Null => fallback_reason(status),
            other => other.to_string(),
        };
    }

    let raw = body.trim();
    if !raw.is_empty() && raw.len() <= MAX_RAW_DETAIL && !raw.starts_with('<') {
        return raw.to_string();
    }
    fallback_reason(status)
}

fn fallback_reason(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

#[async_trait]
impl BackendPort for HttpBackendAdapter {
    #[instrument(skip(self))]
    async fn health(&self) -> Result<HealthReport, DomainError> {
        let url = self.endpoint(&["health"])?;
        let result = self.client.get(url).send().await;
        Self::read_json(RequestPhase::Health, result).await
    }

    #[instrument(skip(self, file), fields(filename = %file.filename, bytes = file.size()))]
    async fn upload(&self, file: &UploadFile) -> Result<VideoDescriptor, DomainError> {
        let url = self.endpoint(&["api", "upload"])?;
        let media_type = file
            .media_type
            .clone()
            .unwrap_or_else(|| media_type_for(&file.filename).to_string());

        let part = Part::bytes(file.data.clone())
            .file_name(file.filename.clone())
            .mime_str(&media_type)
            .map_err(|e| DomainError::Validation(format!("Invalid media type: {}", e)))?;
        let form = Form::new().part("file", part);

        debug!(%url, %media_type, "Sending upload");
        let result = self.client.post(url).multipart(form).send().await;
        Self::read_json(RequestPhase::Upload, result).await
    }

    #[instrument(skip(self, request), fields(video = %request.video_filename, segments = request.segments.len()))]
    async fn trim(&self, request: &TrimRequest) -> Result<OutputDescriptor, DomainError> {
        let url = self.endpoint(&["api", "trim"])?;
        let result = self.client.post(url).json(request).send().await;
        Self::read_json(RequestPhase::Process, result).await
    }

    async fn list_videos(&self) -> Result<Vec<VideoDescriptor>, DomainError> {
        let url = self.endpoint(&["api", "videos"])?;
        let result = self.client.get(url).send().await;
        Self::read_json(RequestPhase::Library, result).await
    }

    async fn delete_video(&self, filename: &str) -> Result<DeleteReport, DomainError> {
        let url = self.endpoint(&["api", "videos", filename])?;
        let result = self.client.delete(url).send().await;
        Self::read_json(RequestPhase::Library, result).await
    }

    async fn delete_output(&self, filename: &str) -> Result<DeleteReport, DomainError> {
        let url = self.endpoint(&["api", "output", filename])?;
        let result = self.client.delete(url).send().await;
        Self::read_json(RequestPhase::Library, result).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response and return the request head
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        serve_once_after(Duration::ZERO, status_line, body).await
    }

    /// Like `serve_once`, holding the response back for `delay`
    async fn serve_once_after(
        delay: Duration,
        status_line: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            tokio::time::sleep(delay).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&request).to_string()
        });

        (base, handle)
    }

    #[test]
    fn test_endpoint_join() {
        let adapter = HttpBackendAdapter::new("http://localhost:8000/").unwrap();
        assert_eq!(
            adapter.endpoint(&["api", "trim"]).unwrap().as_str(),
            "http://localhost:8000/api/trim"
        );

        let nested = HttpBackendAdapter::new("http://host/trimmer").unwrap();
        assert_eq!(
            nested.endpoint(&["health"]).unwrap().as_str(),
            "http://host/trimmer/health"
        );
    }

    #[test]
    fn test_endpoint_encodes_filenames() {
        let adapter = HttpBackendAdapter::new("http://localhost:8000").unwrap();
        assert_eq!(
            adapter
                .endpoint(&["api", "videos", "my clip#1.mp4"])
                .unwrap()
                .as_str(),
            "http://localhost:8000/api/videos/my%20clip%231.mp4"
        );
    }

    #[test]
    fn test_rejects_bad_base_url() {
        assert!(HttpBackendAdapter::new("not a url").is_err());
        assert!(HttpBackendAdapter::new("ftp://host").is_err());
    }

    #[test]
    fn test_error_detail() {
        assert_eq!(
            error_detail(StatusCode::BAD_REQUEST, r#"{"detail":"No segments provided"}"#),
            "No segments provided"
        );
        assert_eq!(
            error_detail(
                StatusCode::UNPROCESSABLE_ENTITY,
                r#"{"detail":[{"msg":"field required"}]}"#
            ),
            r#"[{"msg":"field required"}]"#
        );
        assert_eq!(
            error_detail(StatusCode::BAD_GATEWAY, "upstream down"),
            "upstream down"
        );
        assert_eq!(
            error_detail(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>"),
            "Internal Server Error"
        );
        assert_eq!(error_detail(StatusCode::NOT_FOUND, ""), "Not Found");
    }

    #[tokio::test]
    async fn test_health_roundtrip() {
        let (base, server) =
            serve_once("200 OK", r#"{"status":"healthy","ffmpeg_available":false}"#).await;
        let adapter = HttpBackendAdapter::new(&base).unwrap();

        let report = adapter.health().await.unwrap();
        assert_eq!(report.status.as_deref(), Some("healthy"));
        assert!(!report.ffmpeg_available);
        assert!(server.await.unwrap().starts_with("GET /health "));
    }

    #[tokio::test]
    async fn test_slow_backend_is_awaited() {
        let (base, server) = serve_once_after(
            Duration::from_millis(1500),
            "200 OK",
            r#"{"status":"healthy","ffmpeg_available":true}"#,
        )
        .await;
        let adapter = HttpBackendAdapter::new(&base).unwrap();

        let report = adapter.health().await.unwrap();
        assert!(report.ffmpeg_available);
        assert!(server.await.unwrap().starts_with("GET /health "));
    }

    #[tokio::test]
    async fn test_backend_error_carries_detail() {
        let (base, server) = serve_once("404 Not Found", r#"{"detail":"File not found"}"#).await;
        let adapter = HttpBackendAdapter::new(&base).unwrap();

        let err = adapter.delete_output("gone.mp4").await.unwrap_err();
        assert_eq!(
            err,
            DomainError::Backend {
                phase: RequestPhase::Library,
                status: 404,
                message: "File not found".to_string(),
            }
        );
        assert!(server
            .await
            .unwrap()
            .starts_with("DELETE /api/output/gone.mp4 "));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let adapter = HttpBackendAdapter::new(&base).unwrap();
        let err = adapter.list_videos().await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::Transport {
                phase: RequestPhase::Library,
                ..
            }
        ));
        assert!(err.user_message().starts_with("Request failed: "));
    }
}
