//! Typed HTTP client for the remote processing service.
//!
//! One method per endpoint, all built on a shared [`reqwest::Client`] pool.
//! Error responses are folded into [`ApiError`] with the service-supplied
//! detail preserved, so handlers can surface them verbatim.

use std::path::Path;

use reqwest::{StatusCode, Url, multipart};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use subflow_bridge::config::Provider;
use subflow_timeline::SubtitleEntry;
use subflow_timeline::naming::ExportFormat;

/// Errors surfaced by remote-service calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Connection, timeout or protocol-level failure.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The service rejected the request and supplied a reason.
    #[error("service error ({status}): {detail}")]
    Service { status: StatusCode, detail: String },
    /// The service does not know the referenced task.
    #[error("task not found")]
    TaskNotFound,
    /// A local file headed for upload could not be read.
    #[error("failed to read upload source: {0}")]
    Io(#[from] std::io::Error),
    /// The configured service base URL does not parse.
    #[error("invalid service URL {0}")]
    InvalidBaseUrl(String),
}

/// Response to a media upload.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    /// Task identity; older service builds call this `file_id`.
    #[serde(alias = "file_id")]
    pub task_id: String,
    /// Server-side filename, unique per upload.
    pub filename: String,
    /// Stream reference, typically relative to the service root.
    pub url: String,
}

/// Response to a subtitle-file upload.
#[derive(Debug, Clone, Deserialize)]
pub struct SubtitleUploadResponse {
    pub task_id: String,
    pub filename: String,
    pub subtitles: Vec<SubtitleEntry>,
}

/// Response to a transcription submission.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitResponse {
    pub task_id: String,
}

/// Wire statuses reported for a task.
///
/// Unknown values map to `Other` so new intermediate stages on the service
/// never break the poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteStatus {
    Pending,
    Preprocessing,
    Transcribing,
    Processing,
    Cancelled,
    Completed,
    Failed,
    #[serde(other)]
    Other,
}

/// One status-poll payload.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskStatus {
    pub status: RemoteStatus,
    /// Lines generated so far; grows while the task runs.
    #[serde(default)]
    pub subtitles: Vec<SubtitleEntry>,
    #[serde(default)]
    pub translated_subtitles: Option<Vec<SubtitleEntry>>,
    #[serde(default)]
    pub error: Option<String>,
    /// Server-rendered artifact for a finished task.
    #[serde(default, rename = "srt_url")]
    pub download_url: Option<String>,
}

/// Response to a translation request.
#[derive(Debug, Clone, Deserialize)]
pub struct TranslateResponse {
    pub translated_subtitles: Vec<SubtitleEntry>,
}

/// Parameters of a translation submission.
#[derive(Debug, Clone)]
pub struct TranslationRequest<'a> {
    pub task_id: Option<&'a str>,
    /// The original track, pre-encoded as JSON.
    pub subtitles_json: String,
    pub target_language: &'a str,
    pub provider: Provider,
    /// May be empty for providers that do not need one.
    pub api_key: &'a str,
    pub system_prompt: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

/// Thin typed wrapper over the service's HTTP API.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    http: reqwest::Client,
    base: Url,
}

impl ServiceClient {
    /// Builds a client for the given base URL. A missing trailing slash is
    /// tolerated, anything else about the URL must parse.
    pub fn new(http: reqwest::Client, base_url: &str) -> Result<Self, ApiError> {
        let mut normalized = base_url.trim().to_string();
        if !normalized.ends_with('/') {
            normalized.push('/');
        }
        let base = Url::parse(&normalized)
            .map_err(|err| ApiError::InvalidBaseUrl(format!("{base_url:?}: {err}")))?;
        Ok(Self { http, base })
    }

    /// Same connection pool, different base URL.
    pub fn rebase(&self, base_url: &str) -> Result<Self, ApiError> {
        Self::new(self.http.clone(), base_url)
    }

    fn endpoint(&self, path: &str) -> Url {
        self.base
            .join(path)
            .expect("failed to append a path to the service URL")
    }

    /// Absolute URL for streaming an uploaded media file.
    pub fn stream_url(&self, filename: &str) -> String {
        self.endpoint(&format!("stream/{filename}")).to_string()
    }

    /// Resolves a reference returned by the service (usually rooted, like
    /// `/stream/...`) against the configured base.
    pub fn absolute_url(&self, reference: &str) -> String {
        match self.base.join(reference.trim_start_matches('/')) {
            Ok(url) => url.to_string(),
            Err(_) => reference.to_string(),
        }
    }

    /// Uploads a media file for streaming and later transcription.
    pub async fn upload_media(&self, path: &Path) -> Result<UploadResponse, ApiError> {
        let form = Self::file_form(path).await?;
        let response = self
            .http
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Uploads an existing subtitle file, creating a completed task.
    pub async fn upload_subtitle(&self, path: &Path) -> Result<SubtitleUploadResponse, ApiError> {
        let form = Self::file_form(path).await?;
        let response = self
            .http
            .post(self.endpoint("upload_srt"))
            .multipart(form)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Asks the service to start transcribing an uploaded media file.
    pub async fn submit_transcription(
        &self,
        filename: &str,
        language: &str,
        max_line_width: u32,
    ) -> Result<SubmitResponse, ApiError> {
        let response = self
            .http
            .post(self.endpoint("transcribe"))
            .form(&[
                ("filename", filename.to_string()),
                ("language", language.to_string()),
                ("max_width", max_line_width.to_string()),
            ])
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Fetches the task's current status. A 404 maps to
    /// [`ApiError::TaskNotFound`].
    pub async fn task_status(&self, task_id: &str) -> Result<TaskStatus, ApiError> {
        let response = self
            .http
            .get(self.endpoint(&format!("status/{task_id}")))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::TaskNotFound);
        }
        Self::decode(response).await
    }

    /// Submits the original track for translation and waits for the result.
    pub async fn translate(
        &self,
        request: TranslationRequest<'_>,
    ) -> Result<TranslateResponse, ApiError> {
        let mut form: Vec<(&str, String)> = Vec::with_capacity(6);
        if let Some(task_id) = request.task_id {
            form.push(("task_id", task_id.to_string()));
        }
        form.push(("subtitles_json", request.subtitles_json));
        form.push(("target_lang", request.target_language.to_string()));
        form.push(("model_provider", request.provider.as_form_value().to_string()));
        form.push(("api_key", request.api_key.to_string()));
        if let Some(prompt) = request.system_prompt {
            form.push(("system_prompt", prompt.to_string()));
        }

        let response = self
            .http
            .post(self.endpoint("translate"))
            .form(&form)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Renders the task's subtitles in the given format and returns the
    /// file content.
    pub async fn export(&self, task_id: &str, format: ExportFormat) -> Result<Vec<u8>, ApiError> {
        let response = self
            .http
            .post(self.endpoint("export"))
            .form(&[
                ("task_id", task_id.to_string()),
                ("format", format.as_form_value().to_string()),
            ])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::service_error(response).await);
        }
        Ok(response.bytes().await?.to_vec())
    }

    /// Asks the service to abort a running task.
    pub async fn cancel(&self, task_id: &str) -> Result<(), ApiError> {
        let response = self
            .http
            .post(self.endpoint(&format!("cancel/{task_id}")))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::service_error(response).await);
        }
        Ok(())
    }

    /// Asks the service to unload its speech model and free memory.
    pub async fn release_model(&self) -> Result<(), ApiError> {
        let response = self
            .http
            .post(self.endpoint("model/asr/release"))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::service_error(response).await);
        }
        Ok(())
    }

    async fn file_form(path: &Path) -> Result<multipart::Form, ApiError> {
        let data = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| String::from("upload"));
        let part = multipart::Part::bytes(data).file_name(name);
        Ok(multipart::Form::new().part("file", part))
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        if !response.status().is_success() {
            return Err(Self::service_error(response).await);
        }
        Ok(response.json().await?)
    }

    async fn service_error(response: reqwest::Response) -> ApiError {
        let status = response.status();
        let detail = match response.json::<ErrorBody>().await {
            Ok(body) => body.detail,
            Err(_) => format!("service returned {status}"),
        };
        ApiError::Service { status, detail }
    }
}
