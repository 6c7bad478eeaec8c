use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode, header};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::download::{filename_or_fallback, save_stream};
use crate::format::display_file_name;
use crate::forms::{SearchQuery, UploadPayload, VideoPayload};
use crate::model::{
  ErrorBody, ExternalDownloadRequest, ImportRequest, LanguagesResponse, SearchOutcome, SearchResponse,
  StoredResponse, SubtitlePage,
};

// --- Errors ---

#[derive(Debug, Error)]
pub enum ApiError {
  /// Non-2xx response, with the body's `error` field when it had one.
  #[error("server returned {status}: {}", .message.as_deref().unwrap_or("no details"))]
  Server { status: StatusCode, message: Option<String> },
  /// Network failure or a body that didn't parse.
  #[error("request failed: {0}")]
  Transport(#[from] reqwest::Error),
  #[error("failed to read {}: {source}", .path.display())]
  File { path: PathBuf, source: std::io::Error },
  #[error("failed to save download: {0}")]
  Save(#[source] std::io::Error),
}

impl ApiError {
  /// Error text reported by the backend, if any.
  pub fn server_message(&self) -> Option<&str> {
    match self {
      ApiError::Server { message, .. } => message.as_deref(),
      _ => None,
    }
  }

  /// The backend's message when there is one, otherwise `fallback`.
  pub fn user_message(&self, fallback: &str) -> String {
    self.server_message().map_or_else(|| fallback.to_string(), str::to_string)
  }
}

async fn server_error(resp: Response) -> ApiError {
  let status = resp.status();
  let message = resp.json::<ErrorBody>().await.ok().and_then(|b| b.error).filter(|m| !m.is_empty());
  warn!(%status, message = message.as_deref().unwrap_or(""), "backend rejected request");
  ApiError::Server { status, message }
}

async fn ensure_success(resp: Response) -> Result<Response, ApiError> {
  if resp.status().is_success() { Ok(resp) } else { Err(server_error(resp).await) }
}

async fn file_part(path: &Path) -> Result<Part, ApiError> {
  let bytes = tokio::fs::read(path).await.map_err(|source| ApiError::File { path: path.to_path_buf(), source })?;
  Ok(Part::bytes(bytes).file_name(display_file_name(path)))
}

// --- Downloads ---

/// A successful file response whose body has not been read yet.
#[derive(Debug)]
pub struct Download {
  pub filename: String,
  response: Response,
}

impl Download {
  /// Name from `Content-Disposition`, or the fallback.
  fn from_disposition(response: Response) -> Self {
    let header = response.headers().get(header::CONTENT_DISPOSITION).and_then(|v| v.to_str().ok());
    let filename = filename_or_fallback(header);
    Self { filename, response }
  }

  /// Name chosen by the caller; the header is ignored.
  fn named(response: Response, filename: &str) -> Self {
    Self { filename: filename.to_string(), response }
  }

  /// Stream the body into `dir`, returning where it landed.
  pub async fn save_to(self, dir: &Path) -> Result<PathBuf, ApiError> {
    save_stream(dir, &self.filename, self.response.bytes_stream()).await.map_err(ApiError::Save)
  }
}

// --- Client ---

/// Typed client for the subtitle backend's `/api` routes.
#[derive(Debug, Clone)]
pub struct ApiClient {
  http: Client,
  base_url: String,
}

impl ApiClient {
  pub fn new(base_url: &str) -> Result<Self, ApiError> {
    let http = Client::builder().user_agent(concat!("subfox/", env!("CARGO_PKG_VERSION"))).build()?;
    Ok(Self { http, base_url: base_url.trim_end_matches('/').to_string() })
  }

  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.base_url, path)
  }

  /// `GET /api/search`. The body is classified whatever the status code,
  /// since the backend reports bad queries as `{"error": ...}` with a 400.
  pub async fn search(&self, query: &SearchQuery) -> Result<SearchOutcome, ApiError> {
    info!(query = %query.query, source = query.source.as_wire(), lang = ?query.language, "search");
    let resp = self.http.get(self.url("/api/search")).query(&query.params()).send().await?;
    let body: SearchResponse = resp.json().await?;
    Ok(body.into())
  }

  /// `GET /api/download/{id}`. Also bumps the server-side download counter.
  pub async fn download(&self, id: i64) -> Result<Download, ApiError> {
    debug!(id, "download local subtitle");
    let resp = self.http.get(self.url(&format!("/api/download/{}", id))).send().await?;
    Ok(Download::from_disposition(ensure_success(resp).await?))
  }

  /// `POST /api/download-external`, saved under the caller's filename.
  pub async fn download_external(&self, req: &ExternalDownloadRequest) -> Result<Download, ApiError> {
    debug!(url = %req.download_url, filename = %req.filename, "download external subtitle");
    let resp = self.http.post(self.url("/api/download-external")).json(req).send().await?;
    Ok(Download::named(ensure_success(resp).await?, &req.filename))
  }

  /// `POST /api/import-from-subtitlecat`.
  pub async fn import(&self, req: &ImportRequest) -> Result<StoredResponse, ApiError> {
    info!(url = %req.url, title = %req.title, "import external subtitle");
    let resp = self.http.post(self.url("/api/import-from-subtitlecat")).json(req).send().await?;
    Ok(ensure_success(resp).await?.json().await?)
  }

  /// `POST /api/upload` as multipart. Unset optional numbers are not sent.
  pub async fn upload(&self, payload: &UploadPayload) -> Result<StoredResponse, ApiError> {
    info!(file = %payload.file.display(), title = %payload.title, "upload subtitle");
    let mut form = Form::new().part("file", file_part(&payload.file).await?);
    for (name, value) in payload.text_fields() {
      form = form.text(name, value);
    }
    let resp = self.http.post(self.url("/api/upload")).multipart(form).send().await?;
    Ok(ensure_success(resp).await?.json().await?)
  }

  /// `POST /api/video-to-srt`. Blocks until the backend has transcribed the
  /// whole video; there is no progress reporting.
  pub async fn video_to_srt(&self, payload: &VideoPayload) -> Result<Download, ApiError> {
    info!(file = %payload.file.display(), language = %payload.language, "convert video to srt");
    let form = Form::new().part("video", file_part(&payload.file).await?).text("language", payload.language.clone());
    let resp = self.http.post(self.url("/api/video-to-srt")).multipart(form).send().await?;
    Ok(Download::from_disposition(ensure_success(resp).await?))
  }

  /// `GET /api/languages`: distinct languages of stored subtitles.
  pub async fn languages(&self) -> Result<Vec<String>, ApiError> {
    let resp = self.http.get(self.url("/api/languages")).send().await?;
    let body: LanguagesResponse = ensure_success(resp).await?.json().await?;
    Ok(body.languages)
  }

  /// `GET /api/subtitles`: most recent uploads, one page at a time.
  pub async fn recent(&self, page: u32, per_page: u32) -> Result<SubtitlePage, ApiError> {
    let resp = self
      .http
      .get(self.url("/api/subtitles"))
      .query(&[("page", page), ("per_page", per_page)])
      .send()
      .await?;
    Ok(ensure_success(resp).await?.json().await?)
  }
}
