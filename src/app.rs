use ratatui::widgets::ListState;
use std::collections::VecDeque;
use std::future::Future;
use std::path::PathBuf;
use std::time::Instant;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::config::Config;
use crate::constants::constants;
use crate::forms::{DownloadTarget, SearchQuery, UploadForm, VideoForm, import_request};
use crate::model::{ExternalDownloadRequest, ImportRequest, SearchOutcome, SearchResult, SearchSource, StoredResponse};
use crate::theme::THEMES;
use crate::view::{Navigation, ResultsView, SEARCH_FAILED_TEXT, Section};

// --- Messages ---

pub const UPLOADING_TEXT: &str = "Uploading...";
pub const UPLOAD_OK_TEXT: &str = "Subtitle uploaded successfully!";
pub const UPLOAD_FAILED_TEXT: &str = "Upload failed";
pub const UPLOAD_ERROR_TEXT: &str = "Error uploading subtitle. Please try again.";
pub const VIDEO_PROCESSING_LINES: [&str; 2] = [
  "Processing video... This may take a few minutes depending on video length.",
  "Extracting audio → Converting to text → Generating SRT file",
];
pub const VIDEO_OK_TEXT: &str = "SRT file generated and downloaded successfully!";
pub const VIDEO_FAILED_TEXT: &str = "Error processing video";
pub const VIDEO_ERROR_TEXT: &str = "Error processing video. Please try again.";
pub const DOWNLOAD_ERROR_TEXT: &str = "Error downloading subtitle. Please try again.";
pub const IMPORT_OK_TEXT: &str = "Subtitle imported successfully!";

pub const UPLOAD_LABELS: [&str; 6] = ["Subtitle file", "Title", "Language", "Year", "Season", "Episode"];
pub const VIDEO_LABELS: [&str; 2] = ["Video file", "Language"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
  Info,
  Success,
  Error,
}

/// An inline status message. Success messages hide themselves after a few seconds;
/// info and error messages stay until replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
  pub text: String,
  pub tone: Tone,
  expires_at: Option<Instant>,
}

impl Message {
  pub fn info(text: impl Into<String>) -> Self {
    Self { text: text.into(), tone: Tone::Info, expires_at: None }
  }

  pub fn success(text: impl Into<String>) -> Self {
    Self { text: text.into(), tone: Tone::Success, expires_at: Some(Instant::now() + constants().message_ttl()) }
  }

  pub fn error(text: impl Into<String>) -> Self {
    Self { text: text.into(), tone: Tone::Error, expires_at: None }
  }

  pub fn is_expired(&self, now: Instant) -> bool {
    self.expires_at.is_some_and(|t| now >= t)
  }
}

// --- Types ---

/// Which part of the screen receives typed keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
  /// Static sections: keys switch sections and scroll.
  Browse,
  Search,
  Results,
  Upload,
  Video,
}

/// Blocking dialog that takes all input until dismissed.
#[derive(Debug, Clone, PartialEq)]
pub enum Modal {
  Alert(String),
  ConfirmImport { prompt: String, request: ImportRequest },
}

/// Completion of a background request, delivered to the UI task.
#[derive(Debug)]
pub enum TaskEvent {
  Downloaded { external: bool, result: Result<PathBuf, ApiError> },
  Imported { title: String, result: Result<StoredResponse, ApiError> },
  Uploaded(Result<StoredResponse, ApiError>),
  Converted(Result<PathBuf, ApiError>),
  Languages(Result<Vec<String>, ApiError>),
}

/// In-flight search. Replacing it drops the previous receiver, so only the
/// newest search can update the results.
#[derive(Default)]
pub(crate) struct AsyncTasks {
  pub(crate) search_rx: Option<oneshot::Receiver<Result<SearchOutcome, ApiError>>>,
  /// Row to reselect when a refresh lands, instead of jumping to the top.
  pub(crate) keep_selection: Option<usize>,
}

pub struct App {
  pub api: ApiClient,
  pub download_dir: PathBuf,
  pub nav: Navigation,
  pub mode: AppMode,
  pub theme_index: usize,
  pub should_quit: bool,
  /// Cursor (char index) within whichever text field has focus.
  pub cursor: usize,

  // Search
  pub search_input: String,
  pub source: SearchSource,
  pub language_filter: Option<String>,
  pub language_choices: Vec<String>,
  pub results: ResultsView,
  pub list_state: ListState,

  // Upload
  pub upload: UploadForm,
  pub upload_path: String,
  pub upload_field: usize,
  pub upload_message: Option<Message>,
  pub upload_in_flight: bool,

  // Video to SRT
  pub video: VideoForm,
  pub video_path: String,
  pub video_field: usize,
  pub video_message: Option<Message>,
  pub video_in_flight: bool,

  pub modal: Option<Modal>,
  /// Dialogs waiting for the open one to be answered, oldest first.
  pub pending_modals: VecDeque<Modal>,
  /// One-line status under the main area (saved downloads and the like).
  pub status: Option<Message>,
  pub(crate) tasks: AsyncTasks,
  events_tx: mpsc::UnboundedSender<TaskEvent>,
  events_rx: mpsc::UnboundedReceiver<TaskEvent>,
}

impl App {
  pub fn new(api: ApiClient, config: &Config, download_dir: PathBuf) -> Self {
    let theme_index = config
      .theme_name
      .as_ref()
      .and_then(|name| THEMES.iter().position(|t| t.name == name))
      .unwrap_or(0);
    let (events_tx, events_rx) = mpsc::unbounded_channel();

    Self {
      api,
      download_dir,
      nav: Navigation::default(),
      mode: AppMode::Search,
      theme_index,
      should_quit: false,
      cursor: 0,
      search_input: String::new(),
      source: config.search_source(),
      language_filter: None,
      language_choices: Vec::new(),
      results: ResultsView::default(),
      list_state: ListState::default(),
      upload: UploadForm::default(),
      upload_path: String::new(),
      upload_field: 0,
      upload_message: None,
      upload_in_flight: false,
      video: VideoForm::default(),
      video_path: String::new(),
      video_field: 0,
      video_message: None,
      video_in_flight: false,
      modal: None,
      pending_modals: VecDeque::new(),
      status: None,
      tasks: AsyncTasks::default(),
      events_tx,
      events_rx,
    }
  }

  pub fn theme(&self) -> &'static crate::theme::Theme {
    // Safety: theme_index is always bounded by modular arithmetic in next_theme()
    // and by position() on initialization.
    &THEMES[self.theme_index]
  }

  pub fn next_theme(&mut self) {
    self.theme_index = (self.theme_index + 1) % THEMES.len();
    let mut config = Config::load();
    config.theme_name = Some(self.theme().name.to_string());
    config.save();
  }

  fn spawn_task<F>(&self, task: F)
  where
    F: Future<Output = TaskEvent> + Send + 'static,
  {
    let tx = self.events_tx.clone();
    tokio::spawn(async move {
      let _ = tx.send(task.await);
    });
  }

  /// Show a dialog, or queue it behind the one already open.
  fn open_modal(&mut self, modal: Modal) {
    if self.modal.is_some() {
      self.pending_modals.push_back(modal);
    } else {
      self.modal = Some(modal);
    }
  }

  fn alert(&mut self, text: impl Into<String>) {
    self.open_modal(Modal::Alert(text.into()));
  }

  /// Close the open dialog and bring up the next queued one.
  fn close_modal(&mut self) -> Option<Modal> {
    let next = self.pending_modals.pop_front();
    std::mem::replace(&mut self.modal, next)
  }

  // --- Navigation ---

  /// Show a section. Never fails; re-selecting the current section only scrolls to the top.
  pub fn navigate(&mut self, section: Section) {
    debug!(section = section.nav_label(), "navigate");
    self.nav.show(section);
    self.mode = match section {
      Section::Home => AppMode::Search,
      Section::Upload => AppMode::Upload,
      Section::VideoSrt => AppMode::Video,
      _ => AppMode::Browse,
    };
    self.cursor = self.focused_text().map_or(0, |t| t.chars().count());
  }

  pub fn next_section(&mut self) {
    self.navigate(self.nav.current().next());
  }

  pub fn prev_section(&mut self) {
    self.navigate(self.nav.current().prev());
  }

  /// The text buffer that typed characters go to, if any.
  pub fn focused_text(&self) -> Option<&String> {
    match self.mode {
      AppMode::Search => Some(&self.search_input),
      AppMode::Upload => Some(match self.upload_field {
        0 => &self.upload_path,
        1 => &self.upload.title,
        2 => &self.upload.language,
        3 => &self.upload.year,
        4 => &self.upload.season,
        _ => &self.upload.episode,
      }),
      AppMode::Video => Some(if self.video_field == 0 { &self.video_path } else { &self.video.language }),
      AppMode::Browse | AppMode::Results => None,
    }
  }

  pub fn focused_text_mut(&mut self) -> Option<&mut String> {
    match self.mode {
      AppMode::Search => Some(&mut self.search_input),
      AppMode::Upload => Some(match self.upload_field {
        0 => &mut self.upload_path,
        1 => &mut self.upload.title,
        2 => &mut self.upload.language,
        3 => &mut self.upload.year,
        4 => &mut self.upload.season,
        _ => &mut self.upload.episode,
      }),
      AppMode::Video => Some(if self.video_field == 0 { &mut self.video_path } else { &mut self.video.language }),
      AppMode::Browse | AppMode::Results => None,
    }
  }

  /// Keep the forms' selected files in step with the typed paths.
  pub fn sync_selected_files(&mut self) {
    self.upload.file = path_from_input(&self.upload_path);
    self.video.file = path_from_input(&self.video_path);
  }

  pub fn focus_field(&mut self, delta: isize) {
    let (field, count) = match self.mode {
      AppMode::Upload => (&mut self.upload_field, UPLOAD_LABELS.len()),
      AppMode::Video => (&mut self.video_field, VIDEO_LABELS.len()),
      _ => return,
    };
    *field = (*field as isize + delta).rem_euclid(count as isize) as usize;
    self.cursor = self.focused_text().map_or(0, |t| t.chars().count());
  }

  // --- Search ---

  pub fn selected_result(&self) -> Option<&SearchResult> {
    self.list_state.selected().and_then(|i| self.results.results().get(i))
  }

  pub fn search_in_flight(&self) -> bool {
    self.tasks.search_rx.is_some()
  }

  /// Run a search for the current input. An empty query only shows the
  /// validation message; anything else replaces whatever search was in flight.
  pub fn trigger_search(&mut self) {
    self.tasks.keep_selection = None;
    self.start_search();
  }

  /// Re-run the current search after a download or import, keeping the selected row.
  pub fn refresh_search(&mut self) {
    self.tasks.keep_selection = self.list_state.selected();
    self.start_search();
  }

  fn start_search(&mut self) {
    let query = match SearchQuery::new(&self.search_input, self.language_filter.as_deref(), self.source) {
      Ok(q) => q,
      Err(e) => {
        self.tasks.search_rx = None;
        self.results = ResultsView::Invalid(e.to_string());
        self.list_state.select(None);
        return;
      }
    };
    info!(query = %query.query, "search triggered");
    self.results = ResultsView::Loading;
    self.list_state.select(None);

    let api = self.api.clone();
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let _ = tx.send(api.search(&query).await);
    });
    self.tasks.search_rx = Some(rx);
  }

  fn apply_search(&mut self, result: Result<SearchOutcome, ApiError>) {
    match result {
      Ok(outcome) => {
        self.results = outcome.into();
        let len = self.results.results().len();
        if len == 0 {
          self.list_state.select(None);
        } else {
          let row = self.tasks.keep_selection.take().map_or(0, |i| i.min(len - 1));
          self.list_state.select(Some(row));
        }
      }
      Err(e) => {
        warn!(err = %e, "search failed");
        self.results = ResultsView::Error(SEARCH_FAILED_TEXT.to_string());
        self.list_state.select(None);
      }
    }
  }

  /// Step through "all languages" and the languages the backend knows about.
  pub fn cycle_language(&mut self) {
    if self.language_choices.is_empty() {
      self.language_filter = None;
      return;
    }
    let next = match &self.language_filter {
      None => Some(0),
      Some(current) => {
        self.language_choices.iter().position(|l| l == current).map(|i| i + 1).filter(|i| *i < self.language_choices.len())
      }
    };
    self.language_filter = next.map(|i| self.language_choices[i].clone());
  }

  pub fn trigger_languages(&self) {
    let api = self.api.clone();
    self.spawn_task(async move { TaskEvent::Languages(api.languages().await) });
  }

  pub fn select_next(&mut self) {
    let count = self.results.results().len();
    if count > 0 {
      let i = self.list_state.selected().map_or(0, |i| (i + 1) % count);
      self.list_state.select(Some(i));
    }
  }

  pub fn select_prev(&mut self) {
    let count = self.results.results().len();
    if count > 0 {
      let i = self.list_state.selected().map_or(0, |i| if i == 0 { count - 1 } else { i - 1 });
      self.list_state.select(Some(i));
    }
  }

  // --- Downloads ---

  /// Download the selected result: by id for local results, through the
  /// backend proxy for external ones.
  pub fn trigger_download(&mut self) {
    let Some(result) = self.selected_result() else { return };
    let title = result.title.clone();
    let target = match DownloadTarget::for_result(result) {
      Ok(t) => t,
      Err(e) => {
        self.alert(e.to_string());
        return;
      }
    };
    self.status = Some(Message::info(format!("Downloading '{}'…", title)));

    let api = self.api.clone();
    let dir = self.download_dir.clone();
    match target {
      DownloadTarget::Local { id } => self.spawn_task(async move {
        let result = match api.download(id).await {
          Ok(download) => download.save_to(&dir).await,
          Err(e) => Err(e),
        };
        TaskEvent::Downloaded { external: false, result }
      }),
      DownloadTarget::External { download_url, filename } => self.spawn_task(async move {
        let req = ExternalDownloadRequest { download_url, filename };
        let result = match api.download_external(&req).await {
          Ok(download) => download.save_to(&dir).await,
          Err(e) => Err(e),
        };
        TaskEvent::Downloaded { external: true, result }
      }),
    }
  }

  /// Ask for confirmation before importing the selected external result.
  pub fn request_import(&mut self) {
    let Some(request) = self.selected_result().and_then(import_request) else { return };
    let prompt = format!("Import \"{}\" to your local database?", request.title);
    self.open_modal(Modal::ConfirmImport { prompt, request });
  }

  /// Answer the open confirmation dialog. Declining sends nothing.
  pub fn answer_confirm(&mut self, accepted: bool) {
    if !matches!(self.modal, Some(Modal::ConfirmImport { .. })) {
      return;
    }
    let Some(Modal::ConfirmImport { request, .. }) = self.close_modal() else { return };
    if !accepted {
      debug!(title = %request.title, "import declined");
      return;
    }
    let api = self.api.clone();
    self.status = Some(Message::info(format!("Importing '{}'…", request.title)));
    self.spawn_task(async move {
      let result = api.import(&request).await;
      TaskEvent::Imported { title: request.title, result }
    });
  }

  pub fn dismiss_modal(&mut self) {
    match self.modal {
      Some(Modal::ConfirmImport { .. }) => self.answer_confirm(false),
      _ => {
        self.close_modal();
      }
    }
  }

  // --- Upload ---

  pub fn submit_upload(&mut self) {
    if self.upload_in_flight {
      return;
    }
    self.sync_selected_files();
    let payload = match self.upload.validate() {
      Ok(p) => p,
      Err(e) => {
        self.upload_message = Some(Message::error(e.to_string()));
        return;
      }
    };
    self.upload_message = Some(Message::info(UPLOADING_TEXT));
    self.upload_in_flight = true;

    let api = self.api.clone();
    self.spawn_task(async move { TaskEvent::Uploaded(api.upload(&payload).await) });
  }

  // --- Video to SRT ---

  pub fn submit_video(&mut self) {
    if self.video_in_flight {
      return;
    }
    self.sync_selected_files();
    let payload = match self.video.validate() {
      Ok(p) => p,
      Err(e) => {
        self.video_message = Some(Message::error(e.to_string()));
        return;
      }
    };
    self.video_message = None;
    self.video_in_flight = true;

    let api = self.api.clone();
    let dir = self.download_dir.clone();
    self.spawn_task(async move {
      let result = match api.video_to_srt(&payload).await {
        Ok(download) => download.save_to(&dir).await,
        Err(e) => Err(e),
      };
      TaskEvent::Converted(result)
    });
  }

  // --- Polling ---

  /// Apply finished background work. Called once per frame.
  pub fn check_pending(&mut self) {
    if let Some(mut rx) = self.tasks.search_rx.take() {
      match rx.try_recv() {
        Ok(result) => self.apply_search(result),
        Err(oneshot::error::TryRecvError::Empty) => {
          self.tasks.search_rx = Some(rx);
        }
        Err(oneshot::error::TryRecvError::Closed) => {
          self.results = ResultsView::Error(SEARCH_FAILED_TEXT.to_string());
        }
      }
    }

    while let Ok(event) = self.events_rx.try_recv() {
      self.handle_event(event);
    }

    self.expire_messages(Instant::now());
  }

  pub fn handle_event(&mut self, event: TaskEvent) {
    match event {
      TaskEvent::Downloaded { external, result } => match result {
        Ok(path) => {
          info!(path = %path.display(), external, "download saved");
          self.status = Some(Message::success(format!("Saved {}", path.display())));
          if !external {
            self.refresh_search();
          }
        }
        Err(e) => {
          warn!(err = %e, external, "download failed");
          self.status = None;
          if external {
            self.alert(format!("Error downloading subtitle: {}", e.user_message("Download failed")));
          } else {
            self.alert(DOWNLOAD_ERROR_TEXT);
          }
        }
      },
      TaskEvent::Imported { title, result } => match result {
        Ok(stored) => {
          info!(title = %title, id = ?stored.subtitle.map(|s| s.id), "import finished");
          self.status = None;
          self.alert(IMPORT_OK_TEXT);
          self.refresh_search();
        }
        Err(e) => {
          warn!(title = %title, err = %e, "import failed");
          self.status = None;
          self.alert(format!("Error importing subtitle: {}", e.user_message("Import failed")));
        }
      },
      TaskEvent::Uploaded(result) => {
        self.upload_in_flight = false;
        match result {
          Ok(stored) => {
            info!(id = ?stored.subtitle.map(|s| s.id), "upload finished");
            self.upload_message = Some(Message::success(UPLOAD_OK_TEXT));
            self.upload.reset();
            self.upload_path.clear();
            self.upload_field = 0;
            self.cursor = 0;
          }
          Err(e) => {
            warn!(err = %e, "upload failed");
            self.upload_message = Some(Message::error(failure_text(&e, UPLOAD_FAILED_TEXT, UPLOAD_ERROR_TEXT)));
          }
        }
      }
      TaskEvent::Converted(result) => {
        self.video_in_flight = false;
        match result {
          Ok(path) => {
            info!(path = %path.display(), "srt saved");
            self.video_message = Some(Message::success(VIDEO_OK_TEXT));
            self.video.reset();
            self.video_path.clear();
            self.video_field = 0;
            self.cursor = 0;
          }
          Err(e) => {
            warn!(err = %e, "video conversion failed");
            self.video_message = Some(Message::error(failure_text(&e, VIDEO_FAILED_TEXT, VIDEO_ERROR_TEXT)));
          }
        }
      }
      TaskEvent::Languages(result) => match result {
        Ok(languages) => {
          debug!(count = languages.len(), "languages loaded");
          self.language_choices = languages;
        }
        Err(e) => debug!(err = %e, "languages unavailable"),
      },
    }
  }

  /// Hide success messages whose time is up.
  pub fn expire_messages(&mut self, now: Instant) {
    for slot in [&mut self.upload_message, &mut self.video_message, &mut self.status] {
      if slot.as_ref().is_some_and(|m| m.is_expired(now)) {
        *slot = None;
      }
    }
  }
}

fn path_from_input(raw: &str) -> Option<PathBuf> {
  let raw = raw.trim();
  (!raw.is_empty()).then(|| PathBuf::from(raw))
}

/// Server text for rejected requests, `generic` for transport failures, and the
/// error itself for local file problems.
fn failure_text(err: &ApiError, rejected: &str, generic: &str) -> String {
  match err {
    ApiError::Server { .. } => err.user_message(rejected),
    ApiError::Transport(_) => generic.to_string(),
    ApiError::File { .. } | ApiError::Save(_) => err.to_string(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::tests::spawn_backend;
  use reqwest::StatusCode;
  use std::time::Duration;

  fn app_for(base: &str) -> App {
    let api = ApiClient::new(base).unwrap();
    App::new(api, &Config::default(), std::env::temp_dir())
  }

  fn offline_app() -> App {
    app_for("http://127.0.0.1:1")
  }

  async fn settle(app: &mut App) {
    for _ in 0..200 {
      app.check_pending();
      if !app.search_in_flight() && app.results != ResultsView::Loading {
        return;
      }
      tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("search did not settle");
  }

  fn rejected(message: &str) -> ApiError {
    ApiError::Server { status: StatusCode::BAD_REQUEST, message: Some(message.to_string()) }
  }

  // --- navigation ---

  #[test]
  fn navigation_sets_input_mode() {
    let mut app = offline_app();
    assert_eq!(app.nav.current(), Section::Home);
    assert_eq!(app.mode, AppMode::Search);
    app.navigate(Section::Upload);
    assert_eq!(app.mode, AppMode::Upload);
    app.navigate(Section::About);
    assert_eq!(app.mode, AppMode::Browse);
    app.navigate(Section::VideoSrt);
    assert_eq!(app.mode, AppMode::Video);
    app.next_section();
    assert_eq!(app.nav.current(), Section::Upload);
  }

  // --- search ---

  #[test]
  fn empty_query_shows_message_without_request() {
    let mut app = offline_app();
    app.search_input = "   ".into();
    app.trigger_search();
    assert_eq!(app.results, ResultsView::Invalid("Please enter a search term".into()));
    assert!(!app.search_in_flight());
  }

  #[tokio::test]
  async fn search_populates_results() {
    let (base, _) = spawn_backend().await;
    let mut app = app_for(&base);
    app.search_input = "dune".into();
    app.trigger_search();
    assert_eq!(app.results, ResultsView::Loading);
    settle(&mut app).await;
    assert_eq!(app.results.results().len(), 2);
    assert_eq!(app.list_state.selected(), Some(0));
    assert_eq!(app.results.results()[0].title, "dune|-|subtitlecat");
  }

  #[tokio::test]
  async fn newest_search_wins() {
    let (base, _) = spawn_backend().await;
    let mut app = app_for(&base);
    app.search_input = "first".into();
    app.trigger_search();
    app.search_input = "second".into();
    app.trigger_search();
    settle(&mut app).await;
    assert!(app.results.results()[0].title.starts_with("second|"));
  }

  #[tokio::test]
  async fn empty_results_show_empty_state() {
    let (base, _) = spawn_backend().await;
    let mut app = app_for(&base);
    app.search_input = "nothing".into();
    app.trigger_search();
    settle(&mut app).await;
    assert_eq!(app.results, ResultsView::Empty);
    assert_eq!(app.list_state.selected(), None);
  }

  #[tokio::test]
  async fn transport_failure_shows_generic_error() {
    let mut app = offline_app();
    app.search_input = "dune".into();
    app.trigger_search();
    settle(&mut app).await;
    assert_eq!(app.results, ResultsView::Error(SEARCH_FAILED_TEXT.into()));
  }

  #[tokio::test]
  async fn language_filter_is_sent() {
    let (base, _) = spawn_backend().await;
    let mut app = app_for(&base);
    app.language_choices = vec!["English".into(), "French".into()];
    app.cycle_language();
    app.cycle_language();
    assert_eq!(app.language_filter.as_deref(), Some("French"));
    app.search_input = "dune".into();
    app.trigger_search();
    settle(&mut app).await;
    assert_eq!(app.results.results()[0].title, "dune|French|subtitlecat");
  }

  #[test]
  fn cycle_language_wraps_to_all() {
    let mut app = offline_app();
    app.language_choices = vec!["English".into()];
    app.cycle_language();
    assert_eq!(app.language_filter.as_deref(), Some("English"));
    app.cycle_language();
    assert_eq!(app.language_filter, None);
  }

  // --- downloads and import ---

  #[tokio::test]
  async fn local_download_success_refreshes_search() {
    let mut app = offline_app();
    app.search_input = "dune".into();
    app.handle_event(TaskEvent::Downloaded { external: false, result: Ok(PathBuf::from("/tmp/movie.srt")) });
    assert!(app.search_in_flight());
    assert_eq!(app.results, ResultsView::Loading);
    assert_eq!(app.status.as_ref().map(|m| m.tone), Some(Tone::Success));
  }

  #[test]
  fn local_download_failure_alerts_generic() {
    let mut app = offline_app();
    app.handle_event(TaskEvent::Downloaded { external: false, result: Err(rejected("ignored")) });
    assert_eq!(app.modal, Some(Modal::Alert(DOWNLOAD_ERROR_TEXT.into())));
    assert!(!app.search_in_flight());
  }

  #[test]
  fn external_download_failure_alerts_server_text() {
    let mut app = offline_app();
    app.handle_event(TaskEvent::Downloaded { external: true, result: Err(rejected("Failed to download subtitle file")) });
    assert_eq!(app.modal, Some(Modal::Alert("Error downloading subtitle: Failed to download subtitle file".into())));
  }

  #[test]
  fn import_requires_confirmation() {
    let mut app = offline_app();
    app.results = ResultsView::List {
      source: SearchSource::SubtitleCat,
      results: vec![SearchResult {
        title: "Heat".into(),
        external: true,
        external_url: Some("https://sc/heat".into()),
        ..Default::default()
      }],
    };
    app.list_state.select(Some(0));
    app.request_import();
    let Some(Modal::ConfirmImport { prompt, request }) = app.modal.clone() else {
      panic!("expected confirmation");
    };
    assert_eq!(prompt, "Import \"Heat\" to your local database?");
    assert_eq!(request.language, "English");

    app.answer_confirm(false);
    assert_eq!(app.modal, None);
    assert_eq!(app.status, None);
  }

  #[test]
  fn import_is_not_offered_for_local_results() {
    let mut app = offline_app();
    app.results = ResultsView::List {
      source: SearchSource::Local,
      results: vec![SearchResult { id: Some(1), title: "Local".into(), ..Default::default() }],
    };
    app.list_state.select(Some(0));
    app.request_import();
    assert_eq!(app.modal, None);
  }

  fn external_heat() -> ResultsView {
    ResultsView::List {
      source: SearchSource::SubtitleCat,
      results: vec![SearchResult {
        title: "Heat".into(),
        year: Some(1995),
        external: true,
        external_url: Some("https://sc/heat".into()),
        ..Default::default()
      }],
    }
  }

  #[tokio::test]
  async fn confirmed_import_posts_request_and_refreshes() {
    let (base, received) = spawn_backend().await;
    let mut app = app_for(&base);
    app.search_input = "heat".into();
    app.results = external_heat();
    app.list_state.select(Some(0));
    app.request_import();
    app.answer_confirm(true);
    assert_eq!(app.modal, None);

    for _ in 0..200 {
      app.check_pending();
      if app.modal.is_some() {
        break;
      }
      tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(app.modal, Some(Modal::Alert(IMPORT_OK_TEXT.into())));
    assert!(app.search_in_flight() || !app.results.results().is_empty());
    let sent = received.lock().unwrap().clone();
    assert_eq!(
      sent,
      vec![
        ("url".to_string(), "\"https://sc/heat\"".to_string()),
        ("title".to_string(), "\"Heat\"".to_string()),
        ("language".to_string(), "\"English\"".to_string()),
        ("year".to_string(), "1995".to_string()),
      ]
    );
  }

  #[tokio::test]
  async fn import_success_alerts_and_refreshes_search() {
    let mut app = offline_app();
    app.search_input = "heat".into();
    app.handle_event(TaskEvent::Imported { title: "Heat".into(), result: Ok(StoredResponse::default()) });
    assert_eq!(app.modal, Some(Modal::Alert(IMPORT_OK_TEXT.into())));
    assert!(app.search_in_flight());
    assert_eq!(app.results, ResultsView::Loading);
  }

  #[test]
  fn external_download_success_does_not_refresh() {
    let mut app = offline_app();
    app.search_input = "heat".into();
    app.results = external_heat();
    app.handle_event(TaskEvent::Downloaded { external: true, result: Ok(PathBuf::from("/tmp/Heat.srt")) });
    assert!(!app.search_in_flight());
    assert_eq!(app.results, external_heat());
    assert_eq!(app.status.as_ref().map(|m| m.tone), Some(Tone::Success));
    assert_eq!(app.modal, None);
  }

  #[test]
  fn alert_waits_behind_open_confirmation() {
    let mut app = offline_app();
    app.results = external_heat();
    app.list_state.select(Some(0));
    app.request_import();
    app.handle_event(TaskEvent::Downloaded { external: false, result: Err(rejected("gone")) });
    assert!(matches!(app.modal, Some(Modal::ConfirmImport { .. })));

    app.answer_confirm(false);
    assert_eq!(app.modal, Some(Modal::Alert(DOWNLOAD_ERROR_TEXT.into())));
    app.dismiss_modal();
    assert_eq!(app.modal, None);
  }

  #[test]
  fn alerts_are_shown_in_arrival_order() {
    let mut app = offline_app();
    app.handle_event(TaskEvent::Downloaded { external: true, result: Err(rejected("Failed")) });
    app.handle_event(TaskEvent::Imported { title: "Heat".into(), result: Err(rejected("boom")) });
    assert_eq!(app.modal, Some(Modal::Alert("Error downloading subtitle: Failed".into())));
    app.dismiss_modal();
    assert_eq!(app.modal, Some(Modal::Alert("Error importing subtitle: boom".into())));
    app.dismiss_modal();
    assert_eq!(app.modal, None);
  }

  #[test]
  fn confirmation_waits_behind_open_alert() {
    let mut app = offline_app();
    app.handle_event(TaskEvent::Downloaded { external: false, result: Err(rejected("gone")) });
    app.results = external_heat();
    app.list_state.select(Some(0));
    app.request_import();
    assert_eq!(app.modal, Some(Modal::Alert(DOWNLOAD_ERROR_TEXT.into())));
    // Answering while an alert is open must not consume the queued confirmation.
    app.answer_confirm(true);
    assert_eq!(app.modal, Some(Modal::Alert(DOWNLOAD_ERROR_TEXT.into())));
    app.dismiss_modal();
    assert!(matches!(app.modal, Some(Modal::ConfirmImport { .. })));
  }

  #[test]
  fn import_failure_alerts_fallback() {
    let mut app = offline_app();
    let err = ApiError::Server { status: StatusCode::INTERNAL_SERVER_ERROR, message: None };
    app.handle_event(TaskEvent::Imported { title: "Heat".into(), result: Err(err) });
    assert_eq!(app.modal, Some(Modal::Alert("Error importing subtitle: Import failed".into())));
  }

  // --- upload ---

  fn filled_upload(app: &mut App) {
    app.upload_path = "/tmp/movie.srt".into();
    app.upload.title = "Movie".into();
    app.upload.year = "1999".into();
    app.sync_selected_files();
    app.upload_in_flight = true;
  }

  #[test]
  fn upload_validation_blocks_request() {
    let mut app = offline_app();
    app.upload.title = "Movie".into();
    app.submit_upload();
    assert_eq!(app.upload_message, Some(Message::error("Please select a file")));
    assert!(!app.upload_in_flight);
  }

  #[test]
  fn failed_upload_keeps_form() {
    let mut app = offline_app();
    filled_upload(&mut app);
    app.handle_event(TaskEvent::Uploaded(Err(rejected("Invalid file type"))));
    assert!(!app.upload_in_flight);
    assert_eq!(app.upload.title, "Movie");
    assert_eq!(app.upload.year, "1999");
    assert_eq!(app.upload.selected_file_name().as_deref(), Some("movie.srt"));
    assert_eq!(app.upload_message, Some(Message::error("Invalid file type")));
  }

  #[test]
  fn successful_upload_clears_form() {
    let mut app = offline_app();
    filled_upload(&mut app);
    app.handle_event(TaskEvent::Uploaded(Ok(StoredResponse::default())));
    assert_eq!(app.upload, UploadForm::default());
    assert!(app.upload_path.is_empty());
    assert_eq!(app.upload.selected_file_name(), None);
    let msg = app.upload_message.clone().unwrap();
    assert_eq!((msg.text.as_str(), msg.tone), (UPLOAD_OK_TEXT, Tone::Success));
  }

  #[test]
  fn success_message_expires_error_does_not() {
    let mut app = offline_app();
    app.upload_message = Some(Message::success(UPLOAD_OK_TEXT));
    app.video_message = Some(Message::error("boom"));
    app.expire_messages(Instant::now() + Duration::from_secs(4));
    assert!(app.upload_message.is_some());
    app.expire_messages(Instant::now() + Duration::from_secs(6));
    assert!(app.upload_message.is_none());
    assert!(app.video_message.is_some());
  }

  #[tokio::test]
  async fn upload_roundtrip_through_backend() {
    let (base, received) = spawn_backend().await;
    let mut app = app_for(&base);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("movie.srt");
    std::fs::write(&path, "1\n00:00:01,000 --> 00:00:02,000\nHi\n").unwrap();
    app.navigate(Section::Upload);
    app.upload_path = path.display().to_string();
    app.upload.title = "Movie".into();
    app.submit_upload();
    assert!(app.upload_in_flight);
    assert_eq!(app.upload_message, Some(Message::info(UPLOADING_TEXT)));

    for _ in 0..200 {
      app.check_pending();
      if !app.upload_in_flight {
        break;
      }
      tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(!app.upload_in_flight);
    assert!(app.upload_path.is_empty());
    let names: Vec<String> = received.lock().unwrap().iter().map(|(n, _)| n.clone()).collect();
    assert_eq!(names, vec!["file", "title", "language"]);
  }

  // --- video ---

  #[test]
  fn video_trigger_reenabled_after_success() {
    let mut app = offline_app();
    app.video_path = "/tmp/clip.mp4".into();
    app.video_in_flight = true;
    app.handle_event(TaskEvent::Converted(Ok(PathBuf::from("/tmp/clip.srt"))));
    assert!(!app.video_in_flight);
    assert!(app.video_path.is_empty());
    assert_eq!(app.video.selected_file_name(), None);
    assert_eq!(app.video_message.as_ref().map(|m| m.tone), Some(Tone::Success));
  }

  #[test]
  fn video_trigger_reenabled_after_failure() {
    let mut app = offline_app();
    app.video_path = "/tmp/clip.mp4".into();
    app.sync_selected_files();
    app.video_in_flight = true;
    app.handle_event(TaskEvent::Converted(Err(rejected("Invalid video file type"))));
    assert!(!app.video_in_flight);
    assert_eq!(app.video_message, Some(Message::error("Invalid video file type")));
    assert_eq!(app.video.selected_file_name().as_deref(), Some("clip.mp4"));
  }

  #[test]
  fn video_requires_file() {
    let mut app = offline_app();
    app.submit_video();
    assert!(!app.video_in_flight);
    assert_eq!(app.video_message, Some(Message::error("Please select a video file")));
  }

  #[tokio::test]
  async fn video_submit_ignored_while_processing() {
    let mut app = offline_app();
    app.video_path = "/tmp/clip.mp4".into();
    app.video_in_flight = true;
    app.submit_video();
    assert_eq!(app.video_message, None);
  }

  // --- forms ---

  #[test]
  fn focus_wraps_and_moves_cursor_to_end() {
    let mut app = offline_app();
    app.navigate(Section::Upload);
    app.upload.title = "abc".into();
    app.focus_field(1);
    assert_eq!(app.upload_field, 1);
    assert_eq!(app.cursor, 3);
    app.focus_field(-2);
    assert_eq!(app.upload_field, UPLOAD_LABELS.len() - 1);
  }
}
