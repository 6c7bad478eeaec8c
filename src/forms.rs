//! Pure validation and payload construction for every user-initiated request.
//!
//! Nothing here touches the network or the terminal; the controller turns a
//! `ValidationError` into an inline message and only sends what a `validate`
//! call returned.

use std::path::PathBuf;
use thiserror::Error;

use crate::constants::constants;
use crate::format::display_file_name;
use crate::model::{ImportRequest, SearchResult, SearchSource};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("Please enter a search term")]
  EmptyQuery,
  #[error("Please select a file")]
  MissingFile,
  #[error("Please enter a title")]
  MissingTitle,
  #[error("Please select a video file")]
  MissingVideo,
  #[error("{0} must be a number")]
  NotANumber(&'static str),
  #[error("This result cannot be downloaded")]
  NotDownloadable,
}

// --- Search ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
  pub query: String,
  pub language: Option<String>,
  pub source: SearchSource,
}

impl SearchQuery {
  /// Trimmed query is required; a blank language means "any".
  pub fn new(query: &str, language: Option<&str>, source: SearchSource) -> Result<Self, ValidationError> {
    let query = query.trim();
    if query.is_empty() {
      return Err(ValidationError::EmptyQuery);
    }
    let language = language.map(str::trim).filter(|l| !l.is_empty()).map(str::to_string);
    Ok(Self { query: query.to_string(), language, source })
  }

  /// Query-string pairs in wire order: `q`, `source`, then `lang` if set.
  pub fn params(&self) -> Vec<(&'static str, String)> {
    let mut params = vec![("q", self.query.clone()), ("source", self.source.as_wire().to_string())];
    if let Some(lang) = &self.language {
      params.push(("lang", lang.clone()));
    }
    params
  }
}

// --- Result actions ---

/// What a result card's download button does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadTarget {
  Local { id: i64 },
  External { download_url: String, filename: String },
}

impl DownloadTarget {
  pub fn for_result(result: &SearchResult) -> Result<Self, ValidationError> {
    if result.external {
      let download_url = result.download_url.clone().filter(|u| !u.is_empty()).ok_or(ValidationError::NotDownloadable)?;
      let filename = result.filename.clone().unwrap_or_else(|| format!("{}.srt", result.title));
      Ok(DownloadTarget::External { download_url, filename })
    } else {
      result.id.map(|id| DownloadTarget::Local { id }).ok_or(ValidationError::NotDownloadable)
    }
  }
}

/// Import payload for an external result. Language defaults to English.
/// Returns `None` for local results, which have nothing to import.
pub fn import_request(result: &SearchResult) -> Option<ImportRequest> {
  if !result.external {
    return None;
  }
  let url = result.external_url.clone().filter(|u| !u.is_empty())?;
  let language = result
    .language
    .clone()
    .filter(|l| !l.trim().is_empty())
    .unwrap_or_else(|| constants().default_language.clone());
  Some(ImportRequest { url, title: result.title.clone(), language, year: result.year })
}

// --- Upload ---

/// Raw upload form fields as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadForm {
  pub file: Option<PathBuf>,
  pub title: String,
  pub language: String,
  pub year: String,
  pub season: String,
  pub episode: String,
}

/// A validated upload, ready to be sent as multipart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPayload {
  pub file: PathBuf,
  pub title: String,
  pub language: String,
  pub year: Option<i32>,
  pub season: Option<u32>,
  pub episode: Option<u32>,
}

fn optional_number<T: std::str::FromStr>(raw: &str, field: &'static str) -> Result<Option<T>, ValidationError> {
  let raw = raw.trim();
  if raw.is_empty() {
    return Ok(None);
  }
  raw.parse().map(Some).map_err(|_| ValidationError::NotANumber(field))
}

impl UploadForm {
  /// Checks the file first, then the title.
  pub fn validate(&self) -> Result<UploadPayload, ValidationError> {
    let file = self.file.clone().ok_or(ValidationError::MissingFile)?;
    let title = self.title.trim();
    if title.is_empty() {
      return Err(ValidationError::MissingTitle);
    }
    let language = match self.language.trim() {
      "" => constants().default_language.clone(),
      l => l.to_string(),
    };
    Ok(UploadPayload {
      file,
      title: title.to_string(),
      language,
      year: optional_number(&self.year, "Year")?,
      season: optional_number(&self.season, "Season")?,
      episode: optional_number(&self.episode, "Episode")?,
    })
  }

  pub fn selected_file_name(&self) -> Option<String> {
    self.file.as_deref().map(display_file_name)
  }

  pub fn reset(&mut self) {
    *self = Self::default();
  }
}

impl UploadPayload {
  /// Text parts in wire order. Optional numbers are left out entirely when unset.
  pub fn text_fields(&self) -> Vec<(&'static str, String)> {
    let mut fields = vec![("title", self.title.clone()), ("language", self.language.clone())];
    if let Some(year) = self.year {
      fields.push(("year", year.to_string()));
    }
    if let Some(season) = self.season {
      fields.push(("season", season.to_string()));
    }
    if let Some(episode) = self.episode {
      fields.push(("episode", episode.to_string()));
    }
    fields
  }
}

// --- Video to SRT ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoForm {
  pub file: Option<PathBuf>,
  pub language: String,
}

impl Default for VideoForm {
  fn default() -> Self {
    Self { file: None, language: constants().default_video_language.clone() }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoPayload {
  pub file: PathBuf,
  pub language: String,
}

impl VideoForm {
  pub fn validate(&self) -> Result<VideoPayload, ValidationError> {
    let file = self.file.clone().ok_or(ValidationError::MissingVideo)?;
    let language = match self.language.trim() {
      "" => constants().default_video_language.clone(),
      l => l.to_string(),
    };
    Ok(VideoPayload { file, language })
  }

  pub fn selected_file_name(&self) -> Option<String> {
    self.file.as_deref().map(display_file_name)
  }

  pub fn reset(&mut self) {
    *self = Self::default();
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn upload_form() -> UploadForm {
    UploadForm { file: Some(PathBuf::from("/tmp/movie.srt")), title: "  The Movie ".to_string(), ..Default::default() }
  }

  // --- search ---

  #[test]
  fn empty_query_is_rejected() {
    assert_eq!(SearchQuery::new("   ", None, SearchSource::Local), Err(ValidationError::EmptyQuery));
    assert_eq!(ValidationError::EmptyQuery.to_string(), "Please enter a search term");
  }

  #[test]
  fn search_params_in_order() {
    let q = SearchQuery::new(" dune ", Some("French"), SearchSource::SubtitleCat).unwrap();
    assert_eq!(
      q.params(),
      vec![("q", "dune".to_string()), ("source", "subtitlecat".to_string()), ("lang", "French".to_string())]
    );
  }

  #[test]
  fn blank_language_is_omitted() {
    let q = SearchQuery::new("dune", Some("  "), SearchSource::Local).unwrap();
    assert_eq!(q.language, None);
    assert_eq!(q.params().len(), 2);
  }

  // --- result actions ---

  #[test]
  fn download_target_local_and_external() {
    let local = SearchResult { id: Some(7), title: "A".into(), ..Default::default() };
    assert_eq!(DownloadTarget::for_result(&local), Ok(DownloadTarget::Local { id: 7 }));

    let ext = SearchResult {
      title: "B".into(),
      external: true,
      download_url: Some("https://sc/b.srt".into()),
      ..Default::default()
    };
    assert_eq!(
      DownloadTarget::for_result(&ext),
      Ok(DownloadTarget::External { download_url: "https://sc/b.srt".into(), filename: "B.srt".into() })
    );
  }

  #[test]
  fn download_target_requires_locator() {
    let local = SearchResult { title: "A".into(), ..Default::default() };
    assert_eq!(DownloadTarget::for_result(&local), Err(ValidationError::NotDownloadable));
  }

  #[test]
  fn import_defaults_language() {
    let ext = SearchResult {
      title: "B".into(),
      external: true,
      external_url: Some("https://sc/b".into()),
      year: Some(1999),
      ..Default::default()
    };
    let req = import_request(&ext).unwrap();
    assert_eq!(req.language, "English");
    assert_eq!(req.year, Some(1999));
    assert!(import_request(&SearchResult { external: false, ..ext }).is_none());
  }

  // --- upload ---

  #[test]
  fn upload_checks_file_before_title() {
    let form = UploadForm::default();
    assert_eq!(form.validate(), Err(ValidationError::MissingFile));
    let form = UploadForm { file: Some(PathBuf::from("a.srt")), title: " ".into(), ..Default::default() };
    assert_eq!(form.validate(), Err(ValidationError::MissingTitle));
  }

  #[test]
  fn upload_without_optionals_omits_them() {
    let payload = upload_form().validate().unwrap();
    assert_eq!(payload.title, "The Movie");
    assert_eq!(payload.language, "English");
    let names: Vec<_> = payload.text_fields().into_iter().map(|(k, _)| k).collect();
    assert_eq!(names, vec!["title", "language"]);
  }

  #[test]
  fn upload_with_optionals_includes_them() {
    let form = UploadForm {
      language: "German".into(),
      year: "2011".into(),
      season: "1".into(),
      episode: " 4 ".into(),
      ..upload_form()
    };
    let fields = form.validate().unwrap().text_fields();
    assert_eq!(
      fields,
      vec![
        ("title", "The Movie".to_string()),
        ("language", "German".to_string()),
        ("year", "2011".to_string()),
        ("season", "1".to_string()),
        ("episode", "4".to_string()),
      ]
    );
  }

  #[test]
  fn upload_rejects_non_numeric() {
    let form = UploadForm { season: "one".into(), ..upload_form() };
    assert_eq!(form.validate(), Err(ValidationError::NotANumber("Season")));
    let year = UploadForm { year: "19x9".into(), ..upload_form() };
    assert_eq!(year.validate().unwrap_err().to_string(), "Year must be a number");
  }

  #[test]
  fn upload_reset_clears_everything() {
    let mut form = UploadForm { year: "2000".into(), ..upload_form() };
    assert_eq!(form.selected_file_name().as_deref(), Some("movie.srt"));
    form.reset();
    assert_eq!(form, UploadForm::default());
    assert_eq!(form.selected_file_name(), None);
  }

  // --- video ---

  #[test]
  fn video_requires_file() {
    assert_eq!(VideoForm::default().validate(), Err(ValidationError::MissingVideo));
  }

  #[test]
  fn video_blank_language_uses_default() {
    let form = VideoForm { file: Some(PathBuf::from("clip.mp4")), language: String::new() };
    assert_eq!(form.validate().unwrap().language, "en-US");
  }
}
