use clap::ValueEnum;
use serde::{Deserialize, Serialize};

// --- Search ---

/// Where the backend should look for subtitles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SearchSource {
  /// The backend's own database.
  #[default]
  Local,
  /// Scraped from the Subtitle Cat website.
  #[value(name = "subtitlecat")]
  SubtitleCat,
}

impl SearchSource {
  pub fn as_wire(self) -> &'static str {
    match self {
      SearchSource::Local => "local",
      SearchSource::SubtitleCat => "subtitlecat",
    }
  }

  /// Unknown or missing tags are treated as local results.
  pub fn from_wire(s: &str) -> Self {
    match s.trim().to_lowercase().as_str() {
      "subtitlecat" => SearchSource::SubtitleCat,
      _ => SearchSource::Local,
    }
  }
}

/// A single subtitle as returned by `/api/search`.
///
/// Local results carry an `id`; external ones carry `download_url`,
/// `external_url` and a suggested `filename` instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
  pub id: Option<i64>,
  pub title: String,
  pub language: Option<String>,
  pub year: Option<i32>,
  pub season: Option<u32>,
  pub episode: Option<u32>,
  pub downloads: Option<u64>,
  pub upload_date: Option<String>,
  #[serde(default)]
  pub external: bool,
  pub download_url: Option<String>,
  pub external_url: Option<String>,
  pub filename: Option<String>,
}

/// Raw `/api/search` body. Either `error` is set, or `results`/`source` are.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
  pub error: Option<String>,
  pub results: Option<Vec<SearchResult>>,
  pub source: Option<String>,
}

/// Classified outcome of a search request.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
  /// The backend reported a logical error.
  Rejected(String),
  Found { source: SearchSource, results: Vec<SearchResult> },
}

impl From<SearchResponse> for SearchOutcome {
  fn from(resp: SearchResponse) -> Self {
    if let Some(error) = resp.error.filter(|e| !e.is_empty()) {
      return SearchOutcome::Rejected(error);
    }
    let source = resp.source.as_deref().map_or(SearchSource::Local, SearchSource::from_wire);
    SearchOutcome::Found { source, results: resp.results.unwrap_or_default() }
  }
}

// --- Requests ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExternalDownloadRequest {
  pub download_url: String,
  pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportRequest {
  pub url: String,
  pub title: String,
  pub language: String,
  pub year: Option<i32>,
}

// --- Responses ---

/// Error body shared by every endpoint: `{"error": "..."}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
  pub error: Option<String>,
}

/// Success body of `/api/upload` and `/api/import-from-subtitlecat`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoredResponse {
  pub message: Option<String>,
  pub subtitle: Option<StoredSubtitle>,
}

/// A subtitle row as stored by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredSubtitle {
  pub id: i64,
  pub title: String,
  pub language: Option<String>,
  pub season: Option<u32>,
  pub episode: Option<u32>,
  pub year: Option<i32>,
  pub filename: Option<String>,
  pub upload_date: Option<String>,
  pub downloads: Option<u64>,
  pub file_size: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LanguagesResponse {
  #[serde(default)]
  pub languages: Vec<String>,
}

/// One page of `/api/subtitles`, newest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubtitlePage {
  #[serde(default)]
  pub subtitles: Vec<StoredSubtitle>,
  pub total: u64,
  pub pages: u32,
  pub current_page: u32,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn search_error_field_wins() {
    let resp: SearchResponse = serde_json::from_str(r#"{"error": "Search query is required"}"#).unwrap();
    assert_eq!(SearchOutcome::from(resp), SearchOutcome::Rejected("Search query is required".to_string()));
  }

  #[test]
  fn search_missing_fields_default_to_empty_local() {
    let resp: SearchResponse = serde_json::from_str("{}").unwrap();
    assert_eq!(SearchOutcome::from(resp), SearchOutcome::Found { source: SearchSource::Local, results: vec![] });
  }

  #[test]
  fn search_result_ignores_unknown_fields() {
    let body = r#"{
      "results": [{
        "id": null, "title": "Dune", "language": "English", "season": null, "episode": null,
        "year": 2021, "filename": "Dune.srt", "upload_date": null, "downloads": 0, "file_size": 0,
        "external": true, "external_url": "https://x/a", "download_url": "https://x/a.srt",
        "source": "subtitlecat.com"
      }],
      "count": 1,
      "source": "subtitlecat"
    }"#;
    let resp: SearchResponse = serde_json::from_str(body).unwrap();
    let SearchOutcome::Found { source, results } = SearchOutcome::from(resp) else {
      panic!("expected results");
    };
    assert_eq!(source, SearchSource::SubtitleCat);
    assert_eq!(results.len(), 1);
    assert!(results[0].external);
    assert_eq!(results[0].year, Some(2021));
    assert_eq!(results[0].id, None);
  }

  #[test]
  fn external_flag_defaults_to_false() {
    let r: SearchResult = serde_json::from_str(r#"{"id": 3, "title": "Local"}"#).unwrap();
    assert!(!r.external);
    assert_eq!(r.id, Some(3));
  }

  #[test]
  fn source_wire_names() {
    assert_eq!(SearchSource::from_wire("subtitlecat"), SearchSource::SubtitleCat);
    assert_eq!(SearchSource::from_wire("local"), SearchSource::Local);
    assert_eq!(SearchSource::from_wire("whatever"), SearchSource::Local);
    assert_eq!(SearchSource::SubtitleCat.as_wire(), "subtitlecat");
  }
}
