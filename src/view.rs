//! View state shared by the terminal UI and the HTML renderer: which section
//! is showing, and what the results container currently holds.

use chrono::{DateTime, Utc};

use crate::format::{episode_label, format_upload_date};
use crate::model::{SearchOutcome, SearchResult, SearchSource};

// --- Navigation ---

/// A full-page view, shown or hidden as a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Section {
  #[default]
  Home,
  Enterprise,
  VideoSrt,
  Upload,
  About,
  Register,
  SignIn,
}

/// A visible block on screen. `Why` only ever appears alongside `Home`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
  Home,
  Why,
  Enterprise,
  VideoSrt,
  Upload,
  About,
  Register,
  SignIn,
}

impl Section {
  pub const ALL: [Section; 7] = [
    Section::Home,
    Section::Enterprise,
    Section::VideoSrt,
    Section::Upload,
    Section::About,
    Section::Register,
    Section::SignIn,
  ];

  /// Text of the nav link that gets the active highlight.
  pub fn nav_label(self) -> &'static str {
    match self {
      Section::Home => "Home",
      Section::Enterprise => "Enterprise",
      Section::VideoSrt => "Video to SRT",
      Section::Upload => "Upload",
      Section::About => "About",
      Section::Register => "Register",
      Section::SignIn => "Sign In",
    }
  }

  pub fn panels(self) -> &'static [Panel] {
    match self {
      Section::Home => &[Panel::Home, Panel::Why],
      Section::Enterprise => &[Panel::Enterprise],
      Section::VideoSrt => &[Panel::VideoSrt],
      Section::Upload => &[Panel::Upload],
      Section::About => &[Panel::About],
      Section::Register => &[Panel::Register],
      Section::SignIn => &[Panel::SignIn],
    }
  }

  fn index(self) -> usize {
    // Safety: every variant is listed in ALL.
    Section::ALL.iter().position(|s| *s == self).unwrap_or(0)
  }

  pub fn next(self) -> Self {
    Section::ALL[(self.index() + 1) % Section::ALL.len()]
  }

  pub fn prev(self) -> Self {
    Section::ALL[(self.index() + Section::ALL.len() - 1) % Section::ALL.len()]
  }
}

/// Which section is showing, plus its scroll offset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Navigation {
  current: Section,
  scroll: u16,
}

impl Navigation {
  pub fn current(&self) -> Section {
    self.current
  }

  /// Show `section`, hiding every other one and scrolling back to the top.
  pub fn show(&mut self, section: Section) {
    self.current = section;
    self.scroll = 0;
  }

  pub fn is_visible(&self, panel: Panel) -> bool {
    self.current.panels().contains(&panel)
  }

  pub fn is_section_visible(&self, section: Section) -> bool {
    self.current == section
  }

  pub fn scroll(&self) -> u16 {
    self.scroll
  }

  pub fn scroll_by(&mut self, delta: i16) {
    self.scroll = self.scroll.saturating_add_signed(delta);
  }
}

// --- Results container ---

pub const LOADING_TEXT: &str = "Searching SubtitleFox...";
pub const NO_RESULTS_TEXT: &str = "No subtitles found. Try a different search term.";
pub const SEARCH_FAILED_TEXT: &str = "Error searching subtitles. Please try again.";
pub const SUBTITLECAT_BANNER: &str = "Results from Subtitle Cat website";

/// Contents of the results container.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ResultsView {
  /// Nothing searched yet.
  #[default]
  Idle,
  /// Client-side validation failed; no request was sent.
  Invalid(String),
  Loading,
  /// Backend-reported or transport error.
  Error(String),
  Empty,
  List { source: SearchSource, results: Vec<SearchResult> },
}

impl From<SearchOutcome> for ResultsView {
  fn from(outcome: SearchOutcome) -> Self {
    match outcome {
      SearchOutcome::Rejected(msg) => ResultsView::Error(msg),
      SearchOutcome::Found { results, .. } if results.is_empty() => ResultsView::Empty,
      SearchOutcome::Found { source, results } => ResultsView::List { source, results },
    }
  }
}

impl ResultsView {
  pub fn results(&self) -> &[SearchResult] {
    match self {
      ResultsView::List { results, .. } => results,
      _ => &[],
    }
  }

  /// Banner shown above the list, if the source has one.
  pub fn banner(&self) -> Option<&'static str> {
    match self {
      ResultsView::List { source: SearchSource::SubtitleCat, .. } => Some(SUBTITLECAT_BANNER),
      _ => None,
    }
  }
}

// --- Cards ---

/// A metadata badge on a result card. Only present fields produce one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Badge {
  Language(String),
  Year(i32),
  Episode(String),
  Downloads(u64),
  Uploaded(String),
  External,
}

impl Badge {
  pub fn text(&self) -> String {
    match self {
      Badge::Language(l) => l.clone(),
      Badge::Year(y) => y.to_string(),
      Badge::Episode(e) => e.clone(),
      Badge::Downloads(n) => format!("{} downloads", n),
      Badge::Uploaded(age) => age.clone(),
      Badge::External => "External".to_string(),
    }
  }

  /// Font Awesome icon class used by the HTML renderer.
  pub fn icon(&self) -> &'static str {
    match self {
      Badge::Language(_) => "fa-language",
      Badge::Year(_) => "fa-calendar",
      Badge::Episode(_) => "fa-tv",
      Badge::Downloads(_) => "fa-download",
      Badge::Uploaded(_) => "fa-clock",
      Badge::External => "fa-external-link-alt",
    }
  }
}

pub fn badges(result: &SearchResult, now: DateTime<Utc>) -> Vec<Badge> {
  let mut out = Vec::new();
  if let Some(lang) = result.language.as_ref().filter(|l| !l.is_empty()) {
    out.push(Badge::Language(lang.clone()));
  }
  if let Some(year) = result.year.filter(|y| *y != 0) {
    out.push(Badge::Year(year));
  }
  if let Some(label) = episode_label(result.season, result.episode) {
    out.push(Badge::Episode(label));
  }
  if let Some(n) = result.downloads {
    out.push(Badge::Downloads(n));
  }
  if let Some(date) = result.upload_date.as_ref().filter(|d| !d.is_empty()) {
    out.push(Badge::Uploaded(format_upload_date(date, now)));
  }
  if result.external {
    out.push(Badge::External);
  }
  out
}

/// Buttons on a result card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardAction {
  Download,
  Import,
}

impl CardAction {
  pub fn label(self) -> &'static str {
    match self {
      CardAction::Download => "Download",
      CardAction::Import => "Import",
    }
  }
}

/// External results can be downloaded or imported; local ones only downloaded.
pub fn actions(result: &SearchResult) -> &'static [CardAction] {
  if result.external { &[CardAction::Download, CardAction::Import] } else { &[CardAction::Download] }
}
