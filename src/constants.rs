//! Defaults and labels from `constants.ron`, embedded with `include_str!` and
//! parsed once on first access.

use serde::Deserialize;
use std::sync::LazyLock;
use std::time::Duration;

/// All tuneable application constants.
#[derive(Debug, Deserialize)]
pub struct Constants {
  pub brand: String,

  // Backend
  pub default_server_url: String,
  pub default_search_source: String,

  // Forms
  pub default_language: String,
  pub default_video_language: String,
  pub fallback_filename: String,

  // Messages
  pub message_ttl_secs: u64,

  // Listing
  pub recent_per_page: u32,
}

impl Constants {
  /// How long success messages stay on screen before auto-hiding.
  pub fn message_ttl(&self) -> Duration {
    Duration::from_secs(self.message_ttl_secs)
  }
}

static CONSTANTS: LazyLock<Constants> = LazyLock::new(|| {
  // Safety: the RON file is embedded at compile time; if it's malformed this is a build-time error.
  ron::from_str(include_str!("../constants.ron")).expect("constants.ron must be valid RON (embedded at compile time)")
});

/// Returns a reference to the parsed application constants.
pub fn constants() -> &'static Constants {
  &CONSTANTS
}
