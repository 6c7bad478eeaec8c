use directories::{ProjectDirs, UserDirs};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

use crate::constants::constants;
use crate::model::SearchSource;

/// User preferences persisted in `prefs.toml`. Every field is optional so a
/// hand-edited file with only some keys still loads.
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq, Eq)]
pub struct Config {
  pub server_url: Option<String>,
  pub download_dir: Option<PathBuf>,
  pub search_source: Option<String>,
  pub theme_name: Option<String>,
}

fn project_dirs() -> Option<ProjectDirs> {
  ProjectDirs::from("", "", "subfox")
}

impl Config {
  pub fn load() -> Self {
    if let Some(proj_dirs) = project_dirs() {
      let config_file = proj_dirs.config_dir().join("prefs.toml");
      if let Ok(content) = std::fs::read_to_string(&config_file) {
        match toml::from_str(&content) {
          Ok(config) => return config,
          Err(e) => warn!(path = %config_file.display(), err = %e, "ignoring invalid config file"),
        }
      }
    }
    Self::default()
  }

  pub fn save(&self) {
    if let Some(proj_dirs) = project_dirs() {
      let config_dir = proj_dirs.config_dir();
      if std::fs::create_dir_all(config_dir).is_ok() {
        let config_file = config_dir.join("prefs.toml");
        if let Ok(content) = toml::to_string(self) {
          let _ = std::fs::write(config_file, content);
        }
      }
    }
  }

  pub fn server_url(&self) -> String {
    self.server_url.clone().filter(|u| !u.trim().is_empty()).unwrap_or_else(|| constants().default_server_url.clone())
  }

  /// Configured directory, else the user's download folder, else the working directory.
  pub fn download_dir(&self) -> PathBuf {
    self
      .download_dir
      .clone()
      .or_else(|| UserDirs::new().and_then(|d| d.download_dir().map(|p| p.to_path_buf())))
      .unwrap_or_else(|| PathBuf::from("."))
  }

  pub fn search_source(&self) -> SearchSource {
    SearchSource::from_wire(self.search_source.as_deref().unwrap_or(&constants().default_search_source))
  }
}

/// Directory for rolling log files.
pub fn log_dir() -> PathBuf {
  project_dirs().map_or_else(|| std::env::temp_dir().join("subfox"), |d| d.data_local_dir().join("logs"))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults() {
    let config = Config::default();
    assert_eq!(config.server_url(), "http://127.0.0.1:5000");
    assert_eq!(config.search_source(), SearchSource::SubtitleCat);
  }

  #[test]
  fn partial_file_parses() {
    let config: Config = toml::from_str("server_url = \"https://subs.example\"\nsearch_source = \"local\"\n").unwrap();
    assert_eq!(config.server_url(), "https://subs.example");
    assert_eq!(config.search_source(), SearchSource::Local);
    assert_eq!(config.theme_name, None);
  }

  #[test]
  fn explicit_download_dir_wins() {
    let config = Config { download_dir: Some(PathBuf::from("/data/subs")), ..Default::default() };
    assert_eq!(config.download_dir(), PathBuf::from("/data/subs"));
  }

  #[test]
  fn roundtrips_through_toml() {
    let config = Config { theme_name: Some("Ember".into()), server_url: Some("http://x".into()), ..Default::default() };
    let text = toml::to_string(&config).unwrap();
    assert_eq!(toml::from_str::<Config>(&text).unwrap(), config);
  }
}
