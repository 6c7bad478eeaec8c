use futures::{Stream, StreamExt};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::constants::constants;

// --- Content-Disposition ---

/// Matches `filename=` (not `filename*=`). A quoted value may contain `;`.
static FILENAME_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"(?i)\bfilename\s*=\s*(?:"([^"]*)"|([^;\s]+))"#).expect("filename regex is valid")
});

/// Extract the suggested file name from a `Content-Disposition` header value.
pub fn filename_from_disposition(header: &str) -> Option<String> {
  let caps = FILENAME_RE.captures(header)?;
  let raw = caps.get(1).or_else(|| caps.get(2))?.as_str();
  let name = sanitize_filename(raw);
  (!name.is_empty()).then_some(name)
}

/// File name to save a response under, falling back to `subtitle.srt`.
pub fn filename_or_fallback(header: Option<&str>) -> String {
  header.and_then(filename_from_disposition).unwrap_or_else(|| constants().fallback_filename.clone())
}

/// Reduce a server-supplied name to its last path component so it can't
/// escape the download directory.
pub fn sanitize_filename(raw: &str) -> String {
  let trimmed = raw.trim().trim_matches('"');
  let last = trimmed.rsplit(['/', '\\']).next().unwrap_or_default();
  match last {
    "." | ".." => String::new(),
    other => other.chars().filter(|c| !c.is_control()).collect::<String>().trim().to_string(),
  }
}

// --- Saving ---

/// First free path for `filename` in `dir`: `name.srt`, `name (1).srt`, `name (2).srt`, …
pub fn unique_path(dir: &Path, filename: &str) -> PathBuf {
  let candidate = dir.join(filename);
  if !candidate.exists() {
    return candidate;
  }
  let path = Path::new(filename);
  let stem = path.file_stem().map_or_else(|| filename.to_string(), |s| s.to_string_lossy().into_owned());
  let ext = path.extension().map(|e| e.to_string_lossy().into_owned());
  (1..)
    .map(|n| match &ext {
      Some(ext) => dir.join(format!("{} ({}).{}", stem, n, ext)),
      None => dir.join(format!("{} ({})", stem, n)),
    })
    .find(|p| !p.exists())
    .unwrap_or(candidate)
}

/// A `.part` file that is deleted on drop unless committed.
struct PartFile {
  path: PathBuf,
  committed: bool,
}

impl PartFile {
  fn new(target: &Path) -> Self {
    let name = target.file_name().map_or_else(String::new, |n| n.to_string_lossy().into_owned());
    Self { path: target.with_file_name(format!(".{}.part", name)), committed: false }
  }

  async fn commit(mut self, target: &Path) -> std::io::Result<()> {
    tokio::fs::rename(&self.path, target).await?;
    self.committed = true;
    Ok(())
  }
}

impl Drop for PartFile {
  fn drop(&mut self) {
    if !self.committed {
      if let Err(e) = std::fs::remove_file(&self.path)
        && e.kind() != std::io::ErrorKind::NotFound
      {
        warn!(path = %self.path.display(), err = %e, "failed to remove partial download");
      }
    }
  }
}

/// Stream a body into `dir/filename`, returning the final path.
///
/// The body is written to a hidden `.part` sibling first and renamed on
/// completion; on any error the partial file is removed.
pub async fn save_stream<S, B, E>(dir: &Path, filename: &str, body: S) -> std::io::Result<PathBuf>
where
  S: Stream<Item = Result<B, E>>,
  B: AsRef<[u8]>,
  E: std::error::Error + Send + Sync + 'static,
{
  tokio::fs::create_dir_all(dir).await?;
  let name = sanitize_filename(filename);
  let name = if name.is_empty() { constants().fallback_filename.clone() } else { name };
  let target = unique_path(dir, &name);

  let part = PartFile::new(&target);
  let mut body = std::pin::pin!(body);
  let mut file = tokio::fs::File::create(&part.path).await?;
  let mut written = 0usize;
  while let Some(chunk) = body.next().await {
    let chunk = chunk.map_err(std::io::Error::other)?;
    file.write_all(chunk.as_ref()).await?;
    written += chunk.as_ref().len();
  }
  file.flush().await?;
  drop(file);

  part.commit(&target).await?;
  debug!(path = %target.display(), bytes = written, "saved download");
  Ok(target)
}
