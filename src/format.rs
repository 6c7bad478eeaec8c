use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

// --- Dates ---

/// Parse a backend timestamp. The backend emits naive UTC `YYYY-MM-DD HH:MM:SS`;
/// RFC 3339 and bare dates are accepted too.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
  let s = raw.trim();
  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Some(dt.with_timezone(&Utc));
  }
  if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
    return Some(dt.and_utc());
  }
  if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
    return Some(dt.and_utc());
  }
  NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().and_then(|d| d.and_hms_opt(0, 0, 0)).map(|dt| dt.and_utc())
}

/// Coarse age label for a whole number of elapsed days.
///
/// Thresholds are checked in order: 0, 1, <7, <30, <365, then years, each
/// bucket using integer division. Future dates count as today.
pub fn relative_age(days: i64) -> String {
  match days {
    i64::MIN..=0 => "Today".to_string(),
    1 => "Yesterday".to_string(),
    2..=6 => format!("{} days ago", days),
    7..=29 => format!("{} weeks ago", days / 7),
    30..=364 => format!("{} months ago", days / 30),
    _ => format!("{} years ago", days / 365),
  }
}

pub fn format_relative_date(ts: DateTime<Utc>, now: DateTime<Utc>) -> String {
  relative_age((now - ts).num_days())
}

/// Relative label for a raw backend date string; unparsable input is returned as-is.
pub fn format_upload_date(raw: &str, now: DateTime<Utc>) -> String {
  match parse_timestamp(raw) {
    Some(ts) => format_relative_date(ts, now),
    None => raw.to_string(),
  }
}

// --- Text ---

/// Escape text for interpolation into HTML, in element or attribute position.
pub fn escape_html(text: &str) -> String {
  html_escape::encode_safe(text).into_owned()
}

/// `S01E02`-style label. Both parts must be present and non-zero.
pub fn episode_label(season: Option<u32>, episode: Option<u32>) -> Option<String> {
  match (season, episode) {
    (Some(s), Some(e)) if s > 0 && e > 0 => Some(format!("S{:02}E{:02}", s, e)),
    _ => None,
  }
}

/// Final path component of a file path, for "selected file" indicators.
pub fn display_file_name(path: &std::path::Path) -> String {
  path.file_name().map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::{Duration, TimeZone};

  fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
  }

  fn days_ago(n: i64) -> String {
    format_relative_date(now() - Duration::days(n), now())
  }

  // --- relative dates ---

  #[test]
  fn relative_date_boundaries() {
    assert_eq!(days_ago(0), "Today");
    assert_eq!(days_ago(1), "Yesterday");
    assert_eq!(days_ago(2), "2 days ago");
    assert_eq!(days_ago(6), "6 days ago");
    assert_eq!(days_ago(7), "1 weeks ago");
    assert_eq!(days_ago(29), "4 weeks ago");
    assert_eq!(days_ago(30), "1 months ago");
    assert_eq!(days_ago(364), "12 months ago");
    assert_eq!(days_ago(365), "1 years ago");
    assert_eq!(days_ago(800), "2 years ago");
  }

  #[test]
  fn partial_days_round_down() {
    let ts = now() - Duration::hours(47);
    assert_eq!(format_relative_date(ts, now()), "Yesterday");
  }

  #[test]
  fn future_dates_are_today() {
    assert_eq!(days_ago(-3), "Today");
  }

  #[test]
  fn parses_backend_format() {
    let ts = parse_timestamp("2025-06-10 08:30:00").unwrap();
    assert_eq!(ts, Utc.with_ymd_and_hms(2025, 6, 10, 8, 30, 0).unwrap());
    assert_eq!(format_upload_date("2025-06-10 08:30:00", now()), "5 days ago");
  }

  #[test]
  fn parses_rfc3339_and_bare_dates() {
    assert!(parse_timestamp("2025-06-10T08:30:00Z").is_some());
    assert!(parse_timestamp("2025-06-10T08:30:00+02:00").is_some());
    assert!(parse_timestamp("2025-06-10").is_some());
  }

  #[test]
  fn unparsable_date_is_kept_verbatim() {
    assert_eq!(format_upload_date("last tuesday", now()), "last tuesday");
  }

  // --- escape_html ---

  #[test]
  fn escape_html_neutralizes_tags() {
    let escaped = escape_html("<script>alert(1)</script>");
    assert!(!escaped.contains('<'));
    assert!(!escaped.contains('>'));
    assert!(escaped.starts_with("&lt;script&gt;"));
  }

  #[test]
  fn escape_html_quotes_and_ampersand() {
    let escaped = escape_html(r#"Tom & "Jerry" 'n'"#);
    assert!(escaped.contains("&amp;"));
    assert!(!escaped.contains('"'));
    assert!(!escaped.contains('\''));
  }

  #[test]
  fn escape_html_plain_text_unchanged() {
    assert_eq!(escape_html("The Matrix 1999"), "The Matrix 1999");
  }

  // --- episode_label ---

  #[test]
  fn episode_label_pads() {
    assert_eq!(episode_label(Some(1), Some(2)).as_deref(), Some("S01E02"));
    assert_eq!(episode_label(Some(12), Some(105)).as_deref(), Some("S12E105"));
  }

  #[test]
  fn episode_label_needs_both() {
    assert_eq!(episode_label(Some(1), None), None);
    assert_eq!(episode_label(None, Some(3)), None);
    assert_eq!(episode_label(Some(0), Some(3)), None);
  }

  #[test]
  fn display_file_name_strips_dirs() {
    assert_eq!(display_file_name(std::path::Path::new("/tmp/a/movie.srt")), "movie.srt");
  }
}
