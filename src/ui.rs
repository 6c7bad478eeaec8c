use chrono::Utc;
use ratatui::{
  Frame,
  layout::{Alignment, Constraint, Layout, Rect},
  style::{Modifier, Style, Stylize},
  text::{Line, Span},
  widgets::{Block, BorderType, Clear, List, ListItem, Padding, Paragraph, Wrap},
};

use crate::app::{
  App, AppMode, Message, Modal, Tone, UPLOAD_LABELS, VIDEO_LABELS, VIDEO_PROCESSING_LINES,
};
use crate::constants::constants;
use crate::theme::Theme;
use crate::view::{self, LOADING_TEXT, NO_RESULTS_TEXT, Panel, ResultsView, Section};

// --- Helpers ---

/// Compute the display width of the first `n` chars (accounting for double-width CJK).
pub fn display_width(s: &str, n: usize) -> usize {
  use unicode_width::UnicodeWidthChar;
  s.chars().take(n).map(|c| c.width().unwrap_or(0)).sum()
}

/// Truncate a string to `max_width` characters, appending "…" if truncated.
fn truncate_str(s: &str, max_width: usize) -> String {
  if s.chars().count() <= max_width {
    s.to_string()
  } else {
    let truncated: String = s.chars().take(max_width.saturating_sub(1)).collect();
    format!("{}…", truncated)
  }
}

/// The part of `text` that fits in `width` columns with the cursor in view,
/// and the cursor's column within that slice.
fn visible_window(text: &str, cursor: usize, width: usize) -> (String, usize) {
  let cursor_col = display_width(text, cursor);
  let scroll = (cursor_col + 1).saturating_sub(width.max(1));
  let visible = text
    .chars()
    .scan(0usize, |col, c| {
      let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
      let start = *col;
      *col += w;
      Some((start, *col, c))
    })
    .skip_while(|(_, end, _)| *end <= scroll)
    .take_while(|(start, _, _)| *start < scroll + width)
    .map(|(_, _, c)| c)
    .collect();
  (visible, cursor_col - scroll)
}

fn rounded(theme: &Theme, title: impl Into<Line<'static>>, focused: bool) -> Block<'static> {
  let color = if focused { theme.accent } else { theme.border };
  Block::bordered()
    .title(title)
    .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
    .border_type(BorderType::Rounded)
    .border_style(Style::default().fg(color))
    .padding(Padding::horizontal(1))
}

fn message_style(theme: &Theme, tone: Tone) -> Style {
  match tone {
    Tone::Info => Style::default().fg(theme.status),
    Tone::Success => Style::default().fg(theme.success),
    Tone::Error => Style::default().fg(theme.error),
  }
}

fn message_line(theme: &Theme, msg: &Message) -> Line<'static> {
  let icon = match msg.tone {
    Tone::Info => "⏳",
    Tone::Success => "✔",
    Tone::Error => "⚠",
  };
  Line::from(Span::styled(format!("{} {}", icon, msg.text), message_style(theme, msg.tone)))
}

// --- UI Rendering ---

pub fn ui(frame: &mut Frame, app: &mut App) {
  let theme = app.theme();

  frame.render_widget(Block::default().style(Style::default().bg(theme.bg)), frame.area());

  let [header_area, nav_area, main_area, status_area, footer_area] = Layout::vertical([
    Constraint::Length(1),
    Constraint::Length(1),
    Constraint::Min(5),
    Constraint::Length(1),
    Constraint::Length(1),
  ])
  .areas(frame.area());

  render_header(frame, theme, header_area);
  render_nav(frame, app, nav_area);
  match app.nav.current() {
    Section::Home => render_home(frame, app, main_area),
    Section::Upload => render_upload(frame, app, main_area),
    Section::VideoSrt => render_video(frame, app, main_area),
    section => render_static(frame, app, section, main_area),
  }
  render_status(frame, app, status_area);
  render_footer(frame, app, footer_area);

  if let Some(modal) = &app.modal {
    render_modal(frame, theme, modal);
  }
}

fn render_header(frame: &mut Frame, theme: &Theme, area: Rect) {
  let brand = format!(" 🦊 {} ", constants().brand);
  let left = Line::from(Span::styled(brand, Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)));
  frame.render_widget(left, area);

  let version = format!("v{} ", env!("CARGO_PKG_VERSION"));
  let right = Line::from(Span::styled(&version, Style::default().fg(theme.muted)));
  let right_area =
    Rect { x: area.x + area.width.saturating_sub(version.len() as u16), width: version.len() as u16, ..area };
  frame.render_widget(right, right_area);
}

/// Nav links; the current section's link gets the active highlight.
fn render_nav(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let spans: Vec<Span> = Section::ALL
    .iter()
    .enumerate()
    .flat_map(|(i, section)| {
      let label = format!(" {} {} ", i + 1, section.nav_label());
      let style = if app.nav.is_section_visible(*section) {
        Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD)
      } else {
        Style::default().fg(theme.muted)
      };
      [Span::styled(label, style), Span::raw(" ")]
    })
    .collect();
  frame.render_widget(Line::from(spans), area);
}

// --- Home ---

fn render_home(frame: &mut Frame, app: &mut App, area: Rect) {
  let show_why = app.nav.is_visible(Panel::Why);
  let why_height = if show_why { 4 } else { 0 };
  let [search_area, results_area, why_area] =
    Layout::vertical([Constraint::Length(3), Constraint::Min(3), Constraint::Length(why_height)]).areas(area);

  render_search_box(frame, app, search_area);
  render_results(frame, app, results_area);
  if show_why {
    render_why(frame, app.theme(), why_area);
  }
}

fn render_search_box(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let focused = app.mode == AppMode::Search;
  let lang = app.language_filter.as_deref().unwrap_or("All languages");
  let title = Line::from(vec![
    Span::raw(" Search subtitles "),
    Span::styled(format!("· {} · {} ", app.source.as_wire(), lang), Style::default().fg(theme.muted)),
  ]);
  let inner_w = area.width.saturating_sub(4) as usize;
  let (visible, cursor_x) = visible_window(&app.search_input, app.cursor, inner_w);

  let paragraph = Paragraph::new(visible).style(Style::default().fg(theme.fg)).block(rounded(theme, title, focused));
  frame.render_widget(paragraph, area);

  if focused && app.modal.is_none() {
    frame.set_cursor_position((area.x + 2 + cursor_x as u16, area.y + 1));
  }
}

fn render_results(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let focused = app.mode == AppMode::Results;
  let title = match app.results.banner() {
    Some(banner) => format!(" 🌐 {} ", banner),
    None => " Results ".to_string(),
  };
  let block = rounded(theme, title, focused);

  let placeholder = match &app.results {
    ResultsView::Idle => {
      Some(Line::from(Span::styled("Type a title and press Enter to search.", Style::default().fg(theme.muted))))
    }
    ResultsView::Loading => Some(Line::from(Span::styled(format!("⟳ {}", LOADING_TEXT), Style::default().fg(theme.status)))),
    ResultsView::Empty => Some(Line::from(Span::styled(NO_RESULTS_TEXT, Style::default().fg(theme.muted)))),
    ResultsView::Invalid(msg) | ResultsView::Error(msg) => {
      Some(Line::from(Span::styled(format!("⚠ {}", msg), Style::default().fg(theme.error))))
    }
    ResultsView::List { .. } => None,
  };
  if let Some(line) = placeholder {
    let paragraph = Paragraph::new(vec![Line::from(""), line]).alignment(Alignment::Center).block(block);
    frame.render_widget(paragraph, area);
    return;
  }

  // Inner width: 2 borders, 2 padding, 2 highlight symbol
  let inner_w = area.width.saturating_sub(6) as usize;
  let now = Utc::now();
  let items: Vec<ListItem> = app
    .results
    .results()
    .iter()
    .enumerate()
    .map(|(i, result)| {
      let is_selected = Some(i) == app.list_state.selected();
      let fg = if is_selected { theme.highlight_fg } else { theme.fg };
      let muted = if is_selected { theme.highlight_fg } else { theme.muted };
      let bg = if is_selected {
        theme.highlight_bg
      } else if i % 2 == 1 {
        theme.stripe_bg
      } else {
        theme.bg
      };

      let actions: String = view::actions(result).iter().map(|a| format!("[{}]", a.label())).collect::<Vec<_>>().join(" ");
      let actions_w = actions.chars().count();
      let title = truncate_str(&result.title, inner_w.saturating_sub(actions_w + 2));
      let gap = inner_w.saturating_sub(title.chars().count() + actions_w);
      let title_line = Line::from(vec![
        Span::styled(title, Style::default().fg(fg).add_modifier(Modifier::BOLD)),
        Span::raw(" ".repeat(gap)),
        Span::styled(actions, Style::default().fg(muted)),
      ]);

      let badges = view::badges(result, now).iter().map(view::Badge::text).collect::<Vec<_>>().join("  ·  ");
      let meta_line = Line::from(Span::styled(truncate_str(&badges, inner_w), Style::default().fg(muted)));

      ListItem::new(vec![title_line, meta_line]).bg(bg)
    })
    .collect();

  let list = List::new(items)
    .block(block)
    .highlight_symbol("▶ ")
    .highlight_style(Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg));
  frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn render_why(frame: &mut Frame, theme: &Theme, area: Rect) {
  let lines = vec![
    Line::from(Span::styled("Why SubtitleFox?", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))),
    Line::from(Span::styled(
      "Search your own library and Subtitle Cat at once · import what you like · convert videos to SRT",
      Style::default().fg(theme.muted),
    )),
  ];
  let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true }).block(Block::default().padding(Padding::horizontal(1)));
  frame.render_widget(paragraph, area);
}

// --- Forms ---

/// One `label  value` row per field, the focused row highlighted and holding the cursor.
fn render_form(
  frame: &mut Frame,
  app: &App,
  area: Rect,
  title: &str,
  fields: &[(&str, &str)],
  focused: Option<usize>,
  footer: Vec<Line<'static>>,
) {
  let theme = app.theme();
  let block = rounded(theme, format!(" {} ", title), focused.is_some());
  let inner = block.inner(area);
  frame.render_widget(block, area);

  let label_w = fields.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0) + 2;
  let value_w = (inner.width as usize).saturating_sub(label_w + 1);
  let mut lines = Vec::with_capacity(fields.len() * 2 + footer.len());
  for (i, (label, value)) in fields.iter().enumerate() {
    let is_focused = focused == Some(i);
    let (visible, cursor_x) =
      if is_focused { visible_window(value, app.cursor, value_w) } else { (truncate_str(value, value_w), 0) };
    let value_style = if is_focused {
      Style::default().fg(theme.fg).bg(theme.stripe_bg)
    } else {
      Style::default().fg(theme.fg)
    };
    let label_style = if is_focused { Style::default().fg(theme.accent) } else { Style::default().fg(theme.muted) };
    lines.push(Line::from(vec![
      Span::styled(format!("{:<width$}", label, width = label_w), label_style),
      Span::styled(format!("{:<width$}", visible, width = value_w), value_style),
    ]));
    lines.push(Line::from(""));

    if is_focused && app.modal.is_none() {
      let y = inner.y + (i * 2) as u16;
      if y < inner.y + inner.height {
        frame.set_cursor_position((inner.x + (label_w + cursor_x) as u16, y));
      }
    }
  }
  lines.extend(footer);
  frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn render_upload(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let values = [
    app.upload_path.as_str(),
    app.upload.title.as_str(),
    app.upload.language.as_str(),
    app.upload.year.as_str(),
    app.upload.season.as_str(),
    app.upload.episode.as_str(),
  ];
  let fields: Vec<(&str, &str)> = UPLOAD_LABELS.iter().copied().zip(values).collect();

  let mut footer = vec![match app.upload.selected_file_name() {
    Some(name) => Line::from(Span::styled(format!("📄 {}", name), Style::default().fg(theme.fg))),
    None => Line::from(Span::styled("No file selected", Style::default().fg(theme.muted))),
  }];
  footer.push(Line::from(""));
  let button = if app.upload_in_flight { "[ Uploading... ]" } else { "[ Upload Subtitle ]" };
  footer.push(Line::from(Span::styled(button, Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))));
  if let Some(msg) = &app.upload_message {
    footer.push(message_line(theme, msg));
  }

  let focused = (app.mode == AppMode::Upload).then_some(app.upload_field);
  render_form(frame, app, area, "Upload Subtitle", &fields, focused, footer);
}

fn render_video(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let fields: Vec<(&str, &str)> =
    VIDEO_LABELS.iter().copied().zip([app.video_path.as_str(), app.video.language.as_str()]).collect();

  let mut footer = vec![match app.video.selected_file_name() {
    Some(name) => Line::from(Span::styled(format!("🎬 {}", name), Style::default().fg(theme.fg))),
    None => Line::from(Span::styled("No video selected", Style::default().fg(theme.muted))),
  }];
  footer.push(Line::from(""));
  if app.video_in_flight {
    footer.push(Line::from(Span::styled("[ Processing... ]", Style::default().fg(theme.muted))));
    footer.extend(VIDEO_PROCESSING_LINES.iter().map(|l| Line::from(Span::styled(*l, Style::default().fg(theme.status)))));
  } else {
    footer.push(Line::from(Span::styled(
      "[ Convert Video to SRT ]",
      Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
    )));
  }
  if let Some(msg) = &app.video_message {
    footer.push(message_line(theme, msg));
  }

  let focused = (app.mode == AppMode::Video).then_some(app.video_field);
  render_form(frame, app, area, "Video to SRT", &fields, focused, footer);
}

// --- Static sections ---

fn static_text(section: Section) -> &'static [&'static str] {
  match section {
    Section::Enterprise => &[
      "SubtitleFox for teams",
      "",
      "Run the backend on your own infrastructure and point every client at it with --server.",
      "Uploads, imports and conversions all land in one shared subtitle library.",
      "",
      "Contact your administrator for access to a hosted instance.",
    ],
    Section::About => &[
      "About SubtitleFox",
      "",
      "SubtitleFox searches a local subtitle library and the Subtitle Cat catalogue side by side.",
      "External results can be downloaded directly or imported into the local library.",
      "Videos can be transcribed into SRT files by the backend.",
    ],
    Section::Register => &[
      "Register",
      "",
      "Accounts are managed by the SubtitleFox server.",
      "Registration is not available from this client.",
    ],
    Section::SignIn => &[
      "Sign In",
      "",
      "Accounts are managed by the SubtitleFox server.",
      "Signing in is not available from this client.",
    ],
    _ => &[],
  }
}

fn render_static(frame: &mut Frame, app: &App, section: Section, area: Rect) {
  let theme = app.theme();
  let text = static_text(section);
  let lines: Vec<Line> = text
    .iter()
    .enumerate()
    .map(|(i, l)| {
      if i == 0 {
        Line::from(Span::styled(*l, Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)))
      } else {
        Line::from(Span::styled(*l, Style::default().fg(theme.fg)))
      }
    })
    .collect();
  let paragraph = Paragraph::new(lines)
    .wrap(Wrap { trim: true })
    .scroll((app.nav.scroll(), 0))
    .block(rounded(theme, format!(" {} ", section.nav_label()), false));
  frame.render_widget(paragraph, area);
}

// --- Chrome ---

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let line = match &app.status {
    Some(msg) => message_line(theme, msg),
    None => Line::from(Span::styled(format!(" {}", app.api.base_url()), Style::default().fg(theme.muted))),
  };
  frame.render_widget(Paragraph::new(line), area);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let keys: Vec<(&str, &str)> = if app.modal.is_some() {
    match app.modal {
      Some(Modal::ConfirmImport { .. }) => vec![("y", "Import"), ("n", "Cancel")],
      _ => vec![("Enter", "OK")],
    }
  } else {
    match app.mode {
      AppMode::Search => {
        let mut k = vec![("Enter", "Search"), ("^l", "Language")];
        if !app.results.results().is_empty() {
          k.push(("↓", "Results"));
        }
        k.extend([("Tab", "Section"), ("^t", "Theme")]);
        k
      }
      AppMode::Results => {
        let mut k = vec![("Enter", "Download"), ("j/k", "Navigate")];
        if app.selected_result().is_some_and(|r| r.external) {
          k.push(("i", "Import"));
        }
        k.extend([("Esc", "Search"), ("^t", "Theme")]);
        k
      }
      AppMode::Upload | AppMode::Video => {
        vec![("Tab", "Next field"), ("Enter", "Submit"), ("^n/^p", "Section"), ("Esc", "Back")]
      }
      AppMode::Browse => vec![("1-7", "Jump"), ("←/→", "Section"), ("j/k", "Scroll"), ("q", "Quit")],
    }
  };

  let spans: Vec<Span> = keys
    .iter()
    .enumerate()
    .flat_map(|(i, (key, action))| {
      let mut s = vec![
        Span::styled(format!(" {} ", key), Style::default().fg(theme.key_fg).bg(theme.key_bg)),
        Span::styled(format!(" {} ", action), Style::default().fg(theme.muted)),
      ];
      if i < keys.len() - 1 {
        s.push(Span::raw("  "));
      }
      s
    })
    .collect();

  frame.render_widget(Line::from(spans), area);

  let theme_label = format!("{} ", theme.name);
  let right = Line::from(Span::styled(&theme_label, Style::default().fg(theme.muted)));
  let right_area =
    Rect { x: area.x + area.width.saturating_sub(theme_label.len() as u16), width: theme_label.len() as u16, ..area };
  frame.render_widget(right, right_area);
}

fn render_modal(frame: &mut Frame, theme: &Theme, modal: &Modal) {
  let (title, text, hint) = match modal {
    Modal::Alert(text) => (" Notice ", text.as_str(), "Enter to close"),
    Modal::ConfirmImport { prompt, .. } => (" Confirm ", prompt.as_str(), "y to import · n to cancel"),
  };
  let area = frame.area();
  let width = area.width.saturating_mul(3) / 5;
  let height = 7.min(area.height);
  let rect = Rect {
    x: area.x + (area.width.saturating_sub(width)) / 2,
    y: area.y + (area.height.saturating_sub(height)) / 2,
    width,
    height,
  };
  let lines = vec![
    Line::from(Span::styled(text.to_string(), Style::default().fg(theme.fg))),
    Line::from(""),
    Line::from(Span::styled(hint, Style::default().fg(theme.muted))),
  ];
  frame.render_widget(Clear, rect);
  let paragraph = Paragraph::new(lines)
    .wrap(Wrap { trim: true })
    .alignment(Alignment::Center)
    .style(Style::default().bg(theme.bg))
    .block(rounded(theme, title, true));
  frame.render_widget(paragraph, rect);
}
