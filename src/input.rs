use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, AppMode, Modal};
use crate::view::Section;

// --- Helpers ---

/// Convert a char index to a byte offset within the string.
pub fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
  s.char_indices().nth(char_idx).map_or(s.len(), |(i, _)| i)
}

/// Apply a line-editing key to `text`. Returns false when the key isn't an editing key.
pub fn edit_text(text: &mut String, cursor: &mut usize, code: KeyCode) -> bool {
  let len = text.chars().count();
  *cursor = (*cursor).min(len);
  match code {
    KeyCode::Char(c) => {
      let byte_idx = char_to_byte_index(text, *cursor);
      text.insert(byte_idx, c);
      *cursor += 1;
    }
    KeyCode::Backspace => {
      if *cursor > 0 {
        *cursor -= 1;
        let byte_idx = char_to_byte_index(text, *cursor);
        text.remove(byte_idx);
      }
    }
    KeyCode::Delete => {
      if *cursor < len {
        let byte_idx = char_to_byte_index(text, *cursor);
        text.remove(byte_idx);
      }
    }
    KeyCode::Left => *cursor = cursor.saturating_sub(1),
    KeyCode::Right => *cursor = (*cursor + 1).min(len),
    KeyCode::Home => *cursor = 0,
    KeyCode::End => *cursor = len,
    _ => return false,
  }
  true
}

fn edit_focused(app: &mut App, code: KeyCode) -> bool {
  let mut cursor = app.cursor;
  let handled = app.focused_text_mut().is_some_and(|text| edit_text(text, &mut cursor, code));
  app.cursor = cursor;
  if handled {
    app.sync_selected_files();
  }
  handled
}

// --- Event Handling ---

pub fn handle_key_event(app: &mut App, key: KeyEvent) {
  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
    app.should_quit = true;
    return;
  }

  if app.modal.is_some() {
    handle_modal_key(app, key);
    return;
  }

  if key.modifiers.contains(KeyModifiers::CONTROL) {
    match key.code {
      KeyCode::Char('t') => app.next_theme(),
      KeyCode::Char('n') => app.next_section(),
      KeyCode::Char('p') => app.prev_section(),
      KeyCode::Char('l') if app.nav.current() == Section::Home => app.cycle_language(),
      _ => {}
    }
    return;
  }

  match app.mode {
    AppMode::Browse => handle_browse_key(app, key),
    AppMode::Search => handle_search_key(app, key),
    AppMode::Results => handle_results_key(app, key),
    AppMode::Upload | AppMode::Video => handle_form_key(app, key),
  }
}

fn handle_modal_key(app: &mut App, key: KeyEvent) {
  match app.modal {
    Some(Modal::Alert(_)) => {
      if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
        app.dismiss_modal();
      }
    }
    Some(Modal::ConfirmImport { .. }) => match key.code {
      KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.answer_confirm(true),
      KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.answer_confirm(false),
      _ => {}
    },
    None => {}
  }
}

fn handle_browse_key(app: &mut App, key: KeyEvent) {
  match key.code {
    KeyCode::Char(c @ '1'..='7') => {
      let idx = c as usize - '1' as usize;
      app.navigate(Section::ALL[idx]);
    }
    KeyCode::Right | KeyCode::Tab => app.next_section(),
    KeyCode::Left | KeyCode::BackTab => app.prev_section(),
    KeyCode::Down | KeyCode::Char('j') => app.nav.scroll_by(1),
    KeyCode::Up | KeyCode::Char('k') => app.nav.scroll_by(-1),
    KeyCode::PageDown => app.nav.scroll_by(10),
    KeyCode::PageUp => app.nav.scroll_by(-10),
    KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
    _ => {}
  }
}

fn handle_search_key(app: &mut App, key: KeyEvent) {
  match key.code {
    KeyCode::Enter => app.trigger_search(),
    KeyCode::Tab => app.next_section(),
    KeyCode::BackTab => app.prev_section(),
    KeyCode::Down => {
      if !app.results.results().is_empty() {
        app.mode = AppMode::Results;
      }
    }
    KeyCode::Esc => {
      if !app.search_input.is_empty() {
        app.search_input.clear();
        app.cursor = 0;
      } else if !app.results.results().is_empty() {
        app.mode = AppMode::Results;
      } else {
        app.should_quit = true;
      }
    }
    code => {
      edit_focused(app, code);
    }
  }
}

fn handle_results_key(app: &mut App, key: KeyEvent) {
  match key.code {
    KeyCode::Enter | KeyCode::Char('d') => app.trigger_download(),
    KeyCode::Char('i') => app.request_import(),
    KeyCode::Down | KeyCode::Char('j') => app.select_next(),
    KeyCode::Up | KeyCode::Char('k') => {
      if app.list_state.selected() == Some(0) {
        app.mode = AppMode::Search;
        app.cursor = app.search_input.chars().count();
      } else {
        app.select_prev();
      }
    }
    KeyCode::Char('/') | KeyCode::Esc => {
      app.mode = AppMode::Search;
      app.cursor = app.search_input.chars().count();
    }
    KeyCode::Tab => app.next_section(),
    KeyCode::BackTab => app.prev_section(),
    _ => {}
  }
}

fn handle_form_key(app: &mut App, key: KeyEvent) {
  match key.code {
    KeyCode::Tab | KeyCode::Down => app.focus_field(1),
    KeyCode::BackTab | KeyCode::Up => app.focus_field(-1),
    KeyCode::Enter => match app.mode {
      AppMode::Upload => app.submit_upload(),
      _ => app.submit_video(),
    },
    KeyCode::Esc => app.mode = AppMode::Browse,
    code => {
      edit_focused(app, code);
    }
  }
}
