use super::input::{InputResult, TextInput};
use super::KeyResult;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

/// Events emitted by search input that parent needs to handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
  /// Query changed (on each keystroke, empty string on cancel)
  Changed(String),
  /// Input closed, the filter stays applied
  Submitted,
}

/// Search box toggled with `/`
#[derive(Debug, Clone, Default)]
pub struct SearchInput {
  input: TextInput,
  active: bool,
}

impl SearchInput {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  pub fn query(&self) -> &str {
    self.input.value()
  }

  /// Handle a key event. Handles activation too, so call it in any state.
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<SearchEvent> {
    if !self.active {
      if key.code == KeyCode::Char('/') {
        self.active = true;
        return KeyResult::Handled;
      }
      return KeyResult::NotHandled;
    }

    match self.input.handle_key(key) {
      InputResult::Submitted(_) => {
        self.active = false;
        KeyResult::Event(SearchEvent::Submitted)
      }
      InputResult::Cancelled => {
        self.active = false;
        self.input.clear();
        KeyResult::Event(SearchEvent::Changed(String::new()))
      }
      InputResult::Consumed => KeyResult::Event(SearchEvent::Changed(self.query().to_string())),
      InputResult::NotHandled => KeyResult::Handled,
    }
  }

  /// Render the search bar into a fixed 3-row area.
  pub fn render(&self, frame: &mut Frame, area: Rect) {
    let border = if self.is_active() {
      Color::Yellow
    } else {
      Color::DarkGray
    };
    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(border))
      .title(" Search courses ");

    let line = if self.is_active() {
      Line::from(vec![
        Span::styled("/", Style::default().fg(Color::Yellow)),
        Span::raw(self.query()),
        Span::styled("_", Style::default().fg(Color::Yellow)), // Cursor
      ])
    } else if self.input.is_empty() {
      Line::from(Span::styled(
        "Search courses...",
        Style::default().fg(Color::DarkGray),
      ))
    } else {
      Line::from(Span::raw(self.query()))
    };

    frame.render_widget(Paragraph::new(line).block(block), area);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::KeyModifiers;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  #[test]
  fn test_inactive_ignores_keys() {
    let mut search = SearchInput::new();
    assert_eq!(search.handle_key(key(KeyCode::Char('x'))), KeyResult::NotHandled);
    assert!(!search.is_active());
  }

  #[test]
  fn test_typing_emits_changes() {
    let mut search = SearchInput::new();
    assert_eq!(search.handle_key(key(KeyCode::Char('/'))), KeyResult::Handled);
    assert!(search.is_active());

    search.handle_key(key(KeyCode::Char('c')));
    assert_eq!(
      search.handle_key(key(KeyCode::Char('a'))),
      KeyResult::Event(SearchEvent::Changed("ca".to_string()))
    );

    assert_eq!(
      search.handle_key(key(KeyCode::Enter)),
      KeyResult::Event(SearchEvent::Submitted)
    );
    assert!(!search.is_active());
    assert_eq!(search.query(), "ca");
  }

  #[test]
  fn test_cancel_clears_query() {
    let mut search = SearchInput::new();
    search.handle_key(key(KeyCode::Char('/')));
    search.handle_key(key(KeyCode::Char('m')));
    assert_eq!(
      search.handle_key(key(KeyCode::Esc)),
      KeyResult::Event(SearchEvent::Changed(String::new()))
    );
    assert_eq!(search.query(), "");
  }
}
