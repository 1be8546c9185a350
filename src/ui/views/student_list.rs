use crate::list::{near_end, ListPhase, Origin, StudentList};
use crate::roster::{MockSource, Student, TOTAL_STUDENTS};
use crate::ui::components::render_alert;
use crate::ui::renderfns::truncate;
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::StudentDetailView;
use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

/// Rows each student takes in the list
const ROWS_PER_STUDENT: u16 = 3;

/// Infinite-scroll list of students
pub struct StudentListView {
  list: StudentList<MockSource>,
  list_state: ListState,
  end_threshold: usize,
  /// Students that fit in the last rendered area
  visible: usize,
}

impl StudentListView {
  pub fn new(list: StudentList<MockSource>, end_threshold: usize) -> Self {
    Self {
      list,
      list_state: ListState::default(),
      end_threshold,
      visible: 0,
    }
  }

  fn students(&self) -> &[Student] {
    self.list.students()
  }

  fn move_selection(&mut self, delta: isize) {
    let len = self.students().len();
    if len == 0 {
      return;
    }
    let current = self.list_state.selected().unwrap_or(0);
    let next = current.saturating_add_signed(delta).min(len - 1);
    self.list_state.select(Some(next));
    self.maybe_load_more();
  }

  /// Request the next page once the selection is close to the bottom, or
  /// when the whole list fits on screen.
  fn maybe_load_more(&mut self) {
    let len = self.students().len();
    if len == 0 {
      return;
    }
    let selected = self.list_state.selected().unwrap_or(0);
    if near_end(selected, len, self.end_threshold) || len < self.visible {
      self.list.on_end_reached();
    }
  }

  fn title(&self) -> String {
    let count = self.students().len();
    let state = match self.list.phase() {
      ListPhase::Idle | ListPhase::LoadingInitial => "loading...".to_string(),
      ListPhase::Refreshing => "refreshing...".to_string(),
      ListPhase::Ready | ListPhase::LoadingMore => count.to_string(),
    };

    match self.list.origin() {
      Some(Origin::Cache(stored_at)) => format!(
        " Students ({}) · cached {} ",
        state,
        stored_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
      ),
      _ => format!(" Students ({}) ", state),
    }
  }

  fn footer_line(&self) -> Option<Line<'static>> {
    if self.list.phase() == ListPhase::LoadingMore {
      return Some(Line::from(Span::styled(
        "Loading more students...",
        Style::default().fg(Color::Yellow),
      )));
    }
    if !self.list.has_more() && !self.students().is_empty() {
      return Some(Line::from(Span::styled(
        "No more students available",
        Style::default().fg(Color::DarkGray).italic(),
      )));
    }
    None
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .title(self.title())
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if self.students().is_empty() {
      let content = match self.list.phase() {
        ListPhase::Idle | ListPhase::LoadingInitial | ListPhase::Refreshing => {
          "Loading students..."
        }
        _ => "No students found. Press 'r' to retry.",
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let footer = self.footer_line();
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Min(1),
        Constraint::Length(if footer.is_some() { 1 } else { 0 }),
      ])
      .split(inner);

    self.visible = (chunks[0].height / ROWS_PER_STUDENT) as usize;
    if self.list_state.selected().is_none() {
      self.list_state.select(Some(0));
    }

    let items: Vec<ListItem> = self.students().iter().map(student_item).collect();
    let list = List::new(items)
      .highlight_style(Style::default().bg(Color::DarkGray))
      .highlight_symbol("> ");
    frame.render_stateful_widget(list, chunks[0], &mut self.list_state);

    if let Some(line) = footer {
      frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), chunks[1]);
    }
  }
}

fn student_item(student: &Student) -> ListItem<'static> {
  ListItem::new(Text::from(vec![
    Line::from(Span::styled(
      truncate(&student.name, 40),
      Style::default().fg(Color::White).bold(),
    )),
    Line::from(Span::styled(
      truncate(&student.email, 60),
      Style::default().fg(Color::Gray),
    )),
    Line::from(Span::styled(
      student.enrollment_label(),
      Style::default().fg(Color::DarkGray),
    )),
  ]))
}

impl View for StudentListView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    // An open alert swallows the next key
    if self.list.alert().is_some() {
      self.list.dismiss_alert();
      return ViewAction::None;
    }

    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.move_selection(1),
      KeyCode::Char('k') | KeyCode::Up => self.move_selection(-1),
      KeyCode::PageDown => self.move_selection(self.visible.max(1) as isize),
      KeyCode::PageUp => self.move_selection(-(self.visible.max(1) as isize)),
      KeyCode::Char('G') | KeyCode::End => self.move_selection(isize::MAX),
      KeyCode::Char('g') | KeyCode::Home => self.move_selection(isize::MIN),
      KeyCode::Char('r') => {
        if self.list.refresh() {
          self.list_state.select(Some(0));
        }
      }
      KeyCode::Enter => {
        if let Some(student) = self
          .list_state
          .selected()
          .and_then(|idx| self.students().get(idx))
        {
          return ViewAction::Push(Box::new(StudentDetailView::new(student.clone())));
        }
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.render_list(frame, area);
    if let Some(message) = self.list.alert() {
      render_alert(frame, area, message);
    }
  }

  fn breadcrumb_label(&self) -> String {
    "Students".to_string()
  }

  fn status(&self) -> Option<String> {
    if self.students().is_empty() {
      return None;
    }
    Some(format!(
      "{} of {} · page {}",
      self.students().len(),
      TOTAL_STUDENTS,
      self.list.page()
    ))
  }

  fn on_focus(&mut self) {
    self.list.on_focus();
  }

  fn tick(&mut self) {
    if self.list.poll() && self.list.alert().is_none() {
      self.maybe_load_more();
    }
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("j/k", "move"),
      ShortcutInfo::new("enter", "courses"),
      ShortcutInfo::new("r", "refresh"),
      ShortcutInfo::new("q", "quit"),
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::{NoopStorage, StudentCache};
  use crossterm::event::KeyModifiers;
  use std::sync::Arc;
  use std::time::Duration;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  async fn loaded_view() -> StudentListView {
    let source = Arc::new(MockSource::new(3, Duration::ZERO));
    let list = StudentList::new(source, StudentCache::new(NoopStorage), 10);
    let mut view = StudentListView::new(list, 2);
    view.on_focus();
    assert!(view.list.next_update().await);
    view
  }

  #[tokio::test]
  async fn test_scrolling_near_end_loads_next_page() {
    let mut view = loaded_view().await;

    for _ in 0..6 {
      view.handle_key(key(KeyCode::Char('j')));
    }
    assert_eq!(view.list.phase(), ListPhase::Ready);

    view.handle_key(key(KeyCode::Char('j')));
    assert_eq!(view.list_state.selected(), Some(7));
    assert_eq!(view.list.phase(), ListPhase::LoadingMore);

    view.list.next_update().await;
    assert_eq!(view.students().len(), 20);
  }

  #[tokio::test]
  async fn test_selection_clamped_to_list() {
    let mut view = loaded_view().await;
    view.handle_key(key(KeyCode::Char('k')));
    assert_eq!(view.list_state.selected(), Some(0));

    view.handle_key(key(KeyCode::End));
    assert_eq!(view.list_state.selected(), Some(9));
  }

  #[tokio::test]
  async fn test_enter_opens_detail() {
    let mut view = loaded_view().await;
    view.handle_key(key(KeyCode::Down));

    match view.handle_key(key(KeyCode::Enter)) {
      ViewAction::Push(detail) => assert_eq!(detail.breadcrumb_label(), "Student 2"),
      _ => panic!("expected detail view"),
    }
  }

  #[tokio::test]
  async fn test_refresh_key() {
    let mut view = loaded_view().await;
    view.handle_key(key(KeyCode::Char('j')));
    view.handle_key(key(KeyCode::Char('r')));

    assert_eq!(view.list.phase(), ListPhase::Refreshing);
    assert_eq!(view.list_state.selected(), Some(0));
    assert!(view.title().contains("refreshing"));
  }

  #[tokio::test]
  async fn test_refresh_while_loading_more() {
    let mut view = loaded_view().await;
    view.handle_key(key(KeyCode::End));
    assert_eq!(view.list.phase(), ListPhase::LoadingMore);

    view.handle_key(key(KeyCode::Char('r')));
    assert_eq!(view.list.phase(), ListPhase::Refreshing);
    assert_eq!(view.list_state.selected(), Some(0));

    view.list.next_update().await;
    assert_eq!(view.students().len(), 10);
    assert_eq!(view.status().as_deref(), Some("10 of 100 · page 1"));
  }

  #[tokio::test]
  async fn test_quit_pops() {
    let mut view = loaded_view().await;
    assert!(matches!(view.handle_key(key(KeyCode::Char('q'))), ViewAction::Pop));
  }
}
