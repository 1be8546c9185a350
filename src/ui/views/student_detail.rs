use crate::roster::{group_courses, Course, CourseSection, Student};
use crate::ui::components::{KeyResult, SearchEvent, SearchInput};
use crate::ui::renderfns::{category_color, truncate};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

/// A student's courses, grouped by category and searchable by title
pub struct StudentDetailView {
  student: Student,
  search: SearchInput,
  sections: Vec<CourseSection>,
  list_state: ListState,
}

impl StudentDetailView {
  pub fn new(student: Student) -> Self {
    let sections = group_courses(&student.courses, "");
    Self {
      student,
      search: SearchInput::new(),
      sections,
      list_state: ListState::default(),
    }
  }

  fn apply_query(&mut self, query: &str) {
    self.sections = group_courses(&self.student.courses, query);
    self.list_state.select(None);
    *self.list_state.offset_mut() = 0;
  }

  fn row_count(&self) -> usize {
    self.sections.iter().map(|s| s.courses.len() + 1).sum()
  }

  fn scroll(&mut self, delta: isize) {
    let rows = self.row_count();
    if rows == 0 {
      return;
    }
    let current = self.list_state.selected().unwrap_or(0);
    let next = current.saturating_add_signed(delta).min(rows - 1);
    self.list_state.select(Some(next));
  }

  fn render_header(&self, frame: &mut Frame, area: Rect) {
    let lines = vec![
      Line::from(Span::styled(
        format!(" {}", self.student.name),
        Style::default().fg(Color::Cyan).bold(),
      )),
      Line::from(Span::styled(
        format!(" {}", self.student.email),
        Style::default().fg(Color::White),
      )),
      Line::from(Span::styled(
        format!(" {}", self.student.enrollment_label()),
        Style::default().fg(Color::DarkGray),
      )),
    ];
    frame.render_widget(Paragraph::new(Text::from(lines)), area);
  }

  fn render_courses(&mut self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .title(" Courses ")
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if self.sections.is_empty() {
      let (message, hint) = empty_message(self.search.query());
      let mut lines = vec![Line::from(Span::styled(
        message,
        Style::default().fg(Color::DarkGray),
      ))];
      if let Some(hint) = hint {
        lines.push(Line::from(Span::styled(
          hint,
          Style::default().fg(Color::DarkGray).italic(),
        )));
      }
      let paragraph = Paragraph::new(Text::from(lines))
        .block(block)
        .alignment(Alignment::Center);
      frame.render_widget(paragraph, area);
      return;
    }

    let width = area.width.saturating_sub(4) as usize;
    let mut items = Vec::with_capacity(self.row_count());
    for section in &self.sections {
      items.push(section_item(section));
      items.extend(section.courses.iter().map(|c| course_item(c, width)));
    }

    let list = List::new(items)
      .block(block)
      .highlight_style(Style::default().bg(Color::DarkGray));
    frame.render_stateful_widget(list, area, &mut self.list_state);
  }
}

/// Empty-state message and an optional hint
fn empty_message(query: &str) -> (&'static str, Option<&'static str>) {
  if query.is_empty() {
    ("No courses enrolled", None)
  } else {
    (
      "No courses match your search",
      Some("Try searching with different keywords"),
    )
  }
}

fn section_item(section: &CourseSection) -> ListItem<'static> {
  let color = category_color(section.category);
  ListItem::new(Line::from(vec![
    Span::styled("▌", Style::default().fg(color)),
    Span::styled(
      format!("{} ", section.category),
      Style::default().fg(Color::White).bold(),
    ),
    Span::styled(section.count_label(), Style::default().fg(Color::DarkGray)),
  ]))
}

fn course_item(course: &Course, width: usize) -> ListItem<'static> {
  let badge = format!("[{}]", course.category);
  let title_width = width
    .saturating_sub(badge.len() + 14)
    .max(10);

  ListItem::new(Line::from(vec![
    Span::raw("  "),
    Span::styled(
      format!("{:<w$}", truncate(&course.title, title_width), w = title_width),
      Style::default().fg(Color::White),
    ),
    Span::styled(
      format!(" {:<10} ", course.duration),
      Style::default().fg(Color::Gray),
    ),
    Span::styled(badge, Style::default().fg(category_color(course.category))),
  ]))
}

impl View for StudentDetailView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match self.search.handle_key(key) {
      KeyResult::Event(SearchEvent::Changed(query)) => {
        self.apply_query(&query);
        return ViewAction::None;
      }
      KeyResult::Event(SearchEvent::Submitted) | KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.scroll(1),
      KeyCode::Char('k') | KeyCode::Up => self.scroll(-1),
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(3), // Student header
        Constraint::Length(3), // Search bar
        Constraint::Min(0),    // Sections
      ])
      .split(area);

    self.render_header(frame, chunks[0]);
    self.search.render(frame, chunks[1]);
    self.render_courses(frame, chunks[2]);
  }

  fn breadcrumb_label(&self) -> String {
    self.student.name.clone()
  }

  fn status(&self) -> Option<String> {
    let shown: usize = self.sections.iter().map(|s| s.courses.len()).sum();
    Some(format!("{} of {} courses", shown, self.student.courses.len()))
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("/", "search"),
      ShortcutInfo::new("j/k", "scroll"),
      ShortcutInfo::new("q", "back"),
    ]
  }
}
