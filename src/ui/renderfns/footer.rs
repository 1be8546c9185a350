use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Draw the bottom bar: breadcrumb on the left, the view's status on the right
pub fn draw_footer(frame: &mut Frame, area: Rect, breadcrumb: &[String], status: Option<&str>) {
  let status_width = status.map_or(0, |s| s.chars().count() as u16 + 2);
  let chunks = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Min(0), Constraint::Length(status_width)])
    .split(area);

  let background = Style::default().bg(Color::Black);
  frame.render_widget(
    Paragraph::new(breadcrumb_line(breadcrumb)).style(background),
    chunks[0],
  );

  if let Some(status) = status {
    let line = Line::from(Span::styled(
      format!("{} ", status),
      Style::default().fg(Color::DarkGray),
    ));
    frame.render_widget(
      Paragraph::new(line)
        .alignment(Alignment::Right)
        .style(background),
      chunks[1],
    );
  }
}

/// `Students > Student 4`, with the current screen highlighted
fn breadcrumb_line(breadcrumb: &[String]) -> Line<'static> {
  let last = breadcrumb.len().saturating_sub(1);
  let mut spans = vec![Span::raw(" ")];
  for (i, part) in breadcrumb.iter().enumerate() {
    if i > 0 {
      spans.push(Span::styled(" > ", Style::default().fg(Color::DarkGray)));
    }
    let style = if i == last {
      Style::default().fg(Color::Cyan).bold()
    } else {
      Style::default().fg(Color::White)
    };
    spans.push(Span::styled(part.clone(), style));
  }
  Line::from(spans)
}
