use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

/// Draw a centered error popup over `area`.
pub fn render_alert(frame: &mut Frame, area: Rect, message: &str) {
  let width = (area.width / 2).clamp(30, 60).min(area.width);
  let height = 5.min(area.height);
  let popup = Rect::new(
    area.x + (area.width - width) / 2,
    area.y + (area.height - height) / 2,
    width,
    height,
  );

  frame.render_widget(Clear, popup);

  let block = Block::default()
    .title(" Error ")
    .title_alignment(Alignment::Center)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Red));

  let text = Text::from(vec![
    Line::from(Span::styled(message, Style::default().fg(Color::White))),
    Line::from(""),
    Line::from(Span::styled(
      "Press any key to dismiss",
      Style::default().fg(Color::DarkGray),
    )),
  ]);

  let paragraph = Paragraph::new(text)
    .block(block)
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });
  frame.render_widget(paragraph, popup);
}
