use crate::ui::view::ShortcutInfo;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Draw the header bar with app name, context and shortcuts
pub fn draw_header(frame: &mut Frame, area: Rect, context: &str, shortcuts: &[ShortcutInfo]) {
  let mut spans = vec![
    Span::styled(" roster ", Style::default().fg(Color::Cyan).bold()),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(
      format!(" {} ", context),
      Style::default().fg(Color::Yellow).bold(),
    ),
    Span::raw(" "),
  ];
  spans.extend(shortcut_spans(shortcuts));

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
  frame.render_widget(paragraph, area);
}

/// Keys and brackets highlighted, descriptions dimmed
fn shortcut_spans(shortcuts: &[ShortcutInfo]) -> Vec<Span<'static>> {
  let mut spans = Vec::new();
  for shortcut in shortcuts {
    spans.push(Span::raw("  "));
    spans.push(Span::styled(
      format!("<{}>", shortcut.key),
      Style::default().fg(Color::Cyan),
    ));
    spans.push(Span::styled(
      format!(" {}", shortcut.label),
      Style::default().fg(Color::DarkGray),
    ));
  }
  spans
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_shortcut_spans() {
    let spans = shortcut_spans(&[ShortcutInfo::new("r", "refresh"), ShortcutInfo::new("q", "quit")]);
    let text: String = spans.iter().map(|s| s.content.as_ref()).collect();
    assert_eq!(text, "  <r> refresh  <q> quit");
  }
}
