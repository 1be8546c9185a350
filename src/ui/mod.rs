pub mod components;
pub mod renderfns;
pub mod view;
pub mod views;

use crate::app::App;
use ratatui::prelude::*;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &mut App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Min(1),    // Current view
      Constraint::Length(1), // Breadcrumb
    ])
    .split(frame.area());

  let breadcrumb = app.breadcrumb();
  let context = breadcrumb.last().cloned().unwrap_or_default();

  let mut status = None;
  if let Some(view) = app.current_view_mut() {
    let shortcuts = view.shortcuts();
    renderfns::draw_header(frame, chunks[0], &context, &shortcuts);
    view.render(frame, chunks[1]);
    status = view.status();
  }

  renderfns::draw_footer(frame, chunks[2], &breadcrumb, status.as_deref());
}
