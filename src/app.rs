use crate::cache::StudentCache;
use crate::config::Config;
use crate::event::{Event, EventHandler};
use crate::list::StudentList;
use crate::roster::MockSource;
use crate::ui;
use crate::ui::view::{View, ViewAction};
use crate::ui::views::StudentListView;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::sync::Arc;
use std::time::Duration;

/// Main application state
pub struct App {
  /// Navigation stack - root is always at index 0
  view_stack: Vec<Box<dyn View>>,

  /// Whether to quit
  should_quit: bool,
}

impl App {
  pub fn new(config: &Config, source: MockSource, cache: StudentCache) -> Self {
    let list = StudentList::new(Arc::new(source), cache, config.page_size);
    Self::with_root(Box::new(StudentListView::new(list, config.end_threshold)))
  }

  fn with_root(root: Box<dyn View>) -> Self {
    Self {
      view_stack: vec![root],
      should_quit: false,
    }
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;

    let result = self.event_loop().await;

    // Cleanup terminal, even if the loop failed
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  async fn event_loop(&mut self) -> Result<()> {
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    let mut events = EventHandler::new(Duration::from_millis(100));

    // The root view is focused on start
    self.focus_top();

    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      match events.next().await {
        Some(event) => self.handle_event(event),
        None => break,
      }
    }

    tracing::info!("Exiting");
    Ok(())
  }

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Resize => {}
      Event::Tick => {
        // Views below the top keep receiving their loads
        for view in &mut self.view_stack {
          view.tick();
        }
      }
    }
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    if let Some(view) = self.view_stack.last_mut() {
      let action = view.handle_key(key);
      self.apply(action);
    }
  }

  fn apply(&mut self, action: ViewAction) {
    match action {
      ViewAction::None => {}
      ViewAction::Push(view) => {
        self.view_stack.push(view);
        self.focus_top();
      }
      ViewAction::Pop => {
        if self.view_stack.len() > 1 {
          self.view_stack.pop();
          self.focus_top();
        } else {
          self.should_quit = true;
        }
      }
    }
  }

  fn focus_top(&mut self) {
    if let Some(view) = self.view_stack.last_mut() {
      view.on_focus();
    }
  }

  pub fn current_view_mut(&mut self) -> Option<&mut Box<dyn View>> {
    self.view_stack.last_mut()
  }

  pub fn breadcrumb(&self) -> Vec<String> {
    self
      .view_stack
      .iter()
      .map(|v| v.breadcrumb_label())
      .collect()
  }
}
