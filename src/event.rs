use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use std::time::Duration;
use tokio::sync::mpsc;

/// Application events
#[derive(Debug)]
pub enum Event {
  /// Terminal key press
  Key(KeyEvent),
  /// Terminal was resized; the next draw picks up the new size
  Resize,
  /// Periodic tick for UI refresh and polling list operations
  Tick,
}

/// Event handler that produces events from terminal input and a tick timer
pub struct EventHandler {
  rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
  /// Create a new event handler with the given tick rate
  pub fn new(tick_rate: Duration) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();

    // Ticks run on their own timer so held keys cannot starve them
    spawn_ticker(tx.clone(), tick_rate);

    // Terminal reads block, keep them off the async workers
    tokio::task::spawn_blocking(move || loop {
      if tx.is_closed() {
        break;
      }
      let event = match event::poll(tick_rate) {
        Ok(true) => match event::read() {
          Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => Some(Event::Key(key)),
          Ok(CrosstermEvent::Resize(_, _)) => Some(Event::Resize),
          Ok(_) => None,
          Err(e) => {
            tracing::warn!(error = %e, "Failed to read terminal event");
            None
          }
        },
        Ok(false) => None,
        Err(e) => {
          tracing::error!(error = %e, "Terminal event polling failed");
          break;
        }
      };

      if let Some(event) = event {
        if tx.send(event).is_err() {
          break;
        }
      }
    });

    Self { rx }
  }

  /// Receive the next event
  pub async fn next(&mut self) -> Option<Event> {
    self.rx.recv().await
  }
}

fn spawn_ticker(tx: mpsc::UnboundedSender<Event>, tick_rate: Duration) {
  tokio::spawn(async move {
    let mut interval = tokio::time::interval(tick_rate);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
      interval.tick().await;
      if tx.send(Event::Tick).is_err() {
        break;
      }
    }
  });
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::{KeyCode, KeyModifiers};

  #[tokio::test]
  async fn test_ticks_keep_coming_during_key_bursts() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    spawn_ticker(tx.clone(), Duration::from_millis(5));

    // A held key floods the channel
    let key = KeyEvent::new(KeyCode::Char('j'), KeyModifiers::NONE);
    for _ in 0..50 {
      tx.send(Event::Key(key)).unwrap();
      tokio::time::sleep(Duration::from_millis(1)).await;
    }

    let mut ticks = 0;
    while let Ok(event) = rx.try_recv() {
      if matches!(event, Event::Tick) {
        ticks += 1;
      }
    }
    assert!(ticks >= 2, "only {} ticks", ticks);
  }
}
