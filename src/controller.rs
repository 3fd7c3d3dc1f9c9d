use std::time::{Duration, Instant};
use tracing::trace;

use crate::domain::{Message, ScoopConfig, ScoopError};
use crate::model::Model;
use ratatui::crossterm::event::{self, Event, KeyCode, KeyModifiers};

pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(cfg: &ScoopConfig) -> Self {
        Self {
            event_poll_time: cfg.event_poll_time,
        }
    }

    pub fn handle_event(&self, model: &Model) -> Result<Option<Message>, ScoopError> {
        // Wake up no later than a pending search commit is due.
        let mut timeout = Duration::from_millis(self.event_poll_time);
        if let Some(due) = model.next_deadline(Instant::now()) {
            timeout = timeout.min(due);
        }

        if event::poll(timeout)? {
            return Ok(match event::read()? {
                Event::Key(key) if key.kind == event::KeyEventKind::Press => {
                    self.handle_key(key, model.raw_keyevents())
                }
                Event::Resize(width, height) => {
                    Some(Message::Resize(width as usize, height as usize))
                }
                _ => None,
            });
        }
        Ok(None)
    }

    fn handle_key(&self, key: event::KeyEvent, raw: bool) -> Option<Message> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(Message::Quit);
        }
        if raw {
            return Some(Message::RawKey(key));
        }
        let message = match key.code {
            KeyCode::Char('q') => Some(Message::Quit),
            KeyCode::Char('?') => Some(Message::Help),
            KeyCode::Esc => Some(Message::Exit),
            KeyCode::Enter => Some(Message::Enter),
            KeyCode::Char('/') => Some(Message::Search),
            KeyCode::Char('g') => Some(Message::GotoPage),
            KeyCode::Char('s') => Some(Message::CyclePageSize),
            KeyCode::Left | KeyCode::Char('h') => Some(Message::PreviousPage),
            KeyCode::Right | KeyCode::Char('l') => Some(Message::NextPage),
            KeyCode::Home => Some(Message::FirstPage),
            KeyCode::End => Some(Message::LastPage),
            KeyCode::Up | KeyCode::Char('k') => Some(Message::MoveUp),
            KeyCode::Down | KeyCode::Char('j') => Some(Message::MoveDown),
            KeyCode::Char('y') => Some(Message::CopyWebsite),
            KeyCode::Char('Y') => Some(Message::CopyLinkedIn),
            _ => None,
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }
}
