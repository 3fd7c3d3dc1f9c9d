use std::io::Error;
use std::time::Duration;

use derive_setters::Setters;
use ratatui::crossterm::event::KeyEvent;

pub const DEFAULT_ENDPOINT: &str =
    "https://npqppkopd7.execute-api.us-east-1.amazonaws.com/default/jobBoard";
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;
pub const PAGE_SIZES: [usize; 4] = [10, 20, 30, 50];
pub const DEFAULT_LOG_FILE: &str = "~/.scoop.log";

pub const HELP_TEXT: &str = "SundayScoop - Startup Database

Search
  /            focus the search box (filters all columns)
  Esc          clear the search box
  Enter, Tab   leave the search box

Navigation
  Left, h      previous page
  Right, l     next page
  Home, End    first / last page
  Up, k        previous row
  Down, j      next row
  g            go to page
  s            cycle page size (10, 20, 30, 50)

Records
  Enter        show record details
  y            copy website url
  Y            copy linkedin url

Other
  ?            show this help
  Esc          close popup
  q            quit";

#[derive(Debug)]
pub enum ScoopError {
    IoError(Error),
    InvalidArgument(String),
}

impl From<Error> for ScoopError {
    fn from(err: Error) -> Self {
        ScoopError::IoError(err)
    }
}

#[derive(Debug, Clone, Setters)]
#[setters(prefix = "with_")]
pub struct ScoopConfig {
    #[setters(into)]
    pub endpoint: String,
    pub debounce: Duration,
    pub page_size: usize,
    pub http_timeout: Duration,
    pub event_poll_time: u64,
}

impl Default for ScoopConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            page_size: PAGE_SIZES[0],
            http_timeout: Duration::from_secs(30),
            event_poll_time: 100,
        }
    }
}

/// What the single line input at the top of the screen is currently used for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputMode {
    Search,
    GotoPage,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Quit,
    Help,
    Exit,
    Enter,
    MoveUp,
    MoveDown,
    PreviousPage,
    NextPage,
    FirstPage,
    LastPage,
    CyclePageSize,
    Search,
    GotoPage,
    CopyWebsite,
    CopyLinkedIn,
    Resize(usize, usize),
    RawKey(KeyEvent),
}
