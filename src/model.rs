use arboard::Clipboard;
use ratatui::crossterm::event::KeyEvent;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, trace};

use crate::company::{Company, text};
use crate::debounce::Debouncer;
use crate::domain::{HELP_TEXT, InputMode, Message, ScoopConfig};
use crate::fetch::{CompanySource, FetchResult, spawn_fetch};
use crate::inputter::{InputResult, Inputter};
use crate::table::{COLUMNS, TableModel};

#[derive(Debug, PartialEq)]
pub enum Status {
    LOADING,
    READY,
    QUITTING,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    TABLE,
    RECORD,
    POPUP,
    CMDINPUT,
}

/// Everything the ui needs to draw one frame.
#[derive(Debug, Clone)]
pub struct UIData {
    pub loading: bool,
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
    pub selected_row: usize,
    pub page_index: usize,
    pub page_count: usize,
    pub page_size: usize,
    pub can_previous: bool,
    pub can_next: bool,
    pub total_rows: usize,
    pub filtered_rows: usize,
    pub input_mode: Option<InputMode>,
    pub search: InputResult,
    pub goto: InputResult,
    pub filter_pending: bool,
    pub record: Option<Vec<(&'static str, String)>>,
    pub show_popup: bool,
    pub popup_message: String,
    pub status_message: String,
    pub width: usize,
    pub height: usize,
}

impl UIData {
    pub fn empty() -> Self {
        UIData {
            loading: true,
            headers: COLUMNS.iter().map(|c| c.header).collect(),
            rows: Vec::new(),
            selected_row: 0,
            page_index: 0,
            page_count: 0,
            page_size: 0,
            can_previous: false,
            can_next: false,
            total_rows: 0,
            filtered_rows: 0,
            input_mode: None,
            search: InputResult::default(),
            goto: InputResult::default(),
            filter_pending: false,
            record: None,
            show_popup: false,
            popup_message: String::new(),
            status_message: String::new(),
            width: 0,
            height: 0,
        }
    }
}

pub struct Model {
    config: ScoopConfig,
    pub status: Status,
    modus: Modus,
    previous_modus: Modus,
    fetch: Option<Receiver<FetchResult>>,
    table: TableModel,
    debouncer: Debouncer,
    search_input: Inputter,
    goto_input: Inputter,
    input_mode: Option<InputMode>,
    clipboard: Option<Clipboard>,
    status_message: String,
    width: usize,
    height: usize,
    uidata: UIData,
}

impl Model {
    pub fn init(config: &ScoopConfig, ui_width: usize, ui_height: usize) -> Self {
        let mut model = Self {
            config: config.clone(),
            status: Status::LOADING,
            modus: Modus::TABLE,
            previous_modus: Modus::TABLE,
            fetch: None,
            table: TableModel::new(Vec::new(), COLUMNS, config.page_size),
            debouncer: Debouncer::new("", config.debounce),
            search_input: Inputter::default(),
            goto_input: Inputter::digits(),
            input_mode: None,
            clipboard: None,
            status_message: "Loading ...".to_string(),
            width: ui_width,
            height: ui_height,
            uidata: UIData::empty(),
        };
        model.update_uidata(Instant::now());
        model
    }

    /// Issue the one and only fetch of the company list.
    pub fn start_fetch<S: CompanySource>(&mut self, source: S) {
        if self.fetch.is_some() {
            debug!("Fetch already running, ignoring");
            return;
        }
        info!("Fetching companies from {}", self.config.endpoint);
        self.status = Status::LOADING;
        self.fetch = Some(spawn_fetch(source));
        self.update_uidata(Instant::now());
    }

    pub fn get_uidata(&self) -> &UIData {
        &self.uidata
    }

    pub fn raw_keyevents(&self) -> bool {
        self.input_mode.is_some()
    }

    /// Time until the event loop has to wake up again on its own.
    pub fn next_deadline(&self, now: Instant) -> Option<Duration> {
        self.debouncer.time_to_deadline(now)
    }

    pub fn quit(&mut self) {
        self.debouncer.cancel();
        self.status = Status::QUITTING;
    }

    pub fn update(&mut self, message: Option<Message>) {
        self.update_at(message, Instant::now());
    }

    pub fn update_at(&mut self, message: Option<Message>, now: Instant) {
        self.poll_fetch();
        self.poll_debouncer(now);

        if let Some(msg) = message {
            match self.modus {
                Modus::TABLE => match msg {
                    Message::Quit => self.quit(),
                    Message::Help => self.show_help(),
                    Message::Resize(width, height) => self.ui_resize(width, height),
                    _ if self.status == Status::LOADING => (),
                    Message::Search => self.enter_input_mode(InputMode::Search),
                    Message::GotoPage => self.enter_input_mode(InputMode::GotoPage),
                    Message::PreviousPage => self.table.previous_page(),
                    Message::NextPage => self.table.next_page(),
                    Message::FirstPage => self.table.first_page(),
                    Message::LastPage => self.table.last_page(),
                    Message::CyclePageSize => self.cycle_page_size(),
                    Message::MoveUp => self.table.move_curser_up(),
                    Message::MoveDown => self.table.move_curser_down(),
                    Message::Enter => self.enter(),
                    Message::CopyWebsite => self.copy_selected(|c| text(&c.company_url)),
                    Message::CopyLinkedIn => self.copy_selected(|c| text(&c.linkedin_url)),
                    _ => (),
                },
                Modus::RECORD => match msg {
                    Message::Quit => self.quit(),
                    Message::Help => self.show_help(),
                    Message::Resize(width, height) => self.ui_resize(width, height),
                    Message::Enter | Message::Exit => self.exit(),
                    Message::MoveUp => self.table.move_curser_up(),
                    Message::MoveDown => self.table.move_curser_down(),
                    Message::CopyWebsite => self.copy_selected(|c| text(&c.company_url)),
                    Message::CopyLinkedIn => self.copy_selected(|c| text(&c.linkedin_url)),
                    _ => (),
                },
                Modus::POPUP => match msg {
                    Message::Quit => self.quit(),
                    Message::Resize(width, height) => self.ui_resize(width, height),
                    Message::Exit | Message::Enter => self.exit(),
                    _ => (),
                },
                Modus::CMDINPUT => match msg {
                    Message::RawKey(key) => self.raw_input(key, now),
                    Message::Resize(width, height) => self.ui_resize(width, height),
                    _ => (),
                },
            }
        }

        self.update_uidata(now);
    }

    // -------------------- Root view ---------------------- //

    fn poll_fetch(&mut self) {
        let Some(rx) = &self.fetch else {
            return;
        };
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => {
                error!("Error fetching data: fetch thread ended without a result");
                self.fetch = None;
                self.loaded(Vec::new());
                return;
            }
        };
        self.fetch = None;
        match result {
            Ok(companies) => {
                info!("Received {} companies", companies.len());
                self.loaded(companies);
            }
            Err(e) => {
                error!("Error fetching data: {e}");
                self.loaded(Vec::new());
            }
        }
    }

    fn loaded(&mut self, companies: Vec<Company>) {
        let n = companies.len();
        self.table.set_data(companies);
        self.status = Status::READY;
        if n == 0 {
            self.set_status_message("No data");
        } else {
            self.set_status_message(format!("Loaded {n} companies"));
        }
    }

    // -------------------- Search ---------------------- //

    fn poll_debouncer(&mut self, now: Instant) {
        if let Some(filter) = self.debouncer.poll(now) {
            self.apply_filter(&filter);
        }
    }

    fn apply_filter(&mut self, filter: &str) {
        self.table.set_global_filter(filter);
        self.debouncer.sync(self.table.global_filter());
        if filter.is_empty() {
            self.set_status_message(format!("{} companies", self.table.filtered_len()));
        } else {
            self.set_status_message(format!(
                "{} of {} companies match \"{}\"",
                self.table.filtered_len(),
                self.table.total_len(),
                filter
            ));
        }
    }

    fn enter_input_mode(&mut self, mode: InputMode) {
        trace!("Entering input mode {:?} ...", mode);
        self.previous_modus = self.modus;
        self.modus = Modus::CMDINPUT;
        self.input_mode = Some(mode);
        match mode {
            InputMode::Search => self.search_input.set(self.debouncer.value()),
            InputMode::GotoPage => self.goto_input.clear(),
        }
    }

    fn leave_input_mode(&mut self) {
        trace!("Leaving input mode {:?}", self.input_mode);
        self.input_mode = None;
        self.modus = self.previous_modus;
        self.previous_modus = Modus::CMDINPUT;
    }

    fn raw_input(&mut self, key: KeyEvent, now: Instant) {
        match self.input_mode {
            Some(InputMode::Search) => {
                let result = self.search_input.read(key);
                if result.canceled {
                    // Clearing is an external reset, it applies right away.
                    self.debouncer.sync("");
                    self.apply_filter("");
                } else if result.changed {
                    self.debouncer.edit(result.input.clone(), now);
                }
                if result.finished {
                    self.leave_input_mode();
                }
            }
            Some(InputMode::GotoPage) => {
                let result = self.goto_input.read(key);
                if result.changed && !result.canceled {
                    // One based in the ui, an empty entry means the first page.
                    let page = result.input.parse::<usize>().unwrap_or(0).saturating_sub(1);
                    self.table.set_page_index(page);
                }
                if result.finished {
                    self.leave_input_mode();
                }
            }
            None => {}
        }
    }

    // -------------------- Table / record handling ---------------------- //

    fn cycle_page_size(&mut self) {
        self.table.cycle_page_size();
        self.set_status_message(format!("Showing {} rows per page", self.table.page_size()));
    }

    fn enter(&mut self) {
        if self.table.selected().is_some() {
            self.previous_modus = self.modus;
            self.modus = Modus::RECORD;
        }
    }

    fn exit(&mut self) {
        match self.modus {
            Modus::RECORD => {
                self.previous_modus = Modus::RECORD;
                self.modus = Modus::TABLE;
            }
            Modus::POPUP => {
                trace!("Close popup ...");
                self.modus = self.previous_modus;
                self.previous_modus = Modus::POPUP;
            }
            Modus::TABLE | Modus::CMDINPUT => {}
        }
    }

    fn show_help(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::POPUP;
    }

    fn copy_selected(&mut self, field: fn(&Company) -> String) {
        let Some(value) = self.table.selected().map(field) else {
            return;
        };
        if value.is_empty() {
            self.set_status_message("Nothing to copy");
            return;
        }
        if self.clipboard.is_none() {
            match Clipboard::new() {
                Ok(clipboard) => self.clipboard = Some(clipboard),
                Err(e) => {
                    error!("Clipboard unavailable: {:?}", e);
                    self.set_status_message("Clipboard unavailable");
                    return;
                }
            }
        }
        if let Some(clipboard) = self.clipboard.as_mut() {
            match clipboard.set_text(value.clone()) {
                Ok(_) => {
                    trace!("Copied {} to clipboard.", value);
                    self.set_status_message(format!("Copied {value}"));
                }
                Err(e) => error!("Error copying to clipboard: {:?}", e),
            }
        }
    }

    fn ui_resize(&mut self, width: usize, height: usize) {
        trace!(
            "UI was resized! w:{}->{}, h:{}->{}",
            self.width, width, self.height, height
        );
        self.width = width;
        self.height = height;
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
    }

    fn update_uidata(&mut self, now: Instant) {
        let table = &self.table;
        self.uidata = UIData {
            loading: self.status == Status::LOADING,
            headers: table.columns().iter().map(|c| c.header).collect(),
            rows: table.page_cells(),
            selected_row: table.curser_row(),
            page_index: table.page_index(),
            page_count: table.page_count(),
            page_size: table.page_size(),
            can_previous: table.can_previous_page(),
            can_next: table.can_next_page(),
            total_rows: table.total_len(),
            filtered_rows: table.filtered_len(),
            input_mode: self.input_mode,
            search: match self.input_mode {
                Some(InputMode::Search) => self.search_input.get(),
                _ => InputResult {
                    input: self.debouncer.value().to_string(),
                    ..Default::default()
                },
            },
            goto: self.goto_input.get(),
            filter_pending: self.debouncer.time_to_deadline(now).is_some(),
            record: match self.modus {
                Modus::RECORD => table.selected().map(|c| c.fields()),
                Modus::POPUP if self.previous_modus == Modus::RECORD => {
                    table.selected().map(|c| c.fields())
                }
                _ => None,
            },
            show_popup: self.modus == Modus::POPUP,
            popup_message: HELP_TEXT.to_string(),
            status_message: self.status_message.clone(),
            width: self.width,
            height: self.height,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::company::tests::company;
    use crate::fetch::tests::{StubSource, failing};
    use ratatui::crossterm::event::{KeyCode, KeyModifiers};

    fn twenty_five() -> FetchResult {
        let mut data: Vec<Company> = (0..24)
            .map(|i| company(&format!("Company{i}"), "Software", "Austin, TX"))
            .collect();
        data.push(company("Stripe", "Fintech", "San Francisco, CA"));
        Ok(data)
    }

    fn loaded_model(source: StubSource) -> Model {
        let mut model = Model::init(&ScoopConfig::default(), 120, 40);
        model.start_fetch(source);
        let deadline = Instant::now() + Duration::from_secs(5);
        while model.status == Status::LOADING && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
            model.update(None);
        }
        model
    }

    fn key(code: KeyCode) -> Option<Message> {
        Some(Message::RawKey(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    #[test]
    fn starts_loading() {
        let model = Model::init(&ScoopConfig::default(), 80, 24);
        assert_eq!(model.status, Status::LOADING);
        assert!(model.get_uidata().loading);
    }

    #[test]
    fn fetch_success_fills_first_page() {
        let model = loaded_model(StubSource(twenty_five));
        let ui = model.get_uidata();
        assert_eq!(model.status, Status::READY);
        assert!(!ui.loading);
        assert_eq!(ui.page_count, 3);
        assert_eq!(ui.rows.len(), 10);
        assert_eq!(ui.total_rows, 25);
        assert!(!ui.can_previous);
        assert!(ui.can_next);
    }

    #[test]
    fn fetch_failure_clears_loading_with_empty_table() {
        let model = loaded_model(StubSource(failing));
        let ui = model.get_uidata();
        assert_eq!(model.status, Status::READY);
        assert!(!ui.loading);
        assert!(ui.rows.is_empty());
        assert_eq!(ui.page_count, 0);
        assert_eq!(ui.status_message, "No data");
    }

    #[test]
    fn second_fetch_is_ignored() {
        let mut model = Model::init(&ScoopConfig::default(), 80, 24);
        model.start_fetch(StubSource(twenty_five));
        model.start_fetch(StubSource(failing));
        let deadline = Instant::now() + Duration::from_secs(5);
        while model.status == Status::LOADING && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
            model.update(None);
        }
        assert_eq!(model.get_uidata().total_rows, 25);
    }

    #[test]
    fn typing_fin_filters_after_the_debounce_delay() {
        let mut model = loaded_model(StubSource(twenty_five));
        model.update(Some(Message::NextPage));
        assert_eq!(model.get_uidata().page_index, 1);

        let t0 = Instant::now();
        model.update_at(Some(Message::Search), t0);
        assert!(model.raw_keyevents());
        for (i, c) in "fin".chars().enumerate() {
            model.update_at(key(KeyCode::Char(c)), t0 + Duration::from_millis(50 * i as u64));
        }
        // Not committed yet
        model.update_at(None, t0 + Duration::from_millis(300));
        assert_eq!(model.get_uidata().filtered_rows, 25);
        assert!(model.get_uidata().filter_pending);
        assert_eq!(model.get_uidata().search.input, "fin");

        model.update_at(None, t0 + Duration::from_millis(100 + 500));
        let ui = model.get_uidata();
        assert_eq!(ui.filtered_rows, 1);
        assert_eq!(ui.rows[0][1], "Stripe");
        assert_eq!(ui.page_index, 0);
        assert_eq!(ui.page_count, 1);
    }

    #[test]
    fn leaving_the_search_box_keeps_the_pending_commit() {
        let mut model = loaded_model(StubSource(twenty_five));
        let t0 = Instant::now();
        model.update_at(Some(Message::Search), t0);
        for c in "stri".chars() {
            model.update_at(key(KeyCode::Char(c)), t0);
        }
        model.update_at(key(KeyCode::Enter), t0);
        assert!(!model.raw_keyevents());

        model.update_at(None, t0 + Duration::from_millis(500));
        assert_eq!(model.get_uidata().filtered_rows, 1);
        assert_eq!(model.get_uidata().search.input, "stri");
    }

    #[test]
    fn escape_resets_the_filter_immediately() {
        let mut model = loaded_model(StubSource(twenty_five));
        let t0 = Instant::now();
        model.update_at(Some(Message::Search), t0);
        model.update_at(key(KeyCode::Char('q')), t0);
        model.update_at(None, t0 + Duration::from_millis(500));
        assert_eq!(model.get_uidata().filtered_rows, 0);

        model.update_at(Some(Message::Search), t0 + Duration::from_millis(600));
        model.update_at(key(KeyCode::Char('y')), t0 + Duration::from_millis(600));
        model.update_at(key(KeyCode::Esc), t0 + Duration::from_millis(610));
        assert_eq!(model.get_uidata().filtered_rows, 25);
        assert_eq!(model.next_deadline(t0 + Duration::from_millis(610)), None);
        assert!(!model.raw_keyevents());
    }

    #[test]
    fn quitting_drops_the_pending_search() {
        let mut model = loaded_model(StubSource(twenty_five));
        let t0 = Instant::now();
        model.update_at(Some(Message::Search), t0);
        for c in "fin".chars() {
            model.update_at(key(KeyCode::Char(c)), t0);
        }
        model.update_at(key(KeyCode::Enter), t0);
        assert!(model.get_uidata().filter_pending);

        model.update_at(Some(Message::Quit), t0 + Duration::from_millis(100));
        assert_eq!(model.status, Status::QUITTING);
        assert_eq!(model.next_deadline(t0 + Duration::from_millis(100)), None);

        model.update_at(None, t0 + Duration::from_secs(1));
        let ui = model.get_uidata();
        assert_eq!(ui.filtered_rows, 25);
        assert!(!ui.filter_pending);
    }

    #[test]
    fn pending_search_follows_the_given_clock() {
        let mut model = loaded_model(StubSource(twenty_five));
        // A clock well behind the wall clock: the deadline is already past in real time.
        let Some(t0) = Instant::now().checked_sub(Duration::from_secs(2)) else {
            return;
        };
        model.update_at(Some(Message::Search), t0);
        for c in "stri".chars() {
            model.update_at(key(KeyCode::Char(c)), t0);
        }

        model.update_at(None, t0 + Duration::from_millis(100));
        assert!(model.get_uidata().filter_pending);
        assert_eq!(
            model.next_deadline(t0 + Duration::from_millis(100)),
            Some(Duration::from_millis(400))
        );
        assert_eq!(model.get_uidata().filtered_rows, 25);

        model.update_at(None, t0 + Duration::from_millis(500));
        assert!(!model.get_uidata().filter_pending);
        assert_eq!(model.get_uidata().filtered_rows, 1);
    }

    #[test]
    fn goto_page_is_one_based_and_clamped() {
        let mut model = loaded_model(StubSource(twenty_five));
        model.update(Some(Message::GotoPage));
        model.update(key(KeyCode::Char('2')));
        assert_eq!(model.get_uidata().page_index, 1);
        model.update(key(KeyCode::Char('0')));
        assert_eq!(model.get_uidata().page_index, 2);
        model.update(key(KeyCode::Enter));
        assert!(!model.raw_keyevents());

        model.update(Some(Message::GotoPage));
        model.update(key(KeyCode::Char('1')));
        model.update(key(KeyCode::Backspace));
        assert_eq!(model.get_uidata().page_index, 0);
    }

    #[test]
    fn navigation_is_ignored_while_loading() {
        let mut model = Model::init(&ScoopConfig::default(), 80, 24);
        model.update(Some(Message::Search));
        assert!(!model.raw_keyevents());
        model.update(Some(Message::Quit));
        assert_eq!(model.status, Status::QUITTING);
    }

    #[test]
    fn record_view_and_help_popup() {
        let mut model = loaded_model(StubSource(twenty_five));
        model.update(Some(Message::MoveDown));
        model.update(Some(Message::Enter));
        let record = model.get_uidata().record.clone().unwrap();
        assert_eq!(record[0], ("Name", "Company1".to_string()));

        model.update(Some(Message::Help));
        assert!(model.get_uidata().show_popup);
        assert!(model.get_uidata().record.is_some());
        model.update(Some(Message::Exit));
        assert!(!model.get_uidata().show_popup);
        assert!(model.get_uidata().record.is_some());

        model.update(Some(Message::Exit));
        assert!(model.get_uidata().record.is_none());
    }

    #[test]
    fn page_size_cycles() {
        let mut model = loaded_model(StubSource(twenty_five));
        model.update(Some(Message::CyclePageSize));
        let ui = model.get_uidata();
        assert_eq!(ui.page_size, 20);
        assert_eq!(ui.page_count, 2);
        assert_eq!(ui.rows.len(), 20);
    }
}
