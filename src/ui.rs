use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    symbols::border,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
};

use crate::domain::InputMode;
use crate::model::{Model, UIData};
use crate::table::{COLUMNS, Renderer};

pub const HEADER_HEIGHT: u16 = 2;
pub const SEARCH_HEIGHT: u16 = 3;
pub const PAGINATION_HEIGHT: u16 = 1;
pub const STATUSLINE_HEIGHT: u16 = 1;

const BACKGROUND: Color = Color::Rgb(17, 24, 39);
const BACKGROUND_ALT: Color = Color::Rgb(31, 41, 55);
const ACCENT: Color = Color::Rgb(79, 70, 229);
const TITLE_BLUE: Color = Color::Rgb(59, 130, 246);

#[derive(Debug, Default)]
pub struct TableUI;

impl TableUI {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draw(&self, model: &Model, frame: &mut Frame) {
        let uidata = model.get_uidata();

        let [header, search, body, pagination, statusline] = Layout::vertical([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Length(SEARCH_HEIGHT),
            Constraint::Min(3),
            Constraint::Length(PAGINATION_HEIGHT),
            Constraint::Length(STATUSLINE_HEIGHT),
        ])
        .areas(frame.area());

        frame.render_widget(Block::new().style(Style::new().bg(BACKGROUND)), frame.area());
        Self::draw_header(frame, header);

        if uidata.loading {
            frame.render_widget(Paragraph::new("Loading..."), body);
        } else {
            Self::draw_search(frame, search, uidata);
            Self::draw_table(frame, body, uidata);
            Self::draw_pagination(frame, pagination, uidata);
        }
        Self::draw_statusline(frame, statusline, uidata);

        if let Some(record) = &uidata.record {
            Self::draw_record(frame, record);
        }
        if uidata.show_popup {
            Self::draw_popup(frame, &uidata.popup_message);
        }
    }

    fn draw_header(frame: &mut Frame, area: Rect) {
        let title = Text::from(vec![
            Line::from("SundayScoop".bold()),
            Line::from("Startup Database".bold().fg(TITLE_BLUE)),
        ])
        .centered();
        frame.render_widget(Paragraph::new(title), area);
    }

    fn draw_search(frame: &mut Frame, area: Rect, uidata: &UIData) {
        let active = uidata.input_mode == Some(InputMode::Search);
        let mut title = " Search all columns ".to_string();
        if uidata.filter_pending {
            title.push_str("(…) ");
        }
        let block = Block::new()
            .borders(Borders::BOTTOM)
            .border_style(Style::new().fg(ACCENT))
            .title(title);

        let content = if uidata.search.input.is_empty() && !active {
            Line::from("press / to search".dim())
        } else {
            Line::from(uidata.search.input.as_str())
        };
        let inner = block.inner(area);
        frame.render_widget(Paragraph::new(content).block(block), area);

        if active {
            let x = inner.x + uidata.search.curser_pos as u16;
            frame.set_cursor_position((x.min(inner.right().saturating_sub(1)), inner.y));
        }
    }

    fn column_widths() -> Vec<Constraint> {
        COLUMNS
            .iter()
            .map(|c| match c.renderer {
                Renderer::Image => Constraint::Length(5),
                Renderer::Link(label) => Constraint::Length(label.len().max(c.header.len()) as u16),
                Renderer::Text => Constraint::Fill(1),
            })
            .collect()
    }

    fn draw_table(frame: &mut Frame, area: Rect, uidata: &UIData) {
        let header = Row::new(uidata.headers.iter().map(|h| Cell::from(*h)))
            .style(Style::new().bold().bg(ACCENT))
            .height(1);

        let rows = uidata.rows.iter().enumerate().map(|(i, cells)| {
            let bg = if i % 2 == 0 { BACKGROUND } else { BACKGROUND_ALT };
            Row::new(cells.iter().map(|c| Cell::from(c.as_str()))).style(Style::new().bg(bg))
        });

        let table = Table::new(rows, Self::column_widths())
            .header(header)
            .column_spacing(1)
            .block(Block::bordered().border_style(Style::new().fg(Color::DarkGray)))
            .row_highlight_style(Style::new().add_modifier(Modifier::REVERSED));

        let mut state = TableState::default();
        if !uidata.rows.is_empty() && uidata.record.is_none() {
            state.select(Some(uidata.selected_row));
        }
        frame.render_stateful_widget(table, area, &mut state);

        if uidata.rows.is_empty() {
            // Full width placeholder in place of the body rows.
            let [_, placeholder] =
                Layout::vertical([Constraint::Length(2), Constraint::Min(1)]).areas(area);
            let placeholder = Block::new().borders(Borders::LEFT | Borders::RIGHT).inner(placeholder);
            let [row] = Layout::vertical([Constraint::Length(1)])
                .flex(Flex::Center)
                .areas(placeholder);
            frame.render_widget(
                Paragraph::new("No Record Found!").alignment(Alignment::Center),
                row,
            );
        }
    }

    fn draw_pagination(frame: &mut Frame, area: Rect, uidata: &UIData) {
        let button = |label: &'static str, enabled: bool| {
            if enabled {
                Span::from(label).bold()
            } else {
                Span::from(label).dim()
            }
        };

        let goto = if uidata.input_mode == Some(InputMode::GotoPage) {
            Span::from(format!("[{:<4}]", uidata.goto.input)).fg(Color::Yellow)
        } else {
            Span::from(format!("[{:<4}]", uidata.page_index + 1))
        };

        let line = Line::from(vec![
            button("[<]", uidata.can_previous),
            " ".into(),
            button("[>]", uidata.can_next),
            "  Page ".into(),
            format!("{} of {}", uidata.page_index + 1, uidata.page_count).bold(),
            " | Go to page: ".into(),
            goto,
            format!("  Show {}", uidata.page_size).into(),
        ])
        .right_aligned();
        frame.render_widget(Paragraph::new(line), area);
    }

    fn draw_statusline(frame: &mut Frame, area: Rect, uidata: &UIData) {
        let right = format!("{}/{} ", uidata.filtered_rows, uidata.total_rows);
        let [left_area, right_area] =
            Layout::horizontal([Constraint::Min(1), Constraint::Length(right.len() as u16)])
                .areas(area);
        frame.render_widget(
            Paragraph::new(Line::from(uidata.status_message.as_str()).dim()),
            left_area,
        );
        frame.render_widget(Paragraph::new(right).dim(), right_area);
    }

    fn draw_record(frame: &mut Frame, record: &[(&'static str, String)]) {
        let area = Self::centered(frame.area(), 80, 80);
        let label_width = record.iter().map(|(l, _)| l.len()).max().unwrap_or(0);
        let lines: Vec<Line> = record
            .iter()
            .map(|(label, value)| {
                Line::from(vec![
                    format!("{label:>label_width$}  ").fg(TITLE_BLUE),
                    Span::from(value.as_str()),
                ])
            })
            .collect();

        let block = Block::bordered()
            .title(Line::from(" Company ".bold()).centered())
            .title_bottom(Line::from(" <Esc> back  <y>/<Y> copy url ").centered())
            .border_set(border::THICK);
        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
            area,
        );
    }

    fn draw_popup(frame: &mut Frame, message: &str) {
        let area = Self::centered(frame.area(), 60, 80);
        let block = Block::bordered()
            .title(Line::from(" Help ".bold()).centered())
            .title_bottom(Line::from(" <Esc> close ").centered())
            .border_set(border::THICK);
        frame.render_widget(Clear, area);
        frame.render_widget(Paragraph::new(message).block(block), area);
    }

    fn centered(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
        let [area] = Layout::vertical([Constraint::Percentage(percent_y)])
            .flex(Flex::Center)
            .areas(area);
        let [area] = Layout::horizontal([Constraint::Percentage(percent_x)])
            .flex(Flex::Center)
            .areas(area);
        area
    }
}
