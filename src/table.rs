use rayon::prelude::*;
use std::time::Instant;
use tracing::{debug, trace};

use crate::company::{Company, text};
use crate::domain::PAGE_SIZES;

/// How a column turns its raw value into what ends up in the cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Renderer {
    Text,
    Image,
    Link(&'static str),
}

pub struct ColumnDef {
    pub key: &'static str,
    pub header: &'static str,
    pub accessor: fn(&Company) -> String,
    pub renderer: Renderer,
}

impl ColumnDef {
    /// Raw stringified value, this is what the global filter looks at.
    pub fn value(&self, company: &Company) -> String {
        (self.accessor)(company)
    }

    pub fn render(&self, company: &Company) -> String {
        let value = self.value(company);
        match self.renderer {
            Renderer::Text => value,
            _ if value.is_empty() => value,
            Renderer::Image => "[img]".to_string(),
            Renderer::Link(label) => label.to_string(),
        }
    }
}

fn logo(c: &Company) -> String {
    text(&c.logo)
}
fn name(c: &Company) -> String {
    text(&c.name)
}
fn company_url(c: &Company) -> String {
    text(&c.company_url)
}
fn linkedin_url(c: &Company) -> String {
    text(&c.linkedin_url)
}
fn industry(c: &Company) -> String {
    text(&c.industry)
}
fn location(c: &Company) -> String {
    text(&c.headquarters_city_state)
}
fn latest_funding(c: &Company) -> String {
    text(&c.latest_funding)
}
fn latest_funding_round(c: &Company) -> String {
    text(&c.latest_funding_round)
}
fn size(c: &Company) -> String {
    text(&c.size)
}
fn li_size(c: &Company) -> String {
    text(&c.li_size)
}
fn age_founded(c: &Company) -> String {
    text(&c.age_founded)
}
fn glass_door(c: &Company) -> String {
    text(&c.glass_door)
}

#[rustfmt::skip]
pub const COLUMNS: &[ColumnDef] = &[
    ColumnDef { key: "logo", header: "Logo", accessor: logo, renderer: Renderer::Image },
    ColumnDef { key: "name", header: "Name", accessor: name, renderer: Renderer::Text },
    ColumnDef { key: "company_url", header: "Website", accessor: company_url, renderer: Renderer::Link("Visit") },
    ColumnDef { key: "linkedin_url", header: "LinkedIn", accessor: linkedin_url, renderer: Renderer::Link("Profile") },
    ColumnDef { key: "industry", header: "Industry", accessor: industry, renderer: Renderer::Text },
    ColumnDef { key: "headquarters_city_state", header: "Location", accessor: location, renderer: Renderer::Text },
    ColumnDef { key: "latest_funding", header: "Latest Funding", accessor: latest_funding, renderer: Renderer::Text },
    ColumnDef { key: "latest_funding_round", header: "Funding Round", accessor: latest_funding_round, renderer: Renderer::Text },
    ColumnDef { key: "size", header: "Size", accessor: size, renderer: Renderer::Text },
    ColumnDef { key: "li_size", header: "LinkedIn Size", accessor: li_size, renderer: Renderer::Text },
    ColumnDef { key: "age_founded", header: "Founded", accessor: age_founded, renderer: Renderer::Text },
    ColumnDef { key: "glass_door", header: "Glassdoor Rating", accessor: glass_door, renderer: Renderer::Text },
];

/// Filter and pagination state over a fixed set of companies.
///
/// `rows` maps the filtered view to indices into `companies`. All state changes
/// go through the setters below, which keep `page_index` inside
/// `[0, page_count)` (or at 0 when there are no pages).
pub struct TableModel {
    companies: Vec<Company>,
    columns: &'static [ColumnDef],
    global_filter: String,
    rows: Vec<usize>,
    page_index: usize,
    page_size: usize,
    curser_row: usize,
}

impl TableModel {
    pub fn new(companies: Vec<Company>, columns: &'static [ColumnDef], page_size: usize) -> Self {
        let mut table = Self {
            companies,
            columns,
            global_filter: String::new(),
            rows: Vec::new(),
            page_index: 0,
            page_size: page_size.max(1),
            curser_row: 0,
        };
        debug!(
            "Columns: {:?}",
            columns.iter().map(|c| c.key).collect::<Vec<_>>()
        );
        table.apply_filter();
        table
    }

    pub fn set_data(&mut self, companies: Vec<Company>) {
        self.companies = companies;
        self.apply_filter();
        self.clamp();
    }

    pub fn columns(&self) -> &'static [ColumnDef] {
        self.columns
    }

    pub fn total_len(&self) -> usize {
        self.companies.len()
    }

    pub fn filtered_len(&self) -> usize {
        self.rows.len()
    }

    pub fn global_filter(&self) -> &str {
        &self.global_filter
    }

    pub fn set_global_filter(&mut self, filter: &str) {
        if filter == self.global_filter {
            return;
        }
        self.global_filter = filter.to_string();
        self.apply_filter();
        self.page_index = 0;
        self.curser_row = 0;
    }

    fn apply_filter(&mut self) {
        let start_time = Instant::now();
        let term = self.global_filter.to_lowercase();
        if term.is_empty() {
            self.rows = (0..self.companies.len()).collect();
        } else {
            let columns = self.columns;
            let companies = &self.companies;
            self.rows = (0..companies.len())
                .into_par_iter()
                .filter(|&idx| Self::row_matches(columns, &companies[idx], &term))
                .collect();
        }
        trace!(
            "Filter {:?} kept {}/{} rows in {}ms",
            self.global_filter,
            self.rows.len(),
            self.companies.len(),
            start_time.elapsed().as_millis()
        );
    }

    // A row is kept as soon as one column contains the (lower cased) term.
    fn row_matches(columns: &[ColumnDef], company: &Company, term: &str) -> bool {
        columns
            .iter()
            .any(|c| c.value(company).to_lowercase().contains(term))
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_count(&self) -> usize {
        self.rows.len().div_ceil(self.page_size)
    }

    pub fn can_previous_page(&self) -> bool {
        self.page_index > 0
    }

    pub fn can_next_page(&self) -> bool {
        self.page_index + 1 < self.page_count()
    }

    pub fn previous_page(&mut self) {
        if self.can_previous_page() {
            self.set_page_index(self.page_index - 1);
        }
    }

    pub fn next_page(&mut self) {
        if self.can_next_page() {
            self.set_page_index(self.page_index + 1);
        }
    }

    pub fn first_page(&mut self) {
        self.set_page_index(0);
    }

    pub fn last_page(&mut self) {
        self.set_page_index(self.page_count().saturating_sub(1));
    }

    pub fn set_page_index(&mut self, index: usize) {
        self.page_index = index;
        self.curser_row = 0;
        self.clamp();
    }

    /// Change the page size while keeping the first row of the current page
    /// on screen.
    pub fn set_page_size(&mut self, size: usize) {
        let size = size.max(1);
        let first_row = self.page_index * self.page_size;
        self.page_size = size;
        self.page_index = first_row / size;
        self.curser_row = 0;
        self.clamp();
    }

    pub fn cycle_page_size(&mut self) {
        let next = PAGE_SIZES
            .iter()
            .position(|&s| s == self.page_size)
            .map(|p| PAGE_SIZES[(p + 1) % PAGE_SIZES.len()])
            .unwrap_or(PAGE_SIZES[0]);
        self.set_page_size(next);
    }

    fn clamp(&mut self) {
        let max_index = self.page_count().saturating_sub(1);
        self.page_index = self.page_index.min(max_index);
        self.curser_row = self
            .curser_row
            .min(self.page_range().len().saturating_sub(1));
    }

    fn page_range(&self) -> std::ops::Range<usize> {
        let begin = std::cmp::min(self.page_index * self.page_size, self.rows.len());
        let end = std::cmp::min(begin + self.page_size, self.rows.len());
        begin..end
    }

    pub fn page_rows(&self) -> Vec<&Company> {
        self.rows[self.page_range()]
            .iter()
            .map(|&idx| &self.companies[idx])
            .collect()
    }

    /// Rendered cells of the current page, one `Vec` per row.
    pub fn page_cells(&self) -> Vec<Vec<String>> {
        self.page_rows()
            .into_iter()
            .map(|c| self.columns.iter().map(|col| col.render(c)).collect())
            .collect()
    }

    pub fn curser_row(&self) -> usize {
        self.curser_row
    }

    pub fn move_curser_up(&mut self) {
        self.curser_row = self.curser_row.saturating_sub(1);
    }

    pub fn move_curser_down(&mut self) {
        if self.curser_row + 1 < self.page_range().len() {
            self.curser_row += 1;
        }
    }

    pub fn selected(&self) -> Option<&Company> {
        let idx = self.page_range().start + self.curser_row;
        self.rows.get(idx).map(|&ridx| &self.companies[ridx])
    }
}
