//! Terminal Rendering
//!
//! TigerStyle: Plain-text tables for a controller's visible page.

use std::fmt::Write;

use crate::client::RecordApi;
use crate::controller::ListController;
use crate::model::{Entity, Post, User, UserDirectory};

// =============================================================================
// TigerStyle Constants
// =============================================================================

/// Longest title shown in a table cell before truncation
pub const TITLE_PREVIEW_CHARS_MAX: usize = 50;

/// Column separator
const COLUMN_GAP: &str = "  ";

// =============================================================================
// Columns
// =============================================================================

/// Table layout for an entity kind.
pub trait Columns: Entity {
    /// Column headers, after the selection marker.
    const HEADERS: &'static [&'static str];

    /// One cell per header.
    fn cells(&self, directory: &UserDirectory) -> Vec<String>;
}

impl Columns for User {
    const HEADERS: &'static [&'static str] = &["ID", "Name", "Username", "Email"];

    fn cells(&self, _directory: &UserDirectory) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            format!("@{}", self.username),
            self.email.clone(),
        ]
    }
}

impl Columns for Post {
    const HEADERS: &'static [&'static str] = &["ID", "Title", "Author"];

    fn cells(&self, directory: &UserDirectory) -> Vec<String> {
        vec![
            self.id.to_string(),
            preview(&self.title, TITLE_PREVIEW_CHARS_MAX),
            directory.author_label(self.user_id).into_owned(),
        ]
    }
}

/// Cut `text` to `max_chars` characters, marking the cut with `...`.
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

// =============================================================================
// Rendering
// =============================================================================

/// Render banners, the visible page and the pagination summary.
pub fn render_list<E: Columns, A: RecordApi<E>>(controller: &ListController<E, A>) -> String {
    let mut out = String::new();

    if let Some(error) = controller.fetch_error() {
        let _ = writeln!(out, "Error: {error}");
    }
    if let Some(error) = controller.error() {
        let _ = writeln!(out, "Error: {error}");
    }
    if let Some(notice) = controller.notice() {
        let _ = writeln!(out, "{}", notice.message);
    }

    if !controller.has_data() {
        if controller.is_loading() {
            let _ = writeln!(out, "Loading {}...", E::COLLECTION);
        }
        return out;
    }

    let items = controller.page_items();
    if items.is_empty() {
        if controller.search().is_empty() {
            let _ = writeln!(out, "No {} yet.", E::COLLECTION);
        } else {
            let _ = writeln!(
                out,
                "No {} match \"{}\".",
                E::COLLECTION,
                controller.search()
            );
        }
        return out;
    }

    let directory = controller.directory();
    let rows: Vec<(bool, Vec<String>)> = items
        .iter()
        .map(|record| (controller.is_selected(record.id()), record.cells(directory)))
        .collect();
    out.push_str(&table(E::HEADERS, &rows));

    let _ = writeln!(
        out,
        "{} (page {} of {})",
        controller.page_range(),
        controller.page(),
        controller.total_pages()
    );
    if !controller.selection().is_empty() {
        let _ = writeln!(out, "{} selected", controller.selection().len());
    }
    out
}

/// Left-aligned table with a `[x]` selection column.
fn table(headers: &[&str], rows: &[(bool, Vec<String>)]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for (_, cells) in rows {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    push_row(&mut out, "   ", &header_cells, &widths);
    for (selected, cells) in rows {
        let marker = if *selected { "[x]" } else { "[ ]" };
        push_row(&mut out, marker, cells, &widths);
    }
    out
}

fn push_row(out: &mut String, marker: &str, cells: &[String], widths: &[usize]) {
    let mut line = String::from(marker);
    for (cell, width) in cells.iter().zip(widths) {
        line.push_str(COLUMN_GAP);
        let _ = write!(line, "{cell:<width$}");
    }
    out.push_str(line.trim_end());
    out.push('\n');
}

// =============================================================================
// Tests
// =============================================================================
