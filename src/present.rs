//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every entity leads with its positional index and title; ids, captions and
//! other context follow on indented lines. Ids are what the mutating
//! subcommands take, so they are always shown, just never first.
//!
//! # Output Format
//!
//! ## Books
//!
//! ```text
//! 3 Editions, by Year published (ascending)
//! 001 Pride and Prejudice · 1813 · Good
//!     Id: 6f1c...
//! 002 Pride and Prejudice · Year unknown
//!     Id: 9a0e...
//! ```
//!
//! ## Images
//!
//! ```text
//! 001 ★ cover.jpg
//!     Id: i-1
//!     Caption: First edition boards
//! 002   spine.jpg
//!     Id: i-2
//! ```
//!
//! ## Uploads
//!
//! ```text
//! Uploading 3 files
//!     [1/3] cover.jpg → i-7 (primary)
//!     [2/3] notes.txt failed: unsupported format
//!     [3/3] spine.jpg → i-8
//! Uploaded 2 of 3 files, 1 failed
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use chrono::NaiveDate;

use crate::reconcile::{BatchOutcome, UploadEvent};
use crate::render::SiteReport;
use crate::sort::SortSelection;
use crate::types::{Book, Image};

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max).collect();
        format!("{}...", head)
    }
}

/// `"1 Edition"` / `"3 Editions"`.
pub fn edition_count(n: usize) -> String {
    if n == 1 {
        "1 Edition".to_string()
    } else {
        format!("{n} Editions")
    }
}

/// Publication year, or `"Year unknown"`.
pub fn year_label(book: &Book) -> String {
    book.year_published
        .map(|y| y.to_string())
        .unwrap_or_else(|| "Year unknown".to_string())
}

/// `"5 March 2021"`.
pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%-d %B %Y").to_string()
}

/// Last path segment of an image URL, used as its display name.
fn url_file_name(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/').find(|s| !s.is_empty()).unwrap_or(url)
}

// ============================================================================
// Books
// ============================================================================

/// One line per book: index, title, year, condition.
pub fn format_book_list(books: &[Book], selection: &SortSelection) -> Vec<String> {
    let mut lines = vec![format!(
        "{}, by {} ({})",
        edition_count(books.len()),
        selection.key().label(),
        selection.direction().label()
    )];
    if books.is_empty() {
        lines.push("The shelves await their first volume.".to_string());
        return lines;
    }
    for (i, book) in books.iter().enumerate() {
        let mut line = format!("{} {} · {}", format_index(i + 1), book.title, year_label(book));
        if let Some(condition) = book.condition {
            line.push_str(&format!(" · {}", condition));
        }
        lines.push(line);
        lines.push(format!("    Id: {}", book.id));
    }
    lines
}

pub fn print_book_list(books: &[Book], selection: &SortSelection) {
    for line in format_book_list(books, selection) {
        println!("{}", line);
    }
}

/// Full record followed by its images.
pub fn format_book_detail(book: &Book, images: &[Image]) -> Vec<String> {
    let mut lines = vec![book.title.clone(), format!("by {}", book.author)];
    let mut row = |label: &str, value: Option<String>| {
        if let Some(v) = value {
            lines.push(format!("    {label}: {v}"));
        }
    };
    row("Id", Some(book.id.to_string()));
    row("Year Published", Some(year_label(book)));
    row("Edition", book.edition.clone());
    row("Publisher", book.publisher.clone());
    row("Condition", book.condition.map(|c| c.label().to_string()));
    row("Acquired", book.acquisition_date.map(format_long_date));
    row("Price", book.acquisition_price.map(|p| format!("{p:.2}")));
    row("Description", book.description.as_deref().map(|d| truncate_desc(d, 120)));
    row(
        "Acquisition Notes",
        book.acquisition_notes.as_deref().map(|n| truncate_desc(n, 120)),
    );
    lines.push(String::new());
    lines.extend(format_image_set(images));
    lines
}

pub fn print_book_detail(book: &Book, images: &[Image]) {
    for line in format_book_detail(book, images) {
        println!("{}", line);
    }
}

// ============================================================================
// Images
// ============================================================================

/// The image set in local order, primary marked with a star.
pub fn format_image_set(images: &[Image]) -> Vec<String> {
    if images.is_empty() {
        return vec!["No images yet".to_string()];
    }
    let mut lines = Vec::new();
    for (i, image) in images.iter().enumerate() {
        let marker = if image.is_primary { "★" } else { " " };
        lines.push(format!(
            "{} {} {}",
            format_index(i + 1),
            marker,
            url_file_name(&image.url)
        ));
        lines.push(format!("    Id: {}", image.id));
        if let Some(caption) = image.caption.as_deref().filter(|c| !c.is_empty()) {
            lines.push(format!("    Caption: {}", truncate_desc(caption, 60)));
        }
    }
    lines
}

pub fn print_image_set(images: &[Image]) {
    for line in format_image_set(images) {
        println!("{}", line);
    }
}

/// Format a single upload progress event as display lines.
pub fn format_upload_event(event: &UploadEvent) -> Vec<String> {
    match event {
        UploadEvent::Started { total } => {
            let noun = if *total == 1 { "file" } else { "files" };
            vec![format!("Uploading {total} {noun}")]
        }
        UploadEvent::FileUploaded {
            progress,
            file,
            image,
        } => {
            let primary = if image.is_primary { " (primary)" } else { "" };
            vec![format!(
                "    [{}/{}] {} \u{2192} {}{}",
                progress.done, progress.total, file, image.id, primary
            )]
        }
        UploadEvent::FileFailed {
            progress,
            file,
            reason,
        } => vec![format!(
            "    [{}/{}] {} failed: {}",
            progress.done, progress.total, file, reason
        )],
        // The summary line comes from the outcome.
        UploadEvent::Finished { .. } => Vec::new(),
    }
}

pub fn format_batch_summary(outcome: &BatchOutcome) -> Vec<String> {
    let uploaded = outcome.uploaded.len();
    let failed = outcome.errors.len();
    let mut line = format!("Uploaded {} of {} files", uploaded, uploaded + failed);
    if failed > 0 {
        line.push_str(&format!(", {failed} failed"));
    }
    vec![line]
}

pub fn print_batch_summary(outcome: &BatchOutcome) {
    for line in format_batch_summary(outcome) {
        println!("{}", line);
    }
}

// ============================================================================
// Render output
// ============================================================================

/// Generated pages, book pages in grid order.
pub fn format_render_output(report: &SiteReport) -> Vec<String> {
    let mut lines = vec!["Home \u{2192} index.html".to_string()];
    for (i, (title, path)) in report.book_pages.iter().enumerate() {
        lines.push(format!("{} {} \u{2192} {}", format_index(i + 1), title, path));
    }
    let noun = if report.book_pages.len() == 1 {
        "book page"
    } else {
        "book pages"
    };
    lines.push(format!(
        "Generated index and {} {}",
        report.book_pages.len(),
        noun
    ));
    lines
}

pub fn print_render_output(report: &SiteReport) {
    for line in format_render_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
