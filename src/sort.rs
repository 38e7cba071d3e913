//! Ordering of book lists for display.
//!
//! Three keys are sortable: publication year, acquisition date and the
//! store's creation timestamp. Every key is optional on a [`Book`], and a
//! missing value is not a sortable value: books without one always go to
//! the end of the list, in both directions. Flipping the direction only
//! reverses the books that have a value.
//!
//! ```text
//! years [1995, -, 1813, 2001]
//!   asc   → [1813, 1995, 2001, -]
//!   desc  → [2001, 1995, 1813, -]
//! ```
//!
//! The selector in the UI has a default direction per key (oldest year
//! first, most recent acquisition/addition first). [`SortSelection`] models
//! that: picking a key resets the direction, toggling flips it.

use crate::types::Book;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[value(name = "year_published", alias = "year")]
    YearPublished,
    #[value(name = "acquisition_date", alias = "acquired")]
    AcquisitionDate,
    #[value(name = "created_at", alias = "added")]
    CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortKey {
    pub const ALL: [SortKey; 3] = [
        SortKey::YearPublished,
        SortKey::AcquisitionDate,
        SortKey::CreatedAt,
    ];

    /// Direction applied when this key is first selected.
    pub fn default_direction(self) -> SortDirection {
        match self {
            SortKey::YearPublished => SortDirection::Asc,
            SortKey::AcquisitionDate | SortKey::CreatedAt => SortDirection::Desc,
        }
    }

    /// Field name on the wire and in config files.
    pub fn name(self) -> &'static str {
        match self {
            SortKey::YearPublished => "year_published",
            SortKey::AcquisitionDate => "acquisition_date",
            SortKey::CreatedAt => "created_at",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortKey::YearPublished => "Year published",
            SortKey::AcquisitionDate => "Date acquired",
            SortKey::CreatedAt => "Date added",
        }
    }
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortDirection::Asc => "ascending",
            SortDirection::Desc => "descending",
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::ALL
            .into_iter()
            .find(|key| key.name() == s)
            .ok_or_else(|| format!("unknown sort key: {s}"))
    }
}

/// The user's current choice of key and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSelection {
    key: SortKey,
    direction: SortDirection,
}

impl SortSelection {
    /// Select `key` with its default direction.
    pub fn new(key: SortKey) -> Self {
        Self {
            key,
            direction: key.default_direction(),
        }
    }

    /// Select `key` but keep an explicit direction.
    pub fn with_direction(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    pub fn key(&self) -> SortKey {
        self.key
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    /// Switch key. The direction resets to the new key's default, even when
    /// re-selecting the current key.
    pub fn select_key(&mut self, key: SortKey) {
        self.key = key;
        self.direction = key.default_direction();
    }

    pub fn toggle_direction(&mut self) {
        self.direction = self.direction.reversed();
    }

    pub fn apply(&self, books: &[Book]) -> Vec<Book> {
        sort_books(books, self.key, self.direction)
    }
}

impl Default for SortSelection {
    fn default() -> Self {
        Self::new(SortKey::YearPublished)
    }
}

/// Return a sorted copy of `books`. The input is left untouched.
///
/// The sort is stable, so books that compare equal (including two books
/// that both lack the key) keep their input order.
pub fn sort_books(books: &[Book], key: SortKey, direction: SortDirection) -> Vec<Book> {
    let mut sorted = books.to_vec();
    sorted.sort_by(|a, b| compare_books(a, b, key, direction));
    sorted
}

/// Comparator behind [`sort_books`].
pub fn compare_books(a: &Book, b: &Book, key: SortKey, direction: SortDirection) -> Ordering {
    match key {
        SortKey::YearPublished => nulls_last(a.year_published, b.year_published, direction),
        SortKey::AcquisitionDate => {
            nulls_last(a.acquisition_date, b.acquisition_date, direction)
        }
        SortKey::CreatedAt => nulls_last(a.created_at, b.created_at, direction),
    }
}

// Direction only reaches the (Some, Some) arm.
fn nulls_last<T: Ord>(a: Option<T>, b: Option<T>, direction: SortDirection) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => direction.apply(a.cmp(&b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
