//! The admin book form: raw text in, [`BookInput`] out.
//!
//! Every field is held as the string the admin typed. [`BookForm::normalize`]
//! applies the catalog's rules in one place:
//!
//! | Field | Blank | Otherwise |
//! |---|---|---|
//! | title | error | trimmed text |
//! | author | default author | trimmed text |
//! | year | `null` | integer |
//! | condition | `null` | one of the five labels, case-insensitive |
//! | acquisition date | `null` | `YYYY-MM-DD` |
//! | price | `null` | decimal ≥ 0 |
//! | everything else | `null` | trimmed text |

use chrono::NaiveDate;
use thiserror::Error;

use crate::types::{Book, BookInput, Condition};

#[derive(Error, Debug, PartialEq)]
pub enum FormError {
    #[error("title is required")]
    MissingTitle,
    #[error("year must be a whole number, got '{0}'")]
    InvalidYear(String),
    #[error("unknown condition '{0}' (expected Mint, Very Good, Good, Fair or Poor)")]
    InvalidCondition(String),
    #[error("acquisition date must be YYYY-MM-DD, got '{0}'")]
    InvalidDate(String),
    #[error("price must be a non-negative number, got '{0}'")]
    InvalidPrice(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookForm {
    pub title: String,
    pub author: String,
    pub year_published: String,
    pub edition: String,
    pub publisher: String,
    pub condition: String,
    pub description: String,
    pub acquisition_date: String,
    pub acquisition_notes: String,
    pub acquisition_price: String,
}

fn blank_to_none(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_optional<T>(
    value: &str,
    parse: impl FnOnce(&str) -> Option<T>,
    err: impl FnOnce(String) -> FormError,
) -> Result<Option<T>, FormError> {
    match blank_to_none(value) {
        None => Ok(None),
        Some(text) => parse(&text).map(Some).ok_or_else(|| err(text)),
    }
}

impl BookForm {
    /// An empty form whose author is pre-filled.
    pub fn new(default_author: &str) -> Self {
        Self {
            author: default_author.to_string(),
            ..Self::default()
        }
    }

    /// A form pre-filled from an existing record.
    pub fn from_book(book: &Book) -> Self {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            year_published: book.year_published.map(|y| y.to_string()).unwrap_or_default(),
            edition: text(&book.edition),
            publisher: text(&book.publisher),
            condition: book.condition.map(|c| c.label().to_string()).unwrap_or_default(),
            description: text(&book.description),
            acquisition_date: book
                .acquisition_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            acquisition_notes: text(&book.acquisition_notes),
            acquisition_price: book
                .acquisition_price
                .map(|p| p.to_string())
                .unwrap_or_default(),
        }
    }

    /// Validate and convert. The first invalid field wins.
    pub fn normalize(&self, default_author: &str) -> Result<BookInput, FormError> {
        let title = blank_to_none(&self.title).ok_or(FormError::MissingTitle)?;
        let author = blank_to_none(&self.author).unwrap_or_else(|| default_author.to_string());
        let year_published = parse_optional(
            &self.year_published,
            |s| s.parse::<i32>().ok(),
            FormError::InvalidYear,
        )?;
        let condition = parse_optional(
            &self.condition,
            Condition::parse_label,
            FormError::InvalidCondition,
        )?;
        let acquisition_date = parse_optional(
            &self.acquisition_date,
            |s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok(),
            FormError::InvalidDate,
        )?;
        let acquisition_price = parse_optional(
            &self.acquisition_price,
            |s| s.parse::<f64>().ok().filter(|p| p.is_finite() && *p >= 0.0),
            FormError::InvalidPrice,
        )?;

        Ok(BookInput {
            title,
            author,
            year_published,
            edition: blank_to_none(&self.edition),
            publisher: blank_to_none(&self.publisher),
            condition,
            description: blank_to_none(&self.description),
            acquisition_date,
            acquisition_notes: blank_to_none(&self.acquisition_notes),
            acquisition_price,
        })
    }
}
