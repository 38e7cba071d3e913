//! Records exchanged with the REST store.
//!
//! These types mirror the store's JSON exactly: they are decoded from every
//! read endpoint and (for [`BookInput`]) encoded as the body of create and
//! update requests. Fields the store adds that we do not model (such as the
//! `images` array on `GET /books/{id}`) are ignored on decode.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque book identity assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(String);

impl BookId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque image identity assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(String);

impl ImageId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Physical condition of a copy, in the store's vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    Mint,
    #[serde(rename = "Very Good")]
    VeryGood,
    Good,
    Fair,
    Poor,
}

impl Condition {
    pub const ALL: [Condition; 5] = [
        Condition::Mint,
        Condition::VeryGood,
        Condition::Good,
        Condition::Fair,
        Condition::Poor,
    ];

    /// Label as stored and displayed ("Very Good", not "VeryGood").
    pub fn label(self) -> &'static str {
        match self {
            Condition::Mint => "Mint",
            Condition::VeryGood => "Very Good",
            Condition::Good => "Good",
            Condition::Fair => "Fair",
            Condition::Poor => "Poor",
        }
    }

    /// Badge colours as `(background, text)`.
    pub fn palette(self) -> (&'static str, &'static str) {
        match self {
            Condition::Mint => ("#e8f5e9", "#2e7d32"),
            Condition::VeryGood => ("#e3f2fd", "#1565c0"),
            Condition::Good => ("#fff8e1", "#f57f17"),
            Condition::Fair => ("#fff3e0", "#e65100"),
            Condition::Poor => ("#fce4ec", "#b71c1c"),
        }
    }

    /// Parse a user-typed label. Case, dashes and underscores are forgiven:
    /// `"very good"`, `"Very-Good"` and `"very_good"` all match.
    pub fn parse_label(input: &str) -> Option<Condition> {
        let normalized: String = input
            .trim()
            .chars()
            .map(|c| if c == '-' || c == '_' { ' ' } else { c })
            .collect::<String>()
            .to_ascii_lowercase();
        Condition::ALL
            .into_iter()
            .find(|c| c.label().to_ascii_lowercase() == normalized)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A book edition as returned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub year_published: Option<i32>,
    #[serde(default)]
    pub edition: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub condition: Option<Condition>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub acquisition_date: Option<NaiveDate>,
    #[serde(default)]
    pub acquisition_notes: Option<String>,
    #[serde(default)]
    pub acquisition_price: Option<f64>,
    /// Assigned by the store on insert.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Derived by the store from the primary image; never sent back.
    #[serde(default)]
    pub cover_image_url: Option<String>,
}

impl Book {
    /// The editable part of this record, for a full-replacement update.
    pub fn to_input(&self) -> BookInput {
        BookInput {
            title: self.title.clone(),
            author: self.author.clone(),
            year_published: self.year_published,
            edition: self.edition.clone(),
            publisher: self.publisher.clone(),
            condition: self.condition,
            description: self.description.clone(),
            acquisition_date: self.acquisition_date,
            acquisition_notes: self.acquisition_notes.clone(),
            acquisition_price: self.acquisition_price,
        }
    }
}

/// Body of `POST /books` and `PUT /books/{id}`.
///
/// Absent optional fields serialize as `null` so an update replaces the
/// whole record instead of patching it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookInput {
    pub title: String,
    pub author: String,
    pub year_published: Option<i32>,
    pub edition: Option<String>,
    pub publisher: Option<String>,
    pub condition: Option<Condition>,
    pub description: Option<String>,
    pub acquisition_date: Option<NaiveDate>,
    pub acquisition_notes: Option<String>,
    pub acquisition_price: Option<f64>,
}

/// An image attached to a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub id: ImageId,
    pub book_id: BookId,
    pub url: String,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
    /// Upload order as recorded by the store.
    #[serde(default)]
    pub position: Option<i32>,
}
