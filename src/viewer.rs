//! Image carousel state for the book detail view.

use crate::types::{Book, Image};

/// Shown when a book has neither images nor a cover: a framed blank board.
pub const PLACEHOLDER_IMAGE: &str = "data:image/svg+xml,%3Csvg xmlns='http://www.w3.org/2000/svg' width='300' height='400' viewBox='0 0 300 400'%3E%3Crect width='300' height='400' fill='%232d1a0e'/%3E%3Crect x='20' y='20' width='260' height='360' fill='none' stroke='%238b6914' stroke-width='2'/%3E%3Ctext x='150' y='205' text-anchor='middle' fill='%23d4af37' font-family='serif' font-size='16' font-style='italic'%3ENo image%3C/text%3E%3C/svg%3E";

/// Cursor over a book's images. Starts at the primary image and wraps in
/// both directions.
#[derive(Debug, Clone)]
pub struct Carousel<'a> {
    images: &'a [Image],
    active: usize,
}

impl<'a> Carousel<'a> {
    pub fn new(images: &'a [Image]) -> Self {
        let active = images.iter().position(|i| i.is_primary).unwrap_or(0);
        Self { images, active }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active(&self) -> Option<&'a Image> {
        self.images.get(self.active)
    }

    pub fn select(&mut self, index: usize) {
        if index < self.images.len() {
            self.active = index;
        }
    }

    pub fn next(&mut self) {
        if !self.images.is_empty() {
            self.active = (self.active + 1) % self.images.len();
        }
    }

    pub fn prev(&mut self) {
        if !self.images.is_empty() {
            self.active = (self.active + self.images.len() - 1) % self.images.len();
        }
    }

    /// `"2 / 5"`, or an empty string with no images.
    pub fn counter(&self) -> String {
        if self.images.is_empty() {
            String::new()
        } else {
            format!("{} / {}", self.active + 1, self.images.len())
        }
    }

    /// Active image, else the book's cover, else the placeholder.
    pub fn display_url(&self, book: &'a Book) -> &'a str {
        self.active()
            .map(|i| i.url.as_str())
            .or(book.cover_image_url.as_deref())
            .unwrap_or(PLACEHOLDER_IMAGE)
    }
}
