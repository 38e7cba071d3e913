//! Shared test utilities for the edition-gallery test suite.
//!
//! Provides record builders, magic-byte fixtures for upload sniffing, and a
//! recording [`MockStore`] that behaves like the REST store closely enough
//! for the reconciler and the edit session: ids are assigned in sequence, the
//! first image a book gets is flagged primary, and deleting the primary
//! promotes the next one in listing order.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let store = MockStore::with_images(vec![image("a", "b-1", true)])
//!     .fail_on(FailOn::Upload("broken.jpg".into()));
//! // ... drive a reconciler against &store ...
//! assert_eq!(store.get_operations().len(), 1);
//! ```

use async_trait::async_trait;
use std::sync::Mutex;

use crate::store::{CatalogStore, StoreError, UploadFile};
use crate::types::{Book, BookId, BookInput, Image, ImageId};

// =========================================================================
// Record builders
// =========================================================================

/// A book with only the required fields set.
pub fn book(id: &str, title: &str) -> Book {
    Book {
        id: BookId::new(id),
        title: title.to_string(),
        author: "Jane Austen".to_string(),
        year_published: None,
        edition: None,
        publisher: None,
        condition: None,
        description: None,
        acquisition_date: None,
        acquisition_notes: None,
        acquisition_price: None,
        created_at: None,
        cover_image_url: None,
    }
}

pub fn image(id: &str, book_id: &str, is_primary: bool) -> Image {
    Image {
        id: ImageId::new(id),
        book_id: BookId::new(book_id),
        url: format!("https://cdn.test/{id}.jpg"),
        caption: None,
        is_primary,
        position: None,
    }
}

/// Image ids in sequence order.
pub fn image_ids(images: &[Image]) -> Vec<&str> {
    images.iter().map(|i| i.id.as_str()).collect()
}

/// Ids of every image flagged primary.
pub fn primary_ids(images: &[Image]) -> Vec<&str> {
    images
        .iter()
        .filter(|i| i.is_primary)
        .map(|i| i.id.as_str())
        .collect()
}

// =========================================================================
// Upload fixtures: just enough magic bytes for format sniffing
// =========================================================================

pub const JPEG_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];
pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];
pub const GIF_BYTES: &[u8] = b"GIF89a\x01\x00\x01\x00";
pub const WEBP_BYTES: &[u8] = b"RIFF\x24\x00\x00\x00WEBPVP8 ";

pub fn jpeg(file_name: &str) -> UploadFile {
    UploadFile::new(file_name, JPEG_BYTES.to_vec())
}

// =========================================================================
// Recording mock store
// =========================================================================

/// Calls the mock can be scripted to fail with a 500.
#[derive(Debug, Clone, PartialEq)]
pub enum FailOn {
    ListBooks,
    ListImages,
    /// Upload of the file with this name.
    Upload(String),
    SetPrimary,
    DeleteImage,
    CreateBook,
    UpdateBook,
    DeleteBook,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecordedOp {
    ListBooks,
    GetBook(String),
    CreateBook(String),
    UpdateBook(String),
    DeleteBook(String),
    ListImages(String),
    Upload { book: String, file: String },
    SetPrimary { book: String, image: String },
    DeleteImage { book: String, image: String },
}

/// In-memory store that records every call.
/// Uses Mutex (not RefCell) so it is Sync, as the store trait requires.
#[derive(Default)]
pub struct MockStore {
    pub books: Mutex<Vec<Book>>,
    pub images: Mutex<Vec<Image>>,
    pub operations: Mutex<Vec<RecordedOp>>,
    failures: Mutex<Vec<FailOn>>,
    next_id: Mutex<u32>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_books(books: Vec<Book>) -> Self {
        let store = Self::default();
        *store.books.lock().unwrap() = books;
        store
    }

    /// Seed existing images; positions follow the given order.
    pub fn with_images(images: Vec<Image>) -> Self {
        let store = Self::default();
        *store.images.lock().unwrap() = images
            .into_iter()
            .enumerate()
            .map(|(i, mut img)| {
                img.position = Some(i as i32);
                img
            })
            .collect();
        store
    }

    pub fn fail_on(self, failure: FailOn) -> Self {
        self.failures.lock().unwrap().push(failure);
        self
    }

    pub fn get_operations(&self) -> Vec<RecordedOp> {
        self.operations.lock().unwrap().clone()
    }

    /// Stored images of a book in the store's listing order.
    pub fn stored_images(&self, book_id: &str) -> Vec<Image> {
        let mut images: Vec<Image> = self
            .images
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.book_id.as_str() == book_id)
            .cloned()
            .collect();
        images.sort_by_key(|i| (!i.is_primary, i.position));
        images
    }

    fn record(&self, op: RecordedOp) {
        self.operations.lock().unwrap().push(op);
    }

    fn check(&self, failure: FailOn) -> Result<(), StoreError> {
        if self.failures.lock().unwrap().contains(&failure) {
            return Err(StoreError::Api {
                status: 500,
                message: format!("scripted failure: {failure:?}"),
            });
        }
        Ok(())
    }

    fn next_id(&self, prefix: &str) -> String {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        format!("{prefix}-{next}")
    }

    fn not_found(what: &str) -> StoreError {
        StoreError::Api {
            status: 404,
            message: format!("{what} not found"),
        }
    }
}

fn apply_input(book: &mut Book, input: &BookInput) {
    book.title = input.title.clone();
    book.author = input.author.clone();
    book.year_published = input.year_published;
    book.edition = input.edition.clone();
    book.publisher = input.publisher.clone();
    book.condition = input.condition;
    book.description = input.description.clone();
    book.acquisition_date = input.acquisition_date;
    book.acquisition_notes = input.acquisition_notes.clone();
    book.acquisition_price = input.acquisition_price;
}

#[async_trait]
impl CatalogStore for MockStore {
    async fn list_books(&self) -> Result<Vec<Book>, StoreError> {
        self.record(RecordedOp::ListBooks);
        self.check(FailOn::ListBooks)?;
        Ok(self.books.lock().unwrap().clone())
    }

    async fn get_book(&self, book_id: &BookId) -> Result<Book, StoreError> {
        self.record(RecordedOp::GetBook(book_id.to_string()));
        self.books
            .lock()
            .unwrap()
            .iter()
            .find(|b| &b.id == book_id)
            .cloned()
            .ok_or_else(|| Self::not_found("Book"))
    }

    async fn create_book(&self, input: &BookInput) -> Result<Book, StoreError> {
        self.record(RecordedOp::CreateBook(input.title.clone()));
        self.check(FailOn::CreateBook)?;
        let mut created = book(&self.next_id("book"), &input.title);
        apply_input(&mut created, input);
        self.books.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update_book(&self, book_id: &BookId, input: &BookInput) -> Result<Book, StoreError> {
        self.record(RecordedOp::UpdateBook(book_id.to_string()));
        self.check(FailOn::UpdateBook)?;
        let mut books = self.books.lock().unwrap();
        let existing = books
            .iter_mut()
            .find(|b| &b.id == book_id)
            .ok_or_else(|| Self::not_found("Book"))?;
        apply_input(existing, input);
        Ok(existing.clone())
    }

    async fn delete_book(&self, book_id: &BookId) -> Result<(), StoreError> {
        self.record(RecordedOp::DeleteBook(book_id.to_string()));
        self.check(FailOn::DeleteBook)?;
        self.books.lock().unwrap().retain(|b| &b.id != book_id);
        self.images.lock().unwrap().retain(|i| &i.book_id != book_id);
        Ok(())
    }

    async fn list_images(&self, book_id: &BookId) -> Result<Vec<Image>, StoreError> {
        self.record(RecordedOp::ListImages(book_id.to_string()));
        self.check(FailOn::ListImages)?;
        Ok(self.stored_images(book_id.as_str()))
    }

    async fn upload_image(&self, book_id: &BookId, file: &UploadFile) -> Result<Image, StoreError> {
        self.record(RecordedOp::Upload {
            book: book_id.to_string(),
            file: file.file_name.clone(),
        });
        self.check(FailOn::Upload(file.file_name.clone()))?;
        let id = self.next_id("img");
        let mut images = self.images.lock().unwrap();
        let existing = images.iter().filter(|i| &i.book_id == book_id).count();
        let uploaded = Image {
            id: ImageId::new(id),
            book_id: book_id.clone(),
            url: format!("https://cdn.test/{}", file.file_name),
            caption: file.caption.clone(),
            is_primary: existing == 0,
            position: Some(existing as i32),
        };
        images.push(uploaded.clone());
        Ok(uploaded)
    }

    async fn set_primary_image(
        &self,
        book_id: &BookId,
        image_id: &ImageId,
    ) -> Result<Image, StoreError> {
        self.record(RecordedOp::SetPrimary {
            book: book_id.to_string(),
            image: image_id.to_string(),
        });
        self.check(FailOn::SetPrimary)?;
        let mut images = self.images.lock().unwrap();
        if !images.iter().any(|i| &i.id == image_id) {
            return Err(Self::not_found("Image"));
        }
        let mut target = None;
        for img in images.iter_mut().filter(|i| &i.book_id == book_id) {
            img.is_primary = &img.id == image_id;
            if img.is_primary {
                target = Some(img.clone());
            }
        }
        target.ok_or_else(|| Self::not_found("Image"))
    }

    async fn delete_image(&self, book_id: &BookId, image_id: &ImageId) -> Result<(), StoreError> {
        self.record(RecordedOp::DeleteImage {
            book: book_id.to_string(),
            image: image_id.to_string(),
        });
        self.check(FailOn::DeleteImage)?;
        let was_primary = {
            let mut images = self.images.lock().unwrap();
            let index = images
                .iter()
                .position(|i| &i.id == image_id)
                .ok_or_else(|| Self::not_found("Image"))?;
            images.remove(index).is_primary
        };
        if was_primary {
            if let Some(next) = self.stored_images(book_id.as_str()).first() {
                let mut images = self.images.lock().unwrap();
                if let Some(img) = images.iter_mut().find(|i| i.id == next.id) {
                    img.is_primary = true;
                }
            }
        }
        Ok(())
    }
}
