//! The REST store as seen by the rest of the crate.
//!
//! [`CatalogStore`] lists every endpoint the catalog uses. The production
//! implementation is [`HttpStore`](crate::client::HttpStore); tests drive the
//! reconciler and the edit session through a recording mock instead, so the
//! ordering and primary-image rules can be checked without a network.
//!
//! | Operation | Endpoint |
//! |---|---|
//! | [`list_books`](CatalogStore::list_books) | `GET /books` |
//! | [`get_book`](CatalogStore::get_book) | `GET /books/{id}` |
//! | [`create_book`](CatalogStore::create_book) | `POST /books` |
//! | [`update_book`](CatalogStore::update_book) | `PUT /books/{id}` |
//! | [`delete_book`](CatalogStore::delete_book) | `DELETE /books/{id}` |
//! | [`list_images`](CatalogStore::list_images) | `GET /books/{id}/images` |
//! | [`upload_image`](CatalogStore::upload_image) | `POST /books/{id}/images` (multipart) |
//! | [`set_primary_image`](CatalogStore::set_primary_image) | `PUT /books/{id}/images/{image}/primary` |
//! | [`delete_image`](CatalogStore::delete_image) | `DELETE /books/{id}/images/{image}` |
//!
//! Every mutating call needs a bearer token; reads are public.

use crate::types::{Book, BookId, BookInput, Image, ImageId};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// The request never produced a response (connection, DNS, TLS, body decode).
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The store answered with a non-success status.
    #[error("store returned {status}: {message}")]
    Api { status: u16, message: String },
    /// A mutating call was attempted without a signed-in session.
    #[error("not signed in: an access token is required to modify the catalog")]
    MissingCredential,
    /// The upload body could not be assembled (bad content type).
    #[error("invalid upload: {0}")]
    InvalidUpload(String),
    /// The configured base URL cannot carry endpoint paths.
    #[error("invalid store base URL: {0}")]
    InvalidBaseUrl(String),
}

impl StoreError {
    /// HTTP status, if the store answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            StoreError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// One file to attach to a book, already read into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub caption: Option<String>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
            caption: None,
        }
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    /// MIME type sniffed from the file's magic bytes, restricted to the
    /// formats the store accepts. `None` means the store would reject it.
    pub fn content_type(&self) -> Option<&'static str> {
        match image::guess_format(&self.bytes).ok()? {
            image::ImageFormat::Jpeg => Some("image/jpeg"),
            image::ImageFormat::Png => Some("image/png"),
            image::ImageFormat::WebP => Some("image/webp"),
            image::ImageFormat::Gif => Some("image/gif"),
            _ => None,
        }
    }
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn list_books(&self) -> Result<Vec<Book>, StoreError>;

    async fn get_book(&self, book_id: &BookId) -> Result<Book, StoreError>;

    async fn create_book(&self, input: &BookInput) -> Result<Book, StoreError>;

    /// Full-record replacement.
    async fn update_book(&self, book_id: &BookId, input: &BookInput) -> Result<Book, StoreError>;

    async fn delete_book(&self, book_id: &BookId) -> Result<(), StoreError>;

    /// Images of a book, primary first, then upload order.
    async fn list_images(&self, book_id: &BookId) -> Result<Vec<Image>, StoreError>;

    /// Upload one file. The store decides `is_primary` (only the first image
    /// a book ever gets is flagged).
    async fn upload_image(&self, book_id: &BookId, file: &UploadFile) -> Result<Image, StoreError>;

    async fn set_primary_image(
        &self,
        book_id: &BookId,
        image_id: &ImageId,
    ) -> Result<Image, StoreError>;

    async fn delete_image(&self, book_id: &BookId, image_id: &ImageId) -> Result<(), StoreError>;
}
