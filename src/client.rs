//! HTTP implementation of [`CatalogStore`] using [`reqwest`].
//!
//! Reads are sent anonymously. Mutating calls attach
//! `Authorization: Bearer <token>` from the [`Session`]; without one they
//! fail with [`StoreError::MissingCredential`] before anything is sent.
//! Non-2xx responses carry the store's JSON `detail` when it has one.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::auth::Session;
use crate::store::{CatalogStore, StoreError, UploadFile};
use crate::types::{Book, BookId, BookInput, Image, ImageId};

/// HTTP client for one catalog store.
pub struct HttpStore {
    client: reqwest::Client,
    base_url: String,
    session: Option<Session>,
}

#[derive(Debug, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

impl HttpStore {
    /// * `base_url` - API root, e.g. `http://localhost:8000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Reuse an existing [`reqwest::Client`] (shared with sign-in).
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session: None,
        }
    }

    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    pub fn is_signed_in(&self) -> bool {
        self.session.is_some()
    }

    /// `GET /health`.
    pub async fn health(&self) -> Result<HealthStatus, StoreError> {
        let response = self.client.get(self.url(&["health"])?).send().await?;
        Self::parse_response(response).await
    }

    /// Endpoint URL under the base. Each segment is percent-encoded, so an
    /// id containing `/`, `?` or `#` stays one segment.
    fn url(&self, segments: &[&str]) -> Result<reqwest::Url, StoreError> {
        let invalid = || StoreError::InvalidBaseUrl(self.base_url.clone());
        let mut url = reqwest::Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|()| invalid())?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorized(
        &self,
        method: reqwest::Method,
        segments: &[&str],
    ) -> Result<reqwest::RequestBuilder, StoreError> {
        let session = self
            .session
            .as_ref()
            .ok_or(StoreError::MissingCredential)?;
        let url = self.url(segments)?;
        debug!(%method, path = url.path(), "store request");
        Ok(self
            .client
            .request(method, url)
            .bearer_auth(&session.access_token))
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, StoreError> {
        let url = self.url(segments)?;
        debug!(path = url.path(), "store request");
        let response = self.client.get(url).send().await?;
        Self::parse_response(response).await
    }

    // ---- private helpers ----

    /// Turn a non-2xx response into [`StoreError::Api`], preferring the
    /// `detail` field of a JSON error body over the raw text.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let raw = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        debug!(status = status.as_u16(), body = %raw, "store error response");
        Err(StoreError::Api {
            status: status.as_u16(),
            message: error_message(&raw),
        })
    }

    async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, StoreError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    async fn check_status(response: reqwest::Response) -> Result<(), StoreError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}

fn error_message(raw: &str) -> String {
    match serde_json::from_str::<ErrorBody>(raw) {
        Ok(ErrorBody {
            detail: serde_json::Value::String(detail),
        }) => detail,
        // Validation errors come back as a structured list.
        Ok(ErrorBody { detail }) => detail.to_string(),
        Err(_) => raw.to_string(),
    }
}

fn book_path(book_id: &BookId) -> [&str; 2] {
    ["books", book_id.as_str()]
}

fn images_path(book_id: &BookId) -> [&str; 3] {
    ["books", book_id.as_str(), "images"]
}

fn image_path<'a>(book_id: &'a BookId, image_id: &'a ImageId) -> [&'a str; 4] {
    ["books", book_id.as_str(), "images", image_id.as_str()]
}

#[async_trait]
impl CatalogStore for HttpStore {
    async fn list_books(&self) -> Result<Vec<Book>, StoreError> {
        self.get_json(&["books"]).await
    }

    async fn get_book(&self, book_id: &BookId) -> Result<Book, StoreError> {
        self.get_json(&book_path(book_id)).await
    }

    async fn create_book(&self, input: &BookInput) -> Result<Book, StoreError> {
        let response = self
            .authorized(reqwest::Method::POST, &["books"])?
            .json(input)
            .send()
            .await?;
        let book: Book = Self::parse_response(response).await?;
        info!(book_id = %book.id, title = %book.title, "book created");
        Ok(book)
    }

    async fn update_book(&self, book_id: &BookId, input: &BookInput) -> Result<Book, StoreError> {
        let response = self
            .authorized(reqwest::Method::PUT, &book_path(book_id))?
            .json(input)
            .send()
            .await?;
        let book = Self::parse_response(response).await?;
        info!(%book_id, "book updated");
        Ok(book)
    }

    async fn delete_book(&self, book_id: &BookId) -> Result<(), StoreError> {
        let response = self
            .authorized(reqwest::Method::DELETE, &book_path(book_id))?
            .send()
            .await?;
        Self::check_status(response).await?;
        info!(%book_id, "book deleted");
        Ok(())
    }

    async fn list_images(&self, book_id: &BookId) -> Result<Vec<Image>, StoreError> {
        self.get_json(&images_path(book_id)).await
    }

    async fn upload_image(&self, book_id: &BookId, file: &UploadFile) -> Result<Image, StoreError> {
        let content_type = file.content_type().unwrap_or("application/octet-stream");
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(content_type)
            .map_err(|e| StoreError::InvalidUpload(e.to_string()))?;
        let mut form = Form::new().part("file", part);
        if let Some(caption) = &file.caption {
            form = form.text("caption", caption.clone());
        }

        let response = self
            .authorized(reqwest::Method::POST, &images_path(book_id))?
            .multipart(form)
            .send()
            .await?;
        let image: Image = Self::parse_response(response).await?;
        info!(%book_id, image_id = %image.id, file = %file.file_name, "image uploaded");
        Ok(image)
    }

    async fn set_primary_image(
        &self,
        book_id: &BookId,
        image_id: &ImageId,
    ) -> Result<Image, StoreError> {
        let [books, book, images, image] = image_path(book_id, image_id);
        let path = [books, book, images, image, "primary"];
        let response = self.authorized(reqwest::Method::PUT, &path)?.send().await?;
        let image = Self::parse_response(response).await?;
        info!(%book_id, %image_id, "primary image set");
        Ok(image)
    }

    async fn delete_image(&self, book_id: &BookId, image_id: &ImageId) -> Result<(), StoreError> {
        let response = self
            .authorized(reqwest::Method::DELETE, &image_path(book_id, image_id))?
            .send()
            .await?;
        Self::check_status(response).await?;
        info!(%book_id, %image_id, "image deleted");
        Ok(())
    }
}
