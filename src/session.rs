//! One admin editing session for one book.
//!
//! A session bundles the form, the saved record (once there is one) and the
//! book's [`ImageSetReconciler`]. Image management needs a book id, so a
//! session opened for a new book has no reconciler until the first
//! successful save. Closing the session drops all of it; nothing outlives
//! the session.

use thiserror::Error;
use tracing::info;

use crate::form::{BookForm, FormError};
use crate::reconcile::ImageSetReconciler;
use crate::store::{CatalogStore, StoreError};
use crate::types::Book;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Form(#[from] FormError),
    #[error("could not save book: {0}")]
    Save(#[source] StoreError),
    #[error("save the book before adding images")]
    BookNotSaved,
}

pub struct EditSession<'s, S: CatalogStore + ?Sized> {
    store: &'s S,
    default_author: String,
    /// Raw field values; edit freely before [`save`](Self::save).
    pub form: BookForm,
    book: Option<Book>,
    images: Option<ImageSetReconciler<'s, S>>,
}

impl<'s, S: CatalogStore + ?Sized> EditSession<'s, S> {
    /// A blank form. Uploads are unavailable until the book is saved.
    pub fn open_new(store: &'s S, default_author: &str) -> Self {
        Self {
            store,
            default_author: default_author.to_string(),
            form: BookForm::new(default_author),
            book: None,
            images: None,
        }
    }

    /// A form pre-filled from `book`, with its images loaded.
    ///
    /// If the images cannot be fetched the session starts with an empty set
    /// (the reconciler logs the failure).
    pub async fn open_existing(store: &'s S, book: Book, default_author: &str) -> Self {
        let mut images = ImageSetReconciler::new(store, book.id.clone());
        images.load().await.ok();
        Self {
            store,
            default_author: default_author.to_string(),
            form: BookForm::from_book(&book),
            book: Some(book),
            images: Some(images),
        }
    }

    pub fn book(&self) -> Option<&Book> {
        self.book.as_ref()
    }

    pub fn is_new(&self) -> bool {
        self.book.is_none()
    }

    /// Create or fully replace the record from the form.
    ///
    /// Nothing is sent when the form is invalid, and a store failure leaves
    /// the session as it was.
    pub async fn save(&mut self) -> Result<&Book, SessionError> {
        let input = self.form.normalize(&self.default_author)?;
        let saved = match &self.book {
            None => self.store.create_book(&input).await,
            Some(existing) => self.store.update_book(&existing.id, &input).await,
        }
        .map_err(SessionError::Save)?;

        if self.images.is_none() {
            info!(book_id = %saved.id, "book saved; image uploads enabled");
            self.images = Some(ImageSetReconciler::new(self.store, saved.id.clone()));
        }
        self.form = BookForm::from_book(&saved);
        Ok(self.book.insert(saved))
    }

    pub fn images(&self) -> Result<&ImageSetReconciler<'s, S>, SessionError> {
        self.images.as_ref().ok_or(SessionError::BookNotSaved)
    }

    pub fn images_mut(&mut self) -> Result<&mut ImageSetReconciler<'s, S>, SessionError> {
        self.images.as_mut().ok_or(SessionError::BookNotSaved)
    }

    /// End the session, returning the last saved record.
    pub fn close(self) -> Option<Book> {
        self.book
    }
}
