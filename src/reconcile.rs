//! In-memory image set for one book under edit.
//!
//! The [`ImageSetReconciler`] owns the ordered sequence of [`Image`]s for a
//! single book and keeps it consistent with the store across three mutations:
//! batch upload, primary selection and removal. Every mutation follows the
//! same shape:
//!
//! ```text
//! request → store confirms → pure projection → replace local sequence
//!         → store refuses  → keep local sequence, return the error
//! ```
//!
//! Nothing is applied before the store confirms it. The projections
//! ([`merge_uploaded`], [`project_primary`], [`project_removal`]) are plain
//! functions over slices so the primary-image rules can be tested without a
//! store.
//!
//! ## Single-primary rule
//!
//! Whenever the sequence is non-empty and any image is primary, exactly one
//! is. Removing the primary promotes whatever is now first in local order.
//!
//! ## Progress
//!
//! Uploads run strictly one after another. After each file, successful or
//! not, the reconciler publishes an [`UploadEvent`] on the optional channel:
//!
//! ```text
//! Started { total: 3 }
//! FileUploaded { 1/3, cover.jpg }
//! FileFailed   { 2/3, spine.heic, unsupported format }
//! FileUploaded { 3/3, title-page.png }
//! Finished { uploaded: 2, failed: 1 }
//! ```

use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::store::{CatalogStore, StoreError, UploadFile};
use crate::types::{BookId, Image, ImageId};

#[derive(Error, Debug)]
pub enum UploadFailure {
    #[error("unsupported format (expected JPEG, PNG, WebP or GIF)")]
    UnsupportedFormat,
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("could not load images: {0}")]
    Fetch(#[source] StoreError),
    #[error("upload of {file} failed: {reason}")]
    Upload {
        file: String,
        #[source]
        reason: UploadFailure,
    },
    #[error("could not set primary image: {0}")]
    SetPrimary(#[source] StoreError),
    #[error("could not remove image: {0}")]
    Remove(#[source] StoreError),
    #[error("image {0} is not part of this book")]
    UnknownImage(ImageId),
}

/// Files finished out of files requested in the running batch.
/// `(0, 0)` means no batch is running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadProgress {
    pub done: usize,
    pub total: usize,
}

impl UploadProgress {
    pub const IDLE: UploadProgress = UploadProgress { done: 0, total: 0 };

    pub fn is_idle(&self) -> bool {
        *self == Self::IDLE
    }
}

/// Progress notifications published during [`ImageSetReconciler::upload_batch`].
#[derive(Debug, Clone, PartialEq)]
pub enum UploadEvent {
    Started {
        total: usize,
    },
    FileUploaded {
        progress: UploadProgress,
        file: String,
        image: Image,
    },
    FileFailed {
        progress: UploadProgress,
        file: String,
        reason: String,
    },
    Finished {
        uploaded: usize,
        failed: usize,
    },
}

/// Result of one batch: the images the store accepted, in upload order, and
/// one [`ReconcileError::Upload`] per file it did not.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub uploaded: Vec<Image>,
    pub errors: Vec<ReconcileError>,
}

impl BatchOutcome {
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

pub struct ImageSetReconciler<'s, S: CatalogStore + ?Sized> {
    store: &'s S,
    book_id: BookId,
    images: Vec<Image>,
    pending: UploadProgress,
}

impl<'s, S: CatalogStore + ?Sized> ImageSetReconciler<'s, S> {
    /// An empty set for `book_id`. Call [`load`](Self::load) to fill it.
    pub fn new(store: &'s S, book_id: BookId) -> Self {
        Self {
            store,
            book_id,
            images: Vec::new(),
            pending: UploadProgress::IDLE,
        }
    }

    /// A set for `book_id` filled from the store, or the load failure.
    ///
    /// Mutating callers start here: an empty set left behind by a failed
    /// [`load`](Self::load) would reject every image id as unknown.
    pub async fn loaded(store: &'s S, book_id: BookId) -> Result<Self, ReconcileError> {
        let mut set = Self::new(store, book_id);
        set.load().await?;
        Ok(set)
    }

    pub fn book_id(&self) -> &BookId {
        &self.book_id
    }

    pub fn images(&self) -> &[Image] {
        &self.images
    }

    pub fn primary(&self) -> Option<&Image> {
        self.images.iter().find(|i| i.is_primary)
    }

    pub fn progress(&self) -> UploadProgress {
        self.pending
    }

    pub fn into_images(self) -> Vec<Image> {
        self.images
    }

    /// Replace the local sequence with the store's current set.
    ///
    /// On failure the sequence is reset to empty and the error returned; the
    /// caller shows the empty set rather than a failure.
    pub async fn load(&mut self) -> Result<&[Image], ReconcileError> {
        match self.store.list_images(&self.book_id).await {
            Ok(images) => {
                debug!(book_id = %self.book_id, count = images.len(), "images loaded");
                self.images = images;
                Ok(&self.images)
            }
            Err(e) => {
                warn!(book_id = %self.book_id, error = %e, "could not load images");
                self.images.clear();
                Err(ReconcileError::Fetch(e))
            }
        }
    }

    /// Upload `files` one at a time and merge whatever the store accepted.
    ///
    /// A failing file is reported in the outcome and does not stop the batch.
    /// Files that are not JPEG, PNG, WebP or GIF fail without a request.
    pub async fn upload_batch(
        &mut self,
        files: Vec<UploadFile>,
        events: Option<Sender<UploadEvent>>,
    ) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        self.pending = UploadProgress {
            done: 0,
            total: files.len(),
        };
        emit(&events, UploadEvent::Started { total: files.len() });

        for file in files {
            let result = match file.content_type() {
                Some(_) => self
                    .store
                    .upload_image(&self.book_id, &file)
                    .await
                    .map_err(UploadFailure::from),
                None => Err(UploadFailure::UnsupportedFormat),
            };
            self.pending.done += 1;

            match result {
                Ok(image) => {
                    emit(
                        &events,
                        UploadEvent::FileUploaded {
                            progress: self.pending,
                            file: file.file_name.clone(),
                            image: image.clone(),
                        },
                    );
                    outcome.uploaded.push(image);
                }
                Err(reason) => {
                    warn!(book_id = %self.book_id, file = %file.file_name, error = %reason, "upload failed");
                    emit(
                        &events,
                        UploadEvent::FileFailed {
                            progress: self.pending,
                            file: file.file_name.clone(),
                            reason: reason.to_string(),
                        },
                    );
                    outcome.errors.push(ReconcileError::Upload {
                        file: file.file_name,
                        reason,
                    });
                }
            }
        }

        self.images = merge_uploaded(&self.images, &outcome.uploaded);
        self.pending = UploadProgress::IDLE;
        info!(
            book_id = %self.book_id,
            uploaded = outcome.uploaded.len(),
            failed = outcome.errors.len(),
            "upload batch finished"
        );
        emit(
            &events,
            UploadEvent::Finished {
                uploaded: outcome.uploaded.len(),
                failed: outcome.errors.len(),
            },
        );
        outcome
    }

    /// Make `image_id` the only primary image, once the store agrees.
    pub async fn set_primary(&mut self, image_id: &ImageId) -> Result<&[Image], ReconcileError> {
        self.ensure_known(image_id)?;
        self.store
            .set_primary_image(&self.book_id, image_id)
            .await
            .map_err(ReconcileError::SetPrimary)?;
        self.images = project_primary(&self.images, image_id);
        Ok(&self.images)
    }

    /// Delete `image_id`, once the store agrees.
    ///
    /// Removing the primary promotes the new first image locally. The store
    /// makes its own promotion and is not told about ours.
    pub async fn remove(&mut self, image_id: &ImageId) -> Result<&[Image], ReconcileError> {
        self.ensure_known(image_id)?;
        self.store
            .delete_image(&self.book_id, image_id)
            .await
            .map_err(ReconcileError::Remove)?;
        self.images = project_removal(&self.images, image_id);
        Ok(&self.images)
    }

    fn ensure_known(&self, image_id: &ImageId) -> Result<(), ReconcileError> {
        if self.images.iter().any(|i| &i.id == image_id) {
            Ok(())
        } else {
            Err(ReconcileError::UnknownImage(image_id.clone()))
        }
    }
}

fn emit(events: &Option<Sender<UploadEvent>>, event: UploadEvent) {
    if let Some(tx) = events {
        // A dropped receiver only means nobody is watching.
        tx.send(event).ok();
    }
}

/// Merge a batch into the existing sequence.
///
/// A first-ever batch that carries the store's primary replaces the (empty)
/// sequence. Otherwise the batch is appended; if the sequence already has a
/// primary, uploaded images are appended as non-primary.
pub fn merge_uploaded(existing: &[Image], uploaded: &[Image]) -> Vec<Image> {
    if existing.is_empty() && uploaded.iter().any(|i| i.is_primary) {
        return uploaded.to_vec();
    }
    let has_primary = existing.iter().any(|i| i.is_primary);
    existing
        .iter()
        .cloned()
        .chain(uploaded.iter().cloned().map(|mut img| {
            if has_primary {
                img.is_primary = false;
            }
            img
        }))
        .collect()
}

/// Flag exactly `image_id` as primary.
pub fn project_primary(images: &[Image], image_id: &ImageId) -> Vec<Image> {
    images
        .iter()
        .cloned()
        .map(|mut img| {
            img.is_primary = &img.id == image_id;
            img
        })
        .collect()
}

/// Drop `image_id`; if it was the primary, promote the new first image.
pub fn project_removal(images: &[Image], image_id: &ImageId) -> Vec<Image> {
    let removed_primary = images.iter().any(|i| &i.id == image_id && i.is_primary);
    let mut remaining: Vec<Image> = images
        .iter()
        .filter(|i| &i.id != image_id)
        .cloned()
        .collect();
    if removed_primary {
        for (index, img) in remaining.iter_mut().enumerate() {
            img.is_primary = index == 0;
        }
    }
    remaining
}
