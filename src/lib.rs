//! # Edition Gallery
//!
//! Catalog client and static gallery renderer for a collection of book
//! editions. The catalog lives in a REST store; this crate lists and edits
//! books, manages each book's images, and renders the public gallery as
//! static HTML.
//!
//! # Architecture
//!
//! ```text
//! CLI (main.rs) ──▶ EditSession ──▶ ImageSetReconciler ──▶ CatalogStore
//!       │                                                  ▲
//!       ├──▶ sort ──▶ present / render                     │
//!       └──▶ auth ──▶ Session ─────────────────────▶ HttpStore (reqwest)
//! ```
//!
//! The store is behind the [`store::CatalogStore`] trait: the binary talks to
//! it over HTTP, tests talk to an in-memory recording mock. Everything above
//! the trait is ordinary synchronous logic with `await` points only at store
//! calls, driven by a single-threaded runtime.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | Records exchanged with the store (`Book`, `Image`, `BookInput`, `Condition`) |
//! | [`sort`] | Sort keys, directions, the selector, and the nulls-last book ordering |
//! | [`store`] | The `CatalogStore` trait, `StoreError`, and `UploadFile` |
//! | [`client`] | `HttpStore`: the trait over reqwest, bearer auth, multipart uploads |
//! | [`auth`] | `Session` and password sign-in against a GoTrue-compatible service |
//! | [`reconcile`] | One book's in-memory image set: uploads, primary selection, removal |
//! | [`form`] | Raw admin form and its normalisation into a `BookInput` |
//! | [`session`] | One editing session: form, save, and the book's image set |
//! | [`viewer`] | Carousel state for the detail view |
//! | [`uploads`] | Turning file and directory arguments into upload files |
//! | [`config`] | `gallery.toml` loading, validation, merging, env overrides, CSS |
//! | [`present`] | CLI output formatting |
//! | [`render`] | Static HTML site generation using Maud |
//!
//! # Design Decisions
//!
//! ## Confirm, Then Project
//!
//! Image mutations are never applied optimistically. The reconciler sends
//! the request, and only when the store confirms does it replace its local
//! sequence with a pure projection of the old one. A refused request leaves
//! the sequence exactly as it was, so a failure can never break the
//! one-primary rule.
//!
//! ## Nulls Last, Both Ways
//!
//! Every sort key is optional on a book. Books without a value sort after
//! all books with one regardless of direction; reversing the direction only
//! reverses the books that have a value.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/): templates are
//! type-checked Rust, interpolation is escaped by default, and there is no
//! template directory to ship.

pub mod auth;
pub mod client;
pub mod config;
pub mod form;
pub mod present;
pub mod reconcile;
pub mod render;
pub mod session;
pub mod sort;
pub mod store;
pub mod types;
pub mod uploads;
pub mod viewer;

#[cfg(test)]
pub(crate) mod test_helpers;
