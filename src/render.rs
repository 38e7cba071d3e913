//! Static HTML rendering of the collection.
//!
//! Takes the books (and each book's image set) fetched from the store and
//! writes a self-contained static site.
//!
//! ## Generated Pages
//!
//! - **Index page** (`/index.html`): hero header, edition count and the
//!   sorted grid of book cards
//! - **Book pages** (`/books/{id}.html`): image carousel, metadata rows, and
//!   the Markdown description and acquisition notes
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html
//! └── books/
//!     ├── 6f1c....html
//!     └── ...
//! ```
//!
//! Images are not copied: pages reference the store's URLs directly.
//!
//! ## CSS and JavaScript
//!
//! Static assets are embedded at compile time and inlined into each page:
//! - `static/style.css`: base styles (colors injected from config)
//! - `static/carousel.js`: prev/next, thumbnails and arrow keys on book pages
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Every interpolated value is escaped, and raw HTML inside Markdown fields
//! is rendered as text.

use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Event, Parser, html as md_html};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::config::{self, GalleryConfig, SiteConfig};
use crate::present::{edition_count, format_long_date, year_label};
use crate::sort::SortSelection;
use crate::types::{Book, BookId, Condition, Image};
use crate::viewer::{Carousel, PLACEHOLDER_IMAGE};

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// What [`generate_site`] wrote: `(title, path)` per book page, in grid order.
#[derive(Debug, Default)]
pub struct SiteReport {
    pub book_pages: Vec<(String, String)>,
}

const CSS_STATIC: &str = include_str!("../static/style.css");
const JS: &str = include_str!("../static/carousel.js");

/// Write `index.html` and one page per book into `output_dir`.
///
/// Books missing from `images` are rendered with an empty image set.
pub fn generate_site(
    config: &GalleryConfig,
    books: &[Book],
    images: &HashMap<BookId, Vec<Image>>,
    selection: &SortSelection,
    output_dir: &Path,
) -> Result<SiteReport, RenderError> {
    let color_css = config::generate_color_css(&config.colors);
    let css = format!("{}\n\n{}", color_css, CSS_STATIC);
    let sorted = selection.apply(books);

    let books_dir = output_dir.join("books");
    fs::create_dir_all(&books_dir)?;

    let index_html = render_index(&config.site, &sorted, images, &css);
    fs::write(output_dir.join("index.html"), index_html.into_string())?;
    debug!(books = sorted.len(), "wrote index.html");

    let mut report = SiteReport::default();
    for book in &sorted {
        let book_images = images.get(&book.id).map(Vec::as_slice).unwrap_or(&[]);
        let page = render_book_page(&config.site, book, book_images, &css);
        let relative = format!("books/{}", page_file_name(&book.id));
        fs::write(output_dir.join(&relative), page.into_string())?;
        debug!(book_id = %book.id, path = %relative, "wrote book page");
        report.book_pages.push((book.title.clone(), relative));
    }

    Ok(report)
}

/// File name for a book page. Characters outside `[A-Za-z0-9_-]` become `_`
/// so an id can never escape the `books/` directory.
pub fn page_file_name(id: &BookId) -> String {
    let safe: String = id
        .as_str()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{safe}.html")
}

/// Markdown to HTML with raw HTML demoted to text.
pub fn render_markdown(text: &str) -> String {
    let parser = Parser::new(text).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });
    let mut out = String::new();
    md_html::push_html(&mut out, parser);
    out
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(title: &str, css: &str, body_class: Option<&str>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(css)) }
            }
            body class=[body_class] {
                (content)
            }
        }
    }
}

fn condition_badge(condition: Condition) -> Markup {
    let (background, text) = condition.palette();
    let style = format!("background: {background}; color: {text};");
    html! {
        span.badge style=(style) { (condition.label()) }
    }
}

fn divider() -> Markup {
    html! { div.divider aria-hidden="true" { "✦ ✦ ✦" } }
}

fn hero(site: &SiteConfig) -> Markup {
    html! {
        header.hero {
            p.tagline { (site.tagline) }
            h1 { (site.title) }
            p.subtitle { (site.subtitle) }
            (divider())
            @if !site.quote.is_empty() {
                p.quote { "\u{201c}" (site.quote) "\u{201d}" }
            }
        }
    }
}

fn card_cover<'a>(book: &'a Book, images: &'a [Image]) -> &'a str {
    book.cover_image_url
        .as_deref()
        .or_else(|| images.iter().find(|i| i.is_primary).map(|i| i.url.as_str()))
        .unwrap_or(PLACEHOLDER_IMAGE)
}

fn book_card(book: &Book, images: &[Image]) -> Markup {
    let href = format!("books/{}", page_file_name(&book.id));
    html! {
        a.book-card href=(href) {
            div.cover {
                img src=(card_cover(book, images)) alt=(book.title) loading="lazy";
                @if book.edition.is_some() || book.publisher.is_some() {
                    div.overlay {
                        @if let Some(edition) = &book.edition {
                            span { (edition) }
                        }
                        @if let Some(publisher) = &book.publisher {
                            span { (publisher) }
                        }
                    }
                }
            }
            div.card-body {
                h3 { (book.title) }
                div.meta {
                    span.year { (year_label(book)) }
                    @if let Some(condition) = book.condition {
                        (condition_badge(condition))
                    }
                }
            }
        }
    }
}

/// Renders the collection grid
fn render_index(
    site: &SiteConfig,
    books: &[Book],
    images: &HashMap<BookId, Vec<Image>>,
    css: &str,
) -> Markup {
    let content = html! {
        (hero(site))
        main.collection {
            (divider())
            h2 {
                "The Collection"
                span.count { (edition_count(books.len())) }
            }
            @if books.is_empty() {
                div.empty {
                    p { "The shelves await their first volume." }
                    p.hint { "Sign in as admin to start adding books to the collection." }
                }
            } @else {
                div.book-grid {
                    @for book in books {
                        (book_card(book, images.get(&book.id).map(Vec::as_slice).unwrap_or(&[])))
                    }
                }
            }
            (divider())
        }
    };
    base_document(&site.title, css, Some("index"), content)
}

fn selected<'a>(carousel: &Carousel<'a>, index: usize) -> Carousel<'a> {
    let mut view = carousel.clone();
    view.select(index);
    view
}

/// The carousel as first shown, one thumbnail per image. Each thumbnail
/// carries the state the carousel takes when it is selected, and the
/// neighbours of the opening image are preloaded.
fn carousel(book: &Book, images: &[Image]) -> Markup {
    let carousel = Carousel::new(images);
    let caption = carousel.active().and_then(|i| i.caption.as_deref());
    let mut prev = carousel.clone();
    prev.prev();
    let mut next = carousel.clone();
    next.next();
    let mut neighbours = vec![next.display_url(book)];
    if prev.active_index() != next.active_index() {
        neighbours.push(prev.display_url(book));
    }
    html! {
        figure.carousel data-active=(carousel.active_index()) {
            img id="carousel-main" src=(carousel.display_url(book)) alt=(book.title);
            @if carousel.len() > 1 {
                @for url in &neighbours {
                    link rel="preload" as="image" href=(url);
                }
                button.carousel-prev type="button" aria-label="Previous image" { "‹" }
                button.carousel-next type="button" aria-label="Next image" { "›" }
                span.carousel-counter { (carousel.counter()) }
            }
            figcaption.carousel-caption { @if let Some(c) = caption { (c) } }
            @if carousel.len() > 1 {
                div.thumbnails {
                    @for (index, image) in images.iter().enumerate() {
                        @let view = selected(&carousel, index);
                        button.thumb.active[index == carousel.active_index()]
                            type="button"
                            data-index=(index)
                            data-src=(view.display_url(book))
                            data-counter=(view.counter())
                            data-caption=(image.caption.as_deref().unwrap_or("")) {
                            img src=(image.url) alt=(image.caption.as_deref().unwrap_or(&book.title)) loading="lazy";
                        }
                    }
                }
            }
        }
    }
}

fn meta_row(label: &str, value: Markup) -> Markup {
    html! {
        div.meta-row {
            dt { (label) }
            dd { (value) }
        }
    }
}

/// Renders one book's detail page
fn render_book_page(site: &SiteConfig, book: &Book, images: &[Image], css: &str) -> Markup {
    let page_title = format!("{} · {}", book.title, site.title);
    let content = html! {
        nav.back { a href="../index.html" { "← The Collection" } }
        main.book-page {
            (carousel(book, images))
            article.book-details {
                h1 { (book.title) }
                p.author { "by " (book.author) }
                dl.meta-rows {
                    @if let Some(year) = book.year_published {
                        (meta_row("Year Published", html! { (year) }))
                    }
                    @if let Some(edition) = &book.edition {
                        (meta_row("Edition", html! { (edition) }))
                    }
                    @if let Some(publisher) = &book.publisher {
                        (meta_row("Publisher", html! { (publisher) }))
                    }
                    @if let Some(condition) = book.condition {
                        (meta_row("Condition", condition_badge(condition)))
                    }
                    @if let Some(date) = book.acquisition_date {
                        (meta_row("Acquired", html! { (format_long_date(date)) }))
                    }
                }
                @if let Some(description) = &book.description {
                    section.prose {
                        h3 { "Description" }
                        (PreEscaped(render_markdown(description)))
                    }
                }
                @if let Some(notes) = &book.acquisition_notes {
                    section.prose {
                        h3 { "Acquisition Notes" }
                        (PreEscaped(render_markdown(notes)))
                    }
                }
            }
        }
        @if images.len() > 1 {
            script { (PreEscaped(JS)) }
        }
    };
    base_document(&page_title, css, Some("book"), content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::SortKey;
    use crate::test_helpers::{book, image};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn site() -> SiteConfig {
        SiteConfig::default()
    }

    #[test]
    fn base_document_includes_doctype() {
        let content = html! { p { "test" } };
        let doc = base_document("Test", "", None, content).into_string();
        assert!(doc.starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn page_file_name_is_path_safe() {
        assert_eq!(page_file_name(&BookId::new("6f1c-ab_9")), "6f1c-ab_9.html");
        assert_eq!(page_file_name(&BookId::new("../etc/passwd")), "___etc_passwd.html");
    }

    #[test]
    fn markdown_renders_emphasis() {
        let html = render_markdown("A *fine* copy");
        assert!(html.contains("<em>fine</em>"));
    }

    #[test]
    fn markdown_escapes_raw_html() {
        let html = render_markdown("<script>alert('x')</script>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn index_shows_count_and_empty_state() {
        let html = render_index(&site(), &[], &HashMap::new(), "").into_string();
        assert!(html.contains("0 Editions"));
        assert!(html.contains("The shelves await their first volume."));
    }

    #[test]
    fn index_singular_edition() {
        let books = vec![book("b-1", "Emma")];
        let html = render_index(&site(), &books, &HashMap::new(), "").into_string();
        assert!(html.contains("1 Edition<"));
        assert!(html.contains("href=\"books/b-1.html\""));
        assert!(html.contains("Year unknown"));
    }

    #[test]
    fn card_shows_condition_badge_and_overlay() {
        let b = Book {
            year_published: Some(1813),
            condition: Some(Condition::Mint),
            edition: Some("First Edition".into()),
            cover_image_url: Some("https://cdn.test/cover.jpg".into()),
            ..book("b-1", "Pride and Prejudice")
        };
        let html = book_card(&b, &[]).into_string();
        assert!(html.contains("background: #e8f5e9; color: #2e7d32;"));
        assert!(html.contains(">Mint<"));
        assert!(html.contains("First Edition"));
        assert!(html.contains("https://cdn.test/cover.jpg"));
        assert!(html.contains("1813"));
    }

    #[test]
    fn card_falls_back_to_primary_then_placeholder() {
        let b = book("b-1", "Emma");
        let images = vec![image("a", "b-1", false), image("b", "b-1", true)];
        assert!(book_card(&b, &images).into_string().contains(&images[1].url));
        assert!(book_card(&b, &[]).into_string().contains("data:image/svg+xml"));
    }

    #[test]
    fn book_page_escapes_text() {
        let b = Book {
            publisher: Some("<b>Egerton</b>".into()),
            ..book("b-1", "<script>alert('xss')</script>")
        };
        let html = render_book_page(&site(), &b, &[], "").into_string();
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("&lt;b&gt;Egerton"));
    }

    #[test]
    fn book_page_metadata_rows() {
        let b = Book {
            year_published: Some(1813),
            condition: Some(Condition::Fair),
            acquisition_date: NaiveDate::from_ymd_opt(2021, 3, 5),
            description: Some("Three volumes in **original** boards.".into()),
            ..book("b-1", "Pride and Prejudice")
        };
        let html = render_book_page(&site(), &b, &[], "").into_string();
        assert!(html.contains("Year Published"));
        assert!(html.contains("5 March 2021"));
        assert!(html.contains("<strong>original</strong>"));
        assert!(!html.contains("Acquisition Notes"));
        assert!(!html.contains("<dt>Edition"));
    }

    #[test]
    fn book_page_carousel_starts_at_primary() {
        let b = book("b-1", "Emma");
        let mut images = vec![
            image("a", "b-1", false),
            image("b", "b-1", true),
            image("c", "b-1", false),
        ];
        images[1].caption = Some("Title page".into());
        let html = render_book_page(&site(), &b, &images, "").into_string();
        assert!(html.contains("data-active=\"1\""));
        assert!(html.contains("2 / 3"));
        assert!(html.contains(&format!("id=\"carousel-main\" src=\"{}\"", images[1].url)));
        assert!(html.contains("Title page"));
    }

    #[test]
    fn thumbnails_carry_selected_state_and_neighbours_preload() {
        let b = book("b-1", "Emma");
        let images = vec![
            image("a", "b-1", true),
            image("b", "b-1", false),
            image("c", "b-1", false),
        ];
        let html = render_book_page(&site(), &b, &images, "").into_string();
        assert!(html.contains("data-counter=\"1 / 3\""));
        assert!(html.contains("data-counter=\"3 / 3\""));
        // Opening on the first image: next is "b", previous wraps to "c".
        assert!(html.contains(&format!("rel=\"preload\" as=\"image\" href=\"{}\"", images[1].url)));
        assert!(html.contains(&format!("rel=\"preload\" as=\"image\" href=\"{}\"", images[2].url)));
    }

    #[test]
    fn two_images_preload_the_other_once() {
        let images = vec![image("a", "b-1", true), image("b", "b-1", false)];
        let html = render_book_page(&site(), &book("b-1", "Emma"), &images, "").into_string();
        assert_eq!(html.matches("rel=\"preload\"").count(), 1);
    }

    #[test]
    fn single_image_has_no_controls() {
        let images = vec![image("a", "b-1", true)];
        let html = render_book_page(&site(), &book("b-1", "Emma"), &images, "").into_string();
        assert!(!html.contains("class=\"carousel-next\""));
        assert!(!html.contains("class=\"thumbnails\""));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn generate_site_writes_sorted_pages() {
        let tmp = TempDir::new().unwrap();
        let books = vec![
            Book {
                year_published: Some(1995),
                ..book("b-1", "Later")
            },
            book("b-2", "Undated"),
            Book {
                year_published: Some(1813),
                ..book("b-3", "First")
            },
        ];
        let mut images = HashMap::new();
        images.insert(BookId::new("b-3"), vec![image("a", "b-3", true)]);

        let report = generate_site(
            &GalleryConfig::default(),
            &books,
            &images,
            &SortSelection::new(SortKey::YearPublished),
            tmp.path(),
        )
        .unwrap();

        let titles: Vec<&str> = report.book_pages.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(titles, ["First", "Later", "Undated"]);
        let index = fs::read_to_string(tmp.path().join("index.html")).unwrap();
        assert!(index.contains("--color-bg: #faf6f0"));
        assert!(index.find("First").unwrap() < index.find("Later").unwrap());
        assert!(tmp.path().join("books/b-3.html").exists());
        assert!(tmp.path().join("books/b-2.html").exists());
    }
}
