use clap::{Args, Parser, Subcommand};
use edition_gallery::auth::{self, AuthError, Session};
use edition_gallery::client::HttpStore;
use edition_gallery::config::{self, EnvOverrides, GalleryConfig};
use edition_gallery::form::BookForm;
use edition_gallery::reconcile::ImageSetReconciler;
use edition_gallery::session::EditSession;
use edition_gallery::sort::{SortDirection, SortKey, SortSelection};
use edition_gallery::store::CatalogStore;
use edition_gallery::types::{BookId, ImageId};
use edition_gallery::{present, render, uploads};
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::warn;
use tracing_subscriber::EnvFilter;

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "edition-gallery")]
#[command(about = "Manage a catalog of book editions and render it as a static gallery")]
#[command(long_about = "\
Manage a catalog of book editions and render it as a static gallery

Reads are public. Commands that change the catalog need an admin session,
taken from the environment (or a .env file):

  GALLERY_ACCESS_TOKEN    a bearer token issued elsewhere, or
  GALLERY_AUTH_PASSWORD   password for [auth] email in gallery.toml

Image sets:
  The first image a book receives becomes its primary (cover) image.
  Removing the primary promotes the next image in the listing.
  Uploads run one file at a time; a failed file does not stop the rest.

Run 'edition-gallery gen-config' to generate a documented gallery.toml.")]
#[command(version)]
struct Cli {
    /// Config file [default: ./gallery.toml if present]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// REST store base URL (overrides config and GALLERY_API_BASE)
    #[arg(long, global = true)]
    api: Option<String>,

    /// Log every store request to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// Listing order flags.
#[derive(Args, Clone)]
struct SortArgs {
    /// Sort key [default: catalog.default_sort]
    #[arg(long, value_enum)]
    sort: Option<SortKey>,

    /// Sort direction [default: the key's own default]
    #[arg(long, value_enum)]
    direction: Option<SortDirection>,
}

impl SortArgs {
    fn selection(&self, config: &GalleryConfig) -> SortSelection {
        let key = self.sort.unwrap_or(config.catalog.default_sort);
        match self.direction {
            Some(direction) => SortSelection::with_direction(key, direction),
            None => SortSelection::new(key),
        }
    }
}

/// Book fields.
#[derive(Args, Clone, Default)]
struct BookFields {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    author: Option<String>,
    /// Year of publication
    #[arg(long)]
    year: Option<String>,
    #[arg(long)]
    edition: Option<String>,
    #[arg(long)]
    publisher: Option<String>,
    /// Mint, "Very Good", Good, Fair or Poor
    #[arg(long)]
    condition: Option<String>,
    /// Markdown
    #[arg(long)]
    description: Option<String>,
    /// Acquisition date, YYYY-MM-DD
    #[arg(long)]
    acquired: Option<String>,
    /// Acquisition notes (Markdown)
    #[arg(long)]
    notes: Option<String>,
    /// Acquisition price
    #[arg(long)]
    price: Option<String>,
}

impl BookFields {
    fn apply(self, form: &mut BookForm) {
        let fields = [
            (self.title, &mut form.title),
            (self.author, &mut form.author),
            (self.year, &mut form.year_published),
            (self.edition, &mut form.edition),
            (self.publisher, &mut form.publisher),
            (self.condition, &mut form.condition),
            (self.description, &mut form.description),
            (self.acquired, &mut form.acquisition_date),
            (self.notes, &mut form.acquisition_notes),
            (self.price, &mut form.acquisition_price),
        ];
        for (value, slot) in fields {
            if let Some(v) = value {
                *slot = v;
            }
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// List the collection
    Books {
        #[command(flatten)]
        sort: SortArgs,
        /// Print the records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one book and its images
    Show { book: String },
    /// Add a book
    Add(BookFields),
    /// Update a book (omitted flags keep their current value)
    Edit {
        book: String,
        #[command(flatten)]
        fields: BookFields,
    },
    /// Delete a book and its images
    Delete {
        book: String,
        /// Confirm deletion; there is no undo
        #[arg(long)]
        yes: bool,
    },
    /// List a book's images
    Images { book: String },
    /// Upload images to a book (files and/or directories)
    Upload {
        book: String,
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Caption for the nth file; repeat for more files
        #[arg(long)]
        caption: Vec<String>,
    },
    /// Make an image the book's primary image
    SetPrimary { book: String, image: String },
    /// Delete one image from a book
    RemoveImage { book: String, image: String },
    /// Render the collection as a static HTML site
    Render {
        /// Output directory
        #[arg(long, default_value = "dist")]
        output: PathBuf,
        #[command(flatten)]
        sort: SortArgs,
    },
    /// Print a stock gallery.toml with all options documented
    GenConfig,
    /// Check that the REST store is reachable
    Health,
}

impl Command {
    fn mutates(&self) -> bool {
        matches!(
            self,
            Command::Add(_)
                | Command::Edit { .. }
                | Command::Delete { .. }
                | Command::Upload { .. }
                | Command::SetPrimary { .. }
                | Command::RemoveImage { .. }
        )
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` wins; otherwise warnings only, or debug with `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "edition_gallery=debug"
    } else {
        "edition_gallery=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> CliResult {
    // No config or store needed.
    if matches!(cli.command, Command::GenConfig) {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let env = EnvOverrides::from_env();
    let mut config = env.apply(config::load_config(cli.config.as_deref())?)?;
    if let Some(api) = cli.api {
        config.api.base_url = api;
        config.validate()?;
    }

    let client = reqwest::Client::new();
    let store = connect(&config, &env, &client, cli.command.mutates()).await?;
    let default_author = config.catalog.default_author.clone();

    match cli.command {
        Command::Books { sort, json } => {
            let selection = sort.selection(&config);
            let books = selection.apply(&store.list_books().await?);
            if json {
                println!("{}", serde_json::to_string_pretty(&books)?);
            } else {
                present::print_book_list(&books, &selection);
            }
        }
        Command::Show { book } => {
            let book = store.get_book(&BookId::new(book)).await?;
            let mut images = ImageSetReconciler::new(&store, book.id.clone());
            images.load().await.ok();
            present::print_book_detail(&book, images.images());
        }
        Command::Add(fields) => {
            let mut session = EditSession::open_new(&store, &default_author);
            fields.apply(&mut session.form);
            let book = session.save().await?.clone();
            present::print_book_detail(&book, &[]);
        }
        Command::Edit { book, fields } => {
            let existing = store.get_book(&BookId::new(book)).await?;
            let mut session = EditSession::open_existing(&store, existing, &default_author).await;
            fields.apply(&mut session.form);
            let book = session.save().await?.clone();
            present::print_book_detail(&book, session.images()?.images());
        }
        Command::Delete { book, yes } => {
            if !yes {
                return Err(format!("refusing to delete {book} without --yes").into());
            }
            let id = BookId::new(book);
            store.delete_book(&id).await?;
            println!("Deleted {id}");
        }
        Command::Images { book } => {
            let mut images = ImageSetReconciler::new(&store, BookId::new(book));
            images.load().await.ok();
            present::print_image_set(images.images());
        }
        Command::Upload {
            book,
            paths,
            caption,
        } => {
            let files = uploads::read_uploads(&paths, &caption)?;
            let existing = store.get_book(&BookId::new(book)).await?;
            let mut images = ImageSetReconciler::loaded(&store, existing.id).await?;

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in present::format_upload_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let outcome = images.upload_batch(files, Some(tx)).await;
            printer.join().ok();

            present::print_batch_summary(&outcome);
            println!();
            present::print_image_set(images.images());
            if !outcome.is_complete() {
                return Err(format!("{} upload(s) failed", outcome.errors.len()).into());
            }
        }
        Command::SetPrimary { book, image } => {
            let mut images = ImageSetReconciler::loaded(&store, BookId::new(book)).await?;
            images.set_primary(&ImageId::new(image)).await?;
            present::print_image_set(images.images());
        }
        Command::RemoveImage { book, image } => {
            let mut images = ImageSetReconciler::loaded(&store, BookId::new(book)).await?;
            images.remove(&ImageId::new(image)).await?;
            present::print_image_set(images.images());
        }
        Command::Render { output, sort } => {
            let selection = sort.selection(&config);
            let books = store.list_books().await?;
            let mut image_sets = HashMap::new();
            for book in &books {
                let mut images = ImageSetReconciler::new(&store, book.id.clone());
                images.load().await.ok();
                image_sets.insert(book.id.clone(), images.into_images());
            }
            let report = render::generate_site(&config, &books, &image_sets, &selection, &output)?;
            present::print_render_output(&report);
            println!("Site generated at {}", output.display());
        }
        Command::Health => {
            let health = store.health().await?;
            println!("{}: {}", config.api.base_url, health.status);
        }
        Command::GenConfig => print!("{}", config::stock_config_toml()),
    }

    Ok(())
}

/// Build the store client, signing in only when the command needs it.
///
/// A pre-issued token is always attached; password sign-in happens only for
/// mutating commands.
async fn connect(
    config: &GalleryConfig,
    env: &EnvOverrides,
    client: &reqwest::Client,
    needs_session: bool,
) -> Result<HttpStore, AuthError> {
    let store = HttpStore::with_client(client.clone(), config.api.base_url.clone());
    if let Some(token) = &env.access_token {
        return Ok(store.with_session(Session::from_token(token.clone())));
    }
    if !needs_session {
        return Ok(store);
    }
    match &env.auth_password {
        Some(password) => {
            if config.auth.email.trim().is_empty() {
                return Err(AuthError::NotConfigured("auth.email is empty"));
            }
            let session =
                auth::sign_in_with_password(client, &config.auth, &config.auth.email, password)
                    .await?;
            Ok(store.with_session(session))
        }
        None => {
            warn!("no GALLERY_ACCESS_TOKEN or GALLERY_AUTH_PASSWORD set");
            Ok(store)
        }
    }
}
