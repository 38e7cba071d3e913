//! Gallery configuration.
//!
//! Handles loading, validating, and merging `gallery.toml`. Stock defaults
//! are the base layer; the user's file overrides any subset of them; the
//! environment (optionally seeded from `.env`) overrides the store address and
//! supplies credentials, which never live in the file.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [api]
//! base_url = "http://localhost:8000"
//!
//! [auth]
//! url = ""          # GoTrue base URL, e.g. https://<project>.supabase.co/auth/v1
//! anon_key = ""     # Public key sent as `apikey`
//! email = ""        # Admin e-mail for password sign-in
//!
//! [catalog]
//! default_author = "Jane Austen"
//! default_sort = "year_published"   # or acquisition_date, created_at
//!
//! [site]
//! title = "Pride & Prejudice"
//! subtitle = "by Jane Austen"
//! tagline = "A Curated Collection"
//! quote = "It is a truth universally acknowledged, ..."
//!
//! [colors]
//! background = "#faf6f0"
//! surface = "#fff9f0"
//! text = "#2d1a0e"
//! text_muted = "#9a7a5a"
//! accent = "#d4af37"
//! border = "#c9b99a"
//! header = "#1a0a00"
//! ```
//!
//! ## Environment
//!
//! | Variable | Effect |
//! |---|---|
//! | `GALLERY_API_BASE` | replaces `api.base_url` |
//! | `GALLERY_AUTH_EMAIL` | replaces `auth.email` |
//! | `GALLERY_ACCESS_TOKEN` | pre-issued bearer token |
//! | `GALLERY_AUTH_PASSWORD` | password for sign-in with `auth.email` |
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::sort::SortKey;

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "gallery.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Gallery configuration loaded from `gallery.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// The catalog REST store.
    pub api: ApiConfig,
    /// Password sign-in against the auth service.
    pub auth: AuthConfig,
    /// Catalog defaults for new books and listings.
    pub catalog: CatalogConfig,
    /// Text of the rendered site's header.
    pub site: SiteConfig,
    /// Colour scheme of the rendered site.
    pub colors: ColorScheme,
}

impl GalleryConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = self.api.base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "api.base_url must start with http:// or https://, got '{base}'"
            )));
        }
        if self.catalog.default_author.trim().is_empty() {
            return Err(ConfigError::Validation(
                "catalog.default_author must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
        }
    }
}

/// Auth service settings. Empty strings mean "not configured".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// GoTrue base URL, e.g. `https://<project>.supabase.co/auth/v1`.
    pub url: String,
    /// Public project key, sent as the `apikey` header.
    pub anon_key: String,
    /// Admin e-mail used for password sign-in.
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    /// Author filled in when the form leaves it blank.
    pub default_author: String,
    /// Initial sort key for listings and the rendered grid.
    pub default_sort: SortKey,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            default_author: "Jane Austen".to_string(),
            default_sort: SortKey::YearPublished,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    pub title: String,
    pub subtitle: String,
    /// Small caps line above the title.
    pub tagline: String,
    /// Epigraph under the title. Empty to omit.
    pub quote: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Pride & Prejudice".to_string(),
            subtitle: "by Jane Austen".to_string(),
            tagline: "A Curated Collection".to_string(),
            quote: "It is a truth universally acknowledged, that a single man in possession \
                    of a good fortune, must be in want of a wife..."
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    /// Page background.
    pub background: String,
    /// Card and panel background.
    pub surface: String,
    /// Primary text color.
    pub text: String,
    /// Muted/secondary text color (counts, captions, labels).
    pub text_muted: String,
    /// Gold accent for titles and dividers.
    pub accent: String,
    /// Border color.
    pub border: String,
    /// Hero header background.
    pub header: String,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            background: "#faf6f0".to_string(),
            surface: "#fff9f0".to_string(),
            text: "#2d1a0e".to_string(),
            text_muted: "#9a7a5a".to_string(),
            accent: "#d4af37".to_string(),
            border: "#c9b99a".to_string(),
            header: "#1a0a00".to_string(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(GalleryConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<GalleryConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: GalleryConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the gallery config.
///
/// With `Some(path)` the file must exist. With `None`, [`DEFAULT_CONFIG_FILE`]
/// in the working directory is used if present, stock defaults otherwise.
pub fn load_config(path: Option<&Path>) -> Result<GalleryConfig, ConfigError> {
    let overlay = match path {
        Some(explicit) => Some(
            load_raw_config(explicit)?
                .ok_or_else(|| ConfigError::NotFound(explicit.to_path_buf()))?,
        ),
        None => load_raw_config(Path::new(DEFAULT_CONFIG_FILE))?,
    };
    resolve_config(stock_defaults_value()?, overlay)
}

// =============================================================================
// Environment overrides
// =============================================================================

/// Values taken from the process environment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvOverrides {
    pub api_base: Option<String>,
    pub access_token: Option<String>,
    pub auth_email: Option<String>,
    pub auth_password: Option<String>,
}

impl EnvOverrides {
    /// Read the `GALLERY_*` variables. Empty values count as unset.
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            api_base: var("GALLERY_API_BASE"),
            access_token: var("GALLERY_ACCESS_TOKEN"),
            auth_email: var("GALLERY_AUTH_EMAIL"),
            auth_password: var("GALLERY_AUTH_PASSWORD"),
        }
    }

    /// Apply the non-secret overrides to `config` and re-validate.
    pub fn apply(&self, mut config: GalleryConfig) -> Result<GalleryConfig, ConfigError> {
        if let Some(base) = &self.api_base {
            config.api.base_url = base.clone();
        }
        if let Some(email) = &self.auth_email {
            config.auth.email = email.clone();
        }
        config.validate()?;
        Ok(config)
    }
}

/// Returns a fully-commented stock `gallery.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Edition Gallery Configuration
# =============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Unknown keys will cause an error.
#
# Credentials are never read from this file. Set them in the environment
# (or a .env file next to it):
#   GALLERY_ACCESS_TOKEN   pre-issued bearer token, or
#   GALLERY_AUTH_PASSWORD  password for [auth] email
# GALLERY_API_BASE and GALLERY_AUTH_EMAIL override the values below.

# ---------------------------------------------------------------------------
# Catalog store
# ---------------------------------------------------------------------------
[api]
# Root of the REST API serving /books.
base_url = "http://localhost:8000"

# ---------------------------------------------------------------------------
# Admin sign-in (GoTrue-compatible auth service)
# ---------------------------------------------------------------------------
[auth]
# Base URL of the auth service, e.g. "https://<project>.supabase.co/auth/v1".
url = ""

# Public project key, sent as the `apikey` header.
anon_key = ""

# Admin e-mail for password sign-in.
email = ""

# ---------------------------------------------------------------------------
# Catalog defaults
# ---------------------------------------------------------------------------
[catalog]
# Author used when the form leaves it blank.
default_author = "Jane Austen"

# Initial listing order: "year_published", "acquisition_date" or "created_at".
default_sort = "year_published"

# ---------------------------------------------------------------------------
# Rendered site header
# ---------------------------------------------------------------------------
[site]
title = "Pride & Prejudice"
subtitle = "by Jane Austen"
tagline = "A Curated Collection"
# Epigraph under the title. Set to "" to omit.
quote = "It is a truth universally acknowledged, that a single man in possession of a good fortune, must be in want of a wife..."

# ---------------------------------------------------------------------------
# Colors
# ---------------------------------------------------------------------------
[colors]
background = "#faf6f0"
surface = "#fff9f0"       # Cards and panels
text = "#2d1a0e"
text_muted = "#9a7a5a"    # Counts, captions, labels
accent = "#d4af37"        # Titles and dividers
border = "#c9b99a"
header = "#1a0a00"        # Hero background
"##
}

/// Generate CSS custom properties from the colour scheme.
pub fn generate_color_css(colors: &ColorScheme) -> String {
    format!(
        r#":root {{
    --color-bg: {background};
    --color-surface: {surface};
    --color-text: {text};
    --color-text-muted: {text_muted};
    --color-accent: {accent};
    --color-border: {border};
    --color-header: {header};
}}"#,
        background = colors.background,
        surface = colors.surface,
        text = colors.text,
        text_muted = colors.text_muted,
        accent = colors.accent,
        border = colors.border,
        header = colors.header,
    )
}
