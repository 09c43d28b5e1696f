//! Display-path / fetch-path normalization.
//!
//! A *display path* is the clean, extension-less address shown in the
//! location bar and stored in history (`/pricing`). A *fetch path* is the
//! concrete resource requested from the server (`/pricing.html`).
//!
//! Invariant: for every page path `p`,
//! `to_display_path(&to_fetch_path(p)) == to_display_path(p)`.

use spalite_types::config::NavConfig;

/// Normalizer bound to a page extension and index stem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathNormalizer {
    /// `.html`, with the dot.
    suffix: String,
    /// `/index`.
    index_display: String,
    /// `/index.html`.
    index_fetch: String,
}

impl Default for PathNormalizer {
    fn default() -> Self {
        Self::new("html", "index")
    }
}

impl PathNormalizer {
    pub fn new(page_extension: &str, index_stem: &str) -> Self {
        Self {
            suffix: format!(".{page_extension}"),
            index_display: format!("/{index_stem}"),
            index_fetch: format!("/{index_stem}.{page_extension}"),
        }
    }

    pub fn from_config(config: &NavConfig) -> Self {
        Self::new(&config.page_extension, &config.index_stem)
    }

    /// Strip trailing slashes and one page extension; map the index page
    /// to `/`.
    pub fn to_display_path(&self, path: &str) -> String {
        let trimmed = path.trim_end_matches('/');
        if trimmed.is_empty() {
            return "/".to_string();
        }

        let base = trimmed.strip_suffix(self.suffix.as_str()).unwrap_or(trimmed);
        if base.is_empty() || base == "/" || base == self.index_display {
            return "/".to_string();
        }
        base.to_string()
    }

    /// Map a path to the resource that serves it.
    pub fn to_fetch_path(&self, path: &str) -> String {
        let display = self.to_display_path(path);
        if display == "/" {
            return self.index_fetch.clone();
        }
        if has_file_extension(&display) {
            return display;
        }
        format!("{display}{}", self.suffix)
    }

    /// Whether `path` points at something other than a page (an image,
    /// a PDF...). Page paths with or without the page extension are not.
    pub fn is_non_page_resource(&self, path: &str) -> bool {
        let display = self.to_display_path(path);
        display != "/" && has_file_extension(&display)
    }
}

/// Normalize with the default `html` / `index` conventions.
pub fn to_display_path(path: &str) -> String {
    PathNormalizer::default().to_display_path(path)
}

/// Resolve with the default `html` / `index` conventions.
pub fn to_fetch_path(path: &str) -> String {
    PathNormalizer::default().to_fetch_path(path)
}

/// `true` when the path ends in `.` followed by one or more ASCII
/// alphanumerics.
pub fn has_file_extension(path: &str) -> bool {
    match path.rfind('.') {
        Some(dot) => {
            let ext = &path[dot + 1..];
            !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric())
        },
        None => false,
    }
}
