//! Error types for spalite.

use std::io;

/// Errors produced outside the navigation hot path (configuration, host
/// setup, file access).
#[derive(Debug, thiserror::Error)]
pub enum SpaError {
    #[error("config error: {0}")]
    Config(String),

    #[error("host error: {0}")]
    Host(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, SpaError>;

/// Why a page request did not produce a usable document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The server answered with a non-2xx status.
    #[error("HTTP {status}")]
    Http { status: u16 },

    /// The request never produced a response (connection, DNS, CORS...).
    #[error("transport error: {0}")]
    Transport(String),

    /// A response arrived but its body could not be read as text.
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Terminal failure of a single navigation.
///
/// Only [`NavigationFailure::Cancelled`] is silent; the other kinds are
/// recovered by a full native navigation to the requested address.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationFailure {
    /// A newer navigation aborted this one.
    #[error("navigation cancelled")]
    Cancelled,

    /// The page could not be fetched.
    #[error("fetch failed: {0}")]
    Transport(#[from] FetchError),

    /// The current or fetched document lacks the content region.
    #[error("structural mismatch: {0}")]
    StructuralMismatch(String),
}

impl NavigationFailure {
    /// Whether this failure must be recovered by a native page load.
    pub fn needs_fallback(&self) -> bool {
        !matches!(self, NavigationFailure::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let e = SpaError::Config("cache_capacity must be at least 1".into());
        assert_eq!(format!("{e}"), "config error: cache_capacity must be at least 1");
    }

    #[test]
    fn host_error_display() {
        let e = SpaError::Host("no window".into());
        assert_eq!(format!("{e}"), "host error: no window");
    }

    #[test]
    fn io_error_from_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let e: SpaError = io_err.into();
        let msg = format!("{e}");
        assert!(msg.contains("I/O error"));
        assert!(msg.contains("gone"));
    }

    #[test]
    fn toml_error_from_conversion() {
        let toml_err = toml::from_str::<toml::Value>("this is [[[not valid toml").unwrap_err();
        let e: SpaError = toml_err.into();
        assert!(format!("{e}").contains("TOML parse error"));
    }

    #[test]
    fn json_error_from_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let e: SpaError = json_err.into();
        assert!(format!("{e}").contains("JSON error"));
    }

    #[test]
    fn fetch_error_display() {
        assert_eq!(format!("{}", FetchError::Http { status: 404 }), "HTTP 404");
        assert_eq!(
            format!("{}", FetchError::Transport("connection reset".into())),
            "transport error: connection reset"
        );
    }

    #[test]
    fn only_cancellation_skips_fallback() {
        assert!(!NavigationFailure::Cancelled.needs_fallback());
        assert!(NavigationFailure::from(FetchError::Http { status: 500 }).needs_fallback());
        assert!(NavigationFailure::StructuralMismatch("no #main-content".into()).needs_fallback());
    }

    #[test]
    fn transport_failure_wraps_fetch_error() {
        let e = NavigationFailure::from(FetchError::Http { status: 404 });
        assert_eq!(format!("{e}"), "fetch failed: HTTP 404");
    }
}
