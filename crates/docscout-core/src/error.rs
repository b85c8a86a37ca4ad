//! Error types for docscout-core operations.
//!
//! Discovery and crawling are best-effort: almost every network or parse
//! failure is absorbed inside a tier and never reaches the caller. The
//! [`Error`] type exists for the places where a failure *is* surfaced:
//!
//! - **Construction**: building the HTTP client or loading configuration
//! - **Contract violations**: e.g. crawling a string that is not a URL
//! - **Tier internals**: helpers return `Result` and the engine converts
//!   failures into "this tier produced nothing"
//!
//! ## Recovery Hints
//!
//! ```rust
//! use docscout_core::Error;
//!
//! let err = Error::Timeout("registry lookup".to_string());
//! assert!(err.is_recoverable());
//! assert_eq!(err.category(), "timeout");
//! ```

use thiserror::Error;

/// The main error type for docscout-core operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed (reading or writing the configuration file).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Network operation failed.
    ///
    /// Connection and timeout errors are typically recoverable, while
    /// TLS and malformed request errors are permanent.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Content could not be parsed (HTML, sitemap XML, registry JSON).
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration is invalid or inaccessible.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource was not found (HTTP 404 or unknown package).
    #[error("Not found: {0}")]
    NotFound(String),

    /// URL is malformed, relative, or uses an unsupported scheme.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A configured limit was exceeded (sitemap recursion depth, entry caps).
    #[error("Resource limited: {0}")]
    ResourceLimited(String),

    /// Operation timed out.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic error for uncategorized failures.
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

impl Error {
    /// Check if the error might be recoverable through retry logic.
    ///
    /// Returns `true` for network timeouts, connection failures, explicit
    /// [`Error::Timeout`] values, and interrupted or timed-out I/O.
    ///
    /// Discovery itself never retries; this is a hint for callers that wrap
    /// the engine (for example a long-running server re-running a batch).
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Network(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout(_) => true,
            Self::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::Interrupted
            ),
            _ => false,
        }
    }

    /// Get the error category as a string identifier for logging.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Network(_) => "network",
            Self::Parse(_) => "parse",
            Self::Config(_) => "config",
            Self::NotFound(_) => "not_found",
            Self::InvalidUrl(_) => "invalid_url",
            Self::ResourceLimited(_) => "resource_limited",
            Self::Timeout(_) => "timeout",
            Self::Serialization(_) => "serialization",
            Self::Other(_) => "other",
        }
    }
}

/// Convenience type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[allow(
    clippy::panic,
    clippy::disallowed_macros,
    clippy::unwrap_used,
    clippy::unnecessary_wraps
)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_display_formatting() {
        let cases = vec![
            (Error::Parse("bad xml".to_string()), "Parse error"),
            (Error::Config("zero batch".to_string()), "Configuration error"),
            (Error::NotFound("left-pad".to_string()), "Not found"),
            (Error::InvalidUrl("docs".to_string()), "Invalid URL"),
            (Error::ResourceLimited("depth".to_string()), "Resource limited"),
            (Error::Timeout("head".to_string()), "Timeout"),
        ];

        for (error, prefix) in cases {
            let rendered = error.to_string();
            assert!(rendered.starts_with(prefix), "{rendered} should start with {prefix}");
        }

        assert_eq!(Error::Other("plain".to_string()).to_string(), "plain");
    }

    #[test]
    fn test_error_categories() {
        let error_categories = vec![
            (Error::Io(io::Error::other("test")), "io"),
            (Error::Parse("test".to_string()), "parse"),
            (Error::Config("test".to_string()), "config"),
            (Error::NotFound("test".to_string()), "not_found"),
            (Error::InvalidUrl("test".to_string()), "invalid_url"),
            (
                Error::ResourceLimited("test".to_string()),
                "resource_limited",
            ),
            (Error::Timeout("test".to_string()), "timeout"),
            (Error::Serialization("test".to_string()), "serialization"),
            (Error::Other("test".to_string()), "other"),
        ];

        for (error, expected_category) in error_categories {
            assert_eq!(error.category(), expected_category);
        }
    }

    #[test]
    fn test_error_recoverability() {
        let recoverable_errors = vec![
            Error::Io(io::Error::new(io::ErrorKind::TimedOut, "timeout")),
            Error::Io(io::Error::new(io::ErrorKind::Interrupted, "interrupted")),
            Error::Timeout("request timeout".to_string()),
        ];

        let non_recoverable_errors = vec![
            Error::Io(io::Error::new(io::ErrorKind::NotFound, "not found")),
            Error::Parse("bad syntax".to_string()),
            Error::Config("invalid config".to_string()),
            Error::NotFound("missing".to_string()),
            Error::InvalidUrl("bad url".to_string()),
            Error::Other("generic error".to_string()),
        ];

        for error in recoverable_errors {
            assert!(error.is_recoverable(), "Expected {error:?} to be recoverable");
        }
        for error in non_recoverable_errors {
            assert!(
                !error.is_recoverable(),
                "Expected {error:?} to be non-recoverable"
            );
        }
    }

    #[test]
    fn test_conversions() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(Error::from(json_err), Error::Serialization(_)));

        let toml_err = toml::from_str::<toml::Value>("= nope").unwrap_err();
        assert!(matches!(Error::from(toml_err), Error::Serialization(_)));

        let url_err = url::Url::parse("not a url").unwrap_err();
        assert!(matches!(Error::from(url_err), Error::InvalidUrl(_)));
    }
}
