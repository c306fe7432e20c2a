//! Error types for pagecut operations.
//!
//! This module defines [`PagecutError`], which covers every fatal condition
//! the pipeline can hit: configuration mistakes, fetch failures, bad
//! selectors, converter failures and the promoted empty-content condition.
//!
//! Non-fatal degradations (a source URL without a usable base location, a
//! missing title region) never surface as errors.
//!
//! # Example
//!
//! ```rust
//! use pagecut_core::{PagecutError, Result};
//!
//! fn require_selector(selector: &str) -> Result<&str> {
//!     if selector.trim().is_empty() {
//!         return Err(PagecutError::Config("content selector is required".into()));
//!     }
//!     Ok(selector)
//! }
//! ```

use thiserror::Error;

/// Main error type for the conversion pipeline.
#[derive(Error, Debug)]
pub enum PagecutError {
    /// Invalid run configuration.
    ///
    /// Raised before any I/O happens: conflicting or missing sources, a
    /// missing content selector, or output-path tokens without a URL.
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP request errors from reqwest.
    #[cfg(feature = "fetch")]
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP {status} while fetching {url}")]
    HttpStatus { status: u16, url: String },

    /// Request timeout.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// The fetched response had an empty body.
    #[error("Empty response from {0}")]
    EmptyResponse(String),

    /// Nothing was piped on standard input.
    #[error("No document was read from standard input")]
    EmptyInput,

    /// Invalid URL provided to the fetcher.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A region selector failed to compile.
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    /// The format converter rejected the fragment.
    #[error("Conversion failed: {0}")]
    Conversion(String),

    /// The content region rendered to nothing and the run asked for that to be fatal.
    #[error("No content extracted from {origin}")]
    EmptyContent { origin: String },

    /// Reading input or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for PagecutError.
pub type Result<T> = std::result::Result<T, PagecutError>;
