//! Error types for ScienceBase web link annotation
//!
//! This module provides the error hierarchy used across the crate. Only
//! argument, lookup and catalog failures ever reach a caller; fetch and
//! extraction failures are folded into the annotation of the link that
//! produced them.

use crate::model::ContentKind;
use thiserror::Error;

/// The main error type for web link operations
#[derive(Error, Debug)]
pub enum Error {
    /// Caller supplied neither an item nor an item id
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The catalog has no item for the requested id
    #[error("Item not found: {0}")]
    NotFound(String),

    /// Catalog API errors
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Link fetch errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Catalog API errors
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Base URL or item URL could not be built
    #[error("Invalid catalog URL: {0}")]
    InvalidUrl(String),

    /// HTTP client could not be constructed
    #[error("Failed to build catalog client: {0}")]
    ClientBuild(String),

    /// Request never produced a response
    #[error("Catalog request failed: {0}")]
    Request(String),

    /// Catalog answered with a non-success status
    #[error("Catalog returned HTTP {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Response body was not an item
    #[error("Failed to decode catalog item: {0}")]
    Decode(String),
}

/// Link fetch errors
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    /// Network-level failure: DNS, connect, timeout, body read
    #[error("{0}")]
    Transport(String),

    /// Server answered with a 4xx or 5xx status
    #[error("{status} {} Error: {reason} for url: {url}", status_class(.status))]
    HttpStatus {
        /// HTTP status code
        status: u16,
        /// Canonical reason phrase
        reason: String,
        /// Requested URL
        url: String,
    },
}

impl FetchError {
    /// Content kind recorded on a link that failed this way
    pub fn content_kind(&self) -> ContentKind {
        match self {
            FetchError::HttpStatus { .. } => ContentKind::HttpError,
            _ => ContentKind::Error,
        }
    }
}

fn status_class(status: &u16) -> &'static str {
    if *status >= 500 {
        "Server"
    } else {
        "Client"
    }
}

/// Content extraction errors
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Content parsing failed
    #[error("Content parsing failed: {0}")]
    ParsingFailed(String),

    /// XML is well formed but not a known metadata standard
    #[error("Unsupported metadata schema: {0}")]
    UnsupportedSchema(String),

    /// Page or base URL could not be resolved
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// Embedded structured data could not be read
    #[error("Structured data extraction failed: {0}")]
    StructuredData(String),
}

/// Result type alias for web link operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an invalid-argument error from a string
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        Error::InvalidArgument(msg.into())
    }
}
