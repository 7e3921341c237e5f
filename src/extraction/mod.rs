//! Content extraction module
//!
//! This module extracts lightweight metadata from fetched HTML pages: named
//! meta tags and embedded structured data.

pub mod metadata;
pub mod structured;

pub use metadata::meta_scraper;
pub use structured::{extract_structured_data, StructuredData};
