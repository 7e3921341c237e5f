//! ScienceBase Web Links - Link Checking & Metadata Annotation
//!
//! This crate fetches the web links stored on ScienceBase catalog items,
//! classifies what each link points at, and attaches lightweight metadata to
//! the link as an `annotation` object.
//!
//! # Features
//!
//! - **Catalog access**: Fetch items by id with field projection
//! - **Link checking**: One GET per link; status, headers and charset recorded
//! - **Content sniffing**: HTML, XML or JSON by trial parse, not by header
//! - **Metadata extraction**: `<meta>` tags, JSON-LD, microdata, RDFa,
//!   OpenGraph, and FGDC / ISO 19115 / ArcGIS metadata summaries
//!
//! # Architecture
//!
//! ```text
//! Catalog item ──▶ LinkAnnotator ──▶ LinkFetcher (GET) ──▶ sniff::classify
//!                                                             │
//!                         ┌───────────────────┬───────────────┤
//!                         ▼                   ▼               ▼
//!                  meta_scraper +      summarize_xml_meta   json body
//!               structured data
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use sciencebase_weblinks::{
//!     CatalogConfig, FetchConfig, ItemRequest, LinkAnnotator, ScienceBaseClient,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let catalog = ScienceBaseClient::new(CatalogConfig::default())?;
//!     let annotator = LinkAnnotator::new(catalog, FetchConfig::default())?;
//!
//!     let item = annotator
//!         .process_item(ItemRequest::for_id("4f4e4760e4b07f02db47dfb4"))
//!         .await?;
//!
//!     for link in item.web_links.unwrap_or_default() {
//!         println!("{} => {:?}", link.uri, link.content_kind());
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod annotator;
pub mod catalog;
pub mod config;
pub mod error;
pub mod extraction;
pub mod fetch;
pub mod model;
pub mod sniff;
pub mod xml_meta;

// Re-exports for convenience
pub use annotator::{ItemRequest, LinkAnnotator};
pub use catalog::{CatalogClient, ScienceBaseClient, StaticCatalog};
pub use config::{CatalogConfig, FetchConfig, DEFAULT_ACCEPT, DEFAULT_CATALOG_URL};
pub use error::{Error, Result};
pub use extraction::{extract_structured_data, meta_scraper, StructuredData};
pub use fetch::{LinkFetcher, LinkResponse};
pub use model::{Annotation, ContentKind, FilterMode, Item, LinkFilter, WebLink, WebLinkBatch};
pub use xml_meta::{summarize_xml_meta, XmlMetaSummary};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
