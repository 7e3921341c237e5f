//! Link annotation
//!
//! [`LinkAnnotator`] ties the catalog, the fetcher and the extractors
//! together. Links are processed one at a time in input order; a link that
//! fails to fetch or parse still comes back, with the failure recorded on its
//! annotation.

use crate::catalog::CatalogClient;
use crate::config::FetchConfig;
use crate::error::{Error, Result};
use crate::extraction::{extract_structured_data, meta_scraper, StructuredData};
use crate::fetch::{LinkFetcher, LinkResponse};
use crate::model::{ContentKind, FilterMode, Item, LinkFilter, WebLink, WebLinkBatch};
use crate::xml_meta::summarize_xml_meta;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

/// Catalog field projection used when an item is fetched for processing
pub const DEFAULT_FIELDS: &str = "webLinks";

/// What [`LinkAnnotator::process_item`] should work on
#[derive(Debug, Clone)]
pub struct ItemRequest {
    /// Catalog id to fetch; takes precedence over `item`
    pub item_id: Option<String>,
    /// Item already in hand
    pub item: Option<Item>,
    /// Field projection for the catalog fetch
    pub fields: String,
    /// Link selection criteria
    pub filter: LinkFilter,
    /// How `filter` is applied
    pub mode: FilterMode,
}

impl Default for ItemRequest {
    fn default() -> Self {
        Self {
            item_id: None,
            item: None,
            fields: DEFAULT_FIELDS.to_string(),
            filter: LinkFilter::default(),
            mode: FilterMode::default(),
        }
    }
}

impl ItemRequest {
    /// Process the catalog item with this id
    pub fn for_id<S: Into<String>>(item_id: S) -> Self {
        Self {
            item_id: Some(item_id.into()),
            ..Self::default()
        }
    }

    /// Process an item already in hand
    pub fn for_item(item: Item) -> Self {
        Self {
            item: Some(item),
            ..Self::default()
        }
    }

    /// Set the field projection
    pub fn with_fields<S: Into<String>>(mut self, fields: S) -> Self {
        self.fields = fields.into();
        self
    }

    /// Set the link filter and how it applies
    pub fn with_filter(mut self, filter: LinkFilter, mode: FilterMode) -> Self {
        self.filter = filter;
        self.mode = mode;
        self
    }
}

/// Annotates the web links of catalog items
pub struct LinkAnnotator<C: CatalogClient> {
    catalog: C,
    fetcher: LinkFetcher,
}

impl<C: CatalogClient> LinkAnnotator<C> {
    /// Create an annotator over a catalog client
    pub fn new(catalog: C, fetch_config: FetchConfig) -> Result<Self> {
        let fetcher = LinkFetcher::new(fetch_config)?;
        Ok(Self { catalog, fetcher })
    }

    /// Create an annotator from an existing fetcher
    pub fn with_fetcher(catalog: C, fetcher: LinkFetcher) -> Self {
        Self { catalog, fetcher }
    }

    /// Catalog client in use
    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Fetcher in use
    pub fn fetcher(&self) -> &LinkFetcher {
        &self.fetcher
    }

    /// Fetch an item's web links, narrowed by `filter`.
    ///
    /// Returns `Ok(None)` when the item has no `webLinks` or nothing is left
    /// after filtering. Links are returned as stored, without annotation.
    #[instrument(skip(self))]
    pub async fn fetch_web_links(
        &self,
        item_id: &str,
        filter: &LinkFilter,
    ) -> Result<Option<Item>> {
        let item = self
            .catalog
            .get_item(item_id, Some(DEFAULT_FIELDS))
            .await?
            .ok_or_else(|| Error::NotFound(item_id.to_string()))?;

        let Some(links) = item.web_links else {
            debug!("item has no web links");
            return Ok(None);
        };
        let selected: Vec<WebLink> = links.into_iter().filter(|l| filter.matches(l)).collect();
        if selected.is_empty() {
            debug!("no web links left after filtering");
            return Ok(None);
        }
        Ok(Some(Item::new(item.id, Some(selected))))
    }

    /// Fetch a link, classify it and attach whatever metadata its kind
    /// carries.
    #[instrument(skip(self, link), fields(uri = %link.uri))]
    pub async fn link_meta(&self, link: WebLink) -> WebLink {
        let (mut link, response) = self.fetcher.get_weblink_response(link).await;
        let Some(response) = response else {
            return link;
        };
        if let Some(annotation) = link.annotation.as_mut() {
            match annotation.content_type {
                ContentKind::Html => {
                    annotation.meta_content = Some(meta_scraper(&response.text));
                    annotation.structured_data = Some(structured_data(&response));
                }
                ContentKind::Xml => {
                    annotation.xml_meta_summary = Some(match summarize_xml_meta(&response.text) {
                        Ok(summary) => Some(summary),
                        Err(err) => {
                            debug!(error = %err, "no metadata summary for xml document");
                            None
                        }
                    });
                }
                ContentKind::Json => match serde_json::from_str::<Value>(&response.text) {
                    Ok(value) => annotation.json_content = Some(value),
                    Err(err) => warn!(error = %err, "json body failed to reparse"),
                },
                _ => {}
            }
        }
        link
    }

    /// Annotate one link or a list of links, preserving order.
    pub async fn process_web_links(&self, batch: WebLinkBatch) -> WebLinkBatch {
        match batch {
            WebLinkBatch::One(link) => WebLinkBatch::One(self.link_meta(link).await),
            WebLinkBatch::Many(links) => {
                let mut annotated = Vec::with_capacity(links.len());
                for link in links {
                    annotated.push(self.link_meta(link).await);
                }
                WebLinkBatch::Many(annotated)
            }
        }
    }

    /// Annotate the web links of an item.
    ///
    /// The item is fetched when `item_id` is given, otherwise `item` is used.
    /// Links the filter does not select are passed through unchanged; the
    /// item's `webLinks` are replaced with the processed list.
    #[instrument(skip(self, request), fields(item_id = ?request.item_id, mode = ?request.mode))]
    pub async fn process_item(&self, request: ItemRequest) -> Result<Item> {
        let ItemRequest {
            item_id,
            item,
            fields,
            filter,
            mode,
        } = request;

        let mut item = match (item_id, item) {
            (Some(id), _) => self
                .catalog
                .get_item(&id, Some(fields.as_str()))
                .await?
                .ok_or_else(|| Error::NotFound(id.clone()))?,
            (None, Some(item)) => item,
            (None, None) => {
                return Err(Error::invalid_argument("either item_id or item is required"))
            }
        };

        let Some(links) = item.web_links.take() else {
            debug!("item has no web links, returning unchanged");
            return Ok(item);
        };

        let total = links.len();
        let mut processed = Vec::with_capacity(total);
        let mut annotated = 0usize;
        for link in links {
            if mode.selects(&filter, &link) {
                processed.push(self.link_meta(link).await);
                annotated += 1;
            } else {
                processed.push(link);
            }
        }
        info!(total, annotated, "processed item web links");

        item.web_links = Some(processed);
        Ok(item)
    }
}

fn structured_data(response: &LinkResponse) -> Option<StructuredData> {
    match extract_structured_data(&response.text, response.url.as_str()) {
        Ok(data) => Some(data),
        Err(err) => {
            warn!(error = %err, "structured data extraction failed");
            None
        }
    }
}
