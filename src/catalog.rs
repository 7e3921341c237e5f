//! Catalog API access
//!
//! The annotator only ever needs one thing from the catalog: an item by id,
//! optionally restricted to a few top-level fields. [`CatalogClient`] is that
//! seam; [`ScienceBaseClient`] talks to the live JSON API and
//! [`StaticCatalog`] serves items held in memory.

use crate::config::CatalogConfig;
use crate::error::{CatalogError, Result};
use crate::model::Item;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// Source of catalog items
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Fetch an item by id.
    ///
    /// `fields` is a comma-separated projection of top-level fields; `id` is
    /// always returned. `Ok(None)` means the catalog has no such item.
    async fn get_item(&self, item_id: &str, fields: Option<&str>) -> Result<Option<Item>>;
}

/// Client for the ScienceBase catalog JSON API
#[derive(Debug, Clone)]
pub struct ScienceBaseClient {
    http: Client,
    base_url: Url,
}

impl ScienceBaseClient {
    /// Create a client from explicit settings
    pub fn new(config: CatalogConfig) -> Result<Self> {
        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url =
            Url::parse(&base).map_err(|e| CatalogError::InvalidUrl(format!("{base}: {e}")))?;

        let http = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| CatalogError::ClientBuild(e.to_string()))?;

        Ok(Self { http, base_url })
    }

    /// Catalog root this client points at
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL of the JSON view of an item.
    ///
    /// The id always lands in a single path segment, percent-encoded.
    pub fn item_url(&self, item_id: &str, fields: Option<&str>) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|()| {
                CatalogError::InvalidUrl(format!("{} cannot hold a path", self.base_url))
            })?
            .pop_if_empty()
            .push("item")
            .push(item_id);
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("format", "json");
            if let Some(fields) = fields.filter(|f| !f.is_empty()) {
                query.append_pair("fields", fields);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl CatalogClient for ScienceBaseClient {
    #[instrument(skip(self))]
    async fn get_item(&self, item_id: &str, fields: Option<&str>) -> Result<Option<Item>> {
        let url = self.item_url(item_id, fields)?;
        debug!(%url, "requesting catalog item");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| CatalogError::Request(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!("catalog item not found");
            return Ok(None);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CatalogError::Status {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| CatalogError::Request(e.to_string()))?;
        let item: Item =
            serde_json::from_slice(&body).map_err(|e| CatalogError::Decode(e.to_string()))?;
        Ok(Some(item))
    }
}

/// In-memory catalog keyed by item id
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    items: HashMap<String, Item>,
}

impl StaticCatalog {
    /// Empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an item
    pub fn insert(&mut self, item: Item) {
        self.items.insert(item.id.clone(), item);
    }

    /// Number of items held
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the catalog holds no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<Item> for StaticCatalog {
    fn from_iter<I: IntoIterator<Item = Item>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for item in iter {
            catalog.insert(item);
        }
        catalog
    }
}

#[async_trait]
impl CatalogClient for StaticCatalog {
    async fn get_item(&self, item_id: &str, fields: Option<&str>) -> Result<Option<Item>> {
        let Some(item) = self.items.get(item_id) else {
            return Ok(None);
        };
        match fields.filter(|f| !f.trim().is_empty()) {
            Some(fields) => project(item, fields).map(Some),
            None => Ok(Some(item.clone())),
        }
    }
}

// Round-trips through JSON so projection works on catalog field names.
fn project(item: &Item, fields: &str) -> Result<Item> {
    let Value::Object(full) = serde_json::to_value(item)? else {
        return Ok(item.clone());
    };
    let wanted: Vec<&str> = fields.split(',').map(str::trim).collect();
    let projected: Map<String, Value> = full
        .into_iter()
        .filter(|(key, _)| key == "id" || wanted.contains(&key.as_str()))
        .collect();
    Ok(serde_json::from_value(Value::Object(projected))?)
}
