//! Catalog records and link annotations
//!
//! Web links arrive from the catalog as loosely shaped JSON objects. These
//! types give the fields this crate reads a fixed shape while carrying every
//! other key through untouched, so an annotated link serializes back to the
//! catalog's own layout plus an `annotation` object.

use crate::extraction::StructuredData;
use crate::xml_meta::XmlMetaSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Outcome of fetching and sniffing a link
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentKind {
    /// Fetched, but nothing recognisable (or status was not 200)
    #[default]
    #[serde(rename = "UNKNOWN")]
    Unknown,
    /// Request could not be completed
    #[serde(rename = "ERROR")]
    Error,
    /// Server answered with an error status
    #[serde(rename = "HTTP_ERROR")]
    HttpError,
    /// HTML page
    #[serde(rename = "html")]
    Html,
    /// Well-formed XML (including XHTML)
    #[serde(rename = "xml")]
    Xml,
    /// JSON document
    #[serde(rename = "json")]
    Json,
}

impl ContentKind {
    /// Wire name as stored in the annotation
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Unknown => "UNKNOWN",
            ContentKind::Error => "ERROR",
            ContentKind::HttpError => "HTTP_ERROR",
            ContentKind::Html => "html",
            ContentKind::Xml => "xml",
            ContentKind::Json => "json",
        }
    }

    /// Whether the fetch itself failed
    pub fn is_failure(&self) -> bool {
        matches!(self, ContentKind::Error | ContentKind::HttpError)
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Enrichment record attached to a web link after it was checked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// When the fetch was attempted
    pub link_check_date: DateTime<Utc>,
    /// Classification outcome
    pub content_type: ContentKind,
    /// HTTP status, once a response was received
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    /// Response headers, once a response was received
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    /// Declared or detected charset, once a response was received
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    /// Failure description for `ERROR` and `HTTP_ERROR`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// `<title>` and `<meta name content>` pairs of an HTML page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_content: Option<BTreeMap<String, String>>,
    /// Embedded structured markup of an HTML page; `Some(None)` when
    /// extraction failed
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_nullable"
    )]
    pub structured_data: Option<Option<StructuredData>>,
    /// Geospatial metadata summary of an XML document; `Some(None)` when the
    /// document is not a recognised metadata standard
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_nullable"
    )]
    pub xml_meta_summary: Option<Option<XmlMetaSummary>>,
    /// Parsed body of a JSON document
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_nullable_value"
    )]
    pub json_content: Option<Value>,
}

impl Annotation {
    /// Fresh annotation stamped with the given check time
    pub fn new(link_check_date: DateTime<Utc>) -> Self {
        Self {
            link_check_date,
            content_type: ContentKind::Unknown,
            status_code: None,
            headers: None,
            encoding: None,
            error_message: None,
            meta_content: None,
            structured_data: None,
            xml_meta_summary: None,
            json_content: None,
        }
    }

    /// Fresh annotation stamped now
    pub fn now() -> Self {
        Self::new(Utc::now())
    }
}

// A key that is present maps to `Some`, even when its value is null.
fn present_nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn present_nullable_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// A URI plus descriptive metadata stored on a catalog item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebLink {
    /// Target of the link
    pub uri: String,
    /// Type classification term (e.g. `download`, `webLink`)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub link_type: Option<String>,
    /// Display title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Result of the last check
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Annotation>,
    /// Remaining catalog keys, preserved verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WebLink {
    /// Link with only a URI
    pub fn new<S: Into<String>>(uri: S) -> Self {
        Self {
            uri: uri.into(),
            link_type: None,
            title: None,
            annotation: None,
            extra: Map::new(),
        }
    }

    /// Set the type term
    pub fn with_type<S: Into<String>>(mut self, link_type: S) -> Self {
        self.link_type = Some(link_type.into());
        self
    }

    /// Set the title
    pub fn with_title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Classification of the last check, if any
    pub fn content_kind(&self) -> Option<ContentKind> {
        self.annotation.as_ref().map(|a| a.content_type)
    }
}

/// Catalog record owning a set of web links
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Catalog identifier
    pub id: String,
    /// Web links, absent when the item has none or the field was not requested
    #[serde(rename = "webLinks", default, skip_serializing_if = "Option::is_none")]
    pub web_links: Option<Vec<WebLink>>,
    /// Remaining item fields, preserved verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Item {
    /// Item carrying only an id and links
    pub fn new<S: Into<String>>(id: S, web_links: Option<Vec<WebLink>>) -> Self {
        Self {
            id: id.into(),
            web_links,
            extra: Map::new(),
        }
    }
}

/// One link or an ordered list of links
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WebLinkBatch {
    /// Single link
    One(WebLink),
    /// Ordered list of links
    Many(Vec<WebLink>),
}

impl WebLinkBatch {
    /// Number of links in the batch
    pub fn len(&self) -> usize {
        match self {
            WebLinkBatch::One(_) => 1,
            WebLinkBatch::Many(links) => links.len(),
        }
    }

    /// Whether the batch holds no links
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Exact-match selection on link type and title
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkFilter {
    /// Required `type` value
    pub link_type: Option<String>,
    /// Required `title` value
    pub link_title: Option<String>,
}

impl LinkFilter {
    /// Filter on type and title
    pub fn new(link_type: Option<String>, link_title: Option<String>) -> Self {
        Self {
            link_type,
            link_title,
        }
    }

    /// Filter on type only
    pub fn by_type<S: Into<String>>(link_type: S) -> Self {
        Self::new(Some(link_type.into()), None)
    }

    /// Filter on title only
    pub fn by_title<S: Into<String>>(link_title: S) -> Self {
        Self::new(None, Some(link_title.into()))
    }

    /// True when no criterion is set
    pub fn is_empty(&self) -> bool {
        self.link_type.is_none() && self.link_title.is_none()
    }

    /// Every set criterion matches (an empty filter matches everything)
    pub fn matches(&self, link: &WebLink) -> bool {
        let type_ok = self
            .link_type
            .as_ref()
            .map_or(true, |t| link.link_type.as_ref() == Some(t));
        let title_ok = self
            .link_title
            .as_ref()
            .map_or(true, |t| link.title.as_ref() == Some(t));
        type_ok && title_ok
    }

    /// At least one set criterion matches (an empty filter matches nothing)
    pub fn hits_any(&self, link: &WebLink) -> bool {
        let type_hit = self
            .link_type
            .as_ref()
            .is_some_and(|t| link.link_type.as_ref() == Some(t));
        let title_hit = self
            .link_title
            .as_ref()
            .is_some_and(|t| link.title.as_ref() == Some(t));
        type_hit || title_hit
    }
}

/// How a [`LinkFilter`] selects links for annotation in item processing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FilterMode {
    /// Annotate only links matching every criterion; others pass through
    #[default]
    Include,
    /// Pass through links matching any criterion; annotate the rest
    Exclude,
}

impl FilterMode {
    /// Whether `link` should be annotated under this mode
    pub fn selects(&self, filter: &LinkFilter, link: &WebLink) -> bool {
        match self {
            FilterMode::Include => filter.matches(link),
            FilterMode::Exclude => !filter.hits_any(link),
        }
    }
}
