//! Geospatial metadata summaries
//!
//! XML link targets are often metadata records in one of the standards used
//! by science catalogs. The record's standard is picked from its root
//! element, and a fixed set of twelve descriptive fields is read out as text,
//! without reinterpretation.

mod arcgis;
mod fgdc;
mod iso;
pub(crate) mod path;

use crate::error::ExtractionError;
use crate::sniff::xml_options;
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Metadata standards this module can read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataStandard {
    /// FGDC Content Standard for Digital Geospatial Metadata
    Fgdc,
    /// ISO 19115 / 19139 (`MD_Metadata`, `MI_Metadata`)
    Iso,
    /// ArcGIS item metadata
    ArcGis,
}

impl MetadataStandard {
    /// Identify the standard from a document's root element
    pub fn detect(root: Node<'_, '_>) -> Option<Self> {
        match root.tag_name().name() {
            "MD_Metadata" | "MI_Metadata" => Some(MetadataStandard::Iso),
            "metadata" => {
                let has_child = |name: &str| path::first(root, name).is_some();
                if has_child("idinfo") {
                    Some(MetadataStandard::Fgdc)
                } else if has_child("dataIdInfo") || has_child("Esri") {
                    Some(MetadataStandard::ArcGis)
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

/// Entity attribute description
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute label
    pub label: Option<String>,
    /// Alternate names
    pub aliases: Option<String>,
    /// Definition text
    pub definition: Option<String>,
    /// Authority for the definition
    pub definition_source: Option<String>,
}

/// Geographic extent in decimal degrees, as written in the record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Eastern bound
    pub east: Option<String>,
    /// Southern bound
    pub south: Option<String>,
    /// Western bound
    pub west: Option<String>,
    /// Northern bound
    pub north: Option<String>,
}

/// Point of contact
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    /// Person name
    pub name: Option<String>,
    /// Organization name
    pub organization: Option<String>,
    /// Position title
    pub position: Option<String>,
    /// Email address
    pub email: Option<String>,
}

/// Shape of a time period of content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateType {
    /// One date
    Single,
    /// Several discrete dates
    Multiple,
    /// Begin and end dates
    Range,
}

/// Time period of content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dates {
    /// Shape of `values`
    #[serde(rename = "type")]
    pub date_type: DateType,
    /// Dates as written in the record
    pub values: Vec<String>,
}

impl Dates {
    /// Classify a list of instants; `None` when empty
    pub(crate) fn from_instants(values: Vec<String>) -> Option<Self> {
        let date_type = match values.len() {
            0 => return None,
            1 => DateType::Single,
            _ => DateType::Multiple,
        };
        Some(Self { date_type, values })
    }

    /// Begin/end range; `None` when both ends are missing
    pub(crate) fn range(begin: Option<String>, end: Option<String>) -> Option<Self> {
        let values: Vec<String> = begin.into_iter().chain(end).collect();
        if values.is_empty() {
            None
        } else {
            Some(Self {
                date_type: DateType::Range,
                values,
            })
        }
    }
}

/// Distribution format and online access
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DigitalForm {
    /// Format name
    pub name: Option<String>,
    /// Format content description
    pub content: Option<String>,
    /// Decompression technique
    pub decompression: Option<String>,
    /// Format version
    pub version: Option<String>,
    /// Format specification
    pub specification: Option<String>,
    /// Access description
    pub access_desc: Option<String>,
    /// Access instructions
    pub access_instrs: Option<String>,
    /// Network resource name (usually a URL)
    pub network_resource: Option<String>,
}

/// Citation of a larger work the dataset belongs to
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LargerWork {
    /// Title
    pub title: Option<String>,
    /// Edition
    pub edition: Option<String>,
    /// Originators
    pub origin: Vec<String>,
    /// Online linkage
    pub online_linkage: Option<String>,
    /// Other citation details
    pub other_citation: Option<String>,
    /// Publication date
    pub publish_date: Option<String>,
    /// Publication place
    pub publish_place: Option<String>,
    /// Publisher
    pub publish_info: Option<String>,
}

/// Lineage process step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessStep {
    /// What was done
    pub description: Option<String>,
    /// When it was done
    pub date: Option<String>,
    /// Sources used
    pub sources: Vec<String>,
}

/// Raster grid description
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RasterInfo {
    /// Raster object type or number of dimensions
    pub dimensions: Option<String>,
    /// Row count
    pub row_count: Option<String>,
    /// Column count
    pub column_count: Option<String>,
    /// Vertical count
    pub vertical_count: Option<String>,
    /// Cell size along x (columns)
    pub x_resolution: Option<String>,
    /// Cell size along y (rows)
    pub y_resolution: Option<String>,
}

impl RasterInfo {
    pub(crate) fn is_empty(&self) -> bool {
        *self == RasterInfo::default()
    }
}

/// Twelve descriptive fields of a metadata record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct XmlMetaSummary {
    /// Dataset title
    pub title: Option<String>,
    /// Abstract
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    /// Place keywords
    pub place_keywords: Vec<String>,
    /// Theme keywords
    pub thematic_keywords: Vec<String>,
    /// Entity attributes
    pub attributes: Vec<Attribute>,
    /// Geographic extent
    pub bounding_box: Option<BoundingBox>,
    /// Points of contact
    pub contacts: Vec<Contact>,
    /// Time period of content
    pub dates: Option<Dates>,
    /// Distribution formats
    pub digital_forms: Vec<DigitalForm>,
    /// Larger work citation
    pub larger_works: Option<LargerWork>,
    /// Lineage process steps
    pub process_steps: Vec<ProcessStep>,
    /// Raster grid description
    pub raster_info: Option<RasterInfo>,
}

/// Summarize an XML metadata record.
///
/// Fails when the text is not well-formed XML or its root does not belong
/// to a known metadata standard.
#[instrument(skip(xml_content), fields(bytes = xml_content.len()))]
pub fn summarize_xml_meta(xml_content: &str) -> Result<XmlMetaSummary, ExtractionError> {
    let doc = Document::parse_with_options(xml_content, xml_options())
        .map_err(|e| ExtractionError::ParsingFailed(e.to_string()))?;
    let root = doc.root_element();
    let standard = MetadataStandard::detect(root)
        .ok_or_else(|| ExtractionError::UnsupportedSchema(root.tag_name().name().to_string()))?;
    debug!(?standard, "summarizing metadata record");

    Ok(match standard {
        MetadataStandard::Fgdc => fgdc::summarize(root),
        MetadataStandard::Iso => iso::summarize(root),
        MetadataStandard::ArcGis => arcgis::summarize(root),
    })
}
