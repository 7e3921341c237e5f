//! Embedded structured data extraction
//!
//! Reads the machine-readable markup a page carries alongside its visible
//! content: JSON-LD script blocks, HTML microdata, RDFa Lite annotations and
//! Open Graph meta properties. URL-valued properties are resolved against the
//! page's base URL (`<base href>` over the final response URL).

use crate::error::ExtractionError;
use ego_tree::NodeId;
use scraper::node::Element;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::{debug, instrument};
use url::Url;

/// Structured markup found in a page, grouped by syntax
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredData {
    /// JSON-LD documents; top-level arrays are flattened
    #[serde(rename = "json-ld", default)]
    pub json_ld: Vec<Value>,
    /// Microdata items as `{type, id, properties}`
    #[serde(default)]
    pub microdata: Vec<Value>,
    /// RDFa Lite items as JSON-LD-like objects
    #[serde(default)]
    pub rdfa: Vec<Value>,
    /// Open Graph groups as `{namespace, properties}`
    #[serde(default)]
    pub opengraph: Vec<Value>,
}

impl StructuredData {
    /// True when no syntax produced anything
    pub fn is_empty(&self) -> bool {
        self.json_ld.is_empty()
            && self.microdata.is_empty()
            && self.rdfa.is_empty()
            && self.opengraph.is_empty()
    }
}

/// Open Graph style prefixes and their namespaces
const OPENGRAPH_NAMESPACES: &[(&str, &str)] = &[
    ("og", "http://ogp.me/ns#"),
    ("article", "http://ogp.me/ns/article#"),
    ("book", "http://ogp.me/ns/book#"),
    ("profile", "http://ogp.me/ns/profile#"),
    ("video", "http://ogp.me/ns/video#"),
    ("music", "http://ogp.me/ns/music#"),
    ("fb", "http://ogp.me/ns/fb#"),
];

/// Extract all structured data from an HTML page fetched from `page_url`.
///
/// Fails when the page URL is not absolute, a JSON-LD block is not valid
/// JSON, or microdata or RDFa items nest past the walk limits.
#[instrument(skip(html_content))]
pub fn extract_structured_data(
    html_content: &str,
    page_url: &str,
) -> Result<StructuredData, ExtractionError> {
    let page_url =
        Url::parse(page_url).map_err(|e| ExtractionError::InvalidBaseUrl(format!("{page_url}: {e}")))?;
    let doc = Html::parse_document(html_content);
    let base = base_url(&doc, &page_url)?;

    let data = StructuredData {
        json_ld: json_ld(&doc)?,
        microdata: microdata(&doc, &base)?,
        rdfa: rdfa(&doc, &base)?,
        opengraph: opengraph(&doc),
    };

    debug!(
        json_ld = data.json_ld.len(),
        microdata = data.microdata.len(),
        rdfa = data.rdfa.len(),
        opengraph = data.opengraph.len(),
        "extracted structured data"
    );
    Ok(data)
}

/// Base URL of a page: first `<base href>` resolved against the page URL
pub fn base_url(doc: &Html, page_url: &Url) -> Result<Url, ExtractionError> {
    match doc
        .select(selector(&BASE, "base[href]"))
        .next()
        .and_then(|el| el.value().attr("href"))
        .map(str::trim)
    {
        Some(href) if !href.is_empty() => page_url
            .join(href)
            .map_err(|e| ExtractionError::InvalidBaseUrl(format!("{href}: {e}"))),
        _ => Ok(page_url.clone()),
    }
}

static BASE: OnceLock<Selector> = OnceLock::new();
static SCRIPT: OnceLock<Selector> = OnceLock::new();
static ITEMSCOPE: OnceLock<Selector> = OnceLock::new();
static TYPEOF: OnceLock<Selector> = OnceLock::new();
static META_PROPERTY: OnceLock<Selector> = OnceLock::new();

fn selector(cell: &'static OnceLock<Selector>, css: &str) -> &'static Selector {
    cell.get_or_init(|| Selector::parse(css).expect("static selector parses"))
}

fn json_ld(doc: &Html) -> Result<Vec<Value>, ExtractionError> {
    let mut out = Vec::new();
    let blocks = doc.select(selector(&SCRIPT, "script[type]")).filter(|el| {
        el.value()
            .attr("type")
            .is_some_and(|t| t.trim().eq_ignore_ascii_case("application/ld+json"))
    });
    for block in blocks {
        let raw = block.text().collect::<String>();
        let cleaned = raw.trim().trim_start_matches("<!--").trim_end_matches("-->").trim();
        if cleaned.is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(cleaned)
            .map_err(|e| ExtractionError::StructuredData(format!("invalid JSON-LD: {e}")))?;
        match value {
            Value::Array(values) => out.extend(values),
            other => out.push(other),
        }
    }
    Ok(out)
}

fn resolve(base: &Url, href: &str) -> Value {
    let href = href.trim();
    Value::String(
        base.join(href)
            .map(String::from)
            .unwrap_or_else(|_| href.to_string()),
    )
}

fn type_value(tokens: &str) -> Option<Value> {
    let types: Vec<Value> = tokens
        .split_whitespace()
        .map(|t| Value::String(t.to_string()))
        .collect();
    match types.len() {
        0 => None,
        1 => types.into_iter().next(),
        _ => Some(Value::Array(types)),
    }
}

fn text_value(el: ElementRef<'_>) -> Value {
    let text = el.text().collect::<String>();
    Value::String(text.split_whitespace().collect::<Vec<_>>().join(" "))
}

// Repeated names collect into a list, in document order.
fn push_property(props: &mut Map<String, Value>, name: &str, value: Value) {
    match props.get_mut(name) {
        Some(Value::Array(values)) => values.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            props.insert(name.to_string(), value);
        }
    }
}

fn child_elements(el: ElementRef<'_>) -> impl DoubleEndedIterator<Item = ElementRef<'_>> {
    el.children().filter_map(ElementRef::wrap)
}

/// Deepest element nesting followed below a top-level item
const MAX_ELEMENT_DEPTH: usize = 512;
/// Longest chain of items nested through properties
const MAX_ITEM_DEPTH: usize = 64;

/// One item syntax: which attributes open a scope and name a property,
/// and how a finished item is shaped.
trait ItemSyntax {
    const NAME: &'static str;

    fn is_scope(element: &Element) -> bool;

    fn property_names(element: &Element) -> Option<&str>;

    fn leaf_value(el: ElementRef<'_>, base: &Url) -> Value;

    /// Elements outside the scope's subtree that still belong to it
    fn references<'a>(_doc: &'a Html, _scope: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        Vec::new()
    }

    fn finish(scope: ElementRef<'_>, base: &Url, properties: Vec<(&str, Value)>) -> Value;
}

enum Slot {
    Value(Value),
    Item(usize),
}

struct ItemFrame<'a> {
    scope: ElementRef<'a>,
    parent: Option<usize>,
    depth: usize,
    visited: HashSet<NodeId>,
    entries: Vec<(&'a str, Slot)>,
}

struct Pending<'a> {
    element: ElementRef<'a>,
    frame: usize,
    depth: usize,
}

/// Walks one top-level item and every item nested under it.
///
/// The walk keeps its own stack. Each item remembers the elements it has
/// already read, so an element reached twice (through a reference or a
/// reference cycle) contributes once, and an item that would contain one of
/// its own enclosing items is dropped.
struct ItemWalker<'a> {
    doc: &'a Html,
    frames: Vec<ItemFrame<'a>>,
    stack: Vec<Pending<'a>>,
}

impl<'a> ItemWalker<'a> {
    fn walk<S: ItemSyntax>(
        doc: &'a Html,
        root: ElementRef<'a>,
        base: &Url,
    ) -> Result<Value, ExtractionError> {
        let mut walker = Self {
            doc,
            frames: Vec::new(),
            stack: Vec::new(),
        };
        walker.open::<S>(root, None, 0, 0);

        while let Some(Pending { element, frame, depth }) = walker.stack.pop() {
            if depth > MAX_ELEMENT_DEPTH {
                return Err(ExtractionError::StructuredData(format!(
                    "{} nested deeper than {MAX_ELEMENT_DEPTH} elements",
                    S::NAME
                )));
            }
            if !walker.frames[frame].visited.insert(element.id()) {
                continue;
            }
            let nested_scope = S::is_scope(element.value());
            if let Some(names) = S::property_names(element.value()) {
                if !nested_scope {
                    let value = S::leaf_value(element, base);
                    walker.frames[frame].entries.push((names, Slot::Value(value)));
                } else if !walker.encloses(frame, element) {
                    let item_depth = walker.frames[frame].depth + 1;
                    if item_depth > MAX_ITEM_DEPTH {
                        return Err(ExtractionError::StructuredData(format!(
                            "{} items nested deeper than {MAX_ITEM_DEPTH}",
                            S::NAME
                        )));
                    }
                    let child = walker.open::<S>(element, Some(frame), item_depth, depth);
                    walker.frames[frame].entries.push((names, Slot::Item(child)));
                }
            }
            if !nested_scope {
                walker.push_children(element, frame, depth + 1);
            }
        }
        Ok(walker.assemble::<S>(base))
    }

    fn open<S: ItemSyntax>(
        &mut self,
        scope: ElementRef<'a>,
        parent: Option<usize>,
        item_depth: usize,
        element_depth: usize,
    ) -> usize {
        let index = self.frames.len();
        self.frames.push(ItemFrame {
            scope,
            parent,
            depth: item_depth,
            visited: HashSet::from([scope.id()]),
            entries: Vec::new(),
        });
        // Popped after the scope's own subtree.
        for target in S::references(self.doc, scope).into_iter().rev() {
            self.stack.push(Pending {
                element: target,
                frame: index,
                depth: element_depth + 1,
            });
        }
        self.push_children(scope, index, element_depth + 1);
        index
    }

    fn push_children(&mut self, el: ElementRef<'a>, frame: usize, depth: usize) {
        self.stack.extend(
            child_elements(el)
                .rev()
                .map(|element| Pending { element, frame, depth }),
        );
    }

    fn encloses(&self, frame: usize, el: ElementRef<'a>) -> bool {
        let mut current = Some(frame);
        while let Some(index) = current {
            if self.frames[index].scope.id() == el.id() {
                return true;
            }
            current = self.frames[index].parent;
        }
        false
    }

    // Children always sit at higher indices than their parent.
    fn assemble<S: ItemSyntax>(self, base: &Url) -> Value {
        let mut built: Vec<Option<Value>> = vec![None; self.frames.len()];
        for (index, frame) in self.frames.into_iter().enumerate().rev() {
            let mut properties = Vec::new();
            for (names, slot) in frame.entries {
                let value = match slot {
                    Slot::Value(value) => value,
                    Slot::Item(child) => built[child].take().unwrap_or_default(),
                };
                for name in names.split_whitespace() {
                    properties.push((name, value.clone()));
                }
            }
            built[index] = Some(S::finish(frame.scope, base, properties));
        }
        built.into_iter().next().flatten().unwrap_or_default()
    }
}

struct Microdata;

impl ItemSyntax for Microdata {
    const NAME: &'static str = "microdata";

    fn is_scope(element: &Element) -> bool {
        element.attr("itemscope").is_some()
    }

    fn property_names(element: &Element) -> Option<&str> {
        element.attr("itemprop")
    }

    fn leaf_value(el: ElementRef<'_>, base: &Url) -> Value {
        microdata_value(el, base)
    }

    fn references<'a>(doc: &'a Html, scope: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        let Some(refs) = scope.value().attr("itemref") else {
            return Vec::new();
        };
        refs.split_whitespace()
            .filter_map(|id| {
                doc.root_element()
                    .descendants()
                    .filter_map(ElementRef::wrap)
                    .find(|el| el.value().id() == Some(id))
            })
            .collect()
    }

    fn finish(scope: ElementRef<'_>, base: &Url, properties: Vec<(&str, Value)>) -> Value {
        let element = scope.value();
        let mut item = Map::new();
        if let Some(types) = element.attr("itemtype").and_then(type_value) {
            item.insert("type".to_string(), types);
        }
        if let Some(id) = element.attr("itemid") {
            item.insert("id".to_string(), resolve(base, id));
        }
        let mut props = Map::new();
        for (name, value) in properties {
            push_property(&mut props, name, value);
        }
        item.insert("properties".to_string(), Value::Object(props));
        Value::Object(item)
    }
}

fn microdata(doc: &Html, base: &Url) -> Result<Vec<Value>, ExtractionError> {
    doc.select(selector(&ITEMSCOPE, "[itemscope]"))
        .filter(|el| el.value().attr("itemprop").is_none())
        .map(|el| ItemWalker::walk::<Microdata>(doc, el, base))
        .collect()
}

fn microdata_value(el: ElementRef<'_>, base: &Url) -> Value {
    let element = el.value();
    if let Some(content) = element.attr("content") {
        return Value::String(content.to_string());
    }
    let attr = match element.name() {
        "audio" | "embed" | "iframe" | "img" | "source" | "track" | "video" => Some(("src", true)),
        "a" | "area" | "link" => Some(("href", true)),
        "object" => Some(("data", true)),
        "data" | "meter" => Some(("value", false)),
        "time" => Some(("datetime", false)),
        _ => None,
    };
    match attr.and_then(|(name, is_url)| element.attr(name).map(|v| (v, is_url))) {
        Some((value, true)) => resolve(base, value),
        Some((value, false)) => Value::String(value.to_string()),
        None => text_value(el),
    }
}

struct Rdfa;

impl ItemSyntax for Rdfa {
    const NAME: &'static str = "RDFa";

    fn is_scope(element: &Element) -> bool {
        element.attr("typeof").is_some()
    }

    fn property_names(element: &Element) -> Option<&str> {
        element.attr("property")
    }

    fn leaf_value(el: ElementRef<'_>, base: &Url) -> Value {
        let element = el.value();
        if let Some(content) = element.attr("content") {
            Value::String(content.to_string())
        } else if let Some(href) = element
            .attr("href")
            .or_else(|| element.attr("src"))
            .or_else(|| element.attr("resource"))
        {
            resolve(base, href)
        } else if let Some(datetime) = element.attr("datetime") {
            Value::String(datetime.to_string())
        } else {
            text_value(el)
        }
    }

    fn finish(scope: ElementRef<'_>, base: &Url, properties: Vec<(&str, Value)>) -> Value {
        let element = scope.value();
        let mut item = Map::new();
        if let Some(vocab) = rdfa_vocab(scope) {
            item.insert("@context".to_string(), Value::String(vocab));
        }
        if let Some(types) = element.attr("typeof").and_then(type_value) {
            item.insert("@type".to_string(), types);
        }
        if let Some(id) = element.attr("resource").or_else(|| element.attr("about")) {
            item.insert("@id".to_string(), resolve(base, id));
        }
        for (name, value) in properties {
            push_property(&mut item, name, value);
        }
        Value::Object(item)
    }
}

fn rdfa(doc: &Html, base: &Url) -> Result<Vec<Value>, ExtractionError> {
    doc.select(selector(&TYPEOF, "[typeof]"))
        .filter(|el| {
            !el.ancestors()
                .filter_map(ElementRef::wrap)
                .any(|a| a.value().attr("typeof").is_some())
        })
        .map(|el| ItemWalker::walk::<Rdfa>(doc, el, base))
        .collect()
}

fn rdfa_vocab(el: ElementRef<'_>) -> Option<String> {
    std::iter::once(el)
        .chain(el.ancestors().filter_map(ElementRef::wrap))
        .find_map(|e| e.value().attr("vocab").map(str::to_string))
}

fn opengraph(doc: &Html) -> Vec<Value> {
    let mut namespace = Map::new();
    let mut properties = Vec::new();
    for meta in doc.select(selector(&META_PROPERTY, "meta[property]")) {
        let element = meta.value();
        let (Some(property), Some(content)) = (element.attr("property"), element.attr("content"))
        else {
            continue;
        };
        let Some((prefix, _)) = property.split_once(':') else {
            continue;
        };
        let Some((_, ns)) = OPENGRAPH_NAMESPACES.iter().find(|(p, _)| *p == prefix) else {
            continue;
        };
        namespace.insert(prefix.to_string(), Value::String(ns.to_string()));
        properties.push(Value::Array(vec![
            Value::String(property.to_string()),
            Value::String(content.trim().to_string()),
        ]));
    }
    if properties.is_empty() {
        return Vec::new();
    }
    let mut group = Map::new();
    group.insert("namespace".to_string(), Value::Object(namespace));
    group.insert("properties".to_string(), Value::Array(properties));
    vec![Value::Object(group)]
}
