//! Page metadata extraction
//!
//! Pulls the `<title>` text and every named `<meta>` tag out of an HTML page
//! into a flat name/content map.

use scraper::{Html, Selector};
use std::collections::BTreeMap;
use tracing::debug;

/// Key under which the page title is stored
pub const TITLE_KEY: &str = "title";

/// Extract `<title>` and `<meta name=.. content=..>` pairs.
///
/// Meta content is trimmed; tags with an empty name or empty trimmed content
/// are skipped. A later tag with the same name replaces an earlier one, and a
/// meta tag named `title` replaces the page title.
pub fn meta_scraper(html_content: &str) -> BTreeMap<String, String> {
    let doc = Html::parse_document(html_content);
    let mut meta_content = BTreeMap::new();

    if let Some(title) = doc.select(title_selector()).next() {
        meta_content.insert(TITLE_KEY.to_string(), title.text().collect::<String>());
    }

    for meta in doc.select(meta_selector()) {
        let element = meta.value();
        let Some(name) = element.attr("name").filter(|n| !n.is_empty()) else {
            continue;
        };
        let Some(content) = element.attr("content").map(str::trim) else {
            continue;
        };
        if content.is_empty() {
            continue;
        }
        meta_content.insert(name.to_string(), content.to_string());
    }

    debug!(entries = meta_content.len(), "scraped meta content");
    meta_content
}

fn title_selector() -> &'static Selector {
    static SELECTOR: std::sync::OnceLock<Selector> = std::sync::OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse("title").expect("static selector parses"))
}

fn meta_selector() -> &'static Selector {
    static SELECTOR: std::sync::OnceLock<Selector> = std::sync::OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse("meta").expect("static selector parses"))
}
