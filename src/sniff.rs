//! Content classification by trial parsing
//!
//! The response `Content-Type` header is not consulted. A body is tried as
//! HTML first; if it holds any element it is then tried as strict XML, so
//! well-formed XHTML lands on `xml` rather than `html`. A body without any
//! element is tried as JSON and otherwise stays `UNKNOWN`.

use crate::model::ContentKind;
use regex::Regex;
use roxmltree::{Document, ParsingOptions};
use scraper::Html;
use std::sync::OnceLock;

/// Classify a 200 response body
pub fn classify(body: &str) -> ContentKind {
    if has_html_element(body) {
        if is_well_formed_xml(body) {
            ContentKind::Xml
        } else {
            ContentKind::Html
        }
    } else if is_json(body) {
        ContentKind::Json
    } else {
        ContentKind::Unknown
    }
}

/// Whether an HTML parse of `body` finds at least one element
pub fn has_html_element(body: &str) -> bool {
    // Fragment parsing drops document-level tags, so those are checked
    // against the raw text.
    if document_tag_re().is_match(body) {
        return true;
    }
    let fragment = Html::parse_fragment(body);
    let root = fragment.root_element();
    root.descendants()
        .skip(1)
        .any(|node| node.value().is_element())
}

/// Whether `body` parses as a well-formed XML document
pub fn is_well_formed_xml(body: &str) -> bool {
    Document::parse_with_options(body, xml_options()).is_ok()
}

/// Whether `body` parses as JSON
pub fn is_json(body: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(body).is_ok()
}

/// XML options shared by classification and metadata parsing
pub(crate) fn xml_options() -> ParsingOptions {
    ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    }
}

fn document_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)<(?:html|head|body)(?:[\s/>]|$)").expect("static pattern compiles")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xhtml_wins_over_html() {
        let body = r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml"><head><title>T</title></head><body><p>x</p></body></html>"#;
        assert_eq!(classify(body), ContentKind::Xml);
    }

    #[test]
    fn test_plain_html() {
        let body = "<!DOCTYPE html><html><head><title>T</title><meta charset=utf-8></head><body><p>one<br>two</body></html>";
        assert_eq!(classify(body), ContentKind::Html);
    }

    #[test]
    fn test_xhtml_with_doctype_is_xml() {
        let body = r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Strict//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd">
<html xmlns="http://www.w3.org/1999/xhtml"><head><title>T</title></head><body/></html>"#;
        assert_eq!(classify(body), ContentKind::Xml);
    }

    #[test]
    fn test_undefined_entity_falls_back_to_html() {
        let body = "<html><body><p>a&nbsp;b</p></body></html>";
        assert_eq!(classify(body), ContentKind::Html);
    }

    #[test]
    fn test_metadata_xml() {
        let body = "<metadata><idinfo><citation/></idinfo></metadata>";
        assert_eq!(classify(body), ContentKind::Xml);
    }

    #[test]
    fn test_json_body() {
        assert_eq!(classify(r#"{"id": "abc", "tags": [1, 2]}"#), ContentKind::Json);
        assert_eq!(classify("[1, 2, 3]"), ContentKind::Json);
    }

    #[test]
    fn test_json_carrying_markup_is_html() {
        let body = r#"{"description": "<b>bold</b> claim"}"#;
        assert_eq!(classify(body), ContentKind::Html);
    }

    #[test]
    fn test_unknown_text() {
        assert_eq!(classify("just some words"), ContentKind::Unknown);
        assert_eq!(classify(""), ContentKind::Unknown);
        assert_eq!(classify("a < b and c > d"), ContentKind::Unknown);
    }

    #[test]
    fn test_empty_document_shell_counts_as_html() {
        assert!(has_html_element("<html></html>"));
        assert!(has_html_element("<BODY>"));
        assert!(!has_html_element("<htmlish text"));
    }
}
