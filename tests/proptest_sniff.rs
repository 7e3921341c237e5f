//! Property-based tests for content classification and meta scraping.
//!
//! The classifier is an ordered trial parse; these properties pin the order
//! down across generated bodies.

use proptest::prelude::*;
use sciencebase_weblinks::sniff::classify;
use sciencebase_weblinks::{meta_scraper, ContentKind};
use serde_json::Value;

// ============================================================================
// STRATEGIES
// ============================================================================

/// Text that cannot open a tag or an entity
fn arb_plain_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ,.]{0,40}"
}

/// JSON values whose strings carry no markup
fn arb_json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| Value::Number(n.into())),
        arb_plain_text().prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 24, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map("[a-z_]{1,10}", inner, 0..6)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

/// Well-formed XHTML page around generated text
fn arb_xhtml_page() -> impl Strategy<Value = String> {
    (arb_plain_text(), arb_plain_text()).prop_map(|(title, para)| {
        format!(
            r#"<html xmlns="http://www.w3.org/1999/xhtml"><head><title>{title}</title></head><body><p>{para}</p></body></html>"#
        )
    })
}

// ============================================================================
// CLASSIFICATION LAWS
// ============================================================================

proptest! {
    #[test]
    fn prop_markup_free_json_is_json(value in arb_json_value()) {
        let body = serde_json::to_string(&value).unwrap();
        prop_assert_eq!(classify(&body), ContentKind::Json);
    }

    #[test]
    fn prop_pretty_json_is_json(value in arb_json_value()) {
        let body = serde_json::to_string_pretty(&value).unwrap();
        prop_assert_eq!(classify(&body), ContentKind::Json);
    }

    #[test]
    fn prop_prose_is_unknown(text in arb_plain_text()) {
        // A leading word keeps the body from being a bare JSON number.
        let body = format!("note {text}");
        prop_assert_eq!(classify(&body), ContentKind::Unknown);
    }

    #[test]
    fn prop_xhtml_is_xml(page in arb_xhtml_page()) {
        prop_assert_eq!(classify(&page), ContentKind::Xml);
    }

    #[test]
    fn prop_void_element_breaks_xml(page in arb_xhtml_page()) {
        let body = page.replace("<p>", "<p><br>");
        prop_assert_eq!(classify(&body), ContentKind::Html);
    }
}

// ============================================================================
// META SCRAPER LAWS
// ============================================================================

proptest! {
    #[test]
    fn prop_meta_content_is_trimmed(
        name in "[a-z]{1,12}",
        content in "[a-zA-Z0-9]{1,20}",
        pad in " {0,4}",
    ) {
        let html = format!(
            r#"<html><head><meta name="{name}" content="{pad}{content}{pad}"></head></html>"#
        );
        let meta = meta_scraper(&html);
        prop_assert_eq!(meta.get(&name).map(String::as_str), Some(content.as_str()));
    }

    #[test]
    fn prop_blank_meta_content_is_skipped(name in "[a-z]{1,12}", pad in " {0,4}") {
        let html = format!(r#"<html><head><meta name="{name}" content="{pad}"></head></html>"#);
        prop_assert!(meta_scraper(&html).is_empty());
    }

    #[test]
    fn prop_last_duplicate_wins(
        name in "[a-z]{1,12}",
        first in "[a-z]{1,8}",
        second in "[a-z]{1,8}",
    ) {
        let html = format!(
            r#"<html><head><meta name="{name}" content="{first}"><meta name="{name}" content="{second}"></head></html>"#
        );
        let meta = meta_scraper(&html);
        prop_assert_eq!(meta.get(&name).map(String::as_str), Some(second.as_str()));
    }
}
