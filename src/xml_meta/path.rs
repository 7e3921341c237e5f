//! Element path lookups over a parsed XML tree
//!
//! Paths are `/`-separated local names relative to a context node; `*`
//! matches any element. Namespaces are ignored, which lets the same lookup
//! read `gmd:title/gco:CharacterString` and plain `title` alike.

use roxmltree::Node;

/// All elements reached by `path` from `node`, in document order
pub(crate) fn select<'a, 'input>(node: Node<'a, 'input>, path: &str) -> Vec<Node<'a, 'input>> {
    let mut current = vec![node];
    for step in path.split('/').filter(|s| !s.is_empty()) {
        current = current
            .into_iter()
            .flat_map(|n| n.children())
            .filter(|c| c.is_element() && (step == "*" || c.tag_name().name() == step))
            .collect();
    }
    current
}

/// First element reached by `path`
pub(crate) fn first<'a, 'input>(node: Node<'a, 'input>, path: &str) -> Option<Node<'a, 'input>> {
    select(node, path).into_iter().next()
}

/// Trimmed text of the first non-empty element reached by `path`
pub(crate) fn text(node: Node<'_, '_>, path: &str) -> Option<String> {
    select(node, path).into_iter().find_map(node_text)
}

/// Trimmed, non-empty texts of every element reached by `path`
pub(crate) fn texts(node: Node<'_, '_>, path: &str) -> Vec<String> {
    select(node, path).into_iter().filter_map(node_text).collect()
}

/// Attribute `name` of the first element reached by `path`
pub(crate) fn attr(node: Node<'_, '_>, path: &str, name: &str) -> Option<String> {
    first(node, path)
        .and_then(|n| n.attribute(name))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Every element named `name` anywhere below `node`
pub(crate) fn descendants<'a, 'input>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.descendants()
        .filter(move |n| n.is_element() && n.tag_name().name() == name)
}

/// All descendant text of `node`, trimmed; `None` when blank
pub(crate) fn node_text(node: Node<'_, '_>) -> Option<String> {
    let joined: String = node
        .descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect();
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
