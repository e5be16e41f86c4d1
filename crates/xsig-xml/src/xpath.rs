#![forbid(unsafe_code)]

//! Minimal XPath subset for XML-DSig processing.
//!
//! Only supports the patterns actually used by enveloped signatures:
//! - Same-document URI references: `#id-value`
//! - `xpointer(id('...'))` and `xpointer(/)`
//! - The ancestor-or-self axis (which signature a reference envelops)

use crate::document::IdMap;
use xsig_core::Error;

/// Parse a same-document reference (e.g., `#foo` → `foo`).
pub fn parse_same_document_ref(uri: &str) -> Option<&str> {
    uri.strip_prefix('#')
}

/// Resolve an ID value in a parsed document using a pre-built ID map.
/// An ID shared by several elements is a `StateError`.
pub fn resolve_id<'a, 'input>(
    doc: &'a roxmltree::Document<'input>,
    id_map: &IdMap,
    id: &str,
) -> Result<roxmltree::Node<'a, 'input>, Error> {
    id_map
        .get(id)?
        .and_then(|nid| doc.get_node(nid))
        .ok_or_else(|| Error::XmlStructure(format!("ID not found: {id}")))
}

/// Parse an `xpointer(id('...'))` expression and return the ID value.
pub fn parse_xpointer_id(expr: &str) -> Option<&str> {
    let inner = expr.strip_prefix("xpointer(id('")?;
    inner.strip_suffix("'))")
}

/// Check if `ancestor` is an ancestor-or-self of `node`.
pub fn is_ancestor_or_self(
    ancestor: roxmltree::Node<'_, '_>,
    node: roxmltree::Node<'_, '_>,
) -> bool {
    let mut current = Some(node);
    while let Some(n) = current {
        if n.id() == ancestor.id() {
            return true;
        }
        current = n.parent();
    }
    false
}
