#![forbid(unsafe_code)]

//! URI dereferencing for XML-DSig references.
//!
//! Handles:
//! - Empty URI (`""`): the whole document without comments
//! - `#xpointer(/)`: the whole document with comments
//! - `#xpointer(id('x'))`: the element subtree with comments
//! - `#x`: the element subtree without comments

use xsig_core::Error;
use xsig_xml::document::IdMap;
use xsig_xml::{xpath, NodeSet};

/// Resolve a same-document URI to the node set it selects.
pub fn dereference(
    doc: &roxmltree::Document<'_>,
    id_map: &IdMap,
    uri: &str,
) -> Result<NodeSet, Error> {
    if uri.is_empty() {
        return Ok(NodeSet::all_without_comments(doc));
    }
    let Some(fragment) = xpath::parse_same_document_ref(uri) else {
        return Err(Error::XmlStructure(format!(
            "external reference URI not supported: {uri}"
        )));
    };
    if fragment == "xpointer(/)" {
        return Ok(NodeSet::all(doc));
    }
    if let Some(id) = xpath::parse_xpointer_id(fragment) {
        let node = xpath::resolve_id(doc, id_map, id)?;
        return Ok(NodeSet::tree_with_comments(node));
    }
    let node = xpath::resolve_id(doc, id_map, fragment)?;
    Ok(NodeSet::tree_without_comments(node))
}
