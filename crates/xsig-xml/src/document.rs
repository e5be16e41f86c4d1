#![forbid(unsafe_code)]

//! XML document wrapper over roxmltree with ID lookup and prefix recovery.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use xsig_core::Error;

/// Default maximum document size accepted by [`XmlDocument::parse`].
pub const DEFAULT_MAX_SIZE: usize = 16 * 1024 * 1024;

/// Attribute names treated as element IDs for same-document references.
pub const ID_ATTRS: [&str; 3] = ["Id", "ID", "id"];

/// An owned XML document.  Stores the text and pre-computed metadata.
///
/// To work with the parsed tree, call [`XmlDocument::parse_doc`] which
/// returns a temporary `roxmltree::Document` borrowing from the text.
#[derive(Debug, Clone)]
pub struct XmlDocument {
    text: String,
}

impl XmlDocument {
    /// Parse and validate XML from a string, taking ownership.
    pub fn parse(text: String) -> Result<Self, Error> {
        Self::parse_with_limit(text, DEFAULT_MAX_SIZE)
    }

    /// Parse and validate XML, rejecting input larger than `max_size` bytes.
    pub fn parse_with_limit(text: String, max_size: usize) -> Result<Self, Error> {
        if text.len() > max_size {
            log::debug!("rejecting {} byte document (limit {max_size})", text.len());
            return Err(Error::XmlParse(format!(
                "document of {} bytes exceeds the {max_size} byte limit",
                text.len()
            )));
        }
        // Validate that the XML parses successfully.
        let _doc = crate::parse(&text)?;
        Ok(Self { text })
    }

    /// Get the raw XML text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Consume the document, returning its text.
    pub fn into_text(self) -> String {
        self.text
    }

    /// Parse the document and return a temporary `roxmltree::Document`.
    pub fn parse_doc(&self) -> Result<roxmltree::Document<'_>, Error> {
        crate::parse(&self.text)
    }
}

/// Element IDs of a parsed document.
///
/// An ID carried by more than one element is remembered as ambiguous and
/// never resolves, so a reference cannot be redirected by a second element
/// reusing the ID.
#[derive(Debug, Clone, Default)]
pub struct IdMap {
    ids: HashMap<String, roxmltree::NodeId>,
    duplicates: HashSet<String>,
}

impl IdMap {
    /// The element carrying `id`, `None` if no element does, or a
    /// `StateError` when several elements do.
    pub fn get(&self, id: &str) -> Result<Option<roxmltree::NodeId>, Error> {
        if self.duplicates.contains(id) {
            return Err(Error::State(format!("duplicate id {id}")));
        }
        Ok(self.ids.get(id).copied())
    }
}

/// Collect the `Id`/`ID`/`id` attributes of every element.
pub fn build_id_map(doc: &roxmltree::Document<'_>) -> IdMap {
    let mut map = IdMap::default();
    for node in doc.descendants().filter(|n| n.is_element()) {
        for attr_name in &ID_ATTRS {
            let Some(val) = node.attribute(*attr_name) else {
                continue;
            };
            match map.ids.entry(val.to_owned()) {
                Entry::Vacant(e) => {
                    e.insert(node.id());
                }
                Entry::Occupied(e) if *e.get() != node.id() => {
                    log::debug!("id {val} appears on more than one element");
                    map.duplicates.insert(val.to_owned());
                }
                Entry::Occupied(_) => {}
            }
        }
    }
    map
}

/// Find the first child element with the given local name and namespace.
pub fn find_child_element<'a, 'input>(
    node: roxmltree::Node<'a, 'input>,
    ns: &str,
    local_name: &str,
) -> Option<roxmltree::Node<'a, 'input>> {
    node.children().find(|n| is_named(n, ns, local_name))
}

/// Find all child elements with the given local name and namespace.
pub fn find_child_elements<'a, 'input>(
    node: roxmltree::Node<'a, 'input>,
    ns: &str,
    local_name: &str,
) -> Vec<roxmltree::Node<'a, 'input>> {
    node.children()
        .filter(|n| is_named(n, ns, local_name))
        .collect()
}

/// Whether `node` is an element with the given namespace and local name.
pub fn is_named(node: &roxmltree::Node<'_, '_>, ns: &str, local_name: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == local_name
        && node.tag_name().namespace().unwrap_or("") == ns
}

/// The element's qualified name exactly as written in the source text.
pub fn element_qname<'input>(node: &roxmltree::Node<'_, 'input>) -> &'input str {
    let text = node.document().input_text();
    let start = node.range().start + 1;
    let rest = &text[start..];
    let end = rest
        .find(|c: char| c.is_ascii_whitespace() || c == '/' || c == '>')
        .unwrap_or(rest.len());
    &rest[..end]
}

/// The element's namespace prefix as written, if any.
pub fn element_prefix<'input>(node: &roxmltree::Node<'_, 'input>) -> Option<&'input str> {
    element_qname(node).split_once(':').map(|(p, _)| p)
}

/// The attribute's qualified name exactly as written in the source text.
pub fn attribute_qname<'input>(
    doc: &roxmltree::Document<'input>,
    attr: &roxmltree::Attribute<'_, 'input>,
) -> &'input str {
    &doc.input_text()[attr.range_qname()]
}

/// The attribute's namespace prefix as written, if any.
pub fn attribute_prefix<'input>(
    doc: &roxmltree::Document<'input>,
    attr: &roxmltree::Attribute<'_, 'input>,
) -> Option<&'input str> {
    attribute_qname(doc, attr).split_once(':').map(|(p, _)| p)
}
