#![forbid(unsafe_code)]

//! Inclusive Canonical XML 1.0 (C14N 1.0).
//!
//! Algorithm URI: `http://www.w3.org/TR/2001/REC-xml-c14n-20010315`
//! With comments: `http://www.w3.org/TR/2001/REC-xml-c14n-20010315#WithComments`
//!
//! The canonical form:
//! - Outputs namespace declarations sorted by prefix (default first)
//! - Outputs attributes sorted by (namespace-URI, local-name)
//! - Escapes text and attribute values per C14N rules
//! - Optionally preserves or strips comments
//! - Supports document-subset canonicalization via NodeSet

use crate::escape;
use crate::render::{Attr, NsDecl};
use std::collections::BTreeMap;
use xsig_core::{ns, Error};
use xsig_xml::document::element_qname;
use xsig_xml::NodeSet;

/// Canonicalize a document using Inclusive C14N 1.0.
pub fn canonicalize(
    doc: &roxmltree::Document<'_>,
    with_comments: bool,
    node_set: Option<&NodeSet>,
) -> Result<Vec<u8>, Error> {
    let mut output = Vec::new();
    let ctx = C14nContext {
        doc,
        with_comments,
        node_set,
    };
    ctx.process_node(doc.root(), &mut output, &BTreeMap::new());
    Ok(output)
}

struct C14nContext<'a, 'input> {
    doc: &'a roxmltree::Document<'input>,
    with_comments: bool,
    node_set: Option<&'a NodeSet>,
}

impl C14nContext<'_, '_> {
    fn is_visible(&self, node: &roxmltree::Node<'_, '_>) -> bool {
        self.node_set.map_or(true, |ns| ns.contains(node))
    }

    fn process_node(
        &self,
        node: roxmltree::Node<'_, '_>,
        output: &mut Vec<u8>,
        inherited_ns: &BTreeMap<String, String>,
    ) {
        match node.node_type() {
            roxmltree::NodeType::Root => {
                for child in node.children() {
                    self.process_node(child, output, inherited_ns);
                }
            }
            roxmltree::NodeType::Element => self.process_element(node, output, inherited_ns),
            roxmltree::NodeType::Text => {
                if self.is_visible(&node) {
                    let text = node.text().unwrap_or("");
                    output.extend_from_slice(escape::escape_text(text).as_bytes());
                }
            }
            roxmltree::NodeType::Comment => {
                if self.with_comments && self.is_visible(&node) {
                    crate::write_top_level_aware(&node, output, &crate::comment_bytes(&node));
                }
            }
            roxmltree::NodeType::PI => {
                if self.is_visible(&node) {
                    crate::write_top_level_aware(&node, output, &crate::pi_bytes(&node));
                }
            }
        }
    }

    fn process_element(
        &self,
        node: roxmltree::Node<'_, '_>,
        output: &mut Vec<u8>,
        inherited_ns: &BTreeMap<String, String>,
    ) {
        if !self.is_visible(&node) {
            // Children of an element outside the node set are rendered
            // against the nearest visible ancestor's namespace context.
            for child in node.children() {
                self.process_node(child, output, inherited_ns);
            }
            return;
        }

        let current_ns = collect_inscope_namespaces(&node);

        // Output a namespace declaration when it is new or differs from
        // the nearest rendered ancestor. xmlns:xml is never output.
        let mut ns_decls: Vec<NsDecl> = current_ns
            .iter()
            .filter(|(prefix, _)| prefix.as_str() != "xml")
            .filter(|(prefix, uri)| inherited_ns.get(prefix.as_str()) != Some(*uri))
            .map(|(prefix, uri)| NsDecl::new(prefix.as_str(), uri.as_str()))
            .collect();

        // The nearest rendered ancestor had a default namespace that is
        // not in scope here: undeclare it.
        if inherited_ns.get("").is_some_and(|d| !d.is_empty()) && !current_ns.contains_key("") {
            ns_decls.push(NsDecl::new("", ""));
        }
        ns_decls.sort();

        let mut attrs: Vec<Attr> = node
            .attributes()
            .map(|attr| Attr {
                ns_uri: attr.namespace().unwrap_or("").to_owned(),
                local_name: attr.name().to_owned(),
                qualified_name: crate::attr_qname(self.doc, &attr),
                value: attr.value().to_owned(),
            })
            .collect();

        // xml:* attributes are inherited only when the element is visible
        // but its parent element is not.
        if self.node_set.is_some() {
            let parent_not_visible = node
                .parent()
                .map_or(true, |p| !p.is_element() || !self.is_visible(&p));
            if parent_not_visible {
                let extra = collect_inherited_xml_attrs(&node, &attrs);
                attrs.extend(extra);
            }
        }
        attrs.sort();

        let elem_name = element_qname(&node);

        output.push(b'<');
        output.extend_from_slice(elem_name.as_bytes());
        for ns_decl in &ns_decls {
            output.extend_from_slice(ns_decl.render().as_bytes());
        }
        for attr in &attrs {
            output.extend_from_slice(attr.render().as_bytes());
        }
        output.push(b'>');

        // A rendered element carries its whole in-scope namespace context
        // down to its children.
        let mut child_ns = current_ns;
        child_ns.remove("xml");

        for child in node.children() {
            self.process_node(child, output, &child_ns);
        }

        output.extend_from_slice(b"</");
        output.extend_from_slice(elem_name.as_bytes());
        output.push(b'>');
    }
}

/// For document-subset canonicalization: collect xml:* attributes inherited
/// from ancestors, nearest ancestor first, skipping any already present on
/// the element itself.
fn collect_inherited_xml_attrs(node: &roxmltree::Node<'_, '_>, existing_attrs: &[Attr]) -> Vec<Attr> {
    let mut inherited_xml: BTreeMap<String, String> = BTreeMap::new();

    for ancestor in node.ancestors().skip(1).filter(|a| a.is_element()) {
        for attr in ancestor.attributes() {
            if attr.namespace() == Some(ns::XML) {
                inherited_xml
                    .entry(attr.name().to_owned())
                    .or_insert_with(|| attr.value().to_owned());
            }
        }
    }

    inherited_xml
        .into_iter()
        .filter(|(name, _)| {
            !existing_attrs
                .iter()
                .any(|a| a.ns_uri == ns::XML && a.local_name == *name)
        })
        .map(|(name, value)| Attr {
            ns_uri: ns::XML.to_owned(),
            qualified_name: format!("xml:{name}"),
            local_name: name,
            value,
        })
        .collect()
}

/// Collect all in-scope namespaces for an element.
///
/// roxmltree already reports inherited bindings on every element; an empty
/// URI marks an undeclared default namespace and is dropped.
pub(crate) fn collect_inscope_namespaces(
    node: &roxmltree::Node<'_, '_>,
) -> BTreeMap<String, String> {
    node.namespaces()
        .filter(|ns| !ns.uri().is_empty())
        .map(|ns| (ns.name().unwrap_or("").to_owned(), ns.uri().to_owned()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c14n(xml: &str) -> String {
        let doc = roxmltree::Document::parse(xml).unwrap();
        String::from_utf8(canonicalize(&doc, false, None).unwrap()).unwrap()
    }

    #[test]
    fn sorts_attributes() {
        assert_eq!(
            c14n(r#"<root><a b="1" a="2"/></root>"#),
            r#"<root><a a="2" b="1"></a></root>"#
        );
    }

    #[test]
    fn renders_namespaces_once() {
        let out = c14n(r#"<root xmlns:b="http://b" xmlns:a="http://a"><a:child/></root>"#);
        assert_eq!(
            out,
            r#"<root xmlns:a="http://a" xmlns:b="http://b"><a:child></a:child></root>"#
        );
    }

    #[test]
    fn escapes_text() {
        assert_eq!(
            c14n(r#"<root>a &amp; b &lt; c &gt; d</root>"#),
            "<root>a &amp; b &lt; c &gt; d</root>"
        );
    }

    #[test]
    fn undeclares_default_namespace() {
        assert_eq!(
            c14n(r#"<a xmlns="urn:d"><b xmlns=""><c/></b></a>"#),
            r#"<a xmlns="urn:d"><b xmlns=""><c></c></b></a>"#
        );
    }

    #[test]
    fn subset_inherits_xml_attributes() {
        let xml = r#"<a xml:lang="en"><b id="1">t</b></a>"#;
        let doc = roxmltree::Document::parse(xml).unwrap();
        let b = doc.descendants().find(|n| n.has_tag_name("b")).unwrap();
        let set = NodeSet::tree_without_comments(b);
        let out = canonicalize(&doc, false, Some(&set)).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            r#"<b id="1" xml:lang="en">t</b>"#
        );
    }
}
