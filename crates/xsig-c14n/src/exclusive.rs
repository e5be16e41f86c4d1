#![forbid(unsafe_code)]

//! Exclusive Canonical XML 1.0 (exc-C14N).
//!
//! Algorithm URI: `http://www.w3.org/2001/10/xml-exc-c14n#`
//! With comments: `http://www.w3.org/2001/10/xml-exc-c14n#WithComments`
//!
//! The key difference from inclusive C14N: only "visibly utilized" namespace
//! declarations are output.  A namespace is visibly utilized if:
//! 1. Its prefix is used by the element's tag name, OR
//! 2. Its prefix is used by one of the element's attributes, OR
//! 3. The prefix appears in the InclusiveNamespaces PrefixList.

use crate::escape;
use crate::inclusive::collect_inscope_namespaces;
use crate::render::{Attr, NsDecl};
use std::collections::{BTreeMap, BTreeSet};
use xsig_core::{ns, Error};
use xsig_xml::document::{attribute_prefix, element_prefix, element_qname};
use xsig_xml::NodeSet;

/// Canonicalize using Exclusive C14N 1.0.
pub fn canonicalize(
    doc: &roxmltree::Document<'_>,
    with_comments: bool,
    node_set: Option<&NodeSet>,
    inclusive_prefixes: &[String],
) -> Result<Vec<u8>, Error> {
    // "#default" in the PrefixList means the default namespace.
    let inclusive_prefixes = inclusive_prefixes
        .iter()
        .map(|p| if p == "#default" { String::new() } else { p.clone() })
        .collect();
    let mut output = Vec::new();
    let ctx = ExcC14nContext {
        doc,
        with_comments,
        node_set,
        inclusive_prefixes,
    };
    ctx.process_node(doc.root(), &mut output, &BTreeMap::new());
    Ok(output)
}

struct ExcC14nContext<'a, 'input> {
    doc: &'a roxmltree::Document<'input>,
    with_comments: bool,
    node_set: Option<&'a NodeSet>,
    inclusive_prefixes: BTreeSet<String>,
}

impl ExcC14nContext<'_, '_> {
    fn is_visible(&self, node: &roxmltree::Node<'_, '_>) -> bool {
        self.node_set.map_or(true, |ns| ns.contains(node))
    }

    fn process_node(
        &self,
        node: roxmltree::Node<'_, '_>,
        output: &mut Vec<u8>,
        rendered_ns: &BTreeMap<String, String>,
    ) {
        match node.node_type() {
            roxmltree::NodeType::Root => {
                for child in node.children() {
                    self.process_node(child, output, rendered_ns);
                }
            }
            roxmltree::NodeType::Element => self.process_element(node, output, rendered_ns),
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

    /// Prefixes visibly utilized by an element, plus the PrefixList.
    fn utilized_prefixes(&self, node: &roxmltree::Node<'_, '_>) -> BTreeSet<String> {
        let mut utilized = self.inclusive_prefixes.clone();
        utilized.insert(element_prefix(node).unwrap_or("").to_owned());
        for attr in node.attributes() {
            if attr.namespace().is_some() && attr.namespace() != Some(ns::XML) {
                if let Some(prefix) = attribute_prefix(self.doc, &attr) {
                    utilized.insert(prefix.to_owned());
                }
            }
        }
        utilized
    }

    fn process_element(
        &self,
        node: roxmltree::Node<'_, '_>,
        output: &mut Vec<u8>,
        rendered_ns: &BTreeMap<String, String>,
    ) {
        if !self.is_visible(&node) {
            // Namespace declarations are only rendered on visible start tags.
            for child in node.children() {
                self.process_node(child, output, rendered_ns);
            }
            return;
        }

        let inscope_ns = collect_inscope_namespaces(&node);

        let mut ns_decls: Vec<NsDecl> = Vec::new();
        for prefix in self.utilized_prefixes(&node) {
            if prefix == "xml" {
                continue;
            }
            match inscope_ns.get(&prefix) {
                Some(uri) => {
                    if rendered_ns.get(&prefix) != Some(uri) {
                        ns_decls.push(NsDecl::new(prefix, uri.as_str()));
                    }
                }
                // The default namespace is not in scope here but an output
                // ancestor rendered one: undeclare it.
                None if prefix.is_empty() => {
                    if rendered_ns.get("").is_some_and(|d| !d.is_empty()) {
                        ns_decls.push(NsDecl::new("", ""));
                    }
                }
                None => {}
            }
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

        let mut child_rendered_ns = rendered_ns.clone();
        for ns_decl in ns_decls {
            child_rendered_ns.insert(ns_decl.prefix, ns_decl.uri);
        }

        for child in node.children() {
            self.process_node(child, output, &child_rendered_ns);
        }

        output.extend_from_slice(b"</");
        output.extend_from_slice(elem_name.as_bytes());
        output.push(b'>');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exc(xml: &str, prefixes: &[&str]) -> String {
        let doc = roxmltree::Document::parse(xml).unwrap();
        let prefixes: Vec<String> = prefixes.iter().map(|p| p.to_string()).collect();
        String::from_utf8(canonicalize(&doc, false, None, &prefixes).unwrap()).unwrap()
    }

    #[test]
    fn drops_unused_namespaces() {
        assert_eq!(
            exc(r#"<a:r xmlns:a="urn:a" xmlns:b="urn:b"><c/></a:r>"#, &[]),
            r#"<a:r xmlns:a="urn:a"><c></c></a:r>"#
        );
    }

    #[test]
    fn renders_namespace_where_first_used() {
        assert_eq!(
            exc(r#"<r xmlns:b="urn:b"><x><b:y b:k="1"/></x></r>"#, &[]),
            r#"<r><x><b:y xmlns:b="urn:b" b:k="1"></b:y></x></r>"#
        );
    }

    #[test]
    fn prefix_list_forces_declaration() {
        assert_eq!(
            exc(r#"<r xmlns:b="urn:b" xmlns="urn:d"/>"#, &["b", "#default"]),
            r#"<r xmlns="urn:d" xmlns:b="urn:b"></r>"#
        );
    }

    #[test]
    fn undeclares_default_namespace() {
        assert_eq!(
            exc(r#"<r xmlns="urn:d"><s xmlns=""/></r>"#, &[]),
            r#"<r xmlns="urn:d"><s xmlns=""></s></r>"#
        );
    }
}
