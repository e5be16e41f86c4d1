#![forbid(unsafe_code)]

//! XML Canonicalization (C14N) for the xsig XML-DSig engine.
//!
//! Implements the four W3C canonicalization variants used by signatures:
//! - Canonical XML 1.0 (with and without comments)
//! - Exclusive Canonical XML 1.0 (with and without comments)

pub mod escape;
pub mod exclusive;
pub mod inclusive;
pub mod render;

use xsig_core::{algorithm, Error};
use xsig_xml::NodeSet;

/// The canonicalization mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum C14nMode {
    /// Canonical XML 1.0
    Inclusive,
    /// Canonical XML 1.0 with comments
    InclusiveWithComments,
    /// Exclusive Canonical XML 1.0
    Exclusive,
    /// Exclusive Canonical XML 1.0 with comments
    ExclusiveWithComments,
}

impl C14nMode {
    /// Get the algorithm URI for this mode.
    pub fn uri(&self) -> &'static str {
        match self {
            Self::Inclusive => algorithm::C14N,
            Self::InclusiveWithComments => algorithm::C14N_WITH_COMMENTS,
            Self::Exclusive => algorithm::EXC_C14N,
            Self::ExclusiveWithComments => algorithm::EXC_C14N_WITH_COMMENTS,
        }
    }

    /// Parse a C14N mode from an algorithm URI.
    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            algorithm::C14N => Some(Self::Inclusive),
            algorithm::C14N_WITH_COMMENTS => Some(Self::InclusiveWithComments),
            algorithm::EXC_C14N => Some(Self::Exclusive),
            algorithm::EXC_C14N_WITH_COMMENTS => Some(Self::ExclusiveWithComments),
            _ => None,
        }
    }

    /// Parse a short option name (`c14n`, `exc-c14n`, ...) or a full URI.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "c14n" | "inclusive" => Some(Self::Inclusive),
            "c14n-with-comments" => Some(Self::InclusiveWithComments),
            "exc-c14n" | "exclusive" => Some(Self::Exclusive),
            "exc-c14n-with-comments" => Some(Self::ExclusiveWithComments),
            _ => Self::from_uri(name.trim()),
        }
    }

    pub fn with_comments(&self) -> bool {
        matches!(self, Self::InclusiveWithComments | Self::ExclusiveWithComments)
    }

    pub fn is_exclusive(&self) -> bool {
        matches!(self, Self::Exclusive | Self::ExclusiveWithComments)
    }
}

/// Canonicalize an XML document.
///
/// - `xml`: the raw XML text
/// - `mode`: which C14N variant to use
/// - `node_set`: optional node set (for document-subset canonicalization)
/// - `inclusive_prefixes`: for exclusive C14N, the InclusiveNamespaces PrefixList
pub fn canonicalize(
    xml: &str,
    mode: C14nMode,
    node_set: Option<&NodeSet>,
    inclusive_prefixes: &[String],
) -> Result<Vec<u8>, Error> {
    let doc = xsig_xml::parse(xml)?;
    canonicalize_doc(&doc, mode, node_set, inclusive_prefixes)
}

/// Canonicalize with a pre-parsed document.
pub fn canonicalize_doc(
    doc: &roxmltree::Document<'_>,
    mode: C14nMode,
    node_set: Option<&NodeSet>,
    inclusive_prefixes: &[String],
) -> Result<Vec<u8>, Error> {
    match mode {
        C14nMode::Inclusive | C14nMode::InclusiveWithComments => {
            inclusive::canonicalize(doc, mode.with_comments(), node_set)
        }
        C14nMode::Exclusive | C14nMode::ExclusiveWithComments => {
            exclusive::canonicalize(doc, mode.with_comments(), node_set, inclusive_prefixes)
        }
    }
}

/// Canonicalize the subtree rooted at `node` as a document subset.
///
/// Comments inside the subtree are kept only for the `WithComments` modes.
pub fn canonicalize_subtree(
    doc: &roxmltree::Document<'_>,
    node: roxmltree::Node<'_, '_>,
    mode: C14nMode,
    inclusive_prefixes: &[String],
) -> Result<Vec<u8>, Error> {
    let set = if mode.with_comments() {
        NodeSet::tree_with_comments(node)
    } else {
        NodeSet::tree_without_comments(node)
    };
    canonicalize_doc(doc, mode, Some(&set), inclusive_prefixes)
}

/// Whether a node sits directly under the document root.
pub(crate) fn is_top_level(node: &roxmltree::Node<'_, '_>) -> bool {
    node.parent()
        .is_some_and(|p| p.node_type() == roxmltree::NodeType::Root)
}

/// Emit a comment or PI, with the newline rules for top-level nodes.
pub(crate) fn write_top_level_aware(
    node: &roxmltree::Node<'_, '_>,
    output: &mut Vec<u8>,
    body: &[u8],
) {
    let top = is_top_level(node);
    if top && node.prev_siblings().any(|s| s.is_element()) {
        output.push(b'\n');
    }
    output.extend_from_slice(body);
    if top && node.next_siblings().any(|s| s.is_element()) {
        output.push(b'\n');
    }
}

/// Render a comment node's canonical form.
pub(crate) fn comment_bytes(node: &roxmltree::Node<'_, '_>) -> Vec<u8> {
    let mut out = b"<!--".to_vec();
    out.extend_from_slice(node.text().unwrap_or("").as_bytes());
    out.extend_from_slice(b"-->");
    out
}

/// Render a processing instruction's canonical form.
pub(crate) fn pi_bytes(node: &roxmltree::Node<'_, '_>) -> Vec<u8> {
    let mut out = b"<?".to_vec();
    if let Some(pi) = node.pi() {
        out.extend_from_slice(pi.target.as_bytes());
        if let Some(value) = pi.value.filter(|v| !v.is_empty()) {
            out.push(b' ');
            out.extend_from_slice(escape::escape_pi(value).as_bytes());
        }
    }
    out.extend_from_slice(b"?>");
    out
}

/// Qualified name to render for an attribute.
pub(crate) fn attr_qname(
    doc: &roxmltree::Document<'_>,
    attr: &roxmltree::Attribute<'_, '_>,
) -> String {
    if attr.namespace() == Some(xsig_core::ns::XML) {
        format!("xml:{}", attr.name())
    } else {
        xsig_xml::document::attribute_qname(doc, attr).to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_names_and_uris() {
        assert_eq!(C14nMode::from_name("exc-c14n"), Some(C14nMode::Exclusive));
        assert_eq!(C14nMode::from_name("C14N"), Some(C14nMode::Inclusive));
        assert_eq!(
            C14nMode::from_name(algorithm::C14N_WITH_COMMENTS),
            Some(C14nMode::InclusiveWithComments)
        );
        assert_eq!(C14nMode::from_name("c14n11"), None);
        assert_eq!(C14nMode::ExclusiveWithComments.uri(), algorithm::EXC_C14N_WITH_COMMENTS);
    }

    #[test]
    fn subtree_inherits_ancestor_namespaces() {
        let xml = r#"<r xmlns="urn:d" xmlns:p="urn:p"><p:a x="1"><b/></p:a></r>"#;
        let doc = roxmltree::Document::parse(xml).unwrap();
        let a = doc.descendants().find(|n| n.has_tag_name("a")).unwrap();

        let inc = canonicalize_subtree(&doc, a, C14nMode::Inclusive, &[]).unwrap();
        assert_eq!(
            String::from_utf8(inc).unwrap(),
            r#"<p:a xmlns="urn:d" xmlns:p="urn:p" x="1"><b></b></p:a>"#
        );

        let exc = canonicalize_subtree(&doc, a, C14nMode::Exclusive, &[]).unwrap();
        assert_eq!(
            String::from_utf8(exc).unwrap(),
            r#"<p:a xmlns:p="urn:p" x="1"><b xmlns="urn:d"></b></p:a>"#
        );
    }

    #[test]
    fn comments_follow_mode() {
        let xml = "<!--head--><a><!--x-->t</a>";
        let plain = canonicalize(xml, C14nMode::Inclusive, None, &[]).unwrap();
        assert_eq!(plain, b"<a>t</a>");
        let with = canonicalize(xml, C14nMode::InclusiveWithComments, None, &[]).unwrap();
        assert_eq!(with, b"<!--head-->\n<a><!--x-->t</a>");
    }
}
