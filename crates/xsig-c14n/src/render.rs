#![forbid(unsafe_code)]

//! Namespace declarations and attributes in canonical order.

use crate::escape;
use std::cmp::Ordering;

/// A namespace declaration to be rendered. An empty prefix is the default
/// namespace; an empty URI undeclares it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NsDecl {
    pub prefix: String,
    pub uri: String,
}

impl NsDecl {
    pub fn new(prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            uri: uri.into(),
        }
    }

    pub fn render(&self) -> String {
        let uri = escape::escape_attr(&self.uri);
        if self.prefix.is_empty() {
            format!(" xmlns=\"{uri}\"")
        } else {
            format!(" xmlns:{}=\"{uri}\"", self.prefix)
        }
    }
}

// Default namespace first, then by prefix. The empty string already sorts
// before every other prefix.
impl Ord for NsDecl {
    fn cmp(&self, other: &Self) -> Ordering {
        self.prefix.cmp(&other.prefix)
    }
}

impl PartialOrd for NsDecl {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// An attribute to be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    /// Namespace URI, empty when the attribute has none.
    pub ns_uri: String,
    pub local_name: String,
    /// Name as rendered (`prefix:local` or `local`).
    pub qualified_name: String,
    pub value: String,
}

impl Attr {
    pub fn render(&self) -> String {
        format!(
            " {}=\"{}\"",
            self.qualified_name,
            escape::escape_attr(&self.value)
        )
    }
}

// Unqualified attributes first by local name, then qualified ones by
// (namespace URI, local name).
impl Ord for Attr {
    fn cmp(&self, other: &Self) -> Ordering {
        (!self.ns_uri.is_empty(), &self.ns_uri, &self.local_name).cmp(&(
            !other.ns_uri.is_empty(),
            &other.ns_uri,
            &other.local_name,
        ))
    }
}

impl PartialOrd for Attr {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attr(ns: &str, local: &str) -> Attr {
        Attr {
            ns_uri: ns.into(),
            local_name: local.into(),
            qualified_name: local.into(),
            value: String::new(),
        }
    }

    #[test]
    fn default_namespace_sorts_first() {
        let mut decls = vec![NsDecl::new("b", "u"), NsDecl::new("", "d"), NsDecl::new("a", "u")];
        decls.sort();
        let prefixes: Vec<_> = decls.iter().map(|d| d.prefix.as_str()).collect();
        assert_eq!(prefixes, ["", "a", "b"]);
    }

    #[test]
    fn unqualified_attributes_sort_first() {
        let mut attrs = vec![attr("urn:b", "a"), attr("", "z"), attr("urn:a", "z"), attr("", "b")];
        attrs.sort();
        let order: Vec<_> = attrs
            .iter()
            .map(|a| format!("{}|{}", a.ns_uri, a.local_name))
            .collect();
        assert_eq!(order, ["|b", "|z", "urn:a|z", "urn:b|a"]);
    }
}
