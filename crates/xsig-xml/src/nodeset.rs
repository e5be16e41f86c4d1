#![forbid(unsafe_code)]

//! Node selections over a parsed document.
//!
//! A reference URI selects a `NodeSet`; the enveloped-signature transform
//! carves the signature out of it and canonicalization renders only the
//! nodes left in it.

use roxmltree::{Document, Node, NodeId};
use std::collections::HashSet;

/// Nodes of one document, keyed by `NodeId`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeSet {
    members: HashSet<NodeId>,
}

impl NodeSet {
    fn collect<'a, 'input: 'a>(nodes: impl Iterator<Item = Node<'a, 'input>>) -> Self {
        Self {
            members: nodes.map(|n| n.id()).collect(),
        }
    }

    /// Every node of the document, comments included (`#xpointer(/)`).
    pub fn all(doc: &Document<'_>) -> Self {
        Self::collect(doc.descendants())
    }

    /// Every node except comments (`URI=""`).
    pub fn all_without_comments(doc: &Document<'_>) -> Self {
        Self::collect(doc.descendants().filter(|n| !n.is_comment()))
    }

    /// `root` and its descendants, minus comments (`#id`).
    pub fn tree_without_comments(root: Node<'_, '_>) -> Self {
        Self::collect(root.descendants().filter(|n| !n.is_comment()))
    }

    /// `root` and all its descendants (`#xpointer(id('...'))`).
    pub fn tree_with_comments(root: Node<'_, '_>) -> Self {
        Self::collect(root.descendants())
    }

    pub fn contains(&self, node: &Node<'_, '_>) -> bool {
        self.members.contains(&node.id())
    }

    /// Drop `root` and everything below it.
    pub fn remove_subtree(&mut self, root: Node<'_, '_>) {
        for n in root.descendants() {
            self.members.remove(&n.id());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comments_are_excluded_from_same_document_set() {
        let doc = roxmltree::Document::parse("<a><!--c--><b/></a>").unwrap();
        let with = NodeSet::all(&doc);
        let without = NodeSet::all_without_comments(&doc);
        assert_eq!(with.len(), without.len() + 1);
        let comment = doc.descendants().find(|n| n.is_comment()).unwrap();
        assert!(with.contains(&comment));
        assert!(!without.contains(&comment));
    }

    #[test]
    fn remove_subtree_drops_descendants() {
        let doc = roxmltree::Document::parse("<a><s><x>t</x></s><b/></a>").unwrap();
        let mut set = NodeSet::all(&doc);
        let s = doc
            .descendants()
            .find(|n| n.has_tag_name("s"))
            .unwrap();
        set.remove_subtree(s);
        assert!(!s.descendants().any(|n| set.contains(&n)));
        assert!(set.contains(&doc.root_element()));

        let mut only_s = NodeSet::tree_with_comments(s);
        only_s.remove_subtree(s);
        assert!(only_s.is_empty());
    }
}
