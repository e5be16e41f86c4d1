#![forbid(unsafe_code)]

//! Text-splice editing of parsed documents.
//!
//! roxmltree trees are read-only, so edits are applied to the source text
//! using node byte ranges and the result is re-parsed by the caller.

use crate::document::element_qname;
use xsig_core::Error;

/// Insert `fragment` as the last child of `target`.
///
/// A self-closing target (`<a/>`) is expanded into a start/end tag pair.
pub fn insert_last_child(
    xml: &str,
    target: roxmltree::Node<'_, '_>,
    fragment: &str,
) -> Result<String, Error> {
    if !target.is_element() {
        return Err(Error::XmlStructure(
            "signature target is not an element".into(),
        ));
    }
    let range = target.range();
    let element = &xml[range.clone()];
    let mut out = String::with_capacity(xml.len() + fragment.len() + 16);

    if element.ends_with("/>") {
        let qname = element_qname(&target);
        out.push_str(&xml[..range.end - 2]);
        out.push('>');
        out.push_str(fragment);
        out.push_str("</");
        out.push_str(qname);
        out.push('>');
        out.push_str(&xml[range.end..]);
    } else {
        let close = element
            .rfind("</")
            .map(|i| range.start + i)
            .ok_or_else(|| Error::XmlStructure("element has no end tag".into()))?;
        out.push_str(&xml[..close]);
        out.push_str(fragment);
        out.push_str(&xml[close..]);
    }
    Ok(out)
}

/// Remove `node` and its subtree from the text.
pub fn remove_node(xml: &str, node: roxmltree::Node<'_, '_>) -> String {
    let range = node.range();
    let mut out = String::with_capacity(xml.len() - range.len());
    out.push_str(&xml[..range.start]);
    out.push_str(&xml[range.end..]);
    out
}

/// Replace the content of `node` (everything between its start and end
/// tags) with `content`.
pub fn replace_content(
    xml: &str,
    node: roxmltree::Node<'_, '_>,
    content: &str,
) -> Result<String, Error> {
    let range = node.range();
    let element = &xml[range.clone()];
    if element.ends_with("/>") {
        return insert_last_child(xml, node, content);
    }
    let open_end = element
        .find('>')
        .map(|i| range.start + i + 1)
        .ok_or_else(|| Error::XmlStructure("malformed start tag".into()))?;
    let close = element
        .rfind("</")
        .map(|i| range.start + i)
        .ok_or_else(|| Error::XmlStructure("element has no end tag".into()))?;
    let mut out = String::with_capacity(xml.len() + content.len());
    out.push_str(&xml[..open_end]);
    out.push_str(content);
    out.push_str(&xml[close..]);
    Ok(out)
}
