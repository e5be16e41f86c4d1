#![forbid(unsafe_code)]

//! Enveloped signature transform.
//!
//! Removes the `<Signature>` element containing the reference from the
//! node set.

use crate::pipeline::{Transform, TransformData};
use xsig_core::{algorithm, Error};

/// The enveloped signature transform.
pub struct EnvelopedSignatureTransform {
    signature: roxmltree::NodeId,
}

impl EnvelopedSignatureTransform {
    /// Create with the id of the `<Signature>` element to remove.
    pub fn new(signature: roxmltree::NodeId) -> Self {
        Self { signature }
    }
}

impl Transform for EnvelopedSignatureTransform {
    fn uri(&self) -> &str {
        algorithm::ENVELOPED_SIGNATURE
    }

    fn execute(
        &self,
        doc: &roxmltree::Document<'_>,
        input: TransformData,
    ) -> Result<TransformData, Error> {
        match input {
            TransformData::Xml(mut node_set) => {
                let signature = doc.get_node(self.signature).ok_or_else(|| {
                    Error::XmlStructure("enveloped Signature element not found".into())
                })?;
                node_set.remove_subtree(signature);
                Ok(TransformData::Xml(node_set))
            }
            TransformData::Binary(_) => Err(Error::XmlStructure(
                "enveloped-signature transform requires XML input".into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xsig_xml::document::is_named;
    use xsig_xml::NodeSet;

    #[test]
    fn removes_signature_subtree_only() {
        let xml = r#"<a><b/><Signature xmlns="http://www.w3.org/2000/09/xmldsig#"><c>t</c></Signature></a>"#;
        let doc = xsig_xml::parse(xml).unwrap();
        let sig = doc
            .descendants()
            .find(|n| is_named(n, xsig_core::ns::DSIG, "Signature"))
            .unwrap();
        let all = NodeSet::all(&doc);
        let t = EnvelopedSignatureTransform::new(sig.id());
        let TransformData::Xml(out) = t.execute(&doc, TransformData::Xml(all.clone())).unwrap() else {
            panic!("expected a node set");
        };
        assert_eq!(out.len(), all.len() - 3);
        assert!(!out.contains(&sig));
        assert!(out.contains(&doc.root_element()));
    }

    #[test]
    fn rejects_octets() {
        let doc = xsig_xml::parse("<a/>").unwrap();
        let t = EnvelopedSignatureTransform::new(doc.root_element().id());
        assert!(t.execute(&doc, TransformData::Binary(vec![1])).is_err());
    }
}
