#![forbid(unsafe_code)]

//! Transform pipeline and trait definitions.

use crate::enveloped::EnvelopedSignatureTransform;
use xsig_c14n::C14nMode;
use xsig_core::{algorithm, ns, Error};
use xsig_xml::document::{find_child_element, find_child_elements, IdMap};
use xsig_xml::NodeSet;

/// Data flowing through the transform pipeline.
#[derive(Debug)]
pub enum TransformData {
    /// A node set over the document being processed.
    Xml(NodeSet),
    /// Octets, after canonicalization.
    Binary(Vec<u8>),
}

impl TransformData {
    /// Convert to octets. A remaining node set is canonicalized with
    /// inclusive C14N without comments.
    pub fn into_binary(self, doc: &roxmltree::Document<'_>) -> Result<Vec<u8>, Error> {
        match self {
            TransformData::Binary(data) => Ok(data),
            TransformData::Xml(node_set) => {
                xsig_c14n::canonicalize_doc(doc, C14nMode::Inclusive, Some(&node_set), &[])
            }
        }
    }
}

/// Trait for individual transforms.
pub trait Transform: Send {
    /// The algorithm URI for this transform.
    fn uri(&self) -> &str;

    /// Execute the transform on data drawn from `doc`.
    fn execute(
        &self,
        doc: &roxmltree::Document<'_>,
        input: TransformData,
    ) -> Result<TransformData, Error>;
}

/// A pipeline of transforms executed in sequence.
#[derive(Default)]
pub struct TransformPipeline {
    transforms: Vec<Box<dyn Transform>>,
}

impl TransformPipeline {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the pipeline declared by a `<Transforms>` element.
    ///
    /// `signature` is the `<Signature>` element the reference belongs to;
    /// the enveloped transform removes it.
    pub fn from_transforms(
        transforms: Option<roxmltree::Node<'_, '_>>,
        signature: roxmltree::NodeId,
    ) -> Result<Self, Error> {
        let mut pipeline = Self::new();
        let Some(transforms) = transforms else {
            return Ok(pipeline);
        };
        for t in find_child_elements(transforms, ns::DSIG, ns::node::TRANSFORM) {
            let uri = t.attribute(ns::attr::ALGORITHM).ok_or_else(|| {
                Error::XmlStructure("Transform is missing its Algorithm attribute".into())
            })?;
            match uri {
                algorithm::ENVELOPED_SIGNATURE => {
                    pipeline.push(Box::new(EnvelopedSignatureTransform::new(signature)));
                }
                algorithm::XPATH if is_enveloped_xpath(t) => {
                    log::debug!("treating XPath filter as enveloped-signature transform");
                    pipeline.push(Box::new(EnvelopedSignatureTransform::new(signature)));
                }
                _ => {
                    let mode = C14nMode::from_uri(uri).ok_or_else(|| {
                        Error::UnsupportedAlgorithm(format!("transform {uri}"))
                    })?;
                    pipeline.push(Box::new(C14nTransform::new(mode, inclusive_prefixes(t))));
                }
            }
        }
        Ok(pipeline)
    }

    /// Add a transform to the pipeline.
    pub fn push(&mut self, transform: Box<dyn Transform>) {
        self.transforms.push(transform);
    }

    /// Execute all transforms in order.
    pub fn execute(
        &self,
        doc: &roxmltree::Document<'_>,
        input: TransformData,
    ) -> Result<TransformData, Error> {
        let mut data = input;
        for transform in &self.transforms {
            log::debug!("applying transform {}", transform.uri());
            data = transform.execute(doc, data)?;
        }
        Ok(data)
    }

    /// Number of transforms in the pipeline.
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    /// Check if pipeline is empty.
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}

/// The `PrefixList` of an `ec:InclusiveNamespaces` child, if any.
pub fn inclusive_prefixes(node: roxmltree::Node<'_, '_>) -> Vec<String> {
    find_child_element(node, ns::EXC_C14N, ns::node::INCLUSIVE_NAMESPACES)
        .and_then(|n| n.attribute(ns::attr::PREFIX_LIST))
        .map(|list| list.split_whitespace().map(str::to_owned).collect())
        .unwrap_or_default()
}

// The only XPath filter recognized is the classic enveloped pattern,
// `not(ancestor-or-self::dsig:Signature)`.
fn is_enveloped_xpath(transform: roxmltree::Node<'_, '_>) -> bool {
    find_child_element(transform, ns::DSIG, ns::node::XPATH)
        .and_then(|x| x.text())
        .map(|expr| expr.split_whitespace().collect::<String>())
        .is_some_and(|expr| {
            expr.starts_with("not(ancestor-or-self::") && expr.ends_with(":Signature)")
        })
}

/// Dereference `uri`, run `pipeline` and return the octets to digest.
pub fn process_reference(
    doc: &roxmltree::Document<'_>,
    id_map: &IdMap,
    uri: &str,
    pipeline: &TransformPipeline,
) -> Result<Vec<u8>, Error> {
    let node_set = crate::uri::dereference(doc, id_map, uri)?;
    pipeline
        .execute(doc, TransformData::Xml(node_set))?
        .into_binary(doc)
}

// ── C14N Transform ───────────────────────────────────────────────────

/// A canonicalization transform.
pub struct C14nTransform {
    mode: C14nMode,
    inclusive_prefixes: Vec<String>,
}

impl C14nTransform {
    pub fn new(mode: C14nMode, inclusive_prefixes: Vec<String>) -> Self {
        Self {
            mode,
            inclusive_prefixes,
        }
    }
}

impl Transform for C14nTransform {
    fn uri(&self) -> &str {
        self.mode.uri()
    }

    fn execute(
        &self,
        doc: &roxmltree::Document<'_>,
        input: TransformData,
    ) -> Result<TransformData, Error> {
        let bytes = match input {
            TransformData::Xml(node_set) => xsig_c14n::canonicalize_doc(
                doc,
                self.mode,
                Some(&node_set),
                &self.inclusive_prefixes,
            )?,
            TransformData::Binary(data) => xsig_c14n::canonicalize(
                std::str::from_utf8(&data)
                    .map_err(|e| Error::XmlParse(format!("invalid UTF-8: {e}")))?,
                self.mode,
                None,
                &self.inclusive_prefixes,
            )?,
        };
        Ok(TransformData::Binary(bytes))
    }
}
