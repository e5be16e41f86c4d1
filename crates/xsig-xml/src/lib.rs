#![forbid(unsafe_code)]

//! XML document handling for the xsig XML-DSig engine.
//!
//! Provides a thin owned wrapper over `roxmltree`, the `NodeSet` used by
//! canonicalization and the enveloped transform, text-splice editing for
//! inserting and removing signatures, and a small writer for building
//! signature markup.

pub mod document;
pub mod edit;
pub mod nodeset;
pub mod writer;
pub mod xpath;

pub use document::XmlDocument;
pub use nodeset::NodeSet;
pub use writer::XmlWriter;

/// Upper bound on nodes in a single parsed document.
pub const NODES_LIMIT: u32 = 1 << 22;

/// Return the roxmltree parsing options used everywhere in the workspace.
///
/// DTDs are rejected. Documents arrive from request bodies and have no
/// business declaring entities.
pub fn parsing_options() -> roxmltree::ParsingOptions {
    roxmltree::ParsingOptions {
        allow_dtd: false,
        nodes_limit: NODES_LIMIT,
    }
}

/// Parse text with [`parsing_options`], mapping failures to `ParseError`.
pub fn parse(text: &str) -> xsig_core::Result<roxmltree::Document<'_>> {
    roxmltree::Document::parse_with_options(text, parsing_options())
        .map_err(|e| xsig_core::Error::XmlParse(e.to_string()))
}
