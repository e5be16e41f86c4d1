#![forbid(unsafe_code)]

//! Where the document comes from and where the result goes.

use crate::properties::PropertyResolver;
use xsig_core::Error;
use xsig_xml::document::DEFAULT_MAX_SIZE;
use xsig_xml::XmlDocument;

/// The variable holding the message body.
pub const MESSAGE_CONTENT: &str = "message.content";

/// Read the input document named by `source`, or the message body.
///
/// The text is parsed once here so that malformed or oversized input fails
/// before any key material is touched.
pub fn obtain_document(resolver: &PropertyResolver<'_>) -> Result<XmlDocument, Error> {
    let max_size = resolver
        .usize_option("max-document-size")?
        .unwrap_or(DEFAULT_MAX_SIZE);
    let store = resolver.store();

    let text = match resolver.resolve_optional("source") {
        Some(source) => store.get(&source).ok_or_else(|| {
            log::debug!("source variable {source} is not set");
            Error::State("source variable resolves to null".into())
        })?,
        None => store.get(MESSAGE_CONTENT).unwrap_or_default(),
    };
    XmlDocument::parse_with_limit(text, max_size)
}

/// Store `xml` in `output-variable`, or the message body, and return the
/// name written to.
pub fn write_output(resolver: &PropertyResolver<'_>, xml: String) -> String {
    let dest = resolver
        .resolve_optional("output-variable")
        .unwrap_or_else(|| MESSAGE_CONTENT.to_owned());
    log::debug!("writing {} bytes to {dest}", xml.len());
    resolver.store().set(&dest, xml);
    dest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{MemoryStore, VariableStore};
    use crate::properties::Properties;

    fn props(pairs: &[(&str, &str)]) -> Properties {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn reads_message_body_by_default() {
        let store = MemoryStore::new().with(MESSAGE_CONTENT, "<a/>");
        let p = props(&[]);
        let doc = obtain_document(&PropertyResolver::new(&p, &store)).unwrap();
        assert_eq!(doc.text(), "<a/>");
    }

    #[test]
    fn reads_named_source() {
        let store = MemoryStore::new()
            .with(MESSAGE_CONTENT, "<body/>")
            .with("request.doc", "<doc/>");
        let p = props(&[("source", "request.doc")]);
        let doc = obtain_document(&PropertyResolver::new(&p, &store)).unwrap();
        assert_eq!(doc.text(), "<doc/>");
    }

    #[test]
    fn missing_source_variable() {
        let store = MemoryStore::new();
        let p = props(&[("source", "nope")]);
        let err = obtain_document(&PropertyResolver::new(&p, &store)).unwrap_err();
        assert_eq!(err.to_string(), "StateError: source variable resolves to null");
    }

    #[test]
    fn malformed_and_oversized() {
        let store = MemoryStore::new().with(MESSAGE_CONTENT, "<a><b></a>");
        let p = props(&[]);
        let err = obtain_document(&PropertyResolver::new(&p, &store)).unwrap_err();
        assert!(matches!(err, Error::XmlParse(_)));

        let store = MemoryStore::new().with(MESSAGE_CONTENT, "<a>0123456789</a>");
        let p = props(&[("max-document-size", "8")]);
        let err = obtain_document(&PropertyResolver::new(&p, &store)).unwrap_err();
        assert!(matches!(err, Error::XmlParse(_)));
    }

    #[test]
    fn parse_is_idempotent() {
        let xml = r#"<?xml version="1.0"?><r xmlns:p="urn:p"><p:a k="v">t<!--c--></p:a></r>"#;
        let store = MemoryStore::new().with(MESSAGE_CONTENT, xml);
        let p = props(&[]);
        let first = obtain_document(&PropertyResolver::new(&p, &store)).unwrap();
        let second = XmlDocument::parse(first.text().to_owned()).unwrap();

        let a = first.parse_doc().unwrap();
        let b = second.parse_doc().unwrap();
        let shape = |d: &roxmltree::Document<'_>| -> Vec<String> {
            d.descendants()
                .filter(|n| n.is_element())
                .map(|n| {
                    let attrs: Vec<String> = n
                        .attributes()
                        .map(|at| format!("{}={}", at.name(), at.value()))
                        .collect();
                    format!("{:?} {:?} {}", n.tag_name().namespace(), n.tag_name().name(), attrs.join(","))
                })
                .collect()
        };
        assert_eq!(shape(&a), shape(&b));
    }

    #[test]
    fn output_destination() {
        let store = MemoryStore::new();
        let p = props(&[]);
        assert_eq!(
            write_output(&PropertyResolver::new(&p, &store), "<x/>".into()),
            MESSAGE_CONTENT
        );
        assert_eq!(store.get(MESSAGE_CONTENT).as_deref(), Some("<x/>"));

        let p = props(&[("output-variable", "signed.doc")]);
        assert_eq!(
            write_output(&PropertyResolver::new(&p, &store), "<y/>".into()),
            "signed.doc"
        );
        assert_eq!(store.get("signed.doc").as_deref(), Some("<y/>"));
    }
}
