#![forbid(unsafe_code)]

//! XML-DSig enveloped signature creation.
//!
//! 1. Locate the element to sign and digest it (enveloped + c14n)
//! 2. Write a `<Signature>` with an empty `<SignatureValue>`
//! 3. Splice it in as the last child of the signed element, re-parse
//! 4. Canonicalize `<SignedInfo>` in place, sign, fill `<SignatureValue>`

use crate::options::SignOptions;
use base64::Engine;
use xsig_c14n::C14nMode;
use xsig_core::{algorithm, ns, Error};
use xsig_keys::keyinfo::{qname, write_key_info};
use xsig_keys::{Certificate, KeyIdentifier, PrivateKey, PublicKey};
use xsig_transforms::{process_reference, C14nTransform, TransformPipeline};
use xsig_xml::document::{build_id_map, find_child_element, is_named};
use xsig_xml::{edit, XmlWriter};

/// Sign `xml` with `key`, returning the document with an enveloped
/// `<Signature>` appended to the signed element.
///
/// `cert` is only used to fill `<KeyInfo>`.
pub fn sign(
    xml: &str,
    key: &PrivateKey,
    cert: Option<&Certificate>,
    opts: &SignOptions,
) -> Result<String, Error> {
    let signer = xsig_crypto::sign::from_uri(&opts.signature_method)?;
    let signing_key = key.to_signing_key();
    log::debug!(
        "signing with {} ({} key), digest {}, c14n {}",
        opts.signature_method,
        key.kind(),
        opts.digest_method,
        opts.c14n_method.uri()
    );

    let doc = xsig_xml::parse(xml)?;
    let id_map = build_id_map(&doc);
    let (target, uri) = match &opts.reference_id {
        None => (doc.root_element(), String::new()),
        Some(id) => {
            let node = id_map
                .get(id)?
                .and_then(|nid| doc.get_node(nid))
                .ok_or_else(|| Error::State(format!("reference-id {id} not found")))?;
            (node, format!("#{id}"))
        }
    };

    // The new signature is not in the document yet, so the enveloped
    // transform has nothing to remove here.
    let mut pipeline = TransformPipeline::new();
    pipeline.push(Box::new(C14nTransform::new(opts.c14n_method, Vec::new())));
    let octets = process_reference(&doc, &id_map, &uri, &pipeline)?;
    let digest = xsig_crypto::digest::digest(&opts.digest_method, &octets)?;
    log::debug!("reference URI=\"{uri}\": {} octets digested", octets.len());

    let fragment = signature_template(opts, &uri, &digest, cert, &key.public_key())?;
    let target_start = target.range().start;
    let with_template = edit::insert_last_child(xml, target, &fragment)?;

    let doc = xsig_xml::parse(&with_template)?;
    let signature = doc
        .descendants()
        .find(|n| n.is_element() && n.range().start == target_start)
        .and_then(|t| {
            t.children()
                .filter(|c| is_named(c, ns::DSIG, ns::node::SIGNATURE))
                .last()
        })
        .ok_or_else(|| Error::XmlStructure("inserted Signature not found".into()))?;
    let signed_info = find_child_element(signature, ns::DSIG, ns::node::SIGNED_INFO)
        .ok_or_else(|| Error::XmlStructure("missing SignedInfo".into()))?;
    let signature_value = find_child_element(signature, ns::DSIG, ns::node::SIGNATURE_VALUE)
        .ok_or_else(|| Error::XmlStructure("missing SignatureValue".into()))?;

    let canonical = xsig_c14n::canonicalize_subtree(&doc, signed_info, opts.c14n_method, &[])?;
    let raw = signer.sign(&signing_key, &canonical)?;
    let value = base64::engine::general_purpose::STANDARD.encode(raw);

    edit::replace_content(&with_template, signature_value, &value)
}

fn signature_template(
    opts: &SignOptions,
    uri: &str,
    digest: &[u8],
    cert: Option<&Certificate>,
    public_key: &PublicKey,
) -> Result<String, Error> {
    let prefix = opts.signature_prefix.as_str();
    let q = |local: &str| qname(prefix, local);
    let xmlns = if prefix.is_empty() {
        "xmlns".to_owned()
    } else {
        format!("xmlns:{prefix}")
    };

    let mut w = XmlWriter::new();
    w.start_element(&q(ns::node::SIGNATURE), &[(&xmlns, ns::DSIG)]);
    w.start_element(&q(ns::node::SIGNED_INFO), &[]);
    w.empty_element(
        &q(ns::node::CANONICALIZATION_METHOD),
        &[(ns::attr::ALGORITHM, opts.c14n_method.uri())],
    );
    w.empty_element(
        &q(ns::node::SIGNATURE_METHOD),
        &[(ns::attr::ALGORITHM, &opts.signature_method)],
    );
    w.start_element(&q(ns::node::REFERENCE), &[(ns::attr::URI, uri)]);
    w.start_element(&q(ns::node::TRANSFORMS), &[]);
    w.empty_element(
        &q(ns::node::TRANSFORM),
        &[(ns::attr::ALGORITHM, algorithm::ENVELOPED_SIGNATURE)],
    );
    if opts.c14n_method != C14nMode::Inclusive {
        w.empty_element(
            &q(ns::node::TRANSFORM),
            &[(ns::attr::ALGORITHM, opts.c14n_method.uri())],
        );
    }
    w.end_element(&q(ns::node::TRANSFORMS));
    w.empty_element(
        &q(ns::node::DIGEST_METHOD),
        &[(ns::attr::ALGORITHM, &opts.digest_method)],
    );
    w.text_element(
        &q(ns::node::DIGEST_VALUE),
        &[],
        &base64::engine::general_purpose::STANDARD.encode(digest),
    );
    w.end_element(&q(ns::node::REFERENCE));
    w.end_element(&q(ns::node::SIGNED_INFO));
    w.empty_element(&q(ns::node::SIGNATURE_VALUE), &[]);

    match (opts.key_identifier, cert, public_key) {
        (Some(identifier), _, _) => {
            write_key_info(&mut w, prefix, identifier, cert, public_key, &opts.issuer_name_style)?
        }
        (None, Some(_), _) => write_key_info(
            &mut w,
            prefix,
            KeyIdentifier::X509CertDirect,
            cert,
            public_key,
            &opts.issuer_name_style,
        )?,
        (None, None, PublicKey::Rsa(_)) => write_key_info(
            &mut w,
            prefix,
            KeyIdentifier::RsaKeyValue,
            None,
            public_key,
            &opts.issuer_name_style,
        )?,
        (None, None, _) => {
            log::debug!("no certificate for {} key, KeyInfo omitted", public_key.kind());
        }
    }

    w.end_element(&q(ns::node::SIGNATURE));
    Ok(w.into_string())
}

/// Number of `<Signature>` elements that are direct children of the
/// document element.
#[cfg(test)]
pub(crate) fn top_level_signatures(xml: &str) -> usize {
    let Ok(doc) = xsig_xml::parse(xml) else {
        return 0;
    };
    xsig_xml::document::find_child_elements(doc.root_element(), ns::DSIG, ns::node::SIGNATURE).len()
}
