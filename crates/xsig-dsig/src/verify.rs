#![forbid(unsafe_code)]

//! XML-DSig signature verification.
//!
//! Processing order:
//! 1. Select the `<Signature>` to check, read `SignedInfo` methods
//! 2. Resolve the verification key (external certificate, then `KeyInfo`)
//! 3. For each `<Reference>`: dereference, run transforms, compare digests
//! 4. Canonicalize `<SignedInfo>` and check `<SignatureValue>`
//! 5. Apply the issuer, thumbprint and trusted-CA checks

use crate::options::VerifyOptions;
use base64::Engine;
use std::fmt;
use std::time::SystemTime;
use xsig_c14n::C14nMode;
use xsig_core::{ns, Error};
use xsig_keys::keyinfo::read_key_info;
use xsig_keys::x509::{check_validity, issuer_name, thumbprint, verify_issued_by};
use xsig_keys::{Certificate, KeyInfoContent, PublicKey, ThumbprintEncoding};
use xsig_transforms::pipeline::inclusive_prefixes;
use xsig_transforms::{process_reference, TransformPipeline};
use xsig_xml::document::{build_id_map, find_child_element, find_child_elements, is_named, IdMap};
use xsig_xml::xpath;

/// Why a signature did not verify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    MissingSignature,
    DigestMismatch { uri: String },
    SignatureMismatch,
    /// The signature is intact but the certificate fails a trust check.
    UntrustedIssuer { expected: String, actual: String },
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MissingSignature => "missing signature",
            Self::DigestMismatch { .. } => "digest mismatch",
            Self::SignatureMismatch => "signature mismatch",
            Self::UntrustedIssuer { .. } => "untrusted issuer",
        })
    }
}

impl Failure {
    /// The error raised when an invalid signature must abort the flow.
    pub fn into_error(self) -> Error {
        match self {
            Self::MissingSignature => Error::Validation("no Signature element found".into()),
            Self::DigestMismatch { uri } => {
                Error::Validation(format!("digest mismatch for reference URI \"{uri}\""))
            }
            Self::SignatureMismatch => Error::Validation("signature mismatch".into()),
            Self::UntrustedIssuer { expected, actual } => Error::Trust(format!(
                "certificate issuer \"{actual}\" does not match \"{expected}\""
            )),
        }
    }
}

/// Outcome of a verification that ran to completion.
///
/// `certificate` is the certificate the verification key came from, when
/// there was one. An invalid verdict keeps it for diagnostics.
#[derive(Debug)]
pub enum Verdict {
    Valid {
        certificate: Option<Certificate>,
    },
    Invalid {
        failure: Failure,
        certificate: Option<Certificate>,
    },
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }

    pub fn certificate(&self) -> Option<&Certificate> {
        match self {
            Self::Valid { certificate } | Self::Invalid { certificate, .. } => certificate.as_ref(),
        }
    }
}

/// Verify the enveloped `<Signature>` in `xml`.
///
/// Only one signature is checked. When the document holds several, the
/// first whose Reference covers the document element is chosen, then the
/// first enveloped by the element it references, then simply the first.
///
/// Hard errors are reserved for documents and signatures that cannot be
/// processed; a signature that simply does not verify is a `Verdict`.
pub fn verify(xml: &str, opts: &VerifyOptions) -> Result<Verdict, Error> {
    let doc = xsig_xml::parse(xml)?;
    let id_map = build_id_map(&doc);

    let Some(sig_node) = select_signature(&doc, &id_map) else {
        log::debug!("document carries no Signature element");
        return Ok(Verdict::Invalid {
            failure: Failure::MissingSignature,
            certificate: None,
        });
    };
    let signed_info = required_child(sig_node, ns::node::SIGNED_INFO)?;

    let c14n_node = required_child(signed_info, ns::node::CANONICALIZATION_METHOD)?;
    let c14n_uri = algorithm_of(c14n_node)?;
    let c14n_mode = C14nMode::from_uri(c14n_uri).ok_or_else(|| {
        Error::UnsupportedAlgorithm(format!("canonicalization method {c14n_uri}"))
    })?;
    let prefixes = inclusive_prefixes(c14n_node);

    let sig_method_uri = algorithm_of(required_child(signed_info, ns::node::SIGNATURE_METHOD)?)?;
    let sig_alg = xsig_crypto::sign::from_uri(sig_method_uri)?;
    log::debug!("verifying {sig_method_uri} with c14n {c14n_uri}");

    let key_info = match find_child_element(sig_node, ns::DSIG, ns::node::KEY_INFO) {
        Some(node) => read_key_info(node)?,
        None => KeyInfoContent::default(),
    };
    let (certificate, public_key) = resolve_key(opts, key_info)?;
    log::debug!(
        "verification key: {} ({})",
        public_key.kind(),
        certificate
            .as_ref()
            .map_or_else(|| "KeyValue".to_owned(), |c| c.subject_dn())
    );

    let references = find_child_elements(signed_info, ns::DSIG, ns::node::REFERENCE);
    if references.is_empty() {
        return Err(Error::XmlStructure("SignedInfo has no Reference".into()));
    }
    for reference in references {
        let uri = reference.attribute(ns::attr::URI).unwrap_or("");
        let transforms = find_child_element(reference, ns::DSIG, ns::node::TRANSFORMS);
        let pipeline = TransformPipeline::from_transforms(transforms, sig_node.id())?;
        let digest_uri = algorithm_of(required_child(reference, ns::node::DIGEST_METHOD)?)?;
        let expected = decode_b64(
            required_child(reference, ns::node::DIGEST_VALUE)?.text().unwrap_or(""),
            "DigestValue",
        )?;

        let octets = process_reference(&doc, &id_map, uri, &pipeline)?;
        let actual = xsig_crypto::digest::digest(digest_uri, &octets)?;
        if actual != expected {
            log::debug!("digest mismatch for reference URI \"{uri}\"");
            return Ok(Verdict::Invalid {
                failure: Failure::DigestMismatch { uri: uri.to_owned() },
                certificate,
            });
        }
    }

    let canonical = xsig_c14n::canonicalize_subtree(&doc, signed_info, c14n_mode, &prefixes)?;
    let signature_value = decode_b64(
        required_child(sig_node, ns::node::SIGNATURE_VALUE)?.text().unwrap_or(""),
        "SignatureValue",
    )?;
    if !sig_alg.verify(&public_key.to_signing_key(), &canonical, &signature_value)? {
        log::debug!("SignatureValue does not verify over SignedInfo");
        return Ok(Verdict::Invalid {
            failure: Failure::SignatureMismatch,
            certificate,
        });
    }

    if let Some(failure) = check_trust(certificate.as_ref(), opts) {
        return Ok(Verdict::Invalid {
            failure,
            certificate,
        });
    }
    Ok(Verdict::Valid { certificate })
}

/// Strip the `<Signature>` element [`verify`] would check from `xml`. A
/// document without one is returned unchanged.
pub fn remove_signature(xml: &str) -> Result<String, Error> {
    let doc = xsig_xml::parse(xml)?;
    let id_map = build_id_map(&doc);
    match select_signature(&doc, &id_map) {
        Some(sig_node) => Ok(xsig_xml::edit::remove_node(xml, sig_node)),
        None => Ok(xml.to_owned()),
    }
}

fn select_signature<'a, 'input>(
    doc: &'a roxmltree::Document<'input>,
    id_map: &IdMap,
) -> Option<roxmltree::Node<'a, 'input>> {
    let root = doc.root_element();
    doc.descendants()
        .filter(|n| is_named(n, ns::DSIG, ns::node::SIGNATURE))
        .min_by_key(|sig| {
            let targets = reference_targets(doc, id_map, *sig);
            if targets.iter().any(|t| t.id() == root.id()) {
                0
            } else if targets.iter().any(|t| xpath::is_ancestor_or_self(*t, *sig)) {
                1
            } else {
                2
            }
        })
}

/// Elements named by the same-document References of `sig`. Unresolvable
/// or ambiguous IDs are skipped here and reported when digesting.
fn reference_targets<'a, 'input>(
    doc: &'a roxmltree::Document<'input>,
    id_map: &IdMap,
    sig: roxmltree::Node<'a, 'input>,
) -> Vec<roxmltree::Node<'a, 'input>> {
    let Some(signed_info) = find_child_element(sig, ns::DSIG, ns::node::SIGNED_INFO) else {
        return Vec::new();
    };
    find_child_elements(signed_info, ns::DSIG, ns::node::REFERENCE)
        .into_iter()
        .filter_map(|reference| {
            let uri = reference.attribute(ns::attr::URI).unwrap_or("");
            if uri.is_empty() || uri == "#xpointer(/)" {
                return Some(doc.root_element());
            }
            let fragment = xpath::parse_same_document_ref(uri)?;
            let id = xpath::parse_xpointer_id(fragment).unwrap_or(fragment);
            xpath::resolve_id(doc, id_map, id).ok()
        })
        .collect()
}

fn resolve_key(
    opts: &VerifyOptions,
    key_info: KeyInfoContent,
) -> Result<(Option<Certificate>, PublicKey), Error> {
    if let Some(cert) = &opts.certificate {
        if key_info.references(cert) == Some(false) {
            log::warn!("KeyInfo references a different certificate than the one configured");
        }
        let key = cert.public_key()?.clone();
        return Ok((Some(cert.clone()), key));
    }
    if let Some(cert) = key_info.certificates.into_iter().next() {
        let key = cert.public_key()?.clone();
        return Ok((Some(cert), key));
    }
    if let Some(key) = key_info.key_value {
        return Ok((None, key));
    }
    Err(Error::Key("no verification key available".into()))
}

fn check_trust(certificate: Option<&Certificate>, opts: &VerifyOptions) -> Option<Failure> {
    let untrusted = |expected: &str, actual: String| Failure::UntrustedIssuer {
        expected: expected.to_owned(),
        actual,
    };

    if let Some(expected) = &opts.expected_issuer {
        let expected = expected.trim();
        let actual = certificate
            .map(|c| issuer_name(c, &opts.issuer_name_style))
            .unwrap_or_default();
        if actual != expected {
            log::debug!("issuer \"{actual}\" does not match expected \"{expected}\"");
            return Some(untrusted(expected, actual));
        }
    }

    if let Some(expected) = &opts.expected_thumbprint {
        let wanted: String = expected
            .chars()
            .filter(|c| !c.is_whitespace() && *c != ':')
            .collect();
        let matches = certificate.is_some_and(|c| {
            wanted.eq_ignore_ascii_case(&thumbprint(c, ThumbprintEncoding::Hex))
                || wanted.eq_ignore_ascii_case(&thumbprint(c, ThumbprintEncoding::Base64))
        });
        if !matches {
            let actual = certificate
                .map(|c| thumbprint(c, ThumbprintEncoding::Hex))
                .unwrap_or_default();
            log::debug!("thumbprint {actual} does not match expected {wanted}");
            return Some(untrusted(&wanted, actual));
        }
    }

    if let Some(ca) = &opts.trusted_certificate {
        let Some(cert) = certificate else {
            return Some(untrusted(&ca.subject_dn(), String::new()));
        };
        let now = opts.now.unwrap_or_else(SystemTime::now);
        if let Err(e) = verify_issued_by(cert, ca).and_then(|()| check_validity(cert, now)) {
            log::debug!("trusted certificate check failed: {e}");
            return Some(untrusted(&ca.subject_dn(), cert.issuer_dn()));
        }
    }
    None
}

fn required_child<'a, 'input>(
    node: roxmltree::Node<'a, 'input>,
    local: &str,
) -> Result<roxmltree::Node<'a, 'input>, Error> {
    find_child_element(node, ns::DSIG, local).ok_or_else(|| {
        Error::XmlStructure(format!(
            "{} is missing its {local} element",
            node.tag_name().name()
        ))
    })
}

fn algorithm_of<'a>(node: roxmltree::Node<'a, '_>) -> Result<&'a str, Error> {
    node.attribute(ns::attr::ALGORITHM).ok_or_else(|| {
        Error::XmlStructure(format!(
            "{} is missing its Algorithm attribute",
            node.tag_name().name()
        ))
    })
}

fn decode_b64(text: &str, what: &str) -> Result<Vec<u8>, Error> {
    let clean: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    base64::engine::general_purpose::STANDARD
        .decode(clean)
        .map_err(|e| Error::Base64(format!("{what}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::SignOptions;
    use crate::sign::{sign, top_level_signatures};
    use std::time::Duration;
    use xsig_core::algorithm;
    use xsig_keys::{load_certificate, load_private_key, IssuerNameStyle, KeyIdentifier, PrivateKey};

    const KEY1: &str = include_str!("../../../test-data/keys/key1.pem");
    const EC: &str = include_str!("../../../test-data/keys/ec.pem");
    const CERT_A: &str = include_str!("../../../test-data/keys/cert-a.pem");
    const CERT_B: &str = include_str!("../../../test-data/keys/cert-b.pem");
    const CERT_C: &str = include_str!("../../../test-data/keys/cert-c.pem");
    const CERT_EC: &str = include_str!("../../../test-data/keys/cert-ec.pem");
    const CA1: &str = include_str!("../../../test-data/keys/ca1.pem");
    const CA2: &str = include_str!("../../../test-data/keys/ca2.pem");

    const ORDER: &str = r#"<?xml version="1.0"?>
<po:order xmlns:po="urn:example:po" id="o-1">
  <po:item sku="A1">2</po:item>
  <!-- internal -->
  <po:note>rush</po:note>
</po:order>"#;

    fn key1() -> PrivateKey {
        load_private_key(KEY1, None).unwrap()
    }

    fn cert(pem: &str) -> Certificate {
        load_certificate(pem).unwrap()
    }

    fn signed_with(cert_pem: &str, opts: &SignOptions) -> String {
        sign(ORDER, &key1(), Some(&cert(cert_pem)), opts).unwrap()
    }

    fn verdict(xml: &str, opts: &VerifyOptions) -> Verdict {
        verify(xml, opts).unwrap()
    }

    #[test]
    fn rsa_sha256_round_trip() {
        let signed = signed_with(CERT_A, &SignOptions::default());
        match verdict(&signed, &VerifyOptions::default()) {
            Verdict::Valid { certificate } => {
                assert_eq!(certificate.unwrap(), cert(CERT_A));
            }
            other => panic!("expected valid, got {other:?}"),
        }
    }

    #[test]
    fn rsa_sha1_round_trip() {
        let opts = SignOptions::default()
            .with_signature_method("rsa-sha1")
            .and_then(|o| o.with_digest_method("sha1"))
            .unwrap();
        let signed = signed_with(CERT_A, &opts);
        assert!(signed.contains(algorithm::RSA_SHA1));
        assert!(verdict(&signed, &VerifyOptions::default()).is_valid());
    }

    #[test]
    fn exclusive_c14n_round_trip() {
        for name in ["exc-c14n", "exc-c14n-with-comments", "c14n-with-comments"] {
            let opts = SignOptions::default().with_c14n_method(name).unwrap();
            let signed = signed_with(CERT_A, &opts);
            assert!(verdict(&signed, &VerifyOptions::default()).is_valid(), "{name}");
        }
    }

    #[test]
    fn reference_id_round_trip() {
        let xml = r#"<env><hdr>h</hdr><body ID="b-7"><x>1</x></body></env>"#;
        let opts = SignOptions {
            reference_id: Some("b-7".into()),
            ..SignOptions::default()
        };
        let signed = sign(xml, &key1(), None, &opts).unwrap();
        assert!(verdict(&signed, &VerifyOptions::default()).is_valid());

        // Content outside the referenced element is not covered.
        let edited = signed.replace("<hdr>h</hdr>", "<hdr>changed</hdr>");
        assert!(verdict(&edited, &VerifyOptions::default()).is_valid());

        let tampered = signed.replace("<x>1</x>", "<x>2</x>");
        assert!(!verdict(&tampered, &VerifyOptions::default()).is_valid());
    }

    #[test]
    fn ec_round_trip() {
        let ec = load_private_key(EC, None).unwrap();
        let opts = SignOptions::default()
            .with_signature_method("ecdsa-sha256")
            .unwrap();
        let signed = sign(ORDER, &ec, Some(&cert(CERT_EC)), &opts).unwrap();
        assert!(verdict(&signed, &VerifyOptions::default()).is_valid());
    }

    #[test]
    fn key_value_and_identifier_variants() {
        let opts = SignOptions {
            key_identifier: Some(KeyIdentifier::RsaKeyValue),
            ..SignOptions::default()
        };
        let signed = signed_with(CERT_A, &opts);
        match verdict(&signed, &VerifyOptions::default()) {
            Verdict::Valid { certificate } => assert!(certificate.is_none()),
            other => panic!("expected valid, got {other:?}"),
        }

        for identifier in [KeyIdentifier::Thumbprint, KeyIdentifier::IssuerSerial] {
            let opts = SignOptions {
                key_identifier: Some(identifier),
                ..SignOptions::default()
            };
            let signed = signed_with(CERT_A, &opts);
            let err = verify(&signed, &VerifyOptions::default()).unwrap_err();
            assert_eq!(err.to_string(), "KeyError: no verification key available");

            let external = VerifyOptions {
                certificate: Some(cert(CERT_A)),
                ..VerifyOptions::default()
            };
            assert!(verdict(&signed, &external).is_valid());
        }
    }

    #[test]
    fn outer_signature_is_checked_before_inner_one() {
        let xml = r#"<env><hdr>h</hdr><body Id="b"><x>1</x></body></env>"#;
        let inner = SignOptions {
            reference_id: Some("b".into()),
            ..SignOptions::default()
        };
        let once = sign(xml, &key1(), None, &inner).unwrap();
        let twice = sign(&once, &key1(), Some(&cert(CERT_A)), &SignOptions::default()).unwrap();

        // Only the outer signature carries a certificate.
        match verdict(&twice, &VerifyOptions::default()) {
            Verdict::Valid { certificate } => assert_eq!(certificate.unwrap(), cert(CERT_A)),
            other => panic!("expected valid, got {other:?}"),
        }

        // The inner signature alone would still verify this edit.
        let edited = twice.replace("<hdr>h</hdr>", "<hdr>changed</hdr>");
        assert!(matches!(
            verdict(&edited, &VerifyOptions::default()),
            Verdict::Invalid { failure: Failure::DigestMismatch { .. }, .. }
        ));

        assert_eq!(remove_signature(&twice).unwrap(), once);
    }

    #[test]
    fn reused_id_is_refused() {
        let xml = r#"<r><a Id="x">pay 10</a></r>"#;
        let opts = SignOptions {
            reference_id: Some("x".into()),
            ..SignOptions::default()
        };
        let signed = sign(xml, &key1(), Some(&cert(CERT_A)), &opts).unwrap();
        assert!(verdict(&signed, &VerifyOptions::default()).is_valid());

        let forged = signed.replacen("<r>", r#"<r><a Id="x">pay 1000000</a>"#, 1);
        let err = verify(&forged, &VerifyOptions::default()).unwrap_err();
        assert_eq!(err.to_string(), "StateError: duplicate id x");
    }

    #[test]
    fn tampered_content_is_digest_mismatch() {
        let signed = signed_with(CERT_A, &SignOptions::default());
        let tampered = signed.replace(">rush<", ">slow<");
        match verdict(&tampered, &VerifyOptions::default()) {
            Verdict::Invalid { failure, .. } => {
                assert_eq!(failure, Failure::DigestMismatch { uri: String::new() });
                assert_eq!(failure.to_string(), "digest mismatch");
                assert!(matches!(failure.into_error(), Error::Validation(_)));
            }
            other => panic!("expected invalid, got {other:?}"),
        }
    }

    #[test]
    fn comments_and_whitespace_outside_content_keep_digest() {
        let signed = signed_with(CERT_A, &SignOptions::default());
        let commented = signed.replace("<!-- internal -->", "<!-- edited -->");
        assert!(verdict(&commented, &VerifyOptions::default()).is_valid());
    }

    #[test]
    fn wrong_external_certificate_is_signature_mismatch() {
        let signed = signed_with(CERT_A, &SignOptions::default());
        let opts = VerifyOptions {
            certificate: Some(cert(CERT_C)),
            ..VerifyOptions::default()
        };
        match verdict(&signed, &opts) {
            Verdict::Invalid { failure, .. } => assert_eq!(failure, Failure::SignatureMismatch),
            other => panic!("expected invalid, got {other:?}"),
        }
    }

    #[test]
    fn issuer_mismatch_versus_no_issuer_check() {
        let signed = signed_with(CERT_B, &SignOptions::default());
        assert!(verdict(&signed, &VerifyOptions::default()).is_valid());

        let opts = VerifyOptions {
            expected_issuer: Some("Example Issuing CA".into()),
            ..VerifyOptions::default()
        };
        match verdict(&signed, &opts) {
            Verdict::Invalid { failure, .. } => {
                assert_eq!(
                    failure,
                    Failure::UntrustedIssuer {
                        expected: "Example Issuing CA".into(),
                        actual: "Other Root CA".into(),
                    }
                );
                assert_eq!(failure.to_string(), "untrusted issuer");
                assert!(matches!(failure.into_error(), Error::Trust(_)));
            }
            other => panic!("expected invalid, got {other:?}"),
        }
    }

    #[test]
    fn issuer_check_follows_name_style() {
        let signed = signed_with(CERT_A, &SignOptions::default());
        let short = VerifyOptions {
            expected_issuer: Some("Example Issuing CA".into()),
            ..VerifyOptions::default()
        };
        assert!(verdict(&signed, &short).is_valid());

        let full = VerifyOptions {
            expected_issuer: Some("CN=Example Issuing CA,O=Example Org,C=US".into()),
            issuer_name_style: IssuerNameStyle::SubjectDn,
            ..VerifyOptions::default()
        };
        assert!(verdict(&signed, &full).is_valid());

        let fallback = VerifyOptions {
            expected_issuer: Some("Example Issuing CA".into()),
            issuer_name_style: IssuerNameStyle::Unrecognized("LONG".into()),
            ..VerifyOptions::default()
        };
        assert!(verdict(&signed, &fallback).is_valid());
    }

    #[test]
    fn thumbprint_check() {
        let signed = signed_with(CERT_A, &SignOptions::default());
        for expected in [
            "57CD8FEA7CDF08A8B682B9C20194BFFBBB1E4171",
            "57:cd:8f:ea:7c:df:08:a8:b6:82:b9:c2:01:94:bf:fb:bb:1e:41:71",
            "V82P6nzfCKi2grnCAZS/+7seQXE=",
        ] {
            let opts = VerifyOptions {
                expected_thumbprint: Some(expected.into()),
                ..VerifyOptions::default()
            };
            assert!(verdict(&signed, &opts).is_valid(), "{expected}");
        }

        let opts = VerifyOptions {
            expected_thumbprint: Some("e3eff15e4bc5ae092f8c00dda2724f050f74c30e".into()),
            ..VerifyOptions::default()
        };
        assert!(matches!(
            verdict(&signed, &opts),
            Verdict::Invalid { failure: Failure::UntrustedIssuer { .. }, .. }
        ));
    }

    #[test]
    fn trusted_certificate_check() {
        let signed = signed_with(CERT_A, &SignOptions::default());
        let cert_a = cert(CERT_A);
        let now = cert_a.not_before() + Duration::from_secs(86_400);

        let trusted = VerifyOptions {
            trusted_certificate: Some(cert(CA1)),
            now: Some(now),
            ..VerifyOptions::default()
        };
        assert!(verdict(&signed, &trusted).is_valid());

        let other_ca = VerifyOptions {
            trusted_certificate: Some(cert(CA2)),
            now: Some(now),
            ..VerifyOptions::default()
        };
        assert!(matches!(
            verdict(&signed, &other_ca),
            Verdict::Invalid { failure: Failure::UntrustedIssuer { .. }, .. }
        ));

        let too_early = VerifyOptions {
            trusted_certificate: Some(cert(CA1)),
            now: Some(cert_a.not_before() - Duration::from_secs(60)),
            ..VerifyOptions::default()
        };
        assert!(!verdict(&signed, &too_early).is_valid());
    }

    #[test]
    fn missing_signature() {
        match verdict(ORDER, &VerifyOptions::default()) {
            Verdict::Invalid { failure, .. } => {
                assert_eq!(failure, Failure::MissingSignature);
                assert_eq!(failure.to_string(), "missing signature");
            }
            other => panic!("expected invalid, got {other:?}"),
        }
    }

    #[test]
    fn unsupported_canonicalization_is_hard_error() {
        let signed = signed_with(CERT_A, &SignOptions::default());
        let broken = signed.replacen(algorithm::C14N, "urn:example:c14n", 1);
        let err = verify(&broken, &VerifyOptions::default()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedAlgorithm(_)));
    }

    #[test]
    fn missing_signed_info_is_structure_error() {
        let xml = format!(
            r#"<a><ds:Signature xmlns:ds="{}"><ds:SignatureValue/></ds:Signature></a>"#,
            ns::DSIG
        );
        let err = verify(&xml, &VerifyOptions::default()).unwrap_err();
        assert!(matches!(err, Error::XmlStructure(_)));
        assert!(err.to_string().starts_with("ParseError: "));
    }

    #[test]
    fn remove_signature_restores_document() {
        let signed = signed_with(CERT_A, &SignOptions::default());
        assert_eq!(top_level_signatures(&signed), 1);
        let stripped = remove_signature(&signed).unwrap();
        assert_eq!(stripped, ORDER);
        assert_eq!(remove_signature(ORDER).unwrap(), ORDER);
    }

    #[test]
    fn resigning_after_removal() {
        let signed = signed_with(CERT_A, &SignOptions::default());
        let again = signed_with(CERT_A, &SignOptions::default());
        // RSA PKCS#1 v1.5 is deterministic.
        assert_eq!(signed, again);
        let stripped = remove_signature(&signed).unwrap();
        let resigned = sign(&stripped, &key1(), Some(&cert(CERT_A)), &SignOptions::default()).unwrap();
        assert!(verdict(&resigned, &VerifyOptions::default()).is_valid());
    }
}
