#![forbid(unsafe_code)]

//! `<ds:KeyInfo>` writing (on sign) and reading (on verify).

use crate::key::PublicKey;
use crate::name::IssuerNameStyle;
use crate::x509::{issuer_name, Certificate};
use base64::Engine;
use rsa::traits::PublicKeyParts;
use xsig_core::{algorithm, ns, Error};
use xsig_xml::document::{find_child_element, is_named};
use xsig_xml::XmlWriter;

/// What the signer puts in `<KeyInfo>` to identify the verification key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyIdentifier {
    /// The certificate itself, base64 in `X509Data/X509Certificate`.
    X509CertDirect,
    /// The certificate's SHA-1 thumbprint in `dsig11:X509Digest`.
    Thumbprint,
    /// `X509Data/X509IssuerSerial`.
    IssuerSerial,
    /// The raw RSA public key in `KeyValue/RSAKeyValue`.
    RsaKeyValue,
}

impl KeyIdentifier {
    /// Parse a `key-identifier-type` option value.
    pub fn from_option(value: &str) -> Result<Self, Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "X509_CERT_DIRECT" => Ok(Self::X509CertDirect),
            "THUMBPRINT" => Ok(Self::Thumbprint),
            "ISSUER_SERIAL" => Ok(Self::IssuerSerial),
            "RSA_KEY_VALUE" => Ok(Self::RsaKeyValue),
            _ => Err(Error::Configuration(format!(
                "unsupported key-identifier-type {value}"
            ))),
        }
    }

    fn option_name(self) -> &'static str {
        match self {
            Self::X509CertDirect => "X509_CERT_DIRECT",
            Self::Thumbprint => "THUMBPRINT",
            Self::IssuerSerial => "ISSUER_SERIAL",
            Self::RsaKeyValue => "RSA_KEY_VALUE",
        }
    }
}

/// Build a qualified name from an optional prefix.
pub fn qname(prefix: &str, local: &str) -> String {
    if prefix.is_empty() {
        local.to_owned()
    } else {
        format!("{prefix}:{local}")
    }
}

/// Write a `<KeyInfo>` element identifying the signer's key.
pub fn write_key_info(
    w: &mut XmlWriter,
    prefix: &str,
    identifier: KeyIdentifier,
    cert: Option<&Certificate>,
    public_key: &PublicKey,
    style: &IssuerNameStyle,
) -> Result<(), Error> {
    let q = |local: &str| qname(prefix, local);
    let needs_cert = || {
        cert.ok_or_else(|| {
            Error::Configuration(format!(
                "key-identifier-type {} requires a certificate",
                identifier.option_name()
            ))
        })
    };
    let b64 = base64::engine::general_purpose::STANDARD;

    w.start_element(&q(ns::node::KEY_INFO), &[]);
    match identifier {
        KeyIdentifier::X509CertDirect => {
            let cert = needs_cert()?;
            w.start_element(&q(ns::node::X509_DATA), &[]);
            w.text_element(&q(ns::node::X509_CERTIFICATE), &[], &cert.base64());
            w.end_element(&q(ns::node::X509_DATA));
        }
        KeyIdentifier::Thumbprint => {
            let cert = needs_cert()?;
            let digest = xsig_crypto::digest::sha1(cert.der());
            w.start_element(&q(ns::node::X509_DATA), &[]);
            w.text_element(
                "dsig11:X509Digest",
                &[("xmlns:dsig11", ns::DSIG11), (ns::attr::ALGORITHM, algorithm::SHA1)],
                &b64.encode(digest),
            );
            w.end_element(&q(ns::node::X509_DATA));
        }
        KeyIdentifier::IssuerSerial => {
            let cert = needs_cert()?;
            w.start_element(&q(ns::node::X509_DATA), &[]);
            w.start_element(&q(ns::node::X509_ISSUER_SERIAL), &[]);
            w.text_element(&q(ns::node::X509_ISSUER_NAME), &[], &issuer_name(cert, style));
            w.text_element(&q(ns::node::X509_SERIAL_NUMBER), &[], &cert.serial_decimal());
            w.end_element(&q(ns::node::X509_ISSUER_SERIAL));
            w.end_element(&q(ns::node::X509_DATA));
        }
        KeyIdentifier::RsaKeyValue => {
            let PublicKey::Rsa(pk) = public_key else {
                return Err(Error::Key(format!(
                    "key-identifier-type RSA_KEY_VALUE requires an RSA key, got {}",
                    public_key.kind()
                )));
            };
            w.start_element(&q(ns::node::KEY_VALUE), &[]);
            w.start_element(&q(ns::node::RSA_KEY_VALUE), &[]);
            w.text_element(&q(ns::node::RSA_MODULUS), &[], &b64.encode(pk.n().to_bytes_be()));
            w.text_element(&q(ns::node::RSA_EXPONENT), &[], &b64.encode(pk.e().to_bytes_be()));
            w.end_element(&q(ns::node::RSA_KEY_VALUE));
            w.end_element(&q(ns::node::KEY_VALUE));
        }
    }
    w.end_element(&q(ns::node::KEY_INFO));
    Ok(())
}

/// Everything usable found inside a `<KeyInfo>`.
#[derive(Debug, Default)]
pub struct KeyInfoContent {
    /// Embedded certificates, in document order.
    pub certificates: Vec<Certificate>,
    /// A raw public key from `KeyValue`.
    pub key_value: Option<PublicKey>,
    /// `(digest algorithm URI, digest)` from `dsig11:X509Digest`.
    pub digest: Option<(String, Vec<u8>)>,
    /// `(issuer name, decimal serial)` from `X509IssuerSerial`.
    pub issuer_serial: Option<(String, String)>,
}

impl KeyInfoContent {
    /// Whether a digest or issuer-serial reference points at `cert`.
    /// Returns `None` when the KeyInfo carries no such reference.
    pub fn references(&self, cert: &Certificate) -> Option<bool> {
        if let Some((uri, expected)) = &self.digest {
            let actual = xsig_crypto::digest::digest(uri, cert.der()).ok()?;
            return Some(&actual == expected);
        }
        if let Some((issuer, serial)) = &self.issuer_serial {
            let issuer_matches = *issuer == cert.issuer_dn()
                || Some(issuer.as_str()) == crate::name::common_name(&cert.issuer_dn()).as_deref();
            return Some(issuer_matches && *serial == cert.serial_decimal());
        }
        None
    }
}

fn decode_b64(text: &str, what: &str) -> Result<Vec<u8>, Error> {
    let clean: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    base64::engine::general_purpose::STANDARD
        .decode(clean)
        .map_err(|e| Error::Base64(format!("{what}: {e}")))
}

fn child_text<'a>(node: roxmltree::Node<'a, '_>, ns_uri: &str, local: &str) -> Option<&'a str> {
    find_child_element(node, ns_uri, local).and_then(|n| n.text())
}

/// Read the contents of a `<KeyInfo>` element.
///
/// An embedded certificate that does not parse is a `KeyError`.
pub fn read_key_info(key_info: roxmltree::Node<'_, '_>) -> Result<KeyInfoContent, Error> {
    let mut content = KeyInfoContent::default();
    for child in key_info.children().filter(|n| n.is_element()) {
        if is_named(&child, ns::DSIG, ns::node::X509_DATA) {
            read_x509_data(child, &mut content)?;
        } else if is_named(&child, ns::DSIG, ns::node::KEY_VALUE) && content.key_value.is_none() {
            if let Some(rsa_kv) = find_child_element(child, ns::DSIG, ns::node::RSA_KEY_VALUE) {
                content.key_value = Some(read_rsa_key_value(rsa_kv)?);
            }
        } else {
            log::debug!("ignoring KeyInfo child {}", child.tag_name().name());
        }
    }
    Ok(content)
}

fn read_x509_data(x509_data: roxmltree::Node<'_, '_>, content: &mut KeyInfoContent) -> Result<(), Error> {
    for item in x509_data.children().filter(|n| n.is_element()) {
        if is_named(&item, ns::DSIG, ns::node::X509_CERTIFICATE) {
            let der = decode_b64(item.text().unwrap_or(""), "X509Certificate")?;
            content.certificates.push(Certificate::from_der(&der)?);
        } else if is_named(&item, ns::DSIG11, ns::node::X509_DIGEST) {
            let uri = item.attribute(ns::attr::ALGORITHM).unwrap_or(algorithm::SHA1);
            let digest = decode_b64(item.text().unwrap_or(""), "X509Digest")?;
            content.digest = Some((uri.to_owned(), digest));
        } else if is_named(&item, ns::DSIG, ns::node::X509_ISSUER_SERIAL) {
            let issuer = child_text(item, ns::DSIG, ns::node::X509_ISSUER_NAME).unwrap_or("");
            let serial = child_text(item, ns::DSIG, ns::node::X509_SERIAL_NUMBER).unwrap_or("");
            content.issuer_serial = Some((issuer.trim().to_owned(), serial.trim().to_owned()));
        }
    }
    Ok(())
}

/// Extract an RSA public key from `<RSAKeyValue>`.
pub fn read_rsa_key_value(rsa_kv: roxmltree::Node<'_, '_>) -> Result<PublicKey, Error> {
    let modulus = child_text(rsa_kv, ns::DSIG, ns::node::RSA_MODULUS)
        .ok_or_else(|| Error::XmlStructure("RSAKeyValue is missing Modulus".into()))?;
    let exponent = child_text(rsa_kv, ns::DSIG, ns::node::RSA_EXPONENT)
        .ok_or_else(|| Error::XmlStructure("RSAKeyValue is missing Exponent".into()))?;

    let n = rsa::BigUint::from_bytes_be(&decode_b64(modulus, "Modulus")?);
    let e = rsa::BigUint::from_bytes_be(&decode_b64(exponent, "Exponent")?);
    let public = rsa::RsaPublicKey::new(n, e)
        .map_err(|err| Error::Key(format!("invalid RSA public key: {err}")))?;
    Ok(PublicKey::Rsa(public))
}
