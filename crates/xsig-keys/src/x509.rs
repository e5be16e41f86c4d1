#![forbid(unsafe_code)]

//! X.509 certificates: loading, identity, thumbprints and issuer checks.

use crate::key::PublicKey;
use crate::name::IssuerNameStyle;
use base64::Engine;
use der::{Decode, Encode};
use std::time::SystemTime;
use xsig_core::{algorithm, Error};

const CANNOT_INSTANTIATE: &str = "cannot instantiate certificate";

/// Output encoding for [`thumbprint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbprintEncoding {
    Hex,
    Base64,
}

/// A parsed X.509 certificate with its DER encoding.
#[derive(Clone)]
pub struct Certificate {
    der: Vec<u8>,
    inner: x509_cert::Certificate,
    public_key: Option<PublicKey>,
}

impl Certificate {
    /// Parse a DER-encoded certificate.
    pub fn from_der(der: &[u8]) -> Result<Self, Error> {
        let inner = x509_cert::Certificate::from_der(der).map_err(|e| {
            log::debug!("X.509 parse failed: {e}");
            Error::Key(CANNOT_INSTANTIATE.into())
        })?;
        let public_key = spki_public_key(&inner.tbs_certificate.subject_public_key_info);
        if public_key.is_none() {
            log::debug!(
                "certificate key algorithm {} is not usable for XML signatures",
                inner.tbs_certificate.subject_public_key_info.algorithm.oid
            );
        }
        Ok(Self {
            der: der.to_vec(),
            inner,
            public_key,
        })
    }

    /// The DER encoding.
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// Base64 DER, as carried in `<X509Certificate>`.
    pub fn base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.der)
    }

    /// Subject DN as an RFC 4514 string.
    pub fn subject_dn(&self) -> String {
        self.inner.tbs_certificate.subject.to_string()
    }

    /// Issuer DN as an RFC 4514 string.
    pub fn issuer_dn(&self) -> String {
        self.inner.tbs_certificate.issuer.to_string()
    }

    /// Serial number in decimal, as used by `<X509SerialNumber>`.
    pub fn serial_decimal(&self) -> String {
        rsa::BigUint::from_bytes_be(self.inner.tbs_certificate.serial_number.as_bytes())
            .to_string()
    }

    pub fn not_before(&self) -> SystemTime {
        self.inner.tbs_certificate.validity.not_before.to_system_time()
    }

    pub fn not_after(&self) -> SystemTime {
        self.inner.tbs_certificate.validity.not_after.to_system_time()
    }

    /// The subject public key.
    pub fn public_key(&self) -> Result<&PublicKey, Error> {
        self.public_key.as_ref().ok_or_else(|| {
            Error::Key(format!(
                "unsupported public key algorithm {} in certificate",
                self.inner.tbs_certificate.subject_public_key_info.algorithm.oid
            ))
        })
    }
}

impl std::fmt::Debug for Certificate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Certificate")
            .field("subject", &self.subject_dn())
            .field("issuer", &self.issuer_dn())
            .field("serial", &self.serial_decimal())
            .finish()
    }
}

impl PartialEq for Certificate {
    fn eq(&self, other: &Self) -> bool {
        self.der == other.der
    }
}

fn spki_public_key(spki: &spki::SubjectPublicKeyInfoOwned) -> Option<PublicKey> {
    use spki::DecodePublicKey;
    let spki_der = spki.to_der().ok()?;
    if let Ok(pk) = rsa::RsaPublicKey::from_public_key_der(&spki_der) {
        return Some(PublicKey::Rsa(pk));
    }
    if let Ok(vk) = p256::ecdsa::VerifyingKey::from_public_key_der(&spki_der) {
        return Some(PublicKey::EcP256(vk));
    }
    if let Ok(vk) = p384::ecdsa::VerifyingKey::from_public_key_der(&spki_der) {
        return Some(PublicKey::EcP384(vk));
    }
    None
}

/// Normalize PEM text that has been re-indented by surrounding config.
///
/// Trims the text, then collapses each line break and the blanks that
/// follow it into a single `\n`.
pub fn reform_indents(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.trim().chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\r' || c == '\n' {
            if c == '\r' && chars.peek() == Some(&'\n') {
                chars.next();
            }
            while matches!(chars.peek(), Some(' ' | '\t')) {
                chars.next();
            }
            out.push('\n');
        } else {
            out.push(c);
        }
    }
    out
}

/// Load a PEM `CERTIFICATE`. Every failure is reported as
/// `KeyError: cannot instantiate certificate`.
pub fn load_certificate(pem: &str) -> Result<Certificate, Error> {
    let reformed = reform_indents(pem);
    let (label, der) = pem_rfc7468::decode_vec(reformed.as_bytes()).map_err(|e| {
        log::debug!("certificate PEM decode failed: {e}");
        Error::Key(CANNOT_INSTANTIATE.into())
    })?;
    if label != "CERTIFICATE" {
        log::debug!("expected CERTIFICATE PEM label, got {label}");
        return Err(Error::Key(CANNOT_INSTANTIATE.into()));
    }
    Certificate::from_der(&der)
}

/// SHA-1 over the certificate DER.
pub fn thumbprint(cert: &Certificate, encoding: ThumbprintEncoding) -> String {
    let digest = xsig_crypto::digest::sha1(cert.der());
    match encoding {
        ThumbprintEncoding::Hex => hex::encode(digest),
        ThumbprintEncoding::Base64 => base64::engine::general_purpose::STANDARD.encode(digest),
    }
}

/// The certificate's issuer rendered in `style`.
pub fn issuer_name(cert: &Certificate, style: &IssuerNameStyle) -> String {
    style.format(&cert.issuer_dn())
}

/// Fail with `TrustError` unless `now` is inside the validity period.
pub fn check_validity(cert: &Certificate, now: SystemTime) -> Result<(), Error> {
    if now < cert.not_before() {
        return Err(Error::Trust(format!(
            "certificate {} is not yet valid",
            cert.subject_dn()
        )));
    }
    if now > cert.not_after() {
        return Err(Error::Trust(format!(
            "certificate {} has expired",
            cert.subject_dn()
        )));
    }
    Ok(())
}

/// Fail with `TrustError` unless `cert` names `issuer` as its issuer and
/// carries a valid signature from the issuer's key.
pub fn verify_issued_by(cert: &Certificate, issuer: &Certificate) -> Result<(), Error> {
    let tbs = &cert.inner.tbs_certificate;
    if tbs.issuer != issuer.inner.tbs_certificate.subject {
        return Err(Error::Trust(format!(
            "certificate issuer {} does not match {}",
            cert.issuer_dn(),
            issuer.subject_dn()
        )));
    }

    let tbs_der = tbs
        .to_der()
        .map_err(|e| Error::Trust(format!("failed to encode TBS: {e}")))?;
    let sig_bytes = cert
        .inner
        .signature
        .as_bytes()
        .ok_or_else(|| Error::Trust("certificate has no signature bytes".into()))?;

    const SHA1_RSA: &str = "1.2.840.113549.1.1.5";
    const SHA256_RSA: &str = "1.2.840.113549.1.1.11";
    const SHA384_RSA: &str = "1.2.840.113549.1.1.12";
    const SHA512_RSA: &str = "1.2.840.113549.1.1.13";
    const ECDSA_SHA256: &str = "1.2.840.10045.4.3.2";
    const ECDSA_SHA384: &str = "1.2.840.10045.4.3.3";

    let oid = cert.inner.signature_algorithm.oid.to_string();
    let issuer_key = issuer.public_key().map_err(|e| Error::Trust(e.to_string()))?;
    let ok = match (oid.as_str(), issuer_key) {
        (SHA1_RSA, PublicKey::Rsa(_)) => verify_rsa(algorithm::RSA_SHA1, issuer_key, &tbs_der, sig_bytes)?,
        (SHA256_RSA, PublicKey::Rsa(_)) => verify_rsa(algorithm::RSA_SHA256, issuer_key, &tbs_der, sig_bytes)?,
        (SHA384_RSA, PublicKey::Rsa(_)) => verify_rsa(algorithm::RSA_SHA384, issuer_key, &tbs_der, sig_bytes)?,
        (SHA512_RSA, PublicKey::Rsa(_)) => verify_rsa(algorithm::RSA_SHA512, issuer_key, &tbs_der, sig_bytes)?,
        // Certificate ECDSA signatures are DER-encoded, not r||s.
        (ECDSA_SHA256, PublicKey::EcP256(vk)) => {
            use signature::Verifier;
            p256::ecdsa::DerSignature::from_bytes(sig_bytes)
                .is_ok_and(|sig| vk.verify(&tbs_der, &sig).is_ok())
        }
        (ECDSA_SHA384, PublicKey::EcP384(vk)) => {
            use signature::Verifier;
            p384::ecdsa::DerSignature::from_bytes(sig_bytes)
                .is_ok_and(|sig| vk.verify(&tbs_der, &sig).is_ok())
        }
        (other, key) => {
            return Err(Error::Trust(format!(
                "unsupported certificate signature algorithm {other} with {} issuer key",
                key.kind()
            )));
        }
    };
    if ok {
        Ok(())
    } else {
        Err(Error::Trust(format!(
            "certificate {} is not signed by {}",
            cert.subject_dn(),
            issuer.subject_dn()
        )))
    }
}

fn verify_rsa(uri: &str, key: &PublicKey, tbs_der: &[u8], signature: &[u8]) -> Result<bool, Error> {
    xsig_crypto::sign::from_uri(uri)?
        .verify(&key.to_signing_key(), tbs_der, signature)
        .map_err(|e| Error::Trust(e.to_string()))
}
