#![forbid(unsafe_code)]

//! Options for signature operations.

use std::time::SystemTime;
use xsig_c14n::C14nMode;
use xsig_core::{algorithm, Error};
use xsig_crypto::AlgorithmRegistry;
use xsig_keys::{Certificate, IssuerNameStyle, KeyIdentifier};

/// How to build a signature.
#[derive(Debug, Clone)]
pub struct SignOptions {
    /// SignatureMethod algorithm URI.
    pub signature_method: String,
    /// DigestMethod algorithm URI.
    pub digest_method: String,
    pub c14n_method: C14nMode,
    /// Sign the element with this ID instead of the whole document.
    pub reference_id: Option<String>,
    /// `None` picks `X509CertDirect` when a certificate is given and
    /// `RsaKeyValue` otherwise.
    pub key_identifier: Option<KeyIdentifier>,
    pub issuer_name_style: IssuerNameStyle,
    /// Namespace prefix for the signature elements; empty means the
    /// default namespace.
    pub signature_prefix: String,
}

impl Default for SignOptions {
    fn default() -> Self {
        Self {
            signature_method: algorithm::RSA_SHA256.to_owned(),
            digest_method: algorithm::SHA256.to_owned(),
            c14n_method: C14nMode::Inclusive,
            reference_id: None,
            key_identifier: None,
            issuer_name_style: IssuerNameStyle::Short,
            signature_prefix: "ds".to_owned(),
        }
    }
}

impl SignOptions {
    /// Set the signature method from a short name (`rsa-sha1`) or URI.
    pub fn with_signature_method(mut self, name: &str) -> Result<Self, Error> {
        self.signature_method = AlgorithmRegistry::signature_uri(name)?.to_owned();
        Ok(self)
    }

    /// Set the digest method from a short name (`sha1`) or URI.
    pub fn with_digest_method(mut self, name: &str) -> Result<Self, Error> {
        self.digest_method = AlgorithmRegistry::digest_uri(name)?.to_owned();
        Ok(self)
    }

    /// Set the canonicalization method from a short name (`exc-c14n`) or URI.
    pub fn with_c14n_method(mut self, name: &str) -> Result<Self, Error> {
        self.c14n_method = C14nMode::from_name(name).ok_or_else(|| {
            Error::Configuration(format!("unsupported c14n-method {}", name.trim()))
        })?;
        Ok(self)
    }
}

/// How to check a signature.
#[derive(Debug, Clone, Default)]
pub struct VerifyOptions {
    /// Verify with this certificate instead of whatever `<KeyInfo>` holds.
    pub certificate: Option<Certificate>,
    /// Required issuer, compared with the issuer rendered in
    /// `issuer_name_style`.
    pub expected_issuer: Option<String>,
    /// Required SHA-1 thumbprint, hex or base64.
    pub expected_thumbprint: Option<String>,
    /// The certificate must be issued by this CA and currently valid.
    pub trusted_certificate: Option<Certificate>,
    pub issuer_name_style: IssuerNameStyle,
    /// Clock for validity checks; `None` uses the system time.
    pub now: Option<SystemTime>,
}
