#![forbid(unsafe_code)]

//! Algorithm registry: URI factories plus option-name resolution.

use crate::digest::DigestAlgorithm;
use crate::sign::SignatureAlgorithm;
use xsig_core::{algorithm, Error};

/// Central registry for all cryptographic algorithms.
pub struct AlgorithmRegistry;

impl AlgorithmRegistry {
    /// Look up a digest algorithm by URI.
    pub fn digest(uri: &str) -> Result<Box<dyn DigestAlgorithm>, Error> {
        crate::digest::from_uri(uri)
    }

    /// Look up a signature algorithm by URI.
    pub fn signature(uri: &str) -> Result<Box<dyn SignatureAlgorithm>, Error> {
        crate::sign::from_uri(uri)
    }

    /// Resolve a `signing-method` option value (short name or URI).
    pub fn signature_uri(name: &str) -> Result<&'static str, Error> {
        lookup(name, SIGNATURE_NAMES, "signing-method")
    }

    /// Resolve a `digest-method` option value (short name or URI).
    pub fn digest_uri(name: &str) -> Result<&'static str, Error> {
        lookup(name, DIGEST_NAMES, "digest-method")
    }
}

const SIGNATURE_NAMES: &[(&str, &str)] = &[
    ("rsa-sha1", algorithm::RSA_SHA1),
    ("rsa-sha256", algorithm::RSA_SHA256),
    ("rsa-sha384", algorithm::RSA_SHA384),
    ("rsa-sha512", algorithm::RSA_SHA512),
    ("ecdsa-sha256", algorithm::ECDSA_SHA256),
    ("ecdsa-sha384", algorithm::ECDSA_SHA384),
];

const DIGEST_NAMES: &[(&str, &str)] = &[
    ("sha1", algorithm::SHA1),
    ("sha256", algorithm::SHA256),
    ("sha384", algorithm::SHA384),
    ("sha512", algorithm::SHA512),
];

fn lookup(
    name: &str,
    table: &[(&'static str, &'static str)],
    option: &str,
) -> Result<&'static str, Error> {
    let wanted = name.trim();
    let uri = table
        .iter()
        .find(|(short, uri)| short.eq_ignore_ascii_case(wanted) || *uri == wanted)
        .map(|(_, uri)| *uri)
        .ok_or_else(|| Error::Configuration(format!("unsupported {option} {wanted}")))?;
    log::debug!("{option} {wanted} selects {uri}");
    Ok(uri)
}
