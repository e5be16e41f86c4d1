#![forbid(unsafe_code)]

//! Cryptographic algorithm implementations for the xsig XML-DSig engine.
//!
//! Provides traits and implementations for the crypto operations needed by
//! signing and validation (digests and signatures) plus the block ciphers
//! and key derivation used to open legacy encrypted PEM keys.

pub mod cipher;
pub mod digest;
pub mod kdf;
pub mod registry;
pub mod sign;

pub use digest::DigestAlgorithm;
pub use registry::AlgorithmRegistry;
pub use sign::{SignatureAlgorithm, SigningKey};
