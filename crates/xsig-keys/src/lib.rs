#![forbid(unsafe_code)]

//! Key material for the xsig XML-DSig engine.
//!
//! Loads PEM private keys (PKCS#8, encrypted PKCS#8, PKCS#1, SEC1 and the
//! legacy OpenSSL `Proc-Type`/`DEK-Info` form) and X.509 certificates,
//! formats distinguished names, and reads and writes `<KeyInfo>`.

pub mod key;
pub mod keyinfo;
pub mod loader;
pub mod name;
pub mod x509;

pub use key::{PrivateKey, PublicKey};
pub use keyinfo::{KeyIdentifier, KeyInfoContent};
pub use loader::load_private_key;
pub use name::{common_name, IssuerNameStyle};
pub use x509::{load_certificate, reform_indents, thumbprint, Certificate, ThumbprintEncoding};
