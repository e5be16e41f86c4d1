#![forbid(unsafe_code)]

//! XML Digital Signature (XML-DSig) signing and verification.
//!
//! Signing builds a fresh enveloped `<Signature>` over the whole document
//! or one element. Verification returns a [`Verdict`] that tells a
//! signature disagreement apart from a hard failure.

pub mod options;
pub mod sign;
pub mod verify;

pub use options::{SignOptions, VerifyOptions};
pub use sign::sign;
pub use verify::{remove_signature, verify, Failure, Verdict};
