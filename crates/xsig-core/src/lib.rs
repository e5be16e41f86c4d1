#![forbid(unsafe_code)]

//! Shared building blocks for the xsig XML-DSig engine: the error
//! taxonomy, algorithm URIs and namespace/element name constants.

pub mod algorithm;
pub mod error;
pub mod ns;

pub use error::{Error, ErrorKind, Result};
