#![forbid(unsafe_code)]

//! Transform pipeline for XML-DSig references.
//!
//! A reference is dereferenced to a node set of a parsed document, then
//! each `<Transform>` is applied in order until octets remain for the
//! digest.

pub mod enveloped;
pub mod pipeline;
pub mod uri;

pub use pipeline::{process_reference, C14nTransform, Transform, TransformData, TransformPipeline};
