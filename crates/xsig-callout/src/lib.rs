#![forbid(unsafe_code)]

//! Host boundary for the xsig XML-DSig engine.
//!
//! A callout is built once from an immutable property map and executed
//! against a per-invocation [`VariableStore`]. It reads its document from
//! the store, signs or validates it, and reports the outcome through
//! `xmldsig_*` variables plus an [`ExecutionResult`].

pub mod message;
pub mod properties;
pub mod report;
pub mod sign;
pub mod source;
pub mod validate;

pub use message::{MemoryStore, VariableStore};
pub use properties::{interpolate, Properties, PropertyResolver};
pub use report::{var_name, ExecutionResult};
pub use sign::SignCallout;
pub use validate::ValidateCallout;
