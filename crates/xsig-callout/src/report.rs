#![forbid(unsafe_code)]

//! Outcome reporting through `xmldsig_*` variables.

use crate::message::VariableStore;
use std::error::Error as StdError;
use xsig_core::Error;
use xsig_keys::x509::issuer_name;
use xsig_keys::{thumbprint, Certificate, IssuerNameStyle, ThumbprintEncoding};

/// Prefix of every variable the callouts write.
pub const VAR_PREFIX: &str = "xmldsig_";

/// Result handed back to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionResult {
    Success,
    Abort,
}

pub fn var_name(suffix: &str) -> String {
    format!("{VAR_PREFIX}{suffix}")
}

/// The short error text: whatever follows the last `": "` in the full
/// description, trimmed. Without a colon the whole text is returned.
pub fn short_error(exception: &str) -> String {
    match exception.rfind(':') {
        Some(idx) => {
            let mut tail = exception[idx + 1..].chars();
            tail.next();
            tail.as_str().trim().to_owned()
        }
        None => exception.to_owned(),
    }
}

/// `{:?}` of the error followed by its `source()` chain.
pub fn stack_trace(err: &(dyn StdError + 'static)) -> String {
    let mut trace = format!("{err:?}");
    let mut source = err.source();
    while let Some(cause) = source {
        trace.push_str(&format!("\ncaused by: {cause}"));
        source = cause.source();
    }
    trace
}

/// Write `xmldsig_exception`, `xmldsig_error` and, in debug mode,
/// `xmldsig_stacktrace` for a failed invocation.
pub fn set_exception_variables(err: &Error, debug: bool, store: &dyn VariableStore) {
    let exception = err.to_string();
    log::error!("{exception}");
    store.set(&var_name("error"), short_error(&exception));
    store.set(&var_name("exception"), exception);
    if debug {
        store.set(&var_name("stacktrace"), stack_trace(err));
    }
}

/// Resolve an `Unrecognized` issuer name style to `Short`, leaving an
/// `xmldsig_warning` behind.
pub fn effective_issuer_name_style(
    style: IssuerNameStyle,
    store: &dyn VariableStore,
) -> IssuerNameStyle {
    if let IssuerNameStyle::Unrecognized(value) = &style {
        log::warn!("unrecognized issuer-name-style {value}, using SHORT");
        store.set(&var_name("warning"), "unrecognized issuer-name-style".into());
    }
    style.effective()
}

/// Describe the certificate that verified a signature.
pub fn set_certificate_variables(
    cert: &Certificate,
    style: &IssuerNameStyle,
    store: &dyn VariableStore,
) {
    store.set(&var_name("cert_subject"), cert.subject_dn());
    store.set(&var_name("cert_issuer"), issuer_name(cert, style));
    store.set(
        &var_name("cert_thumbprint"),
        thumbprint(cert, ThumbprintEncoding::Hex),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MemoryStore;

    #[test]
    fn short_error_takes_text_after_last_colon() {
        assert_eq!(
            short_error("StateError: source variable resolves to null"),
            "source variable resolves to null"
        );
        assert_eq!(
            short_error("ConfigurationError: private-key resolves to an empty string"),
            "private-key resolves to an empty string"
        );
        assert_eq!(short_error("KeyError: a: b"), "b");
        assert_eq!(short_error("no colon here"), "no colon here");
        assert_eq!(short_error("ends with:"), "");
        assert_eq!(short_error("ends with:x"), "");
        assert_eq!(short_error("x:  é "), "é");
    }

    #[test]
    fn exception_variables() {
        let store = MemoryStore::new();
        let err = Error::State("source variable resolves to null".into());
        set_exception_variables(&err, false, &store);
        assert_eq!(
            store.get("xmldsig_exception").as_deref(),
            Some("StateError: source variable resolves to null")
        );
        assert_eq!(
            store.get("xmldsig_error").as_deref(),
            Some("source variable resolves to null")
        );
        assert_eq!(store.get("xmldsig_stacktrace"), None);
    }

    #[test]
    fn stacktrace_only_in_debug() {
        let store = MemoryStore::new();
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "key.pem missing");
        set_exception_variables(&Error::from(io), true, &store);
        let trace = store.get("xmldsig_stacktrace").unwrap();
        assert!(trace.starts_with("Io("));
        assert!(trace.contains("key.pem missing"));
    }

    #[test]
    fn unrecognized_style_warns() {
        let store = MemoryStore::new();
        let style = effective_issuer_name_style(IssuerNameStyle::Unrecognized("LONG".into()), &store);
        assert_eq!(style, IssuerNameStyle::Short);
        assert_eq!(
            store.get("xmldsig_warning").as_deref(),
            Some("unrecognized issuer-name-style")
        );

        let quiet = MemoryStore::new();
        assert_eq!(
            effective_issuer_name_style(IssuerNameStyle::SubjectDn, &quiet),
            IssuerNameStyle::SubjectDn
        );
        assert_eq!(quiet.get("xmldsig_warning"), None);
    }

    #[test]
    fn names_carry_prefix() {
        assert_eq!(var_name("output"), "xmldsig_output");
    }
}
