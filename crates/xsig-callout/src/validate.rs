#![forbid(unsafe_code)]

//! The Validate callout.

use crate::message::VariableStore;
use crate::properties::{Properties, PropertyResolver};
use crate::report::{self, var_name, ExecutionResult};
use crate::source;
use xsig_core::Error;
use xsig_dsig::{Verdict, VerifyOptions};
use xsig_keys::load_certificate;

/// Validates the enveloped signature of the input document.
///
/// A signature that does not verify is reported through `xmldsig_valid`
/// and `xmldsig_failure` and the invocation still succeeds, unless
/// `abort-on-invalid` is set. Unparseable documents, keys or signature
/// structures always abort.
#[derive(Debug, Clone)]
pub struct ValidateCallout {
    properties: Properties,
}

impl ValidateCallout {
    pub fn new(properties: Properties) -> Self {
        Self { properties }
    }

    pub fn execute(&self, store: &dyn VariableStore) -> ExecutionResult {
        let resolver = PropertyResolver::new(&self.properties, store);
        match self.run(&resolver) {
            Ok(dest) => {
                store.set(&var_name("output"), dest);
                ExecutionResult::Success
            }
            Err(e) => {
                report::set_exception_variables(&e, resolver.debug(), store);
                ExecutionResult::Abort
            }
        }
    }

    fn run(&self, resolver: &PropertyResolver<'_>) -> Result<String, Error> {
        let store = resolver.store();
        let style = report::effective_issuer_name_style(resolver.issuer_name_style(), store);
        let document = source::obtain_document(resolver)?;

        let certificate = resolver
            .resolve_optional("certificate")
            .map(|pem| load_certificate(&pem))
            .transpose()?;
        let trusted_certificate = resolver
            .resolve_optional("trusted-certificate")
            .map(|pem| load_certificate(&pem))
            .transpose()?;
        let opts = VerifyOptions {
            certificate,
            expected_issuer: resolver.resolve_optional("issuer"),
            expected_thumbprint: resolver.resolve_optional("certificate-thumbprint"),
            trusted_certificate,
            issuer_name_style: style.clone(),
            now: None,
        };

        let verdict = xsig_dsig::verify(document.text(), &opts)?;
        if let Some(cert) = verdict.certificate() {
            report::set_certificate_variables(cert, &style, store);
        }
        match verdict {
            Verdict::Valid { .. } => {
                store.set(&var_name("valid"), "true".into());
            }
            Verdict::Invalid { failure, .. } => {
                log::info!("signature is not valid: {failure}");
                if resolver.bool_option("abort-on-invalid", false) {
                    return Err(failure.into_error());
                }
                store.set(&var_name("valid"), "false".into());
                store.set(&var_name("failure"), failure.to_string());
            }
        }

        let output = if resolver.bool_option("remove-signature", false) {
            xsig_dsig::remove_signature(document.text())?
        } else {
            document.into_text()
        };
        Ok(source::write_output(resolver, output))
    }
}
