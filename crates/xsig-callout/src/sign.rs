#![forbid(unsafe_code)]

//! The Sign callout.

use crate::message::VariableStore;
use crate::properties::{Properties, PropertyResolver};
use crate::report::{self, var_name, ExecutionResult};
use crate::source;
use xsig_core::Error;
use xsig_dsig::SignOptions;
use xsig_keys::{load_certificate, load_private_key, KeyIdentifier};

/// Signs the input document with an enveloped XML signature.
///
/// Options: `private-key` (required), `private-key-password`,
/// `certificate`, `signing-method`, `digest-method`, `c14n-method`,
/// `reference-id`, `key-identifier-type`, plus the common `source`,
/// `output-variable`, `issuer-name-style`, `max-document-size` and `debug`.
#[derive(Debug, Clone)]
pub struct SignCallout {
    properties: Properties,
}

impl SignCallout {
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
        let style = report::effective_issuer_name_style(resolver.issuer_name_style(), resolver.store());
        let document = source::obtain_document(resolver)?;

        let key_pem = resolver.resolve_required("private-key")?;
        let password = resolver.resolve_optional("private-key-password");
        let key = load_private_key(&key_pem, password.as_deref())?;
        let certificate = resolver
            .resolve_optional("certificate")
            .map(|pem| load_certificate(&pem))
            .transpose()?;

        let mut opts = SignOptions {
            reference_id: resolver.resolve_optional("reference-id"),
            key_identifier: resolver
                .resolve_optional("key-identifier-type")
                .map(|v| KeyIdentifier::from_option(&v))
                .transpose()?,
            issuer_name_style: style,
            ..SignOptions::default()
        };
        if let Some(method) = resolver.resolve_optional("signing-method") {
            opts = opts.with_signature_method(&method)?;
        }
        if let Some(method) = resolver.resolve_optional("digest-method") {
            opts = opts.with_digest_method(&method)?;
        }
        if let Some(method) = resolver.resolve_optional("c14n-method") {
            opts = opts.with_c14n_method(&method)?;
        }

        let signed = xsig_dsig::sign(document.text(), &key, certificate.as_ref(), &opts)?;
        Ok(source::write_output(resolver, signed))
    }
}
