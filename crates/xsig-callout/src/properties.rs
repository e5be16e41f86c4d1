#![forbid(unsafe_code)]

//! Option lookup with `{variable}` interpolation.

use crate::message::VariableStore;
use std::collections::BTreeMap;
use xsig_core::Error;
use xsig_keys::IssuerNameStyle;

/// The callout's configuration, fixed when the callout is built.
pub type Properties = BTreeMap<String, String>;

/// Resolves options against the variables of one invocation.
pub struct PropertyResolver<'a> {
    properties: &'a Properties,
    store: &'a dyn VariableStore,
}

impl<'a> PropertyResolver<'a> {
    pub fn new(properties: &'a Properties, store: &'a dyn VariableStore) -> Self {
        Self { properties, store }
    }

    pub fn store(&self) -> &'a dyn VariableStore {
        self.store
    }

    /// The interpolated value of `name`, or a `ConfigurationError` when it
    /// is absent, blank, or interpolates to nothing.
    pub fn resolve_required(&self, name: &str) -> Result<String, Error> {
        self.resolve_optional(name)
            .ok_or_else(|| Error::Configuration(format!("{name} resolves to an empty string")))
    }

    /// Like [`resolve_required`](Self::resolve_required), returning `None`
    /// instead of failing.
    pub fn resolve_optional(&self, name: &str) -> Option<String> {
        let raw = self.properties.get(name)?.trim();
        if raw.is_empty() {
            return None;
        }
        let value = interpolate(raw, self.store);
        if value.is_empty() {
            return None;
        }
        Some(value)
    }

    /// The `debug` flag. Read raw, without interpolation.
    pub fn debug(&self) -> bool {
        self.properties
            .get("debug")
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
    }

    /// The `issuer-name-style` option. The caller decides what to do with
    /// [`IssuerNameStyle::Unrecognized`].
    pub fn issuer_name_style(&self) -> IssuerNameStyle {
        IssuerNameStyle::parse(self.resolve_optional("issuer-name-style").as_deref())
    }

    /// A boolean option: `true`, `yes` or `1`, case-insensitive.
    pub fn bool_option(&self, name: &str, default: bool) -> bool {
        match self.resolve_optional(name) {
            Some(v) => matches!(v.to_ascii_lowercase().as_str(), "true" | "yes" | "1"),
            None => default,
        }
    }

    /// A non-negative integer option.
    pub fn usize_option(&self, name: &str) -> Result<Option<usize>, Error> {
        self.resolve_optional(name)
            .map(|v| {
                v.trim().parse::<usize>().map_err(|_| {
                    Error::Configuration(format!("{name} must be a non-negative integer, got {v}"))
                })
            })
            .transpose()
    }
}

/// Replace each `{name}` in `raw` with the value of variable `name`.
///
/// A name is one or more characters other than braces and spaces. Missing
/// variables become the empty string. Substituted text is not scanned
/// again, and braces that do not form a placeholder are kept.
pub fn interpolate(raw: &str, store: &dyn VariableStore) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let name_len = after
            .find(|c: char| c == '{' || c == '}' || c == ' ')
            .filter(|&end| end > 0 && after[end..].starts_with('}'));
        match name_len {
            Some(len) => {
                let name = &after[..len];
                match store.get(name) {
                    Some(value) => out.push_str(&value),
                    None => log::debug!("variable {name} is not set, substituting empty string"),
                }
                rest = &after[len + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MemoryStore;

    fn props(pairs: &[(&str, &str)]) -> Properties {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn interpolation() {
        let store = MemoryStore::new().with("a", "x").with("b", "y");
        assert_eq!(interpolate("{a}-{b}", &store), "x-y");
        assert_eq!(interpolate("plain text", &store), "plain text");
        assert_eq!(interpolate("pre{missing}post", &store), "prepost");
        assert_eq!(interpolate("{a}{a}", &store), "xx");
    }

    #[test]
    fn interpolation_leaves_non_placeholders() {
        let store = MemoryStore::new().with("a", "x").with("loop", "{a}");
        assert_eq!(interpolate("{}", &store), "{}");
        assert_eq!(interpolate("{a b}", &store), "{a b}");
        assert_eq!(interpolate("{{a}}", &store), "{x}");
        assert_eq!(interpolate("open { only", &store), "open { only");
        assert_eq!(interpolate("trailing {a", &store), "trailing {a");
        // Single pass: substituted text is not resolved again.
        assert_eq!(interpolate("{loop}", &store), "{a}");
    }

    #[test]
    fn required_and_optional() {
        let store = MemoryStore::new().with("key.pem", "PEM");
        let p = props(&[
            ("private-key", " {key.pem} "),
            ("blank", "   "),
            ("empty-var", "{nothing}"),
        ]);
        let r = PropertyResolver::new(&p, &store);

        assert_eq!(r.resolve_required("private-key").unwrap(), "PEM");
        assert_eq!(r.resolve_optional("blank"), None);
        assert_eq!(r.resolve_optional("empty-var"), None);
        assert_eq!(r.resolve_optional("absent"), None);

        for name in ["blank", "empty-var", "absent"] {
            let err = r.resolve_required(name).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("ConfigurationError: {name} resolves to an empty string")
            );
        }
    }

    #[test]
    fn debug_is_raw() {
        let store = MemoryStore::new().with("flag", "true");
        assert!(PropertyResolver::new(&props(&[("debug", " TRUE ")]), &store).debug());
        assert!(!PropertyResolver::new(&props(&[("debug", "{flag}")]), &store).debug());
        assert!(!PropertyResolver::new(&props(&[("debug", "yes")]), &store).debug());
        assert!(!PropertyResolver::new(&props(&[]), &store).debug());
    }

    #[test]
    fn issuer_name_style_option() {
        let store = MemoryStore::new().with("style", "subject_dn");
        let style = |v: &str| {
            let p = props(&[("issuer-name-style", v)]);
            PropertyResolver::new(&p, &store).issuer_name_style()
        };
        assert_eq!(style("short"), IssuerNameStyle::Short);
        assert_eq!(style("{style}"), IssuerNameStyle::SubjectDn);
        assert_eq!(style("FULL"), IssuerNameStyle::Unrecognized("FULL".into()));
        assert_eq!(
            PropertyResolver::new(&props(&[]), &store).issuer_name_style(),
            IssuerNameStyle::Short
        );
    }

    #[test]
    fn typed_options() {
        let store = MemoryStore::new();
        let p = props(&[("a", "Yes"), ("b", "0"), ("size", "1024"), ("bad", "big")]);
        let r = PropertyResolver::new(&p, &store);
        assert!(r.bool_option("a", false));
        assert!(!r.bool_option("b", true));
        assert!(r.bool_option("absent", true));
        assert_eq!(r.usize_option("size").unwrap(), Some(1024));
        assert_eq!(r.usize_option("absent").unwrap(), None);
        assert!(matches!(r.usize_option("bad"), Err(Error::Configuration(_))));
    }
}
