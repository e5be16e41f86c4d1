#![forbid(unsafe_code)]

//! Distinguished name parsing and issuer name styles.

/// How a certificate's issuer is rendered for trust comparison.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum IssuerNameStyle {
    /// The issuer's common name.
    #[default]
    Short,
    /// The full issuer distinguished name.
    SubjectDn,
    /// A configured value that names neither style. Treated as `Short`.
    Unrecognized(String),
}

impl IssuerNameStyle {
    /// Parse an `issuer-name-style` option value, case-insensitively.
    /// An absent value selects `Short`.
    pub fn parse(value: Option<&str>) -> Self {
        let Some(raw) = value else {
            return Self::Short;
        };
        match raw.trim().to_ascii_uppercase().as_str() {
            "SHORT" => Self::Short,
            "SUBJECT_DN" => Self::SubjectDn,
            _ => Self::Unrecognized(raw.to_owned()),
        }
    }

    /// The style actually applied; `Unrecognized` falls back to `Short`.
    pub fn effective(&self) -> Self {
        match self {
            Self::SubjectDn => Self::SubjectDn,
            _ => Self::Short,
        }
    }

    /// Render `dn` in this style. `Short` falls back to the full DN when
    /// there is no CN.
    pub fn format(&self, dn: &str) -> String {
        match self.effective() {
            Self::SubjectDn => dn.to_owned(),
            _ => common_name(dn).unwrap_or_else(|| dn.to_owned()),
        }
    }
}

/// One `type=value` pair from a DN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ava {
    pub attr_type: String,
    pub value: String,
}

/// Split a string DN into RDNs, each a list of attribute/value pairs.
///
/// RDNs come back in LDAP name order: the rightmost RDN in the string is
/// first.
pub fn parse_dn(dn: &str) -> Vec<Vec<Ava>> {
    let mut rdns: Vec<Vec<Ava>> = split_unescaped(dn, &[',', ';'])
        .into_iter()
        .filter(|rdn| !rdn.trim().is_empty())
        .map(|rdn| {
            split_unescaped(rdn, &['+'])
                .into_iter()
                .filter_map(|ava| {
                    let (attr_type, value) = split_type_value(ava)?;
                    Some(Ava {
                        attr_type: attr_type.trim().to_owned(),
                        value: unescape(value.trim()),
                    })
                })
                .collect()
        })
        .collect();
    rdns.reverse();
    rdns
}

/// Extract the `CN` value from a DN.
///
/// Components are visited in LDAP name order and each CN overwrites the
/// previous one, so with several CNs the leftmost one in the string is
/// returned.
pub fn common_name(dn: &str) -> Option<String> {
    let mut cn = None;
    for rdn in parse_dn(dn) {
        for ava in rdn {
            if ava.attr_type.eq_ignore_ascii_case("CN") {
                cn = Some(ava.value);
            }
        }
    }
    cn
}

fn split_unescaped<'a>(s: &'a str, separators: &[char]) -> Vec<&'a str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    let mut quoted = false;
    for (i, c) in s.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '"' => quoted = !quoted,
            c if !quoted && separators.contains(&c) => {
                parts.push(&s[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

fn split_type_value(ava: &str) -> Option<(&str, &str)> {
    let (t, v) = ava.split_once('=')?;
    if t.trim().is_empty() {
        return None;
    }
    Some((t, v))
}

fn unescape(value: &str) -> String {
    let value = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value);
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 1 < bytes.len() {
            let hex_byte = bytes
                .get(i + 1..i + 3)
                .filter(|pair| pair.iter().all(u8::is_ascii_hexdigit))
                .and_then(|pair| std::str::from_utf8(pair).ok())
                .and_then(|pair| u8::from_str_radix(pair, 16).ok());
            if let Some(b) = hex_byte {
                out.push(b);
                i += 3;
                continue;
            }
            out.push(bytes[i + 1]);
            i += 2;
            continue;
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}
