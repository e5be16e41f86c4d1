#![forbid(unsafe_code)]

/// Errors produced by the xsig engine.
///
/// The `Display` form of every variant is `"<Kind>: <message>"`. The result
/// reporter derives the short `error` text from whatever follows the last
/// colon, so messages should put their human-readable tail last.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required option is missing or empty, or an option value is unusable.
    #[error("ConfigurationError: {0}")]
    Configuration(String),

    /// A referenced variable or element is absent.
    #[error("StateError: {0}")]
    State(String),

    /// Key or certificate material cannot be parsed or decrypted.
    #[error("KeyError: {0}")]
    Key(String),

    /// Input is not well-formed XML.
    #[error("ParseError: {0}")]
    XmlParse(String),

    /// Well-formed XML that does not have the structure a signature needs.
    #[error("ParseError: {0}")]
    XmlStructure(String),

    /// Issuer or trust check failed.
    #[error("TrustError: {0}")]
    Trust(String),

    /// Digest or signature mismatch.
    #[error("ValidationFailure: {0}")]
    Validation(String),

    #[error("UnsupportedAlgorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("CryptoError: {0}")]
    Crypto(String),

    #[error("Base64Error: {0}")]
    Base64(String),

    #[error("IoError: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    State,
    Key,
    Parse,
    Trust,
    Validation,
    Algorithm,
    Crypto,
    Io,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::State(_) => ErrorKind::State,
            Self::Key(_) => ErrorKind::Key,
            Self::XmlParse(_) | Self::XmlStructure(_) | Self::Base64(_) => ErrorKind::Parse,
            Self::Trust(_) => ErrorKind::Trust,
            Self::Validation(_) => ErrorKind::Validation,
            Self::UnsupportedAlgorithm(_) => ErrorKind::Algorithm,
            Self::Crypto(_) => ErrorKind::Crypto,
            Self::Io(_) => ErrorKind::Io,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_kind_prefix() {
        let err = Error::State("source variable resolves to null".into());
        assert_eq!(err.to_string(), "StateError: source variable resolves to null");
        assert_eq!(err.kind(), ErrorKind::State);
    }

    #[test]
    fn parse_variants_share_kind() {
        assert_eq!(Error::XmlParse("x".into()).kind(), ErrorKind::Parse);
        assert_eq!(Error::XmlStructure("x".into()).kind(), ErrorKind::Parse);
    }
}
