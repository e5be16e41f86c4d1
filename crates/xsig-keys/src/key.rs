#![forbid(unsafe_code)]

//! Key types.

use xsig_crypto::SigningKey;

/// A decrypted private key. Lives only for one invocation.
#[derive(Clone)]
pub enum PrivateKey {
    Rsa(rsa::RsaPrivateKey),
    EcP256(p256::ecdsa::SigningKey),
    EcP384(p384::ecdsa::SigningKey),
}

/// A public verification key.
#[derive(Clone, PartialEq, Eq)]
pub enum PublicKey {
    Rsa(rsa::RsaPublicKey),
    EcP256(p256::ecdsa::VerifyingKey),
    EcP384(p384::ecdsa::VerifyingKey),
}

impl PrivateKey {
    /// The matching public key.
    pub fn public_key(&self) -> PublicKey {
        match self {
            Self::Rsa(pk) => PublicKey::Rsa(pk.to_public_key()),
            Self::EcP256(sk) => PublicKey::EcP256(*sk.verifying_key()),
            Self::EcP384(sk) => PublicKey::EcP384(*sk.verifying_key()),
        }
    }

    /// Convert to a `SigningKey` for use with the signature algorithms.
    pub fn to_signing_key(&self) -> SigningKey {
        match self {
            Self::Rsa(pk) => SigningKey::Rsa(pk.clone()),
            Self::EcP256(sk) => SigningKey::EcP256(sk.clone()),
            Self::EcP384(sk) => SigningKey::EcP384(sk.clone()),
        }
    }

    pub fn kind(&self) -> &'static str {
        self.public_key().kind()
    }
}

impl PublicKey {
    /// Convert to a verification-only `SigningKey`.
    pub fn to_signing_key(&self) -> SigningKey {
        match self {
            Self::Rsa(pk) => SigningKey::RsaPublic(pk.clone()),
            Self::EcP256(vk) => SigningKey::EcP256Public(*vk),
            Self::EcP384(vk) => SigningKey::EcP384Public(*vk),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Rsa(_) => "RSA",
            Self::EcP256(_) => "EC P-256",
            Self::EcP384(_) => "EC P-384",
        }
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} private key", self.kind())
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} public key", self.kind())
    }
}
