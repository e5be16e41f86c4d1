#![forbid(unsafe_code)]

//! CBC block decryption for legacy OpenSSL encrypted PEM bodies.

use xsig_core::Error;

/// Block ciphers that may appear in a `DEK-Info` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockCipher {
    TripleDesCbc,
    Aes128Cbc,
    Aes192Cbc,
    Aes256Cbc,
}

impl BlockCipher {
    /// Look up a cipher by its OpenSSL `DEK-Info` name.
    pub fn from_dek_name(name: &str) -> Result<Self, Error> {
        match name.trim().to_ascii_uppercase().as_str() {
            "DES-EDE3-CBC" => Ok(Self::TripleDesCbc),
            "AES-128-CBC" => Ok(Self::Aes128Cbc),
            "AES-192-CBC" => Ok(Self::Aes192Cbc),
            "AES-256-CBC" => Ok(Self::Aes256Cbc),
            other => Err(Error::Key(format!("unsupported PEM cipher {other}"))),
        }
    }

    pub fn key_len(self) -> usize {
        match self {
            Self::TripleDesCbc => 24,
            Self::Aes128Cbc => 16,
            Self::Aes192Cbc => 24,
            Self::Aes256Cbc => 32,
        }
    }

    pub fn iv_len(self) -> usize {
        match self {
            Self::TripleDesCbc => 8,
            _ => 16,
        }
    }

    /// Decrypt `data` and strip PKCS#7 padding.
    ///
    /// A wrong key almost always shows up as a padding error, which is
    /// reported as `Error::Crypto`.
    pub fn decrypt(self, key: &[u8], iv: &[u8], data: &[u8]) -> Result<Vec<u8>, Error> {
        use cbc::cipher::block_padding::Pkcs7;
        use cbc::cipher::{BlockDecryptMut, KeyIvInit};

        if key.len() != self.key_len() || iv.len() != self.iv_len() {
            return Err(Error::Crypto(format!(
                "{self:?} needs a {} byte key and {} byte IV",
                self.key_len(),
                self.iv_len()
            )));
        }
        if data.is_empty() || data.len() % self.iv_len() != 0 {
            return Err(Error::Crypto(
                "ciphertext is not a multiple of the block size".into(),
            ));
        }

        let mut buf = data.to_vec();
        macro_rules! do_decrypt {
            ($cipher:ty) => {{
                let dec = cbc::Decryptor::<$cipher>::new_from_slices(key, iv)
                    .map_err(|e| Error::Crypto(format!("cipher init: {e}")))?;
                dec.decrypt_padded_mut::<Pkcs7>(&mut buf)
                    .map_err(|_| Error::Crypto("bad padding".into()))?
                    .len()
            }};
        }
        let plain_len = match self {
            Self::TripleDesCbc => do_decrypt!(des::TdesEde3),
            Self::Aes128Cbc => do_decrypt!(aes::Aes128),
            Self::Aes192Cbc => do_decrypt!(aes::Aes192),
            Self::Aes256Cbc => do_decrypt!(aes::Aes256),
        };
        buf.truncate(plain_len);
        Ok(buf)
    }
}
