#![forbid(unsafe_code)]

//! OpenSSL `EVP_BytesToKey` (MD5, one iteration) for legacy PEM encryption.

use md5::{Digest, Md5};

/// Derive `key_len` bytes from `password` and an 8-byte `salt`.
///
/// `D_1 = MD5(password || salt)`, `D_i = MD5(D_{i-1} || password || salt)`,
/// and the key is the concatenation truncated to `key_len`.
pub fn evp_bytes_to_key(password: &[u8], salt: &[u8], key_len: usize) -> Vec<u8> {
    let mut key = Vec::with_capacity(key_len + 16);
    let mut prev: Option<Vec<u8>> = None;
    while key.len() < key_len {
        let mut hasher = Md5::new();
        if let Some(p) = &prev {
            hasher.update(p);
        }
        hasher.update(password);
        hasher.update(salt);
        let block = hasher.finalize().to_vec();
        key.extend_from_slice(&block);
        prev = Some(block);
    }
    key.truncate(key_len);
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_openssl_des_ede3() {
        let salt = hex::decode("63802B11A1FDFA29").unwrap();
        let key = evp_bytes_to_key(b"Secret123", &salt, 24);
        assert_eq!(hex::encode(key), "f10ddd2c39452aa44e4b7e2d242021548f9367a7b960b7aa");
    }

    #[test]
    fn matches_openssl_aes128() {
        let salt = hex::decode("6FC3F3A6F3F96292").unwrap();
        let key = evp_bytes_to_key(b"Secret123", &salt, 16);
        assert_eq!(hex::encode(key), "7bc7e1b9d120d427edc32889b6f7f3e5");
        // OpenSSL's derived IV is the next 16 bytes of the same stream.
        let stream = evp_bytes_to_key(b"Secret123", &salt, 32);
        assert_eq!(hex::encode(&stream[16..]), "38e7d5f6edbe209ec1b9b85331cf88eb");
    }

    #[test]
    fn short_key_is_prefix_of_long_key() {
        let long = evp_bytes_to_key(b"pw", b"12345678", 32);
        let short = evp_bytes_to_key(b"pw", b"12345678", 16);
        assert_eq!(&long[..16], &short[..]);
    }
}
