//! Message digest inputs.

use crate::{
    engine::SCALAR_SIZE,
    error::{Error, Result},
};
use sha2::{Digest, Sha256};

/// Interpret `bytes` as a 32-byte message digest.
pub(crate) fn hashed(bytes: &[u8]) -> Result<&[u8; SCALAR_SIZE]> {
    bytes.try_into().map_err(|_| Error::IncorrectByteCount {
        got: bytes.len(),
        expected: SCALAR_SIZE,
    })
}

/// SHA-256 digest of `message`.
pub(crate) fn sha256(message: &[u8]) -> [u8; SCALAR_SIZE] {
    Sha256::digest(message).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn digest_length_is_checked() {
        assert!(hashed(&[0u8; 32]).is_ok());
        assert_eq!(
            hashed(&[0u8; 33]).err(),
            Some(Error::IncorrectByteCount { got: 33, expected: 32 })
        );
    }

    #[test]
    fn sha256_of_empty_message() {
        assert_eq!(
            sha256(b""),
            hex!("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855")
        );
    }
}
