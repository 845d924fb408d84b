//! Secret scalar storage and validation.

use crate::{
    engine::{self, Point, SCALAR_SIZE},
    error::{Error, Result},
    secure_bytes::SecureBytes,
};
use rand_core::CryptoRngCore;
use subtle::ConstantTimeEq;

/// Number of random candidates tried before key generation gives up.
///
/// A candidate is rejected only when it is zero or not below the group
/// order, which for a working RNG happens with probability below 2^-127.
pub(crate) const MAX_GENERATION_ATTEMPTS: usize = 100;

/// A secret scalar in `[1, n)`, held in zeroizing storage.
#[derive(Clone, Eq, PartialEq)]
pub(crate) struct PrivateScalar {
    bytes: SecureBytes,
}

impl PrivateScalar {
    /// Validate `bytes` as a secret scalar and derive its public point.
    ///
    /// Size and zero checks happen here. The upper bound is enforced by the
    /// curve engine while deriving the public point.
    pub(crate) fn import(bytes: SecureBytes) -> Result<(Self, Point)> {
        if bytes.len() != SCALAR_SIZE {
            return Err(Error::InvalidKeySize {
                got: bytes.len(),
                expected: SCALAR_SIZE,
            });
        }

        let is_zero = bytes.with_bytes(|bytes| bytes.ct_eq(&[0u8; SCALAR_SIZE]));
        if bool::from(is_zero) {
            return Err(Error::InvalidKey);
        }

        let point = engine::derive_public_key(&bytes)?;
        Ok((Self { bytes }, point))
    }

    /// Draw scalars from `rng` until one is valid.
    ///
    /// # Panics
    ///
    /// After [`MAX_GENERATION_ATTEMPTS`] rejected candidates, which means the
    /// RNG is broken.
    pub(crate) fn generate(rng: &mut impl CryptoRngCore) -> (Self, Point) {
        for attempt in 1..=MAX_GENERATION_ATTEMPTS {
            match Self::import(SecureBytes::random_with_rng(&mut *rng, SCALAR_SIZE)) {
                Ok(generated) => return generated,
                Err(err) => {
                    tracing::warn!(attempt, %err, "rejected generated private scalar");
                }
            }
        }

        tracing::error!(
            attempts = MAX_GENERATION_ATTEMPTS,
            "random number generator never produced a valid private scalar"
        );
        panic!(
            "failed to generate a secp256k1 private key after {MAX_GENERATION_ATTEMPTS} attempts"
        );
    }

    pub(crate) fn as_secure_bytes(&self) -> &SecureBytes {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Operation;
    use hex_literal::hex;
    use rand_core::{CryptoRng, OsRng, RngCore};

    /// RNG which only ever yields `0xff`, a value above the group order.
    struct StuckRng;

    impl RngCore for StuckRng {
        fn next_u32(&mut self) -> u32 {
            u32::MAX
        }

        fn next_u64(&mut self) -> u64 {
            u64::MAX
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(0xff);
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> core::result::Result<(), rand_core::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    impl CryptoRng for StuckRng {}

    #[test]
    fn rejects_wrong_sizes() {
        for len in [0, 31, 33] {
            assert_eq!(
                PrivateScalar::import(SecureBytes::zeroed(len)).err(),
                Some(Error::InvalidKeySize {
                    got: len,
                    expected: 32
                })
            );
        }
    }

    #[test]
    fn rejects_zero() {
        assert_eq!(
            PrivateScalar::import(SecureBytes::zeroed(32)).err(),
            Some(Error::InvalidKey)
        );
    }

    #[test]
    fn rejects_group_order() {
        let order = hex!("fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141");
        assert_eq!(
            PrivateScalar::import(SecureBytes::from(order)).err(),
            Some(Error::Engine(Operation::PublicKeyCreate))
        );
    }

    #[test]
    fn accepts_order_minus_one() {
        let max = hex!("fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364140");
        assert!(PrivateScalar::import(SecureBytes::from(max)).is_ok());
    }

    #[test]
    fn generates_valid_scalars() {
        let (scalar, point) = PrivateScalar::generate(&mut OsRng);
        assert_eq!(scalar.as_secure_bytes().len(), 32);
        assert_eq!(
            engine::derive_public_key(scalar.as_secure_bytes()).unwrap(),
            point
        );
    }

    #[test]
    #[should_panic(expected = "after 100 attempts")]
    fn broken_rng_is_fatal() {
        PrivateScalar::generate(&mut StuckRng);
    }
}
