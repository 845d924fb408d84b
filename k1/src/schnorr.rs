//! Taproot Schnorr signatures as defined in [BIP340].
//!
//! Signing uses the private key's scalar (negated when its public point has
//! an odd y-coordinate, per BIP340). Verification uses the x-only form of
//! the public key.
//!
//! [BIP340]: https://github.com/bitcoin/bips/blob/master/bip-0340.mediawiki

use crate::{
    engine::{self, SCALAR_SIZE},
    error::{Error, Result},
    keys::{self, Capability, sealed::Sealed},
    message,
};
use core::{
    fmt,
    hash::{Hash, Hasher},
};
use subtle::ConstantTimeEq;

/// Size of a Schnorr signature.
pub const SIGNATURE_SIZE: usize = 2 * SCALAR_SIZE;

/// Capability marker for BIP340 Schnorr signatures.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Schnorr;

impl Sealed for Schnorr {}

impl Capability for Schnorr {
    const NAME: &'static str = "Schnorr";
}

/// Schnorr private key.
pub type SigningKey = keys::PrivateKey<Schnorr>;

/// Schnorr public key.
pub type VerifyingKey = keys::PublicKey<Schnorr>;

/// BIP340 signature: 64 opaque bytes.
#[derive(Copy, Clone)]
pub struct Signature {
    bytes: [u8; SIGNATURE_SIZE],
}

impl Signature {
    /// Wrap 64 signature bytes. Their content is only checked during
    /// verification.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let bytes = bytes.try_into().map_err(|_| Error::IncorrectByteCount {
            got: bytes.len(),
            expected: SIGNATURE_SIZE,
        })?;
        Ok(Self { bytes })
    }

    /// The signature bytes.
    pub fn to_bytes(&self) -> [u8; SIGNATURE_SIZE] {
        self.bytes
    }
}

impl ConstantTimeEq for Signature {
    fn ct_eq(&self, other: &Self) -> subtle::Choice {
        self.bytes[..].ct_eq(&other.bytes[..])
    }
}

impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for Signature {}

impl Hash for Signature {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bytes.hash(state)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("schnorr::Signature(")?;
        for byte in self.bytes {
            write!(f, "{byte:02x}")?;
        }
        f.write_str(")")
    }
}

/// Options controlling Schnorr signing.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SigningOptions {
    /// Fresh randomness mixed into the nonce. Absent means 32 zero bytes,
    /// which keeps signing deterministic.
    pub auxiliary_random_data: Option<AuxiliaryRandomData>,
}

impl SigningOptions {
    /// Options using `auxiliary_random_data`.
    pub fn new(auxiliary_random_data: Option<AuxiliaryRandomData>) -> Self {
        Self {
            auxiliary_random_data,
        }
    }
}

/// 32 bytes of auxiliary randomness for BIP340 nonce derivation.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct AuxiliaryRandomData {
    bytes: [u8; SCALAR_SIZE],
}

impl AuxiliaryRandomData {
    /// Wrap exactly 32 bytes.
    pub fn new(bytes: &[u8]) -> Result<Self> {
        let bytes = bytes.try_into().map_err(|_| Error::IncorrectByteCount {
            got: bytes.len(),
            expected: SCALAR_SIZE,
        })?;
        Ok(Self { bytes })
    }

    /// The wrapped bytes.
    pub fn as_bytes(&self) -> &[u8; SCALAR_SIZE] {
        &self.bytes
    }
}

impl From<[u8; SCALAR_SIZE]> for AuxiliaryRandomData {
    fn from(bytes: [u8; SCALAR_SIZE]) -> Self {
        Self { bytes }
    }
}

impl SigningKey {
    /// Sign a 32-byte message.
    pub fn sign(&self, hashed: &[u8], options: &SigningOptions) -> Result<Signature> {
        let hashed = message::hashed(hashed)?;
        let aux_rand = options
            .auxiliary_random_data
            .map(|data| data.bytes)
            .unwrap_or([0u8; SCALAR_SIZE]);

        let bytes = engine::schnorr_sign(self.scalar(), hashed, &aux_rand)?;
        Ok(Signature { bytes })
    }

    /// Sign the SHA-256 digest of `message`.
    pub fn sign_unhashed(&self, message: &[u8], options: &SigningOptions) -> Result<Signature> {
        self.sign(&message::sha256(message), options)
    }
}

impl VerifyingKey {
    /// The 32-byte x-only public key used by BIP340.
    pub fn to_x_only(&self) -> [u8; SCALAR_SIZE] {
        let mut x = [0u8; SCALAR_SIZE];
        x.copy_from_slice(&self.to_compressed()[1..]);
        x
    }

    /// Check `signature` over a 32-byte message.
    pub fn is_valid_signature(&self, signature: &Signature, hashed: &[u8]) -> Result<bool> {
        let hashed = message::hashed(hashed)?;
        engine::schnorr_verify(self.point(), hashed, &signature.bytes)
    }

    /// Check `signature` over the SHA-256 digest of `message`.
    pub fn is_valid_signature_unhashed(
        &self,
        signature: &Signature,
        message: &[u8],
    ) -> Result<bool> {
        self.is_valid_signature(signature, &message::sha256(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    /// BIP340 test vector 0.
    const SECRET_KEY: [u8; 32] =
        hex!("0000000000000000000000000000000000000000000000000000000000000003");
    const PUBLIC_KEY: [u8; 32] =
        hex!("F9308A019258C31049344F85F89D5229B531C845836F99B08601F113BCE036F9");
    const SIGNATURE: [u8; 64] = hex!(
        "E907831F80848D1069A5371B402410364BDF1C5F8307B0084C55F1CE2DCA8215"
        "25F66A4A85EA8B71E482A74F382D2CE5EBEEE8FDB2172F477DF4900D310536C0"
    );

    #[test]
    fn bip340_vector_0() {
        let signing_key = SigningKey::from_raw(&SECRET_KEY).unwrap();
        assert_eq!(signing_key.public_key().to_x_only(), PUBLIC_KEY);

        let signature = signing_key
            .sign(&[0u8; 32], &SigningOptions::default())
            .unwrap();
        assert_eq!(signature.to_bytes(), SIGNATURE);
        assert_eq!(
            signing_key
                .public_key()
                .is_valid_signature(&signature, &[0u8; 32]),
            Ok(true)
        );
    }

    #[test]
    fn signature_size_is_checked() {
        assert_eq!(
            Signature::from_bytes(&[0u8; 63]),
            Err(Error::IncorrectByteCount { got: 63, expected: 64 })
        );
        assert_eq!(
            AuxiliaryRandomData::new(&[0u8; 33]),
            Err(Error::IncorrectByteCount { got: 33, expected: 32 })
        );
    }
}
