//! Elliptic Curve Diffie-Hellman (ECDH) key agreement.
//!
//! The shared point `d_A * Q_B` can be exported in three shapes:
//!
//! - [`PrivateKey::shared_secret_from_key_agreement`]: the x-coordinate of
//!   the shared point, as specified by ANSI X9.63 and SEC1 section 3.3.1
//! - [`PrivateKey::ecdh`]: SHA-256 over the compressed shared point, the
//!   default output of libsecp256k1
//! - [`PrivateKey::ecdh_point`]: the uncompressed shared point
//!
//! ```
//! use k1::ecdh::PrivateKey;
//!
//! let alice = PrivateKey::generate();
//! let bob = PrivateKey::generate();
//!
//! let alice_secret = alice.shared_secret_from_key_agreement(bob.public_key()).unwrap();
//! let bob_secret = bob.shared_secret_from_key_agreement(alice.public_key()).unwrap();
//! assert_eq!(alice_secret, bob_secret);
//! ```

use crate::{
    engine::{self, EcdhOutput},
    error::Result,
    keys::{self, Capability, sealed::Sealed},
    secure_bytes::SecureBytes,
};
use core::fmt;
use subtle::{Choice, ConstantTimeEq};

/// Capability marker for ECDH.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct KeyAgreement;

impl Sealed for KeyAgreement {}

impl Capability for KeyAgreement {
    const NAME: &'static str = "KeyAgreement";
}

/// ECDH private key.
pub type PrivateKey = keys::PrivateKey<KeyAgreement>;

/// ECDH public key.
pub type PublicKey = keys::PublicKey<KeyAgreement>;

/// Output of a key agreement. Zeroized on drop.
///
/// This value is not uniformly random and should be passed through a KDF
/// before being used as a symmetric key.
#[derive(Clone, Eq, PartialEq)]
pub struct SharedSecret {
    bytes: SecureBytes,
}

impl SharedSecret {
    /// Number of bytes in the secret.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the secret is empty. Never true for a computed secret.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Call `f` with the secret bytes.
    pub fn with_bytes<R>(&self, f: impl FnOnce(&[u8]) -> R) -> R {
        self.bytes.with_bytes(f)
    }

    /// Take the secret as [`SecureBytes`].
    pub fn into_secure_bytes(self) -> SecureBytes {
        self.bytes
    }
}

impl ConstantTimeEq for SharedSecret {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.bytes.ct_eq(&other.bytes)
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedSecret(len={}, [REDACTED])", self.bytes.len())
    }
}

impl PrivateKey {
    /// ANSI X9.63 key agreement: the 32-byte x-coordinate of the shared
    /// point.
    pub fn shared_secret_from_key_agreement(&self, public_key: &PublicKey) -> Result<SharedSecret> {
        self.agree(public_key, EcdhOutput::AnsiX963XOnly)
    }

    /// SHA-256 over the 33-byte compressed shared point.
    ///
    /// `arbitrary_data` mirrors the data argument of libsecp256k1's hash
    /// callback. The default hash ignores it, and so does this one: the
    /// output is the same whatever is passed.
    pub fn ecdh(&self, public_key: &PublicKey, arbitrary_data: Option<&[u8]>) -> Result<SharedSecret> {
        if arbitrary_data.is_some() {
            tracing::trace!("ECDH arbitrary data is not part of the hashed output");
        }
        self.agree(public_key, EcdhOutput::HashedCompressedPoint)
    }

    /// The 65-byte uncompressed shared point.
    pub fn ecdh_point(&self, public_key: &PublicKey) -> Result<SharedSecret> {
        self.agree(public_key, EcdhOutput::RawUncompressedPoint)
    }

    fn agree(&self, public_key: &PublicKey, output: EcdhOutput) -> Result<SharedSecret> {
        let bytes = engine::ecdh(public_key.point(), self.scalar(), output)?;
        Ok(SharedSecret { bytes })
    }
}
