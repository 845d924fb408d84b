//! secp256k1 private and public keys.
//!
//! Keys are tagged with a [`Capability`] marker which fixes, at compile
//! time, the family of operations they can take part in:
//!
//! - [`ecdsa::NonRecoverable`](crate::ecdsa::NonRecoverable): ECDSA signatures
//! - [`ecdsa::recoverable::Recoverable`](crate::ecdsa::recoverable::Recoverable):
//!   ECDSA signatures with a public key recovery id
//! - [`schnorr::Schnorr`](crate::schnorr::Schnorr): BIP340 Schnorr signatures
//! - [`ecdh::KeyAgreement`](crate::ecdh::KeyAgreement): Diffie-Hellman
//!
//! All capabilities share the key formats implemented here.

mod private_key;
mod public_key;
mod scalar;

pub use self::{
    private_key::{PrivateKey, X963_PRIVATE_KEY_SIZE},
    public_key::{PublicKey, RAW_PUBLIC_KEY_SIZE},
};
pub(crate) use self::scalar::PrivateScalar;

use core::{fmt::Debug, hash::Hash};

/// Marker for the operations a key can be used for.
///
/// This trait is sealed and implemented only by the markers in this crate.
pub trait Capability:
    sealed::Sealed + Copy + Clone + Debug + Default + Eq + Hash + Send + Sync + 'static
{
    /// Human readable name of the capability.
    const NAME: &'static str;
}

pub(crate) mod sealed {
    pub trait Sealed {}
}
