//! secp256k1 private keys.

use super::{Capability, PrivateScalar, PublicKey};
use crate::{
    asn1::{keys, pem},
    engine::{SCALAR_SIZE, UNCOMPRESSED_POINT_SIZE},
    error::{Asn1Error, Error, Result},
    secure_bytes::SecureBytes,
};
use alloc::string::String;
use core::{
    fmt,
    hash::{Hash, Hasher},
};
use rand_core::{CryptoRngCore, OsRng};
use zeroize::Zeroizing;

/// Size of an X9.63 private key: `04 || X || Y || d`.
pub const X963_PRIVATE_KEY_SIZE: usize = UNCOMPRESSED_POINT_SIZE + SCALAR_SIZE;

/// A secret scalar usable with capability `C`, together with its public key.
///
/// Private keys can be imported from and exported to:
///
/// - raw big-endian scalar (32 bytes)
/// - ANSI X9.63 `04 || X || Y || d` (97 bytes)
/// - DER: PKCS#8 `PrivateKeyInfo` on export; PKCS#8 or SEC1 `ECPrivateKey`
///   on import
/// - PEM: `PRIVATE KEY` on export; `PRIVATE KEY` or `EC PRIVATE KEY` on
///   import
///
/// Exports return [`SecureBytes`] or a [`Zeroizing`] string. Equality and
/// hashing go through the public key.
pub struct PrivateKey<C: Capability> {
    scalar: PrivateScalar,
    public_key: PublicKey<C>,
}

impl<C: Capability> PrivateKey<C> {
    /// Generate a random key using the operating system's RNG.
    ///
    /// # Panics
    ///
    /// If the RNG fails to produce a valid scalar in 100 attempts.
    pub fn generate() -> Self {
        Self::random(&mut OsRng)
    }

    /// Generate a random key using `rng`.
    ///
    /// # Panics
    ///
    /// If `rng` fails to produce a valid scalar in 100 attempts.
    pub fn random(rng: &mut impl CryptoRngCore) -> Self {
        let (scalar, point) = PrivateScalar::generate(rng);
        Self {
            scalar,
            public_key: PublicKey::from_point(point),
        }
    }

    /// Import a 32-byte big-endian scalar.
    pub fn from_raw(bytes: &[u8]) -> Result<Self> {
        Self::from_secure_bytes(SecureBytes::from_slice(bytes))
    }

    /// Import a scalar already held in secure storage.
    pub fn from_secure_bytes(bytes: SecureBytes) -> Result<Self> {
        let (scalar, point) = PrivateScalar::import(bytes)?;
        Ok(Self {
            scalar,
            public_key: PublicKey::from_point(point),
        })
    }

    /// Import an X9.63 `04 || X || Y || d` key. The embedded public key must
    /// match the one derived from `d`.
    pub fn from_x963(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != X963_PRIVATE_KEY_SIZE {
            return Err(Error::InvalidKeySize {
                got: bytes.len(),
                expected: X963_PRIVATE_KEY_SIZE,
            });
        }

        let (public, scalar) = bytes.split_at(UNCOMPRESSED_POINT_SIZE);
        let embedded = PublicKey::<C>::from_x963(public)?;
        let key = Self::from_raw(scalar)?;

        if key.public_key != embedded {
            return Err(Error::PublicKeyMismatch);
        }
        Ok(key)
    }

    /// Import a DER key, trying PKCS#8 before SEC1.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        match keys::decode_pkcs8(der) {
            Ok(ec_private_key) => Self::from_raw(ec_private_key.private_key),
            Err(err) => {
                tracing::trace!(%err, "not a PKCS#8 document, trying SEC1");
                Self::from_sec1_der(der)
            }
        }
    }

    /// Import a DER SEC1 `ECPrivateKey`.
    pub fn from_sec1_der(der: &[u8]) -> Result<Self> {
        let ec_private_key = keys::decode_sec1(der)?;
        Self::from_raw(ec_private_key.private_key)
    }

    /// Import a PEM `PRIVATE KEY` (PKCS#8) or `EC PRIVATE KEY` (SEC1)
    /// document.
    pub fn from_pem(pem: &str) -> Result<Self> {
        let document = pem::Document::parse(pem)?;
        match document.label {
            pem::PKCS8_PRIVATE_KEY => Self::from_der(&document.der),
            pem::SEC1_PRIVATE_KEY => Self::from_sec1_der(&document.der),
            _ => Err(Asn1Error::InvalidPemDocument.into()),
        }
    }

    /// The public key of this private key.
    pub fn public_key(&self) -> &PublicKey<C> {
        &self.public_key
    }

    /// Export the 32-byte big-endian scalar.
    pub fn to_raw(&self) -> SecureBytes {
        self.scalar.as_secure_bytes().clone()
    }

    /// Export as X9.63 `04 || X || Y || d`.
    pub fn to_x963(&self) -> SecureBytes {
        let mut bytes = SecureBytes::new();
        bytes.reserve(X963_PRIVATE_KEY_SIZE);
        bytes.extend_from_slice(&self.public_key.to_x963());
        self.scalar
            .as_secure_bytes()
            .with_bytes(|scalar| bytes.extend_from_slice(scalar));
        bytes
    }

    /// Export as a DER PKCS#8 `PrivateKeyInfo`.
    pub fn to_der(&self) -> Result<SecureBytes> {
        let public_key = self.public_key.to_x963();
        let der = self
            .scalar
            .as_secure_bytes()
            .with_bytes(|scalar| keys::encode_pkcs8(scalar, &public_key))?;
        Ok(der)
    }

    /// Export as a PEM `PRIVATE KEY` (PKCS#8) document.
    pub fn to_pem(&self) -> Result<Zeroizing<String>> {
        let pem = self
            .to_der()?
            .with_bytes(|der| pem::encode(pem::PKCS8_PRIVATE_KEY, der))?;
        Ok(pem)
    }

    /// Export as a DER SEC1 `ECPrivateKey` naming the curve.
    pub fn to_sec1_der(&self) -> Result<SecureBytes> {
        let public_key = self.public_key.to_x963();
        let der = self
            .scalar
            .as_secure_bytes()
            .with_bytes(|scalar| keys::encode_sec1(scalar, &public_key, true))?;
        Ok(der)
    }

    /// Export as a PEM `EC PRIVATE KEY` (SEC1) document.
    pub fn to_sec1_pem(&self) -> Result<Zeroizing<String>> {
        let pem = self
            .to_sec1_der()?
            .with_bytes(|der| pem::encode(pem::SEC1_PRIVATE_KEY, der))?;
        Ok(pem)
    }

    /// The same key tagged for another capability.
    pub fn with_capability<D: Capability>(&self) -> PrivateKey<D> {
        PrivateKey {
            scalar: self.scalar.clone(),
            public_key: self.public_key.with_capability(),
        }
    }

    pub(crate) fn scalar(&self) -> &SecureBytes {
        self.scalar.as_secure_bytes()
    }
}

impl<C: Capability> Clone for PrivateKey<C> {
    fn clone(&self) -> Self {
        self.with_capability()
    }
}

impl<C: Capability> PartialEq for PrivateKey<C> {
    fn eq(&self, other: &Self) -> bool {
        self.public_key == other.public_key
    }
}

impl<C: Capability> Eq for PrivateKey<C> {}

impl<C: Capability> Hash for PrivateKey<C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.public_key.hash(state)
    }
}

impl<C: Capability> fmt::Debug for PrivateKey<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}
