//! Elliptic Curve Digital Signature Algorithm (ECDSA) over secp256k1.
//!
//! Signatures are always produced in low-S form (BIP 62). Verification
//! normalizes the signature first and, by default, rejects signatures which
//! were not already normalized; see [`MalleabilityStrictness`].
//!
//! ## Usage
//!
//! ```
//! use k1::ecdsa::{SigningKey, SigningOptions, ValidationOptions};
//!
//! let signing_key = SigningKey::generate();
//! let signature = signing_key
//!     .sign_unhashed(b"hello world", &SigningOptions::default())
//!     .unwrap();
//!
//! let verifying_key = signing_key.public_key();
//! assert!(verifying_key.is_valid_signature_unhashed(
//!     &signature,
//!     b"hello world",
//!     &ValidationOptions::default(),
//! ));
//! ```

pub mod recoverable;

use crate::{
    asn1::signature::EcdsaSignature,
    engine::{self, Point, SCALAR_SIZE},
    error::{Error, Operation, Result},
    keys::{self, Capability, sealed::Sealed},
    message,
};
use alloc::vec::Vec;
use core::{
    fmt,
    hash::{Hash, Hasher},
};
use subtle::ConstantTimeEq;

/// Size of a compact `R || S` signature.
pub const COMPACT_SIGNATURE_SIZE: usize = 2 * SCALAR_SIZE;

/// Capability marker for ECDSA without public key recovery.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct NonRecoverable;

impl Sealed for NonRecoverable {}

impl Capability for NonRecoverable {
    const NAME: &'static str = "NonRecoverable";
}

/// ECDSA private key.
pub type SigningKey = keys::PrivateKey<NonRecoverable>;

/// ECDSA public key.
pub type VerifyingKey = keys::PublicKey<NonRecoverable>;

/// ECDSA signature `(r, s)`.
#[derive(Clone)]
pub struct Signature {
    inner: k256::ecdsa::Signature,
}

impl Signature {
    pub(crate) fn from_inner(inner: k256::ecdsa::Signature) -> Self {
        Self { inner }
    }

    /// Parse a 64-byte compact `R || S` signature.
    pub fn from_compact(bytes: &[u8]) -> Result<Self> {
        let compact: &[u8; COMPACT_SIGNATURE_SIZE] =
            bytes.try_into().map_err(|_| Error::IncorrectByteCount {
                got: bytes.len(),
                expected: COMPACT_SIGNATURE_SIZE,
            })?;

        engine::parse_ecdsa_compact(compact, Operation::SignatureParseCompact).map(Self::from_inner)
    }

    /// Parse a DER `Ecdsa-Sig-Value`.
    ///
    /// Integers carrying redundant leading zero bytes are accepted.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        let decoded = EcdsaSignature::parse(der)?;
        if decoded.r.len() > SCALAR_SIZE || decoded.s.len() > SCALAR_SIZE {
            return Err(Error::Engine(Operation::SignatureParseDer));
        }

        let mut compact = [0u8; COMPACT_SIGNATURE_SIZE];
        compact[SCALAR_SIZE - decoded.r.len()..SCALAR_SIZE].copy_from_slice(decoded.r);
        compact[COMPACT_SIGNATURE_SIZE - decoded.s.len()..].copy_from_slice(decoded.s);

        engine::parse_ecdsa_compact(&compact, Operation::SignatureParseDer).map(Self::from_inner)
    }

    /// Serialize as compact `R || S`.
    pub fn to_compact(&self) -> [u8; COMPACT_SIGNATURE_SIZE] {
        let mut bytes = [0u8; COMPACT_SIGNATURE_SIZE];
        bytes.copy_from_slice(&self.inner.to_bytes());
        bytes
    }

    /// Serialize as a minimal DER `Ecdsa-Sig-Value`.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        let compact = self.to_compact();
        let (r, s) = compact.split_at(SCALAR_SIZE);
        Ok(EcdsaSignature { r, s }.serialize()?)
    }

    /// Big-endian `r`.
    pub fn r(&self) -> [u8; SCALAR_SIZE] {
        let mut r = [0u8; SCALAR_SIZE];
        r.copy_from_slice(&self.to_compact()[..SCALAR_SIZE]);
        r
    }

    /// Big-endian `s`.
    pub fn s(&self) -> [u8; SCALAR_SIZE] {
        let mut s = [0u8; SCALAR_SIZE];
        s.copy_from_slice(&self.to_compact()[SCALAR_SIZE..]);
        s
    }

    /// Whether `s` is in the lower half of the scalar range.
    pub fn is_normalized(&self) -> bool {
        !engine::normalize(&self.inner).1
    }

    /// The low-S form of this signature. Already normalized signatures are
    /// returned unchanged.
    pub fn normalize_s(&self) -> Self {
        Self::from_inner(engine::normalize(&self.inner).0)
    }

    /// Recover the public key which produced this signature over the 32-byte
    /// digest `hashed`, given the recovery id obtained out of band.
    pub fn recover_public_key(
        &self,
        recovery_id: recoverable::RecoveryId,
        hashed: &[u8],
    ) -> Result<VerifyingKey> {
        let hashed = message::hashed(hashed)?;
        engine::recover(&self.inner, recovery_id.to_byte(), hashed).map(VerifyingKey::from_point)
    }
}

impl ConstantTimeEq for Signature {
    fn ct_eq(&self, other: &Self) -> subtle::Choice {
        self.to_compact()[..].ct_eq(&other.to_compact()[..])
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
        self.to_compact().hash(state)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ecdsa::Signature(")?;
        for byte in self.to_compact() {
            write!(f, "{byte:02x}")?;
        }
        f.write_str(")")
    }
}

/// Options controlling ECDSA signing.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SigningOptions {
    /// How the per-signature nonce is chosen.
    pub nonce_function: NonceFunction,
}

impl SigningOptions {
    /// Options using `nonce_function`.
    pub fn new(nonce_function: NonceFunction) -> Self {
        Self { nonce_function }
    }
}

/// Nonce generation strategy.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum NonceFunction {
    /// Fresh random nonce for every signature.
    Random,

    /// RFC 6979 deterministic nonce, optionally mixed with 32 bytes of
    /// additional data.
    Deterministic(Option<Rfc6979ArbitraryData>),
}

impl Default for NonceFunction {
    fn default() -> Self {
        NonceFunction::Deterministic(None)
    }
}

/// Additional data for RFC 6979 nonce derivation (section 3.6).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Rfc6979ArbitraryData {
    bytes: [u8; SCALAR_SIZE],
}

impl Rfc6979ArbitraryData {
    /// Wrap exactly 32 bytes of additional data.
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

impl From<[u8; SCALAR_SIZE]> for Rfc6979ArbitraryData {
    fn from(bytes: [u8; SCALAR_SIZE]) -> Self {
        Self { bytes }
    }
}

/// Options controlling ECDSA verification.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct ValidationOptions {
    /// Treatment of high-S signatures.
    pub malleability_strictness: MalleabilityStrictness,
}

impl ValidationOptions {
    /// Options using `malleability_strictness`.
    pub fn new(malleability_strictness: MalleabilityStrictness) -> Self {
        Self {
            malleability_strictness,
        }
    }
}

/// Whether a valid signature which is not in low-S form verifies.
///
/// For any signature `(r, s)`, `(r, n - s)` is also valid. Rejecting the
/// high-S twin makes signatures non-malleable.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum MalleabilityStrictness {
    /// High-S signatures are invalid.
    #[default]
    Rejected,

    /// High-S signatures are valid if their normalized form is.
    Accepted,
}

/// Verify `signature` over a digest, applying the malleability policy.
pub(crate) fn verify(
    point: &Point,
    signature: &k256::ecdsa::Signature,
    hashed: &[u8; SCALAR_SIZE],
    options: &ValidationOptions,
) -> bool {
    let (normalized, was_high) = engine::normalize(signature);
    if !engine::ecdsa_verify(point, hashed, &normalized) {
        return false;
    }

    match options.malleability_strictness {
        _ if !was_high => true,
        MalleabilityStrictness::Accepted => true,
        MalleabilityStrictness::Rejected => false,
    }
}

impl SigningKey {
    /// Sign a 32-byte message digest.
    pub fn sign(&self, hashed: &[u8], options: &SigningOptions) -> Result<Signature> {
        let hashed = message::hashed(hashed)?;
        let (signature, _) = engine::ecdsa_sign(self.scalar(), hashed, &options.nonce_function)?;
        Ok(Signature::from_inner(signature))
    }

    /// Sign the SHA-256 digest of `message`.
    pub fn sign_unhashed(&self, message: &[u8], options: &SigningOptions) -> Result<Signature> {
        self.sign(&message::sha256(message), options)
    }
}

impl VerifyingKey {
    /// Check `signature` over a 32-byte message digest.
    pub fn is_valid_signature(
        &self,
        signature: &Signature,
        hashed: &[u8],
        options: &ValidationOptions,
    ) -> Result<bool> {
        let hashed = message::hashed(hashed)?;
        Ok(verify(self.point(), &signature.inner, hashed, options))
    }

    /// Check `signature` over the SHA-256 digest of `message`.
    pub fn is_valid_signature_unhashed(
        &self,
        signature: &Signature,
        message: &[u8],
        options: &ValidationOptions,
    ) -> bool {
        verify(
            self.point(),
            &signature.inner,
            &message::sha256(message),
            options,
        )
    }
}
