//! ECDSA signatures carrying a public key recovery id.
//!
//! A recoverable signature is the triple `(r, s, v)` where the recovery id
//! `v` selects which of up to four candidate public keys produced the
//! signature:
//!
//! - bit 0: the y-coordinate of the nonce point `R` is odd
//! - bit 1: the x-coordinate of `R` was reduced modulo the group order
//!
//! Dropping `v` (see [`Signature::to_non_recoverable`]) always succeeds.
//! Going the other way requires `v` to be supplied out of band
//! ([`Signature::from_compact_rs`]).

use super::{COMPACT_SIGNATURE_SIZE, SigningOptions, ValidationOptions};
use crate::{
    engine,
    error::{Error, Operation, Result},
    keys::{self, Capability, sealed::Sealed},
    message,
};
use core::{
    fmt,
    hash::{Hash, Hasher},
};
use subtle::ConstantTimeEq;

/// Size of a compact recoverable signature: `R || S` plus the recovery id.
pub const COMPACT_RECOVERABLE_SIGNATURE_SIZE: usize = COMPACT_SIGNATURE_SIZE + 1;

/// Capability marker for ECDSA with public key recovery.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Recoverable;

impl Sealed for Recoverable {}

impl Capability for Recoverable {
    const NAME: &'static str = "Recoverable";
}

/// Recoverable ECDSA private key.
pub type SigningKey = keys::PrivateKey<Recoverable>;

/// Recoverable ECDSA public key.
pub type VerifyingKey = keys::PublicKey<Recoverable>;

/// Public key recovery id, in `0..=3`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct RecoveryId(u8);

impl RecoveryId {
    /// Largest valid recovery id.
    pub const MAX: u8 = 3;

    /// Build a recovery id from its flags.
    pub const fn new(is_y_odd: bool, is_x_reduced: bool) -> Self {
        Self(((is_x_reduced as u8) << 1) | (is_y_odd as u8))
    }

    /// Validate a byte as a recovery id.
    pub fn from_byte(byte: u8) -> Result<Self> {
        if byte <= Self::MAX {
            Ok(Self(byte))
        } else {
            Err(Error::InvalidRecoveryId {
                got: i32::from(byte),
            })
        }
    }

    /// Validate an integer as a recovery id.
    pub fn from_i32(value: i32) -> Result<Self> {
        u8::try_from(value)
            .ok()
            .filter(|&byte| byte <= Self::MAX)
            .map(Self)
            .ok_or(Error::InvalidRecoveryId { got: value })
    }

    /// The recovery id as a byte.
    pub const fn to_byte(self) -> u8 {
        self.0
    }

    /// Whether the nonce point's y-coordinate is odd.
    pub const fn is_y_odd(self) -> bool {
        self.0 & 1 != 0
    }

    /// Whether the nonce point's x-coordinate exceeded the group order.
    pub const fn is_x_reduced(self) -> bool {
        self.0 & 2 != 0
    }
}

impl TryFrom<u8> for RecoveryId {
    type Error = Error;

    fn try_from(byte: u8) -> Result<Self> {
        Self::from_byte(byte)
    }
}

impl From<RecoveryId> for u8 {
    fn from(id: RecoveryId) -> u8 {
        id.0
    }
}

/// Byte order of a 65-byte compact recoverable signature.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum CompactFormat {
    /// `R || S || V`.
    #[default]
    Rsv,

    /// `V || R || S`.
    Vrs,
}

/// Compact representation: `R || S` and the recovery id.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Compact {
    /// `R || S`, big-endian.
    pub rs: [u8; COMPACT_SIGNATURE_SIZE],

    /// Recovery id.
    pub recovery_id: RecoveryId,
}

impl Compact {
    /// Split a 65-byte signature laid out as `format`.
    pub fn from_bytes(bytes: &[u8], format: CompactFormat) -> Result<Self> {
        if bytes.len() != COMPACT_RECOVERABLE_SIGNATURE_SIZE {
            return Err(Error::IncorrectByteCount {
                got: bytes.len(),
                expected: COMPACT_RECOVERABLE_SIGNATURE_SIZE,
            });
        }

        let (rs, v) = match format {
            CompactFormat::Rsv => (&bytes[..COMPACT_SIGNATURE_SIZE], bytes[COMPACT_SIGNATURE_SIZE]),
            CompactFormat::Vrs => (&bytes[1..], bytes[0]),
        };

        let mut compact_rs = [0u8; COMPACT_SIGNATURE_SIZE];
        compact_rs.copy_from_slice(rs);
        Ok(Self {
            rs: compact_rs,
            recovery_id: RecoveryId::from_byte(v)?,
        })
    }

    /// Join into 65 bytes laid out as `format`.
    pub fn to_bytes(&self, format: CompactFormat) -> [u8; COMPACT_RECOVERABLE_SIGNATURE_SIZE] {
        let mut bytes = [0u8; COMPACT_RECOVERABLE_SIGNATURE_SIZE];
        match format {
            CompactFormat::Rsv => {
                bytes[..COMPACT_SIGNATURE_SIZE].copy_from_slice(&self.rs);
                bytes[COMPACT_SIGNATURE_SIZE] = self.recovery_id.to_byte();
            }
            CompactFormat::Vrs => {
                bytes[0] = self.recovery_id.to_byte();
                bytes[1..].copy_from_slice(&self.rs);
            }
        }
        bytes
    }
}

/// ECDSA signature `(r, s)` with its recovery id.
#[derive(Clone)]
pub struct Signature {
    inner: k256::ecdsa::Signature,
    recovery_id: RecoveryId,
}

impl Signature {
    /// Parse a 65-byte compact signature laid out as `format`.
    pub fn from_compact(bytes: &[u8], format: CompactFormat) -> Result<Self> {
        let compact = Compact::from_bytes(bytes, format)?;
        Self::from_compact_rs(&compact.rs, compact.recovery_id)
    }

    /// Attach a recovery id to a 64-byte compact `R || S`.
    pub fn from_compact_rs(rs: &[u8], recovery_id: RecoveryId) -> Result<Self> {
        let rs: &[u8; COMPACT_SIGNATURE_SIZE] =
            rs.try_into().map_err(|_| Error::IncorrectByteCount {
                got: rs.len(),
                expected: COMPACT_SIGNATURE_SIZE,
            })?;

        let inner = engine::parse_ecdsa_compact(rs, Operation::RecoverableSignatureParseCompact)?;
        Ok(Self { inner, recovery_id })
    }

    /// Compact `R || S` and recovery id.
    pub fn compact(&self) -> Compact {
        Compact {
            rs: self.to_non_recoverable().to_compact(),
            recovery_id: self.recovery_id,
        }
    }

    /// Serialize as 65 bytes laid out as `format`.
    pub fn to_compact(&self, format: CompactFormat) -> [u8; COMPACT_RECOVERABLE_SIGNATURE_SIZE] {
        self.compact().to_bytes(format)
    }

    /// The recovery id.
    pub fn recovery_id(&self) -> RecoveryId {
        self.recovery_id
    }

    /// Drop the recovery id.
    pub fn to_non_recoverable(&self) -> super::Signature {
        super::Signature::from_inner(self.inner.clone())
    }

    /// Recover the public key which produced this signature over the 32-byte
    /// digest `hashed`.
    pub fn recover_public_key(&self, hashed: &[u8]) -> Result<VerifyingKey> {
        let hashed = message::hashed(hashed)?;
        engine::recover(&self.inner, self.recovery_id.to_byte(), hashed)
            .map(VerifyingKey::from_point)
    }

    /// Recover the public key which signed the SHA-256 digest of `message`.
    pub fn recover_public_key_unhashed(&self, message: &[u8]) -> Result<VerifyingKey> {
        self.recover_public_key(&message::sha256(message))
    }
}

impl ConstantTimeEq for Signature {
    fn ct_eq(&self, other: &Self) -> subtle::Choice {
        self.to_compact(CompactFormat::Rsv)[..].ct_eq(&other.to_compact(CompactFormat::Rsv)[..])
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
        self.to_compact(CompactFormat::Rsv).hash(state)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ecdsa::recoverable::Signature(")?;
        for byte in self.to_compact(CompactFormat::Rsv) {
            write!(f, "{byte:02x}")?;
        }
        f.write_str(")")
    }
}

impl SigningKey {
    /// Sign a 32-byte message digest, recording the recovery id.
    pub fn sign(&self, hashed: &[u8], options: &SigningOptions) -> Result<Signature> {
        let hashed = message::hashed(hashed)?;
        let (inner, recovery_id) =
            engine::ecdsa_sign(self.scalar(), hashed, &options.nonce_function)?;

        Ok(Signature {
            inner,
            recovery_id: RecoveryId::from_byte(recovery_id.to_byte())?,
        })
    }

    /// Sign the SHA-256 digest of `message`, recording the recovery id.
    pub fn sign_unhashed(&self, message: &[u8], options: &SigningOptions) -> Result<Signature> {
        self.sign(&message::sha256(message), options)
    }
}

impl VerifyingKey {
    /// Check `signature` over a 32-byte message digest. The recovery id
    /// plays no part in verification.
    pub fn is_valid_signature(
        &self,
        signature: &Signature,
        hashed: &[u8],
        options: &ValidationOptions,
    ) -> Result<bool> {
        let hashed = message::hashed(hashed)?;
        Ok(super::verify(self.point(), &signature.inner, hashed, options))
    }

    /// Check `signature` over the SHA-256 digest of `message`.
    pub fn is_valid_signature_unhashed(
        &self,
        signature: &Signature,
        message: &[u8],
        options: &ValidationOptions,
    ) -> bool {
        super::verify(
            self.point(),
            &signature.inner,
            &message::sha256(message),
            options,
        )
    }
}
