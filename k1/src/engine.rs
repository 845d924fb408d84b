//! Boundary to the `k256` curve engine.
//!
//! Every fallible call runs inside a [`Context`] created for that call
//! alone. Secret scalars are loaded into the context and released when it
//! drops, on success and on failure. Failures are reported as the
//! [`Operation`] which failed.

use crate::{
    ecdsa::NonceFunction,
    error::{Error, Operation, Result},
    secure_bytes::SecureBytes,
};
use core::cmp::Ordering;
use elliptic_curve::sec1::ToEncodedPoint;
use k256::{AffinePoint, ProjectivePoint, PublicKey, SecretKey, ecdsa, schnorr};
use rand_core::{CryptoRng, OsRng, RngCore};
use sha2::{Digest, Sha256};
use signature::hazmat::{PrehashSigner, PrehashVerifier, RandomizedPrehashSigner};
use zeroize::Zeroizing;

/// Size of a serialized scalar or field element.
pub const SCALAR_SIZE: usize = 32;

/// Size of an X9.63 uncompressed point.
pub const UNCOMPRESSED_POINT_SIZE: usize = 65;

/// Size of a SEC1 compressed point.
pub const COMPRESSED_POINT_SIZE: usize = 33;

type Outcome<T> = core::result::Result<T, Operation>;

/// Per-call engine state.
pub(crate) struct Context {
    operation: Operation,
    secret: Option<SecretKey>,
}

impl Context {
    /// Run `f` in a fresh context, converting a failed operation into
    /// [`Error::Engine`].
    pub(crate) fn run<T>(
        operation: Operation,
        f: impl FnOnce(&mut Context) -> Outcome<T>,
    ) -> Result<T> {
        let span = tracing::trace_span!("k1::engine", %operation);
        let _entered = span.enter();

        let mut context = Context {
            operation,
            secret: None,
        };
        let outcome = f(&mut context);
        drop(context);

        outcome.map_err(|failed| {
            tracing::debug!(operation = %failed, "curve engine call failed");
            Error::Engine(failed)
        })
    }

    /// Load a secret scalar for the duration of this context. Values outside
    /// `[1, n)` fail with the context's operation.
    fn load_secret(&mut self, scalar: &SecureBytes) -> Outcome<&SecretKey> {
        let secret = scalar
            .with_bytes(SecretKey::from_slice)
            .map_err(|_| self.operation)?;
        let secret: &SecretKey = self.secret.insert(secret);
        Ok(secret)
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        // `SecretKey` zeroizes itself when dropped.
        if self.secret.take().is_some() {
            tracing::trace!("released secret scalar");
        }
    }
}

/// A valid, non-identity point on secp256k1.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Point(PublicKey);

impl Point {
    pub(crate) fn to_uncompressed(&self) -> [u8; UNCOMPRESSED_POINT_SIZE] {
        let mut bytes = [0u8; UNCOMPRESSED_POINT_SIZE];
        bytes.copy_from_slice(self.0.to_encoded_point(false).as_bytes());
        bytes
    }

    pub(crate) fn to_compressed(&self) -> [u8; COMPRESSED_POINT_SIZE] {
        let mut bytes = [0u8; COMPRESSED_POINT_SIZE];
        bytes.copy_from_slice(self.0.to_encoded_point(true).as_bytes());
        bytes
    }

    fn from_projective(point: ProjectivePoint, operation: Operation) -> Outcome<Self> {
        PublicKey::from_affine(AffinePoint::from(point))
            .map(Point)
            .map_err(|_| operation)
    }
}

/// Derive the public point of a secret scalar, rejecting scalars outside
/// `[1, n)`.
pub(crate) fn derive_public_key(scalar: &SecureBytes) -> Result<Point> {
    Context::run(Operation::PublicKeyCreate, |context| {
        Ok(Point(context.load_secret(scalar)?.public_key()))
    })
}

/// Parse an X9.63 uncompressed or SEC1 compressed point.
pub(crate) fn parse_point(bytes: &[u8]) -> Result<Point> {
    Context::run(Operation::PublicKeyParse, |_| {
        PublicKey::from_sec1_bytes(bytes)
            .map(Point)
            .map_err(|_| Operation::PublicKeyParse)
    })
}

/// Order two points by their compressed encodings.
pub(crate) fn compare(lhs: &Point, rhs: &Point) -> Result<Ordering> {
    Context::run(Operation::PublicKeyCompare, |_| {
        let lhs = lhs.0.to_encoded_point(true);
        let rhs = rhs.0.to_encoded_point(true);
        if lhs.len() != COMPRESSED_POINT_SIZE || rhs.len() != COMPRESSED_POINT_SIZE {
            return Err(Operation::PublicKeyCompare);
        }
        Ok(lhs.as_bytes().cmp(rhs.as_bytes()))
    })
}

/// Parse a compact `R || S` signature. Zero or out of range scalars fail
/// with `operation`.
pub(crate) fn parse_ecdsa_compact(
    bytes: &[u8; 2 * SCALAR_SIZE],
    operation: Operation,
) -> Result<ecdsa::Signature> {
    Context::run(operation, |_| {
        ecdsa::Signature::from_slice(bytes).map_err(|_| operation)
    })
}

/// Return the low-S form of `signature` and whether it differed.
pub(crate) fn normalize(signature: &ecdsa::Signature) -> (ecdsa::Signature, bool) {
    match signature.normalize_s() {
        Some(normalized) => (normalized, true),
        None => (signature.clone(), false),
    }
}

/// Sign a 32-byte digest, returning a low-S signature and its recovery id.
pub(crate) fn ecdsa_sign(
    scalar: &SecureBytes,
    hashed: &[u8; SCALAR_SIZE],
    nonce: &NonceFunction,
) -> Result<(ecdsa::Signature, ecdsa::RecoveryId)> {
    Context::run(Operation::EcdsaSign, |context| {
        let signing_key = ecdsa::SigningKey::from(context.load_secret(scalar)?);

        let signature = match nonce {
            NonceFunction::Deterministic(None) => {
                <ecdsa::SigningKey as PrehashSigner<ecdsa::Signature>>::sign_prehash(
                    &signing_key,
                    hashed,
                )
            }
            NonceFunction::Deterministic(Some(data)) => {
                <ecdsa::SigningKey as RandomizedPrehashSigner<ecdsa::Signature>>::sign_prehash_with_rng(
                    &signing_key,
                    &mut FixedEntropy::new(data.as_bytes()),
                    hashed,
                )
            }
            NonceFunction::Random => {
                <ecdsa::SigningKey as RandomizedPrehashSigner<ecdsa::Signature>>::sign_prehash_with_rng(
                    &signing_key,
                    &mut OsRng,
                    hashed,
                )
            }
        }
        .map_err(|_| Operation::EcdsaSign)?;

        let (signature, _) = normalize(&signature);
        let recovery_id = trial_recovery(signing_key.verifying_key(), hashed, &signature)?;
        Ok((signature, recovery_id))
    })
}

/// Find the recovery id which yields `verifying_key` for `signature`.
fn trial_recovery(
    verifying_key: &ecdsa::VerifyingKey,
    hashed: &[u8],
    signature: &ecdsa::Signature,
) -> Outcome<ecdsa::RecoveryId> {
    (0u8..4)
        .filter_map(ecdsa::RecoveryId::from_byte)
        .find(|&id| {
            ecdsa::VerifyingKey::recover_from_prehash(hashed, signature, id)
                .is_ok_and(|recovered| &recovered == verifying_key)
        })
        .ok_or(Operation::Recover)
}

/// Verify a signature over a 32-byte digest. High-S signatures never
/// verify here; callers normalize first.
pub(crate) fn ecdsa_verify(
    point: &Point,
    hashed: &[u8; SCALAR_SIZE],
    signature: &ecdsa::Signature,
) -> bool {
    ecdsa::VerifyingKey::from(&point.0)
        .verify_prehash(hashed, signature)
        .is_ok()
}

/// Recover the public key which produced `signature` over `hashed`.
///
/// High-S signatures are accepted: negating `s` mirrors the nonce point,
/// so the y parity bit of the recovery id is flipped alongside.
pub(crate) fn recover(
    signature: &ecdsa::Signature,
    recovery_id: u8,
    hashed: &[u8; SCALAR_SIZE],
) -> Result<Point> {
    Context::run(Operation::Recover, |_| {
        let (signature, flipped) = normalize(signature);
        let recovery_id = ecdsa::RecoveryId::from_byte(recovery_id ^ u8::from(flipped))
            .ok_or(Operation::RecoverableSignatureParseCompact)?;

        let verifying_key =
            ecdsa::VerifyingKey::recover_from_prehash(hashed, &signature, recovery_id)
                .map_err(|_| Operation::Recover)?;
        Ok(Point(PublicKey::from(&verifying_key)))
    })
}

/// BIP340 sign a 32-byte message with 32 bytes of auxiliary randomness.
pub(crate) fn schnorr_sign(
    scalar: &SecureBytes,
    hashed: &[u8; SCALAR_SIZE],
    aux_rand: &[u8; SCALAR_SIZE],
) -> Result<[u8; 2 * SCALAR_SIZE]> {
    Context::run(Operation::SchnorrSign, |_| {
        let signing_key = scalar
            .with_bytes(schnorr::SigningKey::from_bytes)
            .map_err(|_| Operation::KeypairCreate)?;

        let signature = signing_key
            .sign_raw(hashed, aux_rand)
            .map_err(|_| Operation::SchnorrSign)?;
        Ok(signature.to_bytes())
    })
}

/// BIP340 verify against the x-only form of `point`.
pub(crate) fn schnorr_verify(
    point: &Point,
    hashed: &[u8; SCALAR_SIZE],
    signature: &[u8; 2 * SCALAR_SIZE],
) -> Result<bool> {
    Context::run(Operation::XonlyPublicKey, |_| {
        let compressed = point.to_compressed();
        let verifying_key = schnorr::VerifyingKey::from_bytes(&compressed[1..])
            .map_err(|_| Operation::XonlyPublicKey)?;

        let Ok(signature) = schnorr::Signature::try_from(&signature[..]) else {
            return Ok(false);
        };
        Ok(verifying_key.verify_raw(hashed, &signature).is_ok())
    })
}

/// Shape of an ECDH result.
#[derive(Copy, Clone, Debug)]
pub(crate) enum EcdhOutput {
    /// SHA-256 over the compressed shared point.
    HashedCompressedPoint,
    /// x-coordinate of the shared point.
    AnsiX963XOnly,
    /// X9.63 uncompressed shared point.
    RawUncompressedPoint,
}

/// Multiply `point` by a secret scalar and shape the result.
pub(crate) fn ecdh(
    point: &Point,
    scalar: &SecureBytes,
    output: EcdhOutput,
) -> Result<SecureBytes> {
    Context::run(Operation::Ecdh, |context| {
        let secret = context.load_secret(scalar)?;
        let shared = point.0.to_projective() * *secret.to_nonzero_scalar();
        let Point(shared) = Point::from_projective(shared, Operation::Ecdh)?;

        Ok(match output {
            EcdhOutput::HashedCompressedPoint => {
                let compressed = Zeroizing::new(shared.to_encoded_point(true));
                let digest: [u8; SCALAR_SIZE] = Sha256::digest(compressed.as_bytes()).into();
                SecureBytes::from(digest)
            }
            EcdhOutput::AnsiX963XOnly => {
                let uncompressed = Zeroizing::new(shared.to_encoded_point(false));
                SecureBytes::from_slice(&uncompressed.as_bytes()[1..=SCALAR_SIZE])
            }
            EcdhOutput::RawUncompressedPoint => {
                let uncompressed = Zeroizing::new(shared.to_encoded_point(false));
                SecureBytes::from_slice(uncompressed.as_bytes())
            }
        })
    })
}

/// Negate a point.
pub(crate) fn negate(point: &Point) -> Result<Point> {
    Context::run(Operation::Negate, |_| {
        Point::from_projective(-point.0.to_projective(), Operation::Negate)
    })
}

/// Add points. The identity is not a valid result.
pub(crate) fn combine<'a>(points: impl IntoIterator<Item = &'a Point>) -> Result<Point> {
    Context::run(Operation::Combine, |_| {
        let sum = points
            .into_iter()
            .fold(ProjectivePoint::IDENTITY, |sum, point| {
                sum + point.0.to_projective()
            });
        Point::from_projective(sum, Operation::Combine)
    })
}

/// RNG which replays caller supplied bytes. Used to feed RFC 6979
/// additional data through the randomized signing interface, which draws
/// exactly one field element from its RNG.
struct FixedEntropy<'a> {
    bytes: &'a [u8; SCALAR_SIZE],
    position: usize,
}

impl<'a> FixedEntropy<'a> {
    fn new(bytes: &'a [u8; SCALAR_SIZE]) -> Self {
        Self { bytes, position: 0 }
    }
}

impl RngCore for FixedEntropy<'_> {
    fn next_u32(&mut self) -> u32 {
        rand_core::impls::next_u32_via_fill(self)
    }

    fn next_u64(&mut self) -> u64 {
        rand_core::impls::next_u64_via_fill(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for byte in dest {
            *byte = self.bytes[self.position % SCALAR_SIZE];
            self.position += 1;
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> core::result::Result<(), rand_core::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl CryptoRng for FixedEntropy<'_> {}
