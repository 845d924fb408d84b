//! secp256k1 public keys.

use super::Capability;
use crate::{
    asn1::{keys, pem},
    engine::{self, COMPRESSED_POINT_SIZE, Point, SCALAR_SIZE, UNCOMPRESSED_POINT_SIZE},
    error::{Error, Result},
};
use alloc::{string::String, vec::Vec};
use core::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    marker::PhantomData,
};
use subtle::ConstantTimeEq;

/// Size of a raw `X || Y` public key.
pub const RAW_PUBLIC_KEY_SIZE: usize = 2 * SCALAR_SIZE;

/// Tag byte of an X9.63 uncompressed point.
const UNCOMPRESSED_TAG: u8 = 0x04;

/// A point on secp256k1 usable with capability `C`.
///
/// Public keys can be imported from and exported to:
///
/// - raw `X || Y` (64 bytes)
/// - ANSI X9.63 uncompressed `04 || X || Y` (65 bytes, described in
///   [SEC 1: Elliptic Curve Cryptography] section 2.3.3)
/// - SEC1 compressed `02 || X` or `03 || X` (33 bytes)
/// - DER `SubjectPublicKeyInfo`
/// - PEM (`PUBLIC KEY`)
///
/// [SEC 1: Elliptic Curve Cryptography]: https://www.secg.org/sec1-v2.pdf
pub struct PublicKey<C: Capability> {
    point: Point,
    capability: PhantomData<C>,
}

impl<C: Capability> PublicKey<C> {
    pub(crate) fn from_point(point: Point) -> Self {
        Self {
            point,
            capability: PhantomData,
        }
    }

    pub(crate) fn point(&self) -> &Point {
        &self.point
    }

    /// Import a raw 64-byte `X || Y` key.
    pub fn from_raw(bytes: &[u8]) -> Result<Self> {
        check_size(bytes, RAW_PUBLIC_KEY_SIZE)?;

        let mut x963 = [0u8; UNCOMPRESSED_POINT_SIZE];
        x963[0] = UNCOMPRESSED_TAG;
        x963[1..].copy_from_slice(bytes);
        Self::from_x963(&x963)
    }

    /// Import a 65-byte X9.63 uncompressed point.
    pub fn from_x963(bytes: &[u8]) -> Result<Self> {
        check_size(bytes, UNCOMPRESSED_POINT_SIZE)?;
        engine::parse_point(bytes).map(Self::from_point)
    }

    /// Import a 33-byte SEC1 compressed point.
    pub fn from_compressed(bytes: &[u8]) -> Result<Self> {
        check_size(bytes, COMPRESSED_POINT_SIZE)?;
        engine::parse_point(bytes).map(Self::from_point)
    }

    /// Import a DER `SubjectPublicKeyInfo`.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        Self::from_x963(keys::decode_spki(der)?)
    }

    /// Import a PEM `PUBLIC KEY` document.
    pub fn from_pem(pem: &str) -> Result<Self> {
        let document = pem::Document::parse_labeled(pem, pem::PUBLIC_KEY)?;
        Self::from_der(&document.der)
    }

    /// Export as raw `X || Y`.
    pub fn to_raw(&self) -> [u8; RAW_PUBLIC_KEY_SIZE] {
        let mut raw = [0u8; RAW_PUBLIC_KEY_SIZE];
        raw.copy_from_slice(&self.to_x963()[1..]);
        raw
    }

    /// Export as an X9.63 uncompressed point.
    pub fn to_x963(&self) -> [u8; UNCOMPRESSED_POINT_SIZE] {
        self.point.to_uncompressed()
    }

    /// Export as a SEC1 compressed point.
    pub fn to_compressed(&self) -> [u8; COMPRESSED_POINT_SIZE] {
        self.point.to_compressed()
    }

    /// Export as a DER `SubjectPublicKeyInfo`.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        Ok(keys::encode_spki(&self.to_x963())?)
    }

    /// Export as a PEM `PUBLIC KEY` document.
    pub fn to_pem(&self) -> Result<String> {
        let pem = pem::encode(pem::PUBLIC_KEY, &self.to_der()?)?;
        Ok(String::from(pem.as_str()))
    }

    /// The same point tagged for another capability.
    pub fn with_capability<D: Capability>(&self) -> PublicKey<D> {
        PublicKey::from_point(self.point.clone())
    }

    /// Negate the point: `-P`.
    pub fn negate(&self) -> Result<Self> {
        engine::negate(&self.point).map(Self::from_point)
    }

    /// Point addition: `P + Q`. Fails when the result is the identity.
    pub fn add(&self, other: &Self) -> Result<Self> {
        Self::sum([self, other])
    }

    /// Point subtraction: `P - Q`. Fails when the result is the identity.
    pub fn subtract(&self, other: &Self) -> Result<Self> {
        self.add(&other.negate()?)
    }

    /// Sum of all `keys`.
    ///
    /// An empty list is an [`Error::InvalidParameter`]; an identity result
    /// is an engine failure.
    pub fn sum<'a>(keys: impl IntoIterator<Item = &'a Self>) -> Result<Self> {
        let points: Vec<&Point> = keys.into_iter().map(|key| &key.point).collect();
        if points.is_empty() {
            return Err(Error::InvalidParameter);
        }
        engine::combine(points).map(Self::from_point)
    }
}

fn check_size(bytes: &[u8], expected: usize) -> Result<()> {
    if bytes.len() == expected {
        Ok(())
    } else {
        Err(Error::InvalidKeySize {
            got: bytes.len(),
            expected,
        })
    }
}

impl<C: Capability> Clone for PublicKey<C> {
    fn clone(&self) -> Self {
        Self::from_point(self.point.clone())
    }
}

impl<C: Capability> PartialEq for PublicKey<C> {
    fn eq(&self, other: &Self) -> bool {
        equal_by_comparison(engine::compare(&self.point, &other.point), self, other)
    }
}

/// Equality from the engine's point comparison, or from a constant-time
/// comparison of the X9.63 encodings when the engine failed.
fn equal_by_comparison<C: Capability>(
    comparison: Result<Ordering>,
    lhs: &PublicKey<C>,
    rhs: &PublicKey<C>,
) -> bool {
    match comparison {
        Ok(ordering) => ordering == Ordering::Equal,
        Err(err) => {
            tracing::debug!(%err, "engine comparison failed, comparing encoded points");
            lhs.to_x963()[..].ct_eq(&rhs.to_x963()[..]).into()
        }
    }
}

impl<C: Capability> Eq for PublicKey<C> {}

impl<C: Capability> Hash for PublicKey<C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_x963().hash(state)
    }
}

impl<C: Capability> fmt::Debug for PublicKey<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey<{}>(", C::NAME)?;
        for byte in self.to_compressed() {
            write!(f, "{byte:02x}")?;
        }
        f.write_str(")")
    }
}
