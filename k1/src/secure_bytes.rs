//! Zeroizing, constant-time comparable byte buffer for secret material.

use alloc::{vec, vec::Vec};
use core::fmt;
use rand_core::{CryptoRngCore, OsRng};
use subtle::{Choice, ConstantTimeEq};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Smallest capacity allocated when a buffer first grows.
const MIN_CAPACITY: usize = 32;

/// Owned, growable byte buffer for private key material.
///
/// - storage is zeroized before it is released, including storage abandoned
///   when the buffer grows and bytes removed by [`SecureBytes::truncate`];
/// - newly reserved capacity is zero-filled;
/// - equality is evaluated in constant time with respect to the contents;
/// - [`Clone`] produces an independent copy;
/// - [`fmt::Debug`] never prints the contents.
///
/// Contents are only reachable through the scoped accessors
/// [`SecureBytes::with_bytes`] and [`SecureBytes::with_bytes_mut`].
pub struct SecureBytes {
    bytes: Vec<u8>,
}

impl SecureBytes {
    /// Create an empty buffer.
    pub const fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Create a buffer of `count` bytes filled from the operating system's
    /// cryptographically secure random number generator.
    pub fn random(count: usize) -> Self {
        Self::random_with_rng(&mut OsRng, count)
    }

    /// Create a buffer of `count` bytes filled from `rng`.
    pub fn random_with_rng(rng: &mut impl CryptoRngCore, count: usize) -> Self {
        let mut buffer = Self::zeroed(count);
        rng.fill_bytes(&mut buffer.bytes);
        buffer
    }

    /// Create a buffer of `count` zero bytes.
    pub fn zeroed(count: usize) -> Self {
        Self {
            bytes: vec![0u8; count],
        }
    }

    /// Copy `bytes` into a new buffer.
    pub fn from_slice(bytes: &[u8]) -> Self {
        let mut buffer = Self::new();
        buffer.extend_from_slice(bytes);
        buffer
    }

    /// Number of bytes held.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Number of bytes the buffer can hold without reallocating.
    pub fn capacity(&self) -> usize {
        self.bytes.capacity()
    }

    /// Call `f` with read access to the contents.
    pub fn with_bytes<R>(&self, f: impl FnOnce(&[u8]) -> R) -> R {
        f(&self.bytes)
    }

    /// Call `f` with write access to the contents.
    pub fn with_bytes_mut<R>(&mut self, f: impl FnOnce(&mut [u8]) -> R) -> R {
        f(&mut self.bytes)
    }

    /// Append a single byte.
    pub fn push(&mut self, byte: u8) {
        self.reserve(1);
        self.bytes.push(byte);
    }

    /// Append `bytes`.
    pub fn extend_from_slice(&mut self, bytes: &[u8]) {
        self.reserve(bytes.len());
        self.bytes.extend_from_slice(bytes);
    }

    /// Resize to `new_len`, filling new bytes with `value` or zeroizing the
    /// removed tail.
    pub fn resize(&mut self, new_len: usize, value: u8) {
        if new_len <= self.len() {
            self.truncate(new_len);
        } else {
            self.reserve(new_len - self.len());
            self.bytes.resize(new_len, value);
        }
    }

    /// Shorten to `len` bytes, zeroizing the removed tail.
    pub fn truncate(&mut self, len: usize) {
        if len < self.bytes.len() {
            self.bytes[len..].zeroize();
            self.bytes.truncate(len);
        }
    }

    /// Make room for at least `additional` more bytes.
    ///
    /// Capacity at least doubles on every reallocation. The old allocation
    /// is zeroized before it is freed.
    pub fn reserve(&mut self, additional: usize) {
        let required = self.bytes.len().saturating_add(additional);
        if required <= self.bytes.capacity() {
            return;
        }

        let new_capacity = required
            .max(self.bytes.capacity().saturating_mul(2))
            .max(MIN_CAPACITY);
        self.reallocate(new_capacity);
    }

    fn reallocate(&mut self, new_capacity: usize) {
        let len = self.bytes.len();
        let mut grown = vec![0u8; new_capacity];
        grown[..len].copy_from_slice(&self.bytes);
        grown.truncate(len);

        let mut old = core::mem::replace(&mut self.bytes, grown);
        old.zeroize();
    }
}

impl Default for SecureBytes {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for SecureBytes {
    fn clone(&self) -> Self {
        Self::from_slice(&self.bytes)
    }
}

impl Drop for SecureBytes {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl ZeroizeOnDrop for SecureBytes {}

impl Zeroize for SecureBytes {
    fn zeroize(&mut self) {
        self.bytes.zeroize();
    }
}

impl ConstantTimeEq for SecureBytes {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.bytes.as_slice().ct_eq(other.bytes.as_slice())
    }
}

impl PartialEq for SecureBytes {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for SecureBytes {}

impl From<&[u8]> for SecureBytes {
    fn from(bytes: &[u8]) -> Self {
        Self::from_slice(bytes)
    }
}

impl<const N: usize> From<[u8; N]> for SecureBytes {
    fn from(mut bytes: [u8; N]) -> Self {
        let buffer = Self::from_slice(&bytes);
        bytes.zeroize();
        buffer
    }
}

impl From<Vec<u8>> for SecureBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }
}

impl Extend<u8> for SecureBytes {
    fn extend<I: IntoIterator<Item = u8>>(&mut self, iter: I) {
        for byte in iter {
            self.push(byte);
        }
    }
}

impl fmt::Debug for SecureBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecureBytes(len={}, [REDACTED])", self.bytes.len())
    }
}
