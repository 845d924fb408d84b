//! ASN.1 structures used by secp256k1 keys and ECDSA signatures.
//!
//! Key documents are handled by the [`sec1`], [`pkcs8`] and [`spki`]
//! crates on top of [`der`], and PEM armor by [`pem_rfc7468`]. Only the
//! lenient decoding of signature integers lives here.

pub(crate) mod keys;
pub(crate) mod pem;
pub(crate) mod signature;
