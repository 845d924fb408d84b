#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]
#![doc(html_logo_url = "https://raw.githubusercontent.com/RustCrypto/meta/master/logo_small.png")]
#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod ecdh;
pub mod ecdsa;
pub mod keys;
pub mod schnorr;

mod asn1;
mod engine;
mod error;
mod message;
mod secure_bytes;

pub use crate::{
    engine::{COMPRESSED_POINT_SIZE, SCALAR_SIZE, UNCOMPRESSED_POINT_SIZE},
    error::{Asn1Error, Error, Operation, Result},
    keys::{PrivateKey, PublicKey},
    secure_bytes::SecureBytes,
};
pub use k256;
pub use zeroize;
