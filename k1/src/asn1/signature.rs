//! DER encoding of ECDSA signatures.
//!
//! ```text
//! Ecdsa-Sig-Value ::= SEQUENCE {
//!   r INTEGER,
//!   s INTEGER
//! }
//! ```

use crate::error::Asn1Error;
use alloc::vec::Vec;
use der::{
    Decode, DecodeValue, Encode, EncodeValue, Header, Length, Reader, Sequence, Tag, Tagged,
    Writer,
    asn1::{AnyRef, UintRef},
};

/// Buffer size reserved for a serialized signature. Two 33-byte integers
/// with their headers inside a sequence header never exceed it.
pub(crate) const MAX_DER_SIGNATURE_SIZE: usize = 75;

/// `r` and `s` magnitudes of a DER signature, big-endian without leading
/// zero bytes.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct EcdsaSignature<'a> {
    pub(crate) r: &'a [u8],
    pub(crate) s: &'a [u8],
}

impl<'a> EcdsaSignature<'a> {
    /// Decode a DER signature. Integers with redundant leading zeroes are
    /// accepted.
    pub(crate) fn parse(der: &'a [u8]) -> Result<Self, Asn1Error> {
        Ok(Self::from_der(der)?)
    }

    /// Encode with minimal integers.
    pub(crate) fn serialize(&self) -> Result<Vec<u8>, Asn1Error> {
        let mut buf = [0u8; MAX_DER_SIGNATURE_SIZE];
        let der = self.encode_to_slice(&mut buf)?;
        Ok(der.to_vec())
    }
}

/// Read a non-negative INTEGER, stripping any leading zero bytes.
fn decode_unsigned<'a, R: Reader<'a>>(reader: &mut R) -> der::Result<&'a [u8]> {
    let any = AnyRef::decode(reader)?;
    any.tag().assert_eq(Tag::Integer)?;

    let bytes = any.value();
    match bytes.first() {
        None => Err(Tag::Integer.length_error()),
        Some(byte) if byte & 0x80 != 0 => Err(Tag::Integer.value_error()),
        Some(_) => {
            let leading = bytes.iter().take_while(|&&byte| byte == 0).count();
            Ok(&bytes[leading..])
        }
    }
}

impl<'a> DecodeValue<'a> for EcdsaSignature<'a> {
    fn decode_value<R: Reader<'a>>(reader: &mut R, header: Header) -> der::Result<Self> {
        reader.read_nested(header.length, |reader| {
            let r = decode_unsigned(reader)?;
            let s = decode_unsigned(reader)?;
            Ok(Self { r, s })
        })
    }
}

impl EncodeValue for EcdsaSignature<'_> {
    fn value_len(&self) -> der::Result<Length> {
        UintRef::new(self.r)?.encoded_len()? + UintRef::new(self.s)?.encoded_len()?
    }

    fn encode_value(&self, writer: &mut impl Writer) -> der::Result<()> {
        UintRef::new(self.r)?.encode(writer)?;
        UintRef::new(self.s)?.encode(writer)
    }
}

impl<'a> Sequence<'a> for EcdsaSignature<'a> {}
