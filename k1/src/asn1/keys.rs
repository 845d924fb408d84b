//! SEC1, PKCS#8 and SubjectPublicKeyInfo documents for secp256k1 keys.

use crate::{error::Asn1Error, secure_bytes::SecureBytes};
use alloc::vec::Vec;
use der::{
    Decode, Encode,
    asn1::{BitStringRef, ObjectIdentifier},
};
use pkcs8::PrivateKeyInfo;
use sec1::{EcParameters, EcPrivateKey};
use spki::{AlgorithmIdentifierRef, SubjectPublicKeyInfoRef};

/// `id-ecPublicKey` (1.2.840.10045.2.1).
pub(crate) const ALGORITHM_OID: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");

/// `secp256k1` (1.3.132.0.10).
pub(crate) const SECP256K1_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.10");

fn algorithm_identifier() -> AlgorithmIdentifierRef<'static> {
    AlgorithmIdentifierRef {
        oid: ALGORITHM_OID,
        parameters: Some((&SECP256K1_OID).into()),
    }
}

/// Encode `value` straight into zeroizing storage.
fn encode_secret(value: &impl Encode) -> Result<SecureBytes, Asn1Error> {
    let len = usize::try_from(value.encoded_len()?)?;
    let mut der = SecureBytes::zeroed(len);
    der.with_bytes_mut(|buf| value.encode_to_slice(buf).map(|_| ()))?;
    Ok(der)
}

/// Decode a SEC1 `ECPrivateKey` (RFC 5915). Curve parameters are optional
/// but must name secp256k1 when present.
pub(crate) fn decode_sec1(der: &[u8]) -> Result<EcPrivateKey<'_>, Asn1Error> {
    let key = EcPrivateKey::from_der(der)?;
    if let Some(EcParameters::NamedCurve(oid)) = key.parameters {
        if oid != SECP256K1_OID {
            return Err(Asn1Error::InvalidObjectIdentifier);
        }
    }
    Ok(key)
}

/// Encode a SEC1 `ECPrivateKey` carrying the public key, naming the curve
/// when `named_curve` is set.
pub(crate) fn encode_sec1(
    private_key: &[u8],
    public_key: &[u8],
    named_curve: bool,
) -> Result<SecureBytes, Asn1Error> {
    encode_secret(&EcPrivateKey {
        private_key,
        parameters: named_curve.then_some(EcParameters::NamedCurve(SECP256K1_OID)),
        public_key: Some(public_key),
    })
}

/// Decode a PKCS#8 `PrivateKeyInfo` (RFC 5208) and the SEC1 key it wraps.
pub(crate) fn decode_pkcs8(der: &[u8]) -> Result<EcPrivateKey<'_>, Asn1Error> {
    let private_key_info = PrivateKeyInfo::from_der(der)?;
    private_key_info
        .algorithm
        .assert_oids(ALGORITHM_OID, SECP256K1_OID)?;
    decode_sec1(private_key_info.private_key)
}

/// Encode a PKCS#8 `PrivateKeyInfo`. The embedded `ECPrivateKey` omits the
/// curve parameters since the algorithm identifier already names the curve.
pub(crate) fn encode_pkcs8(private_key: &[u8], public_key: &[u8]) -> Result<SecureBytes, Asn1Error> {
    let ec_private_key = encode_sec1(private_key, public_key, false)?;
    ec_private_key.with_bytes(|ec_private_key| {
        encode_secret(&PrivateKeyInfo::new(algorithm_identifier(), ec_private_key))
    })
}

/// Decode a `SubjectPublicKeyInfo` (RFC 5280), returning the encoded point.
pub(crate) fn decode_spki(der: &[u8]) -> Result<&[u8], Asn1Error> {
    let spki = SubjectPublicKeyInfoRef::from_der(der)?;
    spki.algorithm.assert_oids(ALGORITHM_OID, SECP256K1_OID)?;
    spki.subject_public_key
        .as_bytes()
        .ok_or(Asn1Error::InvalidAsn1Object)
}

/// Encode a `SubjectPublicKeyInfo` holding `public_key`.
pub(crate) fn encode_spki(public_key: &[u8]) -> Result<Vec<u8>, Asn1Error> {
    let spki = SubjectPublicKeyInfoRef {
        algorithm: algorithm_identifier(),
        subject_public_key: BitStringRef::new(0, public_key)?,
    };
    Ok(spki.to_der()?)
}
