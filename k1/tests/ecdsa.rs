//! ECDSA signing and verification tests.

use hex_literal::hex;
use k1::{
    Asn1Error, Error, Operation,
    ecdsa::{
        MalleabilityStrictness, NonceFunction, Rfc6979ArbitraryData, Signature, SigningKey,
        SigningOptions, ValidationOptions, VerifyingKey,
    },
};
use proptest::prelude::*;

/// secp256k1 group order.
const ORDER: [u8; 32] = hex!("fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141");

struct DeterministicVector {
    secret: [u8; 32],
    message: &'static [u8],
    r: [u8; 32],
    s: [u8; 32],
}

/// RFC 6979 signatures over SHA-256 of the message, in low-S form.
const DETERMINISTIC_VECTORS: &[DeterministicVector] = &[
    DeterministicVector {
        secret: hex!("0000000000000000000000000000000000000000000000000000000000000001"),
        message: b"Satoshi Nakamoto",
        r: hex!("934b1ea10a4b3c1757e2b0c017d0b6143ce3c9a7e6a4a49860d7a6ab210ee3d8"),
        s: hex!("2442ce9d2b916064108014783e923ec36b49743e2ffa1c4496f01a512aafd9e5"),
    },
    DeterministicVector {
        secret: hex!("fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364140"),
        message: b"Satoshi Nakamoto",
        r: hex!("fd567d121db66e382991534ada77a6bd3106f0a1098c231e47993447cd6af2d0"),
        s: hex!("6b39cd0eb1bc8603e159ef5c20a5c8ad685a45b06ce9bebed3f153d10d93bed5"),
    },
];

/// `n - s` for a big-endian `s < n`.
fn negate_s(s: &[u8; 32]) -> [u8; 32] {
    let mut out = [0u8; 32];
    let mut borrow = 0i16;
    for i in (0..32).rev() {
        let mut diff = i16::from(ORDER[i]) - i16::from(s[i]) - borrow;
        borrow = 0;
        if diff < 0 {
            diff += 256;
            borrow = 1;
        }
        out[i] = diff as u8;
    }
    out
}

fn high_s_twin(signature: &Signature) -> Signature {
    let mut compact = signature.to_compact();
    let s = negate_s(&signature.s());
    compact[32..].copy_from_slice(&s);
    Signature::from_compact(&compact).unwrap()
}

#[test]
fn rfc6979_vectors() {
    for vector in DETERMINISTIC_VECTORS {
        let signing_key = SigningKey::from_raw(&vector.secret).unwrap();
        let signature = signing_key
            .sign_unhashed(vector.message, &SigningOptions::default())
            .unwrap();

        assert_eq!(signature.r(), vector.r);
        assert_eq!(signature.s(), vector.s);
        assert!(signature.is_normalized());
        assert!(signing_key.public_key().is_valid_signature_unhashed(
            &signature,
            vector.message,
            &ValidationOptions::default(),
        ));
    }
}

#[test]
fn der_vector() {
    let signing_key = SigningKey::from_raw(&hex!(
        "f8b8af8ce3c7cca5e300d33939540c10d45ce001b8f252bfbc57ba0342904181"
    ))
    .unwrap();
    let expected = hex!(
        "304402207063ae83e7f62bbb171798131b4a0564b956930092b33b07b395615d9ec7e15c"
        "022058dfcc1e00a35e1572f366ffe34ba0fc47db1e7189759b9fb233c5b05ab388ea"
    );

    let signature = signing_key
        .sign_unhashed(b"Alan Turing", &SigningOptions::default())
        .unwrap();
    assert_eq!(signature.to_der().unwrap(), expected);
    assert_eq!(Signature::from_der(&expected).unwrap(), signature);
}

#[test]
fn der_with_padded_integer_is_canonicalized() {
    let canonical = hex!(
        "304402207063ae83e7f62bbb171798131b4a0564b956930092b33b07b395615d9ec7e15c"
        "022058dfcc1e00a35e1572f366ffe34ba0fc47db1e7189759b9fb233c5b05ab388ea"
    );

    let mut padded = hex!("3045022100").to_vec();
    padded.extend_from_slice(&canonical[4..]);

    let signature = Signature::from_der(&padded).unwrap();
    assert_eq!(signature.to_der().unwrap(), canonical);
}

#[test]
fn malleability_policy() {
    let signing_key = SigningKey::generate();
    let verifying_key = signing_key.public_key();
    let message = b"malleable";

    let low = signing_key
        .sign_unhashed(message, &SigningOptions::default())
        .unwrap();
    let high = high_s_twin(&low);
    assert!(!high.is_normalized());
    assert_eq!(high.normalize_s(), low);

    let rejected = ValidationOptions::new(MalleabilityStrictness::Rejected);
    let accepted = ValidationOptions::new(MalleabilityStrictness::Accepted);

    assert!(verifying_key.is_valid_signature_unhashed(&low, message, &rejected));
    assert!(verifying_key.is_valid_signature_unhashed(&low, message, &accepted));
    assert!(!verifying_key.is_valid_signature_unhashed(&high, message, &rejected));
    assert!(verifying_key.is_valid_signature_unhashed(&high, message, &accepted));
    assert!(!verifying_key.is_valid_signature_unhashed(&high, b"other", &accepted));
}

#[test]
fn normalization_is_idempotent() {
    let signing_key = SigningKey::generate();
    let verifying_key = signing_key.public_key();
    let message = b"idempotent";

    let low = signing_key
        .sign_unhashed(message, &SigningOptions::default())
        .unwrap();
    let high = high_s_twin(&low);

    assert_eq!(low.normalize_s(), low);
    assert_eq!(low.normalize_s().normalize_s(), low);
    assert_eq!(high.normalize_s().normalize_s(), low);

    for options in [
        ValidationOptions::new(MalleabilityStrictness::Rejected),
        ValidationOptions::new(MalleabilityStrictness::Accepted),
    ] {
        for signature in [&low, &high] {
            let first = verifying_key.is_valid_signature_unhashed(signature, message, &options);
            let second = verifying_key.is_valid_signature_unhashed(signature, message, &options);
            assert_eq!(first, second);
        }
    }
}

/// Malformed encodings in the style of the Wycheproof ECDSA DER suite.
#[test]
fn malformed_der_signatures() {
    let valid = hex!(
        "304402207063ae83e7f62bbb171798131b4a0564b956930092b33b07b395615d9ec7e15c"
        "022058dfcc1e00a35e1572f366ffe34ba0fc47db1e7189759b9fb233c5b05ab388ea"
    );
    assert!(Signature::from_der(&valid).is_ok());

    // long-form length on the sequence
    let mut long_sequence = hex!("308144").to_vec();
    long_sequence.extend_from_slice(&valid[2..]);

    // long-form length on r
    let mut long_r = hex!("3045028120").to_vec();
    long_r.extend_from_slice(&valid[4..]);

    let mut negative_r = valid.to_vec();
    negative_r[4] |= 0x80;

    let mut trailing = valid.to_vec();
    trailing.push(0x00);

    let mut octet_string_s = valid.to_vec();
    octet_string_s[36] = 0x04;

    let truncated = &valid[..valid.len() - 1];

    let cases: [(&[u8], Asn1Error); 6] = [
        (&long_sequence, Asn1Error::UnsupportedFieldLength),
        (&long_r, Asn1Error::UnsupportedFieldLength),
        (&negative_r, Asn1Error::InvalidIntegerEncoding),
        (&trailing, Asn1Error::InvalidAsn1Object),
        (&octet_string_s, Asn1Error::UnexpectedFieldType),
        (truncated, Asn1Error::TruncatedField),
    ];

    for (der, expected) in cases {
        assert_eq!(
            Signature::from_der(der),
            Err(Error::Asn1(expected)),
            "{}",
            hex::encode(der)
        );
    }
}

#[test]
fn nonce_functions() {
    let signing_key = SigningKey::generate();
    let message = b"nonces";

    let plain = SigningOptions::default();
    let with_data = SigningOptions::new(NonceFunction::Deterministic(Some(
        Rfc6979ArbitraryData::from([0x42; 32]),
    )));
    let random = SigningOptions::new(NonceFunction::Random);

    let a = signing_key.sign_unhashed(message, &plain).unwrap();
    assert_eq!(signing_key.sign_unhashed(message, &plain).unwrap(), a);

    let b = signing_key.sign_unhashed(message, &with_data).unwrap();
    assert_ne!(a, b);
    assert_eq!(signing_key.sign_unhashed(message, &with_data).unwrap(), b);

    let c = signing_key.sign_unhashed(message, &random).unwrap();
    let d = signing_key.sign_unhashed(message, &random).unwrap();
    assert_ne!(c, d);

    for signature in [&a, &b, &c, &d] {
        assert!(signature.is_normalized());
        assert!(signing_key.public_key().is_valid_signature_unhashed(
            signature,
            message,
            &ValidationOptions::default(),
        ));
    }
}

#[test]
fn hashed_input_must_be_32_bytes() {
    let signing_key = SigningKey::generate();
    assert_eq!(
        signing_key.sign(&[0u8; 31], &SigningOptions::default()),
        Err(Error::IncorrectByteCount { got: 31, expected: 32 })
    );

    let signature = signing_key
        .sign(&[1u8; 32], &SigningOptions::default())
        .unwrap();
    assert_eq!(
        signing_key.public_key().is_valid_signature(
            &signature,
            &[1u8; 33],
            &ValidationOptions::default()
        ),
        Err(Error::IncorrectByteCount { got: 33, expected: 32 })
    );
    assert_eq!(
        signing_key.public_key().is_valid_signature(
            &signature,
            &[1u8; 32],
            &ValidationOptions::default()
        ),
        Ok(true)
    );
}

#[test]
fn wrong_key_does_not_verify() {
    let signature = SigningKey::generate()
        .sign_unhashed(b"message", &SigningOptions::default())
        .unwrap();
    let other: VerifyingKey = SigningKey::generate().public_key().clone();
    assert!(!other.is_valid_signature_unhashed(
        &signature,
        b"message",
        &ValidationOptions::default()
    ));
}

#[test]
fn scalar_equal_to_order_is_rejected() {
    let mut compact = [1u8; 64];
    compact[..32].copy_from_slice(&ORDER);
    assert_eq!(
        Signature::from_compact(&compact),
        Err(Error::Engine(Operation::SignatureParseCompact))
    );
}

proptest! {
    #[test]
    fn signatures_survive_serialization(message in any::<Vec<u8>>()) {
        let signing_key = SigningKey::from_raw(&hex!(
            "c9afa9d845ba75166b5c215767b1d6934e50c3db36e89b127b8a622b120f6721"
        ))
        .unwrap();
        let signature = signing_key
            .sign_unhashed(&message, &SigningOptions::default())
            .unwrap();

        let from_der = Signature::from_der(&signature.to_der().unwrap()).unwrap();
        let from_compact = Signature::from_compact(&signature.to_compact()).unwrap();
        prop_assert_eq!(&from_der, &signature);
        prop_assert_eq!(&from_compact, &signature);
        prop_assert!(signing_key.public_key().is_valid_signature_unhashed(
            &from_der,
            &message,
            &ValidationOptions::default(),
        ));
    }
}
