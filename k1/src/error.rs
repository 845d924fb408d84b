//! Error types

use core::fmt::{self, Display};
use der::{ErrorKind, Tag};

/// Result type with the `k1` crate's [`Error`].
pub type Result<T> = core::result::Result<T, Error>;

/// Errors raised while importing, exporting, or operating on secp256k1 keys
/// and signatures.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// Key material has the wrong length for the requested format.
    InvalidKeySize {
        /// Number of bytes supplied.
        got: usize,
        /// Number of bytes the format requires.
        expected: usize,
    },

    /// The private key is all zeroes.
    InvalidKey,

    /// A fixed-width input (message digest, signature, option value) has the
    /// wrong length.
    IncorrectByteCount {
        /// Number of bytes supplied.
        got: usize,
        /// Number of bytes required.
        expected: usize,
    },

    /// Recovery id outside of `0..=3`.
    InvalidRecoveryId {
        /// The rejected value.
        got: i32,
    },

    /// The public half of an X9.63 private key does not match the public key
    /// derived from its scalar.
    PublicKeyMismatch,

    /// An argument was structurally valid but semantically unusable, e.g. an
    /// empty list of points to sum.
    InvalidParameter,

    /// DER or PEM decoding failed.
    Asn1(Asn1Error),

    /// The curve engine rejected the input or failed to compute a result.
    Engine(Operation),
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidKeySize { got, expected } => {
                write!(f, "invalid key size: got {got} bytes, expected {expected}")
            }
            Error::InvalidKey => f.write_str("invalid private key: all bytes are zero"),
            Error::IncorrectByteCount { got, expected } => {
                write!(f, "incorrect byte count: got {got}, expected {expected}")
            }
            Error::InvalidRecoveryId { got } => {
                write!(f, "invalid recovery id {got}, expected a value in 0..=3")
            }
            Error::PublicKeyMismatch => {
                f.write_str("public key does not match the public key derived from the private key")
            }
            Error::InvalidParameter => f.write_str("invalid parameter"),
            Error::Asn1(err) => write!(f, "ASN.1 error: {err}"),
            Error::Engine(op) => write!(f, "secp256k1 operation failed: {op}"),
        }
    }
}

impl From<Asn1Error> for Error {
    fn from(err: Asn1Error) -> Error {
        Error::Asn1(err)
    }
}

impl From<der::Error> for Error {
    fn from(err: der::Error) -> Error {
        Error::Asn1(err.into())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// DER and PEM decoding errors.
///
/// Errors reported by the [`der`], [`spki`] and [`pem_rfc7468`] codecs are
/// folded into these kinds.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum Asn1Error {
    /// Unknown tag class, or a tag number outside of the supported range.
    InvalidFieldIdentifier,

    /// A field carried a different tag than the one required at its position.
    UnexpectedFieldType,

    /// Malformed object identifier, or an unsupported algorithm or curve.
    InvalidObjectIdentifier,

    /// Structurally invalid object: trailing data, non-canonical encoding,
    /// or unused bits in a key bit string.
    InvalidAsn1Object,

    /// Empty, negative, or out of range INTEGER.
    InvalidIntegerEncoding,

    /// Input ended before the declared field length.
    TruncatedField,

    /// Indefinite length, or a length which does not fit the input.
    UnsupportedFieldLength,

    /// Missing or mismatched PEM boundaries, unexpected label, or invalid
    /// base64 body.
    InvalidPemDocument,
}

impl From<der::Error> for Asn1Error {
    fn from(err: der::Error) -> Asn1Error {
        match err.kind() {
            ErrorKind::TagUnexpected { .. } => Asn1Error::UnexpectedFieldType,
            ErrorKind::TagNumberInvalid | ErrorKind::TagModeUnknown | ErrorKind::TagUnknown { .. } => {
                Asn1Error::InvalidFieldIdentifier
            }
            ErrorKind::OidMalformed | ErrorKind::OidUnknown { .. } => {
                Asn1Error::InvalidObjectIdentifier
            }
            ErrorKind::Length { tag: Tag::Integer }
            | ErrorKind::Noncanonical { tag: Tag::Integer }
            | ErrorKind::Value { tag: Tag::Integer } => Asn1Error::InvalidIntegerEncoding,
            ErrorKind::Incomplete { .. } => Asn1Error::TruncatedField,
            ErrorKind::IndefiniteLength | ErrorKind::Overflow | ErrorKind::Overlength => {
                Asn1Error::UnsupportedFieldLength
            }
            _ => Asn1Error::InvalidAsn1Object,
        }
    }
}

impl From<spki::Error> for Asn1Error {
    fn from(err: spki::Error) -> Asn1Error {
        match err {
            spki::Error::Asn1(err) => err.into(),
            spki::Error::AlgorithmParametersMissing | spki::Error::OidUnknown { .. } => {
                Asn1Error::InvalidObjectIdentifier
            }
            _ => Asn1Error::InvalidAsn1Object,
        }
    }
}

impl From<pem_rfc7468::Error> for Asn1Error {
    fn from(_: pem_rfc7468::Error) -> Asn1Error {
        Asn1Error::InvalidPemDocument
    }
}

impl Display for Asn1Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Asn1Error::InvalidFieldIdentifier => "invalid field identifier",
            Asn1Error::UnexpectedFieldType => "unexpected field type",
            Asn1Error::InvalidObjectIdentifier => "invalid object identifier",
            Asn1Error::InvalidAsn1Object => "invalid ASN.1 object",
            Asn1Error::InvalidIntegerEncoding => "invalid ASN.1 integer encoding",
            Asn1Error::TruncatedField => "truncated ASN.1 field",
            Asn1Error::UnsupportedFieldLength => "unsupported ASN.1 field length",
            Asn1Error::InvalidPemDocument => "invalid PEM document",
        })
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Asn1Error {}

/// Curve engine primitive which reported a failure.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum Operation {
    /// Deriving a public key from a private scalar.
    PublicKeyCreate,
    /// Parsing an X9.63 or compressed point.
    PublicKeyParse,
    /// Comparing two points.
    PublicKeyCompare,
    /// Parsing a compact `R || S` signature.
    SignatureParseCompact,
    /// Parsing a DER signature.
    SignatureParseDer,
    /// Parsing a compact recoverable signature.
    RecoverableSignatureParseCompact,
    /// Producing an ECDSA signature.
    EcdsaSign,
    /// Recovering a public key from a signature.
    Recover,
    /// Building a Schnorr keypair from a private scalar.
    KeypairCreate,
    /// Producing a Schnorr signature.
    SchnorrSign,
    /// Parsing an x-only public key.
    XonlyPublicKey,
    /// Computing an ECDH shared secret.
    Ecdh,
    /// Adding points.
    Combine,
    /// Negating a point.
    Negate,
}

impl Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::PublicKeyCreate => "public key create",
            Operation::PublicKeyParse => "public key parse",
            Operation::PublicKeyCompare => "public key compare",
            Operation::SignatureParseCompact => "ECDSA signature parse compact",
            Operation::SignatureParseDer => "ECDSA signature parse DER",
            Operation::RecoverableSignatureParseCompact => "recoverable signature parse compact",
            Operation::EcdsaSign => "ECDSA sign",
            Operation::Recover => "ECDSA public key recovery",
            Operation::KeypairCreate => "keypair create",
            Operation::SchnorrSign => "Schnorr sign",
            Operation::XonlyPublicKey => "x-only public key parse",
            Operation::Ecdh => "ECDH",
            Operation::Combine => "public key combine",
            Operation::Negate => "public key negate",
        })
    }
}
