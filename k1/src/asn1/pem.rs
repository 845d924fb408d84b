//! PEM (RFC 7468) armor for DER documents.

use crate::error::Asn1Error;
use alloc::{string::String, vec::Vec};
use pem_rfc7468::LineEnding;
use zeroize::Zeroizing;

/// Label of a SEC1 `ECPrivateKey` document.
pub(crate) const SEC1_PRIVATE_KEY: &str = "EC PRIVATE KEY";

/// Label of a PKCS#8 `PrivateKeyInfo` document.
pub(crate) const PKCS8_PRIVATE_KEY: &str = "PRIVATE KEY";

/// Label of a `SubjectPublicKeyInfo` document.
pub(crate) const PUBLIC_KEY: &str = "PUBLIC KEY";

/// Decoded PEM document.
pub(crate) struct Document<'a> {
    pub(crate) label: &'a str,
    pub(crate) der: Zeroizing<Vec<u8>>,
}

impl<'a> Document<'a> {
    /// Parse a PEM document, keeping the label and the decoded DER body.
    pub(crate) fn parse(pem: &'a str) -> Result<Self, Asn1Error> {
        let (label, der) = pem_rfc7468::decode_vec(pem.as_bytes())?;
        Ok(Self {
            label,
            der: Zeroizing::new(der),
        })
    }

    /// Parse a PEM document which must carry `label`.
    pub(crate) fn parse_labeled(pem: &'a str, label: &str) -> Result<Self, Asn1Error> {
        let document = Self::parse(pem)?;
        if document.label != label {
            return Err(Asn1Error::InvalidPemDocument);
        }
        Ok(document)
    }
}

/// Armor `der` as a PEM document with the given label, wrapping the base64
/// body at 64 characters with LF line endings.
pub(crate) fn encode(label: &str, der: &[u8]) -> Result<Zeroizing<String>, Asn1Error> {
    Ok(Zeroizing::new(pem_rfc7468::encode_string(
        label,
        LineEnding::LF,
        der,
    )?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_wraps_lines() {
        let der = [0xabu8; 100];
        let pem = encode(PUBLIC_KEY, &der).unwrap();
        let lines: Vec<&str> = pem.lines().collect();

        assert_eq!(lines.first(), Some(&"-----BEGIN PUBLIC KEY-----"));
        assert_eq!(lines.last(), Some(&"-----END PUBLIC KEY-----"));
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[1].len(), 64);
        assert_eq!(lines[2].len(), 64);
        assert_eq!(lines[3].len(), 136 - 128);
        assert!(!pem.contains('\r'));
    }

    #[test]
    fn parse_recovers_der() {
        let der = [0x30u8, 0x03, 0x02, 0x01, 0x01];
        let pem = encode(SEC1_PRIVATE_KEY, &der).unwrap();
        let document = Document::parse(&pem).unwrap();
        assert_eq!(document.label, SEC1_PRIVATE_KEY);
        assert_eq!(document.der.as_slice(), &der);
    }

    #[test]
    fn parse_accepts_crlf() {
        let pem = "-----BEGIN PUBLIC KEY-----\r\nMAMCAQE=\r\n-----END PUBLIC KEY-----\r\n";
        let document = Document::parse(pem).unwrap();
        assert_eq!(document.der.as_slice(), &[0x30, 0x03, 0x02, 0x01, 0x01]);
    }

    #[test]
    fn parse_rejects_malformed_documents() {
        let cases = [
            "MAMCAQE=",
            "-----BEGIN PUBLIC KEY-----\nMAMCAQE=\n",
            "-----BEGIN PUBLIC KEY-----\nMAMCAQE=\n-----END PRIVATE KEY-----\n",
            "-----BEGIN PUBLIC KEY-----\nMAMC*QE=\n-----END PUBLIC KEY-----\n",
        ];

        for pem in cases {
            assert_eq!(
                Document::parse(pem).err(),
                Some(Asn1Error::InvalidPemDocument),
                "{pem:?}"
            );
        }
    }

    #[test]
    fn parse_labeled_checks_label() {
        let pem = encode(PKCS8_PRIVATE_KEY, &[0x05, 0x00]).unwrap();
        assert!(Document::parse_labeled(&pem, PKCS8_PRIVATE_KEY).is_ok());
        assert_eq!(
            Document::parse_labeled(&pem, PUBLIC_KEY).err(),
            Some(Asn1Error::InvalidPemDocument)
        );
    }
}
