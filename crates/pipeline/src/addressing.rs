//! Content addresser.
//!
//! Turns text into a [`ContentIdentifier`]: a CIDv1 over the SHA-256 digest of
//! the UTF-8 bytes, rendered with the multibase base32 (`b`) prefix.
//!
//! Binary layout before rendering:
//!
//! ```text
//! varint(version = 1) | varint(codec = 0x12) | 0x12 | 0x20 | digest[32]
//! ```
//!
//! The codec slot carries the sha2-256 multicodec value. Identifiers written by
//! earlier releases of the editor plugin use the same layout, so documents that
//! already exist in a vault keep resolving to the same names.

use data_encoding::BASE32_NOPAD;
use sha2::{Digest, Sha256};

use crate::ContentIdentifier;

/// CID format version.
pub const CID_VERSION: u64 = 1;

/// Multicodec code for sha2-256.
pub const SHA2_256_CODE: u64 = 0x12;

/// Codec recorded in the CID.
pub const CONTENT_CODEC: u64 = SHA2_256_CODE;

/// Multibase prefix for lowercase RFC 4648 base32 without padding.
pub const MULTIBASE_BASE32_PREFIX: char = 'b';

/// Derives the content identifier for `content`.
///
/// Pure function of the content bytes: no timestamp, no randomness.
pub fn identify(content: &str) -> ContentIdentifier {
    let digest = Sha256::digest(content.as_bytes());

    let mut bytes = Vec::with_capacity(4 + digest.len());
    write_uvarint(&mut bytes, CID_VERSION);
    write_uvarint(&mut bytes, CONTENT_CODEC);
    // Multihash: function code, digest length, digest.
    write_uvarint(&mut bytes, SHA2_256_CODE);
    write_uvarint(&mut bytes, digest.len() as u64);
    bytes.extend_from_slice(&digest);

    ContentIdentifier::from_canonical(format!(
        "{MULTIBASE_BASE32_PREFIX}{}",
        encode_base32(&bytes)
    ))
}

/// Appends `value` as an unsigned LEB128 varint (multiformats `unsigned-varint`).
fn write_uvarint(out: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

/// Lowercase RFC 4648 base32 without padding.
fn encode_base32(input: &[u8]) -> String {
    BASE32_NOPAD.encode(input).to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_identifier_for_hello_world() {
        assert_eq!(
            identify("hello world").as_str(),
            "baejbeifzjut3te2nhyekklss27nh3k72ysco7y32koao5eei66wof36n5e"
        );
    }

    #[test]
    fn known_identifier_for_empty_content() {
        assert_eq!(
            identify("").as_str(),
            "baejbeihdwdcefgh4dqkjv67uzcmw7ojee6xedzdetojuzjevtenxquvyku"
        );
    }

    #[test]
    fn identify_is_deterministic() {
        let text = "Cats are mammals.";
        assert_eq!(identify(text), identify(text));
        assert_eq!(
            identify(text).as_str(),
            "baejbeigr3wunnfadvpwut6frl3jm5wazmaphis3cxeqbkhjacgep4mpdem"
        );
    }

    #[test]
    fn identify_is_sensitive_to_single_byte_changes() {
        assert_ne!(identify("Cats are mammals."), identify("Cats are mammals!"));
        assert_ne!(identify("a"), identify("a "));
        assert_ne!(identify("é"), identify("e\u{301}"));
    }

    #[test]
    fn identifier_has_fixed_length_and_prefix() {
        let long = "long ".repeat(10_000);
        for text in ["", "x", long.as_str()] {
            let id = identify(text);
            assert!(id.as_str().starts_with('b'));
            assert_eq!(id.as_str().len(), 59);
            assert!(id.as_str()[1..]
                .bytes()
                .all(|b| b.is_ascii_lowercase() || (b'2'..=b'7').contains(&b)));
        }
    }

    #[test]
    fn uvarint_encodes_multi_byte_values() {
        let mut out = Vec::new();
        write_uvarint(&mut out, 300);
        assert_eq!(out, vec![0xac, 0x02]);
    }

    #[test]
    fn base32_matches_rfc4648_vectors() {
        let cases = [
            ("f", "my"),
            ("fo", "mzxq"),
            ("foo", "mzxw6"),
            ("foob", "mzxw6yq"),
            ("fooba", "mzxw6ytb"),
            ("foobar", "mzxw6ytboi"),
        ];
        for (input, expected) in cases {
            assert_eq!(encode_base32(input.as_bytes()), expected, "input {input:?}");
        }
    }
}
