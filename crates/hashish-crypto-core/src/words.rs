//! Word-array encodings.
//!
//! Every primitive in this crate consumes and produces arrays of `u64`.
//! Two textual encodings map to and from them:
//!
//! - **raw**: four UTF-16 code units packed per word, most significant
//!   first. A partial final word keeps its units in the low bits. Decoding
//!   drops every zero unit of the final word, so text ending in NUL does
//!   not round-trip.
//! - **hex**: `"0x"` followed by one block of 16 lowercase hex digits per
//!   word, blocks separated by a single space.

use crate::error::CryptoError;
use crate::memory::{try_zeroed_words, SecretWords};
use std::fmt::Write as _;
use zeroize::Zeroizing;

/// UTF-16 code units per word.
const UNITS_PER_WORD: usize = 4;

/// Characters per hex block, separator included.
const HEX_BLOCK: usize = 17;

// ---------------------------------------------------------------------------
// Raw encoding
// ---------------------------------------------------------------------------

/// Number of words [`raw_encode`] produces for `text`.
#[must_use]
pub fn raw_word_length(text: &str) -> usize {
    text.encode_utf16().count().div_ceil(UNITS_PER_WORD)
}

/// Pack `text` into words, four UTF-16 units per word.
///
/// # Errors
///
/// Returns `CryptoError::Allocation` if the buffer cannot be allocated.
pub fn raw_encode(text: &str) -> Result<SecretWords, CryptoError> {
    let mut words = SecretWords::zeroed(raw_word_length(text))?;
    let mut units = text.encode_utf16();
    for word in words.expose_mut() {
        for unit in units.by_ref().take(UNITS_PER_WORD) {
            *word = word.wrapping_shl(16) | u64::from(unit);
        }
    }
    Ok(words)
}

/// Unpack words produced by [`raw_encode`] back into text.
///
/// Invalid UTF-16 (for instance, the output of decrypting with the wrong
/// key) is replaced with U+FFFD rather than rejected.
#[must_use]
pub fn raw_decode(words: &[u64]) -> Zeroizing<String> {
    let Some((last, body)) = words.split_last() else {
        return Zeroizing::new(String::new());
    };
    let units = body
        .iter()
        .flat_map(|&word| word_units(word))
        .chain(word_units(*last).into_iter().filter(|&unit| unit != 0));

    // One UTF-16 unit never takes more than three UTF-8 bytes.
    let capacity = words.len().saturating_mul(UNITS_PER_WORD).saturating_mul(3);
    let mut text = Zeroizing::new(String::with_capacity(capacity));
    for ch in char::decode_utf16(units) {
        text.push(ch.unwrap_or(char::REPLACEMENT_CHARACTER));
    }
    text
}

fn word_units(word: u64) -> [u16; UNITS_PER_WORD] {
    let b = word.to_be_bytes();
    [
        u16::from_be_bytes([b[0], b[1]]),
        u16::from_be_bytes([b[2], b[3]]),
        u16::from_be_bytes([b[4], b[5]]),
        u16::from_be_bytes([b[6], b[7]]),
    ]
}

// ---------------------------------------------------------------------------
// Hex encoding
// ---------------------------------------------------------------------------

/// Number of words a hex string encodes, or 0 if its length is not of the
/// form `17k + 1`.
#[must_use]
pub fn hex_word_length(text: &str) -> usize {
    match text.len().checked_sub(1) {
        Some(n) if n % HEX_BLOCK == 0 => n / HEX_BLOCK,
        _ => 0,
    }
}

/// Render words as `"0x" + 16 hex digits per word`, space separated.
///
/// An empty slice renders as `"0x"`, which [`hex_decode`] rejects.
#[must_use]
pub fn hex_encode(words: &[u64]) -> String {
    let mut out = String::with_capacity(words.len().saturating_mul(HEX_BLOCK).saturating_add(1));
    out.push_str("0x");
    for (i, word) in words.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        // Writing into a String cannot fail.
        let _ = write!(out, "{word:016x}");
    }
    out
}

/// Parse a hex string produced by [`hex_encode`].
///
/// # Errors
///
/// Returns `CryptoError::MalformedInput` if the length is not `17k + 1`
/// with `k > 0`, the `0x` prefix is missing, a digit is not hexadecimal,
/// or a separator is not a space. Returns `CryptoError::Allocation` if the
/// output cannot be allocated.
pub fn hex_decode(text: &str) -> Result<Vec<u64>, CryptoError> {
    let len = hex_word_length(text);
    if len == 0 {
        return Err(CryptoError::MalformedInput(format!(
            "hex data of {} characters is not a whole number of words",
            text.len()
        )));
    }
    let Some(body) = text.strip_prefix("0x") else {
        return Err(CryptoError::MalformedInput(
            "hex data does not start with 0x".into(),
        ));
    };

    let mut words = try_zeroed_words(len, "decoded hex words")?;
    for (word, block) in words.iter_mut().zip(body.as_bytes().chunks(HEX_BLOCK)) {
        let (digits, separator) = block.split_at(block.len().min(16));
        if separator.iter().any(|&b| b != b' ') {
            return Err(CryptoError::MalformedInput(
                "hex words must be separated by single spaces".into(),
            ));
        }
        *word = digits.iter().try_fold(0u64, |acc, &b| {
            char::from(b)
                .to_digit(16)
                .map(|digit| acc.wrapping_shl(4) | u64::from(digit))
                .ok_or_else(|| {
                    CryptoError::MalformedInput(format!("invalid hex digit {:?}", char::from(b)))
                })
        })?;
    }
    Ok(words)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_encode_packs_four_units_per_word() {
        let words = raw_encode("abcd").expect("encode should succeed");
        assert_eq!(words.expose(), &[0x0061_0062_0063_0064]);
    }

    #[test]
    fn raw_encode_partial_word_is_low_aligned() {
        let words = raw_encode("abcde").expect("encode should succeed");
        assert_eq!(words.expose(), &[0x0061_0062_0063_0064, 0x0000_0000_0000_0065]);
        assert_eq!(raw_word_length("abcde"), 2);
    }

    #[test]
    fn raw_encode_empty() {
        let words = raw_encode("").expect("encode should succeed");
        assert!(words.is_empty());
        assert_eq!(raw_word_length(""), 0);
    }

    #[test]
    fn raw_roundtrip_ascii_and_non_bmp() {
        for text in ["", "a", "hunter2", "exactly8", "Grüße, 世界 🦀!"] {
            let words = raw_encode(text).expect("encode should succeed");
            assert_eq!(raw_decode(words.expose()).as_str(), text);
        }
    }

    #[test]
    fn raw_decode_drops_trailing_nul() {
        let words = raw_encode("ab\0").expect("encode should succeed");
        assert_eq!(raw_decode(words.expose()).as_str(), "ab");
    }

    #[test]
    fn raw_decode_keeps_interior_nul() {
        let words = raw_encode("a\0bcdef").expect("encode should succeed");
        assert_eq!(raw_decode(words.expose()).as_str(), "a\0bcdef");
    }

    #[test]
    fn raw_decode_lone_surrogate_is_replaced() {
        let decoded = raw_decode(&[0xd800]);
        assert_eq!(decoded.as_str(), "\u{fffd}");
    }

    #[test]
    fn hex_encode_formats_blocks() {
        assert_eq!(hex_encode(&[]), "0x");
        assert_eq!(hex_encode(&[1]), "0x0000000000000001");
        assert_eq!(
            hex_encode(&[0xdead_beef, u64::MAX]),
            "0x00000000deadbeef ffffffffffffffff"
        );
    }

    #[test]
    fn hex_word_length_checks_shape() {
        assert_eq!(hex_word_length(""), 0);
        assert_eq!(hex_word_length("0x"), 0);
        assert_eq!(hex_word_length("0x0000000000000001"), 1);
        assert_eq!(hex_word_length("0x0000000000000001 0000000000000002"), 2);
        assert_eq!(hex_word_length("0x000000000000001"), 0);
    }

    #[test]
    fn hex_decode_parses_both_cases() {
        let words = hex_decode("0x00000000DEADbeef ffffffffffffffff").expect("decode should succeed");
        assert_eq!(words, vec![0xdead_beef, u64::MAX]);
    }

    #[test]
    fn hex_decode_rejects_bad_length() {
        assert!(matches!(hex_decode("0x123"), Err(CryptoError::MalformedInput(_))));
        assert!(matches!(hex_decode(""), Err(CryptoError::MalformedInput(_))));
    }

    #[test]
    fn hex_decode_rejects_missing_prefix() {
        assert!(matches!(
            hex_decode("1x0000000000000001"),
            Err(CryptoError::MalformedInput(_))
        ));
    }

    #[test]
    fn hex_decode_rejects_bad_digit_and_separator() {
        assert!(matches!(
            hex_decode("0x000000000000000g"),
            Err(CryptoError::MalformedInput(_))
        ));
        assert!(matches!(
            hex_decode("0x+000000000000001"),
            Err(CryptoError::MalformedInput(_))
        ));
        assert!(matches!(
            hex_decode("0x0000000000000001-0000000000000002"),
            Err(CryptoError::MalformedInput(_))
        ));
    }
}
