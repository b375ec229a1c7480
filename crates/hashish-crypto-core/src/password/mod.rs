//! Deterministic, constraint-driven password generation.
//!
//! A service password is a pure function of the service's hashed key, a
//! search counter and a set of [`Constraints`]:
//! - [`Constraints`]: character classes and length a service accepts
//! - [`CachedData`]: the first counter known to satisfy them, saved so the
//!   search is not repeated on every derivation
//! - [`PasswordGenerator`]: the capability; [`DefaultPasswordGenerator`] is
//!   the only implementation

mod generator;

pub use generator::{DefaultPasswordGenerator, MAX_SEARCH_ATTEMPTS};

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::hash::CryptoHash;
use crate::hmac::Mac;
use crate::text::{parse_bool, parse_number};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default maximal password length.
pub const DEFAULT_MAXIMAL_LENGTH: u32 = 15;

const ID_CASE_SENSITIVITY: &str = "case_sensitivity : ";
const ID_NUMBER_OF_CAPS: &str = "number_of_caps : ";
const ID_NUMBER_OF_DIGITS: &str = "number_of_digits : ";
const ID_MAXIMAL_LENGTH: &str = "maximal_length : ";
const ID_EXTRA_SYMBOLS: &str = "extra_symbols : ";
const ID_CONSTRAINT_COUNTER: &str = "constraint_counter : ";

/// Indentation of lines inside a `{ ... }` block.
const BLOCK_INDENT: &str = "    ";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// What a generated password must look like.
///
/// Zero means "unconstrained" for the three counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Constraints {
    /// Allow uppercase letters.
    pub case_sensitivity: bool,
    /// Minimum number of uppercase letters.
    pub number_of_caps: u32,
    /// Minimum number of digits.
    pub number_of_digits: u32,
    /// Maximum length (0 = unlimited).
    pub maximal_length: u32,
    /// Characters appended to the alphabet, in order.
    pub extra_symbols: String,
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            case_sensitivity: false,
            number_of_caps: 0,
            number_of_digits: 0,
            maximal_length: DEFAULT_MAXIMAL_LENGTH,
            extra_symbols: String::new(),
        }
    }
}

impl Constraints {
    /// Check that some password can satisfy these constraints.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::UnmatchableConstraints` if uppercase letters
    /// are required without case sensitivity, or if more caps and digits
    /// are required than the maximal length allows.
    pub fn validate(&self) -> Result<(), CryptoError> {
        if !self.case_sensitivity && self.number_of_caps > 0 {
            return Err(CryptoError::UnmatchableConstraints(
                "uppercase letters required without case sensitivity".into(),
            ));
        }
        let required = u64::from(self.number_of_caps).saturating_add(u64::from(self.number_of_digits));
        if self.maximal_length > 0 && u64::from(self.maximal_length) < required {
            return Err(CryptoError::UnmatchableConstraints(format!(
                "{required} caps and digits required but maximal length is {}",
                self.maximal_length
            )));
        }
        Ok(())
    }

    /// Apply one line of a `constraints : { ... }` block.
    ///
    /// Unknown identifiers are ignored.
    pub(crate) fn read_line(&mut self, line: &str) -> Result<(), CryptoError> {
        if let Some(value) = line.strip_prefix(ID_CASE_SENSITIVITY) {
            self.case_sensitivity = parse_bool("case_sensitivity", value)?;
        } else if let Some(value) = line.strip_prefix(ID_NUMBER_OF_CAPS) {
            self.number_of_caps = parse_number("number_of_caps", value)?;
        } else if let Some(value) = line.strip_prefix(ID_NUMBER_OF_DIGITS) {
            self.number_of_digits = parse_number("number_of_digits", value)?;
        } else if let Some(value) = line.strip_prefix(ID_MAXIMAL_LENGTH) {
            self.maximal_length = parse_number("maximal_length", value)?;
        } else if let Some(value) = line.strip_prefix(ID_EXTRA_SYMBOLS) {
            self.extra_symbols = value.to_owned();
        }
        Ok(())
    }

    /// Append the block body, one indented line per field.
    pub(crate) fn write_lines(&self, out: &mut String) {
        let case_sensitivity = if self.case_sensitivity { "true" } else { "false" };
        for (id, value) in [
            (ID_CASE_SENSITIVITY, case_sensitivity.to_owned()),
            (ID_NUMBER_OF_CAPS, self.number_of_caps.to_string()),
            (ID_NUMBER_OF_DIGITS, self.number_of_digits.to_string()),
            (ID_MAXIMAL_LENGTH, self.maximal_length.to_string()),
            (ID_EXTRA_SYMBOLS, self.extra_symbols.clone()),
        ] {
            push_block_line(out, id, &value);
        }
    }
}

/// Result of past constraint searches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CachedData {
    /// First counter known to produce a matching password.
    pub constraint_counter: u64,
}

impl CachedData {
    /// Apply one line of a `cached_data : { ... }` block.
    pub(crate) fn read_line(&mut self, line: &str) -> Result<(), CryptoError> {
        if let Some(value) = line.strip_prefix(ID_CONSTRAINT_COUNTER) {
            self.constraint_counter = parse_number("constraint_counter", value)?;
        }
        Ok(())
    }

    /// Append the block body.
    pub(crate) fn write_lines(&self, out: &mut String) {
        push_block_line(out, ID_CONSTRAINT_COUNTER, &self.constraint_counter.to_string());
    }
}

fn push_block_line(out: &mut String, id: &str, value: &str) {
    out.push_str(BLOCK_INDENT);
    out.push_str(id);
    out.push_str(value);
    out.push('\n');
}

// ---------------------------------------------------------------------------
// Capability
// ---------------------------------------------------------------------------

/// Turns a hashed key into a password satisfying constraints.
pub trait PasswordGenerator {
    /// Name used in descriptors and test-vector files.
    fn name(&self) -> &'static str;

    /// Derive the password for `hashed_key`.
    ///
    /// The search starts at `cached.constraint_counter`; on success the
    /// counter that produced the password is stored back into `cached`.
    /// On failure `cached` is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::UnmatchableConstraints` before any MAC is
    /// computed if the constraints contradict themselves,
    /// `CryptoError::ConstraintSearchExhausted` if no candidate matched
    /// within the search bound, and propagates MAC failures.
    fn generate(
        &self,
        hashed_key: &[u64],
        mac: &dyn Mac,
        hash: &dyn CryptoHash,
        constraints: &Constraints,
        cached: &mut CachedData,
    ) -> Result<Zeroizing<String>, CryptoError>;
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
