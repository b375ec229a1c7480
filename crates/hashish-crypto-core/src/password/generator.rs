use std::num::NonZeroU64;

use zeroize::Zeroizing;

use super::{CachedData, Constraints, PasswordGenerator};
use crate::error::CryptoError;
use crate::hash::CryptoHash;
use crate::hmac::Mac;

/// Number of consecutive counters tried before giving up.
pub const MAX_SEARCH_ATTEMPTS: u64 = 1 << 20;

/// Searches beyond this many attempts are worth a debug event.
const SLOW_SEARCH_ATTEMPTS: u64 = 64;

/// The base-N password generator.
///
/// Each candidate is `HMAC(hashed_key, [counter])` with every MAC word
/// written out in base N over the alphabet `a-z`, `0-9`, then `A-Z` when
/// case sensitive, then the extra symbols. A candidate is kept if it has
/// enough digits and caps; it is then shortened by deleting unprotected
/// characters from the left.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DefaultPasswordGenerator;

impl DefaultPasswordGenerator {
    /// Name used in descriptors and test-vector files.
    pub const NAME: &'static str = "Default generator";
}

impl PasswordGenerator for DefaultPasswordGenerator {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn generate(
        &self,
        hashed_key: &[u64],
        mac: &dyn Mac,
        hash: &dyn CryptoHash,
        constraints: &Constraints,
        cached: &mut CachedData,
    ) -> Result<Zeroizing<String>, CryptoError> {
        if let Err(e) = constraints.validate() {
            tracing::warn!(error = %e, "refusing to search unmatchable constraints");
            return Err(e);
        }

        let alphabet = alphabet(constraints);
        let radix = NonZeroU64::new(u64::try_from(alphabet.len()).unwrap_or(u64::MAX))
            .ok_or_else(|| CryptoError::UnmatchableConstraints("empty alphabet".into()))?;

        let candidate_length = hash
            .hash_length()
            .saturating_mul(digits_per_word(radix));
        let required =
            u64::from(constraints.number_of_caps).saturating_add(u64::from(constraints.number_of_digits));
        if u64::try_from(candidate_length).unwrap_or(u64::MAX) < required {
            let e = CryptoError::UnmatchableConstraints(format!(
                "{required} caps and digits required but candidates have {candidate_length} characters"
            ));
            tracing::warn!(error = %e, "refusing to search unmatchable constraints");
            return Err(e);
        }

        let start = cached.constraint_counter;
        let mut counter = start;
        for attempt in 0..MAX_SEARCH_ATTEMPTS {
            let tag = mac.mac(hashed_key, &[counter], hash)?;
            let mut chars = candidate(tag.expose(), &alphabet, radix);
            drop(tag);
            if match_constraints(&mut chars, constraints) {
                if attempt >= SLOW_SEARCH_ATTEMPTS {
                    tracing::debug!(start, counter, attempt, "slow constraint search");
                }
                cached.constraint_counter = counter;
                return Ok(collect_password(&chars));
            }
            counter = counter
                .checked_add(1)
                .ok_or(CryptoError::ConstraintSearchExhausted {
                    attempts: attempt.saturating_add(1),
                })?;
        }
        Err(CryptoError::ConstraintSearchExhausted {
            attempts: MAX_SEARCH_ATTEMPTS,
        })
    }
}

/// The generator's alphabet for `constraints`.
#[must_use]
pub(crate) fn alphabet(constraints: &Constraints) -> Vec<char> {
    let mut alphabet: Vec<char> = ('a'..='z').chain('0'..='9').collect();
    if constraints.case_sensitivity {
        alphabet.extend('A'..='Z');
    }
    alphabet.extend(constraints.extra_symbols.chars());
    alphabet
}

/// How many base-`radix` digits one word expands to.
fn digits_per_word(radix: NonZeroU64) -> usize {
    let mut mask = u64::MAX;
    let mut digits = 0usize;
    while mask != 0 {
        mask = mask / radix;
        digits = digits.saturating_add(1);
    }
    digits
}

/// Expand MAC words into alphabet characters, least significant digit first.
fn candidate(tag: &[u64], alphabet: &[char], radix: NonZeroU64) -> Zeroizing<Vec<char>> {
    let mut chars = Zeroizing::new(Vec::with_capacity(
        tag.len().saturating_mul(digits_per_word(radix)),
    ));
    for &word in tag {
        let mut value = word;
        let mut mask = u64::MAX;
        while mask != 0 {
            let digit = usize::try_from(value % radix).unwrap_or(0);
            chars.push(alphabet.get(digit).copied().unwrap_or('a'));
            value = value / radix;
            mask = mask / radix;
        }
    }
    chars
}

/// Copy the kept characters into a string allocated once at its final size.
fn collect_password(chars: &[char]) -> Zeroizing<String> {
    let size = chars.iter().copied().map(char::len_utf8).sum();
    let mut password = Zeroizing::new(String::with_capacity(size));
    password.extend(chars);
    password
}

/// Enforce the digit, caps and length constraints on a candidate.
///
/// The first `number_of_digits` digits and first `number_of_caps` caps
/// are protected; excess length is removed from the remaining characters,
/// leftmost first. Returns `false` if the candidate cannot be made to fit.
fn match_constraints(chars: &mut Vec<char>, constraints: &Constraints) -> bool {
    let mut protected = vec![false; chars.len()];

    if constraints.number_of_digits > 0 || constraints.number_of_caps > 0 {
        let (mut digits, mut caps) = (0u32, 0u32);
        for (ch, is_protected) in chars.iter().zip(protected.iter_mut()) {
            if digits < constraints.number_of_digits && ch.is_ascii_digit() {
                digits = digits.saturating_add(1);
                *is_protected = true;
            }
            if caps < constraints.number_of_caps && ch.is_ascii_uppercase() {
                caps = caps.saturating_add(1);
                *is_protected = true;
            }
            if digits == constraints.number_of_digits && caps == constraints.number_of_caps {
                break;
            }
        }
        if digits < constraints.number_of_digits || caps < constraints.number_of_caps {
            return false;
        }
    }

    let maximal_length = usize::try_from(constraints.maximal_length).unwrap_or(usize::MAX);
    if maximal_length > 0 && chars.len() > maximal_length {
        let mut excess = chars.len().saturating_sub(maximal_length);
        let mut flags = protected.iter();
        chars.retain(|_| {
            let keep = flags.next().copied().unwrap_or(true);
            if excess > 0 && !keep {
                excess = excess.saturating_sub(1);
                false
            } else {
                true
            }
        });
        if excess > 0 {
            return false;
        }
    }
    true
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
