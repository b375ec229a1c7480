//! Known-answer self-tests for every registered algorithm.
//!
//! Each algorithm ships one embedded vector file. A file starts with
//! [`TEST_FILE_HEADER`] and then lists `identifier : value` lines:
//! - `hash :` / `hmac :` select the algorithms a vector is computed with,
//!   and stay selected until replaced
//! - `key :` and `message :` are hex word arrays, consumed by the next
//!   `result :`
//! - `constraints : {` and `cached_data : {` blocks configure the next
//!   generator vector, then fall back to defaults
//! - `result :` computes the vector and compares it with the expected text
//!
//! A mismatch is reported in the returned [`VectorReport`]; only an
//! unusable file is an error.

use crate::error::{AlgorithmKind, CryptoError};
use crate::password::{CachedData, Constraints};
use crate::registry::{
    AlgorithmRegistry, CipherAlgorithm, GeneratorAlgorithm, HashAlgorithm, MacAlgorithm,
};
use crate::text::isolate_content;
use crate::words::{hex_decode, hex_encode};

/// First line of every vector file.
pub const TEST_FILE_HEADER: &str = "*** Hashish test file v1 ***";

const ID_HASH: &str = "hash : ";
const ID_HMAC: &str = "hmac : ";
const ID_KEY: &str = "key : ";
const ID_MESSAGE: &str = "message : ";
const ID_RESULT: &str = "result : ";
const ID_CONSTRAINTS: &str = "constraints : ";
const ID_CACHED_DATA: &str = "cached_data : ";

const SHA512_VECTORS: &str = include_str!("../testvecs/sha512.testvecs");
const RFC2104_HMAC_VECTORS: &str = include_str!("../testvecs/rfc2104_hmac.testvecs");
const OFB_XOR_CIPHER_VECTORS: &str = include_str!("../testvecs/ofb_xor_cipher.testvecs");
const DEFAULT_GENERATOR_VECTORS: &str = include_str!("../testvecs/default_generator.testvecs");

// ---------------------------------------------------------------------------
// Subjects and reports
// ---------------------------------------------------------------------------

/// The algorithm a vector file tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Subject {
    /// A hash; vectors are `message` then `result`.
    Hash(HashAlgorithm),
    /// A MAC; vectors are `key`, `message`, `result` under the selected hash.
    Mac(MacAlgorithm),
    /// A cipher; vectors are `key`, `message`, `result` under the selected hash.
    Cipher(CipherAlgorithm),
    /// A generator; vectors are `key` and optional blocks, then `result`.
    Generator(GeneratorAlgorithm),
}

impl Subject {
    /// Role of the algorithm under test.
    #[must_use]
    pub const fn kind(self) -> AlgorithmKind {
        match self {
            Self::Hash(_) => AlgorithmKind::Hash,
            Self::Mac(_) => AlgorithmKind::Mac,
            Self::Cipher(_) => AlgorithmKind::Cipher,
            Self::Generator(_) => AlgorithmKind::Generator,
        }
    }

    /// Name of the algorithm under test.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Hash(a) => a.name(),
            Self::Mac(a) => a.name(),
            Self::Cipher(a) => a.name(),
            Self::Generator(a) => a.name(),
        }
    }

    /// The vector file embedded for this algorithm.
    #[must_use]
    pub const fn embedded_vectors(self) -> &'static str {
        match self {
            Self::Hash(HashAlgorithm::Sha512) => SHA512_VECTORS,
            Self::Mac(MacAlgorithm::Rfc2104) => RFC2104_HMAC_VECTORS,
            Self::Cipher(CipherAlgorithm::OfbChainedXor) => OFB_XOR_CIPHER_VECTORS,
            Self::Generator(GeneratorAlgorithm::Default) => DEFAULT_GENERATOR_VECTORS,
        }
    }
}

/// One vector whose result disagreed with the file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VectorFailure {
    /// 1-based line of the `result :` entry.
    pub line: usize,
    /// What was computed.
    pub got: String,
    /// What the file expects.
    pub expected: String,
}

/// Outcome of one vector file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VectorReport {
    /// Algorithm under test.
    pub subject: Subject,
    /// Number of vectors that matched.
    pub passed: usize,
    /// Vectors that did not.
    pub failures: Vec<VectorFailure>,
}

impl VectorReport {
    /// `true` if every vector matched.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }

    /// Turn the first failure into an error.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::SelfTestMismatch` if any vector failed.
    pub fn check(&self) -> Result<(), CryptoError> {
        match self.failures.first() {
            None => Ok(()),
            Some(failure) => Err(mismatch(self.subject, failure)),
        }
    }
}

/// Outcome of every embedded vector file.
#[derive(Debug)]
pub struct SelfTestReport {
    /// One entry per registered algorithm, in registry order.
    pub results: Vec<(Subject, Result<VectorReport, CryptoError>)>,
}

impl SelfTestReport {
    /// `true` if every file ran and every vector matched.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.results
            .iter()
            .all(|(_, outcome)| outcome.as_ref().is_ok_and(VectorReport::passed))
    }

    /// Names of the algorithms that did not pass.
    #[must_use]
    pub fn failed_algorithms(&self) -> Vec<&'static str> {
        self.results
            .iter()
            .filter(|(_, outcome)| !outcome.as_ref().is_ok_and(VectorReport::passed))
            .map(|(subject, _)| subject.name())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

/// Run every embedded vector file for every registered algorithm.
///
/// Never fails: a file that cannot be run is recorded as an error entry.
#[must_use]
pub fn run_all(registry: &AlgorithmRegistry) -> SelfTestReport {
    let subjects = registry
        .hashes()
        .iter()
        .map(|&a| Subject::Hash(a))
        .chain(registry.macs().iter().map(|&a| Subject::Mac(a)))
        .chain(registry.ciphers().iter().map(|&a| Subject::Cipher(a)))
        .chain(registry.generators().iter().map(|&a| Subject::Generator(a)));

    let results: Vec<_> = subjects
        .map(|subject| {
            let outcome = run_vectors(subject, subject.embedded_vectors(), registry);
            if let Err(e) = &outcome {
                tracing::warn!(algorithm = subject.name(), error = %e, "self-test could not run");
            }
            (subject, outcome)
        })
        .collect();

    let report = SelfTestReport { results };
    if report.passed() {
        tracing::info!(algorithms = report.results.len(), "self-tests passed");
    } else {
        tracing::warn!(
            failed = ?report.failed_algorithms(),
            "self-tests failed: this machine computes known vectors wrongly"
        );
    }
    report
}

/// Run one vector file against `subject`.
///
/// # Errors
///
/// Returns `CryptoError::SelfTestFile` for a bad header, a `result` without
/// the inputs it needs, or a key of the wrong length;
/// `CryptoError::MalformedInput` for bad hex or block lines;
/// `CryptoError::UnsupportedAlgorithm` for an unknown `hash`/`hmac` name;
/// and propagates failures of the algorithm itself.
pub fn run_vectors(
    subject: Subject,
    text: &str,
    registry: &AlgorithmRegistry,
) -> Result<VectorReport, CryptoError> {
    let mut raw_lines = text.lines();
    if raw_lines.next().map(str::trim_end) != Some(TEST_FILE_HEADER) {
        return Err(CryptoError::SelfTestFile(format!(
            "{} vectors: missing header",
            subject.name()
        )));
    }

    let mut report = VectorReport {
        subject,
        passed: 0,
        failures: Vec::new(),
    };
    let mut state = VectorState::default();
    let mut lines = raw_lines
        .enumerate()
        .map(|(index, line)| (index.saturating_add(2), isolate_content(line)))
        .filter(|(_, line)| !line.is_empty());

    while let Some((number, line)) = lines.next() {
        if let Some(value) = line.strip_prefix(ID_HASH) {
            state.hash = Some(registry.hash(value)?);
        } else if let Some(value) = line.strip_prefix(ID_HMAC) {
            state.mac = Some(registry.mac(value)?);
        } else if let Some(value) = line.strip_prefix(ID_KEY) {
            state.key = Some(hex_decode(value.trim_end())?);
        } else if let Some(value) = line.strip_prefix(ID_MESSAGE) {
            state.message = Some(hex_decode(value.trim_end())?);
        } else if line.starts_with(ID_CONSTRAINTS) {
            for (_, inner) in lines.by_ref().take_while(|(_, l)| !l.starts_with('}')) {
                state.constraints.read_line(inner)?;
            }
        } else if line.starts_with(ID_CACHED_DATA) {
            for (_, inner) in lines.by_ref().take_while(|(_, l)| !l.starts_with('}')) {
                state.cached.read_line(inner)?;
            }
        } else if let Some(expected) = line.strip_prefix(ID_RESULT) {
            let expected = expected.trim_end_matches('\r');
            let got = state.compute(subject, number)?;
            if got == expected {
                report.passed = report.passed.saturating_add(1);
            } else {
                let failure = VectorFailure {
                    line: number,
                    got,
                    expected: expected.to_owned(),
                };
                tracing::warn!(line = number, "{}", mismatch(subject, &failure));
                report.failures.push(failure);
            }
            state.finish_vector();
        }
    }
    Ok(report)
}

fn mismatch(subject: Subject, failure: &VectorFailure) -> CryptoError {
    CryptoError::SelfTestMismatch {
        algorithm: subject.name().to_owned(),
        got: failure.got.clone(),
        expected: failure.expected.clone(),
    }
}

/// Inputs accumulated for the next `result :` line.
#[derive(Default)]
struct VectorState {
    hash: Option<HashAlgorithm>,
    mac: Option<MacAlgorithm>,
    key: Option<Vec<u64>>,
    message: Option<Vec<u64>>,
    constraints: Constraints,
    cached: CachedData,
}

impl VectorState {
    fn compute(&mut self, subject: Subject, line: usize) -> Result<String, CryptoError> {
        let missing = |what: &str| {
            CryptoError::SelfTestFile(format!(
                "{} vectors, line {line}: result without {what}",
                subject.name()
            ))
        };

        match subject {
            Subject::Hash(hash) => {
                let message = self.message.as_deref().ok_or_else(|| missing("message"))?;
                let digest = hash.engine().hash(message)?;
                Ok(hex_encode(digest.expose()))
            }
            Subject::Mac(mac) => {
                let hash = self.hash.ok_or_else(|| missing("hash"))?;
                let key = self.key.as_deref().ok_or_else(|| missing("key"))?;
                let message = self.message.as_deref().ok_or_else(|| missing("message"))?;
                let tag = mac.engine().mac(key, message, hash.engine())?;
                Ok(hex_encode(tag.expose()))
            }
            Subject::Cipher(cipher) => {
                let hash = self.hash.ok_or_else(|| missing("hash"))?;
                let key = digest_key(self.key.as_deref(), hash, subject, line)?;
                let message = self.message.as_deref().ok_or_else(|| missing("message"))?;
                let ciphertext = cipher.engine().encrypt(key, message, hash.engine())?;
                Ok(hex_encode(ciphertext.expose()))
            }
            Subject::Generator(generator) => {
                let hash = self.hash.ok_or_else(|| missing("hash"))?;
                let mac = self.mac.ok_or_else(|| missing("hmac"))?;
                let key = digest_key(self.key.as_deref(), hash, subject, line)?;
                let password = generator.engine().generate(
                    key,
                    mac.engine(),
                    hash.engine(),
                    &self.constraints,
                    &mut self.cached,
                )?;
                Ok(password.as_str().to_owned())
            }
        }
    }

    fn finish_vector(&mut self) {
        self.key = None;
        self.message = None;
        self.constraints = Constraints::default();
        self.cached = CachedData::default();
    }
}

/// The key, checked to be exactly one digest of `hash`.
fn digest_key(
    key: Option<&[u64]>,
    hash: HashAlgorithm,
    subject: Subject,
    line: usize,
) -> Result<&[u64], CryptoError> {
    let key = key.ok_or_else(|| {
        CryptoError::SelfTestFile(format!(
            "{} vectors, line {line}: result without key",
            subject.name()
        ))
    })?;
    if key.len() != hash.engine().hash_length() {
        return Err(CryptoError::SelfTestFile(format!(
            "{} vectors, line {line}: key is {} words, not a {} hashed key",
            subject.name(),
            key.len(),
            hash.name()
        )));
    }
    Ok(key)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
