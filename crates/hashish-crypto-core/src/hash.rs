//! Cryptographic hashes over word arrays.
//!
//! [`CryptoHash`] is the capability every hash offers to the rest of the
//! engine; [`Sha512`] is the only implementation. SHA-512 is implemented
//! here directly on 64-bit words rather than bytes: a word array is
//! hashed exactly like its big-endian byte serialization.

use crate::error::CryptoError;
use crate::memory::{try_zeroed_words, SecretWords};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A hash function on word arrays.
pub trait CryptoHash {
    /// Name used in descriptors and test-vector files.
    fn name(&self) -> &'static str;

    /// Input block length, in words.
    fn block_length(&self) -> usize;

    /// Digest length, in words.
    fn hash_length(&self) -> usize;

    /// Hash `message` into a fresh digest of `hash_length()` words.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Allocation` if a scratch buffer cannot be
    /// allocated. Scratch state is zeroed on every path.
    fn hash(&self, message: &[u64]) -> Result<SecretWords, CryptoError>;

    /// Replace `words` with its own digest.
    ///
    /// # Errors
    ///
    /// Same as [`CryptoHash::hash`]; `words` is left untouched on failure.
    fn rehash(&self, words: &mut SecretWords) -> Result<(), CryptoError> {
        let digest = self.hash(words.expose())?;
        *words = digest;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SHA-512 constants (FIPS 180-4, section 4.2.3 and 5.3.5)
// ---------------------------------------------------------------------------

const K: [u64; 80] = [
    0x428a_2f98_d728_ae22, 0x7137_4491_23ef_65cd, 0xb5c0_fbcf_ec4d_3b2f, 0xe9b5_dba5_8189_dbbc,
    0x3956_c25b_f348_b538, 0x59f1_11f1_b605_d019, 0x923f_82a4_af19_4f9b, 0xab1c_5ed5_da6d_8118,
    0xd807_aa98_a303_0242, 0x1283_5b01_4570_6fbe, 0x2431_85be_4ee4_b28c, 0x550c_7dc3_d5ff_b4e2,
    0x72be_5d74_f27b_896f, 0x80de_b1fe_3b16_96b1, 0x9bdc_06a7_25c7_1235, 0xc19b_f174_cf69_2694,
    0xe49b_69c1_9ef1_4ad2, 0xefbe_4786_384f_25e3, 0x0fc1_9dc6_8b8c_d5b5, 0x240c_a1cc_77ac_9c65,
    0x2de9_2c6f_592b_0275, 0x4a74_84aa_6ea6_e483, 0x5cb0_a9dc_bd41_fbd4, 0x76f9_88da_8311_53b5,
    0x983e_5152_ee66_dfab, 0xa831_c66d_2db4_3210, 0xb003_27c8_98fb_213f, 0xbf59_7fc7_beef_0ee4,
    0xc6e0_0bf3_3da8_8fc2, 0xd5a7_9147_930a_a725, 0x06ca_6351_e003_826f, 0x1429_2967_0a0e_6e70,
    0x27b7_0a85_46d2_2ffc, 0x2e1b_2138_5c26_c926, 0x4d2c_6dfc_5ac4_2aed, 0x5338_0d13_9d95_b3df,
    0x650a_7354_8baf_63de, 0x766a_0abb_3c77_b2a8, 0x81c2_c92e_47ed_aee6, 0x9272_2c85_1482_353b,
    0xa2bf_e8a1_4cf1_0364, 0xa81a_664b_bc42_3001, 0xc24b_8b70_d0f8_9791, 0xc76c_51a3_0654_be30,
    0xd192_e819_d6ef_5218, 0xd699_0624_5565_a910, 0xf40e_3585_5771_202a, 0x106a_a070_32bb_d1b8,
    0x19a4_c116_b8d2_d0c8, 0x1e37_6c08_5141_ab53, 0x2748_774c_df8e_eb99, 0x34b0_bcb5_e19b_48a8,
    0x391c_0cb3_c5c9_5a63, 0x4ed8_aa4a_e341_8acb, 0x5b9c_ca4f_7763_e373, 0x682e_6ff3_d6b2_b8a3,
    0x748f_82ee_5def_b2fc, 0x78a5_636f_4317_2f60, 0x84c8_7814_a1f0_ab72, 0x8cc7_0208_1a64_39ec,
    0x90be_fffa_2363_1e28, 0xa450_6ceb_de82_bde9, 0xbef9_a3f7_b2c6_7915, 0xc671_78f2_e372_532b,
    0xca27_3ece_ea26_619c, 0xd186_b8c7_21c0_c207, 0xeada_7dd6_cde0_eb1e, 0xf57d_4f7f_ee6e_d178,
    0x06f0_67aa_7217_6fba, 0x0a63_7dc5_a2c8_98a6, 0x113f_9804_bef9_0dae, 0x1b71_0b35_131c_471b,
    0x28db_77f5_2304_7d84, 0x32ca_ab7b_40c7_2493, 0x3c9e_be0a_15c9_bebc, 0x431d_67c4_9c10_0d4c,
    0x4cc5_d4be_cb3e_42b6, 0x597f_299c_fc65_7e2a, 0x5fcb_6fab_3ad6_faec, 0x6c44_198c_4a47_5817,
];

const H0: [u64; 8] = [
    0x6a09_e667_f3bc_c908,
    0xbb67_ae85_84ca_a73b,
    0x3c6e_f372_fe94_f82b,
    0xa54f_f53a_5f1d_36f1,
    0x510e_527f_ade6_82d1,
    0x9b05_688c_2b3e_6c1f,
    0x1f83_d9ab_fb41_bd6b,
    0x5be0_cd19_137e_2179,
];

const BLOCK_WORDS: usize = 16;
const DIGEST_WORDS: usize = 8;
const SCHEDULE_WORDS: usize = 80;

// ---------------------------------------------------------------------------
// SHA-512
// ---------------------------------------------------------------------------

/// SHA-512 on word arrays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Sha512;

impl Sha512 {
    /// Name used in descriptors and test-vector files.
    pub const NAME: &'static str = "SHA-512";
}

impl CryptoHash for Sha512 {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn block_length(&self) -> usize {
        BLOCK_WORDS
    }

    fn hash_length(&self) -> usize {
        DIGEST_WORDS
    }

    fn hash(&self, message: &[u64]) -> Result<SecretWords, CryptoError> {
        let padded = pad_message(message)?;
        let mut state = Sha512State::new();
        for block in padded.expose().chunks_exact(BLOCK_WORDS) {
            state.compress(block);
        }
        SecretWords::new(&state.h)
    }
}

/// Padded copy of `message`: the message, the word `1 << 63`, zero words,
/// then a 128-bit big-endian bit length whose high word is always zero.
///
/// The bit length is `len * 64` truncated to 64 bits, so messages of
/// 2^58 words or more hash incorrectly. Such messages cannot be allocated.
fn pad_message(message: &[u64]) -> Result<SecretWords, CryptoError> {
    let len = message.len();
    #[allow(clippy::arithmetic_side_effects)]
    // Remainders are below BLOCK_WORDS, so neither subtraction underflows.
    let zeros = (BLOCK_WORDS - (len % BLOCK_WORDS + 3) % BLOCK_WORDS) % BLOCK_WORDS;
    let total = len
        .checked_add(3)
        .and_then(|n| n.checked_add(zeros))
        .ok_or(CryptoError::Allocation("padded message"))?;

    let mut padded = SecretWords::from_vec(try_zeroed_words(total, "padded message")?);
    let words = padded.expose_mut();
    words[..len].copy_from_slice(message);
    words[len] = 1 << 63;
    if let Some(last) = words.last_mut() {
        *last = u64::try_from(len).unwrap_or(u64::MAX).wrapping_mul(64);
    }
    Ok(padded)
}

/// Working state of one SHA-512 computation.
///
/// Holds the running digest, the message schedule, the eight working
/// variables and both round temporaries. Everything is zeroed on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Sha512State {
    h: [u64; DIGEST_WORDS],
    w: [u64; SCHEDULE_WORDS],
    wv_a: u64,
    wv_b: u64,
    wv_c: u64,
    wv_d: u64,
    wv_e: u64,
    wv_f: u64,
    wv_g: u64,
    wv_h: u64,
    t1: u64,
    t2: u64,
}

impl Sha512State {
    /// Fresh state holding the initial hash value.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            h: H0,
            w: [0; SCHEDULE_WORDS],
            wv_a: 0,
            wv_b: 0,
            wv_c: 0,
            wv_d: 0,
            wv_e: 0,
            wv_f: 0,
            wv_g: 0,
            wv_h: 0,
            t1: 0,
            t2: 0,
        }
    }

    /// Running digest.
    #[must_use]
    pub const fn digest(&self) -> &[u64; DIGEST_WORDS] {
        &self.h
    }

    /// Absorb one 16-word block.
    ///
    /// # Panics
    ///
    /// Panics if `block` is not exactly 16 words.
    pub fn compress(&mut self, block: &[u64]) {
        self.w[..BLOCK_WORDS].copy_from_slice(block);
        for t in BLOCK_WORDS..SCHEDULE_WORDS {
            // t >= 16, so every index below stays in 0..80.
            #[allow(clippy::arithmetic_side_effects)]
            let (w2, w7, w15, w16) = (self.w[t - 2], self.w[t - 7], self.w[t - 15], self.w[t - 16]);
            self.w[t] = small_sigma1(w2)
                .wrapping_add(w7)
                .wrapping_add(small_sigma0(w15))
                .wrapping_add(w16);
        }

        self.wv_a = self.h[0];
        self.wv_b = self.h[1];
        self.wv_c = self.h[2];
        self.wv_d = self.h[3];
        self.wv_e = self.h[4];
        self.wv_f = self.h[5];
        self.wv_g = self.h[6];
        self.wv_h = self.h[7];

        for (k, w) in K.iter().zip(self.w.iter()) {
            self.t1 = self
                .wv_h
                .wrapping_add(big_sigma1(self.wv_e))
                .wrapping_add(ch(self.wv_e, self.wv_f, self.wv_g))
                .wrapping_add(*k)
                .wrapping_add(*w);
            self.t2 = big_sigma0(self.wv_a).wrapping_add(maj(self.wv_a, self.wv_b, self.wv_c));
            self.wv_h = self.wv_g;
            self.wv_g = self.wv_f;
            self.wv_f = self.wv_e;
            self.wv_e = self.wv_d.wrapping_add(self.t1);
            self.wv_d = self.wv_c;
            self.wv_c = self.wv_b;
            self.wv_b = self.wv_a;
            self.wv_a = self.t1.wrapping_add(self.t2);
        }

        self.h[0] = self.h[0].wrapping_add(self.wv_a);
        self.h[1] = self.h[1].wrapping_add(self.wv_b);
        self.h[2] = self.h[2].wrapping_add(self.wv_c);
        self.h[3] = self.h[3].wrapping_add(self.wv_d);
        self.h[4] = self.h[4].wrapping_add(self.wv_e);
        self.h[5] = self.h[5].wrapping_add(self.wv_f);
        self.h[6] = self.h[6].wrapping_add(self.wv_g);
        self.h[7] = self.h[7].wrapping_add(self.wv_h);
    }
}

impl Default for Sha512State {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Sha512State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Sha512State(***)")
    }
}

const fn ch(x: u64, y: u64, z: u64) -> u64 {
    (x & y) ^ (!x & z)
}

const fn maj(x: u64, y: u64, z: u64) -> u64 {
    (x & y) ^ (x & z) ^ (y & z)
}

const fn big_sigma0(x: u64) -> u64 {
    x.rotate_right(28) ^ x.rotate_right(34) ^ x.rotate_right(39)
}

const fn big_sigma1(x: u64) -> u64 {
    x.rotate_right(14) ^ x.rotate_right(18) ^ x.rotate_right(41)
}

const fn small_sigma0(x: u64) -> u64 {
    x.rotate_right(1) ^ x.rotate_right(8) ^ x.wrapping_shr(7)
}

const fn small_sigma1(x: u64) -> u64 {
    x.rotate_right(19) ^ x.rotate_right(61) ^ x.wrapping_shr(6)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
