//! Deterministic hashing primitives shared by [`crate::sketch::Sketch`] and
//! [`crate::index::Index`].
//!
//! `splitmix64` derives per-permutation seeds and folds band slices into
//! signatures; `HashFamily` derives the `k` permutation hash functions a
//! sketch needs from a single fixed seed so that two processes build
//! byte-identical sketches for the same input.

use rustc_hash::FxHasher;
use std::hash::Hasher;

/// Odd prime near 2^61, the conventional modulus for MinHash-style
/// `a*x + b mod P` permutation hashing.
const MERSENNE_PRIME_61: u64 = (1u64 << 61) - 1;

/// Fixed process-wide seed for deriving permutation constants. Not a
/// parameter of `Sketch::new` — every `k` gets the same seed so sketches
/// built in different processes agree.
const FAMILY_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

#[inline]
pub(crate) fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// A deterministic family of `k` universal hash functions over byte
/// strings, realizing the permutation-style MinHash construction of
/// spec §4.1: `h_i(v) = a_i * base(v) + b_i (mod P)`.
#[derive(Clone, Debug)]
pub(crate) struct HashFamily {
    a: Vec<u64>,
    b: Vec<u64>,
}

impl HashFamily {
    pub(crate) fn new(k: usize) -> Self {
        let mut a = Vec::with_capacity(k);
        let mut b = Vec::with_capacity(k);
        let mut s = FAMILY_SEED;
        for _ in 0..k {
            s = splitmix64(s);
            // Keep a_i in [1, P-1] so the permutation never degenerates.
            let a_i = 1 + (s % (MERSENNE_PRIME_61 - 1));
            s = splitmix64(s);
            let b_i = s % MERSENNE_PRIME_61;
            a.push(a_i);
            b.push(b_i);
        }
        Self { a, b }
    }

    #[inline]
    fn base_hash(value: &[u8]) -> u64 {
        let mut hasher = FxHasher::default();
        hasher.write(value);
        hasher.finish()
    }

    /// Yield the `k` permutation hash values of `value`, in permutation
    /// order.
    pub(crate) fn hash_values(&self, value: &[u8]) -> impl Iterator<Item = u64> + '_ {
        let base = Self::base_hash(value) as u128;
        self.a.iter().zip(self.b.iter()).map(move |(&a_i, &b_i)| {
            ((a_i as u128 * base + b_i as u128) % MERSENNE_PRIME_61 as u128) as u64
        })
    }
}

/// Fold a `rows`-long slice of sketch minima into a single 64-bit band
/// signature. Only requirement: `insert` and `query` must use the same
/// function, since the index is never persisted (spec §4.3).
#[inline]
pub(crate) fn band_signature(chunk: &[u64]) -> u64 {
    let mut acc = 0xDEAD_BEEF_DEAD_BEEFu64;
    for &v in chunk {
        acc = splitmix64(acc ^ v);
    }
    acc
}
