//! Deterministic, integer-only RNG for admission draws.
//!
//! The admission policy shuffles group order and picks among available
//! resources; both draws come from this seeded stream and nowhere else.
//! Unbiased ranges via rejection sampling; no floating point.

use rand_chacha::ChaCha20Rng;
use rand_core::{RngCore, SeedableRng};

/// Seedable RNG for admission draws.
///
/// Internally ChaCha20 with an explicit 32-byte seed derived from a 64-bit
/// seed (little-endian bytes in the first 8 positions, the rest zero), so
/// the mapping is stable across platforms.
#[derive(Debug, Clone)]
pub struct DrawRng {
    rng: ChaCha20Rng,
    draws: u64,
}

impl DrawRng {
    pub fn from_seed_u64(seed: u64) -> Self {
        let mut seed32 = [0u8; 32];
        seed32[..8].copy_from_slice(&seed.to_le_bytes());
        DrawRng {
            rng: ChaCha20Rng::from_seed(seed32),
            draws: 0,
        }
    }

    /// Total 64-bit words drawn so far (diagnostics only).
    pub fn draws(&self) -> u64 {
        self.draws
    }

    fn next_u64(&mut self) -> u64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u64()
    }

    /// Unbiased integer in `[0, n)` via rejection sampling.
    /// Returns `None` if `n == 0`.
    ///
    /// Accept `x` when `x >= 2^64 mod n` (computed as `n.wrapping_neg() % n`);
    /// then `x % n` is uniform.
    pub fn gen_range(&mut self, n: u64) -> Option<u64> {
        if n == 0 {
            return None;
        }
        let threshold = n.wrapping_neg() % n;
        loop {
            let x = self.next_u64();
            if x >= threshold {
                return Some(x % n);
            }
        }
    }

    /// Deterministic in-place Fisher–Yates shuffle.
    pub fn shuffle_in_place<T>(&mut self, slice: &mut [T]) {
        let len = slice.len();
        if len <= 1 {
            return;
        }
        let mut i = len - 1;
        while i >= 1 {
            let j = self
                .gen_range((i as u64) + 1)
                .expect("gen_range(>0) must return Some") as usize;
            slice.swap(i, j);
            i -= 1;
        }
    }

    /// Choose a single index in `[0, n)`; `None` if `n == 0`.
    pub fn choose_index(&mut self, n: usize) -> Option<usize> {
        self.gen_range(n as u64).map(|v| v as usize)
    }

    /// Choose one element from a slice, returning its index.
    pub fn choose_one_index<T>(&mut self, slice: &[T]) -> Option<usize> {
        self.choose_index(slice.len())
    }
}
