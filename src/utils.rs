//! Hash mixing for the unique table and the compute tables.
//!
//! Both tables index their buckets with the low bits of the hash, so the
//! mixing step has to spread the (small, dense) node indices over the whole
//! word.

use crate::reference::Ref;

const GOLDEN: u64 = 0x9e37_79b9_7f4a_7c15;

/// Final avalanche step (from `splitmix64`).
#[inline]
pub fn mix(mut x: u64) -> u64 {
    x ^= x >> 30;
    x = x.wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^ (x >> 31)
}

/// Hash of two words.
#[inline]
pub fn hash2(a: u64, b: u64) -> u64 {
    mix(a.wrapping_mul(GOLDEN).wrapping_add(b))
}

/// Hash of three words.
#[inline]
pub fn hash3(a: u64, b: u64, c: u64) -> u64 {
    mix(hash2(a, b).wrapping_mul(GOLDEN).wrapping_add(c))
}

pub trait MyHash {
    fn hash(&self) -> u64;
}

impl MyHash for Ref {
    fn hash(&self) -> u64 {
        mix(self.raw() as u64)
    }
}

impl<const N: usize> MyHash for [Ref; N] {
    fn hash(&self) -> u64 {
        let acc = self
            .iter()
            .fold(N as u64, |acc, r| acc.wrapping_mul(GOLDEN).wrapping_add(r.raw() as u64));
        mix(acc)
    }
}
