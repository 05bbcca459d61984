// Copyright (c) 2024 Sequencer Core Contributors. Licensed under GPL-3.0-or-later.

//! A random-number source for jitter, randomize-velocity, and
//! randomize-pitch. Not cryptographic; just needs to not repeat in an
//! obvious way from one session to the next.

use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug)]
pub struct Rng(oorandom::Rand64);
impl Default for Rng {
    fn default() -> Self {
        // This is an awful source of entropy, but it's fine for this use case
        // where we just want a different fake struct each time.
        Self(oorandom::Rand64::new(
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap()
                .as_nanos(),
        ))
    }
}
impl Rng {
    pub fn rand_u64(&mut self) -> u64 {
        self.0.rand_u64()
    }

    pub fn rand_i64(&mut self) -> i64 {
        self.0.rand_i64()
    }

    pub fn rand_float(&mut self) -> f64 {
        self.0.rand_float()
    }

    pub fn rand_range(&mut self, range: std::ops::Range<u64>) -> u64 {
        self.0.rand_range(range)
    }

    /// A signed value uniformly distributed in `[-bound, bound]`.
    pub fn rand_symmetric(&mut self, bound: i64) -> i64 {
        if bound <= 0 {
            0
        } else {
            self.rand_range(0..(2 * bound as u64 + 1)) as i64 - bound
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mainline() {
        let mut r = Rng::default();

        assert_ne!(r.rand_u64(), r.rand_u64());
    }

    #[test]
    fn symmetric_stays_in_bounds() {
        let mut r = Rng::default();
        for _ in 0..1000 {
            let v = r.rand_symmetric(7);
            assert!((-7..=7).contains(&v));
        }
    }
}
