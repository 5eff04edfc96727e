//! Injectable randomness.
//!
//! Every stochastic transition (turns, flicker, spawning) draws from a [`RandomSource`] so tests
//! can force outcomes without touching production code paths.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng, rngs::StdRng};

/// Source of uniform samples in `[0, 1)`.
pub trait RandomSource {
    /// Next uniform sample in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// `true` with probability `p`. `p <= 0` never fires, `p >= 1` always fires.
    fn chance(&mut self, p: f64) -> bool {
        self.next_unit() < p
    }

    /// Uniform index in `0..len`. Returns 0 for an empty range.
    fn pick_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        let i = (self.next_unit() * len as f64).floor() as usize;
        i.min(len - 1)
    }
}

impl<T: RandomSource + ?Sized> RandomSource for &mut T {
    fn next_unit(&mut self) -> f64 {
        (**self).next_unit()
    }
}

impl<T: RandomSource + ?Sized> RandomSource for Box<T> {
    fn next_unit(&mut self) -> f64 {
        (**self).next_unit()
    }
}

/// Production source backed by `rand`'s `StdRng`.
#[derive(Clone, Debug)]
pub struct StdRandom {
    rng: StdRng,
}

impl StdRandom {
    /// Seed from the operating system.
    pub fn from_os() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Reproducible stream for a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for StdRandom {
    fn next_unit(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// Replays a fixed list of samples, then repeats `fallback` forever.
#[derive(Clone, Debug)]
pub struct ScriptedRandom {
    queue: VecDeque<f64>,
    fallback: f64,
    drawn: usize,
}

impl ScriptedRandom {
    pub fn new(samples: impl IntoIterator<Item = f64>, fallback: f64) -> Self {
        Self {
            queue: samples.into_iter().collect(),
            fallback,
            drawn: 0,
        }
    }

    /// Always returns `v`.
    pub fn constant(v: f64) -> Self {
        Self::new([], v)
    }

    /// Number of samples handed out so far.
    pub fn drawn(&self) -> usize {
        self.drawn
    }
}

impl RandomSource for ScriptedRandom {
    fn next_unit(&mut self) -> f64 {
        self.drawn += 1;
        let v = self.queue.pop_front().unwrap_or(self.fallback);
        // Samples stay inside [0, 1).
        v.clamp(0.0, 1.0 - f64::EPSILON)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/rng.rs"]
mod tests;
