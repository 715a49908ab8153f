//! Random number streams for parallel execution
//!
//! Every lane of a parallel section draws from its own stream, so
//! that no particle depends on the draws made for another one.

use rand::prelude::*;
use rand_distr::StandardNormal;
use rand_xoshiro::Xoshiro256StarStar;

/// A source of uniformly distributed random numbers.
pub trait UniformSource {
    /// Returns a pseudorandom number in [0, 1).
    fn uniform(&mut self) -> f64;

    /// Returns a normally distributed pseudorandom number, with zero
    /// mean and unit variance.
    fn normal(&mut self) -> f64;
}

/// Hands out one independent stream per execution lane.
pub trait StreamProvider: Sync {
    type Stream: UniformSource;

    /// The stream for lane `lane`, which starts at particle index `first`.
    fn stream(&self, lane: usize, first: usize) -> Self::Stream;
}

/// A stream backed by a xoshiro256** generator.
#[derive(Clone, Debug)]
pub struct Stream {
    rng: Xoshiro256StarStar,
}

impl Stream {
    pub fn new(rng: Xoshiro256StarStar) -> Self {
        Stream { rng }
    }
}

impl UniformSource for Stream {
    #[inline]
    fn uniform(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    #[inline]
    fn normal(&mut self) -> f64 {
        self.rng.sample(StandardNormal)
    }
}

/// Streams for thread-parallel execution on the host.
///
/// Lane `n` starts from a copy of the master generator advanced by
/// `n + 1` jumps of 2^128 draws, so lanes never overlap.
#[derive(Clone, Debug)]
pub struct HostStreams {
    base: Xoshiro256StarStar,
}

impl HostStreams {
    /// Splits a set of lanes off `master`, which is then advanced by a
    /// long jump (2^192 draws) so that the next call gets fresh lanes.
    pub fn split(master: &mut Xoshiro256StarStar) -> Self {
        let base = master.clone();
        master.long_jump();
        HostStreams { base }
    }
}

impl StreamProvider for HostStreams {
    type Stream = Stream;

    fn stream(&self, lane: usize, _first: usize) -> Stream {
        let mut rng = self.base.clone();
        for _ in 0..=lane {
            rng.jump();
        }
        Stream::new(rng)
    }
}

/// LCG multiplier used to derive per-particle seeds
const LCG_MULT: u32 = 1664525;
/// LCG increment used to derive per-particle seeds
const LCG_ADD: u32 = 1013904223;

/// Streams for the accelerator backend, where every particle is its own
/// lane and its stream is derived from the particle index.
///
/// The seed of particle `i` is one step of a 32-bit LCG applied to
/// `(i + 1) (s + 1)`, where `s` is a per-call seed. This is
/// statistically weaker than the host streams: there are only 2^32
/// distinct seeds, neighbouring particles get correlated seeds, and
/// the same index reuses the same seed whenever the per-call seed
/// repeats. Results are statistically, not bitwise, comparable to the
/// host backend.
#[derive(Copy, Clone, Debug)]
pub struct IndexedStreams {
    seed: u32,
}

impl IndexedStreams {
    pub fn new(seed: u32) -> Self {
        IndexedStreams { seed }
    }

    /// Draws the per-call seed from `master`.
    pub fn split(master: &mut Xoshiro256StarStar) -> Self {
        Self::new(master.gen::<u32>())
    }

    /// The 32-bit seed of particle `index`.
    pub fn particle_seed(&self, index: usize) -> u32 {
        let s = (index as u64 + 1).wrapping_mul(self.seed as u64 + 1) as u32;
        LCG_MULT.wrapping_mul(s).wrapping_add(LCG_ADD)
    }
}

impl StreamProvider for IndexedStreams {
    type Stream = Stream;

    fn stream(&self, _lane: usize, first: usize) -> Stream {
        let seed = self.particle_seed(first);
        Stream::new(Xoshiro256StarStar::seed_from_u64(seed as u64))
    }
}

/// The stream providers available to the radiation models.
#[derive(Clone, Debug)]
pub enum Streams {
    Host(HostStreams),
    Indexed(IndexedStreams),
}

impl StreamProvider for Streams {
    type Stream = Stream;

    fn stream(&self, lane: usize, first: usize) -> Stream {
        match self {
            Streams::Host(s) => s.stream(lane, first),
            Streams::Indexed(s) => s.stream(lane, first),
        }
    }
}
