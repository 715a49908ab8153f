//! Parallel execution over a range of particles

use rayon::prelude::*;
use rand_xoshiro::Xoshiro256StarStar;

use crate::geometry::ThreeVector;
use crate::particles::Particles;
use crate::random::{StreamProvider, Streams, HostStreams, IndexedStreams};

/// How a batch of particles is divided into lanes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Backend {
    /// Contiguous chunks of particles, one per lane
    Threads { lanes: usize },
    /// One lane per particle, with streams derived from the particle index
    Accelerator,
}

impl Backend {
    /// Uses as many lanes as there are threads in the rayon pool.
    pub fn threads() -> Self {
        Backend::Threads { lanes: rayon::current_num_threads() }
    }

    /// Splits the random streams for a single call off `master`.
    pub fn split_streams(&self, master: &mut Xoshiro256StarStar) -> Streams {
        match self {
            Backend::Threads {..} => Streams::Host(HostStreams::split(master)),
            Backend::Accelerator => Streams::Indexed(IndexedStreams::split(master)),
        }
    }

    /// Number of particles per lane, given `n` particles in total.
    pub fn chunk_size(&self, n: usize) -> usize {
        match *self {
            Backend::Threads { lanes } => {
                let lanes = lanes.max(1);
                ((n + lanes - 1) / lanes).max(1)
            },
            Backend::Accelerator => 1,
        }
    }
}

/// A photon that will be added to the photon species once the parallel
/// section completes. It has zero charge and needs an optical depth.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PhotonCandidate {
    pub position: ThreeVector,
    pub momentum: ThreeVector,
    pub weight: f64,
    pub chi: f64,
}

/// What a single lane hands back.
#[derive(Clone, Debug, Default)]
pub struct LaneTally {
    /// Radiated energy, in units of m c^2 times weight
    pub radiated_energy: f64,
    pub photons: Vec<PhotonCandidate>,
}

impl LaneTally {
    fn merge(mut self, other: LaneTally) -> Self {
        self.radiated_energy += other.radiated_energy;
        self.photons.extend(other.photons);
        self
    }
}

/// Runs `kernel` over the particles whose momenta and optical depths are
/// `momentum` and `tau`, the first of which has index `first` in its
/// container.
///
/// The range is split into lanes according to `backend`. Each lane gets
/// its own random stream from `streams` and the index of its first
/// particle. Tallies are combined in lane order.
pub fn par_for_range<P, F>(backend: Backend, first: usize, momentum: &mut [ThreeVector], tau: &mut [f64], streams: &P, kernel: F) -> LaneTally
where
    P: StreamProvider,
    F: Fn(usize, &mut [ThreeVector], &mut [f64], &mut P::Stream) -> LaneTally + Sync,
{
    assert_eq!(momentum.len(), tau.len());

    if momentum.is_empty() {
        return LaneTally::default();
    }

    let chunk = backend.chunk_size(momentum.len());

    let tallies: Vec<LaneTally> = momentum.par_chunks_mut(chunk)
        .zip(tau.par_chunks_mut(chunk))
        .enumerate()
        .map(|(lane, (p, t))| {
            let start = first + lane * chunk;
            let mut stream = streams.stream(lane, start);
            kernel(start, p, t, &mut stream)
        })
        .collect();

    tallies.into_iter().fold(LaneTally::default(), LaneTally::merge)
}

/// Adds the buffered photons to the end of `photons`.
pub fn append_photons(photons: &mut Particles, candidates: Vec<PhotonCandidate>) {
    let dimensions = photons.dimensions();
    let range = photons.create_particles(candidates.len());
    for (i, ph) in range.zip(candidates.into_iter()) {
        photons.position_mut()[i] = ph.position.truncate(dimensions);
        photons.momentum_mut()[i] = ph.momentum;
        photons.weight_mut()[i] = ph.weight;
        photons.charge_mut()[i] = 0;
        photons.chi_mut()[i] = ph.chi;
    }
}
