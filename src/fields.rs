//! Electromagnetic fields at the particle positions

use crate::geometry::ThreeVector;

/// Electric and magnetic fields, already interpolated to the positions of
/// a range of particles, in units of m c ω_r / e.
///
/// The buffer may cover only part of a species: the sample for particle
/// `i` is stored at `i - offset`.
#[derive(Clone, Debug, Default)]
pub struct FieldSamples {
    e: Vec<ThreeVector>,
    b: Vec<ThreeVector>,
    offset: usize,
}

impl FieldSamples {
    /// Constructs the buffer from the fields at the positions of particles
    /// `offset`, `offset + 1`, ...
    pub fn new(e: Vec<ThreeVector>, b: Vec<ThreeVector>, offset: usize) -> Self {
        assert_eq!(e.len(), b.len(), "electric and magnetic field buffers must have the same length");
        FieldSamples { e, b, offset }
    }

    /// The same fields `e` and `b` at the positions of `n` particles.
    pub fn uniform(e: ThreeVector, b: ThreeVector, n: usize) -> Self {
        FieldSamples {
            e: vec![e; n],
            b: vec![b; n],
            offset: 0,
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.e.len()
    }

    pub fn is_empty(&self) -> bool {
        self.e.is_empty()
    }

    /// Returns (E, B) at the position of particle `i`.
    #[inline]
    pub fn sample(&self, i: usize) -> (ThreeVector, ThreeVector) {
        let j = i - self.offset;
        (self.e[j], self.b[j])
    }
}
