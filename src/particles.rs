//! Particle container

use std::fmt;
use std::ops::Range;

use crate::constants::*;
use crate::geometry::ThreeVector;

/// Optical depth of a particle that needs a fresh draw before it can
/// emit again
pub const TAU_UNSET: f64 = -1.0;

/// A species of macroparticles, stored attribute by attribute.
///
/// Momenta are normalized to m c, where m is the mass of the radiating
/// species (for photons, the mass of the species that emitted them).
/// Only the first `dimensions` components of a position are meaningful.
#[derive(Clone, Debug)]
pub struct Particles {
    dimensions: usize,
    mass: f64,
    momentum_unit: f64,
    position: Vec<ThreeVector>,
    momentum: Vec<ThreeVector>,
    weight: Vec<f64>,
    charge: Vec<i16>,
    tau: Vec<f64>,
    chi: Vec<f64>,
}

/// Mutable view of a contiguous range of particles, split by attribute
/// so that the attributes can be borrowed independently.
pub struct ParticlesMut<'a> {
    /// Index of the first particle of the view in its container
    pub first: usize,
    pub dimensions: usize,
    /// Charge-to-mass-squared ratio of a unit charge, in units of e/m_e²
    pub charge_over_mass_sqd: f64,
    pub position: &'a [ThreeVector],
    pub momentum: &'a mut [ThreeVector],
    pub weight: &'a [f64],
    pub charge: &'a [i16],
    pub tau: &'a mut [f64],
    pub chi: &'a mut [f64],
}

impl Particles {
    /// Creates an empty container for a species with rest mass `mass`,
    /// in units of the electron mass, that lives in `dimensions` spatial
    /// dimensions.
    pub fn new(dimensions: usize, mass: f64) -> Self {
        Particles {
            dimensions: dimensions.max(1).min(3),
            mass,
            momentum_unit: mass * ELECTRON_MASS_MEV,
            position: Vec::new(),
            momentum: Vec::new(),
            weight: Vec::new(),
            charge: Vec::new(),
            tau: Vec::new(),
            chi: Vec::new(),
        }
    }

    /// Creates an empty container of photons, emitted by a species
    /// with rest mass `parent_mass`.
    pub fn photons(dimensions: usize, parent_mass: f64) -> Self {
        Particles {
            mass: 0.0,
            ..Self::new(dimensions, parent_mass)
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Rest mass, in units of the electron mass
    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn len(&self) -> usize {
        self.weight.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weight.is_empty()
    }

    /// Extends every attribute array by `n` entries, returning the
    /// indices of the new particles. They are created at the origin,
    /// at rest, with zero weight and charge, and need an optical depth.
    pub fn create_particles(&mut self, n: usize) -> Range<usize> {
        let start = self.len();
        let end = start + n;
        self.position.resize(end, ThreeVector::zero());
        self.momentum.resize(end, ThreeVector::zero());
        self.weight.resize(end, 0.0);
        self.charge.resize(end, 0);
        self.tau.resize(end, TAU_UNSET);
        self.chi.resize(end, 0.0);
        start..end
    }

    /// Adds a single particle, returning its index.
    pub fn push(&mut self, position: ThreeVector, momentum: ThreeVector, weight: f64, charge: i16) -> usize {
        let i = self.create_particles(1).start;
        self.position[i] = position.truncate(self.dimensions);
        self.momentum[i] = momentum;
        self.weight[i] = weight;
        self.charge[i] = charge;
        i
    }

    pub fn position(&self) -> &[ThreeVector] {
        &self.position
    }

    pub fn position_mut(&mut self) -> &mut [ThreeVector] {
        &mut self.position
    }

    pub fn momentum(&self) -> &[ThreeVector] {
        &self.momentum
    }

    pub fn momentum_mut(&mut self) -> &mut [ThreeVector] {
        &mut self.momentum
    }

    pub fn weight(&self) -> &[f64] {
        &self.weight
    }

    pub fn weight_mut(&mut self) -> &mut [f64] {
        &mut self.weight
    }

    pub fn charge(&self) -> &[i16] {
        &self.charge
    }

    pub fn charge_mut(&mut self) -> &mut [i16] {
        &mut self.charge
    }

    pub fn tau(&self) -> &[f64] {
        &self.tau
    }

    pub fn tau_mut(&mut self) -> &mut [f64] {
        &mut self.tau
    }

    pub fn chi(&self) -> &[f64] {
        &self.chi
    }

    pub fn chi_mut(&mut self) -> &mut [f64] {
        &mut self.chi
    }

    /// Borrows the particles in `range`, attribute by attribute.
    /// Panics if the range is out of bounds.
    pub fn slice_mut(&mut self, range: Range<usize>) -> ParticlesMut<'_> {
        ParticlesMut {
            first: range.start,
            dimensions: self.dimensions,
            charge_over_mass_sqd: if self.mass > 0.0 { 1.0 / (self.mass * self.mass) } else { 0.0 },
            position: &self.position[range.clone()],
            momentum: &mut self.momentum[range.clone()],
            weight: &self.weight[range.clone()],
            charge: &self.charge[range.clone()],
            tau: &mut self.tau[range.clone()],
            chi: &mut self.chi[range],
        }
    }

    /// Energy of the `i`th particle, in MeV
    pub fn energy(&self, i: usize) -> f64 {
        let p = self.momentum[i];
        if self.mass > 0.0 {
            self.momentum_unit * (1.0 + p.norm_sqr()).sqrt()
        } else {
            self.momentum_unit * p.norm()
        }
    }

    /// Total weighted energy, in MeV
    pub fn total_energy(&self) -> f64 {
        (0..self.len())
            .map(|i| self.weight[i] * self.energy(i))
            .sum()
    }

    /// Returns an object that displays the `i`th particle as a line of
    /// tab-separated values.
    pub fn entry(&self, i: usize) -> Entry<'_> {
        Entry { particles: self, index: i }
    }
}

/// A single particle, formatted as
/// "E (MeV) x y z (normalized) p_x p_y p_z (m c) weight chi"
pub struct Entry<'a> {
    particles: &'a Particles,
    index: usize,
}

impl<'a> fmt::Display for Entry<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let i = self.index;
        let pt = self.particles;
        write!(f,
            "{:.6e}\t{}\t{}\t{:.6e}\t{:.6e}",
            pt.energy(i),
            pt.position[i],
            pt.momentum[i],
            pt.weight[i],
            pt.chi[i],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_particles_need_optical_depth() {
        let mut pt = Particles::new(3, 1.0);
        pt.push(ThreeVector::new(1.0, 2.0, 3.0), ThreeVector::new(0.0, 0.0, 10.0), 2.0, -1);
        let range = pt.create_particles(4);
        assert_eq!(range, 1..5);
        assert_eq!(pt.len(), 5);
        for i in range {
            assert_eq!(pt.tau()[i], TAU_UNSET);
            assert_eq!(pt.chi()[i], 0.0);
        }
        assert_eq!(pt.weight()[0], 2.0);
    }

    #[test]
    fn positions_are_truncated() {
        let mut pt = Particles::new(2, 1.0);
        let i = pt.push(ThreeVector::new(1.0, 2.0, 3.0), ThreeVector::zero(), 1.0, -1);
        assert_eq!(pt.position()[i], ThreeVector::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn views_are_offset() {
        let mut pt = Particles::new(3, 1.0);
        for k in 0..10 {
            pt.push(ThreeVector::zero(), ThreeVector::new(k as f64, 0.0, 0.0), 1.0, -1);
        }
        let view = pt.slice_mut(4..7);
        assert_eq!(view.first, 4);
        assert_eq!(view.momentum.len(), 3);
        assert_eq!(view.momentum[0][0], 4.0);
        assert_eq!(view.charge_over_mass_sqd, 1.0);
    }

    #[test]
    fn photon_energy() {
        let mut ph = Particles::photons(3, 1.0);
        ph.push(ThreeVector::zero(), ThreeVector::new(3.0, 4.0, 0.0), 0.5, 0);
        let value = ph.energy(0);
        let target = 5.0 * ELECTRON_MASS_MEV;
        println!("energy = {:e} MeV, target = {:e} MeV", value, target);
        assert!(((value - target) / target).abs() < 1.0e-12);
        assert!(((ph.total_energy() - 0.5 * target) / target).abs() < 1.0e-12);
    }
}
