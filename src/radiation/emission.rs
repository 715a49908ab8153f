//! Emission of a single photon

use crate::exec::PhotonCandidate;
use crate::geometry::ThreeVector;
use crate::quantum::lorentz_factor;
use crate::tables::CrossSection;
use super::Emitter;

/// How an emitted photon is represented.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PhotonEmission {
    /// Number of macrophotons per emission event
    pub sampling: usize,
    /// Minimum energy, in units of m c^2, of a photon that is created
    pub gamma_threshold: f64,
}

impl PhotonEmission {
    /// Emits a photon from a particle with quantum parameter `chi`,
    /// Lorentz factor `gamma` and momentum `p`, using the uniformly
    /// distributed `rand` to sample the photon energy.
    ///
    /// The recoil reduces the magnitude of `p` but not its direction.
    /// If `photons` is given and the photon is energetic enough,
    /// `sampling` macrophotons, which share the weight of the emitting
    /// particle, are added to it and zero is returned. Their weights sum
    /// to that of the particle up to rounding. Otherwise the energy lost
    /// by the particle is returned.
    pub fn emit<T: CrossSection>(&self, tables: &T, emitter: &Emitter, chi: f64, gamma: f64, rand: f64, p: &mut ThreeVector, photons: Option<&mut Vec<PhotonCandidate>>) -> f64 {
        let photon_chi = tables.sample_photon_chi(chi, rand);
        let photon_gamma = photon_chi * (gamma - 1.0) / chi;

        let recoil = photon_gamma / (gamma * gamma - 1.0).sqrt();
        *p -= recoil * *p;

        match photons {
            Some(photons) if photon_gamma >= self.gamma_threshold => {
                let norm = p.norm();
                let direction = if norm > 0.0 { *p / norm } else { ThreeVector::zero() };
                let weight = emitter.weight / (self.sampling as f64);
                let photon = PhotonCandidate {
                    position: emitter.position,
                    momentum: photon_gamma * direction,
                    weight,
                    chi: photon_chi,
                };
                photons.extend(std::iter::repeat(photon).take(self.sampling));
                0.0
            },
            _ => emitter.weight * (gamma - lorentz_factor(*p)),
        }
    }
}
