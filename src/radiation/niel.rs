//! Stochastic diffusion model of Niel et al.

use crate::exec::{self, LaneTally};
use crate::particles::ParticlesMut;
use crate::quantum::lorentz_factor;
use crate::random::{StreamProvider, Streams, UniformSource};
use crate::tables::{CrossSection, NielH, RadiationTables};
use super::*;

/// Radiation reaction as the quantum-corrected friction force plus a
/// diffusive term, which accounts for the stochasticity of emission
/// to lowest order. The strength of the diffusion is controlled by the
/// function h(χ).
///
/// The energy of any one particle may increase, but the mean energy loss
/// of an ensemble matches the corrected Landau-Lifshitz prediction.
#[derive(Copy, Clone, Debug)]
pub struct Niel {
    method: NielH,
}

impl Niel {
    pub fn new(method: NielH) -> Self {
        Niel { method }
    }

    /// Evolves the particles in `batch` over a single time step,
    /// returning the energy they radiated.
    pub fn run<T: CrossSection, P: StreamProvider>(&self, batch: Batch<'_>, tables: &T, streams: &P) -> f64 {
        let Batch { particles, range, fields, dt, backend, .. } = batch;
        let inv_schwinger = tables.inv_schwinger_field();
        let chi_cont = tables.minimum_chi_continuous();
        let power = tables.classical_radiated_power();
        let sqrt_dt = dt.sqrt();

        let ParticlesMut { first, charge_over_mass_sqd, momentum, weight, charge, tau, chi, .. } = particles.slice_mut(range);

        let tally = exec::par_for_range(backend, first, momentum, tau, streams, |start, momentum, _tau, stream| {
            let mut tally = LaneTally::default();
            for (k, p) in momentum.iter_mut().enumerate() {
                let i = start + k;
                let j = i - first;
                let (e, b) = fields.sample(i);
                let gamma = lorentz_factor(*p);
                let chi = particle_chi(charge_over_mass_sqd * (charge[j] as f64), *p, gamma, e, b, inv_schwinger);

                if chi > chi_cont && gamma > 1.0 {
                    let dw = sqrt_dt * stream.normal();
                    let h = tables.niel_h(chi, self.method);
                    let diffusion = (power * gamma * h).sqrt() * dw;
                    let drift = tables.corrected_radiated_energy(chi, dt);
                    *p -= ((drift - diffusion) * gamma / (gamma * gamma - 1.0)) * *p;
                }

                tally.radiated_energy += weight[j] * (gamma - lorentz_factor(*p));
            }
            tally
        });

        update_chi(first, charge_over_mass_sqd, charge, momentum, chi, fields, inv_schwinger);

        tally.radiated_energy
    }
}

impl RadiationReaction for Niel {
    fn apply(&self, batch: Batch<'_>, tables: &RadiationTables, streams: &Streams, radiated_energy: &mut f64) {
        *radiated_energy += self.run(batch, tables, streams);
    }
}
