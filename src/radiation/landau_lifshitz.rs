//! Radiation reaction as a continuous friction force

use crate::exec::{self, LaneTally};
use crate::particles::ParticlesMut;
use crate::quantum::lorentz_factor;
use crate::random::{StreamProvider, Streams};
use crate::tables::{CrossSection, RadiationTables};
use super::*;

/// The Landau-Lifshitz force, which is the classical limit of
/// radiation reaction. Overestimates the energy loss when χ is not small.
#[derive(Copy, Clone, Debug, Default)]
pub struct LandauLifshitz;

/// The Landau-Lifshitz force, with the radiated power reduced by the
/// quantum correction g(χ).
#[derive(Copy, Clone, Debug, Default)]
pub struct CorrectedLandauLifshitz;

impl LandauLifshitz {
    pub fn new() -> Self {
        LandauLifshitz
    }

    /// Evolves the particles in `batch` over a single time step,
    /// returning the energy they radiated.
    pub fn run<T: CrossSection, P: StreamProvider>(&self, batch: Batch<'_>, tables: &T, streams: &P) -> f64 {
        friction(batch, tables, streams, |tables, chi, dt| tables.classical_radiated_energy(chi, dt))
    }
}

impl CorrectedLandauLifshitz {
    pub fn new() -> Self {
        CorrectedLandauLifshitz
    }

    /// Evolves the particles in `batch` over a single time step,
    /// returning the energy they radiated.
    pub fn run<T: CrossSection, P: StreamProvider>(&self, batch: Batch<'_>, tables: &T, streams: &P) -> f64 {
        friction(batch, tables, streams, |tables, chi, dt| tables.corrected_radiated_energy(chi, dt))
    }
}

impl RadiationReaction for LandauLifshitz {
    fn apply(&self, batch: Batch<'_>, tables: &RadiationTables, streams: &Streams, radiated_energy: &mut f64) {
        *radiated_energy += self.run(batch, tables, streams);
    }
}

impl RadiationReaction for CorrectedLandauLifshitz {
    fn apply(&self, batch: Batch<'_>, tables: &RadiationTables, streams: &Streams, radiated_energy: &mut f64) {
        *radiated_energy += self.run(batch, tables, streams);
    }
}

/// Reduces the momentum of every particle with γ > 1 and χ at or above
/// the continuous threshold by the energy `loss(tables, χ, dt)`.
/// Photons are never created.
fn friction<T, P, F>(batch: Batch<'_>, tables: &T, streams: &P, loss: F) -> f64
where
    T: CrossSection,
    P: StreamProvider,
    F: Fn(&T, f64, f64) -> f64 + Sync,
{
    let Batch { particles, range, fields, dt, backend, .. } = batch;
    let inv_schwinger = tables.inv_schwinger_field();
    let chi_cont = tables.minimum_chi_continuous();

    let ParticlesMut { first, charge_over_mass_sqd, momentum, weight, charge, tau, chi, .. } = particles.slice_mut(range);

    let tally = exec::par_for_range(backend, first, momentum, tau, streams, |start, momentum, _tau, _stream| {
        let mut tally = LaneTally::default();
        for (k, p) in momentum.iter_mut().enumerate() {
            let i = start + k;
            let j = i - first;
            let (e, b) = fields.sample(i);
            let gamma = lorentz_factor(*p);
            let chi = particle_chi(charge_over_mass_sqd * (charge[j] as f64), *p, gamma, e, b, inv_schwinger);

            if gamma > 1.0 && chi >= chi_cont {
                let energy = loss(tables, chi, dt);
                *p -= (energy * gamma / (gamma * gamma - 1.0)) * *p;
                tally.radiated_energy += weight[j] * (gamma - lorentz_factor(*p));
            }
        }
        tally
    });

    update_chi(first, charge_over_mass_sqd, charge, momentum, chi, fields, inv_schwinger);

    tally.radiated_energy
}

#[cfg(test)]
mod tests {
    use rand::prelude::*;
    use rand_xoshiro::Xoshiro256StarStar;
    use super::*;
    use crate::geometry::ThreeVector;
    use crate::particles::Particles;
    use crate::random::tests::FixedStreams;
    use crate::tables::tests::flat_tables;
    use crate::radiation::tests::{electron_in_b_field, electrons_with_offset_fields, assert_only_particle_5_radiated};

    fn batch<'a>(particles: &'a mut Particles, fields: &'a FieldSamples, dt: f64) -> Batch<'a> {
        let range = 0..particles.len();
        Batch { particles, range, fields, photons: None, dt, backend: Backend::Threads { lanes: 2 } }
    }

    #[test]
    fn energy_loss_matches_power() {
        let tables = flat_tables(1.0);
        let streams = FixedStreams(vec![0.5]);
        let dt = 0.1;
        let gamma = 2000.0;
        let chi = 0.05;

        let (mut classical, fields) = electron_in_b_field(&tables, gamma, chi);
        let mut corrected = classical.clone();
        let p0 = classical.momentum()[0];
        let gamma = lorentz_factor(p0);
        let (e, b) = fields.sample(0);
        let chi = particle_chi(-1.0, p0, gamma, e, b, tables.inv_schwinger_field());

        let ll = LandauLifshitz::new().run(batch(&mut classical, &fields, dt), &tables, &streams);
        let cll = CorrectedLandauLifshitz::new().run(batch(&mut corrected, &fields, dt), &tables, &streams);

        let target = tables.classical_radiated_energy(chi, dt);
        let error = ((ll - target) / target).abs();
        println!("LL: energy = {:e}, target = {:e}, error = {:e}", ll, target, error);
        assert!(error < 1.0e-6);

        let target = tables.corrected_radiated_energy(chi, dt);
        let error = ((cll - target) / target).abs();
        println!("cLL: energy = {:e}, target = {:e}, error = {:e}", cll, target, error);
        assert!(error < 1.0e-6);

        assert!(cll < ll);
        assert!(classical.chi()[0] < chi);
    }

    #[test]
    fn threshold_is_inclusive() {
        let base = flat_tables(1.0);
        let streams = FixedStreams(vec![0.5]);
        let (electrons, fields) = electron_in_b_field(&base, 1000.0, 1.0e-3);
        let p0 = electrons.momentum()[0];
        let (e, b) = fields.sample(0);
        let chi = particle_chi(-1.0, p0, lorentz_factor(p0), e, b, base.inv_schwinger_field());

        for &(threshold, radiates) in &[(chi, true), (chi * (1.0 + 1.0e-9), false)] {
            let tables = base.clone().with_thresholds(threshold, 1.0e-2);
            let mut pt = electrons.clone();
            let energy = LandauLifshitz::new().run(batch(&mut pt, &fields, 1.0), &tables, &streams);
            assert_eq!(energy > 0.0, radiates);
            assert_eq!(pt.momentum()[0] != p0, radiates);
        }
    }

    #[test]
    fn fields_follow_particle_index() {
        let tables = flat_tables(1.0);
        let mut rng = Xoshiro256StarStar::seed_from_u64(0);

        for &backend in &[Backend::Threads { lanes: 2 }, Backend::Accelerator] {
            let (mut electrons, fields) = electrons_with_offset_fields(&tables, 1000.0, 0.05);
            let p0 = electrons.momentum()[0];
            let range = fields.offset()..(fields.offset() + fields.len());
            let streams = backend.split_streams(&mut rng);
            let batch = Batch { particles: &mut electrons, range, fields: &fields, photons: None, dt: 1.0, backend };
            let energy = CorrectedLandauLifshitz::new().run(batch, &tables, &streams);

            let target = tables.corrected_radiated_energy(0.05, 1.0);
            let error = ((energy - target) / target).abs();
            println!("{:?}: energy = {:e}, target = {:e}, error = {:e}", backend, energy, target, error);
            assert!(error < 1.0e-6);
            assert_only_particle_5_radiated(&electrons, p0);
        }
    }

    #[test]
    fn particle_at_rest_is_untouched() {
        let tables = flat_tables(1.0);
        let streams = FixedStreams(vec![0.5]);
        let mut electrons = Particles::new(2, 1.0);
        electrons.push(ThreeVector::zero(), ThreeVector::zero(), 1.0, -1);
        let fields = FieldSamples::uniform(ThreeVector::new(1.0e3, 0.0, 0.0), ThreeVector::zero(), 1);
        let energy = CorrectedLandauLifshitz::new().run(batch(&mut electrons, &fields, 1.0), &tables, &streams);
        assert_eq!(energy, 0.0);
        assert_eq!(electrons.momentum()[0], ThreeVector::zero());
    }
}
