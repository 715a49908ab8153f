//! Stochastic photon emission, with continuous friction at moderate χ

use crate::exec::{self, LaneTally, PhotonCandidate};
use crate::geometry::ThreeVector;
use crate::particles::{ParticlesMut, TAU_UNSET};
use crate::quantum::lorentz_factor;
use crate::random::{StreamProvider, Streams, UniformSource};
use crate::tables::{CrossSection, RadiationTables};
use super::*;

/// Radiation reaction as a sequence of discrete photon emissions,
/// which are triggered when the optical depth of a particle is
/// exhausted.
///
/// Particles with quantum parameter above the discontinuous threshold
/// emit stochastically. Between the continuous and discontinuous
/// thresholds, radiation reaction is a quantum-corrected friction
/// force. Below the continuous threshold, particles do not radiate.
#[derive(Clone, Debug)]
pub struct MonteCarlo {
    max_emissions: usize,
    emission: PhotonEmission,
}

impl MonteCarlo {
    pub fn new(max_emissions: usize, photon_sampling: usize, photon_gamma_threshold: f64) -> Self {
        MonteCarlo {
            max_emissions,
            emission: PhotonEmission {
                sampling: photon_sampling,
                gamma_threshold: photon_gamma_threshold,
            },
        }
    }

    /// Evolves the particles in `batch` over a single time step,
    /// returning the energy they radiated that was not given to
    /// macrophotons.
    pub fn run<T: CrossSection, P: StreamProvider>(&self, batch: Batch<'_>, tables: &T, streams: &P) -> f64 {
        let Batch { particles, range, fields, photons, dt, backend } = batch;
        let create_photons = photons.is_some();

        let ParticlesMut { first, charge_over_mass_sqd, position, momentum, weight, charge, tau, chi, .. } = particles.slice_mut(range);

        let tally = exec::par_for_range(backend, first, momentum, tau, streams, |start, momentum, tau, stream| {
            let mut tally = LaneTally::default();
            for (k, (p, tau)) in momentum.iter_mut().zip(tau.iter_mut()).enumerate() {
                let i = start + k;
                let j = i - first;
                let (e, b) = fields.sample(i);
                let emitter = Emitter {
                    position: position[j],
                    weight: weight[j],
                    charge_over_mass_sqd: charge_over_mass_sqd * (charge[j] as f64),
                    e,
                    b,
                };
                let photons = if create_photons { Some(&mut tally.photons) } else { None };
                let energy = self.evolve(tables, &emitter, p, tau, dt, stream, photons);
                tally.radiated_energy += energy;
            }
            tally
        });

        update_chi(first, charge_over_mass_sqd, charge, momentum, chi, fields, tables.inv_schwinger_field());

        if let Some(photons) = photons {
            exec::append_photons(photons, tally.photons);
        }

        tally.radiated_energy
    }

    /// Advances a single particle by `dt`, returning the radiated energy.
    fn evolve<T, S>(&self, tables: &T, emitter: &Emitter, p: &mut ThreeVector, tau: &mut f64, dt: f64, stream: &mut S, mut photons: Option<&mut Vec<PhotonCandidate>>) -> f64
    where
        T: CrossSection,
        S: UniformSource,
    {
        let inv_schwinger = tables.inv_schwinger_field();
        let chi_disc = tables.minimum_chi_discontinuous();
        let chi_cont = tables.minimum_chi_continuous();

        let mut energy = 0.0;
        let mut elapsed = 0.0;
        let mut iterations = 0;

        while elapsed < dt && iterations < self.max_emissions {
            let gamma = lorentz_factor(*p);
            if gamma == 1.0 {
                break;
            }

            let chi = emitter.chi(*p, gamma, inv_schwinger);

            // fresh optical depth
            if chi > chi_disc && *tau <= EPSILON_TAU {
                while *tau <= EPSILON_TAU {
                    *tau = -(1.0 - stream.uniform()).ln();
                }
            }

            if *tau > EPSILON_TAU {
                // discontinuous: advance to the next emission or the end of the step
                let rate = tables.photon_production_yield(chi, gamma);
                let step = (*tau / rate).min(dt - elapsed);
                *tau -= rate * step;

                if *tau <= EPSILON_TAU {
                    let rand = stream.uniform();
                    energy += self.emission.emit(tables, emitter, chi, gamma, rand, p, photons.as_deref_mut());
                    *tau = TAU_UNSET;
                }

                iterations += 1;
                elapsed += step;
            } else if chi > chi_cont && gamma > 1.0 {
                // continuous: friction over the rest of the step
                let remaining = dt - elapsed;
                let loss = tables.corrected_radiated_energy(chi, remaining);
                *p -= (loss * gamma / (gamma * gamma - 1.0)) * *p;
                energy += emitter.weight * (gamma - lorentz_factor(*p));
                elapsed = dt;
            } else {
                elapsed = dt;
            }
        }

        energy
    }
}

impl RadiationReaction for MonteCarlo {
    fn apply(&self, batch: Batch<'_>, tables: &RadiationTables, streams: &Streams, radiated_energy: &mut f64) {
        *radiated_energy += self.run(batch, tables, streams);
    }
}

#[cfg(test)]
mod tests {
    use rand::prelude::*;
    use rand_xoshiro::Xoshiro256StarStar;
    use super::*;
    use crate::fields::FieldSamples;
    use crate::particles::Particles;
    use crate::quantum::particle_chi;
    use crate::random::HostStreams;
    use crate::random::tests::FixedStreams;
    use crate::tables::NielH;
    use crate::tables::tests::flat_tables;
    use crate::radiation::tests::{electron_in_b_field, electrons_with_offset_fields, assert_only_particle_5_radiated};

    /// Flat tables, but with a photon production rate that does not
    /// depend on χ or γ. A power of two makes the time to the next
    /// emission exact.
    struct ConstantRate {
        tables: RadiationTables,
        rate: f64,
    }

    impl CrossSection for ConstantRate {
        fn minimum_chi_discontinuous(&self) -> f64 { self.tables.minimum_chi_discontinuous() }
        fn minimum_chi_continuous(&self) -> f64 { self.tables.minimum_chi_continuous() }
        fn photon_production_yield(&self, _chi: f64, _gamma: f64) -> f64 { self.rate }
        fn sample_photon_chi(&self, chi: f64, rand: f64) -> f64 { self.tables.sample_photon_chi(chi, rand) }
        fn corrected_radiated_energy(&self, chi: f64, dt: f64) -> f64 { self.tables.corrected_radiated_energy(chi, dt) }
        fn classical_radiated_power(&self) -> f64 { self.tables.classical_radiated_power() }
        fn niel_h(&self, chi: f64, method: NielH) -> f64 { self.tables.niel_h(chi, method) }
        fn inv_schwinger_field(&self) -> f64 { self.tables.inv_schwinger_field() }
    }

    fn batch<'a>(particles: &'a mut Particles, fields: &'a FieldSamples, photons: Option<&'a mut Particles>, dt: f64) -> Batch<'a> {
        let range = 0..particles.len();
        Batch { particles, range, fields, photons, dt, backend: Backend::Threads { lanes: 4 } }
    }

    /// Energy lost by a particle with momentum `p` in fields `e`, `b`
    /// that emits once, with `rand` determining the photon energy.
    fn hand_computed_loss(tables: &ConstantRate, p: ThreeVector, e: ThreeVector, b: ThreeVector, rand: f64) -> (f64, f64, ThreeVector) {
        let gamma = lorentz_factor(p);
        let chi = particle_chi(-1.0, p, gamma, e, b, tables.inv_schwinger_field());
        let photon_chi = tables.sample_photon_chi(chi, rand);
        let photon_gamma = photon_chi * (gamma - 1.0) / chi;
        let p_new = p - (photon_gamma / (gamma * gamma - 1.0).sqrt()) * p;
        (gamma - lorentz_factor(p_new), photon_gamma, p_new)
    }

    #[test]
    fn single_emission_without_photon_species() {
        let tables = ConstantRate { tables: flat_tables(1.0), rate: 0.25 };
        let (mut electrons, fields) = electron_in_b_field(&tables.tables, 1000.0, 0.5);
        let p0 = electrons.momentum()[0];
        let (e, b) = fields.sample(0);

        // first draw sets tau = ln 2, exhausted halfway through the step;
        // second samples the photon; third gives a new tau that is
        // not exhausted by the end of the step
        let streams = FixedStreams(vec![0.5, 0.3, 0.999999999]);
        let dt = 2.0 * 2f64.ln() / tables.rate;

        let model = MonteCarlo::new(DEFAULT_MAX_EMISSIONS, 1, DEFAULT_PHOTON_GAMMA_THRESHOLD);
        let energy = model.run(batch(&mut electrons, &fields, None, dt), &tables, &streams);

        let (target, _, p_new) = hand_computed_loss(&tables, p0, e, b, 0.3);
        let error = ((energy - target) / target).abs();
        println!("energy = {:e}, target = {:e}, error = {:e}", energy, target, error);
        assert!(error < 1.0e-12);
        assert_eq!(electrons.momentum()[0], p_new);

        // new optical depth, partially consumed
        let tau = electrons.tau()[0];
        let target = -(1.0 - 0.999999999f64).ln() - tables.rate * 0.5 * dt;
        println!("tau = {:e}, target = {:e}", tau, target);
        assert!(((tau - target) / target).abs() < 1.0e-9);

        // chi is up to date
        let chi = particle_chi(-1.0, p_new, lorentz_factor(p_new), e, b, tables.inv_schwinger_field());
        assert_eq!(electrons.chi()[0], chi);
    }

    #[test]
    fn optical_depth_is_consumed() {
        let tables = ConstantRate { tables: flat_tables(1.0), rate: 0.25 };
        let (mut electrons, fields) = electron_in_b_field(&tables.tables, 1000.0, 0.5);
        let streams = FixedStreams(vec![0.5]);
        let dt = 1.0;

        let model = MonteCarlo::new(DEFAULT_MAX_EMISSIONS, 1, DEFAULT_PHOTON_GAMMA_THRESHOLD);
        let energy = model.run(batch(&mut electrons, &fields, None, dt), &tables, &streams);

        let tau = electrons.tau()[0];
        let target = 2f64.ln() - tables.rate * dt;
        println!("tau = {:e}, target = {:e}", tau, target);
        assert!((tau - target).abs() < 1.0e-15);
        assert_eq!(energy, 0.0);
    }

    #[test]
    fn single_emission_with_photon_species() {
        let tables = ConstantRate { tables: flat_tables(1.0), rate: 0.25 };
        let (mut electrons, fields) = electron_in_b_field(&tables.tables, 1000.0, 0.5);
        electrons.weight_mut()[0] = 1.5;
        let p0 = electrons.momentum()[0];
        let (e, b) = fields.sample(0);
        let mut photons = Particles::photons(3, 1.0);

        let streams = FixedStreams(vec![0.5, 0.3, 0.999999999]);
        let dt = 2.0 * 2f64.ln() / tables.rate;

        let model = MonteCarlo::new(DEFAULT_MAX_EMISSIONS, 4, 0.0);
        let energy = model.run(batch(&mut electrons, &fields, Some(&mut photons), dt), &tables, &streams);

        println!("energy = {:e}, photons = {}", energy, photons.len());
        assert_eq!(energy, 0.0);
        assert_eq!(photons.len(), 4);
        assert_eq!(electrons.weight()[0], 1.5);
        let total: f64 = photons.weight().iter().sum();
        assert_eq!(total, 1.5);

        let (_, photon_gamma, p_new) = hand_computed_loss(&tables, p0, e, b, 0.3);
        for i in 0..4 {
            assert_eq!(photons.weight()[i], 1.5 / 4.0);
            assert_eq!(photons.tau()[i], TAU_UNSET);
            assert_eq!(photons.charge()[i], 0);
            assert_eq!(photons.position()[i], electrons.position()[0]);
            let error = ((photons.momentum()[i].norm() - photon_gamma) / photon_gamma).abs();
            assert!(error < 1.0e-12);
        }
        assert_eq!(electrons.momentum()[0], p_new);
    }

    #[test]
    fn particle_at_rest_is_untouched() {
        let tables = flat_tables(1.0);
        let mut electrons = Particles::new(3, 1.0);
        electrons.push(ThreeVector::zero(), ThreeVector::zero(), 1.0, -1);
        let fields = FieldSamples::uniform(ThreeVector::new(0.0, 1.0e3, 0.0), ThreeVector::new(0.0, 0.0, 1.0e3), 1);
        let mut master = Xoshiro256StarStar::seed_from_u64(0);
        let streams = HostStreams::split(&mut master);

        let model = MonteCarlo::new(DEFAULT_MAX_EMISSIONS, 1, DEFAULT_PHOTON_GAMMA_THRESHOLD);
        let energy = model.run(batch(&mut electrons, &fields, None, 1.0), &tables, &streams);

        assert_eq!(energy, 0.0);
        assert_eq!(electrons.momentum()[0], ThreeVector::zero());
        assert_eq!(electrons.tau()[0], TAU_UNSET);
    }

    #[test]
    fn optical_depths_stay_valid() {
        let tables = flat_tables(1.0);
        let mut rng = Xoshiro256StarStar::seed_from_u64(0);
        let n = 1000;

        let mut electrons = Particles::new(3, 1.0);
        for _ in 0..n {
            let gamma = 100.0 + 1900.0 * rng.gen::<f64>();
            let theta = std::f64::consts::PI * rng.gen::<f64>();
            let p = (gamma * gamma - 1.0).sqrt();
            electrons.push(ThreeVector::zero(), ThreeVector::new(p * theta.cos(), p * theta.sin(), 0.0), 1.0, -1);
        }

        // chi ranges from ~1e-5 to ~1
        let b: Vec<ThreeVector> = (0..n)
            .map(|_| ThreeVector::new(0.0, 0.0, 10f64.powf(-1.0 + 3.0 * rng.gen::<f64>())))
            .collect();
        let fields = FieldSamples::new(vec![ThreeVector::zero(); n], b, 0);

        let model = MonteCarlo::new(DEFAULT_MAX_EMISSIONS, 1, DEFAULT_PHOTON_GAMMA_THRESHOLD);
        let mut photons = Particles::photons(3, 1.0);
        let mut total = 0.0;
        for &backend in &[Backend::Threads { lanes: 8 }, Backend::Accelerator] {
            for _step in 0..5 {
                let streams = backend.split_streams(&mut rng);
                let batch = Batch {
                    particles: &mut electrons,
                    range: 0..n,
                    fields: &fields,
                    photons: Some(&mut photons),
                    dt: 0.5,
                    backend,
                };
                model.apply(batch, &tables, &streams, &mut total);
                assert!(electrons.tau().iter().all(|&tau| tau > EPSILON_TAU || tau == TAU_UNSET));
            }
        }

        println!("radiated energy = {:e}, photons = {}", total, photons.len());
        assert!(total >= 0.0);
        assert!(photons.len() > 0);
        assert!(photons.tau().iter().all(|&tau| tau == TAU_UNSET));
    }

    #[test]
    fn continuous_threshold() {
        let base = flat_tables(1.0);
        let (electrons, fields) = electron_in_b_field(&base, 1000.0, 0.005);
        let (e, b) = fields.sample(0);
        let p0 = electrons.momentum()[0];
        let chi = particle_chi(-1.0, p0, lorentz_factor(p0), e, b, base.inv_schwinger_field());
        let dt = 0.5;
        let streams = FixedStreams(vec![0.5]);
        let model = MonteCarlo::new(DEFAULT_MAX_EMISSIONS, 1, DEFAULT_PHOTON_GAMMA_THRESHOLD);

        // exactly at, just below and just above the threshold
        for &(threshold, radiates) in &[(chi, false), (chi * (1.0 + 1.0e-9), false), (chi * (1.0 - 1.0e-9), true)] {
            let tables = base.clone().with_thresholds(threshold, 1.0);
            let mut pt = electrons.clone();
            let energy = model.run(batch(&mut pt, &fields, None, dt), &tables, &streams);
            println!("chi_cont = chi x {:.9}: energy = {:e}", threshold / chi, energy);
            if radiates {
                assert!(energy > 0.0);
                assert!(pt.momentum()[0].norm() < p0.norm());
            } else {
                assert_eq!(energy, 0.0);
                assert_eq!(pt.momentum()[0], p0);
            }
            assert_eq!(pt.tau()[0], TAU_UNSET);
        }
    }

    #[test]
    fn continuous_energy_loss() {
        let tables = flat_tables(1.0);
        let (mut electrons, fields) = electron_in_b_field(&tables, 1000.0, 0.005);
        electrons.weight_mut()[0] = 2.0;
        let (e, b) = fields.sample(0);
        let p0 = electrons.momentum()[0];
        let gamma = lorentz_factor(p0);
        let chi = particle_chi(-1.0, p0, gamma, e, b, tables.inv_schwinger_field());
        let dt = 1.0;
        let streams = FixedStreams(vec![0.5]);

        let model = MonteCarlo::new(DEFAULT_MAX_EMISSIONS, 1, DEFAULT_PHOTON_GAMMA_THRESHOLD);
        let energy = model.run(batch(&mut electrons, &fields, None, dt), &tables, &streams);

        let loss = tables.corrected_radiated_energy(chi, dt);
        let delta = lorentz_factor(electrons.momentum()[0]) - gamma;
        let error = ((delta + loss) / loss).abs();
        println!("delta gamma = {:e}, target = {:e}, error = {:e}", delta, -loss, error);
        assert!(error < 1.0e-6);
        assert!(((energy + 2.0 * delta) / energy).abs() < 1.0e-12);
    }

    #[test]
    fn fields_follow_particle_index() {
        // fields cover particles 4, 5 and 6 only, so sample i is at i - 4
        let tables = ConstantRate { tables: flat_tables(1.0), rate: 1048576.0 };
        let model = MonteCarlo::new(DEFAULT_MAX_EMISSIONS, 1, DEFAULT_PHOTON_GAMMA_THRESHOLD);
        let mut rng = Xoshiro256StarStar::seed_from_u64(0);

        for &backend in &[Backend::Threads { lanes: 2 }, Backend::Accelerator] {
            let (mut electrons, fields) = electrons_with_offset_fields(&tables.tables, 1000.0, 0.5);
            let p0 = electrons.momentum()[0];
            electrons.tau_mut()[0] = 0.7;
            electrons.tau_mut()[9] = 0.7;

            let range = fields.offset()..(fields.offset() + fields.len());
            let streams = backend.split_streams(&mut rng);
            let batch = Batch { particles: &mut electrons, range, fields: &fields, photons: None, dt: 1.0, backend };
            let energy = model.run(batch, &tables, &streams);

            println!("{:?}: energy = {:e}, chi = {:?}", backend, energy, electrons.chi());
            assert!(energy > 0.0);
            assert_only_particle_5_radiated(&electrons, p0);

            // outside the range, optical depths are untouched
            assert_eq!(electrons.tau()[0], 0.7);
            assert_eq!(electrons.tau()[9], 0.7);
            assert_eq!(electrons.tau()[4], TAU_UNSET);
            assert_eq!(electrons.tau()[6], TAU_UNSET);
        }
    }

    #[test]
    fn emission_is_capped() {
        // a very large rate: every sub-step ends in an emission
        let tables = ConstantRate { tables: flat_tables(1.0), rate: 1048576.0 };
        let (mut electrons, fields) = electron_in_b_field(&tables.tables, 1000.0, 0.5);
        let streams = FixedStreams(vec![0.5]);
        let mut photons = Particles::photons(3, 1.0);

        let model = MonteCarlo::new(3, 1, 0.0);
        model.run(batch(&mut electrons, &fields, Some(&mut photons), 1.0), &tables, &streams);
        assert_eq!(photons.len(), 3);
    }
}
