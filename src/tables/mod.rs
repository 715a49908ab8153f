//! Cross sections and inverse distributions for nonlinear inverse
//! Compton scattering, as consumed by the radiation-reaction models.
//!
//! The tables themselves are computed elsewhere and supplied either
//! programmatically or from a YAML file; this module only provides
//! bounded, interpolated lookups into them.

use crate::quantum;
use crate::units::Normalization;

mod error;
mod table;
mod loader;

pub use error::*;
pub use table::*;

/// Default threshold below which radiation reaction is neglected
pub const DEFAULT_MINIMUM_CHI_CONTINUOUS: f64 = 1.0e-3;

/// Default threshold above which photon emission is treated stochastically
pub const DEFAULT_MINIMUM_CHI_DISCONTINUOUS: f64 = 1.0e-2;

/// How the auxiliary function h(χ) of the Niel model is obtained
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NielH {
    /// Interpolated from the table set, falling back to the fit outside
    /// the tabulated domain
    Table,
    /// Evaluated using the fit of Ridgers et al.
    Fit,
}

/// The interface between the radiation-reaction models and the
/// precomputed cross sections.
pub trait CrossSection: Sync {
    /// Particles with quantum parameter above this threshold emit
    /// photons stochastically.
    fn minimum_chi_discontinuous(&self) -> f64;

    /// Particles with quantum parameter below this threshold do not
    /// radiate at all.
    fn minimum_chi_continuous(&self) -> f64;

    /// Photon production rate, per unit (normalized) time, for a particle
    /// with quantum parameter `chi` and Lorentz factor `gamma`.
    fn photon_production_yield(&self, chi: f64, gamma: f64) -> f64;

    /// Samples the photon quantum parameter given the particle quantum
    /// parameter `chi` and a uniformly distributed `rand`.
    fn sample_photon_chi(&self, chi: f64, rand: f64) -> f64;

    /// Energy radiated over an interval `dt`, including the quantum
    /// correction to the classical power, in units of m c^2.
    fn corrected_radiated_energy(&self, chi: f64, dt: f64) -> f64;

    /// Energy radiated over an interval `dt` according to classical
    /// electrodynamics, in units of m c^2.
    fn classical_radiated_energy(&self, chi: f64, dt: f64) -> f64 {
        self.classical_radiated_power() * chi * chi * dt
    }

    /// Prefactor of the classical radiated power.
    fn classical_radiated_power(&self) -> f64;

    /// Auxiliary function h(χ) of the Niel model.
    fn niel_h(&self, chi: f64, method: NielH) -> f64;

    /// Ratio of the reference to the Schwinger field, required to
    /// evaluate the quantum parameter.
    fn inv_schwinger_field(&self) -> f64;
}

/// Immutable set of tables, together with the thresholds and the
/// normalization that turn them into rates.
#[derive(Clone, Debug)]
pub struct RadiationTables {
    norm: Normalization,
    minimum_chi_continuous: f64,
    minimum_chi_discontinuous: f64,
    production: Table1D,
    photon_chi: CumulativeTable,
    niel: Option<Table1D>,
}

impl RadiationTables {
    /// Constructs the table set from the integrated emission spectrum
    /// `production` (related to the photon yield by a factor
    /// √3 α χ / (2π λ_C γ)) and the photon χ distribution.
    pub fn new(norm: Normalization, production: Table1D, photon_chi: CumulativeTable) -> Self {
        RadiationTables {
            norm,
            minimum_chi_continuous: DEFAULT_MINIMUM_CHI_CONTINUOUS,
            minimum_chi_discontinuous: DEFAULT_MINIMUM_CHI_DISCONTINUOUS,
            production,
            photon_chi,
            niel: None,
        }
    }

    /// Overrides the thresholds that separate the no-emission,
    /// continuous and discontinuous regimes.
    pub fn with_thresholds(self, minimum_chi_continuous: f64, minimum_chi_discontinuous: f64) -> Self {
        RadiationTables {
            minimum_chi_continuous,
            minimum_chi_discontinuous,
            ..self
        }
    }

    /// Adds a tabulated h(χ) for the Niel model.
    pub fn with_niel_table(self, niel: Table1D) -> Self {
        RadiationTables {
            niel: Some(niel),
            ..self
        }
    }

    pub fn normalization(&self) -> &Normalization {
        &self.norm
    }

    pub fn has_niel_table(&self) -> bool {
        self.niel.is_some()
    }

    /// Dimensions of the yield table and the (particle χ, photon χ)
    /// dimensions of the cumulative table.
    pub fn dimensions(&self) -> (usize, (usize, usize)) {
        (self.production.len(), self.photon_chi.dimensions())
    }
}

impl CrossSection for RadiationTables {
    fn minimum_chi_discontinuous(&self) -> f64 {
        self.minimum_chi_discontinuous
    }

    fn minimum_chi_continuous(&self) -> f64 {
        self.minimum_chi_continuous
    }

    fn photon_production_yield(&self, chi: f64, gamma: f64) -> f64 {
        self.norm.photon_production_rate() * self.production.at(chi) * chi / gamma
    }

    fn sample_photon_chi(&self, chi: f64, rand: f64) -> f64 {
        self.photon_chi.sample(chi, rand)
    }

    fn corrected_radiated_energy(&self, chi: f64, dt: f64) -> f64 {
        quantum::ridgers_gaunt_factor(chi) * self.classical_radiated_energy(chi, dt)
    }

    fn classical_radiated_power(&self) -> f64 {
        self.norm.classical_radiated_power()
    }

    fn niel_h(&self, chi: f64, method: NielH) -> f64 {
        match (method, &self.niel) {
            (NielH::Table, Some(table)) if table.contains(chi) => table.at(chi),
            _ => quantum::niel_h_fit(chi),
        }
    }

    fn inv_schwinger_field(&self) -> f64 {
        self.norm.inv_schwinger_field()
    }
}
