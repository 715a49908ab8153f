//! Radiation reaction on a species of charged particles
//!
//! Each model updates the momenta of a contiguous range of particles
//! over a single time step, given the fields at their positions, and
//! returns the energy lost to radiation. The Monte Carlo model can also
//! create macrophotons.

use std::fmt;
use std::ops::Range;
use enum_dispatch::enum_dispatch;
use rayon::prelude::*;

use crate::exec::Backend;
use crate::fields::FieldSamples;
use crate::geometry::ThreeVector;
use crate::input::{Config, InputError};
use crate::particles::Particles;
use crate::quantum::{lorentz_factor, particle_chi};
use crate::random::Streams;
use crate::tables::{NielH, RadiationTables};

mod emission;
mod monte_carlo;
mod landau_lifshitz;
mod niel;

pub use emission::*;
pub use monte_carlo::*;
pub use landau_lifshitz::*;
pub use niel::*;

/// Optical depths at or below this value are considered exhausted
pub const EPSILON_TAU: f64 = 1.0e-100;

/// Default cap on the number of emission events per particle per step
pub const DEFAULT_MAX_EMISSIONS: usize = 10;

/// Default minimum energy, in units of m c^2, of a photon that is
/// added to the photon species
pub const DEFAULT_PHOTON_GAMMA_THRESHOLD: f64 = 2.0;

/// A contiguous range of particles, the fields at their positions and,
/// optionally, the species that receives emitted photons.
pub struct Batch<'a> {
    pub particles: &'a mut Particles,
    pub range: Range<usize>,
    /// Sample `i` holds the fields at particle `i`, less the offset.
    pub fields: &'a FieldSamples,
    pub photons: Option<&'a mut Particles>,
    /// Time step, in units of 1 / ω_r
    pub dt: f64,
    pub backend: Backend,
}

/// Attributes of a single particle that are fixed while it radiates.
#[derive(Copy, Clone, Debug)]
pub struct Emitter {
    pub position: ThreeVector,
    pub weight: f64,
    /// Charge over mass squared, in units of e/m_e²
    pub charge_over_mass_sqd: f64,
    pub e: ThreeVector,
    pub b: ThreeVector,
}

impl Emitter {
    /// Quantum parameter of the particle, if it had momentum `p`.
    #[inline]
    pub fn chi(&self, p: ThreeVector, gamma: f64, inv_schwinger: f64) -> f64 {
        particle_chi(self.charge_over_mass_sqd, p, gamma, self.e, self.b, inv_schwinger)
    }
}

/// A model of radiation reaction.
#[enum_dispatch]
pub trait RadiationReaction {
    /// Updates the particles in `batch` over a single time step, adding
    /// the energy lost to radiation (units of m c^2 times weight) to
    /// `radiated_energy`.
    fn apply(&self, batch: Batch<'_>, tables: &RadiationTables, streams: &Streams, radiated_energy: &mut f64);
}

/// The available models of radiation reaction.
#[enum_dispatch(RadiationReaction)]
#[derive(Clone, Debug)]
pub enum Model {
    MonteCarlo,
    CorrectedLandauLifshitz,
    LandauLifshitz,
    Niel,
}

impl Model {
    /// Constructs the model selected by `config`.
    pub fn new(config: &RadiationConfig) -> Self {
        match config.model {
            ModelKind::MonteCarlo => MonteCarlo::new(config.max_emissions, config.photon_sampling, config.photon_gamma_threshold).into(),
            ModelKind::CorrectedLandauLifshitz => CorrectedLandauLifshitz::new().into(),
            ModelKind::LandauLifshitz => LandauLifshitz::new().into(),
            ModelKind::Niel => Niel::new(config.niel_h).into(),
        }
    }

    pub fn kind(&self) -> ModelKind {
        match self {
            Model::MonteCarlo(_) => ModelKind::MonteCarlo,
            Model::CorrectedLandauLifshitz(_) => ModelKind::CorrectedLandauLifshitz,
            Model::LandauLifshitz(_) => ModelKind::LandauLifshitz,
            Model::Niel(_) => ModelKind::Niel,
        }
    }
}

/// Names the model of radiation reaction
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ModelKind {
    MonteCarlo,
    CorrectedLandauLifshitz,
    LandauLifshitz,
    Niel,
}

impl ModelKind {
    /// Parses the name of a model, as given in an input file.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "monte-carlo" | "mc" => Some(ModelKind::MonteCarlo),
            "corrected-landau-lifshitz" | "cll" => Some(ModelKind::CorrectedLandauLifshitz),
            "landau-lifshitz" | "ll" => Some(ModelKind::LandauLifshitz),
            "niel" => Some(ModelKind::Niel),
            _ => None,
        }
    }

    /// Does this model create photons?
    pub fn is_discontinuous(&self) -> bool {
        *self == ModelKind::MonteCarlo
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ModelKind::MonteCarlo => "monte-carlo",
            ModelKind::CorrectedLandauLifshitz => "corrected-landau-lifshitz",
            ModelKind::LandauLifshitz => "landau-lifshitz",
            ModelKind::Niel => "niel",
        };
        write!(f, "{}", name)
    }
}

/// Parameters of the radiation-reaction model
#[derive(Clone, Debug, PartialEq)]
pub struct RadiationConfig {
    pub model: ModelKind,
    /// Cap on the number of emission events per particle per step
    pub max_emissions: usize,
    /// Number of macrophotons created per emission event
    pub photon_sampling: usize,
    /// Photons with energy below this threshold (units of m c^2) are
    /// not created, their energy is counted as radiated instead
    pub photon_gamma_threshold: f64,
    pub niel_h: NielH,
}

impl Default for RadiationConfig {
    fn default() -> Self {
        RadiationConfig {
            model: ModelKind::MonteCarlo,
            max_emissions: DEFAULT_MAX_EMISSIONS,
            photon_sampling: 1,
            photon_gamma_threshold: DEFAULT_PHOTON_GAMMA_THRESHOLD,
            niel_h: NielH::Fit,
        }
    }
}

impl RadiationConfig {
    /// Reads the 'radiation' section of the input configuration.
    pub fn from_config(input: &Config) -> Result<Self, InputError> {
        let defaults = Self::default();

        let name: String = input.read("radiation:model")?;
        let model = ModelKind::from_name(&name)
            .ok_or_else(|| InputError::invalid("radiation:model", &format!("unknown model '{}', expected one of monte-carlo, corrected-landau-lifshitz, landau-lifshitz, niel", name)))?;

        let niel_h = match input.read_optional::<String, _>("radiation:niel_h")?.as_deref() {
            None | Some("fit") => NielH::Fit,
            Some("table") => NielH::Table,
            Some(other) => return Err(InputError::invalid("radiation:niel_h", &format!("'{}' is neither 'fit' nor 'table'", other))),
        };

        let config = RadiationConfig {
            model,
            max_emissions: input.read_optional("radiation:max_emissions")?.unwrap_or(defaults.max_emissions),
            photon_sampling: input.read_optional("radiation:photon_sampling")?.unwrap_or(defaults.photon_sampling),
            photon_gamma_threshold: input.read_optional("radiation:photon_gamma_threshold")?.unwrap_or(defaults.photon_gamma_threshold),
            niel_h,
        };

        config.validate()?;
        Ok(config)
    }

    /// Checks that the parameters are usable.
    pub fn validate(&self) -> Result<(), InputError> {
        if self.max_emissions == 0 {
            return Err(InputError::invalid("radiation:max_emissions", "must be at least 1"));
        }

        if self.photon_sampling == 0 {
            return Err(InputError::invalid("radiation:photon_sampling", "must be at least 1"));
        }

        if !(self.photon_gamma_threshold >= 0.0) {
            return Err(InputError::invalid("radiation:photon_gamma_threshold", "must be non-negative"));
        }

        Ok(())
    }
}

/// Recomputes the quantum parameter of every particle in the view,
/// after its momentum has been updated. The first particle of the view
/// has index `first`.
pub(crate) fn update_chi(first: usize, charge_over_mass_sqd: f64, charge: &[i16], momentum: &[ThreeVector], chi: &mut [f64], fields: &FieldSamples, inv_schwinger: f64) {
    chi.par_iter_mut()
        .zip(momentum.par_iter())
        .zip(charge.par_iter())
        .enumerate()
        .for_each(|(k, ((chi, p), q))| {
            let (e, b) = fields.sample(first + k);
            let gamma = lorentz_factor(*p);
            *chi = particle_chi(charge_over_mass_sqd * (*q as f64), *p, gamma, e, b, inv_schwinger);
        });
}
