//! Radiation reaction for particle-in-cell species
//!
//! Updates the momenta of charged macroparticles under the recoil of the
//! radiation they emit in strong electromagnetic fields. Four models are
//! provided: Monte Carlo photon emission, the classical and
//! quantum-corrected Landau-Lifshitz forces, and the stochastic
//! diffusion model of Niel et al.

pub mod constants;
pub mod geometry;
pub mod units;
pub mod quantum;
pub mod tables;
pub mod input;
pub mod random;
pub mod particles;
pub mod fields;
pub mod exec;
pub mod radiation;
