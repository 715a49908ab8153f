//! Normalized units
//!
//! Momenta are measured in units of m c, times in units of 1/ω_r
//! and fields in units of m c ω_r / e, where ω_r is the reference
//! angular frequency. The radiation tables work with the dimensionless
//! factors that follow from this choice.

use std::f64::consts;
use crate::constants::*;

/// The dimensionless factors required by the radiation models,
/// derived from a reference angular frequency.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Normalization {
    omega: f64,
    compton_wavelength: f64,
}

impl Normalization {
    /// Normalization defined by the reference angular frequency `omega`,
    /// in rad/s.
    pub fn from_angular_frequency(omega: f64) -> Self {
        Normalization {
            omega,
            compton_wavelength: COMPTON_TIME * omega,
        }
    }

    /// Normalization defined by the reference wavelength, in metres.
    pub fn from_wavelength(wavelength: f64) -> Self {
        Self::from_angular_frequency(2.0 * consts::PI * SPEED_OF_LIGHT / wavelength)
    }

    /// The reference angular frequency, in rad/s.
    pub fn angular_frequency(&self) -> f64 {
        self.omega
    }

    /// Reduced Compton wavelength in units of c / ω_r, i.e. ħ ω_r / (m c²).
    pub fn compton_wavelength(&self) -> f64 {
        self.compton_wavelength
    }

    /// Ratio of the reference field to the Schwinger field. Coincides
    /// with the normalized Compton wavelength.
    pub fn inv_schwinger_field(&self) -> f64 {
        self.compton_wavelength
    }

    /// Prefactor of the classical radiated power, 2 α / (3 λ_C), such that
    /// P = factor × χ² in units of m c² ω_r.
    pub fn classical_radiated_power(&self) -> f64 {
        2.0 * ALPHA_FINE / (3.0 * self.compton_wavelength)
    }

    /// Prefactor of the photon production rate, √3 α / (2π λ_C).
    pub fn photon_production_rate(&self) -> f64 {
        3.0f64.sqrt() * ALPHA_FINE / (2.0 * consts::PI * self.compton_wavelength)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compton_wavelength_at_800nm() {
        let norm = Normalization::from_wavelength(0.8e-6);
        // hbar omega / m c^2 for 1.55 eV photons
        let target = 1.5498e-6 / ELECTRON_MASS_MEV;
        let value = norm.compton_wavelength();
        let error = ((value - target) / target).abs();
        println!("lambda_c = {:e}, target = {:e}, error = {:e}", value, target, error);
        assert!(error < 1.0e-3);
    }

    #[test]
    fn radiated_power_prefactor() {
        let norm = Normalization::from_angular_frequency(1.0e15);
        let ratio = norm.classical_radiated_power() / norm.photon_production_rate();
        let target = 4.0 * consts::PI / (3.0 * 3.0f64.sqrt());
        assert!(((ratio - target) / target).abs() < 1.0e-12);
    }
}
