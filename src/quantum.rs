//! Pure functions shared by all radiation-reaction models

use crate::geometry::ThreeVector;

/// Lorentz factor of a massive particle with normalized momentum `p`.
#[inline]
pub fn lorentz_factor(p: ThreeVector) -> f64 {
    (1.0 + p.norm_sqr()).sqrt()
}

/// Returns the quantum nonlinearity parameter of a particle with
/// charge-to-mass-squared ratio `charge_over_mass_sqd` (in units of
/// e/m²), momentum `p` and Lorentz factor `gamma`, in the electric and
/// magnetic fields `e` and `b`.
///
/// `inv_schwinger` is the ratio of the reference field to the Schwinger
/// field. The particle at rest is not treated specially.
#[inline]
pub fn particle_chi(charge_over_mass_sqd: f64, p: ThreeVector, gamma: f64, e: ThreeVector, b: ThreeVector, inv_schwinger: f64) -> f64 {
    let e_dot_p = e * p;
    let force = gamma * e + p.cross(b);
    charge_over_mass_sqd.abs() * inv_schwinger * (e_dot_p * e_dot_p - force.norm_sqr()).abs().sqrt()
}

/// Fit to the quantum correction to the classical radiated power,
/// g(χ) = [1 + 4.8 (1 + χ) ln(1 + 1.7 χ) + 2.44 χ²]^(-2/3),
/// following Ridgers et al. (2017).
pub fn ridgers_gaunt_factor(chi: f64) -> f64 {
    (1.0 + 4.8 * (1.0 + chi) * (1.0 + 1.7 * chi).ln() + 2.44 * chi * chi).powf(-2.0 / 3.0)
}

/// Fit to the auxiliary function h(χ) that controls the strength of
/// stochastic diffusion in the model of Niel et al. (2018).
pub fn niel_h_fit(chi: f64) -> f64 {
    let inner = 1.0 + (1.0 + 4.528956689714566 * chi) * (1.0 + 12.29006671133671 * chi).ln()
        + 4.632282003019882 * chi * chi;
    1.9846415503393384 * chi.powi(3) * inner.powf(-7.0 / 6.0)
}
