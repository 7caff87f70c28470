//! Closed-form physics model: screened-Rutherford elastic scattering and
//! Bethe continuous-slowing-down energy loss.
//!
//! None of the constants here are tunable "for style" — these formulas must
//! match double-precision evaluation to within a handful of ulps, so they
//! are written exactly as derived, including the intermediate f32 round-trip
//! in [`scattering_angles`].

use crate::error::{Error, FailureContext};
use crate::material::Element;

/// Avogadro's number.
pub const N_A: f64 = 6.022_141e23;

/// Screening parameter, alpha(E, Z) = 3.4e-3 * Z^0.67 / E.
pub fn screening_parameter(energy_kev: f64, atomic_number: f64) -> f64 {
    3.4e-3 * atomic_number.powf(0.67) / energy_kev
}

/// Elastic cross-section, nm^2.
pub fn cross_section(energy_kev: f64, atomic_number: f64, alpha: f64) -> f64 {
    let z2_over_e2 = atomic_number * atomic_number / (energy_kev * energy_kev);
    let screening = std::f64::consts::PI * 4.0 / (alpha * (1.0 + alpha));
    let relativistic = ((energy_kev + 511.0) / (energy_kev + 1022.0)).powi(2);
    5.21e-7 * z2_over_e2 * screening * relativistic
}

/// Elastic mean free path, nm.
pub fn mean_free_path(
    atomic_weight: f64,
    density: f64,
    sigma: f64,
) -> f64 {
    atomic_weight / (N_A * density * 1e-21 * sigma)
}

/// Sample a step length given a mean free path, drawing `u ~
/// Uniform(1e-5, 1 - 1e-5)` from `rng` and returning `-ln(u) * lambda`.
pub fn sample_step(lambda: f64, rng: &mut crate::rng::ElectronRng) -> f64 {
    let u = rng.uniform_open(1e-5, 1.0 - 1e-5);
    -u.ln() * lambda
}

/// Mean ionisation potential, J(Z), keV.
pub fn ionisation_potential(atomic_number: f64) -> f64 {
    (9.76 * atomic_number + 58.5 * atomic_number.powf(-0.19)) * 1e-3
}

/// Bethe continuous-slowing-down energy loss, dE/ds, keV/nm.
///
/// The raw formula goes positive below `J * (1 - 0.85/1.166)`, which would
/// make the electron gain energy during a stopping-power calculation — that
/// is nonphysical, so the result is clamped to `<= 0`.
pub fn bethe_loss(energy_kev: f64, element: &Element) -> f64 {
    let j = ionisation_potential(element.atomic_number);
    let raw = -7.85e-3 * element.density * element.atomic_number
        / (element.atomic_weight * energy_kev)
        * (1.166 * (energy_kev / j + 0.85)).ln();
    raw.min(0.0)
}

/// Sampled scattering angles for one elastic event.
#[derive(Debug, Clone, Copy)]
pub struct ScatteringAngles {
    pub cos_theta: f64,
    pub sin_theta: f64,
    pub psi: f64,
}

/// Draw scattering angles for one elastic event. `cos_theta` is downcast to
/// `f32` and back to clip the O(1e-12) oscillation that can otherwise push
/// it fractionally below -1.
pub fn scattering_angles(
    alpha: f64,
    rng: &mut crate::rng::ElectronRng,
    ctx: impl Fn() -> FailureContext,
) -> Result<ScatteringAngles, Error> {
    let r1 = rng.uniform01();
    let r2 = rng.uniform01();

    let cos_theta_f64 = 1.0 - 2.0 * alpha * r1 / (1.0 + alpha - r1);
    let cos_theta = cos_theta_f64 as f32 as f64;
    let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();
    let psi = 2.0 * std::f64::consts::PI * r2;

    if cos_theta.is_nan() || sin_theta.is_nan() || psi.is_nan() {
        return Err(Error::physics_invariant_broken(
            "NaN produced while sampling scattering angles",
            ctx(),
        ));
    }

    Ok(ScatteringAngles {
        cos_theta,
        sin_theta,
        psi,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screening_parameter_decreases_with_energy() {
        let a_low = screening_parameter(1.0, 29.0);
        let a_high = screening_parameter(10.0, 29.0);
        assert!(a_high < a_low);
    }

    #[test]
    fn bethe_loss_is_never_positive() {
        let element = Element {
            density: 8.9e-24,
            atomic_number: 29.0,
            atomic_weight: 63.5,
            ionisation_potential: 0.3,
            electron_param: 1.0,
            escape_length: 2.0,
            mark: -2,
        };
        for e in [0.05, 0.1, 0.5, 1.0, 5.0, 30.0] {
            assert!(bethe_loss(e, &element) <= 0.0, "positive loss at E={e}");
        }
    }

    #[test]
    fn ionisation_potential_matches_formula_for_copper() {
        let j = ionisation_potential(29.0);
        let expected = (9.76 * 29.0 + 58.5 * 29.0f64.powf(-0.19)) * 1e-3;
        assert!((j - expected).abs() < 1e-12);
    }
}
