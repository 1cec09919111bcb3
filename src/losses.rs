//! Local-loss and friction-slope helper terms.

use crate::constants::FUDGE;

/// Local (entrance/exit/bend) head-loss term, as a dimensionless addend to the
/// momentum equation's denominator.
///
/// Terms whose denominator is at or below [`FUDGE`] are skipped, so a dry or
/// near-dry end contributes nothing rather than blowing up.
pub fn local_losses(q_abs: f64, c_in: f64, c_out: f64, c_avg: f64, a1: f64, a2: f64, a_mid: f64, length: f64, dt: f64) -> f64 {
    let mut sum = 0.0;
    if a1 > FUDGE {
        sum += c_in * q_abs / a1;
    }
    if a2 > FUDGE {
        sum += c_out * q_abs / a2;
    }
    if a_mid > FUDGE {
        sum += c_avg * q_abs / a_mid;
    }
    sum / 2.0 / length * dt
}

/// Friction term for a gravity (non-pressurized) conduit.
///
/// `rough_factor` bundles Manning's n and unit conversion constants, per the
/// conduit's static properties; `r_wtd` is the upstream-weighted hydraulic
/// radius, `v_abs` the (clamped) absolute velocity.
pub fn friction_term(rough_factor: f64, r_wtd: f64, v_abs: f64, dt: f64) -> f64 {
    if r_wtd <= 0.0 {
        return 0.0;
    }
    dt * rough_factor / r_wtd.powf(4.0 / 3.0) * v_abs
}
