//! Normal-flow capping check.

use crate::config::NormalFlowLimitation;

/// Evaluate whether `q` should be capped at the normal-flow (Manning) discharge.
///
/// Returns `Some(q_norm)` when the check triggers and caps the flow, `None`
/// otherwise. The caller is responsible for writing `link.normal_flow = true`
/// when this returns `Some`.
///
/// Outfall-adjacent conduits always enable the slope trigger and disable the
/// Froude trigger, regardless of the global limitation setting.
///
/// `froude1` is the Froude number computed from the upstream-end velocity and
/// depth alone, not the mid-conduit value used elsewhere in the integrator.
#[allow(clippy::too_many_arguments)]
pub fn check(
    q: f64,
    beta: f64,
    a1: f64,
    r1: f64,
    y1: f64,
    y2: f64,
    froude1: f64,
    limitation: NormalFlowLimitation,
    outfall_adjacent: bool,
    fudge: f64,
) -> Option<f64> {
    let slope_trigger = outfall_adjacent
        || (matches!(limitation, NormalFlowLimitation::Slope | NormalFlowLimitation::Both) && y1 < y2);
    let froude_trigger = !outfall_adjacent
        && matches!(limitation, NormalFlowLimitation::Froude | NormalFlowLimitation::Both)
        && y1 > fudge
        && y2 > fudge
        && froude1 >= 1.0;

    if !slope_trigger && !froude_trigger {
        return None;
    }

    let q_norm = beta * a1 * r1.powf(2.0 / 3.0);
    if q_norm < q {
        Some(q_norm)
    } else {
        None
    }
}
