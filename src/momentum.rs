//! The dynamic-wave momentum integrator.
//!
//! `update_conduit_flow` is the crate's single entry point: one call advances
//! one conduit's flow by one sub-iteration. It has no recoverable error path
//! and performs no allocation or I/O.

use crate::callbacks::ConduitEnvironment;
use crate::config::RoutingConfig;
use crate::conduit::{ConduitDynamic, ConduitStatic};
use crate::flow_class::FlowClass;
use crate::link::LinkState;
use crate::losses;
use crate::node::NodeState;
use crate::normal_flow;
use crate::surface_area::{self, Profile};
use crate::xsect::CrossSection;

/// Advance one conduit's flow by one sub-iteration, writing the result into
/// `conduit` and `link` in place.
#[allow(clippy::too_many_arguments)]
pub fn update_conduit_flow(
    conduit: &mut ConduitDynamic,
    conduit_static: &ConduitStatic,
    xsect: &CrossSection,
    link: &mut LinkState,
    node1: &NodeState,
    node2: &NodeState,
    env: &mut impl ConduitEnvironment,
    config: &RoutingConfig,
    steps: usize,
    omega: f64,
    dt: f64,
) {
    let barrels = conduit_static.barrels as f64;
    let g = config.gravity;
    let fudge = config.fudge;
    let length = conduit_static.courant_length;

    // Step 1: prior-iteration per-barrel flow.
    let q_old = conduit.q1;

    // Step 2: heads and raw depths, floored/clamped.
    let h1 = node1.head().max(node1.invert_elev);
    let h2 = node2.head().max(node2.invert_elev);
    let invert1 = node1.invert_elev + conduit_static.z1;
    let invert2 = node2.invert_elev + conduit_static.z2;
    let y1 = (h1 - invert1).clamp(fudge, xsect.y_full);
    let y2 = (h2 - invert2).clamp(fudge, xsect.y_full);

    // Step 3: prior-timestep area and Courant-modified length.
    let a_old = conduit.a1.max(fudge);

    // Step 4: classify and distribute surface area; may revise the profile.
    let q_abs = q_old.abs();
    let distribution = surface_area::distribute(
        q_old,
        length,
        Profile { h1, h2, y1, y2 },
        conduit_static.z1,
        conduit_static.z2,
        node1,
        node2,
        xsect,
        || env.get_ynorm(q_abs),
        || env.get_ycrit(q_abs),
    );
    let Profile { h1, h2, y1, y2 } = distribution.profile;
    link.flow_class = distribution.class;
    link.surf_area1 = distribution.surf_area1;
    link.surf_area2 = distribution.surf_area2;

    // Step 5: areas and hydraulic radii.
    let a1 = xsect.area_of_depth(y1);
    let a2 = xsect.area_of_depth(y2);
    let r1 = xsect.radius_of_depth(y1);
    let y_mid = (y1 + y2) / 2.0;
    let a_mid = xsect.area_of_depth(y_mid);
    let r_mid = xsect.radius_of_depth(y_mid);

    // Step 6: early-out for dry, closed, or vanishing-area conduits.
    let is_dry = matches!(distribution.class, FlowClass::Dry | FlowClass::UpDry | FlowClass::DownDry);
    if is_dry || link.is_closed() || a_mid <= fudge {
        conduit.q1 = 0.0;
        conduit.q2 = 0.0;
        conduit.a1 = (a1 + a2) / 2.0;
        link.new_depth = y_mid.min(xsect.y_full);
        link.new_volume = conduit.a1 * conduit_static.physical_length * barrels;
        link.new_flow = 0.0;
        link.dqdh = g * dt * a_mid / length * barrels;
        link.froude = 0.0;
        return;
    }

    // Step 7: velocity, Froude number, subcritical-to-supercritical promotion.
    let v = (q_old / a_mid).clamp(-config.max_velocity, config.max_velocity);
    let mut froude = env.get_froude(v, y_mid);
    if distribution.class == FlowClass::Subcritical && froude > 1.0 {
        link.flow_class = FlowClass::Supercritical;
        froude = froude.max(1.0);
    }

    // Step 8: inertial damping and upstream weighting.
    let mut sigma = if froude <= 0.5 {
        1.0
    } else if froude >= 1.0 {
        0.0
    } else {
        2.0 * (1.0 - froude)
    };
    let rho = if !conduit.full_state.is_full() && q_old > 0.0 && h1 >= h2 { sigma } else { 1.0 };
    let a_wtd = a1 + (a_mid - a1) * rho;
    let r_wtd = r1 + (r_mid - r1) * rho;

    // Step 9: global damping-mode override.
    use crate::config::DampingMode;
    sigma = match config.damping_mode {
        DampingMode::NoDamping => 1.0,
        DampingMode::FullDamping => 0.0,
        DampingMode::Partial => sigma,
    };
    if conduit.full_state.is_full() && !xsect.is_open() {
        sigma = 0.0;
    }

    // Step 10: momentum terms.
    let full_force_main = conduit_static.force_main && conduit.full_state.is_full();
    let dq1 = if full_force_main {
        dt * env.forcemain_friction_slope(v.abs(), r_mid)
    } else {
        losses::friction_term(conduit_static.rough_factor, r_wtd, v.abs(), dt)
    };
    let dq2 = dt * g * a_wtd * (h2 - h1) / length;
    let dq3 = 2.0 * v * (a_mid - a_old) * sigma;
    let dq4 = dt * v * v * (a2 - a1) / length * sigma;
    let dq5 = if conduit_static.has_losses {
        losses::local_losses(
            q_old.abs(),
            conduit_static.loss_coeff_in,
            conduit_static.loss_coeff_out,
            conduit_static.loss_coeff_avg,
            a1,
            a2,
            a_mid,
            length,
            dt,
        )
    } else {
        0.0
    };
    let dq6 = env.get_loss_rate(q_old, dt) * 2.5 * dt * v / conduit_static.physical_length;

    // Step 11: solve.
    let denom = 1.0 + dq1 + dq5;
    let mut q = (q_old - dq2 + dq3 + dq4 - dq6) / denom;

    // Step 12: head derivative.
    let dqdh = (1.0 / denom) * g * dt * a_wtd / length * barrels;

    // Step 13: flow limitations (only forward flow).
    if q > 0.0 {
        if conduit_static.culvert_code.is_some() && !conduit.full_state.is_full() {
            let (capped, inlet_control) = env.culvert_inflow(q, h1);
            q = capped;
            link.inlet_control = inlet_control;
        } else if y1 < xsect.y_full
            && matches!(link.flow_class, FlowClass::Subcritical | FlowClass::Supercritical)
        {
            let v1 = q_old / a1.max(fudge);
            let froude1 = env.get_froude(v1, y1);
            if let Some(q_norm) = normal_flow::check(
                q,
                conduit_static.beta,
                a1,
                r1,
                y1,
                y2,
                froude1,
                config.normal_flow_limitation,
                conduit_static.outfall_adjacent,
                fudge,
            ) {
                q = q_norm;
                link.normal_flow = true;
            }
        }
    }

    // Step 14: under-relaxation, snapping away from a sign flip.
    if steps > 0 {
        q = (1.0 - omega) * q_old + omega * q;
        if q * q_old < 0.0 {
            q = crate::constants::SIGN_SNAP * q.signum();
        }
    }

    // Step 15: user-imposed flow cap.
    if link.q_limit > 0.0 && q.abs() > link.q_limit {
        q = link.q_limit * q.signum();
    }

    // Step 16: flap gate.
    if env.set_flap_gate(node1, node2, q) {
        q = 0.0;
    }

    // Step 17: dry-node choke.
    if q > fudge && node1.new_depth <= fudge {
        q = fudge;
    } else if q < -fudge && node2.new_depth <= fudge {
        q = -fudge;
    }

    // Step 18: write back.
    conduit.a1 = a_mid;
    conduit.q1 = q;
    conduit.q2 = q;
    conduit.full_state = env.get_full_state(a1, a2, xsect.a_full);
    link.new_depth = y_mid.min(xsect.y_full);
    let a_mid_capped = ((a1 + a2) / 2.0).min(xsect.a_full);
    link.new_volume = a_mid_capped * conduit_static.physical_length * barrels;
    link.new_flow = q * barrels;
    link.froude = froude;
    link.dqdh = dqdh;
}
