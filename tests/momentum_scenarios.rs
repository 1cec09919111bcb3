//! End-to-end scenarios for the dynamic-wave momentum integrator.

use dynwave::callbacks::DefaultEnvironment;
use dynwave::conduit::{ConduitDynamic, ConduitStatic, FullState};
use dynwave::config::{DampingMode, NormalFlowLimitation, RoutingConfig};
use dynwave::expr;
use dynwave::flow_class::FlowClass;
use dynwave::link::LinkState;
use dynwave::momentum::update_conduit_flow;
use dynwave::node::NodeState;
use dynwave::xsect::CrossSection;

fn gravity_pipe() -> ConduitStatic {
    ConduitStatic {
        barrels: 1,
        physical_length: 100.0,
        courant_length: 100.0,
        rough_factor: 0.02,
        beta: 1.0,
        loss_coeff_in: 0.0,
        loss_coeff_out: 0.0,
        loss_coeff_avg: 0.0,
        has_losses: false,
        z1: 0.0,
        z2: 0.0,
        culvert_code: None,
        force_main: false,
        outfall_adjacent: false,
    }
}

fn environment(diameter: f64) -> DefaultEnvironment {
    let xsect = CrossSection::circular(diameter);
    let mut env = DefaultEnvironment::new(xsect, 32.17);
    env.manning_n = 0.013;
    env.slope = 0.01;
    env
}

#[test]
fn free_flowing_subcritical_pipe() {
    let static_props = gravity_pipe();
    let mut env = environment(1.0);
    let xsect = env.xsect.clone();
    let mut conduit = ConduitDynamic::new();
    conduit.q1 = 1.0;
    conduit.a1 = xsect.area_of_depth(0.45);
    let mut link = LinkState::new_open();
    let node1 = NodeState::new(100.0, 0.5, false);
    let node2 = NodeState::new(99.0, 0.4, false);
    let mut config = RoutingConfig::us_customary();
    config.normal_flow_limitation = NormalFlowLimitation::Both;
    config.damping_mode = DampingMode::NoDamping;

    update_conduit_flow(&mut conduit, &static_props, &xsect, &mut link, &node1, &node2, &mut env, &config, 1, 0.5, 30.0);

    assert_eq!(link.flow_class, FlowClass::Subcritical);
    assert!(link.new_flow > 0.0);
    assert!((link.new_flow - 1.0).abs() < 1.0);
    assert!(link.froude < 1.0);
}

#[test]
fn dry_pipe() {
    let static_props = gravity_pipe();
    let mut env = environment(1.0);
    let xsect = env.xsect.clone();
    let mut conduit = ConduitDynamic::new();
    let mut link = LinkState::new_open();
    let node1 = NodeState::new(100.0, 0.0, false);
    let node2 = NodeState::new(99.0, 0.0, false);
    let config = RoutingConfig::us_customary();

    update_conduit_flow(&mut conduit, &static_props, &xsect, &mut link, &node1, &node2, &mut env, &config, 0, 0.5, 30.0);

    assert_eq!(link.flow_class, FlowClass::Dry);
    assert_eq!(link.new_flow, 0.0);
    assert!(link.dqdh > 0.0);
}

#[test]
fn closed_by_control() {
    let static_props = gravity_pipe();
    let mut env = environment(1.0);
    let xsect = env.xsect.clone();
    let mut conduit = ConduitDynamic::new();
    conduit.q1 = 2.0;
    conduit.a1 = xsect.a_full;
    let mut link = LinkState::new_open();
    link.setting = 0.0;
    let node1 = NodeState::new(100.0, 1.0, false);
    let node2 = NodeState::new(99.0, 1.0, false);
    let config = RoutingConfig::us_customary();

    update_conduit_flow(&mut conduit, &static_props, &xsect, &mut link, &node1, &node2, &mut env, &config, 0, 0.5, 30.0);

    assert_eq!(link.new_flow, 0.0);
    assert_eq!(conduit.q1, 0.0);
    assert_eq!(conduit.q2, 0.0);
}

#[test]
fn surcharged_closed_conduit_with_partial_damping() {
    let static_props = gravity_pipe();
    let mut env = environment(1.0);
    let xsect = env.xsect.clone();
    let mut conduit = ConduitDynamic::new();
    conduit.q1 = 1.0;
    conduit.a1 = xsect.a_full;
    conduit.full_state = FullState::BothFull;
    let mut link = LinkState::new_open();
    let node1 = NodeState::new(100.0, 1.0, false);
    let node2 = NodeState::new(100.0, 1.0, false);
    let mut config = RoutingConfig::us_customary();
    config.damping_mode = DampingMode::Partial;

    update_conduit_flow(&mut conduit, &static_props, &xsect, &mut link, &node1, &node2, &mut env, &config, 0, 0.5, 30.0);

    assert!(link.new_flow.is_finite());
    assert!(conduit.full_state.is_full());
}

#[test]
fn sign_flip_under_relaxation_never_crosses_zero_in_one_step() {
    let static_props = gravity_pipe();
    let mut env = environment(1.0);
    let xsect = env.xsect.clone();
    let mut conduit = ConduitDynamic::new();
    conduit.q1 = 1.0;
    conduit.a1 = xsect.area_of_depth(0.9);
    let mut link = LinkState::new_open();
    let node1 = NodeState::new(100.0, 0.9, false);
    // Reversed slope: downstream head higher than upstream, pushing flow negative.
    let node2 = NodeState::new(100.5, 0.9, false);
    let config = RoutingConfig::us_customary();

    update_conduit_flow(&mut conduit, &static_props, &xsect, &mut link, &node1, &node2, &mut env, &config, 1, 0.8, 30.0);

    // Either the flow settled on the same side as before, or it snapped to the
    // small magnitude guard rather than crossing zero within one call.
    if link.new_flow * 1.0 < 0.0 {
        assert!(link.new_flow.abs() <= 0.001 + 1e-9);
    }
}

#[test]
fn expression_evaluator_handles_nested_step_example() {
    let program = expr::build("2*(A+3)^2 - STEP(A)", |name| if name.eq_ignore_ascii_case("A") { 0 } else { -1 }).unwrap();
    let result = expr::evaluate(&program, |idx| if idx == 0 { 5.0 } else { 0.0 });
    assert!((result - 127.0).abs() < 1e-9);
}
