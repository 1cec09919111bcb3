//! Flow classification.
//!
//! `classify` is pure: given heads, depths, invert offsets, and lazily-evaluated
//! normal/critical depth lookups, it returns a discrete [`FlowClass`] plus whatever
//! auxiliary depths the class needs. It never touches link or conduit state; the
//! caller ([`crate::surface_area::distribute`]) is responsible for writing the
//! result into the link.

use serde::{Deserialize, Serialize};

use crate::node::NodeState;

/// Discrete flow-state classification for one conduit, one sub-iteration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FlowClass {
    /// Both ends are dry.
    Dry,
    /// Normal gravity flow, Froude number below 1.
    Subcritical,
    /// Normal gravity flow, Froude number at or above 1.
    Supercritical,
    /// Upstream end is hydraulically controlled by critical depth.
    UpCritical,
    /// Downstream end is hydraulically controlled by critical depth.
    DownCritical,
    /// Upstream end is dry; downstream end is not.
    UpDry,
    /// Downstream end is dry; upstream end is not.
    DownDry,
}

/// Result of a single classification call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub class: FlowClass,
    /// Normal depth at `|q|`, set for classes that need it.
    pub yn: Option<f64>,
    /// Critical depth at `|q|`, set for classes that need it.
    pub yc: Option<f64>,
    /// Blending fraction used by the surface-area distributor; default 1.0.
    pub fasnh: f64,
}

/// Classify the conduit's current flow state.
///
/// `z1`/`z2` are the conduit's raw upstream/downstream invert offsets; when the
/// adjacent node is an outfall, this function reduces the offset by the outfall's
/// own water depth (floored at 0) before using it. Note: if
/// that reduction brings an offset to exactly zero, the `z > 0` branches below
/// become unreachable for that side, which can strand a conduit in `Subcritical`
/// even under hydraulically critical conditions. Preserved intentionally (see
/// DESIGN.md, Open Question 1) rather than treated as a bug.
#[allow(clippy::too_many_arguments)]
pub fn classify(
    q: f64,
    h1: f64,
    h2: f64,
    y1: f64,
    y2: f64,
    z1: f64,
    z2: f64,
    node1: &NodeState,
    node2: &NodeState,
    fudge: f64,
    mut ynorm: impl FnMut() -> f64,
    mut ycrit: impl FnMut() -> f64,
) -> Classification {
    let z1 = effective_offset(z1, node1);
    let z2 = effective_offset(z2, node2);

    let no_aux = Classification { class: FlowClass::Subcritical, yn: None, yc: None, fasnh: 1.0 };

    if y1 <= fudge && y2 <= fudge {
        return Classification { class: FlowClass::Dry, ..no_aux };
    }

    if y1 > fudge && y2 > fudge {
        if q < 0.0 && z1 > 0.0 {
            let (yn, yc) = (ynorm(), ycrit());
            let yc_min = yn.min(yc);
            if y1 < yc_min {
                return Classification { class: FlowClass::UpCritical, yn: Some(yn), yc: Some(yc), fasnh: 1.0 };
            }
        }
        if q >= 0.0 && z2 > 0.0 {
            let (yn, yc) = (ynorm(), ycrit());
            let yc_min = yn.min(yc);
            let yc_max = yn.max(yc);
            if y2 < yc_min {
                return Classification { class: FlowClass::DownCritical, yn: Some(yn), yc: Some(yc), fasnh: 1.0 };
            }
            if y2 < yc_max {
                let fasnh = if yc_max - yc_min < fudge { 0.0 } else { (yc_max - y2) / (yc_max - yc_min) };
                return Classification { class: FlowClass::Subcritical, yn: Some(yn), yc: Some(yc), fasnh };
            }
        }
        return no_aux;
    }

    if y1 <= fudge && y2 > fudge {
        if h2 < node1.invert_elev + z1 {
            return Classification { class: FlowClass::UpDry, ..no_aux };
        }
        if z1 > 0.0 {
            let (yn, yc) = (ynorm(), ycrit());
            return Classification { class: FlowClass::UpCritical, yn: Some(yn), yc: Some(yc), fasnh: 1.0 };
        }
        return no_aux;
    }

    if y2 <= fudge && y1 > fudge {
        if h1 < node2.invert_elev + z2 {
            return Classification { class: FlowClass::DownDry, ..no_aux };
        }
        if z2 > 0.0 {
            let (yn, yc) = (ynorm(), ycrit());
            return Classification { class: FlowClass::DownCritical, yn: Some(yn), yc: Some(yc), fasnh: 1.0 };
        }
        return no_aux;
    }

    no_aux
}

fn effective_offset(z: f64, node: &NodeState) -> f64 {
    if node.is_outfall {
        (z - node.new_depth).max(0.0)
    } else {
        z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wet_node() -> NodeState {
        NodeState::new(100.0, 1.0, false)
    }

    #[test]
    fn both_dry_is_dry() {
        let node = wet_node();
        let result = classify(0.0, 100.0, 100.0, 0.0, 0.0, 1.0, 1.0, &node, &node, 1e-6, || 1.0, || 1.0);
        assert_eq!(result.class, FlowClass::Dry);
    }

    #[test]
    fn both_wet_default_subcritical() {
        let node = wet_node();
        let result = classify(1.0, 101.0, 100.5, 1.0, 0.5, 0.0, 0.0, &node, &node, 1e-6, || 0.3, || 0.3);
        assert_eq!(result.class, FlowClass::Subcritical);
    }

    #[test]
    fn downstream_below_critical_min_is_down_critical() {
        let node = wet_node();
        // q >= 0, z2 > 0, y2 below min(yn, yc)
        let result = classify(1.0, 101.0, 100.2, 1.0, 0.2, 0.0, 0.5, &node, &node, 1e-6, || 0.5, || 0.6);
        assert_eq!(result.class, FlowClass::DownCritical);
        assert_eq!(result.yn, Some(0.5));
        assert_eq!(result.yc, Some(0.6));
    }

    #[test]
    fn downstream_between_critical_bounds_blends_fasnh() {
        let node = wet_node();
        // yn=0.3, yc=0.7, y2=0.5 -> fasnh = (0.7-0.5)/(0.7-0.3) = 0.5
        let result = classify(1.0, 101.0, 100.5, 1.0, 0.5, 0.0, 0.5, &node, &node, 1e-6, || 0.3, || 0.7);
        assert_eq!(result.class, FlowClass::Subcritical);
        assert!((result.fasnh - 0.5).abs() < 1e-9);
    }

    #[test]
    fn upstream_dry_with_low_downstream_head_is_up_dry() {
        let node1 = NodeState::new(100.0, 0.0, false);
        let node2 = wet_node();
        // z1 = 1.0, node1.invert + z1 = 101.0; h2 must be below that
        let result = classify(1.0, 100.0, 100.5, 0.0, 0.5, 1.0, 0.0, &node1, &node2, 1e-6, || 0.3, || 0.3);
        assert_eq!(result.class, FlowClass::UpDry);
    }

    #[test]
    fn upstream_dry_with_high_downstream_head_and_drop_is_up_critical() {
        let node1 = NodeState::new(100.0, 0.0, false);
        let node2 = wet_node();
        let result = classify(1.0, 100.0, 102.0, 0.0, 0.5, 1.0, 0.0, &node1, &node2, 1e-6, || 0.3, || 0.3);
        assert_eq!(result.class, FlowClass::UpCritical);
    }

    #[test]
    fn classifier_is_symmetric_under_endpoint_swap() {
        let node1 = wet_node();
        let node2 = NodeState::new(90.0, 1.0, false);
        let forward = classify(1.0, 101.0, 90.8, 1.0, 0.8, 0.0, 0.5, &node1, &node2, 1e-6, || 0.5, || 0.6);
        let backward = classify(-1.0, 90.8, 101.0, 0.8, 1.0, 0.5, 0.0, &node2, &node1, 1e-6, || 0.5, || 0.6);
        match (forward.class, backward.class) {
            (FlowClass::DownCritical, FlowClass::UpCritical) => {}
            (a, b) => assert_eq!(a, b, "classes should mirror under endpoint swap"),
        }
    }

    #[test]
    fn outfall_offset_is_reduced_by_pool_depth() {
        // z1 raw = 1.0, outfall depth = 1.0 -> effective z1 = 0.0, so the "z1 > 0"
        // UP_CRITICAL branch becomes unreachable even though q < 0 (documented
        // open question, preserved intentionally).
        let outfall = NodeState::new(100.0, 1.0, true);
        let node2 = wet_node();
        let result = classify(-1.0, 100.5, 101.0, 0.5, 1.0, 1.0, 0.0, &outfall, &node2, 1e-6, || 0.2, || 0.2);
        assert_eq!(result.class, FlowClass::Subcritical);
    }
}
