//! Surface-area distribution.
//!
//! Converts a conduit's classified flow state into the free-surface-area
//! contribution it makes to each of its two endpoint nodes, for the node
//! continuity equation. Calls [`crate::flow_class::classify`] exactly once and
//! may revise the caller's heads/depths in the process (critical-depth
//! conduits snap their controlling end to `min(yN, yC)`).

use crate::constants::FUDGE;
use crate::flow_class::{classify, FlowClass};
use crate::node::NodeState;
use crate::xsect::CrossSection;

/// Heads and depths at both ends of a conduit, as tracked across one update.
#[derive(Debug, Clone, Copy)]
pub struct Profile {
    pub h1: f64,
    pub h2: f64,
    pub y1: f64,
    pub y2: f64,
}

/// Outcome of distributing surface area: the revised profile, the class that
/// produced it, and the two area contributions.
#[derive(Debug, Clone, Copy)]
pub struct Distribution {
    pub profile: Profile,
    pub class: FlowClass,
    pub surf_area1: f64,
    pub surf_area2: f64,
}

/// Distribute free surface area to the two endpoint nodes.
///
/// `ynorm`/`ycrit` are lazy lookups for the normal/critical depth at `|q|`,
/// forwarded to the classifier unchanged.
#[allow(clippy::too_many_arguments)]
pub fn distribute(
    q: f64,
    length: f64,
    profile: Profile,
    z1: f64,
    z2: f64,
    node1: &NodeState,
    node2: &NodeState,
    xsect: &CrossSection,
    ynorm: impl FnMut() -> f64,
    ycrit: impl FnMut() -> f64,
) -> Distribution {
    let Profile { mut h1, mut h2, mut y1, mut y2 } = profile;

    let result = classify(q, h1, h2, y1, y2, z1, z2, node1, node2, FUDGE, ynorm, ycrit);

    let w = |y: f64| xsect.width_of_depth(y);
    let surf_area1;
    let surf_area2;

    match result.class {
        FlowClass::Subcritical | FlowClass::Supercritical => {
            let w1 = w(y1);
            let w_mid = w((y1 + y2) / 2.0);
            let w2 = w(y2);
            surf_area1 = (w1 + w_mid) * length / 4.0;
            surf_area2 = (w_mid + w2) * length / 4.0 * result.fasnh;
        }
        FlowClass::UpCritical => {
            let yn = result.yn.unwrap_or(y1);
            let yc = result.yc.unwrap_or(y1);
            y1 = (if yn < yc { yn } else { yc }).max(FUDGE);
            h1 = node1.invert_elev + z1 + y1;
            let w_mid = w((y1 + y2) / 2.0);
            let w2 = w(y2);
            surf_area1 = 0.0;
            surf_area2 = (w_mid + w2) * length / 2.0;
        }
        FlowClass::DownCritical => {
            let yn = result.yn.unwrap_or(y2);
            let yc = result.yc.unwrap_or(y2);
            y2 = (if yn < yc { yn } else { yc }).max(FUDGE);
            h2 = node2.invert_elev + z2 + y2;
            let w1 = w(y1);
            let w_mid = w((y1 + y2) / 2.0);
            surf_area1 = (w1 + w_mid) * length / 2.0;
            surf_area2 = 0.0;
        }
        FlowClass::UpDry => {
            y1 = FUDGE;
            let w1 = w(y1);
            let w_mid = w((y1 + y2) / 2.0);
            let w2 = w(y2);
            surf_area2 = (w_mid + w2) * length / 4.0;
            surf_area1 = if z1 <= 0.0 { (w1 + w_mid) * length / 4.0 } else { 0.0 };
        }
        FlowClass::DownDry => {
            y2 = FUDGE;
            let w1 = w(y1);
            let w_mid = w((y1 + y2) / 2.0);
            let w2 = w(y2);
            surf_area1 = (w1 + w_mid) * length / 4.0;
            surf_area2 = if z2 <= 0.0 { (w_mid + w2) * length / 4.0 } else { 0.0 };
        }
        FlowClass::Dry => {
            surf_area1 = FUDGE * length / 2.0;
            surf_area2 = FUDGE * length / 2.0;
        }
    }

    Distribution { profile: Profile { h1, h2, y1, y2 }, class: result.class, surf_area1, surf_area2 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xsect::CrossSection;

    fn nodes() -> (NodeState, NodeState) {
        (NodeState::new(100.0, 1.0, false), NodeState::new(99.0, 1.0, false))
    }

    #[test]
    fn subcritical_splits_area_evenly_without_fasnh() {
        let (n1, n2) = nodes();
        let xsect = CrossSection::rectangular(2.0, 2.0, true);
        let profile = Profile { h1: 101.0, h2: 100.0, y1: 1.0, y2: 1.0 };
        let d = distribute(1.0, 100.0, profile, 0.0, 0.0, &n1, &n2, &xsect, || 0.3, || 0.3);
        assert_eq!(d.class, FlowClass::Subcritical);
        assert!((d.surf_area1 - d.surf_area2).abs() < 1e-9);
    }

    #[test]
    fn dry_conduit_gets_fudge_area_each_side() {
        let (n1, n2) = nodes();
        let xsect = CrossSection::rectangular(2.0, 2.0, true);
        let profile = Profile { h1: 100.0, h2: 99.0, y1: 0.0, y2: 0.0 };
        let d = distribute(0.0, 100.0, profile, 0.0, 0.0, &n1, &n2, &xsect, || 0.0, || 0.0);
        assert_eq!(d.class, FlowClass::Dry);
        assert!((d.surf_area1 - FUDGE * 100.0 / 2.0).abs() < 1e-12);
        assert!((d.surf_area2 - FUDGE * 100.0 / 2.0).abs() < 1e-12);
    }

    #[test]
    fn up_critical_zeroes_upstream_area_and_snaps_depth() {
        let n1 = NodeState::new(100.0, 1.0, false);
        let n2 = NodeState::new(95.0, 1.0, false);
        let xsect = CrossSection::rectangular(2.0, 2.0, true);
        let profile = Profile { h1: 101.0, h2: 96.0, y1: 1.0, y2: 1.0 };
        // q < 0, z1 > 0, y1 below min(yn, yc)=0.5 triggers UpCritical
        let d = distribute(-1.0, 50.0, profile, 1.0, 0.0, &n1, &n2, &xsect, || 0.5, || 0.6);
        assert_eq!(d.class, FlowClass::UpCritical);
        assert_eq!(d.surf_area1, 0.0);
        assert!((d.profile.y1 - 0.5).abs() < 1e-9);
    }
}
