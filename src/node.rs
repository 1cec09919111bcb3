//! Read-only node state consumed by the momentum integrator.
//!
//! Full node modeling (junction/inlet/outfall properties, rim elevations, boundary
//! conditions) is network-assembly territory, out of scope here; this crate only
//! needs the handful of fields a conduit reads from its two endpoint nodes during
//! one sub-iteration.

use serde::{Deserialize, Serialize};

/// The read-only view of a node's state that a conduit consults during its update.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct NodeState {
    /// Invert (bottom) elevation of the node.
    pub invert_elev: f64,
    /// Current-iteration water depth at the node.
    pub new_depth: f64,
    /// Whether this node is an outfall.
    pub is_outfall: bool,
}

impl NodeState {
    pub fn new(invert_elev: f64, new_depth: f64, is_outfall: bool) -> Self {
        Self { invert_elev, new_depth, is_outfall }
    }

    /// Current water-surface elevation (head) at the node.
    pub fn head(&self) -> f64 {
        self.invert_elev + self.new_depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn head_is_invert_plus_depth() {
        let node = NodeState::new(100.0, 2.5, false);
        assert_eq!(node.head(), 102.5);
    }

    #[test]
    fn outfall_flag_roundtrips() {
        let node = NodeState::new(95.0, 1.0, true);
        assert!(node.is_outfall);
    }
}
