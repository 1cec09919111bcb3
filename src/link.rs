//! Link dynamic state: the per-sub-iteration output of a conduit update.

use serde::{Deserialize, Serialize};

use crate::flow_class::FlowClass;

/// Mutable per-sub-iteration output state for one conduit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LinkState {
    pub flow_class: FlowClass,
    pub froude: f64,
    pub new_depth: f64,
    pub new_volume: f64,
    /// Multi-barrel flow: `q * barrels`.
    pub new_flow: f64,
    pub dqdh: f64,
    /// Free-surface-area contribution to the upstream node.
    pub surf_area1: f64,
    /// Free-surface-area contribution to the downstream node.
    pub surf_area2: f64,
    pub inlet_control: bool,
    pub normal_flow: bool,
    /// External control setting; `0.0` means the conduit is closed.
    pub setting: f64,
    /// Optional user-imposed flow cap (`<= 0.0` means "no cap").
    pub q_limit: f64,
}

impl LinkState {
    /// A fresh link with the conduit open (`setting = 1`) and no flow cap.
    pub fn new_open() -> Self {
        Self {
            flow_class: FlowClass::Subcritical,
            froude: 0.0,
            new_depth: 0.0,
            new_volume: 0.0,
            new_flow: 0.0,
            dqdh: 0.0,
            surf_area1: 0.0,
            surf_area2: 0.0,
            inlet_control: false,
            normal_flow: false,
            setting: 1.0,
            q_limit: 0.0,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.setting == 0.0
    }
}

impl Default for LinkState {
    fn default() -> Self {
        Self::new_open()
    }
}
