//! Per-run routing configuration.
//!
//! A single read-only struct that every conduit's sub-iteration shares by
//! reference.

use serde::{Deserialize, Serialize};

use crate::constants::{FUDGE, GRAVITY_SI, GRAVITY_US, MAXVELOCITY};

/// How much inertial damping to apply near/above critical flow.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum DampingMode {
    /// Force `sigma = 1` always (no damping).
    NoDamping,
    /// Use the Froude-derived `sigma` as computed.
    #[default]
    Partial,
    /// Force `sigma = 0` always (full damping).
    FullDamping,
}

/// Which triggers enable the normal-flow capping check.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum NormalFlowLimitation {
    #[default]
    None,
    Slope,
    Froude,
    Both,
}

/// Read-only settings shared across conduits during one sub-iteration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RoutingConfig {
    pub gravity: f64,
    pub damping_mode: DampingMode,
    pub normal_flow_limitation: NormalFlowLimitation,
    pub max_velocity: f64,
    pub fudge: f64,
}

impl RoutingConfig {
    /// US customary units: feet, seconds, g = 32.17 ft/s².
    pub fn us_customary() -> Self {
        Self {
            gravity: GRAVITY_US,
            damping_mode: DampingMode::default(),
            normal_flow_limitation: NormalFlowLimitation::default(),
            max_velocity: MAXVELOCITY,
            fudge: FUDGE,
        }
    }

    /// SI units: meters, seconds, g = 9.81 m/s².
    pub fn si_metric() -> Self {
        Self { gravity: GRAVITY_SI, ..Self::us_customary() }
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self::us_customary()
    }
}
