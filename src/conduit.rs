//! Conduit state: immutable static properties and mutable dynamic state.
//!
//! Narrowed down to exactly the fields the momentum integrator's contract needs,
//! split into what stays fixed for a conduit's lifetime versus what the
//! integrator rewrites every sub-iteration.

use serde::{Deserialize, Serialize};

/// Surcharge state of a conduit's two ends, used to decide whether inertial
/// damping should be suppressed and reported back to the caller after each
/// update.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum FullState {
    #[default]
    NeitherFull,
    UpstreamFull,
    DownstreamFull,
    BothFull,
}

impl FullState {
    /// Whether either end is surcharged.
    pub fn is_full(&self) -> bool {
        !matches!(self, FullState::NeitherFull)
    }

    /// Classify from the two end areas against the full area.
    pub fn from_areas(a1: f64, a2: f64, a_full: f64) -> Self {
        let full1 = a1 >= a_full;
        let full2 = a2 >= a_full;
        match (full1, full2) {
            (true, true) => FullState::BothFull,
            (true, false) => FullState::UpstreamFull,
            (false, true) => FullState::DownstreamFull,
            (false, false) => FullState::NeitherFull,
        }
    }
}

/// Immutable per-conduit properties that do not change during routing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ConduitStatic {
    /// Number of identical parallel barrels.
    pub barrels: u32,
    /// Physical conduit length, feet.
    pub physical_length: f64,
    /// Courant-modified length used in the momentum equation (`>= physical_length`).
    /// This is the only length the integrator reads for the momentum terms;
    /// `ConduitEnvironment` implementations have no length of their own to keep
    /// in sync with it.
    pub courant_length: f64,
    /// Combines Manning's n and unit constants for the friction term.
    pub rough_factor: f64,
    /// Momentum-correction coefficient for the energy-slope term.
    pub beta: f64,
    /// Upstream-end local-loss coefficient.
    pub loss_coeff_in: f64,
    /// Downstream-end local-loss coefficient.
    pub loss_coeff_out: f64,
    /// Average (along-barrel) local-loss coefficient.
    pub loss_coeff_avg: f64,
    /// Whether any local-loss coefficient is active.
    pub has_losses: bool,
    /// Upstream invert offset from node1's invert.
    pub z1: f64,
    /// Downstream invert offset from node2's invert.
    pub z2: f64,
    /// `Some(code)` if this conduit is a culvert under inlet-control rating.
    pub culvert_code: Option<u32>,
    /// Whether this conduit is a pressurized force main.
    pub force_main: bool,
    /// Whether either endpoint node is an outfall (affects the normal-flow check).
    pub outfall_adjacent: bool,
}

/// Mutable per-sub-iteration state the momentum integrator reads and writes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ConduitDynamic {
    /// Prior sub-iteration's (per-barrel) flow.
    pub q1: f64,
    /// This sub-iteration's (per-barrel) flow; equal to `q1` after the update.
    pub q2: f64,
    /// Upstream-end flow area from the prior sub-iteration.
    pub a1: f64,
    /// Downstream-end flow area from the prior sub-iteration.
    pub a2: f64,
    pub full_state: FullState,
}

impl ConduitDynamic {
    pub fn new() -> Self {
        Self { q1: 0.0, q2: 0.0, a1: 0.0, a2: 0.0, full_state: FullState::default() }
    }
}

impl Default for ConduitDynamic {
    fn default() -> Self {
        Self::new()
    }
}
