//! # dynwave
//!
//! A dynamic-wave (Saint-Venant) conduit flow solver for stormwater hydraulic
//! simulation: the per-conduit, per-sub-iteration momentum-equation integrator
//! at the core of an implicit-dynamic-wave routing scheme, plus the flow
//! classification, surface-area distribution, and cross-section geometry it is
//! built on.
//!
//! ## Overview
//!
//! The crate is organized around one call: [`momentum::update_conduit_flow`],
//! which advances a single conduit's flow by one sub-iteration of the outer
//! Picard loop. Everything else supports that call:
//!
//! - [`xsect`] - Cross-section geometry (area/width/hydraulic-radius functions)
//! - [`flow_class`] - Flow-state classification (dry/subcritical/critical/...)
//! - [`surface_area`] - Free-surface-area distribution to endpoint nodes
//! - [`losses`] - Local-loss and friction-slope terms
//! - [`culvert`] - Culvert inlet-control capacity and force-main friction
//! - [`normal_flow`] - Normal-flow (Manning) capping check
//! - [`conduit`] - Conduit static/dynamic state
//! - [`node`] - Read-only node state
//! - [`link`] - Per-sub-iteration link output state
//! - [`callbacks`] - The `ConduitEnvironment` collaborator trait
//! - [`config`] - Per-run routing configuration
//! - [`momentum`] - The integrator itself
//! - [`expr`] - A small arithmetic expression evaluator for control-rule and
//!   weir-shape formulas
//!
//! ## Example
//!
//! ```
//! use dynwave::callbacks::DefaultEnvironment;
//! use dynwave::conduit::{ConduitDynamic, ConduitStatic};
//! use dynwave::config::RoutingConfig;
//! use dynwave::link::LinkState;
//! use dynwave::momentum::update_conduit_flow;
//! use dynwave::node::NodeState;
//! use dynwave::xsect::CrossSection;
//!
//! let xsect = CrossSection::circular(1.0);
//! let mut env = DefaultEnvironment::new(xsect, 32.17);
//! let mut conduit = ConduitDynamic::new();
//! let conduit_static = ConduitStatic {
//!     barrels: 1,
//!     physical_length: 100.0,
//!     courant_length: 100.0,
//!     rough_factor: 0.02,
//!     beta: 1.0,
//!     loss_coeff_in: 0.0,
//!     loss_coeff_out: 0.0,
//!     loss_coeff_avg: 0.0,
//!     has_losses: false,
//!     z1: 0.0,
//!     z2: 0.0,
//!     culvert_code: None,
//!     force_main: false,
//!     outfall_adjacent: false,
//! };
//! let mut link = LinkState::new_open();
//! let node1 = NodeState::new(100.0, 0.5, false);
//! let node2 = NodeState::new(99.0, 0.4, false);
//! let config = RoutingConfig::us_customary();
//!
//! update_conduit_flow(
//!     &mut conduit, &conduit_static, &xsect, &mut link, &node1, &node2, &mut env, &config, 0, 0.5, 30.0,
//! );
//! assert!(link.new_flow.is_finite());
//! ```

pub mod callbacks;
pub mod conduit;
pub mod config;
pub mod constants;
pub mod culvert;
pub mod error;
pub mod expr;
pub mod flow_class;
pub mod link;
pub mod losses;
pub mod momentum;
pub mod node;
pub mod normal_flow;
pub mod surface_area;
pub mod xsect;
