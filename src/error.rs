//! Typed errors surfaced at the crate's construction-time boundaries.
//!
//! The per-sub-iteration hot path (`momentum::update_conduit_flow`) has no
//! recoverable error path by design; these errors are only raised when building
//! an [`crate::expr::Program`] or a custom [`crate::xsect::CrossSection`].

pub use crate::expr::BuildError;
pub use crate::xsect::XsectError;
