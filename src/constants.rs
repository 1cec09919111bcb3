//! Physical constants shared across the solver.

/// Geometric floor below which a depth or area is treated as "dry" (ft).
pub const FUDGE: f64 = 1.0e-6;

/// Velocity clamp used only inside momentum-term calculations (ft/s).
pub const MAXVELOCITY: f64 = 50.0;

/// Gravitational acceleration, US customary units (ft/s^2).
pub const GRAVITY_US: f64 = 32.17;

/// Gravitational acceleration, SI units (m/s^2).
pub const GRAVITY_SI: f64 = 9.81;

/// Froude number below which inertial damping is fully off (sigma = 1).
pub const FROUDE_DAMPING_LOW: f64 = 0.5;

/// Froude number at and above which inertial damping is fully on (sigma = 0).
pub const FROUDE_DAMPING_HIGH: f64 = 1.0;

/// Magnitude a flow is snapped to when under-relaxation would otherwise flip its sign.
pub const SIGN_SNAP: f64 = 0.001;

/// Depth ratio (y / yFull) above which a closed shape's top width is evaluated at a
/// substitute depth, so the width does not collapse to zero approaching the crown.
pub const NEAR_FULL_RATIO: f64 = 0.96;
