//! Cross-section geometry: area, top width, and hydraulic radius as functions of depth.
//!
//! Every function here is pure and defined on `[0, y_full]`; callers are responsible
//! for clamping the depth they pass in if it might fall outside that range (the
//! momentum integrator does this itself before calling into this module).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::NEAR_FULL_RATIO;

/// Errors raised when constructing a [`CrossSection`] from caller-supplied data.
///
/// This is the one place in the crate that accepts geometry the crate itself cannot
/// assume is well-formed, so it validates rather than panics (see DESIGN.md, Open
/// Question decision 4).
#[derive(Debug, Error, PartialEq)]
pub enum XsectError {
    /// A custom table needs at least two depth samples to interpolate between.
    #[error("custom cross-section table needs at least two samples, got {0}")]
    TooFewSamples(usize),
    /// The first sample of a custom table must start at zero depth.
    #[error("custom cross-section table must start at y = 0, first sample was y = {0}")]
    FirstSampleNotZero(f64),
    /// Samples must be strictly increasing in depth.
    #[error("custom cross-section table samples must be strictly increasing in depth (y = {0} did not increase on y = {1})")]
    NotMonotonic(f64, f64),
    /// `y_full`/`a_full` must be strictly positive (data model invariant, section 3).
    #[error("cross-section y_full and a_full must both be positive, got y_full = {0}, a_full = {1}")]
    NonPositiveFull(f64, f64),
}

/// One depth sample of a [`Shape::Custom`] table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CustomSample {
    pub y: f64,
    pub a: f64,
    pub w: f64,
    pub r: f64,
}

/// A piecewise-linear geometry table for shapes the crate does not model natively.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomTable {
    samples: Vec<CustomSample>,
    open: bool,
}

impl CustomTable {
    fn new(samples: Vec<CustomSample>, open: bool) -> Result<Self, XsectError> {
        if samples.len() < 2 {
            return Err(XsectError::TooFewSamples(samples.len()));
        }
        if samples[0].y != 0.0 {
            return Err(XsectError::FirstSampleNotZero(samples[0].y));
        }
        for pair in samples.windows(2) {
            if pair[1].y <= pair[0].y {
                return Err(XsectError::NotMonotonic(pair[0].y, pair[1].y));
            }
        }
        Ok(Self { samples, open })
    }

    fn interpolate<F: Fn(&CustomSample) -> f64>(&self, y: f64, field: F) -> f64 {
        if y <= self.samples[0].y {
            return field(&self.samples[0]);
        }
        let last = self.samples.len() - 1;
        if y >= self.samples[last].y {
            return field(&self.samples[last]);
        }
        for pair in self.samples.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            if y >= lo.y && y <= hi.y {
                let t = (y - lo.y) / (hi.y - lo.y);
                return field(&lo) + t * (field(&hi) - field(&lo));
            }
        }
        field(&self.samples[last])
    }
}

/// Cross-section shape family.
///
/// `Circular`, `Rectangular`, and `ForceMain` are closed shapes; `Trapezoidal` is
/// open; `Custom` carries its own openness flag alongside its sample table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Shape {
    /// Closed circular pipe; `y_full` on the owning [`CrossSection`] is the diameter.
    Circular,
    /// Rectangular box, open (street channel) or closed (box culvert).
    Rectangular { width: f64, open: bool },
    /// Open trapezoidal channel with bottom width `b` and side slope `z` (H:V).
    Trapezoidal { bottom_width: f64, side_slope: f64 },
    /// Pressurized closed conduit; geometry behaves like `Circular` of this diameter,
    /// but the owning [`crate::conduit::ConduitStatic::force_main`] flag routes
    /// friction through the alternate force-main slope law (section 4.4/4.6).
    ForceMain { diameter: f64 },
    /// Caller-supplied depth/area/width/radius table for irregular shapes.
    Custom(CustomTable),
}

/// An immutable, per-conduit cross-section descriptor.
///
/// Invariant: `0 < y_full` and `0 < a_full` (section 3).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CrossSection {
    pub shape: Shape,
    pub y_full: f64,
    pub a_full: f64,
}

impl CrossSection {
    /// A closed circular pipe of the given diameter.
    pub fn circular(diameter: f64) -> Self {
        let a_full = std::f64::consts::PI * diameter * diameter / 4.0;
        Self { shape: Shape::Circular, y_full: diameter, a_full }
    }

    /// A rectangular conduit: `open = true` for a street/channel section (no top),
    /// `open = false` for a closed box culvert.
    pub fn rectangular(width: f64, height: f64, open: bool) -> Self {
        Self {
            shape: Shape::Rectangular { width, open },
            y_full: height,
            a_full: width * height,
        }
    }

    /// An open trapezoidal channel. `y_full`/`a_full` describe the depth/area at
    /// which the channel is considered "full" for the purposes of this solver
    /// (e.g. top-of-bank), not a physical lid.
    pub fn trapezoidal(bottom_width: f64, side_slope: f64, y_full: f64) -> Self {
        let a_full = (bottom_width + side_slope * y_full) * y_full;
        Self {
            shape: Shape::Trapezoidal { bottom_width, side_slope },
            y_full,
            a_full,
        }
    }

    /// A pressurized force main of the given diameter.
    pub fn force_main(diameter: f64) -> Self {
        let a_full = std::f64::consts::PI * diameter * diameter / 4.0;
        Self { shape: Shape::ForceMain { diameter }, y_full: diameter, a_full }
    }

    /// A custom geometry table. `samples` must be sorted ascending by depth, with the
    /// first sample at `y = 0`, and must contain at least two entries.
    pub fn custom(samples: Vec<CustomSample>, open: bool) -> Result<Self, XsectError> {
        let y_full = samples.last().map(|s| s.y).unwrap_or(0.0);
        let a_full = samples.last().map(|s| s.a).unwrap_or(0.0);
        if y_full <= 0.0 || a_full <= 0.0 {
            return Err(XsectError::NonPositiveFull(y_full, a_full));
        }
        let table = CustomTable::new(samples, open)?;
        Ok(Self { shape: Shape::Custom(table), y_full, a_full })
    }

    /// Whether this shape belongs to the open (free-surface-always) family.
    pub fn is_open(&self) -> bool {
        match &self.shape {
            Shape::Circular | Shape::ForceMain { .. } => false,
            Shape::Rectangular { open, .. } => *open,
            Shape::Trapezoidal { .. } => true,
            Shape::Custom(table) => table.open,
        }
    }

    /// Flow area at depth `y`, clamped to `[0, y_full]`.
    pub fn area_of_depth(&self, y: f64) -> f64 {
        let y = y.clamp(0.0, self.y_full);
        match &self.shape {
            Shape::Circular | Shape::ForceMain { .. } => circular_area(y, self.y_full),
            Shape::Rectangular { width, .. } => width * y,
            Shape::Trapezoidal { bottom_width, side_slope } => {
                (bottom_width + side_slope * y) * y
            }
            Shape::Custom(table) => table.interpolate(y, |s| s.a),
        }
    }

    /// Top width at depth `y`. Closed shapes substitute a depth at 96% of `y_full`
    /// once `y` crosses that ratio, so the width never collapses to zero as a closed
    /// conduit approaches its crown (section 4.1).
    pub fn width_of_depth(&self, y: f64) -> f64 {
        let mut y = y.clamp(0.0, self.y_full);
        if !self.is_open() && self.y_full > 0.0 && y / self.y_full > NEAR_FULL_RATIO {
            y = NEAR_FULL_RATIO * self.y_full;
        }
        match &self.shape {
            Shape::Circular | Shape::ForceMain { .. } => circular_width(y, self.y_full),
            Shape::Rectangular { width, .. } => *width,
            Shape::Trapezoidal { bottom_width, side_slope } => {
                bottom_width + 2.0 * side_slope * y
            }
            Shape::Custom(table) => table.interpolate(y, |s| s.w),
        }
    }

    /// Hydraulic radius at depth `y`, clamped to `[0, y_full]`.
    pub fn radius_of_depth(&self, y: f64) -> f64 {
        let y = y.clamp(0.0, self.y_full);
        match &self.shape {
            Shape::Circular | Shape::ForceMain { .. } => circular_radius(y, self.y_full),
            Shape::Rectangular { width, .. } => {
                let area = width * y;
                let perimeter = width + 2.0 * y;
                if perimeter > 0.0 { area / perimeter } else { 0.0 }
            }
            Shape::Trapezoidal { bottom_width, side_slope } => {
                let area = (bottom_width + side_slope * y) * y;
                let perimeter = bottom_width + 2.0 * y * (1.0 + side_slope * side_slope).sqrt();
                if perimeter > 0.0 { area / perimeter } else { 0.0 }
            }
            Shape::Custom(table) => table.interpolate(y, |s| s.r),
        }
    }
}

fn circular_theta(y: f64, diameter: f64) -> f64 {
    let r = diameter / 2.0;
    if r <= 0.0 {
        return 0.0;
    }
    let cos_half_theta = ((r - y) / r).clamp(-1.0, 1.0);
    2.0 * cos_half_theta.acos()
}

fn circular_area(y: f64, diameter: f64) -> f64 {
    if y <= 0.0 {
        return 0.0;
    }
    if y >= diameter {
        return std::f64::consts::PI * diameter * diameter / 4.0;
    }
    let r = diameter / 2.0;
    let theta = circular_theta(y, diameter);
    (r * r / 2.0) * (theta - theta.sin())
}

fn circular_width(y: f64, diameter: f64) -> f64 {
    if y <= 0.0 || y >= diameter {
        return 0.0;
    }
    2.0 * (y * (diameter - y)).sqrt()
}

fn circular_radius(y: f64, diameter: f64) -> f64 {
    if y <= 0.0 {
        return 0.0;
    }
    if y >= diameter {
        return diameter / 4.0;
    }
    let r = diameter / 2.0;
    let theta = circular_theta(y, diameter);
    let area = (r * r / 2.0) * (theta - theta.sin());
    let perimeter = r * theta;
    if perimeter > 0.0 { area / perimeter } else { 0.0 }
}
