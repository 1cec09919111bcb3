//! Culvert inlet-control capacity and force-main friction slope.
//!
//! The inlet-control cap is a single FHWA HDS-5-style regression (unsubmerged and
//! submerged forms blended by headwater ratio) rather than the full per-shape,
//! per-entrance-type coefficient chart set; see DESIGN.md decision 3. A caller that
//! needs a specific chart's coefficients supplies them as the fields below.

/// Inlet-control rating coefficients for one culvert, per FHWA HDS-5 nomenclature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CulvertRating {
    /// Barrel diameter (or rise, for non-circular shapes), feet.
    pub diameter: f64,
    /// Full cross-sectional area, ft².
    pub area_full: f64,
    /// Invert elevation of the culvert's upstream end.
    pub invert_elev: f64,
    /// Unsubmerged form coefficient: `HW/D = k*(Q/(A*sqrt(D)))^m`.
    pub k: f64,
    pub m: f64,
    /// Submerged form coefficients: `HW/D = c*(Q/(A*sqrt(D)))^2 + y`.
    pub c: f64,
    pub y: f64,
    /// Headwater-to-diameter ratio above which the submerged form applies.
    pub submerged_ratio: f64,
}

impl CulvertRating {
    /// Cap `q` at the inlet-control capacity implied by headwater `h1`.
    ///
    /// Returns the (possibly capped) flow and whether the cap was active.
    pub fn culvert_inflow(&self, q: f64, h1: f64) -> (f64, bool) {
        if q <= 0.0 || self.diameter <= 0.0 || self.area_full <= 0.0 {
            return (q, false);
        }
        let hw = (h1 - self.invert_elev).max(0.0);
        let hw_over_d = hw / self.diameter;
        let unit_q = self.area_full * self.diameter.sqrt();

        let ratio = if hw_over_d > self.submerged_ratio {
            if self.c <= 0.0 {
                0.0
            } else {
                ((hw_over_d - self.y) / self.c).max(0.0).sqrt()
            }
        } else if self.k <= 0.0 || self.m <= 0.0 {
            0.0
        } else {
            (hw_over_d / self.k).max(0.0).powf(1.0 / self.m)
        };

        let q_cap = unit_q * ratio;
        if q_cap < q {
            (q_cap, true)
        } else {
            (q, false)
        }
    }
}

/// Force-main friction slope via a Hazen-Williams form: `Sf = (v / (1.318 · C ·
/// R^0.63))^1.852`. `hw_coefficient` is the Hazen-Williams roughness `C`.
pub fn forcemain_friction_slope(v_abs: f64, r_mid: f64, hw_coefficient: f64) -> f64 {
    if r_mid <= 0.0 || hw_coefficient <= 0.0 {
        return 0.0;
    }
    let denom = 1.318 * hw_coefficient * r_mid.powf(0.63);
    if denom <= 0.0 {
        return 0.0;
    }
    (v_abs / denom).powf(1.852)
}
