//! Parameter optimizer: chooses the `(bands, rows)` split of a `k`-wide
//! sketch that best fits a target Jaccard threshold, trading false
//! positives against false negatives.
//!
//! The LSH S-curve `S(x; b, r) = 1 - (1 - x^r)^b` gives the probability
//! that two sets with true Jaccard `x` collide in at least one band.
//! `optimal` searches every feasible `(b, r)` with `b * r <= k` and picks
//! the one minimizing a weighted sum of the false-positive mass below the
//! threshold and the false-negative mass above it, each approximated by
//! left-Riemann summation.

use crate::errors::Error;

const INTEGRATION_STEP: f64 = 0.001;

#[inline]
fn s_curve(x: f64, bands: u32, rows: u32) -> f64 {
    1.0 - (1.0 - x.powi(rows as i32)).powi(bands as i32)
}

/// Left-Riemann sum of `f` over `[lo, hi)` with step `INTEGRATION_STEP`,
/// sampling each strip at its midpoint `x + 0.5 * step`, per spec §4.2.
fn left_riemann(lo: f64, hi: f64, f: impl Fn(f64) -> f64) -> f64 {
    if hi <= lo {
        return 0.0;
    }
    let mut area = 0.0;
    let mut x = lo;
    while x < hi {
        area += f(x + 0.5 * INTEGRATION_STEP) * INTEGRATION_STEP;
        x += INTEGRATION_STEP;
    }
    area
}

/// Expected false-positive mass: area under the S-curve for similarities
/// below `threshold` (candidates surfaced despite being dissimilar).
fn false_positive_mass(threshold: f64, bands: u32, rows: u32) -> f64 {
    left_riemann(0.0, threshold, |x| s_curve(x, bands, rows))
}

/// Expected false-negative mass: area under the S-curve's complement for
/// similarities at or above `threshold` (truly-similar pairs the bands
/// miss).
fn false_negative_mass(threshold: f64, bands: u32, rows: u32) -> f64 {
    left_riemann(threshold, 1.0, |x| 1.0 - s_curve(x, bands, rows))
}

/// Search `b in [1, k]`, `r in [1, floor(k/b)]` for the split minimizing
/// `fp_weight * FP(b, r) + fn_weight * FN(b, r)`, breaking ties by
/// first-found (`b` ascending outer loop, `r` ascending inner loop).
///
/// # Errors
/// [`Error::InvalidParameter`] if `k == 0` or `threshold` is outside
/// `[0, 1]`. [`Error::Internal`] if no candidate was explored (defensive;
/// unreachable given `k >= 1`).
pub fn optimal(threshold: f32, k: u32, fp_weight: f32, fn_weight: f32) -> Result<(u32, u32), Error> {
    if k == 0 {
        return Err(Error::InvalidParameter("k must be positive".to_string()));
    }
    if !(0.0..=1.0).contains(&threshold) {
        return Err(Error::InvalidParameter(format!(
            "threshold {threshold} out of [0,1]"
        )));
    }

    let threshold = threshold as f64;
    let fp_weight = fp_weight as f64;
    let fn_weight = fn_weight as f64;

    let mut best: Option<(u32, u32)> = None;
    let mut best_cost = f64::INFINITY;

    for bands in 1..=k {
        let max_rows = k / bands;
        for rows in 1..=max_rows {
            let fp = false_positive_mass(threshold, bands, rows);
            let fnm = false_negative_mass(threshold, bands, rows);
            let cost = fp_weight * fp + fn_weight * fnm;
            if cost < best_cost {
                best_cost = cost;
                best = Some((bands, rows));
            }
        }
    }

    best.ok_or_else(|| Error::Internal("optimizer explored no (bands, rows) candidate".to_string()))
}

/// `optimal` with the spec's default weights of `0.5`/`0.5`.
pub fn optimal_default(threshold: f32, k: u32) -> Result<(u32, u32), Error> {
    optimal(threshold, k, 0.5, 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_k() {
        assert!(optimal(0.5, 0, 0.5, 0.5).is_err());
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        assert!(optimal(1.5, 64, 0.5, 0.5).is_err());
        assert!(optimal(-0.1, 64, 0.5, 0.5).is_err());
    }

    #[test]
    fn feasible_for_various_k_and_thresholds() {
        for k in [1u32, 2, 7, 64, 128, 256] {
            for t in [0.0f32, 0.1, 0.5, 0.8, 1.0] {
                let (bands, rows) = optimal(t, k, 0.5, 0.5).unwrap();
                assert!(bands >= 1);
                assert!(rows >= 1);
                assert!(bands * rows <= k);
            }
        }
    }

    #[test]
    fn scenario_c_k64_threshold_half() {
        let (bands, rows) = optimal(0.5, 64, 0.5, 0.5).unwrap();
        assert!(bands * rows <= 64);
        assert!(bands >= 2);
    }

    #[test]
    fn s_curve_is_sharper_with_more_rows() {
        // Raising rows at fixed bands should push the curve rightward
        // (lower collision probability below the crossover point).
        let lo_rows = s_curve(0.3, 16, 2);
        let hi_rows = s_curve(0.3, 16, 8);
        assert!(hi_rows < lo_rows);
    }
}
