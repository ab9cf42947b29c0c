//! Value-weighted dispersion metrics over a group of shots.
//!
//! Every metric is a normalized Shannon entropy: the entropy of the xG mass
//! spread over some set of categories, divided by `ln(k)` where `k` is the
//! number of occupied categories. A value of 0 means all mass sits in one
//! category, 1 means it is spread evenly. Dividing by `ln(k)` rather than the
//! log of the number of possible categories keeps players with few distinct
//! shot types or locations comparable to players with many.

use std::collections::{BTreeMap, HashMap};

use crate::shots::ShotRecord;

/// Normalized Shannon entropy of a non-negative weight vector, in `[0, 1]`.
///
/// Weights `<= 0` (and NaN) are ignored. With one or no positive weight there
/// is no dispersion and the result is 0.
pub fn normalized_entropy(weights: &[f64]) -> f64 {
    let positive: Vec<f64> = weights.iter().copied().filter(|w| *w > 0.0).collect();
    let k = positive.len();
    if k <= 1 {
        return 0.0;
    }
    let total: f64 = positive.iter().sum();
    if !total.is_finite() || total <= 0.0 {
        return 0.0;
    }
    let h = positive
        .iter()
        .map(|w| {
            let p = w / total;
            -p * p.ln()
        })
        .sum::<f64>();
    (h / (k as f64).ln()).clamp(0.0, 1.0)
}

/// How evenly a group's xG is spread over its individual shots.
pub fn shot_entropy(shots: &[&ShotRecord]) -> f64 {
    if shots.len() <= 1 {
        return 0.0;
    }
    let total: f64 = shots.iter().map(|s| s.xg).sum();
    if total <= 0.0 {
        return 0.0;
    }
    let weights: Vec<f64> = shots.iter().map(|s| s.xg).collect();
    normalized_entropy(&weights)
}

/// How evenly a group's xG is spread over a `grid_x` x `grid_y` grid of pitch cells.
///
/// The grid spans the observed coordinate range of the group on each axis.
/// Bins are right-closed, except that the lowest value lands in the first bin.
/// Shots without both coordinates are ignored.
pub fn spatial_entropy_grid(shots: &[&ShotRecord], grid_x: usize, grid_y: usize) -> f64 {
    let located: Vec<(f64, f64, f64)> = shots
        .iter()
        .filter(|s| s.has_location())
        .filter_map(|s| Some((s.x?, s.y?, s.xg)))
        .collect();
    if located.len() <= 1 {
        return 0.0;
    }

    let x_bins = AxisBins::over(located.iter().map(|(x, _, _)| *x), grid_x);
    let y_bins = AxisBins::over(located.iter().map(|(_, y, _)| *y), grid_y);

    let mut xg_by_cell: BTreeMap<(usize, usize), f64> = BTreeMap::new();
    for (x, y, xg) in &located {
        *xg_by_cell
            .entry((x_bins.index(*x), y_bins.index(*y)))
            .or_insert(0.0) += xg;
    }

    let total: f64 = xg_by_cell.values().sum();
    if total <= 0.0 || xg_by_cell.len() <= 1 {
        return 0.0;
    }
    let weights: Vec<f64> = xg_by_cell.into_values().collect();
    normalized_entropy(&weights)
}

/// How evenly a group's xG is spread over shot-type labels.
///
/// `None` means there is no signal: fewer than two shots carry a type label.
/// A single label (or zero typed xG) is perfectly concentrated and gives
/// `Some(0.0)`. Callers substitute a neutral value for `None`.
pub fn type_entropy(shots: &[&ShotRecord]) -> Option<f64> {
    let typed: Vec<(&str, f64)> = shots
        .iter()
        .filter_map(|s| s.shot_type.as_deref().map(|t| (t, s.xg)))
        .collect();
    if typed.len() <= 1 {
        return None;
    }

    let mut xg_by_type: HashMap<&str, f64> = HashMap::new();
    for (label, xg) in typed {
        *xg_by_type.entry(label).or_insert(0.0) += xg;
    }

    let total: f64 = xg_by_type.values().sum();
    if total <= 0.0 || xg_by_type.len() <= 1 {
        return Some(0.0);
    }
    let weights: Vec<f64> = xg_by_type.into_values().collect();
    Some(normalized_entropy(&weights))
}

#[derive(Debug, Clone, Copy)]
struct AxisBins {
    lo: f64,
    width: f64,
    count: usize,
}

impl AxisBins {
    fn over(values: impl Iterator<Item = f64>, count: usize) -> Self {
        let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
        for v in values {
            lo = lo.min(v);
            hi = hi.max(v);
        }
        let count = count.max(1);
        let width = if hi > lo { (hi - lo) / count as f64 } else { 0.0 };
        Self { lo, width, count }
    }

    fn index(&self, v: f64) -> usize {
        if self.width <= 0.0 || v <= self.lo {
            return 0;
        }
        let raw = ((v - self.lo) / self.width).ceil() as usize;
        raw.saturating_sub(1).min(self.count - 1)
    }
}
