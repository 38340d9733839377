//! Intensity normalization and quantile-based color classification.
//!
//! Two behaviors here are deliberate compatibility quirks inherited from the
//! production formula and must not be "fixed" without a product decision:
//!
//! * a degenerate group where every value equals `v` gets `Intensity = v`
//!   (the raw minimum), not a neutral 0 or 1;
//! * points with `Intensity <= 0` are excluded from rendering even though they
//!   remain valid observations (the renderer applies the filter when building
//!   layers).

use crate::map::aggregate::AggregatedPoint;
use ordered_float::OrderedFloat;

/// Marker palette, darkest/lowest bucket first.
pub const PALETTE: [&str; 6] = [
    "#000000", // black
    "#0000ff", // blue
    "#00ffff", // cyan
    "#ffff00", // yellow
    "#ffa500", // orange
    "#ff0000", // red
];

/// Fixed probabilities at which the intensity quantile breakpoints are taken.
pub const QUANTILE_PROBS: [f64; 6] = [0.01, 0.55, 0.70, 0.85, 0.95, 1.00];

/// An aggregated point with its normalized intensity and color bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedPoint {
    pub lat: f64,
    pub lon: f64,
    pub value: f64,
    pub city: Option<String>,
    /// `(value - min) / (max - min)` over the group, or the raw group minimum
    /// when all values are equal.
    pub intensity: f64,
    /// Index into [`PALETTE`], ascending with intensity.
    pub bucket: usize,
}

impl ClassifiedPoint {
    pub fn color(&self) -> &'static str {
        PALETTE[self.bucket]
    }
}

/// Normalizes the points' values to [0, 1] and assigns each point a quantile
/// color bucket. An empty input yields an empty output.
pub fn classify(points: Vec<AggregatedPoint>) -> Vec<ClassifiedPoint> {
    if points.is_empty() {
        return Vec::new();
    }
    let min = points.iter().map(|p| p.value).fold(f64::INFINITY, f64::min);
    let max = points
        .iter()
        .map(|p| p.value)
        .fold(f64::NEG_INFINITY, f64::max);

    let intensities: Vec<f64> = points
        .iter()
        .map(|p| {
            if max > min {
                (p.value - min) / (max - min)
            } else {
                // Uniform group: every point collapses to the raw minimum.
                min
            }
        })
        .collect();

    let breaks = quantile_breakpoints(&intensities);
    points
        .into_iter()
        .zip(intensities)
        .map(|(p, intensity)| ClassifiedPoint {
            lat: p.lat,
            lon: p.lon,
            value: p.value,
            city: p.city,
            bucket: bucket_for(intensity, &breaks),
            intensity,
        })
        .collect()
}

/// Computes the six ascending breakpoints `q0..q5` over `intensities` at
/// [`QUANTILE_PROBS`], with linear interpolation between order statistics.
///
/// `intensities` must be non-empty.
pub fn quantile_breakpoints(intensities: &[f64]) -> [f64; 6] {
    debug_assert!(!intensities.is_empty());
    let mut sorted = intensities.to_vec();
    sorted.sort_by_key(|v| OrderedFloat(*v));

    let mut breaks = [0.0; 6];
    for (slot, p) in breaks.iter_mut().zip(QUANTILE_PROBS) {
        *slot = quantile_sorted(&sorted, p);
    }
    breaks
}

fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    let pos = p * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Assigns a bucket by successive ascending comparison: bucket 0 if
/// `intensity <= q0`, else bucket 1 if `<= q1`, ..., else bucket 5 (which
/// catches everything above `q4`, including exactly `q5`).
pub fn bucket_for(intensity: f64, breaks: &[f64; 6]) -> usize {
    breaks
        .iter()
        .take(5)
        .position(|q| intensity <= *q)
        .unwrap_or(5)
}
