//! Automatic metric formulas.
//!
//! Every function returns `None` when its precondition is not met, so a
//! missing input removes exactly one metric from the result. All arithmetic is
//! plain `f64` and done on unrounded inputs; rounding happens once, on
//! emission, via [`round_to`].

use crate::segmentation::LAP_LENGTH;

fn positive(value: f64) -> Option<f64> {
    (value.is_finite() && value > 0.0).then_some(value)
}

/// Division by a tiny admitted value can overflow; such a result is no metric.
fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Velocity over one 25m lap.
pub fn lap_velocity(lap_time: f64) -> Option<f64> {
    positive(lap_time).and_then(|t| finite(LAP_LENGTH as f64 / t))
}

pub fn average_velocity(distance: f64, total_time: Option<f64>) -> Option<f64> {
    positive(total_time?).and_then(|t| finite(distance / t))
}

pub fn distance_per_stroke(distance: f64, total_strokes: Option<f64>) -> Option<f64> {
    positive(total_strokes?).and_then(|s| finite(distance / s))
}

pub fn distance_without_underwater(distance: f64, underwater: &[f64]) -> Option<f64> {
    if underwater.is_empty() {
        return None;
    }
    finite(distance - underwater.iter().sum::<f64>())
}

pub fn average_underwater_distance(underwater: &[f64]) -> Option<f64> {
    if underwater.is_empty() {
        return None;
    }
    finite(underwater.iter().sum::<f64>() / underwater.len() as f64)
}

pub fn efficiency(average_velocity: Option<f64>, total_strokes: Option<f64>) -> Option<f64> {
    let strokes = positive(total_strokes?)?;
    finite(average_velocity? / strokes)
}

pub fn consistency(v1: f64, v2: f64, average_velocity: Option<f64>) -> Option<f64> {
    let average = positive(average_velocity?)?;
    finite(1.0 - (v1 - v2).abs() / average)
}

pub fn fatigue(v1: f64, v2: f64) -> Option<f64> {
    positive(v1).and_then(|v1| finite((v1 - v2) / v1))
}

pub fn technique_ratio(
    average_underwater: Option<f64>,
    distance_without_underwater: Option<f64>,
) -> Option<f64> {
    let swum = positive(distance_without_underwater?)?;
    finite(average_underwater? / swum)
}

/// Most decimal places an `f64` can meaningfully be rounded to.
pub const MAX_DECIMALS: u32 = 15;

/// Round half away from zero to `decimals` places, capped at [`MAX_DECIMALS`].
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals.min(MAX_DECIMALS) as i32);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / factor
}
