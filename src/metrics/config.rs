use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

use crate::metrics::formulas::MAX_DECIMALS;
use crate::models::{FormulaId, MetricKind};

/// Tunable thresholds for the derivation engine.
///
/// The defaults are the values the conformance vectors are written against; a
/// storage-side recomputation must use the same numbers to stay in parity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct DerivationConfig {
    /// Allowed gap between summed segment times and the total time.
    pub time_tolerance_secs: f64,

    /// Relative lap-to-lap velocity change above which a warning is raised.
    pub max_velocity_drift: f64,

    /// Strokes the total may exceed the per-segment counts by before a warning.
    pub max_extra_strokes: f64,

    /// Largest spread between underwater distances before a warning, in meters.
    pub max_underwater_gap_m: f64,

    pub precision: Precision,
    pub limits: MeasurementLimits,
}

impl Default for DerivationConfig {
    fn default() -> Self {
        Self {
            time_tolerance_secs: 0.05,
            max_velocity_drift: 0.5,
            max_extra_strokes: 5.0,
            max_underwater_gap_m: 10.0,
            precision: Precision::default(),
            limits: MeasurementLimits::default(),
        }
    }
}

impl DerivationConfig {
    /// Reject settings the engine cannot honour.
    pub fn validate(&self) -> Result<()> {
        let thresholds = [
            ("timeToleranceSecs", self.time_tolerance_secs),
            ("maxVelocityDrift", self.max_velocity_drift),
            ("maxExtraStrokes", self.max_extra_strokes),
            ("maxUnderwaterGapM", self.max_underwater_gap_m),
        ];
        for (name, value) in thresholds {
            ensure!(
                value.is_finite() && value >= 0.0,
                "{name} must be a non-negative number, got {value}"
            );
        }
        self.precision.validate()
    }
}

/// Decimal places values are emitted with (half away from zero).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Precision {
    pub velocity_decimals: u32,
    pub distance_decimals: u32,
    pub ratio_decimals: u32,
}

impl Default for Precision {
    fn default() -> Self {
        Self {
            velocity_decimals: 3,
            distance_decimals: 2,
            ratio_decimals: 4,
        }
    }
}

impl Precision {
    pub fn validate(&self) -> Result<()> {
        let counts = [
            ("velocityDecimals", self.velocity_decimals),
            ("distanceDecimals", self.distance_decimals),
            ("ratioDecimals", self.ratio_decimals),
        ];
        for (name, decimals) in counts {
            ensure!(
                decimals <= MAX_DECIMALS,
                "{name} must be at most {MAX_DECIMALS}, got {decimals}"
            );
        }
        Ok(())
    }

    pub fn decimals_for(&self, formula: FormulaId) -> u32 {
        match formula {
            FormulaId::VelocitySplit25
            | FormulaId::VelocitySegmentTime
            | FormulaId::VelocityCheckpointRemainder
            | FormulaId::AverageVelocity => self.velocity_decimals,
            FormulaId::DistancePerStroke
            | FormulaId::DistanceWithoutUnderwater
            | FormulaId::AverageUnderwaterDistance => self.distance_decimals,
            FormulaId::Efficiency
            | FormulaId::Consistency
            | FormulaId::Fatigue
            | FormulaId::TechniqueRatio => self.ratio_decimals,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Plausible bounds per measurement kind. Values outside them are still used.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct MeasurementLimits {
    pub t15: Range,
    pub t25: Range,
    pub segment_time: Range,
    pub stroke_count: Range,
    pub underwater_distance: Range,
    pub total_time: Range,
    pub total_strokes: Range,
}

impl Default for MeasurementLimits {
    fn default() -> Self {
        Self {
            t15: Range::new(3.0, 30.0),
            t25: Range::new(5.0, 60.0),
            segment_time: Range::new(5.0, 300.0),
            stroke_count: Range::new(1.0, 100.0),
            underwater_distance: Range::new(0.0, 15.0),
            total_time: Range::new(10.0, 3600.0),
            total_strokes: Range::new(1.0, 2000.0),
        }
    }
}

impl MeasurementLimits {
    pub fn for_kind(&self, kind: MetricKind) -> Range {
        match kind {
            MetricKind::T15 => self.t15,
            MetricKind::T25 => self.t25,
            MetricKind::SegmentTime => self.segment_time,
            MetricKind::StrokeCount => self.stroke_count,
            MetricKind::UnderwaterDistance => self.underwater_distance,
            MetricKind::TotalTime => self.total_time,
            MetricKind::TotalStrokes => self.total_strokes,
        }
    }
}
