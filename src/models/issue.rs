use serde::{Deserialize, Serialize};

use super::MetricKind;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    UnsupportedConfiguration,
    NonPositiveMeasurement,
    MissingSegmentIndex,
    UnexpectedMeasurement,
    DuplicateMeasurement,
    OutOfRangeMeasurement,
    SegmentTotalTimeMismatch,
    NonMonotonicSplit,
    StrokeTotalBelowSegmentSum,
    StrokeTotalAboveSegmentSum,
    UnderwaterExceedsDistance,
    UnderwaterDistanceGap,
    VelocityImbalance,
}

impl IssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::UnsupportedConfiguration => "unsupported_configuration",
            IssueKind::NonPositiveMeasurement => "non_positive_measurement",
            IssueKind::MissingSegmentIndex => "missing_segment_index",
            IssueKind::UnexpectedMeasurement => "unexpected_measurement",
            IssueKind::DuplicateMeasurement => "duplicate_measurement",
            IssueKind::OutOfRangeMeasurement => "out_of_range_measurement",
            IssueKind::SegmentTotalTimeMismatch => "segment_total_time_mismatch",
            IssueKind::NonMonotonicSplit => "non_monotonic_split",
            IssueKind::StrokeTotalBelowSegmentSum => "stroke_total_below_segment_sum",
            IssueKind::StrokeTotalAboveSegmentSum => "stroke_total_above_segment_sum",
            IssueKind::UnderwaterExceedsDistance => "underwater_exceeds_distance",
            IssueKind::UnderwaterDistanceGap => "underwater_distance_gap",
            IssueKind::VelocityImbalance => "velocity_imbalance",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            IssueKind::OutOfRangeMeasurement
            | IssueKind::StrokeTotalAboveSegmentSum
            | IssueKind::UnderwaterDistanceGap
            | IssueKind::VelocityImbalance => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

/// A recoverable problem found in the measurements. Never blocks derivation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub kind: IssueKind,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_kind: Option<MetricKind>,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            segment_index: None,
            metric_kind: None,
            message: message.into(),
        }
    }

    pub fn at_segment(mut self, segment_index: Option<u32>) -> Self {
        self.segment_index = segment_index;
        self
    }

    pub fn for_metric(mut self, metric_kind: MetricKind) -> Self {
        self.metric_kind = Some(metric_kind);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}
