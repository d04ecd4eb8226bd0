use serde::{Deserialize, Serialize};

/// Kinds of value an operator records trackside.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    T15,
    T25,
    SegmentTime,
    StrokeCount,
    UnderwaterDistance,
    TotalTime,
    TotalStrokes,
}

impl MetricKind {
    pub const ALL: [MetricKind; 7] = [
        MetricKind::T15,
        MetricKind::T25,
        MetricKind::SegmentTime,
        MetricKind::StrokeCount,
        MetricKind::UnderwaterDistance,
        MetricKind::TotalTime,
        MetricKind::TotalStrokes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::T15 => "t15",
            MetricKind::T25 => "t25",
            MetricKind::SegmentTime => "segment_time",
            MetricKind::StrokeCount => "stroke_count",
            MetricKind::UnderwaterDistance => "underwater_distance",
            MetricKind::TotalTime => "total_time",
            MetricKind::TotalStrokes => "total_strokes",
        }
    }

    /// Whole-test kinds never carry a segment index.
    pub fn is_whole_test(&self) -> bool {
        matches!(self, MetricKind::TotalTime | MetricKind::TotalStrokes)
    }

    pub fn unit(&self) -> &'static str {
        match self {
            MetricKind::T15 | MetricKind::T25 | MetricKind::SegmentTime | MetricKind::TotalTime => {
                "s"
            }
            MetricKind::StrokeCount | MetricKind::TotalStrokes => "strokes",
            MetricKind::UnderwaterDistance => "m",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ManualMeasurement {
    pub metric_kind: MetricKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment_index: Option<u32>,
    pub value: f64,
}

impl ManualMeasurement {
    pub fn segment(metric_kind: MetricKind, segment_index: u32, value: f64) -> Self {
        Self {
            metric_kind,
            segment_index: Some(segment_index),
            value,
        }
    }

    pub fn whole_test(metric_kind: MetricKind, value: f64) -> Self {
        Self {
            metric_kind,
            segment_index: None,
            value,
        }
    }
}
