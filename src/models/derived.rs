use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum DerivedKind {
    SegmentVelocity,
    AverageVelocity,
    DistancePerStroke,
    DistanceWithoutUnderwater,
    AverageUnderwaterDistance,
    Efficiency,
    Consistency,
    Fatigue,
    TechniqueRatio,
}

impl DerivedKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DerivedKind::SegmentVelocity => "segment_velocity",
            DerivedKind::AverageVelocity => "average_velocity",
            DerivedKind::DistancePerStroke => "distance_per_stroke",
            DerivedKind::DistanceWithoutUnderwater => "distance_without_underwater",
            DerivedKind::AverageUnderwaterDistance => "average_underwater_distance",
            DerivedKind::Efficiency => "efficiency",
            DerivedKind::Consistency => "consistency",
            DerivedKind::Fatigue => "fatigue",
            DerivedKind::TechniqueRatio => "technique_ratio",
        }
    }
}

/// Identifies the rule that produced a derived value.
///
/// Velocity has three rules because a 25m lap time can come from a measured
/// 25m split, from the timed length of a 25m segment, or from the remainder of
/// a 50m segment after its 25m checkpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum FormulaId {
    VelocitySplit25,
    VelocitySegmentTime,
    VelocityCheckpointRemainder,
    AverageVelocity,
    DistancePerStroke,
    DistanceWithoutUnderwater,
    AverageUnderwaterDistance,
    Efficiency,
    Consistency,
    Fatigue,
    TechniqueRatio,
}

impl FormulaId {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormulaId::VelocitySplit25 => "velocity_split25",
            FormulaId::VelocitySegmentTime => "velocity_segment_time",
            FormulaId::VelocityCheckpointRemainder => "velocity_checkpoint_remainder",
            FormulaId::AverageVelocity => "average_velocity",
            FormulaId::DistancePerStroke => "distance_per_stroke",
            FormulaId::DistanceWithoutUnderwater => "distance_without_underwater",
            FormulaId::AverageUnderwaterDistance => "average_underwater_distance",
            FormulaId::Efficiency => "efficiency",
            FormulaId::Consistency => "consistency",
            FormulaId::Fatigue => "fatigue",
            FormulaId::TechniqueRatio => "technique_ratio",
        }
    }

    pub fn kind(&self) -> DerivedKind {
        match self {
            FormulaId::VelocitySplit25
            | FormulaId::VelocitySegmentTime
            | FormulaId::VelocityCheckpointRemainder => DerivedKind::SegmentVelocity,
            FormulaId::AverageVelocity => DerivedKind::AverageVelocity,
            FormulaId::DistancePerStroke => DerivedKind::DistancePerStroke,
            FormulaId::DistanceWithoutUnderwater => DerivedKind::DistanceWithoutUnderwater,
            FormulaId::AverageUnderwaterDistance => DerivedKind::AverageUnderwaterDistance,
            FormulaId::Efficiency => DerivedKind::Efficiency,
            FormulaId::Consistency => DerivedKind::Consistency,
            FormulaId::Fatigue => DerivedKind::Fatigue,
            FormulaId::TechniqueRatio => DerivedKind::TechniqueRatio,
        }
    }

    /// Human-readable expression, shown next to audited values.
    pub fn expression(&self) -> &'static str {
        match self {
            FormulaId::VelocitySplit25 => "25 / t25",
            FormulaId::VelocitySegmentTime => "25 / segment_time",
            FormulaId::VelocityCheckpointRemainder => "25 / (segment_time - t25)",
            FormulaId::AverageVelocity => "distance_total / total_time",
            FormulaId::DistancePerStroke => "distance_total / total_strokes",
            FormulaId::DistanceWithoutUnderwater => "distance_total - sum(underwater_distance)",
            FormulaId::AverageUnderwaterDistance => "mean(underwater_distance)",
            FormulaId::Efficiency => "average_velocity / total_strokes",
            FormulaId::Consistency => "1 - |v1 - v2| / average_velocity",
            FormulaId::Fatigue => "(v1 - v2) / v1",
            FormulaId::TechniqueRatio => {
                "average_underwater_distance / distance_without_underwater"
            }
        }
    }
}

/// One emitted value.
///
/// For `segment_velocity` the `segment_index` is the 1-based 25m lap the
/// velocity covers, not an index into the plan's segments: a 50m long-course
/// test has one segment but velocities for laps 1 and 2. Whole-test metrics
/// carry no index.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DerivedMetric {
    pub metric_kind: DerivedKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment_index: Option<u32>,
    pub value: f64,
    pub formula_id: FormulaId,
}

impl DerivedMetric {
    pub fn new(formula_id: FormulaId, segment_index: Option<u32>, value: f64) -> Self {
        Self {
            metric_kind: formula_id.kind(),
            segment_index,
            value,
            formula_id,
        }
    }
}
