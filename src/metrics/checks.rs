use crate::metrics::admission::AdmittedInputs;
use crate::metrics::config::DerivationConfig;
use crate::models::{IssueKind, MetricKind, ValidationIssue};
use crate::segmentation::SegmentPlan;

/// Sum of per-segment values, present only when every segment that records
/// `kind` has an admitted value.
fn complete_sum(
    plan: &SegmentPlan,
    inputs: &AdmittedInputs,
    kind: MetricKind,
) -> Option<f64> {
    let mut sum = 0.0;
    for segment in &plan.segments {
        if !segment.capability_flags.allows(kind) {
            continue;
        }
        sum += inputs.segment_value(kind, segment.index)?;
    }
    Some(sum)
}

pub fn segment_total_time_mismatch(
    plan: &SegmentPlan,
    inputs: &AdmittedInputs,
    config: &DerivationConfig,
) -> Option<ValidationIssue> {
    let total = inputs.whole_test(MetricKind::TotalTime)?;
    let sum = complete_sum(plan, inputs, MetricKind::SegmentTime)?;
    let gap = (sum - total).abs();
    if gap <= config.time_tolerance_secs {
        return None;
    }

    Some(
        ValidationIssue::new(
            IssueKind::SegmentTotalTimeMismatch,
            format!(
                "segment/total time mismatch: segment times add up to {:.2}s but total time is {:.2}s",
                sum, total
            ),
        )
        .for_metric(MetricKind::TotalTime),
    )
}

/// A split must come strictly before every later timing point of its segment.
pub fn non_monotonic_splits(plan: &SegmentPlan, inputs: &AdmittedInputs) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for segment in &plan.segments {
        let index = segment.index;
        let t15 = inputs.segment_value(MetricKind::T15, index);
        let t25 = inputs.segment_value(MetricKind::T25, index);
        let whole = inputs.segment_value(MetricKind::SegmentTime, index);

        let pairs = [
            (MetricKind::T15, t15, MetricKind::T25, t25),
            (MetricKind::T15, t15, MetricKind::SegmentTime, whole),
            (MetricKind::T25, t25, MetricKind::SegmentTime, whole),
        ];

        for (early_kind, early, late_kind, late) in pairs {
            let (Some(early), Some(late)) = (early, late) else {
                continue;
            };
            if early < late {
                continue;
            }
            issues.push(
                ValidationIssue::new(
                    IssueKind::NonMonotonicSplit,
                    format!(
                        "non-monotonic split in segment {} ({}): {} = {}s is not before {} = {}s",
                        index,
                        segment.label,
                        early_kind.as_str(),
                        early,
                        late_kind.as_str(),
                        late
                    ),
                )
                .at_segment(Some(index))
                .for_metric(early_kind),
            );
        }
    }

    issues
}

pub fn stroke_total_below_segment_sum(
    plan: &SegmentPlan,
    inputs: &AdmittedInputs,
) -> Option<ValidationIssue> {
    let total = inputs.whole_test(MetricKind::TotalStrokes)?;
    let sum = complete_sum(plan, inputs, MetricKind::StrokeCount)?;
    if total >= sum {
        return None;
    }

    Some(
        ValidationIssue::new(
            IssueKind::StrokeTotalBelowSegmentSum,
            format!(
                "total strokes ({}) is lower than the per-segment stroke counts ({})",
                total, sum
            ),
        )
        .for_metric(MetricKind::TotalStrokes),
    )
}

pub fn stroke_total_above_segment_sum(
    plan: &SegmentPlan,
    inputs: &AdmittedInputs,
    config: &DerivationConfig,
) -> Option<ValidationIssue> {
    let total = inputs.whole_test(MetricKind::TotalStrokes)?;
    let sum = complete_sum(plan, inputs, MetricKind::StrokeCount)?;
    if total <= sum + config.max_extra_strokes {
        return None;
    }

    Some(
        ValidationIssue::new(
            IssueKind::StrokeTotalAboveSegmentSum,
            format!(
                "total strokes ({}) is more than {} above the per-segment stroke counts ({})",
                total, config.max_extra_strokes, sum
            ),
        )
        .for_metric(MetricKind::TotalStrokes),
    )
}

pub fn underwater_exceeds_distance(
    plan: &SegmentPlan,
    underwater: &[f64],
) -> Option<ValidationIssue> {
    if underwater.is_empty() {
        return None;
    }
    let submerged: f64 = underwater.iter().sum();
    let distance = plan.total_length() as f64;
    if submerged < distance {
        return None;
    }

    Some(
        ValidationIssue::new(
            IssueKind::UnderwaterExceedsDistance,
            format!(
                "underwater distances add up to {}m, not less than the {}m test distance",
                submerged, distance
            ),
        )
        .for_metric(MetricKind::UnderwaterDistance),
    )
}

/// Spread between the longest and shortest underwater distance.
pub fn underwater_distance_gap(
    underwater: &[f64],
    config: &DerivationConfig,
) -> Option<ValidationIssue> {
    if underwater.len() < 2 {
        return None;
    }
    let longest = underwater.iter().copied().fold(f64::MIN, f64::max);
    let shortest = underwater.iter().copied().fold(f64::MAX, f64::min);
    let gap = longest - shortest;
    if gap <= config.max_underwater_gap_m {
        return None;
    }

    Some(
        ValidationIssue::new(
            IssueKind::UnderwaterDistanceGap,
            format!(
                "underwater distances range from {}m to {}m, a gap of more than {}m",
                shortest, longest, config.max_underwater_gap_m
            ),
        )
        .for_metric(MetricKind::UnderwaterDistance),
    )
}

/// Only the two laps of a two-lap test are compared; pass what pacing metrics
/// were computed from.
pub fn velocity_imbalance(
    pacing: Option<(f64, f64)>,
    config: &DerivationConfig,
) -> Option<ValidationIssue> {
    let (v1, v2) = pacing?;
    let drift = (v2 - v1).abs() / v1;
    if drift <= config.max_velocity_drift {
        return None;
    }

    Some(ValidationIssue::new(
        IssueKind::VelocityImbalance,
        format!(
            "lap velocities differ by {:.1}% ({:.3} m/s vs {:.3} m/s); check the split times",
            drift * 100.0,
            v1,
            v2
        ),
    ))
}
