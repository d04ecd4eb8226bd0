use crate::log_warn;
use crate::metrics::admission::{admit, AdmittedInputs};
use crate::metrics::checks;
use crate::metrics::config::DerivationConfig;
use crate::metrics::formulas::{self, round_to};
use crate::metrics::types::{DerivationResult, LapTime, LapVelocity};
use crate::models::{
    DerivedMetric, FormulaId, IssueKind, ManualMeasurement, MetricKind, ValidationIssue,
};
use crate::segmentation::SegmentPlan;

const ENABLE_LOGS: bool = false;

/// Derive automatic metrics with the default configuration.
pub fn derive(plan: &SegmentPlan, measurements: &[ManualMeasurement]) -> DerivationResult {
    derive_with(plan, measurements, &DerivationConfig::default())
}

/// Derive automatic metrics and validation issues for one test.
///
/// Total and deterministic: bad input becomes an issue, a missing input drops
/// only the metrics that need it, and identical arguments always produce an
/// identical result.
pub fn derive_with(
    plan: &SegmentPlan,
    measurements: &[ManualMeasurement],
    config: &DerivationConfig,
) -> DerivationResult {
    if plan.is_empty() {
        log_warn!("Derivation requested for unsupported plan {}m {}", plan.distance, plan.course);
        return DerivationResult {
            metrics: Vec::new(),
            issues: vec![ValidationIssue::new(
                IssueKind::UnsupportedConfiguration,
                plan.unsupported_message(),
            )],
        };
    }

    let mut issues = Vec::new();
    let inputs = admit(plan, measurements, config, &mut issues);

    let distance = plan.total_length() as f64;
    let total_time = inputs.whole_test(MetricKind::TotalTime);
    let total_strokes = inputs.whole_test(MetricKind::TotalStrokes);
    let underwater: Vec<f64> = inputs
        .series(MetricKind::UnderwaterDistance)
        .into_iter()
        .map(|(_, value)| value)
        .collect();

    let velocities: Vec<LapVelocity> = lap_times(plan, &inputs)
        .into_iter()
        .filter_map(|lap| {
            formulas::lap_velocity(lap.seconds).map(|velocity| LapVelocity {
                lap: lap.lap,
                velocity,
                formula: lap.formula,
            })
        })
        .collect();

    let average_velocity = formulas::average_velocity(distance, total_time);
    let without_underwater = formulas::distance_without_underwater(distance, &underwater);
    let average_underwater = formulas::average_underwater_distance(&underwater);

    let mut metrics = Vec::new();
    let mut emit = |formula: FormulaId, segment_index: Option<u32>, raw: Option<f64>| {
        let Some(raw) = raw else {
            return;
        };
        let value = round_to(raw, config.precision.decimals_for(formula));
        if value.is_finite() {
            metrics.push(DerivedMetric::new(formula, segment_index, value));
        }
    };

    for v in &velocities {
        emit(v.formula, Some(v.lap), Some(v.velocity));
    }
    emit(FormulaId::AverageVelocity, None, average_velocity);
    emit(
        FormulaId::DistancePerStroke,
        None,
        formulas::distance_per_stroke(distance, total_strokes),
    );
    emit(FormulaId::DistanceWithoutUnderwater, None, without_underwater);
    emit(FormulaId::AverageUnderwaterDistance, None, average_underwater);
    emit(
        FormulaId::Efficiency,
        None,
        formulas::efficiency(average_velocity, total_strokes),
    );

    let pacing = two_lap_velocities(plan, &velocities);
    if let Some((v1, v2)) = pacing {
        emit(
            FormulaId::Consistency,
            None,
            formulas::consistency(v1, v2, average_velocity),
        );
        emit(FormulaId::Fatigue, None, formulas::fatigue(v1, v2));
    }

    emit(
        FormulaId::TechniqueRatio,
        None,
        formulas::technique_ratio(average_underwater, without_underwater),
    );

    issues.extend(checks::segment_total_time_mismatch(plan, &inputs, config));
    issues.extend(checks::non_monotonic_splits(plan, &inputs));
    issues.extend(checks::stroke_total_below_segment_sum(plan, &inputs));
    issues.extend(checks::stroke_total_above_segment_sum(plan, &inputs, config));
    issues.extend(checks::underwater_exceeds_distance(plan, &underwater));
    issues.extend(checks::underwater_distance_gap(&underwater, config));
    issues.extend(checks::velocity_imbalance(pacing, config));

    log::debug!(
        "Derived {} metrics with {} issues for {}m {}",
        metrics.len(),
        issues.len(),
        plan.distance,
        plan.course
    );

    DerivationResult { metrics, issues }
}

/// Read 25m lap times off the admitted measurements, ordered by lap.
///
/// A segment with a 25m checkpoint gives its first lap from `t25` and its second
/// from what remains of the segment time. A one-lap segment gives its own time.
pub fn lap_times(plan: &SegmentPlan, inputs: &AdmittedInputs) -> Vec<LapTime> {
    let mut laps = Vec::new();

    for segment in &plan.segments {
        let first_lap = segment.first_lap();
        let whole = inputs.segment_value(MetricKind::SegmentTime, segment.index);

        if segment.capability_flags.has_split25 {
            let Some(t25) = inputs.segment_value(MetricKind::T25, segment.index) else {
                continue;
            };
            laps.push(LapTime {
                lap: first_lap,
                seconds: t25,
                formula: FormulaId::VelocitySplit25,
            });
            if let Some(whole) = whole {
                let remainder = whole - t25;
                if segment.lap_slots() == 2 && remainder > 0.0 {
                    laps.push(LapTime {
                        lap: first_lap + 1,
                        seconds: remainder,
                        formula: FormulaId::VelocityCheckpointRemainder,
                    });
                }
            }
        } else if segment.lap_slots() == 1 {
            if let Some(whole) = whole {
                laps.push(LapTime {
                    lap: first_lap,
                    seconds: whole,
                    formula: FormulaId::VelocitySegmentTime,
                });
            }
        }
    }

    laps
}

/// Velocities of laps 1 and 2, when the test is exactly two laps long and both
/// are known. Pacing metrics are only defined in that case.
fn two_lap_velocities(plan: &SegmentPlan, velocities: &[LapVelocity]) -> Option<(f64, f64)> {
    if plan.lap_slots() != 2 {
        return None;
    }
    match velocities {
        [first, second] if first.lap == 1 && second.lap == 2 => {
            Some((first.velocity, second.velocity))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Course, DerivedKind};
    use crate::segmentation::resolve;

    fn seg(kind: MetricKind, index: u32, value: f64) -> ManualMeasurement {
        ManualMeasurement::segment(kind, index, value)
    }

    fn whole(kind: MetricKind, value: f64) -> ManualMeasurement {
        ManualMeasurement::whole_test(kind, value)
    }

    fn short_50_full() -> Vec<ManualMeasurement> {
        vec![
            seg(MetricKind::T15, 1, 6.0),
            seg(MetricKind::SegmentTime, 1, 12.5),
            seg(MetricKind::StrokeCount, 1, 17.0),
            seg(MetricKind::UnderwaterDistance, 1, 5.0),
            seg(MetricKind::T15, 2, 6.5),
            seg(MetricKind::SegmentTime, 2, 13.0),
            seg(MetricKind::StrokeCount, 2, 17.0),
            seg(MetricKind::UnderwaterDistance, 2, 4.0),
            whole(MetricKind::TotalTime, 25.5),
            whole(MetricKind::TotalStrokes, 34.0),
        ]
    }

    #[test]
    fn two_lap_velocities_from_split25() {
        let plan = resolve(50, Course::Short);
        let result = derive(&plan, &short_50_full());

        assert!(result.issues.is_empty(), "{:?}", result.issues);
        assert_eq!(result.value(DerivedKind::SegmentVelocity, Some(1)), Some(2.0));
        assert_eq!(result.value(DerivedKind::SegmentVelocity, Some(2)), Some(1.923));
        let consistency = result.value(DerivedKind::Consistency, None).unwrap();
        let fatigue = result.value(DerivedKind::Fatigue, None).unwrap();
        assert!(consistency.is_finite() && fatigue.is_finite());
        assert_eq!(consistency, 0.9608);
        assert_eq!(fatigue, 0.0385);
    }

    #[test]
    fn full_short_50_metric_set() {
        let plan = resolve(50, Course::Short);
        let result = derive(&plan, &short_50_full());

        assert_eq!(result.value(DerivedKind::AverageVelocity, None), Some(1.961));
        assert_eq!(result.value(DerivedKind::DistancePerStroke, None), Some(1.47));
        assert_eq!(result.value(DerivedKind::DistanceWithoutUnderwater, None), Some(41.0));
        assert_eq!(result.value(DerivedKind::AverageUnderwaterDistance, None), Some(4.5));
        assert_eq!(result.value(DerivedKind::Efficiency, None), Some(0.0577));
        assert_eq!(result.value(DerivedKind::TechniqueRatio, None), Some(0.1098));

        let order: Vec<DerivedKind> = result.metrics.iter().map(|m| m.metric_kind).collect();
        assert_eq!(
            order,
            vec![
                DerivedKind::SegmentVelocity,
                DerivedKind::SegmentVelocity,
                DerivedKind::AverageVelocity,
                DerivedKind::DistancePerStroke,
                DerivedKind::DistanceWithoutUnderwater,
                DerivedKind::AverageUnderwaterDistance,
                DerivedKind::Efficiency,
                DerivedKind::Consistency,
                DerivedKind::Fatigue,
                DerivedKind::TechniqueRatio,
            ]
        );
    }

    #[test]
    fn long_50_reads_second_lap_from_checkpoint() {
        let plan = resolve(50, Course::Long);
        let result = derive(
            &plan,
            &[
                seg(MetricKind::T15, 1, 6.1),
                seg(MetricKind::T25, 1, 11.8),
                seg(MetricKind::SegmentTime, 1, 25.0),
                whole(MetricKind::TotalTime, 25.0),
            ],
        );

        assert!(result.issues.is_empty(), "{:?}", result.issues);
        let v1 = result.metric(DerivedKind::SegmentVelocity, Some(1)).unwrap();
        let v2 = result.metric(DerivedKind::SegmentVelocity, Some(2)).unwrap();
        // Velocity indices count 25m laps; this plan has a single segment.
        assert_eq!(plan.segment_count(), 1);
        assert_eq!(plan.lap_slots(), 2);
        assert_eq!(v1.formula_id, FormulaId::VelocitySplit25);
        assert_eq!(v1.value, 2.119);
        assert_eq!(v2.formula_id, FormulaId::VelocityCheckpointRemainder);
        assert_eq!(v2.value, 1.894);
        assert_eq!(result.value(DerivedKind::Consistency, None), Some(0.8876));
        assert_eq!(result.value(DerivedKind::Fatigue, None), Some(0.1061));
    }

    #[test]
    fn long_50_without_segment_time_has_one_lap() {
        let plan = resolve(50, Course::Long);
        let result = derive(&plan, &[seg(MetricKind::T25, 1, 12.0)]);
        assert!(result.value(DerivedKind::SegmentVelocity, Some(1)).is_some());
        assert!(result.value(DerivedKind::SegmentVelocity, Some(2)).is_none());
        assert!(result.value(DerivedKind::Fatigue, None).is_none());
    }

    #[test]
    fn missing_total_strokes_omits_only_stroke_metrics() {
        let plan = resolve(50, Course::Short);
        let measurements: Vec<ManualMeasurement> = short_50_full()
            .into_iter()
            .filter(|m| m.metric_kind != MetricKind::TotalStrokes)
            .collect();
        let result = derive(&plan, &measurements);

        assert!(result.value(DerivedKind::DistancePerStroke, None).is_none());
        assert!(result.value(DerivedKind::Efficiency, None).is_none());
        assert!(result.value(DerivedKind::AverageVelocity, None).is_some());
        assert!(result.value(DerivedKind::TechniqueRatio, None).is_some());
        assert!(result.value(DerivedKind::Consistency, None).is_some());
    }

    #[test]
    fn total_time_mismatch_is_reported_alongside_metrics() {
        let plan = resolve(100, Course::Long);
        let ok = derive(
            &plan,
            &[
                seg(MetricKind::SegmentTime, 1, 30.0),
                seg(MetricKind::SegmentTime, 2, 30.0),
                whole(MetricKind::TotalTime, 60.0),
            ],
        );
        assert!(!ok.has_issue(IssueKind::SegmentTotalTimeMismatch));

        let off = derive(
            &plan,
            &[
                seg(MetricKind::SegmentTime, 1, 30.0),
                seg(MetricKind::SegmentTime, 2, 31.0),
                whole(MetricKind::TotalTime, 60.0),
            ],
        );
        assert!(off.has_issue(IssueKind::SegmentTotalTimeMismatch));
        assert_eq!(off.value(DerivedKind::AverageVelocity, None), Some(1.667));
    }

    #[test]
    fn fifty_meter_segments_carry_no_lap_velocity() {
        let plan = resolve(100, Course::Long);
        let result = derive(&plan, &[seg(MetricKind::SegmentTime, 1, 30.0)]);
        assert!(result
            .metrics
            .iter()
            .all(|m| m.metric_kind != DerivedKind::SegmentVelocity));
    }

    #[test]
    fn four_lap_test_has_velocities_but_no_pacing_metrics() {
        let plan = resolve(100, Course::Short);
        let measurements: Vec<ManualMeasurement> = (1..=4)
            .map(|i| seg(MetricKind::SegmentTime, i, 14.0 + i as f64 * 0.5))
            .chain([whole(MetricKind::TotalTime, 61.0)])
            .collect();
        let result = derive(&plan, &measurements);

        let velocity_count = result
            .metrics
            .iter()
            .filter(|m| m.metric_kind == DerivedKind::SegmentVelocity)
            .count();
        assert_eq!(velocity_count, 4);
        assert!(result.value(DerivedKind::Consistency, None).is_none());
        assert!(result.value(DerivedKind::Fatigue, None).is_none());
        assert!(!result.has_issue(IssueKind::SegmentTotalTimeMismatch));
    }

    #[test]
    fn imbalance_only_compares_the_two_laps_of_a_two_lap_test() {
        let plan = resolve(100, Course::Short);
        let gapped = derive(
            &plan,
            &[
                seg(MetricKind::SegmentTime, 1, 12.0),
                seg(MetricKind::SegmentTime, 3, 30.0),
            ],
        );
        assert!(!gapped.has_issue(IssueKind::VelocityImbalance));

        let filled = derive(
            &plan,
            &[
                seg(MetricKind::SegmentTime, 1, 12.0),
                seg(MetricKind::SegmentTime, 2, 14.0),
                seg(MetricKind::SegmentTime, 3, 30.0),
            ],
        );
        assert!(!filled.has_issue(IssueKind::VelocityImbalance));

        let two_laps = derive(
            &resolve(50, Course::Short),
            &[
                seg(MetricKind::SegmentTime, 1, 12.0),
                seg(MetricKind::SegmentTime, 2, 30.0),
            ],
        );
        assert!(two_laps.has_issue(IssueKind::VelocityImbalance));
    }

    #[test]
    fn overflowing_values_are_never_emitted() {
        let plan = resolve(50, Course::Short);
        let result = derive(
            &plan,
            &[
                whole(MetricKind::TotalTime, 1e-320),
                whole(MetricKind::TotalStrokes, 34.0),
            ],
        );
        assert!(result.has_issue(IssueKind::OutOfRangeMeasurement));
        assert!(result.value(DerivedKind::AverageVelocity, None).is_none());
        assert!(result.value(DerivedKind::Efficiency, None).is_none());
        assert_eq!(result.value(DerivedKind::DistancePerStroke, None), Some(1.47));
        assert!(result.metrics.iter().all(|m| m.value.is_finite()));

        let encoded = serde_json::to_string(&result.metrics).unwrap();
        assert!(!encoded.contains("null"));
    }

    #[test]
    fn unsupported_plan_yields_single_issue() {
        let plan = resolve(37, Course::Long);
        let result = derive(&plan, &[whole(MetricKind::TotalTime, 30.0)]);
        assert!(result.metrics.is_empty());
        assert_eq!(result.issues.len(), 1);
        assert!(result.is_unsupported());
    }

    #[test]
    fn bad_measurements_do_not_block_other_metrics() {
        let plan = resolve(50, Course::Short);
        let result = derive(
            &plan,
            &[
                seg(MetricKind::T25, 1, 12.0),
                whole(MetricKind::TotalTime, -1.0),
                whole(MetricKind::TotalStrokes, 36.0),
            ],
        );
        assert!(result.has_issue(IssueKind::UnexpectedMeasurement));
        assert!(result.has_issue(IssueKind::NonPositiveMeasurement));
        assert!(result.value(DerivedKind::AverageVelocity, None).is_none());
        assert_eq!(result.value(DerivedKind::DistancePerStroke, None), Some(1.39));
    }

    #[test]
    fn derivation_is_idempotent() {
        let plan = resolve(50, Course::Short);
        let measurements = short_50_full();
        let first = derive(&plan, &measurements);
        let second = derive(&resolve(50, Course::Short), &measurements);
        assert_eq!(first, second);
        for (a, b) in first.metrics.iter().zip(&second.metrics) {
            assert_eq!(a.value.to_bits(), b.value.to_bits());
        }
    }

    #[test]
    fn custom_precision_changes_emission_only() {
        let plan = resolve(50, Course::Short);
        let mut config = DerivationConfig::default();
        config.precision.velocity_decimals = 6;
        let result = derive_with(&plan, &short_50_full(), &config);
        assert_eq!(result.value(DerivedKind::SegmentVelocity, Some(2)), Some(1.923077));
        assert_eq!(result.value(DerivedKind::Fatigue, None), Some(0.0385));
    }
}
