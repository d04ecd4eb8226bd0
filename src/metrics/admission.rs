use std::collections::BTreeMap;

use crate::metrics::config::DerivationConfig;
use crate::models::{IssueKind, ManualMeasurement, MetricKind, ValidationIssue};
use crate::segmentation::SegmentPlan;

/// Measurements that passed admission, keyed by kind and segment.
///
/// Iteration is ordered by segment index so that sums over a series are
/// accumulated in the same order on every call.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct AdmittedInputs {
    values: BTreeMap<(MetricKind, Option<u32>), f64>,
}

impl AdmittedInputs {
    pub fn segment_value(&self, kind: MetricKind, segment_index: u32) -> Option<f64> {
        self.values.get(&(kind, Some(segment_index))).copied()
    }

    pub fn whole_test(&self, kind: MetricKind) -> Option<f64> {
        self.values.get(&(kind, None)).copied()
    }

    /// Per-segment values of one kind, by ascending segment index.
    pub fn series(&self, kind: MetricKind) -> Vec<(u32, f64)> {
        self.values
            .range((kind, None)..)
            .take_while(|((k, _), _)| *k == kind)
            .filter_map(|((_, index), value)| index.map(|i| (i, *value)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Screen measurements against the plan, in input order.
///
/// Anything that raises an error here is left out of the formulas. Values
/// outside the plausibility limits only raise a warning and are kept.
pub fn admit(
    plan: &SegmentPlan,
    measurements: &[ManualMeasurement],
    config: &DerivationConfig,
    issues: &mut Vec<ValidationIssue>,
) -> AdmittedInputs {
    let mut admitted = AdmittedInputs::default();

    for m in measurements {
        let kind = m.metric_kind;

        if !m.value.is_finite() || m.value <= 0.0 {
            issues.push(
                ValidationIssue::new(
                    IssueKind::NonPositiveMeasurement,
                    format!("{} must be a positive number, got {}", kind.as_str(), m.value),
                )
                .at_segment(m.segment_index)
                .for_metric(kind),
            );
            continue;
        }

        if let Some(issue) = placement_issue(plan, m) {
            issues.push(issue);
            continue;
        }

        let key = (kind, m.segment_index);
        if admitted.values.contains_key(&key) {
            issues.push(
                ValidationIssue::new(
                    IssueKind::DuplicateMeasurement,
                    format!("{} was recorded more than once; the first value is used", describe(m)),
                )
                .at_segment(m.segment_index)
                .for_metric(kind),
            );
            continue;
        }

        let range = config.limits.for_kind(kind);
        if !range.contains(m.value) {
            issues.push(
                ValidationIssue::new(
                    IssueKind::OutOfRangeMeasurement,
                    format!(
                        "{} = {}{} is outside the expected range {}-{}",
                        describe(m),
                        m.value,
                        kind.unit(),
                        range.min,
                        range.max
                    ),
                )
                .at_segment(m.segment_index)
                .for_metric(kind),
            );
        }

        admitted.values.insert(key, m.value);
    }

    admitted
}

fn placement_issue(plan: &SegmentPlan, m: &ManualMeasurement) -> Option<ValidationIssue> {
    let kind = m.metric_kind;
    let message = match (kind.is_whole_test(), m.segment_index) {
        (true, None) => return None,
        (true, Some(index)) => format!(
            "{} applies to the whole test and cannot be attached to segment {}",
            kind.as_str(),
            index
        ),
        (false, None) => {
            return Some(
                ValidationIssue::new(
                    IssueKind::MissingSegmentIndex,
                    format!("{} needs a segment index", kind.as_str()),
                )
                .for_metric(kind),
            );
        }
        (false, Some(index)) => match plan.segment(index) {
            None => format!(
                "unexpected measurement for segment {}: the plan has {} segments",
                index,
                plan.segment_count()
            ),
            Some(segment) if !segment.capability_flags.allows(kind) => format!(
                "unexpected measurement for segment {} ({}): {} is not recorded there",
                index,
                segment.label,
                kind.as_str()
            ),
            Some(_) => return None,
        },
    };

    Some(
        ValidationIssue::new(IssueKind::UnexpectedMeasurement, message)
            .at_segment(m.segment_index)
            .for_metric(kind),
    )
}

fn describe(m: &ManualMeasurement) -> String {
    match m.segment_index {
        Some(index) => format!("{}({})", m.metric_kind.as_str(), index),
        None => m.metric_kind.as_str().to_string(),
    }
}
