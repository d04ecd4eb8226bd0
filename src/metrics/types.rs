use serde::{Deserialize, Serialize};

use crate::models::{DerivedKind, DerivedMetric, FormulaId, IssueKind, ValidationIssue};

/// Time over one 25m lap and the rule it was read with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LapTime {
    pub lap: u32,
    pub seconds: f64,
    pub formula: FormulaId,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LapVelocity {
    pub lap: u32,
    pub velocity: f64,
    pub formula: FormulaId,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DerivationResult {
    pub metrics: Vec<DerivedMetric>,
    pub issues: Vec<ValidationIssue>,
}

impl DerivationResult {
    pub fn metric(&self, kind: DerivedKind, segment_index: Option<u32>) -> Option<&DerivedMetric> {
        self.metrics
            .iter()
            .find(|m| m.metric_kind == kind && m.segment_index == segment_index)
    }

    pub fn value(&self, kind: DerivedKind, segment_index: Option<u32>) -> Option<f64> {
        self.metric(kind, segment_index).map(|m| m.value)
    }

    pub fn has_issue(&self, kind: IssueKind) -> bool {
        self.issues.iter().any(|i| i.kind == kind)
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(ValidationIssue::is_error)
    }

    pub fn is_unsupported(&self) -> bool {
        self.has_issue(IssueKind::UnsupportedConfiguration)
    }
}
