//! Language-agnostic conformance vectors.
//!
//! A vector names a test configuration, its manual measurements, and the exact
//! metrics and issues any implementation of the derivation rules must produce.
//! The storage-side recomputation is checked against the same files.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::log_warn;
use crate::metrics::{derive_with, DerivationConfig, DerivationResult};
use crate::models::{Course, DerivedMetric, IssueKind, ManualMeasurement};
use crate::segmentation::resolve;

const ENABLE_LOGS: bool = true;

/// Largest difference tolerated between an expected and a derived value.
pub const VALUE_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConformanceVector {
    pub name: String,
    pub distance: u32,
    pub course: Course,
    #[serde(default)]
    pub measurements: Vec<ManualMeasurement>,
    #[serde(default)]
    pub expected_metrics: Vec<DerivedMetric>,
    #[serde(default)]
    pub expected_issues: Vec<ExpectedIssue>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedIssue {
    pub kind: IssueKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment_index: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct VectorOutcome {
    pub name: String,
    pub failures: Vec<String>,
}

impl VectorOutcome {
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConformanceReport {
    pub outcomes: Vec<VectorOutcome>,
}

impl ConformanceReport {
    pub fn passed(&self) -> bool {
        self.outcomes.iter().all(VectorOutcome::passed)
    }

    pub fn failed(&self) -> impl Iterator<Item = &VectorOutcome> {
        self.outcomes.iter().filter(|o| !o.passed())
    }

    pub fn summary(&self) -> String {
        let failed = self.failed().count();
        format!(
            "{} vectors, {} passed, {} failed",
            self.outcomes.len(),
            self.outcomes.len() - failed,
            failed
        )
    }
}

pub fn load_vectors(path: &Path) -> Result<Vec<ConformanceVector>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read conformance vectors from {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("invalid conformance vectors in {}", path.display()))
}

/// Check every vector against the default configuration.
pub fn run_vectors(vectors: &[ConformanceVector]) -> ConformanceReport {
    let config = DerivationConfig::default();
    let outcomes = vectors
        .iter()
        .map(|vector| check_vector(vector, &config))
        .collect();
    ConformanceReport { outcomes }
}

pub fn check_vector(vector: &ConformanceVector, config: &DerivationConfig) -> VectorOutcome {
    let plan = resolve(vector.distance, vector.course);
    let result = derive_with(&plan, &vector.measurements, config);
    let failures = compare(vector, &result);

    for failure in &failures {
        log_warn!("Conformance vector '{}': {}", vector.name, failure);
    }

    VectorOutcome {
        name: vector.name.clone(),
        failures,
    }
}

fn compare(vector: &ConformanceVector, result: &DerivationResult) -> Vec<String> {
    let mut failures = Vec::new();

    if vector.expected_metrics.len() != result.metrics.len() {
        failures.push(format!(
            "expected {} metrics, derived {}",
            vector.expected_metrics.len(),
            result.metrics.len()
        ));
    }
    for (i, (expected, actual)) in vector
        .expected_metrics
        .iter()
        .zip(&result.metrics)
        .enumerate()
    {
        let same_slot = expected.metric_kind == actual.metric_kind
            && expected.segment_index == actual.segment_index
            && expected.formula_id == actual.formula_id;
        if !same_slot {
            failures.push(format!(
                "metric #{}: expected {}({:?}) via {}, derived {}({:?}) via {}",
                i + 1,
                expected.metric_kind.as_str(),
                expected.segment_index,
                expected.formula_id.as_str(),
                actual.metric_kind.as_str(),
                actual.segment_index,
                actual.formula_id.as_str()
            ));
        } else if (expected.value - actual.value).abs() > VALUE_TOLERANCE {
            failures.push(format!(
                "metric #{} {}: expected {}, derived {}",
                i + 1,
                expected.metric_kind.as_str(),
                expected.value,
                actual.value
            ));
        }
    }

    let actual_issues: Vec<ExpectedIssue> = result
        .issues
        .iter()
        .map(|issue| ExpectedIssue {
            kind: issue.kind,
            segment_index: issue.segment_index,
        })
        .collect();
    if actual_issues != vector.expected_issues {
        failures.push(format!(
            "expected issues {:?}, raised {:?}",
            vector.expected_issues, actual_issues
        ));
    }

    failures
}
