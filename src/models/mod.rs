pub mod course;
pub mod derived;
pub mod issue;
pub mod measurement;

pub use course::Course;
pub use derived::{DerivedKind, DerivedMetric, FormulaId};
pub use issue::{IssueKind, Severity, ValidationIssue};
pub use measurement::{ManualMeasurement, MetricKind};
