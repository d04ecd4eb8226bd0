//! Segment topology and automatic metrics for manually timed swim tests.
//!
//! [`resolve`] turns a (distance, course) pair into a [`SegmentPlan`];
//! [`derive`] turns a plan plus manual measurements into derived metrics and
//! validation issues. Both are pure and may be called from any number of
//! threads, for a live preview or right before persisting.

pub mod cli;
pub mod conformance;
pub mod metrics;
pub mod models;
pub mod segmentation;
pub mod settings;
mod utils;

use clap::Parser;

pub use metrics::{derive, derive_with, DerivationConfig, DerivationResult};
pub use models::{
    Course, DerivedKind, DerivedMetric, FormulaId, IssueKind, ManualMeasurement, MetricKind,
    Severity, ValidationIssue,
};
pub use segmentation::{resolve, CapabilityFlags, Segment, SegmentPlan};

pub fn run() {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = cli::Cli::parse();
    let mut stdout = std::io::stdout().lock();

    match cli::execute(cli, &mut stdout) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("Error: {err:#}");
            std::process::exit(1);
        }
    }
}
