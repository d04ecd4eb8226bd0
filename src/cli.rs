use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::conformance::{load_vectors, run_vectors};
use crate::metrics::{derive_with, DerivationConfig};
use crate::models::{Course, DerivedMetric, ManualMeasurement, ValidationIssue};
use crate::segmentation::{resolve, SegmentPlan};
use crate::settings::SettingsStore;
use crate::{log_info, log_warn};

const ENABLE_LOGS: bool = true;

/// Exit status for a distance/course pair with no segment topology.
pub const EXIT_UNSUPPORTED: i32 = 2;

#[derive(Debug, Parser)]
#[command(name = "swimcalc", version, about = "Segment plans and automatic metrics for swim tests")]
pub struct Cli {
    /// Settings file holding the derivation configuration
    #[arg(long, global = true, env = "SWIMCALC_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the segment plan for a test
    Resolve {
        #[arg(long)]
        distance: u32,
        #[arg(long)]
        course: Course,
    },
    /// Preview derived metrics for a recorded test (JSON file)
    Derive {
        #[arg(long)]
        input: PathBuf,
    },
    /// Run a conformance vector file against the engine
    Verify {
        #[arg(long)]
        vectors: PathBuf,
    },
    /// Write a settings file populated with the default configuration
    Config {
        #[arg(long)]
        write: PathBuf,
    },
}

/// One recorded test as produced by the form or an ingester.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestInput {
    pub distance: u32,
    pub course: Course,
    #[serde(default)]
    pub measurements: Vec<ManualMeasurement>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewEnvelope {
    pub computed_at: DateTime<Utc>,
    pub plan: SegmentPlan,
    pub metrics: Vec<DerivedMetric>,
    pub issues: Vec<ValidationIssue>,
}

fn load_config(path: Option<&PathBuf>) -> Result<DerivationConfig> {
    match path {
        Some(path) => SettingsStore::new(path.clone())?.derivation(),
        None => Ok(DerivationConfig::default()),
    }
}

/// Run a parsed command, writing its output to `out`. Returns the exit status.
pub fn execute(cli: Cli, out: &mut dyn Write) -> Result<i32> {
    match cli.command {
        Command::Resolve { distance, course } => {
            let plan = resolve(distance, course);
            if plan.is_empty() {
                log_warn!("{}", plan.unsupported_message());
                eprintln!("{}", plan.unsupported_message());
                return Ok(EXIT_UNSUPPORTED);
            }
            serde_json::to_writer_pretty(&mut *out, &plan)?;
            writeln!(out)?;
            Ok(0)
        }
        Command::Derive { input } => {
            let config = load_config(cli.config.as_ref())?;
            let raw = fs::read_to_string(&input)
                .with_context(|| format!("failed to read test input {}", input.display()))?;
            let test: TestInput = serde_json::from_str(&raw)
                .with_context(|| format!("invalid test input in {}", input.display()))?;

            let plan = resolve(test.distance, test.course);
            let result = derive_with(&plan, &test.measurements, &config);
            let unsupported = result.is_unsupported();
            log_info!(
                "Previewed {}m {}: {} metrics, {} issues",
                test.distance,
                test.course,
                result.metrics.len(),
                result.issues.len()
            );

            let envelope = PreviewEnvelope {
                computed_at: Utc::now(),
                plan,
                metrics: result.metrics,
                issues: result.issues,
            };
            serde_json::to_writer_pretty(&mut *out, &envelope)?;
            writeln!(out)?;
            Ok(if unsupported { EXIT_UNSUPPORTED } else { 0 })
        }
        Command::Verify { vectors } => {
            let vectors = load_vectors(&vectors)?;
            let report = run_vectors(&vectors);
            for outcome in &report.outcomes {
                let status = if outcome.passed() { "ok" } else { "FAILED" };
                writeln!(out, "{:<48} {}", outcome.name, status)?;
                for failure in &outcome.failures {
                    writeln!(out, "    {failure}")?;
                }
            }
            writeln!(out, "{}", report.summary())?;
            Ok(if report.passed() { 0 } else { 1 })
        }
        Command::Config { write } => {
            let store = SettingsStore::new(write.clone())?;
            store.update_derivation(DerivationConfig::default())?;
            log_info!("Wrote default settings to {}", write.display());
            writeln!(out, "wrote {}", write.display())?;
            Ok(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn run(args: &[&str]) -> (i32, String) {
        let cli = Cli::try_parse_from(args).unwrap();
        let mut out = Vec::new();
        let code = execute(cli, &mut out).unwrap();
        (code, String::from_utf8(out).unwrap())
    }

    #[test]
    fn parses_resolve_arguments() {
        let cli = Cli::try_parse_from(["swimcalc", "resolve", "--distance", "200", "--course", "corto"])
            .unwrap();
        match cli.command {
            Command::Resolve { distance, course } => {
                assert_eq!(distance, 200);
                assert_eq!(course, Course::Short);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_course() {
        assert!(Cli::try_parse_from(["swimcalc", "resolve", "--distance", "50", "--course", "x"]).is_err());
    }

    #[test]
    fn resolve_prints_plan_json() {
        let (code, out) = run(&["swimcalc", "resolve", "--distance", "50", "--course", "long"]);
        assert_eq!(code, 0);
        let plan: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(plan["segments"].as_array().unwrap().len(), 1);
        assert_eq!(plan["segments"][0]["capabilityFlags"]["hasSplit25"], true);
    }

    #[test]
    fn resolve_unsupported_exits_with_status() {
        let (code, out) = run(&["swimcalc", "resolve", "--distance", "37", "--course", "long"]);
        assert_eq!(code, EXIT_UNSUPPORTED);
        assert!(out.is_empty());
    }

    #[test]
    fn derive_writes_preview_envelope() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("test.json");
        fs::write(
            &input,
            r#"{
                "distance": 50,
                "course": "short",
                "measurements": [
                    {"metricKind": "segment_time", "segmentIndex": 1, "value": 12.5},
                    {"metricKind": "segment_time", "segmentIndex": 2, "value": 13.0},
                    {"metricKind": "total_time", "value": 25.5}
                ]
            }"#,
        )
        .unwrap();

        let (code, out) = run(&["swimcalc", "derive", "--input", input.to_str().unwrap()]);
        assert_eq!(code, 0);
        let envelope: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert!(envelope["computedAt"].is_string());
        assert_eq!(envelope["metrics"][0]["value"], 2.0);
        assert_eq!(envelope["issues"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn config_then_derive_uses_settings_file() {
        let dir = tempdir().unwrap();
        let settings = dir.path().join("settings.json");
        let (code, _) = run(&["swimcalc", "config", "--write", settings.to_str().unwrap()]);
        assert_eq!(code, 0);
        assert!(settings.exists());

        let input = dir.path().join("test.json");
        fs::write(&input, r#"{"distance": 37, "course": "long"}"#).unwrap();
        let (code, out) = run(&[
            "swimcalc",
            "--config",
            settings.to_str().unwrap(),
            "derive",
            "--input",
            input.to_str().unwrap(),
        ]);
        assert_eq!(code, EXIT_UNSUPPORTED);
        assert!(out.contains("unsupported_configuration"));
    }
}
