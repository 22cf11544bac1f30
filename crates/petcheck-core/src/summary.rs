//! Run summary: per-scenario outcomes aggregated per suite
//!
//! This is the interchange format of `petcheck run --output json`.
//! `generate_schema` exports its JSON Schema.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::report::Report;

/// Outcome class of one scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioStatus {
    /// Every check passed
    Pass,
    /// At least one mismatch
    Fail,
    /// The scenario could not run to completion (transport, schema lookup)
    Error,
}

impl std::fmt::Display for ScenarioStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
            Self::Error => "ERROR",
        })
    }
}

/// Result of one scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScenarioOutcome {
    /// Scenario name, e.g. "add pet"
    pub name: String,
    pub status: ScenarioStatus,
    /// Compiled report, or the error message
    pub detail: String,
    /// Mismatches behind a failure (empty on pass and error)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mismatches: Vec<crate::mismatch::Mismatch>,
    /// Wall time in seconds
    pub duration_secs: f64,
}

impl ScenarioOutcome {
    #[must_use]
    pub fn from_report(name: &str, report: Report, duration_secs: f64) -> Self {
        let status = if report.is_pass() {
            ScenarioStatus::Pass
        } else {
            ScenarioStatus::Fail
        };
        Self {
            name: name.to_string(),
            status,
            detail: report.compile(),
            mismatches: report.mismatches,
            duration_secs,
        }
    }

    #[must_use]
    pub fn from_error(name: &str, error: &dyn std::error::Error, duration_secs: f64) -> Self {
        Self {
            name: name.to_string(),
            status: ScenarioStatus::Error,
            detail: error.to_string(),
            mismatches: Vec::new(),
            duration_secs,
        }
    }
}

/// All scenarios of one suite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SuiteOutcome {
    /// Suite name: "pet", "store", "user"
    pub suite: String,
    pub scenarios: Vec<ScenarioOutcome>,
    /// Request log written for this suite, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<String>,
}

impl SuiteOutcome {
    #[must_use]
    pub fn count(&self, status: ScenarioStatus) -> usize {
        self.scenarios.iter().filter(|s| s.status == status).count()
    }
}

/// Top-level output of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RunSummary {
    pub base_url: String,
    pub suites: Vec<SuiteOutcome>,
}

impl RunSummary {
    #[must_use]
    pub fn total(&self) -> usize {
        self.suites.iter().map(|s| s.scenarios.len()).sum()
    }

    #[must_use]
    pub fn count(&self, status: ScenarioStatus) -> usize {
        self.suites.iter().map(|s| s.count(status)).sum()
    }

    /// 0 = all passed, 1 = any failure, 3 = errors only or nothing ran.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        if self.count(ScenarioStatus::Fail) > 0 {
            return 1;
        }
        if self.count(ScenarioStatus::Error) > 0 || self.total() == 0 {
            return 3;
        }
        0
    }
}

/// Generate JSON Schema for the run summary.
#[must_use]
pub fn generate_schema() -> String {
    let schema = schemars::schema_for!(RunSummary);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}
