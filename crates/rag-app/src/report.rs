//! Outcomes and reports handed to front ends.

use rag_detect::{DeadlockCycle, DeadlockNotice, Explanation, explain};
use rag_graph::{AllocationSummary, ResourceGraph};
use serde::Serialize;

use crate::error::AppResult;
use crate::scenario::Step;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Success,
    Warning,
    Error,
}

/// User-facing result of one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    pub severity: Severity,
    pub message: String,
}

impl StepOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.severity == Severity::Success
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    /// 1-based position in the scenario.
    pub index: usize,
    pub step: Step,
    pub outcome: StepOutcome,
    /// Present when this step started a new deadlock episode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<DeadlockNotice>,
}

/// Deadlock status of a graph at one moment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectionReport {
    pub deadlock: Option<DeadlockCycle>,
    pub explanation: Option<Explanation>,
}

impl DetectionReport {
    pub fn from_graph(graph: &ResourceGraph) -> Self {
        let deadlock = rag_detect::detect_deadlock(graph);
        let explanation = deadlock.as_ref().map(explain);
        Self {
            deadlock,
            explanation,
        }
    }

    pub fn is_deadlocked(&self) -> bool {
        self.deadlock.is_some()
    }
}

/// Everything a scenario run produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub steps: Vec<StepReport>,
    pub detection: DetectionReport,
    pub summary: AllocationSummary,
}

impl RunReport {
    /// Deadlock notices raised during the run, in order.
    pub fn notices(&self) -> impl Iterator<Item = &DeadlockNotice> + '_ {
        self.steps.iter().filter_map(|s| s.notice.as_ref())
    }
}

/// Pretty-printed JSON for any report.
pub fn to_json<T: Serialize>(value: &T) -> AppResult<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
