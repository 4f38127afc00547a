//! Scenario files: initial processes and resources plus a list of steps.
//!
//! ```yaml
//! name: crossed waits
//! monitor:
//!   poll_interval_ms: 5000
//! processes: [P1, P2]
//! resources:
//!   - name: R1
//!   - name: R2
//!     instances: 2
//! steps:
//!   - op: request
//!     process: P1
//!     resource: R1
//!   - op: allocate
//!     process: P1
//!     resource: R1
//!   - op: detect
//! ```

use std::fmt;
use std::path::Path;
use std::time::Duration;

use rag_graph::{Capacity, GraphResult};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Polling period used when a scenario does not set one.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5_000;

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct Scenario {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub processes: Vec<String>,
    #[serde(default)]
    pub resources: Vec<ResourceDef>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MonitorConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl MonitorConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ResourceDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instances: Option<InstanceCount>,
}

/// Instance count as written: a number, or free text from a form field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum InstanceCount {
    Number(i64),
    Text(String),
}

impl InstanceCount {
    pub fn capacity(&self) -> GraphResult<Capacity> {
        match self {
            InstanceCount::Number(n) => Capacity::try_from(*n),
            InstanceCount::Text(text) => text.parse(),
        }
    }
}

/// Capacity for an optional count; absent means one instance.
pub fn capacity_of(instances: Option<&InstanceCount>) -> GraphResult<Capacity> {
    instances.map_or(Ok(Capacity::default()), InstanceCount::capacity)
}

/// One operation against the graph.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    AddProcess {
        name: String,
    },
    AddResource {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        instances: Option<InstanceCount>,
    },
    Request {
        process: String,
        resource: String,
    },
    Allocate {
        process: String,
        resource: String,
    },
    Release {
        process: String,
        resource: String,
    },
    Detect,
    Reset,
}

impl Step {
    /// Node names this step refers to.
    pub fn names(&self) -> Vec<&str> {
        match self {
            Step::AddProcess { name } | Step::AddResource { name, .. } => vec![name.as_str()],
            Step::Request { process, resource }
            | Step::Allocate { process, resource }
            | Step::Release { process, resource } => vec![process.as_str(), resource.as_str()],
            Step::Detect | Step::Reset => Vec::new(),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::AddProcess { name } => write!(f, "add process {name}"),
            Step::AddResource { name, instances } => match instances {
                Some(InstanceCount::Number(n)) => write!(f, "add resource {name} x{n}"),
                Some(InstanceCount::Text(t)) => write!(f, "add resource {name} x'{t}'"),
                None => write!(f, "add resource {name}"),
            },
            Step::Request { process, resource } => write!(f, "request {process} -> {resource}"),
            Step::Allocate { process, resource } => {
                write!(f, "allocate {resource} -> {process}")
            }
            Step::Release { process, resource } => write!(f, "release {resource} from {process}"),
            Step::Detect => f.write_str("detect"),
            Step::Reset => f.write_str("reset"),
        }
    }
}

/// Parse a scenario from YAML text.
pub fn parse_scenario(text: &str) -> AppResult<Scenario> {
    Ok(serde_yaml::from_str(text)?)
}

/// Load and validate a scenario file.
pub fn load_scenario(path: &Path) -> AppResult<Scenario> {
    let content = std::fs::read_to_string(path).map_err(|e| AppError::ScenarioRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let scenario = parse_scenario(&content)?;
    validate_scenario(&scenario)?;
    Ok(scenario)
}

/// Reject scenarios that could never be applied as written.
///
/// Instance counts inside `add_resource` steps are left for the session to
/// report, the way a form reports a bad field without aborting.
pub fn validate_scenario(scenario: &Scenario) -> AppResult<()> {
    if scenario.monitor.poll_interval_ms == 0 {
        return Err(AppError::Validation(
            "monitor.poll_interval_ms must be positive".to_string(),
        ));
    }

    let declared = scenario
        .processes
        .iter()
        .chain(scenario.resources.iter().map(|r| &r.name));
    for name in declared {
        if name.trim().is_empty() {
            return Err(AppError::Validation(
                "process and resource names must not be blank".to_string(),
            ));
        }
    }

    for resource in &scenario.resources {
        capacity_of(resource.instances.as_ref()).map_err(|e| {
            AppError::Validation(format!("resource '{}': {}", resource.name, e))
        })?;
    }

    for (i, step) in scenario.steps.iter().enumerate() {
        if step.names().iter().any(|n| n.trim().is_empty()) {
            return Err(AppError::Validation(format!(
                "step {} names a blank process or resource",
                i + 1
            )));
        }
    }

    Ok(())
}
