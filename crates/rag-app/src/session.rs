//! A graph plus its deadlock monitor, driven one step at a time.

use rag_detect::{DeadlockCycle, DeadlockMonitor, DeadlockNotice, DetectDeadlock};
use rag_graph::{AllocationSummary, GraphError, ResourceGraph, check_invariants};
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::report::{DetectionReport, RunReport, StepOutcome, StepReport};
use crate::scenario::{Scenario, Step, capacity_of, validate_scenario};

/// Interactive-style session over one graph.
///
/// Every applied step is followed by a monitor scan, so a deadlock shows up
/// once when it forms and again only after it has cleared and re-formed.
#[derive(Debug, Default)]
pub struct Session {
    graph: ResourceGraph,
    monitor: DeadlockMonitor,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn graph(&self) -> &ResourceGraph {
        &self.graph
    }

    pub fn monitor(&self) -> &DeadlockMonitor {
        &self.monitor
    }

    /// Register the scenario's declared processes and resources.
    pub fn declare(&mut self, scenario: &Scenario) -> AppResult<()> {
        for name in &scenario.processes {
            self.graph.try_add_process(name.trim())?;
        }
        for def in &scenario.resources {
            let capacity = capacity_of(def.instances.as_ref())?;
            self.graph.try_add_resource(def.name.trim(), capacity)?;
        }
        Ok(())
    }

    /// Apply one step and report what happened.
    pub fn apply(&mut self, step: &Step) -> StepOutcome {
        let outcome = match step {
            Step::AddProcess { name } => {
                let name = name.trim();
                if name.is_empty() {
                    return self.finish(step, StepOutcome::warning("Process name is blank."));
                }
                match self.graph.try_add_process(name) {
                    Ok(_) => StepOutcome::success(format!("Process {name} added.")),
                    Err(err) => StepOutcome::warning(err.to_string()),
                }
            }
            Step::AddResource { name, instances } => {
                let name = name.trim();
                if name.is_empty() {
                    return self.finish(step, StepOutcome::warning("Resource name is blank."));
                }
                match capacity_of(instances.as_ref()) {
                    Err(_) => StepOutcome::error(
                        "Please enter a valid positive number for instance count.",
                    ),
                    Ok(capacity) => match self.graph.try_add_resource(name, capacity) {
                        Ok(_) => StepOutcome::success(format!(
                            "Resource {name} with {capacity} instance(s) added."
                        )),
                        Err(err) => StepOutcome::warning(err.to_string()),
                    },
                }
            }
            Step::Request { process, resource } => {
                let (process, resource) = (process.trim(), resource.trim());
                let already = self.graph.has_request(process, resource);
                self.graph.request(process, resource);
                if already {
                    StepOutcome::success(format!(
                        "Process {process} is already waiting for Resource {resource}."
                    ))
                } else if self.graph.has_request(process, resource) {
                    StepOutcome::success(format!(
                        "Process {process} requested Resource {resource}."
                    ))
                } else {
                    StepOutcome::warning(format!(
                        "Request of {resource} by {process} had no effect."
                    ))
                }
            }
            Step::Allocate { process, resource } => {
                let (process, resource) = (process.trim(), resource.trim());
                match self.graph.try_allocate(process, resource) {
                    Ok(()) => StepOutcome::success(format!(
                        "Resource {resource} allocated to Process {process}."
                    )),
                    Err(err @ GraphError::CapacityExhausted { .. }) => {
                        StepOutcome::error(err.to_string())
                    }
                    Err(err) => StepOutcome::warning(err.to_string()),
                }
            }
            Step::Release { process, resource } => {
                let (process, resource) = (process.trim(), resource.trim());
                if self.graph.release(process, resource) {
                    StepOutcome::success(format!(
                        "Resource {resource} released from Process {process}."
                    ))
                } else {
                    StepOutcome::warning(format!(
                        "Process {process} holds no instance of Resource {resource}."
                    ))
                }
            }
            Step::Detect => match self.graph.detect_deadlock() {
                Some(cycle) => StepOutcome::error(format!("Deadlock found: {cycle}")),
                None => StepOutcome::success("No deadlock detected."),
            },
            Step::Reset => {
                self.graph.reset();
                self.monitor.reset();
                StepOutcome::success("The simulator has been reset.")
            }
        };
        self.finish(step, outcome)
    }

    fn finish(&self, step: &Step, outcome: StepOutcome) -> StepOutcome {
        debug_assert!(
            check_invariants(&self.graph).is_ok(),
            "{:?}",
            check_invariants(&self.graph)
        );
        debug!(?step, message = %outcome.message, "step applied");
        outcome
    }

    /// Apply a step, then scan for a newly formed deadlock.
    pub fn apply_and_scan(&mut self, step: &Step) -> (StepOutcome, Option<DeadlockNotice>) {
        let outcome = self.apply(step);
        let notice = self.monitor.scan(&self.graph);
        (outcome, notice)
    }

    pub fn detect(&self) -> Option<DeadlockCycle> {
        self.graph.detect_deadlock()
    }

    pub fn summary(&self) -> AllocationSummary {
        AllocationSummary::from_graph(&self.graph)
    }

    /// Validate, declare and step through a whole scenario.
    pub fn run(scenario: &Scenario) -> AppResult<RunReport> {
        validate_scenario(scenario)?;
        let mut session = Session::new();
        session
            .declare(scenario)
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let mut steps = Vec::with_capacity(scenario.steps.len());
        for (i, step) in scenario.steps.iter().enumerate() {
            let (outcome, notice) = session.apply_and_scan(step);
            if let Some(notice) = &notice {
                info!(step = i + 1, episode = notice.episode, "deadlock episode started");
            }
            steps.push(StepReport {
                index: i + 1,
                step: step.clone(),
                outcome,
                notice,
            });
        }

        info!(
            steps = steps.len(),
            episodes = session.monitor.episodes(),
            "scenario finished"
        );
        Ok(RunReport {
            name: scenario.name.clone(),
            steps,
            detection: DetectionReport::from_graph(&session.graph),
            summary: session.summary(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Severity;
    use crate::scenario::InstanceCount;

    fn step_request(p: &str, r: &str) -> Step {
        Step::Request {
            process: p.into(),
            resource: r.into(),
        }
    }

    fn step_allocate(p: &str, r: &str) -> Step {
        Step::Allocate {
            process: p.into(),
            resource: r.into(),
        }
    }

    #[test]
    fn duplicate_add_is_a_warning() {
        let mut session = Session::new();
        let add = Step::AddProcess { name: "P1".into() };
        assert!(session.apply(&add).is_success());
        assert_eq!(session.apply(&add).severity, Severity::Warning);
    }

    #[test]
    fn blank_process_name_adds_nothing() {
        let mut session = Session::new();
        let outcome = session.apply(&Step::AddProcess { name: "   ".into() });
        assert_eq!(outcome.severity, Severity::Warning);
        assert!(session.graph().is_empty());
        assert!(session.graph().node("").is_none());
    }

    #[test]
    fn blank_resource_name_adds_nothing() {
        let mut session = Session::new();
        let outcome = session.apply(&Step::AddResource {
            name: "\t ".into(),
            instances: Some(InstanceCount::Number(2)),
        });
        assert_eq!(outcome.severity, Severity::Warning);
        assert!(session.graph().is_empty());
    }

    #[test]
    fn bad_instance_count_is_rejected_without_creating_node() {
        let mut session = Session::new();
        let outcome = session.apply(&Step::AddResource {
            name: "R1".into(),
            instances: Some(InstanceCount::Text("many".into())),
        });
        assert_eq!(outcome.severity, Severity::Error);
        assert!(session.graph().is_empty());

        let outcome = session.apply(&Step::AddResource {
            name: "R1".into(),
            instances: Some(InstanceCount::Text(String::new())),
        });
        assert_eq!(outcome.message, "Resource R1 with 1 instance(s) added.");
    }

    #[test]
    fn exhausted_allocation_is_an_error() {
        let mut session = Session::new();
        session.apply(&Step::AddProcess { name: "P1".into() });
        session.apply(&Step::AddProcess { name: "P2".into() });
        session.apply(&Step::AddResource {
            name: "R1".into(),
            instances: None,
        });
        session.apply(&step_request("P1", "R1"));
        session.apply(&step_request("P2", "R1"));
        assert!(session.apply(&step_allocate("P1", "R1")).is_success());

        let outcome = session.apply(&step_allocate("P2", "R1"));
        assert_eq!(outcome.severity, Severity::Error);
        assert!(outcome.message.contains("fully allocated"));

        let outcome = session.apply(&step_request("P9", "R1"));
        assert_eq!(outcome.severity, Severity::Warning);
    }

    #[test]
    fn reset_clears_graph_and_monitor() {
        let scenario = crate::parse_scenario(
            r#"
processes: [P1, P2]
resources: [{name: R1}, {name: R2}]
"#,
        )
        .unwrap();
        let mut session = Session::new();
        session.declare(&scenario).unwrap();
        for step in [
            step_request("P1", "R1"),
            step_allocate("P1", "R1"),
            step_request("P2", "R2"),
            step_allocate("P2", "R2"),
            step_request("P1", "R2"),
        ] {
            assert!(session.apply_and_scan(&step).1.is_none());
        }
        let (_, notice) = session.apply_and_scan(&step_request("P2", "R1"));
        assert_eq!(notice.unwrap().episode, 1);

        let (outcome, notice) = session.apply_and_scan(&Step::Reset);
        assert!(outcome.is_success());
        assert!(notice.is_none());
        assert!(session.graph().is_empty());
        assert!(session.detect().is_none());
    }
}
