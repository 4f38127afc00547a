//! Shared application service layer for the resource allocation simulator.
//!
//! Front ends load a scenario, drive a [`Session`] step by step (or run the
//! whole scenario at once), and render the resulting reports. A [`Poller`]
//! provides the periodic background scan over a shared graph.

pub mod error;
pub mod poller;
pub mod report;
pub mod scenario;
pub mod session;

pub use error::{AppError, AppResult};
pub use poller::Poller;
pub use report::{DetectionReport, RunReport, Severity, StepOutcome, StepReport, to_json};
pub use scenario::{
    DEFAULT_POLL_INTERVAL_MS, InstanceCount, MonitorConfig, ResourceDef, Scenario, Step,
    load_scenario, parse_scenario, validate_scenario,
};
pub use session::Session;
