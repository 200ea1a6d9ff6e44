#![doc = include_str!("../README.md")]

pub mod driver;
mod error;
pub mod harness;
pub mod report;
pub mod scenario;
pub mod sink;
pub(crate) mod worker;
pub mod workload;

pub use driver::{DriverError, Exchange, HttpDriver, RequestDriver};
pub use error::HarnessError;
pub use harness::{Harness, RunOutcome};
pub use report::{Report, ReportRow};
pub use scenario::run_scenario;

pub mod prelude {
    pub use crate::{Harness, HarnessError, Report, RequestDriver};
    pub use fxload_core::{HarnessConfig, ScenarioConfig, ScenarioKind, ScenarioResult, SlaVerdict};
}
