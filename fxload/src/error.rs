use crate::driver::DriverError;
use fxload_core::ConfigError;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinError;

/// Failures that stop the whole run. Individual request failures never surface here.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("unable to create request driver: {0}")]
    Driver(#[from] DriverError),

    #[error("{scenario}: workers did not finish within {timeout:?}")]
    JoinTimeout { scenario: String, timeout: Duration },

    #[error("{scenario}: worker failed: {source}")]
    WorkerPanicked { scenario: String, source: JoinError },
}
