use crate::constants::*;
use crate::sla::SlaThresholds;
use crate::template::{TemplatePaths, Templates};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSeconds};
use std::env;
use std::fmt;
use std::fs;
use std::num::{NonZeroU32, NonZeroUsize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
#[allow(unused)]
use tracing::{debug, info, warn};
use url::Url;

/// The traffic patterns the harness knows how to run, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioKind {
    Baseline,
    Load,
    Spike,
    Soak,
    Stress,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 5] = [
        ScenarioKind::Baseline,
        ScenarioKind::Load,
        ScenarioKind::Spike,
        ScenarioKind::Soak,
        ScenarioKind::Stress,
    ];

    /// Display name used in logs and the report.
    pub fn name(self) -> &'static str {
        match self {
            ScenarioKind::Baseline => "Baseline Test",
            ScenarioKind::Load => "Load Test",
            ScenarioKind::Spike => "Spike Test",
            ScenarioKind::Soak => "Soak Test",
            ScenarioKind::Stress => "Stress Test",
        }
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Immutable configuration for a single scenario run.
#[derive(Clone, Debug, PartialEq)]
pub struct ScenarioConfig {
    pub name: String,
    pub concurrency: NonZeroUsize,
    pub iterations_per_worker: NonZeroU32,
    /// When set the scenario is bounded by wall-clock time and
    /// `iterations_per_worker` is ignored.
    pub duration: Option<Duration>,
}

impl ScenarioConfig {
    pub fn new(name: &str, concurrency: NonZeroUsize, iterations_per_worker: NonZeroU32) -> Self {
        Self {
            name: name.to_string(),
            concurrency,
            iterations_per_worker,
            duration: None,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn mode(&self) -> RunMode {
        match self.duration {
            Some(duration) => RunMode::Duration(duration),
            None => RunMode::Iterations(self.iterations_per_worker),
        }
    }
}

/// How long each worker of a scenario keeps going.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunMode {
    Iterations(NonZeroU32),
    Duration(Duration),
}

/// On-disk shape of one scenario's settings.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioSettings {
    pub concurrency: NonZeroUsize,
    pub iterations_per_worker: NonZeroU32,
    #[serde_as(as = "Option<DurationSeconds<u64>>")]
    #[serde(default, rename = "duration_seconds", skip_serializing_if = "Option::is_none")]
    pub duration: Option<Duration>,
}

impl ScenarioSettings {
    const fn iterations(concurrency: usize, iterations_per_worker: u32) -> Self {
        Self {
            concurrency: nz_usize(concurrency),
            iterations_per_worker: nz_u32(iterations_per_worker),
            duration: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScenarioPlan {
    pub baseline: ScenarioSettings,
    pub load: ScenarioSettings,
    pub spike: ScenarioSettings,
    pub soak: ScenarioSettings,
    pub stress: ScenarioSettings,
}

impl Default for ScenarioPlan {
    fn default() -> Self {
        Self {
            baseline: ScenarioSettings::iterations(2, 5),
            load: ScenarioSettings::iterations(10, 20),
            spike: ScenarioSettings::iterations(50, 10),
            soak: ScenarioSettings {
                duration: Some(Duration::from_secs(120)),
                ..ScenarioSettings::iterations(5, 5)
            },
            stress: ScenarioSettings::iterations(100, 20),
        }
    }
}

impl ScenarioPlan {
    pub fn settings(&self, kind: ScenarioKind) -> &ScenarioSettings {
        match kind {
            ScenarioKind::Baseline => &self.baseline,
            ScenarioKind::Load => &self.load,
            ScenarioKind::Spike => &self.spike,
            ScenarioKind::Soak => &self.soak,
            ScenarioKind::Stress => &self.stress,
        }
    }
}

#[serde_as]
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Timeouts {
    /// Upper bound on waiting for the workers of an iteration-bound scenario.
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(rename = "join_timeout_seconds")]
    pub join: Duration,
    /// Added to the configured duration of a duration-bound scenario.
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(rename = "soak_grace_seconds")]
    pub soak_grace: Duration,
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(rename = "request_timeout_seconds")]
    pub request: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            join: DEFAULT_JOIN_TIMEOUT,
            soak_grace: DEFAULT_SOAK_GRACE,
            request: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl Timeouts {
    /// How long the runner waits for all workers of `config` before giving up.
    pub fn join_timeout(&self, config: &ScenarioConfig) -> Duration {
        match config.mode() {
            RunMode::Iterations(_) => self.join,
            RunMode::Duration(duration) => duration + self.soak_grace,
        }
    }
}

/// Harness configuration, read once at startup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    pub base_url: String,
    pub scenarios: ScenarioPlan,
    pub sla: SlaThresholds,
    pub timeouts: Timeouts,
    pub templates: TemplatePaths,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            scenarios: ScenarioPlan::default(),
            sla: SlaThresholds::default(),
            timeouts: Timeouts::default(),
            templates: TemplatePaths::default(),
        }
    }
}

impl HarnessConfig {
    /// Loads the configuration file.
    ///
    /// An explicit `path` (or one named by `FXLOAD_CONFIG`) must exist. When neither is given
    /// and `fxload.toml` is absent from the working directory the built-in defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (resolved, explicit) = resolve_path(path);
        if !explicit && !resolved.exists() {
            debug!("No {} found, using defaults", resolved.display());
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        }

        info!("Loading configuration from {}", resolved.display());
        let content = fs::read_to_string(&resolved)
            .map_err(|err| ConfigError::Io(format!("{}: {err}", resolved.display())))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_base_url(&self.base_url)?;
        self.sla.validate()?;

        for kind in ScenarioKind::ALL {
            if let Some(duration) = self.scenarios.settings(kind).duration {
                if duration.is_zero() {
                    return Err(ConfigError::Invalid(format!(
                        "{kind}: duration_seconds must be positive"
                    )));
                }
            }
        }

        if self.timeouts.join.is_zero() {
            return Err(ConfigError::Invalid(
                "join_timeout_seconds must be positive".to_string(),
            ));
        }
        if self.timeouts.soak_grace.is_zero() {
            return Err(ConfigError::Invalid(
                "soak_grace_seconds must be positive".to_string(),
            ));
        }
        if self.timeouts.request.is_zero() {
            return Err(ConfigError::Invalid(
                "request_timeout_seconds must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Reads and checks the payload templates named by the configuration.
    pub fn templates(&self) -> Result<Templates, ConfigError> {
        self.templates.resolve()
    }

    pub fn scenario(&self, kind: ScenarioKind) -> ScenarioConfig {
        let settings = self.scenarios.settings(kind);
        let config = ScenarioConfig::new(
            kind.name(),
            settings.concurrency,
            settings.iterations_per_worker,
        );
        match settings.duration {
            Some(duration) => config.with_duration(duration),
            None => config,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(String),

    #[error("config parse error: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

fn resolve_path(path: Option<&Path>) -> (PathBuf, bool) {
    if let Some(path) = path {
        return (path.to_path_buf(), true);
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        return (PathBuf::from(env_path), true);
    }
    (PathBuf::from(DEFAULT_CONFIG_NAME), false)
}

pub(crate) fn validate_base_url(base_url: &str) -> Result<(), ConfigError> {
    let url = Url::parse(base_url)
        .map_err(|err| ConfigError::Invalid(format!("base_url {base_url:?}: {err}")))?;
    match url.scheme() {
        "http" | "https" if !url.cannot_be_a_base() => Ok(()),
        scheme => Err(ConfigError::Invalid(format!(
            "base_url must be an http(s) URL, found scheme {scheme:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_canonical_plan() {
        let config = HarnessConfig::default();
        assert!(config.validate().is_ok());

        let soak = config.scenario(ScenarioKind::Soak);
        assert_eq!(soak.name, "Soak Test");
        assert_eq!(soak.concurrency.get(), 5);
        assert_eq!(soak.mode(), RunMode::Duration(Duration::from_secs(120)));

        let stress = config.scenario(ScenarioKind::Stress);
        assert_eq!(stress.concurrency.get(), 100);
        assert_eq!(stress.mode(), RunMode::Iterations(NonZeroU32::new(20).unwrap()));
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let config = HarnessConfig::from_toml(
            r#"
            base_url = "http://127.0.0.1:9000/api"

            [scenarios.load]
            concurrency = 4
            iterations_per_worker = 3

            [scenarios.soak]
            concurrency = 2
            iterations_per_worker = 1
            duration_seconds = 2

            [sla]
            max_p95_latency_ms = 100
            "#,
        )
        .unwrap();

        assert_eq!(config.base_url, "http://127.0.0.1:9000/api");
        assert_eq!(config.scenarios.load.concurrency.get(), 4);
        assert_eq!(config.scenarios.soak.duration, Some(Duration::from_secs(2)));
        assert_eq!(config.scenarios.baseline, ScenarioPlan::default().baseline);
        assert_eq!(config.sla.max_p95_latency_ms, 100);
        assert_eq!(config.sla.max_error_rate, DEFAULT_SLA_MAX_ERROR_RATE);
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let err = HarnessConfig::from_toml(
            r#"
            [scenarios.spike]
            concurrency = 0
            iterations_per_worker = 10
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn zero_duration_is_rejected() {
        let err = HarnessConfig::from_toml(
            r#"
            [scenarios.soak]
            concurrency = 1
            iterations_per_worker = 1
            duration_seconds = 0
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn zero_soak_grace_is_rejected() {
        let err = HarnessConfig::from_toml(
            r#"
            [scenarios.soak]
            concurrency = 1
            iterations_per_worker = 1
            duration_seconds = 1

            [timeouts]
            soak_grace_seconds = 0
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("soak_grace_seconds")));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = HarnessConfig::from_toml("threads = 10").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn base_url_must_be_http() {
        assert!(validate_base_url("http://localhost:8080/api").is_ok());
        assert!(validate_base_url("https://example.com").is_ok());
        assert!(validate_base_url("ftp://example.com").is_err());
        assert!(validate_base_url("localhost:8080").is_err());
        assert!(validate_base_url("not a url").is_err());
    }

    #[test]
    fn join_timeout_depends_on_mode() {
        let timeouts = Timeouts::default();
        let config = HarnessConfig::default();
        assert_eq!(
            timeouts.join_timeout(&config.scenario(ScenarioKind::Load)),
            DEFAULT_JOIN_TIMEOUT
        );
        assert_eq!(
            timeouts.join_timeout(&config.scenario(ScenarioKind::Soak)),
            Duration::from_secs(120) + DEFAULT_SOAK_GRACE
        );
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = HarnessConfig::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
