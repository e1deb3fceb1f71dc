use std::path::PathBuf;

use alarmspec_core::provisioning::{
    ArnContext, DEFAULT_ACCOUNT_ID, DEFAULT_PARTITION, DEFAULT_REGION,
};

/// Configuration-time failures. Reported before any batch is read.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("No input batch: pass a path argument or set ALARMSPEC_INPUT")]
    MissingInput,

    #[error("Invalid {var} '{value}'. Must be one of: {allowed}")]
    InvalidValue {
        var: &'static str,
        value: String,
        allowed: &'static str,
    },
}

/// Which registry view the CLI prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputView {
    /// Full record by name.
    #[default]
    Registry,
    /// Ordered name list.
    Names,
    /// Identifier by name.
    Ids,
    /// Dry-run provisioning: ARN by name.
    Plan,
}

impl OutputView {
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s {
            "registry" => Ok(Self::Registry),
            "names" => Ok(Self::Names),
            "ids" => Ok(Self::Ids),
            "plan" => Ok(Self::Plan),
            other => Err(ConfigError::InvalidValue {
                var: "ALARMSPEC_OUTPUT",
                value: other.to_string(),
                allowed: "registry, names, ids, plan",
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::InvalidValue {
                var: "LOG_FORMAT",
                value: other.to_string(),
                allowed: "text, json",
            }),
        }
    }

    /// Read `LOG_FORMAT`; unset means text.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        match lookup("LOG_FORMAT") {
            Some(raw) => Self::parse(raw.trim()),
            None => Ok(Self::default()),
        }
    }
}

/// CLI configuration loaded from environment variables and arguments.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub input: PathBuf,
    pub output: OutputView,
    pub arn: ArnContext,
}

impl CliConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                | Default          |
    /// |------------------------|------------------|
    /// | `ALARMSPEC_INPUT`      | -- (or argument) |
    /// | `ALARMSPEC_OUTPUT`     | `registry`       |
    /// | `ALARMSPEC_PARTITION`  | `aws`            |
    /// | `ALARMSPEC_REGION`     | `us-east-1`      |
    /// | `ALARMSPEC_ACCOUNT_ID` | `000000000000`   |
    ///
    /// A positional `arg` path takes precedence over `ALARMSPEC_INPUT`.
    pub fn from_env(arg: Option<String>) -> Result<Self, ConfigError> {
        Self::from_lookup(arg, |key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source.
    pub fn from_lookup(
        arg: Option<String>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let input = arg
            .or_else(|| lookup("ALARMSPEC_INPUT"))
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .ok_or(ConfigError::MissingInput)?;

        let output = match lookup("ALARMSPEC_OUTPUT") {
            Some(raw) => OutputView::parse(raw.trim())?,
            None => OutputView::default(),
        };

        let arn = ArnContext {
            partition: lookup("ALARMSPEC_PARTITION").unwrap_or_else(|| DEFAULT_PARTITION.into()),
            region: lookup("ALARMSPEC_REGION").unwrap_or_else(|| DEFAULT_REGION.into()),
            account_id: lookup("ALARMSPEC_ACCOUNT_ID")
                .unwrap_or_else(|| DEFAULT_ACCOUNT_ID.into()),
        };

        Ok(Self { input, output, arn })
    }
}
