//! `alarmspec-cli` library crate.
//!
//! Config loading, batch input and output rendering live here so integration
//! tests can drive them. The binary entrypoint lives in `main.rs`.

pub mod config;
pub mod input;

use alarmspec_core::provisioning::{provision_all, DryRunProvisioner, ProvisionError};
use alarmspec_core::{AlarmBatch, CoreError};

use config::{CliConfig, ConfigError, OutputView};
use input::InputError;

/// Exit status for rejected batches.
pub const EXIT_INVALID_BATCH: i32 = 2;

/// Exit status for every other failure.
pub const EXIT_FAILURE: i32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Provision(#[from] ProvisionError),

    #[error("Failed to render output: {0}")]
    Render(#[from] serde_json::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Core(CoreError::InvalidBatch(_)) => EXIT_INVALID_BATCH,
            _ => EXIT_FAILURE,
        }
    }
}

/// Resolve `batch` and render the configured view as pretty JSON.
pub async fn render(config: &CliConfig, batch: &AlarmBatch) -> Result<String, CliError> {
    let resolution = alarmspec_core::run_batch(batch)?;
    let registry = &resolution.registry;

    let rendered = match config.output {
        OutputView::Registry => serde_json::to_string_pretty(registry)?,
        OutputView::Names => serde_json::to_string_pretty(registry.names())?,
        OutputView::Ids => serde_json::to_string_pretty(&registry.ids())?,
        OutputView::Plan => {
            let provisioner = DryRunProvisioner::new(config.arn.clone());
            let created = provision_all(&provisioner, registry).await?;
            serde_json::to_string_pretty(&created)?
        }
    };
    Ok(rendered)
}
