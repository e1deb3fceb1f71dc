//! Resolution orchestrator.
//!
//! Stages: validate the whole batch, then per alarm compile the metric and
//! resolve the remaining fields around it, then build the registry. A run
//! either yields a complete registry or the complete set of blocking
//! violations.

use serde::Serialize;

use super::metric_mode;
use super::registry::{self, AlarmRegistry};
use super::resolver::{self, ResolvedAlarm};
use super::spec::{AlarmBatch, AlarmSpec, ModuleDefaults};
use super::validation::{self, ValidationError};
use crate::error::CoreError;

/// Output of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    pub registry: AlarmRegistry,
    /// Non-blocking validation findings.
    pub warnings: Vec<ValidationError>,
}

/// Run the full pipeline over one batch.
///
/// Returns [`CoreError::InvalidBatch`] carrying every violation when
/// validation fails.
pub fn run(specs: &[AlarmSpec], defaults: &ModuleDefaults) -> Result<Resolution, CoreError> {
    tracing::debug!(alarm_count = specs.len(), "Validating alarm batch");

    let warnings = validation::validate(specs).map_err(|errors| {
        tracing::warn!(error_count = errors.len(), "Alarm batch rejected");
        errors
    })?;

    for warning in &warnings {
        tracing::warn!(
            alarm_name = %warning.spec.name,
            rule = %warning.rule,
            message = %warning.message,
            "Alarm definition accepted with warning",
        );
    }

    let resolved = specs
        .iter()
        .map(|spec| resolve_and_compile(spec, defaults))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| CoreError::Internal(format!("resolution failed after validation: {err}")))?;

    let registry = registry::build(resolved);

    tracing::info!(
        alarm_count = specs.len(),
        registered = registry.len(),
        warning_count = warnings.len(),
        "Alarm batch resolved",
    );

    Ok(Resolution { registry, warnings })
}

fn resolve_and_compile(
    spec: &AlarmSpec,
    defaults: &ModuleDefaults,
) -> Result<ResolvedAlarm, CoreError> {
    let metric = metric_mode::compile(spec)?;
    resolver::resolve_with_metric(spec, defaults, metric)
}

/// Convenience wrapper over [`run`] for a deserialized batch.
pub fn run_batch(batch: &AlarmBatch) -> Result<Resolution, CoreError> {
    run(&batch.alarms, &batch.defaults)
}
