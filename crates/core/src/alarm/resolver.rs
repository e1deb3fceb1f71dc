//! Default resolver: layers per-alarm values over module defaults.
//!
//! Every optional field is resolved on its own, in the order
//! spec value → module default → literal fallback. The winning layer is
//! recorded in [`FieldSources`] so the precedence stays auditable.

use serde::Serialize;

use super::enums::{ComparisonOperator, StandardUnit, TreatMissingData};
use super::metric_mode::{self, IgnoredSingleMetric, MetricRepresentation};
use super::spec::{AlarmSpec, ModuleDefaults};
use crate::error::CoreError;
use crate::types::Tags;

/// Default for `actions_enabled` when the spec leaves it unset.
pub const DEFAULT_ACTIONS_ENABLED: bool = true;

/// Which layer supplied a resolved value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueSource {
    Spec,
    ModuleDefault,
    Fallback,
}

/// Provenance of each layered field of a [`ResolvedAlarm`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSources {
    pub treat_missing_data: ValueSource,
    pub actions_enabled: ValueSource,
    pub alarm_actions: ValueSource,
    pub ok_actions: ValueSource,
    pub insufficient_data_actions: ValueSource,
}

/// A fully populated, provider-ready alarm record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedAlarm {
    pub name: String,
    pub description: Option<String>,
    pub comparison_operator: ComparisonOperator,
    pub evaluation_periods: i32,
    pub threshold: f64,
    pub datapoints_to_alarm: Option<i32>,
    pub treat_missing_data: TreatMissingData,
    pub unit: Option<StandardUnit>,
    pub actions_enabled: bool,
    pub metric: MetricRepresentation,
    /// Single-metric fields that were set alongside `metricQueries` and
    /// therefore not used by `metric`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignored_single_metric: Option<IgnoredSingleMetric>,
    pub alarm_actions: Vec<String>,
    pub ok_actions: Vec<String>,
    pub insufficient_data_actions: Vec<String>,
    pub tags: Tags,
    #[serde(skip)]
    pub sources: FieldSources,
}

/// Resolve one spec against the batch defaults, compiling its metric.
///
/// Fails only for specs the validator would reject (unknown enum spellings,
/// no metric representation), so it never fails inside the pipeline.
pub fn resolve(spec: &AlarmSpec, defaults: &ModuleDefaults) -> Result<ResolvedAlarm, CoreError> {
    let metric = metric_mode::compile(spec)?;
    resolve_with_metric(spec, defaults, metric)
}

/// Resolve the non-metric fields of `spec` around an already compiled
/// `metric`.
pub fn resolve_with_metric(
    spec: &AlarmSpec,
    defaults: &ModuleDefaults,
    metric: MetricRepresentation,
) -> Result<ResolvedAlarm, CoreError> {
    let comparison_operator =
        ComparisonOperator::parse(&spec.comparison_operator).ok_or_else(|| {
            CoreError::Validation(format!(
                "alarm '{}': unknown comparisonOperator '{}'",
                spec.name, spec.comparison_operator
            ))
        })?;

    let treat_spec = match spec.treat_missing_data.as_deref() {
        Some(raw) => Some(TreatMissingData::parse(raw).ok_or_else(|| {
            CoreError::Validation(format!(
                "alarm '{}': unknown treatMissingData '{raw}'",
                spec.name
            ))
        })?),
        None => None,
    };

    let unit = match spec.unit.as_deref() {
        Some(raw) => Some(StandardUnit::parse(raw).ok_or_else(|| {
            CoreError::Validation(format!("alarm '{}': unknown unit '{raw}'", spec.name))
        })?),
        None => None,
    };

    let ignored_single_metric = if metric.is_metric_math() {
        metric_mode::ignored_single_metric(spec)
    } else {
        None
    };

    let (treat_missing_data, treat_source) =
        layered(treat_spec, None, TreatMissingData::default);
    let (actions_enabled, enabled_source) =
        layered(spec.actions_enabled, None, || DEFAULT_ACTIONS_ENABLED);
    let (alarm_actions, alarm_source) =
        resolve_actions(spec.alarm_actions.as_ref(), &defaults.alarm_actions);
    let (ok_actions, ok_source) = resolve_actions(spec.ok_actions.as_ref(), &defaults.ok_actions);
    let (insufficient_data_actions, insufficient_source) = resolve_actions(
        spec.insufficient_data_actions.as_ref(),
        &defaults.insufficient_data_actions,
    );

    Ok(ResolvedAlarm {
        name: spec.name.clone(),
        description: spec.description.clone(),
        comparison_operator,
        evaluation_periods: spec.evaluation_periods,
        threshold: spec.threshold,
        datapoints_to_alarm: spec.datapoints_to_alarm,
        treat_missing_data,
        unit,
        actions_enabled,
        metric,
        ignored_single_metric,
        alarm_actions,
        ok_actions,
        insufficient_data_actions,
        tags: merge_tags(&defaults.tags, &spec.tags),
        sources: FieldSources {
            treat_missing_data: treat_source,
            actions_enabled: enabled_source,
            alarm_actions: alarm_source,
            ok_actions: ok_source,
            insufficient_data_actions: insufficient_source,
        },
    })
}

/// Pick the first present layer: spec, then module default, then fallback.
fn layered<T>(
    spec: Option<T>,
    module_default: Option<T>,
    fallback: impl FnOnce() -> T,
) -> (T, ValueSource) {
    if let Some(value) = spec {
        return (value, ValueSource::Spec);
    }
    if let Some(value) = module_default {
        return (value, ValueSource::ModuleDefault);
    }
    (fallback(), ValueSource::Fallback)
}

/// An empty module default list counts as absent.
fn resolve_actions(spec: Option<&Vec<String>>, module_default: &[String]) -> (Vec<String>, ValueSource) {
    let module_default = (!module_default.is_empty()).then(|| module_default.to_vec());
    layered(spec.cloned(), module_default, Vec::new)
}

/// Overlay `overrides` onto `defaults`; overrides win on key collision.
pub fn merge_tags(defaults: &Tags, overrides: &Tags) -> Tags {
    let mut merged = defaults.clone();
    merged.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}
