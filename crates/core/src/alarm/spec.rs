//! User-authored alarm definitions and module-level defaults.
//!
//! These are the raw inputs of one resolution run. Enumerated attributes are
//! kept as strings here so the validator can report unknown values instead
//! of failing deserialization on the first one.

use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::types::{Dimensions, Tags};

/// One alarm definition as submitted by the caller.
///
/// Exactly one metric representation is expected: the single-metric fields
/// (`metric_name`, `namespace`, `period`, `statistic` / `extended_statistic`,
/// `dimensions`) or a non-empty `metric_queries` list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AlarmSpec {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub comparison_operator: String,
    #[validate(range(min = 1, message = "evaluationPeriods must be at least 1"))]
    pub evaluation_periods: i32,
    pub threshold: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datapoints_to_alarm: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treat_missing_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions_enabled: Option<bool>,

    // Single-metric representation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended_statistic: Option<String>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Dimensions::is_empty"
    )]
    pub dimensions: Dimensions,

    // Metric-math representation.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub metric_queries: Vec<MetricQuery>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alarm_actions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ok_actions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insufficient_data_actions: Option<Vec<String>>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Tags::is_empty"
    )]
    pub tags: Tags,
}

impl AlarmSpec {
    /// Both `metric_name` and `namespace` are set.
    pub fn has_single_metric(&self) -> bool {
        self.metric_name.is_some() && self.namespace.is_some()
    }

    /// Any single-metric field is set, complete or not.
    pub fn has_single_metric_fields(&self) -> bool {
        self.metric_name.is_some()
            || self.namespace.is_some()
            || self.period.is_some()
            || self.statistic.is_some()
            || self.extended_statistic.is_some()
            || !self.dimensions.is_empty()
    }

    /// At least one metric query is declared.
    pub fn has_metric_queries(&self) -> bool {
        !self.metric_queries.is_empty()
    }
}

/// One node of a metric-math graph.
///
/// A query either fetches a metric (`metric`) or computes an `expression`
/// over earlier query ids. Both fields are passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MetricQuery {
    #[validate(length(min = 1, message = "metric query id must not be empty"))]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_data: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<MetricStat>,
}

/// The metric fetched by a [`MetricQuery`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricStat {
    pub namespace: String,
    pub metric_name: String,
    pub period: i32,
    pub stat: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Dimensions::is_empty"
    )]
    pub dimensions: Dimensions,
}

/// Defaults applied to every alarm of one batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDefaults {
    #[serde(default, deserialize_with = "null_as_default")]
    pub alarm_actions: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ok_actions: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub insufficient_data_actions: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Tags,
}

/// A complete resolution input: module defaults plus the ordered alarm list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlarmBatch {
    #[serde(default, deserialize_with = "null_as_default")]
    pub defaults: ModuleDefaults,
    #[serde(default, deserialize_with = "null_as_default")]
    pub alarms: Vec<AlarmSpec>,
}

/// An explicit `null` reads the same as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
