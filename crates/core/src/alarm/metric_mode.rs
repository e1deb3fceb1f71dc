//! Metric mode compiler.
//!
//! Normalizes the metric portion of an [`AlarmSpec`] into exactly one tagged
//! representation. Query expressions are opaque strings here; their id
//! references and evaluation order belong to the monitoring backend.

use serde::Serialize;

use super::spec::{AlarmSpec, MetricQuery, MetricStat};
use crate::error::CoreError;
use crate::types::Dimensions;

/// The normalized metric of a resolved alarm.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum MetricRepresentation {
    /// One named metric and statistic.
    Single(SingleMetric),
    /// A metric-math graph, in declaration order.
    MetricMath { queries: Vec<CompiledQuery> },
}

impl MetricRepresentation {
    pub fn is_metric_math(&self) -> bool {
        matches!(self, Self::MetricMath { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleMetric {
    pub metric_name: String,
    pub namespace: String,
    pub period: Option<i32>,
    pub statistic: Option<String>,
    pub extended_statistic: Option<String>,
    pub dimensions: Dimensions,
}

/// Single-metric fields set alongside `metric_queries`, kept as written.
/// Unlike [`SingleMetric`], any subset of the fields may be present.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IgnoredSingleMetric {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extended_statistic: Option<String>,
    #[serde(skip_serializing_if = "Dimensions::is_empty")]
    pub dimensions: Dimensions,
}

/// A [`MetricQuery`] with `return_data` made explicit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledQuery {
    pub id: String,
    pub label: Option<String>,
    pub return_data: bool,
    pub expression: Option<String>,
    pub metric: Option<MetricStat>,
}

impl From<&MetricQuery> for CompiledQuery {
    fn from(query: &MetricQuery) -> Self {
        Self {
            id: query.id.clone(),
            label: query.label.clone(),
            return_data: query.return_data.unwrap_or(true),
            expression: query.expression.clone(),
            metric: query.metric.clone(),
        }
    }
}

/// Compile the metric portion of `spec`.
///
/// A non-empty `metric_queries` list takes precedence over single-metric
/// fields; the validator reports that combination as a warning. A spec with
/// neither is rejected.
pub fn compile(spec: &AlarmSpec) -> Result<MetricRepresentation, CoreError> {
    if spec.has_metric_queries() {
        return Ok(MetricRepresentation::MetricMath {
            queries: spec.metric_queries.iter().map(CompiledQuery::from).collect(),
        });
    }
    single_metric(spec)
        .map(MetricRepresentation::Single)
        .ok_or_else(|| {
            CoreError::Validation(format!(
                "alarm '{}' has neither metricName/namespace nor metricQueries",
                spec.name
            ))
        })
}

/// The single-metric fields of `spec`, if both name and namespace are set.
pub fn single_metric(spec: &AlarmSpec) -> Option<SingleMetric> {
    let (Some(metric_name), Some(namespace)) = (&spec.metric_name, &spec.namespace) else {
        return None;
    };
    Some(SingleMetric {
        metric_name: metric_name.clone(),
        namespace: namespace.clone(),
        period: spec.period,
        statistic: spec.statistic.clone(),
        extended_statistic: spec.extended_statistic.clone(),
        dimensions: spec.dimensions.clone(),
    })
}

/// The single-metric fields `compile` leaves unused, if any are set.
///
/// Only metric-math specs can leave fields unused.
pub fn ignored_single_metric(spec: &AlarmSpec) -> Option<IgnoredSingleMetric> {
    if !spec.has_metric_queries() || !spec.has_single_metric_fields() {
        return None;
    }
    Some(IgnoredSingleMetric {
        metric_name: spec.metric_name.clone(),
        namespace: spec.namespace.clone(),
        period: spec.period,
        statistic: spec.statistic.clone(),
        extended_statistic: spec.extended_statistic.clone(),
        dimensions: spec.dimensions.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn query(id: &str) -> MetricQuery {
        MetricQuery {
            id: id.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn single_metric_spec_compiles_to_single() {
        let spec = AlarmSpec {
            name: "latency".into(),
            metric_name: Some("Latency".into()),
            namespace: Some("AWS/ELB".into()),
            period: Some(60),
            extended_statistic: Some("p99".into()),
            ..Default::default()
        };
        let compiled = compile(&spec).unwrap();
        assert_matches!(
            compiled,
            MetricRepresentation::Single(SingleMetric { ref extended_statistic, period: Some(60), .. })
                if extended_statistic.as_deref() == Some("p99")
        );
    }

    #[test]
    fn return_data_defaults_to_true() {
        let mut hidden = query("m1");
        hidden.return_data = Some(false);
        let spec = AlarmSpec {
            metric_queries: vec![hidden, query("e1")],
            ..Default::default()
        };
        let MetricRepresentation::MetricMath { queries } = compile(&spec).unwrap() else {
            panic!("expected metric math");
        };
        assert!(!queries[0].return_data);
        assert!(queries[1].return_data);
    }

    #[test]
    fn queries_win_over_single_fields() {
        let spec = AlarmSpec {
            metric_name: Some("CPUUtilization".into()),
            namespace: Some("AWS/EC2".into()),
            metric_queries: vec![query("m1")],
            ..Default::default()
        };
        assert!(compile(&spec).unwrap().is_metric_math());
    }

    #[test]
    fn partial_single_fields_are_reported_as_ignored() {
        let spec = AlarmSpec {
            metric_name: Some("CPUUtilization".into()),
            metric_queries: vec![query("m1")],
            ..Default::default()
        };
        let ignored = ignored_single_metric(&spec).unwrap();
        assert_eq!(ignored.metric_name.as_deref(), Some("CPUUtilization"));
        assert_eq!(ignored.namespace, None);

        let json = serde_json::to_value(&ignored).unwrap();
        assert_eq!(json, serde_json::json!({"metricName": "CPUUtilization"}));
    }

    #[test]
    fn nothing_is_ignored_without_queries_or_single_fields() {
        let single = AlarmSpec {
            metric_name: Some("CPUUtilization".into()),
            namespace: Some("AWS/EC2".into()),
            ..Default::default()
        };
        assert_eq!(ignored_single_metric(&single), None);

        let math_only = AlarmSpec {
            metric_queries: vec![query("m1")],
            ..Default::default()
        };
        assert_eq!(ignored_single_metric(&math_only), None);
    }

    #[test]
    fn neither_mode_is_an_error() {
        let spec = AlarmSpec {
            name: "orphan".into(),
            metric_name: Some("CPUUtilization".into()),
            ..Default::default()
        };
        assert_matches!(compile(&spec), Err(CoreError::Validation(msg)) if msg.contains("orphan"));
    }

    #[test]
    fn serializes_with_mode_tag() {
        let spec = AlarmSpec {
            metric_queries: vec![query("m1")],
            ..Default::default()
        };
        let json = serde_json::to_value(compile(&spec).unwrap()).unwrap();
        assert_eq!(json["mode"], "metricMath");
        assert_eq!(json["queries"][0]["id"], "m1");
        assert_eq!(json["queries"][0]["returnData"], true);
    }
}
