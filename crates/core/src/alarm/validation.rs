//! Batch schema validator. Pure logic, collects every violation.
//!
//! Every rule is checked for every spec so the caller sees the complete error
//! set in one pass. Violations with [`Severity::Warning`] are reported but do
//! not block the run.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use validator::Validate;

use super::enums::{allowed_values, ComparisonOperator, StandardUnit, TreatMissingData};
use super::spec::AlarmSpec;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Which check produced a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    NameRequired,
    EvaluationPeriodsMin,
    DatapointsToAlarmMin,
    DatapointsToAlarmMax,
    MetricMode,
    AmbiguousMetricMode,
    Unit,
    ComparisonOperator,
    TreatMissingData,
    QueryIdRequired,
    DuplicateQueryId,
}

impl Rule {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NameRequired => "name_required",
            Self::EvaluationPeriodsMin => "evaluation_periods_min",
            Self::DatapointsToAlarmMin => "datapoints_to_alarm_min",
            Self::DatapointsToAlarmMax => "datapoints_to_alarm_max",
            Self::MetricMode => "metric_mode",
            Self::AmbiguousMetricMode => "ambiguous_metric_mode",
            Self::Unit => "unit",
            Self::ComparisonOperator => "comparison_operator",
            Self::TreatMissingData => "treat_missing_data",
            Self::QueryIdRequired => "query_id_required",
            Self::DuplicateQueryId => "duplicate_query_id",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a violation blocks the run or is informational.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Position and name of the offending spec within the submitted batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecRef {
    pub index: usize,
    pub name: String,
}

impl fmt::Display for SpecRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "alarms[{}]", self.index)
        } else {
            write!(f, "alarms[{}] '{}'", self.index, self.name)
        }
    }
}

/// A single rule violation for one spec.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    pub spec: SpecRef,
    pub rule: Rule,
    pub message: String,
    pub severity: Severity,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.spec, self.message, self.rule)
    }
}

/// The complete set of blocking violations of a rejected batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.0.iter()
    }

    /// Violations reported against the spec at `index`.
    pub fn for_spec(&self, index: usize) -> impl Iterator<Item = &ValidationError> {
        self.0.iter().filter(move |e| e.spec.index == index)
    }

    pub fn into_inner(self) -> Vec<ValidationError> {
        self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Aggregated result of checking a whole batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// `Ok(warnings)` when nothing blocks the run.
    pub fn into_result(self) -> Result<Vec<ValidationError>, ValidationErrors> {
        if self.errors.is_empty() {
            Ok(self.warnings)
        } else {
            Err(ValidationErrors(self.errors))
        }
    }

    fn push(&mut self, violation: ValidationError) {
        match violation.severity {
            Severity::Error => self.errors.push(violation),
            Severity::Warning => self.warnings.push(violation),
        }
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Validate a batch. Returns the non-blocking warnings on success.
pub fn validate(specs: &[AlarmSpec]) -> Result<Vec<ValidationError>, ValidationErrors> {
    check(specs).into_result()
}

/// Run every rule against every spec and collect the results.
pub fn check(specs: &[AlarmSpec]) -> ValidationReport {
    let mut report = ValidationReport::default();
    for (index, spec) in specs.iter().enumerate() {
        let spec_ref = SpecRef {
            index,
            name: spec.name.clone(),
        };
        let mut ctx = RuleContext {
            spec_ref: &spec_ref,
            report: &mut report,
        };
        check_structure(spec, &mut ctx);
        check_datapoints(spec, &mut ctx);
        check_metric_mode(spec, &mut ctx);
        check_enums(spec, &mut ctx);
        check_queries(spec, &mut ctx);
    }
    report
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

struct RuleContext<'a> {
    spec_ref: &'a SpecRef,
    report: &'a mut ValidationReport,
}

impl RuleContext<'_> {
    fn error(&mut self, rule: Rule, message: impl Into<String>) {
        self.emit(rule, message.into(), Severity::Error);
    }

    fn warn(&mut self, rule: Rule, message: impl Into<String>) {
        self.emit(rule, message.into(), Severity::Warning);
    }

    fn emit(&mut self, rule: Rule, message: String, severity: Severity) {
        self.report.push(ValidationError {
            spec: self.spec_ref.clone(),
            rule,
            message,
            severity,
        });
    }
}

/// Field-level checks declared on [`AlarmSpec`] via `#[validate(..)]`.
fn check_structure(spec: &AlarmSpec, ctx: &mut RuleContext<'_>) {
    let Err(errors) = spec.validate() else {
        return;
    };
    let mut found: Vec<(Rule, String)> = Vec::new();
    for (field, field_errors) in errors.field_errors() {
        let rule = match &*field {
            "name" => Rule::NameRequired,
            "evaluation_periods" | "evaluationPeriods" => Rule::EvaluationPeriodsMin,
            _ => continue,
        };
        for err in field_errors.iter() {
            let message = err
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("{field} failed check '{}'", err.code));
            found.push((rule, message));
        }
    }
    // field_errors() is a hash map; keep report order deterministic.
    found.sort_by_key(|(rule, _)| *rule as u8);
    for (rule, message) in found {
        ctx.error(rule, message);
    }
}

fn check_datapoints(spec: &AlarmSpec, ctx: &mut RuleContext<'_>) {
    let Some(datapoints) = spec.datapoints_to_alarm else {
        return;
    };
    if datapoints < 1 {
        ctx.error(
            Rule::DatapointsToAlarmMin,
            format!("datapointsToAlarm must be at least 1, got {datapoints}"),
        );
    }
    if datapoints > spec.evaluation_periods {
        ctx.error(
            Rule::DatapointsToAlarmMax,
            format!(
                "datapointsToAlarm ({datapoints}) must not exceed evaluationPeriods ({})",
                spec.evaluation_periods
            ),
        );
    }
}

fn check_metric_mode(spec: &AlarmSpec, ctx: &mut RuleContext<'_>) {
    if spec.has_metric_queries() {
        if spec.has_single_metric_fields() {
            ctx.warn(
                Rule::AmbiguousMetricMode,
                "single-metric fields are set alongside metricQueries; metricQueries is used",
            );
        }
    } else if !spec.has_single_metric() {
        ctx.error(
            Rule::MetricMode,
            "either metricName and namespace, or a non-empty metricQueries list, is required",
        );
    }
}

fn check_enums(spec: &AlarmSpec, ctx: &mut RuleContext<'_>) {
    if ComparisonOperator::parse(&spec.comparison_operator).is_none() {
        ctx.error(
            Rule::ComparisonOperator,
            format!(
                "Invalid comparisonOperator '{}'. Must be one of: {}",
                spec.comparison_operator,
                allowed_values(&ComparisonOperator::ALL, ComparisonOperator::as_str)
            ),
        );
    }
    if let Some(treat) = spec.treat_missing_data.as_deref() {
        if TreatMissingData::parse(treat).is_none() {
            ctx.error(
                Rule::TreatMissingData,
                format!(
                    "Invalid treatMissingData '{treat}'. Must be one of: {}",
                    allowed_values(&TreatMissingData::ALL, TreatMissingData::as_str)
                ),
            );
        }
    }
    if let Some(unit) = spec.unit.as_deref() {
        if StandardUnit::parse(unit).is_none() {
            ctx.error(
                Rule::Unit,
                format!(
                    "Invalid unit '{unit}'. Must be one of: {}",
                    allowed_values(&StandardUnit::ALL, StandardUnit::as_str)
                ),
            );
        }
    }
}

/// Query ids must be present and unique within their spec. Expressions and
/// `returnData` are not inspected.
fn check_queries(spec: &AlarmSpec, ctx: &mut RuleContext<'_>) {
    let mut seen: HashSet<&str> = HashSet::new();
    for (position, query) in spec.metric_queries.iter().enumerate() {
        if query.validate().is_err() {
            ctx.error(
                Rule::QueryIdRequired,
                format!("metricQueries[{position}] must have a non-empty id"),
            );
            continue;
        }
        if !seen.insert(query.id.as_str()) {
            ctx.error(
                Rule::DuplicateQueryId,
                format!("metric query id '{}' is declared more than once", query.id),
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarm::spec::MetricQuery;

    fn make_spec(name: &str) -> AlarmSpec {
        AlarmSpec {
            name: name.to_string(),
            comparison_operator: "GreaterThanThreshold".to_string(),
            evaluation_periods: 3,
            threshold: 80.0,
            metric_name: Some("CPUUtilization".to_string()),
            namespace: Some("AWS/EC2".to_string()),
            period: Some(300),
            statistic: Some("Average".to_string()),
            ..Default::default()
        }
    }

    fn rules(report: &ValidationReport) -> Vec<Rule> {
        report.errors.iter().map(|e| e.rule).collect()
    }

    #[test]
    fn valid_spec_passes() {
        let report = check(&[make_spec("cpu-high")]);
        assert!(report.is_valid());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn datapoints_within_range_pass() {
        for datapoints in 1..=3 {
            let mut spec = make_spec("a");
            spec.datapoints_to_alarm = Some(datapoints);
            assert!(check(&[spec]).is_valid(), "datapoints {datapoints}");
        }
    }

    #[test]
    fn datapoints_below_one_fails() {
        let mut spec = make_spec("a");
        spec.datapoints_to_alarm = Some(0);
        assert_eq!(rules(&check(&[spec])), vec![Rule::DatapointsToAlarmMin]);
    }

    #[test]
    fn datapoints_above_periods_fails() {
        let mut spec = make_spec("a");
        spec.datapoints_to_alarm = Some(4);
        let report = check(&[spec]);
        assert_eq!(rules(&report), vec![Rule::DatapointsToAlarmMax]);
        assert!(report.errors[0].message.contains("(4)"));
        assert!(report.errors[0].message.contains("(3)"));
    }

    #[test]
    fn missing_metric_mode_fails() {
        let mut spec = make_spec("a");
        spec.namespace = None;
        assert_eq!(rules(&check(&[spec])), vec![Rule::MetricMode]);
    }

    #[test]
    fn metric_queries_alone_pass() {
        let mut spec = make_spec("a");
        spec.metric_name = None;
        spec.namespace = None;
        spec.metric_queries = vec![MetricQuery {
            id: "e1".into(),
            expression: Some("SUM(METRICS())".into()),
            ..Default::default()
        }];
        assert!(check(&[spec]).is_valid());
    }

    #[test]
    fn both_metric_modes_warn_without_blocking() {
        let mut spec = make_spec("a");
        spec.metric_queries = vec![MetricQuery {
            id: "m1".into(),
            ..Default::default()
        }];
        let report = check(&[spec]);
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].rule, Rule::AmbiguousMetricMode);
        assert_eq!(report.warnings[0].severity, Severity::Warning);
    }

    #[test]
    fn partial_single_metric_with_queries_warns() {
        let queries = vec![MetricQuery {
            id: "m1".into(),
            ..Default::default()
        }];

        let mut name_only = make_spec("name-only");
        name_only.namespace = None;
        name_only.metric_queries = queries.clone();

        let mut dimensions_only = make_spec("dimensions-only");
        dimensions_only.metric_name = None;
        dimensions_only.namespace = None;
        dimensions_only.period = None;
        dimensions_only.statistic = None;
        dimensions_only.dimensions.insert("InstanceId".into(), "i-123".into());
        dimensions_only.metric_queries = queries;

        let report = check(&[name_only, dimensions_only]);
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 2);
        assert!(report
            .warnings
            .iter()
            .all(|w| w.rule == Rule::AmbiguousMetricMode));
    }

    #[test]
    fn unknown_enums_fail() {
        let mut spec = make_spec("a");
        spec.comparison_operator = "GreaterThan".into();
        spec.treat_missing_data = Some("zero".into());
        spec.unit = Some("Hours".into());
        let report = check(&[spec]);
        assert_eq!(
            rules(&report),
            vec![Rule::ComparisonOperator, Rule::TreatMissingData, Rule::Unit]
        );
        assert!(report.errors[0].message.contains("GreaterThanOrEqualToThreshold"));
    }

    #[test]
    fn known_enums_pass() {
        let mut spec = make_spec("a");
        spec.comparison_operator = "LessThanLowerOrGreaterThanUpperThreshold".into();
        spec.treat_missing_data = Some("notBreaching".into());
        spec.unit = Some("Bytes/Second".into());
        assert!(check(&[spec]).is_valid());
    }

    #[test]
    fn empty_name_and_zero_periods_fail() {
        let mut spec = make_spec("");
        spec.evaluation_periods = 0;
        let report = check(&[spec]);
        assert_eq!(
            rules(&report),
            vec![Rule::NameRequired, Rule::EvaluationPeriodsMin]
        );
        assert_eq!(report.errors[0].spec.to_string(), "alarms[0]");
    }

    #[test]
    fn query_ids_must_be_present_and_unique() {
        let mut spec = make_spec("a");
        spec.metric_name = None;
        spec.namespace = None;
        spec.metric_queries = vec![
            MetricQuery {
                id: "m1".into(),
                ..Default::default()
            },
            MetricQuery {
                id: String::new(),
                ..Default::default()
            },
            MetricQuery {
                id: "m1".into(),
                ..Default::default()
            },
        ];
        assert_eq!(
            rules(&check(&[spec])),
            vec![Rule::QueryIdRequired, Rule::DuplicateQueryId]
        );
    }

    #[test]
    fn expressions_are_not_inspected() {
        let mut spec = make_spec("a");
        spec.metric_name = None;
        spec.namespace = None;
        spec.metric_queries = vec![MetricQuery {
            id: "e1".into(),
            expression: Some("m9 / undefined".into()),
            return_data: Some(false),
            ..Default::default()
        }];
        assert!(check(&[spec]).is_valid());
    }

    #[test]
    fn collects_errors_across_the_whole_batch() {
        let mut first = make_spec("first");
        first.datapoints_to_alarm = Some(9);
        let second = make_spec("second");
        let mut third = make_spec("third");
        third.unit = Some("bogus".into());

        let errors = validate(&[first, second, third]).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.for_spec(0).count(), 1);
        assert_eq!(errors.for_spec(1).count(), 0);
        assert_eq!(errors.for_spec(2).count(), 1);
        assert_eq!(errors.to_string().lines().count(), 2);
    }

    #[test]
    fn display_names_spec_and_rule() {
        let mut spec = make_spec("cpu-high");
        spec.datapoints_to_alarm = Some(0);
        let errors = validate(&[spec]).unwrap_err();
        let line = errors.to_string();
        assert!(line.starts_with("alarms[0] 'cpu-high': "));
        assert!(line.ends_with("(datapoints_to_alarm_min)"));
    }
}
