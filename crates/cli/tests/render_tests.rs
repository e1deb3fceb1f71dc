//! Integration tests for batch loading and output rendering.

use std::io::Write;
use std::path::PathBuf;

use alarmspec_cli::config::{CliConfig, OutputView};
use alarmspec_cli::input::{load_batch, InputError};
use alarmspec_cli::{render, CliError, EXIT_FAILURE, EXIT_INVALID_BATCH};
use alarmspec_core::provisioning::ArnContext;

const BATCH: &str = r#"{
    "defaults": {"alarmActions": ["arn:aws:sns:us-east-1:111111111111:ops"]},
    "alarms": [
        {
            "name": "cpu-high",
            "comparisonOperator": "GreaterThanThreshold",
            "evaluationPeriods": 1,
            "threshold": 80,
            "metricName": "CPUUtilization",
            "namespace": "AWS/EC2"
        },
        {
            "name": "disk-low",
            "comparisonOperator": "LessThanThreshold",
            "evaluationPeriods": 2,
            "threshold": 10,
            "unit": "Percent",
            "metricName": "disk_free",
            "namespace": "CWAgent"
        }
    ]
}"#;

fn write_batch(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file should be created");
    file.write_all(contents.as_bytes())
        .expect("temp file should be writable");
    file
}

fn config(input: PathBuf, output: OutputView) -> CliConfig {
    CliConfig {
        input,
        output,
        arn: ArnContext::default(),
    }
}

#[tokio::test]
async fn renders_registry_view() {
    let file = write_batch(BATCH);
    let batch = load_batch(file.path()).expect("batch should load");

    let out = render(&config(file.path().into(), OutputView::Registry), &batch)
        .await
        .expect("render should succeed");
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();

    assert_eq!(
        json["cpu-high"]["alarmActions"][0],
        "arn:aws:sns:us-east-1:111111111111:ops"
    );
    assert_eq!(json["disk-low"]["unit"], "Percent");
    assert_eq!(json["disk-low"]["metric"]["mode"], "single");
}

#[tokio::test]
async fn renders_names_and_ids() {
    let file = write_batch(BATCH);
    let batch = load_batch(file.path()).unwrap();

    let names = render(&config(file.path().into(), OutputView::Names), &batch)
        .await
        .unwrap();
    let names: Vec<String> = serde_json::from_str(&names).unwrap();
    assert_eq!(names, vec!["cpu-high", "disk-low"]);

    let ids = render(&config(file.path().into(), OutputView::Ids), &batch)
        .await
        .unwrap();
    let ids: serde_json::Value = serde_json::from_str(&ids).unwrap();
    assert_eq!(ids["disk-low"], "disk-low");
}

#[tokio::test]
async fn renders_dry_run_plan() {
    let file = write_batch(BATCH);
    let batch = load_batch(file.path()).unwrap();

    let plan = render(&config(file.path().into(), OutputView::Plan), &batch)
        .await
        .unwrap();
    let plan: serde_json::Value = serde_json::from_str(&plan).unwrap();
    assert_eq!(
        plan["cpu-high"],
        "arn:aws:cloudwatch:us-east-1:000000000000:alarm:cpu-high"
    );
}

#[tokio::test]
async fn invalid_batch_maps_to_exit_code_two() {
    let file = write_batch(
        r#"{"alarms": [{
            "name": "broken",
            "comparisonOperator": "GreaterThanThreshold",
            "evaluationPeriods": 1,
            "threshold": 1
        }]}"#,
    );
    let batch = load_batch(file.path()).unwrap();

    let err = render(&config(file.path().into(), OutputView::Registry), &batch)
        .await
        .unwrap_err();
    assert_eq!(err.exit_code(), EXIT_INVALID_BATCH);
}

#[test]
fn malformed_json_is_a_parse_error() {
    let file = write_batch("{not json");
    let err = load_batch(file.path()).unwrap_err();
    assert!(matches!(err, InputError::Parse { .. }));
    assert_eq!(CliError::from(err).exit_code(), EXIT_FAILURE);
}

#[test]
fn missing_file_is_a_read_error() {
    let err = load_batch(std::path::Path::new("/nonexistent/alarms.json")).unwrap_err();
    assert!(matches!(err, InputError::Read { .. }));
    assert!(err.to_string().contains("/nonexistent/alarms.json"));
}
