//! `alarmspec` -- resolve a batch of metric alarm definitions.
//!
//! Reads a JSON batch (`{"defaults": {...}, "alarms": [...]}`), validates
//! and resolves it, and prints one registry view as JSON on stdout. Logs go
//! to stderr.
//!
//! # Environment variables
//!
//! | Variable               | Required | Default        | Description                          |
//! |------------------------|----------|----------------|--------------------------------------|
//! | `ALARMSPEC_INPUT`      | yes*     | --             | Batch file (*unless passed as arg)   |
//! | `ALARMSPEC_OUTPUT`     | no       | `registry`     | `registry`, `names`, `ids` or `plan` |
//! | `ALARMSPEC_PARTITION`  | no       | `aws`          | ARN partition for `plan`             |
//! | `ALARMSPEC_REGION`     | no       | `us-east-1`    | ARN region for `plan`                |
//! | `ALARMSPEC_ACCOUNT_ID` | no       | `000000000000` | ARN account for `plan`               |
//! | `LOG_FORMAT`           | no       | `text`         | `text` or `json`                     |

use alarmspec_cli::config::{CliConfig, LogFormat};
use alarmspec_cli::{input, render, CliError};
use alarmspec_core::CoreError;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let log_format = LogFormat::from_env();
    let json_logs = matches!(log_format, Ok(LogFormat::Json));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "alarmspec_cli=info,alarmspec_core=info".into()),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json_logs).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();

    if let Err(err) = log_format {
        let err = CliError::from(err);
        report(&err);
        std::process::exit(err.exit_code());
    }

    if let Err(err) = run().await {
        report(&err);
        std::process::exit(err.exit_code());
    }
}

async fn run() -> Result<(), CliError> {
    let config = CliConfig::from_env(std::env::args().nth(1))?;

    tracing::info!(
        input = %config.input.display(),
        output = ?config.output,
        "Starting alarmspec",
    );

    let batch = input::load_batch(&config.input)?;
    let rendered = render(&config, &batch).await?;
    println!("{rendered}");
    Ok(())
}

fn report(err: &CliError) {
    match err {
        CliError::Core(CoreError::InvalidBatch(errors)) => {
            for violation in errors {
                tracing::error!(
                    alarm = %violation.spec,
                    rule = %violation.rule,
                    "{}",
                    violation.message
                );
            }
            tracing::error!(error_count = errors.len(), "Alarm batch rejected");
        }
        other => tracing::error!(error = %other, "alarmspec failed"),
    }
}
