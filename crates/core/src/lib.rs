//! `alarmspec-core`: alarm specification resolver.
//!
//! Turns user-authored metric alarm definitions into canonical,
//! provider-ready records keyed by name. Everything except the
//! [`provisioning`] boundary is pure and synchronous.

pub mod alarm;
pub mod error;
pub mod provisioning;
pub mod types;

pub use alarm::pipeline::{run, run_batch, Resolution};
pub use alarm::registry::AlarmRegistry;
pub use alarm::resolver::ResolvedAlarm;
pub use alarm::spec::{AlarmBatch, AlarmSpec, MetricQuery, MetricStat, ModuleDefaults};
pub use alarm::validation::{ValidationError, ValidationErrors};
pub use error::CoreError;
