//! Alarm specification resolver.
//!
//! Pure domain logic with no I/O: a batch of [`spec::AlarmSpec`]s plus
//! [`spec::ModuleDefaults`] is validated, resolved, compiled and indexed into
//! an [`registry::AlarmRegistry`] by [`pipeline::run`].

pub mod enums;
pub mod metric_mode;
pub mod pipeline;
pub mod registry;
pub mod resolver;
pub mod spec;
pub mod validation;
