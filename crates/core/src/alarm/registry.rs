//! Name-keyed registry of resolved alarms.
//!
//! Built by an explicit fold with last-write-wins on duplicate names: a later
//! alarm replaces the earlier record and moves its name to the end of the
//! name list. No error is raised for duplicates.

use std::collections::{BTreeMap, HashMap};

use serde::ser::{Serialize, Serializer};

use super::resolver::ResolvedAlarm;
use crate::error::CoreError;
use crate::provisioning::ArnContext;
use crate::types::AlarmName;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlarmRegistry {
    alarms: HashMap<AlarmName, ResolvedAlarm>,
    names: Vec<AlarmName>,
}

impl AlarmRegistry {
    /// Insert `alarm`, replacing any earlier alarm with the same name.
    ///
    /// Returns the replaced record, if any.
    fn insert(&mut self, alarm: ResolvedAlarm) -> Option<ResolvedAlarm> {
        let name = alarm.name.clone();
        let replaced = self.alarms.insert(name.clone(), alarm);
        if replaced.is_some() {
            self.names.retain(|n| n != &name);
        }
        self.names.push(name);
        replaced
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Full record by name.
    pub fn get(&self, name: &str) -> Option<&ResolvedAlarm> {
        self.alarms.get(name)
    }

    /// Like [`get`](Self::get), for callers that treat absence as an error.
    pub fn require(&self, name: &str) -> Result<&ResolvedAlarm, CoreError> {
        self.get(name).ok_or_else(|| CoreError::NotFound {
            name: name.to_string(),
        })
    }

    /// Names in last-write insertion order.
    pub fn names(&self) -> &[AlarmName] {
        &self.names
    }

    /// Records in [`names`](Self::names) order.
    pub fn iter(&self) -> impl Iterator<Item = &ResolvedAlarm> {
        self.names.iter().filter_map(|name| self.alarms.get(name))
    }

    /// Provider identifier by name. Metric alarms are identified by their
    /// name, so this is the identity mapping over the registry keys.
    pub fn ids(&self) -> BTreeMap<AlarmName, String> {
        self.names
            .iter()
            .map(|name| (name.clone(), name.clone()))
            .collect()
    }

    /// Fully qualified ARN by name.
    pub fn arns(&self, ctx: &ArnContext) -> BTreeMap<AlarmName, String> {
        self.names
            .iter()
            .map(|name| (name.clone(), ctx.alarm_arn(name)))
            .collect()
    }
}

impl Serialize for AlarmRegistry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter().map(|alarm| (&alarm.name, alarm)))
    }
}

/// Fold resolved alarms into a registry.
pub fn build(resolved: impl IntoIterator<Item = ResolvedAlarm>) -> AlarmRegistry {
    resolved
        .into_iter()
        .fold(AlarmRegistry::default(), |mut registry, alarm| {
            let name = alarm.name.clone();
            if registry.insert(alarm).is_some() {
                tracing::debug!(alarm_name = %name, "Duplicate alarm name replaced earlier definition");
            }
            registry
        })
}
