use std::collections::BTreeMap;

/// Tag mapping attached to an alarm. Ordered so serialized output is stable.
pub type Tags = BTreeMap<String, String>;

/// Metric dimensions (name -> value).
pub type Dimensions = BTreeMap<String, String>;

/// Alarm names are the registry key and the provider-side identifier.
pub type AlarmName = String;
