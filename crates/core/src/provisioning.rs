//! Boundary to the external provisioning layer.
//!
//! The resolver itself never creates anything. A provisioner materializes one
//! monitoring alarm per registry entry and reports back its identifier.

use std::collections::BTreeMap;
use std::sync::Mutex;

use serde::Serialize;

use crate::alarm::registry::AlarmRegistry;
use crate::alarm::resolver::ResolvedAlarm;
use crate::types::AlarmName;

pub const DEFAULT_PARTITION: &str = "aws";
pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_ACCOUNT_ID: &str = "000000000000";

/// Partition, region and account used to derive alarm ARNs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArnContext {
    pub partition: String,
    pub region: String,
    pub account_id: String,
}

impl Default for ArnContext {
    fn default() -> Self {
        Self {
            partition: DEFAULT_PARTITION.to_string(),
            region: DEFAULT_REGION.to_string(),
            account_id: DEFAULT_ACCOUNT_ID.to_string(),
        }
    }
}

impl ArnContext {
    /// `arn:{partition}:cloudwatch:{region}:{account}:alarm:{name}`
    pub fn alarm_arn(&self, name: &str) -> String {
        format!(
            "arn:{}:cloudwatch:{}:{}:alarm:{name}",
            self.partition, self.region, self.account_id
        )
    }
}

/// Identifier reported back for one created alarm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisionedAlarm {
    pub name: AlarmName,
    pub arn: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error("Provider rejected alarm '{name}': {reason}")]
    Rejected { name: AlarmName, reason: String },

    #[error("Provisioning error: {0}")]
    Internal(String),
}

/// Implemented by anything that can materialize a resolved alarm.
pub trait AlarmProvisioner: Send + Sync {
    fn provision(
        &self,
        alarm: &ResolvedAlarm,
    ) -> impl std::future::Future<Output = Result<ProvisionedAlarm, ProvisionError>> + Send;
}

/// Provision every registry entry in name-list order, stopping at the first
/// failure. Returns name → ARN.
pub async fn provision_all<P: AlarmProvisioner>(
    provisioner: &P,
    registry: &AlarmRegistry,
) -> Result<BTreeMap<AlarmName, String>, ProvisionError> {
    let mut created = BTreeMap::new();
    for alarm in registry.iter() {
        let provisioned = provisioner.provision(alarm).await?;
        tracing::info!(
            alarm_name = %provisioned.name,
            arn = %provisioned.arn,
            "Alarm provisioned",
        );
        created.insert(provisioned.name, provisioned.arn);
    }
    Ok(created)
}

/// Provisioner that creates nothing and derives ARNs locally.
#[derive(Debug, Default)]
pub struct DryRunProvisioner {
    ctx: ArnContext,
    planned: Mutex<Vec<AlarmName>>,
}

impl DryRunProvisioner {
    pub fn new(ctx: ArnContext) -> Self {
        Self {
            ctx,
            planned: Mutex::new(Vec::new()),
        }
    }

    /// Names passed to [`AlarmProvisioner::provision`], in call order.
    pub fn planned(&self) -> Vec<AlarmName> {
        match self.planned.lock() {
            Ok(planned) => planned.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl AlarmProvisioner for DryRunProvisioner {
    async fn provision(&self, alarm: &ResolvedAlarm) -> Result<ProvisionedAlarm, ProvisionError> {
        self.planned
            .lock()
            .map_err(|_| ProvisionError::Internal("dry-run plan lock poisoned".to_string()))?
            .push(alarm.name.clone());
        Ok(ProvisionedAlarm {
            name: alarm.name.clone(),
            arn: self.ctx.alarm_arn(&alarm.name),
        })
    }
}
