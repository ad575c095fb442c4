//! Active receipt rule set handler
//!
//! A region has at most one active receipt rule set, so Create refuses to
//! steal the slot from a rule set activated elsewhere. Registered under the
//! current tag and the legacy `Custom::SESActiveReceiptRuleSet` alias.

use crate::props::require_str;
use async_trait::async_trait;
use sesres_core::{
    ClientFactory, Error, PropertySpec, Reconciliation, ResourceHandler, Result, Schema,
};
use std::sync::Arc;
use tracing::warn;

const PHYSICAL_ID_PREFIX: &str = "active-receipt-rule-set@";

pub struct ActiveRuleSetHandler {
    clients: Arc<dyn ClientFactory>,
    schema: Schema,
}

impl ActiveRuleSetHandler {
    pub fn new(clients: Arc<dyn ClientFactory>) -> Self {
        Self {
            clients,
            schema: Schema::new()
                .required(&["RuleSetName", "Region"])
                .property("RuleSetName", PropertySpec::string())
                .property("Region", PropertySpec::string()),
        }
    }

    async fn activate(&self, cx: &mut Reconciliation, probe: bool) -> Result<()> {
        let rule_set_name = require_str(cx, "RuleSetName")?;
        let region = require_str(cx, "Region")?;
        let ses = self.clients.ses(&region);

        if probe {
            if let Some(active) = ses.active_rule_set().await? {
                return Err(Error::conflict(format!(
                    "active receipt rule set is already set in region {} - {}",
                    region, active
                )));
            }
        }

        ses.set_active_rule_set(Some(&rule_set_name)).await?;
        cx.set_physical_resource_id(format!("{}{}", PHYSICAL_ID_PREFIX, region));
        cx.success(format!(
            "receipt rule set {} activated in region {}",
            rule_set_name, region
        ));
        Ok(())
    }
}

#[async_trait]
impl ResourceHandler for ActiveRuleSetHandler {
    fn resource_types(&self) -> &'static [&'static str] {
        &["Custom::ActiveReceiptRuleSet", "Custom::SESActiveReceiptRuleSet"]
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn create(&self, cx: &mut Reconciliation) -> Result<()> {
        self.activate(cx, true).await
    }

    async fn update(&self, cx: &mut Reconciliation) -> Result<()> {
        // Moving to another region claims that region's slot, so re-probe.
        let probe = !cx.property_unchanged("Region");
        self.activate(cx, probe).await
    }

    async fn delete(&self, cx: &mut Reconciliation) -> Result<()> {
        let owns_slot = cx
            .physical_resource_id()
            .is_some_and(|pid| pid.starts_with(PHYSICAL_ID_PREFIX));
        if !owns_slot {
            warn!(
                physical_resource_id = ?cx.physical_resource_id(),
                "silently ignoring delete request of active receipt rule set"
            );
            return Ok(());
        }

        let region = require_str(cx, "Region")?;
        let ses = self.clients.ses(&region);
        ses.set_active_rule_set(None).await?;
        Ok(())
    }
}
