//! Verification completion pollers
//!
//! These handlers complete once an asynchronous verification settles. A
//! pending state suspends the result and asks the orchestrator to re-invoke
//! after the poll interval; the handler itself never sleeps.

use crate::props::{require_dotless, require_str};
use async_trait::async_trait;
use sesres_core::{
    ClientFactory, PropertySpec, Reconciliation, ResourceHandler, Result, Schema,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(15);

fn poller_schema() -> Schema {
    Schema::new()
        .required(&["Identity", "Region"])
        .property("Identity", PropertySpec::string())
        .property("Region", PropertySpec::string())
}

/// Waits for domain identity verification to settle
pub struct VerifiedIdentityHandler {
    clients: Arc<dyn ClientFactory>,
    schema: Schema,
    interval: Duration,
}

impl VerifiedIdentityHandler {
    pub fn new(clients: Arc<dyn ClientFactory>) -> Self {
        Self::with_interval(clients, DEFAULT_POLL_INTERVAL)
    }

    pub fn with_interval(clients: Arc<dyn ClientFactory>, interval: Duration) -> Self {
        Self {
            clients,
            schema: poller_schema(),
            interval,
        }
    }

    async fn check(&self, cx: &mut Reconciliation) -> Result<()> {
        let identity = require_dotless(cx, "Identity")?;
        let region = require_str(cx, "Region")?;
        // The identity is the physical id whatever branch we take below.
        cx.set_physical_resource_id(identity.clone());

        let ses = self.clients.ses(&region);
        let attrs = ses.get_verification_attributes(&identity).await?;
        let status = attrs.as_ref().map(|a| a.status.as_str());
        info!(%identity, %region, attempt = cx.attempt(), ?status, "identity verification state");

        match status {
            Some("Success") => {
                let attrs = attrs.unwrap_or_default();
                cx.set_attribute("Region", region.clone());
                cx.set_attribute("Identity", identity.clone());
                cx.set_attribute("VerificationToken", attrs.token);
                cx.set_attribute("VerificationStatus", attrs.status);
                cx.success(format!(
                    "identity {:?} in region {} is verified",
                    identity, region
                ));
            }
            Some("Pending") => cx.schedule_reinvoke(self.interval),
            Some(state) => cx.fail(format!(
                "verification of identity {:?} in region {} failed, state {}",
                identity, region, state
            )),
            None => cx.fail(format!(
                "the identity {:?} does not exist in region {}",
                identity, region
            )),
        }
        Ok(())
    }
}

#[async_trait]
impl ResourceHandler for VerifiedIdentityHandler {
    fn resource_types(&self) -> &'static [&'static str] {
        &["Custom::VerifiedIdentity"]
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn create(&self, cx: &mut Reconciliation) -> Result<()> {
        self.check(cx).await
    }

    async fn update(&self, cx: &mut Reconciliation) -> Result<()> {
        self.check(cx).await
    }

    async fn delete(&self, cx: &mut Reconciliation) -> Result<()> {
        cx.success("nothing to delete");
        Ok(())
    }
}

/// Waits for mail-from domain verification to settle
pub struct VerifiedMailFromHandler {
    clients: Arc<dyn ClientFactory>,
    schema: Schema,
    interval: Duration,
}

impl VerifiedMailFromHandler {
    pub fn new(clients: Arc<dyn ClientFactory>) -> Self {
        Self::with_interval(clients, DEFAULT_POLL_INTERVAL)
    }

    pub fn with_interval(clients: Arc<dyn ClientFactory>, interval: Duration) -> Self {
        Self {
            clients,
            schema: poller_schema(),
            interval,
        }
    }

    async fn check(&self, cx: &mut Reconciliation) -> Result<()> {
        let identity = require_dotless(cx, "Identity")?;
        let region = require_str(cx, "Region")?;
        cx.set_physical_resource_id(identity.clone());

        let ses = self.clients.ses(&region);
        let attrs = ses.get_mail_from_attributes(&identity).await?;
        let mail_from = attrs
            .as_ref()
            .and_then(|a| a.mail_from_domain.clone())
            .unwrap_or_default();
        let status = attrs.as_ref().and_then(|a| a.status.as_deref());
        info!(%identity, %region, attempt = cx.attempt(), ?status, "mail from verification state");

        match status {
            Some("Success") => {
                cx.set_attribute("Region", region.clone());
                cx.set_attribute("Identity", identity.clone());
                cx.set_attribute("MailFromDomainStatus", "Success");
                cx.success(format!(
                    "mail from domain {:?} for identity {:?} in region {} is verified",
                    mail_from, identity, region
                ));
            }
            Some("Pending") => cx.schedule_reinvoke(self.interval),
            Some(state) => cx.fail(format!(
                "verification of mail from domain {:?} for {:?} in region {} failed, state {}",
                mail_from, identity, region, state
            )),
            None => cx.fail(format!(
                "the identity {:?} does not exist in region {}",
                identity, region
            )),
        }
        Ok(())
    }
}

#[async_trait]
impl ResourceHandler for VerifiedMailFromHandler {
    fn resource_types(&self) -> &'static [&'static str] {
        &["Custom::VerifiedMailFromDomain"]
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn create(&self, cx: &mut Reconciliation) -> Result<()> {
        self.check(cx).await
    }

    async fn update(&self, cx: &mut Reconciliation) -> Result<()> {
        self.check(cx).await
    }

    async fn delete(&self, cx: &mut Reconciliation) -> Result<()> {
        cx.success("nothing to delete");
        Ok(())
    }
}
