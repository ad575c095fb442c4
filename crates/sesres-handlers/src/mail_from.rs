//! Custom mail-from domain handler
//!
//! Binds a mail-from subdomain to an existing domain identity and emits the
//! MX and SPF record sets the subdomain needs. The identity must already be
//! registered; this handler never creates one implicitly.

use crate::props::{require_dotless, require_str};
use async_trait::async_trait;
use sesres_core::records::mail_from_records;
use sesres_core::{
    ClientFactory, DomainRegionId, Error, PropertySpec, Reconciliation, ResourceHandler, Result,
    Schema, COULD_NOT_CREATE,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

const DEFAULT_TTL: u64 = 60;
const DEFAULT_BEHAVIOR: &str = "UseDefaultValue";

pub struct MailFromDomainHandler {
    clients: Arc<dyn ClientFactory>,
    schema: Schema,
}

impl MailFromDomainHandler {
    pub fn new(clients: Arc<dyn ClientFactory>) -> Self {
        Self {
            clients,
            schema: Schema::new()
                .required(&["Domain", "Region", "MailFromSubdomain"])
                .property("Domain", PropertySpec::string())
                .property("Region", PropertySpec::string())
                .property("MailFromSubdomain", PropertySpec::string())
                .property(
                    "BehaviorOnMXFailure",
                    PropertySpec::string()
                        .with_allowed(&["UseDefaultValue", "RejectMessage"])
                        .with_default(DEFAULT_BEHAVIOR),
                )
                .property(
                    "RecordSetDefaults",
                    PropertySpec::object().with_default(json!({"TTL": DEFAULT_TTL})),
                ),
        }
    }

    fn ttl(cx: &Reconciliation) -> u64 {
        cx.get("RecordSetDefaults")
            .and_then(|defaults| defaults.get("TTL"))
            .and_then(|ttl| match ttl {
                Value::Number(n) => n.as_u64(),
                Value::String(s) => s.parse().ok(),
                _ => None,
            })
            .unwrap_or(DEFAULT_TTL)
    }

    /// Set (or clear, for an empty subdomain) the mail-from binding
    async fn apply(&self, cx: &mut Reconciliation, subdomain: &str) -> Result<()> {
        let domain = require_dotless(cx, "Domain")?;
        let region = require_str(cx, "Region")?;
        let behavior = cx
            .get_str("BehaviorOnMXFailure")
            .unwrap_or(DEFAULT_BEHAVIOR)
            .to_string();
        let ses = self.clients.ses(&region);

        let mail_from = if subdomain.is_empty() {
            None
        } else {
            Some(format!("{}.{}", subdomain, domain))
        };
        ses.set_mail_from_domain(&domain, mail_from.as_deref(), &behavior)
            .await?;

        cx.set_physical_resource_id(DomainRegionId::new(&domain, &region).to_string());
        cx.set_attribute("Domain", domain.clone());
        cx.set_attribute("Region", region.clone());
        let records = mail_from_records(&domain, subdomain, &region, Self::ttl(cx));
        cx.set_attribute("RecordSets", serde_json::to_value(&records)?);
        Ok(())
    }
}

#[async_trait]
impl ResourceHandler for MailFromDomainHandler {
    fn resource_types(&self) -> &'static [&'static str] {
        &["Custom::MailFromDomain"]
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn create(&self, cx: &mut Reconciliation) -> Result<()> {
        let domain = require_dotless(cx, "Domain")?;
        let region = require_str(cx, "Region")?;
        let ses = self.clients.ses(&region);

        if !ses.domain_identity_exists(&domain).await? {
            cx.set_physical_resource_id(COULD_NOT_CREATE);
            return Err(Error::conflict(format!(
                "SES domain identity {} must exist in region {} before setting mail from value",
                domain, region
            )));
        }

        let subdomain = require_str(cx, "MailFromSubdomain")?;
        self.apply(cx, &subdomain).await
    }

    async fn update(&self, cx: &mut Reconciliation) -> Result<()> {
        if cx.unchanged_update(&[
            "Domain",
            "Region",
            "MailFromSubdomain",
            "BehaviorOnMXFailure",
            "RecordSetDefaults",
        ]) {
            cx.success("no effective change to mail from domain");
            return Ok(());
        }
        let subdomain = require_str(cx, "MailFromSubdomain")?;
        self.apply(cx, &subdomain).await
    }

    async fn delete(&self, cx: &mut Reconciliation) -> Result<()> {
        match cx.physical_resource_id() {
            None | Some(COULD_NOT_CREATE) => return Ok(()),
            Some(_) => {}
        }

        // Clearing the binding on a drifted or already-deleted identity
        // must not block stack cleanup.
        if let Err(e) = self.apply(cx, "").await {
            warn!(error = %e, "ignoring failed clear of mail from domain");
            cx.success(format!("ignoring failed clear of mail from domain, {}", e));
        }
        Ok(())
    }
}
