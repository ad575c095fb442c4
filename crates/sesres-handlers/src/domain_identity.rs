//! Domain identity handler
//!
//! Registers a domain identity with the email service and hands back the
//! verification token plus the TXT record set a DNS-apply step needs to
//! publish. Creation is conflict-checked against the live identity listing
//! so two stacks cannot silently share one identity.

use crate::props::{require_dotless, require_str};
use async_trait::async_trait;
use sesres_core::records::verification_record;
use sesres_core::traits::SesApi;
use sesres_core::{
    ClientFactory, DomainRegionId, Error, PropertySpec, Reconciliation, ResourceHandler, Result,
    Schema, COULD_NOT_CREATE,
};
use std::sync::Arc;
use tracing::warn;

const DEFAULT_TTL: u64 = 60;

pub struct DomainIdentityHandler {
    clients: Arc<dyn ClientFactory>,
    schema: Schema,
}

impl DomainIdentityHandler {
    pub fn new(clients: Arc<dyn ClientFactory>) -> Self {
        Self {
            clients,
            schema: Schema::new()
                .required(&["Domain", "Region"])
                .property("Domain", PropertySpec::string())
                .property("Region", PropertySpec::string())
                .property("TTL", PropertySpec::integer().with_default(DEFAULT_TTL)),
        }
    }

    /// Request verification and record the token plus DNS outputs
    async fn verify(&self, cx: &mut Reconciliation, ses: &dyn SesApi) -> Result<()> {
        let domain = require_dotless(cx, "Domain")?;
        let region = require_str(cx, "Region")?;
        let ttl = cx.get_u64("TTL").unwrap_or(DEFAULT_TTL);

        let token = ses.verify_domain_identity(&domain).await?;
        cx.set_physical_resource_id(DomainRegionId::new(&domain, &region).to_string());

        let record = verification_record(&domain, &token, ttl);
        cx.set_attribute("VerificationToken", token);
        cx.set_attribute("DNSRecordType", record.rtype.as_str());
        cx.set_attribute("DNSRecordName", record.name.clone());
        cx.set_attribute("DNSResourceRecords", record.values.clone());
        cx.set_attribute("RecordSets", vec![serde_json::to_value(&record)?]);
        cx.success(format!(
            "domain identity verification requested for {} in region {}",
            domain, region
        ));
        Ok(())
    }
}

#[async_trait]
impl ResourceHandler for DomainIdentityHandler {
    fn resource_types(&self) -> &'static [&'static str] {
        &["Custom::DomainIdentity"]
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn create(&self, cx: &mut Reconciliation) -> Result<()> {
        let domain = require_dotless(cx, "Domain")?;
        let region = require_str(cx, "Region")?;
        let ses = self.clients.ses(&region);

        if ses.domain_identity_exists(&domain).await? {
            cx.set_physical_resource_id(COULD_NOT_CREATE);
            return Err(Error::conflict(format!(
                "SES domain identity {} already exists in region {}",
                domain, region
            )));
        }
        self.verify(cx, ses.as_ref()).await
    }

    async fn update(&self, cx: &mut Reconciliation) -> Result<()> {
        if cx.unchanged_update(&["Domain", "Region", "TTL"]) {
            cx.success("no effective change to domain identity");
            return Ok(());
        }

        let domain = require_dotless(cx, "Domain")?;
        let region = require_str(cx, "Region")?;
        let ses = self.clients.ses(&region);

        // A changed domain or region names a different identity; refuse to
        // silently take over one that already exists there.
        let identity_changed =
            !cx.property_unchanged("Domain") || !cx.property_unchanged("Region");
        if identity_changed && ses.domain_identity_exists(&domain).await? {
            return Err(Error::conflict(format!(
                "cannot change domain identity to {} as it already exists in region {}",
                domain, region
            )));
        }
        self.verify(cx, ses.as_ref()).await
    }

    async fn delete(&self, cx: &mut Reconciliation) -> Result<()> {
        // The id names the identity this resource actually created, which
        // after identity-defining updates may differ from the properties.
        let id: DomainRegionId = match cx.physical_resource_id() {
            None | Some(COULD_NOT_CREATE) => return Ok(()),
            Some(pid) => pid.parse()?,
        };
        let ses = self.clients.ses(&id.region);

        if let Err(e) = ses.delete_identity(&id.domain).await {
            // The identity may have been removed out of band; a delete
            // must not wedge the stack on drift.
            warn!(domain = %id.domain, region = %id.region, error = %e, "ignoring failed delete of identity");
            cx.success(format!("ignoring failed delete of identity, {}", e));
        }
        Ok(())
    }
}
