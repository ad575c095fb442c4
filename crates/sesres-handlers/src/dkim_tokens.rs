//! DKIM token handler
//!
//! Issues the DKIM signing tokens for a domain and emits the CNAME record
//! data a DNS-apply step publishes. Token issuance is idempotent on the
//! service side, so Create and Update share one path and Delete has nothing
//! to undo.

use crate::props::{require_dotless, require_str};
use async_trait::async_trait;
use sesres_core::records::dkim_records;
use sesres_core::{
    ClientFactory, DomainRegionId, PropertySpec, Reconciliation, ResourceHandler, Result, Schema,
};
use std::sync::Arc;

const DEFAULT_REGION: &str = "eu-west-1";
const DEFAULT_TTL: u64 = 60;

pub struct DkimTokensHandler {
    clients: Arc<dyn ClientFactory>,
    schema: Schema,
}

impl DkimTokensHandler {
    pub fn new(clients: Arc<dyn ClientFactory>) -> Self {
        Self {
            clients,
            schema: Schema::new()
                .required(&["Domain"])
                .property("Domain", PropertySpec::string())
                .property("Region", PropertySpec::string().with_default(DEFAULT_REGION)),
        }
    }

    async fn issue_tokens(&self, cx: &mut Reconciliation) -> Result<()> {
        let domain = require_dotless(cx, "Domain")?;
        let region = require_str(cx, "Region")?;
        let ses = self.clients.ses(&region);

        let tokens = ses.verify_domain_dkim(&domain).await?;
        cx.set_physical_resource_id(DomainRegionId::new(&domain, &region).to_string());

        let records = dkim_records(&domain, &tokens, DEFAULT_TTL);
        let mut sorted = tokens;
        sorted.sort();

        cx.set_attribute("DkimTokens", sorted);
        cx.set_attribute(
            "DNSRecordTypes",
            records
                .iter()
                .map(|r| r.rtype.as_str())
                .collect::<Vec<_>>(),
        );
        cx.set_attribute(
            "DNSRecordNames",
            records.iter().map(|r| r.name.clone()).collect::<Vec<_>>(),
        );
        cx.set_attribute(
            "DNSResourceRecords",
            records.iter().map(|r| r.values.clone()).collect::<Vec<_>>(),
        );
        cx.success(format!(
            "DKIM tokens issued for {} in region {}",
            domain, region
        ));
        Ok(())
    }
}

#[async_trait]
impl ResourceHandler for DkimTokensHandler {
    fn resource_types(&self) -> &'static [&'static str] {
        &["Custom::DkimTokens"]
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn create(&self, cx: &mut Reconciliation) -> Result<()> {
        self.issue_tokens(cx).await
    }

    async fn update(&self, cx: &mut Reconciliation) -> Result<()> {
        self.issue_tokens(cx).await
    }

    async fn delete(&self, _cx: &mut Reconciliation) -> Result<()> {
        // Tokens carry no server-side state of their own.
        Ok(())
    }
}
