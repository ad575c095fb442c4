//! Legacy all-in-one DKIM handler
//!
//! Verifies the domain of a hosted zone, issues DKIM tokens and writes the
//! resulting TXT and CNAME records straight into the zone. Kept for stacks
//! predating the split into the converged identity/token/record handlers;
//! it is the only handler that mutates DNS itself.

use crate::props::require_str;
use async_trait::async_trait;
use sesres_core::envelope::strip_trailing_dot;
use sesres_core::records::{dkim_records, verification_record, RecordSet};
use sesres_core::traits::{RecordChange, ZoneRecord};
use sesres_core::{
    ClientFactory, PropertySpec, Reconciliation, ResourceHandler, Result, Schema,
    COULD_NOT_CREATE,
};
use std::sync::Arc;

const DEFAULT_REGION: &str = "eu-west-1";
const RECORD_TTL: u64 = 60;

fn to_zone_record(record: RecordSet) -> ZoneRecord {
    ZoneRecord {
        name: record.name,
        rtype: record.rtype.as_str().to_string(),
        ttl: Some(record.ttl),
        values: record.values,
    }
}

pub struct DkimZoneHandler {
    clients: Arc<dyn ClientFactory>,
    schema: Schema,
}

impl DkimZoneHandler {
    pub fn new(clients: Arc<dyn ClientFactory>) -> Self {
        Self {
            clients,
            schema: Schema::new()
                .required(&["HostedZoneId"])
                .property("HostedZoneId", PropertySpec::string())
                .property("Region", PropertySpec::string().with_default(DEFAULT_REGION)),
        }
    }

    async fn upsert(&self, cx: &mut Reconciliation) -> Result<()> {
        let zone_id = require_str(cx, "HostedZoneId")?;
        let region = require_str(cx, "Region")?;
        let route53 = self.clients.route53();
        let ses = self.clients.ses(&region);

        let zone_name = route53.hosted_zone_name(&zone_id).await?;
        let domain = strip_trailing_dot(&zone_name).to_string();

        let token = ses.verify_domain_identity(&domain).await?;
        let tokens = ses.verify_domain_dkim(&domain).await?;

        let mut changes = vec![RecordChange::upsert(to_zone_record(verification_record(
            &domain, &token, RECORD_TTL,
        )))];
        changes.extend(
            dkim_records(&domain, &tokens, RECORD_TTL)
                .into_iter()
                .map(|record| RecordChange::upsert(to_zone_record(record))),
        );

        let change_id = route53.change_record_sets(&zone_id, changes).await?;
        cx.set_attribute("ChangeId", change_id);
        cx.set_physical_resource_id(zone_id.clone());
        cx.success(format!("DKIM records written to hosted zone {}", zone_id));
        Ok(())
    }
}

#[async_trait]
impl ResourceHandler for DkimZoneHandler {
    fn resource_types(&self) -> &'static [&'static str] {
        &["Custom::DKIM"]
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn create(&self, cx: &mut Reconciliation) -> Result<()> {
        self.upsert(cx).await
    }

    async fn update(&self, cx: &mut Reconciliation) -> Result<()> {
        self.upsert(cx).await
    }

    async fn delete(&self, cx: &mut Reconciliation) -> Result<()> {
        let zone_id = match cx.physical_resource_id() {
            None | Some(COULD_NOT_CREATE) => return Ok(()),
            Some(pid) => pid.to_string(),
        };
        let route53 = self.clients.route53();
        let zone_name = route53.hosted_zone_name(&zone_id).await?;

        // Only the records this handler writes: the per-token DKIM CNAMEs
        // and the ownership TXT record.
        let dkim_suffix = format!("._domainkey.{}", zone_name);
        let mut doomed: Vec<ZoneRecord> = route53
            .list_record_sets(&zone_id, Some(&format!("_domainkey.{}", zone_name)))
            .await?
            .into_iter()
            .filter(|r| r.rtype == "CNAME" && r.name.ends_with(&dkim_suffix))
            .collect();

        let txt_name = format!("_amazonses.{}", zone_name);
        doomed.extend(
            route53
                .list_record_sets(&zone_id, Some(&txt_name))
                .await?
                .into_iter()
                .filter(|r| r.rtype == "TXT" && r.name == txt_name),
        );

        if !doomed.is_empty() {
            let changes = doomed.into_iter().map(RecordChange::delete).collect();
            let change_id = route53.change_record_sets(&zone_id, changes).await?;
            cx.set_attribute("ChangeId", change_id);
        }
        Ok(())
    }
}
