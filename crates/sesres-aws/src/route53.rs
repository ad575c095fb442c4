//! Route53 implementation of the DNS trait

use async_trait::async_trait;
use aws_sdk_route53::types::{
    Change, ChangeAction as SdkChangeAction, ChangeBatch, ResourceRecord, ResourceRecordSet,
    RrType,
};
use aws_sdk_route53::Client;
use sesres_core::traits::{ChangeAction, RecordChange, Route53Api, ZoneRecord};
use sesres_core::{Error, Result};

pub struct Route53Client {
    client: Client,
}

impl Route53Client {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn to_sdk_change(change: RecordChange) -> Result<Change> {
    let action = match change.action {
        ChangeAction::Upsert => SdkChangeAction::Upsert,
        ChangeAction::Delete => SdkChangeAction::Delete,
    };

    let mut record_set = ResourceRecordSet::builder()
        .name(change.record.name)
        .r#type(RrType::from(change.record.rtype.as_str()));
    if let Some(ttl) = change.record.ttl {
        record_set = record_set.ttl(ttl as i64);
    }
    for value in change.record.values {
        record_set = record_set.resource_records(
            ResourceRecord::builder()
                .value(value)
                .build()
                .map_err(|e| Error::route53(e.to_string()))?,
        );
    }

    Change::builder()
        .action(action)
        .resource_record_set(
            record_set
                .build()
                .map_err(|e| Error::route53(e.to_string()))?,
        )
        .build()
        .map_err(|e| Error::route53(e.to_string()))
}

#[async_trait]
impl Route53Api for Route53Client {
    async fn hosted_zone_name(&self, zone_id: &str) -> Result<String> {
        let output = self
            .client
            .get_hosted_zone()
            .id(zone_id)
            .send()
            .await
            .map_err(|e| Error::route53(e.to_string()))?;
        output
            .hosted_zone()
            .map(|zone| zone.name().to_string())
            .ok_or_else(|| Error::route53(format!("hosted zone {} has no metadata", zone_id)))
    }

    async fn list_record_sets(
        &self,
        zone_id: &str,
        start_name: Option<&str>,
    ) -> Result<Vec<ZoneRecord>> {
        let mut records = Vec::new();
        let mut next_name = start_name.map(String::from);
        let mut next_type = None;
        let mut next_identifier = None;
        loop {
            let page = self
                .client
                .list_resource_record_sets()
                .hosted_zone_id(zone_id)
                .set_start_record_name(next_name.take())
                .set_start_record_type(next_type.take())
                .set_start_record_identifier(next_identifier.take())
                .send()
                .await
                .map_err(|e| Error::route53(e.to_string()))?;
            records.extend(page.resource_record_sets().iter().map(|set| ZoneRecord {
                name: set.name().to_string(),
                rtype: set.r#type().as_str().to_string(),
                ttl: set.ttl().map(|ttl| ttl as u64),
                values: set
                    .resource_records()
                    .iter()
                    .map(|record| record.value().to_string())
                    .collect(),
            }));
            if !page.is_truncated() {
                break;
            }
            next_name = page.next_record_name().map(String::from);
            next_type = page.next_record_type().cloned();
            next_identifier = page.next_record_identifier().map(String::from);
        }
        Ok(records)
    }

    async fn change_record_sets(
        &self,
        zone_id: &str,
        changes: Vec<RecordChange>,
    ) -> Result<String> {
        let mut batch = ChangeBatch::builder();
        for change in changes {
            batch = batch.changes(to_sdk_change(change)?);
        }
        let output = self
            .client
            .change_resource_record_sets()
            .hosted_zone_id(zone_id)
            .change_batch(batch.build().map_err(|e| Error::route53(e.to_string()))?)
            .send()
            .await
            .map_err(|e| Error::route53(e.to_string()))?;
        output
            .change_info()
            .map(|info| info.id().to_string())
            .ok_or_else(|| Error::route53("change batch accepted without change info"))
    }
}
