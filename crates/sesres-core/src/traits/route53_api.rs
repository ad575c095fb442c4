// # Route53 API Trait
//
// DNS zone reads and record-set change batches. Only the legacy
// all-in-one DKIM handler mutates DNS directly; the converged handlers
// emit record descriptors as output data instead.

use crate::error::Result;
use async_trait::async_trait;

/// A record set as stored in a hosted zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneRecord {
    pub name: String,
    /// "TXT", "CNAME", ... (service-defined strings)
    pub rtype: String,
    pub ttl: Option<u64>,
    pub values: Vec<String>,
}

/// Action within a change batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeAction {
    Upsert,
    Delete,
}

/// One entry of a change batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordChange {
    pub action: ChangeAction,
    pub record: ZoneRecord,
}

impl RecordChange {
    pub fn upsert(record: ZoneRecord) -> Self {
        Self {
            action: ChangeAction::Upsert,
            record,
        }
    }

    pub fn delete(record: ZoneRecord) -> Self {
        Self {
            action: ChangeAction::Delete,
            record,
        }
    }
}

/// Trait for the DNS service
#[async_trait]
pub trait Route53Api: Send + Sync {
    /// Fully qualified name of a hosted zone (with trailing dot)
    async fn hosted_zone_name(&self, zone_id: &str) -> Result<String>;

    /// Record sets of a zone, optionally starting at a record name
    /// (paginated internally)
    async fn list_record_sets(
        &self,
        zone_id: &str,
        start_name: Option<&str>,
    ) -> Result<Vec<ZoneRecord>>;

    /// Apply a change batch; returns the change-tracking id
    async fn change_record_sets(
        &self,
        zone_id: &str,
        changes: Vec<RecordChange>,
    ) -> Result<String>;
}
