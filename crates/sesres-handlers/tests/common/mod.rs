//! Test doubles and common utilities for the handler contract tests
//!
//! The fakes hold their state in plain mutex-guarded maps and count every
//! mutating call, so the tests can assert not only on the response envelope
//! but on exactly which service calls a reconciliation made.

use async_trait::async_trait;
use serde_json::Value;
use sesres_core::error::{Error, Result};
use sesres_core::traits::{
    ChangeAction, ClientFactory, MailFromAttributes, NotificationAttributes, NotificationKind,
    RecordChange, Route53Api, SesApi, VerificationAttributes, ZoneRecord,
};
use sesres_core::{Dispatcher, HandlerRegistry, Operation, ResourceRequest};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// In-memory SES double with per-operation call counters
#[derive(Default)]
pub struct FakeSes {
    pub identities: Mutex<HashSet<String>>,
    pub verification: Mutex<HashMap<String, VerificationAttributes>>,
    pub mail_from: Mutex<HashMap<String, MailFromAttributes>>,
    pub notifications: Mutex<HashMap<String, NotificationAttributes>>,
    pub policies: Mutex<HashMap<(String, String), String>>,
    pub active_rule_set: Mutex<Option<String>>,
    pub dkim_tokens: Mutex<Vec<String>>,

    pub verify_calls: AtomicUsize,
    pub dkim_calls: AtomicUsize,
    pub delete_identity_calls: AtomicUsize,
    pub set_mail_from_calls: AtomicUsize,
    pub set_topic_calls: AtomicUsize,
    pub set_headers_calls: AtomicUsize,
    pub set_forwarding_calls: AtomicUsize,
    pub put_policy_calls: AtomicUsize,
    pub delete_policy_calls: AtomicUsize,
    pub set_active_rule_set_calls: AtomicUsize,
}

impl FakeSes {
    pub fn new() -> Self {
        Self {
            dkim_tokens: Mutex::new(vec![
                "zephyr".to_string(),
                "aurora".to_string(),
                "meridian".to_string(),
            ]),
            ..Self::default()
        }
    }

    pub fn with_identity(self, domain: &str) -> Self {
        self.identities.lock().unwrap().insert(domain.to_string());
        self
    }

    pub fn with_verification(self, identity: &str, status: &str, token: Option<&str>) -> Self {
        self.verification.lock().unwrap().insert(
            identity.to_string(),
            VerificationAttributes {
                status: status.to_string(),
                token: token.map(String::from),
            },
        );
        self
    }

    pub fn with_mail_from(self, identity: &str, mail_from: &str, status: &str) -> Self {
        self.mail_from.lock().unwrap().insert(
            identity.to_string(),
            MailFromAttributes {
                mail_from_domain: Some(mail_from.to_string()),
                status: Some(status.to_string()),
            },
        );
        self
    }

    pub fn mutation_count(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
            + self.dkim_calls.load(Ordering::SeqCst)
            + self.delete_identity_calls.load(Ordering::SeqCst)
            + self.set_mail_from_calls.load(Ordering::SeqCst)
            + self.set_topic_calls.load(Ordering::SeqCst)
            + self.set_headers_calls.load(Ordering::SeqCst)
            + self.set_forwarding_calls.load(Ordering::SeqCst)
            + self.put_policy_calls.load(Ordering::SeqCst)
            + self.delete_policy_calls.load(Ordering::SeqCst)
            + self.set_active_rule_set_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SesApi for FakeSes {
    async fn verify_domain_identity(&self, domain: &str) -> Result<String> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        self.identities.lock().unwrap().insert(domain.to_string());
        Ok(format!("token-for-{}", domain))
    }

    async fn verify_domain_dkim(&self, domain: &str) -> Result<Vec<String>> {
        self.dkim_calls.fetch_add(1, Ordering::SeqCst);
        self.identities.lock().unwrap().insert(domain.to_string());
        Ok(self.dkim_tokens.lock().unwrap().clone())
    }

    async fn delete_identity(&self, identity: &str) -> Result<()> {
        self.delete_identity_calls.fetch_add(1, Ordering::SeqCst);
        if !self.identities.lock().unwrap().remove(identity) {
            return Err(Error::ses(format!("identity {} not found", identity)));
        }
        Ok(())
    }

    async fn list_domain_identities(&self) -> Result<Vec<String>> {
        let mut identities: Vec<String> =
            self.identities.lock().unwrap().iter().cloned().collect();
        identities.sort();
        Ok(identities)
    }

    async fn get_verification_attributes(
        &self,
        identity: &str,
    ) -> Result<Option<VerificationAttributes>> {
        Ok(self.verification.lock().unwrap().get(identity).cloned())
    }

    async fn get_mail_from_attributes(
        &self,
        identity: &str,
    ) -> Result<Option<MailFromAttributes>> {
        Ok(self.mail_from.lock().unwrap().get(identity).cloned())
    }

    async fn set_mail_from_domain(
        &self,
        identity: &str,
        mail_from_domain: Option<&str>,
        _behavior_on_mx_failure: &str,
    ) -> Result<()> {
        self.set_mail_from_calls.fetch_add(1, Ordering::SeqCst);
        if !self.identities.lock().unwrap().contains(identity) {
            return Err(Error::ses(format!("identity {} not found", identity)));
        }
        self.mail_from.lock().unwrap().insert(
            identity.to_string(),
            MailFromAttributes {
                mail_from_domain: mail_from_domain.map(String::from),
                status: mail_from_domain.map(|_| "Pending".to_string()),
            },
        );
        Ok(())
    }

    async fn get_notification_attributes(
        &self,
        identity: &str,
    ) -> Result<Option<NotificationAttributes>> {
        Ok(self.notifications.lock().unwrap().get(identity).cloned())
    }

    async fn set_notification_topic(
        &self,
        identity: &str,
        kind: NotificationKind,
        topic: Option<&str>,
    ) -> Result<()> {
        self.set_topic_calls.fetch_add(1, Ordering::SeqCst);
        if !self.identities.lock().unwrap().contains(identity) {
            return Err(Error::ses(format!("identity {} not found", identity)));
        }
        let mut notifications = self.notifications.lock().unwrap();
        let attrs = notifications.entry(identity.to_string()).or_default();
        let topic = topic.map(String::from);
        match kind {
            NotificationKind::Bounce => attrs.bounce_topic = topic,
            NotificationKind::Complaint => attrs.complaint_topic = topic,
            NotificationKind::Delivery => attrs.delivery_topic = topic,
        }
        Ok(())
    }

    async fn set_headers_in_notifications(
        &self,
        _identity: &str,
        _kind: NotificationKind,
        _enabled: bool,
    ) -> Result<()> {
        self.set_headers_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn set_feedback_forwarding(&self, identity: &str, enabled: bool) -> Result<()> {
        self.set_forwarding_calls.fetch_add(1, Ordering::SeqCst);
        if !self.identities.lock().unwrap().contains(identity) {
            return Err(Error::ses(format!("identity {} not found", identity)));
        }
        let mut notifications = self.notifications.lock().unwrap();
        let attrs = notifications.entry(identity.to_string()).or_default();
        attrs.forwarding_enabled = enabled;
        Ok(())
    }

    async fn get_identity_policy(
        &self,
        identity: &str,
        policy_name: &str,
    ) -> Result<Option<String>> {
        Ok(self
            .policies
            .lock()
            .unwrap()
            .get(&(identity.to_string(), policy_name.to_string()))
            .cloned())
    }

    async fn put_identity_policy(
        &self,
        identity: &str,
        policy_name: &str,
        policy: &str,
    ) -> Result<()> {
        self.put_policy_calls.fetch_add(1, Ordering::SeqCst);
        self.policies.lock().unwrap().insert(
            (identity.to_string(), policy_name.to_string()),
            policy.to_string(),
        );
        Ok(())
    }

    async fn delete_identity_policy(&self, identity: &str, policy_name: &str) -> Result<()> {
        self.delete_policy_calls.fetch_add(1, Ordering::SeqCst);
        self.policies
            .lock()
            .unwrap()
            .remove(&(identity.to_string(), policy_name.to_string()));
        Ok(())
    }

    async fn list_identity_policies(&self, identity: &str) -> Result<Vec<String>> {
        let mut names: Vec<String> = self
            .policies
            .lock()
            .unwrap()
            .keys()
            .filter(|(id, _)| id == identity)
            .map(|(_, name)| name.clone())
            .collect();
        names.sort();
        Ok(names)
    }

    async fn active_rule_set(&self) -> Result<Option<String>> {
        Ok(self.active_rule_set.lock().unwrap().clone())
    }

    async fn set_active_rule_set(&self, name: Option<&str>) -> Result<()> {
        self.set_active_rule_set_calls.fetch_add(1, Ordering::SeqCst);
        *self.active_rule_set.lock().unwrap() = name.map(String::from);
        Ok(())
    }
}

/// In-memory hosted zone double
pub struct FakeRoute53 {
    pub zone_id: String,
    pub zone_name: String,
    pub records: Mutex<Vec<ZoneRecord>>,
    pub change_calls: AtomicUsize,
}

impl FakeRoute53 {
    pub fn new(zone_id: &str, zone_name: &str) -> Self {
        Self {
            zone_id: zone_id.to_string(),
            zone_name: zone_name.to_string(),
            records: Mutex::new(Vec::new()),
            change_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_record(self, name: &str, rtype: &str, value: &str) -> Self {
        self.records.lock().unwrap().push(ZoneRecord {
            name: name.to_string(),
            rtype: rtype.to_string(),
            ttl: Some(60),
            values: vec![value.to_string()],
        });
        self
    }

    pub fn record_names(&self) -> Vec<String> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.name.clone())
            .collect()
    }
}

#[async_trait]
impl Route53Api for FakeRoute53 {
    async fn hosted_zone_name(&self, zone_id: &str) -> Result<String> {
        if zone_id != self.zone_id {
            return Err(Error::route53(format!("no such hosted zone {}", zone_id)));
        }
        Ok(self.zone_name.clone())
    }

    async fn list_record_sets(
        &self,
        zone_id: &str,
        _start_name: Option<&str>,
    ) -> Result<Vec<ZoneRecord>> {
        if zone_id != self.zone_id {
            return Err(Error::route53(format!("no such hosted zone {}", zone_id)));
        }
        Ok(self.records.lock().unwrap().clone())
    }

    async fn change_record_sets(
        &self,
        zone_id: &str,
        changes: Vec<RecordChange>,
    ) -> Result<String> {
        if zone_id != self.zone_id {
            return Err(Error::route53(format!("no such hosted zone {}", zone_id)));
        }
        let change_number = self.change_calls.fetch_add(1, Ordering::SeqCst) + 1;
        let mut records = self.records.lock().unwrap();
        for change in changes {
            records.retain(|r| {
                !(r.name == change.record.name && r.rtype == change.record.rtype)
            });
            if change.action == ChangeAction::Upsert {
                records.push(change.record);
            }
        }
        Ok(format!("change-{}", change_number))
    }
}

/// Client factory handing out the shared fakes
pub struct FakeFactory {
    pub ses: Arc<FakeSes>,
    pub route53: Arc<FakeRoute53>,
    pub account_id: String,
    pub ses_regions: Mutex<Vec<String>>,
}

impl FakeFactory {
    pub fn new(ses: FakeSes) -> Self {
        Self::with_route53(ses, FakeRoute53::new("Z-UNUSED", "unused.example."))
    }

    pub fn with_route53(ses: FakeSes, route53: FakeRoute53) -> Self {
        Self {
            ses: Arc::new(ses),
            route53: Arc::new(route53),
            account_id: "123456789012".to_string(),
            ses_regions: Mutex::new(Vec::new()),
        }
    }

    pub fn requested_regions(&self) -> Vec<String> {
        self.ses_regions.lock().unwrap().clone()
    }
}

#[async_trait]
impl ClientFactory for FakeFactory {
    fn ses(&self, region: &str) -> Arc<dyn SesApi> {
        self.ses_regions.lock().unwrap().push(region.to_string());
        self.ses.clone()
    }

    fn route53(&self) -> Arc<dyn Route53Api> {
        self.route53.clone()
    }

    async fn account_id(&self) -> Result<String> {
        Ok(self.account_id.clone())
    }
}

/// Dispatcher wired with the full handler registry over the given fakes
pub fn dispatcher(factory: Arc<FakeFactory>) -> Dispatcher {
    let registry = Arc::new(HandlerRegistry::new());
    sesres_handlers::register_all(&registry, factory);
    Dispatcher::new(registry)
}

pub fn create_request(resource_type: &str, properties: Value) -> ResourceRequest {
    request(Operation::Create, resource_type, properties, None, None)
}

pub fn update_request(
    resource_type: &str,
    properties: Value,
    old_properties: Value,
    physical_resource_id: &str,
) -> ResourceRequest {
    request(
        Operation::Update,
        resource_type,
        properties,
        Some(old_properties),
        Some(physical_resource_id),
    )
}

pub fn delete_request(
    resource_type: &str,
    properties: Value,
    physical_resource_id: &str,
) -> ResourceRequest {
    request(
        Operation::Delete,
        resource_type,
        properties,
        None,
        Some(physical_resource_id),
    )
}

pub fn request(
    operation: Operation,
    resource_type: &str,
    properties: Value,
    old_properties: Option<Value>,
    physical_resource_id: Option<&str>,
) -> ResourceRequest {
    ResourceRequest {
        operation,
        resource_type: resource_type.to_string(),
        request_id: "req-1".to_string(),
        stack_id: "stack-1".to_string(),
        logical_resource_id: "Resource".to_string(),
        response_url: None,
        physical_resource_id: physical_resource_id.map(String::from),
        resource_properties: properties.as_object().cloned().unwrap_or_default(),
        old_resource_properties: old_properties
            .map(|old| old.as_object().cloned().unwrap_or_default()),
        attempt: 1,
    }
}
