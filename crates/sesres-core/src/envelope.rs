//! Request/response envelopes and the reconciliation context
//!
//! A handler never touches the raw envelope: the dispatcher validates the
//! properties against the handler's schema and hands it a [`Reconciliation`]
//! context that accumulates the result (status, reason, physical id,
//! output attributes, re-invocation hint).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

/// The declarative operation requested by the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Create,
    Update,
    Delete,
}

/// Terminal status of a reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "SUCCESS")]
    Success,
    #[serde(rename = "FAILED")]
    Failed,
}

fn default_attempt() -> u32 {
    1
}

/// One reconciliation request, immutable per invocation
///
/// `old_resource_properties` is present only on Update; `physical_resource_id`
/// is present on Update/Delete and carries a previously returned identifier.
/// `attempt` counts re-invocations of the async pollers and defaults to 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceRequest {
    #[serde(rename = "RequestType")]
    pub operation: Operation,
    pub resource_type: String,
    #[serde(default)]
    pub request_id: String,
    #[serde(default)]
    pub stack_id: String,
    #[serde(default)]
    pub logical_resource_id: String,
    #[serde(rename = "ResponseURL", default, skip_serializing_if = "Option::is_none")]
    pub response_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_resource_id: Option<String>,
    #[serde(default)]
    pub resource_properties: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_resource_properties: Option<Map<String, Value>>,
    #[serde(default = "default_attempt")]
    pub attempt: u32,
}

/// The outbound result envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceResponse {
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_resource_id: Option<String>,
    #[serde(default)]
    pub request_id: String,
    #[serde(default)]
    pub stack_id: String,
    #[serde(default)]
    pub logical_resource_id: String,
    #[serde(default)]
    pub data: Map<String, Value>,
}

/// Strip exactly one trailing `.` from a domain-like value
pub fn strip_trailing_dot(value: &str) -> &str {
    value.strip_suffix('.').unwrap_or(value)
}

/// Mutable reconciliation state for one invocation
///
/// Wraps the validated request and collects the response. The shared
/// accessors replace the Python-era handler base class: everything here is
/// a pure function of the request plus the mutations a handler records.
#[derive(Debug)]
pub struct Reconciliation {
    request: ResourceRequest,
    status: Status,
    reason: Option<String>,
    physical_resource_id: Option<String>,
    data: Map<String, Value>,
    reinvoke_after: Option<Duration>,
}

impl Reconciliation {
    pub fn new(request: ResourceRequest) -> Self {
        let physical_resource_id = request.physical_resource_id.clone();
        Self {
            request,
            status: Status::Success,
            reason: None,
            physical_resource_id,
            data: Map::new(),
            reinvoke_after: None,
        }
    }

    pub fn operation(&self) -> Operation {
        self.request.operation
    }

    pub fn resource_type(&self) -> &str {
        &self.request.resource_type
    }

    pub fn attempt(&self) -> u32 {
        self.request.attempt
    }

    pub fn request(&self) -> &ResourceRequest {
        &self.request
    }

    /// Desired-state property value, or None when absent
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.request.resource_properties.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(Value::as_u64)
    }

    /// Domain-like property with exactly one trailing dot stripped
    pub fn get_dotless(&self, key: &str) -> Option<&str> {
        self.get_str(key).map(strip_trailing_dot)
    }

    /// Prior-state property value
    ///
    /// Only consulted under Update; under Create/Delete there is no prior
    /// state to compare against and the fallback is returned.
    pub fn get_old<'a>(&'a self, key: &str, fallback: &'a Value) -> &'a Value {
        if self.request.operation != Operation::Update {
            return fallback;
        }
        self.request
            .old_resource_properties
            .as_ref()
            .and_then(|old| old.get(key))
            .unwrap_or(fallback)
    }

    pub fn get_old_str<'a>(&'a self, key: &str, fallback: &'a str) -> &'a str {
        if self.request.operation != Operation::Update {
            return fallback;
        }
        self.request
            .old_resource_properties
            .as_ref()
            .and_then(|old| old.get(key))
            .and_then(Value::as_str)
            .unwrap_or(fallback)
    }

    pub fn get_old_dotless<'a>(&'a self, key: &str, fallback: &'a str) -> &'a str {
        strip_trailing_dot(self.get_old_str(key, fallback))
    }

    /// Whether a property is effectively unchanged between prior and
    /// desired state (string values compared with trailing-dot
    /// normalization). Always true outside Update.
    pub fn property_unchanged(&self, key: &str) -> bool {
        if self.request.operation != Operation::Update {
            return true;
        }
        let old = self
            .request
            .old_resource_properties
            .as_ref()
            .and_then(|old| old.get(key));
        let new = self.get(key);
        match (old, new) {
            (Some(Value::String(a)), Some(Value::String(b))) => {
                strip_trailing_dot(a) == strip_trailing_dot(b)
            }
            (a, b) => a == b,
        }
    }

    /// No-op fast path predicate: an Update where none of the listed
    /// effective properties changed requires no external mutation.
    pub fn unchanged_update(&self, keys: &[&str]) -> bool {
        self.request.operation == Operation::Update
            && keys.iter().all(|key| self.property_unchanged(key))
    }

    pub fn physical_resource_id(&self) -> Option<&str> {
        self.physical_resource_id.as_deref()
    }

    pub fn set_physical_resource_id(&mut self, id: impl Into<String>) {
        self.physical_resource_id = Some(id.into());
    }

    pub fn set_attribute(&mut self, name: &str, value: impl Into<Value>) {
        self.data.insert(name.to_string(), value.into());
    }

    pub fn get_attribute(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    /// Record a successful result with a human-readable reason
    pub fn success(&mut self, reason: impl Into<String>) {
        self.status = Status::Success;
        self.reason = Some(reason.into());
    }

    /// Record a failed result; the reason is required by the protocol
    pub fn fail(&mut self, reason: impl Into<String>) {
        self.status = Status::Failed;
        self.reason = Some(reason.into());
    }

    pub fn is_failed(&self) -> bool {
        self.status == Status::Failed
    }

    /// Suspend the result: the orchestrator should re-invoke after `delay`
    /// instead of finalizing. The dispatcher builds the next request.
    pub fn schedule_reinvoke(&mut self, delay: Duration) {
        self.reinvoke_after = Some(delay);
    }

    pub fn reinvoke_after(&self) -> Option<Duration> {
        self.reinvoke_after
    }

    /// Consume the context into the outbound envelope
    pub fn into_response(self) -> ResourceResponse {
        ResourceResponse {
            status: self.status,
            reason: self.reason,
            physical_resource_id: self.physical_resource_id,
            request_id: self.request.request_id,
            stack_id: self.request.stack_id,
            logical_resource_id: self.request.logical_resource_id,
            data: self.data,
        }
    }
}
