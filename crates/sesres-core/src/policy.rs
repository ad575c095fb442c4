//! Identity policy documents
//!
//! Equality is structural: same Version, same Statement list in order.
//! A stored document that fails to parse compares unequal to everything,
//! which forces a corrective put instead of raising.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One statement of an identity policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    #[serde(rename = "Effect", default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<String>,
    #[serde(rename = "Principal", default, skip_serializing_if = "Option::is_none")]
    pub principal: Option<Value>,
    #[serde(rename = "Action", default, skip_serializing_if = "Option::is_none")]
    pub action: Option<Value>,
    #[serde(rename = "Resource", default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<Value>,
}

/// A policy document: version plus an ordered statement list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDocument {
    #[serde(rename = "Version", default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(rename = "Statement", default)]
    pub statement: Vec<Statement>,
}

impl PolicyDocument {
    /// Parse a stored policy string; None when absent or unparseable
    pub fn from_json(data: Option<&str>) -> Option<Self> {
        serde_json::from_str(data?).ok()
    }

    /// Build from the desired `PolicyDocument` property value
    pub fn from_value(value: &Value) -> crate::Result<Self> {
        Ok(serde_json::from_value(value.clone())?)
    }

    /// Serialize for the put call
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn send_policy(effect: &str) -> Value {
        json!({
            "Version": "2008-10-17",
            "Statement": [{
                "Effect": effect,
                "Principal": {"AWS": "arn:aws:iam::123456789012:root"},
                "Action": ["ses:SendEmail", "ses:SendRawEmail"]
            }]
        })
    }

    #[test]
    fn structurally_equal_documents_compare_equal() {
        let desired = PolicyDocument::from_value(&send_policy("Allow")).unwrap();
        let stored = desired.to_json().unwrap();
        let current = PolicyDocument::from_json(Some(&stored));
        assert_eq!(current.as_ref(), Some(&desired));
    }

    #[test]
    fn any_field_difference_breaks_equality() {
        let allow = PolicyDocument::from_value(&send_policy("Allow")).unwrap();
        let deny = PolicyDocument::from_value(&send_policy("Deny")).unwrap();
        assert_ne!(allow, deny);
    }

    #[test]
    fn statement_order_matters() {
        let a = PolicyDocument::from_value(&json!({
            "Statement": [{"Effect": "Allow"}, {"Effect": "Deny"}]
        }))
        .unwrap();
        let b = PolicyDocument::from_value(&json!({
            "Statement": [{"Effect": "Deny"}, {"Effect": "Allow"}]
        }))
        .unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn unparseable_current_document_is_absent() {
        assert_eq!(PolicyDocument::from_json(Some("not json")), None);
        assert_eq!(PolicyDocument::from_json(None), None);
    }

    #[test]
    fn missing_version_differs_from_declared_version() {
        let with = PolicyDocument::from_value(&json!({"Version": "2008-10-17", "Statement": []}))
            .unwrap();
        let without = PolicyDocument::from_value(&json!({"Statement": []})).unwrap();
        assert_ne!(with, without);
    }
}
