//! SES implementation of the email-identity trait
//!
//! One thin method per API call; SDK errors are flattened into the core
//! error type at this boundary so nothing upstream depends on SDK types.

use async_trait::async_trait;
use aws_sdk_ses::types::{BehaviorOnMxFailure, IdentityType, NotificationType};
use aws_sdk_ses::Client;
use sesres_core::traits::{
    MailFromAttributes, NotificationAttributes, NotificationKind, SesApi, VerificationAttributes,
};
use sesres_core::{Error, Result};

fn notification_type(kind: NotificationKind) -> NotificationType {
    match kind {
        NotificationKind::Bounce => NotificationType::Bounce,
        NotificationKind::Complaint => NotificationType::Complaint,
        NotificationKind::Delivery => NotificationType::Delivery,
    }
}

pub struct SesClient {
    client: Client,
}

impl SesClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SesApi for SesClient {
    async fn verify_domain_identity(&self, domain: &str) -> Result<String> {
        let output = self
            .client
            .verify_domain_identity()
            .domain(domain)
            .send()
            .await
            .map_err(|e| Error::ses(e.to_string()))?;
        Ok(output.verification_token().to_string())
    }

    async fn verify_domain_dkim(&self, domain: &str) -> Result<Vec<String>> {
        let output = self
            .client
            .verify_domain_dkim()
            .domain(domain)
            .send()
            .await
            .map_err(|e| Error::ses(e.to_string()))?;
        Ok(output.dkim_tokens().to_vec())
    }

    async fn delete_identity(&self, identity: &str) -> Result<()> {
        self.client
            .delete_identity()
            .identity(identity)
            .send()
            .await
            .map_err(|e| Error::ses(e.to_string()))?;
        Ok(())
    }

    async fn list_domain_identities(&self) -> Result<Vec<String>> {
        let mut identities = Vec::new();
        let mut pages = self
            .client
            .list_identities()
            .identity_type(IdentityType::Domain)
            .into_paginator()
            .send();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| Error::ses(e.to_string()))?;
            identities.extend(page.identities().iter().cloned());
        }
        Ok(identities)
    }

    async fn get_verification_attributes(
        &self,
        identity: &str,
    ) -> Result<Option<VerificationAttributes>> {
        let output = self
            .client
            .get_identity_verification_attributes()
            .identities(identity)
            .send()
            .await
            .map_err(|e| Error::ses(e.to_string()))?;
        Ok(output
            .verification_attributes()
            .get(identity)
            .map(|attrs| VerificationAttributes {
                status: attrs.verification_status().as_str().to_string(),
                token: attrs.verification_token().map(String::from),
            }))
    }

    async fn get_mail_from_attributes(
        &self,
        identity: &str,
    ) -> Result<Option<MailFromAttributes>> {
        let output = self
            .client
            .get_identity_mail_from_domain_attributes()
            .identities(identity)
            .send()
            .await
            .map_err(|e| Error::ses(e.to_string()))?;
        Ok(output
            .mail_from_domain_attributes()
            .get(identity)
            .map(|attrs| MailFromAttributes {
                mail_from_domain: Some(attrs.mail_from_domain().to_string()),
                status: Some(attrs.mail_from_domain_status().as_str().to_string()),
            }))
    }

    async fn set_mail_from_domain(
        &self,
        identity: &str,
        mail_from_domain: Option<&str>,
        behavior_on_mx_failure: &str,
    ) -> Result<()> {
        self.client
            .set_identity_mail_from_domain()
            .identity(identity)
            .set_mail_from_domain(mail_from_domain.map(String::from))
            .behavior_on_mx_failure(BehaviorOnMxFailure::from(behavior_on_mx_failure))
            .send()
            .await
            .map_err(|e| Error::ses(e.to_string()))?;
        Ok(())
    }

    async fn get_notification_attributes(
        &self,
        identity: &str,
    ) -> Result<Option<NotificationAttributes>> {
        let output = self
            .client
            .get_identity_notification_attributes()
            .identities(identity)
            .send()
            .await
            .map_err(|e| Error::ses(e.to_string()))?;
        Ok(output
            .notification_attributes()
            .get(identity)
            .map(|attrs| NotificationAttributes {
                bounce_topic: Some(attrs.bounce_topic().to_string()),
                complaint_topic: Some(attrs.complaint_topic().to_string()),
                delivery_topic: Some(attrs.delivery_topic().to_string()),
                forwarding_enabled: attrs.forwarding_enabled(),
            }))
    }

    async fn set_notification_topic(
        &self,
        identity: &str,
        kind: NotificationKind,
        topic: Option<&str>,
    ) -> Result<()> {
        self.client
            .set_identity_notification_topic()
            .identity(identity)
            .notification_type(notification_type(kind))
            .set_sns_topic(topic.map(String::from))
            .send()
            .await
            .map_err(|e| Error::ses(e.to_string()))?;
        Ok(())
    }

    async fn set_headers_in_notifications(
        &self,
        identity: &str,
        kind: NotificationKind,
        enabled: bool,
    ) -> Result<()> {
        self.client
            .set_identity_headers_in_notifications_enabled()
            .identity(identity)
            .notification_type(notification_type(kind))
            .enabled(enabled)
            .send()
            .await
            .map_err(|e| Error::ses(e.to_string()))?;
        Ok(())
    }

    async fn set_feedback_forwarding(&self, identity: &str, enabled: bool) -> Result<()> {
        self.client
            .set_identity_feedback_forwarding_enabled()
            .identity(identity)
            .forwarding_enabled(enabled)
            .send()
            .await
            .map_err(|e| Error::ses(e.to_string()))?;
        Ok(())
    }

    async fn get_identity_policy(
        &self,
        identity: &str,
        policy_name: &str,
    ) -> Result<Option<String>> {
        let output = self
            .client
            .get_identity_policies()
            .identity(identity)
            .policy_names(policy_name)
            .send()
            .await
            .map_err(|e| Error::ses(e.to_string()))?;
        Ok(output.policies().get(policy_name).cloned())
    }

    async fn put_identity_policy(
        &self,
        identity: &str,
        policy_name: &str,
        policy: &str,
    ) -> Result<()> {
        self.client
            .put_identity_policy()
            .identity(identity)
            .policy_name(policy_name)
            .policy(policy)
            .send()
            .await
            .map_err(|e| Error::ses(e.to_string()))?;
        Ok(())
    }

    async fn delete_identity_policy(&self, identity: &str, policy_name: &str) -> Result<()> {
        self.client
            .delete_identity_policy()
            .identity(identity)
            .policy_name(policy_name)
            .send()
            .await
            .map_err(|e| Error::ses(e.to_string()))?;
        Ok(())
    }

    async fn list_identity_policies(&self, identity: &str) -> Result<Vec<String>> {
        let output = self
            .client
            .list_identity_policies()
            .identity(identity)
            .send()
            .await
            .map_err(|e| Error::ses(e.to_string()))?;
        Ok(output.policy_names().to_vec())
    }

    async fn active_rule_set(&self) -> Result<Option<String>> {
        let output = self
            .client
            .describe_active_receipt_rule_set()
            .send()
            .await
            .map_err(|e| Error::ses(e.to_string()))?;
        Ok(output
            .metadata()
            .and_then(|metadata| metadata.name())
            .map(String::from))
    }

    async fn set_active_rule_set(&self, name: Option<&str>) -> Result<()> {
        self.client
            .set_active_receipt_rule_set()
            .set_rule_set_name(name.map(String::from))
            .send()
            .await
            .map_err(|e| Error::ses(e.to_string()))?;
        Ok(())
    }
}
