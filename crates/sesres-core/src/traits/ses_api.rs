// # SES API Trait
//
// Read probes and mutating operations against the email-identity service.
//
// Probes are pure reads: they never mutate, and existence is always
// re-checked against the live service rather than inferred from request
// history (out-of-band changes are expected).
//
// Implementations:
//
// - AWS SDK: `sesres-aws` crate
// - Counting fakes: `sesres-handlers/tests/common`

use crate::error::Result;
use async_trait::async_trait;

/// Verification state of an identity, as reported by the service
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationAttributes {
    /// "Pending", "Success", "Failed", ... (service-defined strings)
    pub status: String,
    /// Ownership token, present once issued
    pub token: Option<String>,
}

/// Mail-from state of an identity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailFromAttributes {
    pub mail_from_domain: Option<String>,
    /// "Pending", "Success", "Failed", "TemporaryFailure"
    pub status: Option<String>,
}

/// Current notification topic bindings of an identity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationAttributes {
    pub bounce_topic: Option<String>,
    pub complaint_topic: Option<String>,
    pub delivery_topic: Option<String>,
    pub forwarding_enabled: bool,
}

impl NotificationAttributes {
    pub fn topic(&self, kind: NotificationKind) -> Option<&str> {
        match kind {
            NotificationKind::Bounce => self.bounce_topic.as_deref(),
            NotificationKind::Complaint => self.complaint_topic.as_deref(),
            NotificationKind::Delivery => self.delivery_topic.as_deref(),
        }
    }
}

/// The three notification feedback types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Bounce,
    Complaint,
    Delivery,
}

impl NotificationKind {
    pub const ALL: [NotificationKind; 3] = [
        NotificationKind::Bounce,
        NotificationKind::Complaint,
        NotificationKind::Delivery,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Bounce => "Bounce",
            NotificationKind::Complaint => "Complaint",
            NotificationKind::Delivery => "Delivery",
        }
    }

    /// Request property naming the SNS topic for this kind
    pub fn topic_property(&self) -> &'static str {
        match self {
            NotificationKind::Bounce => "BounceTopic",
            NotificationKind::Complaint => "ComplaintTopic",
            NotificationKind::Delivery => "DeliveryTopic",
        }
    }

    /// Request property for the headers-in-notifications flag
    pub fn headers_property(&self) -> &'static str {
        match self {
            NotificationKind::Bounce => "HeadersInBounceNotificationsEnabled",
            NotificationKind::Complaint => "HeadersInComplaintNotificationsEnabled",
            NotificationKind::Delivery => "HeadersInDeliveryNotificationsEnabled",
        }
    }
}

/// Trait for the email-identity service
///
/// One method per API operation the handlers need. Attribute reads return
/// `None` when the identity is unknown to the service. All methods must be
/// safe to call repeatedly (the engine re-probes on every invocation).
#[async_trait]
pub trait SesApi: Send + Sync {
    /// Start (or restart) domain ownership verification; returns the token
    async fn verify_domain_identity(&self, domain: &str) -> Result<String>;

    /// Issue DKIM tokens for a domain
    async fn verify_domain_dkim(&self, domain: &str) -> Result<Vec<String>>;

    /// Remove an identity; the service treats an unknown identity as an error
    async fn delete_identity(&self, identity: &str) -> Result<()>;

    /// All registered domain identities (paginated internally)
    async fn list_domain_identities(&self) -> Result<Vec<String>>;

    /// Probe: does a domain identity exist, by exact match
    async fn domain_identity_exists(&self, domain: &str) -> Result<bool> {
        Ok(self
            .list_domain_identities()
            .await?
            .iter()
            .any(|identity| identity == domain))
    }

    /// Verification status and token; None when the identity is unknown
    async fn get_verification_attributes(
        &self,
        identity: &str,
    ) -> Result<Option<VerificationAttributes>>;

    /// Mail-from status; None when the identity is unknown
    async fn get_mail_from_attributes(&self, identity: &str)
        -> Result<Option<MailFromAttributes>>;

    /// Set or clear (None) the custom mail-from domain
    async fn set_mail_from_domain(
        &self,
        identity: &str,
        mail_from_domain: Option<&str>,
        behavior_on_mx_failure: &str,
    ) -> Result<()>;

    /// Current notification topic bindings; None when the identity is unknown
    async fn get_notification_attributes(
        &self,
        identity: &str,
    ) -> Result<Option<NotificationAttributes>>;

    /// Set or clear (None) one notification topic binding
    async fn set_notification_topic(
        &self,
        identity: &str,
        kind: NotificationKind,
        topic: Option<&str>,
    ) -> Result<()>;

    /// Toggle headers-in-notifications for one feedback type
    async fn set_headers_in_notifications(
        &self,
        identity: &str,
        kind: NotificationKind,
        enabled: bool,
    ) -> Result<()>;

    /// Toggle email feedback forwarding
    async fn set_feedback_forwarding(&self, identity: &str, enabled: bool) -> Result<()>;

    /// Stored policy document text; None when the policy is absent
    async fn get_identity_policy(
        &self,
        identity: &str,
        policy_name: &str,
    ) -> Result<Option<String>>;

    /// Create or replace a policy document
    async fn put_identity_policy(
        &self,
        identity: &str,
        policy_name: &str,
        policy: &str,
    ) -> Result<()>;

    async fn delete_identity_policy(&self, identity: &str, policy_name: &str) -> Result<()>;

    async fn list_identity_policies(&self, identity: &str) -> Result<Vec<String>>;

    /// Name of the active receipt rule set; None when nothing is active
    async fn active_rule_set(&self) -> Result<Option<String>>;

    /// Activate a rule set, or deactivate (None)
    async fn set_active_rule_set(&self, name: Option<&str>) -> Result<()>;
}
