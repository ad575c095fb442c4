//! Core trait seams
//!
//! External services and handlers meet the engine through these traits:
//! - [`SesApi`]: the email-identity service
//! - [`Route53Api`]: the DNS service (legacy all-in-one handler only)
//! - [`ClientFactory`]: per-region client handles, injectable for tests
//! - [`ResourceHandler`]: one implementation per resource type

pub mod handler;
pub mod route53_api;
pub mod ses_api;

pub use handler::ResourceHandler;
pub use route53_api::{ChangeAction, RecordChange, Route53Api, ZoneRecord};
pub use ses_api::{
    MailFromAttributes, NotificationAttributes, NotificationKind, SesApi, VerificationAttributes,
};

use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Hands out external-service client handles
///
/// Replaces process-global lazily initialized clients: the factory is
/// injected into each handler at construction, so tests substitute fakes
/// without mutating global state. Implementations cache per-region SES
/// handles and rebuild on region change.
#[async_trait]
pub trait ClientFactory: Send + Sync {
    /// SES client for the given region
    fn ses(&self, region: &str) -> Arc<dyn SesApi>;

    /// Route53 client (global service)
    fn route53(&self) -> Arc<dyn Route53Api>;

    /// Account id of the caller, for building identity ARNs
    async fn account_id(&self) -> Result<String>;
}
