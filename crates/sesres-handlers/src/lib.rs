// # sesres-handlers
//
// One handler per custom resource type, composed from the core library's
// reconciliation context and the injected client factory.
//
// ## Handler Catalog
//
// | Resource type                      | Handler                       |
// |------------------------------------|-------------------------------|
// | Custom::DomainIdentity             | DomainIdentityHandler         |
// | Custom::DkimTokens                 | DkimTokensHandler             |
// | Custom::MailFromDomain             | MailFromDomainHandler         |
// | Custom::IdentityNotifications      | IdentityNotificationsHandler  |
// | Custom::IdentityPolicy             | IdentityPolicyHandler         |
// | Custom::VerifiedIdentity           | VerifiedIdentityHandler       |
// | Custom::VerifiedMailFromDomain     | VerifiedMailFromHandler       |
// | Custom::ActiveReceiptRuleSet (+ legacy alias) | ActiveRuleSetHandler |
// | Custom::DKIM (legacy)              | DkimZoneHandler               |

pub mod active_rule_set;
pub mod dkim_tokens;
pub mod dkim_zone;
pub mod domain_identity;
pub mod identity_policy;
pub mod mail_from;
pub mod notifications;
mod props;
pub mod verification;

pub use active_rule_set::ActiveRuleSetHandler;
pub use dkim_tokens::DkimTokensHandler;
pub use dkim_zone::DkimZoneHandler;
pub use domain_identity::DomainIdentityHandler;
pub use identity_policy::IdentityPolicyHandler;
pub use mail_from::MailFromDomainHandler;
pub use notifications::IdentityNotificationsHandler;
pub use verification::{VerifiedIdentityHandler, VerifiedMailFromHandler, DEFAULT_POLL_INTERVAL};

use sesres_core::{ClientFactory, HandlerRegistry};
use std::sync::Arc;
use std::time::Duration;

/// Register every handler under its resource-type tags
pub fn register_all(registry: &HandlerRegistry, clients: Arc<dyn ClientFactory>) {
    register_all_with_poll_interval(registry, clients, DEFAULT_POLL_INTERVAL);
}

/// Same as [`register_all`], with an explicit verification poll interval
pub fn register_all_with_poll_interval(
    registry: &HandlerRegistry,
    clients: Arc<dyn ClientFactory>,
    poll_interval: Duration,
) {
    registry.register(Arc::new(DomainIdentityHandler::new(clients.clone())));
    registry.register(Arc::new(DkimTokensHandler::new(clients.clone())));
    registry.register(Arc::new(MailFromDomainHandler::new(clients.clone())));
    registry.register(Arc::new(IdentityNotificationsHandler::new(clients.clone())));
    registry.register(Arc::new(IdentityPolicyHandler::new(clients.clone())));
    registry.register(Arc::new(VerifiedIdentityHandler::with_interval(
        clients.clone(),
        poll_interval,
    )));
    registry.register(Arc::new(VerifiedMailFromHandler::with_interval(
        clients.clone(),
        poll_interval,
    )));
    registry.register(Arc::new(ActiveRuleSetHandler::new(clients.clone())));
    registry.register(Arc::new(DkimZoneHandler::new(clients)));
}
