//! Identity notification handler
//!
//! Binds SNS topics to an identity's bounce/complaint/delivery feedback and
//! manages the forwarding and headers flags. Existing bindings are never
//! clobbered unless the request carries `ForceOverride`.

use crate::props::{require_dotless, require_str};
use async_trait::async_trait;
use sesres_core::traits::{NotificationKind, SesApi};
use sesres_core::{
    ClientFactory, Operation, PropertySpec, Reconciliation, ResourceHandler, Result, Schema,
    COULD_NOT_CREATE,
};
use std::sync::Arc;
use tracing::{info, warn};

const SNS_TOPIC_ARN_PATTERN: &str = "arn:[^:]*:sns:[^:][^:]*:[0-9][0-9]*:[^:][^:]*";

/// Back to the service defaults: forwarding on, no topics bound
async fn restore_defaults(ses: &dyn SesApi, identity: &str) -> Result<()> {
    ses.set_feedback_forwarding(identity, true).await?;
    for kind in NotificationKind::ALL {
        ses.set_notification_topic(identity, kind, None).await?;
    }
    Ok(())
}

pub struct IdentityNotificationsHandler {
    clients: Arc<dyn ClientFactory>,
    schema: Schema,
}

impl IdentityNotificationsHandler {
    pub fn new(clients: Arc<dyn ClientFactory>) -> Self {
        Self {
            clients,
            schema: Schema::new()
                .required(&["Identity", "Region"])
                .property("Identity", PropertySpec::string())
                .property("Region", PropertySpec::string())
                .property(
                    "BounceTopic",
                    PropertySpec::string().with_pattern(SNS_TOPIC_ARN_PATTERN),
                )
                .property(
                    "ComplaintTopic",
                    PropertySpec::string().with_pattern(SNS_TOPIC_ARN_PATTERN),
                )
                .property(
                    "DeliveryTopic",
                    PropertySpec::string().with_pattern(SNS_TOPIC_ARN_PATTERN),
                )
                .property("ForwardingEnabled", PropertySpec::boolean().with_default(true))
                .property(
                    "HeadersInBounceNotificationsEnabled",
                    PropertySpec::boolean().with_default(false),
                )
                .property(
                    "HeadersInComplaintNotificationsEnabled",
                    PropertySpec::boolean().with_default(false),
                )
                .property(
                    "HeadersInDeliveryNotificationsEnabled",
                    PropertySpec::boolean().with_default(false),
                )
                .property("ForceOverride", PropertySpec::boolean().with_default(false)),
        }
    }

    /// Refuse to clobber live bindings unless overridden
    ///
    /// Probed on Create, and on Update only when the request points the
    /// resource at a different identity or region.
    async fn check_precondition(
        &self,
        cx: &mut Reconciliation,
        ses: &dyn SesApi,
    ) -> Result<bool> {
        let identity = require_dotless(cx, "Identity")?;
        let region = require_str(cx, "Region")?;

        if cx.get_bool("ForceOverride") {
            info!(%identity, %region, "ForceOverride of notification settings requested");
            return Ok(true);
        }

        let identity_changed = cx.operation() == Operation::Create
            || !cx.property_unchanged("Region")
            || !cx.property_unchanged("Identity");
        if !identity_changed {
            return Ok(true);
        }

        if let Some(attrs) = ses.get_notification_attributes(&identity).await? {
            for kind in NotificationKind::ALL {
                if attrs.topic(kind).is_some() {
                    cx.fail(format!(
                        "{} already set for identity {} in {}",
                        kind.topic_property(),
                        identity,
                        region
                    ));
                    return Ok(false);
                }
            }
            if !cx.get_bool("ForwardingEnabled")
                && !(cx.get_str("BounceTopic").is_some() && cx.get_str("ComplaintTopic").is_some())
            {
                cx.fail(
                    "ForwardingEnabled cannot be disabled without an SNS BounceTopic \
                     and SNS ComplaintTopic",
                );
                return Ok(false);
            }
        }

        Ok(true)
    }

    async fn set_notifications(&self, cx: &mut Reconciliation, ses: &dyn SesApi) -> Result<()> {
        let identity = require_dotless(cx, "Identity")?;
        let region = require_str(cx, "Region")?;

        for kind in NotificationKind::ALL {
            let topic = cx.get_str(kind.topic_property()).map(String::from);
            ses.set_notification_topic(&identity, kind, topic.as_deref())
                .await?;
            if topic.is_some() {
                let enabled = cx.get_bool(kind.headers_property());
                ses.set_headers_in_notifications(&identity, kind, enabled)
                    .await?;
            }
        }
        ses.set_feedback_forwarding(&identity, cx.get_bool("ForwardingEnabled"))
            .await?;

        let account_id = self.clients.account_id().await?;
        cx.set_physical_resource_id(format!(
            "arn:aws:ses:{}:{}:identity/{}",
            region, account_id, identity
        ));
        cx.success(format!(
            "notification settings applied to identity {} in region {}",
            identity, region
        ));
        Ok(())
    }
}

#[async_trait]
impl ResourceHandler for IdentityNotificationsHandler {
    fn resource_types(&self) -> &'static [&'static str] {
        &["Custom::IdentityNotifications"]
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn create(&self, cx: &mut Reconciliation) -> Result<()> {
        let region = require_str(cx, "Region")?;
        let ses = self.clients.ses(&region);
        if self.check_precondition(cx, ses.as_ref()).await? {
            self.set_notifications(cx, ses.as_ref()).await?;
        }
        Ok(())
    }

    async fn update(&self, cx: &mut Reconciliation) -> Result<()> {
        if cx.unchanged_update(&[
            "Identity",
            "Region",
            "BounceTopic",
            "ComplaintTopic",
            "DeliveryTopic",
            "ForwardingEnabled",
            "HeadersInBounceNotificationsEnabled",
            "HeadersInComplaintNotificationsEnabled",
            "HeadersInDeliveryNotificationsEnabled",
        ]) {
            cx.success("no effective change to notification settings");
            return Ok(());
        }

        let region = require_str(cx, "Region")?;
        let ses = self.clients.ses(&region);
        if self.check_precondition(cx, ses.as_ref()).await? {
            self.set_notifications(cx, ses.as_ref()).await?;
        }
        Ok(())
    }

    async fn delete(&self, cx: &mut Reconciliation) -> Result<()> {
        match cx.physical_resource_id() {
            None | Some(COULD_NOT_CREATE) => return Ok(()),
            Some(_) => {}
        }

        let identity = require_dotless(cx, "Identity")?;
        let region = require_str(cx, "Region")?;
        let ses = self.clients.ses(&region);

        // An identity removed out of band must not block stack cleanup.
        if let Err(e) = restore_defaults(ses.as_ref(), &identity).await {
            warn!(%identity, %region, error = %e, "ignoring failed reset of notification settings");
            cx.success(format!(
                "ignoring failed reset of notification settings, {}",
                e
            ));
        }
        Ok(())
    }
}
