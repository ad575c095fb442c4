//! Identity policy handler
//!
//! Upserts a sending-authorization policy on an identity. The stored
//! document is compared structurally against the desired one, so an
//! equivalent policy never triggers a put.

use crate::props::require_str;
use async_trait::async_trait;
use sesres_core::{
    ClientFactory, Error, PolicyDocument, PolicyId, PropertySpec, Reconciliation,
    ResourceHandler, Result, Schema, COULD_NOT_CREATE,
};
use std::sync::Arc;
use tracing::debug;

const DEFAULT_REGION: &str = "eu-west-1";

pub struct IdentityPolicyHandler {
    clients: Arc<dyn ClientFactory>,
    schema: Schema,
}

impl IdentityPolicyHandler {
    pub fn new(clients: Arc<dyn ClientFactory>) -> Self {
        Self {
            clients,
            schema: Schema::new()
                .required(&["Identity", "PolicyName", "PolicyDocument"])
                .property("Identity", PropertySpec::string())
                .property("PolicyName", PropertySpec::string())
                .property("PolicyDocument", PropertySpec::object())
                .property("Region", PropertySpec::string().with_default(DEFAULT_REGION)),
        }
    }

    async fn upsert(&self, cx: &mut Reconciliation) -> Result<()> {
        let identity = require_str(cx, "Identity")?;
        let policy_name = require_str(cx, "PolicyName")?;
        let region = require_str(cx, "Region")?;
        let ses = self.clients.ses(&region);

        let desired = PolicyDocument::from_value(
            cx.get("PolicyDocument")
                .ok_or_else(|| Error::validation("required property PolicyDocument is missing"))?,
        )?;
        let stored = ses.get_identity_policy(&identity, &policy_name).await?;
        let current = PolicyDocument::from_json(stored.as_deref());

        if current.as_ref() != Some(&desired) {
            ses.put_identity_policy(&identity, &policy_name, &desired.to_json()?)
                .await?;
        } else {
            debug!(%identity, %policy_name, "stored policy already matches, skipping put");
        }
        cx.set_physical_resource_id(PolicyId::new(&identity, &policy_name).to_string());
        cx.success(format!(
            "identity policy {} applied to {}",
            policy_name, identity
        ));
        Ok(())
    }
}

#[async_trait]
impl ResourceHandler for IdentityPolicyHandler {
    fn resource_types(&self) -> &'static [&'static str] {
        &["Custom::IdentityPolicy"]
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn create(&self, cx: &mut Reconciliation) -> Result<()> {
        self.upsert(cx).await
    }

    async fn update(&self, cx: &mut Reconciliation) -> Result<()> {
        self.upsert(cx).await
    }

    async fn delete(&self, cx: &mut Reconciliation) -> Result<()> {
        let pid = match cx.physical_resource_id() {
            None | Some(COULD_NOT_CREATE) => return Ok(()),
            Some(pid) => pid.to_string(),
        };
        let id: PolicyId = pid.parse()?;

        // Legacy ids recorded only the policy name; the identity then comes
        // from the request properties.
        let identity = match id.identity {
            Some(identity) => identity,
            None => require_str(cx, "Identity")?,
        };
        let region = require_str(cx, "Region")?;
        let ses = self.clients.ses(&region);

        let current = ses.list_identity_policies(&identity).await?;
        if current.contains(&id.policy_name) {
            ses.delete_identity_policy(&identity, &id.policy_name)
                .await?;
        }
        Ok(())
    }
}
