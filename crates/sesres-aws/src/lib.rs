// # sesres-aws
//
// AWS SDK implementations of the core client traits.
//
// The shared `SdkConfig` is loaded once; per-service configs inherit from
// it (credentials, HTTP client, retry policy) via the SDK config builders.
// SES clients are cached per region since one stack routinely touches
// several regions, while Route53 and STS are global.

pub mod route53;
pub mod ses;

pub use route53::Route53Client;
pub use ses::SesClient;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use sesres_core::traits::{ClientFactory, Route53Api, SesApi};
use sesres_core::{Error, Result};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Client factory over the AWS SDK
pub struct AwsClients {
    sdk_config: SdkConfig,
    ses: RwLock<HashMap<String, Arc<SesClient>>>,
    route53: Arc<Route53Client>,
    sts: aws_sdk_sts::Client,
}

impl AwsClients {
    /// Load credentials and region from the default provider chain
    pub async fn new() -> Self {
        let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        Self::from_config(sdk_config)
    }

    pub fn from_config(sdk_config: SdkConfig) -> Self {
        let route53 = Arc::new(Route53Client::new(aws_sdk_route53::Client::new(&sdk_config)));
        let sts = aws_sdk_sts::Client::new(&sdk_config);
        Self {
            sdk_config,
            ses: RwLock::new(HashMap::new()),
            route53,
            sts,
        }
    }
}

#[async_trait]
impl ClientFactory for AwsClients {
    fn ses(&self, region: &str) -> Arc<dyn SesApi> {
        if let Some(client) = self.ses.read().unwrap().get(region) {
            return client.clone();
        }

        debug!(%region, "building SES client");
        let config = aws_sdk_ses::config::Builder::from(&self.sdk_config)
            .region(Region::new(region.to_string()))
            .build();
        let client = Arc::new(SesClient::new(aws_sdk_ses::Client::from_conf(config)));
        self.ses
            .write()
            .unwrap()
            .insert(region.to_string(), client.clone());
        client
    }

    fn route53(&self) -> Arc<dyn Route53Api> {
        self.route53.clone()
    }

    async fn account_id(&self) -> Result<String> {
        let output = self
            .sts
            .get_caller_identity()
            .send()
            .await
            .map_err(|e| Error::sts(e.to_string()))?;
        output
            .account()
            .map(String::from)
            .ok_or_else(|| Error::sts("caller identity has no account id"))
    }
}
