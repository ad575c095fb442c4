//! Structured physical resource identifiers
//!
//! The orchestrator protocol carries a single opaque string across
//! Update/Delete calls. Internally the identifiers are small records with
//! named fields, serialized only at the boundary; parsing a malformed
//! string fails explicitly instead of silently degrading.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Reserved physical id meaning "creation never succeeded"
///
/// A failed Create reports this value so the follow-up Delete is a safe
/// no-op rather than an error against a resource that never existed.
pub const COULD_NOT_CREATE: &str = "could-not-create";

/// Whether a physical id is the failed-create sentinel
pub fn is_sentinel(id: &str) -> bool {
    id == COULD_NOT_CREATE
}

/// Identity key for domain-scoped resources: `{domain}@{region}`
///
/// Chosen so Update can detect identity-defining changes and Delete can
/// recover both components without extra lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainRegionId {
    pub domain: String,
    pub region: String,
}

impl DomainRegionId {
    pub fn new(domain: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            region: region.into(),
        }
    }
}

impl fmt::Display for DomainRegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.domain, self.region)
    }
}

impl FromStr for DomainRegionId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once('@') {
            Some((domain, region)) if !domain.is_empty() && !region.is_empty() => {
                Ok(Self::new(domain, region))
            }
            _ => Err(Error::physical_id(format!(
                "expected <domain>@<region>, got {:?}",
                s
            ))),
        }
    }
}

/// Identity key for per-identity policies: `{identity}/@{policy_name}`
///
/// Early deployments recorded the bare policy name; those ids still parse,
/// with the identity left to be taken from the request properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyId {
    pub identity: Option<String>,
    pub policy_name: String,
}

impl PolicyId {
    pub fn new(identity: impl Into<String>, policy_name: impl Into<String>) -> Self {
        Self {
            identity: Some(identity.into()),
            policy_name: policy_name.into(),
        }
    }
}

impl fmt::Display for PolicyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.identity {
            Some(identity) => write!(f, "{}/@{}", identity, self.policy_name),
            None => write!(f, "{}", self.policy_name),
        }
    }
}

impl FromStr for PolicyId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(Error::physical_id("empty policy id"));
        }
        match s.split_once("/@") {
            Some((identity, policy_name)) if !identity.is_empty() && !policy_name.is_empty() => {
                Ok(Self::new(identity, policy_name))
            }
            Some(_) => Err(Error::physical_id(format!(
                "expected <identity>/@<policy-name>, got {:?}",
                s
            ))),
            None => Ok(Self {
                identity: None,
                policy_name: s.to_string(),
            }),
        }
    }
}
