//! DNS record-set outputs
//!
//! Most handlers do not touch DNS themselves: they emit declarative record
//! descriptors for a downstream DNS-apply step. The derivations here are
//! pure functions of the identity properties and the tokens the email
//! service issued.

use serde::{Deserialize, Serialize};

/// DNS record types this system produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    Txt,
    Cname,
    Mx,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::Txt => "TXT",
            RecordType::Cname => "CNAME",
            RecordType::Mx => "MX",
        }
    }
}

/// A declarative record set keyed by (name, type) within a zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSet {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Type")]
    pub rtype: RecordType,
    #[serde(rename = "TTL")]
    pub ttl: u64,
    #[serde(rename = "ResourceRecords")]
    pub values: Vec<String>,
}

/// TXT record proving ownership of a domain identity
pub fn verification_record(domain: &str, token: &str, ttl: u64) -> RecordSet {
    RecordSet {
        name: format!("_amazonses.{}.", domain),
        rtype: RecordType::Txt,
        ttl,
        values: vec![format!("\"{}\"", token)],
    }
}

/// CNAME records publishing the DKIM tokens for a domain
///
/// Deterministic for a fixed token set: one record per token, ordered by
/// token.
pub fn dkim_records(domain: &str, tokens: &[String], ttl: u64) -> Vec<RecordSet> {
    let mut sorted: Vec<&String> = tokens.iter().collect();
    sorted.sort();
    sorted
        .into_iter()
        .map(|token| RecordSet {
            name: format!("{}._domainkey.{}.", token, domain),
            rtype: RecordType::Cname,
            ttl,
            values: vec![format!("{}.dkim.amazonses.com", token)],
        })
        .collect()
}

/// MX + SPF records for a custom mail-from subdomain
///
/// An empty subdomain produces no records (the mail-from setting is being
/// cleared).
pub fn mail_from_records(domain: &str, subdomain: &str, region: &str, ttl: u64) -> Vec<RecordSet> {
    if subdomain.is_empty() {
        return Vec::new();
    }
    let name = format!("{}.{}.", subdomain, domain);
    vec![
        RecordSet {
            name: name.clone(),
            rtype: RecordType::Mx,
            ttl,
            values: vec![format!("10 feedback-smtp.{}.amazonses.com", region)],
        },
        RecordSet {
            name,
            rtype: RecordType::Txt,
            ttl,
            values: vec!["\"v=spf1 include:amazonses.com ~all\"".to_string()],
        },
    ]
}
