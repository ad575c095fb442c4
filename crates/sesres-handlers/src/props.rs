//! Property access helpers shared by the handlers
//!
//! The schemas guarantee required properties are present; these helpers
//! turn the remaining `Option` into an explicit error instead of a panic.

use sesres_core::envelope::{strip_trailing_dot, Reconciliation};
use sesres_core::{Error, Result};

/// Required string property, owned
pub(crate) fn require_str(cx: &Reconciliation, key: &str) -> Result<String> {
    cx.get_str(key)
        .map(String::from)
        .ok_or_else(|| Error::validation(format!("required property {} is missing", key)))
}

/// Required domain-like property with one trailing dot stripped, owned
pub(crate) fn require_dotless(cx: &Reconciliation, key: &str) -> Result<String> {
    require_str(cx, key).map(|value| strip_trailing_dot(&value).to_string())
}
