// # Resource Handler Trait
//
// One implementation per resource type. A handler receives a
// `Reconciliation` context whose properties already passed its schema,
// and records status, physical id and output attributes on it.
//
// ## Responsibilities
//
// Handlers own the per-resource diff/idempotence rules:
// - Create probes live state before mutating where duplicate creation
//   differs from a no-op
// - Update detects identity-defining property changes and treats them as
//   probe-then-create, never as a rename
// - Delete tolerates the failed-create sentinel and upstream drift
//
// Handlers must not sleep, retry, or schedule: a pending external state
// is expressed via `Reconciliation::schedule_reinvoke`, and the
// orchestrator owns the delay and the retry budget.

use crate::envelope::Reconciliation;
use crate::error::Result;
use crate::schema::Schema;
use async_trait::async_trait;

/// Trait for resource-type handlers
///
/// An `Err` escaping any method is converted into the Failed result shape
/// at the dispatch boundary; handlers that need a specific reason or a
/// sentinel physical id call `cx.fail(...)` themselves and return `Ok`.
#[async_trait]
pub trait ResourceHandler: Send + Sync {
    /// Resource-type tags this handler serves (legacy aliases included)
    fn resource_types(&self) -> &'static [&'static str];

    /// Declarative schema applied before any handler logic runs
    fn schema(&self) -> &Schema;

    async fn create(&self, cx: &mut Reconciliation) -> Result<()>;

    async fn update(&self, cx: &mut Reconciliation) -> Result<()>;

    async fn delete(&self, cx: &mut Reconciliation) -> Result<()>;
}
