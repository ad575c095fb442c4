//! Dispatch engine
//!
//! The `Dispatcher` is the reconciliation boundary:
//!
//! 1. a Delete of the failed-create sentinel completes immediately — the
//!    resource never existed, and the rollback request carries the same
//!    properties that failed validation in the first place
//! 2. route the request by resource type
//! 3. validate and coerce the desired properties against the handler's
//!    schema (prior properties are normalized the same way, so the no-op
//!    diff compares like with like)
//! 4. invoke the handler's create/update/delete
//! 5. convert any escaped error into the Failed result shape — nothing
//!    propagates past this point as an uncaught fault
//! 6. when the handler suspended the result, compute the re-invocation
//!    payload (attempt + 1) and the wait hint for the orchestrator
//!
//! ## Control flow
//!
//! ```text
//! Request ──▶ Router ──▶ Schema ──▶ Handler ──▶ Outcome
//!                │          │          │
//!             unknown    Failed,    Err ⇒ Failed,
//!             type       no calls   sentinel id on Create
//! ```

use crate::envelope::{Operation, Reconciliation, ResourceRequest, ResourceResponse};
use crate::physical_id::COULD_NOT_CREATE;
use crate::registry::HandlerRegistry;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// A computed re-invocation: the next request plus a wait hint
///
/// The orchestrator owns the sleep and the retry budget; the engine only
/// computes the payload.
#[derive(Debug, Clone)]
pub struct Reinvocation {
    pub request: ResourceRequest,
    pub delay: Duration,
}

/// Result of dispatching one request
#[derive(Debug, Clone)]
pub struct Outcome {
    pub response: ResourceResponse,
    /// Suppress the final callback; a re-invocation supplies the result
    pub asynchronous: bool,
    pub reinvocation: Option<Reinvocation>,
}

/// Routes requests to handlers and owns the error boundary
pub struct Dispatcher {
    registry: Arc<HandlerRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<HandlerRegistry>) -> Self {
        Self { registry }
    }

    /// Handle one reconciliation request to completion or suspension
    pub async fn dispatch(&self, mut request: ResourceRequest) -> Outcome {
        info!(
            resource_type = %request.resource_type,
            operation = ?request.operation,
            attempt = request.attempt,
            "dispatching request"
        );

        // Deleting the sentinel must succeed before routing or validation:
        // a rollback Delete repeats the very properties the failed Create
        // was rejected for.
        if request.operation == Operation::Delete
            && request.physical_resource_id.as_deref() == Some(COULD_NOT_CREATE)
        {
            let mut cx = Reconciliation::new(request);
            cx.success("create never succeeded, nothing to delete");
            return finalize(cx);
        }

        let handler = match self.registry.get(&request.resource_type) {
            Some(handler) => handler,
            None => return self.unknown_resource_type(request),
        };

        // Validate before any handler logic; a malformed request must not
        // reach an external service.
        if let Err(e) = handler.schema().validate(&mut request.resource_properties) {
            let mut cx = Reconciliation::new(request);
            cx.fail(e.to_string());
            return finalize(cx);
        }
        if let Some(old) = request.old_resource_properties.as_mut() {
            handler.schema().normalize(old);
        }

        let mut cx = Reconciliation::new(request);
        let result = match cx.operation() {
            Operation::Create => handler.create(&mut cx).await,
            Operation::Update => handler.update(&mut cx).await,
            Operation::Delete => handler.delete(&mut cx).await,
        };

        if let Err(e) = result {
            warn!(resource_type = %cx.resource_type(), error = %e, "handler failed");
            cx.fail(e.to_string());
        }

        finalize(cx)
    }

    fn unknown_resource_type(&self, request: ResourceRequest) -> Outcome {
        let resource_type = request.resource_type.clone();
        let mut cx = Reconciliation::new(request);
        if cx.operation() == Operation::Delete {
            // Cleanup must not wedge a stack on a handler that went away.
            warn!(%resource_type, "no handler registered, ignoring delete");
            cx.success(format!(
                "no handler registered for {}, nothing to delete",
                resource_type
            ));
        } else {
            cx.fail(format!("unknown resource type {}", resource_type));
        }
        finalize(cx)
    }
}

fn finalize(mut cx: Reconciliation) -> Outcome {
    // A failed reconciliation without an id still needs a stable one, so
    // the follow-up Delete is a no-op instead of an error.
    if cx.is_failed() && cx.physical_resource_id().is_none() {
        cx.set_physical_resource_id(COULD_NOT_CREATE);
    }

    let reinvocation = cx.reinvoke_after().map(|delay| {
        let mut next = cx.request().clone();
        next.attempt += 1;
        Reinvocation {
            request: next,
            delay,
        }
    });

    Outcome {
        asynchronous: reinvocation.is_some(),
        reinvocation,
        response: cx.into_response(),
    }
}
