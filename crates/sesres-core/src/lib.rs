// # sesres-core
//
// Core library for the SES custom-resource reconciler.
//
// ## Architecture Overview
//
// This library provides the shared machinery for reconciling declared SES
// and Route53 state against the live services:
// - **Envelope types**: the request/response shapes exchanged with the
//   orchestrator, plus the `Reconciliation` context handlers work against
// - **Schema**: declarative per-handler request validation with defaults
// - **SesApi / Route53Api**: traits for the external services, so tests can
//   substitute fakes and the AWS transport stays in its own crate
// - **ResourceHandler**: trait implemented once per resource type
// - **HandlerRegistry**: routes a resource-type tag to its handler
// - **Dispatcher**: validates, routes, converts escaped errors into the
//   Failed result shape and computes async re-invocation payloads
//
// ## Design Principles
//
// 1. **Probe before mutate**: existence is never inferred from request
//    history; every invocation re-reads the live state it depends on
// 2. **Idempotent deletes**: a Delete never fails because the target is
//    already gone, or was never created (sentinel physical id)
// 3. **Stable physical ids**: structured identifier types serialized only
//    at the system boundary, with explicit parse failures
// 4. **Async via re-invocation**: a pending verification suspends the
//    result and hands the orchestrator the next request payload; no
//    blocking waits inside a handler

pub mod engine;
pub mod envelope;
pub mod error;
pub mod physical_id;
pub mod policy;
pub mod records;
pub mod registry;
pub mod schema;
pub mod traits;

pub use engine::{Dispatcher, Outcome, Reinvocation};
pub use envelope::{Operation, Reconciliation, ResourceRequest, ResourceResponse, Status};
pub use error::{Error, Result};
pub use physical_id::{DomainRegionId, PolicyId, COULD_NOT_CREATE};
pub use policy::PolicyDocument;
pub use records::{RecordSet, RecordType};
pub use registry::HandlerRegistry;
pub use schema::{PropertySpec, Schema};
pub use traits::{ClientFactory, ResourceHandler, Route53Api, SesApi};
