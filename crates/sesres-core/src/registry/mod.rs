//! Resource-type handler registry
//!
//! Handlers are registered at startup under their resource-type tags
//! (including legacy aliases), avoiding a hardcoded dispatch chain.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let registry = HandlerRegistry::new();
//! registry.register(Arc::new(DomainIdentityHandler::new(clients.clone())));
//! let handler = registry.get("Custom::DomainIdentity");
//! ```

use crate::traits::ResourceHandler;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Registry mapping resource-type tags to handlers
///
/// ## Thread Safety
///
/// Interior mutability with RwLock: concurrent reads, exclusive writes.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: RwLock<HashMap<String, Arc<dyn ResourceHandler>>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under every resource type it declares
    pub fn register(&self, handler: Arc<dyn ResourceHandler>) {
        let mut handlers = self.handlers.write().unwrap();
        for resource_type in handler.resource_types() {
            handlers.insert(resource_type.to_string(), Arc::clone(&handler));
        }
    }

    /// Look up the handler for a resource-type tag
    pub fn get(&self, resource_type: &str) -> Option<Arc<dyn ResourceHandler>> {
        let handlers = self.handlers.read().unwrap();
        handlers.get(resource_type).cloned()
    }

    /// All registered resource-type tags
    pub fn list(&self) -> Vec<String> {
        let handlers = self.handlers.read().unwrap();
        let mut types: Vec<String> = handlers.keys().cloned().collect();
        types.sort();
        types
    }

    pub fn has(&self, resource_type: &str) -> bool {
        let handlers = self.handlers.read().unwrap();
        handlers.contains_key(resource_type)
    }
}
