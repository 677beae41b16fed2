//! Registry of in-process execution handlers
//!
//! Tracks which handler ids and lifecycle mappings are actually available,
//! so resolutions that name a missing handler can be turned into requirements.

use std::collections::HashMap;
use std::sync::Arc;

/// An in-process component able to stand in for a plugin goal
pub trait ExecutionHandler: Send + Sync {
    /// Identifier referenced by `MappingAction::Execute`
    fn id(&self) -> &str;

    /// Human readable name
    fn name(&self) -> &str {
        self.id()
    }

    /// Lifecycle mapping ids this handler provides for packaging types
    fn lifecycle_mappings(&self) -> &[String] {
        &[]
    }
}

/// Plain data handler description, enough for hosts that only need ids
#[derive(Debug, Clone, Default)]
pub struct HandlerDescriptor {
    pub id: String,
    pub name: String,
    pub lifecycle_mappings: Vec<String>,
}

impl HandlerDescriptor {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            lifecycle_mappings: Vec::new(),
        }
    }

    pub fn with_lifecycle_mapping(mut self, id: impl Into<String>) -> Self {
        self.lifecycle_mappings.push(id.into());
        self
    }
}

impl ExecutionHandler for HandlerDescriptor {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn lifecycle_mappings(&self) -> &[String] {
        &self.lifecycle_mappings
    }
}

/// Registry for execution handlers
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn ExecutionHandler>>,
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl HandlerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, replacing one with the same id
    pub fn register_handler(&mut self, handler: Arc<dyn ExecutionHandler>) {
        self.handlers.insert(handler.id().to_string(), handler);
    }

    /// Builder-style registration
    pub fn with_handler(mut self, handler: impl ExecutionHandler + 'static) -> Self {
        self.register_handler(Arc::new(handler));
        self
    }

    /// Get a handler by id
    pub fn get(&self, id: &str) -> Option<Arc<dyn ExecutionHandler>> {
        self.handlers.get(id).cloned()
    }

    /// Check if a handler exists
    pub fn contains(&self, id: &str) -> bool {
        self.handlers.contains_key(id)
    }

    /// Check if any handler provides the lifecycle mapping
    pub fn provides_lifecycle(&self, lifecycle_mapping_id: &str) -> bool {
        self.handlers.values().any(|handler| {
            handler
                .lifecycle_mappings()
                .iter()
                .any(|id| id == lifecycle_mapping_id)
        })
    }

    /// Get all registered handler ids
    pub fn list_handlers(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}
