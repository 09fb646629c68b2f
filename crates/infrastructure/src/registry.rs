//! In-memory request, collection and environment registry
//!
//! Thread safe and shared by every sender and the dispatch service. Reads
//! hand out copies. Environment writes notify the registered listeners
//! after the lock is released.

use courier_application::{
    DispatchError, DispatchResult, EntityKind, EnvironmentRepository, RequestRepository,
};
use courier_domain::{Collection, Environment, Request, UpdateSource};
use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::debug;

/// Callback run after an environment update.
pub type EnvironmentListener = Box<dyn Fn(&Environment, UpdateSource) + Send + Sync>;

/// Process-wide registry backed by ordered maps.
#[derive(Default)]
pub struct InMemoryRegistry {
    requests: RwLock<IndexMap<String, Request>>,
    collections: RwLock<IndexMap<String, Collection>>,
    environments: RwLock<IndexMap<String, Environment>>,
    listeners: RwLock<Vec<EnvironmentListener>>,
}

impl InMemoryRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores or replaces a request.
    pub fn insert_request(&self, request: Request) {
        self.requests.write().insert(request.id.clone(), request);
    }

    /// Stores or replaces a collection.
    pub fn insert_collection(&self, collection: Collection) {
        self.collections
            .write()
            .insert(collection.id.clone(), collection);
    }

    /// Stores or replaces an environment without notifying listeners.
    pub fn insert_environment(&self, environment: Environment) {
        self.environments
            .write()
            .insert(environment.id.clone(), environment);
    }

    /// Removes a request, returning it.
    pub fn remove_request(&self, id: &str) -> Option<Request> {
        self.requests.write().shift_remove(id)
    }

    /// All requests in insertion order.
    #[must_use]
    pub fn requests(&self) -> Vec<Request> {
        self.requests.read().values().cloned().collect()
    }

    /// All collections in insertion order.
    #[must_use]
    pub fn collections(&self) -> Vec<Collection> {
        self.collections.read().values().cloned().collect()
    }

    /// All environments in insertion order.
    #[must_use]
    pub fn environments(&self) -> Vec<Environment> {
        self.environments.read().values().cloned().collect()
    }

    /// Registers a listener for environment updates.
    pub fn add_environment_listener(
        &self,
        listener: impl Fn(&Environment, UpdateSource) + Send + Sync + 'static,
    ) {
        self.listeners.write().push(Box::new(listener));
    }

    fn notify(&self, environment: &Environment, source: UpdateSource) {
        debug!(environment_id = %environment.id, %source, "environment updated");
        for listener in self.listeners.read().iter() {
            listener(environment, source);
        }
    }
}

impl RequestRepository for InMemoryRegistry {
    fn get_request(&self, id: &str) -> Option<Request> {
        self.requests.read().get(id).cloned()
    }

    fn get_collection(&self, id: &str) -> Option<Collection> {
        self.collections.read().get(id).cloned()
    }
}

impl EnvironmentRepository for InMemoryRegistry {
    fn get_environment(&self, id: &str) -> Option<Environment> {
        self.environments.read().get(id).cloned()
    }

    fn update_environment(
        &self,
        environment: Environment,
        source: UpdateSource,
        state_only: bool,
    ) -> DispatchResult<()> {
        {
            let mut environments = self.environments.write();
            let Some(slot) = environments.get_mut(&environment.id) else {
                return Err(DispatchError::not_found(
                    EntityKind::Environment,
                    environment.id,
                ));
            };
            slot.clone_from(&environment);
        }
        if !state_only {
            self.notify(&environment, source);
        }
        Ok(())
    }

    fn set_values(
        &self,
        environment_id: &str,
        values: &[(String, String)],
        source: UpdateSource,
    ) -> DispatchResult<()> {
        let updated = {
            let mut environments = self.environments.write();
            let environment = environments
                .get_mut(environment_id)
                .ok_or_else(|| DispatchError::not_found(EntityKind::Environment, environment_id))?;
            for (key, value) in values {
                environment.set_key(key, value.as_str());
            }
            environment.clone()
        };
        self.notify(&updated, source);
        Ok(())
    }
}
