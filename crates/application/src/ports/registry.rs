//! Request and environment registry ports

use courier_domain::{Collection, Environment, Request, UpdateSource};

use crate::error::{DispatchError, DispatchResult, EntityKind};

/// Read access to stored requests and collections.
///
/// Lookups return owned copies, so callers never mutate stored definitions.
pub trait RequestRepository: Send + Sync {
    /// Returns a copy of the request with the given id.
    fn get_request(&self, id: &str) -> Option<Request>;

    /// Returns a copy of the collection with the given id.
    fn get_collection(&self, id: &str) -> Option<Collection>;
}

/// Access to environments.
pub trait EnvironmentRepository: Send + Sync {
    /// Returns a copy of the environment with the given id.
    fn get_environment(&self, id: &str) -> Option<Environment>;

    /// Replaces the stored environment.
    ///
    /// Listeners are notified with `source` unless `state_only` is set.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the environment does not exist.
    fn update_environment(
        &self,
        environment: Environment,
        source: UpdateSource,
        state_only: bool,
    ) -> DispatchResult<()>;

    /// Writes a batch of values into one environment with a single update.
    ///
    /// The default reads, modifies and writes back. Registries that can do
    /// better should hold their lock across the whole batch.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the environment does not exist.
    fn set_values(
        &self,
        environment_id: &str,
        values: &[(String, String)],
        source: UpdateSource,
    ) -> DispatchResult<()> {
        let mut environment = self
            .get_environment(environment_id)
            .ok_or_else(|| DispatchError::not_found(EntityKind::Environment, environment_id))?;
        for (key, value) in values {
            environment.set_key(key, value.as_str());
        }
        self.update_environment(environment, source, false)
    }
}
