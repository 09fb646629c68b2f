//! Request preparation shared by every protocol sender
//!
//! Covers lookup, inheritance, environment lookup and substitution. The
//! result is a resolved copy; the stored request is never modified.

use std::sync::Arc;

use courier_domain::{Environment, Preferences, Request, merge_key_values, resolve_auth};
use tracing::debug;

use crate::error::{DispatchError, DispatchResult, EntityKind};
use crate::ports::{EnvironmentRepository, PreferencesProvider, RequestRepository};
use crate::variables::{Substitution, VariableStore};

/// The collaborators a sender resolves requests against.
///
/// Passed explicitly to every sender instead of living in globals.
#[derive(Clone)]
pub struct SendContext {
    /// Stored requests and collections
    pub requests: Arc<dyn RequestRepository>,
    /// Environments
    pub environments: Arc<dyn EnvironmentRepository>,
    /// Global variables
    pub variables: VariableStore,
    /// Send-time preferences, read fresh on every call
    pub preferences: Arc<dyn PreferencesProvider>,
}

/// A request resolved for sending.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    /// Resolved copy of the stored request
    pub request: Request,
    /// The environment it was resolved against, as stored
    pub environment: Option<Environment>,
}

impl SendContext {
    /// Creates a context.
    #[must_use]
    pub fn new(
        requests: Arc<dyn RequestRepository>,
        environments: Arc<dyn EnvironmentRepository>,
        variables: VariableStore,
        preferences: Arc<dyn PreferencesProvider>,
    ) -> Self {
        Self {
            requests,
            environments,
            variables,
            preferences,
        }
    }

    /// Current preferences snapshot.
    #[must_use]
    pub fn preferences(&self) -> Preferences {
        self.preferences.preferences()
    }

    /// Resolves `request_id` against its collection and `environment_id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the request, or a supplied environment, does not exist.
    pub fn prepare(
        &self,
        request_id: &str,
        environment_id: Option<&str>,
    ) -> DispatchResult<PreparedRequest> {
        let mut request = self
            .requests
            .get_request(request_id)
            .ok_or_else(|| DispatchError::not_found(EntityKind::Request, request_id))?;

        let collection = request
            .collection_id
            .as_deref()
            .and_then(|id| self.requests.get_collection(id));
        if let Some(collection) = &collection {
            let own = std::mem::take(request.spec.headers_mut());
            *request.spec.headers_mut() = merge_key_values(&collection.headers, own);
        } else if let Some(id) = &request.collection_id {
            debug!(request_id, collection_id = %id, "collection not found, nothing to inherit");
        }
        let auth = resolve_auth(request.spec.auth(), collection.as_ref().map(|c| &c.auth));
        *request.spec.auth_mut() = auth;

        let environment = environment_id
            .map(|id| {
                self.environments
                    .get_environment(id)
                    .ok_or_else(|| DispatchError::not_found(EntityKind::Environment, id))
            })
            .transpose()?;

        Substitution::new(self.variables.snapshot(), environment.clone())
            .apply_to_request(&mut request.spec);

        Ok(PreparedRequest {
            request,
            environment,
        })
    }
}
