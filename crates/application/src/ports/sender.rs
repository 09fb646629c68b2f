//! Protocol sender port

use async_trait::async_trait;
use courier_domain::Response;

use crate::error::DispatchResult;

/// Executes one stored request over the wire.
///
/// Each implementation resolves the request itself (collection inheritance,
/// environment lookup, substitution, auth) before sending it.
#[async_trait]
pub trait RequestSender: Send + Sync {
    /// Sends the request `request_id`, resolving it against `environment_id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown ids and a protocol-specific error when
    /// building, sending or reading the call fails.
    async fn send_request(
        &self,
        request_id: &str,
        environment_id: Option<&str>,
    ) -> DispatchResult<Response>;
}
