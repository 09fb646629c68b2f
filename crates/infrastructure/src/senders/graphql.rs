//! GraphQL-over-HTTP sender

use async_trait::async_trait;
use courier_application::{DispatchError, DispatchResult, RequestSender, SendContext};
use courier_domain::{ProtocolSpec, Response};
use url::Url;
use reqwest::header::{CONTENT_TYPE, HeaderValue};

use super::transport::{
    append_header, apply_preference_headers, build_client, execute, header_map,
};
use crate::auth::auth_header;

/// Posts `{"query", "variables"}` envelopes with reqwest.
#[derive(Clone)]
pub struct GraphQlSender {
    context: SendContext,
}

impl GraphQlSender {
    /// Creates a sender resolving requests through `context`.
    #[must_use]
    pub const fn new(context: SendContext) -> Self {
        Self { context }
    }
}

#[async_trait]
impl RequestSender for GraphQlSender {
    async fn send_request(
        &self,
        request_id: &str,
        environment_id: Option<&str>,
    ) -> DispatchResult<Response> {
        let prepared = self.context.prepare(request_id, environment_id)?;
        let ProtocolSpec::GraphQl(spec) = prepared.request.spec else {
            return Err(DispatchError::InvalidRequest(format!(
                "request {request_id} is not a GraphQL request"
            )));
        };

        // Bad variables fail here, before any connection is made.
        let envelope = spec.envelope()?;
        let body = serde_json::to_vec(&envelope)
            .map_err(|e| DispatchError::RequestBody(e.to_string()))?;

        let url = Url::parse(spec.url.trim()).map_err(|e| {
            DispatchError::InvalidRequest(format!("invalid URL {:?}: {e}", spec.url))
        })?;

        let preferences = self.context.preferences();
        let client = build_client(&preferences)?;

        let mut headers = header_map(&spec.headers)?;
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some((name, value)) = auth_header(&spec.auth) {
            append_header(&mut headers, &name, &value)?;
        }
        apply_preference_headers(&mut headers, &preferences);

        let request = client
            .post(url)
            .headers(headers)
            .body(body)
            .build()
            .map_err(|e| DispatchError::InvalidRequest(e.to_string()))?;

        execute(&client, request, &preferences).await
    }
}
