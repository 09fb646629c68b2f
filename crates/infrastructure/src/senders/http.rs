//! HTTP sender

use std::path::PathBuf;

use async_trait::async_trait;
use courier_application::{DispatchError, DispatchResult, RequestSender, SendContext};
use courier_domain::{HttpRequestSpec, KeyValue, ProtocolSpec, Response};
use url::Url;
use reqwest::header::{CONTENT_TYPE, HeaderValue};

use super::transport::{
    append_header, apply_preference_headers, build_client, execute, header_map, to_reqwest_method,
};
use crate::auth::auth_header;
use crate::http::build_body;

/// Sends HTTP requests with reqwest.
#[derive(Clone)]
pub struct HttpSender {
    context: SendContext,
    base_dir: Option<PathBuf>,
}

impl HttpSender {
    /// Creates a sender resolving requests through `context`.
    #[must_use]
    pub const fn new(context: SendContext) -> Self {
        Self {
            context,
            base_dir: None,
        }
    }

    /// Resolves relative body file paths against `dir`.
    #[must_use]
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }
}

#[async_trait]
impl RequestSender for HttpSender {
    async fn send_request(
        &self,
        request_id: &str,
        environment_id: Option<&str>,
    ) -> DispatchResult<Response> {
        let prepared = self.context.prepare(request_id, environment_id)?;
        let ProtocolSpec::Http(spec) = prepared.request.spec else {
            return Err(DispatchError::InvalidRequest(format!(
                "request {request_id} is not an HTTP request"
            )));
        };

        let preferences = self.context.preferences();
        let client = build_client(&preferences)?;
        let url = build_url(&spec)?;
        let body = build_body(&spec.body, self.base_dir.as_deref()).await?;

        let mut headers = header_map(&spec.headers)?;
        if let Some(content_type) = body.content_type()
            && !headers.contains_key(CONTENT_TYPE)
        {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        }
        if let Some((name, value)) = auth_header(&spec.auth) {
            append_header(&mut headers, &name, &value)?;
        }
        apply_preference_headers(&mut headers, &preferences);

        let builder = client
            .request(to_reqwest_method(spec.method), url)
            .headers(headers);
        let request = body
            .attach(builder)
            .build()
            .map_err(|e| DispatchError::InvalidRequest(e.to_string()))?;

        execute(&client, request, &preferences).await
    }
}

/// Parses the URL after path params, then appends the enabled query params.
fn build_url(spec: &HttpRequestSpec) -> DispatchResult<Url> {
    let raw = apply_path_params(spec.url.trim(), &spec.path_params);
    let mut url = Url::parse(&raw)
        .map_err(|e| DispatchError::InvalidRequest(format!("invalid URL {raw:?}: {e}")))?;

    let query: Vec<_> = spec
        .query_params
        .iter()
        .filter(|q| q.enabled && !q.key.is_empty())
        .map(|q| (q.key.as_str(), q.value.as_str()))
        .collect();
    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query);
    }
    Ok(url)
}

/// Replaces `{name}` in the path part of `raw`; host and query are left alone.
fn apply_path_params(raw: &str, params: &[KeyValue]) -> String {
    let authority = raw.find("://").map_or(0, |i| i + 3);
    let path_start = raw[authority..].find('/').map_or(raw.len(), |i| authority + i);
    let path_end = raw[path_start..]
        .find(['?', '#'])
        .map_or(raw.len(), |i| path_start + i);

    let mut path = raw[path_start..path_end].to_string();
    for param in params.iter().filter(|p| p.enabled && !p.key.is_empty()) {
        path = path.replace(&format!("{{{}}}", param.key), &param.value);
    }
    format!("{}{path}{}", &raw[..path_start], &raw[path_end..])
}
