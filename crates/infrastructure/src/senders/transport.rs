//! reqwest plumbing shared by the HTTP and GraphQL senders

use std::time::Instant;

use courier_application::{DispatchError, DispatchResult};
use courier_domain::{Cookie, HttpMethod, HttpVersion, KeyValue, Preferences, Response};
use reqwest::header::{CACHE_CONTROL, HeaderMap, HeaderName, HeaderValue, SET_COOKIE, USER_AGENT};
use reqwest::{Client, Method};
use tracing::debug;

/// Value of the `User-Agent` header when the agent preference is on.
pub const AGENT_NAME: &str = concat!("Courier/", env!("CARGO_PKG_VERSION"));

/// Builds a client for the current preferences.
///
/// A client is built per send so preference changes apply to the next call.
pub(crate) fn build_client(preferences: &Preferences) -> DispatchResult<Client> {
    let mut builder = Client::builder().redirect(reqwest::redirect::Policy::limited(10));
    if let Some(timeout) = preferences.timeout() {
        builder = builder.timeout(timeout);
    }
    builder = match preferences.http_version {
        HttpVersion::Http1 => builder.http1_only(),
        HttpVersion::Http2 => builder.http2_prior_knowledge(),
    };
    builder.build().map_err(transport_error)
}

/// Converts domain `HttpMethod` to reqwest `Method`.
pub(crate) const fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Head => Method::HEAD,
        HttpMethod::Options => Method::OPTIONS,
    }
}

/// Appends one header, rejecting names or values that are not valid on the wire.
pub(crate) fn append_header(headers: &mut HeaderMap, name: &str, value: &str) -> DispatchResult<()> {
    let name = HeaderName::from_bytes(name.trim().as_bytes())
        .map_err(|e| DispatchError::InvalidRequest(format!("invalid header name {name:?}: {e}")))?;
    let value = HeaderValue::from_str(value)
        .map_err(|e| DispatchError::InvalidRequest(format!("invalid value for header {name}: {e}")))?;
    headers.append(name, value);
    Ok(())
}

/// Collects the enabled entries of `headers`, keeping repeated names.
pub(crate) fn header_map(headers: &[KeyValue]) -> DispatchResult<HeaderMap> {
    let mut map = HeaderMap::new();
    for header in headers.iter().filter(|h| h.enabled && !h.key.trim().is_empty()) {
        append_header(&mut map, &header.key, &header.value)?;
    }
    Ok(map)
}

/// Adds the optional no-cache and agent headers.
pub(crate) fn apply_preference_headers(headers: &mut HeaderMap, preferences: &Preferences) {
    if preferences.send_no_cache_header {
        headers.append(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    }
    if preferences.send_agent_header {
        headers.append(USER_AGENT, HeaderValue::from_static(AGENT_NAME));
    }
}

pub(crate) fn transport_error(err: reqwest::Error) -> DispatchError {
    DispatchError::Transport(err.to_string())
}

/// Executes `request` once and normalizes the reply.
///
/// Elapsed time covers the round trip and the body read.
pub(crate) async fn execute(
    client: &Client,
    request: reqwest::Request,
    preferences: &Preferences,
) -> DispatchResult<Response> {
    let sent_headers = request.headers().clone();
    debug!(method = %request.method(), url = %request.url(), "sending");

    let start = Instant::now();
    let mut reply = client.execute(request).await.map_err(transport_error)?;
    let status = reply.status();
    let headers = reply.headers().clone();
    let body = read_body(&mut reply, preferences.max_response_bytes()).await?;
    let elapsed = start.elapsed();

    let mut response = Response::new(status.as_u16(), body, elapsed)
        .with_status(status.canonical_reason().unwrap_or_default());
    for (name, value) in &headers {
        response.append_header(name.as_str(), &String::from_utf8_lossy(value.as_bytes()));
    }
    for (name, value) in &sent_headers {
        response.append_request_header(name.as_str(), &String::from_utf8_lossy(value.as_bytes()));
    }
    response.cookies = headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(Cookie::from_set_cookie)
        .collect();

    debug!(status = response.status_code, size = response.size, elapsed_ms = elapsed.as_millis(), "received");
    Ok(response)
}

async fn read_body(reply: &mut reqwest::Response, limit: Option<u64>) -> DispatchResult<Vec<u8>> {
    let mut body = Vec::new();
    while let Some(chunk) = reply
        .chunk()
        .await
        .map_err(|e| DispatchError::BodyRead(e.to_string()))?
    {
        if let Some(limit) = limit
            && (body.len() + chunk.len()) as u64 > limit
        {
            return Err(DispatchError::BodyRead(format!(
                "response body exceeds the {limit} byte limit"
            )));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_header_map_keeps_repeats_and_skips_disabled() {
        let map = header_map(&[
            KeyValue::new("Accept", "text/html"),
            KeyValue::new("accept", "application/json"),
            KeyValue::disabled("X-Off", "1"),
        ])
        .unwrap();
        let accept: Vec<_> = map.get_all("accept").iter().collect();
        assert_eq!(accept.len(), 2);
        assert!(!map.contains_key("x-off"));
    }

    #[test]
    fn test_invalid_header_name() {
        let err = header_map(&[KeyValue::new("bad header", "v")]).unwrap_err();
        assert!(matches!(err, DispatchError::InvalidRequest(_)));
    }

    #[test]
    fn test_preference_headers() {
        let mut map = HeaderMap::new();
        let preferences = Preferences {
            send_no_cache_header: true,
            ..Preferences::default()
        };
        apply_preference_headers(&mut map, &preferences);
        assert_eq!(map.get(CACHE_CONTROL).unwrap(), "no-cache");
        assert_eq!(map.get(USER_AGENT).unwrap(), AGENT_NAME);

        let mut map = HeaderMap::new();
        let preferences = Preferences {
            send_agent_header: false,
            ..Preferences::default()
        };
        apply_preference_headers(&mut map, &preferences);
        assert!(map.is_empty());
    }
}
