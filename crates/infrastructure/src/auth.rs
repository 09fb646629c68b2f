//! Wire rendering of resolved auth

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use courier_domain::{Auth, AuthCredential};

/// Header carrying bearer and basic credentials.
pub const AUTHORIZATION: &str = "Authorization";

/// Returns the one header that carries `auth`.
///
/// `None` when the auth is `None`, `Inherit` or only partially configured.
#[must_use]
pub fn auth_header(auth: &Auth) -> Option<(String, String)> {
    let header = match auth.credential()? {
        AuthCredential::Bearer(token) => (AUTHORIZATION.to_string(), format!("Bearer {token}")),
        AuthCredential::Basic { username, password } => (
            AUTHORIZATION.to_string(),
            format!("Basic {}", STANDARD.encode(format!("{username}:{password}"))),
        ),
        AuthCredential::Header { name, value } => (name, value),
    };
    Some(header)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_basic_header() {
        assert_eq!(
            auth_header(&Auth::basic("admin", "secret")),
            Some((
                "Authorization".to_string(),
                "Basic YWRtaW46c2VjcmV0".to_string()
            ))
        );
    }

    #[test]
    fn test_bearer_and_api_key() {
        assert_eq!(
            auth_header(&Auth::token("abc")).map(|(_, v)| v),
            Some("Bearer abc".to_string())
        );
        assert_eq!(
            auth_header(&Auth::api_key("X-Api-Key", "k1")),
            Some(("X-Api-Key".to_string(), "k1".to_string()))
        );
    }

    #[test]
    fn test_partial_auth_sends_nothing() {
        assert_eq!(auth_header(&Auth::basic("admin", "")), None);
        assert_eq!(auth_header(&Auth::None), None);
    }
}
