//! Caller identity and the access decision gate.
//!
//! Upstream middleware owns token verification; this service only looks at
//! whether identity claims are present. Unpublished resources are reported
//! as not found to unauthorised callers, never as forbidden, so their
//! existence is not revealed.

use axum::http::HeaderMap;

const AUTHORIZATION_HEADER: &str = "authorization";
const FLORENCE_TOKEN_HEADER: &str = "x-florence-token";
const BEARER_PREFIX: &str = "Bearer ";

/// Identity claims carried by the inbound request.
#[derive(Debug, Clone, Default)]
pub struct CallerIdentity {
    /// Service-to-service auth token, from the Authorization header.
    pub service_token: Option<String>,

    /// User (Florence) auth token.
    pub user_token: Option<String>,
}

impl CallerIdentity {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let service_token = headers
            .get(AUTHORIZATION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.strip_prefix(BEARER_PREFIX).unwrap_or(v).to_string())
            .filter(|v| !v.is_empty());

        let user_token = headers
            .get(FLORENCE_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .filter(|v| !v.is_empty());

        Self {
            service_token,
            user_token,
        }
    }

    /// Either claim present.
    pub fn is_present(&self) -> bool {
        self.service_token.is_some() || self.user_token.is_some()
    }
}

/// Decide whether this caller may see unpublished resources.
///
/// When private endpoints are disabled the answer is always false, forcing
/// the published-only view regardless of claims.
pub fn is_authorised(enable_private_endpoints: bool, caller: &CallerIdentity) -> bool {
    if !enable_private_endpoints {
        return false;
    }

    let authorised = caller.is_present();
    tracing::debug!(
        authenticated = authorised,
        has_service_token = caller.service_token.is_some(),
        has_user_token = caller.user_token.is_some(),
        "access decision"
    );
    authorised
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn identity(service: Option<&str>, user: Option<&str>) -> CallerIdentity {
        CallerIdentity {
            service_token: service.map(String::from),
            user_token: user.map(String::from),
        }
    }

    #[test]
    fn test_private_endpoints_disabled_forces_unauthorised() {
        assert!(!is_authorised(false, &identity(Some("svc"), Some("usr"))));
    }

    #[test]
    fn test_either_claim_authorises_when_enabled() {
        assert!(is_authorised(true, &identity(Some("svc"), None)));
        assert!(is_authorised(true, &identity(None, Some("usr"))));
        assert!(!is_authorised(true, &identity(None, None)));
    }

    #[test]
    fn test_header_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Bearer abc123"));
        headers.insert("X-Florence-Token", HeaderValue::from_static("flo456"));

        let caller = CallerIdentity::from_headers(&headers);
        assert_eq!(caller.service_token.as_deref(), Some("abc123"));
        assert_eq!(caller.user_token.as_deref(), Some("flo456"));

        let empty = CallerIdentity::from_headers(&HeaderMap::new());
        assert!(!empty.is_present());
    }
}
