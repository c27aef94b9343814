//! Session cookie handling and the [`CurrentUser`] extractor.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{HeaderMap, header::COOKIE, request::Parts},
};
use tododb::{SESSION_TTL_SECS, TodoError};

use crate::{error::ApiError, state::AppState};

pub const SESSION_COOKIE: &str = "auth_token";

/// The authenticated caller, resolved from a valid session cookie.
///
/// Handlers that take this extractor answer 401 before running when the
/// cookie is missing, malformed, tampered with or expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i32,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers).ok_or(TodoError::Unauthorized)?;
        let claims = state.keys.verify(token).map_err(|e| {
            log::debug!("Rejected session token: {e}");
            TodoError::Unauthorized
        })?;

        Ok(CurrentUser { id: claims.user_id })
    }
}

/// Finds `auth_token` among all `Cookie` headers.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token.trim_matches('"'))
        .filter(|token| !token.is_empty())
}

/// `Set-Cookie` value carrying a freshly issued session token.
pub fn session_cookie(token: &str, secure: bool) -> String {
    build_cookie(token, SESSION_TTL_SECS, secure)
}

/// `Set-Cookie` value that makes the browser drop the session.
pub fn clear_session_cookie(secure: bool) -> String {
    build_cookie("", 0, secure)
}

fn build_cookie(value: &str, max_age: i64, secure: bool) -> String {
    let mut cookie =
        format!("{SESSION_COOKIE}={value}; HttpOnly; Path=/; SameSite=Lax; Max-Age={max_age}");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(cookies: &[&'static str]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for cookie in cookies {
            headers.append(COOKIE, HeaderValue::from_static(cookie));
        }
        headers
    }

    #[test]
    fn test_finds_token_among_other_cookies() {
        let headers = headers(&["theme=dark; auth_token=abc.def.ghi; lang=en"]);
        assert_eq!(session_token(&headers), Some("abc.def.ghi"));
    }

    #[test]
    fn test_searches_every_cookie_header() {
        let headers = headers(&["theme=dark", "auth_token=tok"]);
        assert_eq!(session_token(&headers), Some("tok"));
    }

    #[test]
    fn test_missing_or_empty_token() {
        assert_eq!(session_token(&headers(&[])), None);
        assert_eq!(session_token(&headers(&["auth_token="])), None);
        assert_eq!(session_token(&headers(&["xauth_token=tok"])), None);
    }

    #[test]
    fn test_cookie_attributes() {
        assert_eq!(
            session_cookie("tok", false),
            "auth_token=tok; HttpOnly; Path=/; SameSite=Lax; Max-Age=604800"
        );
        assert!(session_cookie("tok", true).ends_with("; Secure"));
        assert!(clear_session_cookie(false).contains("Max-Age=0"));
    }
}
