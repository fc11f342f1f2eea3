use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use chrono::Utc;

use crate::errors::AppError;
use crate::models::user::SessionRow;
use crate::state::AppState;

/// The authenticated caller, resolved from the session cookie.
///
/// Sessions live in the auth service's `sessions` table; this extractor only
/// reads them. Any failure along the way (no cookie, unknown token, expired
/// session) collapses to 401 so callers cannot probe which step failed.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let cookie_header = parts
            .headers
            .get(header::COOKIE)
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::Unauthorized)?;

        let raw = session_cookie_value(cookie_header, &state.config.session_cookie)
            .ok_or(AppError::Unauthorized)?;
        let token = signed_cookie_token(raw);

        let session: Option<SessionRow> =
            sqlx::query_as("SELECT user_id, expires_at FROM sessions WHERE token = $1")
                .bind(token)
                .fetch_optional(&state.db)
                .await?;

        let session = session.ok_or(AppError::Unauthorized)?;

        if session.expires_at < Utc::now() {
            return Err(AppError::Unauthorized);
        }

        Ok(AuthUser {
            user_id: session.user_id,
        })
    }
}

/// Finds the named cookie in a `Cookie:` header value.
/// Accepts the `__Secure-` prefixed form the auth service sets over HTTPS.
fn session_cookie_value<'a>(header: &'a str, cookie_name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        let name = name.trim();
        if name == cookie_name || name.strip_prefix("__Secure-") == Some(cookie_name) {
            Some(value.trim())
        } else {
            None
        }
    })
}

/// Strips the signature the auth library appends after the first `.`.
/// Unsigned values pass through unchanged.
fn signed_cookie_token(value: &str) -> &str {
    value.split_once('.').map(|(token, _)| token).unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_value_simple() {
        let header = "auth_session=abc123";
        assert_eq!(session_cookie_value(header, "auth_session"), Some("abc123"));
    }

    #[test]
    fn test_session_cookie_value_among_others() {
        let header = "theme=dark; auth_session=abc123; lang=en";
        assert_eq!(session_cookie_value(header, "auth_session"), Some("abc123"));
    }

    #[test]
    fn test_session_cookie_value_secure_prefix() {
        let header = "__Secure-auth_session=abc123";
        assert_eq!(session_cookie_value(header, "auth_session"), Some("abc123"));
    }

    #[test]
    fn test_session_cookie_value_missing() {
        let header = "theme=dark; lang=en";
        assert_eq!(session_cookie_value(header, "auth_session"), None);
    }

    #[test]
    fn test_session_cookie_value_no_partial_name_match() {
        let header = "my_auth_session=evil";
        assert_eq!(session_cookie_value(header, "auth_session"), None);
    }

    #[test]
    fn test_signed_cookie_token_strips_signature() {
        assert_eq!(signed_cookie_token("tok123.c2lnbmF0dXJl"), "tok123");
    }

    #[test]
    fn test_signed_cookie_token_unsigned_passthrough() {
        assert_eq!(signed_cookie_token("tok123"), "tok123");
    }

    #[test]
    fn test_signed_cookie_token_keeps_only_left_of_first_dot() {
        assert_eq!(signed_cookie_token("tok.sig.extra"), "tok");
    }
}
