pub mod authorizer;
pub mod token;

use crate::auth::token::{TokenClaims, TokenVerifier};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use log::debug;
use serde_json::json;

/// A bearer credential that passed the validity predicate
#[derive(Debug, Clone, PartialEq)]
pub struct Credential {
    pub access_token: String,
    pub token_type: String,
    pub claims: TokenClaims,
}

/// Per-request context handed down the pipeline.
///
/// Created by the authentication layer and stored in the request extensions;
/// it never outlives the request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub credential: Credential,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// Header absent, empty or not of the form `Bearer <token>`
    MissingCredential,
    /// Token present but rejected by the validity predicate
    InvalidCredential,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let error_message = match self {
            AuthError::MissingCredential => "Authorization: Bearer <token> not found in request.",
            AuthError::InvalidCredential => "Invalid access token.",
        };
        let body = axum::Json(json!({
            "error": error_message,
        }));
        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}

/// Splits an `Authorization` header value into `(scheme, token)`.
///
/// The value must consist of exactly two whitespace-separated parts, the first
/// being `bearer` in any case.
pub fn extract_bearer(raw_header: Option<&str>) -> Result<(&str, &str), AuthError> {
    let raw_header = raw_header.ok_or(AuthError::MissingCredential)?;
    let mut parts = raw_header.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => {
            Ok((scheme, token))
        }
        _ => Err(AuthError::MissingCredential),
    }
}

/// The authentication gate: header in, credential out
#[derive(Debug)]
pub struct Authenticator {
    verifier: TokenVerifier,
}

impl Authenticator {
    pub fn new(verifier: TokenVerifier) -> Self {
        Self { verifier }
    }

    pub fn authenticate(
        &self,
        request_id: &str,
        raw_header: Option<&str>,
    ) -> Result<Credential, AuthError> {
        debug!("[{}] Checking Authorization: Bearer <token> in request", request_id);
        let (scheme, token) = extract_bearer(raw_header)?;
        debug!("[{}] Authorization: Bearer <token> found for request", request_id);

        match self.verifier.verify(token) {
            Ok(claims) => {
                debug!("[{}] Valid access token", request_id);
                Ok(Credential {
                    access_token: token.to_string(),
                    token_type: scheme.to_string(),
                    claims,
                })
            }
            Err(e) => {
                debug!("[{}] Invalid access token: {}", request_id, e);
                Err(AuthError::InvalidCredential)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::token::tests::{sign_token, TEST_SECRET};
    use super::*;
    use jsonwebtoken::{Algorithm, DecodingKey};

    fn authenticator() -> Authenticator {
        Authenticator::new(TokenVerifier::new(
            DecodingKey::from_secret(TEST_SECRET.as_bytes()),
            Algorithm::HS256,
        ))
    }

    #[test]
    fn test_extract_bearer_accepts_any_case() {
        assert_eq!(extract_bearer(Some("Bearer abc")), Ok(("Bearer", "abc")));
        assert_eq!(extract_bearer(Some("bearer abc")), Ok(("bearer", "abc")));
        assert_eq!(extract_bearer(Some("BEARER  abc ")), Ok(("BEARER", "abc")));
    }

    #[test]
    fn test_extract_bearer_rejects_malformed_headers() {
        for header in [
            None,
            Some(""),
            Some("   "),
            Some("Bearer"),
            Some("abc"),
            Some("Basic abc"),
            Some("Bearer abc def"),
        ] {
            assert_eq!(
                extract_bearer(header),
                Err(AuthError::MissingCredential),
                "header {:?} should be rejected",
                header
            );
        }
    }

    #[test]
    fn test_authenticate_valid_token() {
        let token = sign_token("read", 300);
        let header = format!("Bearer {}", token);
        let credential = authenticator()
            .authenticate("req-1", Some(&header))
            .expect("token should be accepted");
        assert_eq!(credential.access_token, token);
        assert_eq!(credential.token_type, "Bearer");
        assert_eq!(credential.claims.client_id.as_deref(), Some("c1"));
    }

    #[test]
    fn test_authenticate_expired_token() {
        let header = format!("Bearer {}", sign_token("read", -300));
        assert_eq!(
            authenticator().authenticate("req-1", Some(&header)),
            Err(AuthError::InvalidCredential)
        );
    }

    #[test]
    fn test_authenticate_malformed_header() {
        assert_eq!(
            authenticator().authenticate("req-1", Some("Token abc")),
            Err(AuthError::MissingCredential)
        );
    }
}
