//! Access token validity predicate.
//!
//! Access tokens are JWTs signed by the identity provider. Verification is
//! local and synchronous: signature, `exp`, `nbf` and, when configured, `iss`
//! and `aud`.

use crate::config::TokenConfig;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while building a verifier or verifying a token
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Invalid token configuration: {0}")]
    Config(String),
    #[error("Failed to read public key: {0}")]
    Io(#[from] std::io::Error),
    #[error("Token rejected: {0}")]
    Rejected(#[from] jsonwebtoken::errors::Error),
}

/// Claims asserted by the issuer of an access token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject the token was issued for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Client the token was issued to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    /// Space-separated scopes (RFC 8693 / RFC 9068 style)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Scopes as an array, as some providers emit them
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scp: Vec<String>,
    /// Expiration time (Unix time)
    pub exp: u64,
    /// Issued at (Unix time)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,
    /// Issuer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

impl TokenClaims {
    /// All scopes the token claims, from both `scope` and `scp`
    pub fn scopes(&self) -> BTreeSet<String> {
        self.scope
            .iter()
            .flat_map(|s| s.split_whitespace())
            .map(str::to_string)
            .chain(self.scp.iter().cloned())
            .collect()
    }
}

/// Verifies access tokens against a fixed key and validation rules
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("algorithms", &self.validation.algorithms)
            .finish()
    }
}

impl TokenVerifier {
    pub fn new(key: DecodingKey, algorithm: Algorithm) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.leeway = 0;
        validation.validate_nbf = true;
        validation.validate_aud = false;
        Self { key, validation }
    }

    /// Builds a verifier from configuration, loading key material eagerly
    pub fn from_config(config: &TokenConfig) -> Result<Self, TokenError> {
        let algorithm = Algorithm::from_str(config.algorithm.trim()).map_err(|_| {
            TokenError::Config(format!("unsupported algorithm '{}'", config.algorithm))
        })?;

        let key = match algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
                let secret = config
                    .secret
                    .as_deref()
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| {
                        TokenError::Config(format!("a secret is required for {:?}", algorithm))
                    })?;
                DecodingKey::from_secret(secret.as_bytes())
            }
            _ => {
                let path = config.public_key_path.as_ref().ok_or_else(|| {
                    TokenError::Config(format!(
                        "a public key path is required for {:?}",
                        algorithm
                    ))
                })?;
                let pem = std::fs::read(path)?;
                match algorithm {
                    Algorithm::ES256 | Algorithm::ES384 => DecodingKey::from_ec_pem(&pem),
                    Algorithm::EdDSA => DecodingKey::from_ed_pem(&pem),
                    _ => DecodingKey::from_rsa_pem(&pem),
                }
                .map_err(|e| TokenError::Config(format!("invalid public key: {e}")))?
            }
        };

        let mut verifier = Self::new(key, algorithm);
        verifier.validation.leeway = config.leeway;
        // a configured claim must also be present, not just match when sent
        let mut required = vec!["exp"];
        if let Some(issuer) = &config.issuer {
            verifier.validation.set_issuer(&[issuer]);
            required.push("iss");
        }
        if let Some(audience) = &config.audience {
            verifier.validation.set_audience(&[audience]);
            verifier.validation.validate_aud = true;
            required.push("aud");
        }
        verifier.validation.set_required_spec_claims(&required);
        Ok(verifier)
    }

    /// Verifies the token and returns its claims
    pub fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let data = decode::<TokenClaims>(token, &self.key, &self.validation)?;
        Ok(data.claims)
    }
}
