//! Scope authorizer.
//!
//! The decision is an ordered list of guards. Each guard either decides
//! (`Some(decision)`) or passes (`None`) to the next one; when no guard
//! decides, the request is denied.

use crate::auth::Credential;
use std::collections::BTreeSet;
use thiserror::Error;

/// Outcome of an authorization check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    /// The matched route has no policy entry
    NoPolicy,
    /// The credential lacks these required scopes
    MissingScopes(BTreeSet<String>),
    /// No guard could establish that the request is allowed
    Unproven,
}

/// The authorizer was called without an authenticated credential.
/// This is a wiring error, not an end-user denial.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("No credential available for authorization")]
pub struct MissingContext;

type Guard = fn(&Credential, Option<&BTreeSet<String>>) -> Option<Decision>;

/// Guards in evaluation order
const GUARDS: &[Guard] = &[route_has_policy, credential_carries_required_scopes];

fn route_has_policy(_: &Credential, required: Option<&BTreeSet<String>>) -> Option<Decision> {
    match required {
        None => Some(Decision::Deny(DenyReason::NoPolicy)),
        Some(_) => None,
    }
}

fn credential_carries_required_scopes(
    credential: &Credential,
    required: Option<&BTreeSet<String>>,
) -> Option<Decision> {
    let required = required?;
    let claimed = credential.claims.scopes();
    let missing: BTreeSet<String> = required.difference(&claimed).cloned().collect();
    if missing.is_empty() {
        Some(Decision::Allow)
    } else {
        Some(Decision::Deny(DenyReason::MissingScopes(missing)))
    }
}

/// Decides whether `credential` may use a route requiring `required` scopes.
///
/// `required` is `None` when the route has no policy entry, which denies.
pub fn authorize(
    credential: Option<&Credential>,
    required: Option<&BTreeSet<String>>,
) -> Result<Decision, MissingContext> {
    let credential = credential.ok_or(MissingContext)?;
    let decision = GUARDS
        .iter()
        .find_map(|guard| guard(credential, required))
        .unwrap_or(Decision::Deny(DenyReason::Unproven));
    Ok(decision)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::TokenClaims;

    fn credential(scope: &str) -> Credential {
        Credential {
            access_token: "token".to_string(),
            token_type: "Bearer".to_string(),
            claims: TokenClaims {
                sub: Some("u1".to_string()),
                client_id: Some("c1".to_string()),
                scope: Some(scope.to_string()),
                scp: Vec::new(),
                exp: u64::MAX,
                iat: None,
                iss: None,
            },
        }
    }

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_allow_when_scopes_are_a_superset() {
        let decision = authorize(Some(&credential("a b c")), Some(&set(&["a", "b"]))).unwrap();
        assert_eq!(decision, Decision::Allow);
    }

    #[test]
    fn test_deny_lists_missing_scopes() {
        let decision = authorize(Some(&credential("a")), Some(&set(&["a", "b", "c"]))).unwrap();
        assert_eq!(
            decision,
            Decision::Deny(DenyReason::MissingScopes(set(&["b", "c"])))
        );
    }

    #[test]
    fn test_deny_without_policy() {
        let decision = authorize(Some(&credential("a b c")), None).unwrap();
        assert_eq!(decision, Decision::Deny(DenyReason::NoPolicy));
    }

    #[test]
    fn test_deny_token_without_scopes() {
        let mut credential = credential("");
        credential.claims.scope = None;
        let decision = authorize(Some(&credential), Some(&set(&["a"]))).unwrap();
        assert!(matches!(decision, Decision::Deny(_)));
    }

    #[test]
    fn test_explicitly_empty_policy_allows() {
        let decision = authorize(Some(&credential("")), Some(&BTreeSet::new())).unwrap();
        assert_eq!(decision, Decision::Allow);
    }

    #[test]
    fn test_missing_credential_is_an_error() {
        assert_eq!(authorize(None, Some(&set(&["a"]))), Err(MissingContext));
    }
}
