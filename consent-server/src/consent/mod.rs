//! Consent state model: who granted which scopes to which application.

pub mod service;

use crate::store::StoreError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

pub use service::ConsentService;

/// The resource owner a consent belongs to
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Identity(pub String);

/// The OAuth2 client (relying party) receiving delegated access
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Application(pub String);

/// A named capability
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scope(pub String);

impl Scope {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Addresses the scope set of one `(identity, application, granting identity)` tuple.
///
/// The granting identity is the actor that authorized the consent on behalf
/// of the application, for example the client acting as itself.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConsentKey {
    pub identity: Identity,
    pub application: Application,
    pub granting_identity: Identity,
}

impl ConsentKey {
    /// Builds a key, rejecting empty identifiers
    pub fn new(
        identity: &str,
        application: &str,
        granting_identity: &str,
    ) -> Result<Self, ConsentError> {
        if identity.is_empty() {
            return Err(ConsentError::MissingRequiredField(Field::Identity));
        }
        if application.is_empty() {
            return Err(ConsentError::MissingRequiredField(Field::Application));
        }
        if granting_identity.is_empty() {
            return Err(ConsentError::MissingRequiredField(Field::GrantingIdentity));
        }
        Ok(Self {
            identity: Identity(identity.to_string()),
            application: Application(application.to_string()),
            granting_identity: Identity(granting_identity.to_string()),
        })
    }
}

/// A single grant/revoke change set for one tuple.
///
/// A scope listed in both `grant` and `revoke` is granted: the overlap is
/// removed from `revoke` on construction, so the delta handed to a store is
/// always disjoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsentDelta {
    grant: BTreeSet<Scope>,
    revoke: BTreeSet<Scope>,
}

impl ConsentDelta {
    pub fn new<G, R>(grant: G, revoke: R) -> Result<Self, ConsentError>
    where
        G: IntoIterator<Item = String>,
        R: IntoIterator<Item = String>,
    {
        let grant = collect_scopes(grant)?;
        let revoke = collect_scopes(revoke)?
            .into_iter()
            .filter(|scope| !grant.contains(scope))
            .collect();
        Ok(Self { grant, revoke })
    }

    pub fn grant(&self) -> &BTreeSet<Scope> {
        &self.grant
    }

    pub fn revoke(&self) -> &BTreeSet<Scope> {
        &self.revoke
    }

    pub fn is_empty(&self) -> bool {
        self.grant.is_empty() && self.revoke.is_empty()
    }

    /// Applies the delta to a scope set: revoke first, then grant
    pub fn apply_to(&self, scopes: &mut BTreeSet<Scope>) {
        for scope in &self.revoke {
            scopes.remove(scope);
        }
        scopes.extend(self.grant.iter().cloned());
    }
}

fn collect_scopes<I: IntoIterator<Item = String>>(
    scopes: I,
) -> Result<BTreeSet<Scope>, ConsentError> {
    scopes
        .into_iter()
        .map(|name| {
            let name = name.trim();
            if name.is_empty() {
                Err(ConsentError::MissingRequiredField(Field::Scope))
            } else {
                Ok(Scope::new(name))
            }
        })
        .collect()
}

/// Parses a comma-separated scope list such as `read,write`.
/// Blank items are dropped, so `""` yields an empty set.
pub fn parse_scope_list(raw: &str) -> BTreeSet<Scope> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(Scope::new)
        .collect()
}

/// Request fields that may be missing from a consent operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Identity,
    Application,
    GrantingIdentity,
    Scope,
}

impl Field {
    /// The wire name of the field on the read path (query parameters)
    pub fn query_name(&self) -> &'static str {
        match self {
            Field::Identity => "id",
            Field::Application => "app",
            Field::GrantingIdentity => "client_id",
            Field::Scope => "scope",
        }
    }

    /// The wire name of the field on the write path (JSON body)
    pub fn body_name(&self) -> &'static str {
        match self {
            Field::Identity => "sub",
            Field::Application => "app",
            Field::GrantingIdentity => "client_id",
            Field::Scope => "granted_scopes/revoked_scopes",
        }
    }
}

/// Errors that can occur during consent operations
#[derive(Debug, Error)]
pub enum ConsentError {
    #[error("Missing required field: {}", .0.body_name())]
    MissingRequiredField(Field),
    #[error("Empty request not allowed")]
    EmptyRequestNotAllowed,
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scopes(names: &[&str]) -> BTreeSet<Scope> {
        names.iter().map(|s| Scope::new(*s)).collect()
    }

    fn strings(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_consent_key_requires_all_identifiers() {
        assert!(ConsentKey::new("u1", "app1", "c1").is_ok());
        assert!(matches!(
            ConsentKey::new("", "app1", "c1"),
            Err(ConsentError::MissingRequiredField(Field::Identity))
        ));
        assert!(matches!(
            ConsentKey::new("u1", "", "c1"),
            Err(ConsentError::MissingRequiredField(Field::Application))
        ));
        assert!(matches!(
            ConsentKey::new("u1", "app1", ""),
            Err(ConsentError::MissingRequiredField(Field::GrantingIdentity))
        ));
    }

    #[test]
    fn test_delta_grant_wins_on_overlap() {
        let delta = ConsentDelta::new(strings(&["read", "write"]), strings(&["write", "admin"]))
            .expect("valid delta");
        assert_eq!(delta.grant(), &scopes(&["read", "write"]));
        assert_eq!(delta.revoke(), &scopes(&["admin"]));
    }

    #[test]
    fn test_delta_rejects_blank_scope() {
        let result = ConsentDelta::new(strings(&["read", " "]), Vec::new());
        assert!(matches!(
            result,
            Err(ConsentError::MissingRequiredField(Field::Scope))
        ));
    }

    #[test]
    fn test_delta_trims_scope_names() {
        let delta = ConsentDelta::new(strings(&[" write", "read "]), strings(&[" read"])).unwrap();
        assert_eq!(delta.grant(), &scopes(&["read", "write"]));
        // trimmed before the overlap check, so grant still wins
        assert!(delta.revoke().is_empty());
    }

    #[test]
    fn test_delta_deduplicates() {
        let delta = ConsentDelta::new(strings(&["read", "read"]), Vec::new()).unwrap();
        assert_eq!(delta.grant().len(), 1);
        assert!(!delta.is_empty());
        assert!(ConsentDelta::default().is_empty());
    }

    #[test]
    fn test_apply_to_revokes_then_grants() {
        let mut current = scopes(&["a", "b"]);
        let delta = ConsentDelta::new(strings(&["c"]), strings(&["a", "missing"])).unwrap();
        delta.apply_to(&mut current);
        assert_eq!(current, scopes(&["b", "c"]));
    }

    #[test]
    fn test_parse_scope_list() {
        assert_eq!(parse_scope_list("read, write,,"), scopes(&["read", "write"]));
        assert!(parse_scope_list("").is_empty());
        assert_eq!(parse_scope_list("read,read"), scopes(&["read"]));
    }
}
