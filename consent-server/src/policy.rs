use crate::config::PolicyConfig;
use http::Method;
use std::collections::{BTreeSet, HashMap};

/// Path of the consent collection
pub(crate) const AUTHORIZATIONS_PATH: &str = "/authorizations";

/// Immutable table of required scopes per method and route path.
///
/// Built once at startup and shared read-only by every request.
#[derive(Debug, Clone, Default)]
pub struct RoutePolicy {
    routes: HashMap<Method, HashMap<String, BTreeSet<String>>>,
}

impl RoutePolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the scopes required for a route, replacing any previous entry
    pub fn with_route<I, S>(mut self, method: Method, path: &str, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let scopes = scopes
            .into_iter()
            .map(|s| s.as_ref().trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        self.routes
            .entry(method)
            .or_default()
            .insert(path.to_string(), scopes);
        self
    }

    pub fn from_config(config: &PolicyConfig) -> Self {
        Self::new()
            .with_route(Method::GET, AUTHORIZATIONS_PATH, &config.read_scopes)
            .with_route(Method::POST, AUTHORIZATIONS_PATH, &config.write_scopes)
            .with_route(Method::PUT, AUTHORIZATIONS_PATH, &config.update_scopes)
    }

    /// Scopes required for the route, `None` if the route has no entry
    pub fn required_scopes(&self, method: &Method, path: &str) -> Option<&BTreeSet<String>> {
        self.routes.get(method)?.get(path)
    }
}
