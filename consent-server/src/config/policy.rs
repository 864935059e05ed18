use confique::env::parse::list_by_comma;
use confique::Config;

/// Scopes an access token must carry for each consent route
#[derive(Debug, Config, Clone)]
pub struct PolicyConfig {
    /// Required for `GET /authorizations`
    #[config(
        env = "CONSENT_POLICY_READ_SCOPES",
        parse_env = list_by_comma,
        default = ["consent.authorizations.get"]
    )]
    pub read_scopes: Vec<String>,

    /// Required for `POST /authorizations`
    #[config(
        env = "CONSENT_POLICY_WRITE_SCOPES",
        parse_env = list_by_comma,
        default = ["consent.authorizations.post"]
    )]
    pub write_scopes: Vec<String>,

    /// Required for `PUT /authorizations`
    #[config(
        env = "CONSENT_POLICY_UPDATE_SCOPES",
        parse_env = list_by_comma,
        default = ["consent.authorizations.update"]
    )]
    pub update_scopes: Vec<String>,
}

impl PolicyConfig {
    /// The built-in scope names, without consulting the environment
    pub fn default_scopes() -> Self {
        Self {
            read_scopes: vec!["consent.authorizations.get".to_string()],
            write_scopes: vec!["consent.authorizations.post".to_string()],
            update_scopes: vec!["consent.authorizations.update".to_string()],
        }
    }
}
