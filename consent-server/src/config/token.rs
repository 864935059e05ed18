use confique::Config;
use std::path::PathBuf;

/// Access token verification settings.
///
/// Tokens are issued by the external identity provider; this service only
/// verifies them. HMAC algorithms use `secret`, RSA and EC algorithms read a
/// PEM encoded public key from `public_key_path`.
#[derive(Debug, Config, Clone)]
pub struct TokenConfig {
    /// JWT signing algorithm name, e.g. HS256 or RS256 (default: HS256)
    #[config(env = "CONSENT_TOKEN_ALGORITHM", default = "HS256")]
    pub algorithm: String,

    /// Shared secret for HS256/HS384/HS512
    #[config(env = "CONSENT_TOKEN_SECRET")]
    pub secret: Option<String>,

    /// Path to a PEM public key for RS*/PS*/ES* algorithms
    #[config(env = "CONSENT_TOKEN_PUBLIC_KEY_PATH")]
    pub public_key_path: Option<PathBuf>,

    /// Expected `iss` claim, not checked when unset
    #[config(env = "CONSENT_TOKEN_ISSUER")]
    pub issuer: Option<String>,

    /// Expected `aud` claim, not checked when unset
    #[config(env = "CONSENT_TOKEN_AUDIENCE")]
    pub audience: Option<String>,

    /// Clock skew tolerated on `exp`/`nbf` in seconds (default: 0)
    #[config(env = "CONSENT_TOKEN_LEEWAY", default = 0)]
    pub leeway: u64,
}
