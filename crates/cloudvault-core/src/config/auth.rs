//! Authentication and token configuration.

use serde::{Deserialize, Serialize};

/// Identity verification and share-token settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret used to verify identity-provider bearer tokens.
    #[serde(default = "default_identity_secret")]
    pub identity_secret: String,
    /// Expected `iss` claim on identity tokens; empty disables the check.
    #[serde(default)]
    pub identity_issuer: String,
    /// HMAC secret for magic-link and share-session tokens.
    #[serde(default = "default_share_token_secret")]
    pub share_token_secret: String,
    /// Magic-link lifetime in minutes.
    #[serde(default = "default_magic_link_ttl")]
    pub magic_link_ttl_minutes: i64,
    /// Share access-session lifetime in hours.
    #[serde(default = "default_session_ttl")]
    pub share_session_ttl_hours: i64,
    /// Mark the share-session cookie `Secure`.
    #[serde(default = "default_secure_cookies")]
    pub secure_cookies: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            identity_secret: default_identity_secret(),
            identity_issuer: String::new(),
            share_token_secret: default_share_token_secret(),
            magic_link_ttl_minutes: default_magic_link_ttl(),
            share_session_ttl_hours: default_session_ttl(),
            secure_cookies: default_secure_cookies(),
        }
    }
}

fn default_identity_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_share_token_secret() -> String {
    "CHANGE_ME_SHARE_TOKENS".to_string()
}

fn default_magic_link_ttl() -> i64 {
    15
}

fn default_session_ttl() -> i64 {
    24
}

fn default_secure_cookies() -> bool {
    true
}
