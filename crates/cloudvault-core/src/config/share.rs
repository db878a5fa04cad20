//! Share link configuration.

use serde::{Deserialize, Serialize};

/// Defaults and limits applied when creating share links.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareConfig {
    /// Download quota used when the request omits or garbles one.
    #[serde(default = "default_download_limit")]
    pub default_download_limit: i32,
    /// Expiry used when the request omits one, in days.
    #[serde(default = "default_expiry_days")]
    pub default_expiry_days: i64,
    /// Longest expiry a creator may request, in days.
    #[serde(default = "default_max_expiry_days")]
    pub max_expiry_days: i64,
    /// Public base URL that share and magic links are built from.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

impl ShareConfig {
    /// Public landing URL for a share.
    pub fn share_url(&self, share_id: &impl std::fmt::Display) -> String {
        format!(
            "{}/shares/{}",
            self.public_base_url.trim_end_matches('/'),
            share_id
        )
    }

    /// Magic-link URL that carries a verification token.
    pub fn magic_link_url(&self, token: &str) -> String {
        format!(
            "{}/shares/verify?token={}",
            self.public_base_url.trim_end_matches('/'),
            token
        )
    }
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            default_download_limit: default_download_limit(),
            default_expiry_days: default_expiry_days(),
            max_expiry_days: default_max_expiry_days(),
            public_base_url: default_public_base_url(),
        }
    }
}

fn default_download_limit() -> i32 {
    3
}

fn default_expiry_days() -> i64 {
    7
}

fn default_max_expiry_days() -> i64 {
    365
}

fn default_public_base_url() -> String {
    "http://localhost:8080".to_string()
}
