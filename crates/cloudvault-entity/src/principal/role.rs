//! Principal role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles known to the policy engine.
///
/// The set is closed: evaluation matches on it exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "principal_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Operates the whole platform; crosses tenant boundaries.
    PlatformAdmin,
    /// Administers a single tenant.
    TenantAdmin,
    /// Regular tenant member; acts only through policies.
    Teammate,
}

impl Role {
    /// Check if this role is an administrator at any scope.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::PlatformAdmin | Self::TenantAdmin)
    }

    /// Return the role as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlatformAdmin => "PLATFORM_ADMIN",
            Self::TenantAdmin => "TENANT_ADMIN",
            Self::Teammate => "TEAMMATE",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = cloudvault_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().replace('-', "_").as_str() {
            "PLATFORM_ADMIN" => Ok(Self::PlatformAdmin),
            "TENANT_ADMIN" => Ok(Self::TenantAdmin),
            "TEAMMATE" => Ok(Self::Teammate),
            _ => Err(cloudvault_core::AppError::validation(format!(
                "Invalid role: '{s}'. Expected one of: PLATFORM_ADMIN, TENANT_ADMIN, TEAMMATE"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("tenant_admin".parse::<Role>().ok(), Some(Role::TenantAdmin));
        assert_eq!("Teammate".parse::<Role>().ok(), Some(Role::Teammate));
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn test_serde_uses_screaming_case() {
        let json = serde_json::to_string(&Role::PlatformAdmin).expect("serialize");
        assert_eq!(json, "\"PLATFORM_ADMIN\"");
    }
}
