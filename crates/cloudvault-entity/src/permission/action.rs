//! The closed action vocabulary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An action a policy can grant.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "policy_action", rename_all = "SCREAMING_SNAKE_CASE", no_pg_array)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Read object content or metadata.
    Read,
    /// Modify an existing object.
    Write,
    /// Delete an object.
    Delete,
    /// List a bucket or folder.
    List,
    /// Create folders or metadata records.
    Create,
    /// Upload object bytes.
    Upload,
    /// Download object bytes.
    Download,
    /// Create external share links.
    Share,
    /// Create buckets.
    CreateBucket,
}

impl Action {
    /// Every action, in declaration order.
    pub const ALL: [Action; 9] = [
        Self::Read,
        Self::Write,
        Self::Delete,
        Self::List,
        Self::Create,
        Self::Upload,
        Self::Download,
        Self::Share,
        Self::CreateBucket,
    ];

    /// Return the action as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "READ",
            Self::Write => "WRITE",
            Self::Delete => "DELETE",
            Self::List => "LIST",
            Self::Create => "CREATE",
            Self::Upload => "UPLOAD",
            Self::Download => "DOWNLOAD",
            Self::Share => "SHARE",
            Self::CreateBucket => "CREATE_BUCKET",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Action {
    type Err = cloudvault_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.to_uppercase();
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == normalized)
            .ok_or_else(|| cloudvault_core::AppError::validation(format!("Unknown action: '{s}'")))
    }
}

impl sqlx::postgres::PgHasArrayType for Action {
    fn array_type_info() -> sqlx::postgres::PgTypeInfo {
        sqlx::postgres::PgTypeInfo::with_name("_policy_action")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trips_through_str() {
        for action in Action::ALL {
            assert_eq!(action.as_str().parse::<Action>().ok(), Some(action));
        }
    }

    #[test]
    fn test_serde_matches_as_str() {
        let json = serde_json::to_string(&Action::CreateBucket).expect("serialize");
        assert_eq!(json, "\"CREATE_BUCKET\"");
    }
}
