//! # cloudvault-auth
//!
//! Authorization and credential handling for CloudVault.
//!
//! ## Modules
//!
//! - `policy`: the pure policy engine and the guard that turns denials into errors
//! - `password`: Argon2id hashing for share passwords
//! - `token`: magic-link and share-session tokens
//! - `identity`: verification of identity-provider bearer tokens

pub mod identity;
pub mod password;
pub mod policy;
pub mod token;

pub use identity::{IdentityProvider, JwtIdentityProvider, VerifiedIdentity};
pub use password::PasswordHasher;
pub use policy::{PolicyEngine, PolicyGuard};
pub use token::{ShareTokenClaims, ShareTokenIssuer, TokenPurpose};
