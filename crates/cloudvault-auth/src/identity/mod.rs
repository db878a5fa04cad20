//! Identity-provider token verification.

pub mod jwt;
pub mod provider;

pub use jwt::{IdentityClaims, JwtIdentityProvider};
pub use provider::{IdentityProvider, VerifiedIdentity};
