//! Magic-link and share-session tokens.

pub mod claims;
pub mod issuer;

pub use claims::{ShareTokenClaims, TokenPurpose};
pub use issuer::{IssuedToken, ShareTokenIssuer};
