//! Principals, roles, and teams.

pub mod model;
pub mod role;
pub mod team;

pub use model::{Principal, TeamGrant, User};
pub use role::Role;
pub use team::{Team, TeamMembership};
