//! Share password hashing.

pub mod hasher;

pub use hasher::PasswordHasher;
