//! Policy evaluation.

pub mod engine;
pub mod guard;

pub use engine::PolicyEngine;
pub use guard::PolicyGuard;
