//! Policy vocabulary: actions, resource descriptors, and policies.

pub mod action;
pub mod policy;
pub mod resource;

pub use action::Action;
pub use policy::{NewPolicy, Policy, PolicyOwner};
pub use resource::{ResourceDescriptor, ResourceType};
