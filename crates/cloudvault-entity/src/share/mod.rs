//! Share link entities.

pub mod model;
pub mod view;

pub use model::{NewShare, Share, ShareStatus, TerminalReason};
pub use view::{PublicShareView, mask_email};
