//! # cloudvault-transfer
//!
//! Client-side transfer orchestration. A [`TransferQueue`] runs one job at
//! a time: small files go up in a single signed PUT, large ones through
//! the multipart protocol with a bounded number of parts in flight.
//!
//! The queue talks to the server through [`TransferGateway`] and moves
//! bytes through [`PartTransport`]; both have HTTP implementations in
//! [`http`].

pub mod executor;
pub mod gateway;
pub mod http;
pub mod plan;
pub mod queue;
pub mod source;

pub use gateway::{PartTransport, TransferGateway};
pub use http::{HttpPartTransport, HttpTransferGateway};
pub use plan::{PartRange, TransferStrategy, choose_strategy, plan_parts};
pub use queue::TransferQueue;
pub use source::{FileSource, MemorySource, TransferSource};
