//! Store traits consumed by the service layer.
//!
//! Every implementation converts its driver errors into opaque
//! `Database` errors; callers never see raw driver types.

pub mod bucket;
pub mod file;
pub mod principal;
pub mod share;

pub use bucket::BucketStore;
pub use file::FileStore;
pub use principal::PrincipalStore;
pub use share::ShareStore;
