//! PostgreSQL store implementations.

pub mod audit;
pub mod bucket;
pub mod file;
pub mod principal;
pub mod share;

pub use audit::PgAuditStore;
pub use bucket::PgBucketStore;
pub use file::PgFileStore;
pub use principal::PgPrincipalStore;
pub use share::PgShareStore;

use cloudvault_core::error::{AppError, ErrorKind};

/// Map a driver error to an opaque database error, turning unique
/// violations into conflicts.
pub(crate) fn db_error(message: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| {
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() {
                return AppError::conflict(format!("{message}: record already exists"));
            }
        }
        AppError::with_source(ErrorKind::Database, message, e)
    }
}
