//! Entity store: typed accessors per table, plus schema initialization.
//!
//! Store functions carry no business rules; authorization and validation
//! happen in the calling service layer. Read accessors degrade to empty
//! results when the store fails (public listing pages keep rendering);
//! write accessors fail loudly.

pub mod articles;
pub mod categories;
pub mod comments;
pub mod init;
pub mod likes;
pub mod sessions;
pub mod users;

pub use init::{connect_memory, init_database};

use tracing::warn;

/// Collapse a failed read into its empty value, logging the cause.
/// Applied to every read accessor; writes propagate their errors.
pub(crate) fn read_or_empty<T: Default>(what: &str, result: crate::Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            warn!("{} unavailable: {}", what, e);
            T::default()
        }
    }
}
