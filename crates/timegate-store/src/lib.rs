//! Persistence layer for timegated
//!
//! Provides:
//! - The `AccessRecord` row type (one record per identity, unique key)
//! - The `AccessStore` trait consumed by the core
//! - A SQLite implementation

mod record;
mod sqlite;
mod traits;

pub use record::*;
pub use sqlite::*;
pub use traits::*;

use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Corrupt record for {identity}: {detail}")]
    CorruptRecord { identity: String, detail: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
