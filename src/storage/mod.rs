//! Storage tiers for cached assets.
//!
//! - [`capability`]: one-shot tier detection at agent startup
//! - [`generation`]: whole-response cache organized as named generations (Tier A)
//! - [`records`]: transactional url→content record store (Tier B)

pub mod capability;
pub mod generation;
pub mod records;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("store lock poisoned")]
    LockPoisoned,

    #[error("corrupt cache entry metadata: {0}")]
    CorruptMetadata(#[from] serde_json::Error),
}
