//! crates/cat_ratings_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of the concrete storage backend.

use async_trait::async_trait;

use crate::domain::Cat;

//=========================================================================================
// Store Error and Result Types
//=========================================================================================

/// An error from the durable record store.
///
/// Raised only for unrecoverable I/O failures. An absent or malformed
/// backing file is not an error for readers; adapters return an empty
/// collection in that case.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage failure: {0}")]
    Unavailable(String),
}

/// A convenience type alias for `Result<T, StoreError>`.
pub type StoreResult<T> = Result<T, StoreError>;

//=========================================================================================
// Store Port (Trait)
//=========================================================================================

/// The durable holder of the cat collection.
///
/// The contract is deliberately whole-collection: every mutation is
/// load-everything, mutate in memory, save-everything. No partial-record
/// update is exposed, which is why callers must serialize their
/// read-modify-write cycles.
#[async_trait]
pub trait CatStore: Send + Sync {
    /// Loads the full record collection.
    ///
    /// A missing or unreadable-as-a-collection backing file yields an empty
    /// collection rather than an error.
    async fn load(&self) -> StoreResult<Vec<Cat>>;

    /// Atomically replaces the stored collection with the given one.
    async fn save(&self, cats: &[Cat]) -> StoreResult<()>;
}
