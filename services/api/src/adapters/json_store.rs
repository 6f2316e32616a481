//! services/api/src/adapters/json_store.rs
//!
//! This module contains the record store adapter, which is the concrete
//! implementation of the `CatStore` port from the `core` crate. It persists
//! the whole collection as one JSON array in a single file.

use async_trait::async_trait;
use cat_ratings_core::domain::Cat;
use cat_ratings_core::ports::{CatStore, StoreError, StoreResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::{debug, warn};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A file-backed store that implements the `CatStore` port.
///
/// Reads are tolerant: a file that is absent or does not parse as a record
/// array is reported as an empty collection, never as an error. Writes
/// replace the file atomically via a temporary sibling and a rename, so a
/// crashed write never leaves a half-serialized collection behind.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a new `JsonFileStore` over the given record file path.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

//=========================================================================================
// "Impure" Serialization Record Structs
//=========================================================================================

#[derive(Serialize, Deserialize)]
struct CatRecord {
    id: String,
    title: String,
    image: String,
    date: DateTime<Utc>,
    rating_sum: f64,
    rating_count: u64,
    rating: f64,
}

impl CatRecord {
    fn to_domain(self) -> Cat {
        Cat {
            id: self.id,
            title: self.title,
            image: self.image,
            date: self.date,
            rating_sum: self.rating_sum,
            rating_count: self.rating_count,
            rating: self.rating,
        }
    }

    fn from_domain(cat: &Cat) -> Self {
        Self {
            id: cat.id.clone(),
            title: cat.title.clone(),
            image: cat.image.clone(),
            date: cat.date,
            rating_sum: cat.rating_sum,
            rating_count: cat.rating_count,
            rating: cat.rating,
        }
    }
}

//=========================================================================================
// Port Implementation
//=========================================================================================

#[async_trait]
impl CatStore for JsonFileStore {
    async fn load(&self) -> StoreResult<Vec<Cat>> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("record file not present yet, starting from an empty collection");
                return Ok(Vec::new());
            }
            Err(e) => return Err(StoreError::Unavailable(e.to_string())),
        };

        match serde_json::from_slice::<Vec<CatRecord>>(&raw) {
            Ok(records) => Ok(records.into_iter().map(CatRecord::to_domain).collect()),
            Err(e) => {
                warn!("record file does not hold a valid collection, treating as empty: {e}");
                Ok(Vec::new())
            }
        }
    }

    async fn save(&self, cats: &[Cat]) -> StoreResult<()> {
        let records: Vec<CatRecord> = cats.iter().map(CatRecord::from_domain).collect();
        let json = serde_json::to_vec_pretty(&records)
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        // Write to a sibling temp file, then rename over the target. The
        // rename is what makes a successful save fully supersede the prior
        // contents even if the process dies mid-write.
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &json)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store_in(dir: &tempfile::TempDir) -> JsonFileStore {
        JsonFileStore::new(dir.path().join("db.json"))
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let dir = tempdir().unwrap();
        let cats = store_in(&dir).load().await.unwrap();
        assert!(cats.is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_reads_as_empty() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("db.json"), "{not json").unwrap();
        let cats = store_in(&dir).load().await.unwrap();
        assert!(cats.is_empty());
    }

    #[tokio::test]
    async fn non_array_file_reads_as_empty() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("db.json"), r#"{"cats": []}"#).unwrap();
        let cats = store_in(&dir).load().await.unwrap();
        assert!(cats.is_empty());
    }

    #[tokio::test]
    async fn saved_collection_round_trips() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);

        let mut cat = Cat::new("Mittens", "/cat/image/m.jpg".to_string());
        cat.apply_rating(4.0);
        store.save(std::slice::from_ref(&cat)).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, cat.id);
        assert_eq!(loaded[0].title, "Mittens");
        assert_eq!(loaded[0].rating_sum, 4.0);
        assert_eq!(loaded[0].rating_count, 1);
        assert_eq!(loaded[0].date, cat.date);
    }

    #[tokio::test]
    async fn save_fully_supersedes_prior_contents() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);

        let first = vec![
            Cat::new("one", "/cat/image/1.jpg".to_string()),
            Cat::new("two", "/cat/image/2.jpg".to_string()),
        ];
        store.save(&first).await.unwrap();

        let second = vec![Cat::new("only", "/cat/image/3.jpg".to_string())];
        store.save(&second).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].title, "only");
    }
}
