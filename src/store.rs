//! Record Store
//!
//! TigerStyle: Explicit in-memory storage, one store per entity kind.
//!
//! A store owns an ordered map from id to record plus the next-id counter.
//! Ids are handed out monotonically and never reused, so ascending id order
//! is also insertion order.

use std::collections::BTreeMap;
use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

// =============================================================================
// Record Trait
// =============================================================================

/// A storable entity with a store-assigned integer id.
pub trait Record: Clone + Debug + Send + Sync + 'static {
    /// Display name of the entity kind ("User", "Post")
    const KIND: &'static str;

    /// Field values for a new record, without the id
    type Draft: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Partial update, merged field by field
    type Patch: Clone + Debug + Default + Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Store-assigned identifier.
    fn id(&self) -> u64;

    /// Build a record from a draft and its assigned id.
    fn from_draft(id: u64, draft: Self::Draft) -> Self;

    /// Merge the fields present in `patch` onto this record.
    fn apply(&mut self, patch: Self::Patch);
}

// =============================================================================
// Errors
// =============================================================================

/// Store-level errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("{kind} with ID {id} not found")]
    NotFound { kind: &'static str, id: u64 },
}

/// Confirmation returned by a successful delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deleted {
    pub message: String,
}

impl Deleted {
    fn new(kind: &str, id: u64) -> Self {
        Self {
            message: format!("{kind} with ID {id} deleted successfully"),
        }
    }
}

// =============================================================================
// Record Store
// =============================================================================

/// In-memory record store for one entity kind.
#[derive(Debug, Clone)]
pub struct RecordStore<R: Record> {
    /// Records by id
    records: BTreeMap<u64, R>,
    /// Next id to assign
    next_id: u64,
}

impl<R: Record> Default for RecordStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> RecordStore<R> {
    /// Create an empty store; the first id handed out is 1.
    pub fn new() -> Self {
        Self {
            records: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Create a store pre-populated with seed records.
    ///
    /// The counter starts one above the highest seed id.
    ///
    /// # Panics
    /// Panics if two seed records share an id.
    pub fn with_seed(seed: impl IntoIterator<Item = R>) -> Self {
        let mut records = BTreeMap::new();
        for record in seed {
            let id = record.id();
            let previous = records.insert(id, record);
            assert!(previous.is_none(), "duplicate seed id {id}");
        }
        let next_id = records.keys().next_back().map_or(1, |max| max + 1);

        Self { records, next_id }
    }

    /// All records in ascending id order.
    pub fn list(&self) -> Vec<R> {
        self.records.values().cloned().collect()
    }

    /// Iterate records without cloning.
    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.records.values()
    }

    /// Get a record by id.
    pub fn get(&self, id: u64) -> Result<R, StoreError> {
        self.records.get(&id).cloned().ok_or(StoreError::NotFound {
            kind: R::KIND,
            id,
        })
    }

    /// Insert a new record, assigning the next id.
    pub fn insert(&mut self, draft: R::Draft) -> R {
        let id = self.next_id;
        self.next_id += 1;

        let record = R::from_draft(id, draft);
        self.records.insert(id, record.clone());

        // Postcondition
        assert!(self.next_id > id, "id counter must only move forward");

        record
    }

    /// Merge a patch onto an existing record.
    pub fn replace(&mut self, id: u64, patch: R::Patch) -> Result<R, StoreError> {
        let record = self.records.get_mut(&id).ok_or(StoreError::NotFound {
            kind: R::KIND,
            id,
        })?;
        record.apply(patch);

        // Postcondition
        assert_eq!(record.id(), id, "patch must not change the id");

        Ok(record.clone())
    }

    /// Remove a record.
    pub fn delete(&mut self, id: u64) -> Result<Deleted, StoreError> {
        self.records
            .remove(&id)
            .map(|_| Deleted::new(R::KIND, id))
            .ok_or(StoreError::NotFound { kind: R::KIND, id })
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The id the next insert will receive.
    pub fn next_id(&self) -> u64 {
        self.next_id
    }
}

// =============================================================================
// Tests
// =============================================================================
