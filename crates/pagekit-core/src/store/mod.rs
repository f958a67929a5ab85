//! Persistent key-value storage for page state.
//!
//! The page keeps its checkin flags and the last-reset marker in a small
//! synchronous string store. Callers receive the store as a `KeyValueStore`
//! rather than reaching for a process-wide singleton:
//! - `MemoryStore`: in-process map, used in tests and embedding
//! - `FileStore`: JSON object file, rewritten on every mutation
//!
//! No transactional guarantees span multiple keys.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::StoreError;

/// Narrow repository interface over the host's key-value store.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Deleting a missing key is not an error.
    fn delete(&mut self, key: &str) -> Result<(), StoreError>;

    fn keys(&self) -> Result<Vec<String>, StoreError>;

    /// Enumerate keys starting with `prefix`.
    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .keys()?
            .into_iter()
            .filter(|k| k.starts_with(prefix))
            .collect())
    }
}
