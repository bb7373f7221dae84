//! In-memory storage backend implementation for the order service.
//!
//! This module provides a memory-based implementation of the StorageInterface
//! trait, useful for testing and development scenarios where persistence is
//! not required. Batch commits take a single write guard, which gives them
//! the transactional behavior the creation workflow relies on.

use crate::{StorageError, StorageInterface, WriteOp};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory storage implementation.
///
/// This implementation stores data in a HashMap in memory, providing fast
/// access but no persistence across restarts.
pub struct MemoryStorage {
	/// The in-memory store protected by a read-write lock.
	store: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryStorage {
	/// Creates a new MemoryStorage instance.
	pub fn new() -> Self {
		Self {
			store: Arc::new(RwLock::new(HashMap::new())),
		}
	}
}

impl Default for MemoryStorage {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl StorageInterface for MemoryStorage {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		let store = self.store.read().await;
		store.get(key).cloned().ok_or(StorageError::NotFound)
	}

	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
		let mut store = self.store.write().await;
		store.insert(key.to_string(), value);
		Ok(())
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		let mut store = self.store.write().await;
		store.remove(key);
		Ok(())
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		let store = self.store.read().await;
		Ok(store.contains_key(key))
	}

	async fn commit(&self, ops: Vec<WriteOp>) -> Result<(), StorageError> {
		// One write guard for the whole batch: conflicting keys are checked
		// before any mutation, so a rejected batch leaves no trace.
		let mut store = self.store.write().await;

		let mut claimed: HashSet<&str> = HashSet::new();
		for op in &ops {
			if let WriteOp::PutIfAbsent { key, .. } = op {
				// A key duplicated within the batch conflicts with itself.
				if store.contains_key(key) || !claimed.insert(key.as_str()) {
					return Err(StorageError::Conflict(key.clone()));
				}
			}
		}

		for op in ops {
			match op {
				WriteOp::Put { key, value } | WriteOp::PutIfAbsent { key, value } => {
					store.insert(key, value);
				},
				WriteOp::Delete { key } => {
					store.remove(&key);
				},
			}
		}
		Ok(())
	}
}
