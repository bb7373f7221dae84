//! Storage module for the order management service.
//!
//! This module provides abstractions for persistent storage of order data,
//! supporting different backend implementations. Backends expose raw
//! key-value operations plus an atomic batch commit with put-if-absent
//! semantics; the batch commit is what makes order creation all-or-nothing
//! and backs the one-pending-order-per-item uniqueness rule under
//! concurrency.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod memory;
}

mod store;

pub use store::OrderStore;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
	/// Error that occurs when a requested item is not found.
	#[error("Not found")]
	NotFound,
	/// Error that occurs when a put-if-absent key already exists.
	///
	/// The whole batch containing the conflicting write is rejected.
	#[error("Key already exists: {0}")]
	Conflict(String),
	/// Error that occurs during serialization/deserialization.
	#[error("Serialization error: {0}")]
	Serialization(String),
	/// Error that occurs in the storage backend.
	#[error("Backend error: {0}")]
	Backend(String),
}

/// A single write inside an atomic batch.
#[derive(Debug, Clone)]
pub enum WriteOp {
	/// Unconditionally writes the value.
	Put { key: String, value: Vec<u8> },
	/// Writes the value only if the key does not exist; its presence makes
	/// the entire batch fail with [`StorageError::Conflict`].
	PutIfAbsent { key: String, value: Vec<u8> },
	/// Removes the key if present.
	Delete { key: String },
}

impl WriteOp {
	/// Returns the key this operation addresses.
	pub fn key(&self) -> &str {
		match self {
			WriteOp::Put { key, .. } => key,
			WriteOp::PutIfAbsent { key, .. } => key,
			WriteOp::Delete { key } => key,
		}
	}
}

/// Trait defining the low-level interface for storage backends.
///
/// This trait must be implemented by any storage backend that wants to
/// integrate with the service. It provides basic key-value operations and
/// an atomic batch commit.
#[async_trait]
pub trait StorageInterface: Send + Sync {
	/// Retrieves raw bytes for the given key.
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError>;

	/// Stores raw bytes under the given key.
	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;

	/// Deletes the value associated with the given key.
	async fn delete(&self, key: &str) -> Result<(), StorageError>;

	/// Checks if a key exists in storage.
	async fn exists(&self, key: &str) -> Result<bool, StorageError>;

	/// Applies a batch of writes atomically.
	///
	/// Either every operation in the batch takes effect or none does. A
	/// `PutIfAbsent` whose key already exists (in storage or earlier in the
	/// same batch) fails the whole batch with [`StorageError::Conflict`].
	async fn commit(&self, ops: Vec<WriteOp>) -> Result<(), StorageError>;
}

/// High-level storage service that provides typed operations.
///
/// The StorageService wraps a low-level storage backend and provides
/// convenient methods for storing and retrieving typed data with automatic
/// serialization/deserialization. Keys are namespaced as `namespace:id`.
pub struct StorageService {
	/// The underlying storage backend implementation.
	backend: Box<dyn StorageInterface>,
}

impl StorageService {
	/// Creates a new StorageService with the specified backend.
	pub fn new(backend: Box<dyn StorageInterface>) -> Self {
		Self { backend }
	}

	fn key(namespace: &str, id: &str) -> String {
		format!("{}:{}", namespace, id)
	}

	/// Stores a serializable value.
	///
	/// The namespace and id are combined to form a unique key. The data is
	/// serialized to JSON before storage.
	pub async fn store<T: Serialize>(
		&self,
		namespace: &str,
		id: &str,
		data: &T,
	) -> Result<(), StorageError> {
		let bytes =
			serde_json::to_vec(data).map_err(|e| StorageError::Serialization(e.to_string()))?;
		self.backend.set_bytes(&Self::key(namespace, id), bytes).await
	}

	/// Retrieves and deserializes a value from storage.
	pub async fn retrieve<T: DeserializeOwned>(
		&self,
		namespace: &str,
		id: &str,
	) -> Result<T, StorageError> {
		let bytes = self.backend.get_bytes(&Self::key(namespace, id)).await?;
		serde_json::from_slice(&bytes).map_err(|e| StorageError::Serialization(e.to_string()))
	}

	/// Removes a value from storage.
	pub async fn remove(&self, namespace: &str, id: &str) -> Result<(), StorageError> {
		self.backend.delete(&Self::key(namespace, id)).await
	}

	/// Checks if a value exists in storage.
	pub async fn exists(&self, namespace: &str, id: &str) -> Result<bool, StorageError> {
		self.backend.exists(&Self::key(namespace, id)).await
	}

	/// Builds an unconditional put for use in a batch commit.
	pub fn put_op<T: Serialize>(
		&self,
		namespace: &str,
		id: &str,
		data: &T,
	) -> Result<WriteOp, StorageError> {
		let value =
			serde_json::to_vec(data).map_err(|e| StorageError::Serialization(e.to_string()))?;
		Ok(WriteOp::Put {
			key: Self::key(namespace, id),
			value,
		})
	}

	/// Builds a put-if-absent for use in a batch commit.
	pub fn put_if_absent_op<T: Serialize>(
		&self,
		namespace: &str,
		id: &str,
		data: &T,
	) -> Result<WriteOp, StorageError> {
		let value =
			serde_json::to_vec(data).map_err(|e| StorageError::Serialization(e.to_string()))?;
		Ok(WriteOp::PutIfAbsent {
			key: Self::key(namespace, id),
			value,
		})
	}

	/// Builds a delete for use in a batch commit.
	pub fn delete_op(&self, namespace: &str, id: &str) -> WriteOp {
		WriteOp::Delete {
			key: Self::key(namespace, id),
		}
	}

	/// Applies a batch of writes atomically.
	pub async fn commit(&self, ops: Vec<WriteOp>) -> Result<(), StorageError> {
		self.backend.commit(ops).await
	}
}
