//! Order repository built on top of the storage service.
//!
//! The store keeps three namespaces: the order documents themselves, the
//! public-code index mapping codes to internal ids, and the pending
//! fingerprint index enforcing the one-pending-order-per-item rule. Every
//! multi-key mutation goes through one atomic batch so the indexes can never
//! drift from the order documents.

use crate::{StorageError, StorageService};
use oms_types::Order;
use std::sync::Arc;

/// Namespace for order documents, keyed by internal id.
const ORDERS: &str = "orders";
/// Namespace mapping public codes to internal ids.
const ORDER_CODES: &str = "order_codes";
/// Namespace holding pending fingerprints, keyed by
/// `buyer:artwork:edition`.
const PENDING: &str = "pending_orders";

/// Typed repository for orders.
pub struct OrderStore {
	storage: Arc<StorageService>,
}

impl OrderStore {
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self { storage }
	}

	/// Inserts a freshly created order atomically.
	///
	/// The order document, its code index entry and one pending fingerprint
	/// per line item are written in a single batch. All three use
	/// put-if-absent: an existing fingerprint (a concurrent duplicate
	/// creation) rejects the whole batch, leaving no partial writes.
	pub async fn insert(&self, order: &Order) -> Result<(), StorageError> {
		let mut ops = vec![
			self.storage.put_if_absent_op(ORDERS, &order.id, order)?,
			self.storage
				.put_if_absent_op(ORDER_CODES, &order.code, &order.id)?,
		];
		for fingerprint in order.pending_fingerprints() {
			ops.push(
				self.storage
					.put_if_absent_op(PENDING, &fingerprint, &order.id)?,
			);
		}
		tracing::debug!(order_id = %order.id, code = %order.code, "Inserting order");
		self.storage.commit(ops).await
	}

	/// Loads an order by internal id.
	pub async fn get(&self, id: &str) -> Result<Order, StorageError> {
		self.storage.retrieve(ORDERS, id).await
	}

	/// Loads an order by public code.
	pub async fn get_by_code(&self, code: &str) -> Result<Order, StorageError> {
		let id: String = self.storage.retrieve(ORDER_CODES, code).await?;
		self.storage.retrieve(ORDERS, &id).await
	}

	/// Checks whether a pending order exists for the given fingerprint.
	pub async fn has_pending(&self, fingerprint: &str) -> Result<bool, StorageError> {
		self.storage.exists(PENDING, fingerprint).await
	}

	/// Persists a mutated order.
	///
	/// When the order has just left the pending state, its fingerprints are
	/// released in the same batch so a new pending order for the same items
	/// becomes possible the moment the write lands.
	pub async fn persist(
		&self,
		order: &Order,
		release_fingerprints: bool,
	) -> Result<(), StorageError> {
		if !self.storage.exists(ORDERS, &order.id).await? {
			return Err(StorageError::NotFound);
		}

		let mut ops = vec![self.storage.put_op(ORDERS, &order.id, order)?];
		if release_fingerprints {
			for fingerprint in order.pending_fingerprints() {
				ops.push(self.storage.delete_op(PENDING, &fingerprint));
			}
		}
		self.storage.commit(ops).await
	}
}
