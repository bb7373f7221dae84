//! Pending-order detection.
//!
//! Answers whether a pending order already exists for a buyer, artwork and
//! edition-set combination. The detector is the best-effort read-side check
//! of the one-pending-order rule; the atomic put-if-absent fingerprint in
//! the store is the backstop under concurrent creation.

use crate::OrderError;
use oms_storage::OrderStore;
use oms_types::pending_fingerprint;
use std::sync::Arc;

/// Read-only probe for existing pending orders.
pub struct PendingOrderDetector {
	store: Arc<OrderStore>,
}

impl PendingOrderDetector {
	pub fn new(store: Arc<OrderStore>) -> Self {
		Self { store }
	}

	/// Whether a pending order exists for the given combination.
	///
	/// A `None` edition set means "no edition set" and only matches orders
	/// whose line item also has none; it is never a wildcard.
	pub async fn has_pending(
		&self,
		buyer_id: &str,
		artwork_id: &str,
		edition_set_id: Option<&str>,
	) -> Result<bool, OrderError> {
		let fingerprint = pending_fingerprint(buyer_id, artwork_id, edition_set_id);
		Ok(self.store.has_pending(&fingerprint).await?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use oms_storage::{implementations::memory::MemoryStorage, StorageService};
	use oms_types::{LineItem, Order, Party};

	fn test_store() -> Arc<OrderStore> {
		Arc::new(OrderStore::new(Arc::new(StorageService::new(Box::new(
			MemoryStorage::new(),
		)))))
	}

	#[tokio::test]
	async fn test_missing_edition_set_is_not_a_wildcard() {
		let store = test_store();
		let detector = PendingOrderDetector::new(Arc::clone(&store));

		let order = Order::new(
			Party::user("buyer-1"),
			Party::partner("seller-1"),
			"USD".to_string(),
			vec![LineItem {
				artwork_id: "artwork-1".to_string(),
				edition_set_id: Some("edition-1".to_string()),
				price_cents: 100,
			}],
		);
		store.insert(&order).await.unwrap();

		assert!(detector
			.has_pending("buyer-1", "artwork-1", Some("edition-1"))
			.await
			.unwrap());
		// No edition set is a distinct combination.
		assert!(!detector
			.has_pending("buyer-1", "artwork-1", None)
			.await
			.unwrap());
		assert!(!detector
			.has_pending("buyer-2", "artwork-1", Some("edition-1"))
			.await
			.unwrap());
	}
}
