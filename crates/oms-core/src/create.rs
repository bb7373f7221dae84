//! Order creation workflow.
//!
//! Orchestrates the creation-time gates and the atomic write: the currency
//! must be supported, no requested line item may already have a pending
//! order for the buyer, and the order plus its line items and index entries
//! land in one batch or not at all.

use crate::{CurrencyValidator, OrderError, PendingOrderDetector};
use oms_storage::OrderStore;
use oms_types::{pending_fingerprint, LineItem, Order, Party};
use std::sync::Arc;

/// All-or-nothing order creation.
pub struct CreationWorkflow {
	store: Arc<OrderStore>,
	validator: CurrencyValidator,
	detector: PendingOrderDetector,
}

impl CreationWorkflow {
	pub fn new(
		store: Arc<OrderStore>,
		validator: CurrencyValidator,
		detector: PendingOrderDetector,
	) -> Self {
		Self {
			store,
			validator,
			detector,
		}
	}

	/// Creates an order for the buyer and seller with the given line items.
	///
	/// Every gate is evaluated before any write. The duplicate-pending
	/// check covers all requested line items, not just the first, and is
	/// re-enforced by the storage-level fingerprint constraint inside the
	/// insert batch, so a concurrent duplicate creation cannot slip
	/// through. On any failure nothing is persisted.
	pub async fn create(
		&self,
		buyer_id: &str,
		seller_id: &str,
		currency_code: &str,
		line_items: Vec<LineItem>,
	) -> Result<Order, OrderError> {
		let currency = currency_code.to_ascii_uppercase();
		if !self.validator.is_supported(&currency) {
			return Err(OrderError::UnsupportedCurrency(currency_code.to_string()));
		}

		if line_items.is_empty() {
			return Err(OrderError::EmptyOrder);
		}

		for item in &line_items {
			if self
				.detector
				.has_pending(buyer_id, &item.artwork_id, item.edition_set_id.as_deref())
				.await?
			{
				return Err(OrderError::DuplicatePendingOrder {
					fingerprint: pending_fingerprint(
						buyer_id,
						&item.artwork_id,
						item.edition_set_id.as_deref(),
					),
				});
			}
		}

		let order = Order::new(
			Party::user(buyer_id),
			Party::partner(seller_id),
			currency,
			line_items,
		);
		self.store.insert(&order).await?;

		tracing::info!(
			order_id = %order.id,
			code = %order.code,
			buyer_id,
			seller_id,
			"Order created"
		);
		Ok(order)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use oms_storage::{implementations::memory::MemoryStorage, StorageService};

	fn test_workflow() -> (CreationWorkflow, Arc<OrderStore>) {
		let store = Arc::new(OrderStore::new(Arc::new(StorageService::new(Box::new(
			MemoryStorage::new(),
		)))));
		let workflow = CreationWorkflow::new(
			Arc::clone(&store),
			CurrencyValidator::new(&["USD".to_string()]),
			PendingOrderDetector::new(Arc::clone(&store)),
		);
		(workflow, store)
	}

	fn item(artwork: &str, edition: Option<&str>) -> LineItem {
		LineItem {
			artwork_id: artwork.to_string(),
			edition_set_id: edition.map(String::from),
			price_cents: 2_500,
		}
	}

	#[tokio::test]
	async fn test_creates_pending_order_with_derived_totals() {
		let (workflow, store) = test_workflow();
		let order = workflow
			.create(
				"buyer-1",
				"seller-1",
				"USD",
				vec![item("artwork-1", None), item("artwork-2", Some("edition-1"))],
			)
			.await
			.unwrap();

		assert!(order.status.is_pending());
		assert_eq!(order.totals.items_total, 5_000);
		assert_eq!(order.line_items.len(), 2);
		assert_eq!(store.get(&order.id).await.unwrap(), order);
	}

	#[tokio::test]
	async fn test_unsupported_currency_persists_nothing() {
		let (workflow, store) = test_workflow();
		let result = workflow
			.create("buyer-1", "seller-1", "GBP", vec![item("artwork-1", None)])
			.await;
		assert!(matches!(result, Err(OrderError::UnsupportedCurrency(_))));

		let fingerprint = pending_fingerprint("buyer-1", "artwork-1", None);
		assert!(!store.has_pending(&fingerprint).await.unwrap());
	}

	#[tokio::test]
	async fn test_duplicate_pending_checked_across_all_items() {
		let (workflow, store) = test_workflow();
		workflow
			.create("buyer-1", "seller-1", "USD", vec![item("artwork-2", None)])
			.await
			.unwrap();

		// The duplicate is the second item of the new request.
		let result = workflow
			.create(
				"buyer-1",
				"seller-1",
				"USD",
				vec![item("artwork-1", None), item("artwork-2", None)],
			)
			.await;
		assert!(matches!(
			result,
			Err(OrderError::DuplicatePendingOrder { .. })
		));

		// No partial writes: the first item's fingerprint was never taken.
		let fingerprint = pending_fingerprint("buyer-1", "artwork-1", None);
		assert!(!store.has_pending(&fingerprint).await.unwrap());
	}

	#[tokio::test]
	async fn test_same_artwork_different_buyer_is_allowed() {
		let (workflow, _store) = test_workflow();
		workflow
			.create("buyer-1", "seller-1", "USD", vec![item("artwork-1", None)])
			.await
			.unwrap();
		workflow
			.create("buyer-2", "seller-1", "USD", vec![item("artwork-1", None)])
			.await
			.unwrap();
	}

	#[tokio::test]
	async fn test_empty_line_items_rejected() {
		let (workflow, _store) = test_workflow();
		let result = workflow.create("buyer-1", "seller-1", "USD", vec![]).await;
		assert!(matches!(result, Err(OrderError::EmptyOrder)));
	}

	#[tokio::test]
	async fn test_currency_is_normalized_to_upper_case() {
		let (workflow, _store) = test_workflow();
		let order = workflow
			.create("buyer-1", "seller-1", "usd", vec![item("artwork-1", None)])
			.await
			.unwrap();
		assert_eq!(order.currency, "USD");
	}
}
