//! Core order lifecycle and access-control engine.
//!
//! This crate owns the hard part of the service: the order lifecycle state
//! machine, the creation workflow with its currency and duplicate-pending
//! gates, and the authorization layer deciding who may load an order and
//! which fields they may see. The [`OrderEngine`] facade wires the pieces
//! together over a shared order store and is what the HTTP layer talks to.

use oms_config::Config;
use oms_storage::{OrderStore, StorageError, StorageService};
use oms_types::{LineItem, Order, OrderStatus, OrderView, Requester};
use std::sync::Arc;
use thiserror::Error;

pub mod auth;
pub mod create;
pub mod currency;
pub mod pending;
pub mod query;
pub mod state;

pub use auth::{AuthorizationGate, Visibility};
pub use create::CreationWorkflow;
pub use currency::CurrencyValidator;
pub use pending::PendingOrderDetector;
pub use query::{OrderSelector, QueryResolver};
pub use state::OrderStateMachine;

/// Errors that can occur in the order lifecycle and access-control core.
///
/// `Unauthorized` and `NotFound` are kept distinct here; the API layer is
/// responsible for collapsing them into one indistinguishable response.
#[derive(Debug, Error)]
pub enum OrderError {
	/// The requested currency is not in the supported set.
	#[error("Unsupported currency: {0}")]
	UnsupportedCurrency(String),
	/// A pending order already exists for one of the requested items.
	#[error("A pending order already exists for {fingerprint}")]
	DuplicatePendingOrder { fingerprint: String },
	/// An order needs at least one line item.
	#[error("An order requires at least one line item")]
	EmptyOrder,
	/// An illegal lifecycle transition was attempted.
	#[error("Invalid state transition from {from:?} to {to:?}")]
	InvalidTransition { from: OrderStatus, to: OrderStatus },
	/// A mutation would leave the money totals irreconcilable.
	#[error("Order totals do not reconcile")]
	InconsistentTotals,
	/// The requester may not view the order.
	#[error("Requester is not authorized for this order")]
	Unauthorized,
	/// No order matches the given id or code.
	#[error("Order not found")]
	NotFound,
	/// Storage error.
	#[error("Storage error: {0}")]
	Storage(String),
}

impl From<StorageError> for OrderError {
	fn from(err: StorageError) -> Self {
		match err {
			StorageError::NotFound => OrderError::NotFound,
			StorageError::Conflict(key) => OrderError::DuplicatePendingOrder { fingerprint: key },
			other => OrderError::Storage(other.to_string()),
		}
	}
}

/// Main engine coordinating the order lifecycle core.
///
/// The engine owns the collaborators and exposes the operations the
/// external entrypoints need: order creation, authorized queries, and
/// lifecycle transitions.
pub struct OrderEngine {
	store: Arc<OrderStore>,
	machine: OrderStateMachine,
	workflow: CreationWorkflow,
	resolver: QueryResolver,
}

impl OrderEngine {
	/// Builds an engine from configuration and a storage service.
	pub fn new(config: &Config, storage: Arc<StorageService>) -> Self {
		let store = Arc::new(OrderStore::new(storage));
		let validator = CurrencyValidator::new(&config.currencies.supported);
		let detector = PendingOrderDetector::new(Arc::clone(&store));
		let gate = AuthorizationGate::from_config(&config.authorization);
		Self {
			machine: OrderStateMachine::new(Arc::clone(&store)),
			workflow: CreationWorkflow::new(Arc::clone(&store), validator, detector),
			resolver: QueryResolver::new(Arc::clone(&store), gate),
			store,
		}
	}

	/// Creates a new pending order; see [`CreationWorkflow::create`].
	pub async fn create_order(
		&self,
		buyer_id: &str,
		seller_id: &str,
		currency_code: &str,
		line_items: Vec<LineItem>,
	) -> Result<Order, OrderError> {
		self.workflow
			.create(buyer_id, seller_id, currency_code, line_items)
			.await
	}

	/// Resolves an order for a requester; see [`QueryResolver::find`].
	pub async fn find_order(
		&self,
		selector: &OrderSelector,
		requester: &Requester,
	) -> Result<OrderView, OrderError> {
		self.resolver.find(selector, requester).await
	}

	/// The lifecycle state machine, for transition callers.
	pub fn state_machine(&self) -> &OrderStateMachine {
		&self.machine
	}

	/// Direct access to the order store.
	pub fn store(&self) -> &Arc<OrderStore> {
		&self.store
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use oms_storage::implementations::memory::MemoryStorage;
	use oms_types::CancelReason;

	fn test_engine() -> OrderEngine {
		let config: Config = r#"
[service]
id = "oms-test"

[currencies]
supported = ["USD"]

[storage]
primary = "memory"
[storage.implementations.memory]
"#
		.parse()
		.unwrap();
		let storage = Arc::new(StorageService::new(Box::new(MemoryStorage::new())));
		OrderEngine::new(&config, storage)
	}

	fn line_item(artwork: &str) -> LineItem {
		LineItem {
			artwork_id: artwork.to_string(),
			edition_set_id: None,
			price_cents: 2_000,
		}
	}

	#[tokio::test]
	async fn test_create_then_query_by_id_and_code_agree() {
		let engine = test_engine();
		let order = engine
			.create_order("buyer-1", "seller-1", "USD", vec![line_item("artwork-1")])
			.await
			.unwrap();

		let buyer = Requester::user("buyer-1");
		let by_id = engine
			.find_order(&OrderSelector::Id(order.id.clone()), &buyer)
			.await
			.unwrap();
		let by_code = engine
			.find_order(&OrderSelector::Code(order.code.clone()), &buyer)
			.await
			.unwrap();
		assert_eq!(by_id, by_code);
		assert_eq!(by_id.state, "PENDING");
	}

	#[tokio::test]
	async fn test_full_lifecycle_through_engine() {
		let engine = test_engine();
		let order = engine
			.create_order("buyer-1", "seller-1", "USD", vec![line_item("artwork-1")])
			.await
			.unwrap();

		let machine = engine.state_machine();
		machine
			.transition(&order.id, OrderStatus::Submitted)
			.await
			.unwrap();
		machine
			.transition(&order.id, OrderStatus::Approved)
			.await
			.unwrap();
		let canceled = machine
			.transition(
				&order.id,
				OrderStatus::Canceled {
					reason: Some(CancelReason::SellerLapsed),
				},
			)
			.await
			.unwrap();
		assert_eq!(canceled.status.reason(), Some(CancelReason::SellerLapsed));

		let view = engine
			.find_order(
				&OrderSelector::Id(order.id.clone()),
				&Requester::user("buyer-1"),
			)
			.await
			.unwrap();
		assert_eq!(view.state, "CANCELED");
		assert_eq!(view.state_reason.as_deref(), Some("seller_lapsed"));
	}
}
