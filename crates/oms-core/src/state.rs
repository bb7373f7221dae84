//! Order state machine implementation.
//!
//! Manages order state transitions with validation, ensuring orders move
//! through valid lifecycle states: Pending -> Submitted -> Approved ->
//! Fulfilled, with cancellation and refund paths. Transitions serialize per
//! order and may atomically carry financial-field updates; an invalid
//! transition or an irreconcilable totals update leaves the stored order
//! untouched.

use crate::OrderError;
use chrono::Utc;
use dashmap::DashMap;
use oms_storage::OrderStore;
use oms_types::{Order, OrderStatus, OrderTotals};
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Manages order state transitions and persistence.
pub struct OrderStateMachine {
	store: Arc<OrderStore>,
	/// Per-order locks serializing concurrent transition attempts.
	locks: DashMap<String, Arc<Mutex<()>>>,
}

impl OrderStateMachine {
	pub fn new(store: Arc<OrderStore>) -> Self {
		Self {
			store,
			locks: DashMap::new(),
		}
	}

	fn lock_for(&self, order_id: &str) -> Arc<Mutex<()>> {
		self.locks
			.entry(order_id.to_string())
			.or_insert_with(|| Arc::new(Mutex::new(())))
			.clone()
	}

	/// Transitions an order to a new status with validation.
	pub async fn transition(
		&self,
		order_id: &str,
		new_status: OrderStatus,
	) -> Result<Order, OrderError> {
		self.transition_with(order_id, new_status, |_| {}).await
	}

	/// Transitions an order and atomically applies a totals update.
	///
	/// The transition table is consulted first; then the updater runs on a
	/// copy of the totals and the result must reconcile before anything is
	/// persisted. Concurrent calls for the same order are serialized, so
	/// two competing transitions cannot both apply.
	pub async fn transition_with<F>(
		&self,
		order_id: &str,
		new_status: OrderStatus,
		update_totals: F,
	) -> Result<Order, OrderError>
	where
		F: FnOnce(&mut OrderTotals),
	{
		let lock = self.lock_for(order_id);
		let _guard = lock.lock().await;

		let mut order = self.store.get(order_id).await?;

		// Validate state transition
		if !Self::is_valid_transition(&order.status, &new_status) {
			return Err(OrderError::InvalidTransition {
				from: order.status,
				to: new_status,
			});
		}

		let was_pending = order.status.is_pending();
		order.status = new_status;
		update_totals(&mut order.totals);
		if !order.totals.is_reconciled() {
			return Err(OrderError::InconsistentTotals);
		}
		order.updated_at = Utc::now();

		// Leaving the pending state frees the duplicate-pending
		// fingerprints in the same write.
		let release = was_pending && !order.status.is_pending();
		self.store.persist(&order, release).await?;

		// Terminal states admit no further transitions, so the per-order
		// lock is no longer needed and can be dropped from the table.
		if order.status.is_terminal() {
			self.locks.remove(order_id);
		}

		tracing::info!(
			order_id = %order.id,
			state = order.status.token(),
			"Order transitioned"
		);
		Ok(order)
	}

	/// Checks if a state transition is valid.
	fn is_valid_transition(from: &OrderStatus, to: &OrderStatus) -> bool {
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
		enum StatusKind {
			Pending,
			Submitted,
			Approved,
			Canceled,
			Fulfilled,
			Refunded,
		}

		// Static transition table - each state maps to allowed next states
		static TRANSITIONS: Lazy<HashMap<StatusKind, HashSet<StatusKind>>> = Lazy::new(|| {
			let mut m = HashMap::new();
			m.insert(
				StatusKind::Pending,
				HashSet::from([StatusKind::Submitted, StatusKind::Canceled]),
			);
			m.insert(
				StatusKind::Submitted,
				HashSet::from([StatusKind::Approved, StatusKind::Canceled]),
			);
			m.insert(
				StatusKind::Approved,
				HashSet::from([
					StatusKind::Fulfilled,
					StatusKind::Canceled,
					StatusKind::Refunded,
				]),
			);
			m.insert(StatusKind::Fulfilled, HashSet::from([StatusKind::Refunded]));
			m.insert(StatusKind::Canceled, HashSet::new()); // terminal
			m.insert(StatusKind::Refunded, HashSet::new()); // terminal
			m
		});

		// Helper to project the reason-carrying variant onto its kind
		let status_kind = |status: &OrderStatus| -> StatusKind {
			match status {
				OrderStatus::Pending => StatusKind::Pending,
				OrderStatus::Submitted => StatusKind::Submitted,
				OrderStatus::Approved => StatusKind::Approved,
				OrderStatus::Canceled { .. } => StatusKind::Canceled,
				OrderStatus::Fulfilled => StatusKind::Fulfilled,
				OrderStatus::Refunded => StatusKind::Refunded,
			}
		};

		let from_kind = status_kind(from);
		let to_kind = status_kind(to);
		TRANSITIONS
			.get(&from_kind)
			.is_some_and(|set| set.contains(&to_kind))
	}
}
