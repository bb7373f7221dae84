//! Query resolution for orders.
//!
//! Looks an order up by internal id or by public code, consults the
//! authorization gate, and projects the order into its API view. The
//! resolver keeps `NotFound` and `Unauthorized` distinct; collapsing them
//! into one externally indistinguishable response is the API layer's job.

use crate::{AuthorizationGate, OrderError, Visibility};
use oms_storage::OrderStore;
use oms_types::{LineItemView, Order, OrderView, PartyView, Requester};
use std::sync::Arc;

/// Exactly one way of addressing an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderSelector {
	/// Lookup by internal id.
	Id(String),
	/// Lookup by public code.
	Code(String),
}

/// Authorized order lookup.
pub struct QueryResolver {
	store: Arc<OrderStore>,
	gate: AuthorizationGate,
}

impl QueryResolver {
	pub fn new(store: Arc<OrderStore>, gate: AuthorizationGate) -> Self {
		Self { store, gate }
	}

	/// Resolves an order to the requester's view of it.
	///
	/// Misses surface as `NotFound` and denials as `Unauthorized`; both
	/// selectors go through the same gate so an id lookup and a code
	/// lookup behave identically for the same order and requester.
	pub async fn find(
		&self,
		selector: &OrderSelector,
		requester: &Requester,
	) -> Result<OrderView, OrderError> {
		let order = match selector {
			OrderSelector::Id(id) => self.store.get(id).await?,
			OrderSelector::Code(code) => self.store.get_by_code(code).await?,
		};

		let Some(visibility) = self.gate.visibility(requester, &order) else {
			tracing::debug!(order_id = %order.id, "Order access denied");
			return Err(OrderError::Unauthorized);
		};

		Ok(project(&order, visibility))
	}
}

/// Projects an order into its stable-shape view.
///
/// Fields outside the requester's visibility are set to `None` so they
/// serialize as `null`; the response shape never varies with authorization.
fn project(order: &Order, visibility: Visibility) -> OrderView {
	let seller_financials = visibility.includes_seller_financials();
	OrderView {
		id: order.id.clone(),
		code: order.code.clone(),
		buyer: party_view(&order.buyer),
		seller: party_view(&order.seller),
		state: order.status.token().to_string(),
		state_reason: order.status.reason().map(|r| r.as_str().to_string()),
		currency_code: order.currency.clone(),
		items_total_cents: order.totals.items_total,
		shipping_total_cents: order.totals.shipping_total,
		seller_total_cents: seller_financials.then_some(order.totals.seller_total),
		commission_fee_cents: seller_financials.then_some(order.totals.commission_fee),
		buyer_total_cents: order.totals.buyer_total,
		created_at: order.created_at.to_rfc3339(),
		line_items: order
			.line_items
			.iter()
			.map(|item| LineItemView {
				artwork_id: item.artwork_id.clone(),
				edition_set_id: item.edition_set_id.clone(),
				price_cents: item.price_cents,
			})
			.collect(),
	}
}

fn party_view(party: &oms_types::Party) -> PartyView {
	PartyView {
		id: party.id.clone(),
		party_type: match party.party_type {
			oms_types::PartyType::User => "user".to_string(),
			oms_types::PartyType::Partner => "partner".to_string(),
		},
	}
}
