//! Order domain types for the order management service.
//!
//! This module defines the order aggregate and its parts: parties, line
//! items, money totals, and the lifecycle status enum. An order exclusively
//! owns its line items; they are embedded in the order document and never
//! exist outside of it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of party participating in an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartyType {
	User,
	Partner,
}

/// One side of an order: the buyer or the seller.
///
/// A party is identified by both its id and its type; two parties with the
/// same id but different types are distinct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
	pub id: String,
	pub party_type: PartyType,
}

impl Party {
	/// Creates a buyer-side party (type `user`).
	pub fn user(id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			party_type: PartyType::User,
		}
	}

	/// Creates a seller-side party (type `partner`).
	pub fn partner(id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			party_type: PartyType::Partner,
		}
	}
}

/// Reason attached to a cancellation.
///
/// Reasons exist only for the canceled state; the type is only reachable
/// through [`OrderStatus::Canceled`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
	SellerLapsed,
	BuyerRescinded,
}

impl CancelReason {
	/// Returns the stable wire token for this reason.
	pub fn as_str(&self) -> &'static str {
		match self {
			CancelReason::SellerLapsed => "seller_lapsed",
			CancelReason::BuyerRescinded => "buyer_rescinded",
		}
	}
}

/// Lifecycle state of an order.
///
/// The status is the single source of truth for the order's stage. Only the
/// `Canceled` variant can carry an explanatory reason, enforcing by
/// construction that a reason never appears alongside any other state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum OrderStatus {
	Pending,
	Submitted,
	Approved,
	Canceled { reason: Option<CancelReason> },
	Fulfilled,
	Refunded,
}

impl OrderStatus {
	/// Returns the upper-cased state token exposed through the API.
	pub fn token(&self) -> &'static str {
		match self {
			OrderStatus::Pending => "PENDING",
			OrderStatus::Submitted => "SUBMITTED",
			OrderStatus::Approved => "APPROVED",
			OrderStatus::Canceled { .. } => "CANCELED",
			OrderStatus::Fulfilled => "FULFILLED",
			OrderStatus::Refunded => "REFUNDED",
		}
	}

	/// Returns the attached reason, if this state carries one.
	pub fn reason(&self) -> Option<CancelReason> {
		match self {
			OrderStatus::Canceled { reason } => *reason,
			_ => None,
		}
	}

	/// Whether this is the initial, not-yet-submitted state.
	pub fn is_pending(&self) -> bool {
		matches!(self, OrderStatus::Pending)
	}

	/// Whether this state admits no further transitions.
	pub fn is_terminal(&self) -> bool {
		matches!(self, OrderStatus::Canceled { .. } | OrderStatus::Refunded)
	}
}

/// Money totals for an order, in non-negative minor currency units.
///
/// The five amounts are independently settable but must reconcile:
/// `buyer_total = items_total + shipping_total` and
/// `seller_total + commission_fee = items_total + shipping_total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
	pub items_total: u64,
	pub shipping_total: u64,
	pub commission_fee: u64,
	pub seller_total: u64,
	pub buyer_total: u64,
}

impl OrderTotals {
	/// Builds the initial totals for a freshly created order: the items
	/// total derived from line items, no shipping and no commission yet.
	pub fn from_items_total(items_total: u64) -> Self {
		Self {
			items_total,
			shipping_total: 0,
			commission_fee: 0,
			seller_total: items_total,
			buyer_total: items_total,
		}
	}

	/// Checks the internal consistency of the five amounts.
	///
	/// Overflowing sums are treated as inconsistent rather than panicking.
	pub fn is_reconciled(&self) -> bool {
		let Some(gross) = self.items_total.checked_add(self.shipping_total) else {
			return false;
		};
		let Some(seller_side) = self.seller_total.checked_add(self.commission_fee) else {
			return false;
		};
		self.buyer_total == gross && seller_side == gross
	}
}

/// One purchasable unit within an order.
///
/// The artwork id together with the optional edition set id identifies the
/// specific variant being purchased. A missing edition set means exactly
/// that, not a wildcard over all edition sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
	pub artwork_id: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub edition_set_id: Option<String>,
	pub price_cents: u64,
}

/// Builds the uniqueness fingerprint for a pending order line.
///
/// The fingerprint keys the one-pending-order-per-item rule: at most one
/// pending order may exist per buyer, artwork and edition set. Ids are
/// caller-supplied strings, so each component is escaped before joining:
/// a separator inside an id must not shift the component boundaries. An
/// absent edition set is encoded as its own distinct component and a
/// present one is prefixed, so no edition-set id can spell the absent
/// marker.
pub fn pending_fingerprint(
	buyer_id: &str,
	artwork_id: &str,
	edition_set_id: Option<&str>,
) -> String {
	let edition = match edition_set_id {
		Some(edition) => format!("+{}", encode_component(edition)),
		None => "-".to_string(),
	};
	format!(
		"{}:{}:{}",
		encode_component(buyer_id),
		encode_component(artwork_id),
		edition
	)
}

/// Escapes the fingerprint separator (and the escape character itself)
/// inside a single component.
fn encode_component(raw: &str) -> String {
	raw.replace('%', "%25").replace(':', "%3A")
}

/// The order aggregate: a purchase between one buyer and one seller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
	/// Opaque server-generated identifier.
	pub id: String,
	/// Opaque public code, stable and externally shareable; an alternate
	/// unique lookup key.
	pub code: String,
	pub buyer: Party,
	pub seller: Party,
	/// 3-letter currency code, fixed at creation.
	pub currency: String,
	#[serde(flatten)]
	pub status: OrderStatus,
	pub totals: OrderTotals,
	pub line_items: Vec<LineItem>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl Order {
	/// Creates a new order in the pending state with totals derived from
	/// its line items.
	pub fn new(buyer: Party, seller: Party, currency: String, line_items: Vec<LineItem>) -> Self {
		let items_total = line_items
			.iter()
			.fold(0u64, |acc, item| acc.saturating_add(item.price_cents));
		let now = Utc::now();
		Self {
			id: Uuid::new_v4().to_string(),
			code: generate_public_code(),
			buyer,
			seller,
			currency,
			status: OrderStatus::Pending,
			totals: OrderTotals::from_items_total(items_total),
			line_items,
			created_at: now,
			updated_at: now,
		}
	}

	/// Returns the pending fingerprints of every line item for the order's
	/// buyer.
	pub fn pending_fingerprints(&self) -> Vec<String> {
		self.line_items
			.iter()
			.map(|item| {
				pending_fingerprint(
					&self.buyer.id,
					&item.artwork_id,
					item.edition_set_id.as_deref(),
				)
			})
			.collect()
	}
}

/// Generates a new public order code.
///
/// Codes are short, upper-case and carry no embedded meaning.
fn generate_public_code() -> String {
	let raw = Uuid::new_v4().simple().to_string();
	format!("OR-{}", raw[..12].to_uppercase())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_status_tokens_are_upper_cased() {
		assert_eq!(OrderStatus::Pending.token(), "PENDING");
		assert_eq!(OrderStatus::Submitted.token(), "SUBMITTED");
		assert_eq!(OrderStatus::Approved.token(), "APPROVED");
		assert_eq!(
			OrderStatus::Canceled { reason: None }.token(),
			"CANCELED"
		);
		assert_eq!(OrderStatus::Fulfilled.token(), "FULFILLED");
		assert_eq!(OrderStatus::Refunded.token(), "REFUNDED");
	}

	#[test]
	fn test_only_canceled_carries_a_reason() {
		let canceled = OrderStatus::Canceled {
			reason: Some(CancelReason::SellerLapsed),
		};
		assert_eq!(canceled.reason(), Some(CancelReason::SellerLapsed));

		for status in [
			OrderStatus::Pending,
			OrderStatus::Submitted,
			OrderStatus::Approved,
			OrderStatus::Fulfilled,
			OrderStatus::Refunded,
		] {
			assert_eq!(status.reason(), None);
		}
	}

	#[test]
	fn test_terminal_states() {
		assert!(OrderStatus::Canceled { reason: None }.is_terminal());
		assert!(OrderStatus::Refunded.is_terminal());
		for status in [
			OrderStatus::Pending,
			OrderStatus::Submitted,
			OrderStatus::Approved,
			OrderStatus::Fulfilled,
		] {
			assert!(!status.is_terminal());
		}
	}

	#[test]
	fn test_totals_reconciliation() {
		// The worked example: items 0, shipping 100.00, commission 50.00.
		let totals = OrderTotals {
			items_total: 0,
			shipping_total: 10_000,
			commission_fee: 5_000,
			seller_total: 5_000,
			buyer_total: 10_000,
		};
		assert!(totals.is_reconciled());

		let skewed = OrderTotals {
			buyer_total: 9_999,
			..totals
		};
		assert!(!skewed.is_reconciled());

		let overflowing = OrderTotals {
			items_total: u64::MAX,
			shipping_total: 1,
			..totals
		};
		assert!(!overflowing.is_reconciled());
	}

	#[test]
	fn test_fingerprint_treats_missing_edition_set_as_distinct() {
		let with_edition = pending_fingerprint("buyer-1", "artwork-1", Some("edition-1"));
		let without_edition = pending_fingerprint("buyer-1", "artwork-1", None);
		assert_ne!(with_edition, without_edition);
		assert_eq!(without_edition, "buyer-1:artwork-1:-");
		// An edition set literally named after the absent marker is still
		// its own combination.
		let dash_edition = pending_fingerprint("buyer-1", "artwork-1", Some("-"));
		assert_ne!(dash_edition, without_edition);
	}

	#[test]
	fn test_fingerprint_escapes_separator_inside_ids() {
		// Without escaping these two combinations would collide on
		// "a:b:c:-".
		let shifted_left = pending_fingerprint("a:b", "c", None);
		let shifted_right = pending_fingerprint("a", "b:c", None);
		assert_ne!(shifted_left, shifted_right);

		// The escape character itself cannot forge a separator either.
		let escaped = pending_fingerprint("a%3Ab", "c", None);
		let raw = pending_fingerprint("a:b", "c", None);
		assert_ne!(escaped, raw);
	}

	#[test]
	fn test_new_order_derives_totals_from_line_items() {
		let order = Order::new(
			Party::user("buyer-1"),
			Party::partner("seller-1"),
			"USD".to_string(),
			vec![
				LineItem {
					artwork_id: "artwork-1".to_string(),
					edition_set_id: None,
					price_cents: 2_500,
				},
				LineItem {
					artwork_id: "artwork-2".to_string(),
					edition_set_id: Some("edition-9".to_string()),
					price_cents: 1_500,
				},
			],
		);

		assert!(order.status.is_pending());
		assert_eq!(order.totals.items_total, 4_000);
		assert_eq!(order.totals.buyer_total, 4_000);
		assert_eq!(order.totals.seller_total, 4_000);
		assert!(order.totals.is_reconciled());
		assert!(order.code.starts_with("OR-"));
		assert_ne!(order.id, order.code);
	}
}
