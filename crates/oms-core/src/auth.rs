//! Authorization and field visibility gate.
//!
//! Two independent decisions composed together: whether a requester may
//! load an order at all, and which fields they may see once loaded. The
//! rules evaluate in order and the first match wins: order parties and
//! elevated roles get everything, trusted callers get the order with
//! seller-only financial fields suppressed, everyone else is denied.

use oms_config::AuthorizationConfig;
use oms_types::{Order, Requester};

/// How much of an order a requester may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
	/// All fields, including seller-only financial fields.
	Full,
	/// Seller-only financial fields are suppressed.
	Restricted,
}

impl Visibility {
	/// Whether seller-only financial fields are readable.
	pub fn includes_seller_financials(&self) -> bool {
		matches!(self, Visibility::Full)
	}
}

/// Decides access and field visibility per requester and order.
#[derive(Debug, Clone)]
pub struct AuthorizationGate {
	elevated_roles: Vec<String>,
	trusted_roles: Vec<String>,
}

impl AuthorizationGate {
	/// Builds the gate from the configured role names.
	pub fn from_config(config: &AuthorizationConfig) -> Self {
		Self {
			elevated_roles: config.elevated_roles.clone(),
			trusted_roles: config.trusted_roles.clone(),
		}
	}

	/// Whether the requester may load the order at all.
	pub fn can_view(&self, requester: &Requester, order: &Order) -> bool {
		self.visibility(requester, order).is_some()
	}

	/// The requester's field visibility for the order, or `None` when
	/// access is denied outright.
	pub fn visibility(&self, requester: &Requester, order: &Order) -> Option<Visibility> {
		if requester.is_party(&order.buyer) || requester.is_party(&order.seller) {
			return Some(Visibility::Full);
		}
		if self
			.elevated_roles
			.iter()
			.any(|role| requester.has_role(role))
		{
			return Some(Visibility::Full);
		}
		if self
			.trusted_roles
			.iter()
			.any(|role| requester.has_role(role))
		{
			return Some(Visibility::Restricted);
		}
		None
	}
}
