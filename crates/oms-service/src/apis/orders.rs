//! Order API implementation.
//!
//! This module implements the creation and query endpoints. It translates
//! HTTP inputs into core calls and core errors into the API error surface.
//! Authorization failures and missing orders are collapsed here into one
//! indistinguishable denial so order existence can never be inferred.

use axum::http::HeaderMap;
use oms_core::{OrderEngine, OrderError, OrderSelector};
use oms_types::{ApiError, CreateOrderRequest, LineItem, OrderView, Requester};
use serde::Deserialize;
use tracing::info;

/// Query parameters for order lookup: exactly one of `id` and `code`.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderQuery {
	pub id: Option<String>,
	pub code: Option<String>,
}

/// Processes an order creation request.
pub async fn create_order(
	request: CreateOrderRequest,
	engine: &OrderEngine,
) -> Result<OrderView, ApiError> {
	let line_items: Vec<LineItem> = request
		.line_items
		.into_iter()
		.map(|item| LineItem {
			artwork_id: item.artwork_id,
			edition_set_id: item.edition_set_id,
			price_cents: item.price_cents,
		})
		.collect();

	let order = engine
		.create_order(
			&request.buyer_id,
			&request.seller_id,
			&request.currency_code,
			line_items,
		)
		.await
		.map_err(map_order_error)?;

	info!(order_id = %order.id, "Created order via API");

	// Return the buyer's view of the freshly created order.
	engine
		.find_order(
			&OrderSelector::Id(order.id.clone()),
			&Requester::user(&request.buyer_id),
		)
		.await
		.map_err(map_order_error)
}

/// Processes an order retrieval request.
pub async fn get_order(
	query: OrderQuery,
	headers: &HeaderMap,
	engine: &OrderEngine,
) -> Result<OrderView, ApiError> {
	let selector = selector_from_query(query)?;
	let requester = requester_from_headers(headers);

	engine
		.find_order(&selector, &requester)
		.await
		.map_err(map_order_error)
}

/// Validates that exactly one lookup key was supplied.
fn selector_from_query(query: OrderQuery) -> Result<OrderSelector, ApiError> {
	match (query.id, query.code) {
		(Some(id), None) => Ok(OrderSelector::Id(id)),
		(None, Some(code)) => Ok(OrderSelector::Code(code)),
		_ => Err(ApiError::BadRequest {
			message: "Exactly one of 'id' and 'code' must be supplied".to_string(),
		}),
	}
}

/// Builds the requester context from upstream-validated identity headers.
///
/// Token verification happens upstream; this service trusts `x-user-id`,
/// `x-partner-id` and the comma-separated `x-roles` header. A request with
/// no identity yields an empty requester, which the gate denies.
fn requester_from_headers(headers: &HeaderMap) -> Requester {
	let header = |name: &str| {
		headers
			.get(name)
			.and_then(|v| v.to_str().ok())
			.filter(|v| !v.is_empty())
			.map(String::from)
	};

	let mut requester = Requester {
		user_id: header("x-user-id"),
		partner_id: header("x-partner-id"),
		..Default::default()
	};
	if let Some(roles) = header("x-roles") {
		requester.roles = roles
			.split(',')
			.map(|r| r.trim().to_string())
			.filter(|r| !r.is_empty())
			.collect();
	}
	requester
}

/// Maps core errors onto the API error surface.
///
/// `Unauthorized` and `NotFound` intentionally map to the same denial:
/// same status, same payload, regardless of whether the order exists.
fn map_order_error(err: OrderError) -> ApiError {
	match err {
		OrderError::UnsupportedCurrency(code) => ApiError::UnprocessableEntity {
			code: "unsupported_currency".to_string(),
			message: format!("Currency '{}' is not supported", code),
		},
		OrderError::DuplicatePendingOrder { .. } => ApiError::UnprocessableEntity {
			code: "duplicate_pending_order".to_string(),
			message: "A pending order already exists for one of the requested items".to_string(),
		},
		OrderError::EmptyOrder => ApiError::BadRequest {
			message: "An order requires at least one line item".to_string(),
		},
		OrderError::InvalidTransition { .. } => ApiError::UnprocessableEntity {
			code: "invalid_state_transition".to_string(),
			message: err.to_string(),
		},
		OrderError::InconsistentTotals => ApiError::UnprocessableEntity {
			code: "inconsistent_totals".to_string(),
			message: err.to_string(),
		},
		OrderError::Unauthorized | OrderError::NotFound => ApiError::Denied,
		OrderError::Storage(message) => ApiError::Internal { message },
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::http::HeaderValue;
	use oms_types::OrderStatus;

	#[test]
	fn test_selector_requires_exactly_one_key() {
		let both = OrderQuery {
			id: Some("id-1".to_string()),
			code: Some("OR-1".to_string()),
		};
		assert!(matches!(
			selector_from_query(both),
			Err(ApiError::BadRequest { .. })
		));

		let neither = OrderQuery {
			id: None,
			code: None,
		};
		assert!(matches!(
			selector_from_query(neither),
			Err(ApiError::BadRequest { .. })
		));

		let id_only = OrderQuery {
			id: Some("id-1".to_string()),
			code: None,
		};
		assert_eq!(
			selector_from_query(id_only).unwrap(),
			OrderSelector::Id("id-1".to_string())
		);
	}

	#[test]
	fn test_requester_from_headers() {
		let mut headers = HeaderMap::new();
		headers.insert("x-user-id", HeaderValue::from_static("user-1"));
		headers.insert("x-roles", HeaderValue::from_static("trusted, sales_admin"));

		let requester = requester_from_headers(&headers);
		assert_eq!(requester.user_id.as_deref(), Some("user-1"));
		assert_eq!(requester.partner_id, None);
		assert!(requester.has_role("trusted"));
		assert!(requester.has_role("sales_admin"));
	}

	#[test]
	fn test_missing_identity_yields_empty_requester() {
		let requester = requester_from_headers(&HeaderMap::new());
		assert_eq!(requester, Requester::default());
	}

	#[test]
	fn test_unauthorized_and_not_found_collapse_to_one_denial() {
		let unauthorized = map_order_error(OrderError::Unauthorized);
		let not_found = map_order_error(OrderError::NotFound);

		assert_eq!(unauthorized.status_code(), 401);
		assert_eq!(not_found.status_code(), 401);
		assert_eq!(unauthorized.to_error_body(), not_found.to_error_body());

		let body = unauthorized.to_error_body();
		assert_eq!(body.extensions.code, "not_found");
		assert_eq!(body.extensions.error_type, "auth");
	}

	#[test]
	fn test_creation_rejections_are_typed() {
		let currency = map_order_error(OrderError::UnsupportedCurrency("GBP".to_string()));
		assert_eq!(currency.status_code(), 422);
		assert_eq!(currency.to_error_body().extensions.code, "unsupported_currency");

		let duplicate = map_order_error(OrderError::DuplicatePendingOrder {
			fingerprint: "buyer:artwork:-".to_string(),
		});
		assert_eq!(duplicate.status_code(), 422);
		assert_eq!(
			duplicate.to_error_body().extensions.code,
			"duplicate_pending_order"
		);
	}

	#[test]
	fn test_transition_errors_map_to_unprocessable() {
		let err = map_order_error(OrderError::InvalidTransition {
			from: OrderStatus::Pending,
			to: OrderStatus::Fulfilled,
		});
		assert_eq!(err.status_code(), 422);
	}
}
