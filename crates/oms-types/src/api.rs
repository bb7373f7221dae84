//! API types for the order management HTTP API.
//!
//! This module defines the request and response types for the creation and
//! query endpoints, plus the structured API error with its HTTP status
//! mapping. Authorization denials and missing orders share one wire shape
//! so that order existence can never be inferred from the response.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One requested line item in an order creation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItemRequest {
	pub artwork_id: String,
	#[serde(default)]
	pub edition_set_id: Option<String>,
	pub price_cents: u64,
}

/// Request body for creating an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
	pub buyer_id: String,
	pub seller_id: String,
	pub currency_code: String,
	pub line_items: Vec<LineItemRequest>,
}

/// Party identity as exposed through the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyView {
	pub id: String,
	#[serde(rename = "type")]
	pub party_type: String,
}

/// Line item projection within an order view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemView {
	pub artwork_id: String,
	pub edition_set_id: Option<String>,
	pub price_cents: u64,
}

/// Authorized projection of an order.
///
/// The shape is stable regardless of the requester: fields the requester
/// may not see are serialized as `null`, never omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderView {
	pub id: String,
	pub code: String,
	pub buyer: PartyView,
	pub seller: PartyView,
	/// Upper-cased state token, e.g. `PENDING`.
	pub state: String,
	pub state_reason: Option<String>,
	pub currency_code: String,
	pub items_total_cents: u64,
	pub shipping_total_cents: u64,
	/// Seller-only; `null` for restricted requesters.
	pub seller_total_cents: Option<u64>,
	/// Seller-only; `null` for restricted requesters.
	pub commission_fee_cents: Option<u64>,
	pub buyer_total_cents: u64,
	/// ISO-8601 creation timestamp.
	pub created_at: String,
	pub line_items: Vec<LineItemView>,
}

/// Machine-readable error metadata attached to every error payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorExtensions {
	/// Error code, e.g. `not_found` or `unsupported_currency`.
	pub code: String,
	/// Error category, e.g. `auth` or `validation`.
	#[serde(rename = "type")]
	pub error_type: String,
}

/// API error payload serialized as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
	/// Human-readable description.
	pub message: String,
	/// Machine-readable error metadata.
	pub extensions: ErrorExtensions,
}

/// Structured API error type with appropriate HTTP status mapping.
#[derive(Debug)]
pub enum ApiError {
	/// Malformed request (400).
	BadRequest { message: String },
	/// Business-rule rejection during creation (422).
	UnprocessableEntity { code: String, message: String },
	/// Uniform denial for unauthorized or missing orders (401).
	///
	/// Deliberately carries not-found vocabulary in an auth-typed payload:
	/// the caller cannot distinguish "exists but forbidden" from "does not
	/// exist".
	Denied,
	/// Internal server error (500).
	Internal { message: String },
}

impl ApiError {
	/// Get the HTTP status code for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			ApiError::BadRequest { .. } => 400,
			ApiError::Denied => 401,
			ApiError::UnprocessableEntity { .. } => 422,
			ApiError::Internal { .. } => 500,
		}
	}

	/// Convert to ErrorBody for JSON serialization.
	pub fn to_error_body(&self) -> ErrorBody {
		match self {
			ApiError::BadRequest { message } => ErrorBody {
				message: message.clone(),
				extensions: ErrorExtensions {
					code: "bad_request".to_string(),
					error_type: "validation".to_string(),
				},
			},
			ApiError::UnprocessableEntity { code, message } => ErrorBody {
				message: message.clone(),
				extensions: ErrorExtensions {
					code: code.clone(),
					error_type: "validation".to_string(),
				},
			},
			ApiError::Denied => ErrorBody {
				message: "Order not found".to_string(),
				extensions: ErrorExtensions {
					code: "not_found".to_string(),
					error_type: "auth".to_string(),
				},
			},
			ApiError::Internal { message } => ErrorBody {
				message: message.clone(),
				extensions: ErrorExtensions {
					code: "internal".to_string(),
					error_type: "internal".to_string(),
				},
			},
		}
	}
}

impl fmt::Display for ApiError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ApiError::BadRequest { message } => write!(f, "Bad Request: {}", message),
			ApiError::UnprocessableEntity { message, .. } => {
				write!(f, "Unprocessable Entity: {}", message)
			}
			ApiError::Denied => write!(f, "Not Found"),
			ApiError::Internal { message } => write!(f, "Internal Server Error: {}", message),
		}
	}
}

impl std::error::Error for ApiError {}

impl axum::response::IntoResponse for ApiError {
	fn into_response(self) -> axum::response::Response {
		use axum::{http::StatusCode, response::Json};

		let status = StatusCode::from_u16(self.status_code())
			.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
		let body = self.to_error_body();
		(status, Json(body)).into_response()
	}
}
