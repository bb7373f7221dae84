//! Shared types for the order management service.
//!
//! This crate defines the domain model (orders, line items, parties, money
//! totals, lifecycle states) together with the request-scoped requester
//! context and the HTTP API request/response/error types. All other crates
//! in the workspace depend on these definitions.

pub mod api;
pub mod order;
pub mod requester;

pub use api::{
	ApiError, CreateOrderRequest, ErrorBody, ErrorExtensions, LineItemRequest, LineItemView,
	OrderView, PartyView,
};
pub use order::{
	pending_fingerprint, CancelReason, LineItem, Order, OrderStatus, OrderTotals, Party, PartyType,
};
pub use requester::Requester;
