//! HTTP server for the order management API.
//!
//! This module provides a minimal HTTP server infrastructure exposing the
//! order creation and query endpoints.

use axum::{
	extract::{Query, State},
	http::HeaderMap,
	response::Json,
	routing::{get, post},
	Router,
};
use oms_config::ApiConfig;
use oms_core::OrderEngine;
use oms_types::{ApiError, CreateOrderRequest, OrderView};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::apis::orders::OrderQuery;

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	/// Reference to the order engine for processing requests.
	pub engine: Arc<OrderEngine>,
}

/// Starts the HTTP server for the API.
///
/// This function creates and configures the HTTP server with routing,
/// middleware, and error handling for the order endpoints.
pub async fn start_server(
	api_config: ApiConfig,
	engine: Arc<OrderEngine>,
) -> Result<(), Box<dyn std::error::Error>> {
	let app_state = AppState { engine };

	// Build the router with /api base path and order endpoints
	let app = Router::new()
		.nest(
			"/api",
			Router::new()
				.route("/orders", post(handle_create_order).get(handle_get_order)),
		)
		.layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
		.with_state(app_state);

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("Order API server starting on {}", bind_address);

	axum::serve(listener, app).await?;

	Ok(())
}

/// Handles POST /api/orders requests.
///
/// This endpoint runs the order creation workflow and returns the created
/// order view, or a typed rejection for unsupported currencies and
/// duplicate pending orders.
async fn handle_create_order(
	State(state): State<AppState>,
	Json(request): Json<CreateOrderRequest>,
) -> Result<(axum::http::StatusCode, Json<OrderView>), ApiError> {
	match crate::apis::orders::create_order(request, &state.engine).await {
		Ok(view) => Ok((axum::http::StatusCode::CREATED, Json(view))),
		Err(e) => {
			tracing::warn!("Order creation failed: {}", e);
			Err(e)
		}
	}
}

/// Handles GET /api/orders requests.
///
/// This endpoint resolves an order by internal id or public code (exactly
/// one) for the requester identified by the upstream-validated headers.
async fn handle_get_order(
	State(state): State<AppState>,
	Query(query): Query<OrderQuery>,
	headers: HeaderMap,
) -> Result<Json<OrderView>, ApiError> {
	match crate::apis::orders::get_order(query, &headers, &state.engine).await {
		Ok(view) => Ok(Json(view)),
		Err(e) => {
			tracing::debug!("Order retrieval failed: {}", e);
			Err(e)
		}
	}
}
