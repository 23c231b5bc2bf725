// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use axum::{
	extract::State,
	http::HeaderMap,
	response::{IntoResponse, Response},
	Json,
};
use founderdex_server_api::{CheckoutRequest, CheckoutResponse, ErrorResponse};
use founderdex_server_billing::{BillingError, CheckoutInput};

use crate::{
	api::AppState,
	api_response::{bad_request, internal_error, not_configured},
	session::current_identity,
};

/// Shown to the buyer when the payment provider call fails.
pub const CHECKOUT_FAILED: &str = "Failed to start checkout. Please try again.";

#[utoipa::path(
    post,
    path = "/checkout",
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Checkout session created", body = CheckoutResponse),
        (status = 400, description = "A required field is missing", body = ErrorResponse),
        (status = 500, description = "Payment provider error", body = ErrorResponse),
        (status = 503, description = "Payments are not configured", body = ErrorResponse)
    ),
    tag = "billing"
)]
/// POST /checkout - Start a hosted checkout and return its URL.
pub async fn create_checkout(
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(request): Json<CheckoutRequest>,
) -> Response {
	let Some(checkout) = state.checkout.as_ref() else {
		return not_configured::<ErrorResponse>("Payments are not configured").into_response();
	};

	let input = CheckoutInput {
		price_id: request.price_id,
		mode: request.mode,
		success_url: request.success_url,
		cancel_url: request.cancel_url,
	};
	// Validate before resolving the caller.
	if let Err(BillingError::InvalidRequest(message)) = input.validate() {
		return bad_request::<ErrorResponse>("invalid_request", message).into_response();
	}

	let user = current_identity(&headers, &state.config.auth, state.identity.as_deref()).await;

	match checkout.start_checkout(&input, user.as_ref()).await {
		Ok(url) => Json(CheckoutResponse { url }).into_response(),
		Err(BillingError::InvalidRequest(message)) => {
			bad_request::<ErrorResponse>("invalid_request", message).into_response()
		}
		Err(e) => {
			tracing::error!(error = %e, "checkout failed");
			internal_error::<ErrorResponse>(CHECKOUT_FAILED).into_response()
		}
	}
}
