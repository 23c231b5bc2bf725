// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Stripe webhook endpoint.

use axum::{
	body::Bytes,
	extract::State,
	http::HeaderMap,
	response::{IntoResponse, Response},
	Json,
};
use founderdex_server_api::{ErrorResponse, WebhookAck};
use founderdex_server_billing_stripe::webhook::{construct_event, SIGNATURE_HEADER};

use crate::{
	api::AppState,
	api_response::{bad_request, not_configured},
};

#[utoipa::path(
    post,
    path = "/webhook",
    request_body(content = String, description = "Raw Stripe event payload", content_type = "application/json"),
    params(
        ("Stripe-Signature" = String, Header, description = "t=<unix>,v1=<hex> signature")
    ),
    responses(
        (status = 200, description = "Event acknowledged", body = WebhookAck),
        (status = 400, description = "Signature or payload rejected", body = ErrorResponse),
        (status = 503, description = "Webhooks are not configured", body = ErrorResponse)
    ),
    tag = "billing"
)]
/// POST /webhook - Receive payment events.
///
/// Every verified event is acknowledged with 200, including ones whose
/// processing failed, so Stripe does not redeliver them.
pub async fn stripe_webhook(
	State(state): State<AppState>,
	headers: HeaderMap,
	body: Bytes,
) -> Response {
	let (Some(processor), Some(secret)) = (
		state.webhook.as_ref(),
		state.config.payments.webhook_secret.as_ref(),
	) else {
		return not_configured::<ErrorResponse>("Webhooks are not configured").into_response();
	};

	let signature = headers
		.get(SIGNATURE_HEADER)
		.and_then(|value| value.to_str().ok());

	let event = match construct_event(
		&body,
		signature,
		secret.expose().as_bytes(),
		state.config.payments.signature_tolerance_secs,
		chrono::Utc::now().timestamp(),
	) {
		Ok(event) => event,
		Err(e) => {
			tracing::warn!(error = %e, "webhook rejected");
			return bad_request::<ErrorResponse>("invalid_webhook", e.to_string()).into_response();
		}
	};

	if let Err(e) = processor.process(&event).await {
		tracing::debug!(event_id = %event.id, error = %e, "acknowledging failed event");
	}

	Json(WebhookAck {}).into_response()
}
