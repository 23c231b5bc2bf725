// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Verified construction of webhook events from raw deliveries.

use founderdex_common_webhook::{verify_signature_header, SignatureError};
use tracing::{debug, warn};

use crate::error::WebhookError;
use crate::types::WebhookEvent;

/// Header carrying the delivery signature.
pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Verify `payload` against `signature_header` and parse it as an event.
///
/// The payload must be the exact bytes received. Nothing is parsed until the
/// signature checks out.
pub fn construct_event(
	payload: &[u8],
	signature_header: Option<&str>,
	secret: &[u8],
	tolerance_secs: u64,
	now_unix: i64,
) -> Result<WebhookEvent, WebhookError> {
	let header = signature_header.ok_or(SignatureError::MissingHeader)?;

	if let Err(e) = verify_signature_header(secret, payload, header, tolerance_secs, now_unix) {
		warn!(error = %e, "webhook signature rejected");
		return Err(e.into());
	}

	let event: WebhookEvent = serde_json::from_slice(payload)?;
	debug!(event_id = %event.id, event_type = %event.event_type, "webhook event verified");
	Ok(event)
}
