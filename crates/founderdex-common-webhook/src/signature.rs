// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Timestamped signature headers.
//!
//! Header format: `t=<unix seconds>,v1=<hex>[,v1=<hex>...]`. Unknown keys
//! such as `v0` are ignored. The signed message is `"{t}.{body}"`, keyed with
//! the endpoint secret. A header verifies when any `v1` entry matches and the
//! timestamp is within the tolerance window of the caller's clock.

use crate::{compute_hmac_sha256, verify_hmac_sha256};

/// Five minutes either way.
pub const DEFAULT_TOLERANCE_SECS: u64 = 300;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
	#[error("signature header is missing")]
	MissingHeader,

	#[error("signature header is malformed: {0}")]
	Malformed(String),

	#[error("signature header has no v1 signatures")]
	NoSignatures,

	#[error("timestamp {timestamp} is outside the {tolerance_secs}s tolerance")]
	TimestampOutOfTolerance { timestamp: i64, tolerance_secs: u64 },

	#[error("no signature matches the payload")]
	Mismatch,
}

/// A parsed signature header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
	pub timestamp: i64,
	pub signatures: Vec<String>,
}

impl SignatureHeader {
	pub fn parse(header: &str) -> Result<Self, SignatureError> {
		let header = header.trim();
		if header.is_empty() {
			return Err(SignatureError::MissingHeader);
		}

		let mut timestamp = None;
		let mut signatures = Vec::new();

		for part in header.split(',') {
			let Some((key, value)) = part.trim().split_once('=') else {
				return Err(SignatureError::Malformed(format!(
					"expected key=value, got '{}'",
					part.trim()
				)));
			};
			match key {
				"t" => {
					let ts = value.parse::<i64>().map_err(|_| {
						SignatureError::Malformed(format!("invalid timestamp '{value}'"))
					})?;
					timestamp = Some(ts);
				}
				"v1" if !value.is_empty() => signatures.push(value.to_string()),
				_ => {}
			}
		}

		let timestamp =
			timestamp.ok_or_else(|| SignatureError::Malformed("missing timestamp".to_string()))?;
		if signatures.is_empty() {
			return Err(SignatureError::NoSignatures);
		}

		Ok(Self {
			timestamp,
			signatures,
		})
	}
}

fn signed_message(timestamp: i64, payload: &[u8]) -> Vec<u8> {
	let mut message = Vec::with_capacity(payload.len() + 12);
	message.extend_from_slice(timestamp.to_string().as_bytes());
	message.push(b'.');
	message.extend_from_slice(payload);
	message
}

/// Verify `header` for `payload`, checking the timestamp against `now_unix`.
///
/// Returns the parsed header so callers can log the signing time.
pub fn verify_signature_header(
	secret: &[u8],
	payload: &[u8],
	header: &str,
	tolerance_secs: u64,
	now_unix: i64,
) -> Result<SignatureHeader, SignatureError> {
	let parsed = SignatureHeader::parse(header)?;

	if now_unix.abs_diff(parsed.timestamp) > tolerance_secs {
		return Err(SignatureError::TimestampOutOfTolerance {
			timestamp: parsed.timestamp,
			tolerance_secs,
		});
	}

	let message = signed_message(parsed.timestamp, payload);
	if parsed
		.signatures
		.iter()
		.any(|sig| verify_hmac_sha256(secret, &message, sig))
	{
		Ok(parsed)
	} else {
		Err(SignatureError::Mismatch)
	}
}

/// Build a header for `payload` signed at `timestamp`.
pub fn sign_header(secret: &[u8], payload: &[u8], timestamp: i64) -> String {
	let signature = compute_hmac_sha256(secret, &signed_message(timestamp, payload));
	format!("t={timestamp},v1={signature}")
}
