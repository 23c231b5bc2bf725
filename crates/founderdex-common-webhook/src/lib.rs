// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HMAC-SHA256 webhook signature utilities.
//!
//! [`compute_hmac_sha256`] and [`verify_hmac_sha256`] are the raw primitives.
//! The [`signature`] module builds the timestamped `t=...,v1=...` header
//! scheme used by the payment processor on top of them.

pub mod signature;

pub use signature::{
	sign_header, verify_signature_header, SignatureError, SignatureHeader,
	DEFAULT_TOLERANCE_SECS,
};

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Compute an HMAC-SHA256 signature for a payload.
///
/// Returns the hex-encoded signature without any prefix.
pub fn compute_hmac_sha256(secret: &[u8], payload: &[u8]) -> String {
	let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
	mac.update(payload);
	hex::encode(mac.finalize().into_bytes())
}

/// Verify an HMAC-SHA256 signature for a payload in constant time.
///
/// The `signature` should be the raw hex-encoded signature (no prefix).
pub fn verify_hmac_sha256(secret: &[u8], payload: &[u8], signature: &str) -> bool {
	let Ok(expected_bytes) = hex::decode(signature) else {
		return false;
	};

	let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
		return false;
	};

	mac.update(payload);
	mac.verify_slice(&expected_bytes).is_ok()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_compute_hmac_sha256_length() {
		let sig = compute_hmac_sha256(b"whsec_test", b"{\"id\":\"evt_1\"}");
		assert_eq!(sig.len(), 64);
	}

	#[test]
	fn test_verify_valid() {
		let sig = compute_hmac_sha256(b"whsec_test", b"payload");
		assert!(verify_hmac_sha256(b"whsec_test", b"payload", &sig));
	}

	#[test]
	fn test_verify_rejects_zero_signature() {
		assert!(!verify_hmac_sha256(b"whsec_test", b"payload", &"0".repeat(64)));
	}

	#[test]
	fn test_verify_rejects_non_hex() {
		assert!(!verify_hmac_sha256(b"whsec_test", b"payload", "zz-not-hex"));
	}

	#[test]
	fn test_verify_rejects_tampered_payload() {
		let sig = compute_hmac_sha256(b"whsec_test", b"payload");
		assert!(!verify_hmac_sha256(b"whsec_test", b"payload!", &sig));
	}
}

#[cfg(test)]
mod proptests {
	use super::*;
	use proptest::prelude::*;

	proptest! {
		#[test]
		fn prop_roundtrip(
			secret in proptest::collection::vec(proptest::num::u8::ANY, 1..100),
			payload in proptest::collection::vec(proptest::num::u8::ANY, 0..1000)
		) {
			let sig = compute_hmac_sha256(&secret, &payload);
			prop_assert!(verify_hmac_sha256(&secret, &payload, &sig));
		}

		#[test]
		fn prop_wrong_secret_fails(
			secret1 in proptest::collection::vec(1u8..=255, 1..100),
			secret2 in proptest::collection::vec(1u8..=255, 1..100),
			payload in proptest::collection::vec(proptest::num::u8::ANY, 1..500)
		) {
			prop_assume!(secret1 != secret2);
			let sig = compute_hmac_sha256(&secret1, &payload);
			prop_assert!(!verify_hmac_sha256(&secret2, &payload, &sig));
		}
	}
}
