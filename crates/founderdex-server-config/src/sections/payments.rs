// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Payment processor configuration.

use founderdex_common_secret::SecretString;
use founderdex_common_webhook::DEFAULT_TOLERANCE_SECS;
use serde::Deserialize;

const DEFAULT_API_BASE: &str = "https://api.stripe.com";

/// Payments configuration (runtime, fully resolved).
#[derive(Debug, Clone)]
pub struct PaymentsConfig {
	pub stripe_secret_key: Option<SecretString>,
	pub webhook_secret: Option<SecretString>,
	/// The one price that grants access. Checkout completions for any other
	/// price leave the buyer's access unchanged.
	pub price_id: Option<String>,
	pub signature_tolerance_secs: u64,
	/// Record processed event ids and ignore redeliveries and stale events.
	pub event_ledger: bool,
	pub api_base: String,
}

impl Default for PaymentsConfig {
	fn default() -> Self {
		PaymentsConfigLayer::default().finalize()
	}
}

impl PaymentsConfig {
	pub fn is_configured(&self) -> bool {
		self.stripe_secret_key.is_some()
	}

	pub fn webhooks_enabled(&self) -> bool {
		self.webhook_secret.is_some()
	}
}

/// Payments configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentsConfigLayer {
	#[serde(default)]
	pub stripe_secret_key: Option<SecretString>,
	#[serde(default)]
	pub webhook_secret: Option<SecretString>,
	#[serde(default)]
	pub price_id: Option<String>,
	#[serde(default)]
	pub signature_tolerance_secs: Option<u64>,
	#[serde(default)]
	pub event_ledger: Option<bool>,
	#[serde(default)]
	pub api_base: Option<String>,
}

impl PaymentsConfigLayer {
	pub fn merge(&mut self, other: PaymentsConfigLayer) {
		if other.stripe_secret_key.is_some() {
			self.stripe_secret_key = other.stripe_secret_key;
		}
		if other.webhook_secret.is_some() {
			self.webhook_secret = other.webhook_secret;
		}
		if other.price_id.is_some() {
			self.price_id = other.price_id;
		}
		if other.signature_tolerance_secs.is_some() {
			self.signature_tolerance_secs = other.signature_tolerance_secs;
		}
		if other.event_ledger.is_some() {
			self.event_ledger = other.event_ledger;
		}
		if other.api_base.is_some() {
			self.api_base = other.api_base;
		}
	}

	pub fn finalize(self) -> PaymentsConfig {
		PaymentsConfig {
			stripe_secret_key: self.stripe_secret_key,
			webhook_secret: self.webhook_secret,
			price_id: self.price_id.filter(|p| !p.trim().is_empty()),
			signature_tolerance_secs: self
				.signature_tolerance_secs
				.unwrap_or(DEFAULT_TOLERANCE_SECS),
			event_ledger: self.event_ledger.unwrap_or(true),
			api_base: self
				.api_base
				.unwrap_or_else(|| DEFAULT_API_BASE.to_string())
				.trim_end_matches('/')
				.to_string(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use founderdex_common_secret::Secret;

	#[test]
	fn test_defaults() {
		let config = PaymentsConfig::default();
		assert!(!config.is_configured());
		assert!(!config.webhooks_enabled());
		assert_eq!(config.signature_tolerance_secs, 300);
		assert!(config.event_ledger);
		assert_eq!(config.api_base, "https://api.stripe.com");
		assert!(config.price_id.is_none());
	}

	#[test]
	fn test_blank_price_is_unset() {
		let config = PaymentsConfigLayer {
			price_id: Some("  ".to_string()),
			..Default::default()
		}
		.finalize();
		assert!(config.price_id.is_none());
	}

	#[test]
	fn test_deserialize_from_toml() {
		let layer: PaymentsConfigLayer = toml::from_str(
			r#"
stripe_secret_key = "sk_test_123"
price_id = "price_abc"
event_ledger = false
"#,
		)
		.unwrap();
		let config = layer.finalize();
		assert_eq!(config.stripe_secret_key.unwrap().expose(), "sk_test_123");
		assert_eq!(config.price_id.as_deref(), Some("price_abc"));
		assert!(!config.event_ledger);
	}

	#[test]
	fn test_debug_hides_keys() {
		let config = PaymentsConfigLayer {
			stripe_secret_key: Some(Secret::new("sk_live_secret".to_string())),
			webhook_secret: Some(Secret::new("whsec_secret".to_string())),
			..Default::default()
		}
		.finalize();
		let out = format!("{config:?}");
		assert!(!out.contains("sk_live_secret"));
		assert!(!out.contains("whsec_secret"));
	}
}
