// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Stripe object and event types, reduced to the fields Founderdex reads.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// Event types the payment state machine distinguishes.
pub mod event_types {
	pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";
	pub const CHECKOUT_SESSION_EXPIRED: &str = "checkout.session.expired";
	pub const CUSTOMER_SUBSCRIPTION_UPDATED: &str = "customer.subscription.updated";
	pub const CUSTOMER_SUBSCRIPTION_DELETED: &str = "customer.subscription.deleted";
	pub const INVOICE_PAID: &str = "invoice.paid";
	pub const INVOICE_PAYMENT_FAILED: &str = "invoice.payment_failed";
}

/// Stripe fields that hold either an id or the expanded object.
fn expandable_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
	D: Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Expandable {
		Id(String),
		Object { id: String },
	}

	Ok(Option::<Expandable>::deserialize(deserializer)?.map(|e| match e {
		Expandable::Id(id) => id,
		Expandable::Object { id } => id,
	}))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutMode {
	/// One-time payment.
	Payment,
	/// Recurring subscription.
	Subscription,
}

impl CheckoutMode {
	pub fn as_str(&self) -> &'static str {
		match self {
			CheckoutMode::Payment => "payment",
			CheckoutMode::Subscription => "subscription",
		}
	}
}

impl fmt::Display for CheckoutMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for CheckoutMode {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"payment" => Ok(CheckoutMode::Payment),
			"subscription" => Ok(CheckoutMode::Subscription),
			other => Err(format!("unknown checkout mode '{other}'")),
		}
	}
}

/// Parameters for creating a hosted checkout session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSessionParams {
	pub price_id: String,
	pub mode: CheckoutMode,
	pub success_url: String,
	pub cancel_url: String,
	/// The signed-in user's id, echoed back on `checkout.session.completed`.
	pub client_reference_id: Option<String>,
	pub customer_id: Option<String>,
	pub customer_email: Option<String>,
}

impl CheckoutSessionParams {
	/// Form fields for `POST /v1/checkout/sessions`.
	pub fn form_fields(&self) -> Vec<(String, String)> {
		let mut fields = vec![
			("mode".to_string(), self.mode.as_str().to_string()),
			("line_items[0][price]".to_string(), self.price_id.clone()),
			("line_items[0][quantity]".to_string(), "1".to_string()),
			("success_url".to_string(), self.success_url.clone()),
			("cancel_url".to_string(), self.cancel_url.clone()),
			("allow_promotion_codes".to_string(), "true".to_string()),
		];

		if let Some(reference) = &self.client_reference_id {
			fields.push(("client_reference_id".to_string(), reference.clone()));
		}

		match (&self.customer_id, &self.customer_email) {
			(Some(customer), _) => fields.push(("customer".to_string(), customer.clone())),
			(None, email) => {
				if self.mode == CheckoutMode::Payment {
					fields.push(("customer_creation".to_string(), "always".to_string()));
				}
				if let Some(email) = email {
					fields.push(("customer_email".to_string(), email.clone()));
				}
			}
		}

		fields
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Price {
	pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LineItem {
	#[serde(default)]
	pub price: Option<Price>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct List<T> {
	#[serde(default = "Vec::new")]
	pub data: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CustomerDetails {
	#[serde(default)]
	pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CheckoutSession {
	pub id: String,
	#[serde(default, deserialize_with = "expandable_id")]
	pub customer: Option<String>,
	#[serde(default)]
	pub customer_details: Option<CustomerDetails>,
	#[serde(default)]
	pub client_reference_id: Option<String>,
	#[serde(default)]
	pub line_items: Option<List<LineItem>>,
	#[serde(default)]
	pub url: Option<String>,
}

impl CheckoutSession {
	/// Price of the first line item. Only present when `line_items` was expanded.
	pub fn price_id(&self) -> Option<&str> {
		self.line_items
			.as_ref()?
			.data
			.first()?
			.price
			.as_ref()
			.map(|p| p.id.as_str())
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Customer {
	pub id: String,
	#[serde(default)]
	pub email: Option<String>,
	#[serde(default)]
	pub deleted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Subscription {
	pub id: String,
	#[serde(default, deserialize_with = "expandable_id")]
	pub customer: Option<String>,
	#[serde(default)]
	pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InvoicePriceDetails {
	#[serde(default, deserialize_with = "expandable_id")]
	pub price: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InvoiceLinePricing {
	#[serde(default)]
	pub price_details: Option<InvoicePriceDetails>,
}

/// Invoice line item. Older API versions put the price at `price`, newer
/// ones under `pricing.price_details.price`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InvoiceLineItem {
	#[serde(default)]
	pub price: Option<Price>,
	#[serde(default)]
	pub pricing: Option<InvoiceLinePricing>,
}

impl InvoiceLineItem {
	pub fn price_id(&self) -> Option<&str> {
		if let Some(price) = &self.price {
			return Some(price.id.as_str());
		}
		self.pricing
			.as_ref()?
			.price_details
			.as_ref()?
			.price
			.as_deref()
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Invoice {
	pub id: String,
	#[serde(default, deserialize_with = "expandable_id")]
	pub customer: Option<String>,
	pub lines: List<InvoiceLineItem>,
}

impl Invoice {
	pub fn price_id(&self) -> Option<&str> {
		self.lines.data.first()?.price_id()
	}
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EventData {
	pub object: serde_json::Value,
}

/// A webhook event envelope.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WebhookEvent {
	pub id: String,
	#[serde(rename = "type")]
	pub event_type: String,
	/// Unix seconds.
	pub created: i64,
	pub data: EventData,
	#[serde(default)]
	pub livemode: bool,
}

impl WebhookEvent {
	/// Deserialize `data.object` as a typed Stripe object.
	pub fn object<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
		T::deserialize(&self.data.object)
	}

	/// `data.object.customer` as an id, when present.
	pub fn customer_id(&self) -> Option<String> {
		match self.data.object.get("customer")? {
			serde_json::Value::String(id) => Some(id.clone()),
			serde_json::Value::Object(obj) => obj.get("id")?.as_str().map(str::to_string),
			_ => None,
		}
	}
}
