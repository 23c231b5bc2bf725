// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Ledger of received payment processor events.
//!
//! An event id is claimed before its handler runs. A second delivery of the
//! same id finds the claim and is skipped, unless the first attempt ended in
//! [`FAILED_OUTCOME`], in which case the claim is taken again.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqlitePool;
use sqlx::Row;

use crate::error::DbError;

/// Outcome of an event whose handler returned an error. Such events can be
/// claimed again by a resend.
pub const FAILED_OUTCOME: &str = "failed";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentEventRecord {
	pub event_id: String,
	pub event_type: String,
	pub customer_id: Option<String>,
	/// Processor `created` timestamp, unix seconds.
	pub created_at: i64,
	pub received_at: String,
	pub processed_at: Option<String>,
	pub outcome: Option<String>,
}

#[derive(Clone)]
pub struct PaymentEventRepository {
	pool: SqlitePool,
}

impl PaymentEventRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Returns `false` when the event id was already claimed and did not fail.
	///
	/// Re-claiming a failed event clears its previous outcome.
	#[tracing::instrument(skip(self))]
	pub async fn claim_event(
		&self,
		event_id: &str,
		event_type: &str,
		customer_id: Option<&str>,
		created_at: i64,
	) -> Result<bool, DbError> {
		let result = sqlx::query(
			r#"
			INSERT INTO payment_events (event_id, event_type, customer_id, created_at, received_at)
			VALUES (?1, ?2, ?3, ?4, ?5)
			ON CONFLICT(event_id) DO UPDATE SET
				received_at = excluded.received_at,
				processed_at = NULL,
				outcome = NULL
			WHERE payment_events.outcome = ?6
			"#,
		)
		.bind(event_id)
		.bind(event_type)
		.bind(customer_id)
		.bind(created_at)
		.bind(Utc::now().to_rfc3339())
		.bind(FAILED_OUTCOME)
		.execute(&self.pool)
		.await?;

		Ok(result.rows_affected() == 1)
	}

	#[tracing::instrument(skip(self))]
	pub async fn record_outcome(&self, event_id: &str, outcome: &str) -> Result<(), DbError> {
		let result = sqlx::query(
			"UPDATE payment_events SET processed_at = ?2, outcome = ?3 WHERE event_id = ?1",
		)
		.bind(event_id)
		.bind(Utc::now().to_rfc3339())
		.bind(outcome)
		.execute(&self.pool)
		.await?;

		if result.rows_affected() == 0 {
			return Err(DbError::NotFound(format!("payment event {event_id}")));
		}
		Ok(())
	}

	#[tracing::instrument(skip(self))]
	pub async fn get_event(&self, event_id: &str) -> Result<Option<PaymentEventRecord>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT event_id, event_type, customer_id, created_at, received_at, processed_at, outcome
			FROM payment_events WHERE event_id = ?1
			"#,
		)
		.bind(event_id)
		.fetch_optional(&self.pool)
		.await?;

		Ok(row.map(|row| PaymentEventRecord {
			event_id: row.get("event_id"),
			event_type: row.get("event_type"),
			customer_id: row.get("customer_id"),
			created_at: row.get("created_at"),
			received_at: row.get("received_at"),
			processed_at: row.get("processed_at"),
			outcome: row.get("outcome"),
		}))
	}
}

#[async_trait]
pub trait PaymentEventStore: Send + Sync {
	async fn claim_event(
		&self,
		event_id: &str,
		event_type: &str,
		customer_id: Option<&str>,
		created_at: i64,
	) -> Result<bool, DbError>;
	async fn record_outcome(&self, event_id: &str, outcome: &str) -> Result<(), DbError>;
	async fn get_event(&self, event_id: &str) -> Result<Option<PaymentEventRecord>, DbError>;
}

#[async_trait]
impl PaymentEventStore for PaymentEventRepository {
	async fn claim_event(
		&self,
		event_id: &str,
		event_type: &str,
		customer_id: Option<&str>,
		created_at: i64,
	) -> Result<bool, DbError> {
		self.claim_event(event_id, event_type, customer_id, created_at)
			.await
	}

	async fn record_outcome(&self, event_id: &str, outcome: &str) -> Result<(), DbError> {
		self.record_outcome(event_id, outcome).await
	}

	async fn get_event(&self, event_id: &str) -> Result<Option<PaymentEventRecord>, DbError> {
		self.get_event(event_id).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::create_migrated_test_pool;

	#[tokio::test]
	async fn test_claim_is_exclusive() {
		let repo = PaymentEventRepository::new(create_migrated_test_pool().await);
		assert!(repo
			.claim_event("evt_1", "invoice.paid", Some("cus_1"), 100)
			.await
			.unwrap());
		assert!(!repo
			.claim_event("evt_1", "invoice.paid", Some("cus_1"), 100)
			.await
			.unwrap());
		assert!(repo
			.claim_event("evt_2", "invoice.paid", None, 101)
			.await
			.unwrap());
	}

	#[tokio::test]
	async fn test_failed_event_can_be_claimed_again() {
		let repo = PaymentEventRepository::new(create_migrated_test_pool().await);
		assert!(repo
			.claim_event("evt_1", "checkout.session.completed", None, 100)
			.await
			.unwrap());
		repo.record_outcome("evt_1", FAILED_OUTCOME).await.unwrap();

		assert!(repo
			.claim_event("evt_1", "checkout.session.completed", None, 100)
			.await
			.unwrap());
		let reclaimed = repo.get_event("evt_1").await.unwrap().unwrap();
		assert_eq!(reclaimed.outcome, None);
		assert!(reclaimed.processed_at.is_none());

		// A claim still in flight is not handed out twice.
		assert!(!repo
			.claim_event("evt_1", "checkout.session.completed", None, 100)
			.await
			.unwrap());

		repo.record_outcome("evt_1", "granted").await.unwrap();
		assert!(!repo
			.claim_event("evt_1", "checkout.session.completed", None, 100)
			.await
			.unwrap());
	}

	#[tokio::test]
	async fn test_record_outcome() {
		let repo = PaymentEventRepository::new(create_migrated_test_pool().await);
		repo.claim_event("evt_1", "customer.subscription.deleted", Some("cus_1"), 100)
			.await
			.unwrap();
		let pending = repo.get_event("evt_1").await.unwrap().unwrap();
		assert!(pending.processed_at.is_none());

		repo.record_outcome("evt_1", "revoked").await.unwrap();
		let done = repo.get_event("evt_1").await.unwrap().unwrap();
		assert_eq!(done.outcome.as_deref(), Some("revoked"));
		assert!(done.processed_at.is_some());
		assert_eq!(done.customer_id.as_deref(), Some("cus_1"));
	}

	#[tokio::test]
	async fn test_record_outcome_unknown_event() {
		let repo = PaymentEventRepository::new(create_migrated_test_pool().await);
		let result = repo.record_outcome("evt_missing", "ignored").await;
		assert!(matches!(result, Err(DbError::NotFound(_))));
	}
}
