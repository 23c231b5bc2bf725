// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User profile repository: customer linkage and the `has_access` flag.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;

use crate::error::DbError;

/// A signed-up user, keyed by the identity provider's user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
	pub id: String,
	pub email: Option<String>,
	pub customer_id: Option<String>,
	pub price_id: Option<String>,
	pub has_access: bool,
	/// Processor timestamp (unix seconds) of the last event that changed `has_access`.
	pub access_event_at: Option<i64>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

/// Result of an attempt to change `has_access`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessChange {
	/// At least one profile was updated.
	Applied,
	/// A matching profile exists but a newer event already decided its access.
	Stale,
	/// No matching profile.
	NotFound,
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, DbError> {
	DateTime::parse_from_rfc3339(value)
		.map(|dt| dt.with_timezone(&Utc))
		.map_err(|e| DbError::Internal(format!("invalid timestamp '{value}': {e}")))
}

fn row_to_profile(row: &SqliteRow) -> Result<UserProfile, DbError> {
	Ok(UserProfile {
		id: row.get("id"),
		email: row.get("email"),
		customer_id: row.get("customer_id"),
		price_id: row.get("price_id"),
		has_access: row.get::<i64, _>("has_access") != 0,
		access_event_at: row.get("access_event_at"),
		created_at: parse_timestamp(&row.get::<String, _>("created_at"))?,
		updated_at: parse_timestamp(&row.get::<String, _>("updated_at"))?,
	})
}

const PROFILE_COLUMNS: &str =
	"id, email, customer_id, price_id, has_access, access_event_at, created_at, updated_at";

#[derive(Clone)]
pub struct ProfileRepository {
	pool: SqlitePool,
}

impl ProfileRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	#[tracing::instrument(skip(self))]
	pub async fn get_profile(&self, id: &str) -> Result<Option<UserProfile>, DbError> {
		let row = sqlx::query(&format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = ?1"))
			.bind(id)
			.fetch_optional(&self.pool)
			.await?;
		row.as_ref().map(row_to_profile).transpose()
	}

	/// Oldest profile with this email, compared case-insensitively.
	#[tracing::instrument(skip(self, email))]
	pub async fn find_by_email(&self, email: &str) -> Result<Option<UserProfile>, DbError> {
		let row = sqlx::query(&format!(
			"SELECT {PROFILE_COLUMNS} FROM profiles WHERE email = ?1 COLLATE NOCASE \
			 ORDER BY created_at ASC LIMIT 1"
		))
		.bind(email)
		.fetch_optional(&self.pool)
		.await?;
		row.as_ref().map(row_to_profile).transpose()
	}

	#[tracing::instrument(skip(self))]
	pub async fn find_by_customer_id(
		&self,
		customer_id: &str,
	) -> Result<Option<UserProfile>, DbError> {
		let row = sqlx::query(&format!(
			"SELECT {PROFILE_COLUMNS} FROM profiles WHERE customer_id = ?1 \
			 ORDER BY created_at ASC LIMIT 1"
		))
		.bind(customer_id)
		.fetch_optional(&self.pool)
		.await?;
		row.as_ref().map(row_to_profile).transpose()
	}

	/// Insert a profile for `id` if none exists; an existing profile only
	/// gains an email when it had none.
	#[tracing::instrument(skip(self, email))]
	pub async fn ensure_profile(
		&self,
		id: &str,
		email: Option<&str>,
	) -> Result<UserProfile, DbError> {
		let now = Utc::now().to_rfc3339();
		sqlx::query(
			r#"
			INSERT INTO profiles (id, email, has_access, created_at, updated_at)
			VALUES (?1, ?2, 0, ?3, ?3)
			ON CONFLICT(id) DO UPDATE SET
				email = COALESCE(profiles.email, excluded.email)
			"#,
		)
		.bind(id)
		.bind(email)
		.bind(&now)
		.execute(&self.pool)
		.await?;

		self.get_profile(id)
			.await?
			.ok_or_else(|| DbError::Internal(format!("profile {id} missing after upsert")))
	}

	/// Grant access for a completed purchase, recording the processor customer
	/// and the purchased price in the same update.
	///
	/// Uses the staleness rule of [`Self::set_access`], so a stale purchase
	/// leaves the linkage untouched too.
	#[tracing::instrument(skip(self))]
	pub async fn grant_purchase(
		&self,
		id: &str,
		customer_id: Option<&str>,
		price_id: Option<&str>,
		event_created: Option<i64>,
	) -> Result<AccessChange, DbError> {
		let result = sqlx::query(
			r#"
			UPDATE profiles SET
				has_access = 1,
				customer_id = COALESCE(?2, customer_id),
				price_id = COALESCE(?3, price_id),
				access_event_at = COALESCE(?4, access_event_at),
				updated_at = ?5
			WHERE id = ?1
				AND (?4 IS NULL OR access_event_at IS NULL OR access_event_at <= ?4)
			"#,
		)
		.bind(id)
		.bind(customer_id)
		.bind(price_id)
		.bind(event_created)
		.bind(Utc::now().to_rfc3339())
		.execute(&self.pool)
		.await?;

		if result.rows_affected() > 0 {
			return Ok(AccessChange::Applied);
		}
		self.unchanged_profile(id).await
	}

	/// Set `has_access` on one profile.
	///
	/// With `event_created`, the change only applies when no newer event has
	/// already set the flag, and the timestamp is remembered. Without it the
	/// change is unconditional.
	#[tracing::instrument(skip(self))]
	pub async fn set_access(
		&self,
		id: &str,
		has_access: bool,
		event_created: Option<i64>,
	) -> Result<AccessChange, DbError> {
		let result = sqlx::query(
			r#"
			UPDATE profiles SET
				has_access = ?2,
				access_event_at = COALESCE(?3, access_event_at),
				updated_at = ?4
			WHERE id = ?1
				AND (?3 IS NULL OR access_event_at IS NULL OR access_event_at <= ?3)
			"#,
		)
		.bind(id)
		.bind(has_access)
		.bind(event_created)
		.bind(Utc::now().to_rfc3339())
		.execute(&self.pool)
		.await?;

		if result.rows_affected() > 0 {
			return Ok(AccessChange::Applied);
		}
		self.unchanged_profile(id).await
	}

	/// Why a guarded update of profile `id` touched no row.
	async fn unchanged_profile(&self, id: &str) -> Result<AccessChange, DbError> {
		let exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profiles WHERE id = ?1")
			.bind(id)
			.fetch_one(&self.pool)
			.await?;
		Ok(if exists > 0 {
			AccessChange::Stale
		} else {
			AccessChange::NotFound
		})
	}

	/// Set `has_access` on every profile linked to `customer_id`, with the
	/// same staleness rule as [`Self::set_access`].
	#[tracing::instrument(skip(self))]
	pub async fn set_access_for_customer(
		&self,
		customer_id: &str,
		has_access: bool,
		event_created: Option<i64>,
	) -> Result<AccessChange, DbError> {
		let result = sqlx::query(
			r#"
			UPDATE profiles SET
				has_access = ?2,
				access_event_at = COALESCE(?3, access_event_at),
				updated_at = ?4
			WHERE customer_id = ?1
				AND (?3 IS NULL OR access_event_at IS NULL OR access_event_at <= ?3)
			"#,
		)
		.bind(customer_id)
		.bind(has_access)
		.bind(event_created)
		.bind(Utc::now().to_rfc3339())
		.execute(&self.pool)
		.await?;

		if result.rows_affected() > 0 {
			tracing::debug!(rows = result.rows_affected(), "access updated for customer");
			return Ok(AccessChange::Applied);
		}
		let exists: i64 =
			sqlx::query_scalar("SELECT COUNT(*) FROM profiles WHERE customer_id = ?1")
				.bind(customer_id)
				.fetch_one(&self.pool)
				.await?;
		Ok(if exists > 0 {
			AccessChange::Stale
		} else {
			AccessChange::NotFound
		})
	}
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
	async fn get_profile(&self, id: &str) -> Result<Option<UserProfile>, DbError>;
	async fn find_by_email(&self, email: &str) -> Result<Option<UserProfile>, DbError>;
	async fn find_by_customer_id(&self, customer_id: &str)
		-> Result<Option<UserProfile>, DbError>;
	async fn ensure_profile(&self, id: &str, email: Option<&str>) -> Result<UserProfile, DbError>;
	async fn grant_purchase(
		&self,
		id: &str,
		customer_id: Option<&str>,
		price_id: Option<&str>,
		event_created: Option<i64>,
	) -> Result<AccessChange, DbError>;
	async fn set_access(
		&self,
		id: &str,
		has_access: bool,
		event_created: Option<i64>,
	) -> Result<AccessChange, DbError>;
	async fn set_access_for_customer(
		&self,
		customer_id: &str,
		has_access: bool,
		event_created: Option<i64>,
	) -> Result<AccessChange, DbError>;
}

#[async_trait]
impl ProfileStore for ProfileRepository {
	async fn get_profile(&self, id: &str) -> Result<Option<UserProfile>, DbError> {
		self.get_profile(id).await
	}

	async fn find_by_email(&self, email: &str) -> Result<Option<UserProfile>, DbError> {
		self.find_by_email(email).await
	}

	async fn find_by_customer_id(
		&self,
		customer_id: &str,
	) -> Result<Option<UserProfile>, DbError> {
		self.find_by_customer_id(customer_id).await
	}

	async fn ensure_profile(&self, id: &str, email: Option<&str>) -> Result<UserProfile, DbError> {
		self.ensure_profile(id, email).await
	}

	async fn grant_purchase(
		&self,
		id: &str,
		customer_id: Option<&str>,
		price_id: Option<&str>,
		event_created: Option<i64>,
	) -> Result<AccessChange, DbError> {
		self.grant_purchase(id, customer_id, price_id, event_created)
			.await
	}

	async fn set_access(
		&self,
		id: &str,
		has_access: bool,
		event_created: Option<i64>,
	) -> Result<AccessChange, DbError> {
		self.set_access(id, has_access, event_created).await
	}

	async fn set_access_for_customer(
		&self,
		customer_id: &str,
		has_access: bool,
		event_created: Option<i64>,
	) -> Result<AccessChange, DbError> {
		self.set_access_for_customer(customer_id, has_access, event_created)
			.await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::create_migrated_test_pool;

	async fn make_repo() -> ProfileRepository {
		ProfileRepository::new(create_migrated_test_pool().await)
	}

	#[tokio::test]
	async fn test_ensure_profile_creates_without_access() {
		let repo = make_repo().await;
		let profile = repo.ensure_profile("user-1", Some("a@example.com")).await.unwrap();
		assert_eq!(profile.id, "user-1");
		assert_eq!(profile.email.as_deref(), Some("a@example.com"));
		assert!(!profile.has_access);
		assert!(profile.customer_id.is_none());
	}

	#[tokio::test]
	async fn test_ensure_profile_is_idempotent_and_keeps_email() {
		let repo = make_repo().await;
		repo.ensure_profile("user-1", Some("a@example.com")).await.unwrap();
		repo.set_access("user-1", true, None).await.unwrap();
		let again = repo.ensure_profile("user-1", Some("b@example.com")).await.unwrap();
		assert_eq!(again.email.as_deref(), Some("a@example.com"));
		assert!(again.has_access);
	}

	#[tokio::test]
	async fn test_find_by_email_ignores_case() {
		let repo = make_repo().await;
		repo.ensure_profile("user-1", Some("Ada@Example.com")).await.unwrap();
		let found = repo.find_by_email("ada@example.com").await.unwrap().unwrap();
		assert_eq!(found.id, "user-1");
		assert!(repo.find_by_email("nobody@example.com").await.unwrap().is_none());
	}

	#[tokio::test]
	async fn test_grant_purchase_links_customer() {
		let repo = make_repo().await;
		repo.ensure_profile("user-1", None).await.unwrap();
		assert_eq!(
			repo.grant_purchase("user-1", Some("cus_1"), Some("price_1"), Some(100))
				.await
				.unwrap(),
			AccessChange::Applied
		);
		let found = repo.find_by_customer_id("cus_1").await.unwrap().unwrap();
		assert_eq!(found.id, "user-1");
		assert_eq!(found.price_id.as_deref(), Some("price_1"));
		assert!(found.has_access);
		assert_eq!(found.access_event_at, Some(100));

		// None leaves the stored value in place.
		repo.grant_purchase("user-1", None, Some("price_2"), Some(200))
			.await
			.unwrap();
		let found = repo.get_profile("user-1").await.unwrap().unwrap();
		assert_eq!(found.customer_id.as_deref(), Some("cus_1"));
		assert_eq!(found.price_id.as_deref(), Some("price_2"));
	}

	#[tokio::test]
	async fn test_stale_purchase_keeps_linkage() {
		let repo = make_repo().await;
		repo.ensure_profile("user-1", None).await.unwrap();
		repo.grant_purchase("user-1", Some("cus_new"), Some("price_new"), Some(200))
			.await
			.unwrap();
		repo.set_access("user-1", false, Some(300)).await.unwrap();

		assert_eq!(
			repo.grant_purchase("user-1", Some("cus_old"), Some("price_old"), Some(100))
				.await
				.unwrap(),
			AccessChange::Stale
		);
		let profile = repo.get_profile("user-1").await.unwrap().unwrap();
		assert_eq!(profile.customer_id.as_deref(), Some("cus_new"));
		assert_eq!(profile.price_id.as_deref(), Some("price_new"));
		assert!(!profile.has_access);
		assert_eq!(profile.access_event_at, Some(300));
	}

	#[tokio::test]
	async fn test_grant_purchase_missing_profile() {
		let repo = make_repo().await;
		assert_eq!(
			repo.grant_purchase("ghost", Some("cus_1"), None, Some(100))
				.await
				.unwrap(),
			AccessChange::NotFound
		);
	}

	#[tokio::test]
	async fn test_set_access_rejects_older_events() {
		let repo = make_repo().await;
		repo.ensure_profile("user-1", None).await.unwrap();

		assert_eq!(
			repo.set_access("user-1", true, Some(200)).await.unwrap(),
			AccessChange::Applied
		);
		assert_eq!(
			repo.set_access("user-1", false, Some(100)).await.unwrap(),
			AccessChange::Stale
		);
		let profile = repo.get_profile("user-1").await.unwrap().unwrap();
		assert!(profile.has_access);
		assert_eq!(profile.access_event_at, Some(200));

		assert_eq!(
			repo.set_access("user-1", false, Some(300)).await.unwrap(),
			AccessChange::Applied
		);
		assert!(!repo.get_profile("user-1").await.unwrap().unwrap().has_access);
	}

	#[tokio::test]
	async fn test_set_access_without_timestamp_is_unconditional() {
		let repo = make_repo().await;
		repo.ensure_profile("user-1", None).await.unwrap();
		repo.set_access("user-1", true, Some(500)).await.unwrap();
		assert_eq!(
			repo.set_access("user-1", false, None).await.unwrap(),
			AccessChange::Applied
		);
		let profile = repo.get_profile("user-1").await.unwrap().unwrap();
		assert!(!profile.has_access);
		assert_eq!(profile.access_event_at, Some(500));
	}

	#[tokio::test]
	async fn test_set_access_for_customer() {
		let repo = make_repo().await;
		repo.ensure_profile("user-1", None).await.unwrap();
		repo.grant_purchase("user-1", Some("cus_1"), None, Some(100))
			.await
			.unwrap();

		assert_eq!(
			repo.set_access_for_customer("cus_1", false, Some(50)).await.unwrap(),
			AccessChange::Stale
		);
		assert_eq!(
			repo.set_access_for_customer("cus_1", false, Some(150)).await.unwrap(),
			AccessChange::Applied
		);
		assert_eq!(
			repo.set_access_for_customer("cus_unknown", false, Some(150))
				.await
				.unwrap(),
			AccessChange::NotFound
		);
		assert!(!repo.get_profile("user-1").await.unwrap().unwrap().has_access);
	}
}
