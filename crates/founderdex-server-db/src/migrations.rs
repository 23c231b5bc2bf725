// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Embedded schema migrations.
//!
//! Each migration runs once, inside its own transaction, and is recorded in
//! `schema_migrations`.

use chrono::Utc;
use sqlx::sqlite::SqlitePool;

use crate::error::DbError;

struct Migration {
	version: i64,
	name: &'static str,
	sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
	Migration {
		version: 1,
		name: "founders",
		sql: include_str!("../migrations/001_founders.sql"),
	},
	Migration {
		version: 2,
		name: "profiles",
		sql: include_str!("../migrations/002_profiles.sql"),
	},
	Migration {
		version: 3,
		name: "payment_events",
		sql: include_str!("../migrations/003_payment_events.sql"),
	},
];

/// Apply every migration not yet recorded. Returns how many were applied.
#[tracing::instrument(skip(pool))]
pub async fn run_migrations(pool: &SqlitePool) -> Result<usize, DbError> {
	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS schema_migrations (
			version INTEGER PRIMARY KEY NOT NULL,
			name TEXT NOT NULL,
			applied_at TEXT NOT NULL
		)
		"#,
	)
	.execute(pool)
	.await?;

	let mut applied = 0;
	for migration in MIGRATIONS {
		let existing: Option<i64> =
			sqlx::query_scalar("SELECT version FROM schema_migrations WHERE version = ?1")
				.bind(migration.version)
				.fetch_optional(pool)
				.await?;
		if existing.is_some() {
			continue;
		}

		let mut tx = pool.begin().await?;
		sqlx::raw_sql(migration.sql).execute(&mut *tx).await?;
		sqlx::query("INSERT INTO schema_migrations (version, name, applied_at) VALUES (?1, ?2, ?3)")
			.bind(migration.version)
			.bind(migration.name)
			.bind(Utc::now().to_rfc3339())
			.execute(&mut *tx)
			.await?;
		tx.commit().await?;

		tracing::info!(
			version = migration.version,
			name = migration.name,
			"applied migration"
		);
		applied += 1;
	}

	Ok(applied)
}
