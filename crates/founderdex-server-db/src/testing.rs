// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

/// A single-connection in-memory pool. One connection keeps every query on
/// the same in-memory database.
pub async fn create_test_pool() -> SqlitePool {
	let options = SqliteConnectOptions::from_str(":memory:")
		.unwrap()
		.foreign_keys(true);
	SqlitePoolOptions::new()
		.max_connections(1)
		.connect_with(options)
		.await
		.unwrap()
}

/// In-memory pool with every migration applied.
pub async fn create_migrated_test_pool() -> SqlitePool {
	let pool = create_test_pool().await;
	crate::migrations::run_migrations(&pool).await.unwrap();
	pool
}
