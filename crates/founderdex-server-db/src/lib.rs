// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SQLite storage for the Founderdex server.
//!
//! Repositories follow one shape: a `*Repository` holding a [`SqlitePool`]
//! with inherent async methods, and a `*Store` trait it implements so
//! services can be tested against fakes.

pub mod error;
pub mod founder;
pub mod migrations;
pub mod payment_event;
pub mod pool;
pub mod profile;
pub mod search;
pub mod testing;

pub use error::{DbError, Result};
pub use founder::{FounderRepository, FounderStore, NewEducation, NewExperience, NewFounder};
pub use migrations::run_migrations;
pub use payment_event::{
	PaymentEventRecord, PaymentEventRepository, PaymentEventStore, FAILED_OUTCOME,
};
pub use pool::{create_pool, create_pool_with, ping, PoolSettings};
pub use profile::{AccessChange, ProfileRepository, ProfileStore, UserProfile};
pub use search::{FounderSearchResult, FounderSearchService, SearchError};
pub use sqlx::sqlite::SqlitePool;
