// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Supabase Auth client for Founderdex.
//!
//! Covers the four calls the server makes: PKCE code exchange after the
//! auth callback, resolving an access token to a user, admin user creation
//! for payers who never signed in, and sign-out.
//!
//! The anon key and service role key are held in [`SecretString`] and never
//! logged.
//!
//! [`SecretString`]: founderdex_common_secret::SecretString

pub mod client;
pub mod error;
pub mod provider;
pub mod types;

pub use client::SupabaseAuthClient;
pub use error::AuthError;
pub use founderdex_common_http::RetryConfig;
pub use provider::IdentityProvider;
pub use types::{Identity, Session};
