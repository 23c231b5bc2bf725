// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Centralized configuration management for the Founderdex server.
//!
//! This crate provides:
//! - Layered configuration from defaults, a TOML file and the environment
//! - Type-safe sections with cross-field validation
//! - Consistent environment variable naming (`FOUNDERDEX_SERVER_*`)
//!
//! # Usage
//!
//! ```ignore
//! use founderdex_server_config::load_config;
//!
//! let config = load_config()?;
//! println!("Server listening on {}", config.socket_addr());
//! ```

pub mod env;
pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use env::{load_secret_env, SecretEnvError};
pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use tracing::{debug, info};

/// Fully resolved server configuration.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
	pub http: HttpConfig,
	pub database: DatabaseConfig,
	pub logging: LoggingConfig,
	pub search: SearchConfig,
	pub auth: AuthConfig,
	pub payments: PaymentsConfig,
}

impl ServerConfig {
	/// Get the socket address string for binding.
	pub fn socket_addr(&self) -> String {
		format!("{}:{}", self.http.host, self.http.port)
	}
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`FOUNDERDEX_SERVER_*`)
/// 2. Config file (`/etc/founderdex/server.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

/// Load configuration from environment only (for testing or simple deployments).
pub fn load_config_from_env() -> Result<ServerConfig, ConfigError> {
	let mut merged = ServerConfigLayer::default();
	merged.merge(EnvSource.load()?);
	finalize(merged)
}

fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize a merged layer into resolved config.
pub fn finalize(layer: ServerConfigLayer) -> Result<ServerConfig, ConfigError> {
	let http = layer.http.unwrap_or_default().finalize();
	let database = layer.database.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();
	let search = layer.search.unwrap_or_default().finalize();
	let auth = layer.auth.unwrap_or_default().finalize();
	let payments = layer.payments.unwrap_or_default().finalize();

	validate_config(&auth, &payments)?;

	info!(
		host = %http.host,
		port = http.port,
		database = %database.url,
		environment = %auth.environment,
		auth_configured = auth.is_configured(),
		payments_configured = payments.is_configured(),
		webhooks_enabled = payments.webhooks_enabled(),
		event_ledger = payments.event_ledger,
		"Server configuration loaded"
	);

	Ok(ServerConfig {
		http,
		database,
		logging,
		search,
		auth,
		payments,
	})
}

/// Validate cross-field configuration rules.
fn validate_config(auth: &AuthConfig, payments: &PaymentsConfig) -> Result<(), ConfigError> {
	if !auth.is_production() || !payments.is_configured() {
		return Ok(());
	}

	if payments.webhook_secret.is_none() {
		return Err(ConfigError::Validation(
			"FOUNDERDEX_SERVER_STRIPE_SECRET_KEY is set in production without \
			 FOUNDERDEX_SERVER_STRIPE_WEBHOOK_SECRET. Payment events could not be verified."
				.to_string(),
		));
	}

	if payments.price_id.is_none() {
		return Err(ConfigError::Validation(
			"FOUNDERDEX_SERVER_STRIPE_PRICE_ID must be set in production when payments are \
			 configured. Without it no payment grants access."
				.to_string(),
		));
	}

	if !auth.secure_cookies {
		return Err(ConfigError::Validation(
			"FOUNDERDEX_SERVER_SECURE_COOKIES=false is not allowed in production.".to_string(),
		));
	}

	Ok(())
}
