// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: built-in defaults, TOML files and environment variables.

use std::path::PathBuf;

use tracing::{debug, trace};

use crate::env::load_secret_env;
use crate::error::ConfigError;
use crate::layer::ServerConfigLayer;
use crate::sections::{
	AuthConfigLayer, DatabaseConfigLayer, HttpConfigLayer, LogFormat, LoggingConfigLayer,
	PaymentsConfigLayer, SearchConfigLayer,
};

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<ServerConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(ServerConfigLayer::default())
	}
}

/// TOML file configuration source. A missing file is not an error.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new("/etc/founderdex/server.toml")
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(ServerConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: ServerConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: FOUNDERDEX_SERVER_<SECTION>_<FIELD>
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(ServerConfigLayer {
			http: Some(load_http_from_env()?),
			database: Some(load_database_from_env()?),
			logging: Some(load_logging_from_env()?),
			search: Some(load_search_from_env()?),
			auth: Some(load_auth_from_env()?),
			payments: Some(load_payments_from_env()?),
		})
	}
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_bool(name: &str) -> Option<bool> {
	env_var(name).map(|v| v.eq_ignore_ascii_case("true") || v == "1")
}

fn env_parse<T: std::str::FromStr>(name: &str, kind: &str) -> Result<Option<T>, ConfigError> {
	match env_var(name) {
		Some(v) => v.trim().parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("invalid {kind} value '{v}'"),
		}),
		None => Ok(None),
	}
}

fn env_list(name: &str) -> Option<Vec<String>> {
	env_var(name).map(|s| {
		s.split(',')
			.map(|s| s.trim().to_string())
			.filter(|s| !s.is_empty())
			.collect()
	})
}

fn secret_env(
	name: &str,
) -> Result<Option<founderdex_common_secret::SecretString>, ConfigError> {
	load_secret_env(name).map_err(|e| ConfigError::Secret(e.to_string()))
}

fn load_http_from_env() -> Result<HttpConfigLayer, ConfigError> {
	Ok(HttpConfigLayer {
		host: env_var("FOUNDERDEX_SERVER_HOST"),
		port: env_parse("FOUNDERDEX_SERVER_PORT", "u16")?,
		base_url: env_var("FOUNDERDEX_SERVER_BASE_URL"),
		allowed_origins: env_list("FOUNDERDEX_SERVER_ALLOWED_ORIGINS"),
	})
}

fn load_database_from_env() -> Result<DatabaseConfigLayer, ConfigError> {
	Ok(DatabaseConfigLayer {
		url: env_var("FOUNDERDEX_SERVER_DATABASE_URL"),
		max_connections: env_parse("FOUNDERDEX_SERVER_DATABASE_MAX_CONNECTIONS", "u32")?,
		busy_timeout_secs: env_parse("FOUNDERDEX_SERVER_DATABASE_BUSY_TIMEOUT_SECS", "u64")?,
	})
}

fn load_logging_from_env() -> Result<LoggingConfigLayer, ConfigError> {
	let format = match env_var("FOUNDERDEX_SERVER_LOG_FORMAT") {
		Some(v) => Some(LogFormat::parse(&v).ok_or_else(|| ConfigError::InvalidValue {
			key: "FOUNDERDEX_SERVER_LOG_FORMAT".to_string(),
			message: format!("expected 'pretty' or 'json', got '{v}'"),
		})?),
		None => None,
	};

	Ok(LoggingConfigLayer {
		level: env_var("FOUNDERDEX_SERVER_LOG_LEVEL"),
		format,
	})
}

fn load_search_from_env() -> Result<SearchConfigLayer, ConfigError> {
	Ok(SearchConfigLayer {
		default_page_size: env_parse("FOUNDERDEX_SERVER_SEARCH_DEFAULT_PAGE_SIZE", "u32")?,
		max_page_size: env_parse("FOUNDERDEX_SERVER_SEARCH_MAX_PAGE_SIZE", "u32")?,
		block_direct_access: env_bool("FOUNDERDEX_SERVER_SEARCH_BLOCK_DIRECT_ACCESS"),
	})
}

fn load_auth_from_env() -> Result<AuthConfigLayer, ConfigError> {
	Ok(AuthConfigLayer {
		environment: env_var("FOUNDERDEX_SERVER_ENV"),
		supabase_url: env_var("FOUNDERDEX_SERVER_SUPABASE_URL"),
		supabase_anon_key: secret_env("FOUNDERDEX_SERVER_SUPABASE_ANON_KEY")?,
		supabase_service_role_key: secret_env("FOUNDERDEX_SERVER_SUPABASE_SERVICE_ROLE_KEY")?,
		session_cookie_name: env_var("FOUNDERDEX_SERVER_SESSION_COOKIE_NAME"),
		secure_cookies: env_bool("FOUNDERDEX_SERVER_SECURE_COOKIES"),
	})
}

fn load_payments_from_env() -> Result<PaymentsConfigLayer, ConfigError> {
	Ok(PaymentsConfigLayer {
		stripe_secret_key: secret_env("FOUNDERDEX_SERVER_STRIPE_SECRET_KEY")?,
		webhook_secret: secret_env("FOUNDERDEX_SERVER_STRIPE_WEBHOOK_SECRET")?,
		price_id: env_var("FOUNDERDEX_SERVER_STRIPE_PRICE_ID"),
		signature_tolerance_secs: env_parse(
			"FOUNDERDEX_SERVER_STRIPE_SIGNATURE_TOLERANCE_SECS",
			"u64",
		)?,
		event_ledger: env_bool("FOUNDERDEX_SERVER_STRIPE_EVENT_LEDGER"),
		api_base: env_var("FOUNDERDEX_SERVER_STRIPE_API_BASE"),
	})
}
