// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Logging configuration.

use serde::Deserialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	#[default]
	Pretty,
	Json,
}

impl LogFormat {
	pub fn parse(value: &str) -> Option<Self> {
		match value.to_ascii_lowercase().as_str() {
			"pretty" | "text" => Some(Self::Pretty),
			"json" => Some(Self::Json),
			_ => None,
		}
	}
}

/// Logging configuration (runtime, fully resolved).
#[derive(Debug, Clone)]
pub struct LoggingConfig {
	/// Default `EnvFilter` directive; `RUST_LOG` takes precedence.
	pub level: String,
	pub format: LogFormat,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		LoggingConfigLayer::default().finalize()
	}
}

/// Logging configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfigLayer {
	#[serde(default)]
	pub level: Option<String>,
	#[serde(default)]
	pub format: Option<LogFormat>,
}

impl LoggingConfigLayer {
	pub fn merge(&mut self, other: LoggingConfigLayer) {
		if other.level.is_some() {
			self.level = other.level;
		}
		if other.format.is_some() {
			self.format = other.format;
		}
	}

	pub fn finalize(self) -> LoggingConfig {
		LoggingConfig {
			level: self
				.level
				.unwrap_or_else(|| "info,founderdex_server=debug".to_string()),
			format: self.format.unwrap_or_default(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let config = LoggingConfig::default();
		assert!(config.level.starts_with("info"));
		assert_eq!(config.format, LogFormat::Pretty);
	}

	#[test]
	fn test_parse_format() {
		assert_eq!(LogFormat::parse("JSON"), Some(LogFormat::Json));
		assert_eq!(LogFormat::parse("text"), Some(LogFormat::Pretty));
		assert_eq!(LogFormat::parse("xml"), None);
	}
}
