// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Loading secrets from the environment.
//!
//! `NAME_FILE` takes priority over `NAME`, so secrets can be mounted as files
//! instead of being placed in the process environment.

use std::path::PathBuf;

use founderdex_common_secret::SecretString;

#[derive(Debug, thiserror::Error)]
pub enum SecretEnvError {
	#[error("failed to read secret file {path} (from {var}): {source}")]
	FileRead {
		var: String,
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("secret file {path} (from {var}) is empty")]
	EmptyFile { var: String, path: PathBuf },
}

/// Load a secret from `{name}_FILE` or `{name}`.
///
/// Returns `Ok(None)` when neither is set or the value is empty.
pub fn load_secret_env(name: &str) -> Result<Option<SecretString>, SecretEnvError> {
	let file_var = format!("{name}_FILE");
	if let Some(path) = std::env::var(&file_var).ok().filter(|p| !p.is_empty()) {
		let path = PathBuf::from(path);
		let content = std::fs::read_to_string(&path).map_err(|e| SecretEnvError::FileRead {
			var: file_var.clone(),
			path: path.clone(),
			source: e,
		})?;
		let value = content.trim().to_string();
		if value.is_empty() {
			return Err(SecretEnvError::EmptyFile {
				var: file_var,
				path,
			});
		}
		tracing::debug!(var = %file_var, "loaded secret from file");
		return Ok(Some(SecretString::new(value)));
	}

	Ok(std::env::var(name)
		.ok()
		.filter(|v| !v.is_empty())
		.map(SecretString::new))
}
