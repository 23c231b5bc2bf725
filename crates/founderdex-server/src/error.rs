// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use founderdex_server_config::ConfigError;
use founderdex_server_db::DbError;
use thiserror::Error;

/// Errors that stop the server from starting or serving.
#[derive(Debug, Error)]
pub enum ServerError {
	#[error("configuration error: {0}")]
	Config(#[from] ConfigError),

	#[error("database error: {0}")]
	Db(#[from] DbError),

	#[error("failed to bind {addr}: {source}")]
	Bind {
		addr: String,
		#[source]
		source: std::io::Error,
	},

	#[error("server error: {0}")]
	Serve(#[source] std::io::Error),
}
