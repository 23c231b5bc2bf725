// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Founderdex server binary.

use std::path::PathBuf;

use axum::http::HeaderValue;
use clap::{Parser, Subcommand};
use founderdex_server::{create_app_state, create_router, seed::seed_founders, ServerError};
use founderdex_server_config::{LogFormat, LoggingConfig, ServerConfig};
use founderdex_server_db::{
	create_pool_with, run_migrations, FounderRepository, PoolSettings, SqlitePool,
};
use tower_http::{
	cors::{AllowOrigin, Any, CorsLayer},
	trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Founderdex server - founders search with paid access.
#[derive(Parser, Debug)]
#[command(name = "founderdex-server", about = "Founderdex HTTP server", version)]
struct Args {
	/// Config file to read instead of /etc/founderdex/server.toml
	#[arg(long, global = true)]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Run the HTTP server (default)
	Serve,
	/// Apply database migrations and exit
	Migrate,
	/// Load founders from a JSON file
	Seed {
		/// JSON array of founders with nested education and experience
		file: PathBuf,
	},
	/// Show version information
	Version,
}

fn init_tracing(logging: &LoggingConfig) {
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| logging.level.clone().into());
	let registry = tracing_subscriber::registry().with(filter);
	match logging.format {
		LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
		LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
	}
}

fn load_config(path: Option<PathBuf>) -> Result<ServerConfig, ServerError> {
	let config = match path {
		Some(path) => founderdex_server_config::load_config_with_file(path)?,
		None => founderdex_server_config::load_config()?,
	};
	Ok(config)
}

async fn open_database(config: &ServerConfig) -> Result<SqlitePool, ServerError> {
	let settings = PoolSettings {
		max_connections: config.database.max_connections,
		busy_timeout: config.database.busy_timeout(),
	};
	let pool = create_pool_with(&config.database.url, settings).await?;
	let applied = run_migrations(&pool).await?;
	tracing::debug!(applied, "migrations checked");
	Ok(pool)
}

async fn serve(config: &ServerConfig, pool: SqlitePool) -> Result<(), ServerError> {
	let state = create_app_state(pool, config);

	let origins: Vec<HeaderValue> = config
		.http
		.allowed_origins
		.iter()
		.filter_map(|origin| origin.parse().ok())
		.collect();

	let app = create_router(state)
		.layer(TraceLayer::new_for_http())
		.layer(
			CorsLayer::new()
				.allow_origin(AllowOrigin::list(origins))
				.allow_methods(Any)
				.allow_headers(Any),
		);

	let addr = config.socket_addr();
	let listener = tokio::net::TcpListener::bind(&addr)
		.await
		.map_err(|source| ServerError::Bind {
			addr: addr.clone(),
			source,
		})?;
	tracing::info!("listening on {}", addr);

	tokio::select! {
		result = axum::serve(listener, app) => {
			result.map_err(ServerError::Serve)?;
		}
		_ = tokio::signal::ctrl_c() => {
			tracing::info!("Received shutdown signal");
		}
	}

	tracing::info!("Server shutdown complete");
	Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	if let Some(Command::Version) = args.command {
		println!("founderdex-server {}", env!("CARGO_PKG_VERSION"));
		return Ok(());
	}

	dotenvy::dotenv().ok();

	let config = load_config(args.config)?;
	init_tracing(&config.logging);

	tracing::info!(
		host = %config.http.host,
		port = config.http.port,
		database = %config.database.url,
		"starting founderdex-server"
	);

	let pool = open_database(&config).await?;

	match args.command.unwrap_or(Command::Serve) {
		Command::Serve => serve(&config, pool).await?,
		Command::Migrate => println!("migrations applied"),
		Command::Seed { file } => {
			let repo = FounderRepository::new(pool);
			let count = seed_founders(&repo, &file).await?;
			println!("seeded {count} founders from {}", file.display());
		}
		Command::Version => {}
	}

	Ok(())
}
