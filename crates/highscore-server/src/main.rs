//! Highscore backend binary.
//!
//! Loads configuration, installs logging, binds the configured
//! [`Datastore`] adapter and serves the HTTP API until Ctrl-C or
//! `SIGTERM`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `highscore-config.yaml` (defaults if absent)
//! 2. Initialize structured logging (tracing)
//! 3. Bind the store: in-memory simulator or `PostgreSQL` pool
//! 4. Serve HTTP until a shutdown signal, draining for the grace period
//! 5. Close the database pool

mod config;
mod error;

use std::path::Path;
use std::sync::Arc;

use highscore_api::{AppState, shutdown_signal, start_server};
use highscore_db::{PostgresConfig, PostgresDatastore, PostgresPool};
use highscore_store::{Datastore, Simulator};
use tracing::{Instrument, info, info_span};
use tracing_subscriber::EnvFilter;

use crate::config::{Backend, HighscoreConfig, LogFormat, LoggingConfig, StoreConfig};
use crate::error::AppMainError;

/// Path of the configuration file, relative to the working directory.
const CONFIG_PATH: &str = "highscore-config.yaml";

#[tokio::main]
async fn main() -> Result<(), AppMainError> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);

    let span = info_span!("service", service = %config.service.name);
    run(config).instrument(span).await
}

async fn run(config: HighscoreConfig) -> Result<(), AppMainError> {
    info!(
        backend = ?config.store.backend,
        port = config.server.port,
        "highscore-server starting"
    );

    // 3. Bind the store.
    let (store, pool) = open_store(&config.store).await?;
    let state = Arc::new(AppState::new(store));

    // 4. Serve.
    let server_config = config.server.to_server_config();
    start_server(&server_config, state, shutdown_signal()).await?;

    // 5. Release connections.
    if let Some(pool) = pool {
        pool.close().await;
    }

    info!("highscore-server stopped");
    Ok(())
}

/// Load configuration from [`CONFIG_PATH`], or defaults if it does not
/// exist. Environment overrides apply either way.
fn load_config() -> Result<HighscoreConfig, AppMainError> {
    let config_path = Path::new(CONFIG_PATH);
    if config_path.exists() {
        Ok(HighscoreConfig::from_file(config_path)?)
    } else {
        Ok(HighscoreConfig::from_env()?)
    }
}

fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

/// Build the configured adapter. The pool, when there is one, is
/// returned separately so it can be closed on shutdown.
async fn open_store(
    store: &StoreConfig,
) -> Result<(Arc<dyn Datastore>, Option<PostgresPool>), AppMainError> {
    match store.backend {
        Backend::Simulator => {
            info!("using in-memory simulator; data is lost on exit");
            Ok((Arc::new(Simulator::new()), None))
        }
        Backend::Postgres => {
            let pg_config =
                PostgresConfig::new(&store.postgres_url).with_max_connections(store.max_connections);
            let pool = PostgresPool::connect(&pg_config).await?;
            if store.create_schema {
                pool.ensure_schema().await?;
            }
            Ok((Arc::new(PostgresDatastore::new(&pool)), Some(pool)))
        }
    }
}
