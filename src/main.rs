//! battle-admin - HTTP backend for the battle game administration tool.

use std::sync::Arc;

use battle_admin::cli::Cli;
use battle_admin::config::{Config, ConnectionConfig, REPORT_CONNECTION_ENV, WRITE_CONNECTION_ENV};
use battle_admin::db::MySqlConnector;
use battle_admin::error::Result;
use battle_admin::handlers::HandlerContext;
use battle_admin::logging::{init_logging, LogTarget};
use battle_admin::server;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    // A missing .env file is not an error
    let _ = dotenvy::dotenv();

    let cli = Cli::parse_args();
    init_logging(&LogTarget::from_option(cli.log_file.clone()));

    if let Err(e) = run(cli).await {
        error!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let mut config = Config::load_from_file(&config_path)?;

    // Precedence: CLI arguments, then config file, then environment
    config.apply_env_defaults();
    cli.apply_overrides(&mut config.server);

    log_connection("Write", config.database.write_connection(), WRITE_CONNECTION_ENV);
    log_connection("Report", config.database.report_connection(), REPORT_CONNECTION_ENV);

    let ctx = Arc::new(HandlerContext::new(
        config.database.clone(),
        Arc::new(MySqlConnector),
    ));
    let router = server::build_router(ctx, &config.server);

    server::serve(&config.server, router).await
}

/// Requests still start without a connection string; they fail with a 500.
fn log_connection(family: &str, connection: Option<&str>, env_var: &str) {
    match connection.map(ConnectionConfig::from_connection_string) {
        Some(Ok(conn)) => info!("{} connection: {}", family, conn.display_string()),
        Some(Err(e)) => warn!("{} connection string is invalid: {}", family, e),
        None => warn!("{} connection not configured (set {})", family, env_var),
    }
}
