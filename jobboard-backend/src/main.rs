//! Job board backend server.
//!
//! Entry point: configuration loading, database migrations, and HTTP server
//! startup.

use std::sync::Arc;

use jobboard_auth::JwtAuthenticator;
use tokio::net::TcpListener;

use jobboard_backend::state::{AppState, AuthSettings};

mod cli;
mod config_helpers;
mod tracing_setup;

use cli::CliArgs;
use config_helpers::{database_config_from_config, mail_client_from_config, parse_bind_address};
use tracing_setup::install_tracing_from_config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    if args.help_requested {
        CliArgs::print_help();
        return Ok(());
    }

    // Resolve config path: CLI > environment variable
    let config_path = args
        .config_path
        .or_else(|| std::env::var("JOBBOARD_CONFIG_PATH").ok());

    let config = jobboard_config::load_config(config_path.as_deref())
        .map_err(|e| anyhow::anyhow!("failed to load configuration: {e}"))?;
    jobboard_config::validate_config(&config)
        .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;

    install_tracing_from_config(&config.logging);

    // Create and migrate database
    let db_cfg = database_config_from_config(&config);
    let db_pool = jobboard_db::create_pool(&db_cfg).await?;
    run_migrations(&db_cfg, &db_pool).await?;

    // Build authenticator and app state
    let secret = config
        .auth
        .jwt_secret
        .clone()
        .ok_or_else(|| anyhow::anyhow!("auth.jwt_secret must be configured"))?;
    let jwt = JwtAuthenticator::new_hs256(secret);
    let authenticator = Arc::new(jwt.clone());

    let mailer = mail_client_from_config(&config);
    if mailer.is_none() {
        tracing::warn!("no mailer.tool_path configured; password reset emails will not be sent");
    }

    let auth_settings = AuthSettings {
        session_ttl_hours: config.auth.session_ttl_hours as u64,
        reset_token_ttl_minutes: config.auth.reset_token_ttl_minutes,
        reset_link_base: config.mailer.reset_link_base.clone(),
    };

    let state = Arc::new(AppState::new(
        db_pool,
        authenticator,
        jwt,
        mailer,
        auth_settings,
    ));

    let app = jobboard_backend::build_router(state);

    let addr = parse_bind_address(&config.server.host, config.server.port);
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(host = %config.server.host, port = config.server.port, "server listening");

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

/// Run database migrations based on the database type.
async fn run_migrations(
    db_cfg: &jobboard_db::DbConnectionConfig,
    db_pool: &jobboard_db::DbPool,
) -> anyhow::Result<()> {
    let url_lower = db_cfg.url.to_lowercase();

    let migrate_res = if url_lower.starts_with("postgres") || url_lower.contains("postgresql") {
        tracing::info!("applying Postgres migrations");
        jobboard_migrations::postgres_migrator().run(db_pool).await
    } else if url_lower.starts_with("mysql") {
        tracing::info!("applying MySQL migrations");
        jobboard_migrations::mysql_migrator().run(db_pool).await
    } else {
        tracing::info!("applying SQLite migrations");
        jobboard_migrations::sqlite_migrator().run(db_pool).await
    };

    match migrate_res {
        Ok(_) => {
            tracing::info!("database migrations applied successfully");
            Ok(())
        }
        Err(e) => {
            tracing::error!(%e, "failed to apply database migrations");
            Err(anyhow::anyhow!("failed to apply database migrations: {e}"))
        }
    }
}
