// Authgate API server
// Decision: Configuration from environment (.env honoured), strategy chosen by AUTH_TYPE
// Decision: Optional admin seed user so a guarded instance is reachable on first start

use anyhow::{Context, Result};
use authgate_api::{build_app, ApiConfig};
use authgate_core::telemetry::{init_telemetry, TelemetryConfig};
use authgate_core::{CreateUser, Database};
use axum::{extract::Request, ServiceExt};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Missing .env is fine
    let _ = dotenvy::dotenv();

    let mut telemetry_config = TelemetryConfig::from_env();
    if telemetry_config.log_filter.is_none() {
        telemetry_config.log_filter = Some("authgate_api=debug,tower_http=debug,info".to_string());
    }
    telemetry_config.service_version = Some(env!("CARGO_PKG_VERSION").to_string());
    init_telemetry(telemetry_config);

    tracing::info!("authgate-api starting...");

    let config = ApiConfig::from_env().context("Invalid configuration")?;
    tracing::info!(
        auth_type = %config.auth_type,
        session_name = %config.session_name,
        session_duration = config.session_duration,
        "Authentication configured"
    );

    let db = match &config.data_dir {
        Some(dir) => Database::open(dir)
            .await
            .with_context(|| format!("Failed to open data directory {}", dir.display()))?,
        None => {
            tracing::info!("DATA_DIR not set, using in-memory storage");
            Database::new()
        }
    };
    let db = Arc::new(db);

    seed_admin(&config, &db).await?;

    if config.cors_origins.is_empty() {
        tracing::info!("CORS allows any origin");
    } else {
        tracing::info!(origins = ?config.cors_origins, "CORS origins configured");
    }

    let app = build_app(&config, db);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    tracing::info!("HTTP server listening on {}", addr);

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .await
        .context("Server error")?;

    Ok(())
}

/// Create the configured admin user unless an account with that email exists
async fn seed_admin(config: &ApiConfig, db: &Database) -> Result<()> {
    let Some(admin) = &config.admin else {
        return Ok(());
    };

    if !db.search_users_by_email(&admin.email).await.is_empty() {
        tracing::debug!(email = %admin.email, "Admin user already exists");
        return Ok(());
    }

    let user = db
        .create_user(CreateUser {
            email: admin.email.clone(),
            password: admin.password.clone(),
            ..Default::default()
        })
        .await
        .context("Failed to create admin user")?;
    tracing::info!(user_id = %user.id, email = %user.email, "Admin user created");

    Ok(())
}
