//! Admin console entry point
//!
//! Run with:
//! ```bash
//! cargo run -p admin-client --bin admin-console
//! ```
//!
//! Configuration is loaded from environment variables.

use admin_client::{
    AdminClient, ClientOptions, FileTokenStore, Request, ServerError, Session,
};
use admin_common::{try_init_tracing_with_config, AppConfig, AppError, AppResult, TracingConfig};
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(AppError::from(e).exit_code());
        }
    };

    let tracing_config = TracingConfig::for_environment(config.app.env, &config.log);
    if let Err(e) = try_init_tracing_with_config(tracing_config) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    // wss endpoints need a process-wide TLS crypto provider
    let _ = rustls::crypto::ring::default_provider().install_default();

    if let Err(e) = run(config).await {
        error!(error = %e, "Admin console failed");
        std::process::exit(e.exit_code());
    }
}

async fn run(config: AppConfig) -> AppResult<()> {
    info!(
        env = ?config.app.env,
        url = %config.client.url,
        max_attempts = config.client.reconnect_max_attempts,
        "Starting admin console"
    );

    let store = Arc::new(FileTokenStore::new(&config.auth.token_store_path));
    let client = AdminClient::websocket(ClientOptions::from(&config), store);
    let _session = Session::attach(&client);

    client.on_connection(|connected| info!(connected, "Connection status changed"));

    let _log_all = client.on_any(|message| {
        let kind = message
            .get("type")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default();
        info!(kind, "Inbound message");
    });

    let _errors = client.on_message(admin_client::message_types::ERROR, |payload| {
        let error = ServerError::from_payload(&payload);
        if !error.is_unknown_message_type() {
            warn!(message = %error.message, "Server reported an error");
        }
    });

    let _shop = client.on_message(admin_client::message_types::SHOP_STATUS, |payload| {
        info!(status = %payload, "Shop status");
    });

    client
        .connect()
        .await
        .map_err(|e| AppError::Connection(e.to_string()))?;

    authenticate(&client, &config)?;

    client
        .request(Request::GetShopStatus)
        .map_err(|e| AppError::Request(e.to_string()))?;

    tokio::signal::ctrl_c().await?;

    info!("Shutting down");
    client.disconnect();

    Ok(())
}

/// Explicit token, then cached token, then credentials
fn authenticate(client: &AdminClient, config: &AppConfig) -> AppResult<()> {
    let result = if let Some(token) = &config.auth.admin_token {
        info!("Authenticating with configured token");
        client.authenticate_with_token(token)
    } else if let Some(token) = client.cached_token() {
        info!("Authenticating with cached token");
        client.authenticate_with_token(&token)
    } else if let (Some(email), Some(password)) =
        (&config.auth.admin_email, &config.auth.admin_password)
    {
        info!(email = %email, "Authenticating with credentials");
        client.authenticate(email, password)
    } else {
        warn!("No credentials configured, continuing unauthenticated");
        Ok(())
    };

    result.map_err(|e| AppError::Request(e.to_string()))
}
