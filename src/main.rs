use mortgage_console::server::{AppState, app_router};
use mortgage_console::{MySqlDatabase, PasswordGate, SessionStore, get_configuration};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let settings = match get_configuration() {
        Ok(settings) => settings,
        Err(err) => {
            error!("Failed to load configuration: {err}");
            std::process::exit(1);
        }
    };
    let address = match settings.console.listen_address().await {
        Ok(address) => address,
        Err(err) => {
            error!("{err}");
            std::process::exit(1);
        }
    };

    let db = MySqlDatabase::connect(&settings.database).await;
    let state = AppState::new(
        Arc::new(db),
        &settings.database.database,
        settings.console.catalog(),
        PasswordGate::new(settings.console.password.clone()),
    )
    .with_sessions(SessionStore::with_idle_timeout(
        settings.console.session_idle_timeout(),
    ));

    let listener = match tokio::net::TcpListener::bind(address).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("Failed to bind {address}: {err}");
            std::process::exit(1);
        }
    };
    info!("Mortgage Management System listening on http://{address}");

    if let Err(err) = axum::serve(listener, app_router(state)).await {
        error!("Server error: {err}");
        std::process::exit(1);
    }
}
