pub mod handlers;
pub mod login;
pub mod menu;
pub mod pages;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::libs::{
    Database, PasswordGate, SessionStore, TableCatalog, TableRecordManager, TableSchema,
};

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn Database>,
    pub db_name: Arc<str>,
    pub catalog: Arc<TableCatalog>,
    pub gate: Arc<PasswordGate>,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(
        db: Arc<dyn Database>,
        db_name: &str,
        catalog: TableCatalog,
        gate: PasswordGate,
    ) -> Self {
        Self {
            db,
            db_name: Arc::from(db_name),
            catalog: Arc::new(catalog),
            gate: Arc::new(gate),
            sessions: SessionStore::new(),
        }
    }

    pub fn with_sessions(mut self, sessions: SessionStore) -> Self {
        self.sessions = sessions;
        self
    }

    pub fn manager(&self, table: TableSchema) -> TableRecordManager<'_> {
        TableRecordManager::with_schema(self.db.as_ref(), &self.db_name, table)
    }
}

pub fn app_router(state: AppState) -> Router {
    let console = Router::new()
        .route("/", get(handlers::home))
        .route("/navigate", get(handlers::navigate))
        .route(
            "/tables/{table}/create",
            get(handlers::create_form).post(handlers::create_record),
        )
        .route("/tables/{table}/read", get(handlers::read_records))
        .route("/tables/{table}/update", get(handlers::update_choice))
        .route(
            "/tables/{table}/update/{key}",
            get(handlers::update_form).post(handlers::update_record),
        )
        .route("/tables/{table}/delete", get(handlers::delete_choice))
        .route(
            "/tables/{table}/delete/{key}",
            get(handlers::delete_confirm).post(handlers::delete_record),
        )
        .route("/logout", post(login::logout))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            login::require_login,
        ));

    Router::new()
        .merge(console)
        .route("/login", get(login::login_page).post(login::login))
        .route("/health", get(handlers::health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
