use axum::{
    Form, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::libs::{CrudError, DeleteOutcome, FieldValues, KeyChoice, TableSchema};
use crate::server::AppState;
use crate::server::menu::{MenuSelection, Operation};
use crate::server::pages::{self, Notice};

#[derive(Debug, Error)]
pub enum PageError {
    #[error("Unknown table selected: {0}")]
    UnknownTable(String),
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        (StatusCode::NOT_FOUND, Html(pages::error_page(&self.to_string()))).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct KeyQuery {
    pub key: Option<String>,
}

fn crud_status(err: &CrudError) -> StatusCode {
    match err {
        CrudError::NoColumns(_) | CrudError::RecordNotFound { .. } => StatusCode::NOT_FOUND,
        CrudError::UnknownColumn { .. }
        | CrudError::KeyColumnNotEditable { .. }
        | CrudError::NoChanges(_) => StatusCode::BAD_REQUEST,
        CrudError::QueryFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn cataloged(state: &AppState, table: &str) -> Result<TableSchema, PageError> {
    state
        .catalog
        .get(table)
        .cloned()
        .ok_or_else(|| PageError::UnknownTable(table.to_string()))
}

fn page(
    state: &AppState,
    status: StatusCode,
    operation: Operation,
    table: &str,
    notices: &[Notice],
    body: &str,
) -> Response {
    let html = pages::console_page(&state.catalog, operation, Some(table), notices, body);
    (status, Html(html)).into_response()
}

fn failure(state: &AppState, operation: Operation, table: &str, err: &CrudError) -> Response {
    page(
        state,
        crud_status(err),
        operation,
        table,
        &[Notice::Error(err.to_string())],
        "",
    )
}

pub async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy" }))
}

pub async fn home(State(state): State<AppState>) -> Html<String> {
    Html(pages::home(&state.catalog))
}

pub async fn navigate(Query(selection): Query<MenuSelection>) -> Redirect {
    Redirect::to(&selection.operation.path(&selection.table))
}

pub async fn create_form(
    State(state): State<AppState>,
    Path(table): Path<String>,
) -> Result<Response, PageError> {
    let schema = cataloged(&state, &table)?;
    let manager = state.manager(schema.clone());
    Ok(match manager.editable_columns().await {
        Ok(columns) => page(
            &state,
            StatusCode::OK,
            Operation::Create,
            &table,
            &[],
            &pages::create_form(&schema, &columns, &FieldValues::new()),
        ),
        Err(err) => failure(&state, Operation::Create, &table, &err),
    })
}

pub async fn create_record(
    State(state): State<AppState>,
    Path(table): Path<String>,
    Form(values): Form<FieldValues>,
) -> Result<Response, PageError> {
    let schema = cataloged(&state, &table)?;
    let manager = state.manager(schema.clone());
    let columns = match manager.editable_columns().await {
        Ok(columns) => columns,
        Err(err) => return Ok(failure(&state, Operation::Create, &table, &err)),
    };

    Ok(match manager.create(&values).await {
        Ok(created) => {
            let message = match created.key {
                Some(key) => format!(
                    "Record created successfully in {table}! {} = {key}",
                    schema.key_column
                ),
                None => format!("Record created successfully in {table}!"),
            };
            page(
                &state,
                StatusCode::CREATED,
                Operation::Create,
                &table,
                &[Notice::Success(message)],
                &pages::create_form(&schema, &columns, &FieldValues::new()),
            )
        }
        Err(err) => page(
            &state,
            crud_status(&err),
            Operation::Create,
            &table,
            &[Notice::Error(err.to_string())],
            &pages::create_form(&schema, &columns, &values),
        ),
    })
}

pub async fn read_records(
    State(state): State<AppState>,
    Path(table): Path<String>,
) -> Result<Response, PageError> {
    let schema = cataloged(&state, &table)?;
    let manager = state.manager(schema);
    Ok(match manager.read().await {
        Ok(result) => page(
            &state,
            StatusCode::OK,
            Operation::Read,
            &table,
            &[],
            &pages::result_table(&result),
        ),
        Err(err) => failure(&state, Operation::Read, &table, &err),
    })
}

/// Key picker shared by update and delete. A `key` query parameter skips
/// straight to that record's page.
async fn key_choice(
    state: AppState,
    operation: Operation,
    table: String,
    query: KeyQuery,
) -> Result<Response, PageError> {
    let schema = cataloged(&state, &table)?;
    if let Some(path) = query
        .key
        .as_deref()
        .and_then(|key| operation.record_path(&table, key))
    {
        return Ok(Redirect::to(&path).into_response());
    }

    let manager = state.manager(schema.clone());
    Ok(match manager.list_keys().await {
        Ok(KeyChoice::NoRecords) => page(
            &state,
            StatusCode::OK,
            operation,
            &table,
            &[Notice::Info(format!("No records found in {table}."))],
            "",
        ),
        Ok(KeyChoice::Keys(keys)) => page(
            &state,
            StatusCode::OK,
            operation,
            &table,
            &[],
            &pages::key_choice(operation, &schema, &keys),
        ),
        Err(err) => failure(&state, operation, &table, &err),
    })
}

pub async fn update_choice(
    State(state): State<AppState>,
    Path(table): Path<String>,
    Query(query): Query<KeyQuery>,
) -> Result<Response, PageError> {
    key_choice(state, Operation::Update, table, query).await
}

pub async fn delete_choice(
    State(state): State<AppState>,
    Path(table): Path<String>,
    Query(query): Query<KeyQuery>,
) -> Result<Response, PageError> {
    key_choice(state, Operation::Delete, table, query).await
}

pub async fn update_form(
    State(state): State<AppState>,
    Path((table, key)): Path<(String, String)>,
) -> Result<Response, PageError> {
    let schema = cataloged(&state, &table)?;
    let manager = state.manager(schema);
    Ok(match manager.edit_form(&key).await {
        Ok(form) => page(
            &state,
            StatusCode::OK,
            Operation::Update,
            &table,
            &[],
            &pages::edit_form(&table, &form),
        ),
        Err(err) => failure(&state, Operation::Update, &table, &err),
    })
}

pub async fn update_record(
    State(state): State<AppState>,
    Path((table, key)): Path<(String, String)>,
    Form(values): Form<FieldValues>,
) -> Result<Response, PageError> {
    let schema = cataloged(&state, &table)?;
    let manager = state.manager(schema);
    if let Err(err) = manager.update(&key, &values).await {
        return Ok(failure(&state, Operation::Update, &table, &err));
    }

    let notice = Notice::Success(format!("Record Updated successfully in {table}!"));
    Ok(match manager.edit_form(&key).await {
        Ok(form) => page(
            &state,
            StatusCode::OK,
            Operation::Update,
            &table,
            &[notice],
            &pages::edit_form(&table, &form),
        ),
        Err(err) => page(
            &state,
            StatusCode::OK,
            Operation::Update,
            &table,
            &[notice, Notice::Error(err.to_string())],
            "",
        ),
    })
}

pub async fn delete_confirm(
    State(state): State<AppState>,
    Path((table, key)): Path<(String, String)>,
) -> Result<Response, PageError> {
    let schema = cataloged(&state, &table)?;
    let manager = state.manager(schema.clone());
    Ok(match manager.fetch_record(&key).await {
        Ok(Some(record)) => page(
            &state,
            StatusCode::OK,
            Operation::Delete,
            &table,
            &[],
            &pages::delete_confirm(&table, &record),
        ),
        Ok(None) => page(
            &state,
            StatusCode::NOT_FOUND,
            Operation::Delete,
            &table,
            &[Notice::Info(format!(
                "No record with {} = {key} in {table}.",
                schema.key_column
            ))],
            "",
        ),
        Err(err) => failure(&state, Operation::Delete, &table, &err),
    })
}

pub async fn delete_record(
    State(state): State<AppState>,
    Path((table, key)): Path<(String, String)>,
) -> Result<Response, PageError> {
    let schema = cataloged(&state, &table)?;
    let manager = state.manager(schema.clone());
    Ok(match manager.delete(&key).await {
        Ok(DeleteOutcome::Deleted) => page(
            &state,
            StatusCode::OK,
            Operation::Delete,
            &table,
            &[Notice::Success(format!(
                "Record Deleted successfully from {table}!"
            ))],
            "",
        ),
        Ok(DeleteOutcome::NothingToDelete) => page(
            &state,
            StatusCode::OK,
            Operation::Delete,
            &table,
            &[Notice::Info(format!(
                "Nothing to delete: no record with {} = {key} in {table}.",
                schema.key_column
            ))],
            "",
        ),
        Err(err) => failure(&state, Operation::Delete, &table, &err),
    })
}
