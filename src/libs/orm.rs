use crate::libs::query_builder::Statement;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};

/// Outcome of a statement that changed data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecSummary {
    pub rows_affected: u64,
    /// Key assigned by the database to the row an INSERT created, when known.
    pub last_insert_id: Option<i64>,
}

/// Rows returned by a SELECT together with the column names the driver
/// reported for it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Every value of `column`, rendered as text.
    pub fn column_text(&self, column: &str) -> Vec<String> {
        match self.column_index(column) {
            Some(i) => self
                .rows
                .iter()
                .map(|row| row.get(i).map(cell_text).unwrap_or_default())
                .collect(),
            None => Vec::new(),
        }
    }
}

/// Text form of a cell: NULL is empty, strings are unquoted.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// A live database the console issues statements against.
#[async_trait]
pub trait Database: Send + Sync {
    /// Short driver name for logs.
    fn backend(&self) -> &'static str;

    /// Statement listing the columns of `table`, one name per row, in
    /// declaration order.
    fn columns_statement(&self, db_name: &str, table: &str) -> Statement;

    async fn execute(&self, stmt: &Statement) -> sqlx::Result<ExecSummary>;

    async fn fetch(&self, stmt: &Statement) -> sqlx::Result<ResultSet>;
}

/// Runs an INSERT, UPDATE or DELETE. Driver errors are logged and yield `None`.
pub async fn execute_query(db: &dyn Database, stmt: &Statement) -> Option<ExecSummary> {
    match db.execute(stmt).await {
        Ok(summary) => {
            debug!(
                backend = db.backend(),
                sql = stmt.sql(),
                rows = summary.rows_affected,
                "query successful"
            );
            Some(summary)
        }
        Err(err) => {
            error!(backend = db.backend(), sql = stmt.sql(), "query failed: {err}");
            None
        }
    }
}

/// Runs a SELECT and materializes every row. Driver errors are logged and
/// yield `None`.
pub async fn read_query(db: &dyn Database, stmt: &Statement) -> Option<ResultSet> {
    match db.fetch(stmt).await {
        Ok(result) => {
            debug!(
                backend = db.backend(),
                sql = stmt.sql(),
                rows = result.len(),
                "read successful"
            );
            Some(result)
        }
        Err(err) => {
            error!(backend = db.backend(), sql = stmt.sql(), "read failed: {err}");
            None
        }
    }
}

/// Ordered column names of `table`. Empty when the table does not exist or
/// the lookup fails.
pub async fn table_columns(db: &dyn Database, db_name: &str, table: &str) -> Vec<String> {
    let stmt = db.columns_statement(db_name, table);
    match read_query(db, &stmt).await {
        Some(result) => result
            .rows
            .iter()
            .filter_map(|row| row.first())
            .map(cell_text)
            .filter(|name| !name.is_empty())
            .collect(),
        None => Vec::new(),
    }
}
