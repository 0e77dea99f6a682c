use crate::libs::orm::{Database, ExecSummary, ResultSet};
use crate::libs::query_builder::Statement;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Executor, Row, Statement as _, ValueRef};
use std::str::FromStr;

/// SQLite-backed database. Column introspection goes through
/// `pragma_table_info`, so the schema name passed by callers is ignored.
pub struct SqliteDatabase {
    pool: SqlitePool,
}

impl SqliteDatabase {
    /// A private in-memory database. The pool is pinned to one connection
    /// that never expires, since each connection would otherwise see its own
    /// empty database.
    pub async fn in_memory() -> sqlx::Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    /// Runs a multi-statement script such as a schema definition.
    pub async fn run_script(&self, script: &str) -> sqlx::Result<()> {
        sqlx::raw_sql(script).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    fn columns_statement(&self, _db_name: &str, table: &str) -> Statement {
        Statement::new("SELECT name FROM pragma_table_info(?) ORDER BY cid").bind(table.to_string())
    }

    async fn execute(&self, stmt: &Statement) -> sqlx::Result<ExecSummary> {
        let mut query = sqlx::query(stmt.sql());
        for param in stmt.params() {
            query = query.bind(param.as_deref());
        }
        let result = query.execute(&self.pool).await?;
        Ok(ExecSummary {
            rows_affected: result.rows_affected(),
            last_insert_id: Some(result.last_insert_rowid()).filter(|id| *id > 0),
        })
    }

    async fn fetch(&self, stmt: &Statement) -> sqlx::Result<ResultSet> {
        let mut query = sqlx::query(stmt.sql());
        for param in stmt.params() {
            query = query.bind(param.as_deref());
        }
        let rows = query.fetch_all(&self.pool).await?;

        let columns: Vec<String> = match rows.first() {
            Some(row) => row.columns().iter().map(|c| c.name().to_string()).collect(),
            None => {
                let prepared = (&self.pool).prepare(stmt.sql()).await?;
                prepared
                    .columns()
                    .iter()
                    .map(|c| c.name().to_string())
                    .collect()
            }
        };

        let rows = rows
            .iter()
            .map(|row| (0..row.len()).map(|i| decode_cell(row, i)).collect())
            .collect();
        Ok(ResultSet { columns, rows })
    }
}

fn decode_cell(row: &SqliteRow, index: usize) -> Value {
    match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => return Value::Null,
        Ok(_) => {}
        Err(_) => return Value::Null,
    }
    if let Ok(v) = row.try_get::<i64, _>(index) {
        return Value::from(v);
    }
    if let Ok(v) = row.try_get::<f64, _>(index) {
        return Value::from(v);
    }
    if let Ok(v) = row.try_get::<String, _>(index) {
        return Value::from(v);
    }
    match row.try_get::<Vec<u8>, _>(index) {
        Ok(bytes) => Value::from(String::from_utf8_lossy(&bytes).into_owned()),
        Err(_) => Value::Null,
    }
}
