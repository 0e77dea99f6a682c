use crate::libs::orm::{Database, ExecSummary, ResultSet};
use crate::libs::query_builder::Statement;
use crate::libs::settings::DatabaseSettings;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::{Column, Executor, Row, Statement as _, ValueRef};
use tracing::{error, info};

const MAX_CONNECTIONS: u32 = 5;

pub struct MySqlDatabase {
    pool: MySqlPool,
}

impl MySqlDatabase {
    /// Connects eagerly. When that fails the error is logged and a lazy pool
    /// is returned instead, so every later operation reports a query failure.
    pub async fn connect(settings: &DatabaseSettings) -> Self {
        let options = settings.connect_options();
        match MySqlPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options.clone())
            .await
        {
            Ok(pool) => {
                info!(
                    host = %settings.host,
                    port = settings.port,
                    database = %settings.database,
                    "MySQL database connection successful"
                );
                Self { pool }
            }
            Err(err) => {
                error!(
                    host = %settings.host,
                    port = settings.port,
                    "MySQL database connection failed: {err}"
                );
                Self {
                    pool: MySqlPoolOptions::new()
                        .max_connections(MAX_CONNECTIONS)
                        .connect_lazy_with(options),
                }
            }
        }
    }
}

#[async_trait]
impl Database for MySqlDatabase {
    fn backend(&self) -> &'static str {
        "mysql"
    }

    fn columns_statement(&self, db_name: &str, table: &str) -> Statement {
        information_schema_columns(db_name, table)
    }

    async fn execute(&self, stmt: &Statement) -> sqlx::Result<ExecSummary> {
        let mut query = sqlx::query(stmt.sql());
        for param in stmt.params() {
            query = query.bind(param.as_deref());
        }
        let result = query.execute(&self.pool).await?;
        Ok(ExecSummary {
            rows_affected: result.rows_affected(),
            last_insert_id: inserted_id(result.last_insert_id()),
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

/// Column names of `table` in `db_name`, in declaration order. The name is
/// cast because some servers report it with a binary collation.
fn information_schema_columns(db_name: &str, table: &str) -> Statement {
    Statement::new(
        "SELECT CAST(`COLUMN_NAME` AS CHAR) AS `COLUMN_NAME` \
         FROM `INFORMATION_SCHEMA`.`COLUMNS` \
         WHERE `TABLE_SCHEMA` = ? AND `TABLE_NAME` = ? \
         ORDER BY `ORDINAL_POSITION`",
    )
    .bind(db_name.to_string())
    .bind(table.to_string())
}

/// MySQL reports 0 when the statement generated no AUTO_INCREMENT value.
fn inserted_id(raw: u64) -> Option<i64> {
    match raw {
        0 => None,
        id => i64::try_from(id).ok(),
    }
}

fn decode_cell(row: &MySqlRow, index: usize) -> Value {
    match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => return Value::Null,
        Ok(_) => {}
        Err(_) => return Value::Null,
    }
    if let Ok(v) = row.try_get::<i64, _>(index) {
        return Value::from(v);
    }
    if let Ok(v) = row.try_get::<u64, _>(index) {
        return Value::from(v);
    }
    if let Ok(v) = row.try_get::<f64, _>(index) {
        return Value::from(v);
    }
    if let Ok(v) = row.try_get::<String, _>(index) {
        return Value::from(v);
    }
    if let Ok(v) = row.try_get::<NaiveDate, _>(index) {
        return Value::from(v.to_string());
    }
    if let Ok(v) = row.try_get::<NaiveDateTime, _>(index) {
        return Value::from(v.to_string());
    }
    if let Ok(v) = row.try_get::<NaiveTime, _>(index) {
        return Value::from(v.to_string());
    }
    // DECIMAL and binary-collated text arrive as length-encoded strings
    match row.try_get_unchecked::<String, _>(index) {
        Ok(v) => Value::from(v),
        Err(_) => Value::Null,
    }
}
