use crate::libs::orm::{Database, ResultSet, cell_text, execute_query, read_query, table_columns};
use crate::libs::query_builder::QueryBuilder;
use crate::libs::schema::{TableCatalog, TableSchema};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;
use tracing::info;

/// Text submitted for each column, keyed by column name.
pub type FieldValues = HashMap<String, String>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CrudError {
    #[error("no columns found for table {0}")]
    NoColumns(String),
    #[error("column {column} does not exist in table {table}")]
    UnknownColumn { table: String, column: String },
    #[error("{column} is the key of {table} and cannot be edited")]
    KeyColumnNotEditable { table: String, column: String },
    #[error("no values to update in {0}")]
    NoChanges(String),
    #[error("no record with {column} = {key} in {table}")]
    RecordNotFound {
        table: String,
        column: String,
        key: String,
    },
    #[error("query against {0} failed")]
    QueryFailed(String),
}

/// One row of a table, identified by its key value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub key: String,
    pub fields: Vec<(String, Value)>,
}

impl Record {
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields.iter().find(|(c, _)| c == column).map(|(_, v)| v)
    }

    pub fn text(&self, column: &str) -> Option<String> {
        self.get(column).map(cell_text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Created {
    pub key: Option<String>,
}

/// Keys a user can pick from before updating or deleting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyChoice {
    NoRecords,
    Keys(Vec<String>),
}

/// Editable fields of an existing record, pre-filled with its current values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditForm {
    pub key_column: String,
    pub key: String,
    pub fields: Vec<(String, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Updated {
    pub rows_affected: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NothingToDelete,
}

/// Create/read/update/delete against one table, driven by the table's
/// introspected columns and its cataloged key column.
pub struct TableRecordManager<'a> {
    db: &'a dyn Database,
    db_name: &'a str,
    table: TableSchema,
}

impl<'a> TableRecordManager<'a> {
    pub fn new(db: &'a dyn Database, db_name: &'a str, catalog: &TableCatalog, table: &str) -> Self {
        Self::with_schema(db, db_name, catalog.resolve(table))
    }

    pub fn with_schema(db: &'a dyn Database, db_name: &'a str, table: TableSchema) -> Self {
        Self { db, db_name, table }
    }

    pub fn table(&self) -> &str {
        &self.table.name
    }

    pub fn key_column(&self) -> &str {
        &self.table.key_column
    }

    fn query(&self) -> QueryBuilder {
        QueryBuilder::new(&self.table.name)
    }

    fn query_failed(&self) -> CrudError {
        CrudError::QueryFailed(self.table.name.clone())
    }

    fn not_found(&self, key: &str) -> CrudError {
        CrudError::RecordNotFound {
            table: self.table.name.clone(),
            column: self.table.key_column.clone(),
            key: key.to_string(),
        }
    }

    /// Every column of the table, in declaration order.
    pub async fn columns(&self) -> Result<Vec<String>, CrudError> {
        let columns = table_columns(self.db, self.db_name, &self.table.name).await;
        if columns.is_empty() {
            return Err(CrudError::NoColumns(self.table.name.clone()));
        }
        Ok(columns)
    }

    /// Columns a user may fill in: everything except the key.
    pub async fn editable_columns(&self) -> Result<Vec<String>, CrudError> {
        Ok(self
            .columns()
            .await?
            .into_iter()
            .filter(|c| c != self.key_column())
            .collect())
    }

    /// Rejects the key column and names that are not columns of the table.
    fn check_fields(&self, columns: &[String], values: &FieldValues) -> Result<(), CrudError> {
        for column in values.keys() {
            if column == self.key_column() {
                return Err(CrudError::KeyColumnNotEditable {
                    table: self.table.name.clone(),
                    column: column.clone(),
                });
            }
            if !columns.contains(column) {
                return Err(CrudError::UnknownColumn {
                    table: self.table.name.clone(),
                    column: column.clone(),
                });
            }
        }
        Ok(())
    }

    /// Inserts one row covering every non-key column. Missing or empty
    /// values are stored as NULL; the key is left to the database.
    pub async fn create(&self, values: &FieldValues) -> Result<Created, CrudError> {
        let columns = self.editable_columns().await?;
        self.check_fields(&columns, values)?;

        let row = columns
            .iter()
            .map(|c| (c.as_str(), bound_value(values.get(c))))
            .collect();
        let stmt = self.query().insert(row);
        let summary = execute_query(self.db, &stmt)
            .await
            .ok_or_else(|| self.query_failed())?;

        let key = summary.last_insert_id.map(|id| id.to_string());
        info!(table = %self.table.name, key = ?key, "record created");
        Ok(Created { key })
    }

    /// All rows, with column names taken from the result metadata.
    pub async fn read(&self) -> Result<ResultSet, CrudError> {
        read_query(self.db, &self.query().select_all())
            .await
            .ok_or_else(|| self.query_failed())
    }

    /// Every key value currently in the table.
    pub async fn list_keys(&self) -> Result<KeyChoice, CrudError> {
        let result = read_query(self.db, &self.query().select_column_ordered(self.key_column()))
            .await
            .ok_or_else(|| self.query_failed())?;
        if result.is_empty() {
            return Ok(KeyChoice::NoRecords);
        }
        Ok(KeyChoice::Keys(result.column_text(self.key_column())))
    }

    pub async fn fetch_record(&self, key: &str) -> Result<Option<Record>, CrudError> {
        let result = read_query(self.db, &self.query().select_where(self.key_column(), key))
            .await
            .ok_or_else(|| self.query_failed())?;
        let Some(row) = result.rows.into_iter().next() else {
            return Ok(None);
        };
        Ok(Some(Record {
            key: key.to_string(),
            fields: result.columns.into_iter().zip(row).collect(),
        }))
    }

    /// The record at `key` as an edit form. The key may have disappeared
    /// since it was listed; that is reported as `RecordNotFound`.
    pub async fn edit_form(&self, key: &str) -> Result<EditForm, CrudError> {
        let record = self
            .fetch_record(key)
            .await?
            .ok_or_else(|| self.not_found(key))?;
        let fields = record
            .fields
            .iter()
            .filter(|(c, _)| c != self.key_column())
            .map(|(c, v)| (c.clone(), cell_text(v)))
            .collect();
        Ok(EditForm {
            key_column: self.key_column().to_string(),
            key: record.key,
            fields,
        })
    }

    /// Sets the given non-key columns of the record at `key`. Columns whose
    /// submitted text matches the stored value are left alone, so an empty
    /// string and NULL both survive an unedited form.
    pub async fn update(&self, key: &str, values: &FieldValues) -> Result<Updated, CrudError> {
        let columns = self.editable_columns().await?;
        self.check_fields(&columns, values)?;
        if values.is_empty() {
            return Err(CrudError::NoChanges(self.table.name.clone()));
        }

        let current = self
            .fetch_record(key)
            .await?
            .ok_or_else(|| self.not_found(key))?;
        let sets: Vec<_> = columns
            .iter()
            .filter_map(|c| {
                let submitted = values.get(c)?;
                if current.text(c).as_deref() == Some(submitted.as_str()) {
                    return None;
                }
                Some((c.as_str(), bound_value(Some(submitted))))
            })
            .collect();
        if sets.is_empty() {
            info!(table = %self.table.name, key, "record unchanged");
            return Ok(Updated { rows_affected: 0 });
        }

        let stmt = self.query().update(sets, self.key_column(), key);
        let summary = execute_query(self.db, &stmt)
            .await
            .ok_or_else(|| self.query_failed())?;
        // the key can vanish between the fetch and the update
        if summary.rows_affected == 0 && self.fetch_record(key).await?.is_none() {
            return Err(self.not_found(key));
        }

        info!(table = %self.table.name, key, "record updated");
        Ok(Updated {
            rows_affected: summary.rows_affected,
        })
    }

    pub async fn delete(&self, key: &str) -> Result<DeleteOutcome, CrudError> {
        let stmt = self.query().delete(self.key_column(), key);
        let summary = execute_query(self.db, &stmt)
            .await
            .ok_or_else(|| self.query_failed())?;
        if summary.rows_affected == 0 {
            info!(table = %self.table.name, key, "nothing to delete");
            return Ok(DeleteOutcome::NothingToDelete);
        }
        info!(table = %self.table.name, key, "record deleted");
        Ok(DeleteOutcome::Deleted)
    }
}

fn bound_value(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.is_empty()).cloned()
}
