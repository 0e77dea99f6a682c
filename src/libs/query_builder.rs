/// Quote an identifier with backticks, doubling any embedded backtick.
///
/// MySQL and SQLite both accept backtick-quoted identifiers.
pub fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// SQL text plus the values bound to its `?` placeholders, in order.
///
/// `None` binds SQL `NULL`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    sql: String,
    params: Vec<Option<String>>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    pub fn bind(mut self, value: impl Into<Option<String>>) -> Self {
        self.params.push(value.into());
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Option<String>] {
        &self.params
    }
}

/// Builds single-table statements. Identifiers are quoted, values are bound.
pub struct QueryBuilder {
    table: String,
}

impl QueryBuilder {
    pub fn new(table: &str) -> Self {
        Self {
            table: quote_ident(table),
        }
    }

    pub fn select_all(&self) -> Statement {
        Statement::new(format!("SELECT * FROM {}", self.table))
    }

    pub fn select_column_ordered(&self, column: &str) -> Statement {
        let column = quote_ident(column);
        Statement::new(format!(
            "SELECT {} FROM {} ORDER BY {}",
            column, self.table, column
        ))
    }

    pub fn select_where(&self, column: &str, value: &str) -> Statement {
        Statement::new(format!(
            "SELECT * FROM {} WHERE {} = ? LIMIT 1",
            self.table,
            quote_ident(column)
        ))
        .bind(value.to_string())
    }

    pub fn insert(&self, values: Vec<(&str, Option<String>)>) -> Statement {
        let columns: Vec<String> = values.iter().map(|(c, _)| quote_ident(c)).collect();
        let placeholders = vec!["?"; values.len()];
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table,
            columns.join(", "),
            placeholders.join(", ")
        );
        values
            .into_iter()
            .fold(Statement::new(sql), |stmt, (_, v)| stmt.bind(v))
    }

    pub fn update(
        &self,
        sets: Vec<(&str, Option<String>)>,
        key_column: &str,
        key: &str,
    ) -> Statement {
        let assignments: Vec<String> = sets
            .iter()
            .map(|(c, _)| format!("{} = ?", quote_ident(c)))
            .collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ?",
            self.table,
            assignments.join(", "),
            quote_ident(key_column)
        );
        sets.into_iter()
            .fold(Statement::new(sql), |stmt, (_, v)| stmt.bind(v))
            .bind(key.to_string())
    }

    pub fn delete(&self, key_column: &str, key: &str) -> Statement {
        Statement::new(format!(
            "DELETE FROM {} WHERE {} = ?",
            self.table,
            quote_ident(key_column)
        ))
        .bind(key.to_string())
    }
}
