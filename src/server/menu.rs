use serde::Deserialize;

/// Entries of the operation menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Home,
    Create,
    Read,
    Update,
    Delete,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::Home,
        Operation::Create,
        Operation::Read,
        Operation::Update,
        Operation::Delete,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Operation::Home => "home",
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Operation::Home => "Home",
            Operation::Create => "Create record",
            Operation::Read => "Read record",
            Operation::Update => "Update record",
            Operation::Delete => "Delete record",
        }
    }

    pub fn heading(self, table: &str) -> String {
        match self {
            Operation::Home => "Welcome to Mortgage Management System".to_string(),
            Operation::Create => format!("Create a new record on table {table}"),
            Operation::Read => format!("Read a record from table {table}"),
            Operation::Update => format!("Update a record from {table} table"),
            Operation::Delete => format!("Delete a record from {table} table"),
        }
    }

    /// Page for this operation on `table`.
    pub fn path(self, table: &str) -> String {
        match self {
            Operation::Home => "/".to_string(),
            other => format!("/tables/{}/{}", urlencoding::encode(table), other.slug()),
        }
    }

    /// Page acting on the record at `key`; only update and delete have one.
    pub fn record_path(self, table: &str, key: &str) -> Option<String> {
        match self {
            Operation::Update | Operation::Delete => Some(format!(
                "{}/{}",
                self.path(table),
                urlencoding::encode(key)
            )),
            _ => None,
        }
    }
}

/// The sidebar selection: one operation on one table.
#[derive(Debug, Deserialize)]
pub struct MenuSelection {
    pub operation: Operation,
    pub table: String,
}
