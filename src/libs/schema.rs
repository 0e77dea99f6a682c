use serde::Deserialize;
use tracing::warn;

/// Key column assumed for a table the catalog does not know.
pub const FALLBACK_KEY_COLUMN: &str = "ID";

const MORTGAGE_TABLES: [(&str, &str); 6] = [
    ("Borrowers", "BorrowerID"),
    ("Properties", "PropertyID"),
    ("MortgageLoans", "LoanID"),
    ("Payments", "PaymentID"),
    ("Guarantor_Cosigners", "GuarantorID"),
    ("Insurance", "LoanID"),
];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TableSchema {
    pub name: String,
    pub key_column: String,
}

impl TableSchema {
    pub fn new(name: impl Into<String>, key_column: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key_column: key_column.into(),
        }
    }
}

/// The tables the console manages and the primary key of each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCatalog {
    tables: Vec<TableSchema>,
}

impl Default for TableCatalog {
    fn default() -> Self {
        Self::mortgage()
    }
}

impl TableCatalog {
    pub fn new(tables: Vec<TableSchema>) -> Self {
        Self { tables }
    }

    /// Borrowers, Properties, MortgageLoans, Payments, Guarantor_Cosigners, Insurance.
    pub fn mortgage() -> Self {
        Self::new(
            MORTGAGE_TABLES
                .iter()
                .map(|(name, key)| TableSchema::new(*name, *key))
                .collect(),
        )
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|t| t.name.as_str())
    }

    pub fn get(&self, table: &str) -> Option<&TableSchema> {
        self.tables.iter().find(|t| t.name == table)
    }

    /// Primary key column of `table`, or `"ID"` when the table is not cataloged.
    pub fn id_column_name(&self, table: &str) -> &str {
        match self.get(table) {
            Some(schema) => &schema.key_column,
            None => {
                warn!(table, "unknown table, falling back to key column {FALLBACK_KEY_COLUMN}");
                FALLBACK_KEY_COLUMN
            }
        }
    }

    /// Schema for `table`, falling back to an `ID` key for uncataloged names.
    pub fn resolve(&self, table: &str) -> TableSchema {
        TableSchema::new(table, self.id_column_name(table))
    }
}
