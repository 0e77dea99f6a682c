#![allow(dead_code)]

use mortgage_console::server::AppState;
use mortgage_console::{PasswordGate, SqliteDatabase, TableCatalog};
use secrecy::Secret;
use std::sync::Arc;

pub const DB_NAME: &str = "main";
pub const PASSWORD: &str = "correct horse battery staple";

const MORTGAGE_SCHEMA: &str = r#"
CREATE TABLE `Borrowers` (
    `BorrowerID` INTEGER PRIMARY KEY AUTOINCREMENT,
    `FirstName` TEXT NOT NULL,
    `LastName` TEXT NOT NULL,
    `Email` TEXT,
    `Phone` TEXT
);
CREATE TABLE `Properties` (
    `PropertyID` INTEGER PRIMARY KEY AUTOINCREMENT,
    `Address` TEXT NOT NULL,
    `Value` INTEGER
);
CREATE TABLE `MortgageLoans` (
    `LoanID` INTEGER PRIMARY KEY AUTOINCREMENT,
    `BorrowerID` INTEGER NOT NULL REFERENCES `Borrowers` (`BorrowerID`),
    `PropertyID` INTEGER NOT NULL REFERENCES `Properties` (`PropertyID`),
    `Principal` REAL NOT NULL,
    `InterestRate` REAL NOT NULL,
    `StartDate` TEXT
);
CREATE TABLE `Payments` (
    `PaymentID` INTEGER PRIMARY KEY AUTOINCREMENT,
    `LoanID` INTEGER NOT NULL REFERENCES `MortgageLoans` (`LoanID`),
    `Amount` REAL NOT NULL,
    `PaymentDate` TEXT
);
CREATE TABLE `Guarantor_Cosigners` (
    `GuarantorID` INTEGER PRIMARY KEY AUTOINCREMENT,
    `LoanID` INTEGER REFERENCES `MortgageLoans` (`LoanID`),
    `Name` TEXT NOT NULL,
    `Relationship` TEXT
);
CREATE TABLE `Insurance` (
    `LoanID` INTEGER PRIMARY KEY REFERENCES `MortgageLoans` (`LoanID`),
    `Provider` TEXT NOT NULL,
    `PolicyNumber` TEXT,
    `Premium` REAL
);
"#;

pub async fn mortgage_db() -> SqliteDatabase {
    let db = SqliteDatabase::in_memory()
        .await
        .expect("Failed to open in-memory database");
    db.run_script(MORTGAGE_SCHEMA)
        .await
        .expect("Failed to create mortgage schema");
    db
}

pub async fn app_state() -> (AppState, Arc<SqliteDatabase>) {
    let db = Arc::new(mortgage_db().await);
    let state = AppState::new(
        db.clone(),
        DB_NAME,
        TableCatalog::mortgage(),
        PasswordGate::new(Secret::new(PASSWORD.to_string())),
    );
    (state, db)
}

pub fn fields(pairs: &[(&str, &str)]) -> mortgage_console::FieldValues {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
