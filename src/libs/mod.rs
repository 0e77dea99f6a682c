pub mod auth;
pub mod mysql;
pub mod orm;
pub mod query_builder;
pub mod records;
pub mod schema;
pub mod session;
pub mod settings;
pub mod sqlite;

// Re-export them for easier access from the server and binary
pub use auth::*;
pub use mysql::*;
pub use orm::*;
pub use query_builder::*;
pub use records::*;
pub use schema::*;
pub use session::*;
pub use settings::*;
pub use sqlite::*;
