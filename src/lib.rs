pub mod libs;
pub mod server;

pub use libs::*;
