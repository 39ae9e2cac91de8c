//! Salescast Core - shared types, tables, and error handling

pub mod error;
pub mod table;
pub mod types;

pub use error::{Error, Result};
pub use table::DataTable;
pub use types::*;
