//! Shared types and result types for the database layer

pub mod errors;

pub use errors::{DatabaseError, TransactionError, UnitError};

pub type DatabaseResult<T> = Result<T, DatabaseError>;
