pub mod entity;
pub mod manager;
pub mod memory;
pub mod models;
pub mod query_builder;
pub mod repository;
pub mod schema;
pub mod transaction;

pub use entity::{Entity, SqlType, Values};
pub use manager::{Database, DatabaseError};
pub use repository::Repository;
pub use transaction::Tx;
