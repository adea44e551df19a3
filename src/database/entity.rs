use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::{postgres::PgRow, FromRow};

use crate::database::manager::DatabaseError;

/// Postgres type a writable column is cast to when bound as text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    BigInt,
    Text,
    Boolean,
    Numeric,
}

impl SqlType {
    pub fn cast(&self) -> &'static str {
        match self {
            SqlType::BigInt => "bigint",
            SqlType::Text => "text",
            SqlType::Boolean => "boolean",
            SqlType::Numeric => "numeric",
        }
    }
}

/// A stored row type. `id` and `created_at` (plus `updated_at` where present)
/// are assigned by the store; everything else must be listed in `COLUMNS`.
pub trait Entity: DeserializeOwned + for<'r> FromRow<'r, PgRow> + Send + Sync + Unpin + 'static {
    const TABLE: &'static str;
    const COLUMNS: &'static [(&'static str, SqlType)];
    const HAS_UPDATED_AT: bool;

    fn column_type(column: &str) -> Option<SqlType> {
        Self::COLUMNS.iter().find(|(name, _)| *name == column).map(|(_, ty)| *ty)
    }
}

/// Column values for an insert or update, in column order
pub type Values = Map<String, Value>;

/// Serialize a payload struct into checked column values
pub fn to_values<E: Entity>(payload: &impl Serialize) -> Result<Values, DatabaseError> {
    let values = match serde_json::to_value(payload).map_err(|e| DatabaseError::Decode(e.to_string()))? {
        Value::Object(map) => map,
        _ => return Err(DatabaseError::QueryError("Row values must be an object".to_string())),
    };

    for column in values.keys() {
        if E::column_type(column).is_none() {
            return Err(DatabaseError::QueryError(format!(
                "Unknown column \"{}\" for {}",
                column,
                E::TABLE
            )));
        }
    }
    Ok(values)
}

/// Decode a JSON row into an entity
pub fn from_row<E: Entity>(row: &Values) -> Result<E, DatabaseError> {
    serde_json::from_value(Value::Object(row.clone())).map_err(|e| DatabaseError::Decode(e.to_string()))
}
